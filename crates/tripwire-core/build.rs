//! Build script for tripwire-core
//!
//! Checks before compilation:
//! - Minimum Rust version (let-else and const trait bounds need 1.65)
//! - Target architecture: the DR7 encoding is x86-only, so other targets
//!   get a warning (the crate still builds for use with simulated contexts)

use std::env;

fn main()
{
    const MIN_RUST: &str = "1.65.0";

    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::parse(MIN_RUST).expect("valid version literal");

        if rustc_version < min_rust_version {
            panic!("tripwire-core requires Rust {min_rust_version} or newer, found {rustc_version}");
        }
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }

    // cfg!(target_arch) would describe the build host here, not the target
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if target_arch != "x86_64" && target_arch != "x86" {
        println!(
            "cargo:warning=tripwire-core targets the x86 debug register layout; on {target_arch} only in-memory contexts are useful"
        );
    }

    println!("cargo:rerun-if-changed=build.rs");
}
