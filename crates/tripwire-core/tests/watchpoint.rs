//! Tests for the hardware watchpoint controller against an in-memory register file

use std::cell::RefCell;
use std::rc::Rc;

use tripwire_core::prelude::*;
use tripwire_utils::{init_logging_with_level, LogFormat, LogLevel};

fn init_tracing()
{
    // The first test to get here installs the subscriber; later calls just fail
    if let Ok(guard) = init_logging_with_level(LogLevel::Trace, LogFormat::Pretty) {
        std::mem::forget(guard);
    }
}

/// One register file seen by several controllers, as when two tools watch
/// the same thread. Calls are serialized by the single test thread.
#[derive(Debug, Default, Clone)]
struct SharedContext(Rc<RefCell<MemoryContext>>);

impl SharedContext
{
    fn state(&self) -> DebugRegisterState
    {
        *self.0.borrow().state()
    }
}

impl DebugContext for SharedContext
{
    fn read_debug_state(&mut self) -> WatchResult<DebugRegisterState>
    {
        self.0.borrow_mut().read_debug_state()
    }

    fn write_debug_state(&mut self, state: &DebugRegisterState) -> WatchResult<()>
    {
        self.0.borrow_mut().write_debug_state(state)
    }
}

fn slot(index: u8) -> SlotIndex
{
    SlotIndex::new(index).unwrap()
}

/// Register file with the given slots already enabled by someone else.
fn context_with_taken(slots: &[u8]) -> MemoryContext
{
    let mut state = DebugRegisterState::default();
    for &index in slots {
        state.control.arm(slot(index), Condition::ReadOrWrite, AccessWidth::Dword);
        state.set_address(slot(index), 0xdead_0000 + u64::from(index) * 4);
    }
    MemoryContext::with_state(state)
}

#[test]
fn test_activate_write_dword()
{
    init_tracing();
    let mut ctx = MemoryContext::new();
    let mut watch = HardwareWatchpoint::new(&mut ctx);

    let used = watch.activate(Address::from(0x1000), 4, Condition::Write).unwrap();
    let state = *watch.context().state();

    assert_eq!(used, slot(0));
    assert_eq!(state.control.condition_bits(used), 0b01);
    assert_eq!(state.control.length_bits(used), 0b11);
    assert_eq!(state.address_of(used), 0x1000);
    assert!(state.control.is_local_enabled(used));
    assert_eq!(watch.context().writes(), 1);
}

#[test]
fn test_activate_then_deactivate_read_or_write_word()
{
    init_tracing();
    let mut ctx = MemoryContext::new();
    let mut watch = HardwareWatchpoint::new(&mut ctx);

    let used = watch.activate(Address::from(0x1002), 2, Condition::ReadOrWrite).unwrap();
    watch.deactivate();

    assert!(!watch.is_armed());
    assert_eq!(watch.slot(), None);
    assert!(!watch.context().state().control.is_local_enabled(used));
}

#[test]
fn test_round_trip_leaves_other_slots_untouched()
{
    init_tracing();
    let requests = [
        (0x1000, 1, Condition::Write),
        (0x1001, 1, Condition::ReadOrWrite),
        (0x2002, 2, Condition::Write),
        (0x2004, 2, Condition::ReadOrWrite),
        (0x3008, 4, Condition::Write),
        (0x300c, 4, Condition::ReadOrWrite),
    ];

    for (address, width, condition) in requests {
        let layouts: [&[u8]; 4] = [&[], &[0], &[0, 2], &[0, 1, 2]];
        for taken in layouts {
            let mut ctx = context_with_taken(taken);
            let before = *ctx.state();
            {
                let mut watch = HardwareWatchpoint::new(&mut ctx);
                let used = watch.activate(Address::from(address), width, condition).unwrap();
                assert!(!taken.contains(&(used.index() as u8)));
                watch.deactivate();
            }
            let after = *ctx.state();

            // Everything outside the used slot's L bit and its RW/LEN field is as it was
            for other in SlotIndex::ALL {
                assert_eq!(after.control.is_local_enabled(other), before.control.is_local_enabled(other));
            }
            for &index in taken {
                let s = slot(index);
                assert_eq!(after.address_of(s), before.address_of(s));
                assert_eq!(after.control.condition_bits(s), before.control.condition_bits(s));
                assert_eq!(after.control.length_bits(s), before.control.length_bits(s));
            }
        }
    }
}

#[test]
fn test_unsupported_widths_write_nothing()
{
    init_tracing();
    for width in [0, 3, 5, 6, 7, 8, 16] {
        let mut ctx = MemoryContext::new();
        {
            let mut watch = HardwareWatchpoint::new(&mut ctx);
            let err = watch.activate(Address::from(0x1000), width, Condition::Write).unwrap_err();

            assert_eq!(err.invalid_request(), Some(InvalidRequest::UnsupportedWidth(width)));
            assert!(!watch.is_armed());
        }
        assert_eq!(ctx.writes(), 0);
        assert_eq!(ctx.state(), &DebugRegisterState::default());
    }
}

#[test]
fn test_width_three_never_touches_registers()
{
    init_tracing();
    let mut ctx = MemoryContext::new();
    {
        let mut watch = HardwareWatchpoint::new(&mut ctx);
        let err = watch.activate(Address::from(0x1000), 3, Condition::ReadOrWrite).unwrap_err();
        assert!(matches!(err, WatchError::InvalidBreakpointRequest(_)));
    }
    assert_eq!(ctx.reads(), 0);
    assert_eq!(ctx.writes(), 0);
}

#[test]
fn test_misaligned_addresses_rejected()
{
    init_tracing();
    let cases = [(0x1001, 2), (0x1003, 2), (0x1001, 4), (0x1002, 4), (0x1003, 4)];

    for (address, width) in cases {
        let mut watch = HardwareWatchpoint::new(MemoryContext::new());
        let err = watch.activate(Address::from(address), width, Condition::Write).unwrap_err();

        assert!(matches!(
            err,
            WatchError::InvalidBreakpointRequest(InvalidRequest::Misaligned { .. })
        ));
        assert_eq!(watch.context().writes(), 0);
    }
}

#[test]
fn test_null_address_rejected()
{
    init_tracing();
    let mut watch = HardwareWatchpoint::new(MemoryContext::new());
    let err = watch.activate(Address::ZERO, 1, Condition::Write).unwrap_err();
    assert_eq!(err.invalid_request(), Some(InvalidRequest::NullAddress));
}

#[test]
fn test_deactivate_unarmed_is_noop()
{
    init_tracing();
    let mut ctx = context_with_taken(&[1]);
    let before = *ctx.state();
    {
        let mut watch = HardwareWatchpoint::new(&mut ctx);
        watch.deactivate();
        watch.deactivate();
        assert!(!watch.is_armed());
    }
    assert_eq!(ctx.reads(), 0);
    assert_eq!(ctx.writes(), 0);
    assert_eq!(ctx.state(), &before);
}

#[test]
fn test_rearm_replaces_previous_encoding()
{
    init_tracing();
    let mut ctx = MemoryContext::new();
    let mut watch = HardwareWatchpoint::new(&mut ctx);

    let first = watch.activate(Address::from(0x1000), 4, Condition::ReadOrWrite).unwrap();
    let second = watch.activate(Address::from(0x2001), 1, Condition::Write).unwrap();
    let control = watch.context().state().control;

    // The freed slot is the lowest free one again
    assert_eq!(first, second);
    assert_eq!(control.condition(second), Some(Condition::Write));
    assert_eq!(control.width(second), Some(AccessWidth::Byte));
    assert_eq!(watch.context().state().address_of(second), 0x2001);
    assert_eq!(watch.request().map(|r| r.address), Some(Address::from(0x2001)));

    // Only one slot enabled
    let enabled = SlotIndex::ALL
        .into_iter()
        .filter(|&s| control.is_local_enabled(s))
        .count();
    assert_eq!(enabled, 1);
    // Re-arm is a single register update
    assert_eq!(watch.context().writes(), 2);
}

#[test]
fn test_rearm_moves_to_lower_free_slot()
{
    init_tracing();
    let shared = SharedContext::default();
    let mut a = HardwareWatchpoint::new(shared.clone());
    let mut b = HardwareWatchpoint::new(shared.clone());

    assert_eq!(a.activate(Address::from(0x1000), 4, Condition::Write).unwrap(), slot(0));
    let first = b.activate(Address::from(0x2000), 4, Condition::Write).unwrap();
    assert_eq!(first, slot(1));

    a.deactivate();
    let second = b.activate(Address::from(0x4000), 2, Condition::ReadOrWrite).unwrap();

    let state = shared.state();
    assert_eq!(second, slot(0));
    assert!(!state.control.is_local_enabled(first));
    assert!(state.control.is_local_enabled(second));
    assert_eq!(state.address_of(second), 0x4000);
}

#[test]
fn test_all_slots_taken()
{
    init_tracing();
    let mut ctx = context_with_taken(&[0, 1, 2, 3]);
    let before = *ctx.state();
    {
        let mut watch = HardwareWatchpoint::new(&mut ctx);
        let err = watch.activate(Address::from(0x1000), 4, Condition::Write).unwrap_err();
        assert_eq!(err.invalid_request(), Some(InvalidRequest::NoFreeSlot));
        assert!(!watch.is_armed());
    }
    assert_eq!(ctx.writes(), 0);
    assert_eq!(ctx.state(), &before);
}

#[test]
fn test_global_enable_counts_as_taken()
{
    init_tracing();
    // G0 set by the OS
    let state = DebugRegisterState {
        control: DebugControl::from_raw(0b10),
        ..DebugRegisterState::default()
    };
    let mut ctx = MemoryContext::with_state(state);
    let mut watch = HardwareWatchpoint::new(&mut ctx);

    let used = watch.activate(Address::from(0x1000), 1, Condition::Write).unwrap();
    assert_eq!(used, slot(1));
    assert!(watch.context().state().control.is_global_enabled(slot(0)));
}

#[test]
fn test_failed_rearm_keeps_previous_watchpoint()
{
    init_tracing();
    let mut ctx = MemoryContext::new();
    let mut watch = HardwareWatchpoint::new(&mut ctx);
    let used = watch.activate(Address::from(0x1000), 4, Condition::Write).unwrap();

    assert!(watch.activate(Address::from(0x1001), 4, Condition::Write).is_err());

    assert_eq!(watch.slot(), Some(used));
    let state = watch.context().state();
    assert_eq!(state.address_of(used), 0x1000);
    assert!(state.control.is_local_enabled(used));
    assert_eq!(watch.context().writes(), 1);
}

#[test]
fn test_drop_releases_slot()
{
    init_tracing();
    let mut ctx = MemoryContext::new();
    let used = {
        let mut watch = HardwareWatchpoint::new(&mut ctx);
        watch.activate(Address::from(0x1000), 4, Condition::Write).unwrap()
    };

    assert!(!ctx.state().control.is_local_enabled(used));
    assert_eq!(ctx.writes(), 2);
}

#[test]
fn test_drop_on_early_return_releases_slot()
{
    init_tracing();

    fn arm_then_fail(ctx: &mut MemoryContext) -> WatchResult<()>
    {
        let mut watch = HardwareWatchpoint::new(ctx);
        watch.activate(Address::from(0x1000), 4, Condition::Write)?;
        // Second request fails and `?` leaves the scope
        HardwareWatchpoint::armed(MemoryContext::new(), Address::from(0x1000), 3, Condition::Write)?;
        Ok(())
    }

    let mut ctx = MemoryContext::new();
    assert!(arm_then_fail(&mut ctx).is_err());
    assert_eq!(ctx.state().control.first_free_slot(), Some(slot(0)));
    assert_eq!(ctx.state().control.raw() & 0xff, 0);
}

#[test]
fn test_drop_on_panic_releases_slot()
{
    init_tracing();
    let mut ctx = MemoryContext::new();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut watch = HardwareWatchpoint::new(&mut ctx);
        watch.activate(Address::from(0x1000), 4, Condition::Write).unwrap();
        panic!("unwinding with a live watchpoint");
    }));

    assert!(result.is_err());
    assert!(ctx.state().control.is_slot_free(slot(0)));
}

#[test]
fn test_two_controllers_share_context()
{
    init_tracing();
    let shared = SharedContext::default();
    let mut a = HardwareWatchpoint::new(shared.clone());
    let mut b = HardwareWatchpoint::new(shared.clone());

    let first = a.activate(Address::from(0x1000), 4, Condition::Write).unwrap();
    let second = b.activate(Address::from(0x2000), 1, Condition::ReadOrWrite).unwrap();

    assert_ne!(first, second);
    let control = shared.state().control;
    assert_eq!(control.condition(first), Some(Condition::Write));
    assert_eq!(control.condition(second), Some(Condition::ReadOrWrite));

    drop(a);
    let control = shared.state().control;
    assert!(control.is_slot_free(first));
    assert!(control.is_local_enabled(second));
}
