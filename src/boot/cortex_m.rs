//! Bare-metal Cortex-M implementations of the boot collaborators.

use crate::{Scheduler, boot::Boot, reset::SystemReset};

/// Simple bootload mechanism for Cortex-M without support for TrustZone.
pub struct SimpleCortexM;

impl Boot for SimpleCortexM {
    fn barrier(&mut self) {
        cortex_m::asm::dsb();
        cortex_m::asm::isb();
    }

    unsafe fn handoff(&mut self, stack_pointer: u32, entry: u32) -> ! {
        unsafe { cortex_m::asm::bootstrap(stack_pointer as *const u32, entry as *const u32) }
    }
}

/// `AIRCR.SYSRESETREQ`.
pub struct SysReset;

impl SystemReset for SysReset {
    fn request(&mut self) {
        cortex_m::peripheral::SCB::sys_reset()
    }
}

/// Stand-in for an operating layer when the bootloader runs without one.
///
/// Sleeping busy-waits, disabling masks all configurable interrupts.
pub struct BusyScheduler {
    cycles_per_ms: u32,
}

impl BusyScheduler {
    pub const fn new(core_clock_hz: u32) -> Self {
        Self {
            cycles_per_ms: core_clock_hz / 1000,
        }
    }
}

impl Scheduler for BusyScheduler {
    fn sleep_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            cortex_m::asm::delay(self.cycles_per_ms);
        }
    }

    fn disable(&mut self) {
        cortex_m::interrupt::disable();
    }
}
