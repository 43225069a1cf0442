//! Reset cause classification and software reset.

use serde::{Deserialize, Serialize};

use crate::{Scheduler, log};

/// Time given to in-flight output (logging, transports) before resetting.
pub const RESET_GRACE_MS: u32 = 100;

/// Why the chip last reset.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetSource {
    /// Power-on, brown-out, reset pin, or anything not decoded below.
    Hardware,
    Watchdog,
    Software,
    /// Reserved for causes that are not decoded yet.
    Other,
}

/// Decoded reset flags, as captured in one read of the status register.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ResetFlags {
    pub watchdog: bool,
    pub software: bool,
}

/// Reset status register.
pub trait ResetStatus {
    /// Read the flags once.
    fn snapshot(&self) -> ResetFlags;

    /// Clear all reset flags, so the next boot starts clean.
    fn clear(&mut self);
}

/// The toolchain system reset request, e.g. `AIRCR.SYSRESETREQ`.
pub trait SystemReset {
    /// Request a reset. The chip may take a few cycles to act on it.
    fn request(&mut self);
}

/// Decode a snapshot: watchdog beats software beats everything else.
pub const fn classify(flags: ResetFlags) -> ResetSource {
    if flags.watchdog {
        ResetSource::Watchdog
    } else if flags.software {
        ResetSource::Software
    } else {
        ResetSource::Hardware
    }
}

/// Determine the reset source and consume the flags.
///
/// This is one-shot per boot: the flags are cleared, so calling it a second time
/// reports [`ResetSource::Hardware`]. Store the result if it is needed later.
pub fn take_reset_source(status: &mut impl ResetStatus) -> ResetSource {
    let flags = status.snapshot();
    let source = classify(flags);

    status.clear();

    log::info!("Reset source: {}", source);
    source
}

/// Reset the chip after a short grace period. Never returns.
#[allow(clippy::empty_loop)]
pub fn reset(scheduler: &mut impl Scheduler, system: &mut impl SystemReset) -> ! {
    scheduler.sleep_ms(RESET_GRACE_MS);

    log::info!("Resetting");
    system.request();

    // The request may take a moment to land.
    loop {}
}
