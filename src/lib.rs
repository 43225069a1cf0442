//! Boot control and fault recovery for microcontroller bootloaders.
//!
//! Four independent building blocks:
//! * [`reset`]: why did the chip restart, and a way to restart it.
//! * [`nvr`]: one word that survives a warm reset.
//! * [`watchdog`]: arm and feed the independent watchdog.
//! * [`boot`]: hand control over to another image in flash.
//!
//! The core logic only talks to small per-peripheral traits.
//! [`chip`] implements those on top of a register [`chip::Bus`] and a per-target [`chip::Layout`].
#![no_std]

#[cfg(all(feature = "override_watchdog", not(debug_assertions)))]
compile_error!("`override_watchdog` removes hang protection and must not be used in release builds");

pub(crate) mod log;

pub mod boot;
pub mod chip;
pub mod nvr;
pub mod reset;
pub mod watchdog;

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod mock;

/// The operating layer underneath the bootloader, typically an RTOS kernel.
pub trait Scheduler {
    /// Block the caller for at least `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);

    /// Stop scheduling and interrupt dispatch for good.
    fn disable(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The backup register holds a word that is not one of the [`watchdog::Reason`] sentinels.
    UnknownReason(u32),
}
