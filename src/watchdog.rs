//! Independent watchdog control.
//!
//! Once [`Watchdog::enable`] has run, the countdown keeps going until the next reset.
//! There is no way to stop it, only to [`Watchdog::reload`] it in time.

use serde::{Deserialize, Serialize};

use crate::{Error, log};

/// Sentinels to leave in the [`crate::nvr::Nvr`] before a deliberate reset.
///
/// The watchdog itself never touches these.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Reason {
    NoApplication = 0xCAFE_BABE,
    UserRequest = 0xB0BA_FE77,
    BootApplication = 0xBAAD_F00D,
    TransportFail = 0xACAB_ACAB,
}

impl From<Reason> for u32 {
    fn from(reason: Reason) -> Self {
        reason as u32
    }
}

impl TryFrom<u32> for Reason {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0xCAFE_BABE => Ok(Reason::NoApplication),
            0xB0BA_FE77 => Ok(Reason::UserRequest),
            0xBAAD_F00D => Ok(Reason::BootApplication),
            0xACAB_ACAB => Ok(Reason::TransportFail),
            other => Err(Error::UnknownReason(other)),
        }
    }
}

/// Approximate timeout tiers, assuming the ~40 kHz internal low speed oscillator.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Period {
    Ms0,
    Ms800,
    Ms1600,
    Ms3200,
    Ms6400,
}

/// Prescaler code and reload value programmed for a [`Period`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Timing {
    pub prescaler: u8,
    pub reload: u16,
}

impl Period {
    pub const fn timing(self) -> Timing {
        match self {
            // /8, shortest possible count
            Period::Ms0 => Timing {
                prescaler: 1,
                reload: 0x001,
            },
            // /8
            Period::Ms800 => Timing {
                prescaler: 1,
                reload: 0xFFF,
            },
            // /16
            Period::Ms1600 => Timing {
                prescaler: 2,
                reload: 0xFFF,
            },
            // /32
            Period::Ms3200 => Timing {
                prescaler: 3,
                reload: 0xFFF,
            },
            // /64
            Period::Ms6400 => Timing {
                prescaler: 4,
                reload: 0xFFF,
            },
        }
    }
}

/// Tier by index. Anything unknown gets the longest timeout.
impl From<u8> for Period {
    fn from(index: u8) -> Self {
        match index {
            0 => Period::Ms0,
            1 => Period::Ms800,
            2 => Period::Ms1600,
            3 => Period::Ms3200,
            _ => Period::Ms6400,
        }
    }
}

/// Key register commands.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u16)]
pub enum Key {
    /// Allow writes to the prescaler and reload registers.
    Unlock = 0x5555,
    Reload = 0xAAAA,
    Start = 0xCCCC,
}

/// Key, prescaler and reload registers of the watchdog.
pub trait WatchdogRegisters {
    fn write_key(&mut self, key: Key);

    fn write_prescaler(&mut self, prescaler: u8);

    fn write_reload(&mut self, reload: u16);
}

/// Debug unit control over the watchdog.
pub trait DebugFreeze {
    /// Stop the watchdog counter while the core is halted by a debugger.
    fn freeze_watchdog(&mut self);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Enforcing,
    /// Arming and reloading do nothing. Never in production.
    #[cfg(any(test, feature = "override_watchdog"))]
    Overridden,
}

pub struct Watchdog<W> {
    regs: W,
    mode: Mode,
}

impl<W: WatchdogRegisters> Watchdog<W> {
    pub const fn new(regs: W) -> Self {
        Self {
            regs,
            mode: Mode::Enforcing,
        }
    }

    /// Watchdog that ignores [`Watchdog::enable`] and [`Watchdog::reload`], for debugging only.
    #[cfg(any(test, feature = "override_watchdog"))]
    pub fn overridden(regs: W) -> Self {
        log::warn!("Watchdog is overridden, do not use this in production");
        Self {
            regs,
            mode: Mode::Overridden,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Arm the watchdog. From here on [`Watchdog::reload`] has to be called within `period`.
    pub fn enable(&mut self, period: Period) {
        if self.mode != Mode::Enforcing {
            return;
        }

        let timing = period.timing();
        log::debug!("Arming watchdog: {}", period);

        self.regs.write_key(Key::Unlock);
        self.regs.write_prescaler(timing.prescaler);
        self.regs.write_reload(timing.reload);
        self.regs.write_key(Key::Start);
    }

    /// Restart the countdown with the armed period.
    pub fn reload(&mut self) {
        if self.mode != Mode::Enforcing {
            return;
        }

        self.regs.write_key(Key::Reload);
    }
}

impl<W: WatchdogRegisters + DebugFreeze> Watchdog<W> {
    /// Keep the watchdog from firing while a debugger holds the core. Idempotent.
    pub fn freeze_on_debug(&mut self) {
        self.regs.freeze_watchdog();
    }
}
