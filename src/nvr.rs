//! One word of storage that survives a warm reset.
//!
//! What the word means is up to the caller. The [`Reason`] sentinels are the usual content.

use crate::{Error, watchdog::Reason};

/// A register kept alive across warm resets, like an RTC backup register.
pub trait BackupRegister {
    fn read(&self) -> u32;

    fn write(&mut self, value: u32);
}

/// Non-volatile reason store.
pub struct Nvr<R> {
    register: R,
}

impl<R: BackupRegister> Nvr<R> {
    pub const fn new(register: R) -> Self {
        Self { register }
    }

    /// Last written value, or whatever the hardware holds after power-on.
    pub fn get(&self) -> u32 {
        self.register.read()
    }

    pub fn set(&mut self, value: u32) {
        self.register.write(value)
    }

    /// Leave a note for the next boot.
    pub fn record(&mut self, reason: Reason) {
        self.set(reason.into())
    }

    /// Read back a note left by [`Nvr::record`].
    pub fn reason(&self) -> Result<Reason, Error> {
        Reason::try_from(self.get())
    }
}
