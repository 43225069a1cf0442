//! STM32 peripherals driven through a [`Bus`] and a [`Layout`].

use crate::{
    boot::BootMemory,
    chip::{Bus, Layout, Vectors},
    nvr::BackupRegister,
    reset::{ResetFlags, ResetStatus},
    watchdog::{DebugFreeze, Key, WatchdogRegisters},
};

const IWDG_KR: u32 = 0x00;
const IWDG_PR: u32 = 0x04;
const IWDG_RLR: u32 = 0x08;

/// Every peripheral this crate needs, each owning its own handle to the bus.
pub struct Peripherals<B> {
    pub reset: ResetCsr<B>,
    pub backup: BackupDomain<B>,
    pub watchdog: Iwdg<B>,
    pub memory: VectorMemory<B>,
}

impl<B: Bus + Clone> Peripherals<B> {
    pub fn new(bus: B, layout: &'static Layout) -> Self {
        Self {
            reset: ResetCsr {
                bus: bus.clone(),
                layout,
            },
            backup: BackupDomain {
                bus: bus.clone(),
                layout,
            },
            watchdog: Iwdg {
                bus: bus.clone(),
                layout,
            },
            memory: VectorMemory { bus, layout },
        }
    }
}

/// Reset control and status register.
pub struct ResetCsr<B> {
    bus: B,
    layout: &'static Layout,
}

impl<B: Bus> ResetStatus for ResetCsr<B> {
    fn snapshot(&self) -> ResetFlags {
        let csr = self.bus.read(self.layout.reset_status);

        ResetFlags {
            watchdog: csr & self.layout.reset_watchdog_flag == self.layout.reset_watchdog_flag,
            software: csr & self.layout.reset_software_flag == self.layout.reset_software_flag,
        }
    }

    fn clear(&mut self) {
        let remove = self.layout.reset_remove_flags;
        self.bus.modify(self.layout.reset_status, |csr| csr | remove);
    }
}

/// RTC backup register.
pub struct BackupDomain<B> {
    bus: B,
    layout: &'static Layout,
}

impl<B: Bus> BackupRegister for BackupDomain<B> {
    fn read(&self) -> u32 {
        self.bus.read(self.layout.backup_register)
    }

    fn write(&mut self, value: u32) {
        self.bus.write(self.layout.backup_register, value)
    }
}

/// Independent watchdog together with its debug freeze bit.
pub struct Iwdg<B> {
    bus: B,
    layout: &'static Layout,
}

impl<B: Bus> WatchdogRegisters for Iwdg<B> {
    fn write_key(&mut self, key: Key) {
        self.bus.write(self.layout.iwdg_base + IWDG_KR, key as u32);
    }

    fn write_prescaler(&mut self, prescaler: u8) {
        self.bus
            .write(self.layout.iwdg_base + IWDG_PR, u32::from(prescaler));
    }

    fn write_reload(&mut self, reload: u16) {
        self.bus
            .write(self.layout.iwdg_base + IWDG_RLR, u32::from(reload));
    }
}

impl<B: Bus> DebugFreeze for Iwdg<B> {
    fn freeze_watchdog(&mut self) {
        if let Some(clock) = self.layout.debug_clock {
            self.bus.modify(clock.register, |en| en | clock.bit);
        }

        let stop = self.layout.debug_freeze_watchdog;
        self.bus.modify(self.layout.debug_freeze, |fz| fz | stop);
    }
}

/// Flash images and the vector table relocation machinery.
pub struct VectorMemory<B> {
    bus: B,
    layout: &'static Layout,
}

impl<B: Bus> BootMemory for VectorMemory<B> {
    fn read_word(&self, addr: u32) -> u32 {
        self.bus.read(addr)
    }

    fn stage_vectors(&mut self, image: u32) {
        if let Vectors::RemapSram(remap) = self.layout.vectors {
            for i in 0..remap.entries {
                let word = self.bus.read(image.wrapping_add(i << 2));
                self.bus.write(remap.table.wrapping_add(i << 2), word);
            }
        }
    }

    fn activate_vectors(&mut self, image: u32) {
        match self.layout.vectors {
            Vectors::InPlace => {}
            Vectors::Vtor { vtor } => self.bus.write(vtor, image),
            Vectors::RemapSram(remap) => {
                self.bus
                    .modify(remap.clock.register, |en| en | remap.clock.bit);

                // Clear the field first, then select SRAM.
                self.bus
                    .modify(remap.remap, |cfgr| cfgr & !remap.remap_mask);
                self.bus.modify(remap.remap, |cfgr| cfgr | remap.remap_sram);
            }
        }
    }
}
