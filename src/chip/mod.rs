//! Register access and per-target register layouts.
//!
//! Nothing in here knows about policy. A [`Layout`] says where the bits live,
//! the [`stm32`] peripherals turn the core traits into reads and writes on a [`Bus`].

pub mod stm32;

pub use stm32::{BackupDomain, Iwdg, Peripherals, ResetCsr, VectorMemory};

/// 32-bit register bus.
pub trait Bus {
    fn read(&self, addr: u32) -> u32;

    fn write(&mut self, addr: u32, value: u32);

    /// Read-modify-write of a single register.
    fn modify(&mut self, addr: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read(addr);
        self.write(addr, f(value));
    }
}

/// Memory mapped, volatile register bus of the running chip.
#[derive(Clone, Copy, Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    /// Every address handed to this bus is dereferenced as-is.
    /// The caller must only use it with a [`Layout`] that matches the running chip,
    /// and must not access the same registers concurrently from another context.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Bus for Mmio {
    #[inline]
    fn read(&self, addr: u32) -> u32 {
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    #[inline]
    fn write(&mut self, addr: u32, value: u32) {
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}

/// Where the registers this crate touches live on a given MCU family.
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    /// Reset control/status register.
    pub reset_status: u32,
    /// Set after an independent watchdog reset.
    pub reset_watchdog_flag: u32,
    /// Set after a software requested reset.
    pub reset_software_flag: u32,
    /// Writing this bit clears all reset flags.
    pub reset_remove_flags: u32,

    /// Backup register that holds the reason word.
    pub backup_register: u32,

    /// Base of the independent watchdog block (key, prescaler, reload).
    pub iwdg_base: u32,

    /// Debug unit register with the watchdog stop bit.
    pub debug_freeze: u32,
    pub debug_freeze_watchdog: u32,
    /// Clock of the debug unit, on parts where it is gated.
    pub debug_clock: Option<ClockGate>,

    /// How a booted image gets its own vector table.
    pub vectors: Vectors,
}

#[derive(Clone, Copy, Debug)]
pub enum Vectors {
    /// Nothing is relocated, the image must set up its own vector table.
    InPlace,
    /// Cortex-M0+/M3 and up: point VTOR at the image.
    Vtor { vtor: u32 },
    /// Cortex-M0 without VTOR: copy the table into SRAM and map SRAM at address 0.
    RemapSram(SramRemap),
}

/// Peripheral clock enable bit.
#[derive(Clone, Copy, Debug)]
pub struct ClockGate {
    pub register: u32,
    pub bit: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct SramRemap {
    /// RAM region reserved for the relocated table, must be the start of SRAM.
    pub table: u32,
    /// Number of vector table words to copy.
    pub entries: u32,
    /// Clock of the remap controller.
    pub clock: ClockGate,
    /// Remap control register, the field mask and the value selecting SRAM.
    pub remap: u32,
    pub remap_mask: u32,
    pub remap_sram: u32,
}

// RCC_CSR flags shared by the STM32 families below.
const CSR_RMVF: u32 = 1 << 24;
const CSR_SFTRSTF: u32 = 1 << 28;
const CSR_IWDGRSTF: u32 = 1 << 29;

const DBG_IWDG_STOP: u32 = 1 << 12;

const IWDG: u32 = 0x4000_3000;
const RTC_BKP0R: u32 = 0x4000_2850;

const RCC_APB2ENR: u32 = 0x4002_1018;

/// Number of vector table words relocated on STM32F0.
pub const VECTOR_ENTRIES: u32 = 48;

/// STM32F0 (Cortex-M0, tested against the F091).
pub const STM32F0: Layout = Layout {
    reset_status: 0x4002_1024,
    reset_watchdog_flag: CSR_IWDGRSTF,
    reset_software_flag: CSR_SFTRSTF,
    reset_remove_flags: CSR_RMVF,
    backup_register: RTC_BKP0R,
    iwdg_base: IWDG,
    debug_freeze: 0x4001_5808,
    debug_freeze_watchdog: DBG_IWDG_STOP,
    // RCC_APB2ENR.DBGMCUEN
    debug_clock: Some(ClockGate {
        register: RCC_APB2ENR,
        bit: 1 << 22,
    }),
    vectors: Vectors::RemapSram(SramRemap {
        table: 0x2000_0000,
        entries: VECTOR_ENTRIES,
        // RCC_APB2ENR.SYSCFGCOMPEN
        clock: ClockGate {
            register: RCC_APB2ENR,
            bit: 1 << 0,
        },
        // SYSCFG_CFGR1.MEM_MODE
        remap: 0x4001_0000,
        remap_mask: 0b11,
        remap_sram: 0b11,
    }),
};

/// STM32F4 (Cortex-M4).
pub const STM32F4: Layout = Layout {
    reset_status: 0x4002_3874,
    reset_watchdog_flag: CSR_IWDGRSTF,
    reset_software_flag: CSR_SFTRSTF,
    reset_remove_flags: CSR_RMVF,
    backup_register: RTC_BKP0R,
    iwdg_base: IWDG,
    debug_freeze: 0xE004_2008,
    debug_freeze_watchdog: DBG_IWDG_STOP,
    debug_clock: None,
    vectors: Vectors::Vtor { vtor: 0xE000_ED08 },
};
