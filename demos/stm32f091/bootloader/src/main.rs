#![no_std]
#![no_main]

use bootguard::{
    boot::{
        self,
        cortex_m::{BusyScheduler, SimpleCortexM, SysReset},
    },
    chip::{Mmio, Peripherals, STM32F0},
    nvr::Nvr,
    reset::{self, ResetSource},
    watchdog::{Period, Reason, Watchdog},
};
use cortex_m_rt::entry;

use {defmt_rtt as _, panic_halt as _};

const APPLICATION: u32 = 0x0800_4000;

/// HSI after reset.
const CORE_CLOCK_HZ: u32 = 8_000_000;

#[entry]
fn main() -> ! {
    defmt::info!("Bootguard");

    let Peripherals {
        mut reset,
        backup,
        watchdog,
        mut memory,
    } = Peripherals::new(unsafe { Mmio::new() }, &STM32F0);

    let mut scheduler = BusyScheduler::new(CORE_CLOCK_HZ);
    let mut watchdog = Watchdog::new(watchdog);
    let mut nvr = Nvr::new(backup);

    watchdog.freeze_on_debug();

    let source = reset::take_reset_source(&mut reset);
    let reason = nvr.reason();
    defmt::info!("Reset source {}, reason {}", source, reason);

    // The application failed to start last time, stay in the bootloader.
    if source == ResetSource::Watchdog && reason == Ok(Reason::BootApplication) {
        nvr.record(Reason::NoApplication);
        watchdog.enable(Period::Ms6400);

        loop {
            // Waiting for a new image would go here.
            watchdog.reload();
            cortex_m::asm::delay(CORE_CLOCK_HZ / 10);

            if nvr.reason() == Ok(Reason::UserRequest) {
                reset::reset(&mut scheduler, &mut SysReset);
            }
        }
    }

    // The application has to reload the watchdog once it is up.
    nvr.record(Reason::BootApplication);
    watchdog.enable(Period::Ms1600);

    unsafe { boot::jump_to_app(APPLICATION, &mut memory, &mut scheduler, &mut SimpleCortexM) }
}
