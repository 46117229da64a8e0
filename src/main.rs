//! Firmware for a single-channel voltmeter with a TM1637 LED display.
//!
//! # Overview
//!
//! This firmware samples one analog input once per second and shows the
//! result in volts on a 4-digit 7-segment TM1637 module:
//! - Non-blocking acquisition: conversions are started and polled from the
//!   main loop, never waited on
//! - Blocking display writes over a bit-banged 2-wire bus
//! - A status LED flashes for 500 ms each time a conversion starts
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+)
//! - **Display**: TM1637 4-digit module, CLK/DIO with on-module pull-ups
//! - **Input**: 0 V to VDDA (3.3 V) on ADC_IN0; the converter is
//!   ratiometric to VDDA and PA0 is not 5 V tolerant in analog mode
//!
//! # Timing
//!
//! TIM22 interrupts every 100 ms and raises a tick flag. The main loop
//! consumes the flag, counts ten ticks between conversions and five ticks
//! of LED on-time. A finished conversion is rendered before the loop runs
//! again, which stalls the loop for the few tens of milliseconds the
//! display bus needs.
//!
//! The converter is left powered between readings.
//!
//! # Module Organization
//!
//! - [`tick`] - TIM22 tick interrupt and the shared tick flag
//! - [`adc`] - Register-level start/poll/read on the converter
//! - [`hardware`] - Pin mappings and peripheral initialization
//!
//! Digit handling, the display protocol and the scheduler itself live in
//! the `voltmeter-core` crate.

#![no_std]
#![no_main]

mod adc;
mod hardware;
mod tick;

use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_stm32::{Config, rcc::Sysclk};
use {defmt_rtt as _, panic_probe as _};

use voltmeter_core::{
    Acquisition, AcquisitionConfig, Display, DisplayFormat, Indicator, Scheduler,
};

use hardware::Peripherals;

/// Reference voltage of the converter in millivolts.
///
/// The STM32L031 ADC is referenced to VDDA, which is the 3.3 V supply rail
/// on this board. Change this together with the supply.
pub const VREF_MV: u16 = 3300;

/// Tick period of the scheduler in milliseconds.
pub const TICK_PERIOD_MS: u32 = 100;

/// Display brightness, 0 to 7.
const BRIGHTNESS: u8 = 5;

/// Decimal point after the leftmost digit: millivolts read as "n.nnn" volts.
const DECIMAL_POINT: Option<u8> = Some(0);

/// Leading zeros stay visible ("0.512", not " .512").
const BLANK_LEADING_ZEROS: bool = false;

/// Digits lit from the left. Three would round to 10 mV.
const SHOWN_DIGITS: u8 = 4;

/// Creates the clock configuration.
///
/// # Clock Settings
///
/// - **HSI16**: 16 MHz internal oscillator as system clock
/// - **AHB/APB1/APB2**: undivided, so TIM22 runs at 16 MHz
///
/// TIM22's prescaler in [`tick`] assumes this frequency.
fn create_clock_config() -> embassy_stm32::rcc::Config {
    let mut rcc = embassy_stm32::rcc::Config::default();
    rcc.hsi = true;
    rcc.sys = Sysclk::HSI;
    rcc
}

/// Main entry point for the voltmeter firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks (HSI16)
/// 2. Configure the tick timer, stopped
/// 3. Initialize GPIO, the display bus and the converter
/// 4. Show 0 so the display is lit before the first reading
/// 5. Start the tick timer
/// 6. Enter the cooperative scheduler loop
///
/// # Main Loop
///
/// Each pass consumes at most one tick, advances the acquisition state
/// machine by one step and updates the LED, then yields.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_clock_config();

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Voltmeter firmware starting...");

    tick::setup_tick_timer();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Initializing peripherals...");

    let peripherals = Peripherals::new(p).await;

    let format =
        DisplayFormat::new(BRIGHTNESS, DECIMAL_POINT, BLANK_LEADING_ZEROS, SHOWN_DIGITS).unwrap();
    let mut display = Display::new(peripherals.display, format);

    #[cfg(feature = "debug-mode")]
    defmt::info!("Display format: {}", format);

    display.show(0).unwrap();

    let mut scheduler = Scheduler::new(
        &tick::TICK,
        Acquisition::new(peripherals.converter, VREF_MV, AcquisitionConfig::default()),
        display,
        Indicator::new(peripherals.indicator),
    );

    #[cfg(feature = "debug-mode")]
    defmt::info!("Starting {} ms tick, entering scheduler loop...", TICK_PERIOD_MS);

    tick::start_tick_timer();

    loop {
        let polled = scheduler.poll();

        #[cfg(feature = "debug-mode")]
        match &polled {
            Ok(Some(event)) => defmt::info!(
                "{}: {} (missed acks {})",
                scheduler.ticks(),
                event,
                scheduler.display().driver().missed_acks()
            ),
            Ok(None) => {}
            Err(_) => defmt::warn!("Display bus error"),
        }

        // The board's pins are `Infallible`, so `poll` cannot fail here;
        // events are only reported in debug builds.
        #[cfg(not(feature = "debug-mode"))]
        let _ = polled;

        yield_now().await;
    }
}
