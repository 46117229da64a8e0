//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and peripheral initialization
//! for the voltmeter board.
//!
//! # Pin Assignments
//!
//! ## Analog Input
//! - **PA0**: ADC_IN0 - Measured voltage, 0 V to VDDA (3.3 V), not 5 V tolerant
//!
//! ## TM1637 Display Module (open-drain, pulled up on the module)
//! - **PA9**: CLK
//! - **PA10**: DIO - Bidirectional, read back for the acknowledgment bit
//!
//! ## Status
//! - **PB1**: LED - Active-high, flashes when a conversion starts
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use embassy_stm32::adc::{self, Adc};
use embassy_stm32::bind_interrupts;
use embassy_stm32::gpio::{Level, Output, OutputOpenDrain, Speed};
use embassy_stm32::peripherals::ADC1;
use embassy_time::Delay;
use voltmeter_core::Tm1637;

use crate::adc::Converter;

bind_interrupts!(struct Irqs {
    ADC1_COMP => adc::InterruptHandler<ADC1>;
});

/// TM1637 driver on the board's pins
pub type DisplayDriver = Tm1637<OutputOpenDrain<'static>, OutputOpenDrain<'static>, Delay>;

/// Top-level peripheral container for the voltmeter.
pub struct Peripherals {
    /// TM1637 bus, both lines released
    pub display: DisplayDriver,
    /// Status LED, initially off
    pub indicator: Output<'static>,
    /// Analog input, powered and calibrated
    pub converter: Converter,
}

impl Peripherals {
    /// Initializes all peripherals from STM32 peripheral singleton.
    ///
    /// # Initial GPIO States
    ///
    /// - PA9 (CLK): released (high via pull-up)
    /// - PA10 (DIO): released (high via pull-up)
    /// - PB1 (LED): Low
    pub async fn new(p: embassy_stm32::Peripherals) -> Self {
        let clk = OutputOpenDrain::new(p.PA9, Level::High, Speed::Low);
        let dio = OutputOpenDrain::new(p.PA10, Level::High, Speed::Low);

        Self {
            display: Tm1637::new(clk, dio, Delay).unwrap(),
            indicator: Output::new(p.PB1, Level::Low, Speed::Low),
            converter: Converter::new(Adc::new(p.ADC1, Irqs), p.PA0).await,
        }
    }
}
