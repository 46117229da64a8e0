//! Analog input on ADC_IN0 (PA0).
//!
//! embassy's driver powers up and calibrates the converter; conversions
//! are then started and polled directly on the registers so the main loop
//! never waits on one.

use embassy_stm32::adc::{Adc, AdcChannel, Resolution};
use embassy_stm32::pac;
use embassy_stm32::peripherals::ADC1;
use voltmeter_core::SamplePeripheral;

/// Free-running single-channel converter
///
/// Holds the embassy driver so the ADC stays enabled; the peripheral is
/// left on permanently.
pub struct Converter {
    _adc: Adc<'static, ADC1>,
}

impl Converter {
    /// Sets 10-bit resolution and selects `channel`.
    ///
    /// One managed read puts the pin into analog mode and leaves its channel
    /// selected for the register-level conversions that follow.
    pub async fn new(mut adc: Adc<'static, ADC1>, mut channel: impl AdcChannel<ADC1>) -> Self {
        adc.set_resolution(Resolution::BITS10);
        let _ = adc.read(&mut channel).await;
        Self { _adc: adc }
    }
}

impl SamplePeripheral for Converter {
    fn start_conversion(&mut self) {
        pac::ADC1.cr().modify(|w| w.set_adstart(true));
    }

    fn is_conversion_complete(&mut self) -> bool {
        pac::ADC1.isr().read().eoc()
    }

    fn read_raw_sample(&mut self) -> u16 {
        // Reading DR clears EOC
        pac::ADC1.dr().read().data()
    }
}
