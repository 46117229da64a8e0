//! Timed status LED flash
//!
//! The flash is measured in scheduler ticks and driven from the main loop,
//! so it never blocks. While a display refresh is on the bus the flash
//! simply runs long.

use embedded_hal::digital::v2::OutputPin;

/// Status indicator on a single output pin (high = lit)
pub struct Indicator<P> {
    pin: P,
    /// Ticks since the current flash began
    elapsed: u8,
    /// Length of the current flash, `None` when idle
    on_ticks: Option<u8>,
}

impl<P: OutputPin> Indicator<P> {
    /// Wrap `pin`; the pin is not driven until the first flash.
    ///
    /// # Arguments
    /// - `pin`: output, high = lit
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            elapsed: 0,
            on_ticks: None,
        }
    }

    /// The driven pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Whether a flash is in progress
    pub fn is_active(&self) -> bool {
        self.on_ticks.is_some()
    }

    /// Begin a flash lasting `ticks`, restarting any flash in progress
    pub fn start_flash(&mut self, ticks: u8) {
        self.elapsed = 0;
        self.on_ticks = Some(ticks);
    }

    /// Account for one elapsed tick
    pub fn on_tick(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    /// Drive the pin for the current flash, ending it once `elapsed`
    /// passes the flash length.
    pub fn poll(&mut self) -> Result<(), P::Error> {
        if let Some(on_ticks) = self.on_ticks {
            if self.elapsed <= on_ticks {
                self.pin.set_high()?;
            } else {
                self.pin.set_low()?;
                self.on_ticks = None;
            }
        }
        Ok(())
    }
}
