//! Cooperative scheduler pass and the tick flag shared with the interrupt
//!
//! The tick interrupt only raises a [`TickFlag`]. Everything else lives in
//! [`Scheduler`] and is touched from the main loop alone.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use portable_atomic::{AtomicBool, Ordering};

use crate::acquisition::{Acquisition, AcquisitionEvent, SamplePeripheral};
use crate::display::Display;
use crate::error::Error;
use crate::indicator::Indicator;

/// Single-slot "period elapsed" flag
///
/// [`raise`](Self::raise) is the only operation the interrupt performs
/// (release store). [`take`](Self::take) reads and clears in one atomic swap
/// (acquire-release), so a tick raised between the read and the clear
/// cannot be lost. Ticks raised while the flag is already set coalesce.
pub struct TickFlag {
    raised: AtomicBool,
}

impl TickFlag {
    /// Create a lowered flag, usable in a `static`
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Mark one period as elapsed
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Consume the flag, returning whether a period had elapsed
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    /// Drop any pending tick
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the acquisition, display and indicator state for the main loop
pub struct Scheduler<'a, A, CLK, DIO, D, LED> {
    tick: &'a TickFlag,
    acquisition: Acquisition<A>,
    display: Display<CLK, DIO, D>,
    indicator: Indicator<LED>,
    /// Ticks consumed since creation
    ticks: u32,
}

impl<'a, A, CLK, DIO, D, LED, E> Scheduler<'a, A, CLK, DIO, D, LED>
where
    A: SamplePeripheral,
    CLK: OutputPin<Error = E>,
    DIO: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u16>,
    LED: OutputPin<Error = E>,
{
    /// Assemble the loop state.
    ///
    /// # Arguments
    ///
    /// * `tick` - Flag raised by the tick interrupt, usually a `static`
    /// * `acquisition` - Converter state machine, starting in `Idle`
    /// * `display` - Display that renders each completed reading
    /// * `indicator` - Status LED flashed when a conversion starts
    pub fn new(
        tick: &'a TickFlag,
        acquisition: Acquisition<A>,
        display: Display<CLK, DIO, D>,
        indicator: Indicator<LED>,
    ) -> Self {
        Self {
            tick,
            acquisition,
            display,
            indicator,
            ticks: 0,
        }
    }

    /// Ticks consumed since creation, wrapping
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Acquisition state machine
    pub fn acquisition(&self) -> &Acquisition<A> {
        &self.acquisition
    }

    /// Mutable access to the acquisition state machine
    pub fn acquisition_mut(&mut self) -> &mut Acquisition<A> {
        &mut self.acquisition
    }

    /// Display front-end
    pub fn display(&self) -> &Display<CLK, DIO, D> {
        &self.display
    }

    /// Mutable display front-end, e.g. to change its format at runtime
    pub fn display_mut(&mut self) -> &mut Display<CLK, DIO, D> {
        &mut self.display
    }

    /// Status indicator
    pub fn indicator(&self) -> &Indicator<LED> {
        &self.indicator
    }

    /// One pass of the cooperative loop.
    ///
    /// Consumes a pending tick, advances the acquisition by one step and
    /// refreshes the indicator. A completed conversion is rendered before
    /// returning, which blocks for the whole display transaction.
    pub fn poll(&mut self) -> Result<Option<AcquisitionEvent>, Error<E>> {
        if self.tick.take() {
            self.ticks = self.ticks.wrapping_add(1);
            self.acquisition.on_tick();
            self.indicator.on_tick();
        }

        let event = self.acquisition.poll();
        match event {
            Some(AcquisitionEvent::Started) => {
                self.indicator.start_flash(self.acquisition.config().flash_ticks);
            }
            Some(AcquisitionEvent::Completed(reading)) => {
                self.display.show(u32::from(reading.millivolts))?;
            }
            Some(AcquisitionEvent::TimedOut) | None => {}
        }

        self.indicator.poll().map_err(Error::Pin)?;
        Ok(event)
    }
}
