//! TM1637 4-digit LED driver over a bit-banged 2-wire bus
//!
//! The TM1637 bus looks like I2C without addressing: bytes go out least
//! significant bit first and each byte is followed by an acknowledgment
//! clock during which the chip pulls DIO low.
//!
//! Both lines are open-drain with pull-ups on the module. "Release" means
//! setting the pin high and letting the pull-up take the line; "drive low"
//! sinks it. DIO is also read back for the acknowledgment, so it must be
//! an open-drain pin that implements `InputPin`.
//!
//! # Update transaction
//!
//! ```text
//! [start] 0x40 [stop]                     data command, auto-increment
//! [start] 0xC0 seg0 seg1 seg2 seg3 [stop] address 0 + segment bytes
//! [start] 0x88|brightness [stop]          display on
//! ```

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::error::Error;

/// Write data to display registers, auto-increment address
pub const CMD_DATA: u8 = 0x40;

/// Set address to cell 0
pub const CMD_ADDRESS: u8 = 0xC0;

/// Display on; low three bits carry brightness
pub const CMD_DISPLAY_ON: u8 = 0x88;

/// Display off
pub const CMD_DISPLAY_OFF: u8 = 0x80;

/// Highest brightness step
pub const MAX_BRIGHTNESS: u8 = 7;

/// Hold time between line transitions in microseconds
pub const HOLD_US: u16 = 100;

/// Bit-banged TM1637 driver
///
/// Every line transition is followed by a blocking [`HOLD_US`] wait from
/// the injected delay, so a full update blocks the caller for a few
/// hundred holds.
pub struct Tm1637<CLK, DIO, D> {
    clk: CLK,
    dio: DIO,
    delay: D,
    /// Bytes the chip did not acknowledge
    missed_acks: u32,
}

impl<CLK, DIO, D, E> Tm1637<CLK, DIO, D>
where
    CLK: OutputPin<Error = E>,
    DIO: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u16>,
{
    /// Create the driver and leave the bus idle (both lines released)
    pub fn new(clk: CLK, dio: DIO, delay: D) -> Result<Self, Error<E>> {
        let mut tm = Self {
            clk,
            dio,
            delay,
            missed_acks: 0,
        };
        tm.clk_release()?;
        tm.dio_release()?;
        Ok(tm)
    }

    /// Number of bytes written without an acknowledgment since creation
    pub fn missed_acks(&self) -> u32 {
        self.missed_acks
    }

    /// Give the pins and delay back
    pub fn release(self) -> (CLK, DIO, D) {
        (self.clk, self.dio, self.delay)
    }

    /// Start condition: DIO falls while CLK is released
    pub fn start(&mut self) -> Result<(), Error<E>> {
        self.dio_low()?;
        self.hold();
        Ok(())
    }

    /// Stop condition: DIO rises while CLK is released, leaving the bus idle
    pub fn stop(&mut self) -> Result<(), Error<E>> {
        self.dio_low()?;
        self.hold();
        self.clk_release()?;
        self.hold();
        self.dio_release()?;
        self.hold();
        Ok(())
    }

    /// Clock out one byte LSB first, then run the acknowledgment clock.
    ///
    /// If the chip does not pull DIO low during the acknowledgment clock the
    /// driver drives it low itself so the bus is in a known state, and counts
    /// the miss. Either way the write is treated as successful.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error<E>> {
        let mut bits = byte;
        for _ in 0..8 {
            self.clk_low()?;
            self.hold();

            if bits & 0x01 != 0 {
                self.dio_release()?;
            } else {
                self.dio_low()?;
            }
            self.hold();

            bits >>= 1;
            self.clk_release()?;
            self.hold();
        }

        // Ack clock: hand DIO to the chip
        self.clk_low()?;
        self.dio_release()?;
        self.hold();

        self.clk_release()?;
        self.hold();
        if self.dio.is_high().map_err(Error::Pin)? {
            self.missed_acks = self.missed_acks.saturating_add(1);
            self.dio_low()?;
        }
        self.hold();

        self.clk_low()?;
        self.hold();

        Ok(())
    }

    /// Send a single command byte in its own start/stop frame
    pub fn command(&mut self, cmd: u8) -> Result<(), Error<E>> {
        self.start()?;
        self.write_byte(cmd)?;
        self.stop()
    }

    /// Load segment bytes into the display registers starting at cell 0.
    ///
    /// Sends the data command frame followed by the address frame that
    /// carries the segment bytes.
    pub fn write_segments(&mut self, segments: &[u8]) -> Result<(), Error<E>> {
        self.command(CMD_DATA)?;

        self.start()?;
        self.write_byte(CMD_ADDRESS)?;
        for &seg in segments {
            self.write_byte(seg)?;
        }
        self.stop()
    }

    /// Switch the display on at `brightness` (masked to 0..=7)
    pub fn display_on(&mut self, brightness: u8) -> Result<(), Error<E>> {
        self.command(CMD_DISPLAY_ON | (brightness & MAX_BRIGHTNESS))
    }

    /// Blank the display without clearing its registers
    pub fn display_off(&mut self) -> Result<(), Error<E>> {
        self.command(CMD_DISPLAY_OFF)
    }

    /// Full refresh: segment registers then display-on, three frames total
    pub fn update(&mut self, segments: &[u8], brightness: u8) -> Result<(), Error<E>> {
        self.write_segments(segments)?;
        self.display_on(brightness)
    }

    fn hold(&mut self) {
        self.delay.delay_us(HOLD_US);
    }

    fn clk_low(&mut self) -> Result<(), Error<E>> {
        self.clk.set_low().map_err(Error::Pin)
    }

    fn clk_release(&mut self) -> Result<(), Error<E>> {
        self.clk.set_high().map_err(Error::Pin)
    }

    fn dio_low(&mut self) -> Result<(), Error<E>> {
        self.dio.set_low().map_err(Error::Pin)
    }

    fn dio_release(&mut self) -> Result<(), Error<E>> {
        self.dio.set_high().map_err(Error::Pin)
    }
}
