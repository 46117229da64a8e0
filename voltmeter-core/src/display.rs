//! Segment composition and the numeric display front-end
//!
//! [`compose`] turns digit cells into TM1637 segment bytes under a
//! [`DisplayFormat`]; [`Display`] runs the whole value → segments → bus
//! path for one refresh.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::digits::{DIGITS, DigitCells, extract_digits, round_to_displayed_width};
use crate::error::{Error, FormatError};
use crate::tm1637::{MAX_BRIGHTNESS, Tm1637};

/// Segment patterns for 0..=9, bit 0 = segment a .. bit 6 = segment g
pub const SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

/// All segments off
pub const BLANK: u8 = 0x00;

/// Decimal point bit of a segment byte
pub const DECIMAL_POINT: u8 = 0x80;

/// How digit cells are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFormat {
    brightness: u8,
    decimal_point: Option<u8>,
    blank_leading_zeros: bool,
    shown_digits: u8,
}

impl Default for DisplayFormat {
    /// Mid brightness, no decimal point, no blanking, all digits shown
    fn default() -> Self {
        Self {
            brightness: 5,
            decimal_point: None,
            blank_leading_zeros: false,
            shown_digits: DIGITS as u8,
        }
    }
}

impl DisplayFormat {
    /// Build a validated format
    ///
    /// # Arguments
    /// - `brightness`: 0..=7
    /// - `decimal_point`: cell index (0 = leftmost) that lights its point
    /// - `blank_leading_zeros`: hide zeros left of the first non-zero cell
    /// - `shown_digits`: cells lit from the left, 1..=DIGITS; fewer than
    ///   DIGITS also rounds away the rightmost digit
    pub fn new(
        brightness: u8,
        decimal_point: Option<u8>,
        blank_leading_zeros: bool,
        shown_digits: u8,
    ) -> Result<Self, FormatError> {
        let mut format = Self::default();
        format.set_brightness(brightness)?;
        format.set_decimal_point(decimal_point)?;
        format.set_shown_digits(shown_digits)?;
        format.blank_leading_zeros = blank_leading_zeros;
        Ok(format)
    }

    /// Brightness level sent with the display-on command
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Cell that lights its decimal point, if any
    pub fn decimal_point(&self) -> Option<u8> {
        self.decimal_point
    }

    /// Whether leading zeros are hidden
    pub fn blank_leading_zeros(&self) -> bool {
        self.blank_leading_zeros
    }

    /// Cells lit from the left
    pub fn shown_digits(&self) -> u8 {
        self.shown_digits
    }

    /// Set the brightness.
    ///
    /// # Arguments
    /// - `brightness`: 0..=7, anything above is rejected and leaves the
    ///   format unchanged
    pub fn set_brightness(&mut self, brightness: u8) -> Result<(), FormatError> {
        if brightness > MAX_BRIGHTNESS {
            return Err(FormatError::BrightnessOutOfRange(brightness));
        }
        self.brightness = brightness;
        Ok(())
    }

    /// Move or clear the decimal point.
    ///
    /// # Arguments
    /// - `decimal_point`: cell index below DIGITS, or `None` for no point
    pub fn set_decimal_point(&mut self, decimal_point: Option<u8>) -> Result<(), FormatError> {
        if let Some(pos) = decimal_point {
            if usize::from(pos) >= DIGITS {
                return Err(FormatError::DecimalPointOutOfRange(pos));
            }
        }
        self.decimal_point = decimal_point;
        Ok(())
    }

    /// Hide or show zeros left of the first non-zero cell
    pub fn set_blank_leading_zeros(&mut self, blank: bool) {
        self.blank_leading_zeros = blank;
    }

    /// Set how many cells are lit.
    ///
    /// # Arguments
    /// - `shown`: 1..=DIGITS; fewer than DIGITS enables rounding
    pub fn set_shown_digits(&mut self, shown: u8) -> Result<(), FormatError> {
        if shown == 0 || usize::from(shown) > DIGITS {
            return Err(FormatError::ShownDigitsOutOfRange(shown));
        }
        self.shown_digits = shown;
        Ok(())
    }
}

/// Map digit cells to segment bytes, left to right.
///
/// Leading-zero blanking stops at the first non-zero cell and never touches
/// the rightmost cell. The decimal point is OR-ed into its cell. Cells at or
/// beyond `shown_digits` are blanked last, overriding both.
pub fn compose(cells: &DigitCells, format: &DisplayFormat) -> [u8; DIGITS] {
    let mut out = [BLANK; DIGITS];
    let mut blanking = format.blank_leading_zeros;

    for (i, (&digit, seg)) in cells.iter().zip(out.iter_mut()).enumerate() {
        let mut pattern = SEGMENTS[usize::from(digit % 10)];

        if digit != 0 {
            blanking = false;
        } else if blanking && i < DIGITS - 1 {
            pattern = BLANK;
        }

        if format.decimal_point == Some(i as u8) {
            pattern |= DECIMAL_POINT;
        }

        if i >= usize::from(format.shown_digits) {
            pattern = BLANK;
        }

        *seg = pattern;
    }

    out
}

/// Digits for `value` after the format's rounding has been applied
pub fn digits_for(value: u32, format: &DisplayFormat) -> DigitCells {
    let mut cells = extract_digits::<DIGITS>(value);
    round_to_displayed_width(&mut cells, usize::from(format.shown_digits));
    cells
}

/// Numeric front-end for a TM1637 module
pub struct Display<CLK, DIO, D> {
    driver: Tm1637<CLK, DIO, D>,
    format: DisplayFormat,
    cells: DigitCells,
}

impl<CLK, DIO, D, E> Display<CLK, DIO, D>
where
    CLK: OutputPin<Error = E>,
    DIO: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u16>,
{
    /// Wrap a driver. Nothing is sent until the first [`show`](Self::show).
    ///
    /// # Arguments
    /// - `driver`: TM1637 bus driver
    /// - `format`: initial rendering options
    pub fn new(driver: Tm1637<CLK, DIO, D>, format: DisplayFormat) -> Self {
        Self {
            driver,
            format,
            cells: [0; DIGITS],
        }
    }

    /// Current rendering options
    pub fn format(&self) -> &DisplayFormat {
        &self.format
    }

    /// Change the format; takes effect on the next [`show`](Self::show)
    pub fn set_format(&mut self, format: DisplayFormat) {
        self.format = format;
    }

    /// Cells from the last refresh
    pub fn cells(&self) -> &DigitCells {
        &self.cells
    }

    /// Underlying bus driver, e.g. for its missed-ack count
    pub fn driver(&self) -> &Tm1637<CLK, DIO, D> {
        &self.driver
    }

    /// Render `value` and push it to the module.
    ///
    /// Blocks for the duration of the three bus frames.
    pub fn show(&mut self, value: u32) -> Result<(), Error<E>> {
        self.cells = digits_for(value, &self.format);
        let segments = compose(&self.cells, &self.format);
        self.driver.update(&segments, self.format.brightness)
    }

    /// Turn the module off; registers keep their contents
    pub fn off(&mut self) -> Result<(), Error<E>> {
        self.driver.display_off()
    }

    /// Turn the module back on at the configured brightness
    pub fn on(&mut self) -> Result<(), Error<E>> {
        self.driver.display_on(self.format.brightness)
    }
}
