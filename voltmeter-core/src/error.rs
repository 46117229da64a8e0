//! Error types shared by the display path

/// Reasons a [`DisplayFormat`](crate::display::DisplayFormat) is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Brightness must be 0..=7
    BrightnessOutOfRange(u8),
    /// Shown digits must be 1..=DIGITS
    ShownDigitsOutOfRange(u8),
    /// Decimal point cell must be below DIGITS
    DecimalPointOutOfRange(u8),
}

/// Errors surfaced by the display and indicator paths
///
/// `E` is the GPIO error type of the board's pins. A missing TM1637
/// acknowledgment is not an error; see [`Tm1637::missed_acks`](crate::tm1637::Tm1637::missed_acks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A line-level pin operation failed
    Pin(E),
    /// Display configuration was rejected
    InvalidFormat(FormatError),
}

impl<E> From<FormatError> for Error<E> {
    fn from(e: FormatError) -> Self {
        Error::InvalidFormat(e)
    }
}
