//! Board-agnostic logic for the TM1637 voltmeter firmware.
//!
//! Everything here is written against `embedded-hal` 0.2 traits so it can be
//! exercised on the host with mock pins:
//!
//! - [`digits`] - decimal digit extraction and single-step rounding
//! - [`display`] - segment composition and the display front-end
//! - [`tm1637`] - bit-banged TM1637 2-wire protocol driver
//! - [`acquisition`] - non-blocking sample state machine
//! - [`indicator`] - timed status LED flash
//! - [`scheduler`] - tick flag shared with the interrupt and the cooperative pass
//!
//! # Data flow
//!
//! ```text
//! tick ISR ──► TickFlag ──► Scheduler::poll
//!                              │
//!               ┌──────────────┼────────────────┐
//!               ▼              ▼                ▼
//!         Acquisition      Indicator     (on completion)
//!               │                               │
//!               └──► millivolts ──► digits ──► display ──► tm1637
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod acquisition;
pub mod digits;
pub mod display;
pub mod error;
pub mod indicator;
pub mod scheduler;
pub mod tm1637;

#[cfg(test)]
mod mock;

pub use acquisition::{Acquisition, AcquisitionConfig, AcquisitionEvent, Reading, SamplePeripheral};
pub use digits::{DIGITS, DigitCells};
pub use display::{Display, DisplayFormat};
pub use error::{Error, FormatError};
pub use indicator::Indicator;
pub use scheduler::{Scheduler, TickFlag};
pub use tm1637::Tm1637;
