//! Non-blocking voltage acquisition
//!
//! A conversion is started every `interval_ticks` ticks and then polled,
//! one state check per scheduler pass, until the converter reports
//! completion.
//!
//! ```text
//!        interval elapsed            start issued
//! Idle ──────────────────► Started ──────────────► Converting
//!  ▲                                                    │
//!  └──────────── conversion complete (or timeout) ──────┘
//! ```

/// Converter operations the state machine needs
///
/// Channel and reference are fixed by the implementation.
pub trait SamplePeripheral {
    /// Begin one conversion; returns immediately
    fn start_conversion(&mut self);

    /// Poll whether the conversion started last has finished
    fn is_conversion_complete(&mut self) -> bool;

    /// Result of the finished conversion, right aligned
    fn read_raw_sample(&mut self) -> u16;
}

/// Width of a raw sample in bits
pub const RAW_BITS: u32 = 10;

/// Largest raw sample
pub const RAW_MAX: u16 = (1 << RAW_BITS) - 1;

/// Mask for the fractional part left after dividing by 2^RAW_BITS
const FRACTION_MASK: u32 = (1 << RAW_BITS) - 1;

/// Half an LSB of the fractional part
const FRACTION_HALF: u32 = 1 << (RAW_BITS - 1);

/// Convert a ratiometric raw code to millivolts.
///
/// `mv = vref * raw / 1024`, rounded up when the discarded fraction is
/// strictly above one half. Bits above [`RAW_BITS`] are ignored.
pub fn raw_to_millivolts(raw: u16, vref_mv: u16) -> u16 {
    let scaled = u32::from(vref_mv) * u32::from(raw & RAW_MAX);
    let mut mv = scaled >> RAW_BITS;
    if scaled & FRACTION_MASK > FRACTION_HALF {
        mv += 1;
    }
    // mv <= vref_mv, so it fits
    mv as u16
}

/// Timing of the acquisition cycle, in scheduler ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AcquisitionConfig {
    /// Ticks between conversion starts
    pub interval_ticks: u8,
    /// Length of the indicator flash started with each conversion
    pub flash_ticks: u8,
    /// Give up on a conversion after this many ticks; `None` waits forever
    pub conversion_timeout_ticks: Option<u8>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            interval_ticks: 10,
            flash_ticks: 5,
            conversion_timeout_ticks: None,
        }
    }
}

/// Where the acquisition cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionState {
    /// Waiting for the next interval boundary
    Idle,
    /// Boundary reached; the conversion is started on the next poll
    Started,
    /// Conversion running, polled for completion
    Converting,
}

/// One completed conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub raw: u16,
    pub millivolts: u16,
}

/// What a poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionEvent {
    /// A conversion was started
    Started,
    /// The running conversion finished
    Completed(Reading),
    /// The running conversion exceeded its timeout and was abandoned
    TimedOut,
}

/// Acquisition state machine
pub struct Acquisition<A> {
    adc: A,
    config: AcquisitionConfig,
    vref_mv: u16,
    state: AcquisitionState,
    /// Ticks since the last interval boundary
    interval: u8,
    /// Ticks spent in `Converting`
    converting: u8,
}

impl<A: SamplePeripheral> Acquisition<A> {
    /// Create an idle state machine.
    ///
    /// # Arguments
    /// - `adc`: converter, already powered and calibrated
    /// - `vref_mv`: full-scale reference in millivolts
    /// - `config`: interval, flash length and timeout
    pub fn new(adc: A, vref_mv: u16, config: AcquisitionConfig) -> Self {
        Self {
            adc,
            config,
            vref_mv,
            state: AcquisitionState::Idle,
            interval: 0,
            converting: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Timing this machine was built with
    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Mutable access to the converter
    pub fn peripheral_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    /// Account for one elapsed tick
    pub fn on_tick(&mut self) {
        self.interval = self.interval.saturating_add(1);
        if self.state == AcquisitionState::Converting {
            self.converting = self.converting.saturating_add(1);
        }
    }

    /// Advance the state machine by at most one step.
    ///
    /// An interval that elapses while a conversion is still running is
    /// dropped; the cadence restarts from that boundary.
    pub fn poll(&mut self) -> Option<AcquisitionEvent> {
        if self.interval >= self.config.interval_ticks {
            self.interval = 0;
            if self.state == AcquisitionState::Idle {
                self.state = AcquisitionState::Started;
            }
        }

        match self.state {
            AcquisitionState::Idle => None,
            AcquisitionState::Started => {
                self.adc.start_conversion();
                self.converting = 0;
                self.state = AcquisitionState::Converting;
                Some(AcquisitionEvent::Started)
            }
            AcquisitionState::Converting => {
                if self.adc.is_conversion_complete() {
                    let raw = self.adc.read_raw_sample();
                    self.state = AcquisitionState::Idle;
                    Some(AcquisitionEvent::Completed(Reading {
                        raw,
                        millivolts: raw_to_millivolts(raw, self.vref_mv),
                    }))
                } else {
                    match self.config.conversion_timeout_ticks {
                        Some(limit) if self.converting > limit => {
                            self.state = AcquisitionState::Idle;
                            Some(AcquisitionEvent::TimedOut)
                        }
                        _ => None,
                    }
                }
            }
        }
    }
}
