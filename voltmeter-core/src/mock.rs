//! Host-side stand-ins for the board peripherals

use core::cell::RefCell;
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::acquisition::SamplePeripheral;

/// What a logic analyser on CLK/DIO would decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// DIO fell while CLK was high
    Start,
    /// DIO rose while CLK was high
    Stop,
    /// DIO level sampled on a CLK rising edge
    Bit(bool),
}

/// Open-drain CLK/DIO pair with an optional acknowledging receiver
pub struct BusState {
    clk_high: bool,
    dio_released: bool,
    receiver_acks: bool,
    edges: usize,
    pub events: Vec<BusEvent>,
}

impl BusState {
    /// The receiver drives DIO low during every ninth clock of a frame
    fn receiver_pulling_low(&self) -> bool {
        self.receiver_acks && self.clk_high && self.edges > 0 && self.edges % 9 == 0
    }

    pub fn line_high(&self) -> bool {
        self.dio_released && !self.receiver_pulling_low()
    }

    pub fn clk_high(&self) -> bool {
        self.clk_high
    }

    fn set_clk(&mut self, high: bool) {
        if high && !self.clk_high {
            self.clk_high = true;
            self.edges += 1;
            let level = self.line_high();
            self.events.push(BusEvent::Bit(level));
        } else {
            self.clk_high = high;
        }
    }

    fn set_dio(&mut self, released: bool) {
        let before = self.line_high();
        self.dio_released = released;
        let after = self.line_high();
        if self.clk_high && before && !after {
            self.edges = 0;
            self.events.push(BusEvent::Start);
        } else if self.clk_high && !before && after {
            self.events.push(BusEvent::Stop);
        }
    }

    /// Group the recorded events into framed `(byte, acked)` lists
    ///
    /// Only complete start..stop frames are returned. The clock edge a stop
    /// condition raises is not part of any byte.
    pub fn frames(&self) -> Vec<Vec<(u8, bool)>> {
        let mut frames = Vec::new();
        let mut bits: Option<Vec<bool>> = None;
        for event in &self.events {
            match event {
                BusEvent::Start => bits = Some(Vec::new()),
                BusEvent::Bit(level) => {
                    if let Some(bits) = bits.as_mut() {
                        bits.push(*level);
                    }
                }
                BusEvent::Stop => {
                    if let Some(bits) = bits.take() {
                        let frame = bits
                            .chunks_exact(9)
                            .map(|chunk| {
                                let byte = chunk[..8]
                                    .iter()
                                    .enumerate()
                                    .fold(0u8, |acc, (i, &b)| acc | (u8::from(b) << i));
                                (byte, !chunk[8])
                            })
                            .collect();
                        frames.push(frame);
                    }
                }
            }
        }
        frames
    }

    /// Bytes of each frame, acknowledgment dropped
    pub fn frame_bytes(&self) -> Vec<Vec<u8>> {
        self.frames()
            .into_iter()
            .map(|f| f.into_iter().map(|(b, _)| b).collect())
            .collect()
    }
}

pub type SharedBus = Rc<RefCell<BusState>>;

pub struct MockClk(SharedBus);
pub struct MockDio(SharedBus);

/// Build an idle bus (both lines pulled up) and its two pins
pub fn bus(receiver_acks: bool) -> (MockClk, MockDio, SharedBus) {
    let state = Rc::new(RefCell::new(BusState {
        clk_high: true,
        dio_released: true,
        receiver_acks,
        edges: 0,
        events: Vec::new(),
    }));
    (MockClk(state.clone()), MockDio(state.clone()), state)
}

impl OutputPin for MockClk {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().set_clk(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().set_clk(true);
        Ok(())
    }
}

impl OutputPin for MockDio {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().set_dio(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().set_dio(true);
        Ok(())
    }
}

impl InputPin for MockDio {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.0.borrow().line_high())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.0.borrow().line_high())
    }
}

/// Delay that records requested hold times instead of waiting
#[derive(Default)]
pub struct MockDelay {
    pub calls: usize,
    pub total_us: u32,
}

impl DelayUs<u16> for MockDelay {
    fn delay_us(&mut self, us: u16) {
        self.calls += 1;
        self.total_us += u32::from(us);
    }
}

/// Status LED
#[derive(Default)]
pub struct MockLed {
    pub on: bool,
    pub writes: usize,
}

impl OutputPin for MockLed {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.on = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.on = true;
        self.writes += 1;
        Ok(())
    }
}

/// Converter whose completion is scripted by the test
#[derive(Default)]
pub struct MockAdc {
    pub starts: usize,
    pub reads: usize,
    pub busy: bool,
    /// Never finishes a conversion
    pub stuck: bool,
    pub raw: u16,
}

impl MockAdc {
    pub fn with_raw(raw: u16) -> Self {
        Self {
            raw,
            ..Self::default()
        }
    }

    /// Let a conversion that is in flight complete
    pub fn finish(&mut self) {
        self.busy = false;
    }
}

impl SamplePeripheral for MockAdc {
    fn start_conversion(&mut self) {
        self.starts += 1;
        self.busy = true;
    }

    fn is_conversion_complete(&mut self) -> bool {
        !self.busy && !self.stuck
    }

    fn read_raw_sample(&mut self) -> u16 {
        self.reads += 1;
        self.raw
    }
}
