//! PMSA003I particulate sensor: 32-byte I²C frame codec and driver.
//!
//! Frame layout (all words big-endian):
//!
//! | bytes  | content                                   |
//! |--------|-------------------------------------------|
//! | 0..2   | magic `0x42 0x4d`                         |
//! | 2..4   | frame length, always 28                   |
//! | 4..30  | 13 data words                             |
//! | 30..32 | checksum: sum of bytes 0..30              |
//!
//! Data words 0..3 are PM1.0/PM2.5/PM10 "standard particle" concentrations,
//! 3..6 the same under atmospheric environment, 6..12 particle counts per
//! 0.1 L by size bin, word 12 is reserved.

use pmon_traits::PmReading;
use thiserror::Error;

pub const FRAME_LEN: usize = 32;
pub const MAGIC: [u8; 2] = [0x42, 0x4d];
pub const DATA_LEN: u16 = 28;
/// Default 7-bit I²C address.
pub const DEFAULT_ADDRESS: u16 = 0x12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("short frame: {0} bytes")]
    Short(usize),
    #[error("bad magic {0:#04x} {1:#04x}")]
    Magic(u8, u8),
    #[error("bad frame length {0}")]
    Length(u16),
    #[error("checksum mismatch: frame says {expected:#06x}, computed {computed:#06x}")]
    Checksum { expected: u16, computed: u16 },
}

/// Decoded PMSA003I data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PmFrame {
    pub pm10_standard: u16,
    pub pm25_standard: u16,
    pub pm100_standard: u16,
    pub pm10_env: u16,
    pub pm25_env: u16,
    pub pm100_env: u16,
    /// Counts per 0.1 L for >0.3, >0.5, >1.0, >2.5, >5.0, >10 µm.
    pub particles: [u16; 6],
}

impl PmFrame {
    pub fn reading(&self) -> PmReading {
        PmReading {
            pm10_standard: self.pm10_standard,
            pm25_standard: self.pm25_standard,
            pm100_standard: self.pm100_standard,
        }
    }

    fn words(&self) -> [u16; 13] {
        let p = self.particles;
        [
            self.pm10_standard,
            self.pm25_standard,
            self.pm100_standard,
            self.pm10_env,
            self.pm25_env,
            self.pm100_env,
            p[0],
            p[1],
            p[2],
            p[3],
            p[4],
            p[5],
            0,
        ]
    }
}

fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

fn word(buf: &[u8], i: usize) -> u16 {
    u16::from_be_bytes([buf[i], buf[i + 1]])
}

/// Validate and decode one frame. Extra trailing bytes are ignored.
pub fn decode_frame(buf: &[u8]) -> Result<PmFrame, FrameError> {
    if buf.len() < FRAME_LEN {
        return Err(FrameError::Short(buf.len()));
    }
    if buf[..2] != MAGIC {
        return Err(FrameError::Magic(buf[0], buf[1]));
    }
    let len = word(buf, 2);
    if len != DATA_LEN {
        return Err(FrameError::Length(len));
    }
    let expected = word(buf, 30);
    let computed = checksum(&buf[..30]);
    if expected != computed {
        return Err(FrameError::Checksum { expected, computed });
    }
    let w = |n: usize| word(buf, 4 + 2 * n);
    Ok(PmFrame {
        pm10_standard: w(0),
        pm25_standard: w(1),
        pm100_standard: w(2),
        pm10_env: w(3),
        pm25_env: w(4),
        pm100_env: w(5),
        particles: [w(6), w(7), w(8), w(9), w(10), w(11)],
    })
}

/// Build the wire frame for `frame`; used by the simulated sensor.
pub fn encode_frame(frame: &PmFrame) -> [u8; FRAME_LEN] {
    let mut buf = [0u8; FRAME_LEN];
    buf[..2].copy_from_slice(&MAGIC);
    buf[2..4].copy_from_slice(&DATA_LEN.to_be_bytes());
    for (i, w) in frame.words().iter().enumerate() {
        buf[4 + 2 * i..6 + 2 * i].copy_from_slice(&w.to_be_bytes());
    }
    let sum = checksum(&buf[..30]);
    buf[30..].copy_from_slice(&sum.to_be_bytes());
    buf
}

#[cfg(feature = "hardware")]
pub use driver::{Pmsa003iBus, Pmsa003iSensor};

#[cfg(feature = "hardware")]
mod driver {
    use std::time::Duration;

    use pmon_traits::{BoxError, ParticleSensor, PmReading, SensorBus};
    use rppal::i2c::I2c;

    use super::{FRAME_LEN, MAGIC, decode_frame};
    use crate::error::HwError;
    use crate::util::wait_until_ready;

    /// I²C bus handle; `initialize` opens the bus and waits for a first frame.
    pub struct Pmsa003iBus {
        bus: u8,
        address: u16,
        warmup: Duration,
    }

    impl Pmsa003iBus {
        pub fn new(bus: u8, address: u16) -> Self {
            Self {
                bus,
                address,
                warmup: Duration::from_secs(3),
            }
        }
    }

    fn read_raw(i2c: &mut I2c) -> Result<[u8; FRAME_LEN], HwError> {
        let mut buf = [0u8; FRAME_LEN];
        i2c.read(&mut buf)
            .map_err(|e| HwError::I2c(e.to_string()))?;
        Ok(buf)
    }

    impl SensorBus for Pmsa003iBus {
        fn initialize(&mut self) -> Result<Box<dyn ParticleSensor>, BoxError> {
            let mut i2c = I2c::with_bus(self.bus).map_err(|e| HwError::I2c(e.to_string()))?;
            i2c.set_slave_address(self.address)
                .map_err(|e| HwError::I2c(e.to_string()))?;
            // The sensor NACKs or returns zeros while its fan spins up.
            wait_until_ready(
                || read_raw(&mut i2c).is_ok_and(|b| b[..2] == MAGIC),
                self.warmup,
                Duration::from_millis(100),
            )?;
            tracing::info!(bus = self.bus, address = self.address, "pmsa003i ready");
            Ok(Box::new(Pmsa003iSensor { i2c }))
        }
    }

    pub struct Pmsa003iSensor {
        i2c: I2c,
    }

    impl ParticleSensor for Pmsa003iSensor {
        fn read(&mut self) -> Result<PmReading, BoxError> {
            let buf = read_raw(&mut self.i2c)?;
            let frame = decode_frame(&buf).map_err(HwError::from)?;
            tracing::trace!(?frame, "pmsa003i frame");
            Ok(frame.reading())
        }
    }
}
