#![doc = include_str!("../README.md")]
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod fmt; // <-- must be first module!

mod reg;

use core::fmt::Debug;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// I²C bus error
    I2c(E),
    /// WHO_AM_I returned something other than the expected ID
    UnexpectedDevice(u8),
    /// A polling loop ran out of attempts
    Timeout,
    /// Calibration input outside the range the register can hold
    InvalidArgument,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2c(error)
    }
}

impl<E: Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C bus error: {e:?}"),
            Error::UnexpectedDevice(id) => write!(f, "unexpected device id {id:#04x}"),
            Error::Timeout => f.write_str("timed out waiting for the sensor"),
            Error::InvalidArgument => f.write_str("argument out of range"),
        }
    }
}

pub mod device_impl;

/// Pressure or Altitude Mode
///
/// Mirrors the ALT bit of CTRL_REG1. The driver only switches it when a
/// reading needs the other mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensingMode {
    Barometer,
    Altimeter,
}

/// Oversample ratio, stored in the OS field of CTRL_REG1
///
/// Higher ratios trade conversion time (6 ms at `Os1` up to 512 ms at
/// `Os128`) for lower noise.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversample {
    Os1 = 0,
    Os2 = 1,
    Os4 = 2,
    Os8 = 3,
    Os16 = 4,
    Os32 = 5,
    Os64 = 6,
    Os128 = 7,
}

impl Oversample {
    pub(crate) fn bits(self) -> u8 {
        (self as u8) << 3
    }
}

/// Driver settings applied at construction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Oversample ratio written to CTRL_REG1 at init.
    pub oversample: Oversample,
    /// Delay between two polls of a status bit.
    pub poll_interval_ms: u32,
    /// How many polls before giving up with [`Error::Timeout`].
    pub max_poll_attempts: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oversample: Oversample::Os128,
            poll_interval_ms: 10,
            max_poll_attempts: 100,
        }
    }
}

/// Temperature in degrees Celsius
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature(pub f32);

/// Barometric pressure in pascals
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pressure(pub f32);

/// Altitude in meters
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Altitude(pub f32);

pub use device_impl::MPL3115A2;

#[cfg(all(feature = "blocking", feature = "async"))]
compile_error!("Cannot enable both blocking and async features");
