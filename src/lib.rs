//!
//! A platform-agnostic driver for the INA219 current and power monitor. Built using embedded-hal.
//!
//! The driver turns a shunt resistance and an expected maximum current into the device's
//! calibration, and converts register reads back into volts, milliamps and milliwatts. With
//! automatic gain the shunt range is raised on the fly whenever the device reports a current
//! overflow, so readings keep working across a wide current range without reconfiguring.
//!
//! ```ignore
//! use ina219::{Configuration, Ina219, ShuntSpec};
//!
//! let shunt = ShuntSpec::new(0.1, Some(0.4))?;
//! let mut ina = Ina219::new_i2c(i2c, delay, shunt);
//! ina.configure(Configuration::default())?;
//!
//! let milliamps = ina.current()?;
//! ```
//!

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod auto_gain;
pub mod calibration;
pub mod config;
pub mod driver;
pub mod error;
pub mod interface;
pub mod register;

pub use calibration::Calibration;
pub use config::{AdcMode, Configuration, Gain, GainLevel, OperatingMode, ShuntSpec, VoltageRange};
pub use driver::*;
pub use error::{ConfigError, DeviceRangeError, Error};
pub use interface::{I2cInterface, RegisterBus, DEFAULT_ADDRESS};
pub use register::{DeviceConfiguration, Register};
