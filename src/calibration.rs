//! Derivation of the current and power scale factors and the calibration register.

use crate::config::{Gain, GainLevel, ShuntSpec};
use crate::error::ConfigError;
use crate::register::MAX_CALIBRATION_VALUE;
use log::info;

/// Fixed scaling constant from the calibration equation in the datasheet.
pub const CALIBRATION_FACTOR: f64 = 0.04096;

/// Divisor turning a maximum current into a current LSB.
///
/// The datasheet uses 32767; 32800 keeps the largest expected current just below
/// the top of the 15-bit current register so the overflow flag always trips first.
pub const CURRENT_LSB_FACTOR: f64 = 32800.0;

/// Ratio between the power and current LSB, fixed by the device.
pub const POWER_LSB_RATIO: f64 = 20.0;

const MAX_CURRENT_STEPS: f64 = 32767.0;

/// Scale factors for one gain level, and the register value that programs them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Calibration {
    /// Amps per bit of the current register
    pub current_lsb: f64,
    /// Watts per bit of the power register
    pub power_lsb: f64,
    pub calibration_register: u16,
    /// Largest current the shunt can present at this gain
    pub max_possible_amps: f64,
}

impl Calibration {
    /// Whether the device can still flag an overflow with this calibration.
    ///
    /// If the current register can represent `max_possible_amps` the shunt ADC saturates first and
    /// the overflow bit never sets.
    pub fn overflow_operative(&self) -> bool {
        self.current_lsb * MAX_CURRENT_STEPS < self.max_possible_amps
    }
}

/// The smallest current LSB the calibration register can represent for this shunt.
pub fn min_device_current_lsb(shunt_ohms: f64) -> f64 {
    CALIBRATION_FACTOR / (shunt_ohms * MAX_CALIBRATION_VALUE as f64)
}

/// Resolves the starting gain and its calibration.
///
/// A fixed gain is used as is. Automatic gain picks the smallest level that covers the
/// expected current, or starts at 40mV when no expected current was given.
pub fn resolve(
    shunt: &ShuntSpec,
    requested: Gain,
) -> Result<(Calibration, GainLevel), ConfigError> {
    let gain = match (requested, shunt.max_expected_amps()) {
        (Gain::Fixed(level), _) => level,
        (Gain::Auto, Some(amps)) => determine_gain(shunt.shunt_ohms(), amps)?,
        (Gain::Auto, None) => GainLevel::Gain40mV,
    };
    info!("gain set to {:.2}V", gain.full_scale_volts());

    let calibration = calibrate(shunt.shunt_ohms(), gain, shunt.max_expected_amps())?;
    Ok((calibration, gain))
}

/// Smallest gain whose full scale shunt voltage exceeds `max_expected_amps` through the shunt.
pub fn determine_gain(shunt_ohms: f64, max_expected_amps: f64) -> Result<GainLevel, ConfigError> {
    let shunt_volts = max_expected_amps * shunt_ohms;
    GainLevel::ALL
        .into_iter()
        .find(|level| level.full_scale_volts() > shunt_volts)
        .ok_or(ConfigError::ExpectedAmpsOutOfRange {
            expected_amps: max_expected_amps,
        })
}

pub fn calibrate(
    shunt_ohms: f64,
    gain: GainLevel,
    max_expected_amps: Option<f64>,
) -> Result<Calibration, ConfigError> {
    match max_expected_amps {
        Some(amps) => info!(
            "calibrate called with: shunt ohms: {shunt_ohms:.3}, max shunt volts: {:.2}V, max expected amps: {amps:.3}A",
            gain.full_scale_volts()
        ),
        None => info!(
            "calibrate called with: shunt ohms: {shunt_ohms:.3}, max shunt volts: {:.2}V",
            gain.full_scale_volts()
        ),
    }

    let max_possible_amps = gain.full_scale_volts() / shunt_ohms;
    info!("max possible current: {max_possible_amps:.3}A");

    let current_lsb = determine_current_lsb(shunt_ohms, max_expected_amps, max_possible_amps)?;
    info!("current LSB: {current_lsb:.3e} A/bit");

    let power_lsb = current_lsb * POWER_LSB_RATIO;
    info!("power LSB: {power_lsb:.3e} W/bit");

    let max_current = current_lsb * MAX_CURRENT_STEPS;
    info!("max current before overflow: {max_current:.4}A");
    info!(
        "max shunt voltage before overflow: {:.4}mV",
        max_current * shunt_ohms * 1000.0
    );

    // Float to int casts truncate toward zero and saturate.
    let calibration = (CALIBRATION_FACTOR / (current_lsb * shunt_ohms)) as u32;
    let calibration_register = calibration.min(MAX_CALIBRATION_VALUE as u32) as u16;
    info!("calibration: 0x{calibration_register:04x} ({calibration_register})");

    Ok(Calibration {
        current_lsb,
        power_lsb,
        calibration_register,
        max_possible_amps,
    })
}

fn determine_current_lsb(
    shunt_ohms: f64,
    max_expected_amps: Option<f64>,
    max_possible_amps: f64,
) -> Result<f64, ConfigError> {
    let amps = match max_expected_amps {
        Some(expected_amps) => {
            if expected_amps > round_to_milli(max_possible_amps) {
                return Err(ConfigError::ExpectedCurrentTooHigh {
                    expected_amps,
                    max_possible_amps,
                });
            }
            info!("max expected current: {expected_amps:.3}A");
            if expected_amps < max_possible_amps {
                expected_amps
            } else {
                max_possible_amps
            }
        }
        None => max_possible_amps,
    };

    Ok((amps / CURRENT_LSB_FACTOR).max(min_device_current_lsb(shunt_ohms)))
}

/// Rounds to 3 decimal places, halves away from zero.
fn round_to_milli(value: f64) -> f64 {
    libm::round(value * 1000.0) / 1000.0
}
