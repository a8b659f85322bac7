/// A configure request that the shunt and gain combination cannot satisfy.
///
/// These are raised before anything is written to the device, so a failed
/// [`configure`](crate::Ina219::configure) never leaves partial register state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The voltage range code is neither 0 (16V) nor 1 (32V).
    InvalidVoltageRange(u8),
    /// The shunt resistance is not a positive, finite number of ohms.
    InvalidShunt,
    /// The expected current is not a positive, finite number of amps.
    InvalidExpectedAmps,
    /// The expected current is larger than the shunt can represent at the requested gain.
    ExpectedCurrentTooHigh {
        expected_amps: f64,
        max_possible_amps: f64,
    },
    /// Automatic gain was requested but even the 320mV level is too small
    /// for the expected current. A lower value shunt resistor is needed.
    ExpectedAmpsOutOfRange { expected_amps: f64 },
}

/// The device flagged a current overflow that could not be resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeviceRangeError {
    /// Full scale shunt voltage of the gain that overflowed.
    pub gain_volts: f64,
    /// `true` when automatic gain was enabled and the highest gain level was already in use.
    pub device_limit_reached: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error<E> {
    /// Transport error from the underlying bus.
    Bus(E),
    Config(ConfigError),
    DeviceRange(DeviceRangeError),
    /// The current calibration can represent the full shunt range, so the
    /// device will never raise its overflow flag.
    OverflowUndetectable,
    /// A calibrated reading was requested before `configure` (or after `reset`).
    NotConfigured,
}

impl<E> From<ConfigError> for Error<E> {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl<E> From<DeviceRangeError> for Error<E> {
    fn from(value: DeviceRangeError) -> Self {
        Self::DeviceRange(value)
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::InvalidVoltageRange(code) => write!(
                f,
                "Invalid voltage range {code}, must be one of: 16V (0), 32V (1)"
            ),
            ConfigError::InvalidShunt => write!(f, "Shunt resistance must be positive"),
            ConfigError::InvalidExpectedAmps => write!(f, "Expected current must be positive"),
            ConfigError::ExpectedCurrentTooHigh {
                expected_amps,
                max_possible_amps,
            } => write!(
                f,
                "Expected current {expected_amps:.3}A is greater than max possible current {max_possible_amps:.3}A"
            ),
            ConfigError::ExpectedAmpsOutOfRange { expected_amps } => write!(
                f,
                "Expected amps {expected_amps:.2}A, out of range, use a lower value shunt resistor"
            ),
        }
    }
}

impl core::fmt::Display for DeviceRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Current out of range (overflow), for gain {:.2}V",
            self.gain_volts
        )?;
        if self.device_limit_reached {
            write!(f, ", device limit reached")?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<E> std::fmt::Display for Error<E>
where
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Bus(bus) => write!(f, "Bus Error: {bus:?}"),
            Error::Config(config) => write!(f, "{config}"),
            Error::DeviceRange(range) => write!(f, "{range}"),
            Error::OverflowUndetectable => write!(
                f,
                "Current overflows cannot be detected with the current calibration"
            ),
            Error::NotConfigured => write!(f, "INA219 has not been configured"),
        }
    }
}

#[cfg(feature = "std")]
impl<E> std::error::Error for Error<E>
where
    E: std::fmt::Debug,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for DeviceRangeError {}
