use crate::error::ConfigError;

/// Bus voltage full scale range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoltageRange {
    V16 = 0,
    V32 = 1,
}

impl VoltageRange {
    pub const fn full_scale_volts(self) -> u8 {
        match self {
            VoltageRange::V16 => 16,
            VoltageRange::V32 => 32,
        }
    }
}

impl TryFrom<u8> for VoltageRange {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoltageRange::V16),
            1 => Ok(VoltageRange::V32),
            other => Err(ConfigError::InvalidVoltageRange(other)),
        }
    }
}

/// Programmable gain of the shunt voltage measurement, named after its full scale voltage.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GainLevel {
    Gain40mV = 0,
    Gain80mV = 1,
    Gain160mV = 2,
    Gain320mV = 3,
}

impl GainLevel {
    /// All levels, lowest first.
    pub const ALL: [GainLevel; 4] = [
        GainLevel::Gain40mV,
        GainLevel::Gain80mV,
        GainLevel::Gain160mV,
        GainLevel::Gain320mV,
    ];

    pub const fn full_scale_volts(self) -> f64 {
        match self {
            GainLevel::Gain40mV => 0.04,
            GainLevel::Gain80mV => 0.08,
            GainLevel::Gain160mV => 0.16,
            GainLevel::Gain320mV => 0.32,
        }
    }

    /// The next coarser level, or `None` at 320mV.
    pub const fn next(self) -> Option<GainLevel> {
        match self {
            GainLevel::Gain40mV => Some(GainLevel::Gain80mV),
            GainLevel::Gain80mV => Some(GainLevel::Gain160mV),
            GainLevel::Gain160mV => Some(GainLevel::Gain320mV),
            GainLevel::Gain320mV => None,
        }
    }

    /// Decodes the two PGA bits. Higher bits are ignored.
    pub const fn from_bits(bits: u16) -> GainLevel {
        match bits & 0b11 {
            0 => GainLevel::Gain40mV,
            1 => GainLevel::Gain80mV,
            2 => GainLevel::Gain160mV,
            _ => GainLevel::Gain320mV,
        }
    }
}

/// Gain requested at configure time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Gain {
    /// Pick the smallest sufficient level and raise it whenever the device overflows.
    #[default]
    Auto,
    Fixed(GainLevel),
}

impl From<GainLevel> for Gain {
    fn from(level: GainLevel) -> Self {
        Gain::Fixed(level)
    }
}

/// ADC resolution or number of 12-bit samples averaged per conversion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdcMode {
    /// 84us conversion time.
    Bits9 = 0,
    /// 148us conversion time.
    Bits10 = 1,
    /// 276us conversion time.
    Bits11 = 2,
    /// 532us conversion time.
    Bits12 = 3,
    /// 1.06ms conversion time.
    Samples2 = 9,
    /// 2.13ms conversion time.
    Samples4 = 10,
    /// 4.26ms conversion time.
    Samples8 = 11,
    /// 8.51ms conversion time.
    Samples16 = 12,
    /// 17.02ms conversion time.
    Samples32 = 13,
    /// 34.05ms conversion time.
    Samples64 = 14,
    /// 68.10ms conversion time.
    Samples128 = 15,
}

impl AdcMode {
    /// Decodes a 4-bit ADC field, folding the datasheet's aliases
    /// (`0b01xx` is the same as `0b00xx`, `0b1000` is 12-bit).
    pub const fn from_bits(bits: u16) -> AdcMode {
        match bits & 0xF {
            0 | 4 => AdcMode::Bits9,
            1 | 5 => AdcMode::Bits10,
            2 | 6 => AdcMode::Bits11,
            3 | 7 | 8 => AdcMode::Bits12,
            9 => AdcMode::Samples2,
            10 => AdcMode::Samples4,
            11 => AdcMode::Samples8,
            12 => AdcMode::Samples16,
            13 => AdcMode::Samples32,
            14 => AdcMode::Samples64,
            _ => AdcMode::Samples128,
        }
    }
}

/// The three mode bits of the configuration register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperatingMode {
    PowerDown = 0,
    ShuntTriggered = 1,
    BusTriggered = 2,
    ShuntAndBusTriggered = 3,
    AdcOff = 4,
    ShuntContinuous = 5,
    BusContinuous = 6,
    ShuntAndBusContinuous = 7,
}

impl OperatingMode {
    pub const fn from_bits(bits: u16) -> OperatingMode {
        match bits & 0b111 {
            0 => OperatingMode::PowerDown,
            1 => OperatingMode::ShuntTriggered,
            2 => OperatingMode::BusTriggered,
            3 => OperatingMode::ShuntAndBusTriggered,
            4 => OperatingMode::AdcOff,
            5 => OperatingMode::ShuntContinuous,
            6 => OperatingMode::BusContinuous,
            _ => OperatingMode::ShuntAndBusContinuous,
        }
    }
}

/// The shunt resistor fitted to the board and the largest current expected through it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShuntSpec {
    shunt_ohms: f64,
    max_expected_amps: Option<f64>,
}

impl ShuntSpec {
    ///
    ///
    /// # Arguments
    ///
    /// * `shunt_ohms`: Value of the shunt resistor in ohms.
    /// * `max_expected_amps`: The maximum current expected through the shunt. When absent the
    /// calibration covers the full range of the selected gain.
    ///
    /// returns: Result<ShuntSpec, ConfigError>
    pub fn new(shunt_ohms: f64, max_expected_amps: Option<f64>) -> Result<Self, ConfigError> {
        if !(shunt_ohms.is_finite() && shunt_ohms > 0.0) {
            return Err(ConfigError::InvalidShunt);
        }
        if let Some(amps) = max_expected_amps {
            if !(amps.is_finite() && amps > 0.0) {
                return Err(ConfigError::InvalidExpectedAmps);
            }
        }

        Ok(Self {
            shunt_ohms,
            max_expected_amps,
        })
    }

    pub fn shunt_ohms(&self) -> f64 {
        self.shunt_ohms
    }

    pub fn max_expected_amps(&self) -> Option<f64> {
        self.max_expected_amps
    }
}

/// How [`configure`](crate::Ina219::configure) sets the device up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    /// The full scale bus voltage range, 16V or 32V
    pub voltage_range: VoltageRange,
    /// A fixed gain level, or automatic gain
    pub gain: Gain,
    /// Bus ADC resolution or averaging
    pub bus_adc: AdcMode,
    /// Shunt ADC resolution or averaging
    pub shunt_adc: AdcMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            voltage_range: VoltageRange::V32,
            gain: Gain::Auto,
            bus_adc: AdcMode::Bits12,
            shunt_adc: AdcMode::Bits12,
        }
    }
}

impl Configuration {
    pub fn new(voltage_range: VoltageRange, gain: impl Into<Gain>) -> Self {
        Self {
            voltage_range,
            gain: gain.into(),
            ..Self::default()
        }
    }

    pub fn with_adc(mut self, bus_adc: AdcMode, shunt_adc: AdcMode) -> Self {
        self.bus_adc = bus_adc;
        self.shunt_adc = shunt_adc;
        self
    }
}
