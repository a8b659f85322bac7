//! Register map and bit-exact encoding of the INA219 registers.
//!
//! All registers are 16 bits wide and travel most significant byte first.

use crate::config::{AdcMode, GainLevel, OperatingMode, VoltageRange};
use bit_field::BitField;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    Configuration = 0x00,
    /// Signed, 10uV/bit
    ShuntVoltage = 0x01,
    /// Bits 15-3 value (4mV/bit), bit 1 conversion ready, bit 0 overflow
    BusVoltage = 0x02,
    /// Unsigned, 20 x current LSB
    Power = 0x03,
    /// Signed, current LSB
    Current = 0x04,
    Calibration = 0x05,
}

const RESET_BIT: usize = 15;
const RANGE_BIT: usize = 13;
const GAIN_BITS: core::ops::Range<usize> = 11..13;
const BUS_ADC_BITS: core::ops::Range<usize> = 7..11;
const SHUNT_ADC_BITS: core::ops::Range<usize> = 3..7;
const MODE_BITS: core::ops::Range<usize> = 0..3;

const OVERFLOW_BIT: usize = 0;
const CONVERSION_READY_BIT: usize = 1;

/// Largest value the calibration register accepts.
pub const MAX_CALIBRATION_VALUE: u16 = 0xFFFE;

/// The configuration register, field by field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfiguration {
    pub voltage_range: VoltageRange,
    pub gain: GainLevel,
    pub bus_adc: AdcMode,
    pub shunt_adc: AdcMode,
    pub mode: OperatingMode,
}

impl DeviceConfiguration {
    pub fn to_word(&self) -> u16 {
        let mut word = 0u16;
        word.set_bit(RANGE_BIT, self.voltage_range == VoltageRange::V32)
            .set_bits(GAIN_BITS, self.gain as u16)
            .set_bits(BUS_ADC_BITS, self.bus_adc as u16)
            .set_bits(SHUNT_ADC_BITS, self.shunt_adc as u16)
            .set_bits(MODE_BITS, self.mode as u16);
        word
    }

    /// Decodes a configuration word read back from the device. The reset bit is ignored.
    pub fn from_word(word: u16) -> Self {
        Self {
            voltage_range: if word.get_bit(RANGE_BIT) {
                VoltageRange::V32
            } else {
                VoltageRange::V16
            },
            gain: GainLevel::from_bits(word.get_bits(GAIN_BITS)),
            bus_adc: AdcMode::from_bits(word.get_bits(BUS_ADC_BITS)),
            shunt_adc: AdcMode::from_bits(word.get_bits(SHUNT_ADC_BITS)),
            mode: OperatingMode::from_bits(word.get_bits(MODE_BITS)),
        }
    }
}

/// Configuration word for continuous shunt and bus measurement.
pub fn encode_config(
    voltage_range: VoltageRange,
    gain: GainLevel,
    bus_adc: AdcMode,
    shunt_adc: AdcMode,
) -> u16 {
    DeviceConfiguration {
        voltage_range,
        gain,
        bus_adc,
        shunt_adc,
        mode: OperatingMode::ShuntAndBusContinuous,
    }
    .to_word()
}

/// Replaces the PGA field of an existing configuration word.
pub fn with_gain(mut config: u16, gain: GainLevel) -> u16 {
    *config.set_bits(GAIN_BITS, gain as u16)
}

/// Replaces the operating mode field of an existing configuration word.
pub fn with_mode(mut config: u16, mode: OperatingMode) -> u16 {
    *config.set_bits(MODE_BITS, mode as u16)
}

pub fn gain_of(config: u16) -> GainLevel {
    GainLevel::from_bits(config.get_bits(GAIN_BITS))
}

/// Configuration word that resets the device to its power-on defaults.
pub const fn reset_word() -> u16 {
    1 << RESET_BIT
}

/// Bus voltage register contents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusVoltage {
    /// 13-bit measurement in 4mV steps
    pub value: u16,
    pub overflow: bool,
    pub conversion_ready: bool,
}

pub fn decode_voltage_register(raw: u16) -> BusVoltage {
    BusVoltage {
        value: raw >> 3,
        overflow: raw.get_bit(OVERFLOW_BIT),
        conversion_ready: raw.get_bit(CONVERSION_READY_BIT),
    }
}

/// Two's complement view of a raw register word.
pub const fn to_signed16(raw: u16) -> i16 {
    raw as i16
}

pub const fn to_unsigned16(value: i16) -> u16 {
    value as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_16v_40mv_12bit() {
        let word = encode_config(
            VoltageRange::V16,
            GainLevel::Gain40mV,
            AdcMode::Bits12,
            AdcMode::Bits12,
        );
        assert_eq!(word, 0x019F);
    }

    #[test]
    fn encodes_range_gain_and_adc_fields() {
        let cases = [
            (GainLevel::Gain80mV, AdcMode::Bits12, AdcMode::Bits12, 0x299F),
            (GainLevel::Gain320mV, AdcMode::Bits12, AdcMode::Bits12, 0x399F),
            (GainLevel::Gain40mV, AdcMode::Bits9, AdcMode::Bits9, 0x2007),
            (GainLevel::Gain40mV, AdcMode::Bits10, AdcMode::Bits11, 0x2097),
            (GainLevel::Gain40mV, AdcMode::Samples2, AdcMode::Samples128, 0x24FF),
            (GainLevel::Gain40mV, AdcMode::Samples32, AdcMode::Samples64, 0x26F7),
        ];
        for (gain, bus_adc, shunt_adc, expected) in cases {
            assert_eq!(
                encode_config(VoltageRange::V32, gain, bus_adc, shunt_adc),
                expected,
                "{gain:?} {bus_adc:?} {shunt_adc:?}"
            );
        }
    }

    #[test]
    fn gain_survives_encode_and_decode() {
        for gain in GainLevel::ALL {
            let word = encode_config(VoltageRange::V32, gain, AdcMode::Bits12, AdcMode::Samples8);
            assert_eq!(gain_of(word), gain);
            assert_eq!(DeviceConfiguration::from_word(word).gain, gain);
        }
    }

    #[test]
    fn with_gain_keeps_other_fields() {
        assert_eq!(with_gain(0x099F, GainLevel::Gain160mV), 0x119F);
        assert_eq!(with_gain(0x399F, GainLevel::Gain40mV), 0x219F);
        assert_eq!(with_gain(0xFFFF, GainLevel::Gain40mV), 0xE7FF);
    }

    #[test]
    fn with_mode_keeps_other_fields() {
        assert_eq!(with_mode(0x299F, OperatingMode::PowerDown), 0x2998);
        assert_eq!(with_mode(0x2998, OperatingMode::ShuntAndBusContinuous), 0x299F);
        assert_eq!(with_mode(0x0000, OperatingMode::ShuntAndBusContinuous), 0x0007);
        assert_eq!(with_mode(0xFFFF, OperatingMode::PowerDown), 0xFFF8);
    }

    #[test]
    fn decodes_bus_voltage_flags() {
        let reading = decode_voltage_register(0x0FA1);
        assert_eq!(reading.value, 500);
        assert!(reading.overflow);
        assert!(!reading.conversion_ready);

        let reading = decode_voltage_register(0x000A);
        assert_eq!(reading.value, 1);
        assert!(!reading.overflow);
        assert!(reading.conversion_ready);
    }

    #[test]
    fn signed_interpretation() {
        assert_eq!(to_signed16(0xF060), -0xFA0);
        assert_eq!(to_unsigned16(-1), 0xFFFF);
        assert_eq!(reset_word(), 0x8000);
    }
}
