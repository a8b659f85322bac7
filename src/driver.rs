use crate::calibration::{self, Calibration};
use crate::config::{Configuration, Gain, GainLevel, OperatingMode, ShuntSpec, VoltageRange};
use crate::error::Error;
use crate::interface::{I2cInterface, RegisterBus};
use crate::register::{self, DeviceConfiguration, Register};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

/// Recovery time after leaving power-down mode.
const WAKE_DELAY_US: u32 = 40;

/// 10uV per bit.
const SHUNT_BITS_PER_MILLIVOLT: f32 = 100.0;
const BUS_MILLIVOLTS_PER_BIT: u16 = 4;

/// One of each measurement, taken back to back.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalReading {
    pub voltage_v: f32,
    pub current_ma: f32,
    pub power_mw: f32,
    pub shunt_voltage_mv: f32,
}

/// What the device was last programmed with.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Calibrated {
    pub(crate) voltage_range: VoltageRange,
    pub(crate) gain: GainLevel,
    pub(crate) calibration: Calibration,
    pub(crate) auto_gain: bool,
}

pub struct Ina219<BUS, Delay> {
    pub(crate) bus: BUS,
    pub(crate) delay: Delay,
    pub(crate) shunt: ShuntSpec,
    pub(crate) state: Option<Calibrated>,
}

impl<I2C, Delay> Ina219<I2cInterface<I2C>, Delay>
where
    I2C: I2c,
    Delay: DelayNs,
{
    /// Driver for a device at the default address 0x40.
    pub fn new_i2c(i2c: I2C, delay: Delay, shunt: ShuntSpec) -> Self {
        Self::new(I2cInterface::new(i2c), delay, shunt)
    }
}

impl<BUS, Delay> Ina219<BUS, Delay>
where
    BUS: RegisterBus,
    Delay: DelayNs,
{
    ///
    ///
    /// # Arguments
    ///
    /// * `bus`: Register access to the device.
    /// * `delay`: Used for the gain settle and wake recovery waits.
    /// * `shunt`: The shunt resistor and the maximum expected current. Nothing is written to the
    /// device until [`configure`](Self::configure) is called.
    ///
    /// returns: Ina219<BUS, Delay>
    pub fn new(bus: BUS, delay: Delay, shunt: ShuntSpec) -> Self {
        Self {
            bus,
            delay,
            shunt,
            state: None,
        }
    }

    /// Calibrates the device and sets up how it takes measurements.
    ///
    /// The gain and calibration are fully resolved before the first register write, so a
    /// configuration error leaves the device untouched.
    pub fn configure(&mut self, config: Configuration) -> Result<(), Error<BUS::Error>> {
        let (calibration, gain) = calibration::resolve(&self.shunt, config.gain)?;

        info!(
            "configure called with: shunt ohms: {:.3}, bus max volts: {}V, shunt volts max: {:.2}V, bus ADC: {:?}, shunt ADC: {:?}",
            self.shunt.shunt_ohms(),
            config.voltage_range.full_scale_volts(),
            gain.full_scale_volts(),
            config.bus_adc,
            config.shunt_adc
        );

        self.write_calibration(calibration)?;
        self.write_register(
            Register::Configuration,
            register::encode_config(config.voltage_range, gain, config.bus_adc, config.shunt_adc),
        )?;

        self.state = Some(Calibrated {
            voltage_range: config.voltage_range,
            gain,
            calibration,
            auto_gain: config.gain == Gain::Auto,
        });

        Ok(())
    }

    /// Bus voltage in volts.
    pub fn voltage(&mut self) -> Result<f32, Error<BUS::Error>> {
        let raw = self.read_register(Register::BusVoltage)?;
        let bus_voltage = register::decode_voltage_register(raw);
        Ok((bus_voltage.value * BUS_MILLIVOLTS_PER_BIT) as f32 / 1000.0)
    }

    /// Supply voltage in volts, the sum of the bus and shunt voltages.
    pub fn supply_voltage(&mut self) -> Result<f32, Error<BUS::Error>> {
        Ok(self.voltage()? + self.shunt_voltage()? / 1000.0)
    }

    /// Bus current in milliamps.
    pub fn current(&mut self) -> Result<f32, Error<BUS::Error>> {
        self.calibrated()?;
        self.ensure_not_overflowing()?;
        let current_lsb = self.calibrated()?.calibration.current_lsb;
        let raw = register::to_signed16(self.read_register(Register::Current)?);
        Ok((raw as f64 * current_lsb * 1000.0) as f32)
    }

    /// Power consumption in milliwatts.
    pub fn power(&mut self) -> Result<f32, Error<BUS::Error>> {
        self.calibrated()?;
        self.ensure_not_overflowing()?;
        let power_lsb = self.calibrated()?.calibration.power_lsb;
        let raw = self.read_register(Register::Power)?;
        Ok((raw as f64 * power_lsb * 1000.0) as f32)
    }

    /// Shunt voltage in millivolts.
    pub fn shunt_voltage(&mut self) -> Result<f32, Error<BUS::Error>> {
        self.ensure_not_overflowing()?;
        let raw = register::to_signed16(self.read_register(Register::ShuntVoltage)?);
        Ok(raw as f32 / SHUNT_BITS_PER_MILLIVOLT)
    }

    pub fn measure(&mut self) -> Result<PhysicalReading, Error<BUS::Error>> {
        Ok(PhysicalReading {
            voltage_v: self.voltage()?,
            current_ma: self.current()?,
            power_mw: self.power()?,
            shunt_voltage_mv: self.shunt_voltage()?,
        })
    }

    /// Whether a conversion has completed since the power or current register was last read.
    pub fn is_conversion_ready(&mut self) -> Result<bool, Error<BUS::Error>> {
        let raw = self.read_register(Register::BusVoltage)?;
        Ok(register::decode_voltage_register(raw).conversion_ready)
    }

    /// Reads the overflow flag without any gain handling. When it is set the current and power
    /// registers are invalid.
    pub fn current_overflow(&mut self) -> Result<bool, Error<BUS::Error>> {
        if let Some(state) = &self.state {
            if !state.calibration.overflow_operative() {
                return Err(Error::OverflowUndetectable);
            }
        }
        self.has_current_overflow()
    }

    /// Puts the device into power-down mode.
    pub fn sleep(&mut self) -> Result<(), Error<BUS::Error>> {
        let configuration = self.read_register(Register::Configuration)?;
        self.write_register(
            Register::Configuration,
            register::with_mode(configuration, OperatingMode::PowerDown),
        )
    }

    /// Returns the device to continuous shunt and bus measurement.
    pub fn wake(&mut self) -> Result<(), Error<BUS::Error>> {
        let configuration = self.read_register(Register::Configuration)?;
        self.write_register(
            Register::Configuration,
            register::with_mode(configuration, OperatingMode::ShuntAndBusContinuous),
        )?;
        self.delay.delay_us(WAKE_DELAY_US);
        Ok(())
    }

    /// Resets the device to its power-on defaults. [`configure`](Self::configure) has to be
    /// called again before current or power can be read.
    pub fn reset(&mut self) -> Result<(), Error<BUS::Error>> {
        self.write_register(Register::Configuration, register::reset_word())?;
        self.state = None;
        Ok(())
    }

    pub fn read_configuration(&mut self) -> Result<DeviceConfiguration, Error<BUS::Error>> {
        let word = self.read_register(Register::Configuration)?;
        Ok(DeviceConfiguration::from_word(word))
    }

    pub fn shunt(&self) -> &ShuntSpec {
        &self.shunt
    }

    /// The calibration in use, `None` until configured.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.state.as_ref().map(|state| &state.calibration)
    }

    pub fn gain(&self) -> Option<GainLevel> {
        self.state.as_ref().map(|state| state.gain)
    }

    pub fn voltage_range(&self) -> Option<VoltageRange> {
        self.state.as_ref().map(|state| state.voltage_range)
    }

    pub fn auto_gain_enabled(&self) -> bool {
        self.state.as_ref().is_some_and(|state| state.auto_gain)
    }

    pub fn release(self) -> (BUS, Delay) {
        (self.bus, self.delay)
    }

    pub(crate) fn calibrated(&self) -> Result<&Calibrated, Error<BUS::Error>> {
        self.state.as_ref().ok_or(Error::NotConfigured)
    }

    /// Writes the calibration register and makes it the one readings are scaled with.
    ///
    /// The scale factors follow the register as soon as the write lands, even if a later
    /// configuration write fails, so readings always match what the device is running.
    pub(crate) fn write_calibration(
        &mut self,
        calibration: Calibration,
    ) -> Result<(), Error<BUS::Error>> {
        self.write_register(Register::Calibration, calibration.calibration_register)?;
        if let Some(state) = self.state.as_mut() {
            state.calibration = calibration;
        }
        Ok(())
    }

    pub(crate) fn has_current_overflow(&mut self) -> Result<bool, Error<BUS::Error>> {
        let raw = self.read_register(Register::BusVoltage)?;
        Ok(register::decode_voltage_register(raw).overflow)
    }

    pub(crate) fn write_register(
        &mut self,
        register: Register,
        value: u16,
    ) -> Result<(), Error<BUS::Error>> {
        debug!(
            "write register 0x{:02x}: 0x{value:04x} 0b{value:016b}",
            register as u8
        );
        self.bus
            .write(register, value.to_be_bytes())
            .map_err(Error::Bus)
    }

    pub(crate) fn read_register(&mut self, register: Register) -> Result<u16, Error<BUS::Error>> {
        let value = self.bus.read_word(register).map_err(Error::Bus)?;
        debug!(
            "read register 0x{:02x}: 0x{value:04x} 0b{value:016b}",
            register as u8
        );
        Ok(value)
    }
}
