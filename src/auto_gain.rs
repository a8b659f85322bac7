//! Overflow handling that runs before every current, power and shunt voltage read.
//!
//! With automatic gain enabled an overflow raises the gain one level at a time,
//! recalibrating at each step, until the device stops reporting overflow or the
//! 320mV level is exhausted. Without automatic gain an overflow is an error.

use crate::calibration;
use crate::config::GainLevel;
use crate::driver::Ina219;
use crate::error::{DeviceRangeError, Error};
use crate::interface::RegisterBus;
use crate::register::{self, Register};
use embedded_hal::delay::DelayNs;
use log::info;

/// Time for a new gain to apply before conversions are valid again.
const GAIN_SETTLE_MS: u32 = 1;

impl<BUS, Delay> Ina219<BUS, Delay>
where
    BUS: RegisterBus,
    Delay: DelayNs,
{
    /// Checks the overflow flag, raising the gain while it is set if automatic gain is enabled.
    ///
    /// Bounded by the number of gain levels: at most three escalations happen per call.
    ///
    /// Before [`configure`](Self::configure) there is no automatic gain, and an overflow is
    /// reported against the gain currently held by the device.
    pub fn ensure_not_overflowing(&mut self) -> Result<(), Error<BUS::Error>> {
        if let Some(state) = &self.state {
            if !state.calibration.overflow_operative() {
                return Err(Error::OverflowUndetectable);
            }
        }

        for _ in 0..GainLevel::ALL.len() {
            if !self.has_current_overflow()? {
                return Ok(());
            }

            let (gain, auto_gain) = match &self.state {
                Some(state) => (state.gain, state.auto_gain),
                None => {
                    let configuration = self.read_register(Register::Configuration)?;
                    (register::gain_of(configuration), false)
                }
            };
            if !auto_gain {
                return Err(DeviceRangeError {
                    gain_volts: gain.full_scale_volts(),
                    device_limit_reached: false,
                }
                .into());
            }

            self.increase_gain()?;
        }

        // The device kept reporting a gain below 320mV after every rewrite.
        let gain = self.calibrated()?.gain;
        Err(DeviceRangeError {
            gain_volts: gain.full_scale_volts(),
            device_limit_reached: true,
        }
        .into())
    }

    fn increase_gain(&mut self) -> Result<(), Error<BUS::Error>> {
        info!("Current overflow detected - attempting to increase gain");

        let configuration = self.read_register(Register::Configuration)?;
        let gain = register::gain_of(configuration);
        info!("gain is currently: {:.2}V", gain.full_scale_volts());

        let Some(next) = gain.next() else {
            info!("Device limit reached, gain cannot be increased");
            return Err(DeviceRangeError {
                gain_volts: gain.full_scale_volts(),
                device_limit_reached: true,
            }
            .into());
        };

        let calibration = calibration::calibrate(self.shunt.shunt_ohms(), next, None)?;
        self.write_calibration(calibration)?;
        self.write_register(
            Register::Configuration,
            register::with_gain(configuration, next),
        )?;

        if let Some(state) = self.state.as_mut() {
            state.gain = next;
        }
        info!("gain set to: {:.2}V", next.full_scale_volts());

        self.delay.delay_ms(GAIN_SETTLE_MS);
        Ok(())
    }
}
