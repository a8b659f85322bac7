//! Bus access to the INA219 register file.

use crate::register::Register;
use embedded_hal::i2c::{I2c, SevenBitAddress};
use log::debug;

/// Default I2C address with A0 and A1 tied to ground.
pub const DEFAULT_ADDRESS: SevenBitAddress = 0x40;

/// Register level access to the device.
///
/// Words are big-endian on the wire. Implementations return the raw 16-bit word, signed
/// registers are reinterpreted by the driver.
pub trait RegisterBus {
    type Error;

    fn write(&mut self, register: Register, data: [u8; 2]) -> Result<(), Self::Error>;

    fn read_word(&mut self, register: Register) -> Result<u16, Self::Error>;
}

/// [`RegisterBus`] over an embedded-hal I2C bus.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: SevenBitAddress,
}

impl<I2C> I2cInterface<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterBus for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write(&mut self, register: Register, data: [u8; 2]) -> Result<(), Self::Error> {
        debug!(
            "i2c 0x{:02x} write 0x{:02x}: {:02x?}",
            self.address, register as u8, data
        );
        self.i2c.write(self.address, &[register as u8, data[0], data[1]])
    }

    fn read_word(&mut self, register: Register) -> Result<u16, Self::Error> {
        let mut read_buffer = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register as u8], &mut read_buffer)?;

        Ok(u16::from_be_bytes(read_buffer))
    }
}
