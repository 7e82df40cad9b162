//! Register bus transport
//!
//! The codec core never talks to an I²C peripheral directly. It reads and
//! writes single 8-bit registers through [`RegisterBus`], and treats every
//! transport error as opaque: "failed, do not update the cache".
//!
//! # Single-register transactions
//!
//! Reads are one `write_read` transaction that sends exactly one address byte
//! and clocks back exactly one data byte. The auto-increment bit (0x80 in the
//! address byte) is never set, so a read can never run past the addressed
//! register.

use embedded_hal::i2c::I2c;

/// Register-level bus transport consumed by codec drivers.
///
/// Implementations must time out and return an error rather than block
/// indefinitely.
pub trait RegisterBus {
    /// Transport error (timeout, NACK, disconnect, ...)
    type Error: core::fmt::Debug;

    /// Read one register.
    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error>;

    /// Write one register.
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
        (**self).read_register(addr)
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        (**self).write_register(addr, value)
    }
}

/// [`RegisterBus`] over a blocking embedded-hal I²C peripheral.
pub struct I2cRegisterBus<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> I2cRegisterBus<I> {
    /// Bind `i2c` to the device at 7-bit `address`.
    pub fn new(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    /// 7-bit device address this bus talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the underlying I²C peripheral.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    type Error = I::Error;

    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[addr], &mut buf)?;
        let [value] = buf;
        Ok(value)
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[addr, value])
    }
}
