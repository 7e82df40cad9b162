//! Serial format and clock role configuration.
//!
//! The CS4270 serial port speaks I²S or left-justified; its right-justified
//! DAC modes have no ADC counterpart and are not offered. It is either full
//! clock master or full clock slave.
//!
//! [`InterfaceConfig::validate`] runs at `set_fmt` time and stores nothing
//! in hardware. [`configure`] turns the stored interface plus the stream's
//! clocking into the two register patches `hw_params` writes. Every check
//! happens before the first patch is produced, so a rejected request never
//! leaves a half-programmed device.

use platform::{ClockRole, DaiFormat, SerialFormat};

use crate::error::ConfigError;
use crate::ratio::{self, ClockConfig};
use crate::registers::{AdcFormat, DacFormat, RegisterPatch, FORMAT_ADC, FORMAT_DAC};

/// A validated serial-port configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceConfig {
    format: SerialFormat,
    slave: bool,
}

impl InterfaceConfig {
    /// Check that `fmt` is something the serial port can do.
    pub fn validate(fmt: DaiFormat) -> Result<Self, ConfigError> {
        let format = match fmt.format {
            SerialFormat::I2s | SerialFormat::LeftJustified => fmt.format,
            _ => return Err(ConfigError::UnsupportedFormat),
        };
        let slave = match fmt.role {
            ClockRole::Master => false,
            ClockRole::Slave => true,
            _ => return Err(ConfigError::UnsupportedRole),
        };
        Ok(Self { format, slave })
    }

    /// Serial data format.
    pub fn format(&self) -> SerialFormat {
        self.format
    }

    /// Whether the host drives the clocks.
    pub fn is_slave(&self) -> bool {
        self.slave
    }

    /// Format-register patch selecting this format for both DAC and ADC.
    pub fn format_patch(&self) -> RegisterPatch {
        let (dac, adc) = match self.format {
            SerialFormat::I2s => (DacFormat::I2s, AdcFormat::I2s),
            _ => (DacFormat::LeftJustified, AdcFormat::LeftJustified),
        };
        let dac = FORMAT_DAC.set(dac as u8);
        let adc = FORMAT_ADC.set(adc as u8);
        RegisterPatch::new(
            dac.register(),
            dac.mask() | adc.mask(),
            dac.bits() | adc.bits(),
        )
    }
}

/// Register patches for one stream configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamPatches {
    /// Resolved clocking.
    pub clock: ClockConfig,
    /// Mode register: speed and MCLK divider.
    pub mode: RegisterPatch,
    /// Format register: DAC and ADC serial format.
    pub format: RegisterPatch,
}

/// Build the patches for `interface` at the given clocks.
pub fn configure(
    interface: InterfaceConfig,
    reference_clock_hz: u32,
    sample_rate_hz: u32,
) -> Result<StreamPatches, ConfigError> {
    let clock = ratio::clock_config(reference_clock_hz, sample_rate_hz, interface.slave)?;
    Ok(StreamPatches {
        clock,
        mode: clock.patch(),
        format: interface.format_patch(),
    })
}
