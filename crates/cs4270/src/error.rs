//! Error types.
//!
//! [`ConfigError`] covers requests that are wrong no matter what the bus
//! does; they are detected before any register is touched. [`Error`] is what
//! every driver operation returns and is generic over the bus transport
//! error.

use platform::SupplyError;

use crate::lifecycle::PowerState;

/// A configuration request the codec cannot honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `reference_clock / sample_rate` is not an entry of the ratio table.
    #[error("no MCLK/LRCK ratio table entry for {ratio}")]
    NoMatchingRatio {
        /// The computed (integer) ratio.
        ratio: u32,
    },
    /// Sample rate of zero.
    #[error("sample rate must be non-zero")]
    InvalidSampleRate,
    /// Serial format other than I²S or left-justified.
    #[error("unsupported serial format")]
    UnsupportedFormat,
    /// Clock role other than full master or full slave.
    #[error("unsupported clock role")]
    UnsupportedRole,
    /// Hardware parameters applied before any `set_fmt`.
    #[error("DAI format not configured")]
    FormatNotSet,
    /// Channel count, rate or sample format outside the capability descriptor.
    #[error("stream parameters outside the codec capabilities")]
    UnsupportedStream,
}

/// Driver error, generic over the bus transport error `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error<E> {
    /// Register address outside the device's addressable range.
    #[error("register {addr:#04x} outside the device range")]
    OutOfRange {
        /// Offending address.
        addr: u8,
    },
    /// Register exists but cannot be read or written through the cache.
    #[error("register {addr:#04x} is not readable")]
    Unreadable {
        /// Offending address.
        addr: u8,
    },
    /// Volatile register read while the device is powered down. Its value
    /// only exists on the chip.
    #[error("register {addr:#04x} cannot be read while powered down")]
    PoweredDown {
        /// Offending address.
        addr: u8,
    },
    /// Transport failure. The cache holds the last value that succeeded.
    #[error("bus transaction failed")]
    Bus(E),
    /// Rejected configuration request.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Identity register does not carry the CS4270 signature.
    #[error("chip id {chip_id:#04x} is not a CS4270")]
    DeviceNotFound {
        /// Raw identity register value.
        chip_id: u8,
    },
    /// A power rail could not be switched.
    #[error("supply rail `{rail}` unavailable")]
    SupplyUnavailable {
        /// Rail that failed.
        rail: &'static str,
    },
    /// The instance has been detached.
    #[error("device detached")]
    DeviceDetached,
    /// The lifecycle state does not permit the operation.
    #[error("`{operation}` not allowed while {state}")]
    InvalidState {
        /// Current lifecycle state.
        state: PowerState,
        /// Rejected operation.
        operation: &'static str,
    },
    /// Value shape does not match the control it was written to.
    #[error("value does not fit control `{control}`")]
    InvalidControlValue {
        /// Control name.
        control: &'static str,
    },
}

impl<E> From<SupplyError> for Error<E> {
    fn from(err: SupplyError) -> Self {
        Self::SupplyUnavailable { rail: err.rail }
    }
}
