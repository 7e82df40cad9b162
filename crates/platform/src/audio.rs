//! Audio codec host-framework interface
//!
//! Types the host audio framework hands to a codec driver when a stream is
//! opened and configured, and the [`CodecDai`] trait through which it does so.

use crate::audio_types::SampleRateHz;

/// Serial audio data format on the DAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialFormat {
    /// Philips I²S: MSB one bit-clock after the LRCK edge.
    I2s,
    /// Left-justified: MSB on the LRCK edge.
    LeftJustified,
    /// Right-justified: LSB on the LRCK edge.
    RightJustified,
    /// DSP mode A (MSB one bit-clock after the frame pulse).
    DspA,
    /// DSP mode B (MSB on the frame pulse).
    DspB,
}

/// Which side drives the bit clock and frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// Codec drives both BCLK and LRCK.
    Master,
    /// Host drives both BCLK and LRCK.
    Slave,
    /// Codec drives BCLK, host drives LRCK.
    BitclockMasterFrameSlave,
    /// Host drives BCLK, codec drives LRCK.
    BitclockSlaveFrameMaster,
}

/// Format and clock role requested for a DAI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiFormat {
    /// Serial data format.
    pub format: SerialFormat,
    /// Clock direction.
    pub role: ClockRole,
}

/// PCM sample encodings a stream may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleFormat {
    /// Signed 8 bit.
    S8,
    /// Signed 16 bit, little endian.
    S16Le,
    /// Signed 16 bit, big endian.
    S16Be,
    /// Signed 18 bit in 3 bytes, little endian.
    S18_3Le,
    /// Signed 18 bit in 3 bytes, big endian.
    S18_3Be,
    /// Signed 20 bit in 3 bytes, little endian.
    S20_3Le,
    /// Signed 20 bit in 3 bytes, big endian.
    S20_3Be,
    /// Signed 24 bit in 3 bytes, little endian.
    S24_3Le,
    /// Signed 24 bit in 3 bytes, big endian.
    S24_3Be,
    /// Signed 24 bit in 4 bytes, little endian.
    S24Le,
    /// Signed 24 bit in 4 bytes, big endian.
    S24Be,
    /// Signed 32 bit, little endian.
    S32Le,
    /// 32 bit float, little endian.
    FloatLe,
}

/// What one stream direction of a codec DAI can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCapabilities {
    /// Stream name advertised to the host ("Playback" / "Capture").
    pub stream_name: &'static str,
    /// Minimum channel count.
    pub channels_min: u8,
    /// Maximum channel count.
    pub channels_max: u8,
    /// Lowest sample rate in the continuous range.
    pub rate_min: u32,
    /// Highest sample rate in the continuous range.
    pub rate_max: u32,
    /// Supported sample encodings.
    pub formats: &'static [SampleFormat],
}

impl StreamCapabilities {
    /// Whether `params` fall inside this descriptor.
    pub fn supports(&self, params: &HwParams) -> bool {
        let rate = params.rate.get();
        (self.channels_min..=self.channels_max).contains(&params.channels)
            && (self.rate_min..=self.rate_max).contains(&rate)
            && self.formats.contains(&params.sample_format)
    }
}

/// Hardware parameters finalized for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwParams {
    /// Sample rate.
    pub rate: SampleRateHz,
    /// Channel count.
    pub channels: u8,
    /// Sample encoding.
    pub sample_format: SampleFormat,
}

/// Rates a codec advertises to the host for the current reference clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateConstraint {
    /// Reference clock unknown: any rate in the continuous range may work and
    /// must be re-validated when the stream is configured. `standard` lists the
    /// well-known rates inside the range.
    Continuous {
        /// Lowest rate.
        min: u32,
        /// Highest rate.
        max: u32,
        /// Standard rates within `min..=max`, ascending.
        standard: heapless::Vec<u32, 16>,
    },
    /// Reference clock known: exactly these rates, ascending.
    List(heapless::Vec<u32, 16>),
}

impl RateConstraint {
    /// Whether `rate` is allowed by this constraint.
    pub fn allows(&self, rate: u32) -> bool {
        match self {
            Self::Continuous { min, max, .. } => (*min..=*max).contains(&rate),
            Self::List(rates) => rates.contains(&rate),
        }
    }
}

/// Entry points the host audio framework calls on a codec DAI.
///
/// Calls for one device are serialized by the caller.
pub trait CodecDai {
    /// Error type
    type Error: core::fmt::Debug;

    /// Record the reference (master) clock frequency; 0 = not yet known.
    ///
    /// Returns the sample rates to advertise for that clock.
    fn set_sysclk(&mut self, reference_clock_hz: u32) -> Result<RateConstraint, Self::Error>;

    /// Select serial format and clock role.
    fn set_fmt(&mut self, fmt: DaiFormat) -> Result<(), Self::Error>;

    /// Program the device for finalized stream parameters.
    fn hw_params(&mut self, params: &HwParams) -> Result<(), Self::Error>;

    /// Mute or unmute the outputs on stream stop/start.
    fn digital_mute(&mut self, mute: bool) -> Result<(), Self::Error>;

    /// System suspend hook.
    fn suspend(&mut self) -> Result<(), Self::Error>;

    /// System resume hook.
    fn resume(&mut self) -> Result<(), Self::Error>;
}
