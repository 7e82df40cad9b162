//! DAC mute arbitration.
//!
//! Two sources want to mute the DAC outputs: the host's stream start/stop
//! (`digital_mute`) and the user's playback switch. The user's choice is
//! persistent; a stream unmute must not override it.
//!
//! The transitions here are pure. Each returns the next [`MuteState`] and the
//! [`RegisterPatch`] to write; the driver commits the state only once the
//! write is acknowledged.

use bitflags::bitflags;

use crate::registers::{RegisterPatch, MUTE_DAC};

bitflags! {
    /// DAC output channels, laid out as the mute register's DAC bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Channels: u8 {
        /// Channel A (left).
        const A = 0b01;
        /// Channel B (right).
        const B = 0b10;
        /// Both channels.
        const BOTH = Self::A.bits() | Self::B.bits();
    }
}

/// Stream-driven mute state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamMute {
    /// Stream running; only the user's channels are muted.
    #[default]
    Unmuted,
    /// Stream stopped; both channels muted.
    Muted,
}

/// Combined mute state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MuteState {
    user: Channels,
    stream: StreamMute,
}

impl MuteState {
    /// Nothing muted.
    pub const fn new() -> Self {
        Self {
            user: Channels::empty(),
            stream: StreamMute::Unmuted,
        }
    }

    /// Channels the user asked to keep muted.
    pub fn user(&self) -> Channels {
        self.user
    }

    /// Stream-driven state.
    pub fn stream(&self) -> StreamMute {
        self.stream
    }

    /// Channels that should currently be muted on the device.
    pub fn effective(&self) -> Channels {
        match self.stream {
            StreamMute::Muted => Channels::BOTH,
            StreamMute::Unmuted => self.user,
        }
    }

    /// Stream stop (`true`) or start (`false`).
    ///
    /// Stopping mutes both channels. Starting unmutes everything except the
    /// user's channels.
    pub fn stream_mute(self, mute: bool) -> (Self, RegisterPatch) {
        let next = Self {
            stream: if mute {
                StreamMute::Muted
            } else {
                StreamMute::Unmuted
            },
            ..self
        };
        (next, MUTE_DAC.set(next.effective().bits()))
    }

    /// User playback switch: mute exactly `channels`.
    ///
    /// The request is written as-is, even while the stream is muted, so the
    /// control always reflects on the device immediately.
    pub fn user_mute(self, channels: Channels) -> (Self, RegisterPatch) {
        let next = Self {
            user: channels,
            ..self
        };
        (next, MUTE_DAC.set(channels.bits()))
    }
}
