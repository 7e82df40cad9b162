//! User-facing mixer controls.
//!
//! Each control maps a "bigger is louder / on is on" value onto one or two
//! register fields. Volume and the mute switches are inverted on the device.
//! The playback switch is special: it is owned by the mute arbiter in
//! [`crate::mute`] so that stream mute never clobbers it.

use heapless::Vec;

use crate::mute::Channels;
use crate::registers::{
    Field, RegisterPatch, FORMAT_LOOPBACK, MODE_POPGUARD, MUTE_ADC_A, MUTE_ADC_B, MUTE_AUTO,
    MUTE_DAC_A, MUTE_DAC_B, TRANS_DEEMPH, TRANS_SOFT, TRANS_ZERO, VOLA, VOLB,
};

/// Mixer controls exposed by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// DAC volume, per channel, 0 = -127.5 dB, 255 = 0 dB.
    PlaybackVolume,
    /// ADC to DAC digital loopback.
    DigitalSidetone,
    /// Soft ramp on volume changes.
    SoftRamp,
    /// Zero-cross volume changes.
    ZeroCross,
    /// 44.1 kHz de-emphasis.
    Deemphasis,
    /// Popguard transient suppression.
    Popguard,
    /// Mute after 8192 zero samples.
    AutoMute,
    /// ADC channel switches (on = unmuted).
    CaptureSwitch,
    /// DAC channel switches (on = unmuted).
    PlaybackSwitch,
}

/// Value of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlValue {
    /// Two-channel integer.
    Stereo {
        /// Channel A.
        left: u8,
        /// Channel B.
        right: u8,
    },
    /// Single on/off switch.
    Switch(bool),
    /// Two-channel on/off switch.
    StereoSwitch {
        /// Channel A.
        left: bool,
        /// Channel B.
        right: bool,
    },
}

/// Value shape of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlKind {
    /// Two integers in `0..=max`.
    StereoInteger {
        /// Largest value.
        max: u8,
    },
    /// One boolean.
    Switch,
    /// Two booleans.
    StereoSwitch,
}

#[derive(Clone, Copy)]
enum Layout {
    /// One field in each of two registers.
    DoubleReg { left: Field, right: Field },
    /// Two fields in one register.
    Double { left: Field, right: Field },
    /// One field.
    Single { field: Field },
}

impl Control {
    /// Every control, in registration order.
    pub const ALL: [Control; 9] = [
        Control::PlaybackVolume,
        Control::DigitalSidetone,
        Control::SoftRamp,
        Control::ZeroCross,
        Control::Deemphasis,
        Control::Popguard,
        Control::AutoMute,
        Control::CaptureSwitch,
        Control::PlaybackSwitch,
    ];

    /// Name the host framework shows.
    pub const fn name(self) -> &'static str {
        match self {
            Control::PlaybackVolume => "Master Playback Volume",
            Control::DigitalSidetone => "Digital Sidetone Switch",
            Control::SoftRamp => "Soft Ramp Switch",
            Control::ZeroCross => "Zero Cross Switch",
            Control::Deemphasis => "De-emphasis filter",
            Control::Popguard => "Popguard Switch",
            Control::AutoMute => "Auto-Mute Switch",
            Control::CaptureSwitch => "Master Capture Switch",
            Control::PlaybackSwitch => "Master Playback Switch",
        }
    }

    /// Look a control up by [`Control::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Value shape.
    pub const fn kind(self) -> ControlKind {
        match self.layout() {
            Layout::DoubleReg { left, .. } => ControlKind::StereoInteger { max: left.max() },
            Layout::Double { .. } => ControlKind::StereoSwitch,
            Layout::Single { .. } => ControlKind::Switch,
        }
    }

    const fn layout(self) -> Layout {
        match self {
            Control::PlaybackVolume => Layout::DoubleReg {
                left: VOLA,
                right: VOLB,
            },
            Control::DigitalSidetone => Layout::Single {
                field: FORMAT_LOOPBACK,
            },
            Control::SoftRamp => Layout::Single { field: TRANS_SOFT },
            Control::ZeroCross => Layout::Single { field: TRANS_ZERO },
            Control::Deemphasis => Layout::Single {
                field: TRANS_DEEMPH,
            },
            Control::Popguard => Layout::Single {
                field: MODE_POPGUARD,
            },
            Control::AutoMute => Layout::Single { field: MUTE_AUTO },
            Control::CaptureSwitch => Layout::Double {
                left: MUTE_ADC_A,
                right: MUTE_ADC_B,
            },
            Control::PlaybackSwitch => Layout::Double {
                left: MUTE_DAC_A,
                right: MUTE_DAC_B,
            },
        }
    }

    /// Whether the register encoding is the inverse of the control value.
    const fn inverted(self) -> bool {
        matches!(
            self,
            Control::PlaybackVolume
                | Control::Popguard
                | Control::CaptureSwitch
                | Control::PlaybackSwitch
        )
    }

    /// Patches that store `value`, or `None` if the value has the wrong shape.
    pub(crate) fn encode(self, value: ControlValue) -> Option<Vec<RegisterPatch, 2>> {
        let invert = self.inverted();
        let mut patches = Vec::new();
        match (self.layout(), value) {
            (Layout::DoubleReg { left, right }, ControlValue::Stereo { left: l, right: r }) => {
                patches.push(left.set(level(left, l, invert))).ok()?;
                patches.push(right.set(level(right, r, invert))).ok()?;
            }
            (Layout::Double { left, right }, ControlValue::StereoSwitch { left: l, right: r }) => {
                let merged = left
                    .set(u8::from(l != invert))
                    .merge(right.set(u8::from(r != invert)))?;
                patches.push(merged).ok()?;
            }
            (Layout::Single { field }, ControlValue::Switch(on)) => {
                patches.push(field.set(u8::from(on != invert))).ok()?;
            }
            _ => return None,
        }
        Some(patches)
    }

    /// Reconstruct the value from register contents supplied by `read`.
    pub(crate) fn decode<E>(
        self,
        mut read: impl FnMut(u8) -> Result<u8, E>,
    ) -> Result<ControlValue, E> {
        let invert = self.inverted();
        let switch = |field: Field, reg: u8| (field.get(reg) != 0) != invert;
        Ok(match self.layout() {
            Layout::DoubleReg { left, right } => ControlValue::Stereo {
                left: level(left, left.get(read(left.register())?), invert),
                right: level(right, right.get(read(right.register())?), invert),
            },
            Layout::Double { left, right } => {
                let reg = read(left.register())?;
                ControlValue::StereoSwitch {
                    left: switch(left, reg),
                    right: switch(right, reg),
                }
            }
            Layout::Single { field } => ControlValue::Switch(switch(field, read(field.register())?)),
        })
    }
}

/// Map between control level and field value; the mapping is its own inverse.
fn level(field: Field, value: u8, invert: bool) -> u8 {
    let value = value.min(field.max());
    if invert {
        field.max().saturating_sub(value)
    } else {
        value
    }
}

/// Channels a playback-switch value mutes.
pub(crate) fn muted_channels(value: ControlValue) -> Option<Channels> {
    let ControlValue::StereoSwitch { left, right } = value else {
        return None;
    };
    let mut muted = Channels::empty();
    muted.set(Channels::A, !left);
    muted.set(Channels::B, !right);
    Some(muted)
}

/// Playback-switch value for a muted-channel mask.
pub(crate) fn switch_value(muted: Channels) -> ControlValue {
    ControlValue::StereoSwitch {
        left: !muted.contains(Channels::A),
        right: !muted.contains(Channels::B),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::registers::{REG_MODE, REG_MUTE, REG_VOLA, REG_VOLB};

    #[test]
    fn names_round_trip_through_lookup() {
        for control in Control::ALL {
            assert_eq!(Control::from_name(control.name()), Some(control));
        }
        assert_eq!(Control::from_name("Bass Boost"), None);
    }

    #[test]
    fn volume_is_stored_as_attenuation() {
        let patches = Control::PlaybackVolume
            .encode(ControlValue::Stereo {
                left: 0xFF,
                right: 0x00,
            })
            .unwrap();
        assert_eq!(patches.len(), 2);
        assert_eq!((patches[0].register(), patches[0].bits()), (REG_VOLA, 0x00));
        assert_eq!((patches[1].register(), patches[1].bits()), (REG_VOLB, 0xFF));
        assert_eq!(
            Control::PlaybackVolume.kind(),
            ControlKind::StereoInteger { max: 0xFF }
        );
    }

    #[test]
    fn popguard_switch_is_inverted() {
        let patches = Control::Popguard.encode(ControlValue::Switch(true)).unwrap();
        assert_eq!(patches[0].register(), REG_MODE);
        assert_eq!(patches[0].bits(), 0x00);
        let value = Control::Popguard
            .decode(|_| Ok::<_, ()>(0x01))
            .unwrap();
        assert_eq!(value, ControlValue::Switch(false));
    }

    #[test]
    fn capture_switch_packs_both_channels_into_one_write() {
        let patches = Control::CaptureSwitch
            .encode(ControlValue::StereoSwitch {
                left: false,
                right: true,
            })
            .unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].register(), REG_MUTE);
        assert_eq!(patches[0].mask(), 0x18);
        assert_eq!(patches[0].bits(), 0x08);
    }

    #[test]
    fn wrong_value_shape_is_rejected() {
        assert!(Control::SoftRamp
            .encode(ControlValue::Stereo { left: 1, right: 1 })
            .is_none());
        assert!(Control::PlaybackVolume
            .encode(ControlValue::Switch(true))
            .is_none());
    }

    #[test]
    fn decode_reads_through_callback() {
        let value = Control::PlaybackVolume
            .decode(|reg| Ok::<_, ()>(if reg == REG_VOLA { 0x10 } else { 0x00 }))
            .unwrap();
        assert_eq!(
            value,
            ControlValue::Stereo {
                left: 0xEF,
                right: 0xFF
            }
        );
    }

    #[test]
    fn playback_switch_maps_to_muted_channels() {
        let value = ControlValue::StereoSwitch {
            left: true,
            right: false,
        };
        let muted = muted_channels(value).unwrap();
        assert_eq!(muted, Channels::B);
        assert_eq!(switch_value(muted), value);
        assert_eq!(muted_channels(ControlValue::Switch(true)), None);
    }
}
