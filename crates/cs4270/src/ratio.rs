//! MCLK/LRCK ratio resolution.
//!
//! The CS4270 derives its internal clocks from MCLK through a speed mode and
//! an MCLK divider. Only the ratios in [`RATIO_TABLE`] are supported, and the
//! ratio must be an exact integer: `reference_clock / sample_rate` is
//! computed with integer division and looked up as-is.
//!
//! # Ratio table
//!
//! | ratio | speed  | divider |
//! |-------|--------|---------|
//! | 64    | quad   | 1       |
//! | 96    | quad   | 1.5     |
//! | 128   | double | 1       |
//! | 192   | quad   | 3       |
//! | 256   | single | 1       |
//! | 384   | double | 3       |
//! | 512   | single | 2       |
//! | 768   | single | 3       |
//! | 1024  | single | 4       |
//!
//! With the `vd33-errata` feature the 96x entry is left out: the divide-by-1.5
//! path is unreliable when VD is supplied at 3.3 V.
//!
//! When the codec is clock slave the speed mode is replaced by
//! [`SpeedMode::Slave`]; the divider still comes from the table.

use platform::RateConstraint;

use crate::error::ConfigError;
use crate::registers::{Divider, RegisterPatch, SpeedMode, MODE_DIV, MODE_SPEED};

/// One supported MCLK/LRCK ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RatioEntry {
    /// MCLK / LRCK
    pub ratio: u32,
    /// Speed mode for master operation.
    pub speed: SpeedMode,
    /// MCLK divider.
    pub divider: Divider,
}

const fn entry(ratio: u32, speed: SpeedMode, divider: Divider) -> RatioEntry {
    RatioEntry {
        ratio,
        speed,
        divider,
    }
}

/// Supported ratios, ascending.
#[cfg(not(feature = "vd33-errata"))]
pub const RATIO_TABLE: &[RatioEntry] = &[
    entry(64, SpeedMode::Quad, Divider::Div1),
    entry(96, SpeedMode::Quad, Divider::Div1_5),
    entry(128, SpeedMode::Double, Divider::Div1),
    entry(192, SpeedMode::Quad, Divider::Div3),
    entry(256, SpeedMode::Single, Divider::Div1),
    entry(384, SpeedMode::Double, Divider::Div3),
    entry(512, SpeedMode::Single, Divider::Div2),
    entry(768, SpeedMode::Single, Divider::Div3),
    entry(1024, SpeedMode::Single, Divider::Div4),
];

/// Supported ratios, ascending (96x excluded for 3.3 V VD).
#[cfg(feature = "vd33-errata")]
pub const RATIO_TABLE: &[RatioEntry] = &[
    entry(64, SpeedMode::Quad, Divider::Div1),
    entry(128, SpeedMode::Double, Divider::Div1),
    entry(192, SpeedMode::Quad, Divider::Div3),
    entry(256, SpeedMode::Single, Divider::Div1),
    entry(384, SpeedMode::Double, Divider::Div3),
    entry(512, SpeedMode::Single, Divider::Div2),
    entry(768, SpeedMode::Single, Divider::Div3),
    entry(1024, SpeedMode::Single, Divider::Div4),
];

/// Standard sample rates within the codec's continuous range, ascending.
pub const STANDARD_RATES: [u32; 13] = [
    5_512, 8_000, 11_025, 16_000, 22_050, 32_000, 44_100, 48_000, 64_000, 88_200, 96_000,
    176_400, 192_000,
];

/// Lowest sample rate the serial port accepts.
pub const RATE_MIN: u32 = 4_000;
/// Highest sample rate the serial port accepts.
pub const RATE_MAX: u32 = 216_000;

/// Clock-mode register values for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    /// Resolved ratio.
    pub ratio: u32,
    /// Speed mode actually programmed.
    pub speed: SpeedMode,
    /// MCLK divider.
    pub divider: Divider,
}

impl ClockConfig {
    /// Mode-register patch covering the speed and divider fields.
    pub fn patch(self) -> RegisterPatch {
        let speed = MODE_SPEED.set(self.speed.bits());
        let div = MODE_DIV.set(self.divider.bits());
        RegisterPatch::new(
            speed.register(),
            speed.mask() | div.mask(),
            speed.bits() | div.bits(),
        )
    }
}

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Reference clock known: program these values.
    Clock(ClockConfig),
    /// Reference clock unknown: rates to offer until it is set.
    Rates(RateConstraint),
}

/// Resolve the clock-mode fields for `sample_rate_hz` at `reference_clock_hz`.
///
/// A reference clock of 0 means "not yet known" and yields the rate
/// enumeration instead of a configuration.
pub fn resolve(
    reference_clock_hz: u32,
    sample_rate_hz: u32,
    slave_mode: bool,
) -> Result<Resolution, ConfigError> {
    if reference_clock_hz == 0 {
        return Ok(Resolution::Rates(supported_rates(0)));
    }
    clock_config(reference_clock_hz, sample_rate_hz, slave_mode).map(Resolution::Clock)
}

/// Like [`resolve`] but requires a known reference clock.
pub fn clock_config(
    reference_clock_hz: u32,
    sample_rate_hz: u32,
    slave_mode: bool,
) -> Result<ClockConfig, ConfigError> {
    let ratio = reference_clock_hz
        .checked_div(sample_rate_hz)
        .ok_or(ConfigError::InvalidSampleRate)?;
    let entry = RATIO_TABLE
        .iter()
        .find(|e| e.ratio == ratio)
        .ok_or(ConfigError::NoMatchingRatio { ratio })?;
    Ok(ClockConfig {
        ratio,
        speed: if slave_mode {
            SpeedMode::Slave
        } else {
            entry.speed
        },
        divider: entry.divider,
    })
}

/// Sample rates to advertise for `reference_clock_hz`.
///
/// For a known clock this is the list of standard rates that resolve to a
/// table entry. For 0 the whole continuous range is allowed, since any
/// rate may still be reachable once the clock is chosen.
pub fn supported_rates(reference_clock_hz: u32) -> RateConstraint {
    let mut rates = heapless::Vec::new();
    for rate in STANDARD_RATES {
        let usable =
            reference_clock_hz == 0 || clock_config(reference_clock_hz, rate, false).is_ok();
        if usable && rates.push(rate).is_err() {
            break;
        }
    }
    if reference_clock_hz == 0 {
        RateConstraint::Continuous {
            min: RATE_MIN,
            max: RATE_MAX,
            standard: rates,
        }
    } else {
        RateConstraint::List(rates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn table_is_ascending_and_unique() {
        assert!(RATIO_TABLE.windows(2).all(|w| matches!(w, [a, b] if a.ratio < b.ratio)));
    }

    #[test]
    fn every_table_entry_resolves_to_itself() {
        for e in RATIO_TABLE {
            let rate = 48_000;
            let cfg = clock_config(e.ratio * rate, rate, false).unwrap();
            assert_eq!((cfg.speed, cfg.divider), (e.speed, e.divider));
        }
    }

    #[test]
    fn mclk_12288000_at_48k_is_single_speed_div1() {
        let cfg = clock_config(12_288_000, 48_000, false).unwrap();
        assert_eq!(cfg.ratio, 256);
        assert_eq!(cfg.speed, SpeedMode::Single);
        assert_eq!(cfg.divider, Divider::Div1);
        assert_eq!(cfg.patch().bits(), 0x00);
        assert_eq!(cfg.patch().mask(), 0x3E);
    }

    #[test]
    fn quad_speed_div3_patch_bits() {
        let cfg = clock_config(36_864_000, 192_000, false).unwrap();
        assert_eq!(cfg.patch().bits(), 0x26);
    }

    #[test]
    fn slave_overrides_speed_but_keeps_divider() {
        let cfg = clock_config(12_288_000, 32_000, true).unwrap();
        assert_eq!(cfg.ratio, 384);
        assert_eq!(cfg.speed, SpeedMode::Slave);
        assert_eq!(cfg.divider, Divider::Div3);
        assert_eq!(cfg.patch().bits(), 0x36);
    }

    #[test]
    fn mismatched_ratio_is_rejected() {
        assert_eq!(
            clock_config(12_288_000, 44_100, false),
            Err(ConfigError::NoMatchingRatio { ratio: 278 })
        );
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert_eq!(
            clock_config(12_288_000, 0, false),
            Err(ConfigError::InvalidSampleRate)
        );
        assert_eq!(
            resolve(12_288_000, 0, false),
            Err(ConfigError::InvalidSampleRate)
        );
    }

    #[test]
    fn unknown_clock_enumerates_continuous_range() {
        let Ok(Resolution::Rates(RateConstraint::Continuous { min, max, standard })) =
            resolve(0, 48_000, false)
        else {
            panic!("expected continuous enumeration");
        };
        assert_eq!((min, max), (RATE_MIN, RATE_MAX));
        assert_eq!(standard.as_slice(), STANDARD_RATES.as_slice());
    }

    #[test]
    fn known_clock_lists_only_resolvable_rates() {
        let RateConstraint::List(rates) = supported_rates(12_288_000) else {
            panic!("expected rate list");
        };
        assert!(rates.contains(&48_000));
        assert!(rates.contains(&192_000));
        assert!(!rates.contains(&44_100));
        for rate in &rates {
            assert!(clock_config(12_288_000, *rate, false).is_ok());
        }
    }

    #[cfg(not(feature = "vd33-errata"))]
    #[test]
    fn ratio_96_uses_one_and_a_half_divider() {
        let cfg = clock_config(9_216_000, 96_000, false).unwrap();
        assert_eq!(cfg.divider, Divider::Div1_5);
    }

    #[cfg(feature = "vd33-errata")]
    #[test]
    fn ratio_96_is_unavailable_with_errata() {
        assert_eq!(
            clock_config(9_216_000, 96_000, false),
            Err(ConfigError::NoMatchingRatio { ratio: 96 })
        );
    }
}
