//! Property-based tests for the register cache, masked merge and ratio
//! resolution.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use cs4270::ratio::{clock_config, resolve, Resolution, RATIO_TABLE};
use cs4270::registers::{RegisterPatch, SpeedMode, FIRST_REG, LAST_REG, REG_CHIPID};
use cs4270::{ConfigError, Error, RegisterCache};
use platform::mocks::MockRegisterBus;
use proptest::prelude::*;

/// Writable, non-volatile registers.
fn cached_addr() -> impl Strategy<Value = u8> {
    (REG_CHIPID + 1)..=LAST_REG
}

fn out_of_range_addr() -> impl Strategy<Value = u8> {
    prop_oneof![Just(0u8), (LAST_REG + 1)..=u8::MAX]
}

proptest! {
    /// A masked merge never disturbs bits outside its mask.
    #[test]
    fn patch_preserves_foreign_bits(current: u8, mask: u8, bits: u8) {
        let next = RegisterPatch::new(0x03, mask, bits).apply(current);
        prop_assert_eq!(next & !mask, current & !mask);
        prop_assert_eq!(next & mask, bits & mask);
    }

    /// Merging two patches equals applying them in order.
    #[test]
    fn merge_equals_sequential_apply(current: u8, m1: u8, b1: u8, m2: u8, b2: u8) {
        let first = RegisterPatch::new(0x05, m1, b1);
        let second = RegisterPatch::new(0x05, m2, b2);
        let merged = first.merge(second).unwrap();
        prop_assert_eq!(merged.apply(current), second.apply(first.apply(current)));
    }

    /// Addresses outside the device range are rejected without bus traffic.
    #[test]
    fn out_of_range_is_rejected(addr in out_of_range_addr(), value: u8) {
        let bus = MockRegisterBus::new();
        let mut cache = RegisterCache::new(bus.clone());
        prop_assert_eq!(cache.read(addr), Err(Error::OutOfRange { addr }));
        prop_assert_eq!(cache.write(addr, value), Err(Error::OutOfRange { addr }));
        prop_assert_eq!(bus.reads() + bus.writes(), 0);
    }

    /// After any sequence of writes, some failing, each cached register holds
    /// the last value that was acknowledged, and reading it costs no bus
    /// transaction.
    #[test]
    fn cache_tracks_last_acknowledged_write(
        ops in prop::collection::vec((cached_addr(), any::<u8>(), any::<bool>()), 1..40)
    ) {
        let bus = MockRegisterBus::new();
        let mut cache = RegisterCache::new(bus.clone());
        let mut model: Vec<Option<u8>> = vec![None; usize::from(LAST_REG) + 1];

        for (addr, value, fail) in ops {
            bus.fail_writes(fail);
            let result = cache.write(addr, value);
            prop_assert_eq!(result.is_ok(), !fail);
            if !fail {
                if let Some(slot) = model.get_mut(usize::from(addr)) {
                    *slot = Some(value);
                }
            }
        }
        bus.fail_writes(false);

        let reads = bus.reads();
        for addr in FIRST_REG + 1..=LAST_REG {
            if let Some(Some(expected)) = model.get(usize::from(addr)) {
                prop_assert_eq!(cache.read(addr).unwrap(), *expected);
                prop_assert_eq!(bus.register(addr), *expected);
            }
        }
        prop_assert_eq!(bus.reads(), reads);
    }

    /// Resolution succeeds exactly when the integer ratio is a table entry.
    #[test]
    fn resolve_is_exact_table_lookup(mclk in 1u32..=60_000_000, rate in 1u32..=216_000) {
        let ratio = mclk / rate;
        let in_table = RATIO_TABLE.iter().any(|e| e.ratio == ratio);
        match clock_config(mclk, rate, false) {
            Ok(cfg) => {
                prop_assert!(in_table);
                prop_assert_eq!(cfg.ratio, ratio);
            }
            Err(e) => {
                prop_assert!(!in_table);
                prop_assert_eq!(e, ConfigError::NoMatchingRatio { ratio });
            }
        }
    }

    /// Slave role only replaces the speed mode.
    #[test]
    fn slave_changes_only_speed(entry in prop::sample::select(RATIO_TABLE), rate in 4_000u32..=48_000) {
        let mclk = entry.ratio * rate;
        let master = clock_config(mclk, rate, false).unwrap();
        let slave = clock_config(mclk, rate, true).unwrap();
        prop_assert_eq!(slave.speed, SpeedMode::Slave);
        prop_assert_eq!(slave.divider, master.divider);
        prop_assert_eq!(master.speed, entry.speed);
    }

    /// Resolution is a pure function.
    #[test]
    fn resolve_is_deterministic(mclk: u32, rate: u32, slave: bool) {
        prop_assert_eq!(resolve(mclk, rate, slave), resolve(mclk, rate, slave));
    }
}

#[test]
fn unknown_clock_enumerates_instead_of_resolving() {
    assert!(matches!(
        resolve(0, 48_000, false),
        Ok(Resolution::Rates(_))
    ));
}
