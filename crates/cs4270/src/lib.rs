//! Control core for the Cirrus Logic CS4270 stereo audio codec
//!
//! The CS4270 is a 24-bit, 192 kHz stereo ADC + DAC controlled over I²C.
//! This crate owns everything between the host audio framework and the
//! register bus:
//!
//! ```text
//! Host audio framework (CodecDai calls, mixer controls)
//!         ↓
//! Cs4270 driver ── lifecycle, mute arbitration, format/clock configuration
//!         ↓
//! RegisterCache ── write-through cache, masked updates, resync
//!         ↓
//! platform::RegisterBus (I²C)      platform::SupplySet (VA / VD / VLC)
//! ```
//!
//! # Features
//!
//! - `defmt`: log through defmt and derive `defmt::Format` on public types
//! - `tracing`: log through tracing (host builds)
//! - `vd33-errata`: drop the 96x MCLK ratio for boards with VD = 3.3 V
//!
//! # Example
//!
//! ```no_run
//! use cs4270::{Cs4270, Cs4270Config};
//! use platform::{ClockRole, DaiFormat, HwParams, SampleFormat, SampleRateHz, SerialFormat};
//! # fn run<B, S, D>(bus: B, supplies: S, delay: D) -> Result<(), cs4270::Error<B::Error>>
//! # where B: platform::RegisterBus, S: platform::SupplySet, D: embedded_hal::delay::DelayNs {
//! let mut codec = Cs4270::attach(bus, supplies, delay, Cs4270Config::default())?;
//! codec.set_sysclk(12_288_000)?;
//! codec.set_fmt(DaiFormat { format: SerialFormat::I2s, role: ClockRole::Slave })?;
//! # let rate = SampleRateHz::new(48_000).map_err(|_| cs4270::ConfigError::InvalidSampleRate)?;
//! codec.hw_params(&HwParams { rate, channels: 2, sample_format: SampleFormat::S24Le })?;
//! codec.digital_mute(false)?;
//! # Ok(()) }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Must come first so the logging macros are visible to later modules.
#[macro_use]
mod fmt;

pub mod cache;
pub mod controls;
pub mod driver;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod mute;
pub mod ratio;
pub mod registers;
pub mod shared;

pub use cache::RegisterCache;
pub use controls::{Control, ControlKind, ControlValue};
pub use driver::{Cs4270, Cs4270Config, CAPTURE, MIN_SETTLE_NS, PLAYBACK, SUPPLY_NAMES};
pub use error::{ConfigError, Error};
pub use format::InterfaceConfig;
pub use lifecycle::{PowerEvent, PowerState};
pub use mute::{Channels, MuteState, StreamMute};
pub use ratio::{ClockConfig, Resolution};
pub use shared::SharedCs4270;
