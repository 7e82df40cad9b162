//! Hardware Abstraction Layer (HAL) for the CS4270 codec control core
//!
//! This crate provides trait-based abstractions for everything the codec
//! driver consumes but does not own, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Host audio framework (stream open/close, mixer controls)
//!         ↓
//! Codec control core (cs4270 crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (embedded-hal I2C + GPIO implementations)
//! ```
//!
//! # Abstractions
//!
//! - [`RegisterBus`] - single-register read/write transport
//! - [`SupplySet`] / [`PowerRail`] - power-rail control with rollback
//! - [`CodecDai`] - the entry points the host audio framework calls
//!
//! # Features
//!
//! - `std`: Enable the [`mocks`] module (for downstream tests)
//! - `defmt`: Enable defmt derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{RegisterBus, SupplySet};
//!
//! fn bring_up<B: RegisterBus, S: SupplySet>(bus: &mut B, rails: &mut S) {
//!     rails.enable_all().ok();
//!     let _id = bus.read_register(0x01);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod audio_types;
pub mod bus;
#[cfg(any(test, feature = "std"))]
pub mod mocks;
pub mod power;

// Re-export main high-level traits
pub use audio::{
    ClockRole, CodecDai, DaiFormat, HwParams, RateConstraint, SampleFormat, SerialFormat,
    StreamCapabilities,
};
pub use audio_types::{OutOfRangeError, SampleRateHz};
pub use bus::{I2cRegisterBus, RegisterBus};
pub use power::{BulkSupplies, GpioRail, PowerRail, SupplyError, SupplySet};
