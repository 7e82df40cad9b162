//! CS4270 codec driver.
//!
//! # Attach sequence
//!
//! 1. Read the chip ID; anything without the `0xC` signature is rejected
//!    before a single rail is touched.
//! 2. Enable the VA / VD / VLC rails and let them settle.
//! 3. Disable auto-mute and the soft-ramp / zero-cross volume transitions.
//!    The host manages muting itself and ramping would delay every volume
//!    step by up to one zero crossing.
//!
//! # Suspend / resume
//!
//! Suspend sets the three power-down bits and only then cuts the rails.
//! From that point the cache is authoritative and writes stay in it.
//! Resume restores the rails, waits for them to settle, replays the whole
//! cache (power-down bits included) and finally clears power-down.
//! A failed resume puts the rails back off and stays suspended, so it can
//! be retried.

use embedded_hal::delay::DelayNs;
use platform::{
    CodecDai, DaiFormat, HwParams, RateConstraint, RegisterBus, SampleFormat, SampleRateHz,
    StreamCapabilities, SupplySet,
};

use crate::cache::RegisterCache;
use crate::controls::{self, Control, ControlValue};
use crate::error::{ConfigError, Error};
use crate::format::{self, InterfaceConfig};
use crate::lifecycle::{PowerEvent, PowerState};
use crate::mute::{Channels, MuteState};
use crate::ratio::{self, ClockConfig};
use crate::registers::{
    RegisterPatch, CHIPID_ID, CHIPID_REV, CHIP_SIGNATURE, MUTE_AUTO, PWRCTL_PDN_ALL, REG_CHIPID,
    REG_PWRCTL, REG_TRANS, TRANS_SOFT, TRANS_ZERO,
};

/// Power rails, in the order they are switched on.
pub const SUPPLY_NAMES: [&str; 3] = ["va", "vd", "vlc"];

/// Shortest wait between enabling the rails and the first register access.
pub const MIN_SETTLE_NS: u32 = 500;

const SAMPLE_FORMATS: &[SampleFormat] = &[
    SampleFormat::S8,
    SampleFormat::S16Le,
    SampleFormat::S16Be,
    SampleFormat::S18_3Le,
    SampleFormat::S18_3Be,
    SampleFormat::S20_3Le,
    SampleFormat::S20_3Be,
    SampleFormat::S24_3Le,
    SampleFormat::S24_3Be,
    SampleFormat::S24Le,
    SampleFormat::S24Be,
];

/// Playback stream capabilities.
pub const PLAYBACK: StreamCapabilities = StreamCapabilities {
    stream_name: "Playback",
    channels_min: 1,
    channels_max: 2,
    rate_min: SampleRateHz::MIN_HZ,
    rate_max: SampleRateHz::MAX_HZ,
    formats: SAMPLE_FORMATS,
};

/// Capture stream capabilities.
pub const CAPTURE: StreamCapabilities = StreamCapabilities {
    stream_name: "Capture",
    ..PLAYBACK
};

/// Board-level tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cs4270Config {
    /// Rail settle time in ns; values below [`MIN_SETTLE_NS`] are raised to it.
    pub settle_ns: u32,
}

impl Cs4270Config {
    /// Settle time actually used.
    pub fn settle_ns(&self) -> u32 {
        self.settle_ns.max(MIN_SETTLE_NS)
    }
}

impl Default for Cs4270Config {
    fn default() -> Self {
        Self {
            settle_ns: MIN_SETTLE_NS,
        }
    }
}

const OPERATIONAL: &[PowerState] = &[PowerState::Active, PowerState::Suspended];

/// One CS4270 on a register bus.
#[derive(Debug)]
pub struct Cs4270<B, S, D> {
    regs: RegisterCache<B>,
    supplies: S,
    delay: D,
    config: Cs4270Config,
    revision: u8,
    state: PowerState,
    reference_clock_hz: u32,
    interface: Option<InterfaceConfig>,
    clock: Option<ClockConfig>,
    mute: MuteState,
}

impl<B, S, D> Cs4270<B, S, D>
where
    B: RegisterBus,
    S: SupplySet,
    D: DelayNs,
{
    /// Verify the device, power it and apply the driver's register policy.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] if the chip ID is wrong (no rail is touched)
    /// - [`Error::SupplyUnavailable`] if a rail cannot be enabled
    /// - [`Error::Bus`] on transport failure; rails are switched back off
    pub fn attach(
        bus: B,
        supplies: S,
        delay: D,
        config: Cs4270Config,
    ) -> Result<Self, Error<B::Error>> {
        let mut regs = RegisterCache::new(bus);
        let chip_id = regs.read(REG_CHIPID)?;
        if CHIPID_ID.get(chip_id) != CHIP_SIGNATURE {
            error!("cs4270: unexpected chip id {:#x}", chip_id);
            return Err(Error::DeviceNotFound { chip_id });
        }
        let revision = CHIPID_REV.get(chip_id);
        info!("cs4270: found device, revision {}", revision);

        let mut codec = Self {
            regs,
            supplies,
            delay,
            config,
            revision,
            state: PowerState::Uninitialized,
            reference_clock_hz: 0,
            interface: None,
            clock: None,
            mute: MuteState::new(),
        };
        let next = codec.advance(PowerEvent::Attach)?;

        codec.rails_on()?;
        codec.delay.delay_ns(codec.config.settle_ns());
        if let Err(e) = codec.apply_policy() {
            error!("cs4270: initial configuration failed");
            codec.rails_off();
            return Err(e);
        }
        codec.state = next;
        Ok(codec)
    }

    fn apply_policy(&mut self) -> Result<(), Error<B::Error>> {
        self.regs.update(MUTE_AUTO.set(0))?;
        self.regs.update(RegisterPatch::new(
            REG_TRANS,
            TRANS_SOFT.mask() | TRANS_ZERO.mask(),
            0,
        ))?;
        Ok(())
    }

    fn rails_on(&mut self) -> Result<(), Error<B::Error>> {
        self.supplies.enable_all().map_err(|e| {
            warn!("cs4270: rail {} failed to enable, rolled back", e.rail);
            if let Some(stuck) = e.stuck {
                error!("cs4270: rail {} still on after rollback", stuck);
            }
            Error::from(e)
        })
    }

    fn rails_off(&mut self) {
        if let Err(e) = self.supplies.disable_all() {
            warn!("cs4270: failed to disable rail {}", e.rail);
        }
    }

    fn ensure(&self, operation: &'static str) -> Result<(), Error<B::Error>> {
        match self.state {
            PowerState::Detached => Err(Error::DeviceDetached),
            state if OPERATIONAL.contains(&state) => Ok(()),
            state => Err(Error::InvalidState { state, operation }),
        }
    }

    fn advance(&self, event: PowerEvent) -> Result<PowerState, Error<B::Error>> {
        if self.state == PowerState::Detached {
            return Err(Error::DeviceDetached);
        }
        self.state.next(event).ok_or(Error::InvalidState {
            state: self.state,
            operation: event.name(),
        })
    }

    /// Record the reference clock (0 = unknown) and return the rates that
    /// can be offered with it.
    pub fn set_sysclk(&mut self, reference_clock_hz: u32) -> Result<RateConstraint, Error<B::Error>> {
        self.ensure("set_sysclk")?;
        self.reference_clock_hz = reference_clock_hz;
        debug!("cs4270: reference clock {} Hz", reference_clock_hz);
        Ok(ratio::supported_rates(reference_clock_hz))
    }

    /// Select serial format and clock role. Nothing is written until
    /// [`Cs4270::hw_params`].
    pub fn set_fmt(&mut self, fmt: DaiFormat) -> Result<(), Error<B::Error>> {
        self.ensure("set_fmt")?;
        let interface = InterfaceConfig::validate(fmt).map_err(|e| {
            warn!("cs4270: rejected DAI format");
            e
        })?;
        self.interface = Some(interface);
        Ok(())
    }

    /// Program clocking and serial format for a stream.
    ///
    /// All validation happens before the first write.
    pub fn hw_params(&mut self, params: &HwParams) -> Result<(), Error<B::Error>> {
        self.ensure("hw_params")?;
        if !PLAYBACK.supports(params) {
            return Err(ConfigError::UnsupportedStream.into());
        }
        let interface = self.interface.ok_or(ConfigError::FormatNotSet)?;
        let rate = params.rate.get();
        let patches = format::configure(interface, self.reference_clock_hz, rate).map_err(|e| {
            warn!(
                "cs4270: no clock mode for {} Hz at {} Hz MCLK",
                rate, self.reference_clock_hz
            );
            e
        })?;
        self.regs.update(patches.mode)?;
        self.regs.update(patches.format)?;
        self.clock = Some(patches.clock);
        debug!("cs4270: {} Hz, ratio {}", rate, patches.clock.ratio);
        Ok(())
    }

    /// Stream mute (`true` on stop, `false` on start).
    pub fn digital_mute(&mut self, mute: bool) -> Result<(), Error<B::Error>> {
        self.ensure("digital_mute")?;
        let (next, patch) = self.mute.stream_mute(mute);
        self.regs.update(patch)?;
        self.mute = next;
        Ok(())
    }

    /// Mute exactly `channels` at the user's request. The request is kept
    /// even if the write fails.
    pub fn set_user_mute(&mut self, channels: Channels) -> Result<(), Error<B::Error>> {
        self.ensure("set_user_mute")?;
        let (next, patch) = self.mute.user_mute(channels);
        self.mute = next;
        self.regs.update(patch)?;
        Ok(())
    }

    /// Power the device down and cut its rails.
    pub fn suspend(&mut self) -> Result<(), Error<B::Error>> {
        let next = self.advance(PowerEvent::Suspend)?;
        self.regs
            .update(RegisterPatch::new(REG_PWRCTL, PWRCTL_PDN_ALL, PWRCTL_PDN_ALL))?;
        self.regs.set_cache_only(true);
        self.state = next;
        debug!("cs4270: suspended");
        // The device is quiescent either way; a stuck rail is reported but
        // resume still re-enables everything.
        self.supplies.disable_all()?;
        Ok(())
    }

    /// Restore rails and register contents, then leave power-down.
    pub fn resume(&mut self) -> Result<(), Error<B::Error>> {
        let next = self.advance(PowerEvent::Resume)?;
        self.rails_on()?;
        self.delay.delay_ns(self.config.settle_ns());
        self.regs.set_cache_only(false);
        if let Err(e) = self.restore() {
            error!("cs4270: resume failed");
            self.regs.set_cache_only(true);
            self.rails_off();
            return Err(e);
        }
        self.state = next;
        debug!("cs4270: resumed");
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Error<B::Error>> {
        self.regs.sync()?;
        self.regs
            .update(RegisterPatch::new(REG_PWRCTL, PWRCTL_PDN_ALL, 0))?;
        Ok(())
    }

    /// Release the rails; every later operation fails with
    /// [`Error::DeviceDetached`].
    pub fn detach(&mut self) -> Result<(), Error<B::Error>> {
        let next = self.advance(PowerEvent::Detach)?;
        let was_powered = self.state.is_powered();
        self.state = next;
        self.regs.set_cache_only(true);
        info!("cs4270: detached");
        if was_powered {
            self.supplies.disable_all()?;
        }
        Ok(())
    }

    /// Hand back bus, supplies and delay. Only a detached device can be
    /// released; otherwise it is returned unchanged.
    pub fn release(self) -> Result<(B, S, D), Self> {
        if self.state != PowerState::Detached {
            return Err(self);
        }
        Ok((self.regs.release(), self.supplies, self.delay))
    }

    /// Current value of a mixer control.
    pub fn get_control(&mut self, control: Control) -> Result<ControlValue, Error<B::Error>> {
        self.ensure("get_control")?;
        if control == Control::PlaybackSwitch {
            return Ok(controls::switch_value(self.mute.user()));
        }
        let regs = &mut self.regs;
        control.decode(|addr| regs.read(addr))
    }

    /// Set a mixer control. Returns whether its value changed.
    pub fn put_control(
        &mut self,
        control: Control,
        value: ControlValue,
    ) -> Result<bool, Error<B::Error>> {
        self.ensure("put_control")?;
        let invalid = Error::InvalidControlValue {
            control: control.name(),
        };
        if control == Control::PlaybackSwitch {
            let channels = controls::muted_channels(value).ok_or(invalid)?;
            let changed = channels != self.mute.user();
            self.set_user_mute(channels)?;
            return Ok(changed);
        }
        let mut changed = false;
        for patch in control.encode(value).ok_or(invalid)? {
            changed |= self.regs.update(patch)?;
        }
        Ok(changed)
    }

    /// Read a register through the cache. The chip ID always comes from the
    /// bus and fails with [`Error::PoweredDown`] while suspended.
    pub fn read_register(&mut self, addr: u8) -> Result<u8, Error<B::Error>> {
        self.ensure("read_register")?;
        self.regs.read(addr)
    }

    /// Cached register value, no bus access.
    pub fn cached_register(&self, addr: u8) -> Option<u8> {
        self.regs.cached(addr)
    }

    /// Silicon revision from the chip ID.
    pub fn revision(&self) -> u8 {
        self.revision
    }

    /// Lifecycle state.
    pub fn power_state(&self) -> PowerState {
        self.state
    }

    /// Reference clock recorded by [`Cs4270::set_sysclk`].
    pub fn reference_clock_hz(&self) -> u32 {
        self.reference_clock_hz
    }

    /// Interface recorded by [`Cs4270::set_fmt`].
    pub fn interface(&self) -> Option<InterfaceConfig> {
        self.interface
    }

    /// Clocking programmed by the last successful [`Cs4270::hw_params`].
    pub fn clock(&self) -> Option<ClockConfig> {
        self.clock
    }

    /// Mute arbitration state.
    pub fn mute_state(&self) -> MuteState {
        self.mute
    }
}

impl<B, S, D> CodecDai for Cs4270<B, S, D>
where
    B: RegisterBus,
    S: SupplySet,
    D: DelayNs,
{
    type Error = Error<B::Error>;

    fn set_sysclk(&mut self, reference_clock_hz: u32) -> Result<RateConstraint, Self::Error> {
        Cs4270::set_sysclk(self, reference_clock_hz)
    }

    fn set_fmt(&mut self, fmt: DaiFormat) -> Result<(), Self::Error> {
        Cs4270::set_fmt(self, fmt)
    }

    fn hw_params(&mut self, params: &HwParams) -> Result<(), Self::Error> {
        Cs4270::hw_params(self, params)
    }

    fn digital_mute(&mut self, mute: bool) -> Result<(), Self::Error> {
        Cs4270::digital_mute(self, mute)
    }

    fn suspend(&mut self) -> Result<(), Self::Error> {
        Cs4270::suspend(self)
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        Cs4270::resume(self)
    }
}
