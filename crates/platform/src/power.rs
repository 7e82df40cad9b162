//! Power-rail (supply) abstraction
//!
//! A codec is powered from a small, fixed, ordered set of named rails. The
//! driver only ever asks for "all on" or "all off"; ordering and partial
//! failure handling live here.
//!
//! ## Rollback
//!
//! [`BulkSupplies::enable_all`] enables rails in declaration order. If rail
//! `n` fails, rails `0..n` are disabled again in reverse order before the
//! error is returned. A rail that refuses to switch off again is named in
//! [`SupplyError::stuck`] so the caller can report it.

use embedded_hal::digital::OutputPin;

/// A rail failed to change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("supply rail `{rail}` unavailable")]
pub struct SupplyError {
    /// Name of the rail that failed.
    pub rail: &'static str,
    /// First rail that could not be switched back off while rolling back a
    /// failed enable. Such a rail is still powered.
    pub stuck: Option<&'static str>,
}

impl SupplyError {
    /// Failure of `rail` with nothing left on.
    pub const fn new(rail: &'static str) -> Self {
        Self { rail, stuck: None }
    }
}

/// One switchable power rail.
pub trait PowerRail {
    /// Rail name (e.g. `"va"`).
    fn name(&self) -> &'static str;

    /// Switch the rail on.
    fn enable(&mut self) -> Result<(), SupplyError>;

    /// Switch the rail off.
    fn disable(&mut self) -> Result<(), SupplyError>;
}

/// The complete supply set of one device.
pub trait SupplySet {
    /// Enable every rail. On failure no rail is left enabled.
    fn enable_all(&mut self) -> Result<(), SupplyError>;

    /// Disable every rail, in reverse order.
    ///
    /// Continues past individual failures and reports the first one.
    fn disable_all(&mut self) -> Result<(), SupplyError>;
}

impl<T: SupplySet + ?Sized> SupplySet for &mut T {
    fn enable_all(&mut self) -> Result<(), SupplyError> {
        (**self).enable_all()
    }

    fn disable_all(&mut self) -> Result<(), SupplyError> {
        (**self).disable_all()
    }
}

/// Fixed-size, ordered set of rails of one type.
pub struct BulkSupplies<R, const N: usize> {
    rails: [R; N],
}

impl<R: PowerRail, const N: usize> BulkSupplies<R, N> {
    /// Wrap `rails`; enable order is array order.
    pub fn new(rails: [R; N]) -> Self {
        Self { rails }
    }

    /// Rail names in enable order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rails.iter().map(PowerRail::name)
    }

    /// Give back the rails.
    pub fn release(self) -> [R; N] {
        self.rails
    }
}

impl<R: PowerRail, const N: usize> SupplySet for BulkSupplies<R, N> {
    fn enable_all(&mut self) -> Result<(), SupplyError> {
        for idx in 0..N {
            let Some(rail) = self.rails.get_mut(idx) else {
                break;
            };
            if let Err(mut err) = rail.enable() {
                if let Some(enabled) = self.rails.get_mut(..idx) {
                    for rail in enabled.iter_mut().rev() {
                        if let Err(stuck) = rail.disable() {
                            err.stuck.get_or_insert(stuck.rail);
                        }
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn disable_all(&mut self) -> Result<(), SupplyError> {
        let mut first_err = None;
        for rail in self.rails.iter_mut().rev() {
            if let Err(err) = rail.disable() {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Rail switched by a load-switch / LDO enable pin.
pub struct GpioRail<P> {
    name: &'static str,
    pin: P,
    active_high: bool,
}

impl<P: OutputPin> GpioRail<P> {
    /// Rail that is on while `pin` is high.
    pub fn active_high(name: &'static str, pin: P) -> Self {
        Self {
            name,
            pin,
            active_high: true,
        }
    }

    /// Rail that is on while `pin` is low.
    pub fn active_low(name: &'static str, pin: P) -> Self {
        Self {
            name,
            pin,
            active_high: false,
        }
    }

    /// Give back the enable pin.
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, on: bool) -> Result<(), SupplyError> {
        let result = if on == self.active_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| SupplyError::new(self.name))
    }
}

impl<P: OutputPin> PowerRail for GpioRail<P> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn enable(&mut self) -> Result<(), SupplyError> {
        self.drive(true)
    }

    fn disable(&mut self) -> Result<(), SupplyError> {
        self.drive(false)
    }
}
