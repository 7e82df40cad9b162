//! Device lifecycle state machine.
//!
//! ```text
//! [Uninitialized] --attach--> [Active] --suspend--> [Suspended]
//!                               ^    |                 |   |
//!                               |    +---detach---+    |   |
//!                               +-----resume------|----+   |
//!                                                 v        |
//!                                            [Detached] <--+ detach
//! ```
//!
//! The host framework drives suspend and resume through `&mut self` calls,
//! so the state is tracked at runtime rather than in the type. Illegal
//! transitions are reported, never performed.

use core::fmt;

/// Lifecycle state of one device instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Identity not verified yet.
    #[default]
    Uninitialized,
    /// Rails on, device programmed.
    Active,
    /// Device powered down, rails off, registers held in the cache.
    Suspended,
    /// Resources released; terminal.
    Detached,
}

/// Lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    /// Identity verified and rails enabled.
    Attach,
    /// System suspend.
    Suspend,
    /// System resume.
    Resume,
    /// Device removal.
    Detach,
}

impl PowerEvent {
    /// Operation name used in error reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Attach => "attach",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
            Self::Detach => "detach",
        }
    }
}

impl PowerState {
    /// State after `event`, or `None` if the transition is illegal.
    pub const fn next(self, event: PowerEvent) -> Option<Self> {
        match (self, event) {
            (Self::Uninitialized, PowerEvent::Attach) => Some(Self::Active),
            (Self::Active, PowerEvent::Suspend) => Some(Self::Suspended),
            (Self::Suspended, PowerEvent::Resume) => Some(Self::Active),
            (Self::Active | Self::Suspended, PowerEvent::Detach) => Some(Self::Detached),
            _ => None,
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Detached => "detached",
        }
    }

    /// Whether register traffic may reach the device.
    pub const fn is_powered(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
