//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform traits for use
//! in unit and integration tests. Every mock is a cheap `Clone` handle onto
//! shared state, so a test can keep one handle while the driver under test
//! owns another.
//!
//! All mocks can append to one [`EventLog`], which lets a test assert the
//! relative order of bus traffic, rail switching and delays.

#![cfg(any(test, feature = "std"))]
// Register file has 256 entries and is only ever indexed by a u8 address.
#![allow(clippy::indexing_slicing)]
#![allow(clippy::arithmetic_side_effects)]

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use crate::bus::RegisterBus;
use crate::power::{SupplyError, SupplySet};

/// One observable side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEvent {
    /// Register read on the bus.
    Read(u8),
    /// Register write on the bus.
    Write(u8, u8),
    /// All rails switched on.
    SuppliesEnabled,
    /// All rails switched off.
    SuppliesDisabled,
    /// Blocking delay of the given nanoseconds.
    DelayNs(u32),
}

/// Shared, ordered record of [`MockEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<MockEvent>>>);

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: MockEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<MockEvent> {
        self.0.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&MockEvent) -> bool) -> Option<usize> {
        self.0.borrow().iter().position(pred)
    }
}

// ── Register bus ─────────────────────────────────────────────────────────────

/// Transport failure injected by [`MockRegisterBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBusError;

#[derive(Debug)]
struct ChipState {
    regs: [u8; 256],
    fail_reads: bool,
    fail_writes: bool,
    fail_write_to: Option<u8>,
    reads: usize,
    writes: usize,
    log: Option<EventLog>,
}

/// In-memory register file standing in for the codec on the bus.
#[derive(Debug, Clone)]
pub struct MockRegisterBus(Rc<RefCell<ChipState>>);

impl MockRegisterBus {
    /// Chip whose registers all read zero.
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ChipState {
            regs: [0; 256],
            fail_reads: false,
            fail_writes: false,
            fail_write_to: None,
            reads: 0,
            writes: 0,
            log: None,
        })))
    }

    /// Preload one register.
    #[must_use]
    pub fn with_register(self, addr: u8, value: u8) -> Self {
        self.set_register(addr, value);
        self
    }

    /// Record every transaction in `log`.
    #[must_use]
    pub fn with_log(self, log: &EventLog) -> Self {
        self.0.borrow_mut().log = Some(log.clone());
        self
    }

    /// Device-side register value, bypassing the transaction counters.
    pub fn register(&self, addr: u8) -> u8 {
        self.0.borrow().regs[usize::from(addr)]
    }

    /// Change a register behind the host's back (hardware-driven change).
    pub fn set_register(&self, addr: u8, value: u8) {
        self.0.borrow_mut().regs[usize::from(addr)] = value;
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.0.borrow_mut().fail_reads = fail;
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.0.borrow_mut().fail_writes = fail;
    }

    /// Make writes to `addr` fail (`None` to stop).
    pub fn fail_write_to(&self, addr: Option<u8>) {
        self.0.borrow_mut().fail_write_to = addr;
    }

    /// Number of read transactions seen.
    pub fn reads(&self) -> usize {
        self.0.borrow().reads
    }

    /// Number of write transactions seen (including failed ones).
    pub fn writes(&self) -> usize {
        self.0.borrow().writes
    }

    /// Wipe the register file to zero, as a hard reset during power loss would.
    pub fn power_cycle(&self) {
        self.0.borrow_mut().regs = [0; 256];
    }
}

impl Default for MockRegisterBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for MockRegisterBus {
    type Error = MockBusError;

    fn read_register(&mut self, addr: u8) -> Result<u8, Self::Error> {
        let mut chip = self.0.borrow_mut();
        chip.reads += 1;
        if let Some(log) = &chip.log {
            log.push(MockEvent::Read(addr));
        }
        if chip.fail_reads {
            return Err(MockBusError);
        }
        Ok(chip.regs[usize::from(addr)])
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        chip.writes += 1;
        if let Some(log) = &chip.log {
            log.push(MockEvent::Write(addr, value));
        }
        if chip.fail_writes || chip.fail_write_to == Some(addr) {
            return Err(MockBusError);
        }
        chip.regs[usize::from(addr)] = value;
        Ok(())
    }
}

// ── Supplies ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SupplyState {
    enabled: bool,
    fail_enable: Option<&'static str>,
    fail_disable: Option<&'static str>,
    enable_calls: usize,
    disable_calls: usize,
    log: Option<EventLog>,
}

/// Supply set that records calls and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct MockSupplies(Rc<RefCell<SupplyState>>);

impl MockSupplies {
    /// All rails off, nothing failing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every call in `log`.
    #[must_use]
    pub fn with_log(self, log: &EventLog) -> Self {
        self.0.borrow_mut().log = Some(log.clone());
        self
    }

    /// Make `enable_all` fail on `rail` (`None` to stop).
    pub fn fail_enable(&self, rail: Option<&'static str>) {
        self.0.borrow_mut().fail_enable = rail;
    }

    /// Make `disable_all` fail on `rail` (`None` to stop).
    pub fn fail_disable(&self, rail: Option<&'static str>) {
        self.0.borrow_mut().fail_disable = rail;
    }

    /// Whether the rails are currently on.
    pub fn is_enabled(&self) -> bool {
        self.0.borrow().enabled
    }

    /// Number of `enable_all` calls.
    pub fn enable_calls(&self) -> usize {
        self.0.borrow().enable_calls
    }

    /// Number of `disable_all` calls.
    pub fn disable_calls(&self) -> usize {
        self.0.borrow().disable_calls
    }
}

impl SupplySet for MockSupplies {
    fn enable_all(&mut self) -> Result<(), SupplyError> {
        let mut state = self.0.borrow_mut();
        state.enable_calls += 1;
        if let Some(rail) = state.fail_enable {
            // A failed bulk enable leaves every rail off.
            state.enabled = false;
            return Err(SupplyError::new(rail));
        }
        state.enabled = true;
        if let Some(log) = &state.log {
            log.push(MockEvent::SuppliesEnabled);
        }
        Ok(())
    }

    fn disable_all(&mut self) -> Result<(), SupplyError> {
        let mut state = self.0.borrow_mut();
        state.disable_calls += 1;
        state.enabled = false;
        if let Some(log) = &state.log {
            log.push(MockEvent::SuppliesDisabled);
        }
        state.fail_disable.map_or(Ok(()), |rail| Err(SupplyError::new(rail)))
    }
}

// ── Delay ────────────────────────────────────────────────────────────────────

/// Delay provider that returns immediately and records requested durations.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Rc<RefCell<u64>>,
    log: Option<EventLog>,
}

impl MockDelay {
    /// Fresh delay with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every delay in `log`.
    #[must_use]
    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Sum of all requested delays.
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
        if let Some(log) = &self.log {
            log.push(MockEvent::DelayNs(ns));
        }
    }
}
