//! Write-through register cache.
//!
//! The cache mirrors every non-volatile register so reads cost no bus
//! traffic and so the full register image can be replayed after the chip
//! loses power. A slot only changes after the bus acknowledged the write,
//! so after any error it still holds the last value the device accepted.
//!
//! While [`RegisterCache::set_cache_only`] is on (device powered down) writes
//! land in the cache alone and are pushed out by the next [`RegisterCache::sync`].
//! Volatile registers cannot be read in that mode.

use platform::RegisterBus;

use crate::error::Error;
use crate::registers::{RegisterDescriptor, RegisterMap, RegisterPatch, CACHE_SIZE, CS4270_MAP};

/// Register cache in front of a [`RegisterBus`].
#[derive(Debug)]
pub struct RegisterCache<B> {
    bus: B,
    map: RegisterMap,
    values: [u8; CACHE_SIZE],
    cache_only: bool,
}

impl<B: RegisterBus> RegisterCache<B> {
    /// Cache for the CS4270 register file, seeded with power-on defaults.
    pub fn new(bus: B) -> Self {
        Self::with_map(bus, CS4270_MAP)
    }

    /// Cache over an explicit register map.
    pub fn with_map(bus: B, map: RegisterMap) -> Self {
        let values = map.slots.map(|slot| slot.default);
        Self {
            bus,
            map,
            values,
            cache_only: false,
        }
    }

    fn descriptor(&self, addr: u8) -> Result<RegisterDescriptor, Error<B::Error>> {
        let desc = *self
            .map
            .descriptor(addr)
            .ok_or(Error::OutOfRange { addr })?;
        if !desc.readable {
            return Err(Error::Unreadable { addr });
        }
        Ok(desc)
    }

    fn slot(&mut self, addr: u8) -> Result<&mut u8, Error<B::Error>> {
        self.values
            .get_mut(usize::from(addr))
            .ok_or(Error::OutOfRange { addr })
    }

    /// Read `addr`: from the cache, or from the bus for volatile registers.
    pub fn read(&mut self, addr: u8) -> Result<u8, Error<B::Error>> {
        let desc = self.descriptor(addr)?;
        if desc.volatile {
            if self.cache_only {
                return Err(Error::PoweredDown { addr });
            }
            let value = self.bus.read_register(addr).map_err(Error::Bus)?;
            *self.slot(addr)? = value;
            trace!("cs4270: read {:#x} = {:#x} (bus)", addr, value);
            return Ok(value);
        }
        self.slot(addr).map(|v| *v)
    }

    /// Write `value` to `addr`; the cache follows only on success.
    pub fn write(&mut self, addr: u8, value: u8) -> Result<(), Error<B::Error>> {
        self.descriptor(addr)?;
        if !self.cache_only {
            self.bus.write_register(addr, value).map_err(Error::Bus)?;
        }
        *self.slot(addr)? = value;
        trace!("cs4270: write {:#x} = {:#x}", addr, value);
        Ok(())
    }

    /// Apply a masked update. Returns whether the register value changed;
    /// an unchanged value issues no bus write.
    pub fn update(&mut self, patch: RegisterPatch) -> Result<bool, Error<B::Error>> {
        let addr = patch.register();
        let current = self.read(addr)?;
        let next = patch.apply(current);
        if next == current {
            return Ok(false);
        }
        self.write(addr, next)?;
        Ok(true)
    }

    /// Cached value of `addr` without touching the bus.
    pub fn cached(&self, addr: u8) -> Option<u8> {
        self.map.descriptor(addr)?;
        self.values.get(usize::from(addr)).copied()
    }

    /// Push every cached, non-volatile register to the device in ascending
    /// address order. Stops at the first failed write.
    pub fn sync(&mut self) -> Result<(), Error<B::Error>> {
        for addr in self.map.first..=self.map.last {
            let Some(desc) = self.map.descriptor(addr) else {
                continue;
            };
            if !desc.readable || desc.volatile {
                continue;
            }
            let value = self.cached(addr).ok_or(Error::OutOfRange { addr })?;
            self.bus.write_register(addr, value).map_err(|e| {
                warn!("cs4270: sync of {:#x} failed", addr);
                Error::Bus(e)
            })?;
        }
        debug!("cs4270: register cache synced");
        Ok(())
    }

    /// Route writes to the cache only (`true`) or back through to the bus.
    pub fn set_cache_only(&mut self, cache_only: bool) {
        self.cache_only = cache_only;
    }

    /// Whether writes currently bypass the bus.
    pub fn is_cache_only(&self) -> bool {
        self.cache_only
    }

    /// Give back the bus.
    pub fn release(self) -> B {
        self.bus
    }
}
