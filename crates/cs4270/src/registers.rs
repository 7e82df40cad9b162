//! CS4270 register map
//!
//! Source: Cirrus Logic CS4270 datasheet, Section 8 (Register Description).
//!
//! # Key constraints
//!
//! ## Addressable range
//! Registers 0x01..=0x08 exist. Address 0x00 has a cache slot so addresses
//! index the cache directly, but it is not a device register.
//!
//! ## Chip ID
//! Register 0x01 is read-only. Bits \[7:4\] carry the part signature `0xC`,
//! bits \[3:0\] the silicon revision. It is never cached: every read goes to
//! the bus.
//!
//! ## Inverted fields
//! Volume registers are attenuation (0x00 = 0 dB) and the mute bits are
//! active-high. The mixer layer converts them to "bigger is louder" values.

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// 7-bit I²C address with AD2..AD0 strapped low.
pub const I2C_ADDR_BASE: u8 = 0x48;
/// Highest strap-selectable I²C address.
pub const I2C_ADDR_MAX: u8 = 0x4F;

/// I²C address for the AD2..AD0 strap levels in the low three bits.
pub const fn i2c_address(straps: u8) -> u8 {
    I2C_ADDR_BASE | (straps & (I2C_ADDR_MAX ^ I2C_ADDR_BASE))
}

/// Chip ID / revision (read-only, volatile).
pub const REG_CHIPID: u8 = 0x01;
/// Power control.
pub const REG_PWRCTL: u8 = 0x02;
/// Functional mode: speed, MCLK divider, popguard.
pub const REG_MODE: u8 = 0x03;
/// Serial format, loopback, volume freeze.
pub const REG_FORMAT: u8 = 0x04;
/// Transition and polarity control.
pub const REG_TRANS: u8 = 0x05;
/// Mute control.
pub const REG_MUTE: u8 = 0x06;
/// DAC channel A volume (attenuation).
pub const REG_VOLA: u8 = 0x07;
/// DAC channel B volume (attenuation).
pub const REG_VOLB: u8 = 0x08;

/// First device register.
pub const FIRST_REG: u8 = REG_CHIPID;
/// Last device register.
pub const LAST_REG: u8 = REG_VOLB;
/// Cache slots, indexed by address (slot 0 is a placeholder).
pub const CACHE_SIZE: usize = LAST_REG as usize + 1;

/// Expected value of [`CHIPID_ID`].
pub const CHIP_SIGNATURE: u8 = 0xC;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// A contiguous bit field inside one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    reg: u8,
    mask: u8,
    shift: u8,
}

impl Field {
    /// Bits `hi..=lo` of `reg`.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn new(reg: u8, hi: u8, lo: u8) -> Self {
        let width = hi - lo + 1;
        let mask = if width >= 8 {
            0xFF
        } else {
            ((1u8 << width) - 1) << lo
        };
        Self {
            reg,
            mask,
            shift: lo,
        }
    }

    /// Single bit `n` of `reg`.
    pub const fn bit(reg: u8, n: u8) -> Self {
        Self::new(reg, n, n)
    }

    /// Register holding this field.
    pub const fn register(self) -> u8 {
        self.reg
    }

    /// Field mask in register position.
    pub const fn mask(self) -> u8 {
        self.mask
    }

    /// Largest value the field can hold.
    pub const fn max(self) -> u8 {
        self.mask >> self.shift
    }

    /// Extract the field from a full register value.
    pub const fn get(self, reg_value: u8) -> u8 {
        (reg_value & self.mask) >> self.shift
    }

    /// Patch setting the field to `value` (excess bits are dropped).
    pub const fn set(self, value: u8) -> RegisterPatch {
        RegisterPatch::new(self.reg, self.mask, value.wrapping_shl(self.shift as u32))
    }
}

/// Masked update of one register: bits outside `mask` are preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterPatch {
    reg: u8,
    mask: u8,
    bits: u8,
}

impl RegisterPatch {
    /// Patch writing `bits & mask` into `reg`.
    pub const fn new(reg: u8, mask: u8, bits: u8) -> Self {
        Self {
            reg,
            mask,
            bits: bits & mask,
        }
    }

    /// Target register.
    pub const fn register(self) -> u8 {
        self.reg
    }

    /// Bits this patch owns.
    pub const fn mask(self) -> u8 {
        self.mask
    }

    /// New value of the owned bits.
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// `(current & !mask) | bits`
    pub const fn apply(self, current: u8) -> u8 {
        (current & !self.mask) | self.bits
    }

    /// Combine two patches for the same register; `other` wins on overlap.
    ///
    /// Returns `None` when the registers differ.
    pub const fn merge(self, other: Self) -> Option<Self> {
        if self.reg != other.reg {
            return None;
        }
        Some(Self {
            reg: self.reg,
            mask: self.mask | other.mask,
            bits: (self.bits & !other.mask) | other.bits,
        })
    }
}

/// Part signature, `0xC` for a CS4270.
pub const CHIPID_ID: Field = Field::new(REG_CHIPID, 7, 4);
/// Silicon revision.
pub const CHIPID_REV: Field = Field::new(REG_CHIPID, 3, 0);

/// Freeze: latch control changes until cleared.
pub const PWRCTL_FREEZE: Field = Field::bit(REG_PWRCTL, 7);
/// ADC power-down.
pub const PWRCTL_PDN_ADC: Field = Field::bit(REG_PWRCTL, 5);
/// DAC power-down.
pub const PWRCTL_PDN_DAC: Field = Field::bit(REG_PWRCTL, 1);
/// Global power-down.
pub const PWRCTL_PDN: Field = Field::bit(REG_PWRCTL, 0);
/// ADC, DAC and global power-down together.
pub const PWRCTL_PDN_ALL: u8 = 0x23;

/// Functional speed mode (see [`SpeedMode`]).
pub const MODE_SPEED: Field = Field::new(REG_MODE, 5, 4);
/// MCLK divider (see [`Divider`]).
pub const MODE_DIV: Field = Field::new(REG_MODE, 3, 1);
/// Popguard transient control (set = disabled).
pub const MODE_POPGUARD: Field = Field::bit(REG_MODE, 0);

/// Freeze channel A volume.
pub const FORMAT_FREEZE_A: Field = Field::bit(REG_FORMAT, 7);
/// Freeze channel B volume.
pub const FORMAT_FREEZE_B: Field = Field::bit(REG_FORMAT, 6);
/// Digital loopback ADC to DAC (sidetone).
pub const FORMAT_LOOPBACK: Field = Field::bit(REG_FORMAT, 5);
/// DAC serial format (see [`DacFormat`]).
pub const FORMAT_DAC: Field = Field::new(REG_FORMAT, 4, 3);
/// ADC serial format (see [`AdcFormat`]).
pub const FORMAT_ADC: Field = Field::bit(REG_FORMAT, 0);

/// Single volume control for both channels.
pub const TRANS_ONE_VOL: Field = Field::bit(REG_TRANS, 7);
/// Soft ramp volume changes.
pub const TRANS_SOFT: Field = Field::bit(REG_TRANS, 6);
/// Apply volume changes on zero crossings.
pub const TRANS_ZERO: Field = Field::bit(REG_TRANS, 5);
/// Invert ADC channel B.
pub const TRANS_INV_ADC_B: Field = Field::bit(REG_TRANS, 4);
/// Invert ADC channel A.
pub const TRANS_INV_ADC_A: Field = Field::bit(REG_TRANS, 3);
/// Invert DAC channel B.
pub const TRANS_INV_DAC_B: Field = Field::bit(REG_TRANS, 2);
/// Invert DAC channel A.
pub const TRANS_INV_DAC_A: Field = Field::bit(REG_TRANS, 1);
/// 44.1 kHz de-emphasis filter.
pub const TRANS_DEEMPH: Field = Field::bit(REG_TRANS, 0);

/// Automatic mute on 8192 consecutive zero samples.
pub const MUTE_AUTO: Field = Field::bit(REG_MUTE, 5);
/// Mute ADC channel B.
pub const MUTE_ADC_B: Field = Field::bit(REG_MUTE, 4);
/// Mute ADC channel A.
pub const MUTE_ADC_A: Field = Field::bit(REG_MUTE, 3);
/// MUTEA/MUTEB pin polarity.
pub const MUTE_POLARITY: Field = Field::bit(REG_MUTE, 2);
/// Mute DAC channel B.
pub const MUTE_DAC_B: Field = Field::bit(REG_MUTE, 1);
/// Mute DAC channel A.
pub const MUTE_DAC_A: Field = Field::bit(REG_MUTE, 0);
/// Both DAC mute bits, channel A in bit 0.
pub const MUTE_DAC: Field = Field::new(REG_MUTE, 1, 0);

/// Channel A attenuation.
pub const VOLA: Field = Field::new(REG_VOLA, 7, 0);
/// Channel B attenuation.
pub const VOLB: Field = Field::new(REG_VOLB, 7, 0);

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// [`MODE_SPEED`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SpeedMode {
    /// Single speed, 4–54 kHz.
    Single = 0,
    /// Double speed, 50–108 kHz.
    Double = 1,
    /// Quad speed, 100–216 kHz.
    Quad = 2,
    /// Slave auto-detect: speed derived from the incoming clocks.
    Slave = 3,
}

impl SpeedMode {
    /// Raw field value.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// [`MODE_DIV`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Divider {
    /// MCLK / 1
    Div1 = 0,
    /// MCLK / 1.5
    Div1_5 = 1,
    /// MCLK / 2
    Div2 = 2,
    /// MCLK / 3
    Div3 = 3,
    /// MCLK / 4
    Div4 = 4,
}

impl Divider {
    /// Raw field value.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// [`FORMAT_DAC`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DacFormat {
    /// Left-justified, up to 24 bit.
    LeftJustified = 0,
    /// I²S, up to 24 bit.
    I2s = 1,
    /// Right-justified, 24 bit.
    RightJustified24 = 2,
    /// Right-justified, 16 bit.
    RightJustified16 = 3,
}

/// [`FORMAT_ADC`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcFormat {
    /// Left-justified, 24 bit.
    LeftJustified = 0,
    /// I²S, 24 bit.
    I2s = 1,
}

// ---------------------------------------------------------------------------
// Descriptor table
// ---------------------------------------------------------------------------

/// Static properties of one cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDescriptor {
    /// Power-on value.
    pub default: u8,
    /// Whether the address may be accessed through the cache at all.
    pub readable: bool,
    /// Whether the value can change without a host write.
    pub volatile: bool,
}

impl RegisterDescriptor {
    const fn plain(default: u8) -> Self {
        Self {
            default,
            readable: true,
            volatile: false,
        }
    }
}

/// Address range and per-slot descriptors of a register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    /// Lowest valid address.
    pub first: u8,
    /// Highest valid address.
    pub last: u8,
    /// One entry per cache slot, indexed by address.
    pub slots: [RegisterDescriptor; CACHE_SIZE],
}

impl RegisterMap {
    /// Descriptor for `addr`, or `None` outside `first..=last`.
    pub fn descriptor(&self, addr: u8) -> Option<&RegisterDescriptor> {
        if (self.first..=self.last).contains(&addr) {
            self.slots.get(usize::from(addr))
        } else {
            None
        }
    }
}

/// The CS4270 register file.
pub const CS4270_MAP: RegisterMap = RegisterMap {
    first: FIRST_REG,
    last: LAST_REG,
    slots: [
        // 0x00: no such register
        RegisterDescriptor {
            default: 0x00,
            readable: false,
            volatile: false,
        },
        // CHIPID
        RegisterDescriptor {
            default: 0x00,
            readable: true,
            volatile: true,
        },
        RegisterDescriptor::plain(0x00), // PWRCTL
        RegisterDescriptor::plain(0x30), // MODE: slave auto-detect
        RegisterDescriptor::plain(0x00), // FORMAT
        RegisterDescriptor::plain(0x60), // TRANS: soft ramp + zero cross
        RegisterDescriptor::plain(0x20), // MUTE: auto-mute
        RegisterDescriptor::plain(0x00), // VOLA
        RegisterDescriptor::plain(0x00), // VOLB
    ],
};
