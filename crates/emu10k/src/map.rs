//! Register map of the DSP.
//!
//! The DSP decodes 10 bits of a register address:
//!
//! | Range           | Contents                              |
//! |-----------------|---------------------------------------|
//! | `0x000..0x010`  | FX bus inputs                         |
//! | `0x010..0x020`  | external inputs                       |
//! | `0x020..0x030`  | external outputs                      |
//! | `0x030..0x040`  | FX bus outputs (FX2)                  |
//! | `0x040..0x060`  | constants and system registers        |
//! | `0x100..0x200`  | general purpose registers             |
//! | `0x200..0x280`  | internal TRAM data                    |
//! | `0x280..0x300`  | external TRAM data                    |
//! | `0x300..0x380`  | internal TRAM addresses               |
//! | `0x380..0x400`  | external TRAM addresses               |
//!
//! Everything else is reserved: reads return zero and writes are ignored.
use crate::{consts::CONSTANTS, space::AddressSpace};
use bitos::bitos;
use std::sync::{
    Arc,
    atomic::{AtomicI32, AtomicU32, Ordering},
};

/// Width, in bits, of the decoded register address.
pub const ADDR_BITS: u32 = 10;

pub const FX_START: u16 = 0x000;
pub const EXT_IN_START: u16 = 0x010;
pub const EXT_OUT_START: u16 = 0x020;
pub const FX2_START: u16 = 0x030;
pub const IO_LEN: u16 = 0x10;

pub const CONST_START: u16 = 0x040;
pub const ACCU: u16 = 0x056;
pub const CCR: u16 = 0x057;
pub const NOISE1: u16 = 0x058;
pub const NOISE2: u16 = 0x059;
pub const INTERRUPT: u16 = 0x05A;
pub const DBAC: u16 = 0x05B;

pub const GPR_COUNT: u16 = 256;
pub const GPR_START: u16 = 0x100;

pub const ITRAM_REGS: u16 = 128;
pub const XTRAM_REGS: u16 = 32;
pub const ITRAM_DATA_START: u16 = 0x200;
pub const XTRAM_DATA_START: u16 = 0x280;
pub const ITRAM_ADDR_START: u16 = 0x300;
pub const XTRAM_ADDR_START: u16 = 0x380;

/// Default length, in words, of the internal TRAM.
pub const ITRAM_LEN: usize = 8192;

/// Returns the register address of general purpose register `index`.
pub const fn gpr(index: u16) -> u16 {
    GPR_START + index
}

/// Returns the register address holding the constant `value`, if any.
pub fn constant(value: i32) -> Option<u16> {
    CONSTANTS.find(value).map(|index| CONST_START + index)
}

/// Condition code register.
#[bitos(32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ccr {
    /// The comparison of the last TESTNEG or LIMIT had A < Y.
    #[bits(0)]
    pub borrow: bool,
    /// The top two bits of the last result differ.
    #[bits(1)]
    pub normalized: bool,
    /// The last result is negative.
    #[bits(2)]
    pub minus: bool,
    /// The last result is zero.
    #[bits(3)]
    pub zero: bool,
    /// The last result was saturated.
    #[bits(4)]
    pub saturated: bool,
}

impl Ccr {
    pub fn from_result(value: i32, saturated: bool, borrow: bool) -> Self {
        Self::default()
            .with_borrow(borrow)
            .with_normalized((value < 0) != (value & 0x4000_0000 != 0))
            .with_minus(value < 0)
            .with_zero(value == 0)
            .with_saturated(saturated)
    }
}

/// System registers which live next to the constants.
#[derive(Debug, Default)]
pub struct SystemRegs {
    ccr: AtomicU32,
    noise: [AtomicI32; 2],
    /// Tick counter, also the offset of every TRAM access.
    dbac: Arc<AtomicU32>,
}

impl SystemRegs {
    #[inline(always)]
    pub fn ccr(&self) -> Ccr {
        Ccr::from_bits(self.ccr.load(Ordering::Relaxed))
    }

    #[inline(always)]
    pub fn set_ccr(&self, ccr: Ccr) {
        self.ccr.store(ccr.to_bits(), Ordering::Relaxed);
    }

    /// Value of noise register `index`, 0 or 1.
    #[inline(always)]
    pub fn noise(&self, index: usize) -> i32 {
        self.noise[index].load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn set_noise(&self, index: usize, value: i32) {
        self.noise[index].store(value, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn dbac(&self) -> u32 {
        self.dbac.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn set_dbac(&self, value: u32) {
        self.dbac.store(value, Ordering::Relaxed);
    }

    /// Shared handle to the tick counter.
    pub fn dbac_handle(&self) -> Arc<AtomicU32> {
        self.dbac.clone()
    }
}

/// Constants and system registers, as seen from the register bus.
pub struct SystemSpace {
    regs: Arc<SystemRegs>,
}

impl SystemSpace {
    const ACCU: u32 = (ACCU - CONST_START) as u32;
    const CCR: u32 = (CCR - CONST_START) as u32;
    const NOISE1: u32 = (NOISE1 - CONST_START) as u32;
    const NOISE2: u32 = (NOISE2 - CONST_START) as u32;
    const INTERRUPT: u32 = (INTERRUPT - CONST_START) as u32;
    const DBAC: u32 = (DBAC - CONST_START) as u32;

    pub fn new(regs: Arc<SystemRegs>) -> Self {
        Self { regs }
    }
}

impl AddressSpace for SystemSpace {
    fn read(&self, addr: u32) -> i32 {
        if let Some(value) = u16::try_from(addr).ok().and_then(|i| CONSTANTS.get(i)) {
            return value;
        }

        match addr {
            // only visible through the A operand of an instruction
            Self::ACCU => 0,
            Self::CCR => self.regs.ccr().to_bits() as i32,
            Self::NOISE1 => self.regs.noise(0),
            Self::NOISE2 => self.regs.noise(1),
            Self::INTERRUPT => 0,
            Self::DBAC => self.regs.dbac() as i32,
            _ => 0,
        }
    }

    fn write(&self, addr: u32, value: i32) {
        if (addr as usize) < CONSTANTS.len() {
            return;
        }

        match addr {
            Self::ACCU | Self::CCR | Self::NOISE1 | Self::NOISE2 => (),
            Self::INTERRUPT => {
                if value < 0 {
                    tracing::warn!("program requested an interrupt, ignoring");
                }
            }
            Self::DBAC => {
                tracing::warn!("tick counter overwritten with {value:08X}");
                self.regs.set_dbac(value as u32);
            }
            _ => (),
        }
    }
}
