mod opcodes;

use crate::map;
use bitos::BitUtils;

pub use opcodes::Opcode;

/// Width, in bits, of a register address in a microcode word.
pub const OPERAND_BITS: u32 = 10;

const OPERAND_MASK: u16 = (1 << OPERAND_BITS) - 1;

/// A register operand which may refer to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A register in the DSP address space.
    Memory(u16),
    /// The accumulator.
    Accumulator,
}

impl Operand {
    /// Decodes a register address, turning the accumulator address into [`Operand::Accumulator`].
    pub fn new(addr: u16) -> Self {
        if addr == map::ACCU {
            Self::Accumulator
        } else {
            Self::Memory(addr)
        }
    }

    /// The register address of this operand.
    pub fn addr(self) -> u16 {
        match self {
            Self::Memory(addr) => addr,
            Self::Accumulator => map::ACCU,
        }
    }
}

/// A DSP instruction: `R = op(A, X, Y)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Result.
    pub r: Operand,
    /// First operand, may be the accumulator.
    pub a: Operand,
    pub x: u16,
    pub y: u16,
}

impl std::fmt::Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:03X}, {:03X}, {:03X}, {:03X}",
            self.opcode.mnemonic(),
            self.r.addr(),
            self.a.addr(),
            self.x,
            self.y
        )
    }
}

impl Instruction {
    pub fn new(opcode: Opcode, r: u16, a: u16, x: u16, y: u16) -> Self {
        Self {
            opcode,
            r: Operand::new(r),
            a: Operand::new(a),
            x,
            y,
        }
    }

    /// Decodes a 64 bit microcode word.
    ///
    /// ```text
    /// 63        56 55  52 51   42 41   32 31        20 19   10 9     0
    /// +-----------+------+-------+-------+------------+-------+-------+
    /// |           |  op  |   R   |   A   |            |   X   |   Y   |
    /// +-----------+------+-------+-------+------------+-------+-------+
    /// ```
    pub fn from_microcode(word: u64) -> Self {
        Self::new(
            Opcode::new(word.bits(52, 56) as u8),
            word.bits(42, 52) as u16,
            word.bits(32, 42) as u16,
            word.bits(10, 20) as u16,
            word.bits(0, 10) as u16,
        )
    }

    /// Encodes this instruction as a 64 bit microcode word. Addresses are truncated to
    /// [`OPERAND_BITS`].
    pub fn microcode(self) -> u64 {
        0u64.with_bits(0, 10, (self.y & OPERAND_MASK) as u64)
            .with_bits(10, 20, (self.x & OPERAND_MASK) as u64)
            .with_bits(32, 42, (self.a.addr() & OPERAND_MASK) as u64)
            .with_bits(42, 52, (self.r.addr() & OPERAND_MASK) as u64)
            .with_bits(52, 56, self.opcode as u64)
    }

    /// The register addresses this instruction references, in `R, A, X, Y` order.
    pub fn addresses(self) -> [u16; 4] {
        [self.r.addr(), self.a.addr(), self.x, self.y]
    }
}
