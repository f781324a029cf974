use strum::{FromRepr, IntoStaticStr, VariantArray};

/// The opcode of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, VariantArray, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
    /// Fractional MAC, wrapping result.
    Macs = 0x0,
    /// Fractional MAC with negated X, wrapping result.
    Macsn = 0x1,
    /// Fractional MAC, saturated result.
    Macw = 0x2,
    /// Fractional MAC with negated X, saturated result.
    Macwn = 0x3,
    /// Integer MAC, saturated result.
    Macints = 0x4,
    /// Integer MAC, result wraps at bit 31.
    Macintw = 0x5,
    /// Three way add.
    Acc3 = 0x6,
    /// Move A to R while accumulating X * Y.
    Macmv = 0x7,
    Andxor = 0x8,
    Testneg = 0x9,
    Limit = 0xA,
    Limitl = 0xB,
    Log = 0xC,
    Exp = 0xD,
    Interp = 0xE,
    /// Conditional skip. Not implemented, behaves as a no-op.
    Skip = 0xF,
}

impl Opcode {
    /// Decodes the low 4 bits of `value`.
    pub fn new(value: u8) -> Self {
        // all 16 values are assigned
        Self::from_repr(value & 0xF).unwrap_or(Self::Skip)
    }

    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    /// Whether the X operand is negated before multiplying.
    pub fn negates_x(self) -> bool {
        matches!(self, Self::Macsn | Self::Macwn)
    }

    /// Whether the value written to R is saturated rather than wrapped.
    pub fn saturates(self) -> bool {
        matches!(
            self,
            Self::Macw | Self::Macwn | Self::Macints | Self::Acc3 | Self::Interp
        )
    }

    /// Whether the comparison outcome of a limit opcode is inverted.
    pub fn inverts_limit(self) -> bool {
        self == Self::Limitl
    }
}
