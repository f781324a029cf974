use crate::{
    Dsp,
    ins::{Instruction, Operand},
    map::Ccr,
};

/// Sign of the result of [`log`] and [`exp`], selected by the low two bits of Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignMode {
    Keep,
    Positive,
    Negative,
    Invert,
}

impl SignMode {
    fn new(value: i32) -> Self {
        match value & 0b11 {
            0 => Self::Keep,
            1 => Self::Positive,
            2 => Self::Negative,
            _ => Self::Invert,
        }
    }

    fn apply(self, input: i32, magnitude: u32) -> i32 {
        let negative = match self {
            Self::Keep => input < 0,
            Self::Positive => false,
            Self::Negative => true,
            Self::Invert => input >= 0,
        };

        if negative {
            !magnitude as i32
        } else {
            magnitude as i32
        }
    }
}

/// Exponent width and mantissa width of the packed format for a given maximum exponent.
#[inline(always)]
fn log_format(max_exp: i32) -> (u32, u32) {
    let max_exp = max_exp.clamp(1, 31) as u32;
    let exp_bits = 32 - max_exp.leading_zeros();
    (max_exp, 31 - exp_bits)
}

#[inline(always)]
fn ones_magnitude(value: i32) -> u32 {
    (value ^ (value >> 31)) as u32
}

/// Converts a linear value into a packed `exponent | mantissa` pseudo-logarithm.
pub fn log(value: i32, max_exp: i32, sign_mode: i32) -> i32 {
    let (max_exp, mantissa_bits) = log_format(max_exp);
    let magnitude = ones_magnitude(value);

    // magnitude <= 0x7FFF_FFFF
    let shift = magnitude.leading_zeros() - 1;
    let (exp, fraction) = if shift < max_exp {
        (max_exp - shift, (magnitude << shift) & 0x3FFF_FFFF)
    } else {
        (0, magnitude << (max_exp - 1))
    };

    let packed = (exp << mantissa_bits) | (fraction >> (30 - mantissa_bits));
    SignMode::new(sign_mode).apply(value, packed)
}

/// Inverse of [`log`].
pub fn exp(value: i32, max_exp: i32, sign_mode: i32) -> i32 {
    let (max_exp, mantissa_bits) = log_format(max_exp);
    let packed = ones_magnitude(value);

    let exp = (packed >> mantissa_bits).min(max_exp);
    let fraction = (packed & ((1 << mantissa_bits) - 1)) << (30 - mantissa_bits);
    let magnitude = if exp == 0 {
        fraction >> (max_exp - 1)
    } else {
        (fraction | (1 << 30)) >> (max_exp - exp)
    };

    SignMode::new(sign_mode).apply(value, magnitude)
}

#[inline(always)]
fn fractional_mul(x: i64, y: i64) -> i64 {
    (x * y) >> 31
}

impl Dsp {
    /// Reads operand A at full accumulator precision.
    #[inline(always)]
    fn operand_wide(&self, operand: Operand) -> i64 {
        match operand {
            Operand::Memory(addr) => self.read(addr) as i64,
            Operand::Accumulator => self.acc.read(),
        }
    }

    /// Loads operand A into the accumulator. The accumulator loaded into itself keeps its guard
    /// bits.
    #[inline(always)]
    fn load_acc(&mut self, operand: Operand) {
        if let Operand::Memory(addr) = operand {
            let value = self.read(addr);
            self.acc.write_low(value);
        }
    }

    #[inline(always)]
    fn commit(&mut self, r: Operand, value: i32, saturated: bool, borrow: bool) {
        if let Operand::Memory(addr) = r {
            self.write(addr, value);
        }

        self.sys.set_ccr(Ccr::from_result(value, saturated, borrow));
    }

    /// Commits the accumulator to R through the wrapping or saturating view.
    #[inline(always)]
    fn commit_acc(&mut self, r: Operand, saturate: bool) {
        if saturate {
            let saturated = self.acc.low_overflows();
            self.commit(r, self.acc.read_low_sat(), saturated, false);
        } else {
            self.commit(r, self.acc.read_low_wrap(), false, false);
        }
    }

    /// Commits `value` to both R and the accumulator.
    #[inline(always)]
    fn commit_both(&mut self, r: Operand, value: i32, borrow: bool) {
        self.acc.write_low(value);
        self.commit(r, value, false, borrow);
    }

    pub(crate) fn mac(&mut self, ins: Instruction) {
        let x = self.read(ins.x);
        let y = self.read(ins.y);
        let x = if ins.opcode.negates_x() {
            -(x as i64)
        } else {
            x as i64
        };

        self.load_acc(ins.a);
        self.acc.add(fractional_mul(x, y as i64));
        self.commit_acc(ins.r, ins.opcode.saturates());
    }

    pub(crate) fn macints(&mut self, ins: Instruction) {
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.load_acc(ins.a);
        self.acc.add(x as i64 * y as i64);
        self.commit_acc(ins.r, true);
    }

    pub(crate) fn macintw(&mut self, ins: Instruction) {
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.load_acc(ins.a);
        self.acc.add(x as i64 * y as i64);

        let value = self.acc.read_low_wrap() & 0x7FFF_FFFF;
        self.commit(ins.r, value, false, false);
    }

    pub(crate) fn acc3(&mut self, ins: Instruction) {
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.load_acc(ins.a);
        self.acc.add(x as i64);
        self.acc.add(y as i64);
        self.commit_acc(ins.r, true);
    }

    pub(crate) fn macmv(&mut self, ins: Instruction) {
        let a = self.read_mem_or_acc(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.commit(ins.r, a, false, false);
        self.acc.add(x as i64 * y as i64);
    }

    pub(crate) fn andxor(&mut self, ins: Instruction) {
        let a = self.read_mem_or_acc(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.commit_both(ins.r, (a & x) ^ y, false);
    }

    pub(crate) fn testneg(&mut self, ins: Instruction) {
        let a = self.operand_wide(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        let borrow = a < y as i64;
        let value = if borrow { x.wrapping_neg() } else { x };
        self.commit_both(ins.r, value, borrow);
    }

    pub(crate) fn limit(&mut self, ins: Instruction) {
        let a = self.operand_wide(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        let borrow = a < y as i64;
        let value = if borrow == ins.opcode.inverts_limit() {
            x
        } else {
            y
        };

        self.commit_both(ins.r, value, borrow);
    }

    pub(crate) fn log(&mut self, ins: Instruction) {
        let a = self.read_mem_or_acc(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.commit_both(ins.r, log(a, x, y), false);
    }

    pub(crate) fn exp(&mut self, ins: Instruction) {
        let a = self.read_mem_or_acc(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.commit_both(ins.r, exp(a, x, y), false);
    }

    pub(crate) fn interp(&mut self, ins: Instruction) {
        let a = self.operand_wide(ins.a);
        let x = self.read(ins.x);
        let y = self.read(ins.y);

        self.load_acc(ins.a);
        self.acc
            .add((x as i64).wrapping_mul((y as i64).wrapping_sub(a)) >> 31);
        self.commit_acc(ins.r, true);
    }

    pub(crate) fn skip(&mut self, _: Instruction) {}
}
