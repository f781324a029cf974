//! The accumulator.
//!
//! ```text
//!  6   6 6           3 3           0
//!  6   5 4           2 1           0
//! +-+---+-------------+-------------+
//! |S| G |    High     |     Low     |
//! +-+---+-------------+-------------+
//! ```
//!
//! The accumulator holds a sign and a 66 bit magnitude made of three limbs: the low and high words
//! and two guard bits. Keeping the sign apart means additions never have to propagate a two's
//! complement borrow through the guard limb.
use bitos::BitUtils;
use std::cmp::Ordering;

/// Valid bits of the guard limb.
const GUARD_MASK: u32 = 0b11;

/// Extended precision, sign-magnitude accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    /// Magnitude, least significant limb first.
    limbs: [u32; 3],
    negative: bool,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn magnitude64(&self) -> u64 {
        ((self.limbs[1] as u64) << 32) | self.limbs[0] as u64
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.limbs == [0; 3]
    }

    /// Loads `value`, clearing the guard bits.
    pub fn write(&mut self, value: i64) {
        let magnitude = value.unsigned_abs();
        self.limbs = [magnitude as u32, (magnitude >> 32) as u32, 0];
        self.negative = value < 0;
    }

    /// Loads `value` so that [`Self::read_low_wrap`] returns it.
    pub fn write_low(&mut self, value: i32) {
        self.write(value as i64);
    }

    /// Loads `value` so that [`Self::read_high_wrap`] returns it.
    pub fn write_high(&mut self, value: i32) {
        self.write((value as i64) << 31);
    }

    /// Returns the low 64 bits of the value, wrapping.
    ///
    /// Bit 63 of the magnitude is allowed to spill into the sign: a sum of several terms whose
    /// partial sums overflow still reads back correctly as long as the total doesn't.
    #[inline(always)]
    pub fn read(&self) -> i64 {
        let value = self.magnitude64() as i64;
        if self.negative {
            value.wrapping_neg()
        } else {
            value
        }
    }

    /// Returns the value saturated to 64 bits.
    pub fn read_sat(&self) -> i64 {
        if self.limbs[2] != 0 || self.limbs[1].bit(31) {
            return if self.negative { i64::MIN } else { i64::MAX };
        }

        self.read()
    }

    /// Returns the low 32 bits of the value, wrapping.
    #[inline(always)]
    pub fn read_low_wrap(&self) -> i32 {
        let value = self.limbs[0] as i32;
        if self.negative {
            value.wrapping_neg()
        } else {
            value
        }
    }

    /// Whether the value doesn't fit in 32 bits.
    #[inline(always)]
    pub fn low_overflows(&self) -> bool {
        self.limbs[2] != 0 || self.limbs[1] != 0 || self.limbs[0].bit(31)
    }

    /// Returns the value saturated to 32 bits.
    pub fn read_low_sat(&self) -> i32 {
        if self.low_overflows() {
            return if self.negative { i32::MIN } else { i32::MAX };
        }

        self.read_low_wrap()
    }

    /// Returns bits `31..63` of the value, wrapping.
    pub fn read_high_wrap(&self) -> i32 {
        let value = ((self.limbs[1] << 1) | (self.limbs[0] >> 31)) as i32;
        if self.negative {
            value.wrapping_neg()
        } else {
            value
        }
    }

    /// Whether the value shifted right by 31 doesn't fit in 32 bits.
    #[inline(always)]
    pub fn high_overflows(&self) -> bool {
        self.limbs[2] != 0 || self.limbs[1].bits(30, 32) != 0
    }

    /// Returns bits `31..63` of the value, saturated to 32 bits.
    pub fn read_high_sat(&self) -> i32 {
        if self.high_overflows() {
            return if self.negative { i32::MIN } else { i32::MAX };
        }

        self.read_high_wrap()
    }

    /// Adds `value` to the accumulator.
    ///
    /// Carries out of the guard bits are lost.
    pub fn add(&mut self, value: i64) {
        if value == 0 {
            return;
        }

        let negative = value < 0;
        let magnitude = value.unsigned_abs();
        let (high, low) = ((magnitude >> 32) as u32, magnitude as u32);

        if negative == self.negative {
            self.add_magnitude(high, low);
            return;
        }

        match self.compare_abs(high, low) {
            Ordering::Equal => *self = Self::default(),
            Ordering::Greater => self.sub_magnitude(high, low),
            Ordering::Less => {
                // smaller than a 64 bit magnitude, so the guard is clear
                let diff = magnitude - self.magnitude64();
                self.limbs = [diff as u32, (diff >> 32) as u32, 0];
                self.negative = negative;
            }
        }
    }

    fn add_magnitude(&mut self, high: u32, low: u32) {
        let v0 = self.limbs[0] as u64 + low as u64;
        let v1 = self.limbs[1] as u64 + high as u64 + (v0 >> 32);
        let v2 = self.limbs[2] as u64 + (v1 >> 32);

        // TODO: overflow past the guard bits is not modeled, the carry is dropped
        self.limbs = [v0 as u32, v1 as u32, v2 as u32 & GUARD_MASK];
    }

    /// Subtracts a magnitude smaller than the current one.
    fn sub_magnitude(&mut self, high: u32, low: u32) {
        let (v0, borrow0) = self.limbs[0].overflowing_sub(low);
        let (v1, borrow1a) = self.limbs[1].overflowing_sub(high);
        let (v1, borrow1b) = v1.overflowing_sub(borrow0 as u32);
        let v2 = self.limbs[2].wrapping_sub((borrow1a || borrow1b) as u32);

        self.limbs = [v0, v1, v2 & GUARD_MASK];
    }

    fn compare_abs(&self, high: u32, low: u32) -> Ordering {
        if self.limbs[2] != 0 {
            return Ordering::Greater;
        }

        (self.limbs[1], self.limbs[0]).cmp(&(high, low))
    }
}
