//! Hardware constants.
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Values of the constant registers, in register order.
pub const HW_CONSTANTS: [i32; 22] = [
    0x0000_0000,
    0x0000_0001,
    0x0000_0002,
    0x0000_0003,
    0x0000_0004,
    0x0000_0008,
    0x0000_0010,
    0x0000_0020,
    0x0000_0100,
    0x0001_0000,
    0x0008_0000,
    0x1000_0000,
    0x2000_0000,
    0x4000_0000,
    0x8000_0000_u32 as i32,
    0x7FFF_FFFF,
    0xFFFF_FFFF_u32 as i32,
    0xFFFF_FFFE_u32 as i32,
    0xC000_0000_u32 as i32,
    0x4F1B_BCDC,
    0x5A7E_F9DB,
    0x0010_0000,
];

/// The constant table of the DSP.
pub static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| Constants::new(&HW_CONSTANTS));

/// An immutable table of constants with a reverse lookup.
#[derive(Debug, Clone)]
pub struct Constants {
    values: Box<[i32]>,
    indices: FxHashMap<i32, u16>,
}

impl Constants {
    pub fn new(values: &[i32]) -> Self {
        let values: Box<[i32]> = values.iter().copied().take(u16::MAX as usize).collect();

        let mut indices = FxHashMap::default();
        for (index, value) in values.iter().enumerate() {
            indices.entry(*value).or_insert(index as u16);
        }

        Self { values, indices }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the constant at `index`.
    #[inline(always)]
    pub fn get(&self, index: u16) -> Option<i32> {
        self.values.get(index as usize).copied()
    }

    /// Returns the index of the first constant equal to `value`.
    pub fn find(&self, value: i32) -> Option<u16> {
        self.indices.get(&value).copied()
    }
}
