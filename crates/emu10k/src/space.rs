//! Register address spaces.
//!
//! Every bank on the DSP bus implements [`AddressSpace`]. Accesses are total: reading outside of a
//! bank returns zero and writing outside of it is dropped, so composed banks never have to
//! propagate bounds errors.
use std::sync::{
    Arc,
    atomic::{AtomicI32, AtomicU32, Ordering},
};

/// A bank of 32 bit registers addressed by a flat index.
///
/// Banks may be shared between the host and the thread driving the engine.
pub trait AddressSpace: Send + Sync {
    /// Reads the register at `addr`. Out of range reads return zero.
    fn read(&self, addr: u32) -> i32;
    /// Writes `value` to the register at `addr`. Out of range writes are ignored.
    fn write(&self, addr: u32, value: i32);
}

impl<T: AddressSpace + ?Sized> AddressSpace for Arc<T> {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        (**self).read(addr)
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        (**self).write(addr, value);
    }
}

impl<T: AddressSpace + ?Sized> AddressSpace for Box<T> {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        (**self).read(addr)
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        (**self).write(addr, value);
    }
}

/// A fixed length array of registers.
///
/// Cloning an [`ArraySpace`] yields a handle to the same registers.
#[derive(Debug, Clone)]
pub struct ArraySpace {
    data: Arc<[AtomicI32]>,
}

impl ArraySpace {
    pub fn new(len: usize) -> Self {
        Self {
            data: (0..len).map(|_| AtomicI32::new(0)).collect(),
        }
    }

    pub fn from_values(values: &[i32]) -> Self {
        Self {
            data: values.iter().copied().map(AtomicI32::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a copy of the current register values.
    pub fn values(&self) -> Vec<i32> {
        self.data.iter().map(|reg| reg.load(Ordering::Relaxed)).collect()
    }
}

impl AddressSpace for ArraySpace {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        self.data
            .get(addr as usize)
            .map_or(0, |reg| reg.load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        if let Some(reg) = self.data.get(addr as usize) {
            reg.store(value, Ordering::Relaxed);
        }
    }
}

/// An address space with no registers: reads zero, drops writes.
pub fn empty() -> ArraySpace {
    ArraySpace::new(0)
}

/// Boxes `space` as a region of a [`SplitSpace`].
pub fn region(space: impl AddressSpace + 'static) -> Box<dyn AddressSpace> {
    Box::new(space)
}

/// An address space split into `2^bits` equally sized regions.
///
/// The top `bits` of a `width` bit address select the region and the remaining low bits are
/// forwarded to it.
pub struct SplitSpace {
    shift: u32,
    low_mask: u32,
    regions: Box<[Box<dyn AddressSpace>]>,
}

impl SplitSpace {
    /// Creates a new split space. Missing regions are filled with [`empty`] ones, extra regions are
    /// discarded.
    pub fn new(width: u32, bits: u32, regions: Vec<Box<dyn AddressSpace>>) -> Self {
        debug_assert!(bits <= width && width < 32);

        let shift = width - bits;
        let count = 1usize << bits;

        let mut regions = regions;
        regions.truncate(count);
        regions.resize_with(count, || region(empty()));

        Self {
            shift,
            low_mask: (1 << shift) - 1,
            regions: regions.into_boxed_slice(),
        }
    }

    #[inline(always)]
    fn decode(&self, addr: u32) -> (usize, u32) {
        ((addr >> self.shift) as usize, addr & self.low_mask)
    }
}

impl AddressSpace for SplitSpace {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        let (region, low) = self.decode(addr);
        self.regions.get(region).map_or(0, |r| r.read(low))
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        let (region, low) = self.decode(addr);
        if let Some(r) = self.regions.get(region) {
            r.write(low, value);
        }
    }
}

/// Read-only handle to an offset register shared by several [`TramSpace`]s.
#[derive(Debug, Clone)]
pub struct Offset(Arc<AtomicU32>);

impl Offset {
    pub fn new(reg: Arc<AtomicU32>) -> Self {
        Self(reg)
    }

    #[inline(always)]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Transfer RAM window.
///
/// Channel `i` accesses `backend[offset + addr_regs[i]]`. Since the offset advances once per tick,
/// a fixed address register walks through the backend like a delay line tap.
///
/// The offset is not reduced modulo the backend length. Once it has advanced past the end of the
/// backend (after 8192 ticks for the default internal TRAM), every access is out of range: reads
/// return zero and writes are dropped until the host rewinds the tick counter.
pub struct TramSpace {
    backend: Box<dyn AddressSpace>,
    addr_regs: ArraySpace,
    offset: Offset,
}

impl TramSpace {
    pub fn new(backend: Box<dyn AddressSpace>, addr_regs: ArraySpace, offset: Offset) -> Self {
        Self {
            backend,
            addr_regs,
            offset,
        }
    }

    #[inline(always)]
    fn effective(&self, channel: u32) -> Option<u32> {
        ((channel as usize) < self.addr_regs.len())
            .then(|| self.offset.get().wrapping_add(self.addr_regs.read(channel) as u32))
    }
}

impl AddressSpace for TramSpace {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        self.effective(addr).map_or(0, |a| self.backend.read(a))
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        if let Some(a) = self.effective(addr) {
            self.backend.write(a, value);
        }
    }
}
