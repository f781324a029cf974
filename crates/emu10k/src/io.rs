//! Audio I/O collaborators.
use crate::space::{AddressSpace, ArraySpace};
use std::sync::Arc;

/// Trait for the audio inputs and outputs a DSP is connected to.
///
/// The DSP may be driven from an audio thread while the host feeds these channels from another,
/// so implementations must be thread safe.
pub trait Io: Send + Sync {
    fn read_in(&self, channel: u32) -> i32;
    fn write_in(&self, channel: u32, value: i32);
    fn read_out(&self, channel: u32) -> i32;
    fn write_out(&self, channel: u32, value: i32);
}

/// An implementation of [`Io`] which reads zero and drops writes.
#[derive(Debug, Clone, Copy)]
pub struct NopIo;

impl Io for NopIo {
    fn read_in(&self, _: u32) -> i32 {
        0
    }

    fn write_in(&self, _: u32, _: i32) {}

    fn read_out(&self, _: u32) -> i32 {
        0
    }

    fn write_out(&self, _: u32, _: i32) {}
}

/// An implementation of [`Io`] backed by an input and an output address space.
pub struct CompositeIo {
    input: Box<dyn AddressSpace>,
    output: Box<dyn AddressSpace>,
}

impl CompositeIo {
    pub fn new(input: Box<dyn AddressSpace>, output: Box<dyn AddressSpace>) -> Self {
        Self { input, output }
    }

    /// Creates a [`CompositeIo`] with `len` plain input and output registers, returning handles to
    /// both register arrays.
    pub fn arrays(len: usize) -> (Self, ArraySpace, ArraySpace) {
        let input = ArraySpace::new(len);
        let output = ArraySpace::new(len);
        let io = Self::new(Box::new(input.clone()), Box::new(output.clone()));

        (io, input, output)
    }
}

impl Io for CompositeIo {
    fn read_in(&self, channel: u32) -> i32 {
        self.input.read(channel)
    }

    fn write_in(&self, channel: u32, value: i32) {
        self.input.write(channel, value);
    }

    fn read_out(&self, channel: u32) -> i32 {
        self.output.read(channel)
    }

    fn write_out(&self, channel: u32, value: i32) {
        self.output.write(channel, value);
    }
}

/// The input side of an [`Io`], as an address space.
pub struct InputView(pub Arc<dyn Io>);

impl AddressSpace for InputView {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        self.0.read_in(addr)
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        self.0.write_in(addr, value);
    }
}

/// The output side of an [`Io`], as an address space.
pub struct OutputView(pub Arc<dyn Io>);

impl AddressSpace for OutputView {
    #[inline(always)]
    fn read(&self, addr: u32) -> i32 {
        self.0.read_out(addr)
    }

    #[inline(always)]
    fn write(&self, addr: u32, value: i32) {
        self.0.write_out(addr, value);
    }
}
