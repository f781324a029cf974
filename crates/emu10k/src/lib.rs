//! Interpreter for the EMU10K1 effects DSP.
//!
//! The DSP executes a straight line program once per sample tick. Every instruction reads its
//! operands from, and writes its result to, a 10 bit register bus composed out of the audio I/O,
//! constants, general purpose registers and the transfer RAM (TRAM) windows.
mod exec;

pub mod accum;
pub mod consts;
pub mod ins;
pub mod io;
pub mod map;
pub mod program;
pub mod space;

use crate::{
    accum::Accumulator,
    ins::{Opcode, Operand},
    io::{InputView, Io, OutputView},
    map::SystemRegs,
    space::{AddressSpace, ArraySpace, Offset, SplitSpace, TramSpace, empty, region},
};
use nanorand::{Rng, WyRand};
use std::sync::Arc;

pub use exec::{exp, log};
pub use ins::Instruction;
pub use program::{Program, ProgramError, Resources};

/// DSP configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Length, in words, of the internal TRAM.
    pub itram_len: usize,
    /// Seeds of the two noise generators. Random when `None`.
    pub noise_seeds: Option<[u64; 2]>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            itram_len: map::ITRAM_LEN,
            noise_seeds: None,
        }
    }
}

type ExecFn = fn(&mut Dsp, Instruction);

static OPCODE_EXEC_LUT: [ExecFn; 16] = {
    let mut lut = [Dsp::skip as ExecFn; 16];

    lut[Opcode::Macs as usize] = Dsp::mac as ExecFn;
    lut[Opcode::Macsn as usize] = Dsp::mac as ExecFn;
    lut[Opcode::Macw as usize] = Dsp::mac as ExecFn;
    lut[Opcode::Macwn as usize] = Dsp::mac as ExecFn;
    lut[Opcode::Macints as usize] = Dsp::macints as ExecFn;
    lut[Opcode::Macintw as usize] = Dsp::macintw as ExecFn;
    lut[Opcode::Acc3 as usize] = Dsp::acc3 as ExecFn;
    lut[Opcode::Macmv as usize] = Dsp::macmv as ExecFn;
    lut[Opcode::Andxor as usize] = Dsp::andxor as ExecFn;
    lut[Opcode::Testneg as usize] = Dsp::testneg as ExecFn;
    lut[Opcode::Limit as usize] = Dsp::limit as ExecFn;
    lut[Opcode::Limitl as usize] = Dsp::limit as ExecFn;
    lut[Opcode::Log as usize] = Dsp::log as ExecFn;
    lut[Opcode::Exp as usize] = Dsp::exp as ExecFn;
    lut[Opcode::Interp as usize] = Dsp::interp as ExecFn;
    lut[Opcode::Skip as usize] = Dsp::skip as ExecFn;

    lut
};

/// The DSP state.
///
/// A [`Dsp`] is [`Send`] and [`Sync`]: it can be moved into an audio callback or shared behind a
/// lock. It does no locking of its own, so a host poking registers from another thread must
/// serialize those accesses with [`Dsp::tick`] itself.
pub struct Dsp {
    bus: SplitSpace,
    acc: Accumulator,
    gprs: ArraySpace,
    itram: ArraySpace,
    itram_addr: ArraySpace,
    xtram_addr: ArraySpace,
    sys: Arc<SystemRegs>,
    noise: [WyRand; 2],
    program: Option<Program>,
    idle_warned: bool,
}

impl Dsp {
    /// Creates a new DSP connected to the FX bus `fx`, the external I/O `ext` and the external
    /// TRAM `xtram`.
    pub fn new(
        fx: Arc<dyn Io>,
        ext: Arc<dyn Io>,
        xtram: Box<dyn AddressSpace>,
        config: Config,
    ) -> Self {
        let gprs = ArraySpace::new(map::GPR_COUNT as usize);
        let itram = ArraySpace::new(config.itram_len);
        let itram_addr = ArraySpace::new(map::ITRAM_REGS as usize);
        let xtram_addr = ArraySpace::new(map::XTRAM_REGS as usize);
        let sys = Arc::new(SystemRegs::default());
        let offset = Offset::new(sys.dbac_handle());

        let io = SplitSpace::new(
            6,
            2,
            vec![
                region(InputView(fx.clone())),
                region(InputView(ext.clone())),
                region(OutputView(ext)),
                region(OutputView(fx)),
            ],
        );
        let system = SplitSpace::new(
            6,
            1,
            vec![region(map::SystemSpace::new(sys.clone())), region(empty())],
        );
        let low = SplitSpace::new(8, 2, vec![region(io), region(system)]);

        let tram_data = SplitSpace::new(
            8,
            1,
            vec![
                region(TramSpace::new(
                    region(itram.clone()),
                    itram_addr.clone(),
                    offset.clone(),
                )),
                region(TramSpace::new(xtram, xtram_addr.clone(), offset)),
            ],
        );
        let tram_addr = SplitSpace::new(
            8,
            1,
            vec![region(itram_addr.clone()), region(xtram_addr.clone())],
        );

        let bus = SplitSpace::new(
            map::ADDR_BITS,
            2,
            vec![
                region(low),
                region(gprs.clone()),
                region(tram_data),
                region(tram_addr),
            ],
        );

        let [seed1, seed2] = config.noise_seeds.unwrap_or_else(|| {
            let mut rng = nanorand::tls_rng();
            [rng.generate(), rng.generate()]
        });

        Self {
            bus,
            acc: Accumulator::new(),
            gprs,
            itram,
            itram_addr,
            xtram_addr,
            sys,
            noise: [WyRand::new_seed(seed1), WyRand::new_seed(seed2)],
            program: None,
            idle_warned: false,
        }
    }

    /// Reads the register at `addr`. Only the low 10 bits of the address are decoded: anything
    /// wider reads zero.
    #[inline(always)]
    pub fn read(&self, addr: u16) -> i32 {
        self.bus.read(addr as u32)
    }

    /// Writes the register at `addr`. Writes to read-only or unmapped registers are ignored.
    #[inline(always)]
    pub fn write(&mut self, addr: u16, value: i32) {
        self.bus.write(addr as u32, value);
    }

    /// Reads an operand the way the A operand of an instruction is fetched: the accumulator
    /// through its low 32 bit view, anything else through the register bus.
    #[inline(always)]
    pub fn read_mem_or_acc(&self, operand: Operand) -> i32 {
        match operand {
            Operand::Memory(addr) => self.read(addr),
            Operand::Accumulator => self.acc.read_low_wrap(),
        }
    }

    pub fn acc(&self) -> &Accumulator {
        &self.acc
    }

    /// Returns the low 64 bits of the accumulator.
    pub fn read_acc(&self) -> i64 {
        self.acc.read()
    }

    /// Overwrites the accumulator, clearing its guard bits.
    pub fn write_acc(&mut self, value: i64) {
        self.acc.write(value);
    }

    pub fn gprs(&self) -> &ArraySpace {
        &self.gprs
    }

    pub fn itram(&self) -> &ArraySpace {
        &self.itram
    }

    pub fn itram_addr(&self) -> &ArraySpace {
        &self.itram_addr
    }

    pub fn xtram_addr(&self) -> &ArraySpace {
        &self.xtram_addr
    }

    pub fn ccr(&self) -> map::Ccr {
        self.sys.ccr()
    }

    /// Number of ticks executed, which is also the current TRAM offset.
    pub fn ticks(&self) -> u32 {
        self.sys.dbac()
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    /// Replaces the running program. Registers, TRAM and the accumulator are left untouched.
    pub fn load_program(&mut self, program: Program) {
        tracing::debug!(
            "loading program with {} instructions ({:?})",
            program.len(),
            program.resources()
        );

        self.program = Some(program);
        self.idle_warned = false;
    }

    /// Unloads the running program, if any.
    pub fn unload_program(&mut self) -> Option<Program> {
        tracing::debug!("unloading program");
        self.program.take()
    }

    /// Executes a single instruction.
    #[inline(always)]
    pub fn execute(&mut self, ins: Instruction) {
        OPCODE_EXEC_LUT[ins.opcode as usize](self, ins);
    }

    /// Runs one sample tick: refreshes the noise registers, runs the whole program once and
    /// advances the tick counter.
    pub fn tick(&mut self) {
        for (index, rng) in self.noise.iter_mut().enumerate() {
            self.sys.set_noise(index, rng.generate::<u32>() as i32);
        }

        match self.program.clone() {
            Some(program) => {
                tracing::trace!("tick {}", self.ticks());
                for ins in program.code() {
                    self.execute(*ins);
                }
            }
            None => {
                if !self.idle_warned {
                    tracing::warn!("ticking without a program loaded");
                    self.idle_warned = true;
                }
            }
        }

        self.sys.set_dbac(self.sys.dbac().wrapping_add(1));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        io::CompositeIo,
        map::{ACCU, CCR, DBAC, NOISE1, NOISE2, gpr},
    };
    use std::sync::Mutex;

    struct Setup {
        dsp: Dsp,
        fx_in: ArraySpace,
        fx_out: ArraySpace,
        ext_in: ArraySpace,
        ext_out: ArraySpace,
        xtram: ArraySpace,
    }

    fn setup() -> Setup {
        let (fx, fx_in, fx_out) = CompositeIo::arrays(16);
        let (ext, ext_in, ext_out) = CompositeIo::arrays(16);
        let xtram = ArraySpace::new(1024);
        let config = Config {
            noise_seeds: Some([1, 2]),
            ..Default::default()
        };

        Setup {
            dsp: Dsp::new(Arc::new(fx), Arc::new(ext), region(xtram.clone()), config),
            fx_in,
            fx_out,
            ext_in,
            ext_out,
            xtram,
        }
    }

    /// Runs `opcode` with `A = a`, `X = x` and `Y = y` held in GPRs 1 to 3, returning GPR 0.
    fn run(dsp: &mut Dsp, opcode: Opcode, a: i32, x: i32, y: i32) -> i32 {
        dsp.write(gpr(1), a);
        dsp.write(gpr(2), x);
        dsp.write(gpr(3), y);
        dsp.execute(Instruction::new(opcode, gpr(0), gpr(1), gpr(2), gpr(3)));
        dsp.read(gpr(0))
    }

    #[test]
    fn register_map() {
        let Setup {
            mut dsp,
            fx_in,
            fx_out,
            ext_in,
            ext_out,
            ..
        } = setup();

        fx_in.write(1, 11);
        ext_in.write(2, 22);
        assert_eq!(dsp.read(0x001), 11);
        assert_eq!(dsp.read(0x012), 22);

        dsp.write(0x023, 33);
        dsp.write(0x034, 44);
        assert_eq!(ext_out.read(3), 33);
        assert_eq!(fx_out.read(4), 44);

        dsp.write(0x1FF, 55);
        assert_eq!(dsp.gprs().read(0xFF), 55);

        dsp.write(0x305, 66);
        dsp.write(0x385, 77);
        assert_eq!(dsp.itram_addr().read(5), 66);
        assert_eq!(dsp.xtram_addr().read(5), 77);
        assert_eq!(dsp.read(0x305), 66);

        assert_eq!(dsp.read(0x04D), 0x4000_0000);
        dsp.write(0x04D, 0);
        assert_eq!(dsp.read(0x04D), 0x4000_0000);

        for addr in [0x060, 0x07F, 0x080, 0x0FF, 0x400, 0xFFFF] {
            dsp.write(addr, 1);
            assert_eq!(dsp.read(addr), 0, "{addr:#X}");
        }
    }

    #[test]
    fn accumulator_is_hidden_from_the_bus() {
        let mut setup = setup();
        let dsp = &mut setup.dsp;

        dsp.write_acc(0x1234);
        assert_eq!(dsp.read(ACCU), 0);
        assert_eq!(dsp.read_mem_or_acc(Operand::Accumulator), 0x1234);
        assert_eq!(dsp.read_mem_or_acc(Operand::Memory(0x04D)), 0x4000_0000);

        dsp.write(ACCU, 5);
        assert_eq!(dsp.read_acc(), 0x1234);
    }

    #[test]
    fn tram_windows() {
        let Setup { mut dsp, xtram, .. } = setup();

        dsp.write(0x300, 5);
        dsp.write(0x200, 42);
        assert_eq!(dsp.itram().read(5), 42);

        dsp.write(0x380, 100);
        dsp.write(0x280, -42);
        assert_eq!(xtram.read(100), -42);

        dsp.tick();
        assert_eq!(dsp.read(0x200), 0);
        assert_eq!(dsp.read(0x280), 0);

        dsp.itram().write(6, 7);
        xtram.write(101, 8);
        assert_eq!(dsp.read(0x200), 7);
        assert_eq!(dsp.read(0x280), 8);

        // only 32 external channels
        dsp.write(0x2A0, 9);
        assert_eq!(dsp.read(0x2A0), 0);
    }

    #[test]
    fn fractional_mac() {
        let mut dsp = setup().dsp;

        assert_eq!(run(&mut dsp, Opcode::Macs, 0, 0x4000_0000, 0x4000_0000), 0x2000_0000);
        assert_eq!(run(&mut dsp, Opcode::Macsn, 0, 0x4000_0000, 0x4000_0000), -0x2000_0000);
        assert_eq!(run(&mut dsp, Opcode::Macw, 0x10, 0x4000_0000, 0x4000_0000), 0x2000_0010);
        assert_eq!(run(&mut dsp, Opcode::Macwn, 0x10, 0x4000_0000, 0x4000_0000), -0x1FFF_FFF0);
        assert_eq!(dsp.read_acc(), -0x1FFF_FFF0);
    }

    #[test]
    fn wrapping_and_saturating_results() {
        let mut dsp = setup().dsp;

        let wrapped = run(&mut dsp, Opcode::Macs, i32::MAX, 0x4000_0000, 0x4000_0000);
        assert_eq!(wrapped, 0x9FFF_FFFF_u32 as i32);
        assert!(!dsp.ccr().saturated());
        assert_eq!(dsp.read_acc(), 0x9FFF_FFFF);

        let saturated = run(&mut dsp, Opcode::Macw, i32::MAX, 0x4000_0000, 0x4000_0000);
        assert_eq!(saturated, i32::MAX);
        assert!(dsp.ccr().saturated());

        let saturated = run(&mut dsp, Opcode::Macwn, i32::MIN, 0x4000_0000, 0x4000_0000);
        assert_eq!(saturated, i32::MIN);
        assert!(dsp.ccr().saturated());
        assert!(dsp.ccr().minus());
    }

    #[test]
    fn integer_mac() {
        let mut dsp = setup().dsp;

        assert_eq!(run(&mut dsp, Opcode::Macints, 10, 3, 4), 22);
        assert_eq!(run(&mut dsp, Opcode::Macints, 10, 0x1_0000, 0x1_0000), i32::MAX);
        assert_eq!(run(&mut dsp, Opcode::Macints, -10, -0x1_0000, 0x1_0000), i32::MIN);

        assert_eq!(run(&mut dsp, Opcode::Macintw, 10, 3, 4), 22);
        assert_eq!(run(&mut dsp, Opcode::Macintw, 0, 0x1_0000, 0x8000), 0);
        assert_eq!(run(&mut dsp, Opcode::Macintw, -1, 1, 0), i32::MAX);
    }

    #[test]
    fn acc3() {
        let mut dsp = setup().dsp;

        assert_eq!(run(&mut dsp, Opcode::Acc3, 1, 2, 3), 6);
        assert_eq!(run(&mut dsp, Opcode::Acc3, -100, 2, 3), -95);
        assert_eq!(run(&mut dsp, Opcode::Acc3, i32::MAX, 1, 0), i32::MAX);
        assert_eq!(run(&mut dsp, Opcode::Acc3, i32::MIN, -1, -1), i32::MIN);
        assert_eq!(dsp.read_acc(), i32::MIN as i64 - 2);
    }

    #[test]
    fn macmv() {
        let mut dsp = setup().dsp;

        dsp.write_acc(100);
        assert_eq!(run(&mut dsp, Opcode::Macmv, 7, 3, 4), 7);
        assert_eq!(dsp.read_acc(), 112);
        assert_eq!(run(&mut dsp, Opcode::Macmv, -1, -3, 4), -1);
        assert_eq!(dsp.read_acc(), 100);
    }

    #[test]
    fn logic_and_comparisons() {
        let mut dsp = setup().dsp;

        assert_eq!(run(&mut dsp, Opcode::Andxor, 0b1100, 0b1010, 0b0001), 0b1001);
        assert_eq!(dsp.read_acc(), 0b1001);
        assert_eq!(run(&mut dsp, Opcode::Andxor, 0b1100, 0b0011, 0), 0);
        assert!(dsp.ccr().zero());
        assert_eq!(dsp.read(CCR), 0b1000);

        assert_eq!(run(&mut dsp, Opcode::Testneg, 5, 7, 3), 7);
        assert!(!dsp.ccr().borrow());
        assert_eq!(run(&mut dsp, Opcode::Testneg, 2, 7, 3), -7);
        assert!(dsp.ccr().borrow());
        assert_eq!(dsp.read_acc(), -7);

        assert_eq!(run(&mut dsp, Opcode::Limit, 5, 7, 3), 7);
        assert_eq!(run(&mut dsp, Opcode::Limit, 2, 7, 3), 3);
        assert_eq!(run(&mut dsp, Opcode::Limit, 3, 7, 3), 7);
        assert_eq!(run(&mut dsp, Opcode::Limitl, 5, 7, 3), 3);
        assert_eq!(run(&mut dsp, Opcode::Limitl, 2, 7, 3), 7);
        assert_eq!(run(&mut dsp, Opcode::Limitl, 3, 7, 3), 3);
    }

    #[test]
    fn wide_comparison_operand() {
        let mut dsp = setup().dsp;

        // the accumulator compares at full precision
        dsp.write_acc(1 << 40);
        dsp.write(gpr(2), 7);
        dsp.write(gpr(3), 3);
        dsp.execute(Instruction::new(Opcode::Testneg, gpr(0), ACCU, gpr(2), gpr(3)));
        assert_eq!(dsp.read(gpr(0)), 7);

        dsp.write_acc(-(1 << 40));
        dsp.execute(Instruction::new(Opcode::Limit, gpr(0), ACCU, gpr(2), gpr(3)));
        assert_eq!(dsp.read(gpr(0)), 3);
    }

    #[test]
    fn log_and_exp() {
        let mut dsp = setup().dsp;

        let packed = run(&mut dsp, Opcode::Log, 0x1234_0000, 31, 0);
        assert_eq!(packed, log(0x1234_0000, 31, 0));
        assert_eq!(run(&mut dsp, Opcode::Exp, packed, 31, 0), 0x1234_0000);
        assert_eq!(run(&mut dsp, Opcode::Log, 0x4000_0000, 31, 0), 0x7C00_0000);
        assert_eq!(dsp.read_acc(), 0x7C00_0000);
    }

    #[test]
    fn interp() {
        let mut dsp = setup().dsp;

        assert_eq!(run(&mut dsp, Opcode::Interp, 0, 0x4000_0000, 0x4000_0000), 0x2000_0000);
        assert_eq!(run(&mut dsp, Opcode::Interp, 100, 0, 0x4000_0000), 100);
        assert_eq!(run(&mut dsp, Opcode::Interp, i32::MAX, i32::MAX, 0x7FFF_FFFF), i32::MAX);
        assert_eq!(run(&mut dsp, Opcode::Interp, 0x1000, 0x4000_0000, -0x1000), 0);
    }

    #[test]
    fn skip_does_nothing() {
        let mut dsp = setup().dsp;

        dsp.write(gpr(0), 99);
        dsp.write_acc(5);
        assert_eq!(run(&mut dsp, Opcode::Skip, 1, 2, 3), 99);
        assert_eq!(dsp.read_acc(), 5);
        assert_eq!(dsp.ccr(), map::Ccr::default());
    }

    #[test]
    fn accumulator_operands() {
        let mut dsp = setup().dsp;

        dsp.write(gpr(2), 0x4000_0000);
        dsp.execute(Instruction::new(Opcode::Macs, gpr(0), ACCU, gpr(2), gpr(2)));
        assert_eq!(dsp.read(gpr(0)), 0x2000_0000);
        assert_eq!(dsp.read_acc(), 0x2000_0000);

        dsp.write_acc(0x10);
        dsp.execute(Instruction::new(Opcode::Macs, gpr(0), ACCU, gpr(2), gpr(2)));
        assert_eq!(dsp.read(gpr(0)), 0x2000_0010);

        // R = ACCU leaves the bus alone
        dsp.execute(Instruction::new(Opcode::Macs, ACCU, ACCU, gpr(2), gpr(2)));
        assert_eq!(dsp.read_acc(), 0x4000_0010);
        assert_eq!(dsp.gprs().values().iter().filter(|v| **v != 0).count(), 2);
    }

    #[test]
    fn system_registers_through_the_bus() {
        let mut dsp = setup().dsp;

        dsp.tick();
        dsp.tick();
        assert_eq!(dsp.ticks(), 2);
        assert_eq!(dsp.read(DBAC), 2);

        dsp.write(DBAC, 100);
        assert_eq!(dsp.ticks(), 100);

        dsp.write(NOISE1, 1);
        dsp.write(CCR, 1);
        assert_eq!(dsp.read(CCR), 0);
    }

    #[test]
    fn noise_is_seeded() {
        let mut a = setup().dsp;
        let mut b = setup().dsp;
        let mut reference = [WyRand::new_seed(1), WyRand::new_seed(2)];

        for tick in 0..4 {
            a.tick();
            b.tick();

            let [noise1, noise2] = reference.each_mut().map(|rng| rng.generate::<u32>() as i32);
            assert_eq!(a.read(NOISE1), noise1, "tick {tick}");
            assert_eq!(a.read(NOISE2), noise2, "tick {tick}");
            assert_ne!(a.read(NOISE1), a.read(NOISE2), "tick {tick}");

            assert_eq!(b.read(NOISE1), noise1);
            assert_eq!(b.read(NOISE2), noise2);
        }
    }

    #[test]
    fn tick_counter_wraps() {
        let mut dsp = setup().dsp;

        dsp.write(DBAC, -1);
        dsp.tick();
        assert_eq!(dsp.ticks(), 0);
    }

    #[test]
    fn tick_runs_the_program() {
        let Setup {
            mut dsp,
            fx_in,
            fx_out,
            ..
        } = setup();

        let code = vec![Instruction::new(Opcode::Acc3, 0x030, 0x000, 0x030, 0x041)];
        let program = Program::new(code, Resources::default()).unwrap();

        dsp.tick();
        assert_eq!(fx_out.read(0), 0);

        dsp.load_program(program);
        assert_eq!(dsp.program().map(Program::len), Some(1));

        fx_in.write(0, 10);
        dsp.tick();
        dsp.tick();
        assert_eq!(fx_out.read(0), 22);
        assert_eq!(dsp.ticks(), 3);

        assert!(dsp.unload_program().is_some());
        dsp.tick();
        assert_eq!(fx_out.read(0), 22);
    }

    #[test]
    fn load_program_keeps_state() {
        let mut dsp = setup().dsp;

        dsp.write(gpr(5), 1234);
        dsp.write(0x301, 17);
        dsp.write(0x381, -3);
        dsp.write_acc(1 << 40);

        // Y is the zero constant, so the accumulator is left alone
        let copy = vec![Instruction::new(Opcode::Macmv, gpr(6), gpr(5), gpr(5), 0x040)];
        let resources = Resources {
            gprs: 8,
            ..Default::default()
        };

        dsp.load_program(Program::new(copy, resources).unwrap());
        dsp.tick();
        dsp.tick();
        assert_eq!(dsp.read(gpr(6)), 1234);
        assert_eq!(dsp.read_acc(), 1 << 40);

        let gprs = dsp.gprs().values();
        let itram_addr = dsp.itram_addr().values();
        let xtram_addr = dsp.xtram_addr().values();
        let acc = *dsp.acc();

        let negate = vec![Instruction::new(Opcode::Macsn, gpr(7), 0x040, gpr(5), 0x04F)];
        dsp.load_program(Program::new(negate, resources).unwrap());

        assert_eq!(dsp.gprs().values(), gprs);
        assert_eq!(dsp.itram_addr().values(), itram_addr);
        assert_eq!(dsp.xtram_addr().values(), xtram_addr);
        assert_eq!(*dsp.acc(), acc);
        assert_eq!(dsp.read(0x301), 17);
        assert_eq!(dsp.read(0x381), -3);
        assert_eq!(dsp.ticks(), 2);

        // the new program picks up where the old one left off
        dsp.tick();
        assert_eq!(dsp.read(gpr(6)), 1234);
        assert_eq!(dsp.read(gpr(7)), -1234);
        assert_eq!(dsp.read_acc(), -1234);
        assert_eq!(dsp.ticks(), 3);
    }

    #[test]
    fn ticks_from_another_thread() {
        fn assert_send<T: Send>() {}
        assert_send::<Dsp>();

        let Setup {
            mut dsp,
            fx_in,
            fx_out,
            ..
        } = setup();

        let code = vec![Instruction::new(Opcode::Acc3, 0x030, 0x000, 0x040, 0x040)];
        dsp.load_program(Program::new(code, Resources::default()).unwrap());
        fx_in.write(0, 5);

        let dsp = Arc::new(Mutex::new(dsp));
        let audio = std::thread::spawn({
            let dsp = dsp.clone();
            move || {
                for _ in 0..4 {
                    dsp.lock().unwrap().tick();
                }
            }
        });

        dsp.lock().unwrap().write(gpr(0), 7);
        audio.join().unwrap();

        let dsp = dsp.lock().unwrap();
        assert_eq!(dsp.ticks(), 4);
        assert_eq!(dsp.read(gpr(0)), 7);
        assert_eq!(fx_out.read(0), 5);

        // owned engines move too
        let mut owned = setup().dsp;
        owned.write(gpr(1), 9);
        let owned = std::thread::spawn(move || {
            owned.tick();
            owned
        })
        .join()
        .unwrap();
        assert_eq!(owned.ticks(), 1);
        assert_eq!(owned.read(gpr(1)), 9);
    }
}
