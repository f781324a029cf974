use emu10k::{
    Instruction, Resources,
    ins::Opcode::{self, *},
    map::{ACCU, FX2_START, FX_START, ITRAM_ADDR_START, ITRAM_DATA_START, constant, gpr},
};

/// Register holding the constant `value`.
fn k(value: i32) -> u16 {
    constant(value).unwrap_or_else(|| panic!("{value:#X} is not a hardware constant"))
}

const fn fx(channel: u16) -> u16 {
    FX_START + channel
}

const fn out(channel: u16) -> u16 {
    FX2_START + channel
}

const fn itram(channel: u16) -> u16 {
    ITRAM_DATA_START + channel
}

const fn itram_addr(channel: u16) -> u16 {
    ITRAM_ADDR_START + channel
}

fn op(opcode: Opcode, r: u16, a: u16, x: u16, y: u16) -> Instruction {
    Instruction::new(opcode, r, a, x, y)
}

/// A whole program run over a sequence of input frames.
pub struct Case {
    pub name: &'static str,
    pub code: Vec<Instruction>,
    pub resources: Resources,
    /// Registers written once before the first tick.
    pub init: Vec<(u16, i32)>,
    /// FX bus input frames, one per tick.
    pub inputs: Vec<Vec<i32>>,
    /// Expected FX2 output frames, one per tick.
    pub outputs: Vec<Vec<i32>>,
    /// Whether the program goes through its microcode form before being loaded.
    pub microcode: bool,
}

fn frames(values: &[i32]) -> Vec<Vec<i32>> {
    values.iter().map(|v| vec![*v]).collect()
}

fn volume() -> Case {
    Case {
        name: "volume",
        code: vec![
            op(Macs, out(0), k(0), fx(0), gpr(0)),
            op(Macs, out(0), out(0), fx(1), gpr(1)),
        ],
        resources: Resources {
            gprs: 2,
            ..Default::default()
        },
        init: vec![(gpr(0), 0x4000_0000), (gpr(1), 0x2000_0000)],
        inputs: vec![
            vec![0x4000_0000, 0x4000_0000],
            vec![0, 0x4000_0000],
            vec![-0x4000_0000, 0],
            vec![0x7FFF_FFFF, 0x7FFF_FFFF],
        ],
        outputs: frames(&[0x3000_0000, 0x1000_0000, -0x2000_0000, 0x5FFF_FFFE]),
        microcode: true,
    }
}

fn delay_line() -> Case {
    let input: Vec<i32> = (1..=8).collect();
    Case {
        name: "delay_line",
        code: vec![
            op(Acc3, out(0), itram(1), k(0), k(0)),
            op(Acc3, itram(0), fx(0), k(0), k(0)),
        ],
        resources: Resources {
            itram: 2,
            ..Default::default()
        },
        init: vec![(itram_addr(0), 0), (itram_addr(1), -3)],
        inputs: frames(&input),
        outputs: frames(&[0, 0, 0, 1, 2, 3, 4, 5]),
        microcode: false,
    }
}

fn clamp() -> Case {
    Case {
        name: "clamp",
        code: vec![
            op(Limitl, gpr(2), fx(0), fx(0), gpr(0)),
            op(Limit, out(0), gpr(2), gpr(2), gpr(1)),
        ],
        resources: Resources {
            gprs: 3,
            ..Default::default()
        },
        init: vec![(gpr(0), 1000), (gpr(1), -1000)],
        inputs: frames(&[0, 999, 1000, 1001, i32::MAX, -999, -1000, -1001, i32::MIN]),
        outputs: frames(&[0, 999, 1000, 1000, 1000, -999, -1000, -1000, -1000]),
        microcode: true,
    }
}

fn rectifier() -> Case {
    Case {
        name: "rectifier",
        code: vec![op(Testneg, out(0), fx(0), fx(0), k(0))],
        resources: Resources::default(),
        init: vec![],
        inputs: frames(&[5, -5, 0, i32::MAX, -i32::MAX]),
        outputs: frames(&[5, 5, 0, i32::MAX, i32::MAX]),
        microcode: false,
    }
}

fn mixer() -> Case {
    Case {
        name: "saturating_mixer",
        code: vec![
            op(Macs, ACCU, k(0), fx(0), k(0x7FFF_FFFF)),
            op(Macs, ACCU, ACCU, fx(1), k(0x7FFF_FFFF)),
            op(Macw, out(0), ACCU, fx(2), k(0x7FFF_FFFF)),
        ],
        resources: Resources::default(),
        init: vec![],
        inputs: vec![
            vec![0x1000_0000, 0x1000_0000, 0x1000_0000],
            vec![0x4000_0000, 0x4000_0000, 0x4000_0000],
            vec![-0x4000_0000, -0x4000_0000, -0x4000_0000],
            vec![0x4000_0000, -0x4000_0000, 0],
        ],
        // positive terms lose one lsb to the 0x7FFF_FFFF gain
        outputs: frames(&[0x2FFF_FFFD, i32::MAX, i32::MIN, -1]),
        microcode: true,
    }
}

fn crossfade() -> Case {
    Case {
        name: "crossfade",
        code: vec![op(Interp, out(0), fx(0), gpr(0), fx(1))],
        resources: Resources {
            gprs: 1,
            ..Default::default()
        },
        init: vec![(gpr(0), 0x4000_0000)],
        inputs: vec![
            vec![0, 0x4000_0000],
            vec![0x4000_0000, 0x4000_0000],
            vec![-0x2000_0000, 0x2000_0000],
        ],
        outputs: frames(&[0x2000_0000, 0x4000_0000, 0]),
        microcode: false,
    }
}

fn compander() -> Case {
    Case {
        name: "compander",
        code: vec![
            op(Log, gpr(1), fx(0), gpr(0), k(0)),
            op(Exp, out(0), gpr(1), gpr(0), k(0)),
            op(Acc3, out(1), gpr(1), k(0), k(0)),
        ],
        resources: Resources {
            gprs: 2,
            ..Default::default()
        },
        init: vec![(gpr(0), 31)],
        inputs: frames(&[0x1234_0000, 0x4000_0000, 0, -0x1234_0001]),
        outputs: vec![
            vec![0x1234_0000, emu10k::log(0x1234_0000, 31, 0)],
            vec![0x4000_0000, 0x7C00_0000],
            vec![0, 0],
            vec![-0x1234_0001, !emu10k::log(0x1234_0000, 31, 0)],
        ],
        microcode: true,
    }
}

pub fn all() -> Vec<Case> {
    vec![
        volume(),
        delay_line(),
        clamp(),
        rectifier(),
        mixer(),
        crossfade(),
        compander(),
    ]
}
