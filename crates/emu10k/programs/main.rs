mod cases;

use cases::Case;
use emu10k::{
    Config, Dsp, Program,
    io::CompositeIo,
    space::{AddressSpace, ArraySpace, region},
};
use libtest_mimic::{Arguments, Failed, Trial};
use std::{fmt::Write, sync::Arc};

const CHANNELS: usize = 16;

fn run_case(case: &Case) -> Result<(), Failed> {
    let (fx, fx_in, fx_out) = CompositeIo::arrays(CHANNELS);
    let mut dsp = Dsp::new(
        Arc::new(fx),
        Arc::new(CompositeIo::arrays(CHANNELS).0),
        region(ArraySpace::new(0x1000)),
        Config {
            noise_seeds: Some([0x1234, 0x5678]),
            ..Default::default()
        },
    );

    for (addr, value) in &case.init {
        dsp.write(*addr, *value);
    }

    let program = if case.microcode {
        let words: Vec<u64> = case.code.iter().map(|ins| ins.microcode()).collect();
        Program::from_microcode(&words, case.resources)
    } else {
        Program::new(case.code.clone(), case.resources)
    }
    .map_err(|e| Failed::from(format!("invalid program: {e}")))?;

    if program.code() != case.code.as_slice() {
        return Err(Failed::from("program differs from its source"));
    }

    dsp.load_program(program);

    let mut divergences = String::new();
    for (tick, (input, expected)) in case.inputs.iter().zip(&case.outputs).enumerate() {
        for (channel, value) in input.iter().enumerate() {
            fx_in.write(channel as u32, *value);
        }

        dsp.tick();

        let output: Vec<i32> = (0..expected.len() as u32).map(|c| fx_out.read(c)).collect();
        if &output != expected {
            writeln!(
                &mut divergences,
                "tick {tick}: input {input:08X?}, output {output:08X?}, expected {expected:08X?}"
            )
            .unwrap();
        }
    }

    if !divergences.is_empty() {
        let mut disasm = String::new();
        for (i, ins) in case.code.iter().enumerate() {
            writeln!(&mut disasm, "{i:03} {ins:?}").unwrap();
        }

        return Err(Failed::from(format!("{divergences}\r\nCODE:\r\n{disasm}")));
    }

    Ok(())
}

fn setup_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("emu10k=info,programs=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() {
    setup_tracing();

    let args = Arguments::from_args();
    let tests = cases::all()
        .into_iter()
        .map(|case| Trial::test(case.name, move || run_case(&case)))
        .collect();

    libtest_mimic::run(&args, tests).exit();
}
