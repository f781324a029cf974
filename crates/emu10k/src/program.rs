//! DSP programs.
use crate::{
    ins::{Instruction, OPERAND_BITS},
    map,
};
use easyerr::Error;
use std::sync::Arc;

/// Resources a program declares it uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resources {
    /// Number of general purpose registers.
    pub gprs: u16,
    /// Number of internal TRAM channels.
    pub itram: u16,
    /// Number of external TRAM channels.
    pub xtram: u16,
}

impl Resources {
    /// The resources of the whole engine.
    pub const MAX: Self = Self {
        gprs: map::GPR_COUNT,
        itram: map::ITRAM_REGS,
        xtram: map::XTRAM_REGS,
    };
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("program declares {count} general purpose registers, at most {max} are available")]
    TooManyGprs { count: u16, max: u16 },
    #[error("program declares {count} internal TRAM channels, at most {max} are available")]
    TooManyItramChannels { count: u16, max: u16 },
    #[error("program declares {count} external TRAM channels, at most {max} are available")]
    TooManyXtramChannels { count: u16, max: u16 },
    #[error("instruction {index} references register {addr:#05X}, outside of the register space")]
    OperandOutOfRange { index: usize, addr: u16 },
}

/// A validated, immutable sequence of instructions.
///
/// Cloning a [`Program`] is cheap: the code is shared.
#[derive(Debug, Clone)]
pub struct Program {
    code: Arc<[Instruction]>,
    resources: Resources,
}

impl Program {
    pub fn new(code: Vec<Instruction>, resources: Resources) -> Result<Self, ProgramError> {
        let max = Resources::MAX;
        if resources.gprs > max.gprs {
            return Err(ProgramError::TooManyGprs {
                count: resources.gprs,
                max: max.gprs,
            });
        }

        if resources.itram > max.itram {
            return Err(ProgramError::TooManyItramChannels {
                count: resources.itram,
                max: max.itram,
            });
        }

        if resources.xtram > max.xtram {
            return Err(ProgramError::TooManyXtramChannels {
                count: resources.xtram,
                max: max.xtram,
            });
        }

        for (index, ins) in code.iter().enumerate() {
            if let Some(addr) = ins.addresses().into_iter().find(|a| *a >> OPERAND_BITS != 0) {
                return Err(ProgramError::OperandOutOfRange { index, addr });
            }
        }

        Ok(Self {
            code: code.into(),
            resources,
        })
    }

    /// Builds a program out of 64 bit microcode words.
    pub fn from_microcode(words: &[u64], resources: Resources) -> Result<Self, ProgramError> {
        let code = words.iter().copied().map(Instruction::from_microcode).collect();
        Self::new(code, resources)
    }

    #[inline(always)]
    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn resources(&self) -> Resources {
        self.resources
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Encodes the program back into microcode words.
    pub fn microcode(&self) -> Vec<u64> {
        self.code.iter().map(|ins| ins.microcode()).collect()
    }
}
