//! The backend renders TAC as symbolic pseudo-assembly. There is no real
//! instruction selection: every place (variable or temporary) is bound to a
//! numbered register the first time it is referenced and keeps it for the
//! rest of the run, integer constants become `#` immediates.

use crate::middle::tac;

mod assembler;

pub use assembler::{Assembler, RegisterId};

/// How long a place keeps the register it was first given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RegisterScope {
    /// One map for the whole program. Functions that use the same variable
    /// name share its register.
    #[default]
    Program,
    /// The map is cleared at the start of every function
    Function,
}

#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    pub register_scope: RegisterScope,
    /// Echo each TAC instruction as a comment above its assembly
    pub annotate: bool,
}

pub fn emit_assembly(program: &tac::Program, options: &EmitOptions) -> String {
    let mut assembler = Assembler::new(options);

    for instruction in &program.instructions {
        assembler.emit_instruction(instruction);
    }

    assembler.into_output()
}
