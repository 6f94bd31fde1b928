//! `tacc` compiles a tiny C-like language into three-address code and then
//! into symbolic pseudo-assembly.
//!
//! ```text
//! source -> lexer -> tokens -> parser -> AST -> lowering -> TAC -> assembler -> asm
//! ```

pub mod backend;
pub mod driver;
pub mod error;
pub mod frontend;
mod index;
pub mod middle;

pub use driver::{Compilation, Session, compile};
pub use error::CompileError;
