use crate::{
    driver::SessionError,
    frontend::{lexer::LexError, parser::ParseError},
    middle::tac::ast_lowering::LoweringError,
};

/// Any failure of a compilation run. No stage runs after the one that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Lowering(#[from] LoweringError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
