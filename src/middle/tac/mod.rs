//! TAC (three-address code). Every instruction has at most one operator, two
//! source operands and one destination. The list is built in a single forward
//! pass and is never reordered afterwards.

use crate::{
    frontend::ast::BinaryOperatorKind,
    index::{Index, simple_index},
};

pub mod ast_lowering;
pub mod pretty_print;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Number of temporaries allocated while lowering
    pub temporary_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Start of a function body
    Label(String),
    /// End of a function body
    End(String),
    /// A formal parameter of the enclosing function
    Parameter(String),
    /// A variable declared without an initializer
    Declare(String),
    /// `target = source`
    Copy { target: Place, source: Operand },
    /// `target = lhs operator rhs`
    Binary {
        target: Place,
        lhs: Operand,
        operator: BinaryOperatorKind,
        rhs: Operand,
    },
}

simple_index! {
    /// Identifies a compiler generated temporary, printed as `t<N>`
    pub struct TemporaryId;
}

impl Default for TemporaryId {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Somewhere a value can be stored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Place {
    Variable(String),
    Temporary(TemporaryId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Place(Place),
    /// Literal text exactly as written in the source
    Constant(String),
}

impl Operand {
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Place(Place::Variable(name.into()))
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Operand::Place(Place::Variable(name)) => Some(name),
            _ => None,
        }
    }
}

impl From<Place> for Operand {
    fn from(place: Place) -> Self {
        Self::Place(place)
    }
}
