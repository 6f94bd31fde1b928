//! Syntax tree produced by the [`Parser`](crate::frontend::parser::Parser).
//! Every union in the grammar is a closed enum so consumers have to match
//! each shape explicitly.

use crate::frontend::lexer::Token;

mod pretty_print;

/// Parse root: functions and top level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub elements: Vec<ProgramElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgramElement {
    Function(Function),
    Statement(Statement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub declaration: Declaration,
    pub parameters: Vec<Declaration>,
    pub body: StatementBlock,
}

impl Function {
    pub fn name(&self) -> &str {
        self.declaration.name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementBlock {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Variable(Variable),
    Assignment(Assignment),
}

/// A declaration, optionally initialized: `int x` or `int x = 1 + 2`
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub declaration: Declaration,
    pub initializer: Option<Expression>,
}

/// `x = 1 + 2`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: Token,
    pub initializer: Expression,
}

/// A single typed name: `int x`
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: Token,
    pub name: Token,
}

impl Declaration {
    pub fn name(&self) -> &str {
        &self.name.lexeme
    }
}

/// Either a leaf or a binary node. Grouping parentheses leave no trace in the
/// tree, they only shape it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Binary(Box<BinaryExpression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub left: Expression,
    pub operator: Operator,
    pub right: Expression,
}

/// A literal or identifier token at the leaf of an expression tree
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub token: Token,
}

impl Literal {
    pub fn value(&self) -> &str {
        &self.token.lexeme
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub token: Token,
    pub kind: BinaryOperatorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum BinaryOperatorKind {
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = "==")]
    Equals,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanOrEqualTo,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterThanOrEqualTo,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
}

impl BinaryOperatorKind {
    /// `(left, right)` binding power. A right power slightly above the left
    /// one makes chains of the same operator associate to the left.
    pub fn binding_power(self) -> (f32, f32) {
        match self {
            Self::Assign => (1.0, 1.1),
            Self::Equals => (8.0, 8.1),
            Self::LessThan
            | Self::LessThanOrEqualTo
            | Self::GreaterThan
            | Self::GreaterThanOrEqualTo => (9.0, 9.1),
            Self::Add | Self::Subtract => (11.0, 11.1),
            Self::Multiply | Self::Divide => (12.0, 12.1),
        }
    }
}
