use std::fmt::{self, Formatter};

use colored::Colorize;

use super::{
    Assignment, BinaryExpression, Declaration, Expression, Function, Literal, Operator, Program,
    ProgramElement, Statement, StatementBlock, Variable,
};

const INDENT: &str = "    ";

fn line(f: &mut Formatter<'_>, level: usize, text: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{}{text}", INDENT.repeat(level))
}

fn open(f: &mut Formatter<'_>, level: usize, label: &str) -> fmt::Result {
    line(f, level, format_args!("{} [", label.magenta()))
}

fn close(f: &mut Formatter<'_>, level: usize) -> fmt::Result {
    line(f, level, "]")
}

trait TreeNode {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result;
}

impl TreeNode for Program {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        open(f, level, "PROGRAM")?;

        for element in &self.elements {
            match element {
                ProgramElement::Function(function) => function.fmt_tree(f, level + 1)?,
                ProgramElement::Statement(statement) => statement.fmt_tree(f, level + 1)?,
            }
        }

        close(f, level)
    }
}

impl TreeNode for Function {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        open(f, level, "FUNCTION")?;
        self.declaration.fmt_tree(f, level + 1)?;

        if self.parameters.is_empty() {
            line(f, level + 1, format_args!("{} [ ]", "PARAMETERS".magenta()))?;
        } else {
            open(f, level + 1, "PARAMETERS")?;
            for parameter in &self.parameters {
                parameter.fmt_tree(f, level + 2)?;
            }
            close(f, level + 1)?;
        }

        self.body.fmt_tree(f, level + 1)?;
        close(f, level)
    }
}

impl TreeNode for StatementBlock {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        open(f, level, "STATEMENT_BLOCK")?;
        for statement in &self.statements {
            statement.fmt_tree(f, level + 1)?;
        }
        close(f, level)
    }
}

impl TreeNode for Statement {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        open(f, level, "STATEMENT")?;
        match self {
            Statement::Variable(variable) => variable.fmt_tree(f, level + 1)?,
            Statement::Assignment(assignment) => assignment.fmt_tree(f, level + 1)?,
        }
        close(f, level)
    }
}

impl TreeNode for Variable {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        open(f, level, "VARIABLE")?;
        self.declaration.fmt_tree(f, level + 1)?;
        if let Some(initializer) = &self.initializer {
            labeled_expression(f, level + 1, "INITIALIZER", initializer)?;
        }
        close(f, level)
    }
}

impl TreeNode for Assignment {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        open(f, level, "ASSIGNMENT")?;
        line(
            f,
            level + 1,
            format_args!("{} {}", "NAME:".cyan(), self.name.lexeme.blue()),
        )?;
        labeled_expression(f, level + 1, "INITIALIZER", &self.initializer)?;
        close(f, level)
    }
}

impl TreeNode for Declaration {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        line(
            f,
            level,
            format_args!(
                "{} [ {} {} ]",
                "DECLARATION".magenta(),
                self.ty.lexeme.green(),
                self.name.lexeme.blue()
            ),
        )
    }
}

impl TreeNode for BinaryExpression {
    fn fmt_tree(&self, f: &mut Formatter<'_>, level: usize) -> fmt::Result {
        line(f, level, "[")?;
        labeled_expression(f, level + 1, "LEFT EXPRESSION", &self.left)?;
        line(
            f,
            level + 1,
            format_args!("{} {}", "OPERATOR:".cyan(), self.operator),
        )?;
        labeled_expression(f, level + 1, "RIGHT EXPRESSION", &self.right)?;
        close(f, level)
    }
}

/// Leaves print inline after the label, nested expressions on the lines below
fn labeled_expression(
    f: &mut Formatter<'_>,
    level: usize,
    label: &str,
    expression: &Expression,
) -> fmt::Result {
    let label = format!("{label}:");

    match expression {
        Expression::Literal(literal) => {
            line(f, level, format_args!("{} {literal}", label.cyan()))
        }
        Expression::Binary(binary) => {
            line(f, level, label.cyan())?;
            binary.fmt_tree(f, level + 1)
        }
    }
}

macro_rules! display_tree {
    ($($node:ty),* $(,)?) => {
        $(
            impl fmt::Display for $node {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    self.fmt_tree(f, 0)
                }
            }
        )*
    };
}

display_tree!(
    Program,
    Function,
    StatementBlock,
    Statement,
    Variable,
    Assignment,
    Declaration,
);

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Binary(binary) => binary.fmt_tree(f, 0),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value().yellow())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token.lexeme.white())
    }
}

impl Expression {
    /// Single line rendering with every binary node wrapped in parentheses,
    /// e.g. `(a = (1 + (2 * 3)))`.
    pub fn parenthesized(&self) -> String {
        match self {
            Expression::Literal(literal) => literal.value().to_owned(),
            Expression::Binary(binary) => format!(
                "({} {} {})",
                binary.left.parenthesized(),
                binary.operator.kind,
                binary.right.parenthesized()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use crate::frontend::{SourceFile, lexer::Lexer, parser::Parser};

    fn render(input: &str) -> String {
        let source = SourceFile::in_memory(input);
        let tokens = Lexer::new(&source).tokenize().unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();

        strip_ansi_escapes::strip_str(program.to_string())
    }

    #[test]
    fn function_tree() {
        assert_eq!(
            render("int main() { int x = 2; int y = x + 3; }"),
            indoc! {"
                PROGRAM [
                    FUNCTION [
                        DECLARATION [ int main ]
                        PARAMETERS [ ]
                        STATEMENT_BLOCK [
                            STATEMENT [
                                VARIABLE [
                                    DECLARATION [ int x ]
                                    INITIALIZER: 2
                                ]
                            ]
                            STATEMENT [
                                VARIABLE [
                                    DECLARATION [ int y ]
                                    INITIALIZER:
                                        [
                                            LEFT EXPRESSION: x
                                            OPERATOR: +
                                            RIGHT EXPRESSION: 3
                                        ]
                                ]
                            ]
                        ]
                    ]
                ]
            "}
        );
    }

    #[test]
    fn parameters_and_assignment_tree() {
        assert_eq!(
            render("void f(int a, char b) { a = (a - 1) * b; } float g;"),
            indoc! {"
                PROGRAM [
                    FUNCTION [
                        DECLARATION [ void f ]
                        PARAMETERS [
                            DECLARATION [ int a ]
                            DECLARATION [ char b ]
                        ]
                        STATEMENT_BLOCK [
                            STATEMENT [
                                ASSIGNMENT [
                                    NAME: a
                                    INITIALIZER:
                                        [
                                            LEFT EXPRESSION:
                                                [
                                                    LEFT EXPRESSION: a
                                                    OPERATOR: -
                                                    RIGHT EXPRESSION: 1
                                                ]
                                            OPERATOR: *
                                            RIGHT EXPRESSION: b
                                        ]
                                ]
                            ]
                        ]
                    ]
                    STATEMENT [
                        VARIABLE [
                            DECLARATION [ float g ]
                        ]
                    ]
                ]
            "}
        );
    }
}
