use std::fmt::Write;

use colored::Colorize;

use crate::{index::Index, middle::tac};

pub fn pretty_print_tac(program: &tac::Program) {
    print!("{}", listing(program));
}

/// Function bodies are indented, `LABEL` and `END` lines are not
pub fn listing(program: &tac::Program) -> String {
    let mut output = String::new();

    for instruction in &program.instructions {
        let indent = match instruction {
            tac::Instruction::Label(_) | tac::Instruction::End(_) => "",
            _ => "    ",
        };

        // Writing to a String cannot fail
        let _ = writeln!(output, "{indent}{instruction}");
    }

    output
}

impl core::fmt::Display for tac::Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }

        Ok(())
    }
}

impl core::fmt::Display for tac::Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            tac::Instruction::Label(name) => write!(f, "{} {}", "LABEL".cyan(), name.blue()),
            tac::Instruction::End(name) => write!(f, "{} {}", "END".cyan(), name.blue()),
            tac::Instruction::Parameter(name) => write!(f, "{} {name}", "PARAMETER".cyan()),
            tac::Instruction::Declare(name) => write!(f, "{} {name}", "DECLARE".cyan()),
            tac::Instruction::Copy { target, source } => {
                write!(f, "{} {} {}", colored_place(target), "=".white(), colored(source))
            }
            tac::Instruction::Binary {
                target,
                lhs,
                operator,
                rhs,
            } => write!(
                f,
                "{} {} {} {} {}",
                colored_place(target),
                "=".white(),
                colored(lhs),
                operator.to_string().white(),
                colored(rhs)
            ),
        }
    }
}

fn colored_place(place: &tac::Place) -> String {
    match place {
        tac::Place::Variable(name) => name.clone(),
        tac::Place::Temporary(id) => id.to_string().yellow().to_string(),
    }
}

fn colored(operand: &tac::Operand) -> String {
    match operand {
        tac::Operand::Place(place) => colored_place(place),
        tac::Operand::Constant(value) => value.purple().to_string(),
    }
}

impl core::fmt::Display for tac::TemporaryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.index())
    }
}

impl core::fmt::Display for tac::Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            tac::Place::Variable(name) => write!(f, "{name}"),
            tac::Place::Temporary(id) => write!(f, "{id}"),
        }
    }
}

impl core::fmt::Display for tac::Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            tac::Operand::Place(place) => write!(f, "{place}"),
            tac::Operand::Constant(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        frontend::{SourceFile, lexer::Lexer, parser::Parser},
        middle::tac::ast_lowering::lower_program,
    };

    #[test]
    fn labels_and_ends_line_up() {
        let source = SourceFile::in_memory("int g = 1; int main() { int x = 2; }");
        let tokens = Lexer::new(&source).tokenize().unwrap();
        let program = lower_program(&Parser::parse(tokens).unwrap()).unwrap();

        assert_eq!(
            strip_ansi_escapes::strip_str(listing(&program)),
            indoc! {"
                    g = 1
                LABEL main
                    x = 2
                END main
            "}
        );
    }
}
