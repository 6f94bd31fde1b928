use crate::{
    frontend::{
        ast::{self, BinaryOperatorKind},
        lexer::TokenClass,
    },
    index::Index,
    middle::tac::{self, Instruction, Operand, Place, TemporaryId},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoweringError {
    #[error(
        "lowering error on line {line}: cannot assign to `{target}`, the left hand side of `=` must be a variable name"
    )]
    InvalidAssignmentTarget { line: usize, target: String },
}

/// Lowers a whole program into TAC. Temporaries are numbered from `t0` for
/// every call.
pub fn lower_program(program: &ast::Program) -> Result<tac::Program, LoweringError> {
    let mut context = LoweringContext::default();

    for element in &program.elements {
        match element {
            ast::ProgramElement::Function(function) => {
                context.lower_function(function)?;
            }
            ast::ProgramElement::Statement(statement) => {
                context.lower_statement(statement)?;
            }
        }
    }

    let output = context.into_output();

    log::debug!(
        "lowered program into {} instructions using {} temporaries",
        output.instructions.len(),
        output.temporary_count
    );

    Ok(output)
}

#[derive(Default)]
struct LoweringContext {
    instructions: Vec<Instruction>,
    next_temporary: TemporaryId,
}

impl LoweringContext {
    fn create_temporary(&mut self) -> TemporaryId {
        let id = self.next_temporary;
        self.next_temporary.increment_by(1);
        id
    }

    fn push_instruction(&mut self, instruction: Instruction) {
        log::trace!("{}", strip_ansi_escapes::strip_str(instruction.to_string()));
        self.instructions.push(instruction);
    }

    fn into_output(self) -> tac::Program {
        tac::Program {
            instructions: self.instructions,
            temporary_count: self.next_temporary.index(),
        }
    }

    /// Returns the function name
    fn lower_function(&mut self, function: &ast::Function) -> Result<String, LoweringError> {
        let name = function.name().to_owned();

        self.push_instruction(Instruction::Label(name.clone()));

        for parameter in &function.parameters {
            self.push_instruction(Instruction::Parameter(parameter.name().to_owned()));
        }

        for statement in &function.body.statements {
            self.lower_statement(statement)?;
        }

        self.push_instruction(Instruction::End(name.clone()));

        Ok(name)
    }

    fn lower_statement(&mut self, statement: &ast::Statement) -> Result<Place, LoweringError> {
        match statement {
            ast::Statement::Variable(variable) => self.lower_variable(variable),
            ast::Statement::Assignment(assignment) => self.lower_assignment(assignment),
        }
    }

    fn lower_variable(&mut self, variable: &ast::Variable) -> Result<Place, LoweringError> {
        let target = Place::Variable(variable.declaration.name().to_owned());

        match &variable.initializer {
            Some(initializer) => {
                let source = self.lower_expression(initializer)?;

                self.push_instruction(Instruction::Copy {
                    target: target.clone(),
                    source,
                });
            }
            None => {
                self.push_instruction(Instruction::Declare(
                    variable.declaration.name().to_owned(),
                ));
            }
        }

        Ok(target)
    }

    fn lower_assignment(&mut self, assignment: &ast::Assignment) -> Result<Place, LoweringError> {
        let target = Place::Variable(assignment.name.lexeme.clone());
        let source = self.lower_expression(&assignment.initializer)?;

        self.push_instruction(Instruction::Copy {
            target: target.clone(),
            source,
        });

        Ok(target)
    }

    /// Operands are evaluated left to right before the operator itself
    fn lower_expression(&mut self, expression: &ast::Expression) -> Result<Operand, LoweringError> {
        let binary = match expression {
            ast::Expression::Literal(literal) => return Ok(Self::lower_literal(literal)),
            ast::Expression::Binary(binary) => binary,
        };

        let lhs = self.lower_expression(&binary.left)?;
        let rhs = self.lower_expression(&binary.right)?;

        if binary.operator.kind == BinaryOperatorKind::Assign {
            let Some(name) = lhs.as_variable() else {
                return Err(LoweringError::InvalidAssignmentTarget {
                    line: binary.operator.token.line,
                    target: lhs.to_string(),
                });
            };

            self.push_instruction(Instruction::Copy {
                target: Place::Variable(name.to_owned()),
                source: rhs,
            });

            return Ok(lhs);
        }

        let target = Place::Temporary(self.create_temporary());

        self.push_instruction(Instruction::Binary {
            target: target.clone(),
            lhs,
            operator: binary.operator.kind,
            rhs,
        });

        Ok(target.into())
    }

    fn lower_literal(literal: &ast::Literal) -> Operand {
        match literal.token.class {
            TokenClass::Identifier => Operand::variable(literal.value()),
            _ => Operand::Constant(literal.value().to_owned()),
        }
    }
}
