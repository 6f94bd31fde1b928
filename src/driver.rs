//! A [`Session`] runs the pipeline over one source file and keeps the output
//! of every stage around so the listings can be printed afterwards.

use crate::{
    backend::{EmitOptions, emit_assembly},
    error::CompileError,
    frontend::{
        SourceFile,
        ast,
        lexer::{Lexer, Token},
        parser::Parser,
    },
    middle::tac::{self, ast_lowering::lower_program},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("usage error: no parsed program to generate code for, call `parse` first")]
    NoParsedProgram,
}

#[derive(Debug)]
pub struct Session {
    source: SourceFile,
    tokens: Option<Vec<Token>>,
    program: Option<ast::Program>,
    tac: Option<tac::Program>,
}

impl Session {
    pub fn new(source: SourceFile) -> Self {
        Self {
            source,
            tokens: None,
            program: None,
            tac: None,
        }
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn tokenize(&mut self) -> Result<&[Token], CompileError> {
        let tokens = match self.tokens.take() {
            Some(tokens) => tokens,
            None => {
                log::debug!("tokenizing {}", self.source.origin);
                Lexer::new(&self.source).tokenize()?
            }
        };

        Ok(self.tokens.insert(tokens))
    }

    /// Tokenizes first if that has not happened yet
    pub fn parse(&mut self) -> Result<&ast::Program, CompileError> {
        let program = match self.program.take() {
            Some(program) => program,
            None => {
                let tokens = self.tokenize()?.to_vec();
                Parser::parse(tokens)?
            }
        };

        Ok(self.program.insert(program))
    }

    /// Lowers the program produced by an earlier [`Session::parse`] call.
    pub fn generate(&mut self) -> Result<&tac::Program, CompileError> {
        let tac = match self.tac.take() {
            Some(tac) => tac,
            None => {
                let Some(program) = &self.program else {
                    return Err(SessionError::NoParsedProgram.into());
                };

                lower_program(program)?
            }
        };

        Ok(self.tac.insert(tac))
    }

    pub fn emit(&mut self, options: &EmitOptions) -> Result<String, CompileError> {
        self.parse()?;

        Ok(emit_assembly(self.generate()?, options))
    }

    /// Consumes the session, running every stage that has not run yet
    pub fn finish(mut self, options: &EmitOptions) -> Result<Compilation, CompileError> {
        let assembly = self.emit(options)?;

        match (self.tokens, self.program, self.tac) {
            (Some(tokens), Some(program), Some(tac)) => Ok(Compilation {
                tokens,
                program,
                tac,
                assembly,
            }),
            _ => Err(SessionError::NoParsedProgram.into()),
        }
    }
}

/// Every artifact of one successful run
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub program: ast::Program,
    pub tac: tac::Program,
    pub assembly: String,
}

pub fn compile(source: &str, options: &EmitOptions) -> Result<Compilation, CompileError> {
    Session::new(SourceFile::in_memory(source)).finish(options)
}
