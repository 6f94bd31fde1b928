use crate::frontend::{
    ast::{
        Assignment, BinaryExpression, BinaryOperatorKind, Declaration, Expression, Function,
        Literal, Operator, Program, ProgramElement, Statement, StatementBlock, Variable,
    },
    lexer::{Keyword, Token, TokenClass, TokenKind},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error on line {line}: expected `;` after statement but found {found}")]
    ExpectedTerminator { line: usize, found: String },
    #[error("syntax error on line {line}: expected `{{` to open a block but found {found}")]
    ExpectedBlock { line: usize, found: String },
    #[error("syntax error on line {line}: unterminated block, expected `}}` but found {found}")]
    UnterminatedBlock { line: usize, found: String },
    #[error("syntax error on line {line}: expected `{expected}` but found {found}")]
    ExpectedDelimiter {
        expected: &'static str,
        line: usize,
        found: String,
    },
    #[error("syntax error on line {line}: expected a declaration but found {found}")]
    ExpectedDeclaration { line: usize, found: String },
    #[error("syntax error on line {line}: invalid literal {found}")]
    InvalidLiteral { line: usize, found: String },
    #[error("syntax error on line {line}: invalid operator {found}")]
    InvalidOperator { line: usize, found: String },
    #[error(
        "syntax error on line {line}: expected `(`, `=` or `;` after a declaration but found {found}"
    )]
    UnexpectedProgramElement { line: usize, found: String },
    #[error("syntax error on line {line}: parser reached beyond the end of input")]
    UnexpectedEndOfInput { line: usize },
}

fn describe(token: &Token) -> String {
    if token.is_eof() {
        "end of input".to_owned()
    } else {
        format!("`{}`", token.lexeme)
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperatorKind> {
    Some(match kind {
        TokenKind::Equals => BinaryOperatorKind::Assign,
        TokenKind::DoubleEquals => BinaryOperatorKind::Equals,
        TokenKind::LessThan => BinaryOperatorKind::LessThan,
        TokenKind::LessThanOrEqualTo => BinaryOperatorKind::LessThanOrEqualTo,
        TokenKind::GreaterThan => BinaryOperatorKind::GreaterThan,
        TokenKind::GreaterThanOrEqualTo => BinaryOperatorKind::GreaterThanOrEqualTo,
        TokenKind::Plus => BinaryOperatorKind::Add,
        TokenKind::Minus => BinaryOperatorKind::Subtract,
        TokenKind::Asterisk => BinaryOperatorKind::Multiply,
        TokenKind::Divide => BinaryOperatorKind::Divide,
        _ => return None,
    })
}

/// Recursive descent over declarations, statements, blocks and functions,
/// with a binding power loop for expressions. One pass, no backtracking.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    /// Index of the next token `next` will hand out
    position: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::new(TokenKind::Eof, "", line));
        }

        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
        Self::new(tokens).parse_program()
    }

    fn eof(&self) -> &Token {
        // `new` guarantees a trailing end of input token
        &self.tokens[self.tokens.len() - 1]
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.position + n)
            .unwrap_or_else(|| self.eof())
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        let Some(token) = self.tokens.get(self.position).cloned() else {
            return Err(ParseError::UnexpectedEndOfInput {
                line: self.eof().line,
            });
        };

        self.position += 1;

        Ok(token)
    }

    fn expect_next_to_be(
        &mut self,
        kind: TokenKind,
        error: impl FnOnce(usize, String) -> ParseError,
    ) -> Result<Token, ParseError> {
        let token = self.next()?;

        if token.kind != kind {
            return Err(error(token.line, describe(&token)));
        }

        Ok(token)
    }

    fn expect_delimiter(
        &mut self,
        kind: TokenKind,
        expected: &'static str,
    ) -> Result<Token, ParseError> {
        self.expect_next_to_be(kind, |line, found| ParseError::ExpectedDelimiter {
            expected,
            line,
            found,
        })
    }

    /// program = ( function | statement )* EOF
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut elements = Vec::new();

        while !self.peek().is_eof() {
            elements.push(self.parse_program_element()?);
        }

        // Consume the end of input marker so every token is read exactly once
        self.next()?;

        log::debug!("parsed {} top level elements", elements.len());

        Ok(Program { elements })
    }

    /// Decided by the token after the type and the name: `(` starts a
    /// function, `=` or `;` a statement.
    fn parse_program_element(&mut self) -> Result<ProgramElement, ParseError> {
        let lookahead = self.peek_nth(2);

        match lookahead.kind {
            TokenKind::OpenParen => Ok(ProgramElement::Function(self.parse_function()?)),
            TokenKind::Equals | TokenKind::Semicolon => {
                Ok(ProgramElement::Statement(self.parse_statement()?))
            }
            _ => Err(ParseError::UnexpectedProgramElement {
                line: lookahead.line,
                found: describe(lookahead),
            }),
        }
    }

    /// int name(int a, char b) { ... }
    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let declaration = self.parse_declaration()?;
        let mut parameters = Vec::new();

        self.expect_delimiter(TokenKind::OpenParen, "(")?;

        // If the next token is not a closing paren there MUST be at least one
        // parameter
        if self.peek().kind != TokenKind::CloseParen {
            parameters.push(self.parse_declaration()?);

            while self.peek().kind == TokenKind::Comma {
                self.next()?;
                parameters.push(self.parse_declaration()?);
            }
        }

        self.expect_delimiter(TokenKind::CloseParen, ")")?;

        let body = self.parse_block()?;

        log::trace!(
            "parsed function `{}` with {} parameters",
            declaration.name(),
            parameters.len()
        );

        Ok(Function {
            declaration,
            parameters,
            body,
        })
    }

    // "{" ( statement )* "}"
    fn parse_block(&mut self) -> Result<StatementBlock, ParseError> {
        let mut statements = Vec::new();

        self.expect_next_to_be(TokenKind::OpenBrace, |line, found| {
            ParseError::ExpectedBlock { line, found }
        })?;

        loop {
            let peeked = self.peek();

            match peeked.kind {
                TokenKind::CloseBrace => break,
                TokenKind::Eof => {
                    return Err(ParseError::UnterminatedBlock {
                        line: peeked.line,
                        found: describe(peeked),
                    });
                }
                _ => statements.push(self.parse_statement()?),
            }
        }

        self.next()?;

        Ok(StatementBlock { statements })
    }

    /// ( assignment | variable ) ";"
    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let peeked = self.peek();

        let statement = match peeked.kind {
            kind if kind.is_type_keyword() => Statement::Variable(self.parse_variable()?),
            TokenKind::Identifier => Statement::Assignment(self.parse_assignment()?),
            _ => {
                return Err(ParseError::ExpectedDeclaration {
                    line: peeked.line,
                    found: describe(peeked),
                });
            }
        };

        self.expect_next_to_be(TokenKind::Semicolon, |line, found| {
            ParseError::ExpectedTerminator { line, found }
        })?;

        Ok(statement)
    }

    // int x = expression
    fn parse_variable(&mut self) -> Result<Variable, ParseError> {
        let declaration = self.parse_declaration()?;

        let initializer = if self.peek().kind == TokenKind::Equals {
            self.next()?;
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(Variable {
            declaration,
            initializer,
        })
    }

    // x = expression
    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let name = self.expect_next_to_be(TokenKind::Identifier, |line, found| {
            ParseError::ExpectedDeclaration { line, found }
        })?;
        self.expect_delimiter(TokenKind::Equals, "=")?;
        let initializer = self.parse_expression()?;

        Ok(Assignment { name, initializer })
    }

    // type ( identifier | main )
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let ty = self.next()?;

        if !ty.kind.is_type_keyword() {
            return Err(ParseError::ExpectedDeclaration {
                line: ty.line,
                found: describe(&ty),
            });
        }

        let name = self.next()?;

        if !matches!(
            name.kind,
            TokenKind::Identifier | TokenKind::Keyword(Keyword::Main)
        ) {
            return Err(ParseError::ExpectedDeclaration {
                line: name.line,
                found: describe(&name),
            });
        }

        Ok(Declaration { ty, name })
    }

    /// Parses a full expression, stopping at the first delimiter or the end
    /// of input without consuming it.
    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_expression_with_binding_power(0.0)
    }

    fn parse_expression_with_binding_power(
        &mut self,
        min_binding_power: f32,
    ) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_leaf()?;

        loop {
            let peeked = self.peek();

            if matches!(
                peeked.class,
                TokenClass::Delimiter | TokenClass::EndOfInput
            ) {
                break;
            }

            let Some(kind) = binary_operator(peeked.kind) else {
                return Err(ParseError::InvalidOperator {
                    line: peeked.line,
                    found: describe(peeked),
                });
            };

            let (left_binding_power, right_binding_power) = kind.binding_power();

            if left_binding_power < min_binding_power {
                break;
            }

            let token = self.next()?;
            let rhs = self.parse_expression_with_binding_power(right_binding_power)?;

            lhs = Expression::Binary(Box::new(BinaryExpression {
                left: lhs,
                operator: Operator { token, kind },
                right: rhs,
            }));
        }

        Ok(lhs)
    }

    // literal | identifier | "(" expression ")"
    fn parse_leaf(&mut self) -> Result<Expression, ParseError> {
        let token = self.next()?;

        match token.class {
            TokenClass::Literal | TokenClass::Identifier => {
                Ok(Expression::Literal(Literal { token }))
            }
            TokenClass::Delimiter if token.kind == TokenKind::OpenParen => {
                let expression = self.parse_expression_with_binding_power(0.0)?;
                self.expect_delimiter(TokenKind::CloseParen, ")")?;

                Ok(expression)
            }
            _ => Err(ParseError::InvalidLiteral {
                line: token.line,
                found: describe(&token),
            }),
        }
    }
}
