use std::{collections::BTreeMap, str::Chars};

use itertools::{PeekNth, peek_nth};
use once_cell::sync::Lazy;
use strum::EnumString;

use crate::frontend::SourceFile;

#[derive(Debug)]
pub struct Lexer<'source> {
    source: &'source SourceFile,
    position: usize,
    line_number: usize,
    chars: PeekNth<Chars<'source>>,
}

/// A classified lexeme. Tokens are never mutated after the lexer creates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub class: TokenClass,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            class: kind.class(),
            lexeme: lexeme.into(),
            line,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Token({:?}, {}, '{}', line {})",
            self.kind, self.class, self.lexeme, self.line
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TokenClass {
    Delimiter,
    Identifier,
    Keyword,
    Operator,
    Literal,
    EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /* Words */
    Keyword(Keyword), // int
    Identifier,       // x

    /* Literals */
    IntegerLiteral, // 1
    FloatLiteral,   // 1.0
    CharLiteral,    // 'A'

    /* Delimiters */
    OpenParen,    // (
    CloseParen,   // )
    OpenBracket,  // [
    CloseBracket, // ]
    OpenBrace,    // {
    CloseBrace,   // }
    Semicolon,    // ;
    Comma,        // ,
    Colon,        // :

    /* Operators */
    Plus,                 // +
    PlusPlus,             // ++
    PlusEquals,           // +=
    Minus,                // -
    MinusMinus,           // --
    Asterisk,             // *
    Divide,               // /
    Equals,               // =
    DoubleEquals,         // ==
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    ShiftLeft,            // <<
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=
    ShiftRight,           // >>
    Caret,                // ^
    Question,             // ?
    Ampersand,            // &

    Eof,
}

impl TokenKind {
    pub fn class(self) -> TokenClass {
        match self {
            Self::Keyword(_) => TokenClass::Keyword,
            Self::Identifier => TokenClass::Identifier,
            Self::IntegerLiteral | Self::FloatLiteral | Self::CharLiteral => TokenClass::Literal,
            Self::OpenParen
            | Self::CloseParen
            | Self::OpenBracket
            | Self::CloseBracket
            | Self::OpenBrace
            | Self::CloseBrace
            | Self::Semicolon
            | Self::Comma
            | Self::Colon => TokenClass::Delimiter,
            Self::Eof => TokenClass::EndOfInput,
            _ => TokenClass::Operator,
        }
    }

    pub fn is_type_keyword(&self) -> bool {
        matches!(self, Self::Keyword(keyword) if keyword.is_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    If,
    Else,
    While,
    Break,
    Continue,
    Int,
    Float,
    Char,
    Void,
    Return,
    Main,
}

impl Keyword {
    pub fn is_type(self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Char | Self::Void)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("lexical error on line {line}: unexpected character `{character}`")]
    UnexpectedCharacter { character: char, line: usize },
    #[error("lexical error on line {line}: unterminated char literal")]
    UnterminatedCharLiteral { line: usize },
}

/// Table of single char tokens (matched after longer sequences are checked for)
static SINGLE_TOKENS: Lazy<BTreeMap<char, TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        ('(', TokenKind::OpenParen),
        (')', TokenKind::CloseParen),
        ('[', TokenKind::OpenBracket),
        (']', TokenKind::CloseBracket),
        ('{', TokenKind::OpenBrace),
        ('}', TokenKind::CloseBrace),
        (';', TokenKind::Semicolon),
        (',', TokenKind::Comma),
        (':', TokenKind::Colon),
        ('*', TokenKind::Asterisk),
        ('-', TokenKind::Minus),
        ('=', TokenKind::Equals),
        ('+', TokenKind::Plus),
        ('/', TokenKind::Divide),
        ('^', TokenKind::Caret),
        ('?', TokenKind::Question),
        ('&', TokenKind::Ampersand),
        ('<', TokenKind::LessThan),
        ('>', TokenKind::GreaterThan),
    ])
});

impl<'source> Lexer<'source> {
    pub fn new(source: &'source SourceFile) -> Self {
        Self {
            source,
            chars: peek_nth(source.contents.chars()),
            position: 0,
            line_number: 1,
        }
    }

    /// Consumes the whole source. The returned stream always ends with
    /// exactly one [`TokenKind::Eof`] token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            log::trace!("lexed {token}");
            tokens.push(token);
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.line_number));

        log::debug!("lexed {} tokens from {}", tokens.len(), self.source.origin);

        Ok(tokens)
    }

    fn ignore_whitespace(&mut self) {
        while let Some(c) = self.chars.peek().copied() {
            if !c.is_ascii_whitespace() {
                break;
            }

            if c == '\n' {
                self.line_number += 1;
            }

            self.advance();
        }
    }

    fn ignore_line(&mut self) {
        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                break;
            }

            self.advance();
        }
    }

    fn read_char_literal(&mut self) -> Result<Token, LexError> {
        let start_position = self.position;

        // Consume the opening quote
        self.advance();

        while let Some(c) = self.chars.peek().copied() {
            if c == '\n' {
                break;
            }

            self.advance();

            // Skip over an escaped quote
            if c == '\\' && self.chars.peek().is_some_and(|c| *c == '\'') {
                self.advance();
                continue;
            }

            if c == '\'' {
                return Ok(self.new_token(TokenKind::CharLiteral, start_position));
            }
        }

        Err(LexError::UnterminatedCharLiteral {
            line: self.line_number,
        })
    }

    // Keyword or identifier
    fn read_word(&mut self) -> Token {
        let start_position = self.position;

        while let Some(c) = self.chars.peek().copied() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }

            self.advance();
        }

        let value = &self.source.contents[start_position..self.position];

        let kind = match value.parse() {
            Ok(keyword) => TokenKind::Keyword(keyword),
            Err(_) => TokenKind::Identifier,
        };

        self.new_token(kind, start_position)
    }

    fn read_number(&mut self) -> Token {
        let start_position = self.position;

        self.skip_digits();

        if self.chars.peek() == Some(&'.') {
            return self.read_decimal_part(start_position);
        }

        self.new_token(TokenKind::IntegerLiteral, start_position)
    }

    /// Reads from a `.` to the end of the fraction, the token starts at
    /// `start_position`
    fn read_decimal_part(&mut self, start_position: usize) -> Token {
        // Consume the decimal point
        self.advance();
        self.skip_digits();

        self.new_token(TokenKind::FloatLiteral, start_position)
    }

    fn skip_digits(&mut self) {
        while self.chars.peek().is_some_and(char::is_ascii_digit) {
            self.advance();
        }
    }

    fn read_single(&mut self, kind: TokenKind) -> Token {
        let start_position = self.position;

        self.advance();

        self.new_token(kind, start_position)
    }

    fn read_double(&mut self, kind: TokenKind) -> Token {
        let start_position = self.position;

        self.advance();
        self.advance();

        self.new_token(kind, start_position)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();

        Some(c)
    }

    fn new_token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(
            kind,
            &self.source.contents[start..self.position],
            self.line_number,
        )
    }

    fn next_is(&mut self, n: usize, expected: char) -> bool {
        self.chars.peek_nth(n).is_some_and(|c| *c == expected)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        while let Some(c) = self.chars.peek().copied() {
            let token = match c {
                // Ignore whitespace
                c if c.is_ascii_whitespace() => {
                    self.ignore_whitespace();
                    continue;
                }
                // Ignore comments
                '/' if self.next_is(1, '/') => {
                    self.ignore_line();
                    continue;
                }

                // Char literals
                '\'' => self.read_char_literal()?,

                // Integer and float literals
                n if n.is_ascii_digit() => self.read_number(),
                '.' if self.chars.peek_nth(1).is_some_and(char::is_ascii_digit) => {
                    self.read_decimal_part(self.position)
                }

                // Identifiers and keywords
                a if a.is_ascii_alphabetic() || a == '_' => self.read_word(),

                // Increment and decrement (++, --)
                '+' if self.next_is(1, '+') => self.read_double(TokenKind::PlusPlus),
                '-' if self.next_is(1, '-') => self.read_double(TokenKind::MinusMinus),
                // Plus equals (+=)
                '+' if self.next_is(1, '=') => self.read_double(TokenKind::PlusEquals),

                // Double Equals (==)
                '=' if self.next_is(1, '=') => self.read_double(TokenKind::DoubleEquals),
                // Less than or equal (<=)
                '<' if self.next_is(1, '=') => self.read_double(TokenKind::LessThanOrEqualTo),
                // Greater than or equal (>=)
                '>' if self.next_is(1, '=') => {
                    self.read_double(TokenKind::GreaterThanOrEqualTo)
                }

                // Shift left (<<)
                '<' if self.next_is(1, '<') => self.read_double(TokenKind::ShiftLeft),
                // Shift right (>>)
                '>' if self.next_is(1, '>') => self.read_double(TokenKind::ShiftRight),

                s if SINGLE_TOKENS.contains_key(&s) => self.read_single(SINGLE_TOKENS[&s]),
                c => {
                    return Err(LexError::UnexpectedCharacter {
                        character: c,
                        line: self.line_number,
                    });
                }
            };

            return Ok(Some(token));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lex(input: &str) -> Result<Vec<Token>, LexError> {
        let source = SourceFile::in_memory(input);

        Lexer::new(&source).tokenize()
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        let tokens = lex("").unwrap();

        assert_eq!(tokens, vec![Token::new(TokenKind::Eof, "", 1)]);
        assert_eq!(tokens[0].class, TokenClass::EndOfInput);
    }

    #[test]
    fn declaration_tokens() {
        let tokens = lex("int x = 42;").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Keyword(Keyword::Int), "int", 1),
                Token::new(TokenKind::Identifier, "x", 1),
                Token::new(TokenKind::Equals, "=", 1),
                Token::new(TokenKind::IntegerLiteral, "42", 1),
                Token::new(TokenKind::Semicolon, ";", 1),
                Token::new(TokenKind::Eof, "", 1),
            ]
        );
    }

    #[test]
    fn classes() {
        let classes = lex("float f = 1.5 + y;")
            .unwrap()
            .into_iter()
            .map(|t| t.class)
            .collect::<Vec<_>>();

        assert_eq!(
            classes,
            vec![
                TokenClass::Keyword,
                TokenClass::Identifier,
                TokenClass::Operator,
                TokenClass::Literal,
                TokenClass::Operator,
                TokenClass::Identifier,
                TokenClass::Delimiter,
                TokenClass::EndOfInput,
            ]
        );
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("== <= >= << >> ++ -- += < > ="),
            vec![
                TokenKind::DoubleEquals,
                TokenKind::LessThanOrEqualTo,
                TokenKind::GreaterThanOrEqualTo,
                TokenKind::ShiftLeft,
                TokenKind::ShiftRight,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusEquals,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Equals,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn main_is_a_keyword() {
        assert_eq!(
            kinds("int main mainly"),
            vec![
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Keyword(Keyword::Main),
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_and_lines() {
        let tokens = lex("int a; // trailing comment\n\nchar c = 'z';").unwrap();

        let a = &tokens[1];
        assert_eq!((a.lexeme.as_str(), a.line), ("a", 1));

        let c = &tokens[4];
        assert_eq!((c.lexeme.as_str(), c.line), ("c", 3));

        let z = &tokens[6];
        assert_eq!(z.kind, TokenKind::CharLiteral);
        assert_eq!(z.lexeme, "'z'");

        assert_eq!(tokens.last().map(|t| t.line), Some(3));
    }

    #[test]
    fn non_ascii_in_comments() {
        let tokens = lex("int a; // größe\nint b;").unwrap();

        assert_eq!(tokens[4].lexeme, "b");
        assert_eq!(tokens[4].line, 2);
    }

    #[test]
    fn float_literals() {
        let tokens = lex("3.25 .5").unwrap();

        assert_eq!(tokens[0].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[0].lexeme, "3.25");
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[1].lexeme, ".5");
    }

    #[test]
    fn unexpected_character() {
        assert_eq!(
            lex("int x;\nx = 1 $ 2;"),
            Err(LexError::UnexpectedCharacter {
                character: '$',
                line: 2
            })
        );
    }

    #[test]
    fn unterminated_char_literal() {
        assert_eq!(
            lex("char c = 'a;\n"),
            Err(LexError::UnterminatedCharLiteral { line: 1 })
        );
    }
}
