//! Tokenizer for expression source text.
//!
//! Produces a flat list of tokens terminated by a single `Eof` token:
//! - Numbers (`42`, `3.5`, `.5`)
//! - Identifiers, split into keywords (`sin`, `cos`, `tan`, `pi`, `e`) and variables
//! - Operators (`+`, `-`, `*`, `/`, `^`) and parentheses

use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Lexical error with location info
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A numeric run with a dangling or repeated decimal point
    #[error("Malformed number at position {position}")]
    MalformedNumber { position: usize },
    /// A character that starts no token
    #[error("Unknown character '{character}' at position {position}")]
    UnknownCharacter { character: char, position: usize },
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Number,
    Var,
    Plus,
    Minus,
    Multi,
    Div,
    Pow,
    LPar,
    RPar,
    Sin,
    Cos,
    Tan,
    Pi,
    EConst,
    Eof,
}

impl TokenKind {
    /// Keyword lookup for an identifier run. Case sensitive.
    fn keyword(ident: &str) -> Option<Self> {
        match ident {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "pi" => Some(Self::Pi),
            "e" => Some(Self::EConst),
            _ => None,
        }
    }

    /// Upper-case name, as used in token dumps
    pub fn name(&self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Var => "VAR",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Multi => "MULTI",
            Self::Div => "DIV",
            Self::Pow => "POW",
            Self::LPar => "L_PAR",
            Self::RPar => "R_PAR",
            Self::Sin => "SIN",
            Self::Cos => "COS",
            Self::Tan => "TAN",
            Self::Pi => "PI",
            Self::EConst => "E_CONST",
            Self::Eof => "EOF",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Var => write!(f, "variable"),
            Self::Plus => write!(f, "'+'"),
            Self::Minus => write!(f, "'-'"),
            Self::Multi => write!(f, "'*'"),
            Self::Div => write!(f, "'/'"),
            Self::Pow => write!(f, "'^'"),
            Self::LPar => write!(f, "'('"),
            Self::RPar => write!(f, "')'"),
            Self::Sin => write!(f, "'sin'"),
            Self::Cos => write!(f, "'cos'"),
            Self::Tan => write!(f, "'tan'"),
            Self::Pi => write!(f, "'pi'"),
            Self::EConst => write!(f, "'e'"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// A classified lexical unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token (empty for `Eof`)
    pub text: String,
    /// 0-based character offset of the first character
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Short description for error messages, e.g. `'+'`, `number '3.5'`, `end of input`
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Number | TokenKind::Var => format!("{} '{}'", self.kind, self.text),
            _ => self.kind.to_string(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Token: {}, Value: {}, Position: {}",
            self.kind.name(),
            self.text,
            self.position
        )
    }
}

/// Tokenizer
struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let pos = self.position;

        let c = match self.chars.peek() {
            None => return Ok(Token::new(TokenKind::Eof, "", pos)),
            Some(&c) => c,
        };

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Multi,
            '/' => TokenKind::Div,
            '^' => TokenKind::Pow,
            '(' => TokenKind::LPar,
            ')' => TokenKind::RPar,
            c if c.is_ascii_digit() || c == '.' => return self.read_number(),
            c if c.is_alphabetic() || c == '_' => return Ok(self.read_identifier()),
            _ => {
                return Err(LexError::UnknownCharacter {
                    character: c,
                    position: pos,
                })
            }
        };

        self.advance();
        Ok(Token::new(kind, c.to_string(), pos))
    }

    fn advance(&mut self) -> Option<char> {
        self.position += 1;
        self.chars.next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_digits(&mut self, out: &mut String) {
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
    }

    // digits ('.' digits)? | '.' digits
    fn read_number(&mut self) -> Result<Token, LexError> {
        let pos = self.position;
        let mut num_str = String::new();

        self.read_digits(&mut num_str);

        if self.chars.peek() == Some(&'.') {
            let dot = self.position;
            num_str.push('.');
            self.advance();

            match self.chars.peek().copied() {
                Some(c) if c.is_ascii_digit() => self.read_digits(&mut num_str),
                Some('.') => {
                    return Err(LexError::MalformedNumber {
                        position: self.position,
                    })
                }
                _ => return Err(LexError::MalformedNumber { position: dot }),
            }
        }

        // A second point right after the fraction, as in `1.2.3`
        if self.chars.peek() == Some(&'.') {
            return Err(LexError::MalformedNumber {
                position: self.position,
            });
        }

        Ok(Token::new(TokenKind::Number, num_str, pos))
    }

    fn read_identifier(&mut self) -> Token {
        let pos = self.position;
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&name).unwrap_or(TokenKind::Var);
        Token::new(kind, name, pos)
    }
}

/// Split `input` into tokens. The returned list always ends with exactly one `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        tracing::trace!("lexed {}", token);
        let done = token.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }

    tracing::debug!("tokenized {} chars into {} tokens", lexer.position, tokens.len());
    Ok(tokens)
}
