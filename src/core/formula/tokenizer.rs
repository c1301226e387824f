//! Formula tokenizer
//!
//! Converts formula strings like "=SUM(C1:C10) * 1.1" into a sequence of
//! tokens that can be parsed into an AST.

use std::iter::Peekable;
use std::str::Chars;

/// A token in a formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal (e.g., 123, 45.67, 1.5e10)
    Number(f64),
    /// A double-quoted string literal
    Text(String),
    /// A function name, cell address, or TRUE/FALSE
    Identifier(String),
    /// Binary/comparison operators: + - * / ^ = <> >= <= < >
    Operator(String),
    /// Opening parenthesis
    OpenParen,
    /// Closing parenthesis
    CloseParen,
    /// Comma separator for function arguments
    Comma,
    /// Colon for ranges (A1:B2)
    Colon,
}

/// Error during tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizeError {
    pub message: String,
    pub position: usize,
}

impl TokenizeError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tokenize error at position {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for TokenizeError {}

/// Tokenizer for formula expressions
pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given formula string
    pub fn new(formula: &'a str) -> Self {
        // Leading '=' is optional
        let formula = formula.trim_start();
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        Self {
            chars: formula.chars().peekable(),
            position: 0,
        }
    }

    /// Tokenize the entire formula into a vector of tokens
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token, or None if at end of input
    fn next_token(&mut self) -> Result<Option<Token>, TokenizeError> {
        self.skip_whitespace();

        let c = match self.peek() {
            None => return Ok(None),
            Some(c) => c,
        };

        let token = match c {
            '"' => self.read_string()?,

            '(' => self.single(Token::OpenParen),
            ')' => self.single(Token::CloseParen),
            ',' => self.single(Token::Comma),
            ':' => self.single(Token::Colon),

            '+' | '-' | '*' | '/' | '^' | '=' => self.single(Token::Operator(c.to_string())),

            '<' => self.read_less_than_operator(),
            '>' => self.read_greater_than_operator(),

            c if c.is_ascii_digit() || c == '.' => self.read_number()?,

            c if c.is_alphabetic() || c == '_' => self.read_identifier(),

            c => {
                return Err(TokenizeError::new(
                    format!("Unexpected character: '{}'", c),
                    self.position,
                ));
            }
        };

        Ok(Some(token))
    }

    /// Peek at the next character without consuming it
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    /// Consume one character and yield `token`
    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Consume characters while `pred` holds, appending them to `buf`
    fn take_while(&mut self, buf: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            buf.push(c);
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        let mut skipped = String::new();
        self.take_while(&mut skipped, char::is_whitespace);
    }

    /// Read a double-quoted string literal; `""` is an escaped quote
    fn read_string(&mut self) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(TokenizeError::new("Unterminated string literal", start_pos));
                }
                Some('"') => {
                    if self.peek() == Some('"') {
                        value.push('"');
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
            }
        }

        Ok(Token::Text(value))
    }

    /// Read a number (integer, decimal, or scientific notation)
    fn read_number(&mut self) -> Result<Token, TokenizeError> {
        let start_pos = self.position;
        let mut num_str = String::new();

        self.take_while(&mut num_str, |c| c.is_ascii_digit());

        if self.peek() == Some('.') {
            num_str.push('.');
            self.advance();
            self.take_while(&mut num_str, |c| c.is_ascii_digit());
        }

        // Exponent (1.5e10, 2E-5)
        if let Some(e @ ('e' | 'E')) = self.peek() {
            num_str.push(e);
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                num_str.push(sign);
                self.advance();
            }
            self.take_while(&mut num_str, |c| c.is_ascii_digit());
        }

        num_str
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| TokenizeError::new(format!("Invalid number: {}", num_str), start_pos))
    }

    /// Read an identifier (function name, cell address, TRUE/FALSE)
    fn read_identifier(&mut self) -> Token {
        let mut ident = String::new();
        self.take_while(&mut ident, |c| c.is_alphanumeric() || c == '_' || c == '.');
        Token::Identifier(ident)
    }

    /// Read operators starting with '<'
    fn read_less_than_operator(&mut self) -> Token {
        self.advance(); // '<'

        match self.peek() {
            Some('=') => self.single(Token::Operator("<=".to_string())),
            Some('>') => self.single(Token::Operator("<>".to_string())),
            _ => Token::Operator("<".to_string()),
        }
    }

    /// Read operators starting with '>'
    fn read_greater_than_operator(&mut self) -> Token {
        self.advance(); // '>'

        match self.peek() {
            Some('=') => self.single(Token::Operator(">=".to_string())),
            _ => Token::Operator(">".to_string()),
        }
    }
}

/// Convenience function to tokenize a formula string
pub fn tokenize(formula: &str) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(formula).tokenize()
}
