//! Formula parser - builds an AST from tokens
//!
//! Recursive descent, lowest to highest precedence:
//! comparison → term → factor → power → unary → primary.

use super::tokenizer::Token;
use crate::core::reference::looks_like_cell;
use crate::value::CompareOp;

/// Deepest expression nesting accepted, counting parentheses, function
/// arguments, unary signs and operator chains
pub const MAX_DEPTH: usize = 256;

/// Arithmetic and comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Compare(CompareOp),
}

impl BinaryOperator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOperator::Add),
            "-" => Some(BinaryOperator::Subtract),
            "*" => Some(BinaryOperator::Multiply),
            "/" => Some(BinaryOperator::Divide),
            "^" => Some(BinaryOperator::Power),
            other => CompareOp::from_symbol(other).map(BinaryOperator::Compare),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
}

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal
    Number(f64),
    /// A string literal
    Text(String),
    /// TRUE / FALSE
    Boolean(bool),
    /// A cell address, resolved at evaluation time
    CellRef(String),
    /// A range `start:end`, resolved at evaluation time
    RangeRef(String, String),
    /// Binary operation: left op right
    BinaryOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation: -expr / +expr
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },
    /// Function call: NAME(arg1, arg2, ...)
    FunctionCall { name: String, args: Vec<Expr> },
}

/// Error during parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at token {}: {}",
            self.position, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parser for formula tokens
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser for the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the tokens into an AST
    pub fn parse(mut self) -> Result<Expr, ParseError> {
        if self.tokens.is_empty() {
            return Err(ParseError::new("Empty expression", 0));
        }
        let expr = self.expression()?;

        if !self.is_at_end() {
            return Err(ParseError::new(
                format!("Unexpected token after expression: {:?}", self.peek()),
                self.position,
            ));
        }

        Ok(expr)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    /// Check if current token matches and consume it
    fn match_token(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is one of the given operators
    fn match_any_operator(&mut self, ops: &[&str]) -> Option<BinaryOperator> {
        if let Some(Token::Operator(s)) = self.peek() {
            if ops.contains(&s.as_str()) {
                let op = BinaryOperator::from_symbol(s);
                self.advance();
                return op;
            }
        }
        None
    }

    /// Enter one nesting level; the caller leaves it with `self.depth -= 1`
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::new(
                format!("Formula nests deeper than {} levels", MAX_DEPTH),
                self.position,
            ));
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let expr = self.comparison()?;
        self.depth -= 1;
        Ok(expr)
    }

    /// Comparison: term (( "=" | "<>" | "<" | ">" | "<=" | ">=" ) term)*
    fn comparison(&mut self) -> Result<Expr, ParseError> {
        self.left_associative(&["=", "<>", "<", ">", "<=", ">="], Self::term)
    }

    /// Term: factor (( "+" | "-" ) factor)*
    fn term(&mut self) -> Result<Expr, ParseError> {
        self.left_associative(&["+", "-"], Self::factor)
    }

    /// Factor: power (( "*" | "/" ) power)*
    fn factor(&mut self) -> Result<Expr, ParseError> {
        self.left_associative(&["*", "/"], Self::power)
    }

    fn left_associative(
        &mut self,
        ops: &[&str],
        operand: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = operand(self)?;
        let mut chained = 0;

        // each operator deepens the left-nested tree by one
        while let Some(op) = self.match_any_operator(ops) {
            self.descend()?;
            chained += 1;
            let right = operand(self)?;
            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth -= chained;
        Ok(left)
    }

    /// Power: unary ( "^" power )?   (right-associative)
    fn power(&mut self) -> Result<Expr, ParseError> {
        let left = self.unary()?;

        if let Some(op) = self.match_any_operator(&["^"]) {
            self.descend()?;
            let right = self.power()?;
            self.depth -= 1;
            Ok(Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    /// Unary: ( "-" | "+" ) unary | primary
    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(Token::Operator(s)) if s == "-" => Some(UnaryOperator::Negate),
            Some(Token::Operator(s)) if s == "+" => Some(UnaryOperator::Plus),
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance();
                self.descend()?;
                let operand = self.unary()?;
                self.depth -= 1;
                Ok(Expr::UnaryOp {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.primary(),
        }
    }

    /// Arguments: ( expr ( "," expr )* )?
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if let Some(Token::CloseParen) = self.peek() {
            return Ok(args);
        }

        args.push(self.expression()?);
        while self.match_token(&Token::Comma) {
            args.push(self.expression()?);
        }

        Ok(args)
    }

    /// Primary: NUMBER | STRING | TRUE | FALSE | CALL | CELL (":" CELL)? | "(" expr ")"
    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().cloned();

        match token {
            Some(Token::Number(n)) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Some(Token::Text(s)) => {
                self.advance();
                Ok(Expr::Text(s))
            }
            Some(Token::Identifier(name)) => {
                if self.peek_next() == Some(&Token::OpenParen) {
                    self.advance(); // name
                    self.advance(); // '('
                    let args = self.arguments()?;
                    if !self.match_token(&Token::CloseParen) {
                        return Err(ParseError::new(
                            "Expected ')' after function arguments",
                            self.position,
                        ));
                    }
                    return Ok(Expr::FunctionCall { name, args });
                }
                self.advance();
                self.identifier(name)
            }
            Some(Token::OpenParen) => {
                self.advance();
                let expr = self.expression()?;
                if !self.match_token(&Token::CloseParen) {
                    return Err(ParseError::new(
                        "Expected ')' after expression",
                        self.position,
                    ));
                }
                Ok(expr)
            }
            Some(token) => Err(ParseError::new(
                format!("Unexpected token: {:?}", token),
                self.position,
            )),
            None => Err(ParseError::new(
                "Unexpected end of expression",
                self.position,
            )),
        }
    }

    /// A bare identifier: boolean literal, cell, or range
    fn identifier(&mut self, name: String) -> Result<Expr, ParseError> {
        if name.eq_ignore_ascii_case("TRUE") {
            return Ok(Expr::Boolean(true));
        }
        if name.eq_ignore_ascii_case("FALSE") {
            return Ok(Expr::Boolean(false));
        }
        if !looks_like_cell(&name) {
            return Err(ParseError::new(
                format!("Unknown identifier: {}", name),
                self.position.saturating_sub(1),
            ));
        }

        if !self.match_token(&Token::Colon) {
            return Ok(Expr::CellRef(name));
        }

        match self.peek().cloned() {
            Some(Token::Identifier(end)) if looks_like_cell(&end) => {
                self.advance();
                Ok(Expr::RangeRef(name, end))
            }
            _ => Err(ParseError::new(
                "Expected cell address after ':'",
                self.position,
            )),
        }
    }
}

/// Convenience function to parse tokens into an AST
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}
