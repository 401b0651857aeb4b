//! Parser for equations.
//!
//! Precedence climbing over the token stream, loosest first:
//!
//! ```text
//! expression     := additive
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary          := ('+' | '-')* power
//! power          := primary ('^' exponent)*
//! exponent       := ('+' | '-')* primary
//! primary        := NUMBER
//!                 | IDENT
//!                 | IDENT '(' expression ')'
//!                 | '(' expression ')'
//!                 | '|' expression '|'
//! ```
//!
//! A leading sign applies to the whole power chain, so `-z^2` is `-(z^2)`.
//! `^` chains associate to the left.

use super::ast::*;
use super::error::CompileError;
use super::token::{Token, TokenKind};

/// Nesting limit for parentheses, pipes and calls.
pub const MAX_DEPTH: usize = 128;

/// Longest accepted token stream, not counting the end marker. Operator
/// chains nest the tree one level per operator, so this bounds tree height.
pub const MAX_TOKENS: usize = 512;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position: 0,
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream as one expression.
    pub fn parse(&mut self) -> Result<Expr, CompileError> {
        if let Some(t) = self.tokens.get(MAX_TOKENS) {
            if t.kind != TokenKind::Eof {
                return Err(CompileError::parse("expression too long", t.position));
            }
        }
        let expr = self.parse_expression()?;
        if !self.is_at_end() {
            let t = self.peek();
            return Err(CompileError::parse(
                format!("unexpected token at end: found {}", t.kind.describe()),
                t.position,
            ));
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr, CompileError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CompileError::parse(
                "expression nested too deeply",
                self.peek().position,
            ));
        }
        let expr = self.parse_additive();
        self.depth -= 1;
        expr
    }

    fn parse_additive(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, CompileError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, CompileError> {
        let sign = self.parse_signs();
        let operand = self.parse_power()?;
        Ok(apply_sign(sign, operand))
    }

    fn parse_power(&mut self) -> Result<Expr, CompileError> {
        let mut base = self.parse_primary()?;
        while self.check(TokenKind::Caret) {
            self.advance();
            let sign = self.parse_signs();
            let exponent = self.parse_primary()?;
            base = Expr::binary(BinaryOp::Pow, base, apply_sign(sign, exponent));
        }
        Ok(base)
    }

    /// Consume a run of `+`/`-` and fold it to a single sign.
    /// `None` means there was no sign at all.
    fn parse_signs(&mut self) -> Option<UnaryOp> {
        let mut seen = false;
        let mut negative = false;
        loop {
            match self.peek().kind {
                TokenKind::Plus => {}
                TokenKind::Minus => negative ^= true,
                _ => break,
            }
            seen = true;
            self.advance();
        }
        match (seen, negative) {
            (false, _) => None,
            (true, false) => Some(UnaryOp::Pos),
            (true, true) => Some(UnaryOp::Neg),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, CompileError> {
        let t = self.advance().clone();
        match t.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::Ident(name) => self.parse_identifier(&name, t.position),
            TokenKind::LParen => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Pipe => {
                let inner = self.parse_expression()?;
                self.expect(TokenKind::Pipe)?;
                Ok(Expr::Modulus(Box::new(inner)))
            }
            TokenKind::Eof => Err(CompileError::parse(
                "unexpected end of input",
                t.position,
            )),
            other => Err(CompileError::parse(
                format!("expected expression, found {}", other.describe()),
                t.position,
            )),
        }
    }

    fn parse_identifier(&mut self, name: &str, position: usize) -> Result<Expr, CompileError> {
        if let Some(var) = Variable::from_name(name) {
            return Ok(Expr::Variable(var));
        }
        let Some(function) = Function::from_name(name) else {
            return Err(CompileError::unknown_identifier(name, position));
        };
        // A bare function name is not a value.
        if !self.check(TokenKind::LParen) {
            return Err(CompileError::unknown_identifier(name, position));
        }
        self.advance();
        let argument = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        Ok(Expr::call(function, argument))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end()
            && std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, CompileError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let t = self.peek();
            Err(CompileError::parse(
                format!("expected '{kind}', found {}", t.kind.describe()),
                t.position,
            ))
        }
    }
}

fn apply_sign(sign: Option<UnaryOp>, operand: Expr) -> Expr {
    match sign {
        Some(op) => Expr::unary(op, operand),
        None => operand,
    }
}

/// Parse a token stream produced by the lexer.
///
/// The stream should end with [`TokenKind::Eof`]; an empty stream is treated
/// as empty input.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, CompileError> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::error::ErrorKind;
    use crate::equation::lexer::tokenize;

    fn parse_src(src: &str) -> Result<Expr, CompileError> {
        parse(tokenize(src)?)
    }

    fn z() -> Expr {
        Expr::Variable(Variable::Z)
    }

    fn c() -> Expr {
        Expr::Variable(Variable::C)
    }

    #[test]
    fn parse_mandelbrot() {
        assert_eq!(parse_src("z^2 + c").unwrap(), Expr::mandelbrot());
    }

    #[test]
    fn parse_power_binds_tighter_than_add() {
        let expected = Expr::binary(
            BinaryOp::Add,
            z(),
            Expr::binary(BinaryOp::Pow, c(), Expr::Number(2.0)),
        );
        assert_eq!(parse_src("z + c ^ 2").unwrap(), expected);
    }

    #[test]
    fn parse_mul_binds_tighter_than_sub() {
        let expected = Expr::binary(
            BinaryOp::Sub,
            z(),
            Expr::binary(BinaryOp::Mul, c(), z()),
        );
        assert_eq!(parse_src("z - c * z").unwrap(), expected);
    }

    #[test]
    fn parse_power_binds_tighter_than_div() {
        let expected = Expr::binary(
            BinaryOp::Div,
            Expr::Number(1.0),
            Expr::binary(BinaryOp::Pow, z(), Expr::Number(3.0)),
        );
        assert_eq!(parse_src("1 / z^3").unwrap(), expected);
    }

    #[test]
    fn parse_binary_ops_are_left_associative() {
        let expected = Expr::binary(BinaryOp::Sub, Expr::binary(BinaryOp::Sub, z(), c()), z());
        assert_eq!(parse_src("z - c - z").unwrap(), expected);

        let expected = Expr::binary(
            BinaryOp::Pow,
            Expr::binary(BinaryOp::Pow, z(), Expr::Number(2.0)),
            Expr::Number(3.0),
        );
        assert_eq!(parse_src("z^2^3").unwrap(), expected);
    }

    #[test]
    fn parse_double_negation_folds_to_plus() {
        assert_eq!(
            parse_src("--z").unwrap(),
            Expr::unary(UnaryOp::Pos, z())
        );
        assert_eq!(
            parse_src("-+-z").unwrap(),
            Expr::unary(UnaryOp::Pos, z())
        );
    }

    #[test]
    fn parse_odd_negation_is_single_node() {
        assert_eq!(
            parse_src("---z").unwrap(),
            Expr::unary(UnaryOp::Neg, z())
        );
    }

    #[test]
    fn parse_negation_wraps_power() {
        let expected = Expr::unary(
            UnaryOp::Neg,
            Expr::binary(BinaryOp::Pow, z(), Expr::Number(2.0)),
        );
        assert_eq!(parse_src("-z^2").unwrap(), expected);
        assert_eq!(parse_src("-(z^2)").unwrap(), expected);
        assert_ne!(parse_src("(-z)^2").unwrap(), expected);
    }

    #[test]
    fn parse_signed_exponent() {
        let expected = Expr::binary(
            BinaryOp::Pow,
            z(),
            Expr::unary(UnaryOp::Neg, Expr::Number(1.0)),
        );
        assert_eq!(parse_src("z^-1").unwrap(), expected);
    }

    #[test]
    fn parse_conj_scenario() {
        let expected = Expr::binary(
            BinaryOp::Add,
            Expr::binary(
                BinaryOp::Pow,
                Expr::call(Function::Conj, z()),
                Expr::Number(2.0),
            ),
            c(),
        );
        assert_eq!(parse_src("conj(z)^2 + c").unwrap(), expected);
    }

    #[test]
    fn parse_function_with_power_variable() {
        let expected = Expr::binary(
            BinaryOp::Add,
            Expr::call(
                Function::Sin,
                Expr::binary(BinaryOp::Pow, z(), Expr::Variable(Variable::N)),
            ),
            c(),
        );
        assert_eq!(parse_src("sin(z^n)+c").unwrap(), expected);
    }

    #[test]
    fn parse_modulus() {
        let expected = Expr::binary(
            BinaryOp::Pow,
            Expr::Modulus(Box::new(Expr::binary(BinaryOp::Add, z(), c()))),
            Expr::Number(2.0),
        );
        assert_eq!(parse_src("|z + c|^2").unwrap(), expected);
    }

    #[test]
    fn parse_nested_modulus() {
        let expected = Expr::Modulus(Box::new(Expr::binary(
            BinaryOp::Add,
            z(),
            Expr::Modulus(Box::new(c())),
        )));
        assert_eq!(parse_src("|z + |c||").unwrap(), expected);
    }

    #[test]
    fn parse_error_unknown_identifier() {
        let err = parse_src("z + w").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn parse_error_unknown_function() {
        let err = parse_src("q(z)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn parse_error_function_without_parens() {
        let err = parse_src("sin z").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
        assert_eq!(err.message, "unknown identifier 'sin'");
        assert_eq!(err.position, 0);

        let err = parse_src("z + exp").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn parse_error_missing_close_paren() {
        let err = parse_src("(z + c").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.message, "expected ')', found end of input");
        assert_eq!(err.position, 6);
    }

    #[test]
    fn parse_error_missing_close_pipe() {
        let err = parse_src("|z + c").unwrap_err();
        assert_eq!(err.message, "expected '|', found end of input");
    }

    #[test]
    fn parse_error_multiple_arguments() {
        let err = parse_src("sin(z, c)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.message.contains("','"));
    }

    #[test]
    fn parse_error_trailing_tokens() {
        let err = parse_src(")(").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);

        let err = parse_src("z c").unwrap_err();
        assert!(err.message.starts_with("unexpected token at end"));
        assert_eq!(err.position, 2);
    }

    #[test]
    fn parse_error_empty_input() {
        let err = parse_src("").unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
        let err = parse_src("z +").unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
    }

    #[test]
    fn parse_error_too_deep() {
        let src = format!("{}z{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        let err = parse_src(&src).unwrap_err();
        assert!(err.message.contains("nested too deeply"));
    }

    #[test]
    fn parse_error_too_long() {
        let src = format!("z{}", "-z".repeat(200_000));
        let err = parse_src(&src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.message, "expression too long");
        assert_eq!(err.position, MAX_TOKENS);
    }

    #[test]
    fn parse_accepts_chain_at_token_limit() {
        // z followed by (MAX_TOKENS - 1) / 2 "+z" pairs stays within the limit.
        let src = format!("z{}", "+z".repeat((MAX_TOKENS - 1) / 2));
        assert!(parse_src(&src).is_ok());
    }

    #[test]
    fn parser_handles_empty_token_stream() {
        let err = Parser::new(Vec::new()).parse().unwrap_err();
        assert_eq!(err.message, "unexpected end of input");
        assert_eq!(err.position, 0);
    }

    #[test]
    fn parse_accepts_moderate_nesting() {
        let src = format!("{}z{}", "(".repeat(50), ")".repeat(50));
        assert_eq!(parse_src(&src).unwrap(), z());
    }
}
