//! Equation compiler: source text → tokens → AST → shader expression.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod validate;

pub use ast::*;
pub use codegen::{Bindings, CodeGen, Helper};
pub use error::{CompileError, ErrorKind};
pub use validate::{validate, ValidationKind, ValidationWarning};

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::Config;
use lexer::Lexer;
use parser::Parser;

/// Equation substituted whenever the user's input fails to compile.
pub const DEFAULT_EQUATION: &str = "z^2 + c";

/// Output handed to the rendering pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmittedCode {
    /// Expression to splice into the iteration template.
    pub code: String,
    /// Helpers `code` calls.
    pub helpers: BTreeSet<Helper>,
    /// Set when `code` is the default equation standing in for a failed
    /// compile.
    pub fallback: Option<CompileError>,
}

impl EmittedCode {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// The equation compiler.
///
/// Stateless between calls: compiling the same text twice yields identical
/// output.
#[derive(Debug, Clone)]
pub struct Compiler {
    codegen: CodeGen,
    append_constant: bool,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            codegen: CodeGen::default(),
            append_constant: true,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            codegen: CodeGen::new(config.bindings.clone(), config.expand_small_powers),
            append_constant: config.append_constant,
        }
    }

    /// Parse equation source into an AST.
    pub fn parse(source: &str) -> Result<Expr, CompileError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        tracing::debug!(tokens = tokens.len(), "tokenized equation");
        let mut parser = Parser::new(tokens);
        parser.parse()
    }

    /// Compile without the fallback policy.
    pub fn try_compile(&self, source: &str) -> Result<EmittedCode, CompileError> {
        let expr = Self::parse(source)?;
        if !expr.references(Variable::Z) {
            tracing::debug!(source, "equation does not depend on z");
        }
        Ok(self.emit(expr))
    }

    /// Compile, substituting [`DEFAULT_EQUATION`] on any failure. Never fails.
    pub fn compile(&self, source: &str) -> EmittedCode {
        match self.try_compile(source) {
            Ok(emitted) => emitted,
            Err(err) => {
                tracing::warn!(
                    kind = ?err.kind,
                    position = err.position,
                    source,
                    "equation rejected, using default: {}",
                    err.message
                );
                EmittedCode {
                    fallback: Some(err),
                    ..self.default_code()
                }
            }
        }
    }

    /// Emission of [`DEFAULT_EQUATION`].
    pub fn default_code(&self) -> EmittedCode {
        self.emit(Expr::mandelbrot())
    }

    fn emit(&self, expr: Expr) -> EmittedCode {
        let expr = if self.append_constant && !expr.ends_with_constant() {
            Expr::binary(BinaryOp::Add, expr, Expr::Variable(Variable::C))
        } else {
            expr
        };
        let code = self.codegen.emit(&expr);
        tracing::debug!(len = code.len(), "emitted equation");
        EmittedCode {
            helpers: self.codegen.helpers_used(&expr),
            code,
            fallback: None,
        }
    }
}
