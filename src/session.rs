//! Editing session: what the renderer currently shows and why.

use crate::config::Config;
use crate::diagnostics::DiagnosticLog;
use crate::equation::{validate, Compiler, EmittedCode, ValidationWarning};

/// Tracks the equation being edited, the code the renderer is running and
/// recent failures.
#[derive(Debug, Clone)]
pub struct Session {
    compiler: Compiler,
    diagnostics: DiagnosticLog,
    source: String,
    current: EmittedCode,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        let compiler = Compiler::with_config(config);
        let current = compiler.default_code();
        Self {
            compiler,
            diagnostics: DiagnosticLog::new(config.diagnostic_capacity),
            source: crate::equation::DEFAULT_EQUATION.to_string(),
            current,
        }
    }

    /// Compile `source` and make it current. Failures are recorded and the
    /// default equation takes its place.
    pub fn submit(&mut self, source: &str) -> &EmittedCode {
        let emitted = self.compiler.compile(source);
        if let Some(err) = &emitted.fallback {
            self.diagnostics.push(source, err.clone());
        }
        self.source = source.to_string();
        self.current = emitted;
        &self.current
    }

    /// Keystroke-level check that neither compiles nor records anything.
    pub fn check(&self, source: &str) -> Result<(), ValidationWarning> {
        validate(source)
    }

    pub fn current(&self) -> &EmittedCode {
        &self.current
    }

    /// Text most recently submitted.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the rendered fractal matches the submitted text.
    pub fn is_showing_fallback(&self) -> bool {
        self.current.is_fallback()
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
