//! fractaleq: compiles free-form complex equations into shader expressions
//! for escape-time fractals.

pub mod config;
pub mod diagnostics;
pub mod equation;
pub mod logging;
pub mod session;
pub mod shader;

pub use config::Config;
pub use equation::{Compiler, EmittedCode};
pub use session::Session;
