//! Code generator: AST → complex-arithmetic shader expression.
//!
//! Complex values are `vec2` pairs (real, imaginary). Products, quotients,
//! powers and the transcendental functions are calls to helpers the
//! evaluator defines; [`Helper`] lists them. Addition, subtraction,
//! negation, conjugation and `abs` are plain componentwise `vec2` arithmetic.
//!
//! Emission is total: every tree the parser can build has an emission.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ast::*;

/// Names the evaluator binds for the three equation variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    /// Current iterate (`z`).
    #[serde(default = "default_iterate")]
    pub iterate: String,
    /// Per-pixel constant (`c`).
    #[serde(default = "default_constant")]
    pub constant: String,
    /// Runtime power (`n`), already lifted to a complex pair.
    #[serde(default = "default_power")]
    pub power: String,
}

fn default_iterate() -> String {
    "z".to_string()
}

fn default_constant() -> String {
    "c".to_string()
}

fn default_power() -> String {
    "vec2(power, 0.0)".to_string()
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            iterate: default_iterate(),
            constant: default_constant(),
            power: default_power(),
        }
    }
}

/// A helper function the evaluator must define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Helper {
    Cmul,
    Cdiv,
    Cpow,
    Csin,
    Ccos,
    Ctan,
    Cexp,
    Csqrt,
    Clog,
}

impl Helper {
    pub fn name(self) -> &'static str {
        match self {
            Helper::Cmul => "cmul",
            Helper::Cdiv => "cdiv",
            Helper::Cpow => "cpow",
            Helper::Csin => "csin",
            Helper::Ccos => "ccos",
            Helper::Ctan => "ctan",
            Helper::Cexp => "cexp",
            Helper::Csqrt => "csqrt",
            Helper::Clog => "clog",
        }
    }

    /// GLSL prototype the evaluator has to satisfy.
    pub fn signature(self) -> String {
        match self {
            Helper::Cmul | Helper::Cdiv | Helper::Cpow => {
                format!("vec2 {}(vec2 a, vec2 b)", self.name())
            }
            _ => format!("vec2 {}(vec2 a)", self.name()),
        }
    }

    /// Helper backing a function call, or `None` when the function is
    /// emitted inline.
    pub fn for_function(function: Function) -> Option<Self> {
        match function {
            Function::Abs | Function::Conj => None,
            Function::Sin => Some(Helper::Csin),
            Function::Cos => Some(Helper::Ccos),
            Function::Tan => Some(Helper::Ctan),
            Function::Exp => Some(Helper::Cexp),
            Function::Sqrt => Some(Helper::Csqrt),
            Function::Log | Function::Ln => Some(Helper::Clog),
        }
    }
}

/// Emits shader expressions from equation trees.
#[derive(Debug, Clone)]
pub struct CodeGen {
    pub bindings: Bindings,
    /// Emit literal exponents 2 and 3 as chained `cmul`.
    pub expand_small_powers: bool,
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new(Bindings::default(), true)
    }
}

impl CodeGen {
    pub fn new(bindings: Bindings, expand_small_powers: bool) -> Self {
        Self {
            bindings,
            expand_small_powers,
        }
    }

    pub fn emit(&self, expr: &Expr) -> String {
        match expr {
            Expr::Variable(Variable::Z) => self.bindings.iterate.clone(),
            Expr::Variable(Variable::C) => self.bindings.constant.clone(),
            Expr::Variable(Variable::N) => self.bindings.power.clone(),
            Expr::Number(value) => format!("vec2({}, 0.0)", float_literal(*value)),
            Expr::Unary {
                op: UnaryOp::Pos,
                operand,
            } => self.emit(operand),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => format!("(-{})", self.emit(operand)),
            Expr::Binary { op, left, right } => self.emit_binary(*op, left, right),
            Expr::Call { function, argument } => self.emit_call(*function, argument),
            Expr::Modulus(inner) => self.emit_call(Function::Abs, inner),
        }
    }

    fn emit_binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> String {
        let l = self.emit(left);
        match op {
            BinaryOp::Add => format!("({l} + {})", self.emit(right)),
            BinaryOp::Sub => format!("({l} - {})", self.emit(right)),
            BinaryOp::Mul => format!("cmul({l}, {})", self.emit(right)),
            BinaryOp::Div => format!("cdiv({l}, {})", self.emit(right)),
            BinaryOp::Pow => match self.small_power(left, right) {
                Some(2) => format!("cmul({l}, {l})"),
                Some(3) => format!("cmul(cmul({l}, {l}), {l})"),
                _ => format!("cpow({l}, {})", self.emit(right)),
            },
        }
    }

    fn emit_call(&self, function: Function, argument: &Expr) -> String {
        let a = self.emit(argument);
        match function {
            // Componentwise on purpose: this is the Burning Ship fold, not |z|.
            Function::Abs => format!("abs({a})"),
            Function::Conj => format!("({a} * vec2(1.0, -1.0))"),
            other => match Helper::for_function(other) {
                Some(helper) => format!("{}({a})", helper.name()),
                None => a,
            },
        }
    }

    /// Exponent to expand into repeated `cmul`, if any. The base text is
    /// repeated in the expansion, so only bases that emit as a short,
    /// helper-free expression qualify; anything else goes through `cpow`.
    fn small_power(&self, base: &Expr, exponent: &Expr) -> Option<u8> {
        if !self.expand_small_powers || !is_repeatable(base) {
            return None;
        }
        match exponent {
            Expr::Number(v) if *v == 2.0 => Some(2),
            Expr::Number(v) if *v == 3.0 => Some(3),
            _ => None,
        }
    }

    /// The helpers [`CodeGen::emit`] calls for `expr`.
    pub fn helpers_used(&self, expr: &Expr) -> BTreeSet<Helper> {
        let mut helpers = BTreeSet::new();
        self.collect_helpers(expr, &mut helpers);
        helpers
    }

    fn collect_helpers(&self, expr: &Expr, helpers: &mut BTreeSet<Helper>) {
        match expr {
            Expr::Variable(_) | Expr::Number(_) => {}
            Expr::Unary { operand, .. } => self.collect_helpers(operand, helpers),
            Expr::Binary { op, left, right } => {
                self.collect_helpers(left, helpers);
                match op {
                    BinaryOp::Add | BinaryOp::Sub => self.collect_helpers(right, helpers),
                    BinaryOp::Mul => {
                        helpers.insert(Helper::Cmul);
                        self.collect_helpers(right, helpers);
                    }
                    BinaryOp::Div => {
                        helpers.insert(Helper::Cdiv);
                        self.collect_helpers(right, helpers);
                    }
                    BinaryOp::Pow => {
                        if self.small_power(left, right).is_some() {
                            helpers.insert(Helper::Cmul);
                        } else {
                            helpers.insert(Helper::Cpow);
                            self.collect_helpers(right, helpers);
                        }
                    }
                }
            }
            Expr::Call { function, argument } => {
                if let Some(helper) = Helper::for_function(*function) {
                    helpers.insert(helper);
                }
                self.collect_helpers(argument, helpers);
            }
            Expr::Modulus(inner) => self.collect_helpers(inner, helpers),
        }
    }
}

fn is_repeatable(expr: &Expr) -> bool {
    let is_leaf = |e: &Expr| matches!(e, Expr::Variable(_) | Expr::Number(_));
    match expr {
        Expr::Call {
            function: Function::Abs | Function::Conj,
            argument,
        } => is_leaf(argument),
        Expr::Modulus(inner) => is_leaf(inner),
        other => is_leaf(other),
    }
}

/// Format a real constant with a mandatory fractional part (`2` → `2.0`).
pub fn float_literal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
