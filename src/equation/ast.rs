//! Abstract Syntax Tree for equations.
//!
//! A closed set of node variants. Every node owns its children, and nodes are
//! never mutated after the parser builds them.

use std::fmt;

use serde::Serialize;

/// One of the three ambient bindings the evaluator supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variable {
    /// Current iterate.
    Z,
    /// Per-pixel constant.
    C,
    /// Runtime power.
    N,
}

impl Variable {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "z" => Some(Variable::Z),
            "c" => Some(Variable::C),
            "n" => Some(Variable::N),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variable::Z => "z",
            Variable::C => "c",
            Variable::N => "n",
        }
    }
}

/// Built-in functions. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Function {
    Abs,
    Conj,
    Sin,
    Cos,
    Tan,
    Exp,
    Sqrt,
    Log,
    Ln,
}

impl Function {
    pub const ALL: [Function; 9] = [
        Function::Abs,
        Function::Conj,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Exp,
        Function::Sqrt,
        Function::Log,
        Function::Ln,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Conj => "conj",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Sqrt => "sqrt",
            Function::Log => "log",
            Function::Ln => "ln",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Pos,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// An equation expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Variable(Variable),
    Number(f64),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        argument: Box<Expr>,
    },
    /// `|expr|`, emitted exactly like `abs(expr)`.
    Modulus(Box<Expr>),
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(function: Function, argument: Expr) -> Self {
        Expr::Call {
            function,
            argument: Box::new(argument),
        }
    }

    /// `z^2 + c`, the canonical Mandelbrot iteration.
    pub fn mandelbrot() -> Self {
        Expr::binary(
            BinaryOp::Add,
            Expr::binary(BinaryOp::Pow, Expr::Variable(Variable::Z), Expr::Number(2.0)),
            Expr::Variable(Variable::C),
        )
    }

    /// Whether the outermost operation is `... + c`.
    pub fn ends_with_constant(&self) -> bool {
        matches!(
            self,
            Expr::Binary { op: BinaryOp::Add, right, .. }
                if **right == Expr::Variable(Variable::C)
        )
    }

    /// Whether `var` occurs anywhere in the tree.
    pub fn references(&self, var: Variable) -> bool {
        match self {
            Expr::Variable(v) => *v == var,
            Expr::Number(_) => false,
            Expr::Unary { operand, .. } => operand.references(var),
            Expr::Binary { left, right, .. } => left.references(var) || right.references(var),
            Expr::Call { argument, .. } => argument.references(var),
            Expr::Modulus(inner) => inner.references(var),
        }
    }
}

/// Fully parenthesised infix form.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(v) => write!(f, "{}", v.name()),
            Expr::Number(v) => write!(f, "{v}"),
            Expr::Unary { op: UnaryOp::Pos, operand } => write!(f, "(+{operand})"),
            Expr::Unary { op: UnaryOp::Neg, operand } => write!(f, "(-{operand})"),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Call { function, argument } => write!(f, "{}({argument})", function.name()),
            Expr::Modulus(inner) => write!(f, "|{inner}|"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_round_trip() {
        for function in Function::ALL {
            assert_eq!(Function::from_name(function.name()), Some(function));
        }
        assert_eq!(Function::from_name("q"), None);
        assert_eq!(Function::from_name("Sin"), None);
    }

    #[test]
    fn variables_are_case_sensitive() {
        assert_eq!(Variable::from_name("z"), Some(Variable::Z));
        assert_eq!(Variable::from_name("Z"), None);
    }

    #[test]
    fn mandelbrot_ends_with_constant() {
        assert!(Expr::mandelbrot().ends_with_constant());
        let swapped = Expr::binary(
            BinaryOp::Add,
            Expr::Variable(Variable::C),
            Expr::Variable(Variable::Z),
        );
        assert!(!swapped.ends_with_constant());
        assert!(swapped.references(Variable::C));
    }

    #[test]
    fn display_is_fully_parenthesised() {
        let expr = Expr::binary(
            BinaryOp::Add,
            Expr::call(Function::Conj, Expr::Variable(Variable::Z)),
            Expr::unary(UnaryOp::Neg, Expr::Modulus(Box::new(Expr::Number(0.5)))),
        );
        assert_eq!(expr.to_string(), "(conj(z) + (-|0.5|))");
    }
}
