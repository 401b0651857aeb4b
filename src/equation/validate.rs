//! Syntax pre-validation.
//!
//! A cheap structural pass over raw text for immediate editor feedback. It is
//! advisory: passing here does not mean the parser will accept the equation.

use std::fmt;

use serde::Serialize;

const OPERATORS: [char; 5] = ['+', '-', '*', '/', '^'];
const PUNCTUATION: [char; 9] = ['+', '-', '*', '/', '^', '(', ')', '.', ','];

/// Why pre-validation rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationKind {
    Empty,
    DisallowedCharacters,
    UnbalancedParentheses,
    UnmatchedPipe,
    InvalidOperatorSequence,
    DanglingOperator,
    InvalidPowerSyntax,
}

impl ValidationKind {
    pub fn message(self) -> &'static str {
        match self {
            ValidationKind::Empty => "equation is empty",
            ValidationKind::DisallowedCharacters => "contains disallowed characters",
            ValidationKind::UnbalancedParentheses => "unbalanced parentheses",
            ValidationKind::UnmatchedPipe => "unmatched | delimiter",
            ValidationKind::InvalidOperatorSequence => "invalid operator sequence",
            ValidationKind::DanglingOperator => "dangling operator",
            ValidationKind::InvalidPowerSyntax => "invalid power syntax",
        }
    }
}

/// A non-fatal pre-validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub kind: ValidationKind,
    pub message: String,
    /// Character offset to highlight, when one is meaningful.
    pub position: Option<usize>,
}

impl ValidationWarning {
    fn new(kind: ValidationKind, position: Option<usize>) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            position,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "[offset {pos}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Run the structural checks in order, stopping at the first failure.
pub fn validate(source: &str) -> Result<(), ValidationWarning> {
    if source.trim().is_empty() {
        return Err(ValidationWarning::new(ValidationKind::Empty, None));
    }

    let chars: Vec<char> = source.chars().collect();

    if let Some(pos) = chars.iter().position(|&ch| !is_allowed(ch)) {
        return Err(ValidationWarning::new(
            ValidationKind::DisallowedCharacters,
            Some(pos),
        ));
    }

    check_parentheses(&chars)?;

    if chars.iter().filter(|&&ch| ch == '|').count() % 2 != 0 {
        let last = chars.iter().rposition(|&ch| ch == '|');
        return Err(ValidationWarning::new(ValidationKind::UnmatchedPipe, last));
    }

    check_operator_runs(&chars)?;

    // Adjacency checks ignore whitespace.
    let compact: Vec<(usize, char)> = chars
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, ch)| !is_whitespace(*ch))
        .collect();

    check_dangling(&compact)?;
    check_power(&compact)
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_allowed(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '|' || is_whitespace(ch) || PUNCTUATION.contains(&ch)
}

fn check_parentheses(chars: &[char]) -> Result<(), ValidationWarning> {
    let mut depth = 0usize;
    let mut last_open = None;
    for (i, &ch) in chars.iter().enumerate() {
        match ch {
            '(' => {
                depth += 1;
                last_open = Some(i);
            }
            ')' => {
                if depth == 0 {
                    return Err(ValidationWarning::new(
                        ValidationKind::UnbalancedParentheses,
                        Some(i),
                    ));
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ValidationWarning::new(
            ValidationKind::UnbalancedParentheses,
            last_open,
        ));
    }
    Ok(())
}

/// Three or more operator characters in a row.
fn check_operator_runs(chars: &[char]) -> Result<(), ValidationWarning> {
    let mut run = 0usize;
    for (i, &ch) in chars.iter().enumerate() {
        if OPERATORS.contains(&ch) {
            run += 1;
            if run >= 3 {
                return Err(ValidationWarning::new(
                    ValidationKind::InvalidOperatorSequence,
                    Some(i + 1 - run),
                ));
            }
        } else {
            run = 0;
        }
    }
    Ok(())
}

fn check_dangling(compact: &[(usize, char)]) -> Result<(), ValidationWarning> {
    for pair in compact.windows(2) {
        let (pos, a) = pair[0];
        let (next_pos, b) = pair[1];
        if OPERATORS.contains(&a) && b == ')' {
            return Err(ValidationWarning::new(
                ValidationKind::DanglingOperator,
                Some(pos),
            ));
        }
        if a == '(' && matches!(b, '*' | '/' | '^') {
            return Err(ValidationWarning::new(
                ValidationKind::DanglingOperator,
                Some(next_pos),
            ));
        }
    }
    Ok(())
}

/// With a `^` present, at least one must be followed by something that can
/// start an exponent.
fn check_power(compact: &[(usize, char)]) -> Result<(), ValidationWarning> {
    let mut first_caret = None;
    for (i, &(pos, ch)) in compact.iter().enumerate() {
        if ch != '^' {
            continue;
        }
        first_caret.get_or_insert(pos);
        let starts_exponent = compact.get(i + 1).is_some_and(|&(_, next)| {
            next.is_ascii_alphanumeric() || matches!(next, '_' | '.' | '(' | '|' | '+' | '-')
        });
        if starts_exponent {
            return Ok(());
        }
    }
    match first_caret {
        Some(pos) => Err(ValidationWarning::new(
            ValidationKind::InvalidPowerSyntax,
            Some(pos),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(src: &str) -> Option<ValidationKind> {
        validate(src).err().map(|w| w.kind)
    }

    #[test]
    fn accepts_common_equations() {
        for src in [
            "z^2 + c",
            "sin(z^n)+c",
            "conj(z)^3 + c",
            "|z|^2 + c",
            "(-z)^2 + c",
            "z^-1 + c",
            "z * .5 + 1.",
            "abs(z)^2 + c",
        ] {
            assert_eq!(validate(src), Ok(()), "rejected {src}");
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(kind(""), Some(ValidationKind::Empty));
        assert_eq!(kind("  \t\n"), Some(ValidationKind::Empty));
    }

    #[test]
    fn rejects_disallowed_characters() {
        let warning = validate("z#c").unwrap_err();
        assert_eq!(warning.kind, ValidationKind::DisallowedCharacters);
        assert_eq!(warning.message, "contains disallowed characters");
        assert_eq!(warning.position, Some(1));
        assert_eq!(kind("z² + c"), Some(ValidationKind::DisallowedCharacters));
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        assert_eq!(kind("z + ("), Some(ValidationKind::UnbalancedParentheses));
        assert_eq!(kind(")z("), Some(ValidationKind::UnbalancedParentheses));
        assert_eq!(kind("(z))"), Some(ValidationKind::UnbalancedParentheses));
    }

    #[test]
    fn rejects_odd_pipe_count() {
        let warning = validate("|z + c").unwrap_err();
        assert_eq!(warning.kind, ValidationKind::UnmatchedPipe);
        assert_eq!(warning.message, "unmatched | delimiter");
    }

    #[test]
    fn rejects_operator_runs() {
        let warning = validate("z +++ c").unwrap_err();
        assert_eq!(warning.kind, ValidationKind::InvalidOperatorSequence);
        assert_eq!(warning.position, Some(2));
        assert_eq!(validate("z + -c"), Ok(()));
        assert_eq!(validate("z*-c"), Ok(()));
    }

    #[test]
    fn rejects_dangling_operators() {
        assert_eq!(kind("(z + ) * c"), Some(ValidationKind::DanglingOperator));
        assert_eq!(kind("(* z)"), Some(ValidationKind::DanglingOperator));
        assert_eq!(kind("( ^z)"), Some(ValidationKind::DanglingOperator));
        assert_eq!(validate("(-z)"), Ok(()));
        assert_eq!(validate("(+z)"), Ok(()));
    }

    #[test]
    fn rejects_power_without_exponent() {
        assert_eq!(kind("z^"), Some(ValidationKind::InvalidPowerSyntax));
        assert_eq!(kind("z^ * c"), Some(ValidationKind::InvalidPowerSyntax));
    }

    #[test]
    fn is_advisory_only() {
        // Structurally fine, but `q` is not a known identifier.
        assert_eq!(validate("q(z) + c"), Ok(()));
    }

    #[test]
    fn display_includes_offset() {
        let warning = validate("z#c").unwrap_err();
        assert_eq!(warning.to_string(), "[offset 1] contains disallowed characters");
        assert_eq!(
            validate("").unwrap_err().to_string(),
            "equation is empty"
        );
    }
}
