//! Evaluator-side glue: reference GLSL for the complex helpers and the
//! iteration template compiled equations are spliced into.
//!
//! A renderer with its own helpers only needs [`splice`].

use std::collections::BTreeSet;
use std::fmt;

use crate::equation::{EmittedCode, Helper};

/// Marker replaced by the compiled expression.
pub const PLACEHOLDER: &str = "{{EQUATION}}";

/// Minimal escape-time loop. Binds `z`, `c` and `power`.
pub const ITERATION_TEMPLATE: &str = r#"int escape_time(vec2 c, float power, int max_iterations) {
    vec2 z = vec2(0.0);
    for (int i = 0; i < max_iterations; i++) {
        z = {{EQUATION}};
        if (dot(z, z) > 4.0) {
            return i;
        }
    }
    return max_iterations;
}
"#;

/// GLSL body for one helper. Each body is self-contained.
pub fn helper_source(helper: Helper) -> &'static str {
    match helper {
        Helper::Cmul => {
            r#"vec2 cmul(vec2 a, vec2 b) {
    return vec2(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x);
}
"#
        }
        Helper::Cdiv => {
            r#"vec2 cdiv(vec2 a, vec2 b) {
    float d = dot(b, b);
    return vec2(a.x * b.x + a.y * b.y, a.y * b.x - a.x * b.y) / d;
}
"#
        }
        Helper::Cpow => {
            r#"vec2 cpow(vec2 a, vec2 b) {
    if (a.x == 0.0 && a.y == 0.0) {
        return vec2(0.0);
    }
    float lr = log(length(a));
    float t = atan(a.y, a.x);
    float mag = exp(b.x * lr - b.y * t);
    float ang = b.y * lr + b.x * t;
    return mag * vec2(cos(ang), sin(ang));
}
"#
        }
        Helper::Csin => {
            r#"vec2 csin(vec2 a) {
    return vec2(sin(a.x) * cosh(a.y), cos(a.x) * sinh(a.y));
}
"#
        }
        Helper::Ccos => {
            r#"vec2 ccos(vec2 a) {
    return vec2(cos(a.x) * cosh(a.y), -sin(a.x) * sinh(a.y));
}
"#
        }
        Helper::Ctan => {
            r#"vec2 ctan(vec2 a) {
    float d = cos(2.0 * a.x) + cosh(2.0 * a.y);
    return vec2(sin(2.0 * a.x), sinh(2.0 * a.y)) / d;
}
"#
        }
        Helper::Cexp => {
            r#"vec2 cexp(vec2 a) {
    return exp(a.x) * vec2(cos(a.y), sin(a.y));
}
"#
        }
        Helper::Csqrt => {
            r#"vec2 csqrt(vec2 a) {
    float r = length(a);
    float s = a.y < 0.0 ? -1.0 : 1.0;
    return vec2(sqrt(0.5 * (r + a.x)), s * sqrt(0.5 * (r - a.x)));
}
"#
        }
        Helper::Clog => {
            r#"vec2 clog(vec2 a) {
    return vec2(log(length(a)), atan(a.y, a.x));
}
"#
        }
    }
}

/// Definitions for exactly the given helpers, in a stable order.
pub fn prelude(helpers: &BTreeSet<Helper>) -> String {
    helpers
        .iter()
        .map(|&h| helper_source(h))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    MissingPlaceholder,
}

impl fmt::Display for SpliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceError::MissingPlaceholder => {
                write!(f, "template has no {PLACEHOLDER} placeholder")
            }
        }
    }
}

impl std::error::Error for SpliceError {}

/// Replace every [`PLACEHOLDER`] in `template` with `code`.
pub fn splice(template: &str, code: &str) -> Result<String, SpliceError> {
    if !template.contains(PLACEHOLDER) {
        return Err(SpliceError::MissingPlaceholder);
    }
    Ok(template.replace(PLACEHOLDER, code))
}

/// Helper prelude plus [`ITERATION_TEMPLATE`] with the equation spliced in.
pub fn fragment(emitted: &EmittedCode) -> String {
    let body = ITERATION_TEMPLATE.replace(PLACEHOLDER, &emitted.code);
    let prelude = prelude(&emitted.helpers);
    if prelude.is_empty() {
        body
    } else {
        format!("{prelude}\n{body}")
    }
}
