use crate::error::TranslateError;
use crate::ir::Parameter;
use once_cell::sync::Lazy;
use regex::Regex;

/// A word character, the subscript separator and one more character: `a_0`, `s_x`.
static SUBSCRIPTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]_.").unwrap());

/// Characters that never name a parameter on their own.
fn is_reserved(c: char) -> bool {
    c == 'x' || c == '.' || c == ',' || c.is_ascii_digit() || c.is_whitespace()
}

/// Collects parameter candidates from a residual string (the expression with
/// intrinsics, user function names, `\pi` and operators already removed).
///
/// Subscripted names come first, in order of appearance. After removing them,
/// every remaining character that is not `x`, a digit, whitespace, `.` or `,`
/// is a single-letter parameter. Duplicates are kept.
pub fn extract_parameters(residual: &str) -> Result<Vec<Parameter>, TranslateError> {
    let subscripted: Vec<&str> = SUBSCRIPTED.find_iter(residual).map(|m| m.as_str()).collect();

    let mut remainder = residual.to_string();
    for name in &subscripted {
        remainder = remainder.replace(*name, "");
    }

    let mut parameters = subscripted
        .iter()
        .map(|name| Parameter::new(name))
        .collect::<Result<Vec<_>, _>>()?;

    for c in remainder.chars().filter(|c| !is_reserved(*c)) {
        parameters.push(Parameter::new(c.encode_utf8(&mut [0; 4]))?);
    }

    Ok(parameters)
}
