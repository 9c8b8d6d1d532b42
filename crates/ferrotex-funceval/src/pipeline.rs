use crate::arity::argument_count;
use crate::error::TranslateError;
use crate::extract::{self, DelimiterPair, MacroPattern, Rewrite};
use crate::ir::{ErrorKind, FunctionCall, Parameter, TranslationResult};
use crate::multiply::insert_multiplication;
use crate::params::extract_parameters;
use once_cell::sync::Lazy;
use std::cmp::Reverse;

/// A LaTeX function with a Fortran intrinsic counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intrinsic {
    pub latex: &'static str,
    pub fortran: &'static str,
}

/// Supported built-in functions and the double-precision intrinsics they map to.
pub const INTRINSICS: &[Intrinsic] = &[
    Intrinsic {
        latex: r"\sqrt",
        fortran: "DSQRT",
    },
    Intrinsic {
        latex: r"\exp",
        fortran: "DEXP",
    },
    Intrinsic {
        latex: r"\log",
        fortran: "DLOG",
    },
    Intrinsic {
        latex: r"\sin",
        fortran: "DSIN",
    },
    Intrinsic {
        latex: r"\cos",
        fortran: "DCOS",
    },
    Intrinsic {
        latex: r"\tan",
        fortran: "DTAN",
    },
];

const PI: &str = r"\pi";
const OPERATORS: [&str; 6] = ["(", ")", "/", "+", "-", "*"];

/// Distinct user function names protected per expression.
const MAX_PLACEHOLDERS: usize = 26;
/// Placeholders are drawn from the private use area and never occur in
/// names, which are ASCII.
const PLACEHOLDERS: std::ops::RangeInclusive<u32> = 0xE000..=0xF8FF;

static FRACTION: Lazy<(MacroPattern, Rewrite)> = Lazy::new(|| {
    (
        MacroPattern::new(&[r"\frac"], DelimiterPair::BRACES).with_second(DelimiterPair::BRACES),
        Rewrite::new("((", "))").with_separator(")/("),
    )
});

static USER_CALL: Lazy<(MacroPattern, Rewrite)> = Lazy::new(|| {
    (
        MacroPattern::new(&[r"\texttt", r"\mathrm"], DelimiterPair::BRACES)
            .with_second(DelimiterPair::PARENS),
        Rewrite::new("", ")").with_separator("("),
    )
});

/// A user function call before its arity is known.
#[derive(Debug, Clone)]
struct UserCall {
    name: String,
    args: String,
}

/// Output of [`Pipeline::expand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub infix: String,
    pub parameters: Vec<Parameter>,
    pub functions: Vec<FunctionCall>,
    /// Arguments captured by intrinsic rewrites, in table order.
    pub builtin_args: Vec<String>,
    /// Byte offset of the first escape or brace left in `infix`, if any.
    pub unresolved: Option<usize>,
}

/// The macro-expansion pipeline.
///
/// Stages run in a fixed order on one working copy of the input:
///
/// 1. `\frac{A}{B}` to `((A)/(B))`
/// 2. `\texttt{f}(args)` / `\mathrm{f}(args)` to `f(args)`, recording the call
/// 3. intrinsics, `\sqrt{A}` or `\sqrt(A)` to `DSQRT(A)` and so on
/// 4. `^` to `**`
/// 5. parameter extraction from a keyword-stripped copy
/// 6. whitespace removal
/// 7. implicit multiplication, with user function names masked
/// 8. `\pi` to `pi`
///
/// The input must have properly nested braces and parentheses. Whatever
/// escape or brace survives all stages is an unsupported construct.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    intrinsics: &'static [Intrinsic],
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            intrinsics: INTRINSICS,
        }
    }

    pub fn intrinsics(&self) -> &'static [Intrinsic] {
        self.intrinsics
    }

    /// Runs every stage and reports an unresolved escape or brace as a status
    /// rather than an error, keeping the expanded output.
    pub fn run(&self, latex: &str) -> Result<TranslationResult, TranslateError> {
        let expansion = self.expand(latex)?;

        let status = match expansion.unresolved {
            Some(at) => {
                let excerpt: String = expansion.infix[at..].chars().take(4).collect();
                log::error!("Error at: {}. Unrecognized parameter.", excerpt);
                ErrorKind::UnknownParameter
            }
            None => ErrorKind::None,
        };

        Ok(TranslationResult {
            latex: latex.to_string(),
            infix: expansion.infix,
            parameters: expansion.parameters,
            functions: expansion.functions,
            status,
        })
    }

    pub fn expand(&self, latex: &str) -> Result<Expansion, TranslateError> {
        extract::check_balanced(latex)?;
        let mut expr = latex.to_string();

        let (pattern, template) = &*FRACTION;
        extract::expand(&mut expr, pattern, template)?;
        log::debug!("fractions: {}", expr);

        let calls = expand_user_calls(&mut expr)?;
        log::debug!("user calls: {}", expr);

        let builtin_args = self.expand_intrinsics(&mut expr)?;
        log::debug!("intrinsics: {}", expr);

        expr = expr.replace('^', "**");

        let residual = self.residual(&expr, &calls);
        log::debug!("residual: {}", residual);
        let parameters = extract_parameters(&residual)?;

        expr.retain(|c| !c.is_whitespace());
        multiply_masked(&mut expr, &calls);
        log::debug!("multiplication: {}", expr);

        expr = expr.replace(PI, "pi");

        let functions = calls
            .iter()
            .map(|call| FunctionCall::new(&call.name, argument_count(&call.args)?))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expansion {
            unresolved: expr.find(|c| matches!(c, '\\' | '{' | '}')),
            infix: expr,
            parameters,
            functions,
            builtin_args,
        })
    }

    fn expand_intrinsics(&self, expr: &mut String) -> Result<Vec<String>, TranslateError> {
        let mut captured = Vec::new();
        for intrinsic in self.intrinsics {
            let template = Rewrite::new(format!("{}(", intrinsic.fortran), ")");
            for delimiters in [DelimiterPair::PARENS, DelimiterPair::BRACES] {
                let pattern = MacroPattern::new(&[intrinsic.latex], delimiters);
                let spans = extract::expand(expr, &pattern, &template)?;
                captured.extend(spans.into_iter().flat_map(|span| span.args).map(|a| a.text));
            }
        }
        Ok(captured)
    }

    /// The expression without intrinsic names, user function names, `\pi`
    /// and operators. Only used to find parameters.
    fn residual(&self, expr: &str, calls: &[UserCall]) -> String {
        let keywords = self
            .intrinsics
            .iter()
            .map(|intrinsic| intrinsic.fortran)
            .chain(calls.iter().map(|call| call.name.as_str()))
            .chain([PI])
            .chain(OPERATORS);

        let mut residual = expr.to_string();
        for keyword in keywords.filter(|k| !k.is_empty()) {
            residual = residual.replace(keyword, "");
        }
        residual
    }
}

/// Function names are non-empty runs of ASCII letters, digits and `_`.
fn is_function_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn expand_user_calls(expr: &mut String) -> Result<Vec<UserCall>, TranslateError> {
    let (pattern, template) = &*USER_CALL;
    let spans = extract::expand(expr, pattern, template)?;
    spans
        .iter()
        .map(|span| {
            let name = span.arg(0).unwrap_or_default().trim();
            if !is_function_name(name) {
                return Err(TranslateError::InvalidFunctionName {
                    name: name.to_string(),
                });
            }
            Ok(UserCall {
                name: name.to_string(),
                args: span.arg(1).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Inserts multiplication signs with every user function name swapped for a
/// single-character placeholder, so names like `gauss_x2` are left whole.
fn multiply_masked(expr: &mut String, calls: &[UserCall]) {
    let mut names: Vec<&str> = Vec::new();
    for call in calls {
        if !names.contains(&call.name.as_str()) {
            names.push(&call.name);
        }
    }
    if names.len() > MAX_PLACEHOLDERS {
        log::warn!(
            "Parsing: only {} distinct function calls can be protected per expression, found {}",
            MAX_PLACEHOLDERS,
            names.len()
        );
    }

    let free = PLACEHOLDERS
        .filter_map(char::from_u32)
        .filter(|c| !expr.contains(*c));
    let mut masks: Vec<(&str, char)> = names
        .into_iter()
        .take(MAX_PLACEHOLDERS)
        .zip(free)
        .collect();
    // Longest first, so a shorter name never claims part of a longer one.
    masks.sort_by_key(|(name, _)| Reverse(name.len()));

    *expr = mask(expr, &masks);
    insert_multiplication(expr);
    *expr = unmask(expr, &masks);
}

/// Swaps names for placeholders in a single left-to-right pass.
fn mask(expr: &str, masks: &[(&str, char)]) -> String {
    let mut masked = String::with_capacity(expr.len());
    let mut rest = expr;
    while let Some(c) = rest.chars().next() {
        match masks.iter().find(|(name, _)| rest.starts_with(*name)) {
            Some((name, placeholder)) => {
                masked.push(*placeholder);
                rest = &rest[name.len()..];
            }
            None => {
                masked.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    masked
}

fn unmask(expr: &str, masks: &[(&str, char)]) -> String {
    let mut restored = String::with_capacity(expr.len());
    for c in expr.chars() {
        match masks.iter().find(|(_, placeholder)| *placeholder == c) {
            Some((name, _)) => restored.push_str(name),
            None => restored.push(c),
        }
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infix(latex: &str) -> String {
        Pipeline::new().expand(latex).unwrap().infix
    }

    #[test]
    fn test_intrinsics_both_delimiters() {
        assert_eq!(infix(r"\sqrt{x}"), "DSQRT(x)");
        assert_eq!(infix(r"\exp(x)"), "DEXP(x)");
        assert_eq!(infix(r"\log(x)"), "DLOG(x)");
        assert_eq!(infix(r"\sin{x}"), "DSIN(x)");
        assert_eq!(infix(r"\cos(x)"), "DCOS(x)");
        assert_eq!(infix(r"\tan(x)"), "DTAN(x)");
    }

    #[test]
    fn test_builtin_args_are_collected() {
        let expansion = Pipeline::new().expand(r"\sqrt{a} + \exp(b)").unwrap();
        assert_eq!(expansion.builtin_args, vec!["a", "b"]);
    }

    #[test]
    fn test_power_operator() {
        assert_eq!(infix("x^2"), "x**2");
    }

    #[test]
    fn test_function_name_not_split() {
        let expansion = Pipeline::new().expand(r"\texttt{gauss_x2}(x)").unwrap();
        assert_eq!(expansion.infix, "gauss_x2(x)");
        assert!(expansion.parameters.is_empty());
    }

    #[test]
    fn test_nested_names_masked_longest_first() {
        let expansion = Pipeline::new()
            .expand(r"\texttt{f}(x) + \texttt{ff}(x)")
            .unwrap();
        assert_eq!(expansion.infix, "f(x)+ff(x)");
    }

    #[test]
    fn test_short_name_inside_another_name() {
        let expansion = Pipeline::new()
            .expand(r"\texttt{gauss}(x) + \texttt{C}(x) + \texttt{s}(2x)")
            .unwrap();
        assert_eq!(expansion.infix, "gauss(x)+C(x)+s(2*x)");
    }

    #[test]
    fn test_placeholders_avoid_characters_in_input() {
        let expansion = Pipeline::new()
            .expand("\u{E000} + \\texttt{f}(x)")
            .unwrap();
        assert_eq!(expansion.infix, "\u{E000}+f(x)");
    }

    #[test]
    fn test_invalid_function_names() {
        for latex in [r"\texttt{g+h}(x)", r"\mathrm{my f}(x)", r"\texttt{ }(x)"] {
            let err = Pipeline::new().expand(latex).unwrap_err();
            assert!(
                matches!(err, TranslateError::InvalidFunctionName { .. }),
                "{}",
                latex
            );
        }
    }

    #[test]
    fn test_interleaved_name_delimiters_rejected() {
        let err = Pipeline::new()
            .expand(r"\texttt{f}(\texttt{g)}(y))")
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnbalancedDelimiter { .. }));
    }

    #[test]
    fn test_leftover_braces_unresolved() {
        let expansion = Pipeline::new().expand("2^{x}").unwrap();
        assert!(expansion.infix.starts_with("2**{"));
        assert_eq!(expansion.unresolved, Some(3));
    }

    #[test]
    fn test_unresolved_escape_position() {
        let expansion = Pipeline::new().expand(r"2\alpha").unwrap();
        assert_eq!(expansion.unresolved, Some(2));
        assert_eq!(expansion.infix, r"2*\alpha");
    }

    #[test]
    fn test_table_is_shared() {
        let pipeline = Pipeline::new();
        assert!(std::ptr::eq(pipeline.intrinsics(), INTRINSICS));
        assert_eq!(pipeline.intrinsics().len(), 6);
    }
}
