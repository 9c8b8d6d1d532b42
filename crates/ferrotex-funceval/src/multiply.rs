//! Implicit multiplication.
//!
//! LaTeX juxtaposition (`2x`, `(a)(b)`, `2\pi`) is made explicit by inserting
//! `*` after trigger tokens. Each rule finds all of its triggers first and then
//! inserts left to right, shifting later positions by the number of signs
//! already inserted.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters after which no sign is needed for every rule.
const OPERATORS: &str = ")+-*/,";

struct Rule {
    trigger: Lazy<Regex>,
    /// A sign is inserted unless the next character is one of these.
    exceptions: &'static str,
}

static RULES: [Rule; 5] = [
    // Closing parenthesis
    Rule {
        trigger: Lazy::new(|| Regex::new(r"\)").unwrap()),
        exceptions: OPERATORS,
    },
    // Digits, but never inside a number
    Rule {
        trigger: Lazy::new(|| Regex::new(r"[0-9]").unwrap()),
        exceptions: ")+-*/,.0123456789",
    },
    // The independent variable
    Rule {
        trigger: Lazy::new(|| Regex::new(r"x").unwrap()),
        exceptions: ")+-*/,_",
    },
    // Subscripted identifiers such as a_0
    Rule {
        trigger: Lazy::new(|| Regex::new(r"[A-Za-z0-9_]_.").unwrap()),
        exceptions: ")+-*/,_",
    },
    // The constant \pi
    Rule {
        trigger: Lazy::new(|| Regex::new(r"\\pi").unwrap()),
        exceptions: OPERATORS,
    },
];

impl Rule {
    fn apply(&self, expr: &mut String) {
        let ends: Vec<usize> = self
            .trigger
            .find_iter(expr.as_str())
            .map(|m| m.end())
            .collect();
        let mut offset = 0;
        for end in ends {
            let at = end + offset;
            let next = expr[at..].chars().next();
            if next.is_some_and(|c| !self.exceptions.contains(c)) {
                expr.insert(at, '*');
                offset += 1;
            }
        }
    }
}

/// Inserts explicit `*` signs and then drops the `_` subscript separators.
///
/// Anything that must not be split, such as user function names, has to be
/// masked by the caller beforehand.
///
/// ```
/// use ferrotex_funceval::multiply::insert_multiplication;
///
/// let mut expr = "2x+(x)(a_0)".to_string();
/// insert_multiplication(&mut expr);
/// assert_eq!(expr, "2*x+(x)*(a0)");
/// ```
pub fn insert_multiplication(expr: &mut String) {
    for rule in &RULES {
        rule.apply(expr);
    }
    expr.retain(|c| c != '_');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> String {
        let mut expr = input.to_string();
        insert_multiplication(&mut expr);
        expr
    }

    #[test]
    fn test_digit_before_variable() {
        assert_eq!(run("2x"), "2*x");
        assert_eq!(run("2.5x"), "2.5*x");
        assert_eq!(run("10"), "10");
    }

    #[test]
    fn test_adjacent_groups() {
        assert_eq!(run("(x)(y)"), "(x)*(y)");
        assert_eq!(run("(x)2"), "(x)*2");
        assert_eq!(run("((x))"), "((x))");
    }

    #[test]
    fn test_pi_constant() {
        assert_eq!(run(r"2\pi"), r"2*\pi");
        assert_eq!(run(r"\pi x"), r"\pi* x");
        assert_eq!(run(r"\pi(x)"), r"\pi*(x)");
    }

    #[test]
    fn test_no_sign_before_operator_or_end() {
        assert_eq!(run("2+"), "2+");
        assert_eq!(run("x,2"), "x,2");
        assert_eq!(run("x-2/x"), "x-2/x");
    }

    #[test]
    fn test_subscripted_identifiers() {
        assert_eq!(run("a_0x"), "a0*x");
        assert_eq!(run("x_dx_1"), "xd*x1");
        assert_eq!(run("b_1(x)"), "b1*(x)");
    }

    #[test]
    fn test_variable_before_group() {
        assert_eq!(run("x(a_1)"), "x*(a1)");
        assert_eq!(run("xDEXP(x)"), "x*DEXP(x)");
    }
}
