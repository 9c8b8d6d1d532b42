use crate::error::TranslateError;

/// Counts the top-level arguments of a call's argument text.
///
/// Blank text has no arguments. Otherwise every comma outside nested
/// parentheses starts a new argument.
///
/// ```
/// use ferrotex_funceval::arity::argument_count;
///
/// assert_eq!(argument_count("").unwrap(), 0);
/// assert_eq!(argument_count("a").unwrap(), 1);
/// assert_eq!(argument_count("a,b,(c,d)").unwrap(), 3);
/// ```
///
/// # Errors
///
/// [`TranslateError::MalformedArgumentList`] when the parentheses do not balance.
pub fn argument_count(args: &str) -> Result<usize, TranslateError> {
    let args = args.trim();
    if args.is_empty() {
        return Ok(0);
    }

    let malformed = || TranslateError::MalformedArgumentList {
        args: args.to_string(),
    };

    let mut count = 1;
    let mut depth = 0usize;
    for c in args.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(malformed)?,
            ',' if depth == 0 => count += 1,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed());
    }
    Ok(count)
}
