use crate::error::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range in the expression a macro occurrence was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A free parameter found in the expression, e.g. `a_0` or `s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The name as written, subscript separator included.
    pub name: String,
    /// Short code derived from the name with separators removed (at most two characters).
    pub identifier: String,
}

impl Parameter {
    /// Longest name in characters, and the width of the name slot in bytes.
    /// A non-ASCII name may fit here and still overflow the slot; see
    /// [`crate::record`].
    pub const MAX_NAME_LEN: usize = 3;
    /// Width of the fixed identifier slot.
    pub const IDENTIFIER_LEN: usize = 2;

    pub fn new(name: &str) -> Result<Self, TranslateError> {
        if name.chars().count() > Self::MAX_NAME_LEN {
            return Err(TranslateError::NameTooLong {
                name: name.to_string(),
                max: Self::MAX_NAME_LEN,
            });
        }
        let identifier = name
            .chars()
            .filter(|c| *c != '_')
            .take(Self::IDENTIFIER_LEN)
            .collect();
        Ok(Self {
            name: name.to_string(),
            identifier,
        })
    }
}

/// A call to a user-defined function, written `\texttt{name}(args)` or `\mathrm{name}(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arity: usize,
}

impl FunctionCall {
    /// Width of the fixed function-name slot.
    pub const MAX_NAME_LEN: usize = 63;

    pub fn new(name: &str, arity: usize) -> Result<Self, TranslateError> {
        if name.chars().count() > Self::MAX_NAME_LEN {
            return Err(TranslateError::NameTooLong {
                name: name.to_string(),
                max: Self::MAX_NAME_LEN,
            });
        }
        Ok(Self {
            name: name.to_string(),
            arity,
        })
    }
}

/// Terminal status of a translation.
///
/// The first four codes are shared with the Fortran side and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorKind {
    #[default]
    None,
    /// The expression still holds an escape sequence after expansion.
    UnknownParameter,
    /// A call's argument count disagrees with the registry.
    ArityMismatch,
    /// A call names a function the registry does not know.
    UnknownFunction,
    UnbalancedDelimiter,
    MissingArgument,
    MalformedArgumentList,
    NameTooLong,
    /// A user function name holds something other than letters, digits and `_`.
    InvalidFunctionName,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::None,
        ErrorKind::UnknownParameter,
        ErrorKind::ArityMismatch,
        ErrorKind::UnknownFunction,
        ErrorKind::UnbalancedDelimiter,
        ErrorKind::MissingArgument,
        ErrorKind::MalformedArgumentList,
        ErrorKind::NameTooLong,
        ErrorKind::InvalidFunctionName,
    ];

    pub fn code(self) -> i32 {
        match self {
            ErrorKind::None => 0,
            ErrorKind::UnknownParameter => 1,
            ErrorKind::ArityMismatch => 2,
            ErrorKind::UnknownFunction => 3,
            ErrorKind::UnbalancedDelimiter => 4,
            ErrorKind::MissingArgument => 5,
            ErrorKind::MalformedArgumentList => 6,
            ErrorKind::NameTooLong => 7,
            ErrorKind::InvalidFunctionName => 8,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Symbolic name reported to the Fortran caller.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::None => "LTXP_ERR_NOERR",
            ErrorKind::UnknownParameter => "LTXP_ERR_UNKOWN_PARAM",
            ErrorKind::ArityMismatch => "LTXP_ERR_INVALID_PARAMCOUNT",
            ErrorKind::UnknownFunction => "LTXP_ERR_INVALID_FUNCTION",
            ErrorKind::UnbalancedDelimiter => "LTXP_ERR_UNBALANCED_DELIMITER",
            ErrorKind::MissingArgument => "LTXP_ERR_MISSING_ARGUMENT",
            ErrorKind::MalformedArgumentList => "LTXP_ERR_MALFORMED_ARGLIST",
            ErrorKind::NameTooLong => "LTXP_ERR_NAME_TOO_LONG",
            ErrorKind::InvalidFunctionName => "LTXP_ERR_INVALID_FUNCNAME",
        }
    }

    pub fn is_error(self) -> bool {
        self != ErrorKind::None
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a translation produces.
///
/// Parameters and functions keep duplicates in discovery order; binding them
/// to positions is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// The LaTeX input as given.
    pub latex: String,
    /// The Fortran infix expression.
    pub infix: String,
    pub parameters: Vec<Parameter>,
    pub functions: Vec<FunctionCall>,
    pub status: ErrorKind,
}

impl TranslationResult {
    /// An aborted translation: no output, only the status.
    pub fn failed(latex: &str, error: &TranslateError) -> Self {
        Self {
            latex: latex.to_string(),
            infix: String::new(),
            parameters: Vec::new(),
            functions: Vec::new(),
            status: error.kind(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.is_error()
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }
}

/// Console banner for a translation result.
pub struct Summary<'a>(&'a TranslationResult);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let parameters: Vec<&str> = result.parameters.iter().map(|p| p.name.as_str()).collect();
        writeln!(f, "========= Parsing result =========")?;
        writeln!(f, "     Latex input: {}", result.latex)?;
        writeln!(f, "Infix expression: {}", result.infix)?;
        writeln!(f, "      Parameters: {}", parameters.join(", "))?;
        if !result.functions.is_empty() {
            let calls: Vec<String> = result
                .functions
                .iter()
                .map(|call| format!("{}/{}", call.name, call.arity))
                .collect();
            writeln!(f, "       Functions: {}", calls.join(", "))?;
        }
        if result.is_error() {
            writeln!(f, "          Status: {}", result.status)?;
        }
        write!(f, "==================================")
    }
}
