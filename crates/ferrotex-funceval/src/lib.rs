//! # FerroTeX Function Evaluator Frontend
//!
//! Translates fit functions written in a small subset of LaTeX math into
//! Fortran infix expressions, and inventories the parameters and user
//! function calls they reference.
//!
//! ## Overview
//!
//! The translator is a string-rewriting pipeline, not a full TeX parser. It
//! understands:
//!
//! - **Fractions**: `\frac{A}{B}`, nested to any depth
//! - **Intrinsics**: `\sqrt`, `\exp`, `\log`, `\sin`, `\cos`, `\tan` with a
//!   `{}` or `()` argument, mapped to `DSQRT`, `DEXP`, ...
//! - **User functions**: `\texttt{name}(args)` or `\mathrm{name}(args)`
//! - **Constants**: `\pi`
//! - **Powers**: `^` (single token exponents only)
//! - **Parameters**: one letter, optionally subscripted with `_` and one more
//!   character (`a_0`); `x` is the independent variable
//!
//! ## Architecture
//!
//! ```text
//! LaTeX ──► extract (\frac, user calls, intrinsics) ──► ^ to ** ──┬──► params
//!                                                                 │
//!            infix ◄── \pi to pi ◄── implicit * ◄── whitespace ◄──┘
//!              │
//!              ▼
//!        registry::validate ──► TranslationResult { status }
//! ```
//!
//! - [`extract`] - balanced-delimiter argument capture and in-place rewriting
//! - [`pipeline`] - stage ordering and the intrinsic table
//! - [`multiply`] - implicit multiplication rules
//! - [`params`] - parameter detection
//! - [`arity`] - argument counting for user calls
//! - [`registry`] - the registry of known user functions and call validation
//! - [`record`] - the fixed-layout record read by the Fortran side
//!
//! ## Examples
//!
//! ```
//! use ferrotex_funceval::{translate, ErrorKind};
//!
//! let result = translate(r"\frac{1}{a_0\sqrt{2\pi}}");
//!
//! assert_eq!(result.infix, "((1)/(a0*DSQRT(2*pi)))");
//! assert_eq!(result.parameters.len(), 1);
//! assert_eq!(result.parameters[0].name, "a_0");
//! assert_eq!(result.status, ErrorKind::None);
//! ```
//!
//! ### Validating user functions
//!
//! ```
//! use ferrotex_funceval::{translate, validate, ErrorKind, Registry};
//!
//! let registry = Registry::parse("gauss - 3 - 2023-07-26")?;
//! let mut result = translate(r"\texttt{gauss}(x, a, b)");
//!
//! let failures = validate(&mut result, &registry);
//! assert!(failures.is_empty());
//! assert_eq!(result.status, ErrorKind::None);
//! # Ok::<(), ferrotex_funceval::RegistryError>(())
//! ```

/// Call argument counting.
pub mod arity;
pub mod error;
/// Delimiter-balanced macro extraction.
pub mod extract;
/// Data model shared by every stage.
pub mod ir;
pub mod multiply;
/// Parameter detection.
pub mod params;
pub mod pipeline;
pub mod record;
/// Function registry and call validation.
pub mod registry;


pub use error::{RegistryError, TranslateError};
pub use ir::{ErrorKind, FunctionCall, Parameter, TranslationResult};
pub use pipeline::Pipeline;
pub use record::OutputRecord;
pub use registry::{Registry, ValidationFailure, validate, validate_with_registry_file};

/// Translates one LaTeX expression.
///
/// Never fails: aborted translations come back with an empty infix
/// expression and the failure in `status`.
pub fn translate(latex: &str) -> TranslationResult {
    match Pipeline::new().run(latex) {
        Ok(result) => result,
        Err(err) => {
            log::error!("Failed to translate `{}`: {}", latex, err);
            TranslationResult::failed(latex, &err)
        }
    }
}
