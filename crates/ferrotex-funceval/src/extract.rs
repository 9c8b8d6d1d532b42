use crate::error::TranslateError;
use crate::ir::Span;

/// An opening/closing character pair that delimits a macro argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterPair {
    pub open: u8,
    pub close: u8,
}

impl DelimiterPair {
    pub const BRACES: Self = Self {
        open: b'{',
        close: b'}',
    };
    pub const PARENS: Self = Self {
        open: b'(',
        close: b')',
    };
}

/// Describes a macro to extract: one or more literal markers and the
/// delimiters of its one or two arguments.
///
/// Each marker is stored with the opening delimiter of the first argument
/// appended, so `\frac` with braces matches the text `\frac{`.
#[derive(Debug, Clone)]
pub struct MacroPattern {
    markers: Vec<String>,
    first: DelimiterPair,
    second: Option<DelimiterPair>,
}

impl MacroPattern {
    /// A single-argument macro. `stems` are alternative spellings such as
    /// `\texttt` and `\mathrm`.
    pub fn new(stems: &[&str], first: DelimiterPair) -> Self {
        let markers = stems
            .iter()
            .map(|stem| format!("{}{}", stem, first.open as char))
            .collect();
        Self {
            markers,
            first,
            second: None,
        }
    }

    /// Adds a second argument that must open immediately after the first closes.
    pub fn with_second(mut self, second: DelimiterPair) -> Self {
        self.second = Some(second);
        self
    }

    /// Earliest marker occurrence at or after `from`.
    fn find_marker<'p>(&'p self, input: &str, from: usize) -> Option<(usize, &'p str)> {
        self.markers
            .iter()
            .filter_map(|marker| {
                input[from..]
                    .find(marker.as_str())
                    .map(|idx| (from + idx, marker.as_str()))
            })
            .min_by_key(|(pos, _)| *pos)
    }
}

/// Replacement frame for a macro occurrence.
///
/// The occurrence `marker A } { B }` becomes `open A separator B close`: only
/// the marker and delimiter bytes are rewritten, argument text stays in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub open: String,
    pub separator: String,
    pub close: String,
}

impl Rewrite {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            separator: String::new(),
            close: close.into(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// A captured argument. `span` covers the text between the delimiters, so
/// the closing delimiter sits at `span.end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub text: String,
    pub span: Span,
}

/// One macro occurrence found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpan {
    /// The marker alternative that matched, opening delimiter included.
    pub marker: String,
    /// Source range from the marker through the last closing delimiter.
    pub span: Span,
    pub args: Vec<Argument>,
}

impl ArgumentSpan {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|arg| arg.text.as_str())
    }

    fn frame_edits<'r>(&self, rewrite: &'r Rewrite) -> Vec<Edit<'r>> {
        let mut edits = vec![Edit {
            at: self.span.start,
            len: self.marker.len(),
            text: &rewrite.open,
        }];
        if self.args.len() == 2 {
            edits.push(Edit {
                at: self.args[0].span.end,
                len: 2,
                text: &rewrite.separator,
            });
        }
        if let Some(last) = self.args.last() {
            edits.push(Edit {
                at: last.span.end,
                len: 1,
                text: &rewrite.close,
            });
        }
        edits
    }
}

#[derive(Debug)]
struct Edit<'r> {
    at: usize,
    len: usize,
    text: &'r str,
}

/// Position of the delimiter closing an argument whose content starts at
/// `start`, or `None` if the input ends first.
fn balanced_close(bytes: &[u8], start: usize, pair: DelimiterPair) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, &b) in bytes.iter().enumerate().skip(start) {
        if b == pair.open {
            depth += 1;
        } else if b == pair.close {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Finds every occurrence of `pattern` in `input` and captures its arguments.
///
/// ## Algorithm
///
/// 1. Locate the next marker at or after the cursor.
/// 2. Walk forward from the first byte after the marker with a depth counter
///    for the first argument's delimiter pair until the depth returns to zero.
/// 3. For two-argument macros, require the second opening delimiter right
///    after the first closing one and walk it the same way with its own pair.
/// 4. Move the cursor to the end of the **marker**, not of the arguments, so
///    occurrences nested inside the arguments are found in the same pass.
///
/// Results are in ascending order of marker position.
///
/// # Errors
///
/// [`TranslateError::UnbalancedDelimiter`] if an argument never closes and
/// [`TranslateError::MissingArgument`] if the second argument does not open
/// immediately after the first.
///
/// # Examples
///
/// ```
/// use ferrotex_funceval::extract::{scan, DelimiterPair, MacroPattern};
///
/// let frac = MacroPattern::new(&[r"\frac"], DelimiterPair::BRACES)
///     .with_second(DelimiterPair::BRACES);
/// let spans = scan(r"\frac{\frac{a}{b}}{c}", &frac).unwrap();
///
/// assert_eq!(spans.len(), 2);
/// assert_eq!(spans[0].arg(0), Some(r"\frac{a}{b}"));
/// assert_eq!(spans[1].arg(1), Some("b"));
/// ```
pub fn scan(input: &str, pattern: &MacroPattern) -> Result<Vec<ArgumentSpan>, TranslateError> {
    let bytes = input.as_bytes();
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some((start, marker)) = pattern.find_marker(input, cursor) {
        let unbalanced = || TranslateError::UnbalancedDelimiter {
            marker: marker.to_string(),
            position: start,
        };

        let first_start = start + marker.len();
        let first_close =
            balanced_close(bytes, first_start, pattern.first).ok_or_else(unbalanced)?;
        let mut args = vec![Argument {
            text: input[first_start..first_close].to_string(),
            span: Span::new(first_start, first_close),
        }];
        let mut end = first_close + 1;

        if let Some(second) = pattern.second {
            if bytes.get(end) != Some(&second.open) {
                return Err(TranslateError::MissingArgument {
                    marker: marker.to_string(),
                    position: start,
                    expected: second.open as char,
                });
            }
            let second_start = end + 1;
            let second_close =
                balanced_close(bytes, second_start, second).ok_or_else(unbalanced)?;
            args.push(Argument {
                text: input[second_start..second_close].to_string(),
                span: Span::new(second_start, second_close),
            });
            end = second_close + 1;
        }

        found.push(ArgumentSpan {
            marker: marker.to_string(),
            span: Span::new(start, end),
            args,
        });
        cursor = first_start;
    }

    Ok(found)
}

/// Checks that braces and parentheses in `input` pair up and nest properly.
///
/// Macro arguments are scanned per delimiter pair, so a `)` inside a `{}`
/// argument is invisible to [`scan`]. Running this first rejects such
/// interleavings, and stray closers, before any rewriting happens.
pub fn check_balanced(input: &str) -> Result<(), TranslateError> {
    let pairs = [DelimiterPair::BRACES, DelimiterPair::PARENS];
    let mut open: Vec<(u8, usize)> = Vec::new();

    for (position, &b) in input.as_bytes().iter().enumerate() {
        if pairs.iter().any(|pair| pair.open == b) {
            open.push((b, position));
        } else if let Some(pair) = pairs.iter().find(|pair| pair.close == b) {
            match open.pop() {
                Some((opener, _)) if opener == pair.open => {}
                _ => {
                    return Err(TranslateError::UnbalancedDelimiter {
                        marker: (b as char).to_string(),
                        position,
                    });
                }
            }
        }
    }

    match open.pop() {
        Some((opener, position)) => Err(TranslateError::UnbalancedDelimiter {
            marker: (opener as char).to_string(),
            position,
        }),
        None => Ok(()),
    }
}

/// Applies `rewrite` to every span, in ascending source order.
///
/// All edits are computed against the original positions and applied with a
/// single running length delta. Nested spans only ever share argument text,
/// never delimiter bytes, so their edits do not overlap; interleaved
/// delimiters that would make them overlap are reported as unbalanced.
pub fn rewrite(
    input: &mut String,
    spans: &[ArgumentSpan],
    rewrite: &Rewrite,
) -> Result<(), TranslateError> {
    let mut edits: Vec<(&ArgumentSpan, Edit<'_>)> = spans
        .iter()
        .flat_map(|span| span.frame_edits(rewrite).into_iter().map(move |e| (span, e)))
        .collect();
    edits.sort_by_key(|(_, edit)| edit.at);

    let mut delta: isize = 0;
    let mut consumed = 0;
    for (span, edit) in edits {
        if edit.at < consumed {
            return Err(TranslateError::UnbalancedDelimiter {
                marker: span.marker.clone(),
                position: span.span.start,
            });
        }
        let at = (edit.at as isize + delta) as usize;
        input.replace_range(at..at + edit.len, edit.text);
        delta += edit.text.len() as isize - edit.len as isize;
        consumed = edit.at + edit.len;
    }
    Ok(())
}

/// Scans `input` for `pattern`, rewrites every occurrence in place and
/// returns what was captured.
pub fn expand(
    input: &mut String,
    pattern: &MacroPattern,
    template: &Rewrite,
) -> Result<Vec<ArgumentSpan>, TranslateError> {
    let spans = scan(input, pattern)?;
    rewrite(input, &spans, template)?;
    Ok(spans)
}
