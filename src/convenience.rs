//! Message template formatting.
//!
//! Templates use positional placeholders `{0}`, `{1}`, ... . Substitution
//! happens in one pass:
//!
//! 1. Each argument is rendered once and bounded to [`MAX_PARAM_LEN`] bytes,
//!    cut on a UTF-8 boundary and marked with `...[TRUNCATED]`.
//! 2. `{n}` is replaced by argument `n`. Placeholders without a matching
//!    argument, and any other braces, are copied literally.
//! 3. Control characters in the result are escaped (`\n`, `\r`, `\t`,
//!    `\u001b`, ...) so a record always stays on one log line.
//!
//! # Usage
//!
//! ```rust
//! use plugin_errors::convenience::format_message;
//!
//! let msg = format_message("HTTP request failed. method=[{0}] url=[{1}]", &[&"GET", &"http://x\n"]);
//! assert_eq!(msg, "HTTP request failed. method=[GET] url=[http://x\\n]");
//! ```

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt::{Display, Write};

/// Maximum length in bytes of one rendered parameter, marker included.
pub const MAX_PARAM_LEN: usize = 1024;

/// Truncation indicator appended to cut parameters.
pub const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

// ============================================================================
// Formatting
// ============================================================================

/// Substitute `args` into `template` and escape control characters.
pub fn format_message(template: &str, args: &[&dyn Display]) -> String {
    let rendered: SmallVec<[String; 4]> = args
        .iter()
        .map(|arg| bound_param(arg.to_string()))
        .collect();

    let mut out = String::with_capacity(template.len() + rendered.iter().map(String::len).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match placeholder(after).and_then(|(idx, len)| rendered.get(idx).map(|arg| (arg, len))) {
            Some((arg, len)) => {
                out.push_str(arg);
                rest = &after[len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    escape_control(&out).into_owned()
}

/// Parse `<digits>}` at the start of `s`; returns the index and digit count.
fn placeholder(s: &str) -> Option<(usize, usize)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || s.as_bytes().get(digits) != Some(&b'}') {
        return None;
    }
    s[..digits].parse().ok().map(|idx| (idx, digits))
}

/// Cut a rendered parameter to [`MAX_PARAM_LEN`] bytes.
pub fn bound_param(mut s: String) -> String {
    if s.len() <= MAX_PARAM_LEN {
        return s;
    }

    let mut idx = MAX_PARAM_LEN.saturating_sub(TRUNCATION_INDICATOR.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    s.truncate(idx);
    s.push_str(TRUNCATION_INDICATOR);
    s
}

/// Escape every control character. Borrows when there is nothing to escape.
pub fn escape_control(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                // Writing to a String cannot fail.
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

// ============================================================================
// Macros
// ============================================================================

/// Derive a parameterized copy of an exception or log record.
///
/// Each argument may be any [`Display`] value; they are passed to the
/// record's `params` method in order.
///
/// # Example
///
/// ```rust
/// use plugin_errors::{params, registry::Taxonomy, definitions};
///
/// let taxonomy = Taxonomy::bundled().unwrap();
/// let base = taxonomy.raise(&definitions::HTTP_REQUEST_FAILED);
/// let err = params!(base, "GET", "http://localhost/");
/// assert!(err.message().contains("method=[GET]"));
/// ```
#[macro_export]
macro_rules! params {
    ($record:expr $(, $arg:expr)* $(,)?) => {
        $record.params(&[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_substitution() {
        assert_eq!(format_message("{1}-{0}-{1}", &[&"a", &2]), "2-a-2");
    }

    #[test]
    fn missing_argument_leaves_placeholder() {
        assert_eq!(format_message("x={0} y={1}", &[&"1"]), "x=1 y={1}");
        assert_eq!(format_message("x={0}", &[]), "x={0}");
    }

    #[test]
    fn stray_braces_are_literal() {
        assert_eq!(format_message("{a} {} {0", &[&"v"]), "{a} {} {0");
        assert_eq!(format_message("{{0}}", &[&"v"]), "{v}");
    }

    #[test]
    fn control_characters_are_escaped() {
        let msg = format_message("value=[{0}]", &[&"a\nb\r\tc\u{1b}[31m"]);
        assert_eq!(msg, "value=[a\\nb\\r\\tc\\u001b[31m]");
        assert!(!msg.chars().any(char::is_control));
    }

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(escape_control("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn long_param_is_truncated() {
        let long = "A".repeat(MAX_PARAM_LEN + 10);
        let bounded = bound_param(long);
        assert_eq!(bounded.len(), MAX_PARAM_LEN);
        assert!(bounded.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn truncation_respects_utf8_boundary() {
        let long = "й".repeat(MAX_PARAM_LEN);
        let bounded = bound_param(long);
        assert!(bounded.len() <= MAX_PARAM_LEN);
        assert!(bounded.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn short_param_untouched() {
        assert_eq!(bound_param("short".to_owned()), "short");
    }
}
