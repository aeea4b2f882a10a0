//! Java-properties text format and the sources it is read from.
//!
//! Supported syntax:
//!
//! - `key=value`, `key: value` and `key value`
//! - `#` and `!` comment lines, blank lines
//! - a trailing odd backslash continues the logical line; leading whitespace
//!   of the continuation is dropped
//! - escapes `\t \n \r \f \\ \uXXXX`; any other escaped char stands for itself
//!
//! Later duplicates replace earlier ones.

use crate::ConfigurationError;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Parsed key/value pairs, ordered by key.
pub type Properties = BTreeMap<String, String>;

// ============================================================================
// Parsing
// ============================================================================

/// Parse properties text. Malformed escapes are kept literally, never rejected.
pub fn parse(text: &str) -> Properties {
    let mut props = Properties::new();
    let mut lines = text.lines();

    while let Some(first) = lines.next() {
        let trimmed = first.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::from(trimmed);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_pair(&logical);
        props.insert(unescape(key), unescape(value));
    }

    props
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or whitespace.
fn split_pair(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..idx], line[idx + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..idx], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        chars.nth(3);
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

// ============================================================================
// Sources
// ============================================================================

/// Something a property layer can be (re)loaded from.
pub trait PropertySource: Send + Sync {
    /// Read the full layer.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] when the backing resource is missing
    /// or unreadable.
    fn load(&self) -> Result<Properties, ConfigurationError>;

    /// Label used in log lines.
    fn describe(&self) -> String;
}

/// In-memory text, e.g. a resource embedded with `include_str!`.
#[derive(Debug, Clone)]
pub struct TextSource {
    name: &'static str,
    text: String,
}

impl TextSource {
    /// Wrap text under a display name.
    pub fn new(name: &'static str, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
        }
    }
}

impl PropertySource for TextSource {
    fn load(&self) -> Result<Properties, ConfigurationError> {
        Ok(parse(&self.text))
    }

    fn describe(&self) -> String {
        self.name.to_owned()
    }
}

/// A properties file on disk, re-read on every load.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Source for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PropertySource for FileSource {
    fn load(&self) -> Result<Properties, ConfigurationError> {
        read_file(&self.path).map(|text| parse(&text))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A source whose absence is not an error: missing resources load as empty.
#[derive(Debug, Clone)]
pub struct Optional<S>(pub S);

impl<S: PropertySource> PropertySource for Optional<S> {
    fn load(&self) -> Result<Properties, ConfigurationError> {
        match self.0.load() {
            Err(ConfigurationError::ResourceNotFound { path }) => {
                tracing::debug!(path = %path, "optional properties not found, using empty layer");
                Ok(Properties::new())
            }
            other => other,
        }
    }

    fn describe(&self) -> String {
        self.0.describe()
    }
}

fn read_file(path: &Path) -> Result<String, ConfigurationError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigurationError::ResourceNotFound {
            path: path.display().to_string(),
        },
        _ => ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        },
    })
}

// ============================================================================
// Tests
// ============================================================================
