//! Message code namespace - the wire-visible identity of every error and log record.
//!
//! Exceptions carry codes of the form `PR<status>-<category>-<sequence>`:
//!
//! - `PR`: fixed prefix
//! - `<status>`: three digits, the HTTP status the exception maps to
//! - `<category>`: two word characters naming the subsystem (`AN`, `NW`, `OD`, ...)
//! - `<sequence>`: four digits, unique within the category
//!
//! Log records have no HTTP status and use `PL-<category>-<sequence>`.
//! `PluginLog` also accepts the exception grammar so that an exception code can
//! be logged under its own identity.
//!
//! # Categories
//!
//! Categories are closed enums rather than free-form strings. A declared code
//! whose tag disagrees with its declared category is rejected when the registry
//! is built (see [`crate::registry::Taxonomy::build`]).
//!
//! # Example
//!
//! ```rust
//! use plugin_errors::MessageCode;
//!
//! let code = MessageCode::parse("PR400-AN-0001").unwrap();
//! assert_eq!(code.status(), Some(400));
//! assert_eq!(code.tag(), "AN");
//!
//! assert!(MessageCode::parse("BAD-CODE").is_err());
//! ```

use crate::Severity;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Exception grammar. Every group is ASCII only.
static EXCEPTION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PR([0-9]{3})-([A-Za-z0-9_]{2})-([0-9]{4})$").expect("exception code grammar is valid")
});

/// Log grammar.
static LOG_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PL-([A-Za-z0-9_]{2})-([0-9]{4})$").expect("log code grammar is valid")
});

// ============================================================================
// Grammar Violation
// ============================================================================

/// A code string that does not match the required grammar.
///
/// This is a programmer error: codes are declared in source, so a violation
/// surfaces at registry construction and never reaches an end user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid message code format: [{code}]")]
pub struct InvalidCodeFormat {
    /// The offending input.
    pub code: String,
}

impl InvalidCodeFormat {
    fn new(code: &str) -> Self {
        Self {
            code: code.to_owned(),
        }
    }
}

// ============================================================================
// Message Code
// ============================================================================

/// A parsed, validated message code.
///
/// Cloning is cheap for codes declared as `&'static str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageCode {
    raw: Cow<'static, str>,
    status: Option<u16>,
    tag_start: usize,
    tag_end: usize,
}

impl MessageCode {
    /// Parse an exception code (`PR<ddd>-<ww>-<dddd>`).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeFormat`] for anything else, including log codes.
    pub fn parse(code: impl Into<Cow<'static, str>>) -> Result<Self, InvalidCodeFormat> {
        let raw = code.into();
        let (status, tag_start, tag_end) = {
            let caps = EXCEPTION_CODE
                .captures(&raw)
                .ok_or_else(|| InvalidCodeFormat::new(&raw))?;
            let status = caps[1]
                .parse::<u16>()
                .map_err(|_| InvalidCodeFormat::new(&raw))?;
            let tag = caps.get(2).ok_or_else(|| InvalidCodeFormat::new(&raw))?;
            (status, tag.start(), tag.end())
        };
        Ok(Self {
            raw,
            status: Some(status),
            tag_start,
            tag_end,
        })
    }

    /// Parse a log code, accepting both `PL-<ww>-<dddd>` and the exception grammar.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeFormat`] when neither grammar matches.
    pub fn parse_log(code: impl Into<Cow<'static, str>>) -> Result<Self, InvalidCodeFormat> {
        let raw = code.into();
        if EXCEPTION_CODE.is_match(&raw) {
            return Self::parse(raw);
        }
        let (tag_start, tag_end) = {
            let caps = LOG_CODE
                .captures(&raw)
                .ok_or_else(|| InvalidCodeFormat::new(&raw))?;
            let tag = caps.get(1).ok_or_else(|| InvalidCodeFormat::new(&raw))?;
            (tag.start(), tag.end())
        };
        Ok(Self {
            raw,
            status: None,
            tag_start,
            tag_end,
        })
    }

    /// The code exactly as declared.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// HTTP status from the numeric group; `None` for log codes.
    #[inline]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// The two-character category tag.
    #[inline]
    pub fn tag(&self) -> &str {
        &self.raw[self.tag_start..self.tag_end]
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for MessageCode {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Subsystem an exception belongs to.
///
/// Replaces per-category exception subclasses: callers dispatch with `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Credential and password handling.
    Auth,
    /// Token and identity-provider authentication.
    Authn,
    /// Outbound HTTP and other network calls.
    NetWork,
    /// Data parsing and OData handling.
    OData,
    /// Host-side failures.
    Server,
    /// Everything else.
    Misc,
}

impl ErrorCategory {
    /// Tag used in the code's category group.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Auth => "AN",
            Self::Authn => "AU",
            Self::NetWork => "NW",
            Self::OData => "OD",
            Self::Server => "SV",
            Self::Misc => "MC",
        }
    }

    /// Category named by a code's tag, if it is one of the closed set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        [
            Self::Auth,
            Self::Authn,
            Self::NetWork,
            Self::OData,
            Self::Server,
            Self::Misc,
        ]
        .into_iter()
        .find(|category| category.tag() == tag)
    }

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Auth => "Authentication",
            Self::Authn => "Authn",
            Self::NetWork => "Network",
            Self::OData => "Data",
            Self::Server => "Server",
            Self::Misc => "Misc",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Subsystem a log record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// OData processing.
    OData,
    /// WebDAV resources.
    Dav,
    /// Token handling.
    Auth,
    /// OpenID Connect flows.
    Oidc,
    /// Host-side failures and datastore traffic.
    Server,
    /// Search-engine traffic.
    Es,
    /// Everything else.
    Misc,
}

impl LogCategory {
    /// Tag used in the code's category group.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::OData => "OD",
            Self::Dav => "DV",
            Self::Auth => "AU",
            Self::Oidc => "OI",
            Self::Server => "SV",
            Self::Es => "ES",
            Self::Misc => "MC",
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Declared exception code: one row of the static code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeDef {
    /// Code string, validated when the registry is built.
    pub code: &'static str,
    /// Declared category; must agree with the code's tag.
    pub category: ErrorCategory,
    /// Lowest-precedence severity, used only when nothing else resolves.
    pub default_severity: Option<Severity>,
}

/// Declared log code: one row of the static log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogDef {
    /// Code string, validated when the registry is built.
    pub code: &'static str,
    /// Declared category; must agree with the code's tag.
    pub category: LogCategory,
    /// Severity used when the catalog has no explicit entry. WARN if unset.
    pub default_severity: Option<Severity>,
}

/// Define exception codes within one category.
///
/// Each entry becomes a `pub const` [`CodeDef`]. An optional severity after
/// the code string sets the declared default.
///
/// # Example
///
/// ```rust
/// # use plugin_errors::{define_exception_codes, ErrorCategory, Severity};
/// define_exception_codes! {
///     ErrorCategory::NetWork => {
///         HTTP_REQUEST_FAILED = "PR500-NW-0001",
///         UNEXPECTED_RESPONSE = "PR500-NW-0002" => Severity::Error,
///     }
/// }
/// assert_eq!(UNEXPECTED_RESPONSE.default_severity, Some(Severity::Error));
/// ```
#[macro_export]
macro_rules! define_exception_codes {
    ($category:expr => { $( $name:ident = $code:literal $(=> $severity:expr)? ),+ $(,)? }) => {
        $(
            #[doc = $code]
            pub const $name: $crate::CodeDef = $crate::CodeDef {
                code: $code,
                category: $category,
                default_severity: $crate::__declared_severity!($($severity)?),
            };
        )+
    };
}

/// Define log codes within one category.
///
/// # Example
///
/// ```rust
/// # use plugin_errors::{define_log_codes, LogCategory};
/// define_log_codes! {
///     LogCategory::Misc => {
///         UNREACHABLE_CODE_ERROR = "PL-MC-0001",
///     }
/// }
/// assert_eq!(UNREACHABLE_CODE_ERROR.code, "PL-MC-0001");
/// ```
#[macro_export]
macro_rules! define_log_codes {
    ($category:expr => { $( $name:ident = $code:literal $(=> $severity:expr)? ),+ $(,)? }) => {
        $(
            #[doc = $code]
            pub const $name: $crate::LogDef = $crate::LogDef {
                code: $code,
                category: $category,
                default_severity: $crate::__declared_severity!($($severity)?),
            };
        )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __declared_severity {
    () => {
        None
    };
    ($severity:expr) => {
        Some($severity)
    };
}

// ============================================================================
// Tests
// ============================================================================
