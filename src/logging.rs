//! Catalog-backed log records and the log line writer.
//!
//! Every record is written as one `tracing` event at its resolved severity:
//!
//! ```text
//! [PL-SV-0005] - [my_crate::cache#connect:42] - Failed to connect memcached. host=[...]
//! ```
//!
//! The cause, if any, is attached as a `cause` field rather than appended to
//! the line. The message has already had its control characters escaped by
//! `params`, so one record is always one line.

use crate::catalog::{MessageCatalog, Severity, SeveritySource};
use crate::codes::{LogDef, MessageCode};
use crate::convenience::{escape_control, format_message};
use crate::{Cause, TaxonomyError};
use std::error::Error;
use std::fmt::{self, Display};
use std::panic::Location;
use std::sync::Arc;

// ============================================================================
// Call Site
// ============================================================================

/// Where a record was written from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSite {
    /// Module path or source file.
    pub class: &'static str,
    /// Enclosing function, if known.
    pub method: Option<&'static str>,
    /// Source line.
    pub line: u32,
}

impl LogSite {
    /// Site from a function's type path, as produced inside [`write_log!`].
    ///
    /// `a::b::func::__here` becomes class `a::b`, method `func`; closure
    /// frames are skipped.
    pub fn from_fn_path(path: &'static str, line: u32) -> Self {
        let mut path = path.strip_suffix("::__here").unwrap_or(path);
        while let Some(outer) = path.strip_suffix("::{{closure}}") {
            path = outer;
        }
        match path.rsplit_once("::") {
            Some((class, method)) => Self {
                class,
                method: Some(method),
                line,
            },
            None => Self {
                class: path,
                method: None,
                line,
            },
        }
    }

    /// Site of the `#[track_caller]` caller: its file and line. The method is
    /// not recoverable here and prints as [`UNKNOWN_METHOD`].
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            class: location.file(),
            method: None,
            line: location.line(),
        }
    }
}

/// Printed in place of the method when the site does not know it.
pub const UNKNOWN_METHOD: &str = "?";

impl Display for LogSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = self.method.unwrap_or(UNKNOWN_METHOD);
        write!(f, "{}#{}:{}", self.class, method, self.line)
    }
}

/// Write an exception or log record attributed to the enclosing function.
///
/// ```rust
/// use plugin_errors::{definitions::log, write_log, Taxonomy};
///
/// let taxonomy = Taxonomy::bundled().unwrap();
/// let record = taxonomy.log(&log::server::MEMCACHED_CONNECT_FAIL).unwrap();
/// write_log!(record.params(&[&"localhost", &11211]));
/// ```
#[macro_export]
macro_rules! write_log {
    ($record:expr) => {{
        fn __here() {}
        $record.write_log_at($crate::logging::LogSite::from_fn_path(
            ::std::any::type_name_of_val(&__here),
            ::std::line!(),
        ))
    }};
}

macro_rules! event_at {
    ($severity:expr, $($rest:tt)+) => {
        match $severity {
            Severity::Error => tracing::error!($($rest)+),
            Severity::Warn => tracing::warn!($($rest)+),
            Severity::Info => tracing::info!($($rest)+),
            Severity::Debug => tracing::debug!($($rest)+),
        }
    };
}

/// Emit one formatted record.
pub(crate) fn emit(
    severity: Severity,
    code: &MessageCode,
    site: &LogSite,
    message: &str,
    cause: Option<&Cause>,
) {
    let cause = cause.map(tracing::field::display);
    event_at!(
        severity,
        code = %code,
        cause,
        "[{}] - [{}] - {}",
        code,
        site,
        escape_control(message)
    );
}

// ============================================================================
// Log Record
// ============================================================================

/// A log record identified by a `PL-<tag>-<seq>` (or `PR...`) code.
///
/// Unlike [`crate::PluginException`] a log record has no HTTP status:
/// severity is the catalog entry, then the declared default, then WARN.
#[derive(Debug, Clone)]
pub struct PluginLog {
    code: MessageCode,
    severity: Severity,
    severity_source: SeveritySource,
    template: Arc<str>,
    message: String,
    cause: Option<Cause>,
}

impl PluginLog {
    /// Build a record for `code` from the catalog.
    ///
    /// # Errors
    ///
    /// - [`TaxonomyError::InvalidCode`] if neither log grammar matches
    /// - [`TaxonomyError::Configuration`] if the catalog has no template
    pub fn create(catalog: &MessageCatalog, code: &str) -> Result<Self, TaxonomyError> {
        let code = MessageCode::parse_log(code.to_owned())?;
        Self::materialize(catalog, code, None)
    }

    /// Build a record from a declared log table row.
    ///
    /// # Errors
    ///
    /// As [`PluginLog::create`], plus [`TaxonomyError::CategoryMismatch`].
    pub fn from_def(catalog: &MessageCatalog, def: &LogDef) -> Result<Self, TaxonomyError> {
        let code = MessageCode::parse_log(def.code)?;
        if code.tag() != def.category.tag() {
            return Err(TaxonomyError::CategoryMismatch {
                code: def.code.to_owned(),
                expected: def.category.tag(),
                found: code.tag().to_owned(),
            });
        }
        Self::materialize(catalog, code, def.default_severity)
    }

    fn materialize(
        catalog: &MessageCatalog,
        code: MessageCode,
        declared: Option<Severity>,
    ) -> Result<Self, TaxonomyError> {
        let template: Arc<str> = Arc::from(catalog.message(code.as_str())?);
        let (severity, severity_source) =
            Severity::resolve(catalog.severity(code.as_str()), None, declared)
                .unwrap_or((Severity::Warn, SeveritySource::Fallback));

        Ok(Self {
            code,
            severity,
            severity_source,
            message: template.to_string(),
            template,
            cause: None,
        })
    }

    /// Copy with `args` substituted into the catalog template.
    pub fn params(&self, args: &[&dyn Display]) -> Self {
        Self {
            message: format_message(&self.template, args),
            ..self.clone()
        }
    }

    /// Copy with `cause` attached.
    pub fn reason<E>(&self, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.with_cause(Some(Arc::new(cause)))
    }

    /// Copy with the cause replaced, or cleared with `None`.
    pub fn with_cause(&self, cause: Option<Cause>) -> Self {
        Self {
            cause,
            ..self.clone()
        }
    }

    /// The code.
    pub fn code(&self) -> &MessageCode {
        &self.code
    }

    /// Resolved severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Which rule produced [`PluginLog::severity`].
    pub fn severity_source(&self) -> SeveritySource {
        self.severity_source
    }

    /// Message, substituted if derived through `params`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached cause.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Write at the resolved severity, attributed to `site`.
    pub fn write_log_at(&self, site: LogSite) {
        emit(
            self.severity,
            &self.code,
            &site,
            &self.message,
            self.cause.as_ref(),
        );
    }

    /// Write at the resolved severity, attributed to the caller's file and line.
    #[track_caller]
    pub fn write_log(&self) {
        self.write_log_at(LogSite::caller());
    }
}

impl Display for PluginLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] - {}", self.code, self.message)
    }
}

impl Error for PluginLog {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

// ============================================================================
// Tests
// ============================================================================
