//! Catalog-backed exceptions.
//!
//! A [`PluginException`] is an immutable value: code, category, status,
//! severity, message and an optional cause. Instances are materialized once
//! per code (see [`crate::registry::Taxonomy`]) and every use site derives a
//! copy:
//!
//! - [`PluginException::params`] substitutes the template and escapes control
//!   characters
//! - [`PluginException::reason`] attaches a cause
//!
//! Neither touches the receiver, so a shared instance can be used from any
//! number of threads without locking.

use crate::catalog::{MessageCatalog, Severity, SeveritySource};
use crate::codes::{CodeDef, ErrorCategory, MessageCode};
use crate::convenience::format_message;
use crate::logging::{self, LogSite};
use crate::{Cause, TaxonomyError};
use std::error::Error;
use std::fmt::{self, Display};
use std::sync::Arc;

/// An error identified by a `PR<status>-<tag>-<seq>` code.
#[derive(Debug, Clone)]
#[must_use = "exceptions should be returned or logged"]
pub struct PluginException {
    code: MessageCode,
    category: Option<ErrorCategory>,
    status: u16,
    severity: Severity,
    severity_source: SeveritySource,
    template: Arc<str>,
    message: String,
    cause: Option<Cause>,
}

impl PluginException {
    /// Build an exception for `code` from the catalog.
    ///
    /// The category is taken from the code's tag; tags outside the closed
    /// [`ErrorCategory`] set yield `None`.
    ///
    /// # Errors
    ///
    /// - [`TaxonomyError::InvalidCode`] if `code` is not `PR<ddd>-<ww>-<dddd>`
    /// - [`TaxonomyError::Configuration`] if the catalog has no template
    pub fn create(catalog: &MessageCatalog, code: &str) -> Result<Self, TaxonomyError> {
        let code = MessageCode::parse(code.to_owned())?;
        let category = ErrorCategory::from_tag(code.tag());
        Self::materialize(catalog, code, category, None)
    }

    /// Build an exception from a declared code table row.
    ///
    /// # Errors
    ///
    /// As [`PluginException::create`], plus
    /// [`TaxonomyError::CategoryMismatch`] when the tag disagrees with the
    /// declared category.
    pub fn from_def(catalog: &MessageCatalog, def: &CodeDef) -> Result<Self, TaxonomyError> {
        let code = MessageCode::parse(def.code)?;
        if code.tag() != def.category.tag() {
            return Err(TaxonomyError::CategoryMismatch {
                code: def.code.to_owned(),
                expected: def.category.tag(),
                found: code.tag().to_owned(),
            });
        }
        Self::materialize(catalog, code, Some(def.category), def.default_severity)
    }

    fn materialize(
        catalog: &MessageCatalog,
        code: MessageCode,
        category: Option<ErrorCategory>,
        declared: Option<Severity>,
    ) -> Result<Self, TaxonomyError> {
        let template: Arc<str> = Arc::from(catalog.message(code.as_str())?);
        // The exception grammar always carries a status.
        let status = code.status().unwrap_or(500);
        let (severity, severity_source) =
            Severity::resolve(catalog.severity(code.as_str()), Some(status), declared)
                .unwrap_or((Severity::from_status(status), SeveritySource::Status));

        Ok(Self {
            code,
            category,
            status,
            severity,
            severity_source,
            message: template.to_string(),
            template,
            cause: None,
        })
    }

    /// Copy with `args` substituted into the catalog template.
    ///
    /// Always formats from the original template, so chained calls replace
    /// rather than accumulate.
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
    #[inline]
    pub fn code(&self) -> &MessageCode {
        &self.code
    }

    /// Category named by the code's tag.
    #[inline]
    pub fn category(&self) -> Option<ErrorCategory> {
        self.category
    }

    /// HTTP status from the code.
    #[inline]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Resolved severity.
    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Which rule produced [`PluginException::severity`].
    #[inline]
    pub fn severity_source(&self) -> SeveritySource {
        self.severity_source
    }

    /// Message, substituted if derived through `params`.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The unsubstituted catalog template.
    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Attached cause.
    #[inline]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Log at the resolved severity, attributed to `site`.
    ///
    /// Prefer the [`write_log!`](crate::write_log) macro, which fills in the
    /// enclosing function.
    pub fn write_log_at(&self, site: LogSite) {
        logging::emit(
            self.severity,
            &self.code,
            &site,
            &self.message,
            self.cause.as_ref(),
        );
    }

    /// Log at the resolved severity, attributed to the caller's file and line.
    #[track_caller]
    pub fn write_log(&self) {
        self.write_log_at(LogSite::caller());
    }
}

impl Display for PluginException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] - {}", self.code, self.message)
    }
}

impl Error for PluginException {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties;
    use std::io;
    use std::thread;

    fn catalog() -> MessageCatalog {
        MessageCatalog::builder()
            .severities(properties::parse(
                "io.personium.core.loglevel.PR404-OD-0002=ERROR\n",
            ))
            .messages(properties::parse(
                "io.personium.core.msg.PR404-OD-0002=Entity not found. {0}\n\
                 io.personium.core.msg.PR500-NW-0001=HTTP request failed. method=[{0}] url=[{1}]\n\
                 io.personium.core.msg.PR400-AN-0001=Password invalid.\n\
                 io.personium.core.msg.PR302-ZZ-0001=Moved.\n",
            ))
            .build()
    }

    #[test]
    fn create_resolves_status_category_and_severity() {
        let err = PluginException::create(&catalog(), "PR500-NW-0001").unwrap();
        assert_eq!(err.status(), 500);
        assert_eq!(err.category(), Some(ErrorCategory::NetWork));
        assert_eq!(err.severity(), Severity::Warn);
        assert_eq!(err.severity_source(), SeveritySource::Status);
        assert_eq!(err.message(), "HTTP request failed. method=[{0}] url=[{1}]");
    }

    #[test]
    fn four_hundreds_are_info() {
        let err = PluginException::create(&catalog(), "PR400-AN-0001").unwrap();
        assert_eq!(err.severity(), Severity::Info);
    }

    #[test]
    fn unknown_tag_and_unusual_status() {
        let err = PluginException::create(&catalog(), "PR302-ZZ-0001").unwrap();
        assert_eq!(err.status(), 302);
        assert_eq!(err.category(), None);
        assert_eq!(err.severity(), Severity::Warn);
    }

    #[test]
    fn explicit_override_beats_status() {
        let err = PluginException::create(&catalog(), "PR404-OD-0002").unwrap();
        assert_eq!(err.status(), 404);
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.severity_source(), SeveritySource::Override);
    }

    #[test]
    fn status_beats_declared_default() {
        const DEF: CodeDef = CodeDef {
            code: "PR400-AN-0001",
            category: ErrorCategory::Auth,
            default_severity: Some(Severity::Debug),
        };
        let err = PluginException::from_def(&catalog(), &DEF).unwrap();
        assert_eq!(err.severity(), Severity::Info);
        assert_eq!(err.severity_source(), SeveritySource::Status);
    }

    #[test]
    fn bad_code_fails_fast() {
        let err = PluginException::create(&catalog(), "BAD-CODE").unwrap_err();
        assert!(matches!(err, TaxonomyError::InvalidCode(ref e) if e.code == "BAD-CODE"));
    }

    #[test]
    fn missing_template_fails_fast() {
        let err = PluginException::create(&catalog(), "PR500-SV-0009").unwrap_err();
        assert!(matches!(err, TaxonomyError::Configuration(_)));
    }

    #[test]
    fn category_mismatch_is_rejected() {
        const DEF: CodeDef = CodeDef {
            code: "PR400-AN-0001",
            category: ErrorCategory::NetWork,
            default_severity: None,
        };
        let err = PluginException::from_def(&catalog(), &DEF).unwrap_err();
        assert!(matches!(
            err,
            TaxonomyError::CategoryMismatch { expected: "NW", ref found, .. } if found == "AN"
        ));
    }

    #[test]
    fn params_does_not_touch_receiver() {
        let base = PluginException::create(&catalog(), "PR500-NW-0001").unwrap();
        let first = base.params(&[&"GET", &"http://a"]);
        let second = base.params(&[&"POST", &"http://b"]);

        assert_eq!(base.message(), base.template());
        assert_eq!(first.message(), "HTTP request failed. method=[GET] url=[http://a]");
        assert_eq!(second.message(), "HTTP request failed. method=[POST] url=[http://b]");
        assert_eq!(first.code(), base.code());
        assert_eq!(first.status(), base.status());
    }

    #[test]
    fn params_formats_from_template() {
        let base = PluginException::create(&catalog(), "PR404-OD-0002").unwrap();
        let twice = base.params(&[&"one"]).params(&[&"two"]);
        assert_eq!(twice.message(), "Entity not found. two");
    }

    #[test]
    fn reason_round_trip_preserves_identity() {
        let base = PluginException::create(&catalog(), "PR404-OD-0002").unwrap();
        let with = base.reason(io::Error::other("disk"));
        assert!(base.cause().is_none());
        assert!(with.source().is_some());

        let cleared = with.with_cause(None);
        assert!(cleared.cause().is_none());
        assert_eq!(cleared.code(), base.code());
        assert_eq!(cleared.status(), base.status());
        assert_eq!(cleared.message(), base.message());
        assert_eq!(cleared.severity(), base.severity());
    }

    #[test]
    fn display_includes_code() {
        let err = PluginException::create(&catalog(), "PR404-OD-0002")
            .unwrap()
            .params(&[&"cell=x"]);
        assert_eq!(err.to_string(), "[PR404-OD-0002] - Entity not found. cell=x");
    }

    #[test]
    fn concurrent_derivations_do_not_cross_talk() {
        let base = Arc::new(PluginException::create(&catalog(), "PR404-OD-0002").unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let base = Arc::clone(&base);
                thread::spawn(move || {
                    (0..200)
                        .map(|n| {
                            let id = format!("{i}-{n}");
                            let derived = base.params(&[&id]);
                            derived.message() == format!("Entity not found. {id}")
                        })
                        .all(|ok| ok)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(base.message(), "Entity not found. {0}");
    }
}
