//! The materialized taxonomy: one exception or log record per declared code.
//!
//! Built once at startup from the declarative tables in
//! [`crate::definitions`] and a [`MessageCatalog`]. Construction is
//! fail-fast: the first bad code, missing template, category mismatch or
//! duplicate aborts the build.

use crate::catalog::MessageCatalog;
use crate::codes::{CodeDef, LogDef};
use crate::definitions::{self, EXCEPTION_CODES, LOG_CODES};
use crate::exception::PluginException;
use crate::logging::PluginLog;
use crate::TaxonomyError;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Read-only code → record lookup.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    exceptions: HashMap<&'static str, PluginException>,
    logs: HashMap<&'static str, PluginLog>,
    unknown: PluginException,
}

impl Taxonomy {
    /// Materialize `exceptions` and `logs` against `catalog`.
    ///
    /// The catalog must also template [`definitions::UNKNOWN_ERROR`], which
    /// stands in for codes that were never registered.
    ///
    /// # Errors
    ///
    /// The first [`TaxonomyError`] encountered.
    pub fn build(
        catalog: &MessageCatalog,
        exceptions: &[CodeDef],
        logs: &[LogDef],
    ) -> Result<Self, TaxonomyError> {
        let mut exception_map = HashMap::with_capacity(exceptions.len());
        for def in exceptions {
            let exception = PluginException::from_def(catalog, def)?;
            insert_unique(&mut exception_map, def.code, exception)?;
        }

        let mut log_map = HashMap::with_capacity(logs.len());
        for def in logs {
            let record = PluginLog::from_def(catalog, def)?;
            insert_unique(&mut log_map, def.code, record)?;
        }

        let unknown = match exception_map.get(definitions::UNKNOWN_ERROR.code) {
            Some(unknown) => unknown.clone(),
            None => PluginException::from_def(catalog, &definitions::UNKNOWN_ERROR)?,
        };

        tracing::debug!(
            exceptions = exception_map.len(),
            logs = log_map.len(),
            "taxonomy built"
        );

        Ok(Self {
            exceptions: exception_map,
            logs: log_map,
            unknown,
        })
    }

    /// The shipped tables against the shipped catalog.
    ///
    /// # Errors
    ///
    /// Only if the shipped resources are inconsistent.
    pub fn bundled() -> Result<Self, TaxonomyError> {
        Self::build(&MessageCatalog::bundled(), EXCEPTION_CODES, LOG_CODES)
    }

    /// The shipped tables against a host-supplied catalog.
    ///
    /// # Errors
    ///
    /// The first code the catalog cannot serve.
    pub fn with_catalog(catalog: &MessageCatalog) -> Result<Self, TaxonomyError> {
        Self::build(catalog, EXCEPTION_CODES, LOG_CODES)
    }

    /// Registered exception for `def`.
    pub fn exception(&self, def: &CodeDef) -> Option<&PluginException> {
        self.exceptions.get(def.code)
    }

    /// Registered exception by code string.
    pub fn exception_by_code(&self, code: &str) -> Option<&PluginException> {
        self.exceptions.get(code)
    }

    /// Copy of the exception for `def`, ready to derive from.
    ///
    /// An unregistered code yields the unknown-error exception naming it,
    /// so raising never fails.
    pub fn raise(&self, def: &CodeDef) -> PluginException {
        match self.exceptions.get(def.code) {
            Some(exception) => exception.clone(),
            None => {
                tracing::warn!(code = def.code, "raising unregistered code");
                self.unknown.params(&[&def.code])
            }
        }
    }

    /// Registered log record for `def`.
    pub fn log(&self, def: &LogDef) -> Option<&PluginLog> {
        self.logs.get(def.code)
    }

    /// Registered log record by code string.
    pub fn log_by_code(&self, code: &str) -> Option<&PluginLog> {
        self.logs.get(code)
    }

    /// All registered exceptions, in no particular order.
    pub fn exceptions(&self) -> impl Iterator<Item = &PluginException> {
        self.exceptions.values()
    }

    /// Number of registered exceptions and log records.
    pub fn len(&self) -> usize {
        self.exceptions.len() + self.logs.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty() && self.logs.is_empty()
    }
}

fn insert_unique<V>(
    map: &mut HashMap<&'static str, V>,
    code: &'static str,
    value: V,
) -> Result<(), TaxonomyError> {
    match map.entry(code) {
        Entry::Occupied(_) => Err(TaxonomyError::DuplicateCode {
            code: code.to_owned(),
        }),
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::log;
    use crate::{ErrorCategory, LogCategory, Severity, SeveritySource, properties};

    #[test]
    fn bundled_taxonomy_builds() {
        let taxonomy = Taxonomy::bundled().unwrap();
        assert_eq!(taxonomy.len(), EXCEPTION_CODES.len() + LOG_CODES.len());

        let invalid = taxonomy.exception(&definitions::PASSWORD_INVALID).unwrap();
        assert_eq!(invalid.status(), 400);
        assert_eq!(invalid.category(), Some(ErrorCategory::Auth));
        assert_eq!(invalid.severity(), Severity::Info);
    }

    #[test]
    fn bundled_overrides_are_applied() {
        let taxonomy = Taxonomy::bundled().unwrap();

        let unknown = taxonomy.raise(&definitions::UNKNOWN_ERROR);
        assert_eq!(unknown.severity(), Severity::Error);
        assert_eq!(unknown.severity_source(), SeveritySource::Override);

        let sql = taxonomy.log(&log::server::JDBC_EXEC_SQL).unwrap();
        assert_eq!(sql.severity(), Severity::Debug);

        let plain = taxonomy.log(&log::dav::ROLE_NOT_FOUND).unwrap();
        assert_eq!(plain.severity(), Severity::Warn);
    }

    #[test]
    fn raise_returns_independent_copies() {
        let taxonomy = Taxonomy::bundled().unwrap();
        let derived = taxonomy
            .raise(&definitions::NO_SUCH_ENTITY)
            .params(&[&"Box('x')"]);
        let registered = taxonomy.exception(&definitions::NO_SUCH_ENTITY).unwrap();
        assert_ne!(derived.message(), registered.message());
        assert_eq!(registered.message(), registered.template());
    }

    #[test]
    fn unregistered_code_raises_unknown_error() {
        let taxonomy = Taxonomy::bundled().unwrap();
        const STRAY: CodeDef = CodeDef {
            code: "PR418-MC-0099",
            category: ErrorCategory::Misc,
            default_severity: None,
        };
        let raised = taxonomy.raise(&STRAY);
        assert_eq!(raised.code().as_str(), definitions::UNKNOWN_ERROR.code);
        assert!(raised.message().contains("PR418-MC-0099"));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let catalog = MessageCatalog::bundled();
        let err = Taxonomy::build(
            &catalog,
            &[definitions::AUTHN_FAILED, definitions::AUTHN_FAILED],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, TaxonomyError::DuplicateCode { ref code } if code == "PR401-AN-0003"));
    }

    #[test]
    fn bad_grammar_is_rejected() {
        const BAD: LogDef = LogDef {
            code: "PL-SV-01",
            category: LogCategory::Server,
            default_severity: None,
        };
        let err = Taxonomy::build(&MessageCatalog::bundled(), &[], &[BAD]).unwrap_err();
        assert!(matches!(err, TaxonomyError::InvalidCode(_)));
    }

    #[test]
    fn incomplete_catalog_is_rejected() {
        let catalog = MessageCatalog::builder()
            .messages(properties::parse(
                "io.personium.core.msg.PR500-SV-0000=Unknown error. {0}\n",
            ))
            .build();
        let err = Taxonomy::build(&catalog, &[definitions::AUTHN_FAILED], &[]).unwrap_err();
        assert!(matches!(err, TaxonomyError::Configuration(_)));

        let empty = MessageCatalog::default();
        assert!(Taxonomy::build(&empty, &[], &[]).is_err());
    }
}
