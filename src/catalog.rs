//! Message catalog - code to severity and code to message template.
//!
//! The catalog is built once from two property maps (severity levels and
//! message templates), optionally merged with an override pair, and is
//! read-only afterwards. It is an ordinary value: hosts construct it and pass
//! it to [`crate::registry::Taxonomy::build`] or the `create` constructors.
//!
//! # Keys
//!
//! - severity: `io.personium.core.loglevel.<code>` = `ERROR|WARN|INFO|DEBUG`
//!   (case-insensitive; anything else counts as absent)
//! - template: `io.personium.core.msg.<code>` = text with `{0}`, `{1}`, ...
//!
//! # Example
//!
//! ```rust
//! use plugin_errors::{MessageCatalog, Severity, properties};
//!
//! let catalog = MessageCatalog::builder()
//!     .severities(properties::parse("io.personium.core.loglevel.PR404-OD-0001=error"))
//!     .messages(properties::parse("io.personium.core.msg.PR404-OD-0001=Not found: {0}"))
//!     .build();
//!
//! assert_eq!(catalog.severity("PR404-OD-0001"), Some(Severity::Error));
//! assert_eq!(catalog.message("PR404-OD-0001").unwrap(), "Not found: {0}");
//! ```

use crate::config::{ConfigStore, keys};
use crate::properties::{self, Properties, PropertySource};
use crate::ConfigurationError;
use std::fmt;
use std::str::FromStr;

const BUNDLED_LOG_LEVELS: &str = include_str!("../resources/plugin-log-level.properties");
const BUNDLED_MESSAGES: &str = include_str!("../resources/plugin-messages.properties");

// ============================================================================
// Severity
// ============================================================================

/// Importance of an error or log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Failure that needs operator attention.
    Error,
    /// Unexpected but handled.
    Warn,
    /// Expected, client-caused outcome.
    Info,
    /// Diagnostic detail.
    Debug,
}

impl Severity {
    /// Infer severity from an HTTP status.
    ///
    /// 5xx is WARN, 4xx is INFO, anything else falls back to WARN.
    #[inline]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::Info,
            _ => Self::Warn,
        }
    }

    /// Upper-case name as written in the catalog.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Three-tier resolution: explicit override, then status inference,
    /// then the declared default.
    pub fn resolve(
        explicit: Option<Severity>,
        status: Option<u16>,
        declared: Option<Severity>,
    ) -> Option<(Severity, SeveritySource)> {
        if let Some(severity) = explicit {
            return Some((severity, SeveritySource::Override));
        }
        if let Some(status) = status {
            return Some((Self::from_status(status), SeveritySource::Status));
        }
        declared.map(|severity| (severity, SeveritySource::Declared))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [Self::Debug, Self::Info, Self::Warn, Self::Error]
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Where a resolved severity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeveritySource {
    /// Explicit `loglevel.<code>` catalog entry.
    Override,
    /// Inferred from the HTTP status.
    Status,
    /// The declared default in the code table.
    Declared,
    /// Nothing resolved; the WARN fallback applied.
    Fallback,
}

// ============================================================================
// Catalog
// ============================================================================

/// Read-only code → (severity, template) lookup.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    severities: Properties,
    messages: Properties,
}

impl MessageCatalog {
    /// Start building a catalog.
    pub fn builder() -> MessageCatalogBuilder {
        MessageCatalogBuilder::default()
    }

    /// Catalog from the resources shipped with this crate.
    pub fn bundled() -> Self {
        Self::builder()
            .severities(properties::parse(BUNDLED_LOG_LEVELS))
            .messages(properties::parse(BUNDLED_MESSAGES))
            .build()
    }

    /// Load both maps from sources.
    ///
    /// # Errors
    ///
    /// Any source failure is fatal: a catalog without its resources cannot
    /// serve requests.
    pub fn load(
        severities: &dyn PropertySource,
        messages: &dyn PropertySource,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::builder()
            .severities(severities.load()?)
            .messages(messages.load()?)
            .build())
    }

    /// Explicit severity for `code`, if the catalog names a valid one.
    pub fn severity(&self, code: &str) -> Option<Severity> {
        self.severities
            .get(&severity_key(code))
            .and_then(|level| level.parse().ok())
    }

    /// Message template for `code`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingMessage`] if the catalog has no template;
    /// the catalog is expected to be complete.
    pub fn message(&self, code: &str) -> Result<&str, ConfigurationError> {
        self.messages
            .get(&message_key(code))
            .map(String::as_str)
            .ok_or_else(|| ConfigurationError::MissingMessage {
                code: code.to_owned(),
            })
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if no templates are loaded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Builder merging a default and an override layer.
///
/// Override entries replace default entries key by key.
#[derive(Debug, Default)]
pub struct MessageCatalogBuilder {
    severities: Properties,
    messages: Properties,
    severity_overrides: Properties,
    message_overrides: Properties,
}

impl MessageCatalogBuilder {
    /// Default severity map.
    pub fn severities(mut self, props: Properties) -> Self {
        self.severities = props;
        self
    }

    /// Default template map.
    pub fn messages(mut self, props: Properties) -> Self {
        self.messages = props;
        self
    }

    /// Override severity map.
    pub fn severity_overrides(mut self, props: Properties) -> Self {
        self.severity_overrides.extend(props);
        self
    }

    /// Override template map.
    pub fn message_overrides(mut self, props: Properties) -> Self {
        self.message_overrides.extend(props);
        self
    }

    /// Lift `loglevel.*` and `msg.*` keys from the effective configuration
    /// into the override layer.
    pub fn with_config_overrides(mut self, config: &ConfigStore) -> Self {
        for (key, value) in config.snapshot() {
            if key.starts_with(keys::LOG_LEVEL) {
                self.severity_overrides.insert(key, value);
            } else if key.starts_with(keys::LOG_MESSAGE) {
                self.message_overrides.insert(key, value);
            }
        }
        self
    }

    /// Merge the layers.
    pub fn build(self) -> MessageCatalog {
        let mut severities = self.severities;
        severities.extend(self.severity_overrides);
        let mut messages = self.messages;
        messages.extend(self.message_overrides);
        MessageCatalog {
            severities,
            messages,
        }
    }
}

fn severity_key(code: &str) -> String {
    format!("{}{}", keys::LOG_LEVEL, code)
}

fn message_key(code: &str) -> String {
    format!("{}{}", keys::LOG_MESSAGE, code)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        MessageCatalog::builder()
            .severities(properties::parse(
                "io.personium.core.loglevel.PR404-OD-0001=Error\n\
                 io.personium.core.loglevel.PR500-SV-0001=bogus\n",
            ))
            .messages(properties::parse(
                "io.personium.core.msg.PR404-OD-0001=Entity [{0}] not found.\n\
                 io.personium.core.msg.PR500-SV-0001=Server error.\n",
            ))
            .build()
    }

    #[test]
    fn status_inference_rule() {
        assert_eq!(Severity::from_status(500), Severity::Warn);
        assert_eq!(Severity::from_status(503), Severity::Warn);
        assert_eq!(Severity::from_status(400), Severity::Info);
        assert_eq!(Severity::from_status(499), Severity::Info);
        assert_eq!(Severity::from_status(302), Severity::Warn);
        assert_eq!(Severity::from_status(200), Severity::Warn);
    }

    #[test]
    fn explicit_override_beats_status() {
        assert_eq!(
            Severity::resolve(Some(Severity::Error), Some(404), Some(Severity::Debug)),
            Some((Severity::Error, SeveritySource::Override))
        );
        assert_eq!(
            Severity::resolve(None, Some(404), Some(Severity::Debug)),
            Some((Severity::Info, SeveritySource::Status))
        );
        assert_eq!(
            Severity::resolve(None, None, Some(Severity::Debug)),
            Some((Severity::Debug, SeveritySource::Declared))
        );
        assert_eq!(Severity::resolve(None, None, None), None);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!(" DeBuG ".parse::<Severity>(), Ok(Severity::Debug));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn lookups_by_code() {
        let catalog = catalog();
        assert_eq!(catalog.severity("PR404-OD-0001"), Some(Severity::Error));
        assert_eq!(catalog.severity("PR500-SV-0001"), None);
        assert_eq!(catalog.severity("PR400-XX-0000"), None);
        assert_eq!(
            catalog.message("PR404-OD-0001").unwrap(),
            "Entity [{0}] not found."
        );
    }

    #[test]
    fn missing_template_is_a_configuration_error() {
        let err = catalog().message("PR400-XX-0000").unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::MissingMessage { ref code } if code == "PR400-XX-0000"
        ));
    }

    #[test]
    fn override_layer_wins_per_key() {
        let catalog = MessageCatalog::builder()
            .severities(properties::parse("io.personium.core.loglevel.PR400-AN-0001=INFO"))
            .messages(properties::parse(
                "io.personium.core.msg.PR400-AN-0001=default\n\
                 io.personium.core.msg.PR400-AN-0002=kept\n",
            ))
            .severity_overrides(properties::parse(
                "io.personium.core.loglevel.PR400-AN-0001=ERROR",
            ))
            .message_overrides(properties::parse(
                "io.personium.core.msg.PR400-AN-0001=overridden",
            ))
            .build();

        assert_eq!(catalog.severity("PR400-AN-0001"), Some(Severity::Error));
        assert_eq!(catalog.message("PR400-AN-0001").unwrap(), "overridden");
        assert_eq!(catalog.message("PR400-AN-0002").unwrap(), "kept");
    }

    #[test]
    fn config_keys_feed_the_override_layer() {
        let config = ConfigStore::from_layers(
            properties::parse("io.personium.core.loglevel.PR500-NW-0001=DEBUG"),
            properties::parse("io.personium.core.msg.PR500-NW-0001=from config"),
        );
        let catalog = MessageCatalog::builder()
            .messages(properties::parse("io.personium.core.msg.PR500-NW-0001=shipped"))
            .with_config_overrides(&config)
            .build();

        assert_eq!(catalog.severity("PR500-NW-0001"), Some(Severity::Debug));
        assert_eq!(catalog.message("PR500-NW-0001").unwrap(), "from config");
    }

    #[test]
    fn bundled_catalog_is_populated() {
        let catalog = MessageCatalog::bundled();
        assert!(!catalog.is_empty());
        assert!(catalog.message("PR400-AN-0001").is_ok());
    }
}
