//! # Plugin Errors
//!
//! Authentication plugin contract and the catalog-backed error/log taxonomy
//! shared by a platform host and its plugins.
//!
//! ## Design
//!
//! 1. **Codes are the wire identity.** Every error and log record carries a
//!    fixed-format code (`PR400-AN-0001`, `PL-SV-0001`); the HTTP status is
//!    part of the code itself.
//! 2. **Text lives in a catalog.** Severity and message templates are looked
//!    up in a [`MessageCatalog`] that operators can override per code without
//!    touching the code table.
//! 3. **Records are values.** [`PluginException`] and [`PluginLog`] are
//!    materialized once by the [`Taxonomy`]; every use site derives a copy
//!    with `params` or `reason`. Shared instances are never mutated.
//! 4. **Plugins see credentials, nothing else.** An [`auth::AuthPlugin`]
//!    receives raw form parameters and answers with an identity or an
//!    OAuth2-flavored [`auth::AuthPluginException`].
//!
//! ## Severity
//!
//! Resolved once per code, first match wins:
//!
//! - explicit `io.personium.core.loglevel.<code>` entry in the catalog
//! - inferred from the HTTP status: 4xx is INFO, anything else WARN
//! - the default declared in the code table
//! - WARN (log records only)
//!
//! ## Quick Start
//!
//! ```rust
//! use plugin_errors::{definitions, params, write_log, Severity, Taxonomy};
//!
//! let taxonomy = Taxonomy::bundled().unwrap();
//!
//! let err = params!(
//!     taxonomy.raise(&definitions::UNEXPECTED_RESPONSE),
//!     "https://idp.example",
//!     200,
//!     503
//! );
//! assert_eq!(err.status(), 500);
//! assert_eq!(err.severity(), Severity::Warn);
//!
//! // [PR500-NW-0002] - [my_crate::module#function:NN] - Unexpected response ...
//! write_log!(err);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::error::Error;
use std::sync::Arc;

pub mod auth;
pub mod catalog;
pub mod codes;
pub mod config;
pub mod convenience;
pub mod definitions;
pub mod exception;
pub mod logging;
pub mod properties;
pub mod registry;
pub mod response;

pub use catalog::{MessageCatalog, MessageCatalogBuilder, Severity, SeveritySource};
pub use codes::{CodeDef, ErrorCategory, InvalidCodeFormat, LogCategory, LogDef, MessageCode};
pub use config::{ConfigStore, ProxySettings};
pub use exception::PluginException;
pub use logging::{LogSite, PluginLog};
pub use registry::Taxonomy;
pub use response::ErrorResponse;

/// Type alias for results carrying a taxonomy exception.
pub type Result<T> = std::result::Result<T, PluginException>;

/// Shared, cloneable error cause attached with `reason`.
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

// ============================================================================
// Library Errors
// ============================================================================

/// A configuration or catalog resource could not be used.
///
/// Fatal: a process without its configuration cannot serve requests.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A required resource does not exist.
    #[error("resource not found: {path}")]
    ResourceNotFound {
        /// Path or name of the resource.
        path: String,
    },

    /// A resource exists but could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path of the resource.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The catalog has no template for a code.
    #[error("no message template for code [{code}]")]
    MissingMessage {
        /// The code looked up.
        code: String,
    },
}

/// The declared code table could not be materialized.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// A declared code violates the grammar.
    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeFormat),

    /// The catalog is incomplete for a declared code.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A declared code's tag disagrees with its declared category.
    #[error("code [{code}] declared in category {expected} but tagged {found}")]
    CategoryMismatch {
        /// The offending code.
        code: String,
        /// Tag of the declared category.
        expected: &'static str,
        /// Tag found in the code.
        found: String,
    },

    /// The same code was declared twice.
    #[error("code [{code}] declared more than once")]
    DuplicateCode {
        /// The repeated code.
        code: String,
    },
}
