//! OAuth2-flavored authentication failures.

use crate::catalog::{Severity, SeveritySource};
use crate::codes::MessageCode;
use crate::exception::PluginException;
use crate::Cause;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// RFC 6749 §5.2 error kinds, each a fixed (tag, status) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuth2Error {
    /// `invalid_request`, 400.
    InvalidRequest,
    /// `invalid_client`, 400.
    InvalidClient,
    /// `invalid_grant`, 400.
    InvalidGrant,
    /// `unauthorized_client`, 401.
    UnauthorizedClient,
    /// `access_denied`, 401.
    AccessDenied,
    /// `unsupported_grant_type`, 400.
    UnsupportedGrantType,
    /// `unsupported_response_type`, 400.
    UnsupportedResponseType,
    /// `invalid_scope`, 400.
    InvalidScope,
    /// `server_error`, 500.
    ServerError,
    /// `temporarily_unavailable`, 503.
    TemporarilyUnavailable,
}

impl OAuth2Error {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::InvalidRequest,
        Self::InvalidClient,
        Self::InvalidGrant,
        Self::UnauthorizedClient,
        Self::AccessDenied,
        Self::UnsupportedGrantType,
        Self::UnsupportedResponseType,
        Self::InvalidScope,
        Self::ServerError,
        Self::TemporarilyUnavailable,
    ];

    /// The `error` value sent to OAuth2 clients.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
            Self::TemporarilyUnavailable => "temporarily_unavailable",
        }
    }

    /// HTTP status paired with the tag.
    pub const fn status(self) -> u16 {
        match self {
            Self::InvalidRequest
            | Self::InvalidClient
            | Self::InvalidGrant
            | Self::UnsupportedGrantType
            | Self::UnsupportedResponseType
            | Self::InvalidScope => 400,
            Self::UnauthorizedClient | Self::AccessDenied => 401,
            Self::ServerError => 500,
            Self::TemporarilyUnavailable => 503,
        }
    }

    /// Kind for an `error` value.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for OAuth2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Failure returned by [`super::AuthPlugin::authenticate`].
///
/// Carries the OAuth2 error kind and its status, an optional taxonomy code
/// when built from a [`PluginException`], and an optional realm for the
/// `WWW-Authenticate` challenge. Like every record in this crate it is a
/// value: `with_realm` and `reason` return copies.
#[derive(Debug, Clone)]
#[must_use = "authentication failures should be returned to the host"]
pub struct AuthPluginException {
    kind: OAuth2Error,
    code: Option<MessageCode>,
    message: String,
    severity: Severity,
    severity_source: SeveritySource,
    realm: Option<String>,
    cause: Option<Cause>,
}

macro_rules! kind_constructors {
    ($($(#[$doc:meta])* $name:ident => $kind:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(OAuth2Error::$kind, message)
            }
        )+
    };
}

impl AuthPluginException {
    /// Failure of `kind` with a free-form message.
    ///
    /// Severity is inferred from the kind's status.
    pub fn new(kind: OAuth2Error, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            severity: Severity::from_status(kind.status()),
            severity_source: SeveritySource::Status,
            realm: None,
            cause: None,
        }
    }

    /// Failure of `kind` reported with a taxonomy exception's code, message
    /// and cause.
    ///
    /// An explicit catalog severity on `exception` is kept; otherwise the
    /// severity is re-inferred from the OAuth2 status. The code is only
    /// carried when its status group equals `kind`'s status, so a reported
    /// code never contradicts the HTTP status.
    pub fn from_exception(kind: OAuth2Error, exception: &PluginException) -> Self {
        let (severity, severity_source) = match exception.severity_source() {
            SeveritySource::Override => (exception.severity(), SeveritySource::Override),
            _ => (Severity::from_status(kind.status()), SeveritySource::Status),
        };
        let code = (exception.status() == kind.status()).then(|| exception.code().clone());
        if code.is_none() {
            tracing::debug!(
                code = %exception.code(),
                kind = kind.tag(),
                "status mismatch, code not carried"
            );
        }
        Self {
            kind,
            code,
            message: exception.message().to_owned(),
            severity,
            severity_source,
            realm: None,
            cause: exception.cause().cloned(),
        }
    }

    kind_constructors! {
        /// `invalid_request` failure.
        invalid_request => InvalidRequest,
        /// `invalid_client` failure.
        invalid_client => InvalidClient,
        /// `invalid_grant` failure.
        invalid_grant => InvalidGrant,
        /// `unauthorized_client` failure.
        unauthorized_client => UnauthorizedClient,
        /// `access_denied` failure.
        access_denied => AccessDenied,
        /// `unsupported_grant_type` failure.
        unsupported_grant_type => UnsupportedGrantType,
        /// `unsupported_response_type` failure.
        unsupported_response_type => UnsupportedResponseType,
        /// `invalid_scope` failure.
        invalid_scope => InvalidScope,
        /// `server_error` failure.
        server_error => ServerError,
        /// `temporarily_unavailable` failure.
        temporarily_unavailable => TemporarilyUnavailable,
    }

    /// Copy carrying `realm` for the challenge header.
    pub fn with_realm(&self, realm: impl Into<String>) -> Self {
        Self {
            realm: Some(realm.into()),
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

    /// OAuth2 error kind.
    pub fn kind(&self) -> OAuth2Error {
        self.kind
    }

    /// OAuth2 `error` value.
    pub fn error_tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// HTTP status of the kind.
    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Taxonomy code, if built from a [`PluginException`].
    pub fn code(&self) -> Option<&MessageCode> {
        self.code.as_ref()
    }

    /// Message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Resolved severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Which rule produced [`AuthPluginException::severity`].
    pub fn severity_source(&self) -> SeveritySource {
        self.severity_source
    }

    /// Challenge realm.
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// Attached cause.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl From<&PluginException> for AuthPluginException {
    /// Picks the kind from the exception's status: 401 is `unauthorized_client`,
    /// 503 `temporarily_unavailable`, other 4xx `invalid_request`, the rest
    /// `server_error`.
    fn from(exception: &PluginException) -> Self {
        let kind = match exception.status() {
            401 => OAuth2Error::UnauthorizedClient,
            503 => OAuth2Error::TemporarilyUnavailable,
            400..=499 => OAuth2Error::InvalidRequest,
            _ => OAuth2Error::ServerError,
        };
        Self::from_exception(kind, exception)
    }
}

impl fmt::Display for AuthPluginException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} [{}] - {}", self.kind, code, self.message),
            None => write!(f, "{} - {}", self.kind, self.message),
        }
    }
}

impl Error for AuthPluginException {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

// ============================================================================
// Tests
// ============================================================================
