//! Error body exposed to hosts.
//!
//! ```json
//! {"code":"PR400-AN-0001","httpStatus":400,"message":"...","severity":"INFO"}
//! ```
//!
//! `oauthError` and `realm` appear only for authentication failures that
//! carry them.

use crate::auth::AuthPluginException;
use crate::catalog::Severity;
use crate::exception::PluginException;
use serde::{Deserialize, Serialize};

/// Serializable view of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Message code, or the OAuth2 tag when no code is attached.
    pub code: String,
    /// HTTP status.
    pub http_status: u16,
    /// Substituted, escaped message.
    pub message: String,
    /// Resolved severity.
    pub severity: Severity,
    /// OAuth2 `error` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_error: Option<String>,
    /// Challenge realm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
}

impl From<&PluginException> for ErrorResponse {
    fn from(err: &PluginException) -> Self {
        Self {
            code: err.code().to_string(),
            http_status: err.status(),
            message: err.message().to_owned(),
            severity: err.severity(),
            oauth_error: None,
            realm: None,
        }
    }
}

impl From<&AuthPluginException> for ErrorResponse {
    fn from(err: &AuthPluginException) -> Self {
        Self {
            code: err
                .code()
                .map_or_else(|| err.error_tag().to_owned(), ToString::to_string),
            http_status: err.status(),
            message: err.message().to_owned(),
            severity: err.severity(),
            oauth_error: Some(err.error_tag().to_owned()),
            realm: err.realm().map(str::to_owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Taxonomy, definitions};
    use serde_json::json;

    #[test]
    fn plugin_exception_body() {
        let taxonomy = Taxonomy::bundled().unwrap();
        let err = taxonomy.raise(&definitions::NO_SUCH_ENTITY).params(&[&"Box('a')"]);
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(
            body,
            json!({
                "code": "PR404-OD-0002",
                "httpStatus": 404,
                "message": "Entity not found. Box('a')",
                "severity": "INFO",
            })
        );
    }

    #[test]
    fn auth_exception_body() {
        let err = AuthPluginException::invalid_grant("Authentication failed.")
            .with_realm("https://cell.example/");
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(
            body,
            json!({
                "code": "invalid_grant",
                "httpStatus": 400,
                "message": "Authentication failed.",
                "severity": "INFO",
                "oauthError": "invalid_grant",
                "realm": "https://cell.example/",
            })
        );
    }

    #[test]
    fn auth_exception_from_taxonomy_keeps_code() {
        let taxonomy = Taxonomy::bundled().unwrap();
        let err = AuthPluginException::from(&taxonomy.raise(&definitions::AUTHN_FAILED));
        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "PR401-AN-0003");
        assert_eq!(body.http_status, 401);
        assert_eq!(body.oauth_error.as_deref(), Some("unauthorized_client"));
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let body: ErrorResponse = serde_json::from_str(
            r#"{"code":"PR500-SV-0000","httpStatus":500,"message":"m","severity":"ERROR"}"#,
        )
        .unwrap();
        assert_eq!(body.severity, Severity::Error);
        assert!(body.realm.is_none());
    }
}
