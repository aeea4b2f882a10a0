//! The authentication plugin contract.
//!
//! A host keeps a set of [`AuthPlugin`]s keyed by grant type. For a token
//! request it picks the plugin for the requested grant and hands it the raw
//! form parameters as [`Credentials`]. The plugin answers with an
//! [`AuthenticatedIdentity`] or an [`AuthPluginException`]; issuing tokens
//! and sessions stays with the host.
//!
//! # Example
//!
//! ```rust
//! use plugin_errors::auth::{
//!     AuthPlugin, AuthPluginException, AuthenticatedIdentity, Credentials, Plugin,
//! };
//!
//! struct Fixed;
//!
//! impl Plugin for Fixed {}
//!
//! impl AuthPlugin for Fixed {
//!     fn grant_type(&self) -> &str { "urn:x-example:fixed" }
//!     fn account_type(&self) -> &str { "fixed" }
//!
//!     fn authenticate(
//!         &self,
//!         credentials: &Credentials,
//!     ) -> Result<AuthenticatedIdentity, AuthPluginException> {
//!         match credentials.first("username") {
//!             Some(name) => Ok(AuthenticatedIdentity::new(name, self.account_type())),
//!             None => Err(AuthPluginException::invalid_request("username is required")),
//!         }
//!     }
//! }
//!
//! let creds = Credentials::from_urlencoded("grant_type=urn%3Ax-example%3Afixed&username=me");
//! let id = Fixed.authenticate(&creds).unwrap();
//! assert_eq!(id.account_name(), "me");
//! ```

mod error;
pub mod utils;

pub use error::{AuthPluginException, OAuth2Error};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Plugin type of authentication plugins.
pub const TYPE_AUTH: &str = "auth";
/// Identity attribute carrying an ID token.
pub const KEY_TOKEN: &str = "token";
/// Identity attribute naming the account.
pub const KEY_ACCOUNT: &str = "accountName";
/// Identity attribute naming the account type.
pub const KEY_ACCOUNT_TYPE: &str = "accountType";
/// Identity attribute naming the OIDC provider type.
pub const KEY_OIDC_TYPE: &str = "oidc";
/// Identity attribute carrying a message for the host.
pub const KEY_MESSAGE: &str = "message";

// ============================================================================
// Plugin Traits
// ============================================================================

/// Anything the host loads as a plugin.
pub trait Plugin: Send + Sync {
    /// Plugin type. Authentication plugins keep the default.
    fn plugin_type(&self) -> &str {
        TYPE_AUTH
    }
}

/// An authentication method.
///
/// `authenticate` may be called concurrently from many request threads;
/// implementations must not keep per-call state in `self`.
pub trait AuthPlugin: Plugin {
    /// Grant type this plugin handles, e.g. `password`.
    fn grant_type(&self) -> &str;

    /// Account type of the identities it produces.
    fn account_type(&self) -> &str;

    /// Authenticate raw request parameters.
    ///
    /// # Errors
    ///
    /// An [`AuthPluginException`] describing why the request was refused.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthenticatedIdentity, AuthPluginException>;
}

/// Source of plugin instances, implemented by the host's plugin manager.
pub trait AuthPluginLoader {
    /// Instantiate every available plugin.
    fn load_instances(&self) -> Vec<Box<dyn AuthPlugin>>;
}

// ============================================================================
// Credentials
// ============================================================================

/// Form parameters: each name maps to one or more values, in arrival order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    params: BTreeMap<String, Vec<String>>,
}

impl Credentials {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &str) -> Self {
        url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect()
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// Append a value under `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.entry(name.into()).or_default().push(value.into());
    }

    /// First value of `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of `name`; empty if absent.
    pub fn all(&self, name: &str) -> &[String] {
        self.params
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True if `name` was sent at least once.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Parameter names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if no parameters were sent.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Credentials
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut credentials = Self::new();
        for (name, value) in iter {
            credentials.append(name, value);
        }
        credentials
    }
}

impl fmt::Debug for Credentials {
    // Values are secrets; only names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.params.keys()).finish()
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Result of a successful authentication.
///
/// An open attribute map in which [`KEY_ACCOUNT`] and [`KEY_ACCOUNT_TYPE`]
/// are reserved. Serializes as that map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthenticatedIdentity {
    attributes: BTreeMap<String, String>,
}

impl AuthenticatedIdentity {
    /// Identity for `account_name` of `account_type`.
    pub fn new(account_name: impl Into<String>, account_type: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(KEY_ACCOUNT.to_owned(), account_name.into());
        attributes.insert(KEY_ACCOUNT_TYPE.to_owned(), account_type.into());
        Self { attributes }
    }

    /// Add an extra claim. Reserved keys are left unchanged.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if key != KEY_ACCOUNT && key != KEY_ACCOUNT_TYPE {
            self.attributes.insert(key, value.into());
        }
        self
    }

    /// Account name.
    pub fn account_name(&self) -> &str {
        self.attribute(KEY_ACCOUNT).unwrap_or_default()
    }

    /// Account type.
    pub fn account_type(&self) -> &str {
        self.attribute(KEY_ACCOUNT_TYPE).unwrap_or_default()
    }

    /// Any attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_keys_are_stable() {
        assert_eq!(TYPE_AUTH, "auth");
        assert_eq!(KEY_TOKEN, "token");
        assert_eq!(KEY_ACCOUNT, "accountName");
        assert_eq!(KEY_ACCOUNT_TYPE, "accountType");
        assert_eq!(KEY_OIDC_TYPE, "oidc");
        assert_eq!(KEY_MESSAGE, "message");
    }

    #[test]
    fn urlencoded_multimap() {
        let creds = Credentials::from_urlencoded("scope=a&username=u%40x&scope=b+c&empty=");
        assert_eq!(creds.first("username"), Some("u@x"));
        assert_eq!(creds.all("scope"), ["a", "b c"]);
        assert_eq!(creds.first("empty"), Some(""));
        assert!(creds.contains("empty"));
        assert!(!creds.contains("password"));
        assert!(creds.all("password").is_empty());
        assert_eq!(creds.len(), 3);
    }

    #[test]
    fn collect_from_pairs() {
        let creds: Credentials = [("username", "u"), ("password", "p")].into_iter().collect();
        assert_eq!(creds, Credentials::new().with("username", "u").with("password", "p"));
    }

    #[test]
    fn debug_hides_values() {
        let creds = Credentials::new().with("password", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("password"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn identity_reserved_keys() {
        let id = AuthenticatedIdentity::new("u", "basic")
            .with_attribute(KEY_OIDC_TYPE, "google")
            .with_attribute(KEY_ACCOUNT, "mallory");
        assert_eq!(id.account_name(), "u");
        assert_eq!(id.account_type(), "basic");
        assert_eq!(id.attribute(KEY_OIDC_TYPE), Some("google"));
    }

    #[test]
    fn identity_serializes_as_map() {
        let id = AuthenticatedIdentity::new("u", "basic").with_attribute("email", "u@x");
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"accountName": "u", "accountType": "basic", "email": "u@x"})
        );
        let back: AuthenticatedIdentity = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn default_plugin_type_is_auth() {
        struct Nop;
        impl Plugin for Nop {}
        assert_eq!(Nop.plugin_type(), TYPE_AUTH);
    }
}
