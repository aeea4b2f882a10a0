//! Process configuration - a default layer and an override layer.
//!
//! The effective value of a key is the override value if present, else the
//! default. Both layers are re-read together by [`ConfigStore::reload`] and
//! swapped under one write lock, so readers observe either the complete old
//! map or the complete new one.
//!
//! Secrets projected from configuration are returned as
//! [`Zeroizing`] strings so they are cleared when the caller drops them.

use crate::ConfigurationError;
use crate::properties::{FileSource, Optional, Properties, PropertySource, TextSource};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use zeroize::Zeroizing;

const BUNDLED_DEFAULTS: &str = include_str!("../resources/plugin-unit-config-default.properties");

/// Environment variable naming the override file.
pub const CONFIG_FILE_ENV: &str = "PERSONIUM_CONFIGURATION_FILE";

/// Override file looked up in the working directory when the variable is unset.
pub const DEFAULT_OVERRIDE_FILE: &str = "personium-unit-config.properties";

/// Configuration keys.
pub mod keys {
    /// Prefix of every key this crate reads.
    pub const KEY_ROOT: &str = "io.personium.core.";

    /// Core version.
    pub const CORE_VERSION: &str = "io.personium.core.version";
    /// Unit master token.
    pub const MASTER_TOKEN: &str = "io.personium.core.masterToken";
    /// Hosts trusted as unit-user token issuers.
    pub const UNIT_USER_ISSUERS: &str = "io.personium.core.unitUser.issuers";
    /// URL scheme of the unit.
    pub const UNIT_SCHEME: &str = "io.personium.core.unitScheme";
    /// Directory plugins are loaded from.
    pub const PLUGIN_PATH: &str = "io.personium.core.plugin.path";
    /// Salt appended to passwords before hashing.
    pub const AUTH_PASSWORD_SALT: &str = "io.personium.core.auth.password.salt";

    /// Severity entries; the message code follows the dot.
    pub const LOG_LEVEL: &str = "io.personium.core.loglevel.";
    /// Template entries; the message code follows the dot.
    pub const LOG_MESSAGE: &str = "io.personium.core.msg.";

    /// Outbound proxy settings.
    pub mod proxy {
        /// Proxy host name.
        pub const HOST_NAME: &str = "io.personium.core.proxy.host";
        /// Proxy port.
        pub const PORT_NUMBER: &str = "io.personium.core.proxy.port";
        /// Proxy user.
        pub const USER_NAME: &str = "io.personium.core.proxy.user";
        /// Proxy password.
        pub const USER_PSWD: &str = "io.personium.core.proxy.pswd";
    }
}

// ============================================================================
// Store
// ============================================================================

struct Layers {
    defaults: Properties,
    overrides: Properties,
    effective: Properties,
}

impl Layers {
    fn merge(defaults: Properties, overrides: Properties) -> Self {
        let mut effective = defaults.clone();
        for (key, value) in &overrides {
            tracing::debug!(key = %key, "overriding config");
            effective.insert(key.clone(), value.clone());
        }
        Self {
            defaults,
            overrides,
            effective,
        }
    }
}

/// Layered key/value configuration.
///
/// `Send + Sync`; share it behind an `Arc` or a reference.
pub struct ConfigStore {
    defaults_source: Box<dyn PropertySource>,
    overrides_source: Box<dyn PropertySource>,
    layers: RwLock<Layers>,
}

impl ConfigStore {
    /// Load both layers from their sources.
    ///
    /// # Errors
    ///
    /// Fails if either source fails. Wrap an override source in
    /// [`Optional`] to make its absence acceptable.
    pub fn load(
        defaults: impl PropertySource + 'static,
        overrides: impl PropertySource + 'static,
    ) -> Result<Self, ConfigurationError> {
        let layers = Layers::merge(defaults.load()?, overrides.load()?);
        Ok(Self {
            defaults_source: Box::new(defaults),
            overrides_source: Box::new(overrides),
            layers: RwLock::new(layers),
        })
    }

    /// Fixed layers with no backing resource; `reload` restores them.
    pub fn from_layers(defaults: Properties, overrides: Properties) -> Self {
        let layers = Layers::merge(defaults.clone(), overrides.clone());
        Self {
            defaults_source: Box::new(FixedSource(defaults)),
            overrides_source: Box::new(FixedSource(overrides)),
            layers: RwLock::new(layers),
        }
    }

    /// Shipped defaults plus the override file chosen from the environment.
    ///
    /// The file named by [`CONFIG_FILE_ENV`] is used when it exists;
    /// otherwise [`DEFAULT_OVERRIDE_FILE`] in the working directory, and if
    /// that is absent too the override layer is empty.
    ///
    /// # Errors
    ///
    /// Fails only if an override file exists but cannot be read.
    pub fn from_environment() -> Result<Self, ConfigurationError> {
        let override_path = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if Path::new(&path).is_file() => {
                tracing::info!(path = %path, "override config from environment");
                path
            }
            Ok(path) => {
                tracing::info!(path = %path, "configured override file missing, using default location");
                DEFAULT_OVERRIDE_FILE.to_owned()
            }
            Err(_) => DEFAULT_OVERRIDE_FILE.to_owned(),
        };
        Self::load(
            TextSource::new("plugin-unit-config-default.properties", BUNDLED_DEFAULTS),
            Optional(FileSource::new(override_path)),
        )
    }

    /// Re-read both layers and swap them in atomically.
    ///
    /// Values written with [`set`](Self::set) are discarded. On error the
    /// previous layers stay in place.
    ///
    /// # Errors
    ///
    /// Propagates the first source failure.
    pub fn reload(&self) -> Result<(), ConfigurationError> {
        let defaults = self.defaults_source.load()?;
        let overrides = self.overrides_source.load()?;
        let fresh = Layers::merge(defaults, overrides);
        *self.write() = fresh;
        Ok(())
    }

    /// Effective value for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read().effective.get(key).cloned()
    }

    /// Set an effective value until the next reload.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write().effective.insert(key.into(), value.into());
    }

    /// Copy of the whole effective map.
    pub fn snapshot(&self) -> Properties {
        self.read().effective.clone()
    }

    /// Value from the default layer only.
    pub fn default_value(&self, key: &str) -> Option<String> {
        self.read().defaults.get(key).cloned()
    }

    /// Value from the override layer only.
    pub fn override_value(&self, key: &str) -> Option<String> {
        self.read().overrides.get(key).cloned()
    }

    // ------------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------------

    /// Core version.
    pub fn core_version(&self) -> Option<String> {
        self.get(keys::CORE_VERSION)
    }

    /// Unit master token.
    pub fn master_token(&self) -> Option<Zeroizing<String>> {
        self.get(keys::MASTER_TOKEN).map(Zeroizing::new)
    }

    /// Hosts trusted as unit-user token issuers, split on whitespace.
    pub fn unit_user_issuers(&self) -> Vec<String> {
        self.get(keys::UNIT_USER_ISSUERS)
            .map(|raw| raw.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// URL scheme of the unit.
    pub fn unit_scheme(&self) -> Option<String> {
        self.get(keys::UNIT_SCHEME)
    }

    /// Plugin directory.
    pub fn plugin_path(&self) -> Option<String> {
        self.get(keys::PLUGIN_PATH)
    }

    /// Password hashing salt; empty when unset.
    pub fn auth_password_salt(&self) -> Zeroizing<String> {
        Zeroizing::new(self.get(keys::AUTH_PASSWORD_SALT).unwrap_or_default())
    }

    /// Proxy settings, read under one lock.
    pub fn proxy(&self) -> ProxySettings {
        let layers = self.read();
        let get = |key: &str| layers.effective.get(key).cloned();
        ProxySettings {
            host: get(keys::proxy::HOST_NAME),
            port: parse_port(get(keys::proxy::PORT_NUMBER).as_deref()),
            user: get(keys::proxy::USER_NAME),
            password: get(keys::proxy::USER_PSWD).map(Zeroizing::new),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Layers> {
        // A panic while holding the lock cannot leave a half-merged map:
        // writers only ever assign a fully built value.
        self.layers.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Layers> {
        self.layers.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("defaults", &self.defaults_source.describe())
            .field("overrides", &self.overrides_source.describe())
            .field("keys", &self.read().effective.len())
            .finish()
    }
}

struct FixedSource(Properties);

impl PropertySource for FixedSource {
    fn load(&self) -> Result<Properties, ConfigurationError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "<fixed>".to_owned()
    }
}

/// Non-numeric or absent port means "no proxy".
fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|port| port.trim().parse().ok()).unwrap_or(0)
}

// ============================================================================
// Proxy
// ============================================================================

/// Outbound proxy settings projected from configuration.
#[derive(Clone, Default)]
pub struct ProxySettings {
    /// Proxy host.
    pub host: Option<String>,
    /// Proxy port; 0 means unset.
    pub port: u16,
    /// Proxy user.
    pub user: Option<String>,
    /// Proxy password.
    pub password: Option<Zeroizing<String>>,
}

impl ProxySettings {
    /// True when a non-blank host and a positive port are configured.
    pub fn is_proxy_host(&self) -> bool {
        is_valid(self.host.as_deref()) && self.port > 0
    }

    /// User and password, only when a proxy is configured and both are non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if !self.is_proxy_host() {
            return None;
        }
        match (self.user.as_deref(), self.password.as_deref().map(String::as_str)) {
            (Some(user), Some(pswd)) if is_valid(Some(user)) && is_valid(Some(pswd)) => {
                Some((user, pswd))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

fn is_valid(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

// ============================================================================
// Tests
// ============================================================================
