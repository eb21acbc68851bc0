use std::fmt;

use serde::Deserialize;
use time::Duration;

use crate::error::{Error, Result};

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "gears-session";

/// Default name of the session table.
pub const DEFAULT_TABLE: &str = "sessions";

/// Default GC threshold, in seconds.
pub const DEFAULT_LIFETIME_SECS: u64 = 120;

/// Cipher used to seal the session id inside the cookie.
///
/// Only meaningful together with an encryption key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Cipher {
    /// Authenticated encryption; the id is not readable by the client.
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,

    /// HMAC signature; the id stays readable but cannot be forged.
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
}

/// Session configuration.
///
/// Every field has a default, so only the options that differ need setting,
/// either with the `with_*` methods or by deserializing the camelCase option
/// names (`table`, `cookieName`, `lifetime`, `path`, `domain`, `secure`,
/// `encryptionKey`, `cipher`, `cookieLifetime`, `createTable`).
///
/// ```
/// use gears_session::SessionConfig;
///
/// let config = SessionConfig::default()
///     .with_table_name("app_sessions")
///     .with_lifetime(3600)
///     .with_secure(true);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the table holding session rows.
    pub table: String,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Seconds of inactivity after which GC reclaims a row.
    pub lifetime: u64,
    /// Cookie `Path` attribute.
    pub path: String,
    /// Cookie `Domain` attribute.
    pub domain: Option<String>,
    /// Cookie `Secure` attribute.
    pub secure: bool,
    /// Master key for the cookie codec, at least 64 bytes. `None` sends ids in the clear.
    pub encryption_key: Option<String>,
    /// Cipher paired with `encryption_key`.
    pub cipher: Option<Cipher>,
    /// Cookie `Max-Age` in seconds. `None` issues a browser-session cookie.
    pub cookie_lifetime: Option<u64>,
    /// Create the session table on connect if it is missing.
    pub create_table: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            lifetime: DEFAULT_LIFETIME_SECS,
            path: "/".to_string(),
            domain: None,
            secure: false,
            encryption_key: None,
            cipher: None,
            cookie_lifetime: None,
            create_table: true,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("table", &self.table)
            .field("cookie_name", &self.cookie_name)
            .field("lifetime", &self.lifetime)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("secure", &self.secure)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "<redacted>"),
            )
            .field("cipher", &self.cipher)
            .field("cookie_lifetime", &self.cookie_lifetime)
            .field("create_table", &self.create_table)
            .finish()
    }
}

impl SessionConfig {
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Sets the GC threshold in seconds.
    pub fn with_lifetime(mut self, seconds: u64) -> Self {
        self.lifetime = seconds;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Enables the cookie codec with the given master key.
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    pub fn with_cipher(mut self, cipher: Cipher) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Gives the cookie an explicit `Max-Age`/`Expires` in seconds.
    pub fn with_cookie_lifetime(mut self, seconds: u64) -> Self {
        self.cookie_lifetime = Some(seconds);
        self
    }

    pub fn with_create_table(mut self, create_table: bool) -> Self {
        self.create_table = create_table;
        self
    }

    /// GC threshold as a duration.
    pub fn lifetime(&self) -> Duration {
        Duration::seconds(i64::try_from(self.lifetime).unwrap_or(i64::MAX))
    }

    /// Cookie max age as a duration, if configured.
    pub fn cookie_max_age(&self) -> Option<Duration> {
        self.cookie_lifetime
            .map(|secs| Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)))
    }

    /// Checks the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.table.is_empty()
            || !self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Config(format!(
                "table name `{}` must be non-empty and contain only [A-Za-z0-9_]",
                self.table
            )));
        }

        if self.cookie_name.is_empty() || !self.cookie_name.chars().all(is_token_char) {
            return Err(Error::Config(format!(
                "cookie name `{}` is not a valid cookie token",
                self.cookie_name
            )));
        }

        if self.lifetime == 0 {
            return Err(Error::Config("lifetime must be at least one second".into()));
        }

        if !self.path.starts_with('/') {
            return Err(Error::Config(format!(
                "cookie path `{}` must start with `/`",
                self.path
            )));
        }

        if matches!(self.domain.as_deref(), Some("")) {
            return Err(Error::Config("cookie domain must not be empty".into()));
        }

        match (&self.encryption_key, self.cipher) {
            (None, Some(cipher)) => {
                return Err(Error::Config(format!(
                    "cipher {cipher:?} configured without an encryption key"
                )));
            }
            (Some(key), _) if key.len() < 64 => {
                return Err(Error::Config(format!(
                    "encryption key must be at least 64 bytes, got {}",
                    key.len()
                )));
            }
            _ => {}
        }

        Ok(())
    }
}

// RFC 6265 cookie-name token characters.
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?={}".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_options() {
        let config = SessionConfig::default();
        assert_eq!(config.table, "sessions");
        assert_eq!(config.cookie_name, "gears-session");
        assert_eq!(config.lifetime, 120);
        assert_eq!(config.path, "/");
        assert_eq!(config.cookie_max_age(), None);
        assert!(config.create_table);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserializes_camel_case_options() {
        let config: SessionConfig = serde_json::from_str(
            r#"{
                "table": "web_sessions",
                "cookieName": "sid",
                "lifetime": 900,
                "domain": "example.com",
                "secure": true,
                "cipher": "hmac-sha256",
                "encryptionKey": "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
            }"#,
        )
        .unwrap();

        assert_eq!(config.table, "web_sessions");
        assert_eq!(config.cookie_name, "sid");
        assert_eq!(config.lifetime(), Duration::seconds(900));
        assert_eq!(config.path, "/");
        assert_eq!(config.domain.as_deref(), Some("example.com"));
        assert_eq!(config.cipher, Some(Cipher::HmacSha256));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_options() {
        let parsed = serde_json::from_str::<SessionConfig>(r#"{"driver": "file"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn cipher_requires_key() {
        let config = SessionConfig::default().with_cipher(Cipher::Aes256Gcm);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn short_key_is_rejected() {
        let config = SessionConfig::default().with_encryption_key("too short");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_bad_names() {
        for config in [
            SessionConfig::default().with_table_name(""),
            SessionConfig::default().with_table_name("sessions; drop"),
            SessionConfig::default().with_cookie_name("my session"),
            SessionConfig::default().with_cookie_name("a=b"),
            SessionConfig::default().with_path("relative"),
            SessionConfig::default().with_lifetime(0),
        ] {
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{config:?}");
        }
    }

    #[test]
    fn debug_redacts_key() {
        let key = "k".repeat(64);
        let config = SessionConfig::default().with_encryption_key(key.clone());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(&key));
        assert!(rendered.contains("<redacted>"));
    }
}
