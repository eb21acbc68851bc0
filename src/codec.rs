//! Optional encryption of the session id carried in the cookie.
//!
//! Without a key the codec is the identity. With a key the id is sealed with
//! the cookie crate's private (AES-256-GCM) or signed (HMAC-SHA256) jar, using
//! the cookie name as associated data, together with the time it was issued.

use std::fmt;

use time::{Duration, OffsetDateTime};
use tower_sessions::cookie::{Cookie, CookieJar, Key};

use crate::config::{Cipher, SessionConfig};
use crate::error::{DecodeError, Error, Result};

const ISSUED_SEPARATOR: char = '|';

#[derive(Clone)]
struct Seal {
    key: Key,
    cipher: Cipher,
}

/// Encodes session ids into cookie values and back.
#[derive(Clone)]
pub struct CookieCodec {
    name: String,
    seal: Option<Seal>,
    max_age: Option<Duration>,
}

impl fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieCodec")
            .field("name", &self.name)
            .field("cipher", &self.seal.as_ref().map(|seal| seal.cipher))
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl CookieCodec {
    /// A codec that passes ids through unchanged.
    pub fn plain(cookie_name: impl Into<String>) -> Self {
        Self {
            name: cookie_name.into(),
            seal: None,
            max_age: None,
        }
    }

    /// A codec sealing ids with `key` under `cipher`.
    pub fn sealed(cookie_name: impl Into<String>, key: Key, cipher: Cipher) -> Self {
        Self {
            name: cookie_name.into(),
            seal: Some(Seal { key, cipher }),
            max_age: None,
        }
    }

    /// Rejects sealed tokens issued longer than `max_age` ago.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Builds the codec described by `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let codec = match &config.encryption_key {
            None => Self::plain(config.cookie_name.clone()),
            Some(secret) => {
                let key = Key::try_from(secret.as_bytes())
                    .map_err(|e| Error::Config(format!("unusable encryption key: {e}")))?;
                Self::sealed(
                    config.cookie_name.clone(),
                    key,
                    config.cipher.unwrap_or_default(),
                )
            }
        };

        Ok(match config.cookie_max_age() {
            Some(max_age) => codec.with_max_age(max_age),
            None => codec,
        })
    }

    /// Whether ids are sealed before being sent to the client.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    pub fn encode(&self, id: &str) -> String {
        self.encode_at(id, OffsetDateTime::now_utc())
    }

    pub fn decode(&self, token: &str) -> Result<String, DecodeError> {
        self.decode_at(token, OffsetDateTime::now_utc())
    }

    fn encode_at(&self, id: &str, issued_at: OffsetDateTime) -> String {
        let Some(seal) = &self.seal else {
            return id.to_string();
        };

        let value = format!("{id}{ISSUED_SEPARATOR}{}", issued_at.unix_timestamp());
        let cookie = Cookie::new(self.name.clone(), value);

        let mut jar = CookieJar::new();
        match seal.cipher {
            Cipher::Aes256Gcm => jar.private_mut(&seal.key).add(cookie),
            Cipher::HmacSha256 => jar.signed_mut(&seal.key).add(cookie),
        }

        jar.get(&self.name)
            .map(|sealed| sealed.value().to_string())
            .unwrap_or_default()
    }

    fn decode_at(&self, token: &str, now: OffsetDateTime) -> Result<String, DecodeError> {
        let Some(seal) = &self.seal else {
            return Ok(token.to_string());
        };

        let jar = CookieJar::new();
        let cookie = Cookie::new(self.name.clone(), token.to_string());
        let opened = match seal.cipher {
            Cipher::Aes256Gcm => jar.private(&seal.key).decrypt(cookie),
            Cipher::HmacSha256 => jar.signed(&seal.key).verify(cookie),
        }
        .ok_or(DecodeError::InvalidCiphertext)?;

        let (id, issued_at) = opened
            .value()
            .rsplit_once(ISSUED_SEPARATOR)
            .ok_or(DecodeError::InvalidCiphertext)?;
        let issued_at: i64 = issued_at
            .parse()
            .map_err(|_| DecodeError::InvalidCiphertext)?;

        if let Some(max_age) = self.max_age {
            if now.unix_timestamp() - issued_at > max_age.whole_seconds() {
                return Err(DecodeError::Stale);
            }
        }

        Ok(id.to_string())
    }
}
