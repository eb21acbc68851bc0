use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::cookie::Cookie;

use crate::controller::{SessionContext, SessionController};
use crate::error::{Error, Result, StoreError};

/// Keys scheduled to disappear when flash data ages.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct FlashKeys {
    /// Flashed during this request; survive the next save.
    new: Vec<String>,
    /// Flashed during the previous request; dropped at the next save.
    old: Vec<String>,
}

/// Session data as stored in the payload column, serialized with MessagePack.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Payload {
    data: HashMap<String, Value>,
    flash: FlashKeys,
}

impl Payload {
    pub(crate) fn encode(&self) -> Result<Vec<u8>, StoreError> {
        rmp_serde::to_vec(self).map_err(|e| StoreError::Encode(e.to_string()))
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn age_flash(&mut self) {
        for key in std::mem::take(&mut self.flash.old) {
            self.data.remove(&key);
        }
        self.flash.old = std::mem::take(&mut self.flash.new);
    }
}

fn add_key(keys: &mut Vec<String>, key: &str) {
    if !keys.iter().any(|k| k == key) {
        keys.push(key.to_string());
    }
}

fn remove_key(keys: &mut Vec<String>, key: &str) {
    keys.retain(|k| k != key);
}

/// The session bound to one request.
///
/// Obtained from [`SessionController::start`]. Changes stay in memory until
/// [`save`](Self::save) writes them back; a request that never saves leaves the
/// stored record untouched.
#[derive(Debug)]
pub struct Session {
    controller: SessionController,
    context: SessionContext,
    payload: Payload,
}

impl Session {
    pub(crate) fn new(
        controller: SessionController,
        context: SessionContext,
        payload: Payload,
    ) -> Self {
        Self {
            controller,
            context,
            payload,
        }
    }

    pub fn id(&self) -> &str {
        self.context.resolved_id()
    }

    /// True if the client presented a session the server no longer has.
    pub fn has_expired(&self) -> bool {
        self.context.expired()
    }

    /// True if the client presented a cookie that could not be decoded.
    pub fn decode_failed(&self) -> bool {
        self.context.decode_failed()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// The `Set-Cookie` directive the response must carry, if any.
    pub fn cookie(&self) -> Option<&Cookie<'static>> {
        self.context.set_cookie()
    }

    pub fn take_cookie(&mut self) -> Option<Cookie<'static>> {
        self.context.take_set_cookie()
    }

    /// Reads `key` as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.payload
            .data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Error::from)
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.payload.data.get(key)
    }

    /// Whether `key` is set to a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.payload.data.get(key).is_some_and(|value| !value.is_null())
    }

    pub fn all(&self) -> &HashMap<String, Value> {
        &self.payload.data
    }

    pub fn put<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.payload.data.insert(key.into(), value);
        Ok(())
    }

    /// Appends `value` to the array stored at `key`, creating it if needed.
    pub fn push<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(value)?;

        let slot = self
            .payload
            .data
            .entry(key.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if slot.is_null() {
            *slot = Value::Array(Vec::new());
        }

        match slot {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(Error::NotAnArray(key)),
        }
    }

    /// Removes `key` and returns its value as `T`.
    pub fn pull<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        self.payload
            .data
            .remove(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    pub fn forget(&mut self, key: &str) {
        self.payload.data.remove(key);
    }

    /// Removes all data, flash data included.
    pub fn flush(&mut self) {
        self.payload = Payload::default();
    }

    /// Sets `key` for this request and the next one.
    pub fn flash<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        self.put(key.clone(), value)?;
        add_key(&mut self.payload.flash.new, &key);
        remove_key(&mut self.payload.flash.old, &key);
        Ok(())
    }

    /// Sets `key` for this request only.
    pub fn now<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        self.put(key.clone(), value)?;
        add_key(&mut self.payload.flash.old, &key);
        Ok(())
    }

    /// Keeps all current flash data for one more request.
    pub fn reflash(&mut self) {
        let flash = &mut self.payload.flash;
        for key in std::mem::take(&mut flash.old) {
            add_key(&mut flash.new, &key);
        }
    }

    /// Keeps the given flash keys for one more request.
    pub fn keep<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let flash = &mut self.payload.flash;
        for key in keys {
            let key = key.as_ref();
            add_key(&mut flash.new, key);
            remove_key(&mut flash.old, key);
        }
    }

    /// Moves the session to a fresh id and issues a new cookie.
    ///
    /// With `destroy` the old record is deleted. Data does not carry over:
    /// the session continues empty under the new id.
    pub async fn regenerate(&mut self, destroy: bool) -> Result<&str> {
        let regenerated = self
            .controller
            .regenerate(self.context.resolved_id(), destroy)
            .await?;

        self.context.rebind(regenerated);
        self.payload = Payload::default();
        Ok(self.id())
    }

    /// Flushes the data and regenerates, destroying the old record.
    pub async fn invalidate(&mut self) -> Result<()> {
        self.flush();
        self.regenerate(true).await?;
        Ok(())
    }

    /// Ages flash data and writes the session back to the store.
    pub async fn save(&mut self) -> Result<()> {
        self.payload.age_flash();
        self.controller
            .persist(self.context.resolved_id(), &self.payload)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_survives_encoding() {
        let mut payload = Payload::default();
        payload.data.insert("user".into(), json!({"id": 7, "name": "ada"}));
        payload.data.insert("nothing".into(), Value::Null);
        payload.flash.new.push("notice".into());

        let decoded = Payload::decode(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn corrupt_payload_is_a_decode_error() {
        assert!(matches!(
            Payload::decode(b"\xc1not msgpack"),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn flash_keys_age_over_two_saves() {
        let mut payload = Payload::default();
        payload.data.insert("notice".into(), json!("saved"));
        payload.flash.new.push("notice".into());

        payload.age_flash();
        assert!(payload.data.contains_key("notice"));
        assert_eq!(payload.flash.old, vec!["notice".to_string()]);

        payload.age_flash();
        assert!(!payload.data.contains_key("notice"));
        assert!(payload.flash.old.is_empty());
        assert!(payload.flash.new.is_empty());
    }

    #[test]
    fn flash_key_helpers_do_not_duplicate() {
        let mut keys = vec!["a".to_string()];
        add_key(&mut keys, "a");
        add_key(&mut keys, "b");
        assert_eq!(keys, vec!["a", "b"]);
        remove_key(&mut keys, "a");
        assert_eq!(keys, vec!["b"]);
    }
}
