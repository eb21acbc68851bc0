//! Error types for session setup, cookie decoding and store access.

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by a [`PayloadStore`](crate::PayloadStore).
///
/// Mirrors the mapping used by the database store:
///
/// - Database errors → [`StoreError::Backend`]
/// - Serialization errors → [`StoreError::Encode`]
/// - Deserialization errors → [`StoreError::Decode`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing database is unreachable or rejected the statement.
    #[error("session store backend error: {0}")]
    Backend(String),

    /// The session payload could not be serialized.
    #[error("failed to encode session payload: {0}")]
    Encode(String),

    /// A stored session payload could not be deserialized.
    #[error("failed to decode session payload: {0}")]
    Decode(String),
}

/// A cookie value that could not be turned back into a session id.
///
/// Never fatal: the controller treats it as if no cookie was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The token was tampered with, corrupted, or sealed under another key.
    #[error("session cookie failed authentication")]
    InvalidCiphertext,

    /// The token authenticated but was issued longer ago than the cookie max age.
    #[error("session cookie is older than its max age")]
    Stale,
}

/// Top-level error type of the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration, detected at setup time.
    #[error("invalid session configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The process-wide session handle is already bound.
    #[error("global session alias `{0}` is already bound")]
    AliasConflict(String),

    /// [`global`](crate::global::global) was called before [`globalise`](crate::global::globalise).
    #[error("no global session handle bound; call `globalise` first")]
    NotGlobalised,

    /// A session value could not be converted to or from the requested type.
    #[error("session value conversion failed: {0}")]
    Value(#[from] serde_json::Error),

    /// [`Session::push`](crate::Session::push) targeted a key holding a non-array value.
    #[error("session key `{0}` does not hold an array")]
    NotAnArray(String),
}
