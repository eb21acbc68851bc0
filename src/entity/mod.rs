//! Database entity models for gears-session.
//!
//! The store resolves the table name at runtime, so the entity is used for its
//! column identifiers and row decoding rather than its fixed table name.

/// Session entity model for Sea-ORM database interaction.
pub mod session;
