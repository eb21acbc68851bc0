//! Optional process-wide session controller.
//!
//! Passing the [`SessionController`] explicitly is preferred. For code that
//! cannot thread it through, one controller may be bound for the lifetime of
//! the process. Binding is single-assignment: the first [`globalise`] call
//! wins and every later call fails with [`Error::AliasConflict`].

use std::sync::OnceLock;

use tracing::debug;

use crate::controller::SessionController;
use crate::error::{Error, Result};

/// Alias used by [`SessionController::globalise_default`].
pub const DEFAULT_ALIAS: &str = "Session";

struct Binding {
    alias: String,
    controller: SessionController,
}

static GLOBAL: OnceLock<Binding> = OnceLock::new();

/// Binds `controller` as the process-wide session controller under `alias`.
pub fn globalise(controller: SessionController, alias: impl Into<String>) -> Result<()> {
    let alias = alias.into();
    if alias.trim().is_empty() {
        return Err(Error::Config("global session alias must not be empty".into()));
    }

    GLOBAL
        .set(Binding { alias, controller })
        .map_err(|rejected| {
            let bound = GLOBAL.get().map_or(rejected.alias, |b| b.alias.clone());
            Error::AliasConflict(bound)
        })?;

    debug!(alias = global_alias().unwrap_or_default(), "session controller globalised");
    Ok(())
}

/// The process-wide session controller.
pub fn global() -> Result<&'static SessionController> {
    GLOBAL
        .get()
        .map(|binding| &binding.controller)
        .ok_or(Error::NotGlobalised)
}

/// The alias the global controller was bound under, if any.
pub fn global_alias() -> Option<&'static str> {
    GLOBAL.get().map(|binding| binding.alias.as_str())
}

impl SessionController {
    /// Binds a clone of this controller process-wide. See [`globalise`].
    pub fn globalise(&self, alias: impl Into<String>) -> Result<()> {
        globalise(self.clone(), alias)
    }

    /// [`globalise`](Self::globalise) under [`DEFAULT_ALIAS`].
    pub fn globalise_default(&self) -> Result<()> {
        self.globalise(DEFAULT_ALIAS)
    }
}
