//! Launch-at-login registration.
//!
//! The OS keeps a per-user list of programs started at login. The app is
//! "enabled" exactly when that list holds an entry under the product name;
//! the entry's value is the command that launches this executable.

use std::path::Path;

use tracing::{debug, info};

use crate::error::PersistenceError;

#[cfg(windows)]
mod registry;

#[cfg(windows)]
pub use registry::RegistryRunKey;

/// A per-user autostart list keyed by entry name.
#[cfg_attr(test, mockall::automock)]
pub trait RunKeyStore {
    /// Whether an entry named `name` exists, whatever its value.
    fn contains(&self, name: &str) -> Result<bool, PersistenceError>;

    /// Create or overwrite the entry.
    fn set(&self, name: &str, command: &str) -> Result<(), PersistenceError>;

    /// Delete the entry. Deleting a missing entry succeeds.
    fn remove(&self, name: &str) -> Result<(), PersistenceError>;
}

/// Reads and toggles this product's autostart entry.
///
/// Does not retry; callers decide what a failure means for the UI.
pub struct AutostartController<S> {
    store: S,
    entry_name: String,
    command: String,
}

impl<S: RunKeyStore> AutostartController<S> {
    pub fn new(store: S, entry_name: impl Into<String>, executable: &Path) -> Self {
        Self {
            store,
            entry_name: entry_name.into(),
            command: launch_command(executable),
        }
    }

    /// Controller whose entry points at the running executable.
    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn for_current_exe(
        store: S,
        entry_name: impl Into<String>,
    ) -> Result<Self, PersistenceError> {
        let exe = std::env::current_exe().map_err(PersistenceError::ExecutablePath)?;
        Ok(Self::new(store, entry_name, &exe))
    }

    pub fn is_enabled(&self) -> Result<bool, PersistenceError> {
        let enabled = self.store.contains(&self.entry_name)?;
        debug!(entry = %self.entry_name, enabled, "Queried autostart entry");
        Ok(enabled)
    }

    /// Idempotently create or remove the entry.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), PersistenceError> {
        if enabled {
            self.store.set(&self.entry_name, &self.command)?;
            info!(entry = %self.entry_name, command = %self.command, "Autostart enabled");
        } else {
            self.store.remove(&self.entry_name)?;
            info!(entry = %self.entry_name, "Autostart disabled");
        }
        Ok(())
    }
}

/// Command line stored in the autostart entry.
///
/// Paths with whitespace are quoted, otherwise the shell would split them.
fn launch_command(executable: &Path) -> String {
    let path = executable.to_string_lossy();
    if path.contains(char::is_whitespace) {
        format!("\"{}\"", path)
    } else {
        path.into_owned()
    }
}

/// In-memory autostart list for tests.
#[cfg(test)]
pub(crate) mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::RunKeyStore;
    use crate::error::PersistenceError;

    #[derive(Default)]
    pub(crate) struct MemoryRunKey {
        pub(crate) entries: RefCell<HashMap<String, String>>,
    }

    impl RunKeyStore for MemoryRunKey {
        fn contains(&self, name: &str) -> Result<bool, PersistenceError> {
            Ok(self.entries.borrow().contains_key(name))
        }

        fn set(&self, name: &str, command: &str) -> Result<(), PersistenceError> {
            self.entries
                .borrow_mut()
                .insert(name.to_string(), command.to_string());
            Ok(())
        }

        fn remove(&self, name: &str) -> Result<(), PersistenceError> {
            self.entries.borrow_mut().remove(name);
            Ok(())
        }
    }
}
