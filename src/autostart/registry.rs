//! Windows `Run` registry key store.
//!
//! Every operation opens its own key handle; `RegKey` closes it on drop, so
//! the handle is released on every exit path.

use std::io;

use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE};
use winreg::RegKey;

use super::RunKeyStore;
use crate::config::RUN_KEY_PATH;
use crate::error::PersistenceError;

/// `HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Run`.
pub struct RegistryRunKey {
    path: &'static str,
}

impl RegistryRunKey {
    pub fn current_user() -> Self {
        Self { path: RUN_KEY_PATH }
    }

    /// Opens the key, or `None` when it does not exist.
    fn open(&self, flags: u32) -> Result<Option<RegKey>, PersistenceError> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        match hkcu.open_subkey_with_flags(self.path, flags) {
            Ok(key) => Ok(Some(key)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Open {
                path: self.path.to_string(),
                source,
            }),
        }
    }
}

impl RunKeyStore for RegistryRunKey {
    fn contains(&self, name: &str) -> Result<bool, PersistenceError> {
        let Some(key) = self.open(KEY_QUERY_VALUE)? else {
            return Ok(false);
        };

        match key.get_raw_value(name) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PersistenceError::Read {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn set(&self, name: &str, command: &str) -> Result<(), PersistenceError> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu
            .create_subkey_with_flags(self.path, KEY_SET_VALUE)
            .map_err(|source| PersistenceError::Open {
                path: self.path.to_string(),
                source,
            })?;

        key.set_value(name, &command.to_string())
            .map_err(|source| PersistenceError::Write {
                name: name.to_string(),
                source,
            })
    }

    fn remove(&self, name: &str) -> Result<(), PersistenceError> {
        let Some(key) = self.open(KEY_SET_VALUE)? else {
            return Ok(());
        };

        match key.delete_value(name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Remove {
                name: name.to_string(),
                source,
            }),
        }
    }
}
