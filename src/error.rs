//! Error types for the analog clock.

use thiserror::Error;

/// The OS autostart list could not be read or written.
#[derive(Error, Debug)]
#[cfg_attr(not(windows), allow(dead_code))]
pub enum PersistenceError {
    #[error("Cannot open autostart list {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read autostart entry '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write autostart entry '{name}': {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot remove autostart entry '{name}': {source}")]
    Remove {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve executable path: {0}")]
    ExecutablePath(#[source] std::io::Error),
}

/// The notification-area icon could not be created or updated.
#[derive(Error, Debug)]
#[cfg_attr(not(windows), allow(dead_code))]
pub enum TrayError {
    #[error("Invalid icon image: {0}")]
    Icon(String),

    #[error("Menu error: {0}")]
    Menu(String),

    #[error("Tray icon error: {0}")]
    Platform(String),
}
