//! Path utilities for the analog clock.
//!
//! The app keeps no data of its own; the only files it writes are logs and
//! crash reports.

use std::path::PathBuf;

use super::PRODUCT_NAME;

/// Base per-user data directory.
///
/// On Windows: `%LOCALAPPDATA%\AnalogClock\data`
/// On other platforms: `~/.local/share/analogclock` (for development)
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", PRODUCT_NAME)
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
                .join(PRODUCT_NAME.to_lowercase())
        })
}

/// Log directory, created on demand.
pub fn log_dir() -> std::io::Result<PathBuf> {
    let path = data_dir().join("logs");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}
