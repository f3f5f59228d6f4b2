//! System tray icon for Windows.
//!
//! Shows the live clock face in the notification area with a context menu
//! for the launch-at-login toggle and exit.

// The menu layout is portable; only the Windows front-end builds it.
#[cfg_attr(not(windows), allow(dead_code))]
mod menu;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
pub use windows::run_tray;

#[cfg(not(windows))]
pub fn run_tray(_guard: crate::instance::InstanceGuard) -> anyhow::Result<()> {
    anyhow::bail!("System tray is only supported on Windows")
}
