//! Product identity and fixed runtime settings for the analog clock.
//!
//! There is no user-editable configuration: the only user choice (launch at
//! login) lives in the OS autostart list. Everything here is build metadata
//! or a constant of the clock face.

use std::time::Duration;

pub mod paths;

/// Display name of the product.
///
/// Shown in the tray menu and used as the autostart registration key.
pub const PRODUCT_NAME: &str = "AnalogClock";

/// Product version, taken from the package manifest.
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the session-wide lock that keeps the app single-instance.
pub const INSTANCE_LOCK_NAME: &str = "_ANALOG_CLOCK_MUTEX";

/// Per-user autostart list, relative to `HKEY_CURRENT_USER`.
#[cfg_attr(not(windows), allow(dead_code))]
pub const RUN_KEY_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Interval between icon redraws.
pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "ANALOG_CLOCK_LOG";

/// Text of the disabled informational menu entry.
#[cfg_attr(not(windows), allow(dead_code))]
pub fn product_label() -> String {
    format!("{} v{}", PRODUCT_NAME, PRODUCT_VERSION)
}

/// Log filter directive: `ANALOG_CLOCK_LOG`, then `RUST_LOG`, then `info`.
pub fn log_filter() -> String {
    [LOG_ENV_VAR, "RUST_LOG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_label() {
        let label = product_label();
        assert!(label.starts_with("AnalogClock v"));
        assert!(label.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_tick_period_is_one_second() {
        assert_eq!(TICK_PERIOD, Duration::from_secs(1));
    }
}
