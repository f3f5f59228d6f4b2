//! AnalogClock
//!
//! A background utility that shows the current time as an analog clock face
//! in the system tray, redrawn every second, with a menu to toggle launch at
//! login and to exit.

// Hides the console window on Windows in release builds.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use tracing::info;

mod app;
mod autostart;
mod clock;
mod config;
mod crash;
mod error;
mod instance;
mod scheduler;
mod tray;

use instance::Acquisition;

fn main() {
    if let Err(e) = real_main() {
        show_startup_error(&format!("{:?}", e));
        std::process::exit(1);
    }
}

#[cfg(windows)]
fn show_startup_error(message: &str) {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    let title = format!("{} - Startup Error", config::PRODUCT_NAME);
    let full_message = format!("Failed to start {}:\n\n{}", config::PRODUCT_NAME, message);

    let title_wide: Vec<u16> = OsStr::new(&title).encode_wide().chain(Some(0)).collect();
    let message_wide: Vec<u16> = OsStr::new(&full_message)
        .encode_wide()
        .chain(Some(0))
        .collect();

    // MB_ICONERROR = 0x10, MB_SETFOREGROUND = 0x10000, MB_TOPMOST = 0x40000
    let flags: u32 = 0x10 | 0x10000 | 0x40000;

    unsafe {
        windows_sys::Win32::UI::WindowsAndMessaging::MessageBoxW(
            0,
            message_wide.as_ptr(),
            title_wide.as_ptr(),
            flags,
        );
    }
}

#[cfg(not(windows))]
fn show_startup_error(message: &str) {
    eprintln!("{} startup error: {}", config::PRODUCT_NAME, message);
}

fn real_main() -> Result<()> {
    // Install crash handler first thing
    crash::install_panic_hook();

    // A second instance leaves no trace: no log file, no icon, no timer.
    let guard = match instance::acquire(config::INSTANCE_LOCK_NAME)
        .context("Failed to create instance lock")?
    {
        Acquisition::Acquired(guard) => guard,
        Acquisition::AlreadyHeld => return Ok(()),
    };

    let _log_guard = init_file_logging()?;

    info!(
        version = config::PRODUCT_VERSION,
        "{} starting",
        config::PRODUCT_NAME
    );

    tray::run_tray(guard)
}

fn init_file_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = config::paths::log_dir().context("Failed to create log directory")?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("analog-clock")
        .filename_suffix("log")
        .max_log_files(10)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(config::log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking),
        )
        .init();

    Ok(guard)
}
