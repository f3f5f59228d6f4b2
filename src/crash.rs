//! Crash reporting and panic handling.

use std::any::Any;
use std::backtrace::Backtrace;
use std::fs;
use std::panic::PanicHookInfo;

use crate::config::{self, paths};

/// Install the panic hook for crash reporting.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        handle_panic(panic_info);
    }));
}

fn handle_panic(panic_info: &PanicHookInfo) {
    let backtrace = Backtrace::force_capture();

    let message = panic_message(panic_info.payload());
    let location = panic_info
        .location()
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_else(|| "unknown location".to_string());

    tracing::error!(%message, %location, "Panic");

    let report = build_crash_report(&message, &location, &backtrace.to_string());
    let crash_file = write_crash_report(&report);

    show_crash_dialog(&message, crash_file.as_deref());
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn build_crash_report(message: &str, location: &str, backtrace: &str) -> String {
    let product = config::PRODUCT_NAME;
    let version = config::PRODUCT_VERSION;
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z");
    let os_info = format!("{} {}", std::env::consts::OS, std::env::consts::ARCH);

    format!(
        r#"{product} Crash Report
========================

Version: {version}
Timestamp: {timestamp}
OS: {os_info}

Panic Message:
{message}

Location:
{location}

Backtrace:
{backtrace}
"#
    )
}

fn write_crash_report(report: &str) -> Option<String> {
    let log_dir = paths::log_dir().ok()?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = log_dir.join(format!("crash_{}.txt", timestamp));

    fs::write(&path, report).ok()?;
    Some(path.display().to_string())
}

#[cfg(windows)]
fn show_crash_dialog(message: &str, crash_file: Option<&str>) {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    let file_info = crash_file
        .map(|f| format!("\n\nCrash report saved to:\n{}", f))
        .unwrap_or_default();

    let text = format!(
        "{} has crashed unexpectedly:\n\n{}{}",
        config::PRODUCT_NAME,
        message,
        file_info
    );
    let title = format!("{} - Crash", config::PRODUCT_NAME);

    let title_wide: Vec<u16> = OsStr::new(&title).encode_wide().chain(Some(0)).collect();
    let text_wide: Vec<u16> = OsStr::new(&text).encode_wide().chain(Some(0)).collect();

    // MB_OK = 0, MB_ICONERROR = 0x10
    let flags: u32 = 0x10;

    unsafe {
        windows_sys::Win32::UI::WindowsAndMessaging::MessageBoxW(
            0,
            text_wide.as_ptr(),
            title_wide.as_ptr(),
            flags,
        );
    }
}

#[cfg(not(windows))]
fn show_crash_dialog(message: &str, crash_file: Option<&str>) {
    eprintln!("{} crashed: {}", config::PRODUCT_NAME, message);
    if let Some(f) = crash_file {
        eprintln!("Crash report saved to: {}", f);
    }
}
