//! Per-launch log for the editor and the headless compositor.
//!
//! Each launch truncates `MockupFE/mockupfe.log` under the platform data
//! directory (`%APPDATA%`, `~/Library/Application Support`, or
//! `$XDG_DATA_HOME` / `~/.local/share`).
//!
//! `log_info!` / `log_warn!` / `log_err!` drop their lines until `init()`
//! has opened the file. `set_echo(true)` copies every line to stderr, which
//! is how `--verbose` works without a log file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static SINK: OnceLock<Mutex<File>> = OnceLock::new();
static ECHO: AtomicBool = AtomicBool::new(false);

/// Copy log lines to stderr.
pub fn set_echo(enabled: bool) {
    ECHO.store(enabled, Ordering::Relaxed);
}

fn append(line: &str) {
    if let Some(sink) = SINK.get()
        && let Ok(mut file) = sink.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Record one message. I/O failures are swallowed.
pub fn write(level: &str, msg: &str) {
    let line = format_line(unix_seconds(), level, msg);
    if ECHO.load(Ordering::Relaxed) {
        eprintln!("{}", line);
    }
    append(&line);
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*));
    };
}

/// Open this launch's log and route panics into it. Later calls do nothing.
pub fn init() {
    if SINK.get().is_some() {
        return;
    }
    let path = data_dir().join("MockupFE").join("mockupfe.log");
    let file = match open_truncated(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("MockupFE: log disabled, cannot open {}: {}", path.display(), e);
            return;
        }
    };
    let _ = SINK.set(Mutex::new(file));

    append(&format!("=== MockupFE started at unix {} ===", unix_seconds()));
    append(&format!("log: {}", path.display()));

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        append(&format_line(unix_seconds(), "PANIC", &info.to_string()));
        default_hook(info);
    }));
}

fn open_truncated(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).write(true).truncate(true).open(path)
}

fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join("Library").join("Application Support");
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local").join("share"),
        Err(_) => PathBuf::from("."),
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `[HH:MM:SS] [LEVEL] msg`, UTC wall clock.
fn format_line(unix_secs: u64, level: &str, msg: &str) -> String {
    let day = unix_secs % 86_400;
    format!(
        "[{:02}:{:02}:{:02}] [{}] {}",
        day / 3600,
        (day % 3600) / 60,
        day % 60,
        level,
        msg
    )
}
