//! Core logging bootstrap.
//!
//! # Responsibility
//! - Start file-based rolling logs once per process for the host application.
//! - Capture panics as metadata-only log events.
//!
//! # Invariants
//! - Re-initializing with the same level and directory is a no-op.
//! - Re-initializing with a different level or directory is rejected.
//! - Initialization never panics.
//! - Log lines carry ids and coordinates only, never card text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "delvemap";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Normalized logging request.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: &'static str,
    dir: PathBuf,
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts core logging at `level` into rolling files under `log_dir`.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is empty, relative, or cannot be created.
/// - Logging is already active with a different level or directory.
/// - The logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogTarget {
        level: parse_level(level)?,
        dir: parse_log_dir(log_dir)?,
    };

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(requested.clone()))?;
    ensure_same_target(&active.target, &requested)
}

/// Active `(level, log_dir)`, or `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.target.level, active.target.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(target: LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(target.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", target.level))?
        .log_to_file(
            FileSpec::default()
                .directory(target.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=core_init module=core status=ok version={} platform={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        target.level,
        target.dir.display()
    );

    Ok(ActiveLogger {
        target,
        _handle: handle,
    })
}

fn ensure_same_target(active: &LogTarget, requested: &LogTarget) -> Result<(), String> {
    if active.dir != requested.dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            active.dir.display(),
            requested.dir.display()
        ));
    }
    if active.level != requested.level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            active.level, requested.level
        ));
    }
    Ok(())
}

fn parse_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn parse_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} message={}",
            location,
            single_line(&message, MAX_PANIC_MESSAGE_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Flattens newlines and truncates to `max_chars`, appending `...` when cut.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_level, parse_log_dir, single_line};

    #[test]
    fn parse_level_accepts_known_values() {
        assert_eq!(parse_level("DEBUG").unwrap(), "debug");
        assert_eq!(parse_level(" warning ").unwrap(), "warn");
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn parse_log_dir_rejects_relative_and_empty_paths() {
        assert!(parse_log_dir("logs/dev").unwrap_err().contains("absolute"));
        assert!(parse_log_dir("   ").unwrap_err().contains("empty"));
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        assert_eq!(single_line("a\nb", 10), "a b");
        let cut = single_line("line1\nline2\rline3", 8);
        assert!(!cut.contains('\n') && !cut.contains('\r'));
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_reconfiguration() {
        let log_dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();
        let log_dir_str = log_dir.path().to_str().unwrap().to_string();
        let other_dir_str = other_dir.path().to_str().unwrap().to_string();

        init_logging("info", &log_dir_str).unwrap();
        init_logging("INFO", &log_dir_str).unwrap();

        let level_error = init_logging("debug", &log_dir_str).unwrap_err();
        assert!(level_error.contains("refusing to switch"));
        let dir_error = init_logging("info", &other_dir_str).unwrap_err();
        assert!(dir_error.contains("refusing to switch"));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(dir, log_dir.path());
    }
}
