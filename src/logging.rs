use std::path::{Path, PathBuf};

pub const LOG_FILE_BASENAME: &str = "habit-tracker";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;
pub const LOG_ENV_VAR: &str = "HABIT_TRACKER_LOG";

/// Log files live in a `logs/` folder next to habits.json/settings.json.
pub fn log_directory(app_data_dir: &Path) -> PathBuf {
    app_data_dir.join("logs")
}

/// Filter spec: `HABIT_TRACKER_LOG`, then `RUST_LOG`, then a crate-verbose default.
pub fn log_spec(app_var: Option<String>, rust_log: Option<String>) -> String {
    // Dependency logs stay at WARN by default; our crate is more verbose in debug builds.
    let default_spec = if cfg!(debug_assertions) {
        "warn,habit_tracker_lib=debug,reminder=info"
    } else {
        "warn,habit_tracker_lib=info,reminder=info"
    };
    app_var
        .filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(
    app_data_dir: &Path,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    let directory = log_directory(app_data_dir);
    std::fs::create_dir_all(&directory)?;

    let spec = log_spec(
        std::env::var(LOG_ENV_VAR).ok(),
        std::env::var("RUST_LOG").ok(),
    );

    let handle = Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(directory.clone())
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stdout(if cfg!(debug_assertions) {
            Duplicate::Info
        } else {
            Duplicate::None
        })
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        directory.display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(handle)
}

#[cfg(all(feature = "app", not(test)))]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|loc| format!("{loc}"))
            .unwrap_or_else(|| "<unknown>".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        log::error!("panic: payload={payload} location={location}\nbacktrace:\n{backtrace}");
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_go_to_a_subdirectory_of_app_data() {
        let dir = Path::new("/tmp/habit-tracker");
        assert_eq!(log_directory(dir), dir.join("logs"));
    }

    #[test]
    fn log_spec_prefers_app_variable_then_rust_log() {
        assert_eq!(log_spec(Some("trace".into()), Some("error".into())), "trace");
        assert_eq!(log_spec(Some("  ".into()), Some("error".into())), "error");
        assert!(log_spec(None, Some("".into())).starts_with("warn,"));
        assert!(log_spec(None, None).contains("habit_tracker_lib="));
    }
}
