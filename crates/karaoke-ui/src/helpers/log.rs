// crates/karaoke-ui/src/helpers/log.rs
//
// Logger setup for the whole process.
//
// In release builds with `windows_subsystem = "windows"` (double-click launch),
// there is no console attached, so stderr output is silently discarded.
// Release builds therefore append to a file in the OS temp dir instead:
//
//   %TEMP%\karaoke.log  (or $TMPDIR/karaoke.log)
//
// Everything else in the workspace just uses the `log` macros:
//   log::info!("[rec] recording → {}", path.display());

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use karaoke_core::config::LOG_FILE_NAME;

/// Where release builds write their log.
pub fn log_file_path() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// Install the global logger. Fixed `info` level; no environment variables
/// are consulted. Safe to call more than once (later calls are no-ops).
pub fn init() {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .format(|buf, record| {
            writeln!(buf, "{} {} {}", record.target(), record.level(), record.args())
        });

    if !cfg!(debug_assertions) {
        // If the file can't be opened, stderr stays the target.
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(log_file_path()) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_in_temp_dir() {
        let p = log_file_path();
        assert_eq!(p.parent(), Some(std::env::temp_dir().as_path()));
        assert_eq!(p.file_name().and_then(|n| n.to_str()), Some("karaoke.log"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
        log::info!("logger initialised");
    }
}
