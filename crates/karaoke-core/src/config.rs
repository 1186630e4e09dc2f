// crates/karaoke-core/src/config.rs
//
// Application defaults. There is no config file, command line or environment
// variable; change a value here to change it everywhere.

pub const APP_NAME:     &str = "Karaoke";
pub const WINDOW_TITLE: &str = "Wish' Karaoke! :)";

/// Initial inner size of the main window.
pub const WINDOW_SIZE:     [f32; 2] = [800.0, 600.0];
pub const WINDOW_MIN_SIZE: [f32; 2] = [480.0, 360.0];

/// Outer margin around the main layout, in points.
pub const CONTENT_MARGIN: i8 = 10;

/// Initial player volume on the 0–100 slider scale.
pub const DEFAULT_VOLUME: u8 = 100;

/// Extension appended to recorder output paths that have none.
pub const RECORDING_EXT: &str = "wav";

/// Output of the audio-track extraction used for playback.
pub const PLAYBACK_SAMPLE_RATE: u32 = 44_100;

/// Name of the release-build log file in the OS temp dir.
pub const LOG_FILE_NAME: &str = "karaoke.log";
