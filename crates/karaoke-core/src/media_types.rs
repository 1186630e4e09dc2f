// crates/karaoke-core/src/media_types.rs
//
// Types that flow across the channels between karaoke-media and karaoke-ui.
// No egui, no ffmpeg, just plain data.

use std::path::PathBuf;
use uuid::Uuid;

/// Results sent from the MediaWorker background threads to the UI.
/// `id` is the media id the work was started for (see PlayerState::media).
#[derive(Debug)]
pub enum MediaResult {
    Duration   { id: Uuid, seconds: f64 },
    VideoSize  { id: Uuid, width: u32, height: u32 },
    /// One-shot frame decoded for a seek while not playing.
    VideoFrame { id: Uuid, width: u32, height: u32, data: Vec<u8> },
    /// Temp WAV holding the input's audio track, ready for the output sink.
    AudioPath  { id: Uuid, path: PathBuf },
    /// The input could not be probed; nothing about it will play.
    Unplayable { id: Uuid, msg: String },
    /// Non-fatal failure, e.g. the audio track could not be extracted.
    Error      { id: Uuid, msg: String },
}

/// A decoded frame from the dedicated playback pipeline.
pub struct PlaybackFrame {
    pub id:        Uuid,
    /// Playback session the frame was decoded for. Every start of the
    /// pipeline gets a new one, so frames decoded before a seek are told
    /// apart from frames of the same media after it.
    pub session:   u64,
    pub timestamp: f64,
    pub width:     u32,
    pub height:    u32,
    pub data:      Vec<u8>, // RGBA
}
