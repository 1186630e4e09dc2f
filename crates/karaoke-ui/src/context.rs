// crates/karaoke-ui/src/context.rs
//
// AppContext owns all runtime handles that are NOT part of PlayerState.
// KaraokeApp holds one of these plus a PlayerState and the modules.
//
// Layout:
//   AppContext
//     ├── media_worker        FFmpeg worker + all channel handles
//     ├── recorder            cpal capture session (Rec button)
//     ├── frame               texture currently shown on the monitor
//     ├── playback            seek/playback decode tracking
//     ├── audio_stream        rodio OutputStream (must outlive the sink)
//     └── audio_sink          the one playing Sink (audio_module only)

use std::path::PathBuf;

use karaoke_core::media_types::PlaybackFrame;
use karaoke_core::state::PlayerState;
use karaoke_media::audio::cleanup_audio_temp;
use karaoke_media::{AudioRecorder, MediaResult, MediaWorker};
use eframe::egui;
use rodio::{OutputStream, Sink};
use uuid::Uuid;

// ── PlaybackContext ───────────────────────────────────────────────────────────
// Decode-tracking state for the seek preview and the playback pipeline.
// video_module.rs and audio_module.rs are the only writers.
#[derive(Default)]
pub struct PlaybackContext {
    /// Exact (media_id, timestamp_secs) of the last seek preview request.
    pub last_frame_req: Option<(Uuid, f64)>,

    /// Was the player playing on the previous frame? Used to detect play/stop edges.
    pub prev_playing: bool,

    /// Set by a seek while playing: the decode pipeline must restart at the
    /// new position on the next tick.
    pub restart: bool,

    /// Session of the running playback pipeline. Frames from any other
    /// session are discarded.
    pub session: u64,

    /// Was audio running on the previous tick?
    pub audio_was_playing: bool,
}

impl PlaybackContext {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── AppContext ────────────────────────────────────────────────────────────────

pub struct AppContext {
    pub media_worker: MediaWorker,
    pub recorder:     AudioRecorder,

    /// Latest playback or seek frame for the loaded media.
    pub frame: Option<egui::TextureHandle>,

    /// Next-to-display playback frame, held until its PTS is due.
    /// Prevents draining the channel from racing ahead of wall-clock time.
    pub pending_pb_frame: Option<PlaybackFrame>,

    pub playback: PlaybackContext,

    // ── Audio (rodio 0.21) ───────────────────────────────────────────────────
    // OutputStream MUST stay alive for the entire app lifetime; dropping it
    // stops all audio. audio_module borrows it each tick via .mixer().
    pub audio_stream: Option<OutputStream>,
    pub audio_sink:   Option<Sink>,
    /// Temp WAV extracted from the current input.
    pub audio_path:   Option<PathBuf>,
}

impl AppContext {
    pub fn new(media_worker: MediaWorker) -> Self {
        // audio_stream is initialized lazily on the first tick() call.
        // Initializing here races with eframe/winit Win32 setup in GUI-subsystem
        // (double-click) mode and leaves audio broken for the whole session.
        Self {
            media_worker,
            recorder:         AudioRecorder::new(),
            frame:            None,
            pending_pb_frame: None,
            playback:         PlaybackContext::default(),
            audio_stream:     None,
            audio_sink:       None,
            audio_path:       None,
        }
    }

    /// Drop everything tied to the current input before a new one is opened.
    pub fn release_media(&mut self) {
        self.media_worker.stop_playback();
        self.audio_sink       = None;
        self.frame            = None;
        self.pending_pb_frame = None;
        self.playback.reset();
        if let Some(old) = self.audio_path.take() {
            cleanup_audio_temp(&old);
        }
    }

    /// Drain the MediaWorker result channel into state and the monitor
    /// texture. Called once per frame from `app::poll_media`, after PTS-gated
    /// playback frame consumption.
    pub fn ingest_media_results(
        &mut self,
        state: &mut PlayerState,
        ctx:   &egui::Context,
    ) {
        while let Ok(result) = self.media_worker.rx.try_recv() {
            self.apply_media_result(state, ctx, result);
        }
    }

    /// Results tagged with a media id other than the current one belong to a
    /// replaced input and are dropped (their temp WAVs deleted).
    pub fn apply_media_result(
        &mut self,
        state:  &mut PlayerState,
        ctx:    &egui::Context,
        result: MediaResult,
    ) {
        match result {
            MediaResult::Duration { id, seconds } => {
                state.update_duration(id, seconds);
                ctx.request_repaint();
            }

            MediaResult::VideoSize { id, width, height } => {
                if state.is_current(id) {
                    state.video_size = Some((width, height));
                    ctx.request_repaint();
                }
            }

            MediaResult::AudioPath { id, path } => {
                if state.is_current(id) {
                    log::info!("[audio] track ready: {}", path.display());
                    if let Some(old) = self.audio_path.replace(path) {
                        cleanup_audio_temp(&old);
                    }
                } else {
                    cleanup_audio_temp(&path);
                }
            }

            MediaResult::VideoFrame { id, width, height, data } => {
                // During playback the pb channel owns the monitor; a late
                // seek result would show a wrong-position frame.
                if state.is_current(id) && !state.is_playing() {
                    self.frame = Some(load_frame(ctx, width, height, &data));
                    ctx.request_repaint();
                }
            }

            MediaResult::Unplayable { id, msg } => {
                if state.mark_unplayable(id) {
                    log::error!("[media] {id}: {msg}");
                    self.media_worker.stop_playback();
                    self.pending_pb_frame = None;
                    self.audio_sink       = None;
                    self.frame            = None;
                    state.status = Some(msg);
                    ctx.request_repaint();
                } else {
                    log::warn!("[media] stale {id}: {msg}");
                }
            }

            MediaResult::Error { id, msg } => {
                if state.is_current(id) {
                    log::error!("[media] {id}: {msg}");
                    state.status = Some(msg);
                    ctx.request_repaint();
                } else {
                    log::warn!("[media] stale {id}: {msg}");
                }
            }
        }
    }
}

/// Upload an RGBA frame as the monitor texture. The previous handle is freed
/// when the caller drops it.
pub fn load_frame(ctx: &egui::Context, width: u32, height: u32, data: &[u8]) -> egui::TextureHandle {
    ctx.load_texture(
        "monitor-frame",
        egui::ColorImage::from_rgba_unmultiplied([width as usize, height as usize], data),
        egui::TextureOptions::LINEAR,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use karaoke_core::state::PlaybackState;
    use karaoke_media::audio::audio_temp_path;
    use std::path::Path;

    fn setup() -> (AppContext, PlayerState, egui::Context) {
        (AppContext::new(MediaWorker::new()), PlayerState::default(), egui::Context::default())
    }

    #[test]
    fn results_for_a_replaced_input_are_dropped() {
        let (mut app, mut state, ctx) = setup();
        let old = state.open_input(Path::new("/tmp/a.mp4"));
        let new = state.open_input(Path::new("/tmp/b.mp4"));

        app.apply_media_result(&mut state, &ctx, MediaResult::Duration { id: old, seconds: 99.0 });
        app.apply_media_result(&mut state, &ctx, MediaResult::VideoSize { id: old, width: 4, height: 3 });
        app.apply_media_result(&mut state, &ctx, MediaResult::Error { id: old, msg: "late".into() });
        app.apply_media_result(&mut state, &ctx, MediaResult::VideoFrame {
            id: old, width: 1, height: 1, data: vec![0; 4],
        });
        assert_eq!(state.duration, 0.0);
        assert!(state.video_size.is_none());
        assert!(state.status.is_none());
        assert!(app.frame.is_none());

        app.apply_media_result(&mut state, &ctx, MediaResult::Duration { id: new, seconds: 12.0 });
        app.apply_media_result(&mut state, &ctx, MediaResult::VideoFrame {
            id: new, width: 1, height: 1, data: vec![0; 4],
        });
        assert_eq!(state.duration, 12.0);
        assert!(app.frame.is_some());
    }

    #[test]
    fn stale_audio_track_is_deleted() {
        let (mut app, mut state, ctx) = setup();
        let old = state.open_input(Path::new("/tmp/a.mp4"));
        state.open_input(Path::new("/tmp/b.mp4"));

        let wav = audio_temp_path(old);
        std::fs::write(&wav, b"RIFF").unwrap();
        app.apply_media_result(&mut state, &ctx, MediaResult::AudioPath { id: old, path: wav.clone() });
        assert!(!wav.exists());
        assert!(app.audio_path.is_none());
    }

    #[test]
    fn current_audio_track_replaces_and_deletes_the_previous_one() {
        let (mut app, mut state, ctx) = setup();
        let id = state.open_input(Path::new("/tmp/a.mp4"));
        let previous = audio_temp_path(Uuid::new_v4());
        std::fs::write(&previous, b"RIFF").unwrap();
        app.audio_path = Some(previous.clone());

        let wav = audio_temp_path(id);
        app.apply_media_result(&mut state, &ctx, MediaResult::AudioPath { id, path: wav.clone() });
        assert_eq!(app.audio_path.as_deref(), Some(wav.as_path()));
        assert!(!previous.exists());
    }

    #[test]
    fn unplayable_input_stops_the_transport() {
        let (mut app, mut state, ctx) = setup();
        let id = state.open_input(Path::new("/tmp/broken.mp4"));
        state.play_clicked();
        state.advance(2.0);

        app.apply_media_result(&mut state, &ctx, MediaResult::Unplayable {
            id, msg: "cannot open".into(),
        });
        assert_eq!(state.playback, PlaybackState::Stopped);
        assert_eq!(state.position, 0.0);
        assert!(!state.can_play());
        assert_eq!(state.status.as_deref(), Some("cannot open"));
    }

    #[test]
    fn audio_error_keeps_the_input_playable() {
        let (mut app, mut state, ctx) = setup();
        let id = state.open_input(Path::new("/tmp/silent.mp4"));
        app.apply_media_result(&mut state, &ctx, MediaResult::Error {
            id, msg: "no audio decoder".into(),
        });
        assert!(state.can_play());
        assert_eq!(state.status.as_deref(), Some("no audio decoder"));
    }
}
