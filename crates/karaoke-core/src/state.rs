// crates/karaoke-core/src/state.rs
// Pure player data: no egui, no ffmpeg, no runtime handles.
// Nothing here is persisted; a fresh PlayerState is built on every launch.
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::DEFAULT_VOLUME;

/// The three playback states the transport row reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Label shown on the play button for this state.
    ///
    /// ```
    /// use karaoke_core::state::PlaybackState;
    /// assert_eq!(PlaybackState::Paused.play_button_label(),  "Resume");
    /// assert_eq!(PlaybackState::Playing.play_button_label(), "Pause");
    /// assert_eq!(PlaybackState::Stopped.play_button_label(), "Play");
    /// ```
    pub fn play_button_label(self) -> &'static str {
        match self {
            PlaybackState::Paused  => "Resume",
            PlaybackState::Playing => "Pause",
            PlaybackState::Stopped => "Play",
        }
    }

    /// Stop is only meaningful while something is playing or paused.
    pub fn stop_enabled(self) -> bool {
        self != PlaybackState::Stopped
    }
}

/// What `PlayerState::advance` observed during one clock tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    Running,
    EndOfMedia,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Path the video player is configured with.
    pub input_path:   Option<PathBuf>,
    /// Path the recorder writes to.
    pub output_path:  Option<PathBuf>,
    /// Text-field buffers. Mirrored from the dialogs; typed edits are applied
    /// on commit by the files module.
    pub input_text:   String,
    pub output_text:  String,

    /// Identity of the currently opened input. Every MediaResult carries the
    /// id it was produced for, so results for a replaced file are dropped.
    pub media:        Option<Uuid>,
    /// The current input failed to open. Play stays disabled until another
    /// input is chosen.
    pub media_failed: bool,
    pub playback:     PlaybackState,
    /// Seconds. The seek slider follows this value.
    pub position:     f64,
    /// Seconds. Zero until the probe reports a duration.
    pub duration:     f64,
    /// 0–100, same scale as the volume slider.
    pub volume:       u8,
    pub video_size:   Option<(u32, u32)>,

    pub video_fullscreen: bool,
    /// Mirrors the checked state of the Rec button.
    pub recording:    bool,
    /// Tools → Bind Play/Rec. Toggled, never consulted.
    pub bind_play_rec: bool,

    /// Latest diagnostic for the status line.
    pub status:       Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            input_path:       None,
            output_path:      None,
            input_text:       String::new(),
            output_text:      String::new(),
            media:            None,
            media_failed:     false,
            playback:         PlaybackState::Stopped,
            position:         0.0,
            duration:         0.0,
            volume:           DEFAULT_VOLUME,
            video_size:       None,
            video_fullscreen: false,
            recording:        false,
            bind_play_rec:    false,
            status:           None,
        }
    }
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    /// An input is loaded and has not failed to open.
    pub fn can_play(&self) -> bool {
        self.media.is_some() && !self.media_failed
    }

    /// The input `id` cannot be played: stop the transport and keep it
    /// stopped. Returns false for results of a replaced input.
    pub fn mark_unplayable(&mut self, id: Uuid) -> bool {
        if !self.is_current(id) {
            return false;
        }
        self.media_failed = true;
        self.video_size   = None;
        self.duration     = 0.0;
        self.stop();
        true
    }

    /// Start or resume playback when paused/stopped, pause otherwise.
    /// Returns the new state.
    pub fn play_clicked(&mut self) -> PlaybackState {
        self.playback = match self.playback {
            PlaybackState::Paused | PlaybackState::Stopped => PlaybackState::Playing,
            PlaybackState::Playing                         => PlaybackState::Paused,
        };
        self.playback
    }

    pub fn stop(&mut self) {
        self.playback = PlaybackState::Stopped;
        self.position = 0.0;
    }

    /// Move the playhead. Clamped to the known duration once one exists.
    pub fn seek(&mut self, t: f64) {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        self.position = if self.duration > 0.0 { t.min(self.duration) } else { t };
    }

    pub fn set_volume(&mut self, v: u8) {
        self.volume = v.min(100);
    }

    /// 0.0–1.0 gain for the audio sink.
    pub fn gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.video_fullscreen = !self.video_fullscreen;
        self.video_fullscreen
    }

    pub fn toggle_bind_play_rec(&mut self) -> bool {
        log::info!("toggling binding REC/PLAY");
        self.bind_play_rec = !self.bind_play_rec;
        log::info!("setting {}", if self.bind_play_rec { "True" } else { "False" });
        self.bind_play_rec
    }

    /// Advance the position clock by `dt` seconds while playing.
    /// Reaching the end of the media stops playback and rewinds.
    pub fn advance(&mut self, dt: f64) -> ClockEvent {
        if !self.is_playing() {
            return ClockEvent::Running;
        }
        self.position += dt.max(0.0);
        if self.duration > 0.0 && self.position >= self.duration {
            self.stop();
            return ClockEvent::EndOfMedia;
        }
        ClockEvent::Running
    }

    /// Point the player at a new input. Resets the transport: stopped, at 0,
    /// duration unknown.
    /// Returns the fresh media id that background results will be tagged with.
    pub fn open_input(&mut self, path: &Path) -> Uuid {
        let id = Uuid::new_v4();
        self.input_path = Some(path.to_path_buf());
        self.input_text = path.display().to_string();
        self.media      = Some(id);
        self.media_failed = false;
        self.playback   = PlaybackState::Stopped;
        self.position   = 0.0;
        self.duration   = 0.0;
        self.video_size = None;
        id
    }

    /// Configure the recorder output path.
    pub fn set_output(&mut self, path: &Path) {
        self.output_path = Some(path.to_path_buf());
        self.output_text = path.display().to_string();
    }

    /// True when `id` is the media currently loaded.
    pub fn is_current(&self, id: Uuid) -> bool {
        self.media == Some(id)
    }

    pub fn update_duration(&mut self, id: Uuid, seconds: f64) {
        if self.is_current(id) && seconds.is_finite() && seconds > 0.0 {
            self.duration = seconds;
            if self.position > seconds {
                self.position = seconds;
            }
        }
    }

    /// Width/height ratio of the loaded video, 16:9 until known.
    pub fn video_ratio(&self) -> f32 {
        match self.video_size {
            Some((w, h)) if w > 0 && h > 0 => w as f32 / h as f32,
            _ => 16.0 / 9.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_clicked_toggles_between_playing_and_paused() {
        let mut s = PlayerState::default();
        assert_eq!(s.play_clicked(), PlaybackState::Playing);
        assert_eq!(s.play_clicked(), PlaybackState::Paused);
        assert_eq!(s.play_clicked(), PlaybackState::Playing);
    }

    #[test]
    fn stopped_shows_play_and_disables_stop() {
        let mut s = PlayerState::default();
        s.play_clicked();
        s.stop();
        assert_eq!(s.playback.play_button_label(), "Play");
        assert!(!s.playback.stop_enabled());
        assert_eq!(s.position, 0.0);
    }

    #[test]
    fn paused_and_playing_enable_stop() {
        assert!(PlaybackState::Playing.stop_enabled());
        assert!(PlaybackState::Paused.stop_enabled());
    }

    #[test]
    fn seek_is_clamped_to_duration() {
        let mut s = PlayerState::default();
        s.duration = 10.0;
        s.seek(25.0);
        assert_eq!(s.position, 10.0);
        s.seek(-3.0);
        assert_eq!(s.position, 0.0);
        s.seek(f64::NAN);
        assert_eq!(s.position, 0.0);
    }

    #[test]
    fn seek_without_duration_is_unbounded_above() {
        let mut s = PlayerState::default();
        s.seek(42.0);
        assert_eq!(s.position, 42.0);
    }

    #[test]
    fn volume_is_clamped() {
        let mut s = PlayerState::default();
        assert_eq!(s.volume, 100);
        s.set_volume(250);
        assert_eq!(s.volume, 100);
        s.set_volume(35);
        assert!((s.gain() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn advance_only_moves_while_playing() {
        let mut s = PlayerState::default();
        s.duration = 5.0;
        s.advance(1.0);
        assert_eq!(s.position, 0.0);
        s.play_clicked();
        assert_eq!(s.advance(1.0), ClockEvent::Running);
        assert_eq!(s.position, 1.0);
        s.play_clicked();
        s.advance(1.0);
        assert_eq!(s.position, 1.0);
    }

    #[test]
    fn end_of_media_stops_and_rewinds() {
        let mut s = PlayerState::default();
        s.duration = 2.0;
        s.play_clicked();
        assert_eq!(s.advance(1.5), ClockEvent::Running);
        assert_eq!(s.advance(1.0), ClockEvent::EndOfMedia);
        assert_eq!(s.playback, PlaybackState::Stopped);
        assert_eq!(s.position, 0.0);
    }

    #[test]
    fn bind_play_rec_flips_and_touches_nothing_else() {
        let mut s = PlayerState::default();
        let before = (s.playback, s.recording, s.position, s.volume);
        assert!(s.toggle_bind_play_rec());
        assert!(!s.toggle_bind_play_rec());
        assert_eq!(before, (s.playback, s.recording, s.position, s.volume));
    }

    #[test]
    fn fullscreen_toggle_flips() {
        let mut s = PlayerState::default();
        assert!(s.toggle_fullscreen());
        assert!(!s.toggle_fullscreen());
    }

    #[test]
    fn open_input_resets_transport_and_issues_new_id() {
        let mut s = PlayerState::default();
        let first = s.open_input(Path::new("/tmp/a.mp4"));
        s.update_duration(first, 30.0);
        s.play_clicked();
        s.seek(12.0);
        let second = s.open_input(Path::new("/tmp/b.mp4"));
        assert_ne!(first, second);
        assert_eq!(s.playback, PlaybackState::Stopped);
        assert_eq!(s.position, 0.0);
        assert_eq!(s.duration, 0.0);
        assert_eq!(s.input_text, "/tmp/b.mp4");
    }

    #[test]
    fn stale_duration_is_ignored() {
        let mut s = PlayerState::default();
        let old = s.open_input(Path::new("/tmp/a.mp4"));
        let new = s.open_input(Path::new("/tmp/b.mp4"));
        s.update_duration(old, 99.0);
        assert_eq!(s.duration, 0.0);
        s.update_duration(new, 12.5);
        assert_eq!(s.duration, 12.5);
    }

    #[test]
    fn unplayable_input_stops_and_disables_play() {
        let mut s = PlayerState::default();
        let id = s.open_input(Path::new("/tmp/broken.mp4"));
        assert!(s.can_play());
        s.play_clicked();
        s.advance(0.5);

        assert!(s.mark_unplayable(id));
        assert_eq!(s.playback, PlaybackState::Stopped);
        assert_eq!(s.position, 0.0);
        assert!(!s.can_play());

        s.open_input(Path::new("/tmp/good.mp4"));
        assert!(s.can_play());
    }

    #[test]
    fn unplayable_result_for_replaced_input_is_ignored() {
        let mut s = PlayerState::default();
        let old = s.open_input(Path::new("/tmp/a.mp4"));
        s.open_input(Path::new("/tmp/b.mp4"));
        s.play_clicked();
        assert!(!s.mark_unplayable(old));
        assert!(s.is_playing());
        assert!(s.can_play());
    }

    #[test]
    fn video_ratio_defaults_to_wide() {
        let mut s = PlayerState::default();
        assert!((s.video_ratio() - 16.0 / 9.0).abs() < 1e-6);
        s.video_size = Some((640, 480));
        assert!((s.video_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }
}
