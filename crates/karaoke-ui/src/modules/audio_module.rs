// crates/karaoke-ui/src/modules/audio_module.rs
//
// AudioModule owns audio playback of the input's soundtrack.
// Non-rendering module: tick() is called every frame from app.rs after
// commands are processed. No egui panel is shown.
//
// The sink only exists while playing. Pause, stop and seek drop it and the
// next playing tick rebuilds it at the clock position, so the position clock
// in PlayerState stays the single source of truth.

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use crate::context::AppContext;
use super::KaraokeModule;
use egui::Ui;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

/// Minimum time after a sink is created before it may be marked exhausted.
///
/// rodio fills its internal buffer asynchronously, so `sink.empty()` can read
/// true for a tick or two right after creation.
const MIN_PLAY_SECS: f64 = 1.5;

pub struct AudioModule {
    /// The track played to completion before the clock reached the end.
    /// Stops the sink being rebuilt on every tick for the remainder.
    exhausted: bool,

    /// The sink has been observed non-empty at least once.
    sink_has_played: bool,

    sink_created_at: Option<Instant>,

    /// Ticks remaining after stream creation before a sink may be connected.
    /// WASAPI registers its session asynchronously on GUI-subsystem launches;
    /// connecting on the same tick drops the first sound.
    stream_warmup_ticks: u8,
}

impl AudioModule {
    pub fn new() -> Self {
        Self {
            exhausted:           false,
            sink_has_played:     false,
            sink_created_at:     None,
            stream_warmup_ticks: 0,
        }
    }

    fn clear_sink_state(&mut self) {
        self.exhausted       = false;
        self.sink_has_played = false;
        self.sink_created_at = None;
    }

    /// Manages the rodio sink: creates on play, drops on pause/stop/seek,
    /// follows the volume slider.
    fn sync_sink(&mut self, state: &PlayerState, ctx: &mut AppContext) {
        // Lazy init: the message loop must be running before the device opens.
        if ctx.audio_stream.is_none() {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    log::info!("[audio] output stream ready");
                    ctx.audio_stream = Some(stream);
                    self.stream_warmup_ticks = 5;
                }
                Err(e) => {
                    log::error!("[audio] output stream init failed: {e}");
                    return;
                }
            }
        }

        if self.stream_warmup_ticks > 0 {
            self.stream_warmup_ticks -= 1;
            return;
        }

        let Some(stream) = &ctx.audio_stream else { return };

        if !state.is_playing() {
            if ctx.playback.audio_was_playing || ctx.audio_sink.is_some() {
                ctx.playback.audio_was_playing = false;
                ctx.audio_sink = None;
                self.clear_sink_state();
            }
            return;
        }

        // A seek while playing drops the sink and clears this flag in app.rs.
        if !ctx.playback.audio_was_playing {
            ctx.audio_sink = None;
            self.clear_sink_state();
        }
        ctx.playback.audio_was_playing = true;

        if self.exhausted {
            return;
        }

        if let Some(sink) = &ctx.audio_sink {
            let elapsed = self.sink_created_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0);
            if !sink.empty() {
                self.sink_has_played = true;
                sink.set_volume(state.gain());
            } else if self.sink_has_played && elapsed >= MIN_PLAY_SECS {
                log::info!("[audio] track exhausted after {elapsed:.2}s");
                self.exhausted = true;
                ctx.audio_sink = None;
            }
            return;
        }

        // The WAV arrives some time after the input is opened; until then
        // the clock runs silently.
        let Some(apath) = ctx.audio_path.as_deref() else { return };
        match open_sink(stream, apath, state.position, state.gain()) {
            Ok(sink) => {
                log::info!("[audio] sink created at {:.3}s vol={}", state.position, state.volume);
                self.sink_created_at = Some(Instant::now());
                ctx.audio_sink = Some(sink);
            }
            Err(e) => {
                log::error!("[audio] cannot play {}: {e}", apath.display());
                // Don't retry on every tick.
                self.exhausted = true;
            }
        }
    }
}

fn open_sink(
    stream: &rodio::OutputStream,
    path:   &Path,
    at:     f64,
    gain:   f32,
) -> anyhow::Result<Sink> {
    let file    = File::open(path)?;
    let decoder = Decoder::new(BufReader::new(file))?;
    let sink    = Sink::connect_new(stream.mixer());
    sink.append(decoder);
    if at > 0.0 {
        if let Err(e) = sink.try_seek(Duration::from_secs_f64(at)) {
            log::warn!("[audio] seek to {at:.3}s failed: {e}");
        }
    }
    sink.set_volume(gain);
    sink.play();
    Ok(sink)
}

impl KaraokeModule for AudioModule {
    fn name(&self) -> &str { "Audio" }

    fn ui(
        &mut self,
        _ui:    &mut Ui,
        _state: &PlayerState,
        _cmd:   &mut Vec<PlayerCommand>,
    ) {
        // No UI panel: driven entirely by tick().
    }

    fn tick(&mut self, state: &PlayerState, ctx: &mut AppContext) {
        self.sync_sink(state, ctx);
    }
}
