// crates/karaoke-ui/src/modules/video_module.rs
//
// VideoModule owns all video seek/playback frame logic.
// Non-rendering module: tick() and poll_playback() are called every frame
// from app.rs. No egui panel is shown.

use karaoke_core::state::PlayerState;
use karaoke_core::commands::PlayerCommand;
use karaoke_core::media_types::PlaybackFrame;
use crate::context::{load_frame, AppContext};
use super::KaraokeModule;
use crossbeam_channel::Receiver;
use eframe::egui;

/// A frame may be shown at most this far ahead of the clock.
const EARLY_TOLERANCE: f64 = 1.0 / 60.0;
/// Frames this far behind the clock are skipped.
const LATE_SKIP: f64 = 1.0 / 30.0;
/// Frames further behind than this can never be shown and are dropped.
const STALE_AFTER: f64 = 3.0;

pub struct VideoModule;

impl VideoModule {
    pub fn new() -> Self { Self }

    // ── poll_playback ─────────────────────────────────────────────────────────
    /// PTS-gated playback frame consumption. Call from app::poll_media().
    ///
    /// The decode thread pre-fills a bounded channel as fast as FFmpeg can go.
    /// Draining all frames and showing the last would race ahead at decode
    /// speed. Instead a one-slot pending buffer is promoted to the monitor
    /// only once the position clock has caught up to the frame's PTS.
    pub fn poll_playback(
        &self,
        state:    &PlayerState,
        ctx:      &mut AppContext,
        egui_ctx: &egui::Context,
    ) {
        if !state.is_playing() {
            return;
        }
        let session = ctx.playback.session;
        let current = |f: &PlaybackFrame| state.is_current(f.id) && f.session == session;
        let due = take_due_frame(
            &mut ctx.pending_pb_frame,
            &ctx.media_worker.pb_rx,
            current,
            state.position,
        );
        if let Some(f) = due {
            ctx.frame = Some(load_frame(egui_ctx, f.width, f.height, &f.data));
            egui_ctx.request_repaint();
        }
    }

    // ── tick ──────────────────────────────────────────────────────────────────
    /// Playback start/stop edges and seek previews.
    fn tick_playback(&self, state: &PlayerState, ctx: &mut AppContext) {
        let playing      = state.is_playing();
        let just_started = playing && !ctx.playback.prev_playing;
        let just_stopped = !playing && ctx.playback.prev_playing;
        ctx.playback.prev_playing = playing;

        let (Some(id), Some(path)) = (state.media, state.input_path.as_ref()) else {
            return;
        };

        // ── Playback mode ─────────────────────────────────────────────────────
        if playing {
            if just_started || ctx.playback.restart {
                ctx.playback.restart = false;
                ctx.pending_pb_frame = None;
                ctx.playback.session =
                    ctx.media_worker.start_playback(id, path.clone(), state.position);
                log::info!("[pb] session {} at {:.3}s", ctx.playback.session, state.position);
            }
            return;
        }

        // ── Transition: playing → paused/stopped ──────────────────────────────
        if just_stopped {
            ctx.media_worker.stop_playback();
            ctx.playback.last_frame_req = None;
            ctx.pending_pb_frame        = None;
        }

        // Seek preview: any position change > ~10ms fires a new decode
        // request. The latest-wins slot in the worker is the rate limiter.
        let moved = ctx.playback.last_frame_req
            .map(|(rid, last_ts)| rid != id || (last_ts - state.position).abs() > 0.010)
            .unwrap_or(true);
        // Pausing leaves the last playback frame on screen; no re-decode.
        let keep_pb_frame = just_stopped && ctx.frame.is_some() && state.position > 0.0;
        if keep_pb_frame {
            ctx.playback.last_frame_req = Some((id, state.position));
        } else if moved && state.video_size.is_some() {
            ctx.playback.last_frame_req = Some((id, state.position));
            ctx.media_worker.request_frame(id, path.clone(), state.position);
        }
    }
}

/// Pick the frame to show at clock time `t`, if one is due.
///
/// `pending` holds the next frame between calls. Frames rejected by
/// `current` (a replaced input, or a session that ended with a seek) are
/// skipped wherever they turn up: a frame decoded before a backward seek is
/// far ahead of the new clock and would otherwise block the slot until the
/// clock caught up with it.
fn take_due_frame(
    pending: &mut Option<PlaybackFrame>,
    rx:      &Receiver<PlaybackFrame>,
    current: impl Fn(&PlaybackFrame) -> bool,
    t:       f64,
) -> Option<PlaybackFrame> {
    let next = || rx.try_iter().find(|f| current(f));

    // Discard a pending frame that can never become due.
    if pending.as_ref().is_some_and(|f| !current(f) || f.timestamp < t - STALE_AFTER) {
        *pending = None;
    }

    // Step 1: fill pending slot if empty.
    if pending.is_none() {
        *pending = next();
    }

    // Step 2: fast-forward past overdue frames.
    while pending.as_ref().is_some_and(|f| f.timestamp < t - LATE_SKIP) {
        match next() {
            Some(newer) => *pending = Some(newer),
            None        => break,
        }
    }

    // Step 3: promote pending frame when its PTS is due.
    let due = pending.as_ref().is_some_and(|f| {
        f.timestamp <= t + EARLY_TOLERANCE && f.timestamp >= t - STALE_AFTER
    });
    if !due {
        return None;
    }
    let shown = pending.take();
    // Pre-pull next frame so it's ready for the next tick.
    *pending = next();
    shown
}

// ── KaraokeModule (no panel) ──────────────────────────────────────────────────

impl KaraokeModule for VideoModule {
    fn name(&self) -> &str { "Video" }

    fn ui(
        &mut self,
        _ui:    &mut egui::Ui,
        _state: &PlayerState,
        _cmd:   &mut Vec<PlayerCommand>,
    ) {
        // No panel: driven entirely by tick() and poll_playback().
    }

    fn tick(&mut self, state: &PlayerState, ctx: &mut AppContext) {
        self.tick_playback(state, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, Sender};
    use uuid::Uuid;

    fn frame(id: Uuid, session: u64, timestamp: f64) -> PlaybackFrame {
        PlaybackFrame { id, session, timestamp, width: 1, height: 1, data: vec![0; 4] }
    }

    fn channel() -> (Sender<PlaybackFrame>, Receiver<PlaybackFrame>) {
        bounded(32)
    }

    #[test]
    fn frame_from_before_a_backward_seek_does_not_block_the_new_session() {
        let id = Uuid::new_v4();
        let (tx, rx) = channel();
        // The decode thread was blocked on a 61 s frame when the seek to 10 s
        // flushed the channel; it lands first.
        tx.send(frame(id, 1, 61.0)).unwrap();
        tx.send(frame(id, 2, 10.0)).unwrap();
        tx.send(frame(id, 2, 10.04)).unwrap();

        let mut pending = None;
        let shown = take_due_frame(&mut pending, &rx, |f| f.id == id && f.session == 2, 10.0);
        assert_eq!(shown.map(|f| f.timestamp), Some(10.0));
        assert_eq!(pending.as_ref().map(|f| f.timestamp), Some(10.04));
    }

    #[test]
    fn pending_frame_from_an_old_session_is_dropped() {
        let id = Uuid::new_v4();
        let (tx, rx) = channel();
        let mut pending = Some(frame(id, 1, 61.0));
        tx.send(frame(id, 2, 10.0)).unwrap();

        let shown = take_due_frame(&mut pending, &rx, |f| f.session == 2, 10.0);
        assert_eq!(shown.map(|f| f.session), Some(2));
    }

    #[test]
    fn early_frame_waits_for_the_clock() {
        let id = Uuid::new_v4();
        let (tx, rx) = channel();
        tx.send(frame(id, 1, 1.0)).unwrap();

        let mut pending = None;
        assert!(take_due_frame(&mut pending, &rx, |_| true, 0.5).is_none());
        assert_eq!(pending.as_ref().map(|f| f.timestamp), Some(1.0));

        let shown = take_due_frame(&mut pending, &rx, |_| true, 1.0);
        assert_eq!(shown.map(|f| f.timestamp), Some(1.0));
        assert!(pending.is_none());
    }

    #[test]
    fn overdue_frames_are_skipped_to_the_latest_due() {
        let id = Uuid::new_v4();
        let (tx, rx) = channel();
        for ts in [0.0, 0.04, 0.08, 0.12, 0.16, 0.5] {
            tx.send(frame(id, 1, ts)).unwrap();
        }

        let mut pending = None;
        let shown = take_due_frame(&mut pending, &rx, |_| true, 0.16);
        assert_eq!(shown.map(|f| f.timestamp), Some(0.16));
        assert_eq!(pending.as_ref().map(|f| f.timestamp), Some(0.5));
    }

    #[test]
    fn frames_of_a_replaced_input_are_never_shown() {
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let (tx, rx) = channel();
        tx.send(frame(old, 1, 0.0)).unwrap();

        let mut pending = None;
        assert!(take_due_frame(&mut pending, &rx, |f| f.id == new, 0.0).is_none());
        assert!(pending.is_none());
        assert!(rx.is_empty());
    }
}
