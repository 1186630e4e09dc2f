// crates/karaoke-media/src/worker.rs
//
// MediaWorker: owns the background threads behind the player.
//   - open():           probe + audio-track extraction, one thread per input
//   - request_frame():  latest-wins seek preview decode (paused / stopped)
//   - start_playback(): dedicated decode thread feeding a bounded frame channel
// All public API that karaoke-ui calls lives here.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use karaoke_core::media_types::{MediaResult, PlaybackFrame};

use crate::audio::extract_audio;
use crate::decode::{decode_frame_at, LiveDecoder};
use crate::probe::probe_media;

// ── Internal types ────────────────────────────────────────────────────────────

struct FrameRequest {
    id:        Uuid,
    path:      PathBuf,
    timestamp: f64,
}

enum PlaybackCmd {
    Start { id: Uuid, session: u64, path: PathBuf, ts: f64 },
    Stop,
}

/// Latest-wins request slot. `None` inside the mutex means "nothing pending";
/// the bool is the shutdown poison pill.
type FrameSlot = Arc<(Mutex<(Option<FrameRequest>, bool)>, Condvar)>;

/// Same shape for the playback thread. A slider drag while playing posts a
/// Start per UI frame; only the last one is ever opened.
type PlaybackSlot = Arc<(Mutex<(Option<PlaybackCmd>, bool)>, Condvar)>;

// ── MediaWorker ───────────────────────────────────────────────────────────────

pub struct MediaWorker {
    /// Shared result channel: probe results, audio paths, seek frames, errors.
    pub rx:    Receiver<MediaResult>,
    tx:        Sender<MediaResult>,
    frame_req: FrameSlot,
    /// Dedicated playback pipeline.
    pb_cmd:     PlaybackSlot,
    pb_session: AtomicU64,
    pub pb_rx:  Receiver<PlaybackFrame>,
    shutdown:   Arc<AtomicBool>,
}

impl Default for MediaWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaWorker {
    pub fn new() -> Self {
        let (tx, rx) = bounded(64);
        let frame_req: FrameSlot = Arc::new((Mutex::new((None, false)), Condvar::new()));

        // ── Seek preview thread ───────────────────────────────────────────────
        // Blocks on the latest-wins slot. Rapid slider drags overwrite the
        // pending request, so only the freshest position is ever decoded.
        let seek_tx = tx.clone();
        let slot    = Arc::clone(&frame_req);
        thread::spawn(move || loop {
            let req = {
                let (lock, cvar) = &*slot;
                let mut guard = lock.lock();
                loop {
                    if guard.1 { return; }
                    if let Some(req) = guard.0.take() { break req; }
                    cvar.wait(&mut guard);
                }
            };
            match decode_frame_at(&req.path, req.timestamp) {
                Ok(f) => {
                    let _ = seek_tx.send(MediaResult::VideoFrame {
                        id: req.id, width: f.width, height: f.height, data: f.data,
                    });
                }
                Err(e) => log::debug!("[media] seek frame: {e}"),
            }
        });

        // ── Dedicated playback decode thread ──────────────────────────────────
        // Runs ahead of the UI filling a bounded channel; send() blocking on a
        // full channel IS the rate limiter. 32 frames ≈ 1 s at 30 fps.
        let pb_cmd: PlaybackSlot = Arc::new((Mutex::new((None, false)), Condvar::new()));
        let (pb_frame_tx, pb_rx) = bounded::<PlaybackFrame>(32);

        let ctl = Arc::clone(&pb_cmd);
        thread::spawn(move || {
            let mut decoder: Option<(Uuid, u64, LiveDecoder)> = None;
            loop {
                // Idle: block until a command arrives. Decoding: just peek.
                let cmd = {
                    let (lock, cvar) = &*ctl;
                    let mut guard = lock.lock();
                    while decoder.is_none() && guard.0.is_none() && !guard.1 {
                        cvar.wait(&mut guard);
                    }
                    if guard.1 { return; }
                    guard.0.take()
                };

                match cmd {
                    Some(PlaybackCmd::Start { id, session, path, ts }) => {
                        decoder = open_for_playback(&path, ts).map(|d| (id, session, d));
                        continue;
                    }
                    Some(PlaybackCmd::Stop) => {
                        decoder = None;
                        continue;
                    }
                    None => {}
                }

                if let Some((id, session, d)) = decoder.as_mut() {
                    match d.next_frame() {
                        Some(f) => {
                            let frame = PlaybackFrame {
                                id:        *id,
                                session:   *session,
                                timestamp: f.timestamp,
                                width:     f.width,
                                height:    f.height,
                                data:      f.data,
                            };
                            if pb_frame_tx.send(frame).is_err() { return; }
                        }
                        None => { decoder = None; } // EOF
                    }
                }
            }
        });

        Self {
            rx, tx, frame_req, pb_cmd, pb_rx,
            pb_session: AtomicU64::new(0),
            shutdown:   Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Wake both slot threads with the poison pill so they exit instead
        // of blocking forever on their condvars.
        let (lock, cvar) = &*self.pb_cmd;
        lock.lock().1 = true;
        cvar.notify_one();
        let (lock, cvar) = &*self.frame_req;
        lock.lock().1 = true;
        cvar.notify_one();
    }

    /// Probe `path` and extract its audio track for media `id`.
    /// Results arrive on `rx`: Duration, VideoSize, AudioPath, or Error.
    pub fn open(&self, id: Uuid, path: PathBuf) {
        let tx = self.tx.clone();
        let sd = self.shutdown.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            let info = match probe_media(&path) {
                Ok(info) => info,
                Err(e) => {
                    let _ = tx.send(MediaResult::Unplayable {
                        id, msg: format!("cannot open '{}': {e}", path.display()),
                    });
                    return;
                }
            };
            let _ = tx.send(MediaResult::Duration { id, seconds: info.duration });
            if let Some((width, height)) = info.video_size {
                let _ = tx.send(MediaResult::VideoSize { id, width, height });
            }

            if sd.load(Ordering::Relaxed) || !info.has_audio { return; }
            match extract_audio(&path, id) {
                Ok(wav) => { let _ = tx.send(MediaResult::AudioPath { id, path: wav }); }
                Err(e)  => { let _ = tx.send(MediaResult::Error { id, msg: format!("{e:#}") }); }
            }
        });
    }

    /// Decode the frame at `timestamp` for the monitor. Overwrites any
    /// pending request, so the seek thread always gets the freshest one.
    pub fn request_frame(&self, id: Uuid, path: PathBuf, timestamp: f64) {
        let (lock, cvar) = &*self.frame_req;
        lock.lock().0 = Some(FrameRequest { id, path, timestamp });
        cvar.notify_one();
    }

    /// Start the playback pipeline at `ts` seconds into `path`.
    ///
    /// Returns the session its frames will carry. A frame the decode thread
    /// was blocked on when this was called still lands in `pb_rx` after the
    /// flush below, tagged with the previous session.
    pub fn start_playback(&self, id: Uuid, path: PathBuf, ts: f64) -> u64 {
        let session = self.pb_session.fetch_add(1, Ordering::Relaxed) + 1;
        self.post_playback(PlaybackCmd::Start { id, session, path, ts });
        while self.pb_rx.try_recv().is_ok() {}
        session
    }

    pub fn stop_playback(&self) {
        self.post_playback(PlaybackCmd::Stop);
        while self.pb_rx.try_recv().is_ok() {}
    }

    /// Overwrites whatever command the decode thread has not picked up yet.
    fn post_playback(&self, cmd: PlaybackCmd) {
        let (lock, cvar) = &*self.pb_cmd;
        lock.lock().0 = Some(cmd);
        cvar.notify_one();
    }
}

/// Open a decoder at `ts` and burn to the exact position before the first
/// send, so the first frame out of the channel is already on time.
fn open_for_playback(path: &std::path::Path, ts: f64) -> Option<LiveDecoder> {
    match LiveDecoder::open(path, ts) {
        Ok(mut d) => {
            let target = d.ts_to_pts(ts);
            d.burn_to_pts(target);
            Some(d)
        }
        Err(e) => {
            // Audio-only inputs land here too; the audio sink still plays.
            log::info!("[pb] no video pipeline for {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn open_missing_file_reports_error_for_that_media() {
        ffmpeg_the_third::init().ok();
        let worker = MediaWorker::new();
        let id = Uuid::new_v4();
        worker.open(id, PathBuf::from("/definitely/not/here.mp4"));

        let result = worker.rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(matches!(result, MediaResult::Unplayable { id: rid, .. } if rid == id));
        worker.shutdown();
    }

    #[test]
    fn every_start_gets_a_newer_session() {
        let worker = MediaWorker::new();
        let id   = Uuid::new_v4();
        let path = PathBuf::from("/definitely/not/here.mp4");
        let a = worker.start_playback(id, path.clone(), 0.0);
        let b = worker.start_playback(id, path.clone(), 5.0);
        let c = worker.start_playback(id, path, 1.0);
        assert!(a < b && b < c);
        worker.shutdown();
    }

    #[test]
    fn rapid_starts_keep_only_the_last() {
        let worker = MediaWorker::new();
        // Once shut down the decode thread never takes from the slot again,
        // so what is left in it is whatever was posted last.
        worker.shutdown();
        let id = Uuid::new_v4();
        for ts in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0] {
            worker.start_playback(id, PathBuf::from("/x.mp4"), ts);
        }
        let pending = worker.pb_cmd.0.lock().0.take();
        assert!(matches!(pending, Some(PlaybackCmd::Start { ts, .. }) if ts == 6.0));
    }

    #[test]
    fn stop_without_start_leaves_no_frames() {
        let worker = MediaWorker::new();
        worker.stop_playback();
        assert!(worker.pb_rx.try_recv().is_err());
        worker.shutdown();
    }
}
