// crates/karaoke-media/src/decode.rs
//
// LiveDecoder: stateful decoder that walks the video stream forward from a
// seek position, handing out RGBA frames for the monitor.
// decode_frame_at: one-shot frame for refreshing the picture after a seek
// while playback is paused or stopped.

use std::path::{Path, PathBuf};
use anyhow::Result;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use crate::helpers::seek::seek_to_secs;

/// Widest frame the monitor is fed. Larger sources are scaled down so the
/// per-frame texture upload stays cheap; the monitor letterboxes anyway.
pub const MAX_OUTPUT_WIDTH: u32 = 1280;

/// One decoded, scaled RGBA frame.
pub struct DecodedFrame {
    pub data:      Vec<u8>,
    pub width:     u32,
    pub height:    u32,
    /// Seconds from the start of the stream.
    pub timestamp: f64,
}

// ── Stateful decoder ──────────────────────────────────────────────────────────

pub struct LiveDecoder {
    pub path:      PathBuf,
    ictx:          ffmpeg::format::context::Input,
    decoder:       ffmpeg::decoder::video::Video,
    scaler:        SwsContext,
    video_idx:     usize,
    pub last_pts:  i64,
    tb_num:        i32,
    tb_den:        i32,
    out_w:         u32,
    out_h:         u32,
    /// Frame decoded by burn_to_pts that crossed the target; next_frame
    /// returns it before reading further.
    primed:        Option<DecodedFrame>,
    /// Demuxer exhausted and decoder flushed.
    eof:           bool,
}

impl LiveDecoder {
    pub fn open(path: &Path, timestamp: f64) -> Result<Self> {
        let mut ictx = input(path)?;
        let video_idx = ictx.streams().best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream"))?.index();

        let (tb_num, tb_den) = {
            let stream = ictx.stream(video_idx)
                .ok_or_else(|| anyhow::anyhow!("stream gone"))?;
            let tb = stream.time_base();
            (tb.numerator(), tb.denominator().max(1))
        };

        seek_to_secs(&mut ictx, timestamp, "LiveDecoder::open");

        // Second context for decoder params (Parameters borrows from Stream/ictx).
        let ictx2   = input(path)?;
        let stream2 = ictx2.stream(video_idx)
            .ok_or_else(|| anyhow::anyhow!("stream gone"))?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream2.parameters())?;
        let decoder = dec_ctx.decoder().video()?;

        let (out_w, out_h) = fit_output_size(decoder.width(), decoder.height(), MAX_OUTPUT_WIDTH);
        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        let mut d = Self {
            path: path.to_path_buf(), ictx, decoder, scaler, video_idx,
            last_pts: 0, tb_num, tb_den, out_w, out_h,
            primed: None, eof: false,
        };
        d.last_pts = d.ts_to_pts(timestamp);
        Ok(d)
    }

    pub fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num.max(1) as f64) as i64
    }

    pub fn pts_to_secs(&self, pts: i64) -> f64 {
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Decode the next frame in presentation order. None at end of stream.
    pub fn next_frame(&mut self) -> Option<DecodedFrame> {
        if let Some(f) = self.primed.take() {
            return Some(f);
        }
        loop {
            let mut decoded = VideoFrame::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.finish(&decoded);
            }
            if !self.feed() {
                return None;
            }
        }
    }

    /// Decode without scaling until the first frame at or past `target_pts`.
    /// A backward keyframe seek lands before the target; this burns the
    /// pre-roll so the first frame handed out sits at the requested position.
    pub fn burn_to_pts(&mut self, target_pts: i64) {
        self.primed = None;
        loop {
            let mut decoded = VideoFrame::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                if pts >= target_pts {
                    self.primed = self.finish(&decoded);
                    return;
                }
                continue;
            }
            if !self.feed() {
                return;
            }
        }
    }

    /// Push the next video packet into the decoder, or flush it at EOF.
    /// Returns false once there is nothing left to receive.
    fn feed(&mut self) -> bool {
        if self.eof {
            return false;
        }
        let idx = self.video_idx;
        let packet = self.ictx.packets()
            .flatten()
            .find(|(stream, _)| stream.index() == idx)
            .map(|(_, packet)| packet);
        match packet {
            Some(p) => {
                if let Err(e) = self.decoder.send_packet(&p) {
                    log::debug!("[decode] send_packet: {e}");
                }
            }
            None => {
                self.eof = true;
                let _ = self.decoder.send_eof();
            }
        }
        true
    }

    fn finish(&mut self, decoded: &VideoFrame) -> Option<DecodedFrame> {
        let pts = decoded.pts().unwrap_or(self.last_pts + 1);
        self.last_pts = pts;
        let mut out = VideoFrame::empty();
        if let Err(e) = self.scaler.run(decoded, &mut out) {
            log::warn!("[decode] scale failed: {e}");
            return None;
        }
        Some(DecodedFrame {
            data:      destripe(&out, self.out_w, self.out_h),
            width:     self.out_w,
            height:    self.out_h,
            timestamp: self.pts_to_secs(pts),
        })
    }
}

// ── One-shot decode ───────────────────────────────────────────────────────────

/// Decode the frame shown at `timestamp` seconds into `path`.
pub fn decode_frame_at(path: &Path, timestamp: f64) -> Result<DecodedFrame> {
    let mut d = LiveDecoder::open(path, timestamp)?;
    let target = d.ts_to_pts(timestamp);
    d.burn_to_pts(target);
    d.next_frame()
        .ok_or_else(|| anyhow::anyhow!("no frame found at t={timestamp:.3}"))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Output dimensions for a `raw_w`×`raw_h` source no wider than `max_w`.
/// Both sides are even and at least 2 (swscale and most encoders want that).
pub fn fit_output_size(raw_w: u32, raw_h: u32, max_w: u32) -> (u32, u32) {
    let (w, h) = if raw_w > max_w && raw_w > 0 {
        let h = (max_w as f64 * raw_h as f64 / raw_w as f64).round() as u32;
        (max_w, h)
    } else {
        (raw_w, raw_h)
    };
    ((w & !1).max(2), (h & !1).max(2))
}

/// Copy only the visible pixels of plane 0, dropping stride padding.
fn destripe(frame: &VideoFrame, w: u32, h: u32) -> Vec<u8> {
    let stride    = frame.stride(0);
    let raw       = frame.data(0);
    let row_bytes = w as usize * 4;
    (0..h as usize)
        .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_sources_keep_native_size() {
        assert_eq!(fit_output_size(640, 360, 1280), (640, 360));
    }

    #[test]
    fn wide_sources_are_scaled_to_max_width() {
        assert_eq!(fit_output_size(1920, 1080, 1280), (1280, 720));
        assert_eq!(fit_output_size(3840, 1600, 1280), (1280, 532));
    }

    #[test]
    fn odd_and_zero_sizes_are_made_even() {
        assert_eq!(fit_output_size(641, 361, 1280), (640, 360));
        assert_eq!(fit_output_size(0, 0, 1280), (2, 2));
    }
}
