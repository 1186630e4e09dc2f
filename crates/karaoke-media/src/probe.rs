// crates/karaoke-media/src/probe.rs
//
// In-process FFmpeg probing: duration and video dimensions.

use std::path::Path;
use anyhow::Result;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

/// What the monitor and seek slider need to know about an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Seconds; 0.0 when neither container nor stream reports one.
    pub duration:   f64,
    /// None for audio-only inputs.
    pub video_size: Option<(u32, u32)>,
    pub has_audio:  bool,
}

pub fn probe_media(path: &Path) -> Result<MediaInfo> {
    let ictx = input(path)?;

    let mut duration = ctx_duration_secs(ictx.duration());
    if duration <= 0.0 {
        // Fall back to the stream duration.
        if let Some(stream) = ictx.streams().best(Type::Video)
            .or_else(|| ictx.streams().best(Type::Audio))
        {
            let tb = stream.time_base();
            duration = stream.duration() as f64 * tb.numerator() as f64
                / tb.denominator().max(1) as f64;
        }
    }
    let duration = if duration.is_finite() && duration > 0.0 { duration } else { 0.0 };

    let video_size = match ictx.streams().best(Type::Video) {
        Some(stream) => {
            let (w, h) = unsafe {
                let p = stream.parameters().as_ptr();
                ((*p).width as u32, (*p).height as u32)
            };
            (w > 0 && h > 0).then_some((w, h))
        }
        None => None,
    };
    let has_audio = ictx.streams().best(Type::Audio).is_some();

    log::info!(
        "[media] probed {}: {duration:.2}s video={video_size:?} audio={has_audio}",
        path.display(),
    );
    Ok(MediaInfo { duration, video_size, has_audio })
}

/// Container duration (AV_TIME_BASE units) in seconds. AV_NOPTS_VALUE and
/// other negatives come back as 0.
fn ctx_duration_secs(raw: i64) -> f64 {
    if raw <= 0 {
        return 0.0;
    }
    raw as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_duration_is_converted_from_microseconds() {
        assert!((ctx_duration_secs(2_500_000) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_container_duration_is_zero() {
        assert_eq!(ctx_duration_secs(i64::MIN), 0.0);
        assert_eq!(ctx_duration_secs(0), 0.0);
    }

    #[test]
    fn missing_file_is_an_error() {
        ffmpeg::init().ok();
        assert!(probe_media(Path::new("/definitely/not/here.mp4")).is_err());
    }
}
