// crates/karaoke-media/src/helpers/seek.rs
//
// Seek helper wrapping ffmpeg's avformat seek with a soft-fail policy.
// Every seek in the crate routes through here so the EPERM-at-zero guard and
// the warning live in one place.

use ffmpeg_the_third as ffmpeg;

/// Seek `ictx` to the keyframe at or before `target_secs`.
///
/// Returns `true` if the seek succeeded (or was skipped because target is 0).
/// Returns `false` on failure; the demuxer keeps decoding from wherever it
/// is and the caller's PTS filtering (`burn_to_pts`) still lands on the right
/// frame, just more slowly.
///
/// A backward seek (`..=seek_ts`) is used so the frame at `target_secs` is
/// always reachable by decoding forward from the landing keyframe.
/// At 0.0 the seek is skipped: `avformat_seek_file(max_ts=0)` returns EPERM
/// on some platforms for a freshly opened context, and the demuxer already
/// starts there.
pub fn seek_to_secs(
    ictx: &mut ffmpeg::format::context::Input,
    target_secs: f64,
    label: &str,
) -> bool {
    if target_secs <= 0.0 {
        return true;
    }

    let seek_ts = (target_secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
    match ictx.seek(seek_ts, ..=seek_ts) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("[seek] soft-fail in {label} at {target_secs:.3}s: {e}");
            false
        }
    }
}
