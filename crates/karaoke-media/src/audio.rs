// crates/karaoke-media/src/audio.rs
//
// Audio-track extraction (WAV for rodio playback) and temp file cleanup.
//
// rodio can decode some containers itself, but not the video containers a
// karaoke track usually comes in. The audio stream is decoded in-process with
// ffmpeg-the-third, resampled to 44.1 kHz stereo f32 and streamed straight
// into a temp WAV, which the output sink then plays and seeks in.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use anyhow::{Context as _, Result};
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::sample::{Sample, Type as SampleType};
use ffmpeg::media::Type as MediaType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;

use karaoke_core::config::PLAYBACK_SAMPLE_RATE;

/// Interleaved f32, which is what rodio's WAV decoder reads without conversion.
const OUT_FMT:    Sample        = Sample::F32(SampleType::Packed);
const OUT_LAYOUT: ChannelLayout = ChannelLayout::STEREO;
const OUT_CHANNELS: u16 = 2;

const TEMP_PREFIX: &str = "karaoke_audio_";

type WavOut = hound::WavWriter<BufWriter<File>>;

// ── Public API ────────────────────────────────────────────────────────────────

/// Temp path the audio track of media `id` is extracted to.
pub fn audio_temp_path(id: Uuid) -> PathBuf {
    std::env::temp_dir().join(format!("{TEMP_PREFIX}{id}.wav"))
}

/// Decode the audio track of `path` into a temp WAV and return its path.
pub fn extract_audio(path: &Path, id: Uuid) -> Result<PathBuf> {
    let wav_path = audio_temp_path(id);
    let frames = decode_to_wav(path, &wav_path)
        .with_context(|| format!("audio extract for '{}'", path.display()))?;
    log::info!(
        "[media] audio WAV written ({frames} frames) ← {}",
        path.display(),
    );
    Ok(wav_path)
}

/// Delete a temp WAV written by `extract_audio`.
/// Refuses anything that is not a `karaoke_audio_*.wav` in the OS temp dir.
pub fn cleanup_audio_temp(path: &Path) {
    if !is_audio_temp(path) {
        return;
    }
    match std::fs::remove_file(path) {
        Ok(())  => log::info!("[media] cleaned up temp WAV: {}", path.display()),
        Err(e)  => log::warn!("[media] cleanup_audio_temp: {e}"),
    }
}

fn is_audio_temp(path: &Path) -> bool {
    let in_temp = path.parent()
        .map(|p| p == std::env::temp_dir())
        .unwrap_or(false);
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    in_temp && name.starts_with(TEMP_PREFIX) && name.ends_with(".wav")
}

// ── Internal implementation ───────────────────────────────────────────────────

/// Returns the number of stereo frames written.
fn decode_to_wav(src: &Path, dst: &Path) -> Result<u64> {
    let mut ictx = input(src).context("open")?;

    let audio_stream_idx = ictx
        .streams()
        .best(MediaType::Audio)
        .ok_or_else(|| anyhow::anyhow!("no audio stream"))?
        .index();

    let mut decoder = {
        let stream = ictx.stream(audio_stream_idx)
            .ok_or_else(|| anyhow::anyhow!("stream gone"))?;
        let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .context("codec context")?;
        dec_ctx.decoder().audio().context("audio decoder")?
    };

    let spec = hound::WavSpec {
        channels:        OUT_CHANNELS,
        sample_rate:     PLAYBACK_SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format:   hound::SampleFormat::Float,
    };
    let mut wav = hound::WavWriter::create(dst, spec).context("create WAV")?;

    // The resampler is built lazily on the first decoded frame, once the real
    // source format/layout/rate is known.
    let mut resampler: Option<resampling::Context> = None;

    for (stream, packet) in ictx.packets().flatten() {
        if stream.index() != audio_stream_idx { continue; }
        if decoder.send_packet(&packet).is_err() { continue; }

        let mut frame = AudioFrame::empty();
        while decoder.receive_frame(&mut frame).is_ok() {
            append_resampled(&frame, &mut resampler, &mut wav)?;
        }
    }

    let _ = decoder.send_eof();
    let mut frame = AudioFrame::empty();
    while decoder.receive_frame(&mut frame).is_ok() {
        append_resampled(&frame, &mut resampler, &mut wav)?;
    }

    let frames = wav.len() as u64 / OUT_CHANNELS as u64;
    wav.finalize().context("finalize WAV")?;

    if frames == 0 {
        let _ = std::fs::remove_file(dst);
        anyhow::bail!("no audio samples decoded");
    }
    Ok(frames)
}

/// Resample `frame` to OUT_FMT/OUT_LAYOUT/PLAYBACK_SAMPLE_RATE and write it.
fn append_resampled(
    frame:     &AudioFrame,
    resampler: &mut Option<resampling::Context>,
    wav:       &mut WavOut,
) -> Result<()> {
    let src_channels = frame.ch_layout().channels();
    let needs_resample = frame.format() != OUT_FMT
        || frame.rate()                != PLAYBACK_SAMPLE_RATE
        || src_channels                != 2;

    if !needs_resample {
        return write_packed_f32(frame, wav);
    }

    if resampler.is_none() {
        // Mono sources must be declared MONO so swr doesn't misread the count.
        let src_layout = if src_channels >= 2 {
            frame.ch_layout()
        } else {
            ChannelLayout::MONO
        };
        let ctx = resampling::Context::get2(
            frame.format(), src_layout, frame.rate(),
            OUT_FMT,        OUT_LAYOUT, PLAYBACK_SAMPLE_RATE,
        ).context("create audio resampler")?;
        *resampler = Some(ctx);
    }

    if let Some(rs) = resampler.as_mut() {
        let mut resampled = AudioFrame::empty();
        if rs.run(frame, &mut resampled).is_ok() && resampled.samples() > 0 {
            write_packed_f32(&resampled, wav)?;
        }
    }
    Ok(())
}

/// OUT_FMT is packed, so every channel's data sits interleaved in plane 0.
fn write_packed_f32(frame: &AudioFrame, wav: &mut WavOut) -> Result<()> {
    let want  = frame.samples() * OUT_CHANNELS as usize;
    let bytes = frame.data(0);
    for b in bytes.chunks_exact(4).take(want) {
        wav.write_sample(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_matches_cleanup_filter() {
        let p = audio_temp_path(Uuid::new_v4());
        assert!(is_audio_temp(&p));
    }

    #[test]
    fn cleanup_refuses_foreign_files() {
        assert!(!is_audio_temp(Path::new("/home/me/song.wav")));
        let other = std::env::temp_dir().join("someone_else.wav");
        assert!(!is_audio_temp(&other));
        let wrong_ext = std::env::temp_dir().join(format!("{TEMP_PREFIX}x.mp3"));
        assert!(!is_audio_temp(&wrong_ext));
    }

    #[test]
    fn cleanup_removes_extracted_temp() {
        let p = audio_temp_path(Uuid::new_v4());
        std::fs::write(&p, b"RIFF").unwrap();
        cleanup_audio_temp(&p);
        assert!(!p.exists());
    }
}
