// crates/karaoke-media/src/recorder.rs
//
// AudioRecorder: captures the default input device (the singer's microphone)
// into a 16-bit PCM WAV file while the video plays.
//
// cpal::Stream is not Send, so each recording session owns a dedicated
// capture thread that builds the stream, keeps it alive until stop() is
// called, then drops it and finalizes the WAV. The capture callback writes
// straight into the WAV writer behind a parking_lot mutex.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use thiserror::Error;

use karaoke_core::config::RECORDING_EXT;

type WavOut = hound::WavWriter<BufWriter<File>>;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("no audio input device available")]
    NoInputDevice,

    #[error("already recording")]
    AlreadyRecording,

    #[error("not recording")]
    NotRecording,

    #[error("unsupported input sample format: {0}")]
    UnsupportedFormat(String),

    #[error("capture thread panicked")]
    ThreadDied,

    #[error("input config error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("audio stream error: {0}")]
    Stream(#[from] cpal::BuildStreamError),

    #[error("audio play error: {0}")]
    Play(#[from] cpal::PlayStreamError),

    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Native format of the device a session captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
    pub sample_rate: u32,
    pub channels:    u16,
}

/// Returned by `stop()` once the WAV is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub path:        PathBuf,
    /// Sample frames (one sample per channel) written.
    pub frames:      u64,
    pub sample_rate: u32,
    pub channels:    u16,
}

impl RecordingSummary {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

struct Session {
    stop_tx: Sender<()>,
    handle:  JoinHandle<Result<RecordingSummary, RecordError>>,
}

#[derive(Default)]
pub struct AudioRecorder {
    session: Option<Session>,
}

impl AudioRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Start capturing the default input device into `path`.
    ///
    /// Returns the path actually written (a missing extension gets `.wav`).
    /// Blocks only until the capture stream is running, so device and file
    /// errors come back here rather than being lost on the capture thread.
    pub fn record(&mut self, path: &Path) -> Result<PathBuf, RecordError> {
        if self.session.is_some() {
            return Err(RecordError::AlreadyRecording);
        }
        let path = normalize_output_path(path);

        let (stop_tx, stop_rx)   = bounded::<()>(1);
        let (ready_tx, ready_rx) = bounded::<InputFormat>(1);
        let thread_path = path.clone();
        let handle = thread::Builder::new()
            .name("karaoke-rec".into())
            .spawn(move || capture(thread_path, stop_rx, ready_tx))?;

        // The thread drops ready_tx without sending when the stream fails
        // to start; its return value then carries the reason.
        match ready_rx.recv() {
            Ok(format) => {
                log::info!(
                    "[rec] recording → {} ({} Hz, {} ch)",
                    path.display(), format.sample_rate, format.channels,
                );
                self.session = Some(Session { stop_tx, handle });
                Ok(path)
            }
            Err(_) => match handle.join() {
                Ok(Err(e)) => Err(e),
                _          => Err(RecordError::ThreadDied),
            },
        }
    }

    /// Stop the current session and finalize its WAV file.
    pub fn stop(&mut self) -> Result<RecordingSummary, RecordError> {
        let session = self.session.take().ok_or(RecordError::NotRecording)?;
        let _ = session.stop_tx.send(());
        let summary = session.handle.join().map_err(|_| RecordError::ThreadDied)??;
        log::info!(
            "[rec] stopped, {:.2}s written to {}",
            summary.duration_secs(), summary.path.display(),
        );
        Ok(summary)
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Err(e) = self.stop() {
                log::error!("[rec] stop on drop: {e}");
            }
        }
    }
}

/// Append the recording extension when the chosen path has none.
pub fn normalize_output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(RECORDING_EXT)
    }
}

// ── Capture thread ────────────────────────────────────────────────────────────

fn capture(
    path:     PathBuf,
    stop_rx:  Receiver<()>,
    ready_tx: Sender<InputFormat>,
) -> Result<RecordingSummary, RecordError> {
    let (stream, sink, format) = open_input(&path)?;
    let _ = ready_tx.send(format);

    // Sender dropped or stop requested: either way the session is over.
    let _ = stop_rx.recv();
    drop(stream);

    let samples = sink.lock().finish()?;
    Ok(RecordingSummary {
        path,
        frames:      samples / format.channels.max(1) as u64,
        sample_rate: format.sample_rate,
        channels:    format.channels,
    })
}

fn open_input(
    path: &Path,
) -> Result<(cpal::Stream, Arc<Mutex<SampleSink>>, InputFormat), RecordError> {
    let host   = cpal::default_host();
    let device = host.default_input_device().ok_or(RecordError::NoInputDevice)?;
    if let Ok(name) = device.name() {
        log::info!("[rec] input device: {name}");
    }

    let supported = device.default_input_config()?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.config();
    let format = InputFormat {
        sample_rate: config.sample_rate.0,
        channels:    config.channels,
    };

    let sink = Arc::new(Mutex::new(SampleSink::create(path, wav_spec(format))?));

    match start_stream(&device, &config, sample_format, &sink) {
        Ok(stream) => Ok((stream, sink, format)),
        Err(e) => {
            // Nothing was captured; don't leave a header-only file behind.
            drop(sink);
            let _ = std::fs::remove_file(path);
            Err(e)
        }
    }
}

fn start_stream(
    device:        &cpal::Device,
    config:        &cpal::StreamConfig,
    sample_format: SampleFormat,
    sink:          &Arc<Mutex<SampleSink>>,
) -> Result<cpal::Stream, RecordError> {
    let sink = Arc::clone(sink);
    let stream = match sample_format {
        SampleFormat::I8  => build_stream::<i8>(device, config, sink)?,
        SampleFormat::I16 => build_stream::<i16>(device, config, sink)?,
        SampleFormat::I32 => build_stream::<i32>(device, config, sink)?,
        SampleFormat::U8  => build_stream::<u8>(device, config, sink)?,
        SampleFormat::U16 => build_stream::<u16>(device, config, sink)?,
        SampleFormat::F32 => build_stream::<f32>(device, config, sink)?,
        SampleFormat::F64 => build_stream::<f64>(device, config, sink)?,
        other => return Err(RecordError::UnsupportedFormat(format!("{other:?}"))),
    };
    stream.play()?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sink:   Arc<Mutex<SampleSink>>,
) -> Result<cpal::Stream, RecordError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            sink.lock().push(data.iter().map(|&s| i16::from_sample(s)));
        },
        |err| log::error!("[rec] stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

fn wav_spec(format: InputFormat) -> hound::WavSpec {
    hound::WavSpec {
        channels:        format.channels,
        sample_rate:     format.sample_rate,
        bits_per_sample: 16,
        sample_format:   hound::SampleFormat::Int,
    }
}

// ── SampleSink ────────────────────────────────────────────────────────────────

/// The WAV writer as seen from the capture callback. A write error stops
/// further writes and is reported by finish().
struct SampleSink {
    writer:  Option<WavOut>,
    samples: u64,
    error:   Option<hound::Error>,
}

impl SampleSink {
    fn create(path: &Path, spec: hound::WavSpec) -> Result<Self, RecordError> {
        Ok(Self {
            writer:  Some(hound::WavWriter::create(path, spec)?),
            samples: 0,
            error:   None,
        })
    }

    fn push<I: IntoIterator<Item = i16>>(&mut self, samples: I) {
        let Some(writer) = self.writer.as_mut() else { return };
        let mut written = 0u64;
        let result = samples.into_iter().try_for_each(|s| {
            writer.write_sample(s)?;
            written += 1;
            Ok::<(), hound::Error>(())
        });
        self.samples += written;
        if let Err(e) = result {
            log::error!("[rec] WAV write failed, dropping further input: {e}");
            self.writer = None;
            self.error  = Some(e);
        }
    }

    /// Finalize the file. Returns the total number of samples written.
    fn finish(&mut self) -> Result<u64, RecordError> {
        if let Some(e) = self.error.take() {
            return Err(e.into());
        }
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(channels: u16) -> hound::WavSpec {
        wav_spec(InputFormat { sample_rate: 48_000, channels })
    }

    #[test]
    fn extension_is_added_only_when_missing() {
        assert_eq!(normalize_output_path(Path::new("/tmp/take1")), PathBuf::from("/tmp/take1.wav"));
        assert_eq!(normalize_output_path(Path::new("/tmp/take1.wav")), PathBuf::from("/tmp/take1.wav"));
        assert_eq!(normalize_output_path(Path::new("/tmp/take1.flac")), PathBuf::from("/tmp/take1.flac"));
    }

    #[test]
    fn sink_writes_readable_wav() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocals.wav");
        let mut sink = SampleSink::create(&path, spec(2)).unwrap();
        sink.push([0i16, 1, -1, i16::MAX, i16::MIN, 7]);
        sink.push(vec![3i16, 4]);
        assert_eq!(sink.finish().unwrap(), 8);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 48_000);
        assert_eq!(reader.spec().bits_per_sample, 16);
        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 1, -1, i16::MAX, i16::MIN, 7, 3, 4]);
    }

    #[test]
    fn push_after_finish_is_ignored() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.wav");
        let mut sink = SampleSink::create(&path, spec(1)).unwrap();
        sink.push([1i16, 2]);
        assert_eq!(sink.finish().unwrap(), 2);
        sink.push([3i16]);
        assert_eq!(sink.finish().unwrap(), 2);
    }

    #[test]
    fn sink_in_missing_directory_fails() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("vocals.wav");
        assert!(matches!(SampleSink::create(&path, spec(1)), Err(RecordError::Wav(_))));
    }

    #[test]
    fn summary_duration_uses_frames() {
        let s = RecordingSummary {
            path: PathBuf::from("x.wav"), frames: 96_000, sample_rate: 48_000, channels: 2,
        };
        assert!((s.duration_secs() - 2.0).abs() < 1e-9);
        let empty = RecordingSummary { sample_rate: 0, ..s };
        assert_eq!(empty.duration_secs(), 0.0);
    }

    #[test]
    fn captured_samples_convert_to_i16() {
        assert_eq!(i16::from_sample(0.0f32), 0);
        assert_eq!(i16::from_sample(-1.0f32), i16::MIN);
        assert_eq!(i16::from_sample(128u8), 0);
        assert_eq!(i16::from_sample(1234i16), 1234);
    }

    #[test]
    fn failed_start_reports_the_cause() {
        // Either there is no microphone here or the directory is missing;
        // both must come back from record() and leave the recorder idle.
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("take");
        let mut rec = AudioRecorder::new();
        let err = rec.record(&path).unwrap_err();
        assert!(!matches!(err, RecordError::ThreadDied), "{err}");
        assert!(!rec.is_recording());
    }

    #[test]
    fn idle_recorder_state() {
        let mut rec = AudioRecorder::new();
        assert!(!rec.is_recording());
        assert!(matches!(rec.stop(), Err(RecordError::NotRecording)));
    }
}
