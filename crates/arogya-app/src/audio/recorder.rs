//! Raw microphone capture.
//!
//! cpal streams are not `Send`, so the stream lives on a dedicated thread
//! for the whole recording: the thread opens the default input device,
//! buffers samples pushed by the audio callback, and on stop releases the
//! device and encodes the take as an in-memory WAV.

use std::io::Cursor;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::{Context, Result, anyhow, bail};
use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Handle to an in-progress recording. Dropping it without calling
/// [`stop`](Recorder::stop) abandons the take (the thread winds down and
/// the buffered chunks are discarded).
#[derive(Debug)]
pub struct Recorder {
    stop_tx: Sender<()>,
    result_rx: Receiver<Result<Vec<u8>>>,
    thread: Option<JoinHandle<()>>,
}

impl Recorder {
    /// Acquires the default input device and starts buffering.
    ///
    /// Blocks briefly for the device handshake; fails when there is no
    /// input device or the stream cannot be opened.
    pub fn start() -> Result<Self> {
        let (ready_tx, ready_rx) = channel::<Result<()>>();
        let (stop_tx, stop_rx) = channel::<()>();
        let (result_tx, result_rx) = channel::<Result<Vec<u8>>>();

        let thread = std::thread::Builder::new()
            .name("arogya-recorder".to_string())
            .spawn(move || capture_thread(&ready_tx, &stop_rx, &result_tx))
            .context("Failed to spawn recorder thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                stop_tx,
                result_rx,
                thread: Some(thread),
            }),
            Ok(Err(error)) => {
                let _ = thread.join();
                Err(error)
            }
            Err(_) => {
                let _ = thread.join();
                Err(anyhow!("Recorder thread exited during setup"))
            }
        }
    }

    /// Stops the recording, releases the device, and returns the take as
    /// WAV bytes.
    pub fn stop(mut self) -> Result<Vec<u8>> {
        let _ = self.stop_tx.send(());
        let result = self
            .result_rx
            .recv()
            .map_err(|_| anyhow!("Recorder thread exited before delivering audio"))?;
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        result
    }
}

fn capture_thread(
    ready_tx: &Sender<Result<()>>,
    stop_rx: &Receiver<()>,
    result_tx: &Sender<Result<Vec<u8>>>,
) {
    let samples: Arc<Mutex<Vec<i16>>> = Arc::default();

    let setup = open_input_stream(&samples);
    let (stream, spec) = match setup {
        Ok(parts) => parts,
        Err(error) => {
            let _ = ready_tx.send(Err(error));
            return;
        }
    };

    let _ = ready_tx.send(Ok(()));

    // Block until stop is requested, or the handle is dropped entirely
    // (abandoned take).
    let stop_requested = stop_rx.recv().is_ok();

    // Release the device before encoding.
    drop(stream);

    if !stop_requested {
        return;
    }

    let buffered = samples.lock().map(|buffer| buffer.clone()).unwrap_or_default();
    let _ = result_tx.send(encode_wav(&buffered, spec));
}

struct TakeSpec {
    channels: u16,
    sample_rate: u32,
}

fn open_input_stream(samples: &Arc<Mutex<Vec<i16>>>) -> Result<(cpal::Stream, TakeSpec)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No default audio input device"))?;
    let config = device
        .default_input_config()
        .context("Failed to query input device configuration")?;

    let spec = TakeSpec {
        channels: config.channels(),
        sample_rate: config.sample_rate().0,
    };

    let err_fn = |error| tracing::warn!("Audio input stream error: {error}");

    let stream = match config.sample_format() {
        SampleFormat::I16 => {
            let buffer = Arc::clone(samples);
            device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend_from_slice(data);
                    }
                },
                err_fn,
                None,
            )
        }
        SampleFormat::F32 => {
            let buffer = Arc::clone(samples);
            device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend(
                            data.iter()
                                .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16),
                        );
                    }
                },
                err_fn,
                None,
            )
        }
        SampleFormat::U16 => {
            let buffer = Arc::clone(samples);
            device.build_input_stream(
                &config.into(),
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buffer) = buffer.lock() {
                        buffer.extend(data.iter().map(|&s| (i32::from(s) - 32768) as i16));
                    }
                },
                err_fn,
                None,
            )
        }
        other => bail!("Unsupported input sample format: {other}"),
    }
    .context("Failed to open audio input stream")?;

    stream.play().context("Failed to start audio input stream")?;

    Ok((stream, spec))
}

/// Encodes buffered samples as a 16-bit PCM WAV in memory.
fn encode_wav(samples: &[i16], spec: TakeSpec) -> Result<Vec<u8>> {
    let wav_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec)
            .context("Failed to start WAV encoding")?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .context("Failed to encode audio sample")?;
        }
        writer.finalize().context("Failed to finalize WAV")?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_produces_riff_header() {
        let spec = TakeSpec {
            channels: 1,
            sample_rate: 16_000,
        };
        let bytes = encode_wav(&[0, 128, -128, 32_000], spec).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte header + 2 bytes per sample
        assert_eq!(bytes.len(), 44 + 4 * 2);
    }

    #[test]
    fn test_encode_wav_empty_take() {
        let spec = TakeSpec {
            channels: 1,
            sample_rate: 16_000,
        };
        let bytes = encode_wav(&[], spec).unwrap();
        assert_eq!(bytes.len(), 44);
    }
}
