//! Audio playback device backend using cpal and a ring buffer
//!
//! The main thread produces into an SPSC ring buffer; the cpal callback
//! consumes it on the device thread. Ring occupancy doubles as the
//! queued-but-unplayed delay the pacer plans against. When the callback
//! drains the ring mid-stream it latches an underrun fault, which the
//! pacer clears by repriming.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use kiln_core::audio::{CHANNEL_COUNT, PlaybackQueue, SubmitError};
use ringbuf::{
    HeapRb,
    traits::{Consumer, Observer, Producer, Split},
};
use thiserror::Error;
use tracing::{debug, error};

/// Failure to open the playback device.
///
/// None of these stop the loop; the shell runs silent without a device.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

/// Playback queue over a cpal output stream.
pub struct CpalPlaybackQueue {
    producer: ringbuf::HeapProd<f32>,
    underrun: Arc<AtomicBool>,
    /// The cpal stream (kept alive for the duration)
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl CpalPlaybackQueue {
    /// Open the default output device at the requested rate, falling back
    /// to the device's native rate if the requested one is unsupported.
    ///
    /// The ring buffer holds two write quanta: one quantum of target
    /// occupancy plus one of headroom against scheduling jitter.
    pub fn new(samples_per_second: u32, pace_hz: u32) -> Result<Self, AudioError> {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();

        let requested = cpal::SampleRate(samples_per_second);
        let rate_supported = device
            .supported_output_configs()
            .map(|mut configs| {
                configs.any(|range| {
                    range.channels() as usize >= CHANNEL_COUNT
                        && range.min_sample_rate() <= requested
                        && requested <= range.max_sample_rate()
                })
            })
            .unwrap_or(false);
        let sample_rate = if rate_supported {
            requested
        } else {
            debug!(
                requested = samples_per_second,
                device = supported.sample_rate().0,
                "requested sample rate unsupported, using device rate"
            );
            supported.sample_rate()
        };

        let config = cpal::StreamConfig {
            channels: CHANNEL_COUNT as u16,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let quantum_frames = (sample_rate.0 / pace_hz.max(1)) as usize;
        let ring = HeapRb::<f32>::new(quantum_frames * CHANNEL_COUNT * 2);
        let (producer, mut consumer) = ring.split();

        let underrun = Arc::new(AtomicBool::new(false));
        let fault = underrun.clone();

        // Batch pop_slice() rather than per-sample reads; a short read means
        // the queue drained and the fault latch is set.
        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let popped = consumer.pop_slice(data);
                    if popped < data.len() {
                        data[popped..].fill(0.0);
                        fault.store(true, Ordering::Release);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )?,
            cpal::SampleFormat::I16 => {
                let mut staging: Vec<f32> = vec![0.0; 4096];
                device.build_output_stream(
                    &config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        if staging.len() < data.len() {
                            staging.resize(data.len(), 0.0);
                        }
                        let popped = consumer.pop_slice(&mut staging[..data.len()]);
                        for (out, &sample) in data.iter_mut().zip(&staging[..popped]) {
                            *out = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                        }
                        if popped < data.len() {
                            data[popped..].fill(0);
                            fault.store(true, Ordering::Release);
                        }
                    },
                    |err| error!("Audio stream error: {}", err),
                    None,
                )?
            }
            cpal::SampleFormat::U16 => {
                let mut staging: Vec<f32> = vec![0.0; 4096];
                device.build_output_stream(
                    &config,
                    move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                        if staging.len() < data.len() {
                            staging.resize(data.len(), 0.0);
                        }
                        let popped = consumer.pop_slice(&mut staging[..data.len()]);
                        for (out, &sample) in data.iter_mut().zip(&staging[..popped]) {
                            *out = ((sample * 32767.0 + 32768.0).clamp(0.0, 65535.0)) as u16;
                        }
                        if popped < data.len() {
                            // 0x8000 is silence for u16 audio
                            data[popped..].fill(32768);
                            fault.store(true, Ordering::Release);
                        }
                    },
                    |err| error!("Audio stream error: {}", err),
                    None,
                )?
            }
            other => return Err(AudioError::UnsupportedFormat(other)),
        };

        stream.play()?;

        debug!("Audio stream started at {} Hz", sample_rate.0);

        Ok(Self {
            producer,
            underrun,
            _stream: stream,
            sample_rate: sample_rate.0,
        })
    }

    /// The rate the stream actually runs at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl PlaybackQueue for CpalPlaybackQueue {
    fn queued_frames(&self) -> usize {
        self.producer.occupied_len() / CHANNEL_COUNT
    }

    fn submit(&mut self, samples: &[f32]) -> Result<usize, SubmitError> {
        if self.underrun.load(Ordering::Acquire) {
            return Err(SubmitError::Underrun);
        }
        let pushed = self.producer.push_slice(samples);
        if pushed < samples.len() {
            // The queue is full; planning normally prevents this. Dropped
            // samples desync briefly and recover.
            debug!("audio queue overflow: dropped {} samples", samples.len() - pushed);
        }
        Ok(pushed / CHANNEL_COUNT)
    }

    fn reprime(&mut self) {
        self.underrun.store(false, Ordering::Release);
    }
}
