use crate::api::AudioClip;
use crate::error::{HorizonError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use ringbuf::{traits::*, HeapRb};
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

/// Samples kept for the level meter (~100 ms at 16 kHz)
const LEVEL_WINDOW: usize = 1600;

/// Accumulates one microphone capture and encodes it for upload
pub struct CaptureBuffer {
    samples: Vec<f32>,
    recent: HeapRb<f32>,
    sample_rate: u32,
}

impl CaptureBuffer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            recent: HeapRb::new(LEVEL_WINDOW),
            sample_rate,
        }
    }

    /// Start a new capture at `sample_rate`, dropping anything buffered
    pub fn reset(&mut self, sample_rate: u32) {
        self.samples.clear();
        self.recent.clear();
        self.sample_rate = sample_rate;
    }

    /// Append mono samples
    pub fn push(&mut self, chunk: &[f32]) {
        self.samples.extend_from_slice(chunk);
        for &sample in chunk {
            // Keep only the newest window
            if self.recent.is_full() {
                let _ = self.recent.try_pop();
            }
            let _ = self.recent.try_push(sample);
        }
    }

    /// RMS of the most recent samples, 0.0 to 1.0
    pub fn level(&self) -> f32 {
        let count = self.recent.occupied_len();
        if count == 0 {
            return 0.0;
        }
        let sum: f32 = self.recent.iter().map(|s| s * s).sum();
        (sum / count as f32).sqrt().min(1.0)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Encode the capture as 16-bit mono WAV and empty the buffer.
    /// `None` when nothing was captured.
    pub fn finish(&mut self) -> Result<Option<AudioClip>> {
        if self.samples.is_empty() {
            return Ok(None);
        }
        let bytes = encode_wav(&self.samples, self.sample_rate)?;
        debug!(
            "Encoded {} samples ({:?}) into {} bytes",
            self.samples.len(),
            self.duration(),
            bytes.len()
        );
        self.samples.clear();
        self.recent.clear();
        Ok(Some(AudioClip::wav(bytes)))
    }
}

/// Encode mono f32 samples (-1.0 to 1.0) as a 16-bit PCM WAV file in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| HorizonError::AudioDeviceError(format!("Failed to create WAV writer: {}", e)))?;

    for &sample in samples {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| HorizonError::AudioDeviceError(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| HorizonError::AudioDeviceError(format!("Failed to finalize WAV: {}", e)))?;

    Ok(cursor.into_inner())
}
