use crate::error::{HorizonError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Sender;
use tracing::{debug, error, info};

/// Microphone capture on the default input device.
///
/// Holds a cpal stream, which must stay on the thread that created it.
pub struct AudioRecorder {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
}

impl AudioRecorder {
    /// Open the default input device.
    ///
    /// A missing device or a refused configuration is reported as
    /// `PermissionDenied`: on desktop hosts that is how a blocked
    /// microphone shows up.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| HorizonError::PermissionDenied("No input device available".into()))?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_input_config()
            .map_err(|e| HorizonError::PermissionDenied(format!("Failed to get input config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
        })
    }

    /// Get the sample rate of the input device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start capturing; mono chunks are sent to `audio_tx`
    pub fn start(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.stream.is_some() {
            debug!("Already recording");
            return Ok(());
        }

        let channels = self.config.channels as usize;

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Convert to mono if necessary
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Failed to send audio data: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| HorizonError::PermissionDenied(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| HorizonError::AudioDeviceError(format!("Failed to start input stream: {}", e)))?;

        self.stream = Some(stream);
        info!("Started audio recording");
        Ok(())
    }

    /// Stop capturing
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("Stopped audio recording");
        }
    }

    pub fn is_recording(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_recording_state() {
        // Machines without a microphone skip the body
        if let Ok(mut recorder) = AudioRecorder::new() {
            assert!(recorder.sample_rate() > 0);
            assert!(!recorder.is_recording());

            let (tx, _rx) = bounded(10);
            if recorder.start(tx).is_ok() {
                assert!(recorder.is_recording());
                recorder.stop();
                assert!(!recorder.is_recording());
            }
        }
    }
}
