//! Microphone capture and speech playback
//!
//! The devices live on the UI thread. [`AudioDevices`] turns the device
//! events the orchestrator emits into device calls and reports the outcome
//! back as [`AppCommand`]s.

pub mod capture;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod output;

pub use capture::{encode_wav, CaptureBuffer};
#[cfg(feature = "audio-io")]
pub use input::AudioRecorder;
#[cfg(feature = "audio-io")]
pub use output::AudioPlayer;

use crate::state::{AppCommand, AppEvent};
use tracing::{error, warn};

#[cfg(feature = "audio-io")]
use crossbeam_channel::{bounded, Receiver};

/// Sample rate assumed until a device reports its own
const DEFAULT_SAMPLE_RATE: u32 = 16_000;

pub struct AudioDevices {
    capture: CaptureBuffer,
    capturing: bool,
    #[cfg(feature = "audio-io")]
    recorder: Option<AudioRecorder>,
    #[cfg(feature = "audio-io")]
    sample_rx: Option<Receiver<Vec<f32>>>,
    #[cfg(feature = "audio-io")]
    player: AudioPlayer,
}

impl Default for AudioDevices {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDevices {
    pub fn new() -> Self {
        Self {
            capture: CaptureBuffer::new(DEFAULT_SAMPLE_RATE),
            capturing: false,
            #[cfg(feature = "audio-io")]
            recorder: None,
            #[cfg(feature = "audio-io")]
            sample_rx: None,
            #[cfg(feature = "audio-io")]
            player: AudioPlayer::new(),
        }
    }

    /// Carry out a device event. Other events yield nothing.
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<AppCommand> {
        match event {
            AppEvent::OpenMicrophone => match self.open_microphone() {
                Ok(()) => vec![AppCommand::MicrophoneOpened],
                Err(e) => vec![AppCommand::MicrophoneDenied(e)],
            },
            AppEvent::CloseMicrophone { generation, submit } => {
                self.close_microphone();
                if !submit {
                    self.capture.reset(self.capture.sample_rate());
                    return Vec::new();
                }
                let clip = self.capture.finish().unwrap_or_else(|e| {
                    error!("Failed to encode capture: {}", e);
                    None
                });
                vec![AppCommand::CaptureFinished { generation, clip }]
            }
            AppEvent::Play { generation, audio } => match self.play(generation, audio) {
                Ok(()) => vec![AppCommand::PlaybackStarted(generation)],
                Err(e) => vec![AppCommand::PlaybackFailed {
                    generation,
                    reason: e.to_string(),
                }],
            },
            AppEvent::StopPlayback => {
                self.stop_playback();
                Vec::new()
            }
            AppEvent::StateChanged | AppEvent::Error(_) | AppEvent::Shutdown => Vec::new(),
        }
    }

    /// Move captured samples into the buffer and report finished playback
    pub fn poll(&mut self) -> Vec<AppCommand> {
        #[cfg(feature = "audio-io")]
        {
            if let Some(rx) = &self.sample_rx {
                for chunk in rx.try_iter() {
                    self.capture.push(&chunk);
                }
            }
            if let Some(generation) = self.player.poll() {
                return vec![AppCommand::PlaybackEnded(generation)];
            }
        }
        Vec::new()
    }

    /// Microphone level for the orb, 0.0 to 1.0
    pub fn input_level(&self) -> f32 {
        if self.capturing {
            self.capture.level()
        } else {
            0.0
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    #[cfg(feature = "audio-io")]
    fn open_microphone(&mut self) -> crate::Result<()> {
        let mut recorder = match self.recorder.take() {
            Some(recorder) => recorder,
            None => AudioRecorder::new()?,
        };
        let (tx, rx) = bounded(256);
        recorder.start(tx)?;
        self.capture.reset(recorder.sample_rate());
        self.recorder = Some(recorder);
        self.sample_rx = Some(rx);
        self.capturing = true;
        Ok(())
    }

    #[cfg(not(feature = "audio-io"))]
    fn open_microphone(&mut self) -> crate::Result<()> {
        Err(crate::HorizonError::AudioDeviceError(
            "built without audio support".to_string(),
        ))
    }

    fn close_microphone(&mut self) {
        #[cfg(feature = "audio-io")]
        {
            if let Some(recorder) = self.recorder.as_mut() {
                recorder.stop();
            }
            // Collect what the stream delivered before it stopped
            if let Some(rx) = self.sample_rx.take() {
                for chunk in rx.try_iter() {
                    self.capture.push(&chunk);
                }
            }
        }
        if !self.capturing {
            warn!("Closing a microphone that was not open");
        }
        self.capturing = false;
    }

    #[cfg(feature = "audio-io")]
    fn play(&mut self, generation: crate::controller::Generation, audio: Vec<u8>) -> crate::Result<()> {
        self.player.play(generation, audio)
    }

    #[cfg(not(feature = "audio-io"))]
    fn play(&mut self, _generation: crate::controller::Generation, _audio: Vec<u8>) -> crate::Result<()> {
        Err(crate::HorizonError::AudioDeviceError(
            "built without audio support".to_string(),
        ))
    }

    fn stop_playback(&mut self) {
        #[cfg(feature = "audio-io")]
        self.player.stop();
    }
}
