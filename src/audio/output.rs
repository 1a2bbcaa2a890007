use crate::controller::Generation;
use crate::error::{HorizonError, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use tracing::{debug, info};

/// Exclusive speech playback on the default output device.
///
/// At most one sink exists; starting new audio stops the previous one.
pub struct AudioPlayer {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    generation: Option<Generation>,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlayer {
    /// The output device is opened lazily on first playback
    pub fn new() -> Self {
        Self {
            output: None,
            sink: None,
            generation: None,
        }
    }

    /// Decode `audio` (mp3, wav, ...) and start playing it
    pub fn play(&mut self, generation: Generation, audio: Vec<u8>) -> Result<()> {
        self.stop();

        if self.output.is_none() {
            let output = OutputStream::try_default().map_err(|e| {
                HorizonError::AudioDeviceError(format!("No output device: {}", e))
            })?;
            self.output = Some(output);
        }
        let Some((_, handle)) = &self.output else {
            return Err(HorizonError::AudioDeviceError("Output stream unavailable".into()));
        };

        let source = Decoder::new(Cursor::new(audio))
            .map_err(|e| HorizonError::AudioDeviceError(format!("Cannot decode audio: {}", e)))?;
        let sink = Sink::try_new(handle)
            .map_err(|e| HorizonError::AudioDeviceError(format!("Cannot create sink: {}", e)))?;
        sink.append(source);
        sink.play();

        self.sink = Some(sink);
        self.generation = Some(generation);
        info!("Playing speech for generation {}", generation);
        Ok(())
    }

    /// Returns the generation whose audio just ran out, once
    pub fn poll(&mut self) -> Option<Generation> {
        let finished = self.sink.as_ref().is_some_and(Sink::empty);
        if !finished {
            return None;
        }
        self.sink = None;
        let generation = self.generation.take();
        debug!("Playback finished for {:?}", generation);
        generation
    }

    /// Stop and discard the current sink
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("Playback stopped");
        }
        self.generation = None;
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.empty())
    }

    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }
}
