//! Voice/chat session controller
//!
//! A synchronous state machine that sequences one conversational turn at a
//! time: microphone capture, the chat request, speech synthesis and playback.
//! Operations never perform I/O. Each returns the [`Effect`]s the caller must
//! carry out; asynchronous results come back as operations tagged with the
//! [`Generation`] they were started under, and results from any other
//! generation are dropped.
//!
//! Status never reads `Idle` while a playback handle is attached, and never
//! `Listening` while a request is pending.

pub mod banner;

pub use banner::Banner;

use crate::api::{AudioClip, ChatPayload, ChatReply};
use crate::error::{ErrorClass, HorizonError};
use crate::language::Language;
use crate::messages::{ConversationHistory, Message, Sender};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Turn number. Advanced by every turn start, interrupt and teardown.
pub type Generation = u64;

/// Conversational status shown by the voice orb
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VoiceStatus {
    #[default]
    Idle,
    /// Microphone open, capturing the user's question
    Listening,
    /// Waiting on capture finalization, the chat reply or synthesis
    Thinking,
    /// Playing the synthesized answer
    Speaking,
}

impl VoiceStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, VoiceStatus::Idle)
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, VoiceStatus::Listening)
    }

    /// Thinking or speaking: a turn is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, VoiceStatus::Thinking | VoiceStatus::Speaking)
    }
}

impl fmt::Display for VoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceStatus::Idle => write!(f, "Idle"),
            VoiceStatus::Listening => write!(f, "Listening"),
            VoiceStatus::Thinking => write!(f, "Thinking"),
            VoiceStatus::Speaking => write!(f, "Speaking"),
        }
    }
}

/// What the pending slot is waiting on
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Microphone closing; the encoded clip has not arrived yet
    Capture,
    /// Chat request in flight. `user_text` is shown if the server does not
    /// echo a transcription.
    Chat { user_text: String },
    /// Speech synthesis in flight
    Synthesis,
}

/// The single in-flight unit of work of the current turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub generation: Generation,
    pub stage: Stage,
}

/// The single playable audio element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackHandle {
    pub generation: Generation,
    /// False until the device reports playback actually began
    pub started: bool,
}

/// Side effects requested by the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Ask for microphone access and start capturing
    OpenMicrophone,
    /// Stop capturing. With `submit` the clip is reported back through
    /// [`VoiceController::capture_finished`], otherwise it is discarded.
    CloseMicrophone { generation: Generation, submit: bool },
    SendChat {
        generation: Generation,
        payload: ChatPayload,
        language: Language,
    },
    Synthesize {
        generation: Generation,
        text: String,
        language: Language,
    },
    /// Cancel whatever network work belongs to `generation`
    Abort { generation: Generation },
    /// Fetch and play `audio_url`, replacing any current playback
    Play {
        generation: Generation,
        audio_url: String,
    },
    StopPlayback,
    LanguageChanged(Language),
    HistoryChanged,
    /// Credentials are gone; forget the session
    EndSession,
}

#[derive(Clone, Debug)]
pub struct VoiceController {
    status: VoiceStatus,
    generation: Generation,
    language: Language,
    history: ConversationHistory,
    pending: Option<PendingRequest>,
    playback: Option<PlaybackHandle>,
    awaiting_microphone: bool,
    banner: Banner,
    notice: Option<String>,
}

impl VoiceController {
    pub fn new(language: Language, banner_duration: Duration) -> Self {
        Self {
            status: VoiceStatus::Idle,
            generation: 0,
            language,
            history: ConversationHistory::new(),
            pending: None,
            playback: None,
            awaiting_microphone: false,
            banner: Banner::new(banner_duration),
            notice: None,
        }
    }

    pub fn status(&self) -> VoiceStatus {
        self.status
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn messages(&self) -> &[Message] {
        self.history.messages()
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    pub fn playback(&self) -> Option<PlaybackHandle> {
        self.playback
    }

    pub fn is_awaiting_microphone(&self) -> bool {
        self.awaiting_microphone
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn banner_visible(&self, now: Instant) -> bool {
        self.banner.is_visible(now)
    }

    /// Capability warning for the user, e.g. microphone refused
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// True if audio for `generation` is still wanted by the current turn
    pub fn wants_playback(&self, generation: Generation) -> bool {
        self.playback
            .is_some_and(|p| p.generation == generation && generation == self.generation)
    }

    // === Capture ===

    /// Mic button: interrupt while busy, stop while listening, start when idle
    pub fn mic_tap(&mut self) -> Vec<Effect> {
        match self.status {
            VoiceStatus::Thinking | VoiceStatus::Speaking => self.interrupt(),
            VoiceStatus::Listening => self.stop_listening(),
            VoiceStatus::Idle => self.start_listening(),
        }
    }

    pub fn start_listening(&mut self) -> Vec<Effect> {
        if !self.status.is_idle() {
            warn!("Cannot start listening while {}", self.status);
            return Vec::new();
        }
        if self.awaiting_microphone {
            debug!("Microphone request already outstanding");
            return Vec::new();
        }
        self.awaiting_microphone = true;
        self.notice = None;
        vec![Effect::OpenMicrophone]
    }

    /// Microphone access granted and capture running
    pub fn microphone_opened(&mut self) -> Vec<Effect> {
        if !self.awaiting_microphone || !self.status.is_idle() {
            debug!("Microphone opened but no longer wanted, discarding");
            return vec![Effect::CloseMicrophone {
                generation: self.generation,
                submit: false,
            }];
        }
        self.awaiting_microphone = false;
        self.generation += 1;
        self.set_status(VoiceStatus::Listening);
        Vec::new()
    }

    pub fn microphone_denied(&mut self, error: &HorizonError) -> Vec<Effect> {
        warn!("Microphone unavailable: {}", error);
        let wanted = std::mem::take(&mut self.awaiting_microphone);
        if wanted {
            self.notice = Some(error.user_message());
        }
        Vec::new()
    }

    /// Stop capturing and submit what was heard
    pub fn stop_listening(&mut self) -> Vec<Effect> {
        if !self.status.is_listening() {
            warn!("Cannot stop listening while {}", self.status);
            return Vec::new();
        }
        self.pending = Some(PendingRequest {
            generation: self.generation,
            stage: Stage::Capture,
        });
        self.set_status(VoiceStatus::Thinking);
        vec![Effect::CloseMicrophone {
            generation: self.generation,
            submit: true,
        }]
    }

    /// Abandon the capture without sending anything
    pub fn cancel_listening(&mut self) -> Vec<Effect> {
        if self.awaiting_microphone && self.status.is_idle() {
            self.awaiting_microphone = false;
            return Vec::new();
        }
        if !self.status.is_listening() {
            return Vec::new();
        }
        let closing = self.generation;
        self.generation += 1;
        self.set_status(VoiceStatus::Idle);
        vec![Effect::CloseMicrophone {
            generation: closing,
            submit: false,
        }]
    }

    /// The microphone was closed and its capture encoded
    pub fn capture_finished(&mut self, generation: Generation, clip: Option<AudioClip>) -> Vec<Effect> {
        let expected = matches!(
            &self.pending,
            Some(PendingRequest { generation: g, stage: Stage::Capture }) if *g == generation
        );
        if !expected || generation != self.generation {
            debug!("Dropping capture of generation {}", generation);
            return Vec::new();
        }
        match clip.filter(|c| !c.is_empty()) {
            Some(clip) => self.begin_chat(ChatPayload::Audio(clip)),
            None => {
                debug!("Empty capture, nothing to send");
                self.pending = None;
                self.set_status(VoiceStatus::Idle);
                Vec::new()
            }
        }
    }

    // === Turns ===

    /// Send a typed question. Supersedes a turn in flight; rejected while
    /// listening.
    pub fn submit_text(&mut self, text: &str) -> Vec<Effect> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if self.status.is_listening() {
            warn!("Ignoring typed input while listening");
            return Vec::new();
        }
        self.awaiting_microphone = false;
        let mut effects = self.teardown_turn();
        self.generation += 1;
        effects.extend(self.begin_chat(ChatPayload::Text(text.to_string())));
        effects
    }

    /// Speak an existing message without a chat round-trip
    pub fn read_aloud(&mut self, message_id: &str) -> Vec<Effect> {
        if !self.status.is_idle() || self.awaiting_microphone {
            warn!("Cannot read aloud while {}", self.status);
            return Vec::new();
        }
        let Some(message) = self.history.get(message_id) else {
            warn!("No message {} to read aloud", message_id);
            return Vec::new();
        };
        let text = match message.sender {
            Sender::Ai => message.spoken_summary(),
            Sender::User => message.text.trim(),
        }
        .to_string();
        if text.is_empty() {
            return Vec::new();
        }
        self.generation += 1;
        self.pending = Some(PendingRequest {
            generation: self.generation,
            stage: Stage::Synthesis,
        });
        self.set_status(VoiceStatus::Thinking);
        vec![Effect::Synthesize {
            generation: self.generation,
            text,
            language: self.language,
        }]
    }

    /// Stop everything the current turn is doing and return to idle
    pub fn interrupt(&mut self) -> Vec<Effect> {
        if !self.status.is_busy() {
            debug!("Nothing to interrupt while {}", self.status);
            return Vec::new();
        }
        info!("Interrupting turn {}", self.generation);
        let effects = self.teardown_turn();
        self.generation += 1;
        self.set_status(VoiceStatus::Idle);
        effects
    }

    pub fn chat_succeeded(&mut self, generation: Generation, reply: ChatReply) -> Vec<Effect> {
        let user_text = match &self.pending {
            Some(PendingRequest {
                generation: g,
                stage: Stage::Chat { user_text },
            }) if *g == generation && generation == self.generation => user_text.clone(),
            _ => {
                warn!("Dropping stale chat reply of generation {}", generation);
                return Vec::new();
            }
        };

        let user = Message::user(reply.user_text.clone().unwrap_or(user_text));
        let ai = Message::ai(reply.response_text.clone());
        self.history.append_turn(user, ai);
        let mut effects = vec![Effect::HistoryChanged];

        if let Some(lang) = reply.detected_language {
            if lang != self.language {
                info!("Switching language to {}", lang);
                self.language = lang;
                effects.push(Effect::LanguageChanged(lang));
            }
        }

        if let Some(url) = reply.audio_url {
            self.pending = None;
            effects.extend(self.begin_playback(url));
            return effects;
        }

        let summary = reply.summary().to_string();
        if summary.is_empty() {
            debug!("Reply has nothing to speak");
            self.pending = None;
            self.set_status(VoiceStatus::Idle);
            return effects;
        }

        self.pending = Some(PendingRequest {
            generation,
            stage: Stage::Synthesis,
        });
        effects.push(Effect::Synthesize {
            generation,
            text: summary,
            language: self.language,
        });
        effects
    }

    /// Chat request failed. Unauthorized tears the session down whatever
    /// generation it belongs to.
    pub fn chat_failed(&mut self, generation: Generation, error: HorizonError, now: Instant) -> Vec<Effect> {
        self.turn_failed(generation, error, now, true)
    }

    pub fn synthesis_finished(&mut self, generation: Generation, audio_url: Option<String>) -> Vec<Effect> {
        if !self.is_current(generation, |s| matches!(s, Stage::Synthesis)) {
            warn!("Dropping stale synthesis of generation {}", generation);
            return Vec::new();
        }
        self.pending = None;
        match audio_url {
            Some(url) => self.begin_playback(url),
            None => {
                debug!("No audio synthesized");
                self.set_status(VoiceStatus::Idle);
                Vec::new()
            }
        }
    }

    /// Synthesis failed. The answer is already on screen, so transport
    /// failures here return to idle without the banner.
    pub fn synthesis_failed(&mut self, generation: Generation, error: HorizonError, now: Instant) -> Vec<Effect> {
        self.turn_failed(generation, error, now, false)
    }

    // === Playback ===

    pub fn playback_started(&mut self, generation: Generation) -> Vec<Effect> {
        match self.playback.as_mut() {
            Some(handle) if handle.generation == generation && generation == self.generation => {
                handle.started = true;
                self.set_status(VoiceStatus::Speaking);
                Vec::new()
            }
            // Teardown already asked the device to stop
            _ => {
                debug!("Ignoring late playback start of generation {}", generation);
                Vec::new()
            }
        }
    }

    pub fn playback_ended(&mut self, generation: Generation) -> Vec<Effect> {
        if !self.release_playback(generation) {
            return Vec::new();
        }
        debug!("Playback finished");
        Vec::new()
    }

    pub fn playback_failed(&mut self, generation: Generation, reason: &str) -> Vec<Effect> {
        if self.release_playback(generation) {
            warn!("Playback failed: {}", reason);
        }
        Vec::new()
    }

    // === Session ===

    /// Credential rejected or user logged out: stop everything and forget
    /// the conversation
    pub fn end_session(&mut self) -> Vec<Effect> {
        info!("Ending session");
        let mut effects = Vec::new();
        if self.status.is_listening() {
            effects.push(Effect::CloseMicrophone {
                generation: self.generation,
                submit: false,
            });
        }
        effects.extend(self.teardown_turn());
        self.generation += 1;
        self.awaiting_microphone = false;
        self.history.clear();
        self.banner.dismiss();
        self.notice = None;
        self.set_status(VoiceStatus::Idle);
        effects.push(Effect::HistoryChanged);
        effects.push(Effect::EndSession);
        effects
    }

    pub fn set_language(&mut self, language: Language) -> Vec<Effect> {
        if language == self.language {
            return Vec::new();
        }
        self.language = language;
        vec![Effect::LanguageChanged(language)]
    }

    pub fn history_loaded(&mut self, messages: Vec<Message>) -> Vec<Effect> {
        self.history.replace(messages);
        vec![Effect::HistoryChanged]
    }

    /// Server confirmed the deletion of `id`
    pub fn message_deleted(&mut self, id: &str) -> Vec<Effect> {
        if self.history.remove(id) {
            vec![Effect::HistoryChanged]
        } else {
            Vec::new()
        }
    }

    /// Server confirmed the history is gone
    pub fn history_cleared(&mut self) -> Vec<Effect> {
        self.history.clear();
        vec![Effect::HistoryChanged]
    }

    /// Expire the banner. Returns true if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.banner.tick(now)
    }

    // === Internals ===

    fn set_status(&mut self, status: VoiceStatus) {
        if self.status != status {
            debug!("Voice status {} -> {}", self.status, status);
            self.status = status;
        }
    }

    fn is_current(&self, generation: Generation, stage: impl Fn(&Stage) -> bool) -> bool {
        generation == self.generation
            && self
                .pending
                .as_ref()
                .is_some_and(|p| p.generation == generation && stage(&p.stage))
    }

    fn begin_chat(&mut self, payload: ChatPayload) -> Vec<Effect> {
        self.pending = Some(PendingRequest {
            generation: self.generation,
            stage: Stage::Chat {
                user_text: payload.fallback_user_text().to_string(),
            },
        });
        self.set_status(VoiceStatus::Thinking);
        vec![Effect::SendChat {
            generation: self.generation,
            payload,
            language: self.language,
        }]
    }

    fn begin_playback(&mut self, audio_url: String) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.playback.take().is_some() {
            effects.push(Effect::StopPlayback);
        }
        self.playback = Some(PlaybackHandle {
            generation: self.generation,
            started: false,
        });
        effects.push(Effect::Play {
            generation: self.generation,
            audio_url,
        });
        effects
    }

    /// Cancel the pending request and drop playback of the current turn
    fn teardown_turn(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.pending.take().is_some() | self.playback.is_some() {
            effects.push(Effect::Abort {
                generation: self.generation,
            });
        }
        if self.playback.take().is_some() {
            effects.push(Effect::StopPlayback);
        }
        effects
    }

    fn release_playback(&mut self, generation: Generation) -> bool {
        match self.playback {
            Some(handle) if handle.generation == generation => {
                self.playback = None;
                if generation == self.generation && self.pending.is_none() {
                    self.set_status(VoiceStatus::Idle);
                }
                true
            }
            _ => false,
        }
    }

    fn turn_failed(
        &mut self,
        generation: Generation,
        error: HorizonError,
        now: Instant,
        banner: bool,
    ) -> Vec<Effect> {
        if error.class() == ErrorClass::Authentication {
            warn!("Credential rejected, ending session");
            return self.end_session();
        }
        let current = generation == self.generation
            && self.pending.as_ref().is_some_and(|p| p.generation == generation);
        if !current {
            debug!("Dropping stale failure of generation {}: {}", generation, error);
            return Vec::new();
        }
        self.pending = None;
        self.set_status(VoiceStatus::Idle);
        match error.class() {
            ErrorClass::Capability => {
                warn!("Turn {} failed: {}", generation, error);
                self.notice = Some(error.user_message());
            }
            ErrorClass::Transport => {
                warn!("Turn {} failed: {}", generation, error);
                if banner {
                    self.banner.show(now);
                }
            }
            ErrorClass::Authentication => {}
        }
        Vec::new()
    }
}
