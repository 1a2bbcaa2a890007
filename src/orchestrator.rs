//! Orchestrator for the Horizon client
//!
//! Owns the session controller (inside [`SharedAppState`]) and carries out
//! the effects it asks for:
//! - HTTP calls run as tasks on a tokio runtime, keyed by turn generation so
//!   an interrupt can abort them
//! - microphone and speaker work is forwarded to the UI thread as
//!   [`AppEvent`]s, since the UI owns the audio devices
//! - session changes are persisted through the [`SessionStore`]
//!
//! Commands from the UI and finished tasks are both applied on the
//! orchestrator thread, one at a time, under the state's write lock.

use crate::api::{AssistantApi, ChatReply, ChatRequest, LoginReply, Profile, ProfileUpdate};
use crate::config::HorizonConfig;
use crate::controller::{Effect, Generation, VoiceController};
use crate::error::{ErrorClass, HorizonError, Result};
use crate::messages::Message;
use crate::session::{Session, SessionStore};
use crate::state::{Account, AppCommand, AppEvent, AppState, SharedAppState};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

const IDLE_WAKEUP: Duration = Duration::from_millis(50);

/// Handle for controlling the orchestrator from the UI or tests
pub struct OrchestratorHandle {
    command_tx: Sender<AppCommand>,
    event_rx: Receiver<AppEvent>,
    state: SharedAppState,
}

impl OrchestratorHandle {
    /// Send a command to the orchestrator
    pub fn send_command(&self, cmd: AppCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| HorizonError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn login(&self, username: impl Into<String>, password: impl Into<String>) -> Result<()> {
        self.send_command(AppCommand::Login {
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn logout(&self) -> Result<()> {
        self.send_command(AppCommand::Logout)
    }

    pub fn mic_tap(&self) -> Result<()> {
        self.send_command(AppCommand::MicTap)
    }

    pub fn submit_text(&self, text: impl Into<String>) -> Result<()> {
        self.send_command(AppCommand::SubmitText(text.into()))
    }

    pub fn interrupt(&self) -> Result<()> {
        self.send_command(AppCommand::Interrupt)
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.send_command(AppCommand::Shutdown)
    }

    /// Extra sender for commands that must outlive the handle
    pub fn command_sender(&self) -> Sender<AppCommand> {
        self.command_tx.clone()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<AppEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> Result<AppEvent> {
        self.event_rx
            .recv()
            .map_err(|e| HorizonError::ChannelError(format!("Failed to receive event: {}", e)))
    }

    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<AppEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Get the shared application state
    pub fn state(&self) -> &SharedAppState {
        &self.state
    }
}

/// Result of a task that ran on the runtime
enum TaskOutcome {
    Chat {
        generation: Generation,
        result: Result<ChatReply>,
    },
    Synthesis {
        generation: Generation,
        result: Result<Option<String>>,
    },
    Audio {
        generation: Generation,
        result: Result<Vec<u8>>,
    },
    Login {
        epoch: u64,
        result: Result<LoginReply>,
    },
    Registered {
        epoch: u64,
        result: Result<()>,
    },
    PasswordReset {
        epoch: u64,
        result: Result<()>,
    },
    History {
        epoch: u64,
        result: Result<Vec<Message>>,
    },
    Profile {
        epoch: u64,
        result: Result<Profile>,
    },
    Deleted {
        epoch: u64,
        id: String,
        result: Result<()>,
    },
    Cleared {
        epoch: u64,
        result: Result<()>,
    },
    ProfileUpdated {
        epoch: u64,
        result: Result<Profile>,
    },
    PasswordChanged {
        epoch: u64,
        result: Result<()>,
    },
    AccountDeleted {
        epoch: u64,
        result: Result<()>,
    },
}

/// Main orchestrator coordinating the controller, the network and the UI
pub struct Orchestrator {
    config: HorizonConfig,
    state: SharedAppState,
    api: Arc<dyn AssistantApi>,
    store: Option<SessionStore>,
    session: Option<Session>,
    command_rx: Receiver<AppCommand>,
    event_tx: Sender<AppEvent>,
}

impl Orchestrator {
    /// Create a new orchestrator.
    ///
    /// A session saved in `store` is restored, including its language. With
    /// no store nothing is persisted.
    pub fn new(
        config: HorizonConfig,
        api: Arc<dyn AssistantApi>,
        store: Option<SessionStore>,
    ) -> Result<(Self, OrchestratorHandle)> {
        let session = store.as_ref().and_then(SessionStore::load);
        let language = session
            .as_ref()
            .map(|s| s.language)
            .unwrap_or(config.default_language);

        let mut app_state = AppState::new(language, config.banner_duration());
        if let Some(session) = &session {
            info!("Restored session for {}", session.username);
            app_state.account = Account::SignedIn {
                username: session.username.clone(),
                display_name: session.display_name.clone(),
                avatar_url: session.avatar_url.clone(),
            };
        }
        let state = SharedAppState::from_state(app_state);

        let (command_tx, command_rx) = bounded(config.channel_buffer_size);
        let (event_tx, event_rx) = bounded(config.channel_buffer_size);

        let handle = OrchestratorHandle {
            command_tx,
            event_rx,
            state: state.clone(),
        };

        let orchestrator = Self {
            config,
            state,
            api,
            store,
            session,
            command_rx,
            event_tx,
        };

        Ok((orchestrator, handle))
    }

    /// Start the orchestrator thread.
    ///
    /// Consumes the orchestrator and returns the join handles of its threads.
    pub fn start(self) -> Result<Vec<JoinHandle<()>>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("horizon-net")
            .enable_all()
            .build()?;

        let (outcome_tx, outcome_rx) = unbounded();
        let shutdown_timeout = self.config.shutdown_timeout();
        let restored = self.session.is_some();

        let mut worker = Worker {
            state: self.state,
            api: self.api,
            store: self.store,
            session: self.session,
            event_tx: self.event_tx,
            outcome_tx,
            runtime,
            tasks: HashMap::new(),
            epoch: 0,
        };
        let command_rx = self.command_rx;

        let handle = thread::Builder::new()
            .name("horizon-orchestrator".into())
            .spawn(move || {
                info!("Orchestrator main loop starting");
                if restored {
                    worker.load_account_data();
                }

                loop {
                    select! {
                        recv(command_rx) -> cmd => {
                            match cmd {
                                Ok(AppCommand::Shutdown) => {
                                    info!("Shutdown requested");
                                    worker.shutdown(shutdown_timeout);
                                    return;
                                }
                                Ok(cmd) => worker.handle_command(cmd),
                                Err(_) => {
                                    warn!("Command channel disconnected");
                                    break;
                                }
                            }
                        }

                        recv(outcome_rx) -> outcome => {
                            if let Ok(outcome) = outcome {
                                worker.handle_outcome(outcome);
                            }
                        }

                        default(IDLE_WAKEUP) => {
                            worker.tick();
                        }
                    }
                }

                worker.shutdown(shutdown_timeout);
                info!("Orchestrator main loop exiting");
            })?;

        info!("Orchestrator loop started");
        Ok(vec![handle])
    }
}

/// State owned by the orchestrator thread
struct Worker {
    state: SharedAppState,
    api: Arc<dyn AssistantApi>,
    store: Option<SessionStore>,
    session: Option<Session>,
    event_tx: Sender<AppEvent>,
    outcome_tx: Sender<TaskOutcome>,
    runtime: Runtime,
    /// Network work of each live turn
    tasks: HashMap<Generation, AbortHandle>,
    /// Bumped on login and logout; account results of an older epoch are
    /// dropped
    epoch: u64,
}

impl Worker {
    fn handle_command(&mut self, cmd: AppCommand) {
        debug!("Command: {:?}", cmd);
        match cmd {
            AppCommand::Login { username, password } => self.login(username, password),
            AppCommand::Register { username, password } => self.register(username, password),
            AppCommand::Logout => {
                info!("Logout requested");
                self.update(|c, _| c.end_session());
            }
            AppCommand::LoadHistory => self.load_account_data(),
            AppCommand::ResetPassword {
                username,
                new_password,
            } => self.reset_password(username, new_password),
            AppCommand::UpdateProfile(update) => self.update_profile(update),
            AppCommand::ChangePassword {
                current_password,
                new_password,
            } => self.change_password(current_password, new_password),
            AppCommand::DeleteAccount => self.delete_account(),

            AppCommand::MicTap => self.update(|c, _| c.mic_tap()),
            AppCommand::StartListening => self.update(|c, _| c.start_listening()),
            AppCommand::StopListening => self.update(|c, _| c.stop_listening()),
            AppCommand::CancelListening => self.update(|c, _| c.cancel_listening()),
            AppCommand::Interrupt => self.update(|c, _| c.interrupt()),
            AppCommand::SubmitText(text) => self.update(|c, _| c.submit_text(&text)),
            AppCommand::ReadAloud(id) => self.update(|c, _| c.read_aloud(&id)),
            AppCommand::DeleteMessage(id) => self.delete_message(id),
            AppCommand::ClearHistory => self.clear_history(),
            AppCommand::SetLanguage(language) => self.update(|c, _| c.set_language(language)),
            AppCommand::DismissNotice => {
                {
                    let mut state = self.state.write();
                    state.auth_notice = None;
                    state.settings_notice = None;
                }
                self.update(|c, _| {
                    c.dismiss_notice();
                    Vec::new()
                });
            }

            AppCommand::MicrophoneOpened => self.update(|c, _| c.microphone_opened()),
            AppCommand::MicrophoneDenied(err) => self.update(|c, _| c.microphone_denied(&err)),
            AppCommand::CaptureFinished { generation, clip } => {
                self.update(|c, _| c.capture_finished(generation, clip))
            }
            AppCommand::PlaybackStarted(generation) => {
                self.update(|c, _| c.playback_started(generation))
            }
            AppCommand::PlaybackEnded(generation) => self.update(|c, _| c.playback_ended(generation)),
            AppCommand::PlaybackFailed { generation, reason } => {
                self.update(|c, _| c.playback_failed(generation, &reason))
            }

            AppCommand::Tick => self.tick(),
            // Handled by the loop
            AppCommand::Shutdown => {}
        }
    }

    fn handle_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Chat { generation, result } => match result {
                Ok(reply) => self.update(|c, _| c.chat_succeeded(generation, reply)),
                Err(e) => self.update(|c, now| c.chat_failed(generation, e, now)),
            },
            TaskOutcome::Synthesis { generation, result } => match result {
                Ok(url) => self.update(|c, _| c.synthesis_finished(generation, url)),
                Err(e) => self.update(|c, now| c.synthesis_failed(generation, e, now)),
            },
            TaskOutcome::Audio { generation, result } => match result {
                Ok(audio) => {
                    if self.state.read().controller.wants_playback(generation) {
                        self.emit(AppEvent::Play { generation, audio });
                    } else {
                        debug!("Dropping audio of superseded generation {}", generation);
                    }
                }
                Err(e) if e.class() == ErrorClass::Authentication => {
                    self.update(|c, _| c.end_session())
                }
                Err(e) => {
                    let reason = e.to_string();
                    self.update(|c, _| c.playback_failed(generation, &reason))
                }
            },
            TaskOutcome::Login { epoch, result } if epoch == self.epoch => {
                self.login_finished(result)
            }
            TaskOutcome::Registered { epoch, result } if epoch == self.epoch => {
                self.signed_out_with(match result {
                    Ok(()) => "Registration successful! Please log in.".to_string(),
                    Err(e) => e.user_message(),
                });
            }
            TaskOutcome::PasswordReset { epoch, result } if epoch == self.epoch => {
                self.signed_out_with(match result {
                    Ok(()) => "Password reset successful! Please log in.".to_string(),
                    Err(e) => e.user_message(),
                });
            }
            TaskOutcome::History { epoch, result } if epoch == self.epoch => match result {
                Ok(messages) => {
                    info!("Loaded {} history messages", messages.len());
                    self.update(|c, _| c.history_loaded(messages));
                }
                Err(e) => self.account_call_failed("load history", e),
            },
            TaskOutcome::Profile { epoch, result } if epoch == self.epoch => match result {
                Ok(profile) => self.profile_loaded(profile),
                Err(e) => self.account_call_failed("load profile", e),
            },
            TaskOutcome::Deleted { epoch, id, result } if epoch == self.epoch => match result {
                Err(e) if e.class() == ErrorClass::Authentication => {
                    self.account_call_failed("delete message", e)
                }
                Ok(()) => self.update(|c, _| c.message_deleted(&id)),
                // Turns of this session only carry local ids
                Err(e) => {
                    warn!("Server kept message {} ({}), removing it locally", id, e);
                    self.update(|c, _| c.message_deleted(&id));
                }
            },
            TaskOutcome::Cleared { epoch, result } if epoch == self.epoch => match result {
                Ok(()) => self.update(|c, _| c.history_cleared()),
                Err(e) => self.account_call_failed("clear history", e),
            },
            TaskOutcome::ProfileUpdated { epoch, result } if epoch == self.epoch => match result {
                Ok(profile) => {
                    self.state.write().settings_notice = Some("Profile updated!".to_string());
                    self.profile_loaded(profile);
                }
                Err(e) => self.settings_call_failed("update profile", e),
            },
            TaskOutcome::PasswordChanged { epoch, result } if epoch == self.epoch => match result {
                Ok(()) => {
                    info!("Password changed");
                    self.state.write().settings_notice = Some("Password changed!".to_string());
                    self.notify();
                }
                Err(e) => self.settings_call_failed("change password", e),
            },
            TaskOutcome::AccountDeleted { epoch, result } if epoch == self.epoch => match result {
                Ok(()) => {
                    info!("Account deleted");
                    self.update(|c, _| c.end_session());
                    self.signed_out_with("Account deleted successfully.".to_string());
                }
                Err(e) => self.settings_call_failed("delete account", e),
            },
            _ => debug!("Dropping account result from a previous session"),
        }
    }

    /// Apply one controller operation under the write lock, then carry out
    /// its effects
    fn update(&mut self, op: impl FnOnce(&mut VoiceController, Instant) -> Vec<Effect>) {
        let effects = {
            let mut state = self.state.write();
            op(&mut state.controller, Instant::now())
        };
        self.execute(effects);
        self.notify();
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            debug!("Effect: {:?}", effect);
            match effect {
                Effect::OpenMicrophone => self.emit(AppEvent::OpenMicrophone),
                Effect::CloseMicrophone { generation, submit } => {
                    self.emit(AppEvent::CloseMicrophone { generation, submit })
                }
                Effect::SendChat {
                    generation,
                    payload,
                    language,
                } => {
                    let Some(token) = self.token() else {
                        self.missing_token(generation);
                        continue;
                    };
                    let api = self.api.clone();
                    let request = ChatRequest { payload, language };
                    self.spawn_turn(generation, async move {
                        TaskOutcome::Chat {
                            generation,
                            result: api.chat(&token, request).await,
                        }
                    });
                }
                Effect::Synthesize {
                    generation,
                    text,
                    language,
                } => {
                    let Some(token) = self.token() else {
                        self.missing_token(generation);
                        continue;
                    };
                    let api = self.api.clone();
                    self.spawn_turn(generation, async move {
                        TaskOutcome::Synthesis {
                            generation,
                            result: api.synthesize(&token, &text, language).await,
                        }
                    });
                }
                Effect::Abort { generation } => {
                    if let Some(task) = self.tasks.remove(&generation) {
                        debug!("Aborting network work of generation {}", generation);
                        task.abort();
                    }
                }
                Effect::Play {
                    generation,
                    audio_url,
                } => {
                    let api = self.api.clone();
                    self.spawn_turn(generation, async move {
                        TaskOutcome::Audio {
                            generation,
                            result: api.fetch_audio(&audio_url).await,
                        }
                    });
                }
                Effect::StopPlayback => self.emit(AppEvent::StopPlayback),
                Effect::LanguageChanged(language) => {
                    if let Some(session) = self.session.as_mut() {
                        session.language = language;
                    }
                    self.persist_session();
                }
                Effect::HistoryChanged => {}
                Effect::EndSession => self.forget_session(),
            }
        }
    }

    fn spawn_turn<F>(&mut self, generation: Generation, task: F)
    where
        F: Future<Output = TaskOutcome> + Send + 'static,
    {
        self.tasks.retain(|_, handle| !handle.is_finished());
        let handle = self.spawn(task);
        if let Some(previous) = self.tasks.insert(generation, handle) {
            previous.abort();
        }
    }

    fn spawn<F>(&self, task: F) -> AbortHandle
    where
        F: Future<Output = TaskOutcome> + Send + 'static,
    {
        let outcome_tx = self.outcome_tx.clone();
        self.runtime
            .spawn(async move {
                let outcome = task.await;
                // Receiver gone means we are shutting down
                let _ = outcome_tx.send(outcome);
            })
            .abort_handle()
    }

    fn token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.token.clone())
    }

    fn missing_token(&mut self, generation: Generation) {
        warn!("No session for generation {}, ending it", generation);
        let effects = self
            .state
            .write()
            .controller
            .chat_failed(generation, HorizonError::Unauthorized, Instant::now());
        self.execute(effects);
    }

    // === Account ===

    /// Show the signed-out form as busy. False if a request is already out.
    fn begin_authenticating(&mut self) -> bool {
        {
            let mut state = self.state.write();
            if state.account.is_authenticating() {
                warn!("Account request already in progress");
                return false;
            }
            state.account = Account::Authenticating;
            state.auth_notice = None;
        }
        self.notify();
        true
    }

    fn signed_out_with(&mut self, notice: String) {
        {
            let mut state = self.state.write();
            state.account = Account::SignedOut;
            state.auth_notice = Some(notice);
        }
        self.notify();
    }

    fn login(&mut self, username: String, password: String) {
        if !self.begin_authenticating() {
            return;
        }
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::Login {
                epoch,
                result: api.login(&username, &password).await,
            }
        });
    }

    fn register(&mut self, username: String, password: String) {
        if !self.begin_authenticating() {
            return;
        }
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::Registered {
                epoch,
                result: api.register(&username, &password).await,
            }
        });
    }

    fn reset_password(&mut self, username: String, new_password: String) {
        if !self.begin_authenticating() {
            return;
        }
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::PasswordReset {
                epoch,
                result: api.reset_password(&username, &new_password).await,
            }
        });
    }

    fn login_finished(&mut self, result: Result<LoginReply>) {
        match result {
            Ok(reply) => {
                info!("Logged in as {}", reply.username);
                self.epoch += 1;
                let language = self.state.read().controller.language();
                let session = Session::new(reply.access_token, reply.username, language);
                {
                    let mut state = self.state.write();
                    state.account = Account::SignedIn {
                        username: session.username.clone(),
                        display_name: None,
                        avatar_url: None,
                    };
                    state.auth_notice = None;
                }
                self.session = Some(session);
                self.persist_session();
                self.notify();
                self.load_account_data();
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                {
                    let mut state = self.state.write();
                    state.account = Account::SignedOut;
                    state.auth_notice = Some(e.user_message());
                }
                self.notify();
            }
        }
    }

    /// Fetch history and profile for the current session
    fn load_account_data(&mut self) {
        let Some(token) = self.token() else {
            warn!("Cannot load history without a session");
            return;
        };
        let epoch = self.epoch;

        let api = self.api.clone();
        let history_token = token.clone();
        self.spawn(async move {
            TaskOutcome::History {
                epoch,
                result: api.history(&history_token).await,
            }
        });

        let api = self.api.clone();
        self.spawn(async move {
            TaskOutcome::Profile {
                epoch,
                result: api.profile(&token).await,
            }
        });
    }

    fn profile_loaded(&mut self, profile: Profile) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if profile.display_name.is_some() {
            session.display_name = profile.display_name;
        }
        if profile.avatar_url.is_some() {
            session.avatar_url = profile.avatar_url;
        }
        let account = Account::SignedIn {
            username: session.username.clone(),
            display_name: session.display_name.clone(),
            avatar_url: session.avatar_url.clone(),
        };
        self.state.write().account = account;
        self.persist_session();
        self.notify();
    }

    fn delete_message(&mut self, id: String) {
        let Some(token) = self.token() else {
            return;
        };
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            let result = api.delete_message(&token, &id).await;
            TaskOutcome::Deleted { epoch, id, result }
        });
    }

    fn clear_history(&mut self) {
        let Some(token) = self.token() else {
            return;
        };
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::Cleared {
                epoch,
                result: api.clear_history(&token).await,
            }
        });
    }

    // === Account settings ===

    /// Token for a settings request, clearing the previous outcome
    fn settings_token(&mut self) -> Option<String> {
        self.state.write().settings_notice = None;
        let token = self.token();
        if token.is_none() {
            warn!("Account settings need a session");
        }
        token
    }

    fn update_profile(&mut self, update: ProfileUpdate) {
        let Some(token) = self.settings_token() else {
            return;
        };
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::ProfileUpdated {
                epoch,
                result: api.update_profile(&token, &update).await,
            }
        });
    }

    fn change_password(&mut self, current: String, new: String) {
        let Some(token) = self.settings_token() else {
            return;
        };
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::PasswordChanged {
                epoch,
                result: api.change_password(&token, &current, &new).await,
            }
        });
    }

    fn delete_account(&mut self) {
        let Some(token) = self.settings_token() else {
            return;
        };
        let api = self.api.clone();
        let epoch = self.epoch;
        self.spawn(async move {
            TaskOutcome::AccountDeleted {
                epoch,
                result: api.delete_account(&token).await,
            }
        });
    }

    fn settings_call_failed(&mut self, what: &str, error: HorizonError) {
        if error.class() == ErrorClass::Authentication {
            warn!("Credential rejected during {}, logging out", what);
            self.update(|c, _| c.end_session());
            return;
        }
        warn!("Failed to {}: {}", what, error);
        let notice = match error {
            HorizonError::Rejected(detail) => detail,
            _ => format!("Failed to {}.", what),
        };
        self.state.write().settings_notice = Some(notice);
        self.notify();
    }

    /// History and profile failures are logged only, except a rejected
    /// credential which ends the session
    fn account_call_failed(&mut self, what: &str, error: HorizonError) {
        if error.class() == ErrorClass::Authentication {
            warn!("Credential rejected during {}, logging out", what);
            self.update(|c, _| c.end_session());
        } else {
            error!("Failed to {}: {}", what, error);
            self.emit(AppEvent::Error(format!("Failed to {}: {}", what, error)));
        }
    }

    fn persist_session(&self) {
        let (Some(store), Some(session)) = (&self.store, &self.session) else {
            return;
        };
        if let Err(e) = store.save(session) {
            error!("Failed to save session: {}", e);
        }
    }

    fn forget_session(&mut self) {
        self.session = None;
        self.epoch += 1;
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                error!("Failed to clear saved session: {}", e);
            }
        }
        let mut state = self.state.write();
        state.account = Account::SignedOut;
        state.settings_notice = None;
    }

    // === Plumbing ===

    fn tick(&mut self) {
        let dismissed = self.state.write().controller.tick(Instant::now());
        if dismissed {
            debug!("Connectivity banner dismissed");
            self.notify();
        }
    }

    fn notify(&self) {
        // Dropping a redundant redraw request is fine when the UI is behind
        let _ = self.event_tx.try_send(AppEvent::StateChanged);
    }

    fn emit(&self, event: AppEvent) {
        if self.event_tx.send(event).is_err() {
            warn!("Event channel disconnected");
        }
    }

    fn shutdown(self, timeout: Duration) {
        for (_, task) in self.tasks.iter() {
            task.abort();
        }
        let event_tx = self.event_tx;
        self.runtime.shutdown_timeout(timeout);
        let _ = event_tx.send(AppEvent::Shutdown);
        info!("Orchestrator shutdown complete");
    }
}
