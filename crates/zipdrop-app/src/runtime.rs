//! Tokio event loop that executes orchestrator effects.
//!
//! The loop owns the [`App`]. Remote calls and timers run as spawned tasks
//! and report back through the loop's channel, so state is only touched
//! between awaits, on the loop task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info};
use zipdrop_history::KeyValueStore;
use zipdrop_intake::{DragEvent, DragEventSource, SubscriptionSet, subscribe_all};
use zipdrop_remote::RemoteBackend;
use zipdrop_ui::WindowCommand;

use crate::AppError;
use crate::orchestrator::{App, AppEvent, Effect, RecordAction};

/// Wall-clock milliseconds derived from the tokio clock.
///
/// Follows paused and advanced time in tests.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin_unix_ms: u64,
    origin: Instant,
}

impl Clock {
    /// Anchors the clock to a fixed Unix time.
    pub fn starting_at(unix_ms: u64) -> Self {
        Self {
            origin_unix_ms: unix_ms,
            origin: Instant::now(),
        }
    }

    /// Current Unix time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.origin_unix_ms + self.origin.elapsed().as_millis() as u64
    }
}

/// Cloneable sender for feeding events into a running loop.
#[derive(Debug, Clone)]
pub struct AppHandle {
    events: UnboundedSender<AppEvent>,
}

impl AppHandle {
    /// Queues one event.
    ///
    /// # Errors
    /// Returns [`AppError::LoopClosed`] once the loop has stopped.
    pub fn send(&self, event: AppEvent) -> Result<(), AppError> {
        self.events.send(event).map_err(|_| AppError::LoopClosed)
    }
}

/// Single-threaded orchestrator loop.
pub struct Runtime<S: KeyValueStore> {
    app: App<S>,
    backend: Arc<dyn RemoteBackend>,
    window: UnboundedSender<WindowCommand>,
    clock: Clock,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    drag_tx: UnboundedSender<DragEvent>,
    drag_rx: UnboundedReceiver<DragEvent>,
    subscriptions: SubscriptionSet,
    started: bool,
}

impl<S: KeyValueStore> Runtime<S> {
    /// Creates a loop around `app`. Nothing runs until the loop is driven.
    ///
    /// Window requests such as hide are delivered to `window`; the host owns
    /// the receiving end.
    pub fn new(
        app: App<S>,
        backend: Arc<dyn RemoteBackend>,
        window: UnboundedSender<WindowCommand>,
        clock: Clock,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (drag_tx, drag_rx) = mpsc::unbounded_channel();
        Self {
            app,
            backend,
            window,
            clock,
            events_tx,
            events_rx,
            drag_tx,
            drag_rx,
            subscriptions: SubscriptionSet::new(),
            started: false,
        }
    }

    /// Orchestrator state.
    pub fn app(&self) -> &App<S> {
        &self.app
    }

    /// Sender for UI and host events.
    pub fn handle(&self) -> AppHandle {
        AppHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Subscribes to drag-over, drag-leave, and drop on `source`.
    ///
    /// # Errors
    /// Returns [`AppError::Intake`] when any registration fails; partial
    /// registrations are released.
    pub fn attach_drag_source(&mut self, source: &dyn DragEventSource) -> Result<(), AppError> {
        self.subscriptions = subscribe_all(source, &self.drag_tx)?;
        info!(listeners = self.subscriptions.len(), "drag source attached");
        Ok(())
    }

    /// Applies one event immediately. Returns `false` once the loop should stop.
    pub fn dispatch(&mut self, event: AppEvent) -> bool {
        self.ensure_started();
        let now_ms = self.clock.now_ms();
        let effects = self.app.handle(event, now_ms);
        self.execute_all(effects)
    }

    /// Runs until [`AppEvent::Shutdown`], then releases listeners and returns
    /// the final state.
    pub async fn run(mut self) -> App<S> {
        self.ensure_started();
        while let Some(event) = self.next_event().await {
            if !self.dispatch(event) {
                break;
            }
        }
        self.subscriptions.teardown();
        self.app
    }

    /// Processes events for `duration` of tokio time. Returns `false` when
    /// the loop stopped.
    pub async fn run_for(&mut self, duration: Duration) -> bool {
        self.ensure_started();
        let deadline = Instant::now() + duration;
        loop {
            let next = tokio::select! {
                biased;
                event = self.next_event() => event,
                () = sleep_until(deadline) => return true,
            };
            let Some(event) = next else {
                return false;
            };
            if !self.dispatch(event) {
                self.subscriptions.teardown();
                return false;
            }
        }
    }

    async fn next_event(&mut self) -> Option<AppEvent> {
        tokio::select! {
            biased;
            event = self.events_rx.recv() => event,
            drag = self.drag_rx.recv() => drag.map(AppEvent::Drag),
        }
    }

    fn ensure_started(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let effects = self.app.startup();
        self.execute_all(effects);
    }

    fn execute_all(&mut self, effects: Vec<Effect>) -> bool {
        let mut running = true;
        for effect in effects {
            running &= self.execute(effect);
        }
        running
    }

    fn execute(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::ProcessAndUpload(paths) => self.spawn_remote(move |backend| async move {
                AppEvent::ProcessSettled(backend.process_and_upload(paths).await)
            }),
            Effect::StartTimer(timer) => {
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    sleep(Duration::from_millis(timer.after_ms)).await;
                    if events.send(AppEvent::TimerElapsed(timer.token)).is_err() {
                        debug!(kind = ?timer.token.kind, "timer elapsed after loop stopped");
                    }
                });
            }
            Effect::Window(command) => {
                info!(?command, "window request");
                if self.window.send(command).is_err() {
                    debug!(?command, "window host gone; request dropped");
                }
            }
            Effect::DeleteObject(storage_key) => {
                let backend = Arc::clone(&self.backend);
                tokio::spawn(async move {
                    if let Err(error) = backend.delete_object(storage_key.clone()).await {
                        debug!(%error, %storage_key, "remote delete failed; ignored");
                    }
                });
            }
            Effect::FetchConfig => self.spawn_remote(|backend| async move {
                AppEvent::ConfigLoaded(backend.config_status().await)
            }),
            Effect::FetchSavedCredentials => self.spawn_remote(|backend| async move {
                AppEvent::SavedCredentialsLoaded(backend.saved_credentials().await)
            }),
            Effect::ValidateCredentials(ticket) => self.spawn_remote(move |backend| async move {
                AppEvent::ValidationSettled {
                    revision: ticket.revision,
                    result: backend.validate_credentials(ticket.credentials).await,
                }
            }),
            Effect::SaveCredentials(credentials) => self.spawn_remote(move |backend| async move {
                AppEvent::SaveSettled(backend.save_credentials(credentials).await)
            }),
            Effect::ClearCredentials => self.spawn_remote(|backend| async move {
                AppEvent::ClearSettled(backend.clear_credentials().await)
            }),
            Effect::SetDemoMode(enabled) => self.spawn_remote(move |backend| async move {
                AppEvent::DemoModeSettled(backend.set_demo_mode(enabled).await)
            }),
            Effect::RecordAction(action, target) => self.spawn_remote(move |backend| async move {
                let result = match action {
                    RecordAction::CopyLink => backend.copy_to_clipboard(target).await,
                    RecordAction::Reveal => backend.reveal_path(target).await,
                    RecordAction::Open => backend.open_url(target).await,
                };
                AppEvent::RecordActionSettled(action, result)
            }),
            Effect::Exit => {
                info!("event loop stopping");
                return false;
            }
        }
        true
    }

    fn spawn_remote<F, Fut>(&self, call: F)
    where
        F: FnOnce(Arc<dyn RemoteBackend>) -> Fut + Send + 'static,
        Fut: Future<Output = AppEvent> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let settlement = call(backend).await;
            if events.send(settlement).is_err() {
                debug!("remote call settled after loop stopped");
            }
        });
    }
}
