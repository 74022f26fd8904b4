#![warn(missing_docs)]
//! # zipdrop-intake
//!
//! ## Purpose
//! Bridges OS drag lifecycle notifications into batches for the upload session
//! controller.
//!
//! ## Responsibilities
//! - Model drag-over, drag-leave, and drop notifications.
//! - Debounce near-duplicate drops emitted within one gesture.
//! - Apply the intake-side single-flight check.
//! - Register listeners as explicit subscriptions with reverse-order teardown.
//!
//! ## Data flow
//! [`DragEventSource`] -> listener channel -> [`IntakeDispatcher::dispatch`] ->
//! [`IntakeDecision`] consumed by the app event loop.
//!
//! ## Ownership and lifetimes
//! Drop payloads own their path lists; the dispatcher keeps only the timestamp
//! of the last accepted drop.
//!
//! ## Error model
//! Discarded events are not errors: they surface as
//! [`IntakeDecision::Discard`]. Only listener registration can fail, with
//! [`IntakeError`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Minimum spacing between two accepted drops.
pub const DEBOUNCE_WINDOW_MS: u64 = 300;

/// Most recent unsubscribes kept by [`ChannelDragSource::teardown_log`].
pub const TEARDOWN_LOG_CAPACITY: usize = 32;

/// Cursor position carried by drop notifications. Not used for routing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPosition {
    /// Horizontal position in window coordinates.
    pub x: f64,
    /// Vertical position in window coordinates.
    pub y: f64,
}

/// OS drag lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEvent {
    /// Files are hovering over the window.
    Over,
    /// The hover left the window without dropping.
    Leave,
    /// Files were dropped.
    Drop {
        /// Ordered absolute paths.
        paths: Vec<String>,
        /// Cursor position at release.
        position: CursorPosition,
    },
}

impl DragEvent {
    /// Convenience constructor for a drop at the origin.
    pub fn drop_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Drop {
            paths: paths.into_iter().map(Into::into).collect(),
            position: CursorPosition::default(),
        }
    }

    /// Returns the listener kind this event is delivered to.
    pub fn kind(&self) -> DragEventKind {
        match self {
            Self::Over => DragEventKind::Over,
            Self::Leave => DragEventKind::Leave,
            Self::Drop { .. } => DragEventKind::Drop,
        }
    }
}

/// Listener category for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragEventKind {
    /// Drag-over notifications.
    Over,
    /// Drag-leave notifications.
    Leave,
    /// Drop notifications.
    Drop,
}

/// Why an event produced no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// A session is processing.
    Busy,
    /// The drop arrived inside the debounce window.
    Debounced,
    /// The drop carried no paths.
    EmptyDrop,
}

/// Outcome of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeDecision {
    /// Session should show the drag-over state.
    EnterDragOver,
    /// Session should return to idle.
    ReturnToIdle,
    /// Batch should be handed to the session controller.
    Forward(Vec<String>),
    /// Event is dropped silently.
    Discard(DiscardReason),
}

/// Suppresses triggers that follow an accepted trigger too closely.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    last_accepted_ms: Option<u64>,
}

impl Debouncer {
    /// Creates a debouncer with the given window.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// Accepts the trigger at `now_ms` unless it falls inside the window of the
    /// last accepted trigger. Accepting records `now_ms`.
    pub fn try_accept(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_accepted_ms
            && now_ms.saturating_sub(last) < self.window_ms
        {
            return false;
        }

        self.last_accepted_ms = Some(now_ms);
        true
    }

    /// Returns the time of the last accepted trigger.
    pub fn last_accepted_ms(&self) -> Option<u64> {
        self.last_accepted_ms
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW_MS)
    }
}

/// Turns drag notifications into session decisions.
#[derive(Debug, Clone, Default)]
pub struct IntakeDispatcher {
    debouncer: Debouncer,
}

impl IntakeDispatcher {
    /// Creates a dispatcher with a custom debounce window.
    pub fn with_debounce_window(window_ms: u64) -> Self {
        Self {
            debouncer: Debouncer::new(window_ms),
        }
    }

    /// Dispatches one event.
    ///
    /// `processing` is the session controller's in-flight flag at the moment
    /// the event is handled. Drops are debounced before the busy check, so a
    /// drop discarded as busy still restarts the debounce window.
    pub fn dispatch(&mut self, event: DragEvent, processing: bool, now_ms: u64) -> IntakeDecision {
        let decision = match event {
            DragEvent::Over if processing => IntakeDecision::Discard(DiscardReason::Busy),
            DragEvent::Over => IntakeDecision::EnterDragOver,
            DragEvent::Leave if processing => IntakeDecision::Discard(DiscardReason::Busy),
            DragEvent::Leave => IntakeDecision::ReturnToIdle,
            DragEvent::Drop { paths, .. } => self.dispatch_drop(paths, processing, now_ms),
        };

        if let IntakeDecision::Discard(reason) = &decision {
            debug!(?reason, now_ms, "intake event discarded");
        }
        decision
    }

    fn dispatch_drop(&mut self, paths: Vec<String>, processing: bool, now_ms: u64) -> IntakeDecision {
        if paths.is_empty() {
            return IntakeDecision::Discard(DiscardReason::EmptyDrop);
        }
        if !self.debouncer.try_accept(now_ms) {
            return IntakeDecision::Discard(DiscardReason::Debounced);
        }
        if processing {
            return IntakeDecision::Discard(DiscardReason::Busy);
        }
        IntakeDecision::Forward(paths)
    }
}

/// Listener registration failure.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The event source refused or lost the registration.
    #[error("drag event source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Registered listener; unsubscribes exactly once.
pub struct Subscription {
    kind: DragEventKind,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wraps an unsubscribe action for one listener.
    pub fn new(kind: DragEventKind, unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Listener kind this subscription covers.
    pub fn kind(&self) -> DragEventKind {
        self.kind
    }

    /// Unsubscribes now. Later calls are no-ops.
    pub fn unsubscribe(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

/// Ordered set of subscriptions torn down in reverse registration order.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription.
    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Unsubscribes everything, last registered first.
    pub fn teardown(&mut self) {
        while let Some(mut subscription) = self.subscriptions.pop() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Source of OS drag notifications.
pub trait DragEventSource: Send + Sync {
    /// Registers `sink` for events of `kind`.
    ///
    /// # Errors
    /// Returns [`IntakeError::SourceUnavailable`] when registration fails.
    fn listen(
        &self,
        kind: DragEventKind,
        sink: UnboundedSender<DragEvent>,
    ) -> Result<Subscription, IntakeError>;
}

/// Subscribes `sink` to all three drag notifications, over then leave then
/// drop.
///
/// # Errors
/// Propagates the first registration failure; listeners registered before it
/// are torn down when the partial set drops.
pub fn subscribe_all(
    source: &dyn DragEventSource,
    sink: &UnboundedSender<DragEvent>,
) -> Result<SubscriptionSet, IntakeError> {
    let mut set = SubscriptionSet::new();
    for kind in [DragEventKind::Over, DragEventKind::Leave, DragEventKind::Drop] {
        set.push(source.listen(kind, sink.clone())?);
    }
    Ok(set)
}

#[derive(Debug, Default)]
struct ChannelListeners {
    next_id: u64,
    listeners: Vec<(u64, DragEventKind, UnboundedSender<DragEvent>)>,
    teardown_log: VecDeque<DragEventKind>,
}

/// In-process drag source for hosts that forward OS events, and for tests.
#[derive(Debug, Clone, Default)]
pub struct ChannelDragSource {
    inner: Arc<Mutex<ChannelListeners>>,
}

impl ChannelDragSource {
    /// Creates a source with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one event to every listener registered for its kind.
    ///
    /// Returns the number of listeners that received it.
    pub fn emit(&self, event: DragEvent) -> usize {
        let kind = event.kind();
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        inner.listeners.retain(|(_, _, sink)| !sink.is_closed());
        inner
            .listeners
            .iter()
            .filter(|(_, listener_kind, _)| *listener_kind == kind)
            .filter(|(_, _, sink)| sink.send(event.clone()).is_ok())
            .count()
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.listeners.len())
            .unwrap_or(0)
    }

    /// Most recent kinds unsubscribed, oldest first, capped at
    /// [`TEARDOWN_LOG_CAPACITY`].
    pub fn teardown_log(&self) -> Vec<DragEventKind> {
        self.inner
            .lock()
            .map(|inner| inner.teardown_log.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl DragEventSource for ChannelDragSource {
    fn listen(
        &self,
        kind: DragEventKind,
        sink: UnboundedSender<DragEvent>,
    ) -> Result<Subscription, IntakeError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| IntakeError::SourceUnavailable("listener lock poisoned".to_string()))?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, kind, sink));

        let registry = Arc::clone(&self.inner);
        Ok(Subscription::new(kind, move || {
            if let Ok(mut inner) = registry.lock() {
                inner.listeners.retain(|(listener_id, _, _)| *listener_id != id);
                if inner.teardown_log.len() == TEARDOWN_LOG_CAPACITY {
                    inner.teardown_log.pop_front();
                }
                inner.teardown_log.push_back(kind);
            }
        }))
    }
}
