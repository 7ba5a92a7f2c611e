//! Public handle for one running autosuggest widget
//!
//! A [`SuggestSession`] spawns a [`SuggestActor`] on the current tokio runtime
//! and exposes the presentation-facing API: feed it input, key and scroll
//! events, read the latest [`Snapshot`], and receive outbound notifications.

use crate::actors::messages::SuggestMessage;
use crate::actors::suggest::{SuggestActor, SuggestHandler};
use crate::config::SuggestConfig;
use crate::controller::{ScrollMetrics, SearchController, Snapshot};
use crate::core::{ActorSendError, Message};
use crate::error::ConfigError;
use crate::fetch::FetchClient;
use crate::format::Formatter;
use crate::navigator::{Key, Navigation};
use crate::types::SearchResultItem;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Receives the item the user picked from the dropdown
pub trait SelectionHandler: Send + Sync {
    fn on_select(&self, item: &SearchResultItem);
}

impl<F> SelectionHandler for F
where
    F: Fn(&SearchResultItem) + Send + Sync,
{
    fn on_select(&self, item: &SearchResultItem) {
        self(item)
    }
}

pub struct SuggestSession {
    actor: SuggestActor,
    inbox: mpsc::UnboundedSender<Message<SuggestMessage>>,
    events: mpsc::UnboundedReceiver<Message<SuggestMessage>>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SuggestSession {
    /// Validate `config` and start the widget runtime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: SuggestConfig,
        client: Arc<dyn FetchClient>,
        on_select: impl SelectionHandler + 'static,
    ) -> Result<Self, ConfigError> {
        let formatter = config.formatter.build();
        Self::spawn_with_formatter(config, formatter, client, on_select)
    }

    /// Like [`SuggestSession::spawn`] with a custom formatter strategy
    pub fn spawn_with_formatter(
        config: SuggestConfig,
        formatter: Arc<dyn Formatter>,
        client: Arc<dyn FetchClient>,
        on_select: impl SelectionHandler + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "Starting suggest session for {} (delay {}ms)",
            config.search_url,
            config.delay_ms
        );

        let controller = SearchController::with_formatter(config, formatter);
        let (snapshot_tx, snapshots) = watch::channel(controller.snapshot());
        let (inbox, receiver) = mpsc::unbounded_channel();
        let (events_tx, events) = mpsc::unbounded_channel();

        let handler = SuggestHandler::new(
            controller,
            client,
            inbox.clone(),
            Arc::new(on_select),
            snapshot_tx,
        );
        let actor = SuggestActor::new_suggest_actor(receiver, events_tx, handler);

        Ok(Self {
            actor,
            inbox,
            events,
            snapshots,
        })
    }

    fn send(&self, method: &str, payload: SuggestMessage) -> Result<(), ActorSendError> {
        self.inbox
            .send(Message::new(method, payload))
            .map_err(|_| ActorSendError::ChannelClosed)
    }

    /// The input field's value changed
    pub fn input(&self, raw: impl Into<String>) -> Result<(), ActorSendError> {
        self.send("inputChanged", SuggestMessage::InputChanged(raw.into()))
    }

    /// Forward a key press.
    ///
    /// Returns what the key does against the most recently published
    /// snapshot, so the caller can decide right away whether to suppress the
    /// key's default action.
    pub fn key_down(&self, key: Key) -> Result<Navigation, ActorSendError> {
        let navigation = self.snapshots.borrow().navigation_for(key);
        self.send("keyDown", SuggestMessage::KeyDown(key))?;
        Ok(navigation)
    }

    pub fn scrolled(&self, metrics: ScrollMetrics) -> Result<(), ActorSendError> {
        self.send("scrolled", SuggestMessage::Scrolled(metrics))
    }

    /// A suggestion row was clicked
    pub fn select(&self, index: usize) -> Result<(), ActorSendError> {
        self.send("selectIndex", SuggestMessage::SelectIndex(index))
    }

    /// Close the dropdown, e.g. on a click outside the widget
    pub fn dismiss(&self) -> Result<(), ActorSendError> {
        self.send("dismiss", SuggestMessage::Dismiss)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified whenever the visible state changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Next outbound notification (`stateChanged` or `itemSelected`).
    /// After [`SuggestSession::shutdown`] this drains what was already queued,
    /// then returns `None`.
    pub async fn next_event(&mut self) -> Option<Message<SuggestMessage>> {
        self.events.recv().await
    }

    /// Non-blocking variant of [`SuggestSession::next_event`]
    pub fn try_next_event(&mut self) -> Option<Message<SuggestMessage>> {
        self.events.try_recv().ok()
    }

    pub fn is_running(&self) -> bool {
        self.actor.is_running()
    }

    /// Tear the widget down: the pending timer and any in-flight request are
    /// cancelled and no callbacks fire afterwards.
    pub async fn shutdown(&mut self) {
        self.actor.shutdown().await;
        self.events.close();
    }
}
