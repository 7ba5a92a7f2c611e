//! Runtime for a single autosuggest widget
//!
//! The [`SuggestHandler`] owns a [`SearchController`] and carries out the
//! effects it returns: debounce timers, HTTP fetches and selection callbacks.
//! Timers and fetches report back by posting messages to the actor's own
//! inbox, so every state transition happens on the actor task.

use crate::actors::messages::SuggestMessage;
use crate::controller::{Effect, RequestTicket, SearchController, Snapshot};
use crate::core::{Actor, ActorController, Message, MessageHandler};
use crate::debounce::SearchDebouncer;
use crate::error::FetchError;
use crate::fetch::FetchClient;
use crate::session::SelectionHandler;
use crate::types::{ResponsePage, SearchResultItem};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

pub struct SuggestHandler {
    controller: SearchController,
    debouncer: SearchDebouncer,
    client: Arc<dyn FetchClient>,
    /// Our own inbox, for timer and fetch completions
    inbox: mpsc::UnboundedSender<Message<SuggestMessage>>,
    on_select: Arc<dyn SelectionHandler>,
    snapshots: watch::Sender<Snapshot>,
    in_flight: Option<(RequestTicket, CancellationToken)>,
    request_timeout: Option<Duration>,
}

impl SuggestHandler {
    pub fn new(
        controller: SearchController,
        client: Arc<dyn FetchClient>,
        inbox: mpsc::UnboundedSender<Message<SuggestMessage>>,
        on_select: Arc<dyn SelectionHandler>,
        snapshots: watch::Sender<Snapshot>,
    ) -> Self {
        let config = controller.config();
        let debouncer = SearchDebouncer::with_delay(config.delay());
        let request_timeout = config.request_timeout();

        Self {
            controller,
            debouncer,
            client,
            inbox,
            on_select,
            snapshots,
            in_flight: None,
            request_timeout,
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>, controller: &ActorController<SuggestMessage>) {
        for effect in effects {
            match effect {
                Effect::ScheduleSearch { term, generation } => {
                    self.schedule_search(term, generation);
                }
                Effect::CancelScheduled => self.debouncer.cancel_pending(),
                Effect::IssueFetch(ticket) => self.issue_fetch(ticket),
                Effect::AbortFetch(ticket) => self.abort_fetch(&ticket),
                Effect::Selected(item) => self.notify_selected(item, controller),
            }
        }
    }

    fn schedule_search(&mut self, term: String, generation: u64) {
        let inbox = self.inbox.clone();
        self.debouncer.schedule(term, move |_term| async move {
            let _ = inbox.send(Message::new(
                "debounceElapsed",
                SuggestMessage::DebounceElapsed { generation },
            ));
        });
    }

    fn issue_fetch(&mut self, ticket: RequestTicket) {
        log::info!("Fetching {}", ticket.url);

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let client = self.client.clone();
        let inbox = self.inbox.clone();
        let timeout = self.request_timeout;
        let request = ticket.clone();
        let url = ticket.url.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    log::debug!("Request for '{}' page {} aborted", request.term, request.page);
                }
                result = fetch_with_timeout(client.as_ref(), &url, timeout) => {
                    let _ = inbox.send(Message::new(
                        "fetchCompleted",
                        SuggestMessage::FetchCompleted { ticket: request, result },
                    ));
                }
            }
        });

        // A request replaced without an abort keeps running and is discarded as stale
        self.in_flight = Some((ticket, token));
    }

    fn abort_fetch(&mut self, ticket: &RequestTicket) {
        if let Some((current, token)) = self.in_flight.take() {
            if &current == ticket {
                token.cancel();
            } else {
                self.in_flight = Some((current, token));
            }
        }
    }

    fn notify_selected(&self, item: SearchResultItem, controller: &ActorController<SuggestMessage>) {
        log::info!("Suggestion selected: {} (id {})", item.name, item.id);
        self.on_select.on_select(&item);

        if let Err(e) = controller.send_message("itemSelected", SuggestMessage::ItemSelected(item)) {
            log::debug!("Failed to send itemSelected notification: {}", e);
        }
    }

    fn handle_fetch_completed(
        &mut self,
        ticket: RequestTicket,
        result: Result<ResponsePage, FetchError>,
    ) {
        if matches!(&self.in_flight, Some((current, _)) if current == &ticket) {
            self.in_flight = None;
        }
        self.controller.apply_response(&ticket, result);
    }

    /// Push the current snapshot to subscribers if anything visible changed
    fn publish(&self, controller: &ActorController<SuggestMessage>) {
        let snapshot = self.controller.snapshot();
        let changed = self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot.clone();
                true
            }
        });

        if changed {
            if let Err(e) = controller.send_message("stateChanged", SuggestMessage::StateChanged(snapshot)) {
                log::debug!("Failed to send stateChanged notification: {}", e);
            }
        }
    }
}

#[async_trait]
impl MessageHandler<SuggestMessage> for SuggestHandler {
    async fn on_message(
        &mut self,
        message: Message<SuggestMessage>,
        controller: &ActorController<SuggestMessage>,
    ) {
        let effects = match (message.method.as_str(), message.payload) {
            ("inputChanged", SuggestMessage::InputChanged(raw)) => self.controller.input_changed(&raw),
            ("keyDown", SuggestMessage::KeyDown(key)) => self.controller.key_down(key).effects,
            ("scrolled", SuggestMessage::Scrolled(metrics)) => self.controller.scrolled(metrics),
            ("selectIndex", SuggestMessage::SelectIndex(index)) => {
                self.controller.select_index(index)
            }
            ("dismiss", SuggestMessage::Dismiss) => self.controller.dismiss(),
            ("debounceElapsed", SuggestMessage::DebounceElapsed { generation }) => {
                self.controller.debounce_elapsed(generation)
            }
            ("fetchCompleted", SuggestMessage::FetchCompleted { ticket, result }) => {
                self.handle_fetch_completed(ticket, result);
                Vec::new()
            }
            (method, _) => {
                log::warn!("SuggestHandler received unexpected message: {}", method);
                return;
            }
        };

        self.run_effects(effects, controller);
        self.publish(controller);
    }

    fn on_stop(&mut self) {
        log::debug!("Suggest actor stopping, cancelling pending work");
        self.debouncer.cancel_pending();
        if let Some((ticket, token)) = self.in_flight.take() {
            log::debug!("Aborting in-flight request for '{}'", ticket.term);
            token.cancel();
        }
    }
}

async fn fetch_with_timeout(
    client: &dyn FetchClient,
    url: &str,
    timeout: Option<Duration>,
) -> Result<ResponsePage, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, client.fetch(url))
            .await
            .unwrap_or_else(|_| {
                Err(FetchError::Network(format!(
                    "request timed out after {}ms",
                    limit.as_millis()
                )))
            }),
        None => client.fetch(url).await,
    }
}

/// Actor driving one autosuggest widget
pub type SuggestActor = Actor<SuggestMessage, SuggestHandler>;

impl SuggestActor {
    pub fn new_suggest_actor(
        receiver: mpsc::UnboundedReceiver<Message<SuggestMessage>>,
        sender: mpsc::UnboundedSender<Message<SuggestMessage>>,
        handler: SuggestHandler,
    ) -> Self {
        Self::new(receiver, sender, handler)
    }
}
