//! Message types and handler traits for the Actor system.

use crate::core::ActorController;
use async_trait::async_trait;

/// A method-tagged payload exchanged with an actor
#[derive(Debug, Clone, PartialEq)]
pub struct Message<T> {
    /// The method name for this message
    pub method: String,
    /// The message payload
    pub payload: T,
}

impl<T> Message<T> {
    pub fn new(method: impl Into<String>, payload: T) -> Self {
        Self {
            method: method.into(),
            payload,
        }
    }
}

/// Trait for handling messages in the Actor system.
///
/// Messages are delivered strictly one at a time, so a handler can own its
/// state without locking. Outbound notifications go through the provided
/// [`ActorController`].
#[async_trait]
pub trait MessageHandler<T>: Send {
    /// Handle an incoming message.
    ///
    /// # Arguments
    /// * `message` - The incoming message to process
    /// * `controller` - Controller for outgoing notifications
    async fn on_message(&mut self, message: Message<T>, controller: &ActorController<T>);

    /// Called once after the message loop has stopped, before the handler is dropped.
    fn on_stop(&mut self) {}
}
