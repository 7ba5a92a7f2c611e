//! Actor runtime
//!
//! An [`Actor`] owns a [`MessageHandler`] and feeds it the messages arriving
//! on its inbox, one at a time, from a task on the ambient tokio runtime.
//! Whatever the handler reports goes out through an [`ActorController`].

use crate::core::message::{Message, MessageHandler};
use std::marker::PhantomData;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub struct Actor<T: Send + 'static, H: MessageHandler<T> + 'static> {
    stop_signal: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    _phantom: PhantomData<fn() -> (T, H)>,
}

impl<T: Send + 'static, H: MessageHandler<T> + 'static> Actor<T, H> {
    /// Spawn the message loop. Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `inbox` - Messages for the handler
    /// * `outbox` - Where the handler's notifications are delivered
    /// * `handler` - Message handler implementation
    pub fn new(
        inbox: mpsc::UnboundedReceiver<Message<T>>,
        outbox: mpsc::UnboundedSender<Message<T>>,
        handler: H,
    ) -> Self {
        let (stop_signal, stopped) = oneshot::channel();
        let task = tokio::spawn(Self::run(
            inbox,
            ActorController::new(outbox),
            handler,
            stopped,
        ));

        Self {
            stop_signal: Some(stop_signal),
            task: Some(task),
            _phantom: PhantomData,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }

    async fn run(
        mut inbox: mpsc::UnboundedReceiver<Message<T>>,
        controller: ActorController<T>,
        mut handler: H,
        mut stopped: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = &mut stopped => {
                    log::debug!("Stop requested, leaving message loop");
                    break;
                }
                message = inbox.recv() => match message {
                    Some(message) => {
                        log::trace!("Dispatching {}", message.method);
                        handler.on_message(message, &controller).await;
                    }
                    None => {
                        log::debug!("Inbox closed, leaving message loop");
                        break;
                    }
                },
            }
        }

        handler.on_stop();
    }

    /// Stop the message loop and wait until the handler has been torn down.
    /// Dropping the actor only signals the loop.
    pub async fn shutdown(&mut self) {
        if let Some(stop_signal) = self.stop_signal.take() {
            let _ = stop_signal.send(());
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Message loop ended abnormally: {}", e);
            }
        }
        log::debug!("Actor stopped");
    }
}

impl<T: Send + 'static, H: MessageHandler<T> + 'static> Drop for Actor<T, H> {
    fn drop(&mut self) {
        if let Some(stop_signal) = self.stop_signal.take() {
            let _ = stop_signal.send(());
        }
    }
}

/// Error type for Actor message sending operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorSendError {
    #[error("Actor channel is closed")]
    ChannelClosed,
}

/// Outbound side of an actor, handed to the handler on every message
pub struct ActorController<T> {
    outbox: mpsc::UnboundedSender<Message<T>>,
}

impl<T: Send + 'static> ActorController<T> {
    pub fn new(outbox: mpsc::UnboundedSender<Message<T>>) -> Self {
        Self { outbox }
    }

    pub fn send_message(
        &self,
        method: impl Into<String>,
        payload: T,
    ) -> Result<(), ActorSendError> {
        self.outbox
            .send(Message::new(method, payload))
            .map_err(|_| ActorSendError::ChannelClosed)
    }
}

impl<T> Clone for ActorController<T> {
    fn clone(&self) -> Self {
        Self {
            outbox: self.outbox.clone(),
        }
    }
}
