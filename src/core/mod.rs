//! Method-dispatched actor runtime
//!
//! Each actor owns its handler and processes one message at a time from its
//! inbox. Notifications flow out on a separate channel; there is no
//! request/response pairing.

pub mod actor;
pub mod message;

pub use actor::{Actor, ActorController, ActorSendError};
pub use message::{Message, MessageHandler};
