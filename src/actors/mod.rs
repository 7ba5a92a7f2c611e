//! Actor implementations for autosuggest
//!
//! Concrete actors built on the core actor system.

pub mod messages;
pub mod suggest;

pub use messages::SuggestMessage;
pub use suggest::{SuggestActor, SuggestHandler};
