pub mod actors;
pub mod cli;
pub mod collate;
pub mod config;
pub mod controller;
pub mod core;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod format;
pub mod highlight;
pub mod navigator;
pub mod session;
pub mod tui;
pub mod types;

// 公開API
pub use config::SuggestConfig;
pub use controller::{Effect, SearchController, Snapshot};
pub use error::{ConfigError, FetchError, FetchErrorKind};
pub use fetch::{FetchClient, HttpFetchClient};
pub use format::{AlphanumericFormatter, DefaultFormatter, Formatter, FormatterKind};
pub use navigator::{Key, Navigation};
pub use session::{SelectionHandler, SuggestSession};
pub use types::{PageInfo, ResponsePage, SearchResultItem};
