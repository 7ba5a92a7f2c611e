//! Interactive terminal front end for the autosuggest widget

pub mod app;
pub mod input;
pub mod renderer;

pub use app::{run_tui, TuiApp};
pub use input::{InputBuffer, InputOperation};
pub use renderer::{FrameLayout, SuggestRenderer};
