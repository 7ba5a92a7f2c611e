//! autosuggest - search-as-you-type terminal widget
//!
//! Command-line usage:
//!   autosuggest                       - search the Rick and Morty character API
//!   autosuggest --url URL             - search another paginated JSON endpoint
//!   autosuggest --config FILE         - load endpoint settings from a JSON file
//!   autosuggest --log-file FILE       - write RUST_LOG output to FILE
//!
//! Every selected item is printed to stdout as one JSON line on exit.
//! Without `--log-file`, log output goes to stderr and draws over the widget
//! unless stderr is redirected.

use autosuggest::cli::run_cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_cli().await
}
