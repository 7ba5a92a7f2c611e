use crate::controller::{RequestTicket, ScrollMetrics, Snapshot};
use crate::error::FetchError;
use crate::navigator::Key;
use crate::types::{ResponsePage, SearchResultItem};

#[derive(Debug, Clone)]
pub enum SuggestMessage {
    // Presentation events
    InputChanged(String),
    KeyDown(Key),
    Scrolled(ScrollMetrics),
    SelectIndex(usize), // clicked row
    Dismiss,            // Escape or click outside the widget

    // Internal wake-ups posted back to the actor's own inbox
    DebounceElapsed {
        generation: u64,
    },
    FetchCompleted {
        ticket: RequestTicket,
        result: Result<ResponsePage, FetchError>,
    },

    // Outbound notifications
    StateChanged(Snapshot),
    ItemSelected(SearchResultItem),
}
