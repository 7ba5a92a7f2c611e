use crate::highlight::{highlight_parts, HighlightSegment};
use crate::navigator::{navigate, Key, Navigation};
use crate::types::SearchResultItem;

/// Identifies one issued request.
///
/// A response is only merged while its `generation` is still the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub generation: u64,
    pub page: u32,
    pub term: String,
    pub url: String,
}

/// Scroll position of the suggestion list as reported by the presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub client_height: u32,
    pub scroll_height: u32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: u32, client_height: u32, scroll_height: u32) -> Self {
        Self {
            scroll_top,
            client_height,
            scroll_height,
        }
    }

    /// A list that has not been scrolled at all never counts as "at the bottom"
    pub fn is_near_bottom(&self, threshold: u32) -> bool {
        self.scroll_top > 0
            && self.client_height > 0
            && self.scroll_top.saturating_add(self.client_height).saturating_add(threshold)
                >= self.scroll_height
    }
}

/// Side effects the controller asks its runtime to perform
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the debounce timer; when it fires, report `generation` back
    ScheduleSearch { term: String, generation: u64 },
    CancelScheduled,
    IssueFetch(RequestTicket),
    /// Transport-level cancellation of a superseded request
    AbortFetch(RequestTicket),
    /// Notify the selection consumer
    Selected(SearchResultItem),
}

/// What happened to a response handed to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseDisposition {
    Applied,
    /// Superseded by newer input; discarded without touching state
    Stale,
}

/// Result of a key press: the navigation decision plus resulting effects
#[derive(Debug, Clone, PartialEq)]
pub struct KeyOutcome {
    pub navigation: Navigation,
    pub prevent_default: bool,
    pub effects: Vec<Effect>,
}

/// The single mutable unit owned by a [`super::SearchController`]
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Formatted input exactly as displayed
    pub raw_term: String,
    /// Lowercased, trimmed term sent to the endpoint
    pub normalized_term: String,
    pub page: u32,
    /// `None` until a search has completed; `Some(vec![])` means zero results
    pub suggestions: Option<Vec<SearchResultItem>>,
    pub active_index: Option<usize>,
    pub loading: bool,
    pub last_committed_selection: String,
    pub request_generation: u64,
    pub in_flight: Option<RequestTicket>,
    pub last_scroll_offset: Option<u32>,
    /// Highest page merged for the current term
    pub last_loaded_page: u32,
    /// The endpoint reported no further pages for the current term
    pub exhausted: bool,
    /// Number of input changes processed so far
    pub inputs_applied: u64,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            raw_term: String::new(),
            normalized_term: String::new(),
            page: 1,
            suggestions: None,
            active_index: None,
            loading: false,
            last_committed_selection: String::new(),
            request_generation: 0,
            in_flight: None,
            last_scroll_offset: None,
            last_loaded_page: 0,
            exhausted: false,
            inputs_applied: 0,
        }
    }
}

impl ControllerState {
    pub fn suggestion_count(&self) -> usize {
        self.suggestions.as_ref().map_or(0, Vec::len)
    }

    /// Drop the current result set and pagination progress
    pub(crate) fn reset_results(&mut self) {
        self.suggestions = None;
        self.active_index = None;
        self.page = 1;
        self.last_loaded_page = 0;
        self.last_scroll_offset = None;
        self.exhausted = false;
    }
}

/// Read-only view of the controller handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub raw_term: String,
    pub normalized_term: String,
    pub page: u32,
    pub suggestions: Option<Vec<SearchResultItem>>,
    pub active_index: Option<usize>,
    pub loading: bool,
    pub enable_highlight: bool,
    pub last_scroll_offset: Option<u32>,
    pub exhausted: bool,
    pub inputs_applied: u64,
}

impl Snapshot {
    pub(crate) fn from_state(state: &ControllerState, enable_highlight: bool) -> Self {
        Self {
            raw_term: state.raw_term.clone(),
            normalized_term: state.normalized_term.clone(),
            page: state.page,
            suggestions: state.suggestions.clone(),
            active_index: state.active_index,
            loading: state.loading,
            enable_highlight,
            last_scroll_offset: state.last_scroll_offset,
            exhausted: state.exhausted,
            inputs_applied: state.inputs_applied,
        }
    }

    /// The dropdown has something to show
    pub fn is_open(&self) -> bool {
        self.suggestions.as_ref().map_or(false, |s| !s.is_empty())
    }

    /// A search for the current term completed with zero results
    pub fn show_no_results(&self) -> bool {
        !self.normalized_term.is_empty()
            && !self.loading
            && self.suggestions.as_ref().map_or(false, Vec::is_empty)
    }

    /// Segments to render for the suggestion at `index`; one plain segment
    /// when highlighting is disabled.
    pub fn highlighted(&self, index: usize) -> Vec<HighlightSegment> {
        let Some(item) = self.suggestions.as_ref().and_then(|s| s.get(index)) else {
            return Vec::new();
        };
        let term = if self.enable_highlight {
            self.normalized_term.as_str()
        } else {
            ""
        };
        highlight_parts(&item.name, term)
    }

    /// What a key press would do against this snapshot, for presentations that
    /// must decide on default-action suppression synchronously
    pub fn navigation_for(&self, key: Key) -> Navigation {
        let len = self.suggestions.as_ref().map_or(0, Vec::len);
        navigate(key, len, self.active_index)
    }
}
