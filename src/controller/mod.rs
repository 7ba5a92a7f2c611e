//! Search controller state machine
//!
//! Reconciles keystrokes, debounced searches, overlapping responses,
//! pagination and keyboard selection into one [`ControllerState`]. The
//! controller never performs I/O itself: every transition returns the
//! [`Effect`]s its runtime has to carry out (see `actors::suggest`).
//!
//! Supersession works with a generation counter. Input changes, selections
//! and dismissals advance it; a response is merged only if it was issued under
//! the current generation, so a slow reply for an older term can never
//! overwrite newer results.

pub mod state;

pub use state::{
    ControllerState, Effect, KeyOutcome, RequestTicket, ResponseDisposition, ScrollMetrics,
    Snapshot,
};

use crate::collate::sort_by_name;
use crate::config::SuggestConfig;
use crate::error::FetchError;
use crate::fetch::build_search_url;
use crate::format::Formatter;
use crate::highlight::find_match_index;
use crate::navigator::{navigate, Key, Navigation};
use crate::types::ResponsePage;
use std::sync::Arc;

pub struct SearchController {
    config: SuggestConfig,
    formatter: Arc<dyn Formatter>,
    state: ControllerState,
}

impl SearchController {
    /// Controller using the formatter named in `config`
    pub fn new(config: SuggestConfig) -> Self {
        let formatter = config.formatter.build();
        Self::with_formatter(config, formatter)
    }

    /// Controller with a custom formatter strategy
    pub fn with_formatter(config: SuggestConfig, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            config,
            formatter,
            state: ControllerState::default(),
        }
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(&self.state, self.config.enable_highlight)
    }

    /// The user edited the input field
    pub fn input_changed(&mut self, raw: &str) -> Vec<Effect> {
        let formatted = self.formatter.format(raw);

        self.state.inputs_applied += 1;
        self.state.normalized_term = normalize(&formatted);
        if formatted != self.state.last_committed_selection {
            self.state.last_committed_selection.clear();
        }
        self.state.raw_term = formatted;
        self.state.reset_results();

        let mut effects = self.supersede();
        log::debug!(
            "Input changed to '{}' (generation {})",
            self.state.raw_term,
            self.state.request_generation
        );

        effects.push(Effect::ScheduleSearch {
            term: self.state.normalized_term.clone(),
            generation: self.state.request_generation,
        });
        effects
    }

    /// The debounce timer scheduled for `generation` fired
    pub fn debounce_elapsed(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.state.request_generation {
            log::trace!(
                "Ignoring debounce for generation {} (current {})",
                generation,
                self.state.request_generation
            );
            return Vec::new();
        }
        if self.state.normalized_term.is_empty() {
            return Vec::new();
        }
        if self.is_selection_echo() {
            log::debug!(
                "Skipping search for just-selected '{}'",
                self.state.last_committed_selection
            );
            return Vec::new();
        }

        self.issue_fetch()
    }

    /// Merge the outcome of a request issued under `ticket`
    pub fn apply_response(
        &mut self,
        ticket: &RequestTicket,
        result: Result<ResponsePage, FetchError>,
    ) -> ResponseDisposition {
        if ticket.generation != self.state.request_generation
            || self.state.in_flight.as_ref() != Some(ticket)
        {
            log::debug!(
                "Discarding stale response for '{}' page {} (generation {}, current {})",
                ticket.term,
                ticket.page,
                ticket.generation,
                self.state.request_generation
            );
            return ResponseDisposition::Stale;
        }

        self.state.in_flight = None;
        self.state.loading = false;

        match result {
            Ok(page) => self.merge_page(ticket, page),
            Err(e) => {
                log::warn!(
                    "Search for '{}' page {} failed: {}",
                    ticket.term,
                    ticket.page,
                    e
                );
                self.page_failed(ticket.page);
            }
        }

        ResponseDisposition::Applied
    }

    fn page_failed(&mut self, page: u32) {
        if page == 1 {
            self.state.suggestions = Some(Vec::new());
            self.state.active_index = None;
        } else {
            // Let the next scroll retry the page that failed
            self.state.page = self.state.last_loaded_page.max(1);
        }
    }

    /// The presentation reported a new scroll position of the list
    pub fn scrolled(&mut self, metrics: ScrollMetrics) -> Vec<Effect> {
        if !metrics.is_near_bottom(self.config.scroll_threshold) {
            return Vec::new();
        }
        if self.state.last_scroll_offset == Some(metrics.scroll_top) {
            log::trace!("Duplicate scroll-bottom signal at {}", metrics.scroll_top);
            return Vec::new();
        }
        if self.state.loading
            || self.state.exhausted
            || self.state.normalized_term.is_empty()
            || self.state.suggestion_count() == 0
        {
            return Vec::new();
        }

        self.state.last_scroll_offset = Some(metrics.scroll_top);
        self.state.page += 1;
        log::debug!(
            "Loading page {} for '{}'",
            self.state.page,
            self.state.normalized_term
        );

        self.issue_fetch()
    }

    /// Keyboard handling for the input field
    pub fn key_down(&mut self, key: Key) -> KeyOutcome {
        let navigation = navigate(key, self.state.suggestion_count(), self.state.active_index);

        let effects = match navigation {
            Navigation::Move(index) => {
                self.state.active_index = Some(index);
                Vec::new()
            }
            Navigation::Commit(index) => self.commit(index),
            Navigation::Close => self.dismiss(),
            Navigation::Ignore => Vec::new(),
        };

        KeyOutcome {
            navigation,
            prevent_default: navigation.prevent_default(key),
            effects,
        }
    }

    /// A suggestion was clicked
    pub fn select_index(&mut self, index: usize) -> Vec<Effect> {
        if index >= self.state.suggestion_count() {
            return Vec::new();
        }
        self.commit(index)
    }

    /// Close the dropdown without touching the input (Escape, click outside)
    pub fn dismiss(&mut self) -> Vec<Effect> {
        self.state.reset_results();
        self.supersede()
    }

    fn commit(&mut self, index: usize) -> Vec<Effect> {
        let Some(item) = self
            .state
            .suggestions
            .as_ref()
            .and_then(|suggestions| suggestions.get(index))
            .cloned()
        else {
            return Vec::new();
        };

        log::debug!("Selected '{}' (id {})", item.name, item.id);

        self.state.raw_term = item.name.clone();
        self.state.normalized_term = normalize(&item.name);
        self.state.last_committed_selection = item.name.clone();
        self.state.reset_results();

        let mut effects = self.supersede();
        effects.push(Effect::Selected(item));
        effects
    }

    /// Advance the generation, cancel the pending timer and retire whatever
    /// request is in flight.
    fn supersede(&mut self) -> Vec<Effect> {
        self.state.request_generation += 1;

        let mut effects = vec![Effect::CancelScheduled];
        if let Some(ticket) = self.state.in_flight.take() {
            self.state.loading = false;
            if self.config.abort_superseded {
                effects.push(Effect::AbortFetch(ticket));
            }
        }
        effects
    }

    fn issue_fetch(&mut self) -> Vec<Effect> {
        if let Some(in_flight) = &self.state.in_flight {
            if in_flight.generation == self.state.request_generation {
                log::debug!(
                    "Request for '{}' already in flight, not issuing another",
                    in_flight.term
                );
                return Vec::new();
            }
        }

        let term = self.state.normalized_term.clone();
        let url = match build_search_url(&self.config, &term, self.state.page) {
            Ok(url) => url,
            Err(e) => {
                log::error!("Cannot search for '{}': {}", term, e);
                self.page_failed(self.state.page);
                return Vec::new();
            }
        };
        let ticket = RequestTicket {
            generation: self.state.request_generation,
            page: self.state.page,
            url,
            term,
        };

        self.state.in_flight = Some(ticket.clone());
        self.state.loading = true;

        vec![Effect::IssueFetch(ticket)]
    }

    fn merge_page(&mut self, ticket: &RequestTicket, page: ResponsePage) {
        let exhausted = page.is_last_page(ticket.page) || (ticket.page > 1 && page.results.is_empty());

        let mut items: Vec<_> = page
            .results
            .into_iter()
            .map(|item| {
                let match_index = find_match_index(&item.name, &ticket.term);
                item.with_match_index(match_index)
            })
            .collect();
        sort_by_name(&mut items, |item| item.name.as_str());

        log::debug!(
            "Merging {} results for '{}' page {}",
            items.len(),
            ticket.term,
            ticket.page
        );

        if ticket.page == 1 {
            self.state.suggestions = Some(items);
            self.state.active_index = None;
        } else {
            self.state
                .suggestions
                .get_or_insert_with(Vec::new)
                .extend(items);
        }

        self.state.last_loaded_page = ticket.page;
        self.state.exhausted = exhausted;
    }

    fn is_selection_echo(&self) -> bool {
        !self.state.last_committed_selection.is_empty()
            && normalize(&self.state.last_committed_selection) == self.state.normalized_term
    }
}

fn normalize(term: &str) -> String {
    term.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AlphanumericFormatter;
    use crate::types::{PageInfo, SearchResultItem};

    fn config() -> SuggestConfig {
        SuggestConfig::new("https://rickandmortyapi.com/api/character/", "name", "page")
    }

    fn page(names: &[(i64, &str)]) -> ResponsePage {
        ResponsePage::new(
            names
                .iter()
                .map(|(id, name)| SearchResultItem::new(*id, *name))
                .collect(),
        )
    }

    fn names(controller: &SearchController) -> Vec<String> {
        controller
            .state()
            .suggestions
            .as_ref()
            .map(|s| s.iter().map(|i| i.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Type `raw`, fire the debounce and return the issued ticket
    fn search(controller: &mut SearchController, raw: &str) -> RequestTicket {
        controller.input_changed(raw);
        let generation = controller.state().request_generation;
        match controller.debounce_elapsed(generation).pop() {
            Some(Effect::IssueFetch(ticket)) => ticket,
            other => panic!("expected a fetch, got {:?}", other),
        }
    }

    fn issued(effects: &[Effect]) -> Vec<&RequestTicket> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::IssueFetch(ticket) => Some(ticket),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let controller = SearchController::new(config());
        let state = controller.state();
        assert_eq!(state.page, 1);
        assert!(state.suggestions.is_none());
        assert!(state.active_index.is_none());
        assert!(!state.loading);
    }

    #[test]
    fn test_input_change_schedules_search() {
        let mut controller = SearchController::new(config());
        let effects = controller.input_changed("  Rick");

        assert_eq!(controller.state().raw_term, "Rick");
        assert_eq!(controller.state().normalized_term, "rick");
        assert_eq!(
            effects.last(),
            Some(&Effect::ScheduleSearch {
                term: "rick".to_string(),
                generation: 1
            })
        );
        assert!(issued(&effects).is_empty());
    }

    #[test]
    fn test_debounce_issues_fetch_with_url() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "Rick");

        assert_eq!(
            ticket.url,
            "https://rickandmortyapi.com/api/character/?name=rick&page=1"
        );
        assert_eq!(ticket.page, 1);
        assert!(controller.state().loading);
    }

    #[test]
    fn test_custom_formatter() {
        let mut controller =
            SearchController::with_formatter(config(), Arc::new(AlphanumericFormatter));
        controller.input_changed("Mr. Poopy!");
        assert_eq!(controller.state().raw_term, "Mr Poopy");
        assert_eq!(controller.state().normalized_term, "mr poopy");
    }

    #[test]
    fn test_stale_debounce_generation_is_ignored() {
        let mut controller = SearchController::new(config());
        controller.input_changed("ric");
        controller.input_changed("rick");
        assert!(controller.debounce_elapsed(1).is_empty());
        assert_eq!(issued(&controller.debounce_elapsed(2)).len(), 1);
    }

    #[test]
    fn test_empty_term_does_not_fetch() {
        let mut controller = SearchController::new(config());
        controller.input_changed("   ");
        let generation = controller.state().request_generation;
        assert!(controller.debounce_elapsed(generation).is_empty());
        assert!(!controller.state().loading);
    }

    #[test]
    fn test_response_sorted_with_match_index() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "rick");

        let disposition = controller.apply_response(
            &ticket,
            Ok(page(&[(1, "Rick Sanchez"), (8, "Adjudicator Rick"), (15, "alien Rick")])),
        );

        assert_eq!(disposition, ResponseDisposition::Applied);
        assert_eq!(
            names(&controller),
            vec!["Adjudicator Rick", "alien Rick", "Rick Sanchez"]
        );
        let suggestions = controller.state().suggestions.as_ref().unwrap();
        assert_eq!(suggestions[0].match_index, Some(12));
        assert_eq!(suggestions[2].match_index, Some(0));
        assert!(!controller.state().loading);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = SearchController::new(config());
        let ric = search(&mut controller, "ric");
        let rick = search(&mut controller, "rick");

        assert_eq!(
            controller.apply_response(&rick, Ok(page(&[(1, "Rick Sanchez")]))),
            ResponseDisposition::Applied
        );
        assert_eq!(
            controller.apply_response(&ric, Ok(page(&[(2, "Ricky")]))),
            ResponseDisposition::Stale
        );
        assert_eq!(names(&controller), vec!["Rick Sanchez"]);
    }

    #[test]
    fn test_superseded_fetch_is_aborted() {
        let mut controller = SearchController::new(config());
        let ric = search(&mut controller, "ric");

        let effects = controller.input_changed("rick");
        assert!(effects.contains(&Effect::AbortFetch(ric)));
        assert!(!controller.state().loading);
    }

    #[test]
    fn test_superseded_fetch_not_aborted_when_disabled() {
        let mut controller = SearchController::new(config().with_abort_superseded(false));
        search(&mut controller, "ric");

        let effects = controller.input_changed("rick");
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::AbortFetch(_))));
    }

    #[test]
    fn test_first_page_error_yields_empty_results() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "zzz");

        controller.apply_response(&ticket, Err(FetchError::Status(404)));
        assert_eq!(controller.state().suggestions, Some(vec![]));
        assert!(controller.snapshot().show_no_results());
        assert!(!controller.state().loading);
    }

    #[test]
    fn test_pagination_appends_sorted_page() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(2, "B"), (1, "A")])));

        let effects = controller.scrolled(ScrollMetrics::new(80, 20, 100));
        let second = issued(&effects)[0].clone();
        assert_eq!(second.page, 2);
        assert!(second.url.ends_with("page=2"));

        controller.apply_response(&second, Ok(page(&[(4, "D"), (3, "C")])));
        assert_eq!(names(&controller), vec!["A", "B", "C", "D"]);
        assert_eq!(controller.state().page, 2);
    }

    #[test]
    fn test_appended_page_is_not_merged_into_global_order() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "M"), (2, "N")])));

        let effects = controller.scrolled(ScrollMetrics::new(80, 20, 100));
        let second = issued(&effects)[0].clone();
        controller.apply_response(&second, Ok(page(&[(4, "Z"), (3, "A")])));

        assert_eq!(names(&controller), vec!["M", "N", "A", "Z"]);
    }

    #[test]
    fn test_duplicate_scroll_signal_is_ignored() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "A")])));

        let effects = controller.scrolled(ScrollMetrics::new(80, 20, 100));
        let second = issued(&effects)[0].clone();
        controller.apply_response(&second, Ok(page(&[(2, "B")])));

        assert!(controller.scrolled(ScrollMetrics::new(80, 20, 100)).is_empty());
        assert_eq!(controller.state().page, 2);
    }

    #[test]
    fn test_scroll_while_loading_is_ignored() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "A")])));

        assert_eq!(issued(&controller.scrolled(ScrollMetrics::new(80, 20, 100))).len(), 1);
        assert!(controller.scrolled(ScrollMetrics::new(81, 20, 100)).is_empty());
        assert_eq!(controller.state().page, 2);
    }

    #[test]
    fn test_scroll_away_from_bottom_is_ignored() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "A")])));

        assert!(controller.scrolled(ScrollMetrics::new(10, 20, 100)).is_empty());
        assert_eq!(controller.state().page, 1);
    }

    #[test]
    fn test_failed_pagination_keeps_results_and_allows_retry() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "A"), (2, "B")])));

        let effects = controller.scrolled(ScrollMetrics::new(80, 20, 100));
        let second = issued(&effects)[0].clone();
        controller.apply_response(&second, Err(FetchError::Network("reset".into())));

        assert_eq!(names(&controller), vec!["A", "B"]);
        assert_eq!(controller.state().page, 1);
        assert!(!controller.state().loading);

        let retry = controller.scrolled(ScrollMetrics::new(82, 20, 100));
        assert_eq!(issued(&retry)[0].page, 2);
    }

    #[test]
    fn test_last_page_stops_pagination() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        let mut response = page(&[(1, "A")]);
        response.info = Some(PageInfo {
            count: Some(1),
            pages: Some(1),
            next: None,
            prev: None,
        });
        controller.apply_response(&first, Ok(response));

        assert!(controller.state().exhausted);
        assert!(controller.scrolled(ScrollMetrics::new(80, 20, 100)).is_empty());
    }

    #[test]
    fn test_input_change_resets_pagination() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "A")])));
        let effects = controller.scrolled(ScrollMetrics::new(80, 20, 100));
        let second = issued(&effects)[0].clone();
        controller.apply_response(&second, Ok(page(&[(2, "B")])));

        controller.input_changed("morty");
        assert_eq!(controller.state().page, 1);
        assert!(controller.state().suggestions.is_none());
        assert!(controller.state().last_scroll_offset.is_none());
    }

    #[test]
    fn test_clearing_input_resets_state() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "rick");
        controller.apply_response(&ticket, Ok(page(&[(1, "Rick")])));
        controller.key_down(Key::Down);

        controller.input_changed("");
        assert!(controller.state().suggestions.is_none());
        assert!(controller.state().active_index.is_none());
        assert_eq!(controller.state().page, 1);
    }

    #[test]
    fn test_keyboard_navigation_and_enter_selection() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "Rick");
        controller.apply_response(&ticket, Ok(page(&[(1, "Rick"), (2, "Rick Sanchez")])));

        let outcome = controller.key_down(Key::Down);
        assert_eq!(outcome.navigation, Navigation::Move(0));
        assert!(outcome.prevent_default);
        controller.key_down(Key::Down);
        controller.key_down(Key::Down);
        assert_eq!(controller.state().active_index, Some(0));
        controller.key_down(Key::Up);
        assert_eq!(controller.state().active_index, Some(1));

        let outcome = controller.key_down(Key::Enter);
        assert!(outcome.prevent_default);
        let selected: Vec<_> = outcome
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Selected(item) => Some(item.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Rick Sanchez");
        assert_eq!(selected[0].match_index, Some(0));

        let state = controller.state();
        assert_eq!(state.raw_term, "Rick Sanchez");
        assert_eq!(state.last_committed_selection, "Rick Sanchez");
        assert!(state.suggestions.is_none());
        assert!(state.active_index.is_none());
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_enter_without_active_index_is_noop() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "Rick");
        controller.apply_response(&ticket, Ok(page(&[(1, "Rick")])));

        let outcome = controller.key_down(Key::Enter);
        assert!(outcome.effects.is_empty());
        assert!(!outcome.prevent_default);
        assert!(controller.state().suggestions.is_some());
    }

    #[test]
    fn test_selection_echo_does_not_search() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "Rick");
        controller.apply_response(&ticket, Ok(page(&[(1, "Rick")])));
        controller.select_index(0);

        // The input field reports the programmatic value back
        controller.input_changed("Rick");
        let generation = controller.state().request_generation;
        assert!(controller.debounce_elapsed(generation).is_empty());
        assert_eq!(controller.state().last_committed_selection, "Rick");

        // Editing away from the selection searches again
        controller.input_changed("Rick ");
        let generation = controller.state().request_generation;
        assert!(controller.state().last_committed_selection.is_empty());
        assert_eq!(issued(&controller.debounce_elapsed(generation)).len(), 1);
    }

    #[test]
    fn test_in_flight_response_does_not_reopen_after_selection() {
        let mut controller = SearchController::new(config());
        let first = search(&mut controller, "rick");
        controller.apply_response(&first, Ok(page(&[(1, "Rick"), (2, "Rick Sanchez")])));
        let effects = controller.scrolled(ScrollMetrics::new(80, 20, 100));
        let second = issued(&effects)[0].clone();

        controller.select_index(0);
        assert_eq!(
            controller.apply_response(&second, Ok(page(&[(3, "Rick Prime")]))),
            ResponseDisposition::Stale
        );
        assert!(controller.state().suggestions.is_none());
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let mut controller = SearchController::new(config());
        assert!(controller.select_index(0).is_empty());
    }

    #[test]
    fn test_escape_closes_dropdown_keeping_input() {
        let mut controller = SearchController::new(config());
        let ticket = search(&mut controller, "Rick");
        controller.apply_response(&ticket, Ok(page(&[(1, "Rick")])));
        controller.key_down(Key::Down);

        let outcome = controller.key_down(Key::Escape);
        assert_eq!(outcome.navigation, Navigation::Close);
        assert!(controller.state().suggestions.is_none());
        assert!(controller.state().active_index.is_none());
        assert_eq!(controller.state().raw_term, "Rick");
    }

    #[test]
    fn test_overlapping_fetch_for_same_generation_is_skipped() {
        let mut controller = SearchController::new(config());
        search(&mut controller, "rick");
        let generation = controller.state().request_generation;
        assert!(controller.debounce_elapsed(generation).is_empty());
    }

    #[test]
    fn test_other_key_is_ignored() {
        let mut controller = SearchController::new(config());
        let outcome = controller.key_down(Key::Other);
        assert_eq!(outcome.navigation, Navigation::Ignore);
        assert!(!outcome.prevent_default);
        assert!(outcome.effects.is_empty());
    }

    #[test]
    fn test_unbuildable_url_reports_no_results() {
        let mut controller = SearchController::new(SuggestConfig::new("/api/character/", "name", "page"));
        controller.input_changed("rick");
        let generation = controller.state().request_generation;

        let effects = controller.debounce_elapsed(generation);

        assert!(issued(&effects).is_empty());
        assert!(!controller.state().loading);
        assert!(controller.state().in_flight.is_none());
        assert!(controller.snapshot().show_no_results());
    }
}
