//! TUI rendering
//!
//! Draws the search field, the suggestion dropdown and a help bar, and reports
//! where the interactive areas ended up so mouse events can be hit-tested.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::input::InputBuffer;
use crate::controller::Snapshot;

/// Screen areas of the last drawn frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameLayout {
    pub input: Rect,
    /// Rows of the suggestion list, inside its border; `None` while closed
    pub list: Option<Rect>,
}

pub struct SuggestRenderer;

impl SuggestRenderer {
    pub fn render(
        f: &mut Frame,
        input: &InputBuffer,
        snapshot: &Snapshot,
        list_state: &mut ListState,
        selected_count: usize,
    ) -> FrameLayout {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Input box
                Constraint::Min(1),    // Dropdown
                Constraint::Length(3), // Help bar
            ])
            .split(f.size());

        Self::render_input_box(f, chunks[0], input, snapshot.loading);
        let list = Self::render_dropdown(f, chunks[1], snapshot, list_state);
        Self::render_status_bar(f, chunks[2], selected_count);

        FrameLayout {
            input: chunks[0],
            list,
        }
    }

    fn render_input_box(f: &mut Frame, area: Rect, input: &InputBuffer, loading: bool) {
        let mut chars: Vec<char> = input.text().chars().collect();
        let cursor = input.cursor().min(chars.len());
        chars.insert(cursor, '█');
        let display_text: String = chars.into_iter().collect();

        let title = if loading { "Search (loading...)" } else { "Search" };

        let paragraph = Paragraph::new(display_text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::White));
        f.render_widget(paragraph, area);
    }

    fn render_dropdown(
        f: &mut Frame,
        area: Rect,
        snapshot: &Snapshot,
        list_state: &mut ListState,
    ) -> Option<Rect> {
        if snapshot.show_no_results() {
            let message = Paragraph::new("No results found")
                .block(Block::default().borders(Borders::ALL).title("Suggestions"))
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(message, area);
            return None;
        }

        let Some(suggestions) = snapshot.suggestions.as_ref().filter(|s| !s.is_empty()) else {
            return None;
        };

        let items: Vec<ListItem> = (0..suggestions.len())
            .map(|index| ListItem::new(Self::highlighted_line(snapshot, index)))
            .collect();

        let mut title = match snapshot.active_index {
            Some(index) => format!("Suggestions ({}/{})", index + 1, suggestions.len()),
            None => format!("Suggestions ({})", suggestions.len()),
        };
        if snapshot.loading {
            title.push_str(" loading more...");
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::White))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));

        list_state.select(snapshot.active_index);
        f.render_stateful_widget(list, area, list_state);

        Some(Block::default().borders(Borders::ALL).inner(area))
    }

    fn highlighted_line(snapshot: &Snapshot, index: usize) -> Line<'static> {
        let spans: Vec<Span<'static>> = snapshot
            .highlighted(index)
            .into_iter()
            .map(|segment| {
                if segment.matched {
                    Span::styled(
                        segment.text,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw(segment.text)
                }
            })
            .collect();
        Line::from(spans)
    }

    fn render_status_bar(f: &mut Frame, area: Rect, selected_count: usize) {
        let help_text = format!(
            "↑↓/C-p/C-n: Navigate | Enter/Click: Select | C-a/e: Start/End | C-k/y: Kill/Yank | Esc: Close/Quit | Selected: {}",
            selected_count
        );
        let help = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .style(Style::default().fg(Color::Gray));
        f.render_widget(help, area);
    }
}
