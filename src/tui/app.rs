//! Terminal autosuggest widget
//!
//! Maps crossterm key and mouse events onto a [`SuggestSession`] and draws
//! its snapshots. The input buffer is local for responsive editing and is
//! re-synced from the controller once it has caught up with every edit
//! (formatter rewrites, selections).

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    widgets::ListState,
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::input::{InputBuffer, InputOperation};
use super::renderer::{FrameLayout, SuggestRenderer};
use crate::actors::messages::SuggestMessage;
use crate::config::SuggestConfig;
use crate::controller::ScrollMetrics;
use crate::fetch::FetchClient;
use crate::navigator::Key;
use crate::session::SuggestSession;
use crate::types::SearchResultItem;

pub struct TuiApp {
    session: SuggestSession,
    input: InputBuffer,
    /// Number of input changes handed to the session
    inputs_sent: u64,
    list_state: ListState,
    layout: FrameLayout,
    last_reported: Option<ScrollMetrics>,
    selected: Vec<SearchResultItem>,
    pub should_quit: bool,
}

impl TuiApp {
    pub fn new(session: SuggestSession) -> Self {
        Self {
            session,
            input: InputBuffer::new(),
            inputs_sent: 0,
            list_state: ListState::default(),
            layout: FrameLayout::default(),
            last_reported: None,
            selected: Vec::new(),
            should_quit: false,
        }
    }

    pub fn input_text(&self) -> &str {
        self.input.text()
    }

    pub fn selected(&self) -> &[SearchResultItem] {
        &self.selected
    }

    /// Pull notifications and state from the session before drawing
    pub fn tick(&mut self) {
        while let Some(message) = self.session.try_next_event() {
            if let SuggestMessage::ItemSelected(item) = message.payload {
                self.selected.push(item);
            }
        }

        let snapshot = self.session.snapshot();
        if snapshot.inputs_applied == self.inputs_sent && snapshot.raw_term != self.input.text() {
            self.input.set_text(&snapshot.raw_term);
        }
        if snapshot.suggestions.is_none() {
            self.list_state = ListState::default();
            self.last_reported = None;
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let snapshot = self.session.snapshot();
        self.layout = SuggestRenderer::render(
            f,
            &self.input,
            &snapshot,
            &mut self.list_state,
            self.selected.len(),
        );
    }

    /// Tell the controller where the list is scrolled to after a draw
    pub fn report_scroll(&mut self) -> Result<()> {
        let Some(list) = self.layout.list else {
            return Ok(());
        };
        let count = self.session.snapshot().suggestions.map_or(0, |s| s.len());
        let metrics = ScrollMetrics::new(
            self.list_state.offset() as u32,
            u32::from(list.height),
            count as u32,
        );

        if self.last_reported != Some(metrics) {
            self.last_reported = Some(metrics);
            self.session.scrolled(metrics)?;
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('p') if ctrl => {
                self.session.key_down(Key::Up)?;
            }
            KeyCode::Char('n') if ctrl => {
                self.session.key_down(Key::Down)?;
            }
            KeyCode::Char('a') if ctrl => self.edit(InputOperation::MoveCursorToStart)?,
            KeyCode::Char('e') if ctrl => self.edit(InputOperation::MoveCursorToEnd)?,
            KeyCode::Char('b') if ctrl => self.edit(InputOperation::MoveCursorLeft)?,
            KeyCode::Char('f') if ctrl => self.edit(InputOperation::MoveCursorRight)?,
            KeyCode::Char('d') if ctrl => self.edit(InputOperation::DeleteCharForward)?,
            KeyCode::Char('h') if ctrl => self.edit(InputOperation::DeleteCharBackward)?,
            KeyCode::Char('k') if ctrl => self.edit(InputOperation::KillLine)?,
            KeyCode::Char('y') if ctrl => self.edit(InputOperation::Yank)?,
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.edit(InputOperation::InsertChar(c))?;
            }
            KeyCode::Up => {
                self.session.key_down(Key::Up)?;
            }
            KeyCode::Down => {
                self.session.key_down(Key::Down)?;
            }
            KeyCode::Enter => {
                self.session.key_down(Key::Enter)?;
            }
            KeyCode::Esc => {
                if self.session.snapshot().is_open() {
                    self.session.key_down(Key::Escape)?;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Home => self.edit(InputOperation::MoveCursorToStart)?,
            KeyCode::End => self.edit(InputOperation::MoveCursorToEnd)?,
            KeyCode::Left => self.edit(InputOperation::MoveCursorLeft)?,
            KeyCode::Right => self.edit(InputOperation::MoveCursorRight)?,
            KeyCode::Delete => self.edit(InputOperation::DeleteCharForward)?,
            KeyCode::Backspace => self.edit(InputOperation::DeleteCharBackward)?,
            _ => {}
        }
        Ok(())
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<()> {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.row_at(column, row) {
                    self.session.select(index)?;
                } else if !contains(self.layout.input, column, row) {
                    self.session.dismiss()?;
                }
            }
            MouseEventKind::ScrollDown => self.scroll_list(column, row, 1),
            MouseEventKind::ScrollUp => self.scroll_list(column, row, -1),
            _ => {}
        }
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        self.session.shutdown().await;
        // Selections made right before quitting
        while let Some(message) = self.session.next_event().await {
            if let SuggestMessage::ItemSelected(item) = message.payload {
                self.selected.push(item);
            }
        }
    }

    pub fn into_selected(self) -> Vec<SearchResultItem> {
        self.selected
    }

    fn edit(&mut self, operation: InputOperation) -> Result<()> {
        if self.input.apply(operation) {
            self.inputs_sent += 1;
            self.session.input(self.input.text())?;
        }
        Ok(())
    }

    /// Suggestion index under the given screen cell
    fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let list = self.layout.list?;
        if !contains(list, column, row) {
            return None;
        }
        let index = self.list_state.offset() + usize::from(row - list.y);
        let count = self.session.snapshot().suggestions.map_or(0, |s| s.len());
        (index < count).then_some(index)
    }

    fn scroll_list(&mut self, column: u16, row: u16, delta: isize) {
        let Some(list) = self.layout.list else {
            return;
        };
        if !contains(list, column, row) {
            return;
        }
        let count = self.session.snapshot().suggestions.map_or(0, |s| s.len());
        let max_offset = count.saturating_sub(usize::from(list.height));
        let offset = self
            .list_state
            .offset()
            .saturating_add_signed(delta)
            .min(max_offset);

        let selected = self.list_state.selected();
        self.list_state = ListState::default()
            .with_offset(offset)
            .with_selected(selected);
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Run the interactive widget until the user quits; returns every item
/// selected during the session
pub async fn run_tui(
    config: SuggestConfig,
    client: Arc<dyn FetchClient>,
) -> Result<Vec<SearchResultItem>> {
    let session = SuggestSession::spawn(config, client, |item: &SearchResultItem| {
        log::debug!("Selected suggestion {}", item.id);
    })?;
    let mut app = TuiApp::new(session);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.shutdown().await;
    result?;

    Ok(app.into_selected())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut TuiApp) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| app.render(f))?;
        app.report_scroll()?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                _ => {}
            }
        }

        // Let the session's tasks run between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::types::ResponsePage;
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;

    struct CharacterClient;

    #[async_trait]
    impl FetchClient for CharacterClient {
        async fn fetch(&self, url: &str) -> Result<ResponsePage, FetchError> {
            if url.contains("page=1") {
                Ok(ResponsePage::new(vec![
                    SearchResultItem::new(1, "Rick Sanchez"),
                    SearchResultItem::new(8, "Adjudicator Rick"),
                ]))
            } else {
                Ok(ResponsePage::default())
            }
        }
    }

    fn app() -> TuiApp {
        let config = SuggestConfig::new("https://example.test/api/", "name", "page");
        let session =
            SuggestSession::spawn(config, Arc::new(CharacterClient), |_: &SearchResultItem| {})
                .unwrap();
        TuiApp::new(session)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            app.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn draw(app: &mut TuiApp, terminal: &mut Terminal<TestBackend>) -> String {
        app.tick();
        terminal.draw(|f| app.render(f)).unwrap();
        app.report_scroll().unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|cell| cell.symbol.as_str()).collect()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_shows_sorted_suggestions() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        type_text(&mut app, "rick");
        settle().await;
        let screen = draw(&mut app, &mut terminal);

        let adjudicator = screen.find("Adjudicator Rick").unwrap();
        let sanchez = screen.find("Rick Sanchez").unwrap();
        assert!(adjudicator < sanchez);
        assert_eq!(app.input_text(), "rick");

        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyboard_selection_updates_input() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        type_text(&mut app, "rick");
        settle().await;
        draw(&mut app, &mut terminal);

        app.handle_key_event(key(KeyCode::Down)).unwrap();
        app.handle_key_event(key(KeyCode::Enter)).unwrap();
        settle().await;
        draw(&mut app, &mut terminal);

        assert_eq!(app.input_text(), "Adjudicator Rick");
        assert_eq!(app.selected().len(), 1);
        assert_eq!(app.selected()[0].id, 8);

        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_selects_row_and_click_outside_dismisses() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();

        type_text(&mut app, "rick");
        settle().await;
        draw(&mut app, &mut terminal);
        let list = app.layout.list.unwrap();

        // Help bar is outside both the input and the list
        app.handle_mouse_event(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 1,
            row: 11,
            modifiers: KeyModifiers::NONE,
        })
        .unwrap();
        settle().await;
        draw(&mut app, &mut terminal);
        assert!(app.layout.list.is_none());
        assert_eq!(app.input_text(), "rick");

        app.handle_key_event(key(KeyCode::Char('y'))).unwrap();
        app.handle_key_event(key(KeyCode::Backspace)).unwrap();
        settle().await;
        draw(&mut app, &mut terminal);

        app.handle_mouse_event(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: list.x + 2,
            row: list.y + 1,
            modifiers: KeyModifiers::NONE,
        })
        .unwrap();
        settle().await;
        draw(&mut app, &mut terminal);

        assert_eq!(app.input_text(), "Rick Sanchez");
        assert_eq!(app.selected()[0].id, 1);

        app.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_quits_when_closed() {
        let mut app = app();
        app.handle_key_event(key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);
        app.shutdown().await;
    }
}
