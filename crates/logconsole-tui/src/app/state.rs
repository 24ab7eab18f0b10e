use tokio::sync::mpsc;

use logconsole_core::Console;

use super::Action;
use crate::config::{DisplaySettings, KeyContext};

/// Lines moved by page up/down
const PAGE_SIZE: usize = 20;

/// UI-specific transient state
pub struct UiState {
    /// Is search/filter bar active?
    pub search_active: bool,

    /// Current search input text
    pub search_input: String,

    /// Filter input error message (e.g., invalid regex)
    pub filter_error: Option<String>,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Is the detail window open for the selected entry?
    pub detail_visible: bool,

    /// Scroll offset inside the detail window
    pub detail_scroll: u16,

    /// Selected position in the shown sequence
    pub selected: usize,

    /// First visible row of the entry list
    pub scroll: usize,

    /// Follow new entries?
    pub auto_scroll: bool,

    /// Show timestamps in the entry list?
    pub show_timestamps: bool,

    /// Show timestamps in local time (vs UTC)
    pub use_local_time: bool,

    /// One-line message for the status bar (copy, export, errors)
    pub status_message: Option<String>,

    /// Text of the last copy action, held for the clipboard collaborator
    pub last_copied: Option<String>,
}

impl UiState {
    pub fn new(display: &DisplaySettings) -> Self {
        Self {
            search_active: false,
            search_input: String::new(),
            filter_error: None,
            help_visible: false,
            detail_visible: false,
            detail_scroll: 0,
            selected: 0,
            scroll: 0,
            auto_scroll: display.auto_scroll,
            show_timestamps: display.show_timestamps,
            use_local_time: display.use_local_time,
            status_message: None,
            last_copied: None,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(&DisplaySettings::default())
    }
}

/// Global application state
pub struct AppState {
    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Channel sender for follow-up actions
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl AppState {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, display: &DisplaySettings) -> Self {
        Self {
            ui_state: UiState::new(display),
            should_quit: false,
            action_tx,
        }
    }

    /// Key context for the topmost input surface, below the command palette
    pub fn key_context(&self) -> KeyContext {
        let ui = &self.ui_state;
        if ui.search_active {
            KeyContext::FilterInput
        } else if ui.help_visible {
            KeyContext::Help
        } else if ui.detail_visible {
            KeyContext::Detail
        } else {
            KeyContext::Console
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Move selection up, leaving follow mode
    pub fn select_up(&mut self, n: usize) {
        self.ui_state.auto_scroll = false;
        self.ui_state.selected = self.ui_state.selected.saturating_sub(n);
    }

    /// Move selection down; reaching the end re-enables follow mode
    pub fn select_down(&mut self, n: usize, len: usize) {
        if len == 0 {
            return;
        }
        let last = len - 1;
        self.ui_state.selected = self.ui_state.selected.saturating_add(n).min(last);
        self.ui_state.auto_scroll = self.ui_state.selected == last;
    }

    pub fn page_up(&mut self) {
        self.select_up(PAGE_SIZE);
    }

    pub fn page_down(&mut self, len: usize) {
        self.select_down(PAGE_SIZE, len);
    }

    pub fn select_first(&mut self) {
        self.ui_state.auto_scroll = false;
        self.ui_state.selected = 0;
        self.ui_state.scroll = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.ui_state.auto_scroll = true;
        self.ui_state.selected = len.saturating_sub(1);
    }

    /// Keep the selection inside the shown sequence (and on the tail in follow mode)
    pub fn sync_selection(&mut self, len: usize) {
        if self.ui_state.auto_scroll || self.ui_state.selected >= len {
            self.ui_state.selected = len.saturating_sub(1);
        }
    }

    /// Adjust the list scroll so the selection is within `height` rows
    pub fn scroll_into_view(&mut self, height: usize) {
        let ui = &mut self.ui_state;
        if height == 0 {
            return;
        }
        if ui.selected < ui.scroll {
            ui.scroll = ui.selected;
        } else if ui.selected >= ui.scroll + height {
            ui.scroll = ui.selected + 1 - height;
        }
    }

    // ------------------------------------------------------------------
    // Detail window
    // ------------------------------------------------------------------

    pub fn open_detail(&mut self, console: &Console) {
        if console.shown_entry(self.ui_state.selected).is_some() {
            // Follow mode would move the selection out from under the window
            self.ui_state.auto_scroll = false;
            self.ui_state.detail_visible = true;
            self.ui_state.detail_scroll = 0;
        }
    }

    pub fn close_detail(&mut self) {
        self.ui_state.detail_visible = false;
        self.ui_state.detail_scroll = 0;
    }

    /// Copy text of the selected entry, if any
    pub fn copy_selected(&mut self, console: &Console) -> Option<String> {
        let entry = console.shown_entry(self.ui_state.selected)?;
        let text = console.copy_text(entry);
        self.ui_state.status_message = Some(format!("Copied entry #{}", entry.id()));
        self.ui_state.last_copied = Some(text.clone());
        Some(text)
    }

    // ------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------

    pub fn show_message(&mut self, msg: String) {
        self.ui_state.status_message = Some(msg);
    }

    pub fn dismiss_message(&mut self) {
        self.ui_state.status_message = None;
    }

    // ------------------------------------------------------------------
    // Filter input
    // ------------------------------------------------------------------

    /// Start search/filter input mode, seeded with the active pattern
    pub fn start_search(&mut self, console: &Console) {
        self.ui_state.search_active = true;
        self.ui_state.search_input = console.filter().text.pattern().to_string();
        self.ui_state.filter_error = None;
    }

    /// Leave input mode without touching the active filter
    pub fn cancel_search(&mut self) {
        self.ui_state.search_active = false;
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
    }

    /// Apply the current search input as the console's text pattern
    ///
    /// An invalid pattern keeps the input open and the previous view in place.
    pub fn apply_filter(&mut self, console: &mut Console) {
        match console.set_text_pattern(&self.ui_state.search_input) {
            Ok(()) => {
                self.ui_state.search_active = false;
                self.ui_state.filter_error = None;
                // Land on the first match rather than the tail
                self.ui_state.auto_scroll = false;
                self.ui_state.selected = 0;
                self.ui_state.scroll = 0;
            }
            Err(e) => {
                self.ui_state.filter_error = Some(e.to_string());
                self.ui_state.search_active = true; // Keep input open to fix
            }
        }
    }

    /// Remove the text pattern
    pub fn clear_filter(&mut self, console: &mut Console) {
        self.ui_state.search_input.clear();
        self.ui_state.filter_error = None;
        // The empty pattern always compiles
        if let Err(e) = console.set_text_pattern("") {
            self.ui_state.filter_error = Some(e.to_string());
        }
    }

    pub fn toggle_case_sensitive(&mut self, console: &mut Console) {
        let case_insensitive = !console.filter().text.is_case_insensitive();
        if let Err(e) = console.set_case_insensitive(case_insensitive) {
            self.ui_state.filter_error = Some(e.to_string());
        }
    }

    /// Add a character to search input
    pub fn search_input_char(&mut self, c: char) {
        self.ui_state.search_input.push(c);
    }

    /// Remove last character from search input
    pub fn search_input_backspace(&mut self) {
        self.ui_state.search_input.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logconsole_types::Severity;

    fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        AppState::new(tx, &DisplaySettings::default())
    }

    fn console_with(messages: &[&str]) -> Console {
        let mut console = Console::default();
        for m in messages {
            console.ingest(*m, "", Severity::Info);
        }
        console
    }

    #[test]
    fn test_selection_follow_mode() {
        let mut state = state();
        state.sync_selection(10);
        assert_eq!(state.ui_state.selected, 9);

        state.select_up(3);
        assert!(!state.ui_state.auto_scroll);
        state.sync_selection(12);
        assert_eq!(state.ui_state.selected, 6);

        state.select_down(100, 12);
        assert_eq!(state.ui_state.selected, 11);
        assert!(state.ui_state.auto_scroll);
    }

    #[test]
    fn test_scroll_into_view() {
        let mut state = state();
        state.ui_state.selected = 30;
        state.scroll_into_view(10);
        assert_eq!(state.ui_state.scroll, 21);

        state.ui_state.selected = 5;
        state.scroll_into_view(10);
        assert_eq!(state.ui_state.scroll, 5);
    }

    #[test]
    fn test_invalid_filter_keeps_input_open() {
        let mut state = state();
        let mut console = console_with(&["alpha", "beta"]);

        state.start_search(&console);
        state.search_input_char('(');
        state.apply_filter(&mut console);

        assert!(state.ui_state.search_active);
        assert!(state.ui_state.filter_error.is_some());
        assert_eq!(console.shown_len(), 2);
    }

    #[test]
    fn test_apply_and_clear_filter() {
        let mut state = state();
        let mut console = console_with(&["alpha", "beta"]);

        state.start_search(&console);
        for c in "bet".chars() {
            state.search_input_char(c);
        }
        state.apply_filter(&mut console);
        assert!(!state.ui_state.search_active);
        assert_eq!(console.shown_len(), 1);

        state.start_search(&console);
        assert_eq!(state.ui_state.search_input, "bet");

        state.clear_filter(&mut console);
        assert_eq!(console.shown_len(), 2);
    }

    #[test]
    fn test_apply_filter_starts_at_first_match() {
        let mut state = state();
        let mut console = console_with(&["job 1", "idle", "job 2", "job 3"]);
        state.sync_selection(console.shown_len());
        assert_eq!(state.ui_state.selected, 3);

        state.start_search(&console);
        for c in "job".chars() {
            state.search_input_char(c);
        }
        state.apply_filter(&mut console);
        state.sync_selection(console.shown_len());

        assert_eq!(console.shown_len(), 3);
        assert_eq!(state.ui_state.selected, 0);
        assert!(!state.ui_state.auto_scroll);
    }

    #[test]
    fn test_key_context_follows_topmost_surface() {
        let mut state = state();
        assert_eq!(state.key_context(), KeyContext::Console);

        state.ui_state.detail_visible = true;
        assert_eq!(state.key_context(), KeyContext::Detail);

        state.ui_state.help_visible = true;
        assert_eq!(state.key_context(), KeyContext::Help);

        state.ui_state.search_active = true;
        assert_eq!(state.key_context(), KeyContext::FilterInput);
    }

    #[test]
    fn test_copy_selected() {
        let mut state = state();
        let console = console_with(&["first", "second"]);
        state.ui_state.selected = 1;

        assert_eq!(state.copy_selected(&console).as_deref(), Some("second"));
        assert_eq!(state.ui_state.last_copied.as_deref(), Some("second"));
        assert_eq!(state.ui_state.status_message.as_deref(), Some("Copied entry #1"));
    }
}
