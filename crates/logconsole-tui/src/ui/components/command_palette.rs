use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use logconsole_types::Severity;

use crate::app::Action;
use crate::ui::Layout;

/// A command that can be executed from the palette
#[derive(Clone)]
pub struct Command {
    pub name: &'static str,
    pub description: &'static str,
    pub key_hint: &'static str,
    pub action: Action,
}

/// Command palette state
pub struct CommandPaletteState {
    pub visible: bool,
    pub search_input: String,
    pub list_state: ListState,
    pub filtered_indices: Vec<usize>,
}

impl Default for CommandPaletteState {
    fn default() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            visible: false,
            search_input: String::new(),
            list_state,
            filtered_indices: Vec::new(),
        }
    }
}

impl CommandPaletteState {
    pub fn open(&mut self, commands: &[Command]) {
        self.visible = true;
        self.search_input.clear();
        self.list_state.select(Some(0));
        self.update_filtered(commands);
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.search_input.clear();
    }

    pub fn update_filtered(&mut self, commands: &[Command]) {
        let query = self.search_input.to_lowercase();
        self.filtered_indices = commands
            .iter()
            .enumerate()
            .filter(|(_, cmd)| {
                query.is_empty()
                    || cmd.name.to_lowercase().contains(&query)
                    || cmd.description.to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect();

        // Reset selection if out of bounds
        if self.filtered_indices.is_empty() {
            self.list_state.select(None);
        } else {
            let current = self.list_state.selected().unwrap_or(0);
            if current >= self.filtered_indices.len() {
                self.list_state.select(Some(0));
            }
        }
    }

    pub fn move_up(&mut self) {
        let len = self.filtered_indices.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn move_down(&mut self) {
        let len = self.filtered_indices.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_command<'a>(&self, commands: &'a [Command]) -> Option<&'a Command> {
        let selected_idx = self.list_state.selected()?;
        let cmd_idx = self.filtered_indices.get(selected_idx)?;
        commands.get(*cmd_idx)
    }

    pub fn input_char(&mut self, c: char, commands: &[Command]) {
        self.search_input.push(c);
        self.update_filtered(commands);
    }

    pub fn input_backspace(&mut self, commands: &[Command]) {
        self.search_input.pop();
        self.update_filtered(commands);
    }
}

/// Command palette widget
pub struct CommandPalette;

impl CommandPalette {
    pub fn render(frame: &mut Frame, state: &mut CommandPaletteState, commands: &[Command]) {
        let popup_area = Layout::centered(frame.area(), 64, 18);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search input
                Constraint::Min(1),    // Command list
            ])
            .split(popup_area);

        let search_text = if state.search_input.is_empty() {
            vec![Span::styled(
                "Type to filter...",
                Style::default().fg(Color::DarkGray),
            )]
        } else {
            vec![
                Span::styled(&state.search_input, Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Yellow)),
            ]
        };

        let search_widget = Paragraph::new(Line::from(search_text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(Span::styled(
                    " Command Palette ",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
        );
        frame.render_widget(search_widget, chunks[0]);

        let items: Vec<ListItem> = state
            .filtered_indices
            .iter()
            .filter_map(|&idx| commands.get(idx))
            .map(|cmd| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<20}", cmd.name),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(cmd.description, Style::default().fg(Color::Gray)),
                    Span::styled(
                        format!("  {}", cmd.key_hint),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Yellow)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, chunks[1], &mut state.list_state);
    }
}

/// Commands available from the console screen
pub fn console_commands() -> Vec<Command> {
    vec![
        Command {
            name: "Toggle Collapse",
            description: "Merge repeated logs",
            key_hint: "c",
            action: Action::ToggleCollapse,
        },
        Command {
            name: "Toggle Info",
            description: "Show/hide info logs",
            key_hint: "1",
            action: Action::ToggleSeverity(Severity::Info),
        },
        Command {
            name: "Toggle Warnings",
            description: "Show/hide warnings",
            key_hint: "2",
            action: Action::ToggleSeverity(Severity::Warning),
        },
        Command {
            name: "Toggle Errors",
            description: "Show/hide errors",
            key_hint: "3",
            action: Action::ToggleSeverity(Severity::Error),
        },
        Command {
            name: "Search/Filter",
            description: "Filter messages with regex",
            key_hint: "/",
            action: Action::OpenSearch,
        },
        Command {
            name: "Clear Filter",
            description: "Remove active filter",
            key_hint: "n",
            action: Action::ClearFilter,
        },
        Command {
            name: "Toggle Case Sensitive",
            description: "Case sensitive search",
            key_hint: "i",
            action: Action::ToggleCaseSensitive,
        },
        Command {
            name: "Clear Logs",
            description: "Clear all log entries",
            key_hint: "x",
            action: Action::ClearLogs,
        },
        Command {
            name: "Open Detail",
            description: "Show the selected entry",
            key_hint: "Enter",
            action: Action::OpenDetail,
        },
        Command {
            name: "Copy Entry",
            description: "Copy the selected entry",
            key_hint: "y",
            action: Action::CopyEntry,
        },
        Command {
            name: "Export Logs",
            description: "Save shown entries to file",
            key_hint: "e",
            action: Action::ExportLogs,
        },
        Command {
            name: "Export All Logs",
            description: "Save every stored entry to file",
            key_hint: "E",
            action: Action::ExportAllLogs,
        },
        Command {
            name: "Toggle Follow",
            description: "Follow new entries",
            key_hint: "f",
            action: Action::ToggleAutoScroll,
        },
        Command {
            name: "Toggle Timestamps",
            description: "Show/hide timestamps",
            key_hint: "t",
            action: Action::ToggleTimestamps,
        },
        Command {
            name: "Toggle Local Time",
            description: "Switch local/UTC time",
            key_hint: "T",
            action: Action::ToggleLocalTime,
        },
        Command {
            name: "Show Help",
            description: "Display keybindings",
            key_hint: "?",
            action: Action::ToggleHelp,
        },
        Command {
            name: "Quit",
            description: "Exit logconsole",
            key_hint: "q",
            action: Action::Quit,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::config::{KeyBindings, KeyContext};

    fn hint_key(hint: &str) -> KeyEvent {
        match hint {
            "Enter" => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            _ => {
                let c = hint.chars().next().unwrap();
                let modifiers = if c.is_ascii_uppercase() {
                    KeyModifiers::SHIFT
                } else {
                    KeyModifiers::NONE
                };
                KeyEvent::new(KeyCode::Char(c), modifiers)
            }
        }
    }

    #[test]
    fn test_key_hints_match_bindings() {
        let bindings = KeyBindings::new();
        for cmd in console_commands() {
            assert_eq!(
                bindings.get_action(KeyContext::Console, &hint_key(cmd.key_hint)),
                Some(cmd.action.clone()),
                "{}",
                cmd.name
            );
        }
    }

    #[test]
    fn test_filter_commands() {
        let commands = console_commands();
        let mut state = CommandPaletteState::default();
        state.open(&commands);
        assert_eq!(state.filtered_indices.len(), commands.len());

        for c in "warn".chars() {
            state.input_char(c, &commands);
        }
        let selected = state.selected_command(&commands).map(|c| c.action.clone());
        assert_eq!(selected, Some(Action::ToggleSeverity(Severity::Warning)));
    }

    #[test]
    fn test_navigation_wraps() {
        let commands = console_commands();
        let mut state = CommandPaletteState::default();
        state.open(&commands);

        state.move_up();
        assert_eq!(state.list_state.selected(), Some(commands.len() - 1));
        state.move_down();
        assert_eq!(state.list_state.selected(), Some(0));
    }

    #[test]
    fn test_no_match_clears_selection() {
        let commands = console_commands();
        let mut state = CommandPaletteState::default();
        state.open(&commands);
        for c in "zzzz".chars() {
            state.input_char(c, &commands);
        }
        assert!(state.selected_command(&commands).is_none());
    }
}
