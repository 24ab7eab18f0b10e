use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::Layout;

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered(frame.area(), 50, 33);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::section("Navigation"),
            Self::key_line("j/↓", "Select next"),
            Self::key_line("k/↑", "Select previous"),
            Self::key_line("Ctrl+d", "Page down"),
            Self::key_line("Ctrl+u", "Page up"),
            Self::key_line("g", "First entry"),
            Self::key_line("G", "Last entry"),
            Self::key_line("f", "Toggle follow mode"),
            Line::from(""),
            Self::section("Console"),
            Self::key_line("c", "Collapse repeated logs"),
            Self::key_line("1/2/3", "Toggle info/warning/error"),
            Self::key_line("/", "Filter messages (regex)"),
            Self::key_line("n", "Clear filter"),
            Self::key_line("i", "Toggle case sensitivity"),
            Self::key_line("x", "Clear all logs"),
            Line::from(""),
            Self::section("Entries"),
            Self::key_line("Enter", "Open detail"),
            Self::key_line("y", "Copy entry"),
            Self::key_line("e", "Export shown entries"),
            Self::key_line("E", "Export all entries"),
            Self::key_line("t", "Toggle timestamps"),
            Self::key_line("T", "Local/UTC time"),
            Line::from(""),
            Self::key_line("Space", "Command palette"),
            Self::key_line("?/Esc", "Close this help"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Style::default().fg(Color::Yellow)))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>8}", key), Style::default().fg(Color::Green)),
            Span::styled(format!("  {}", desc), Style::default().fg(Color::White)),
        ])
    }
}
