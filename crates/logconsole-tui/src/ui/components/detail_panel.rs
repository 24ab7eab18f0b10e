use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use logconsole_core::Console;
use logconsole_types::Entry;

use crate::app::AppState;
use crate::ui::{Layout, Theme};

/// Popup with the full text of the selected entry
pub struct DetailPanel;

impl DetailPanel {
    pub fn render(frame: &mut Frame, state: &AppState, console: &Console) {
        let Some(entry) = console.shown_entry(state.ui_state.selected) else {
            return;
        };

        let popup_area = Layout::centered_percent(frame.area(), 80);
        frame.render_widget(Clear, popup_area);

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(popup_area);

        let body = Paragraph::new(Self::body_lines(entry, console))
            .wrap(Wrap { trim: false })
            .scroll((state.ui_state.detail_scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .title(Self::title(entry, state.ui_state.use_local_time)),
            );
        frame.render_widget(body, chunks[0]);

        let hints = Line::from(vec![
            Span::styled(" [y]", Theme::status_bar_key()),
            Span::styled("Copy ", Theme::status_bar()),
            Span::styled("[j/k]", Theme::status_bar_key()),
            Span::styled("Scroll ", Theme::status_bar()),
            Span::styled("[Esc]", Theme::status_bar_key()),
            Span::styled("Close", Theme::status_bar()),
        ]);
        frame.render_widget(Paragraph::new(hints).style(Theme::status_bar()), chunks[1]);
    }

    fn title(entry: &Entry, use_local_time: bool) -> Line<'static> {
        let time = if use_local_time {
            entry
                .timestamp()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string()
        } else {
            entry.timestamp().format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()
        };

        Line::from(vec![
            Span::styled(
                format!(" {} ", entry.severity().label()),
                Theme::severity_tag(entry.severity()),
            ),
            Span::styled(format!("#{} ", entry.id()), Theme::text_dim()),
            Span::styled(format!("{} ", time), Theme::text_dim()),
        ])
    }

    fn body_lines(entry: &Entry, console: &Console) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = entry
            .message()
            .lines()
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Theme::severity_text(entry.severity()),
                ))
            })
            .collect();

        if console.is_collapsed() && entry.repeat_count() > 1 {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" repeated x{} ", entry.repeat_count()),
                Theme::repeat_badge(),
            )));
        }

        if !entry.context().trim().is_empty() {
            lines.push(Line::from(""));
            lines.extend(
                entry
                    .context()
                    .trim()
                    .lines()
                    .map(|line| Line::from(Span::styled(line.to_string(), Theme::text_dim()))),
            );
        }

        lines
    }
}
