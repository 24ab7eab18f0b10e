use chrono::Local;
use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::UnicodeWidthChar;

use logconsole_core::{CompiledFilter, Console};
use logconsole_types::{Entry, Severity};

use crate::app::AppState;
use crate::ui::components::{StatusBar, console_hints};
use crate::ui::{Layout, Theme};

/// Main console screen: header, filter bar, entry list and status bar
pub struct ConsoleScreen;

/// Byte length of the prefix of `s` kept when it overflows `max_width` columns
///
/// `None` when `s` fits. The kept prefix leaves three columns for "...".
fn truncation_point(s: &str, max_width: usize) -> Option<usize> {
    let mut width = 0;
    for (i, c) in s.char_indices() {
        width += c.width().unwrap_or(0);
        if width > max_width {
            let keep = max_width.saturating_sub(3);
            let mut used = 0;
            for (j, c) in s[..i].char_indices() {
                used += c.width().unwrap_or(0);
                if used > keep {
                    return Some(j);
                }
            }
            return Some(i);
        }
    }
    None
}

/// Message spans with filter matches highlighted, cut to `max_width` columns
///
/// Matches are found on the full text and clipped at the cut, so the
/// trailing "..." is never highlighted.
fn message_spans(
    text: &str,
    max_width: usize,
    filter: &CompiledFilter,
    base: Style,
) -> Vec<Span<'static>> {
    let cut = truncation_point(text, max_width);
    let kept = &text[..cut.unwrap_or(text.len())];

    let mut spans = Vec::new();
    let mut last_end = 0;
    for (start, end) in filter.find_matches(text) {
        if start >= kept.len() {
            break;
        }
        let end = end.min(kept.len());
        if start > last_end {
            spans.push(Span::styled(kept[last_end..start].to_string(), base));
        }
        if end > start {
            spans.push(Span::styled(
                kept[start..end].to_string(),
                Theme::match_highlight(),
            ));
        }
        last_end = end;
    }
    if last_end < kept.len() {
        spans.push(Span::styled(kept[last_end..].to_string(), base));
    }
    if cut.is_some() {
        spans.push(Span::styled("...", base));
    }
    spans
}

impl ConsoleScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState, console: &Console) {
        let show_filter_bar = state.ui_state.search_active
            || console.filter().text.has_pattern()
            || state.ui_state.filter_error.is_some();

        let (header, filter_bar, list, status) = Layout::console(frame.area(), show_filter_bar);

        Self::render_header(frame, header, console);
        if let Some(area) = filter_bar {
            Self::render_filter_bar(frame, area, state, console);
        }
        Self::render_entries(frame, list, state, console);
        Self::render_status_bar(frame, status, state, console);
    }

    fn render_header(frame: &mut Frame, area: Rect, console: &Console) {
        let mut spans = vec![
            Span::styled("logconsole", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
        ];

        for severity in Severity::ALL {
            spans.push(Span::styled(
                format!(" {} ", severity.as_str()),
                Theme::severity_toggle(severity, console.severity_enabled(severity)),
            ));
            spans.push(Span::raw(" "));
        }

        spans.push(Span::styled("│ ", Theme::text_dim()));
        spans.push(if console.is_collapsed() {
            Span::styled("collapsed", Theme::text_highlight())
        } else {
            Span::styled("expanded", Theme::text())
        });

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState, console: &Console) {
        let ui = &state.ui_state;
        let filter = &console.filter().text;
        let mut spans = vec![];

        if ui.search_active {
            spans.push(Span::styled(
                " /",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(" Filter: ", Theme::text_dim()));
        }

        let pattern = if ui.search_active {
            ui.search_input.as_str()
        } else {
            filter.pattern()
        };
        spans.push(Span::styled(pattern.to_string(), Theme::text_highlight()));

        if ui.search_active {
            spans.push(Span::styled(
                "█",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        if let Some(err) = &ui.filter_error {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("⚠ {}", err), Theme::error()));
        }

        spans.push(Span::raw("  "));
        let case_text = if filter.is_case_insensitive() {
            "[i] case-insensitive"
        } else {
            "[i] case-sensitive"
        };
        spans.push(Span::styled(case_text, Theme::text_dim()));

        if ui.search_active {
            spans.push(Span::styled("  [Enter] Apply  [Esc] Cancel", Theme::text_dim()));
        } else {
            spans.push(Span::styled("  [n] Clear  [/] Edit", Theme::text_dim()));
        }

        let border_style = if ui.search_active {
            Style::default().fg(Color::Yellow)
        } else if ui.filter_error.is_some() {
            Style::default().fg(Color::Red)
        } else {
            Theme::border()
        };

        let filter_bar = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(Span::styled(" Filter ", Theme::title())),
        );

        frame.render_widget(filter_bar, area);
    }

    fn render_entries(frame: &mut Frame, area: Rect, state: &mut AppState, console: &Console) {
        let total = console.shown_len();
        let inner_height = area.height.saturating_sub(2) as usize;
        // Borders plus scrollbar column
        let inner_width = area.width.saturating_sub(4) as usize;

        state.sync_selection(total);
        state.scroll_into_view(inner_height);

        let scroll = state.ui_state.scroll;
        let selected = state.ui_state.selected;
        let filter = &console.filter().text;

        let lines: Vec<Line> = console
            .shown()
            .enumerate()
            .skip(scroll)
            .take(inner_height)
            .map(|(position, entry)| {
                let line = Self::format_entry(entry, state, console, filter, inner_width);
                if position == selected {
                    line.style(Theme::entry_selected())
                } else {
                    line
                }
            })
            .collect();

        let title = if console.filter().text.has_pattern() {
            format!(" Logs ({} matching) ", total)
        } else {
            format!(" Logs ({}) ", total)
        };

        let entries = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(title, Theme::title())),
        );
        frame.render_widget(entries, area);

        if total > inner_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let max_scroll = total.saturating_sub(inner_height);
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(scroll.min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    /// One list row: id, time, severity tag, message summary and repeat badge
    fn format_entry(
        entry: &Entry,
        state: &AppState,
        console: &Console,
        filter: &CompiledFilter,
        available_width: usize,
    ) -> Line<'static> {
        let mut spans = Vec::new();
        let mut prefix_width: usize = 0;

        spans.push(Span::styled(format!("{:>5}", entry.id()), Theme::text_dim()));
        prefix_width += 5;

        if state.ui_state.show_timestamps {
            let time = if state.ui_state.use_local_time {
                entry.timestamp().with_timezone(&Local).format("%H:%M:%S").to_string()
            } else {
                entry.timestamp().format("%H:%M:%S").to_string()
            };
            spans.push(Span::styled(format!(" {}", time), Theme::text_dim()));
            prefix_width += 9;
        }

        spans.push(Span::styled(
            format!(" {}", entry.severity().as_str()),
            Theme::severity_tag(entry.severity()),
        ));
        spans.push(Span::styled(" │ ", Theme::text_dim()));
        prefix_width += 7;

        let badge = (console.is_collapsed() && entry.repeat_count() > 1)
            .then(|| format!(" x{} ", entry.repeat_count()));
        let badge_width = badge.as_ref().map_or(0, |b| b.len() + 1);

        let message_width = available_width.saturating_sub(prefix_width + badge_width);
        spans.extend(message_spans(
            entry.summary(),
            message_width,
            filter,
            Theme::severity_text(entry.severity()),
        ));

        if let Some(badge) = badge {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(badge, Theme::repeat_badge()));
        }

        Line::from(spans)
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, console: &Console) {
        let counts = console.counts();
        let right_text = format!(
            "I:{} W:{} E:{} | {}/{} {}",
            counts.info(),
            counts.warning(),
            counts.error(),
            console.shown_len(),
            console.entries().len(),
            if state.ui_state.auto_scroll { "▼" } else { " " }
        );

        let status = StatusBar::new()
            .hints(console_hints())
            .message(state.ui_state.status_message.as_deref())
            .right(right_text);

        frame.render_widget(status, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc;

    use crate::config::DisplaySettings;

    fn screen_text(console: &Console, state: &mut AppState) -> String {
        let backend = TestBackend::new(120, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| ConsoleScreen::render(frame, state, console))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        AppState::new(
            tx,
            &DisplaySettings {
                show_timestamps: false,
                ..Default::default()
            },
        )
    }

    fn joined(spans: &[Span]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_truncation() {
        let none = CompiledFilter::none();
        let base = Style::default();

        assert_eq!(truncation_point("short", 10), None);
        assert_eq!(joined(&message_spans("short", 10, &none, base)), "short");
        assert_eq!(
            joined(&message_spans("abcdefghijkl", 8, &none, base)),
            "abcde..."
        );
        // Wide characters take two columns each
        assert_eq!(
            joined(&message_spans("日本語のログ", 7, &none, base)),
            "日本..."
        );
    }

    #[test]
    fn test_highlight_stops_at_cut() {
        let dots = CompiledFilter::new(r"\.", false).unwrap();
        let base = Theme::severity_text(Severity::Info);

        let spans = message_spans("a.b.c.d.e.f.g", 8, &dots, base);
        assert_eq!(joined(&spans), "a.b.c...");

        let highlighted: Vec<&str> = spans
            .iter()
            .filter(|s| s.style == Theme::match_highlight())
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(highlighted, vec![".", "."]);

        let last = spans.last().unwrap();
        assert_eq!(last.content.as_ref(), "...");
        assert_eq!(last.style, base);
    }

    #[test]
    fn test_highlight_clipped_across_cut() {
        let word = CompiledFilter::new("defgh", false).unwrap();
        let base = Style::default();

        let spans = message_spans("abcdefghijkl", 8, &word, base);
        assert_eq!(joined(&spans), "abcde...");
        assert_eq!(spans[1].content.as_ref(), "de");
        assert_eq!(spans[1].style, Theme::match_highlight());
    }

    #[test]
    fn test_renders_counts_and_badge() {
        let mut console = Console::default();
        console.set_collapsed(true);
        console.ingest("disk full", "", Severity::Error);
        console.ingest("disk full", "", Severity::Error);
        console.ingest("started", "", Severity::Info);

        let mut state = state();
        let text = screen_text(&console, &mut state);

        assert!(text.contains("disk full"));
        assert!(text.contains("x2"));
        assert!(text.contains("I:1 W:0 E:1 | 2/3"));
        assert_eq!(state.ui_state.selected, 1);
    }

    #[test]
    fn test_filter_bar_shows_pattern() {
        let mut console = Console::default();
        console.ingest("connection refused", "", Severity::Warning);
        console.set_text_pattern("refused").unwrap();

        let mut state = state();
        let text = screen_text(&console, &mut state);

        assert!(text.contains("Filter: refused"));
        assert!(text.contains("Logs (1 matching)"));
    }

    #[test]
    fn test_filter_error_uses_error_style() {
        let console = Console::default();
        let mut state = state();
        state.ui_state.search_active = true;
        state.ui_state.search_input = "(".to_string();
        state.ui_state.filter_error = Some("unclosed group".to_string());

        let backend = TestBackend::new(120, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| ConsoleScreen::render(frame, &mut state, &console))
            .unwrap();
        let buffer = terminal.backend().buffer();

        let cell = (0..buffer.area.height)
            .flat_map(|y| (0..buffer.area.width).map(move |x| (x, y)))
            .map(|pos| &buffer[pos])
            .find(|cell| cell.symbol() == "⚠")
            .unwrap();
        assert_eq!(cell.fg, Color::Red);
        assert!(cell.modifier.contains(Modifier::BOLD));
    }
}
