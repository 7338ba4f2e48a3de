//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::Store;

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let auth_status = if store.app.authenticated {
            Span::styled("● Signed in", Style::default().fg(Color::Green))
        } else {
            Span::styled("○ No token", Style::default().fg(Color::Red))
        };

        let league = Span::styled(
            format!(" {} ", store.stash.league.as_deref().unwrap_or("no league")),
            Style::default().fg(Color::Yellow),
        );

        let chosen = Span::raw(format!(" {} tab(s) chosen ", store.stash.chosen.len()));

        let activity = if store.items.fetch_in_flight {
            Span::styled(
                " Fetching... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else if store.stash.loading {
            Span::styled(
                " Loading... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::Gray));

        let left_content = vec![
            Span::styled(
                " 🧭 Compass Trader ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            auth_status,
            Span::raw(" | "),
            league,
            Span::raw("|"),
            chosen,
            activity,
        ];

        let status_line = Line::from(left_content);

        // Right-align the help hint
        let left_len = status_line.width();
        let right_len = help_hint.width();
        let padding = (area.width as usize).saturating_sub(left_len + right_len);

        let mut full_line = status_line.spans;
        full_line.push(Span::raw(" ".repeat(padding)));
        full_line.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(full_line)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}
