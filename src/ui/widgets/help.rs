//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::events::Keymap;

/// Keys that are not configurable.
const FIXED_KEYS: [(&str, &str); 5] = [
    ("↑/↓", "Move"),
    ("PgUp/PgDn", "Move a page"),
    ("Home/End", "Go to top / bottom"),
    ("Esc", "Leave input, clear filter"),
    ("Enter", "Confirm input"),
];

/// Help panel listing the active keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keymap: &Keymap) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let key_style = Style::default().fg(Color::Cyan);
        let mut help_text = vec![section("Keys"), Line::from("")];
        help_text.extend(keymap.iter().map(|(action, binding)| {
            Line::from(vec![
                Span::styled(format!("  {:<10}", binding.to_string()), key_style),
                Span::raw(action.description()),
            ])
        }));
        help_text.push(Line::from(""));
        help_text.push(section("Navigation"));
        help_text.push(Line::from(""));
        help_text.extend(FIXED_KEYS.iter().map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), key_style),
                Span::raw(*what),
            ])
        }));

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
}
