//! Bottom input line for commands, search and edits.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{InputMode, Store};

/// Command/search/edit line.
pub struct InputLine;

impl InputLine {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let prompt = match store.app.input_mode {
            InputMode::Normal => {
                let hint = match &store.items.search_query {
                    Some(query) => format!(" filter: {query}  (Esc clears)"),
                    None => String::new(),
                };
                frame.render_widget(
                    Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
                    area,
                );
                return;
            }
            InputMode::Command => ":".to_string(),
            InputMode::Search => "/".to_string(),
            InputMode::Insert => match &store.app.edit_target {
                Some(target) => format!("{}: ", target.label()),
                None => "> ".to_string(),
            },
        };

        let prompt_width = prompt.chars().count() as u16;
        let line = Line::from(vec![
            Span::styled(prompt, Style::default().fg(Color::Yellow)),
            Span::raw(store.app.input_buffer.as_str()),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        let x = area
            .x
            .saturating_add(prompt_width)
            .saturating_add(store.app.cursor_position as u16)
            .min(area.x + area.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, area.y));
    }
}
