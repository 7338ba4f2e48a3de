//! League and stash tab list.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::truncate;
use crate::catalog::tab_icon;
use crate::state::{StashTab, Store};

/// Tab selection view.
pub struct StashList;

impl StashList {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        render_leagues(frame, chunks[0], store);
        render_tabs(frame, chunks[1], store);
    }
}

fn render_leagues(frame: &mut Frame, area: Rect, store: &Store) {
    let stash = &store.stash;
    let mut spans = Vec::new();
    if stash.leagues.is_empty() {
        spans.push(Span::styled(
            "No leagues loaded. Press r to load.",
            Style::default().fg(Color::DarkGray),
        ));
    }
    for league in &stash.leagues {
        let style = if stash.league.as_deref() == Some(league.id.as_str()) {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(league.id.as_str(), style));
        spans.push(Span::raw("  "));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Leagues (:league <id>) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, area: Rect, store: &Store) {
    let stash = &store.stash;

    let header_cells = ["", "#", "Name", "Type", "Icon"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = stash.tabs.iter().map(|tab| {
        let chosen = stash.is_chosen(&tab.id);
        let marker = if chosen { "[x]" } else { "[ ]" };
        let style = if chosen {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let cells = vec![
            Cell::from(marker).style(Style::default().fg(Color::Green)),
            Cell::from(tab.index.to_string()),
            Cell::from(truncate(&tab.name, 40)).style(Style::default().fg(tab_colour(tab))),
            Cell::from(tab.kind.as_str()),
            Cell::from(if tab_icon(&tab.kind).is_some() { "●" } else { "" }),
        ];
        Row::new(cells).style(style).height(1)
    });

    let title = if stash.loading {
        " Stash tabs (loading...) ".to_string()
    } else {
        format!(" Stash tabs ({}) ", stash.tabs.len())
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Percentage(50),
            Constraint::Length(18),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(stash.selected_index);

    frame.render_stateful_widget(table, area, &mut state);
}

/// Tab colour from its `#rrggbb` string, white when unparsable.
fn tab_colour(tab: &StashTab) -> Color {
    let hex = tab.colour.trim_start_matches('#');
    match u32::from_str_radix(hex, 16) {
        Ok(rgb) if hex.len() == 6 => Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
        _ => Color::White,
    }
}
