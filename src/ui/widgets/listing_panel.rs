//! Order and listing view.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use super::truncate;
use crate::pricing::format_total;
use crate::state::Store;

/// Listing view: order lines on the left, listing text on the right.
pub struct ListingPanel;

impl ListingPanel {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        render_order(frame, chunks[0], store);
        render_text(frame, chunks[1], store);
    }
}

fn render_order(frame: &mut Frame, area: Rect, store: &Store) {
    let listing = &store.listing;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let header_cells = ["Compass", "Qty", "Each", "Total"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = listing.order.lines().iter().map(|line| {
        Row::new(vec![
            Cell::from(truncate(&line.name, 30)),
            Cell::from(line.quantity.to_string()),
            Cell::from(format!("{}c", line.unit_price.normalize())),
            Cell::from(format!("{}c", line.total().normalize()))
                .style(Style::default().fg(Color::Green)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Order ({}) ", listing.order.lines().len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(listing.selected_index);
    frame.render_stateful_widget(table, chunks[0], &mut state);

    let total = listing.order.total();
    let total_text = match listing.divine_price {
        Some(rate) => format_total(total, rate),
        None => format!("{}c", total.normalize()),
    };
    let mut summary = vec![Line::from(vec![
        Span::raw("Total: "),
        Span::styled(total_text, Style::default().fg(Color::Green)),
    ])];
    summary.push(match (listing.payment_divines, listing.change_due()) {
        (Some(divines), Some(change)) if change.is_sign_negative() => Line::from(Span::styled(
            format!("{divines} div is short by {}c", (-change).normalize()),
            Style::default().fg(Color::Red),
        )),
        (Some(divines), Some(change)) => Line::from(format!(
            "Paid {divines} div, change due {}c",
            change.normalize()
        )),
        _ => Line::from(Span::styled(
            "Set payment with :pay <divines>",
            Style::default().fg(Color::DarkGray),
        )),
    });
    summary.push(Line::from(format!(
        "IGN: {}  Divine: {}",
        listing.display_name.as_deref().unwrap_or("-"),
        listing
            .divine_price
            .map(|p| format!("{}c", p.normalize()))
            .unwrap_or_else(|| "-".to_string())
    )));

    frame.render_widget(
        Paragraph::new(summary).block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );
}

fn render_text(frame: &mut Frame, area: Rect, store: &Store) {
    let block = Block::default()
        .title(" Listing (g to generate, :export to save) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = match &store.listing.text {
        Some(Ok(text)) => Paragraph::new(text.as_str()),
        Some(Err(e)) => Paragraph::new(Span::styled(e.to_string(), Style::default().fg(Color::Red))),
        None => Paragraph::new(Span::styled(
            "Nothing generated yet.",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )),
    };

    frame.render_widget(paragraph.wrap(Wrap { trim: false }).block(block), area);
}
