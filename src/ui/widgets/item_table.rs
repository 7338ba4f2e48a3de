//! Priced rows table.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use super::truncate;
use crate::pricing::{SortField, format_total};
use crate::state::{ItemsStatus, Store};

/// Items view.
pub struct ItemTable;

impl ItemTable {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let items = &store.items;
        let block = Block::default()
            .title(title(store))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let message = match items.status() {
            ItemsStatus::Loading => Some(("Fetching stash tabs...", Color::Yellow)),
            ItemsStatus::Error(error) => Some((error, Color::Red)),
            ItemsStatus::Idle => Some((
                "Choose tabs in the Tabs view, then press f to fetch.",
                Color::DarkGray,
            )),
            ItemsStatus::NoResults => Some(("No compasses found.", Color::DarkGray)),
            ItemsStatus::Ready => None,
        };
        if let Some((text, color)) = message {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                text,
                Style::default().fg(color).add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let header_cells = [
            Cell::from(""),
            header(store, SortField::Name),
            header(store, SortField::Quantity),
            header(store, SortField::Price),
            header(store, SortField::TotalValue),
            Cell::from("Div"),
        ]
        .into_iter()
        .map(|c| c.style(header_style));
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let divine_price = store.listing.divine_price;
        let rows = items.visible_rows().into_iter().map(|row| {
            let selected = store.listing.order.is_selected(row.name());
            let marker = if selected { "[x]" } else { "[ ]" };

            let price_cell = match row.custom_price() {
                Some(price) => Cell::from(format!("{}c*", price.normalize()))
                    .style(Style::default().fg(Color::Magenta)),
                None if row.unit_price().is_zero() => {
                    Cell::from("-").style(Style::default().fg(Color::DarkGray))
                }
                None => Cell::from(format!("{}c", row.unit_price().normalize())),
            };
            let quantity_cell = if row.has_quantity_override() {
                Cell::from(format!("{}*", row.quantity())).style(Style::default().fg(Color::Magenta))
            } else {
                Cell::from(row.quantity().to_string())
            };
            let divines = divine_price
                .and_then(|rate| row.divine_equivalent(rate))
                .map(|d| d.normalize().to_string())
                .unwrap_or_default();

            let cells = vec![
                Cell::from(marker).style(Style::default().fg(Color::Green)),
                Cell::from(truncate(row.name(), 40)),
                quantity_cell,
                price_cell,
                Cell::from(format!("{}c", row.total_value().normalize()))
                    .style(Style::default().fg(Color::Green)),
                Cell::from(divines),
            ];

            let style = if selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(cells).style(style).height(1)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Percentage(45),
                Constraint::Length(7),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(items.selected_index);

        frame.render_stateful_widget(table, area, &mut state);
    }
}

fn header(store: &Store, field: SortField) -> Cell<'static> {
    Cell::from(format!("{}{}", field.label(), store.items.sort.indicator(field)))
}

fn title(store: &Store) -> String {
    let items = &store.items;
    let total = items.rows.total_value();
    let total = match store.listing.divine_price {
        Some(rate) => format_total(total, rate),
        None => format!("{}c", total.normalize()),
    };
    let mut title = format!(
        " Compasses ({}) | {} | total {} ",
        items.rows.len(),
        items.league.as_deref().unwrap_or("-"),
        total
    );
    if let Some(as_of) = items.prices_as_of {
        title.push_str(&format!("| prices {} ", as_of.format("%Y-%m-%d %H:%M")));
    }
    if items.feed_error.is_some() {
        title.push_str("| prices unavailable ");
    }
    title
}
