//! Event handler for processing input events.

use super::command::{parse_command, parse_price, parse_quantity};
use super::input::{KeyAction, Keymap};
use crate::error::Result;
use crate::pricing::SortField;
use crate::state::{Action, EditTarget, InputMode, Notification, Store, View};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Action sender for follow-up actions.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Parsed key bindings.
    keymap: Keymap,
    /// How long to wait for input before yielding.
    poll_interval: Duration,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Clone)]
struct StoreSnapshot {
    input_mode: InputMode,
    current_view: View,
    edit_target: Option<EditTarget>,
    input_buffer: String,
    selected_row: Option<String>,
    selected_order_line: Option<String>,
}

impl EventHandler {
    /// Create a new event handler with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, keymap: Keymap, poll_interval: Duration) -> Self {
        Self {
            action_tx,
            keymap,
            poll_interval,
            store_snapshot: None,
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            edit_target: store.app.edit_target.clone(),
            input_buffer: store.app.input_buffer.clone(),
            selected_row: store.items.selected_row().map(|r| r.name().to_string()),
            selected_order_line: store.listing.selected_name().map(str::to_string),
        });
    }

    /// Get the next action from user input.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        if event::poll(self.poll_interval)? {
            match event::read()? {
                CrosstermEvent::Key(key) => return Ok(self.handle_key(key)),
                CrosstermEvent::Mouse(mouse) => return Ok(self.handle_mouse(mouse)),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let snapshot = self.store_snapshot.as_ref()?;

        match snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(key, snapshot),
            InputMode::Insert => self.handle_insert_mode(key, snapshot),
            InputMode::Command => self.handle_command_mode(key, snapshot),
            InputMode::Search => self.handle_search_mode(key, snapshot),
        }
    }

    /// Handle a mouse event and return an optional action.
    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    fn handle_normal_mode(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        match key.code {
            KeyCode::Up => return Some(Action::ScrollUp),
            KeyCode::Down => return Some(Action::ScrollDown),
            KeyCode::PageUp => return Some(Action::PageUp),
            KeyCode::PageDown => return Some(Action::PageDown),
            KeyCode::Home => return Some(Action::GoToTop),
            KeyCode::End => return Some(Action::GoToBottom),
            KeyCode::Esc if snapshot.current_view == View::Items => return Some(Action::ClearSearch),
            _ => {}
        }

        let action = self.keymap.lookup(&key)?;
        debug!(?action, "key binding");
        let row = snapshot.selected_row.clone();

        match action {
            KeyAction::Quit => Some(Action::Quit),
            KeyAction::Help => Some(Action::ToggleHelp),
            KeyAction::Up => Some(Action::ScrollUp),
            KeyAction::Down => Some(Action::ScrollDown),
            KeyAction::Refresh => Some(Action::LoadLeagues),
            KeyAction::Fetch => Some(Action::StartFetch),
            KeyAction::CancelFetch => Some(Action::CancelFetch),
            KeyAction::TabsView => Some(Action::SetView(View::Tabs)),
            KeyAction::ItemsView => Some(Action::SetView(View::Items)),
            KeyAction::ListingView => Some(Action::SetView(View::Listing)),
            KeyAction::Command => Some(Action::SetInputMode(InputMode::Command)),
            KeyAction::GenerateListing => Some(Action::GenerateListing),
            KeyAction::Search => {
                if snapshot.current_view != View::Items {
                    self.follow_up(Action::SetView(View::Items));
                }
                Some(Action::SetInputMode(InputMode::Search))
            }
            KeyAction::Select => match snapshot.current_view {
                View::Tabs => Some(Action::ToggleTab),
                View::Items => Some(Action::ToggleRow),
                View::Listing => None,
            },
            KeyAction::EditValue if snapshot.current_view == View::Items => {
                row.map(|name| Action::BeginEdit(EditTarget::Value(name)))
            }
            KeyAction::EditQuantity => match snapshot.current_view {
                View::Items => row.map(|name| Action::BeginEdit(EditTarget::Quantity(name))),
                View::Listing => snapshot
                    .selected_order_line
                    .clone()
                    .map(|name| Action::BeginEdit(EditTarget::OrderQuantity(name))),
                View::Tabs => None,
            },
            KeyAction::ClearValue if snapshot.current_view == View::Items => {
                row.map(|name| Action::SetRowValue { name, value: None })
            }
            KeyAction::SortName => Some(Action::SortBy(SortField::Name)),
            KeyAction::SortQuantity => Some(Action::SortBy(SortField::Quantity)),
            KeyAction::SortPrice => Some(Action::SortBy(SortField::Price)),
            KeyAction::SortTotal => Some(Action::SortBy(SortField::TotalValue)),
            KeyAction::EditValue | KeyAction::ClearValue => None,
        }
    }

    fn handle_insert_mode(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::SetInputMode(InputMode::Normal)),
            KeyCode::Enter => {
                let input = snapshot.input_buffer.as_str();
                let parsed = match snapshot.edit_target.clone()? {
                    EditTarget::Value(name) => {
                        parse_price(input).map(|value| Action::SetRowValue { name, value })
                    }
                    EditTarget::Quantity(name) => {
                        parse_quantity(input).map(|quantity| Action::SetRowQuantity { name, quantity })
                    }
                    EditTarget::OrderQuantity(name) => parse_quantity(input)
                        .map(|q| Action::SetOrderQuantity { name, quantity: q.unwrap_or(1) }),
                };
                Some(parsed.unwrap_or_else(|e| Action::ShowNotification(Notification::error(e.to_string()))))
            }
            _ => Self::edit_buffer(key),
        }
    }

    fn handle_command_mode(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::SetInputMode(InputMode::Normal)),
            KeyCode::Enter => {
                self.follow_up(Action::SetInputMode(InputMode::Normal));
                Some(
                    parse_command(&snapshot.input_buffer)
                        .unwrap_or_else(|e| Action::ShowNotification(Notification::error(e.to_string()))),
                )
            }
            _ => Self::edit_buffer(key),
        }
    }

    fn handle_search_mode(&self, key: KeyEvent, snapshot: &StoreSnapshot) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::SetInputMode(InputMode::Normal)),
            KeyCode::Enter => Some(Action::Search(snapshot.input_buffer.clone())),
            _ => Self::edit_buffer(key),
        }
    }

    fn edit_buffer(key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char(c) => Some(Action::InputChar(c)),
            KeyCode::Backspace => Some(Action::InputBackspace),
            KeyCode::Left => Some(Action::InputLeft),
            KeyCode::Right => Some(Action::InputRight),
            _ => None,
        }
    }

    /// Queue an action to run after the one being returned.
    fn follow_up(&self, action: Action) {
        if self.action_tx.send(action).is_err() {
            debug!("action channel closed");
        }
    }
}
