//! Application-level state.

use super::Notification;

/// The current view/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// League and stash tab selection.
    #[default]
    Tabs,
    /// Priced rows.
    Items,
    /// Selected rows, order total and the generated listing.
    Listing,
}

impl View {
    pub const ALL: [View; 3] = [View::Tabs, View::Items, View::Listing];

    pub fn title(self) -> &'static str {
        match self {
            Self::Tabs => "Tabs",
            Self::Items => "Items",
            Self::Listing => "Listing",
        }
    }
}

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Editing a value; see [`AppState::edit_target`].
    Insert,
    Command,
    Search,
}

/// What an Insert-mode edit applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Custom price of a row.
    Value(String),
    /// Quantity of a row.
    Quantity(String),
    /// Quantity of a row in the order.
    OrderQuantity(String),
}

impl EditTarget {
    pub fn label(&self) -> String {
        match self {
            Self::Value(name) => format!("Price of {name}"),
            Self::Quantity(name) => format!("Quantity of {name}"),
            Self::OrderQuantity(name) => format!("Order quantity of {name}"),
        }
    }
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Target of the edit in progress.
    pub edit_target: Option<EditTarget>,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// Whether an access token is configured.
    pub authenticated: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Current search/command/edit input.
    pub input_buffer: String,
    /// Cursor position in input buffer, in characters.
    pub cursor_position: usize,
}

impl AppState {
    /// Check if in an input mode.
    pub fn is_editing(&self) -> bool {
        self.input_mode != InputMode::Normal
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    /// Replace the input buffer, cursor at the end.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input_buffer = text.into();
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Add a character at the cursor.
    pub fn push_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor_position);
        self.input_buffer.insert(at, c);
        self.cursor_position += 1;
    }

    /// Remove the character before the cursor.
    pub fn pop_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_offset(self.cursor_position);
            self.input_buffer.remove(at);
        }
    }

    /// Move cursor left.
    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn cursor_right(&mut self) {
        if self.cursor_position < self.input_buffer.chars().count() {
            self.cursor_position += 1;
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.input_buffer
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len())
    }
}
