//! UI rendering using ratatui.
//!
//! Widgets read the [`Store`] and never mutate it.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{HelpPanel, InputLine, ItemTable, ListingPanel, StashList, StatusBar, TabBar};

use crate::events::Keymap;
use crate::state::{Store, View};
use ratatui::Frame;

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, keymap: &Keymap) {
        let layout = Layout::new(frame.area());

        StatusBar::render(frame, layout.status_area, store);
        TabBar::render(frame, layout.tab_area, store);

        match store.app.current_view {
            View::Tabs => StashList::render(frame, layout.main_area, store),
            View::Items => ItemTable::render(frame, layout.main_area, store),
            View::Listing => ListingPanel::render(frame, layout.main_area, store),
        }

        InputLine::render(frame, layout.input_area, store);

        if store.app.show_help {
            HelpPanel::render(frame, frame.area(), keymap);
        }

        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }
    }
}
