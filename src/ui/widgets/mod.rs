//! TUI widgets.

mod help;
mod input_line;
mod item_table;
mod listing_panel;
mod notifications;
mod stash_list;
mod status_bar;
mod tab_bar;

pub use help::HelpPanel;
pub use input_line::InputLine;
pub use item_table::ItemTable;
pub use listing_panel::ListingPanel;
pub use notifications::render_notification;
pub use stash_list::StashList;
pub use status_bar::StatusBar;
pub use tab_bar::TabBar;

/// Shorten `s` to at most `max_len` characters, marking the cut with `...`.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let keep = max_len.saturating_sub(3);
        format!("{}...", s.chars().take(keep).collect::<String>())
    }
}
