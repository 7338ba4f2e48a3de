//! League and stash tab state.

use std::collections::BTreeSet;

/// A game league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub id: String,
    pub realm: String,
    pub description: String,
    pub category: Option<String>,
}

/// A stash tab, possibly a folder holding child tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashTab {
    pub id: String,
    pub name: String,
    /// Tab type, e.g. `CurrencyStash` or `MapStash`.
    pub kind: String,
    pub index: u32,
    /// `#rrggbb`.
    pub colour: String,
    pub children: Vec<StashTab>,
}

impl StashTab {
    pub fn is_folder(&self) -> bool {
        !self.children.is_empty()
    }

    /// This tab's leaf tabs in order: itself if it is not a folder, its
    /// children otherwise.
    pub fn flatten(&self) -> Vec<StashTab> {
        if self.is_folder() {
            self.children.iter().flat_map(StashTab::flatten).collect()
        } else {
            vec![self.clone()]
        }
    }
}

/// Flatten a tab list so folders are replaced by their children.
pub fn flatten_tabs(tabs: &[StashTab]) -> Vec<StashTab> {
    tabs.iter().flat_map(StashTab::flatten).collect()
}

/// State for the league and tab picker.
#[derive(Debug, Default)]
pub struct StashState {
    pub leagues: Vec<League>,
    pub league: Option<String>,
    /// Flattened tabs of the current league.
    pub tabs: Vec<StashTab>,
    /// Cursor in `tabs`.
    pub selected_index: Option<usize>,
    /// Ids of tabs chosen for fetching.
    pub chosen: BTreeSet<String>,
    pub loading: bool,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl StashState {
    pub fn selected_tab(&self) -> Option<&StashTab> {
        self.selected_index.and_then(|i| self.tabs.get(i))
    }

    /// Toggle the tab under the cursor. Returns whether it is now chosen.
    pub fn toggle_selected(&mut self) -> Option<bool> {
        let id = self.selected_tab()?.id.clone();
        if self.chosen.remove(&id) {
            Some(false)
        } else {
            self.chosen.insert(id);
            Some(true)
        }
    }

    pub fn is_chosen(&self, id: &str) -> bool {
        self.chosen.contains(id)
    }

    /// Chosen tabs in display order.
    pub fn chosen_tabs(&self) -> Vec<StashTab> {
        self.tabs
            .iter()
            .filter(|t| self.chosen.contains(&t.id))
            .cloned()
            .collect()
    }

    /// Replace the tab list, keeping choices that still exist.
    pub fn set_tabs(&mut self, tabs: Vec<StashTab>) {
        self.chosen.retain(|id| tabs.iter().any(|t| &t.id == id));
        self.selected_index = if tabs.is_empty() { None } else { Some(0) };
        self.tabs = tabs;
        self.loading = false;
        self.last_updated = Some(chrono::Utc::now());
    }
}
