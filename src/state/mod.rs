//! State management for compass-trader.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture.

mod app_state;
mod item_state;
mod listing_state;
mod stash_state;

pub use app_state::{AppState, EditTarget, InputMode, View};
pub use item_state::{ItemState, ItemsStatus};
pub use listing_state::ListingState;
pub use stash_state::{League, StashState, StashTab, flatten_tabs};

use crate::config::Config;
use crate::error::Result;
use crate::pricing::SortField;
use crate::service::PricingRun;
use rust_decimal::Decimal;
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    SetInputMode(InputMode),
    BeginEdit(EditTarget),

    // Input buffer
    InputChar(char),
    InputBackspace,
    InputLeft,
    InputRight,

    // Leagues and tabs
    LoadLeagues,
    LeaguesLoaded(Vec<League>),
    SelectLeague(String),
    LoadTabs,
    TabsLoaded(Vec<StashTab>),
    StashLoadFailed(String),
    ToggleTab,

    // Pricing runs
    StartFetch,
    CancelFetch,
    FetchCompleted(Box<PricingRun>),
    FetchFailed(String),

    // Rows
    SortBy(SortField),
    Search(String),
    ClearSearch,
    ToggleRow,
    SetRowValue {
        name: String,
        value: Option<Decimal>,
    },
    SetRowQuantity {
        name: String,
        quantity: Option<u32>,
    },

    // Listing and order
    SetOrderQuantity {
        name: String,
        quantity: u32,
    },
    SetDisplayName(String),
    SetDivinePrice(Decimal),
    SetPayment(u32),
    GenerateListing,
    ExportListing,

    // UI actions
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ToggleHelp,
    ShowNotification(Notification),
    DismissNotification,

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
            duration_secs: 3,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
            duration_secs: 3,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
            duration_secs: 5,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
            duration_secs: 10,
        }
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// League and tab state.
    pub stash: StashState,
    /// Priced rows.
    pub items: ItemState,
    /// Selection, order and listing.
    pub listing: ListingState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, config: &Config) -> Self {
        Self {
            app: AppState::default(),
            stash: StashState {
                league: config.trade.league.clone(),
                ..Default::default()
            },
            items: ItemState::default(),
            listing: ListingState::from_config(&config.trade),
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => self.app.current_view = view,
            Action::SetInputMode(mode) => {
                self.app.input_mode = mode;
                self.app.clear_input();
                if mode != InputMode::Insert {
                    self.app.edit_target = None;
                }
                if mode == InputMode::Search {
                    self.app
                        .set_input(self.items.search_query.clone().unwrap_or_default());
                }
            }
            Action::BeginEdit(target) => self.begin_edit(target),

            // Input buffer
            Action::InputChar(c) => self.app.push_char(c),
            Action::InputBackspace => self.app.pop_char(),
            Action::InputLeft => self.app.cursor_left(),
            Action::InputRight => self.app.cursor_right(),

            // Leagues and tabs
            Action::LoadLeagues | Action::LoadTabs => self.stash.loading = true,
            Action::LeaguesLoaded(leagues) => {
                let keep = self
                    .stash
                    .league
                    .as_ref()
                    .is_some_and(|id| leagues.iter().any(|l| &l.id == id));
                if !keep {
                    self.stash.league = leagues.first().map(|l| l.id.clone());
                }
                self.stash.leagues = leagues;
                self.stash.loading = false;
            }
            Action::SelectLeague(league) => {
                if self.stash.league.as_deref() != Some(league.as_str()) {
                    self.stash.league = Some(league);
                    self.stash.set_tabs(Vec::new());
                    self.stash.last_updated = None;
                }
            }
            Action::TabsLoaded(tabs) => self.stash.set_tabs(tabs),
            Action::StashLoadFailed(error) => {
                self.stash.loading = false;
                self.app.notification = Some(Notification::error(error));
            }
            Action::ToggleTab => {
                self.stash.toggle_selected();
            }

            // Pricing runs
            Action::StartFetch => {
                self.items.fetch_in_flight = true;
                self.items.error = None;
            }
            Action::CancelFetch => {}
            Action::FetchCompleted(run) => {
                let summary = run.report.summary();
                let mut warnings = Vec::new();
                if let Some(e) = &run.feed_error {
                    warnings.push(format!("prices unavailable: {e}"));
                }
                if let Some(e) = &run.overrides_error {
                    warnings.push(format!("saved prices unavailable: {e}"));
                }
                self.items.load_run(*run);
                self.listing.sync(&self.items.rows);
                self.app.notification = Some(if warnings.is_empty() {
                    Notification::success(summary)
                } else {
                    Notification::warning(format!("{summary}; {}", warnings.join("; ")))
                });
            }
            Action::FetchFailed(error) => {
                self.items.fetch_in_flight = false;
                self.app.notification = Some(Notification::error(error.clone()));
                self.items.error = Some(error);
            }

            // Rows
            Action::SortBy(field) => self.items.sort_by(field),
            Action::Search(query) => {
                self.items.set_search(Some(query));
                self.app.input_mode = InputMode::Normal;
                self.app.clear_input();
            }
            Action::ClearSearch => self.items.set_search(None),
            Action::ToggleRow => {
                if let Some(row) = self.items.selected_row().cloned() {
                    self.listing.toggle(&row);
                }
            }
            Action::SetRowValue { name, value } => {
                if let Err(e) = self.apply_row_value(&name, value) {
                    self.notify_error(e);
                }
            }
            Action::SetRowQuantity { name, quantity } => {
                match self.items.set_row_quantity(&name, quantity) {
                    Ok(()) => self.listing.sync(&self.items.rows),
                    Err(e) => self.notify_error(e),
                }
                self.finish_edit();
            }

            // Listing and order
            Action::SetOrderQuantity { name, quantity } => {
                if let Err(e) = self.listing.order.set_quantity(&name, quantity) {
                    self.notify_error(e);
                }
                self.finish_edit();
            }
            Action::SetDisplayName(name) => {
                self.listing.display_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
                self.listing.text = None;
            }
            Action::SetDivinePrice(price) => {
                self.listing.divine_price = Some(price);
                self.listing.text = None;
            }
            Action::SetPayment(divines) => self.listing.payment_divines = Some(divines),
            Action::GenerateListing => {
                self.app.current_view = View::Listing;
                if let Err(e) = self.listing.generate(&self.items.rows) {
                    self.app.notification = Some(Notification::warning(e.to_string()));
                }
            }
            Action::ExportListing => {}

            // UI actions
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-10),
            Action::PageDown => self.scroll(10),
            Action::GoToTop => self.go_to_top(),
            Action::GoToBottom => self.go_to_bottom(),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
            }
            Action::DismissNotification => {
                self.app.notification = None;
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    /// Apply a price edit to the rows and the order.
    pub fn apply_row_value(&mut self, name: &str, value: Option<Decimal>) -> Result<()> {
        let result = self.items.set_row_value(name, value);
        if result.is_ok() {
            self.listing.sync(&self.items.rows);
        }
        self.finish_edit();
        result
    }

    fn begin_edit(&mut self, target: EditTarget) {
        let current = match &target {
            EditTarget::Value(name) => self
                .items
                .rows
                .get(name)
                .map(|r| r.effective_price().normalize().to_string()),
            EditTarget::Quantity(name) => self.items.rows.get(name).map(|r| r.quantity().to_string()),
            EditTarget::OrderQuantity(name) => self
                .listing
                .order
                .lines()
                .iter()
                .find(|l| &l.name == name)
                .map(|l| l.quantity.to_string()),
        };
        let Some(current) = current else {
            return;
        };
        self.app.input_mode = InputMode::Insert;
        self.app.edit_target = Some(target);
        self.app.set_input(current);
    }

    fn finish_edit(&mut self) {
        if self.app.input_mode == InputMode::Insert {
            self.app.input_mode = InputMode::Normal;
            self.app.edit_target = None;
            self.app.clear_input();
        }
    }

    fn notify_error(&mut self, error: crate::Error) {
        self.app.notification = Some(Notification::error(error.to_string()));
    }

    fn scroll(&mut self, delta: i32) {
        let len = match self.app.current_view {
            View::Tabs => self.stash.tabs.len(),
            View::Items => self.items.visible_rows().len(),
            View::Listing => self.listing.order.lines().len(),
        };
        let index = match self.app.current_view {
            View::Tabs => &mut self.stash.selected_index,
            View::Items => &mut self.items.selected_index,
            View::Listing => &mut self.listing.selected_index,
        };
        if len == 0 {
            *index = None;
            return;
        }
        let current = index.unwrap_or(0) as i32;
        let new_index = (current + delta).max(0) as usize;
        *index = Some(new_index.min(len - 1));
    }

    fn go_to_top(&mut self) {
        self.scroll(i32::MIN / 2);
    }

    fn go_to_bottom(&mut self) {
        self.scroll(i32::MAX / 2);
    }
}
