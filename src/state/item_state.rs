//! Priced rows and the run that produced them.

use crate::api::FetchReport;
use crate::error::Result;
use crate::pricing::{ClassifiedRow, PricedRows, SortField, SortState};
use crate::service::PricingRun;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// What the items view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemsStatus<'a> {
    Loading,
    Error(&'a str),
    /// No run yet.
    Idle,
    /// A run finished and nothing matched.
    NoResults,
    Ready,
}

/// State for the items view.
#[derive(Debug, Default)]
pub struct ItemState {
    pub rows: PricedRows,
    pub sort: SortState,
    pub search_query: Option<String>,
    /// Cursor in the visible rows.
    pub selected_index: Option<usize>,
    /// League the rows were fetched from.
    pub league: Option<String>,
    pub report: Option<FetchReport>,
    pub prices_as_of: Option<DateTime<Utc>>,
    pub feed_error: Option<String>,
    /// A pricing run is running; a second one is refused.
    pub fetch_in_flight: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ItemState {
    /// Rows after the search filter, in display order.
    pub fn visible_rows(&self) -> Vec<&ClassifiedRow> {
        self.rows.filtered(self.search_query.as_deref())
    }

    pub fn selected_row(&self) -> Option<&ClassifiedRow> {
        self.selected_index
            .and_then(|i| self.visible_rows().get(i).copied())
    }

    pub fn status(&self) -> ItemsStatus<'_> {
        if self.fetch_in_flight {
            ItemsStatus::Loading
        } else if let Some(error) = &self.error {
            ItemsStatus::Error(error)
        } else if self.report.is_none() {
            ItemsStatus::Idle
        } else if self.visible_rows().is_empty() {
            ItemsStatus::NoResults
        } else {
            ItemsStatus::Ready
        }
    }

    /// Install the result of a pricing run, keeping the active sort.
    pub fn load_run(&mut self, run: PricingRun) {
        self.rows = run.rows;
        self.apply_sort();
        self.league = Some(run.league);
        self.report = Some(run.report);
        self.prices_as_of = run.prices_as_of;
        self.feed_error = run.feed_error;
        self.fetch_in_flight = false;
        self.error = None;
        self.last_updated = Some(Utc::now());
        self.clamp_selection();
    }

    pub fn sort_by(&mut self, field: SortField) {
        self.sort.toggle(field);
        self.apply_sort();
    }

    pub fn set_row_value(&mut self, name: &str, value: Option<Decimal>) -> Result<()> {
        self.rows = self.rows.clone().set_row_value(name, value)?;
        self.apply_sort();
        Ok(())
    }

    pub fn set_row_quantity(&mut self, name: &str, quantity: Option<u32>) -> Result<()> {
        self.rows = self.rows.clone().set_row_quantity(name, quantity)?;
        self.apply_sort();
        Ok(())
    }

    pub fn set_search(&mut self, query: Option<String>) {
        self.search_query = query.filter(|q| !q.trim().is_empty());
        self.selected_index = None;
        self.clamp_selection();
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        self.selected_index = match (len, self.selected_index) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
    }

    fn apply_sort(&mut self) {
        if let Some((field, direction)) = self.sort.current() {
            self.rows = std::mem::take(&mut self.rows).sorted(field, direction);
        }
    }
}
