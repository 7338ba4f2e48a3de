//! Selected rows, the buyer's order and the generated listing.

use crate::config::TradeConfig;
use crate::pricing::{
    ClassifiedRow, ListingError, ListingRequest, OrderCalculator, PricedRows, format_listing,
};
use rust_decimal::Decimal;

/// State for the listing view.
#[derive(Debug, Default)]
pub struct ListingState {
    /// Selected rows with order quantities.
    pub order: OrderCalculator,
    /// Cursor in the order lines.
    pub selected_index: Option<usize>,
    pub display_name: Option<String>,
    /// Chaos per divine.
    pub divine_price: Option<Decimal>,
    pub title: String,
    /// Divines the buyer is paying with.
    pub payment_divines: Option<u32>,
    /// Last generation result.
    pub text: Option<Result<String, ListingError>>,
}

impl ListingState {
    pub fn from_config(trade: &TradeConfig) -> Self {
        Self {
            display_name: trade.display_name.clone(),
            divine_price: trade.divine_price,
            title: trade.listing_title.clone(),
            ..Default::default()
        }
    }

    pub fn toggle(&mut self, row: &ClassifiedRow) -> bool {
        let selected = self.order.toggle(row);
        self.text = None;
        self.clamp_selection();
        selected
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected_index
            .and_then(|i| self.order.lines().get(i))
            .map(|l| l.name.as_str())
    }

    /// Render the listing for the selected rows of `rows`.
    pub fn generate(&mut self, rows: &PricedRows) -> &Result<String, ListingError> {
        let selected = rows.iter().filter(|r| self.order.is_selected(r.name()));
        let result = format_listing(
            selected,
            ListingRequest {
                title: &self.title,
                display_name: self.display_name.as_deref(),
                divine_price: self.divine_price,
            },
        );
        self.text.insert(result)
    }

    /// Chaos to hand back for the current payment, if one is set.
    pub fn change_due(&self) -> Option<Decimal> {
        let divines = self.payment_divines?;
        let rate = self.divine_price?;
        Some(self.order.change_due(divines, rate))
    }

    /// Follow price edits and drop selections whose rows are gone.
    pub fn sync(&mut self, rows: &PricedRows) {
        self.order.sync_prices(rows);
        self.text = None;
        self.clamp_selection();
    }

    pub fn clamp_selection(&mut self) {
        let len = self.order.lines().len();
        self.selected_index = match (len, self.selected_index) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
    }
}
