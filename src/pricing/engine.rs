//! Aggregation of classified items into priced rows.

use super::PriceSnapshot;
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// User price overrides keyed by canonical item name.
pub type Overrides = HashMap<String, Decimal>;

/// An inventory item that the catalog recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedItem {
    /// Canonical name.
    pub name: String,
    /// Item art URL.
    pub icon: String,
}

impl ClassifiedItem {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// One priced, quantity-summed line.
///
/// `total_value` always equals `quantity() * effective_price()`; every
/// mutator recomputes it, and fields are private so nothing else can
/// break that.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    name: String,
    fetched_quantity: u32,
    quantity_override: Option<u32>,
    unit_price: Decimal,
    custom_price: Option<Decimal>,
    total_value: Decimal,
    icon: String,
}

impl ClassifiedRow {
    /// A row for the first sighting of `name`.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        unit_price: Decimal,
        custom_price: Option<Decimal>,
    ) -> Self {
        let mut row = Self {
            name: name.into(),
            fetched_quantity: 1,
            quantity_override: None,
            unit_price,
            custom_price,
            total_value: Decimal::ZERO,
            icon: icon.into(),
        };
        row.recompute();
        row
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Quantity in effect: the user's edit if any, else the fetched count.
    pub fn quantity(&self) -> u32 {
        self.quantity_override.unwrap_or(self.fetched_quantity)
    }

    /// Quantity as counted in the stash.
    pub fn fetched_quantity(&self) -> u32 {
        self.fetched_quantity
    }

    /// Whether the user has edited the quantity.
    pub fn has_quantity_override(&self) -> bool {
        self.quantity_override.is_some()
    }

    /// Feed price; zero when the feed does not list the item.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn custom_price(&self) -> Option<Decimal> {
        self.custom_price
    }

    /// Price used for totals: the override if set, else the feed price.
    pub fn effective_price(&self) -> Decimal {
        self.custom_price.unwrap_or(self.unit_price)
    }

    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    /// Total expressed in divines, if a positive rate is known.
    pub fn divine_equivalent(&self, divine_price: Decimal) -> Option<Decimal> {
        if divine_price <= Decimal::ZERO {
            return None;
        }
        self.total_value.checked_div(divine_price).map(|d| d.round_dp(1))
    }

    fn increment(&mut self) {
        self.fetched_quantity += 1;
        self.recompute();
    }

    fn set_custom_price(&mut self, value: Option<Decimal>) {
        self.custom_price = value;
        self.recompute();
    }

    fn set_quantity_override(&mut self, quantity: Option<u32>) {
        self.quantity_override = quantity;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_value = Decimal::from(self.quantity()).saturating_mul(self.effective_price());
    }
}

/// Rows keyed by canonical name, in first-seen order unless sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricedRows {
    rows: Vec<ClassifiedRow>,
}

impl PricedRows {
    /// Fold items into rows.
    ///
    /// A row's unit price is fixed the first time its name is seen.
    pub fn aggregate<'a, I>(items: I, snapshot: &PriceSnapshot, overrides: &Overrides) -> Self
    where
        I: IntoIterator<Item = &'a ClassifiedItem>,
    {
        let mut rows: Vec<ClassifiedRow> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for item in items {
            match index.get(item.name.as_str()) {
                Some(&i) => rows[i].increment(),
                None => {
                    let unit_price = snapshot.chaos_price(&item.name).unwrap_or(Decimal::ZERO);
                    let custom_price = overrides.get(&item.name).copied();
                    index.insert(item.name.as_str(), rows.len());
                    rows.push(ClassifiedRow::new(
                        item.name.clone(),
                        item.icon.clone(),
                        unit_price,
                        custom_price,
                    ));
                }
            }
        }

        Self { rows }
    }

    /// Set or clear the custom price of a row.
    pub fn set_row_value(mut self, name: &str, value: Option<Decimal>) -> Result<Self> {
        if let Some(v) = value
            && v < Decimal::ZERO
        {
            return Err(Error::validation(format!("price for '{name}' cannot be negative")));
        }
        let row = self.row(name)?;
        let price = value.unwrap_or(row.unit_price);
        self.check_row_total(name, row.quantity(), price)?;
        self.row_mut(name)?.set_custom_price(value);
        Ok(self)
    }

    /// Set the quantity of a row; `None` restores the fetched quantity.
    pub fn set_row_quantity(mut self, name: &str, quantity: Option<u32>) -> Result<Self> {
        if quantity == Some(0) {
            return Err(Error::validation(format!(
                "quantity for '{name}' must be at least 1"
            )));
        }
        let row = self.row(name)?;
        let effective = quantity.unwrap_or(row.fetched_quantity);
        self.check_row_total(name, effective, row.effective_price())?;
        self.row_mut(name)?.set_quantity_override(quantity);
        Ok(self)
    }

    /// Rows in their current order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedRow> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[ClassifiedRow] {
        &self.rows
    }

    pub fn get(&self, name: &str) -> Option<&ClassifiedRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Row at a display position.
    pub fn at(&self, index: usize) -> Option<&ClassifiedRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all row totals.
    pub fn total_value(&self) -> Decimal {
        self.rows
            .iter()
            .map(ClassifiedRow::total_value)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Rows whose name contains `query`, case-insensitively.
    pub fn filtered(&self, query: Option<&str>) -> Vec<&ClassifiedRow> {
        match query.map(str::to_lowercase) {
            Some(q) if !q.is_empty() => self
                .rows
                .iter()
                .filter(|r| r.name.to_lowercase().contains(&q))
                .collect(),
            _ => self.rows.iter().collect(),
        }
    }

    /// Reorder rows; see [`super::sort_rows`].
    pub fn sorted(mut self, field: super::SortField, direction: super::SortDirection) -> Self {
        super::sort_rows(&mut self.rows, field, direction);
        self
    }

    fn row(&self, name: &str) -> Result<&ClassifiedRow> {
        self.get(name)
            .ok_or_else(|| Error::not_found(format!("no row named '{name}'")))
    }

    /// Reject an edit whose row total, or the grand total, would not fit.
    fn check_row_total(&self, name: &str, quantity: u32, price: Decimal) -> Result<()> {
        let too_large = || Error::validation(format!("value for '{name}' is too large"));
        let row_total = Decimal::from(quantity)
            .checked_mul(price)
            .ok_or_else(too_large)?;
        self.rows
            .iter()
            .filter(|r| r.name != name)
            .try_fold(row_total, |sum, r| sum.checked_add(r.total_value))
            .ok_or_else(too_large)?;
        Ok(())
    }

    fn row_mut(&mut self, name: &str) -> Result<&mut ClassifiedRow> {
        self.rows
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::not_found(format!("no row named '{name}'")))
    }
}

/// Fold items into priced rows.
pub fn aggregate(
    items: &[ClassifiedItem],
    snapshot: &PriceSnapshot,
    overrides: &Overrides,
) -> PricedRows {
    PricedRows::aggregate(items, snapshot, overrides)
}

/// Return `rows` with `name`'s custom price set or cleared.
pub fn apply_override(rows: PricedRows, name: &str, value: Option<Decimal>) -> Result<PricedRows> {
    rows.set_row_value(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceEntry;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn fire_feed() -> PriceSnapshot {
        PriceSnapshot::new(None, vec![PriceEntry::new("Fire", dec!(10), dec!(1))]).unwrap()
    }

    fn items(names: &[&str]) -> Vec<ClassifiedItem> {
        names
            .iter()
            .map(|n| ClassifiedItem::new(*n, format!("https://icons/{n}.png")))
            .collect()
    }

    fn assert_invariant(rows: &PricedRows) {
        for row in rows.iter() {
            assert_eq!(
                row.total_value(),
                Decimal::from(row.quantity()) * row.custom_price().unwrap_or(row.unit_price()),
                "invariant broken for {}",
                row.name()
            );
        }
    }

    #[test]
    fn test_three_of_a_kind_without_override() {
        let rows = aggregate(&items(&["Fire", "Fire", "Fire"]), &fire_feed(), &Overrides::new());

        assert_eq!(rows.len(), 1);
        let fire = rows.get("Fire").unwrap();
        assert_eq!(fire.quantity(), 3);
        assert_eq!(fire.unit_price(), dec!(10));
        assert_eq!(fire.custom_price(), None);
        assert_eq!(fire.total_value(), dec!(30));
    }

    #[test]
    fn test_override_drives_total() {
        let overrides = Overrides::from([("Fire".to_string(), dec!(5))]);
        let rows = aggregate(&items(&["Fire", "Fire", "Fire"]), &fire_feed(), &overrides);

        let fire = rows.get("Fire").unwrap();
        assert_eq!(fire.unit_price(), dec!(10));
        assert_eq!(fire.custom_price(), Some(dec!(5)));
        assert_eq!(fire.total_value(), dec!(15));
    }

    #[test]
    fn test_unpriced_item_is_zero_not_error() {
        let rows = aggregate(&items(&["Ice", "Ice"]), &fire_feed(), &Overrides::new());
        let ice = rows.get("Ice").unwrap();
        assert_eq!(ice.unit_price(), Decimal::ZERO);
        assert_eq!(ice.total_value(), Decimal::ZERO);
        assert_eq!(ice.quantity(), 2);
    }

    #[test]
    fn test_first_seen_order_and_first_icon() {
        let input = vec![
            ClassifiedItem::new("Ice", "ice-1"),
            ClassifiedItem::new("Fire", "fire-1"),
            ClassifiedItem::new("Ice", "ice-2"),
        ];
        let rows = aggregate(&input, &fire_feed(), &Overrides::new());

        let names: Vec<&str> = rows.iter().map(ClassifiedRow::name).collect();
        assert_eq!(names, vec!["Ice", "Fire"]);
        assert_eq!(rows.get("Ice").unwrap().icon(), "ice-1");
    }

    #[test]
    fn test_set_and_clear_row_value() {
        let rows = aggregate(&items(&["Fire", "Fire"]), &fire_feed(), &Overrides::new());

        let rows = rows.set_row_value("Fire", Some(dec!(7))).unwrap();
        assert_eq!(rows.get("Fire").unwrap().total_value(), dec!(14));
        assert_invariant(&rows);

        let rows = apply_override(rows, "Fire", None).unwrap();
        assert_eq!(rows.get("Fire").unwrap().custom_price(), None);
        assert_eq!(rows.get("Fire").unwrap().total_value(), dec!(20));
        assert_invariant(&rows);
    }

    #[test]
    fn test_setting_same_value_twice_is_stable() {
        let rows = aggregate(&items(&["Fire", "Fire"]), &fire_feed(), &Overrides::new());
        let once = rows.clone().set_row_value("Fire", Some(dec!(3))).unwrap();
        let twice = once.clone().set_row_value("Fire", Some(dec!(3))).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_quantity_edit_reverts_to_fetched() {
        let rows = aggregate(&items(&["Fire", "Fire", "Fire"]), &fire_feed(), &Overrides::new());

        let rows = rows.set_row_quantity("Fire", Some(1)).unwrap();
        let fire = rows.get("Fire").unwrap();
        assert_eq!(fire.quantity(), 1);
        assert_eq!(fire.fetched_quantity(), 3);
        assert_eq!(fire.total_value(), dec!(10));

        let rows = rows.set_row_quantity("Fire", None).unwrap();
        assert_eq!(rows.get("Fire").unwrap().quantity(), 3);
        assert_eq!(rows.get("Fire").unwrap().total_value(), dec!(30));
        assert_invariant(&rows);
    }

    #[test]
    fn test_invalid_edits() {
        let rows = aggregate(&items(&["Fire"]), &fire_feed(), &Overrides::new());

        assert!(matches!(
            rows.clone().set_row_value("Fire", Some(dec!(-1))),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            rows.clone().set_row_quantity("Fire", Some(0)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            rows.set_row_value("Nope", Some(dec!(1))),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_oversized_edits_are_rejected_and_leave_rows_alone() {
        let rows = aggregate(&items(&["Fire", "Fire"]), &fire_feed(), &Overrides::new());
        assert!(matches!(
            rows.clone().set_row_value("Fire", Some(Decimal::MAX)),
            Err(Error::Validation(_))
        ));
        assert_eq!(rows.get("Fire").unwrap().total_value(), dec!(20));

        let single = aggregate(&items(&["Fire"]), &fire_feed(), &Overrides::new())
            .set_row_value("Fire", Some(Decimal::MAX))
            .unwrap();
        assert_eq!(single.total_value(), Decimal::MAX);
        assert!(matches!(
            single.clone().set_row_quantity("Fire", Some(2)),
            Err(Error::Validation(_))
        ));
        assert_invariant(&single);
    }

    #[test]
    fn test_edit_that_overflows_the_grand_total_is_rejected() {
        let rows = aggregate(&items(&["Fire", "Ice"]), &fire_feed(), &Overrides::new());
        assert!(matches!(
            rows.clone().set_row_value("Ice", Some(Decimal::MAX)),
            Err(Error::Validation(_))
        ));
        assert_eq!(rows.total_value(), dec!(10));
    }

    #[test]
    fn test_filter_and_total() {
        let rows = aggregate(
            &items(&["Fire", "Ice", "Fireball"]),
            &fire_feed(),
            &Overrides::new(),
        );
        let hits: Vec<&str> = rows.filtered(Some("FIRE")).into_iter().map(|r| r.name()).collect();
        assert_eq!(hits, vec!["Fire", "Fireball"]);
        assert_eq!(rows.filtered(Some("")).len(), 3);
        assert_eq!(rows.total_value(), dec!(10));
    }

    #[test]
    fn test_divine_equivalent() {
        let row = ClassifiedRow::new("Fire", "", dec!(45), None);
        assert_eq!(row.divine_equivalent(dec!(180)), Some(dec!(0.2)));
        assert_eq!(row.divine_equivalent(Decimal::ZERO), None);

        let huge = ClassifiedRow::new("Fire", "", Decimal::MAX, None);
        assert_eq!(huge.divine_equivalent(dec!(0.5)), None);
    }
}
