//! Buyer order calculator.

use super::{ClassifiedRow, PricedRows};
use crate::error::{Error, Result};
use rust_decimal::Decimal;

/// A selected row with the quantity a buyer is taking.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// Selected rows and order quantities, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderCalculator {
    lines: Vec<OrderLine>,
}

impl OrderCalculator {
    /// Add a row with quantity 1, or remove it if already selected.
    /// Returns whether the row is now selected.
    pub fn toggle(&mut self, row: &ClassifiedRow) -> bool {
        if let Some(pos) = self.position(row.name()) {
            self.lines.remove(pos);
            false
        } else {
            self.lines.push(OrderLine {
                name: row.name().to_string(),
                quantity: 1,
                unit_price: row.effective_price(),
            });
            true
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn set_quantity(&mut self, name: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(Error::validation("order quantity must be at least 1"));
        }
        let pos = self
            .position(name)
            .ok_or_else(|| Error::not_found(format!("'{name}' is not selected")))?;
        let too_large = || Error::validation(format!("order quantity for '{name}' is too large"));
        let line_total = Decimal::from(quantity)
            .checked_mul(self.lines[pos].unit_price)
            .ok_or_else(too_large)?;
        self.lines
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .try_fold(line_total, |sum, (_, line)| sum.checked_add(line.total()))
            .ok_or_else(too_large)?;
        self.lines[pos].quantity = quantity;
        Ok(())
    }

    /// Pick up price edits and drop lines whose row disappeared.
    pub fn sync_prices(&mut self, rows: &PricedRows) {
        self.lines.retain_mut(|line| match rows.get(&line.name) {
            Some(row) => {
                line.unit_price = row.effective_price();
                true
            }
            None => false,
        });
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Chaos owed for the whole order.
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(OrderLine::total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Chaos to hand back when the buyer pays `divines` whole divines.
    /// Negative means the buyer still owes.
    pub fn change_due(&self, divines: u32, divine_price: Decimal) -> Decimal {
        Decimal::from(divines)
            .saturating_mul(divine_price)
            .saturating_sub(self.total())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{ClassifiedItem, Overrides, PriceEntry, PriceSnapshot};
    use rust_decimal_macros::dec;

    fn rows() -> PricedRows {
        let feed = PriceSnapshot::new(
            None,
            vec![
                PriceEntry::new("Fire", dec!(10), dec!(0)),
                PriceEntry::new("Ice", dec!(4), dec!(0)),
            ],
        )
        .unwrap();
        let items = [ClassifiedItem::new("Fire", ""), ClassifiedItem::new("Ice", "")];
        PricedRows::aggregate(&items, &feed, &Overrides::new())
    }

    #[test]
    fn test_toggle_defaults_to_one() {
        let rows = rows();
        let mut order = OrderCalculator::default();
        assert!(order.toggle(rows.get("Fire").unwrap()));
        assert_eq!(order.total(), dec!(10));
        assert!(!order.toggle(rows.get("Fire").unwrap()));
        assert!(order.is_empty());
    }

    #[test]
    fn test_change_due() {
        let rows = rows();
        let mut order = OrderCalculator::default();
        order.toggle(rows.get("Fire").unwrap());
        order.toggle(rows.get("Ice").unwrap());
        order.set_quantity("Ice", 5).unwrap();

        assert_eq!(order.total(), dec!(30));
        assert_eq!(order.change_due(1, dec!(100)), dec!(70));
        assert_eq!(order.change_due(0, dec!(100)), dec!(-30));
    }

    #[test]
    fn test_quantity_that_overflows_total_is_rejected() {
        let huge = Decimal::MAX - dec!(4);
        let rows = rows().set_row_value("Fire", Some(huge)).unwrap();
        let mut order = OrderCalculator::default();
        order.toggle(rows.get("Fire").unwrap());

        assert!(matches!(
            order.set_quantity("Fire", 2),
            Err(Error::Validation(_))
        ));
        assert_eq!(order.lines()[0].quantity, 1);
        assert_eq!(order.total(), huge);
        assert_eq!(order.change_due(u32::MAX, Decimal::MAX), dec!(4));
    }

    #[test]
    fn test_sync_prices_follows_overrides() {
        let rows = rows();
        let mut order = OrderCalculator::default();
        order.toggle(rows.get("Fire").unwrap());

        let rows = rows.set_row_value("Fire", Some(dec!(12))).unwrap();
        order.sync_prices(&rows);
        assert_eq!(order.total(), dec!(12));
    }

    #[test]
    fn test_set_quantity_rejects_zero_and_unknown() {
        let mut order = OrderCalculator::default();
        assert!(matches!(order.set_quantity("Fire", 0), Err(Error::Validation(_))));
        assert!(matches!(order.set_quantity("Fire", 2), Err(Error::NotFound(_))));
    }
}
