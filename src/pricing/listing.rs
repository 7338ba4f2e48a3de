//! Trade listing text.

use super::ClassifiedRow;
use rust_decimal::Decimal;
use std::fmt::Write;
use thiserror::Error;

/// Why a listing could not be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("No compasses selected. Select some rows from tabs with compasses.")]
    NoRowsSelected,
    #[error("No IGN set. Set it with :ign <name>.")]
    MissingDisplayName,
    #[error("Divine price is not set. Set it with :divine <chaos>.")]
    MissingDivinePrice,
}

/// Inputs that are not rows.
#[derive(Debug, Clone, Copy)]
pub struct ListingRequest<'a> {
    /// Leading header segment, e.g. `WTS Softcore Compasses`.
    pub title: &'a str,
    /// Seller's in-game name.
    pub display_name: Option<&'a str>,
    /// Chaos per divine.
    pub divine_price: Option<Decimal>,
}

/// Render the listing for `rows`.
///
/// Preconditions are checked before anything is written, in the order
/// rows, name, divine price.
pub fn format_listing<'r, I>(rows: I, request: ListingRequest<'_>) -> Result<String, ListingError>
where
    I: IntoIterator<Item = &'r ClassifiedRow>,
{
    let mut rows: Vec<&ClassifiedRow> = rows.into_iter().collect();
    if rows.is_empty() {
        return Err(ListingError::NoRowsSelected);
    }
    let name = request
        .display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ListingError::MissingDisplayName)?;
    let rate = request
        .divine_price
        .filter(|p| *p > Decimal::ZERO)
        .ok_or(ListingError::MissingDivinePrice)?;

    rows.sort_by(|a, b| a.name().cmp(b.name()));

    let mut text = format!(
        "{} | IGN: {} | :divine: = {} :chaos:\n",
        request.title,
        name,
        rate.normalize()
    );
    for row in rows {
        // Writing to a String cannot fail.
        let _ = writeln!(
            text,
            "{}x {} {}c / each ({} all)",
            row.quantity(),
            row.name(),
            row.effective_price().normalize(),
            format_total(row.total_value(), rate)
        );
    }
    Ok(text)
}

/// `"{n}div + {rest}c"` once the total reaches a divine, else `"{total}c"`.
pub fn format_total(total: Decimal, divine_price: Decimal) -> String {
    if divine_price > Decimal::ZERO && total >= divine_price {
        let divines = (total / divine_price).floor();
        let chaos = total % divine_price;
        format!("{}div + {}c", divines.normalize(), chaos.normalize())
    } else {
        format!("{}c", total.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{ClassifiedItem, Overrides, PriceEntry, PriceSnapshot, PricedRows};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const TITLE: &str = "WTS Softcore Compasses";

    fn request(name: Option<&str>, rate: Option<Decimal>) -> ListingRequest<'_> {
        ListingRequest {
            title: TITLE,
            display_name: name,
            divine_price: rate,
        }
    }

    #[test]
    fn test_single_row_under_one_divine() {
        let feed =
            PriceSnapshot::new(None, vec![PriceEntry::new("A", dec!(2.5), dec!(0))]).unwrap();
        let items = [ClassifiedItem::new("A", ""), ClassifiedItem::new("A", "")];
        let rows = PricedRows::aggregate(&items, &feed, &Overrides::new());

        let text = format_listing(rows.iter(), request(Some("Bob"), Some(dec!(10)))).unwrap();
        assert_eq!(
            text,
            "WTS Softcore Compasses | IGN: Bob | :divine: = 10 :chaos:\n2x A 2.5c / each (5c all)\n"
        );
    }

    #[test]
    fn test_rows_sorted_by_name_and_divine_split() {
        let rows = vec![
            ClassifiedRow::new("Zeta", "", dec!(250), None),
            ClassifiedRow::new("Alpha", "", dec!(3), Some(dec!(4))),
        ];
        let text = format_listing(&rows, request(Some("Bob"), Some(dec!(100)))).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1x Alpha 4c / each (4c all)");
        assert_eq!(lines[2], "1x Zeta 250c / each (2div + 50c all)");
    }

    #[test]
    fn test_total_equal_to_rate_is_one_divine() {
        assert_eq!(format_total(dec!(180), dec!(180)), "1div + 0c");
        assert_eq!(format_total(dec!(179), dec!(180)), "179c");
    }

    #[test]
    fn test_preconditions_have_distinct_errors() {
        let row = ClassifiedRow::new("A", "", dec!(1), None);
        let empty: Vec<ClassifiedRow> = Vec::new();

        assert_eq!(
            format_listing(&empty, request(Some("Bob"), Some(dec!(10)))),
            Err(ListingError::NoRowsSelected)
        );
        assert_eq!(
            format_listing([&row], request(None, Some(dec!(10)))),
            Err(ListingError::MissingDisplayName)
        );
        assert_eq!(
            format_listing([&row], request(Some("   "), Some(dec!(10)))),
            Err(ListingError::MissingDisplayName)
        );
        assert_eq!(
            format_listing([&row], request(Some("Bob"), None)),
            Err(ListingError::MissingDivinePrice)
        );
        assert_eq!(
            format_listing([&row], request(Some("Bob"), Some(dec!(0)))),
            Err(ListingError::MissingDivinePrice)
        );
    }
}
