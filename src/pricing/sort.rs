//! Row sorting.

use super::ClassifiedRow;
use std::cmp::Ordering;

/// Column a row list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    Quantity,
    /// Custom price if set, else feed price.
    Price,
    TotalValue,
}

impl SortField {
    /// Direction used when switching to this field.
    pub fn default_direction(self) -> SortDirection {
        match self {
            Self::Name => SortDirection::Ascending,
            Self::Quantity | Self::Price | Self::TotalValue => SortDirection::Descending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Quantity => "Qty",
            Self::Price => "Price",
            Self::TotalValue => "Total",
        }
    }

    fn compare(self, a: &ClassifiedRow, b: &ClassifiedRow) -> Ordering {
        match self {
            Self::Name => a.name().cmp(b.name()),
            Self::Quantity => a.quantity().cmp(&b.quantity()),
            Self::Price => a.effective_price().cmp(&b.effective_price()),
            Self::TotalValue => a.total_value().cmp(&b.total_value()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// The sort the user last asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    field: Option<SortField>,
    direction: SortDirection,
}

impl SortState {
    /// Choose `field`: flips direction when it is already active, otherwise
    /// switches to the field's default direction.
    pub fn toggle(&mut self, field: SortField) -> SortDirection {
        self.direction = if self.field == Some(field) {
            self.direction.toggled()
        } else {
            field.default_direction()
        };
        self.field = Some(field);
        self.direction
    }

    /// Active field and direction, if a sort has been requested.
    pub fn current(&self) -> Option<(SortField, SortDirection)> {
        self.field.map(|f| (f, self.direction))
    }

    /// Arrow to draw next to a column header.
    pub fn indicator(&self, field: SortField) -> &'static str {
        match self.current() {
            Some((f, dir)) if f == field => dir.arrow(),
            _ => "",
        }
    }
}

/// Stable sort: rows that compare equal keep their relative order in
/// both directions.
pub fn sort_rows(rows: &mut [ClassifiedRow], field: SortField, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = field.compare(a, b);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}
