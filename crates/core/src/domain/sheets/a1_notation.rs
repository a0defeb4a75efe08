use std::fmt::Formatter;

use super::{cell_position::CellPosition, column::Column, row::Row};

/// Last column covered by open-ended reads. Matches the widest management sheet we expect.
pub const LAST_READ_COLUMN: &str = "ZZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

/// Quotes a worksheet title for use in a range, doubling embedded apostrophes.
///
/// # Examples
/// ```
/// use roster_sync_core::domain::sheets::a1_notation::quote_sheet_title;
/// assert_eq!(quote_sheet_title("Form Responses 1"), "'Form Responses 1'");
/// assert_eq!(quote_sheet_title("Kim's"), "'Kim''s'");
/// ```
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn with_sheet(sheet_name: Option<&str>, local: String) -> A1Notation {
    match sheet_name {
        Some(sheet_name) => A1Notation(format!("{}!{}", quote_sheet_title(sheet_name), local)),
        None => A1Notation(local),
    }
}

impl ToA1Notation for CellPosition {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        with_sheet(sheet_name, format!("{}{}", self.col, self.row))
    }
}

/// A block of cells: `start` plus a size. Height zero is rendered as a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBlock {
    pub start: CellPosition,
    pub width: usize,
    pub height: usize,
}

impl ToA1Notation for CellBlock {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        let end_col = Column::from_position(self.start.col.position() + self.width.max(1) - 1);
        let end_row = self.start.row.offset(self.height.max(1) - 1);
        with_sheet(
            sheet_name,
            format!("{}{}:{}{}", self.start.col, self.start.row, end_col, end_row),
        )
    }
}

/// Every row from `first_row` downwards, columns `A` to [`LAST_READ_COLUMN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsFrom(pub Row);

impl ToA1Notation for RowsFrom {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        with_sheet(sheet_name, format!("A{}:{}", self.0, LAST_READ_COLUMN))
    }
}
