use std::fmt::Formatter;

/// A worksheet row. Stored zero-based, displayed one-based like the Sheets UI.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row {
    index: u32,
}

impl Row {
    pub fn from_index(index: u32) -> Self {
        Row { index }
    }

    pub fn from_number(number: u32) -> Self {
        Row {
            index: number.saturating_sub(1), // Convert to zero-based index
        }
    }

    /// Returns the one-based row number shown in the spreadsheet.
    ///
    /// # Examples
    /// ```
    /// use roster_sync_core::domain::sheets::row::Row;
    /// assert_eq!(Row::from_index(0).number(), 1);
    /// assert_eq!(Row::from_number(4).number(), 4);
    /// ```
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// The row `count` rows below this one.
    ///
    /// # Examples
    /// ```
    /// use roster_sync_core::domain::sheets::row::Row;
    /// let header = Row::from_number(3);
    /// assert_eq!(header.offset(1), Row::from_number(4));
    /// ```
    pub fn offset(&self, count: usize) -> Row {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        Row::from_index(self.index.saturating_add(count))
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row(index: {}, number: {})", self.index(), self.number())
    }
}
