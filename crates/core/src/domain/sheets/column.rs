use std::fmt::Formatter;

/// A one-based worksheet column (`A` = 1).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(u32);

impl Column {
    /// Column for a zero-based position inside a header row.
    pub fn from_position(position: usize) -> Self {
        Column(u32::try_from(position).unwrap_or(u32::MAX - 1) + 1)
    }

    /// Zero-based position inside a row of cells.
    pub fn position(&self) -> usize {
        self.0.saturating_sub(1) as usize
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", number_to_letters(self.0))
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(u32: {}, letters: {})", self.0, self)
    }
}

fn number_to_letters(number: u32) -> String {
    let mut number = number.max(1);
    let mut result = Vec::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        result.push((remainder as u8 + b'A') as char);
        number = (number - remainder) / 26;
    }
    result.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_on_boundaries() {
        for (value, letters) in [(1, "A"), (26, "Z"), (27, "AA"), (52, "AZ"), (53, "BA"), (703, "AAA")] {
            assert_eq!(Column(value).to_string(), letters);
        }
    }

    #[test]
    fn test_from_position() {
        assert_eq!(Column::from_position(0).to_string(), "A");
        assert_eq!(Column::from_position(10).to_string(), "K");
        assert_eq!(Column::from_position(10).position(), 10);
    }
}
