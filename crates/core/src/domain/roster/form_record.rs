use crate::domain::sheets::row::Row;

/// One populated row of the form response sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRecord {
    pub row: Row,
    pub submitted_at: Option<String>,
    /// Header → cell value, in sheet column order.
    pub fields: Vec<(String, String)>,
}

impl FormRecord {
    /// Builds a record from a header row and one data row. Short rows are padded
    /// with empty values; cells beyond the header are dropped.
    pub fn from_cells(
        row: Row,
        header: &[String],
        cells: &[String],
        timestamp_column: Option<&str>,
    ) -> Self {
        let fields = header
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let value = cells.get(position).map(|cell| cell.trim()).unwrap_or("");
                (name.clone(), value.to_owned())
            })
            .collect::<Vec<_>>();

        let submitted_at = timestamp_column
            .and_then(|column| lookup(&fields, column))
            .filter(|value| !value.is_empty())
            .map(str::to_owned);

        Self {
            row,
            submitted_at,
            fields,
        }
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        lookup(&self.fields, column)
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

fn lookup<'a>(fields: &'a [(String, String)], column: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(name, _)| name == column)
        .map(|(_, value)| value.as_str())
}
