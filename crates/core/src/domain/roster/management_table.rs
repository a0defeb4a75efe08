use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::{normalized_record::NormalizedRecord, unit_key::UnitKey};
use crate::domain::sheets::row::Row;

/// Format of the update timestamp column.
pub const UPDATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Positions (zero-based, within the header row) of the columns this job owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementLayout {
    pub building: usize,
    pub unit: usize,
    pub updated_at: Option<usize>,
    pub targets: BTreeMap<String, usize>,
}

impl ManagementLayout {
    /// Every owned column position, sorted and without duplicates.
    pub fn owned_positions(&self) -> Vec<usize> {
        let mut positions = vec![self.building, self.unit];
        positions.extend(self.updated_at);
        positions.extend(self.targets.values().copied());
        positions.sort_unstable();
        positions.dedup();
        positions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// New value of one owned cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub row: Row,
    /// Zero-based position within the header row.
    pub column: usize,
    pub value: String,
}

/// In-memory copy of the management sheet's data rows, indexed by [`UnitKey`].
///
/// Only cells changed by [`upsert`](ManagementTable::upsert) are reported back
/// through [`changes`](ManagementTable::changes); every other cell keeps
/// whatever the sheet holds, formulas included.
#[derive(Debug, Clone)]
pub struct ManagementTable {
    width: usize,
    first_data_row: Row,
    layout: ManagementLayout,
    rows: Vec<Vec<String>>,
    index: HashMap<UnitKey, usize>,
    duplicates: Vec<(UnitKey, Row)>,
    /// `(row position, column position)` of every changed cell.
    dirty: BTreeSet<(usize, usize)>,
}

impl ManagementTable {
    pub fn new(
        width: usize,
        first_data_row: Row,
        layout: ManagementLayout,
        rows: Vec<Vec<String>>,
    ) -> Self {
        let width = width.max(layout.owned_positions().last().map_or(0, |last| last + 1));
        let rows = rows
            .into_iter()
            .map(|mut cells| {
                if cells.len() < width {
                    cells.resize(width, String::new());
                }
                cells
            })
            .collect::<Vec<_>>();

        let mut index = HashMap::new();
        let mut duplicates = Vec::new();
        for (position, cells) in rows.iter().enumerate() {
            let Ok(key) = UnitKey::parse(&cells[layout.building], &cells[layout.unit]) else {
                continue;
            };
            if index.contains_key(&key) {
                duplicates.push((key, first_data_row.offset(position)));
            } else {
                index.insert(key, position);
            }
        }

        Self {
            width,
            first_data_row,
            layout,
            rows,
            index,
            duplicates,
            dirty: BTreeSet::new(),
        }
    }

    /// Number of data rows, including rows without a key.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of distinct units.
    pub fn unit_count(&self) -> usize {
        self.index.len()
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Keys that appeared more than once when the sheet was read. Only the first
    /// occurrence is ever updated.
    pub fn duplicates(&self) -> &[(UnitKey, Row)] {
        &self.duplicates
    }

    /// Changed cells, ordered by row then column.
    pub fn changes(&self) -> Vec<CellChange> {
        self.dirty
            .iter()
            .map(|&(position, column)| CellChange {
                row: self.first_data_row.offset(position),
                column,
                value: self.rows[position][column].clone(),
            })
            .collect()
    }

    /// Inserts or updates the row for `record.key`.
    ///
    /// The update timestamp moves to `now` only when a value actually changes,
    /// which keeps repeated runs over the same responses idempotent.
    pub fn upsert(&mut self, record: &NormalizedRecord, now: DateTime<Utc>) -> UpsertOutcome {
        let (position, inserted) = match self.index.get(&record.key) {
            Some(&position) => (position, false),
            None => {
                let mut cells = vec![String::new(); self.width];
                cells[self.layout.building] = record.key.building().to_string();
                cells[self.layout.unit] = record.key.unit().to_string();
                self.rows.push(cells);
                let position = self.rows.len() - 1;
                self.index.insert(record.key, position);
                (position, true)
            }
        };

        let mut touched = Vec::new();
        if inserted {
            touched.extend([self.layout.building, self.layout.unit]);
        }

        let cells = &mut self.rows[position];
        for field in &record.fields {
            let Some(&column) = self.layout.targets.get(&field.target) else {
                continue;
            };
            let merged = field.policy.merge(&cells[column], &field.value);
            if merged != cells[column] {
                cells[column] = merged;
                touched.push(column);
            }
        }

        if touched.is_empty() {
            return UpsertOutcome::Unchanged;
        }

        if let Some(column) = self.layout.updated_at {
            cells[column] = now.format(UPDATED_AT_FORMAT).to_string();
            touched.push(column);
        }
        self.dirty
            .extend(touched.into_iter().map(|column| (position, column)));

        if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::roster::{MappedField, MergePolicy};
    use chrono::TimeZone;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn layout() -> ManagementLayout {
        ManagementLayout {
            building: 0,
            unit: 1,
            updated_at: Some(4),
            targets: BTreeMap::from([("이름".to_string(), 2), ("카페 닉네임".to_string(), 3)]),
        }
    }

    // 동, 호수, 이름, 카페 닉네임, 갱신, 비고
    fn table(rows: Vec<Vec<String>>) -> ManagementTable {
        ManagementTable::new(6, Row::from_number(4), layout(), rows)
    }

    fn record(building: u32, unit: u32, name: &str, nick: &str) -> NormalizedRecord {
        NormalizedRecord {
            key: UnitKey::new(building, unit),
            source_row: Row::from_number(2),
            submitted_at: None,
            fields: vec![
                MappedField {
                    target: "이름".to_string(),
                    value: name.to_string(),
                    policy: MergePolicy::LastWriteWins,
                },
                MappedField {
                    target: "카페 닉네임".to_string(),
                    value: nick.to_string(),
                    policy: MergePolicy::Union,
                },
            ],
        }
    }

    fn change(row: u32, column: usize, value: &str) -> CellChange {
        CellChange {
            row: Row::from_number(row),
            column,
            value: value.to_string(),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_insert_into_empty_table() {
        let mut table = table(vec![]);
        let outcome = table.upsert(&record(101, 203, "Kim", "kim01"), at(0));
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(table.unit_count(), 1);
        assert_eq!(
            table.changes(),
            vec![
                change(4, 0, "101"),
                change(4, 1, "203"),
                change(4, 2, "Kim"),
                change(4, 3, "kim01"),
                change(4, 4, "2025-03-01 00:00:00"),
            ]
        );
    }

    #[test]
    fn test_update_changes_values_and_timestamp() {
        let mut table = table(vec![strings(&["101", "203", "Kim", "a", "2025-01-01 00:00:00", "memo"])]);
        let outcome = table.upsert(&record(101, 203, "Lee", "b"), at(5));
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(
            table.changes(),
            vec![
                change(4, 2, "Lee"),
                change(4, 3, "a, b"),
                change(4, 4, "2025-03-01 05:00:00"),
            ]
        );
        assert_eq!(table.rows[0][5], "memo");
    }

    #[test]
    fn test_only_changed_cells_are_reported() {
        let mut table = table(vec![
            strings(&["101", "1", "Kim", "010-1", "", "memo"]),
            strings(&["102", "1", "Lee", "=SUM(1,2)", "", ""]),
        ]);
        table.upsert(&record(101, 1, "Kim", "kim"), at(1));

        let changes = table.changes();
        assert_eq!(changes, vec![change(4, 3, "010-1, kim"), change(4, 4, "2025-03-01 01:00:00")]);
        assert!(changes.iter().all(|change| change.row != Row::from_number(5)));
    }

    #[test]
    fn test_same_values_leave_row_unchanged() {
        let mut table = table(vec![strings(&["101", "203", "Kim", "a", "2025-01-01 00:00:00"])]);
        let outcome = table.upsert(&record(101, 203, "Kim", "a"), at(5));
        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert!(!table.has_changes());
        assert!(table.changes().is_empty());
    }

    #[test]
    fn test_existing_key_is_matched_after_canonicalization() {
        let mut table = table(vec![strings(&["0101동", "203호", "", ""])]);
        assert_eq!(table.upsert(&record(101, 203, "Kim", ""), at(1)), UpsertOutcome::Updated);
        assert_eq!(table.row_count(), 1);
        // Existing key cells keep their spelling and are not rewritten.
        assert_eq!(table.rows[0][0], "0101동");
        assert!(table.changes().iter().all(|change| change.column > 1));
    }

    #[test]
    fn test_rows_without_key_are_preserved() {
        let mut table = table(vec![strings(&["", "", "", "", "", "합계"]), strings(&["102", "1"])]);
        assert_eq!(table.unit_count(), 1);
        table.upsert(&record(103, 7, "Park", ""), at(2));
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0][5], "합계");
        assert!(table.changes().iter().all(|change| change.row == Row::from_number(6)));
    }

    #[test]
    fn test_duplicate_keys_keep_first_occurrence() {
        let mut table = table(vec![strings(&["101", "1", "first"]), strings(&["101", "1", "second"])]);
        assert_eq!(table.duplicates(), &[(UnitKey::new(101, 1), Row::from_number(5))]);
        table.upsert(&record(101, 1, "new", ""), at(3));
        assert_eq!(table.rows[0][2], "new");
        assert_eq!(table.rows[1][2], "second");
    }

    #[test]
    fn test_short_header_still_fits_owned_columns() {
        let mut table = ManagementTable::new(2, Row::from_number(4), layout(), vec![]);
        table.upsert(&record(101, 1, "Kim", ""), at(0));
        assert_eq!(table.rows[0].len(), 5);
    }

    #[test]
    fn test_layout_owned_positions() {
        assert_eq!(layout().owned_positions(), vec![0, 1, 2, 3, 4]);
    }
}
