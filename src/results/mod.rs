//! Accumulated upload results and the column schema inferred from them.
//!
//! Every settled upload, successful or not, becomes one [`ResultEntry`]. The
//! table never forgets an entry or a column: columns grow in first-seen
//! order, and every row is projected onto the full current column set, with
//! blanks where an entry's payload lacks a key.

mod cell;

pub use cell::{cell_text, truncate_for_display};

use serde_json::{Map, Value};

/// Open key/value object returned by the backend for one upload. Key order is
/// the order the backend sent them in.
pub type Payload = Map<String, Value>;

/// Fixed first column holding the uploaded file's name.
pub const FILE_NAME_COLUMN: &str = "fileName";

/// Column a payload's own `fileName` key is shown under, so it sits beside
/// the fixed column instead of being hidden by it.
pub const PAYLOAD_FILE_NAME_COLUMN: &str = "payload.fileName";

/// Column a payload key is displayed under.
fn column_for_key(key: &str) -> &str {
    if key == FILE_NAME_COLUMN {
        PAYLOAD_FILE_NAME_COLUMN
    } else {
        key
    }
}

/// Payload key a column reads from. Only the fixed column has no key. A
/// literal `payload.fileName` key shares its column and is read as a fallback.
fn key_for_column(column: &str) -> Option<&str> {
    match column {
        FILE_NAME_COLUMN => None,
        PAYLOAD_FILE_NAME_COLUMN => Some(FILE_NAME_COLUMN),
        other => Some(other),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    file_name: String,
    payload: Payload,
}

impl ResultEntry {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Builds the `{error: <message>}` payload recorded for a failed upload.
    pub fn error_payload(message: impl Into<String>) -> Payload {
        let mut payload = Payload::new();
        payload.insert("error".to_string(), Value::String(message.into()));
        payload
    }
}

/// One render-ready row: a display string for every column, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<(String, String)>,
}

impl TableRow {
    fn project(entry: &ResultEntry, columns: &[String]) -> Self {
        let cells = columns
            .iter()
            .map(|column| {
                let text = match key_for_column(column) {
                    None => entry.file_name.clone(),
                    Some(key) => entry
                        .payload
                        .get(key)
                        .or_else(|| entry.payload.get(column.as_str()))
                        .map(cell_text)
                        .unwrap_or_default(),
                };
                (column.clone(), text)
            })
            .collect();
        Self { cells }
    }

    /// Cell text for `key`, or `None` if the table has no such column.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(column, _)| column == key)
            .map(|(_, text)| text.as_str())
    }

    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, text)| text.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ResultTable {
    entries: Vec<ResultEntry>,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl Default for ResultTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            columns: vec![FILE_NAME_COLUMN.to_string()],
            rows: Vec::new(),
        }
    }

    /// Records one upload result, extends the column schema with any keys not
    /// seen before, and reprojects every row onto the new schema.
    pub fn append(&mut self, file_name: impl Into<String>, payload: Payload) {
        let entry = ResultEntry {
            file_name: file_name.into(),
            payload,
        };

        let before = self.columns.len();
        for key in entry.payload.keys() {
            let name = column_for_key(key);
            if !self.columns.iter().any(|column| column == name) {
                self.columns.push(name.to_string());
            }
        }

        self.entries.push(entry);

        if self.columns.len() != before {
            self.rows = self
                .entries
                .iter()
                .map(|entry| TableRow::project(entry, &self.columns))
                .collect();
            tracing::debug!(columns = ?self.columns, "Result schema grew");
        } else if let Some(entry) = self.entries.last() {
            self.rows.push(TableRow::project(entry, &self.columns));
        }

        tracing::info!(
            file_name = self.entries.last().map(ResultEntry::file_name),
            rows = self.rows.len(),
            "Result recorded"
        );
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z ]{0,8}".prop_map(Value::String),
            prop::collection::vec(any::<i32>(), 0..3).prop_map(Value::from),
        ]
    }

    fn arb_payload() -> impl Strategy<Value = Payload> {
        prop::collection::vec(("[a-e]{1,2}|fileName", arb_value()), 0..5)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    fn arb_appends() -> impl Strategy<Value = Vec<(String, Payload)>> {
        prop::collection::vec(("[a-c]\\.pdf", arb_payload()), 0..12)
    }

    proptest! {
        #[test]
        fn rows_match_appends_in_order(appends in arb_appends()) {
            let mut table = ResultTable::new();
            for (name, payload) in &appends {
                table.append(name.clone(), payload.clone());
            }

            prop_assert_eq!(table.rows().len(), appends.len());
            for (row, (name, _)) in table.rows().iter().zip(&appends) {
                prop_assert_eq!(row.get(FILE_NAME_COLUMN), Some(name.as_str()));
            }
        }

        #[test]
        fn columns_are_unique_first_seen_keys(appends in arb_appends()) {
            let mut table = ResultTable::new();
            let mut expected = vec![FILE_NAME_COLUMN.to_string()];
            for (name, payload) in &appends {
                for key in payload.keys() {
                    let column = column_for_key(key).to_string();
                    if !expected.contains(&column) {
                        expected.push(column);
                    }
                }
                table.append(name.clone(), payload.clone());
            }

            prop_assert_eq!(table.columns(), expected.as_slice());
        }

        #[test]
        fn every_row_covers_every_column(appends in arb_appends()) {
            let mut table = ResultTable::new();
            for (name, payload) in &appends {
                table.append(name.clone(), payload.clone());
            }

            for (row, entry) in table.rows().iter().zip(table.entries()) {
                for column in table.columns() {
                    let text = row.get(column);
                    prop_assert!(text.is_some());
                    match key_for_column(column) {
                        None => prop_assert_eq!(text, Some(entry.file_name())),
                        Some(key) if !entry.payload().contains_key(key) => {
                            prop_assert_eq!(text, Some(""));
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        #[test]
        fn schema_never_shrinks(appends in arb_appends()) {
            let mut table = ResultTable::new();
            for (name, payload) in &appends {
                let before = table.columns().to_vec();
                table.append(name.clone(), payload.clone());
                prop_assert!(table.columns().starts_with(&before));
            }
        }
    }
}
