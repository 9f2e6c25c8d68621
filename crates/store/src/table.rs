use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::error::StoreError;

const REQUIRED_COLUMNS: [&str; 3] = ["url", "title", "body"];

/// Fixed shape of a CSV row; extra columns are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct TableRow {
    pub(crate) url: String,
    pub(crate) title: String,
    pub(crate) body: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub(crate) tag: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Read every data row of the table, preserving file order.
pub(crate) fn read_rows(path: &Path) -> Result<Vec<TableRow>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table_err = |source| StoreError::Table {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let headers = reader.headers().map_err(table_err)?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(StoreError::MissingColumn { column });
        }
    }

    reader
        .deserialize::<TableRow>()
        .map(|row| row.map_err(table_err))
        .collect()
}
