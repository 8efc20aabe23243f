//! CSV dataset loader.
//!
//! Reads a delimited text file with a header row into a [`Table`]. Column
//! types are inferred: a column is numeric when every non-empty cell parses
//! as a number and at least one cell is non-empty.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use super::{Column, ColumnType, Table, Value};

/// Load a CSV file from disk.
pub fn load_csv(path: &Path) -> Result<Table> {
    let file = File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    read_csv(file).with_context(|| format!("failed to read dataset {}", path.display()))
}

/// Read CSV data from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        anyhow::bail!("CSV has no columns");
    }

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV record {}", line + 1))?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.clone(), infer_type(&raw_rows, i)))
        .collect();

    let rows = raw_rows
        .iter()
        .map(|raw| {
            columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    raw.get(i)
                        .map(|cell| Value::parse(cell, col.column_type))
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn infer_type(rows: &[Vec<String>], idx: usize) -> ColumnType {
    let mut saw_value = false;
    for cell in rows.iter().filter_map(|r| r.get(idx)) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        if cell.parse::<f64>().is_err() {
            return ColumnType::Text;
        }
        saw_value = true;
    }
    if saw_value {
        ColumnType::Number
    } else {
        ColumnType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_numeric_and_text_columns() {
        let csv = "Launch Site,Payload Mass (kg),class\nCCAFS LC-40,0,0\nVAFB SLC-4E,500.5,1\n";
        let table = read_csv(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns()[0].column_type, ColumnType::Text);
        assert_eq!(table.columns()[1].column_type, ColumnType::Number);
        assert_eq!(table.rows()[1][1], Value::Number(500.5));
    }

    #[test]
    fn empty_cells_become_null() {
        let csv = "a,b\n1,\n2,x\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0][1], Value::Null);
        assert_eq!(table.columns()[1].column_type, ColumnType::Text);
    }

    #[test]
    fn all_empty_column_is_text() {
        let csv = "a,b\n1,\n2,\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.columns()[1].column_type, ColumnType::Text);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to open dataset"));
    }

    #[test]
    fn header_only_file_loads_as_empty_table() {
        let table = read_csv("x,y\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 2);
    }
}
