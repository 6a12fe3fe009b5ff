use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – delimited text, header row defines column names
/// * `.json`    – records-oriented array: `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat table of scalar columns
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Cell inference and column classification
// ---------------------------------------------------------------------------

/// Interpret one raw text cell: integer, then float, then bool, else text.
/// Empty cells are missing.
pub fn infer_cell(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

/// Classify a whole column from its parsed cells.
///
/// * every non-missing cell an integer → `Integer`
/// * every non-missing cell integer or float → `Float`
/// * anything else (text, bool, mixed, all-missing) → `Other`
pub fn classify_column(values: &[CellValue]) -> ColumnKind {
    let mut saw_numeric = false;
    let mut all_integer = true;

    for v in values {
        match v {
            CellValue::Null => {}
            CellValue::Integer(_) => saw_numeric = true,
            CellValue::Float(_) => {
                saw_numeric = true;
                all_integer = false;
            }
            _ => return ColumnKind::Other,
        }
    }

    if !saw_numeric {
        ColumnKind::Other
    } else if all_integer {
        ColumnKind::Integer
    } else {
        ColumnKind::Float
    }
}

fn build_table(names: Vec<String>, mut cells: Vec<Vec<CellValue>>) -> Result<Table> {
    let columns: Vec<Column> = names
        .into_iter()
        .zip(cells.drain(..))
        .map(|(name, values)| {
            let kind = classify_column(&values);
            Column::new(name, kind, values)
        })
        .collect();
    Table::new(columns).context("assembling table")
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    parse_csv(file)
}

/// Parse CSV from any reader.  Header row names the columns; each cell is
/// inferred, then each column is classified into a typed schema.
pub fn parse_csv<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: has {} fields, expected {}",
                record.len(),
                headers.len()
            );
        }
        for (col_idx, value) in record.iter().enumerate() {
            cells[col_idx].push(infer_cell(value));
        }
    }

    build_table(headers, cells)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "age": 30, "name": "Alice", "score": 1.5 },
///   { "age": 25, "name": "Bob" }
/// ]
/// ```
///
/// Columns appear in first-seen order; keys absent from a record are missing.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    // First pass: validate records and collect column names in first-seen order.
    let mut names: Vec<String> = Vec::new();
    let mut objs = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        objs.push(obj);
    }

    // Second pass: fill cells, Null where a record lacks the key.
    let mut cells: Vec<Vec<CellValue>> = vec![Vec::with_capacity(objs.len()); names.len()];
    for obj in &objs {
        for (col_idx, name) in names.iter().enumerate() {
            let value = obj.get(name).map_or(CellValue::Null, json_to_cell);
            cells[col_idx].push(value);
        }
    }

    build_table(names, cells)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a flat table of scalar columns.
/// The column kind comes from the declared Arrow type rather than inference.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut names: Vec<String> = Vec::new();
    let mut kinds: Vec<ColumnKind> = Vec::new();
    let mut cells: Vec<Vec<CellValue>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        if names.is_empty() {
            for field in schema.fields() {
                names.push(field.name().clone());
                kinds.push(arrow_kind(field.data_type()));
                cells.push(Vec::new());
            }
        }

        for (col_idx, col) in batch.columns().iter().enumerate() {
            for row in 0..batch.num_rows() {
                cells[col_idx].push(extract_cell(col, row));
            }
        }
    }

    if names.is_empty() {
        bail!("Parquet file contains no columns");
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(kinds)
        .zip(cells.drain(..))
        .map(|((name, kind), values)| Column::new(name, kind, values))
        .collect();
    Table::new(columns).context("assembling table")
}

fn arrow_kind(dt: &DataType) -> ColumnKind {
    match dt {
        DataType::Float32 | DataType::Float64 => ColumnKind::Float,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnKind::Integer,
        _ => ColumnKind::Other,
    }
}

/// Extract a single scalar value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::Text(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        _ => CellValue::Text(format!("{:?}", col.data_type())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_cell_recognises_each_kind() {
        assert_eq!(infer_cell(""), CellValue::Null);
        assert_eq!(infer_cell("42"), CellValue::Integer(42));
        assert_eq!(infer_cell("-3"), CellValue::Integer(-3));
        assert_eq!(infer_cell("2.5"), CellValue::Float(2.5));
        assert_eq!(infer_cell("true"), CellValue::Bool(true));
        assert_eq!(infer_cell("hello"), CellValue::Text("hello".to_string()));
    }

    #[test]
    fn classify_column_kinds() {
        assert_eq!(
            classify_column(&[CellValue::Integer(1), CellValue::Integer(2)]),
            ColumnKind::Integer
        );
        assert_eq!(
            classify_column(&[CellValue::Integer(1), CellValue::Float(2.5)]),
            ColumnKind::Float
        );
        assert_eq!(
            classify_column(&[CellValue::Integer(1), CellValue::Null]),
            ColumnKind::Integer
        );
        assert_eq!(
            classify_column(&[CellValue::Integer(1), CellValue::Text("x".into())]),
            ColumnKind::Other
        );
        assert_eq!(
            classify_column(&[CellValue::Bool(true)]),
            ColumnKind::Other
        );
        assert_eq!(classify_column(&[CellValue::Null]), ColumnKind::Other);
        assert_eq!(classify_column(&[]), ColumnKind::Other);
    }

    #[test]
    fn parse_csv_builds_typed_schema() {
        let csv = "name,age,score\nAlice,30,95.5\nBob,25,87.0\nCharlie,,92.1\n";
        let table = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 3);
        assert_eq!(table.column("name").unwrap().kind, ColumnKind::Other);
        assert_eq!(table.column("age").unwrap().kind, ColumnKind::Integer);
        assert_eq!(table.column("score").unwrap().kind, ColumnKind::Float);
        assert_eq!(table.column("age").unwrap().missing_count(), 1);
    }

    #[test]
    fn parse_csv_rejects_ragged_rows() {
        let csv = "a,b\n1,2\n3\n";
        assert!(parse_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn parse_csv_string_only_table_has_empty_numeric_view() {
        let csv = "id,name\nu1,Alice\nu2,Bob\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert!(table.numeric_view().is_empty());
    }

    #[test]
    fn parse_json_backfills_missing_keys() {
        let json = r#"[
            {"age": 30, "name": "Alice"},
            {"age": 25, "name": "Bob", "score": 1.5}
        ]"#;
        let table = parse_json(json).unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("score").unwrap().values[0], CellValue::Null);
        assert_eq!(table.column("score").unwrap().kind, ColumnKind::Float);
        // First-seen column order.
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["age", "name", "score"]);
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        assert!(load_file(Path::new("data.xlsx")).is_err());
    }
}
