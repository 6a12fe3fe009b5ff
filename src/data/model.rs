use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common tabular dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the cell as an `f64` for numeric computation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – declared kind of a whole column
// ---------------------------------------------------------------------------

/// Declared kind of a column, fixed at load time by schema classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Float,
    Integer,
    /// Anything non-numeric: text, booleans, mixed content, all-missing.
    Other,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Float | ColumnKind::Integer)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Float => write!(f, "float"),
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Number of missing (null) cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Cell values as `f64`, `None` where the cell is missing or non-numeric.
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(CellValue::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
#[error("column '{column}' has {actual} rows, expected {expected}")]
pub struct ColumnLengthMismatch {
    pub column: String,
    pub expected: usize,
    pub actual: usize,
}

/// An ordered sequence of named columns with a rectangular set of rows.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, enforcing that every column has the same row count.
    pub fn new(columns: Vec<Column>) -> Result<Self, ColumnLengthMismatch> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        for col in &columns {
            if col.values.len() != n_rows {
                return Err(ColumnLengthMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    actual: col.values.len(),
                });
            }
        }
        Ok(Table { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// One full row of cells, in column order.
    pub fn row(&self, idx: usize) -> Vec<CellValue> {
        self.columns
            .iter()
            .map(|c| c.values[idx].clone())
            .collect()
    }

    /// Replace the column with the same name, or append a new one.
    /// The session layer's single mutation (anomaly label column).
    pub fn set_column(&mut self, column: Column) -> Result<(), ColumnLengthMismatch> {
        if column.values.len() != self.n_rows {
            return Err(ColumnLengthMismatch {
                column: column.name.clone(),
                expected: self.n_rows,
                actual: column.values.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Borrowed view over the numeric columns, recomputed per operation.
    pub fn numeric_view(&self) -> NumericView<'_> {
        NumericView {
            columns: self
                .columns
                .iter()
                .filter(|c| c.kind.is_numeric())
                .collect(),
            n_rows: self.n_rows,
        }
    }
}

// ---------------------------------------------------------------------------
// NumericView – the numeric subset of a table
// ---------------------------------------------------------------------------

/// The subset of a table's columns whose kind is numeric.
#[derive(Debug)]
pub struct NumericView<'a> {
    columns: Vec<&'a Column>,
    n_rows: usize,
}

impl<'a> NumericView<'a> {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of numeric columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn columns(&self) -> &[&'a Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Cell value at (row, numeric column), `None` when missing.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.columns[col].values[row].as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_col(name: &str, values: &[i64]) -> Column {
        Column::new(
            name,
            ColumnKind::Integer,
            values.iter().map(|&v| CellValue::Integer(v)).collect(),
        )
    }

    fn text_col(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            ColumnKind::Other,
            values.iter().map(|s| CellValue::Text(s.to_string())).collect(),
        )
    }

    #[test]
    fn table_enforces_equal_row_counts() {
        let err = Table::new(vec![int_col("a", &[1, 2, 3]), int_col("b", &[1, 2])]);
        assert!(err.is_err());
    }

    #[test]
    fn numeric_view_selects_numeric_columns_only() {
        let table = Table::new(vec![
            int_col("a", &[1, 2]),
            text_col("name", &["x", "y"]),
            Column::new(
                "b",
                ColumnKind::Float,
                vec![CellValue::Float(0.5), CellValue::Null],
            ),
        ])
        .unwrap();

        let view = table.numeric_view();
        assert_eq!(view.width(), 2);
        assert_eq!(view.names(), vec!["a", "b"]);
        assert_eq!(view.value(0, 0), Some(1.0));
        assert_eq!(view.value(1, 1), None);
    }

    #[test]
    fn set_column_replaces_by_name() {
        let mut table = Table::new(vec![int_col("a", &[1, 2])]).unwrap();
        table
            .set_column(text_col("label", &["normal", "anomaly"]))
            .unwrap();
        assert_eq!(table.n_cols(), 2);

        // Re-running must replace, not duplicate.
        table
            .set_column(text_col("label", &["normal", "normal"]))
            .unwrap();
        assert_eq!(table.n_cols(), 2);
        assert_eq!(
            table.column("label").unwrap().values[1],
            CellValue::Text("normal".to_string())
        );

        let err = table.set_column(text_col("label", &["normal"]));
        assert!(err.is_err());
    }

    #[test]
    fn row_returns_cells_in_column_order() {
        let table = Table::new(vec![int_col("a", &[1, 2]), text_col("s", &["x", "y"])]).unwrap();
        assert_eq!(
            table.row(1),
            vec![CellValue::Integer(2), CellValue::Text("y".to_string())]
        );
    }

    #[test]
    fn missing_count_counts_nulls() {
        let col = Column::new(
            "c",
            ColumnKind::Float,
            vec![CellValue::Float(1.0), CellValue::Null, CellValue::Null],
        );
        assert_eq!(col.missing_count(), 2);
    }
}
