use crate::analysis::summary::Histogram;
use crate::data::model::{NumericView, Table};

// ---------------------------------------------------------------------------
// CorrelationMatrix
// ---------------------------------------------------------------------------

/// Square matrix of Pearson coefficients among the numeric columns.
/// Symmetric, unit diagonal; NaN where a pair has no variance.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute the matrix over pairwise-complete observations: for each pair
    /// of columns only the rows where both cells are present contribute.
    pub fn compute(view: &NumericView<'_>) -> Self {
        let p = view.width();
        let mut values = vec![vec![f64::NAN; p]; p];

        for i in 0..p {
            values[i][i] = 1.0;
            for j in (i + 1)..p {
                let mut xs = Vec::new();
                let mut ys = Vec::new();
                for row in 0..view.n_rows() {
                    if let (Some(x), Some(y)) = (view.value(row, i), view.value(row, j)) {
                        xs.push(x);
                        ys.push(y);
                    }
                }
                let r = pearson(&xs, &ys);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            columns: view.names(),
            values,
        }
    }

    /// Number of numeric columns (matrix is len × len).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Pearson linear-correlation coefficient of two equally long series.
/// NaN when fewer than two observations or when either side has no variance.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut numerator = 0.0;
    let mut ss_x = 0.0;
    let mut ss_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        numerator += dx * dy;
        ss_x += dx * dx;
        ss_y += dy * dy;
    }

    let denominator = (ss_x * ss_y).sqrt();
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

// ---------------------------------------------------------------------------
// correlate – pairwise visualization data
// ---------------------------------------------------------------------------

/// One panel of the pairplot grid: scatter off the diagonal, histogram on it.
#[derive(Debug)]
pub enum PairPanel {
    Scatter {
        x_column: String,
        y_column: String,
        /// Rows where both cells are present.
        points: Vec<[f64; 2]>,
    },
    Histogram(Histogram),
}

#[derive(Debug)]
pub struct CorrelationReport {
    pub matrix: CorrelationMatrix,
    /// Formatted coefficient per matrix cell, row-major (heatmap annotations).
    pub annotations: Vec<Vec<String>>,
    /// Row-major p × p pairplot grid.
    pub grid: Vec<PairPanel>,
}

#[derive(Debug)]
pub enum CorrelationOutcome {
    /// The table has no numeric columns, so there is nothing to visualise.
    NoNumericColumns,
    Correlation(CorrelationReport),
}

/// Pairwise relationship data over the numeric columns: scatter series for
/// every pair plus the correlation matrix as annotated heatmap data.
pub fn correlate(table: &Table) -> CorrelationOutcome {
    let view = table.numeric_view();
    if view.is_empty() {
        return CorrelationOutcome::NoNumericColumns;
    }

    let matrix = CorrelationMatrix::compute(&view);
    let p = view.width();

    let annotations = (0..p)
        .map(|i| (0..p).map(|j| format!("{:.2}", matrix.get(i, j))).collect())
        .collect();

    let mut grid = Vec::with_capacity(p * p);
    for i in 0..p {
        for j in 0..p {
            if i == j {
                let values: Vec<f64> = view.columns()[i]
                    .numeric_values()
                    .into_iter()
                    .flatten()
                    .collect();
                grid.push(PairPanel::Histogram(Histogram::compute(
                    &view.columns()[i].name,
                    &values,
                )));
            } else {
                let mut points = Vec::new();
                for row in 0..view.n_rows() {
                    if let (Some(x), Some(y)) = (view.value(row, j), view.value(row, i)) {
                        points.push([x, y]);
                    }
                }
                grid.push(PairPanel::Scatter {
                    x_column: view.columns()[j].name.clone(),
                    y_column: view.columns()[i].name.clone(),
                    points,
                });
            }
        }
    }

    CorrelationOutcome::Correlation(CorrelationReport {
        matrix,
        annotations,
        grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    #[test]
    fn perfectly_correlated_columns_score_one() {
        let csv = "a,b,c\n1,2,3\n2,4,2\n3,6,1\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let matrix = CorrelationMatrix::compute(&table.numeric_view());

        assert!((matrix.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((matrix.get(0, 2) + 1.0).abs() < 1e-12);
        assert_eq!(matrix.get(1, 0), matrix.get(0, 1));
        assert_eq!(matrix.get(0, 0), 1.0);
    }

    #[test]
    fn constant_column_yields_nan_off_diagonal() {
        let csv = "a,b\n1,5\n2,5\n3,5\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let matrix = CorrelationMatrix::compute(&table.numeric_view());

        assert!(matrix.get(0, 1).is_nan());
        assert_eq!(matrix.get(1, 1), 1.0);
    }

    #[test]
    fn pairwise_complete_rows_only() {
        // Row with a missing `b` must not contribute to the (a, b) pair.
        let csv = "a,b\n1,1\n2,2\n3,\n100,3\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let matrix = CorrelationMatrix::compute(&table.numeric_view());

        let r = matrix.get(0, 1);
        assert!(r.is_finite());
        // Three complete pairs: (1,1), (2,2), (100,3).
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn correlate_builds_full_grid() {
        let csv = "a,b\n1,2\n2,3\n3,4\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let report = match correlate(&table) {
            CorrelationOutcome::Correlation(r) => r,
            CorrelationOutcome::NoNumericColumns => panic!("expected report"),
        };

        assert_eq!(report.grid.len(), 4);
        assert!(matches!(report.grid[0], PairPanel::Histogram(_)));
        assert!(matches!(report.grid[3], PairPanel::Histogram(_)));
        match &report.grid[1] {
            PairPanel::Scatter {
                x_column,
                y_column,
                points,
            } => {
                assert_eq!(x_column, "b");
                assert_eq!(y_column, "a");
                assert_eq!(points.len(), 3);
            }
            PairPanel::Histogram(_) => panic!("expected scatter"),
        }
        assert_eq!(report.annotations[0][1], "1.00");
    }

    #[test]
    fn correlate_no_numeric_columns_returns_sentinel() {
        let csv = "id,name\nu1,Alice\nu2,Bob\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert!(matches!(
            correlate(&table),
            CorrelationOutcome::NoNumericColumns
        ));
    }
}
