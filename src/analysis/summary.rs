use crate::analysis::correlation::CorrelationMatrix;
use crate::data::model::{Column, ColumnKind, Table};

/// Fixed histogram bin count for every numeric column.
pub const HISTOGRAM_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Descriptive statistics per numeric column
// ---------------------------------------------------------------------------

/// `count`, `mean`, `std`, `min`, quartiles and `max` of one numeric column,
/// computed over the non-missing cells.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn compute(column: &Column) -> Self {
        let mut values: Vec<f64> = column.numeric_values().into_iter().flatten().collect();
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = sample_std(&values, mean);

        ColumnStats {
            name: column.name.clone(),
            count,
            mean,
            std,
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: percentile(&values, 0.25),
            median: percentile(&values, 0.5),
            q75: percentile(&values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Sample standard deviation (ddof = 1).  NaN below two observations.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linear-interpolation percentile over sorted values, `q` in [0, 1].
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let frac = pos - lo as f64;
    if lo + 1 >= sorted.len() {
        sorted[lo]
    } else {
        sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
    }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Equal-width histogram of one numeric column.
/// `edges` has one more entry than `counts`.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub column: String,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the given values into [`HISTOGRAM_BINS`] equal-width bins over
    /// [min, max].  A degenerate range is widened by 0.5 either side.
    pub fn compute(column: &str, values: &[f64]) -> Self {
        if values.is_empty() {
            return Histogram {
                column: column.to_string(),
                edges: Vec::new(),
                counts: Vec::new(),
            };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if (max - min).abs() < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let width = (hi - lo) / HISTOGRAM_BINS as f64;
        let edges: Vec<f64> = (0..=HISTOGRAM_BINS).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0usize; HISTOGRAM_BINS];
        for &v in values {
            let idx = (((v - lo) / (hi - lo)) * HISTOGRAM_BINS as f64) as usize;
            counts[idx.min(HISTOGRAM_BINS - 1)] += 1;
        }

        Histogram {
            column: column.to_string(),
            edges,
            counts,
        }
    }

    pub fn bin_width(&self) -> f64 {
        if self.edges.len() < 2 {
            0.0
        } else {
            self.edges[1] - self.edges[0]
        }
    }
}

// ---------------------------------------------------------------------------
// describe – the summary operation
// ---------------------------------------------------------------------------

/// Declared kind and missing count of one column (every column, not just
/// numeric ones).
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
}

#[derive(Debug)]
pub struct SummaryReport {
    pub row_count: usize,
    pub stats: Vec<ColumnStats>,
    pub columns: Vec<ColumnInfo>,
    pub correlation: CorrelationMatrix,
    pub histograms: Vec<Histogram>,
}

#[derive(Debug)]
pub enum SummaryOutcome {
    /// The table has no numeric columns, so there is nothing to summarise.
    NoNumericColumns,
    Summary(SummaryReport),
}

/// Summarise a table: per-column statistics, missing counts, declared kinds,
/// correlation matrix and histogram bins over the numeric columns.
pub fn describe(table: &Table) -> SummaryOutcome {
    let view = table.numeric_view();
    if view.is_empty() {
        return SummaryOutcome::NoNumericColumns;
    }

    let columns = table
        .columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name.clone(),
            kind: c.kind,
            missing: c.missing_count(),
        })
        .collect();

    let stats = view.columns().iter().map(|c| ColumnStats::compute(c)).collect();

    let histograms = view
        .columns()
        .iter()
        .map(|c| {
            let values: Vec<f64> = c.numeric_values().into_iter().flatten().collect();
            Histogram::compute(&c.name, &values)
        })
        .collect();

    let correlation = CorrelationMatrix::compute(&view);

    SummaryOutcome::Summary(SummaryReport {
        row_count: table.n_rows(),
        stats,
        columns,
        correlation,
        histograms,
    })
}
