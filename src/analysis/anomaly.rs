use crate::analysis::isolation_forest::{ForestParams, IsolationForest};
use crate::analysis::AnalysisError;
use crate::data::model::{CellValue, NumericView, Table};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One anomalous row with its retained original cell contents.
#[derive(Debug, Clone)]
pub struct FlaggedRow {
    pub index: usize,
    pub cells: Vec<CellValue>,
}

/// 2-D display projection of the labeled rows.
#[derive(Debug)]
pub enum AnomalyProjection {
    /// First two numeric columns, points split by label.
    Scatter {
        x_column: String,
        y_column: String,
        normal: Vec<[f64; 2]>,
        anomalous: Vec<[f64; 2]>,
    },
    /// Fewer than two numeric columns; labeling still proceeded.
    InsufficientColumns,
}

#[derive(Debug)]
pub struct AnomalyReport {
    /// Contamination used to produce the labels.
    pub contamination: f64,
    /// Per-row anomaly score in (0, 1).
    pub scores: Vec<f64>,
    /// Per-row label, `true` = anomaly.
    pub labels: Vec<bool>,
    pub flagged: Vec<FlaggedRow>,
    pub projection: AnomalyProjection,
}

impl AnomalyReport {
    pub fn count(&self) -> usize {
        self.flagged.len()
    }
}

#[derive(Debug)]
pub enum AnomalyOutcome {
    /// The table has no numeric columns, so no rows can be scored.
    NoNumericColumns,
    Report(AnomalyReport),
}

// ---------------------------------------------------------------------------
// detect_anomalies
// ---------------------------------------------------------------------------

/// Fit an isolation forest on the numeric columns and label every row.
///
/// The `⌈contamination · n⌉` highest-scoring rows are flagged (ties broken by
/// row order), so the labeled fraction tracks the contamination parameter.
/// Missing numeric cells are imputed with the column mean before fitting.
pub fn detect_anomalies(
    table: &Table,
    contamination: f64,
    seed: u64,
) -> Result<AnomalyOutcome, AnalysisError> {
    if !(contamination > 0.0 && contamination < 1.0) {
        return Err(AnalysisError::InvalidContamination(contamination));
    }

    let view = table.numeric_view();
    if view.is_empty() {
        return Ok(AnomalyOutcome::NoNumericColumns);
    }

    let matrix = imputed_matrix(&view);
    let n = matrix.len();

    let scores = if n == 0 {
        Vec::new()
    } else {
        let params = ForestParams {
            seed,
            ..ForestParams::default()
        };
        IsolationForest::fit(&matrix, &params).score_all(&matrix)
    };

    let k = ((contamination * n as f64).ceil() as usize).min(n);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    let mut labels = vec![false; n];
    for &i in order.iter().take(k) {
        labels[i] = true;
    }

    let flagged = (0..n)
        .filter(|&i| labels[i])
        .map(|i| FlaggedRow {
            index: i,
            cells: table.row(i),
        })
        .collect();

    let projection = if view.width() >= 2 {
        let mut normal = Vec::new();
        let mut anomalous = Vec::new();
        for (i, row) in matrix.iter().enumerate() {
            let point = [row[0], row[1]];
            if labels[i] {
                anomalous.push(point);
            } else {
                normal.push(point);
            }
        }
        AnomalyProjection::Scatter {
            x_column: view.columns()[0].name.clone(),
            y_column: view.columns()[1].name.clone(),
            normal,
            anomalous,
        }
    } else {
        AnomalyProjection::InsufficientColumns
    };

    Ok(AnomalyOutcome::Report(AnomalyReport {
        contamination,
        scores,
        labels,
        flagged,
        projection,
    }))
}

/// Dense row matrix over the numeric view, missing cells imputed with the
/// column mean (0.0 when a column has no present values at all).
fn imputed_matrix(view: &NumericView<'_>) -> Vec<Vec<f64>> {
    let means: Vec<f64> = view
        .columns()
        .iter()
        .map(|col| {
            let present: Vec<f64> = col.numeric_values().into_iter().flatten().collect();
            if present.is_empty() {
                0.0
            } else {
                present.iter().sum::<f64>() / present.len() as f64
            }
        })
        .collect();

    (0..view.n_rows())
        .map(|row| {
            (0..view.width())
                .map(|col| view.value(row, col).unwrap_or(means[col]))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    const SEED: u64 = 42;

    fn report(table: &Table, contamination: f64) -> AnomalyReport {
        match detect_anomalies(table, contamination, SEED).unwrap() {
            AnomalyOutcome::Report(r) => r,
            AnomalyOutcome::NoNumericColumns => panic!("expected report"),
        }
    }

    #[test]
    fn flags_the_obvious_outlier() {
        let csv = "x,y\n1,2\n2,3\n3,2\n1000,-500\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let report = report(&table, 0.05);

        assert_eq!(report.count(), 1);
        assert_eq!(report.flagged[0].index, 3);
        assert_eq!(report.labels, vec![false, false, false, true]);
        assert_eq!(
            report.flagged[0].cells,
            vec![CellValue::Integer(1000), CellValue::Integer(-500)]
        );
    }

    #[test]
    fn labeled_fraction_tracks_contamination() {
        let mut csv = String::from("v,w\n");
        for i in 0..100 {
            csv.push_str(&format!("{},{}\n", i % 10, (i * 3) % 17));
        }
        let table = parse_csv(csv.as_bytes()).unwrap();
        let report = report(&table, 0.1);

        assert_eq!(report.count(), 10);
        assert_eq!(report.labels.iter().filter(|&&l| l).count(), 10);
    }

    #[test]
    fn identical_inputs_give_identical_anomaly_sets() {
        let csv = "x,y\n1,2\n2,3\n3,2\n50,60\n4,3\n2,2\n";
        let table = parse_csv(csv.as_bytes()).unwrap();

        let a = report(&table, 0.2);
        let b = report(&table, 0.2);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.scores, b.scores);
    }

    #[test]
    fn single_numeric_column_labels_but_skips_projection() {
        let mut csv = String::from("v\n");
        for i in 0..100 {
            csv.push_str(&format!("{}\n", i % 10));
        }
        let table = parse_csv(csv.as_bytes()).unwrap();
        let report = report(&table, 0.1);

        assert_eq!(report.count(), 10);
        assert!(matches!(
            report.projection,
            AnomalyProjection::InsufficientColumns
        ));
    }

    #[test]
    fn no_numeric_columns_returns_sentinel() {
        let csv = "id,name\nu1,Alice\nu2,Bob\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert!(matches!(
            detect_anomalies(&table, 0.05, SEED).unwrap(),
            AnomalyOutcome::NoNumericColumns
        ));
    }

    #[test]
    fn contamination_outside_unit_interval_is_rejected() {
        let csv = "x\n1\n2\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert!(detect_anomalies(&table, 0.0, SEED).is_err());
        assert!(detect_anomalies(&table, 1.0, SEED).is_err());
        assert!(detect_anomalies(&table, -0.1, SEED).is_err());
    }

    #[test]
    fn missing_numeric_cells_are_imputed_not_fatal() {
        let csv = "x,y\n1,2\n2,\n3,2\n,3\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let report = report(&table, 0.25);

        assert_eq!(report.labels.len(), 4);
        assert_eq!(report.count(), 1);
    }

    #[test]
    fn projection_splits_points_by_label() {
        let csv = "x,y\n1,2\n2,3\n3,2\n1000,-500\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let report = report(&table, 0.05);

        match &report.projection {
            AnomalyProjection::Scatter {
                x_column,
                y_column,
                normal,
                anomalous,
            } => {
                assert_eq!(x_column, "x");
                assert_eq!(y_column, "y");
                assert_eq!(normal.len(), 3);
                assert_eq!(anomalous, &vec![[1000.0, -500.0]]);
            }
            AnomalyProjection::InsufficientColumns => panic!("expected scatter"),
        }
    }
}
