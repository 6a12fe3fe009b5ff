use crate::analysis::{
    correlate, describe, detect_anomalies, AnomalyOutcome, CorrelationOutcome, SummaryOutcome,
};
use crate::data::model::{CellValue, Column, ColumnKind, Table};

/// Contamination slider bounds and default, matching the control surface.
pub const CONTAMINATION_MIN: f64 = 0.01;
pub const CONTAMINATION_MAX: f64 = 0.2;
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Fixed seed so repeated runs over the same table agree.
pub const ANOMALY_SEED: u64 = 42;

/// Name of the derived label column appended after anomaly detection.
pub const LABEL_COLUMN: &str = "anomaly";

/// Which result the central panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveView {
    Preview,
    Summary,
    Correlation,
    Anomalies,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.  The session layer owns the
/// single loaded table and passes it into each analysis call.
pub struct AppState {
    /// Loaded table (None until user loads a file).
    pub table: Option<Table>,

    /// Display name of the loaded file.
    pub source_name: Option<String>,

    /// Expected anomalous fraction for detection.
    pub contamination: f64,

    /// Seed threaded into the isolation forest.
    pub seed: u64,

    pub active_view: ActiveView,

    /// Last outcome of each analysis, independent of the others.
    pub summary: Option<SummaryOutcome>,
    pub correlation: Option<CorrelationOutcome>,
    pub anomalies: Option<AnomalyOutcome>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            source_name: None,
            contamination: DEFAULT_CONTAMINATION,
            seed: ANOMALY_SEED,
            active_view: ActiveView::Preview,
            summary: None,
            correlation: None,
            anomalies: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table, discarding results of the previous one.
    pub fn set_table(&mut self, table: Table, source_name: String) {
        self.table = Some(table);
        self.source_name = Some(source_name);
        self.summary = None;
        self.correlation = None;
        self.anomalies = None;
        self.active_view = ActiveView::Preview;
        self.status_message = None;
        self.loading = false;
    }

    pub fn run_summary(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        log::info!("Running summary over {} rows", table.n_rows());
        self.summary = Some(describe(table));
        self.active_view = ActiveView::Summary;
    }

    pub fn run_correlation(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        log::info!("Running correlation over {} rows", table.n_rows());
        self.correlation = Some(correlate(table));
        self.active_view = ActiveView::Correlation;
    }

    /// Run anomaly detection and append the label column to the table (the
    /// data model's single permitted mutation).
    pub fn run_anomalies(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        log::info!(
            "Running anomaly detection over {} rows, contamination {:.2}",
            table.n_rows(),
            self.contamination
        );

        match detect_anomalies(table, self.contamination, self.seed) {
            Ok(outcome) => {
                if let AnomalyOutcome::Report(report) = &outcome {
                    log::info!("Detected {} anomalies", report.count());
                    let labels: Vec<CellValue> = report
                        .labels
                        .iter()
                        .map(|&anomalous| {
                            CellValue::Text(
                                if anomalous { "anomaly" } else { "normal" }.to_string(),
                            )
                        })
                        .collect();
                    let column = Column::new(LABEL_COLUMN, ColumnKind::Other, labels);
                    if let Some(table) = self.table.as_mut() {
                        if let Err(e) = table.set_column(column) {
                            log::error!("Failed to append label column: {e}");
                            self.status_message = Some(format!("Error: {e}"));
                        }
                    }
                }
                self.anomalies = Some(outcome);
                self.active_view = ActiveView::Anomalies;
            }
            Err(e) => {
                log::error!("Anomaly detection failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;

    fn loaded_state() -> AppState {
        let csv = "x,y\n1,2\n2,3\n3,2\n1000,-500\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        let mut state = AppState::default();
        state.set_table(table, "test.csv".to_string());
        state
    }

    #[test]
    fn set_table_resets_previous_results() {
        let mut state = loaded_state();
        state.run_summary();
        assert!(state.summary.is_some());

        let table = parse_csv("a\n1\n".as_bytes()).unwrap();
        state.set_table(table, "other.csv".to_string());
        assert!(state.summary.is_none());
        assert_eq!(state.active_view, ActiveView::Preview);
    }

    #[test]
    fn run_anomalies_appends_label_column() {
        let mut state = loaded_state();
        state.run_anomalies();

        let table = state.table.as_ref().unwrap();
        let labels = table.column(LABEL_COLUMN).unwrap();
        assert_eq!(labels.kind, ColumnKind::Other);
        assert_eq!(labels.values[3], CellValue::Text("anomaly".to_string()));
        assert_eq!(labels.values[0], CellValue::Text("normal".to_string()));

        // Label column must not leak into later numeric analyses.
        assert_eq!(table.numeric_view().width(), 2);

        // Re-running replaces the column rather than duplicating it.
        state.run_anomalies();
        assert_eq!(state.table.as_ref().unwrap().n_cols(), 3);
    }

    #[test]
    fn analyses_without_a_table_are_noops() {
        let mut state = AppState::default();
        state.run_summary();
        state.run_correlation();
        state.run_anomalies();
        assert!(state.summary.is_none());
        assert!(state.correlation.is_none());
        assert!(state.anomalies.is_none());
    }
}
