/// Analysis engine: three independent, stateless operations over a loaded table.
///
/// ```text
///        Table
///    ┌─────┼──────────────┐
///    ▼     ▼              ▼
/// describe correlate  detect_anomalies
///    │     │              │
///    ▼     ▼              ▼
/// summary  pairplot +   labels + flagged rows
/// + hists  heatmap      + 2-D projection
/// ```
///
/// Each operation is a pure function of `(table, parameters)`; the session
/// layer owns the table and passes it per call.
pub mod anomaly;
pub mod correlation;
pub mod isolation_forest;
pub mod summary;

pub use anomaly::{detect_anomalies, AnomalyOutcome, AnomalyProjection, AnomalyReport};
pub use correlation::{correlate, CorrelationMatrix, CorrelationOutcome, PairPanel};
pub use summary::{describe, SummaryOutcome, SummaryReport};

use thiserror::Error;

/// Validation errors of the analysis operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("contamination must be within (0, 1), got {0}")]
    InvalidContamination(f64),
}
