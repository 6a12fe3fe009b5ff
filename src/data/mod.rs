/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, infer cells, classify columns → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   Table   │  Vec<Column>, rectangular, typed schema
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ NumericView  │  numeric columns as f64, derived per operation
///   └─────────────┘
/// ```

pub mod loader;
pub mod model;
