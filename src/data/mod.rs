//! Data layer: run records, loading, schema discovery and statistics.
//!
//! Architecture:
//! ```text
//!   41.csv  43.csv  ...
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + split rows → RecordSet { baseline, regular }
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  schema   │  numeric non-grouping columns → MetricSet
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  stats    │  median / Q1 / Q3 per group
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
