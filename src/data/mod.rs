/// Data layer: core types, loading, filtering, and export.
///
/// Architecture:
/// ```text
///  uploaded .csv files / sample URL
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse sources, merge by row, infer column types
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  typed columns + row-major cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply per-column constraints → row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered view → delimited text
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
