/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → StudentTable (memoised by cache)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ StudentTable  │  Vec<StudentRecord>, unique values, baseline mean
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply selection predicates → FilteredView
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
