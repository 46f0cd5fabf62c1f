/// Data layer: core types, loading, querying, and aggregation.
///
/// Architecture:
/// ```text
///    dataset.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + normalize → CollisionTable (cached once)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ CollisionTable  │  Vec<CollisionRecord>, immutable after load
///   └────────────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐  ┌───────────┐
///   │  query    │  │ aggregate  │  pure functions → filtered tables,
///   └──────────┘  └───────────┘  counts, histograms, correlations
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod query;
