/// Data layer: loading, normalization, and aggregation.
///
/// Architecture:
/// ```text
///  export .zip (JSON members)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  filter members by pattern, detect schema, parse rows
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ PlayHistory  │  Vec<PlayEvent>, year / schema indexes
///   └─────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ aggregate   │  grouped sums, rolling windows, clock, summary
///   └────────────┘
/// ```
pub mod aggregate;
pub mod format;
pub mod loader;
pub mod model;
