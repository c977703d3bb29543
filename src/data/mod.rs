/// Data layer: cleaning, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐   normalize: "$(1,234.50)" → -1234.5
///   │  loader   │  parse file → Dataset + distinct value lists
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView (ordered indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  totals, margin, grouped sums, box stats
///   └───────────┘
///        │
///        ▼
///   ui pages / export
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
