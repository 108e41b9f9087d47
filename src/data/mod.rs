/// Data layer: records, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///   all_data.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → Dataset (once per process)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<RentalRecord>, label options, date bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterParams → RecordView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  RFM, weather pivot, hourly profiles, box stats
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod labels;
pub mod loader;
pub mod model;
