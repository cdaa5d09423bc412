/// Data layer: listing types, loading, normalization and the
/// filter → search → sort → summary pipeline.
///
/// Architecture:
/// ```text
///  remote JSON / .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode records → Vec<RawListing>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  price / mileage / year → numbers
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Catalog  │  ListingCollection + DatasetBounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐    ┌──────────┐    ┌────────┐    ┌──────────┐
///   │  filter   │ →  │  search   │ →  │  sort   │ →  │ summary   │
///   └──────────┘    └──────────┘    └────────┘    └──────────┘
/// ```

pub mod bounds;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod sort;
pub mod summary;
