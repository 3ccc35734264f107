/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv (sep=';') / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  ordered parser attempts → Table   (memoized by content hash)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  age range + categorical selections → new Table
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  outcome shares (%) for raw and filtered tables
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  Table → xlsx bytes   (memoized by table fingerprint)
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
