/// Data layer: recording model, loading, and the downsampling core.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Recording (labels + RawMatrix)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ extract   │  one channel → (t, center, [low, high]) per row
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ rolling   │  trailing-window means, O(n) → plot
///   └──────────┘
/// ```

pub mod error;
pub mod extract;
pub mod loader;
pub mod model;
pub mod rolling;

pub use error::SeriesError;
pub use extract::{extract, extract_with, ExtractOptions};
pub use model::{
    AggregatedRecord, AxisMode, Band, ExtractedRecord, RawCell, RawMatrix, RawRow, Recording,
    UnreadableCenter,
};
pub use rolling::{aggregate, downsample};
