//! Sales data: typed records, loading, filtering and aggregation.
//!
//! ```text
//!  .csv / .json / .parquet
//!        │  loader::load_file     (schema checked, hour derived)
//!        ▼
//!   SalesDataset                  immutable; distinct values per category
//!        │  filter::apply         (per-column allow-lists, AND)
//!        ▼
//!   Subset<'_>                    indices into the dataset
//!        │  aggregate::aggregate / aggregate::summarize
//!        ▼
//!   Vec<Group>, SummaryMetrics
//! ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
