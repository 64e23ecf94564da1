//! Data pipeline behind a device telemetry dashboard.
//!
//! The pipeline fetches a CSV feed of per-device open counts, decodes it
//! into typed records, applies the user-selected filter, and reduces the
//! active subset into the summaries a rendering layer paints: summary
//! counters, top-N chart series, a newest-first table feed, and map
//! markers. Every derived value is a pure recomputation over the full
//! record set from the last successful load; rendering itself lives in
//! the embedding application.

pub mod aggregate;
pub mod decode;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod theme;

pub use error::PipelineError;
pub use filter::{apply_filter, StatFilter};
pub use models::{ActivityStatus, ChartSeries, DeviceStat, FilterOptions};
pub use pipeline::{DashboardSnapshot, StatsPipeline, TopDevice};
pub use theme::{PreferenceStore, Theme};
