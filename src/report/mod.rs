//! Reporting layer
//!
//! - `result`: column-named result sets
//! - `catalog`: the fifteen fixed reporting queries
//! - `chart`: mapping from a query result to a chart description
//! - `analytics`: the analytics-tab charts

pub mod analytics;
pub mod catalog;
pub mod chart;
pub mod result;

pub use analytics::{Analytic, AnalyticRun};
pub use catalog::{CatalogQuery, CatalogRun, run, run_all};
pub use chart::{Chart, ColorScale, Orientation, RenderSpec, Series, chart_for};
pub use result::{ResultSet, Value};
