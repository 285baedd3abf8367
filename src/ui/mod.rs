pub mod chart;
pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use chart::render_spec;
pub use icons::Icons;
pub use output::{
    dim, error, header, info, muted, no_data, section, success, warn,
};
pub use progress::{CatalogProgress, Spinner};
pub use table::{result_table, rows_table, stats_table};
pub use theme::{theme, Theme};
