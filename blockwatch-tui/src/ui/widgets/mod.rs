mod footer;
mod header;
mod metric_card;

pub use footer::{Footer, KEYBINDS};
pub use header::{Header, VERSION};
pub use metric_card::{format_count, MetricCard};
