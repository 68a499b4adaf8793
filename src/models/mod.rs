mod log;
mod plot;
mod stand;
mod tree;

pub use log::Log;
pub use plot::Plot;
pub use stand::{parse_inventory_date, Stand};
pub use tree::{BuckingParams, Tree};
