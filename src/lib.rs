pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod reference;
pub mod taper;
pub mod visualization;

pub use config::CruiseConfig;
pub use error::CruiseError;
pub use models::{BuckingParams, Log, Plot, Stand, Tree};
pub use reference::{Grade, LengthRange, Species};
pub use taper::{StemProfile, TaperModel};
