//! Data models for headache journal entities.
//!
//! - `HeadacheLog`, `NewHeadache`: journal entries as read and as created
//! - `CatalogItem` (`Food`, `Drink`, `Remedy`): the user's catalogs
//! - `HeadacheStats`: aggregate statistics

pub mod catalog;
pub mod headache;
pub mod stats;

pub use catalog::{CatalogItem, CatalogKind, Consumption, Drink, Food, Remedy};
pub use headache::{
    HeadacheLog, HeadacheRemedy, Intensity, Location, NewHeadache, RemedyResult, Side, Weather,
    MAX_SLEEP_RANK,
};
pub use stats::{HeadacheStats, MeanRemedy};
