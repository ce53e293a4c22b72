//! Data structures for game content.
//!
//! This module contains pure data structures that define technologies,
//! research projects, buildings, credit actions and starting specialists.
//! All structs are designed to be deserialized from RON files and are
//! converted into runtime types by [`Catalog::build`].
//!
//! **Note:** This module contains no IO. The built-in catalog is embedded
//! at compile time; loading other files is the host's job.

mod action_data;
mod amounts;
mod building_data;
mod catalog;
mod research_data;
mod starter_data;
mod tech_data;

pub use action_data::{ActionData, ActionEffectData};
pub use amounts::AmountTable;
pub use building_data::BuildingData;
pub use catalog::{Catalog, CatalogParts};
pub use research_data::ResearchData;
pub use starter_data::StarterData;
pub use tech_data::{TechData, UnlockEffectData};
