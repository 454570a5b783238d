//! Sprig - plant care tracking
//!
//! Sprig keeps one record per plant and derives its care state from the
//! watering history: health decays once a watering is overdue, watering
//! heals it, and the next due date follows the plant's cadence. The engine
//! is pure over an explicit `now`; the service layer owns persistence and
//! serializes writes per plant.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod identify;
pub mod service;
pub mod storage;
pub mod util;

pub use config::{CareConfig, Config};
pub use core::{recompute, record_watering, CareState, HealthBand, NewPlant, Plant};
pub use error::{Result, SprigError};
pub use identify::{identify_or_unknown, Identification, SpeciesIdentifier};
pub use service::{CareService, SweepReport};
pub use storage::{FilePlantStore, MemoryPlantStore, PlantStore};

// CLI commands
pub use cli::{AddCommand, ListCommand, RemoveCommand, ShowCommand, SweepCommand, WaterCommand};
