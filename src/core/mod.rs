//! Core types and logic for Sprig.
//!
//! This module contains the plant record, its creation factory, and the pure
//! care state engine that derives health and schedule from watering history.

pub mod engine;
pub mod plant;

pub use engine::{
    clamp_health, days_until_watering, elapsed_days, next_watering_at, overdue_days, recompute,
    record_watering, DECAY_PER_OVERDUE_DAY, WATERING_BOOST,
};
pub use plant::{
    generate_plant_id, CareState, HealthBand, NewPlant, Plant, MAX_HEALTH, UNKNOWN_SPECIES,
};
