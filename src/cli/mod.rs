//! CLI commands for Sprig.
//!
//! Each command follows the same shape: a `*Command` bound to a
//! [`CareService`](crate::service::CareService) and an owner, a `run` that
//! returns a serializable `*Output`, and `format_output` for JSON, quiet or
//! human-readable rendering.

// Plant lifecycle
pub mod add;
pub mod remove;

// Care
pub mod show;
pub mod sweep;
pub mod water;

// Overview
pub mod list;

pub use add::AddCommand;
pub use list::{ListCommand, PlantInfo};
pub use remove::RemoveCommand;
pub use show::ShowCommand;
pub use sweep::SweepCommand;
pub use water::WaterCommand;
