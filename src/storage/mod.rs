//! Plant storage for Sprig.
//!
//! This module provides the repository boundary for plant records,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FilePlantStore;
pub use memory::MemoryPlantStore;
pub use traits::PlantStore;
