//! Plant storage traits for Sprig.
//!
//! This module defines the `PlantStore` trait, the repository boundary the
//! care engine is persisted through.

use std::sync::Arc;

use crate::core::Plant;
use crate::error::Result;

/// Trait for plant storage backends.
///
/// Stores are plain record containers: they never recompute care state and
/// never check ownership. Both are the service layer's job.
pub trait PlantStore: Send + Sync {
    /// Retrieve a plant by ID.
    ///
    /// Returns `Ok(None)` if the plant doesn't exist.
    fn get(&self, id: &str) -> Result<Option<Plant>>;

    /// Save a plant.
    ///
    /// Creates a new record or replaces an existing one.
    fn put(&self, plant: &Plant) -> Result<()>;

    /// List all plants belonging to `owner_id`.
    ///
    /// Ordered by creation time (oldest first), ties broken by ID.
    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Plant>>;

    /// Replace `current` with `next`, but only if the stored record still
    /// equals `current`.
    ///
    /// Returns `Ok(false)` without writing when the record changed or
    /// disappeared since `current` was read. Read-modify-write updates go
    /// through here so a concurrent writer (possibly another process) is
    /// never silently overwritten.
    fn replace(&self, current: &Plant, next: &Plant) -> Result<bool>;

    /// Delete a plant.
    ///
    /// Returns `Ok(false)` if the plant didn't exist.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Check if a plant exists.
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// Blanket implementation of PlantStore for Arc-wrapped stores.
///
/// Lets a service and a test share one store.
impl<T: PlantStore + ?Sized> PlantStore for Arc<T> {
    fn get(&self, id: &str) -> Result<Option<Plant>> {
        (**self).get(id)
    }

    fn put(&self, plant: &Plant) -> Result<()> {
        (**self).put(plant)
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Plant>> {
        (**self).list_by_owner(owner_id)
    }

    fn replace(&self, current: &Plant, next: &Plant) -> Result<bool> {
        (**self).replace(current, next)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        (**self).delete(id)
    }
}

/// Sort plants into the order `list_by_owner` promises.
pub(crate) fn sort_for_listing(plants: &mut [Plant]) {
    plants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}
