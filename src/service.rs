//! Care service: the repository boundary around the care engine.
//!
//! The engine is pure; this layer loads records, checks ownership, applies
//! engine transitions and decides what gets persisted.
//!
//! Updates are read-modify-write: read the record, apply the engine, then
//! [`PlantStore::replace`] it only if it is still what was read, retrying on
//! a lost race. A recompute snapshot taken before a watering event can
//! therefore never overwrite that event, whether the watering happened in
//! this process or another one sharing the store. Within a process, writes to
//! one plant additionally queue on a per-plant lock so they do not spin
//! against each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CareConfig;
use crate::core::{recompute, record_watering, CareState, NewPlant, Plant};
use crate::error::{Result, SprigError};
use crate::storage::PlantStore;

/// Attempts at a conditional write before giving up with `Conflict`.
const MAX_WRITE_ATTEMPTS: usize = 8;

/// Outcome of a [`CareService::sweep`] pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Plants examined.
    pub examined: usize,
    /// Plants whose recomputed snapshot differed and was saved.
    pub updated: usize,
    /// IDs of plants overdue after the pass.
    pub overdue: Vec<String>,
    /// Plants with no watering history (left untouched).
    pub untracked: usize,
}

/// Plant care operations for authenticated owners.
pub struct CareService<S: PlantStore> {
    store: S,
    care: CareConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: PlantStore> CareService<S> {
    /// Create a service over `store` with the given care settings.
    pub fn new(store: S, care: CareConfig) -> Self {
        Self {
            store,
            care,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The care settings in effect.
    pub fn care_config(&self) -> &CareConfig {
        &self.care
    }

    /// Run `f` holding the in-process write lock for plant `id`.
    ///
    /// The lock table entry is dropped again once nobody else holds or waits
    /// for it, so unknown ids leave nothing behind.
    fn with_plant_lock<T>(&self, id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id.to_string()).or_default())
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table plus ours: no other caller is queued.
        if locks
            .get(id)
            .is_some_and(|entry| Arc::strong_count(entry) <= 2)
        {
            locks.remove(id);
        }

        result
    }

    /// Load a plant owned by `owner_id`.
    ///
    /// Missing and foreign plants both yield `NotFound`.
    fn load_owned(&self, owner_id: &str, id: &str) -> Result<Plant> {
        match self.store.get(id)? {
            Some(plant) if plant.is_owned_by(owner_id) => Ok(plant),
            _ => Err(SprigError::not_found(id)),
        }
    }

    /// Recompute a plant and persist it if anything changed.
    ///
    /// Returns the recomputed plant and whether it was written, or `None` if
    /// the plant disappeared (or changed hands) in the meantime.
    fn refresh_locked(
        &self,
        owner_id: &str,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Plant, bool)>> {
        self.with_plant_lock(id, || {
            for _ in 0..MAX_WRITE_ATTEMPTS {
                let current = match self.store.get(id)? {
                    Some(plant) if plant.is_owned_by(owner_id) => plant,
                    _ => return Ok(None),
                };

                let mut next = recompute(&current, now);
                if next == current {
                    return Ok(Some((next, false)));
                }

                next.updated_at = now;
                if self.store.replace(&current, &next)? {
                    tracing::debug!(
                        plant_id = %id,
                        health = next.health,
                        needs_attention = next.needs_attention,
                        "persisted recomputed plant"
                    );
                    return Ok(Some((next, true)));
                }
                tracing::debug!(plant_id = %id, "plant changed during recompute, retrying");
            }
            Err(SprigError::conflict(id))
        })
    }

    /// Validate and store a new plant.
    pub fn create(&self, request: NewPlant, now: DateTime<Utc>) -> Result<Plant> {
        let plant = request.build(now, &self.care)?;
        self.store.put(&plant)?;
        tracing::info!(plant_id = %plant.id, owner = %plant.owner_id, "created plant");
        Ok(plant)
    }

    /// Validate and store a new plant that was watered at `now`.
    ///
    /// The watering is applied before the first write, so the plant is
    /// either stored watered or not stored at all.
    pub fn create_watered(&self, request: NewPlant, now: DateTime<Utc>) -> Result<Plant> {
        let plant = record_watering(&request.build(now, &self.care)?, now);
        self.store.put(&plant)?;
        tracing::info!(
            plant_id = %plant.id,
            owner = %plant.owner_id,
            "created watered plant"
        );
        Ok(plant)
    }

    /// Fetch a plant with its care state recomputed at `now`.
    ///
    /// Persists the recomputed snapshot only when `persist_on_read` is set.
    pub fn get(&self, owner_id: &str, id: &str, now: DateTime<Utc>) -> Result<Plant> {
        if self.care.persist_on_read {
            return self
                .refresh_locked(owner_id, id, now)?
                .map(|(plant, _)| plant)
                .ok_or_else(|| SprigError::not_found(id));
        }

        let plant = self.load_owned(owner_id, id)?;
        Ok(recompute(&plant, now))
    }

    /// List an owner's plants with care state recomputed at `now`.
    ///
    /// Persists the recomputed snapshots only when `persist_on_read` is set.
    pub fn list(&self, owner_id: &str, now: DateTime<Utc>) -> Result<Vec<Plant>> {
        let plants = self.store.list_by_owner(owner_id)?;

        if !self.care.persist_on_read {
            return Ok(plants.iter().map(|p| recompute(p, now)).collect());
        }

        let mut refreshed = Vec::with_capacity(plants.len());
        for plant in plants {
            if let Some((next, _)) = self.refresh_locked(owner_id, &plant.id, now)? {
                refreshed.push(next);
            }
        }
        Ok(refreshed)
    }

    /// Record a watering event at `now`.
    ///
    /// Decay accrued up to `now` is applied first, so the heal starts from
    /// the plant's current health rather than a stale stored value.
    pub fn water(&self, owner_id: &str, id: &str, now: DateTime<Utc>) -> Result<Plant> {
        self.with_plant_lock(id, || {
            for _ in 0..MAX_WRITE_ATTEMPTS {
                let current = self.load_owned(owner_id, id)?;
                let mut watered = record_watering(&recompute(&current, now), now);
                watered.updated_at = now;

                if self.store.replace(&current, &watered)? {
                    tracing::info!(plant_id = %id, health = watered.health, "watered plant");
                    return Ok(watered);
                }
                tracing::debug!(plant_id = %id, "plant changed before watering, retrying");
            }
            Err(SprigError::conflict(id))
        })
    }

    /// Delete a plant, returning the removed record.
    pub fn delete(&self, owner_id: &str, id: &str) -> Result<Plant> {
        let removed = self.with_plant_lock(id, || {
            let plant = self.load_owned(owner_id, id)?;
            if !self.store.delete(id)? {
                return Err(SprigError::not_found(id));
            }
            Ok(plant)
        })?;

        tracing::info!(plant_id = %id, "deleted plant");
        Ok(removed)
    }

    /// Recompute and persist every plant of `owner_id` at `now`.
    ///
    /// The explicit alternative to persisting on read. Only plants whose
    /// snapshot changed are written. A persistence failure aborts the pass
    /// and is returned unchanged.
    pub fn sweep(&self, owner_id: &str, now: DateTime<Utc>) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for plant in self.store.list_by_owner(owner_id)? {
            let Some((next, changed)) = self.refresh_locked(owner_id, &plant.id, now)? else {
                continue;
            };

            report.examined += 1;
            if changed {
                report.updated += 1;
            }
            match next.care_state() {
                CareState::Untracked => report.untracked += 1,
                CareState::Overdue => report.overdue.push(next.id.clone()),
                CareState::Ok => {}
            }
        }

        tracing::info!(
            owner = %owner_id,
            examined = report.examined,
            updated = report.updated,
            overdue = report.overdue.len(),
            "sweep complete"
        );
        Ok(report)
    }

    /// Number of live entries in the in-process lock table.
    #[cfg(test)]
    fn lock_table_len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
