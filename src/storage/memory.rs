//! In-memory plant storage.
//!
//! A thread-safe implementation of the PlantStore trait, used by tests and
//! by embedders that bring their own persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::core::Plant;
use crate::error::Result;
use crate::storage::traits::sort_for_listing;
use crate::storage::PlantStore;

/// In-memory plant store.
///
/// Thread-safe implementation using `RwLock<HashMap>`.
/// Plants are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryPlantStore {
    plants: RwLock<HashMap<String, Plant>>,
}

impl MemoryPlantStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            plants: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of plants in the store.
    pub fn len(&self) -> usize {
        self.plants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlantStore for MemoryPlantStore {
    fn get(&self, id: &str) -> Result<Option<Plant>> {
        let plants = self.plants.read().unwrap_or_else(PoisonError::into_inner);
        Ok(plants.get(id).cloned())
    }

    fn put(&self, plant: &Plant) -> Result<()> {
        let mut plants = self.plants.write().unwrap_or_else(PoisonError::into_inner);
        plants.insert(plant.id.clone(), plant.clone());
        Ok(())
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Plant>> {
        let plants = self.plants.read().unwrap_or_else(PoisonError::into_inner);
        let mut result: Vec<Plant> = plants
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        sort_for_listing(&mut result);
        Ok(result)
    }

    fn replace(&self, current: &Plant, next: &Plant) -> Result<bool> {
        let mut plants = self.plants.write().unwrap_or_else(PoisonError::into_inner);
        match plants.get(&current.id) {
            Some(stored) if stored == current => {
                plants.insert(next.id.clone(), next.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut plants = self.plants.write().unwrap_or_else(PoisonError::into_inner);
        Ok(plants.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::{
        sample_plant, test_plant_store_crud, test_plant_store_listing, test_plant_store_replace,
    };

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryPlantStore::new();
        test_plant_store_crud(&store);
    }

    #[test]
    fn test_memory_store_listing() {
        let store = MemoryPlantStore::new();
        test_plant_store_listing(&store);
    }

    #[test]
    fn test_memory_store_replace() {
        let store = MemoryPlantStore::new();
        test_plant_store_replace(&store);
    }

    #[test]
    fn test_len() {
        let store = MemoryPlantStore::default();
        assert!(store.is_empty());

        store.put(&sample_plant("u", "Fern", 0)).unwrap();
        store.put(&sample_plant("u", "Ivy", 0)).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryPlantStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let plant = sample_plant("u", &format!("Species {}", i), 0);
                store_clone.put(&plant).unwrap();
                assert!(store_clone.get(&plant.id).unwrap().is_some());
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }
}
