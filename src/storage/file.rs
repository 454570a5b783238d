//! File-based plant storage for Sprig.
//!
//! Plants are stored as one JSON file each in `~/.sprig/plants/`.
//! Atomic writes are achieved via temp file + rename pattern.
//!
//! Every write holds a per-plant lock file (`.<id>.lock`, created with
//! `create_new`) so separate `sprig` processes sharing the directory cannot
//! interleave a read-compare-write. A lock left behind by a crashed process
//! is broken once it is older than [`STALE_LOCK_AGE`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crate::config::plants_dir;
use crate::core::Plant;
use crate::error::{Result, SprigError};
use crate::storage::traits::sort_for_listing;
use crate::storage::PlantStore;
use crate::util::read_record;

/// How long a writer waits for another process's lock before giving up.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause between attempts to take a held lock.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Age after which a lock file is assumed to belong to a dead process.
pub const STALE_LOCK_AGE: Duration = Duration::from_secs(30);

/// Held per-plant lock file; removed on drop.
#[derive(Debug)]
struct RecordLock {
    path: PathBuf,
}

impl RecordLock {
    fn acquire(path: PathBuf) -> Result<Self> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale_lock(&path) {
                        tracing::warn!(path = %path.display(), "breaking stale plant lock");
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(SprigError::storage(
                            &path,
                            io::Error::new(
                                io::ErrorKind::WouldBlock,
                                "plant record is locked by another process",
                            ),
                        ));
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(SprigError::storage(&path, e)),
            }
        }
    }
}

impl Drop for RecordLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn is_stale_lock(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= STALE_LOCK_AGE)
}

/// File-based plant storage.
#[derive(Debug, Clone)]
pub struct FilePlantStore {
    /// Directory where plant files are stored.
    plants_dir: PathBuf,
}

impl FilePlantStore {
    /// Create a new file plant store with the default directory.
    ///
    /// Uses `~/.sprig/plants/` or `$SPRIG_HOME/plants/`.
    pub fn new() -> Result<Self> {
        let dir = plants_dir().ok_or_else(|| {
            SprigError::config("Could not determine plants directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a new file plant store with a custom directory.
    pub fn with_dir(plants_dir: impl Into<PathBuf>) -> Result<Self> {
        let plants_dir = plants_dir.into();

        if !plants_dir.exists() {
            fs::create_dir_all(&plants_dir).map_err(|e| SprigError::storage(&plants_dir, e))?;
        }

        Ok(Self { plants_dir })
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &PathBuf {
        &self.plants_dir
    }

    /// Get the path for a plant file.
    ///
    /// IDs that could escape the directory map to a path that never exists.
    fn plant_path(&self, id: &str) -> PathBuf {
        if is_safe_id(id) {
            self.plants_dir.join(format!("{}.json", id))
        } else {
            self.plants_dir.join(".invalid-id")
        }
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, id: &str) -> PathBuf {
        self.plants_dir.join(format!(".{}.json.tmp", id))
    }

    /// Get the path for a plant's write lock.
    fn lock_path(&self, id: &str) -> PathBuf {
        self.plants_dir.join(format!(".{}.lock", id))
    }

    /// Take the write lock for a plant, rejecting ids unusable as file names.
    fn lock(&self, id: &str) -> Result<RecordLock> {
        if !is_safe_id(id) {
            return Err(SprigError::invalid_input(format!(
                "plant id '{}' is not a valid file name",
                id
            )));
        }
        RecordLock::acquire(self.lock_path(id))
    }

    /// Read a plant record from disk.
    fn read_plant(&self, id: &str) -> Result<Option<Plant>> {
        let path = self.plant_path(id);

        if !path.exists() {
            return Ok(None);
        }

        let content = read_record(&path)?;
        let plant: Plant = serde_json::from_str(&content)?;

        Ok(Some(plant))
    }

    /// Write a plant atomically using temp file + rename.
    ///
    /// Callers hold the plant's [`RecordLock`].
    fn atomic_write(&self, plant: &Plant) -> Result<()> {
        let final_path = self.plant_path(&plant.id);
        let temp_path = self.temp_path(&plant.id);

        let json = serde_json::to_string_pretty(plant)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| SprigError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| SprigError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| SprigError::storage(&temp_path, e))?;
        }

        // Atomic on POSIX
        fs::rename(&temp_path, &final_path).map_err(|e| SprigError::storage(&final_path, e))?;

        Ok(())
    }

    /// Read every parsable plant record in the directory.
    fn read_all(&self) -> Result<Vec<Plant>> {
        if !self.plants_dir.exists() {
            return Ok(Vec::new());
        }

        let mut plants = Vec::new();

        let entries = fs::read_dir(&self.plants_dir)
            .map_err(|e| SprigError::storage(&self.plants_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| SprigError::storage(&self.plants_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            let parsed = read_record(&path)
                .and_then(|content| serde_json::from_str::<Plant>(&content).map_err(Into::into));
            match parsed {
                Ok(plant) => plants.push(plant),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable plant record"
                ),
            }
        }

        Ok(plants)
    }
}

/// Whether an ID is safe to use as a file stem.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl PlantStore for FilePlantStore {
    fn get(&self, id: &str) -> Result<Option<Plant>> {
        self.read_plant(id)
    }

    fn put(&self, plant: &Plant) -> Result<()> {
        let _lock = self.lock(&plant.id)?;
        self.atomic_write(plant)
    }

    fn replace(&self, current: &Plant, next: &Plant) -> Result<bool> {
        let _lock = self.lock(&next.id)?;
        match self.read_plant(&current.id)? {
            Some(stored) if stored == *current => {
                self.atomic_write(next)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Plant>> {
        let mut plants: Vec<Plant> = self
            .read_all()?
            .into_iter()
            .filter(|p| p.owner_id == owner_id)
            .collect();
        sort_for_listing(&mut plants);
        Ok(plants)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        if !is_safe_id(id) {
            return Ok(false);
        }

        let _lock = self.lock(id)?;
        let path = self.plant_path(id);

        let existed = path.exists();
        if existed {
            fs::remove_file(&path).map_err(|e| SprigError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(id);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(existed)
    }
}
