//! Plant record types for Sprig.
//!
//! A [`Plant`] is the snapshot the care engine consumes and produces. New
//! plants are built through [`NewPlant`], the only place per-field defaults
//! are applied.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CareConfig;
use crate::error::{Result, SprigError};

/// Species label used when identification produced nothing.
pub const UNKNOWN_SPECIES: &str = "Unknown";

/// Health every plant starts with, and the ceiling health never exceeds.
pub const MAX_HEALTH: u8 = 100;

/// Global counter mixed into plant IDs.
static PLANT_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a new plant ID.
///
/// Format: `pl_YYYYMMDD_xxxxxxxx`. The high half of the suffix mixes the
/// clock's sub-second nanos with the process id; the low half is a
/// per-process counter, so IDs never repeat within a process.
pub fn generate_plant_id() -> String {
    let now = Utc::now();
    let counter = PLANT_COUNTER.fetch_add(1, Ordering::SeqCst);
    let entropy = now.timestamp_subsec_nanos().wrapping_mul(0x9E37_79B9)
        ^ std::process::id().rotate_left(16);
    let suffix = (entropy & 0xFFFF_0000) | (counter & 0xFFFF);
    format!("pl_{}_{:08x}", now.format("%Y%m%d"), suffix)
}

/// A living plant owned by exactly one user.
///
/// `next_watering_at`, `health` and `needs_attention` are derived fields; the
/// engine rewrites them from `last_watered_at`, `watering_frequency_days` and
/// `baseline_health` on every operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plant {
    /// Unique, immutable plant identifier.
    pub id: String,
    /// Opaque id of the owning user.
    pub owner_id: String,
    /// Free-text species label (may be "Unknown").
    pub species_name: String,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Reference to the stored image (URL).
    pub image_ref: String,
    /// Optional light requirement hint shown alongside the schedule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunlight: Option<String>,
    /// Care cadence in whole days. Always at least 1.
    pub watering_frequency_days: u32,
    /// When the plant was last watered. `None` means never.
    #[serde(default)]
    pub last_watered_at: Option<DateTime<Utc>>,
    /// `last_watered_at + watering_frequency_days`, or `None` when untracked.
    #[serde(default)]
    pub next_watering_at: Option<DateTime<Utc>>,
    /// Current health in [0, 100].
    pub health: u8,
    /// Health at creation or at the last watering event.
    ///
    /// Overdue decay is measured from this value, not from `health`.
    pub baseline_health: u8,
    /// True iff care is currently overdue.
    #[serde(default)]
    pub needs_attention: bool,
    /// When the plant was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl Plant {
    /// Display label: the nickname, falling back to the species name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.species_name)
    }

    /// Whether the plant has any watering history.
    pub fn is_tracked(&self) -> bool {
        self.last_watered_at.is_some()
    }

    /// The care state as last computed.
    ///
    /// Reflects the stored flags; call [`crate::core::engine::recompute`]
    /// first for the state at a given time.
    pub fn care_state(&self) -> CareState {
        match (self.last_watered_at, self.needs_attention) {
            (None, _) => CareState::Untracked,
            (Some(_), false) => CareState::Ok,
            (Some(_), true) => CareState::Overdue,
        }
    }

    /// The health band for the current health value.
    pub fn health_band(&self) -> HealthBand {
        HealthBand::from_health(self.health)
    }

    /// Whether `owner_id` owns this plant.
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Logical care state of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareState {
    /// Never watered. No decay applies.
    Untracked,
    /// Watered within its cadence.
    Ok,
    /// Past due; attention flagged and health decaying.
    Overdue,
}

impl CareState {
    /// Short lowercase label for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CareState::Untracked => "untracked",
            CareState::Ok => "ok",
            CareState::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for CareState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse health grouping used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    /// Health above 80.
    Good,
    /// Health above 60.
    Fair,
    /// Everything else.
    Poor,
}

impl HealthBand {
    /// Classify a health value.
    pub fn from_health(health: u8) -> Self {
        if health > 80 {
            HealthBand::Good
        } else if health > 60 {
            HealthBand::Fair
        } else {
            HealthBand::Poor
        }
    }

    /// Short lowercase label for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthBand::Good => "good",
            HealthBand::Fair => "fair",
            HealthBand::Poor => "poor",
        }
    }
}

/// Request to create a plant.
///
/// Required fields are constructor arguments; optional ones are set with the
/// builder methods. Defaults for anything left unset come from [`CareConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
    owner_id: String,
    species_name: String,
    image_ref: String,
    nickname: Option<String>,
    watering_frequency_days: Option<u32>,
    sunlight: Option<String>,
}

impl NewPlant {
    /// Start a creation request with the required fields.
    pub fn new(
        owner_id: impl Into<String>,
        species_name: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            species_name: species_name.into(),
            image_ref: image_ref.into(),
            nickname: None,
            watering_frequency_days: None,
            sunlight: None,
        }
    }

    /// Set the display nickname.
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Set the watering cadence in days.
    pub fn watering_frequency_days(mut self, days: u32) -> Self {
        self.watering_frequency_days = Some(days);
        self
    }

    /// Set the sunlight hint.
    pub fn sunlight(mut self, sunlight: impl Into<String>) -> Self {
        self.sunlight = Some(sunlight.into());
        self
    }

    /// Validate the request and build the initial plant record.
    ///
    /// # Errors
    ///
    /// * `InvalidFrequency` if the cadence is zero or longer than ten years
    /// * `InvalidInput` if the owner or image reference is blank
    pub fn build(self, now: DateTime<Utc>, defaults: &CareConfig) -> Result<Plant> {
        let owner_id = self.owner_id.trim().to_string();
        if owner_id.is_empty() {
            return Err(SprigError::invalid_input("owner id is required"));
        }

        let image_ref = self.image_ref.trim().to_string();
        if image_ref.is_empty() {
            return Err(SprigError::invalid_input("image reference is required"));
        }

        let watering_frequency_days = self
            .watering_frequency_days
            .unwrap_or(defaults.default_frequency_days);
        if !CareConfig::is_valid_frequency(watering_frequency_days) {
            return Err(SprigError::InvalidFrequency {
                days: watering_frequency_days,
            });
        }

        let species_name = match self.species_name.trim() {
            "" => UNKNOWN_SPECIES.to_string(),
            name => name.to_string(),
        };

        let nickname = non_blank(self.nickname);
        let sunlight =
            non_blank(self.sunlight).or_else(|| non_blank(defaults.default_sunlight.clone()));

        Ok(Plant {
            id: generate_plant_id(),
            owner_id,
            species_name,
            nickname,
            image_ref,
            sunlight,
            watering_frequency_days,
            last_watered_at: None,
            next_watering_at: None,
            health: MAX_HEALTH,
            baseline_health: MAX_HEALTH,
            needs_attention: false,
            created_at: now,
            updated_at: now,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
