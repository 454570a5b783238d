//! List command for Sprig.
//!
//! Lists the owner's plants with care state recomputed at the current time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{days_until_watering, CareState, Plant};
use crate::service::CareService;
use crate::storage::PlantStore;

/// Options for the list command.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Show only plants that need attention.
    pub attention: bool,
}

/// Output format for the list command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOutput {
    /// Whether the list was successful.
    pub success: bool,
    /// Number of plants listed.
    pub count: usize,
    /// Number of listed plants needing attention.
    pub attention_count: usize,
    /// The plants.
    pub plants: Vec<PlantInfo>,
    /// Error message if listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Plant view shared by every command's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantInfo {
    /// Plant ID.
    pub id: String,
    /// Nickname, or species when no nickname is set.
    pub name: String,
    /// Species label.
    pub species: String,
    /// Current health in [0, 100].
    pub health: u8,
    /// Health band: good, fair or poor.
    pub health_band: String,
    /// Care state: untracked, ok or overdue.
    pub state: String,
    /// Whether care is overdue.
    pub needs_attention: bool,
    /// Watering cadence in days.
    pub watering_frequency_days: u32,
    /// Sunlight hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunlight: Option<String>,
    /// Last watering time (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watered_at: Option<String>,
    /// Next due time (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_watering_at: Option<String>,
    /// Whole days until watering is due (negative when late).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_watering: Option<i64>,
    /// Image reference.
    pub image_ref: String,
}

impl PlantInfo {
    /// Build the view from a plant snapshot already recomputed at `now`.
    pub fn from_plant(plant: &Plant, now: DateTime<Utc>) -> Self {
        Self {
            id: plant.id.clone(),
            name: plant.display_name().to_string(),
            species: plant.species_name.clone(),
            health: plant.health,
            health_band: plant.health_band().as_str().to_string(),
            state: plant.care_state().as_str().to_string(),
            needs_attention: plant.needs_attention,
            watering_frequency_days: plant.watering_frequency_days,
            sunlight: plant.sunlight.clone(),
            last_watered_at: plant.last_watered_at.map(|t| t.to_rfc3339()),
            next_watering_at: plant.next_watering_at.map(|t| t.to_rfc3339()),
            days_until_watering: days_until_watering(plant, now),
            image_ref: plant.image_ref.clone(),
        }
    }

    /// One-line schedule summary for human output.
    pub fn schedule_line(&self) -> String {
        let last = self
            .last_watered_at
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());

        let due = match self.days_until_watering {
            None => "not scheduled".to_string(),
            Some(d) if d <= 0 => "watering is due!".to_string(),
            Some(1) => "due in 1 day".to_string(),
            Some(d) => format!("due in {} days", d),
        };

        format!(
            "Water every {} day(s) | Last watered: {} | {}",
            self.watering_frequency_days, last, due
        )
    }

    /// Headline for human output: name, species, state and health.
    pub fn headline(&self) -> String {
        let species = if self.name != self.species {
            format!(" ({})", self.species)
        } else {
            String::new()
        };
        let flag = if self.state == CareState::Overdue.as_str() {
            " ⚠ needs attention"
        } else {
            ""
        };
        format!(
            "{}{} [{}] health {}% ({}){}",
            self.name, species, self.state, self.health, self.health_band, flag
        )
    }
}

impl ListOutput {
    /// Create a successful output.
    pub fn success(plants: Vec<PlantInfo>) -> Self {
        let count = plants.len();
        let attention_count = plants.iter().filter(|p| p.needs_attention).count();
        Self {
            success: true,
            count,
            attention_count,
            plants,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            attention_count: 0,
            plants: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The list command implementation.
pub struct ListCommand<'a, S: PlantStore> {
    service: &'a CareService<S>,
    owner_id: String,
}

impl<'a, S: PlantStore> ListCommand<'a, S> {
    /// Create a new list command.
    pub fn new(service: &'a CareService<S>, owner_id: impl Into<String>) -> Self {
        Self {
            service,
            owner_id: owner_id.into(),
        }
    }

    /// Run the list command.
    pub fn run(&self, options: &ListOptions, now: DateTime<Utc>) -> ListOutput {
        match self.service.list(&self.owner_id, now) {
            Ok(plants) => {
                let mut infos: Vec<PlantInfo> = plants
                    .iter()
                    .map(|p| PlantInfo::from_plant(p, now))
                    .collect();
                if options.attention {
                    infos.retain(|p| p.needs_attention);
                }
                ListOutput::success(infos)
            }
            Err(e) => ListOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ListOutput, options: &ListOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output, options)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &ListOutput, options: &ListOptions) -> String {
        if !output.success {
            return format!(
                "List failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.plants.is_empty() {
            return if options.attention {
                "No plants need attention.\n".to_string()
            } else {
                "No plants yet. Add one with `sprig add <image>`.\n".to_string()
            };
        }

        let mut lines = Vec::new();
        lines.push(format!(
            "{} plant(s), {} needing attention:\n",
            output.count, output.attention_count
        ));

        for (i, plant) in output.plants.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, plant.headline()));
            lines.push(format!("   {}", plant.schedule_line()));
            lines.push(format!("   ID: {}", plant.id));
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
