//! Show command for Sprig.
//!
//! Displays one plant's details with its care state recomputed now.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::list::PlantInfo;
use crate::service::CareService;
use crate::storage::PlantStore;

/// Options for the show command.
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the show command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowOutput {
    /// Whether the plant was found.
    pub success: bool,
    /// The plant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant: Option<PlantInfo>,
    /// Error message if lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShowOutput {
    /// Create a successful output.
    pub fn success(plant: PlantInfo) -> Self {
        Self {
            success: true,
            plant: Some(plant),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            plant: None,
            error: Some(error.into()),
        }
    }
}

/// The show command implementation.
pub struct ShowCommand<'a, S: PlantStore> {
    service: &'a CareService<S>,
    owner_id: String,
}

impl<'a, S: PlantStore> ShowCommand<'a, S> {
    /// Create a new show command.
    pub fn new(service: &'a CareService<S>, owner_id: impl Into<String>) -> Self {
        Self {
            service,
            owner_id: owner_id.into(),
        }
    }

    /// Run the show command for `plant_id`.
    pub fn run(&self, plant_id: &str, now: DateTime<Utc>) -> ShowOutput {
        match self.service.get(&self.owner_id, plant_id, now) {
            Ok(plant) => ShowOutput::success(PlantInfo::from_plant(&plant, now)),
            Err(e) => ShowOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ShowOutput, options: &ShowOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ShowOutput) -> String {
        let Some(plant) = output.plant.as_ref().filter(|_| output.success) else {
            return format!(
                "Show failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        };

        let mut lines = Vec::new();
        lines.push(plant.name.clone());
        lines.push(format!("  Species:    {}", plant.species));
        lines.push(format!(
            "  Health:     {}% ({}){}",
            plant.health,
            plant.health_band,
            if plant.needs_attention {
                " - needs attention"
            } else {
                ""
            }
        ));

        let status = match plant.days_until_watering {
            None => "No watering recorded yet".to_string(),
            Some(d) if d <= 0 => "Watering is due!".to_string(),
            Some(1) => "Water in 1 day".to_string(),
            Some(d) => format!("Water in {} days", d),
        };
        lines.push(format!("  Status:     {}", status));
        lines.push(format!(
            "  Frequency:  every {} day(s)",
            plant.watering_frequency_days
        ));

        if let Some(next) = plant
            .next_watering_at
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        {
            lines.push(format!("  Next water: {}", next.format("%Y-%m-%d %H:%M UTC")));
        }
        if let Some(sunlight) = &plant.sunlight {
            lines.push(format!("  Sunlight:   {}", sunlight));
        }
        lines.push(format!("  Image:      {}", plant.image_ref));
        lines.push(format!("  ID:         {}", plant.id));

        lines.join("\n") + "\n"
    }
}
