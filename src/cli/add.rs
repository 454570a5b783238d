//! Add command for Sprig.
//!
//! Registers a new plant from an image reference. When no species is given
//! the identification service is asked for one; if it fails the plant is
//! still created with species "Unknown".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::list::PlantInfo;
use crate::core::NewPlant;
use crate::identify::{identify_or_unknown, Identification, SpeciesIdentifier};
use crate::service::CareService;
use crate::storage::PlantStore;

/// Options for the add command.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Species name; skips identification when set.
    pub species: Option<String>,
    /// Display nickname.
    pub nickname: Option<String>,
    /// Watering cadence in days (default from config).
    pub frequency_days: Option<u32>,
    /// Sunlight hint (default from config).
    pub sunlight: Option<String>,
    /// Record a watering at creation time so the schedule starts now.
    pub watered: bool,
}

/// Output format for the add command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutput {
    /// Whether the plant was created.
    pub success: bool,
    /// The created plant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant: Option<PlantInfo>,
    /// Identification result, when the species was looked up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<Identification>,
    /// Error message if creation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddOutput {
    /// Create a successful output.
    pub fn success(plant: PlantInfo, identification: Option<Identification>) -> Self {
        Self {
            success: true,
            plant: Some(plant),
            identification,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            plant: None,
            identification: None,
            error: Some(error.into()),
        }
    }
}

/// The add command implementation.
pub struct AddCommand<'a, S: PlantStore> {
    service: &'a CareService<S>,
    identifier: &'a dyn SpeciesIdentifier,
    owner_id: String,
}

impl<'a, S: PlantStore> AddCommand<'a, S> {
    /// Create a new add command.
    pub fn new(
        service: &'a CareService<S>,
        identifier: &'a dyn SpeciesIdentifier,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            service,
            identifier,
            owner_id: owner_id.into(),
        }
    }

    /// Run the add command for the image at `image_ref`.
    pub fn run(&self, image_ref: &str, options: &AddOptions, now: DateTime<Utc>) -> AddOutput {
        let explicit = options
            .species
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let (species, identification) = match explicit {
            Some(species) => (species.to_string(), None),
            None => {
                let id = identify_or_unknown(self.identifier, image_ref);
                (id.species_name.clone(), Some(id))
            }
        };

        let mut request = NewPlant::new(&self.owner_id, species, image_ref);
        if let Some(nickname) = &options.nickname {
            request = request.nickname(nickname);
        }
        if let Some(days) = options.frequency_days {
            request = request.watering_frequency_days(days);
        }
        if let Some(sunlight) = &options.sunlight {
            request = request.sunlight(sunlight);
        }

        let created = if options.watered {
            self.service.create_watered(request, now)
        } else {
            self.service.create(request, now)
        };

        match created {
            Ok(plant) => AddOutput::success(PlantInfo::from_plant(&plant, now), identification),
            Err(e) => AddOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &AddOutput, options: &AddOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &AddOutput) -> String {
        let plant = match (&output.plant, output.success) {
            (Some(plant), true) => plant,
            _ => {
                return format!(
                    "Add failed: {}\n",
                    output.error.as_deref().unwrap_or("unknown error")
                );
            }
        };

        let mut lines = vec![format!("Added {}", plant.headline())];

        if let Some(id) = &output.identification {
            if id.is_known() {
                lines.push(format!(
                    "  Identified as {} ({:.0}% confidence)",
                    id.species_name,
                    id.confidence * 100.0
                ));
            } else {
                lines.push("  Species could not be identified; set it later.".to_string());
            }
        }

        lines.push(format!("  {}", plant.schedule_line()));
        if let Some(sunlight) = &plant.sunlight {
            lines.push(format!("  Sunlight: {}", sunlight));
        }
        lines.push(format!("  ID: {}", plant.id));

        lines.join("\n") + "\n"
    }
}
