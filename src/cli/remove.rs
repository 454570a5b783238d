//! Remove command for Sprig.

use serde::{Deserialize, Serialize};

use crate::service::CareService;
use crate::storage::PlantStore;

/// Options for the remove command.
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the remove command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOutput {
    /// Whether the plant was removed.
    pub success: bool,
    /// ID of the removed plant.
    pub plant_id: String,
    /// Display name of the removed plant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Error message if removal failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoveOutput {
    /// Create a successful output.
    pub fn success(plant_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            success: true,
            plant_id: plant_id.into(),
            name: Some(name.into()),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(plant_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            plant_id: plant_id.into(),
            name: None,
            error: Some(error.into()),
        }
    }
}

/// The remove command implementation.
pub struct RemoveCommand<'a, S: PlantStore> {
    service: &'a CareService<S>,
    owner_id: String,
}

impl<'a, S: PlantStore> RemoveCommand<'a, S> {
    /// Create a new remove command.
    pub fn new(service: &'a CareService<S>, owner_id: impl Into<String>) -> Self {
        Self {
            service,
            owner_id: owner_id.into(),
        }
    }

    /// Run the remove command for `plant_id`.
    pub fn run(&self, plant_id: &str) -> RemoveOutput {
        match self.service.delete(&self.owner_id, plant_id) {
            Ok(plant) => RemoveOutput::success(&plant.id, plant.display_name()),
            Err(e) => RemoveOutput::failure(plant_id, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RemoveOutput, options: &RemoveOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if output.success {
            format!(
                "Removed {} ({})\n",
                output.name.as_deref().unwrap_or("plant"),
                output.plant_id
            )
        } else {
            format!(
                "Remove failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
