//! Water command for Sprig.
//!
//! Records a watering event: health heals, the schedule restarts from now
//! and the attention flag clears.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::list::PlantInfo;
use crate::service::CareService;
use crate::storage::PlantStore;

/// Options for the water command.
#[derive(Debug, Clone, Default)]
pub struct WaterOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the water command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterOutput {
    /// Whether the watering was recorded.
    pub success: bool,
    /// Health just before watering (after accrued decay).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_health: Option<u8>,
    /// The watered plant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plant: Option<PlantInfo>,
    /// Error message if watering failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WaterOutput {
    /// Create a successful output.
    pub fn success(previous_health: Option<u8>, plant: PlantInfo) -> Self {
        Self {
            success: true,
            previous_health,
            plant: Some(plant),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            previous_health: None,
            plant: None,
            error: Some(error.into()),
        }
    }
}

/// The water command implementation.
pub struct WaterCommand<'a, S: PlantStore> {
    service: &'a CareService<S>,
    owner_id: String,
}

impl<'a, S: PlantStore> WaterCommand<'a, S> {
    /// Create a new water command.
    pub fn new(service: &'a CareService<S>, owner_id: impl Into<String>) -> Self {
        Self {
            service,
            owner_id: owner_id.into(),
        }
    }

    /// Run the water command for `plant_id`.
    pub fn run(&self, plant_id: &str, now: DateTime<Utc>) -> WaterOutput {
        // Informational only; the service re-reads under its lock.
        let previous_health = self
            .service
            .get(&self.owner_id, plant_id, now)
            .ok()
            .map(|p| p.health);

        match self.service.water(&self.owner_id, plant_id, now) {
            Ok(plant) => WaterOutput::success(previous_health, PlantInfo::from_plant(&plant, now)),
            Err(e) => WaterOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &WaterOutput, options: &WaterOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &WaterOutput) -> String {
        let Some(plant) = output.plant.as_ref().filter(|_| output.success) else {
            return format!(
                "Water failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        };

        let health = match output.previous_health {
            Some(before) if before != plant.health => {
                format!("health {}% -> {}%", before, plant.health)
            }
            _ => format!("health {}%", plant.health),
        };

        format!(
            "Watered {} ({})\n  {}\n",
            plant.name,
            health,
            plant.schedule_line()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CareConfig;
    use crate::core::NewPlant;
    use crate::storage::MemoryPlantStore;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn setup() -> (CareService<MemoryPlantStore>, String) {
        let svc = CareService::new(MemoryPlantStore::new(), CareConfig::default());
        let plant = svc
            .create(
                NewPlant::new("alice", "Pothos", "img://pothos").nickname("Goldie"),
                day(0),
            )
            .unwrap();
        svc.water("alice", &plant.id, day(0)).unwrap();
        (svc, plant.id)
    }

    #[test]
    fn test_water_overdue_plant() {
        let (svc, id) = setup();
        let cmd = WaterCommand::new(&svc, "alice");

        let output = cmd.run(&id, day(5));
        assert!(output.success);
        assert_eq!(output.previous_health, Some(70));

        let plant = output.plant.as_ref().unwrap();
        assert_eq!(plant.health, 90);
        assert_eq!(plant.state, "ok");
        assert!(!plant.needs_attention);
        assert_eq!(plant.days_until_watering, Some(3));

        let text = cmd.format_output(&output, &WaterOptions::default());
        assert!(text.starts_with("Watered Goldie (health 70% -> 90%)"));
        assert!(text.contains("due in 3 days"));
    }

    #[test]
    fn test_water_healthy_plant_caps_at_100() {
        let (svc, id) = setup();
        let cmd = WaterCommand::new(&svc, "alice");

        let output = cmd.run(&id, day(1));
        assert_eq!(output.plant.as_ref().unwrap().health, 100);

        let text = cmd.format_output(&output, &WaterOptions::default());
        assert!(text.starts_with("Watered Goldie (health 100%)"));
    }

    #[test]
    fn test_water_missing_plant() {
        let (svc, _) = setup();
        let cmd = WaterCommand::new(&svc, "alice");

        let output = cmd.run("pl_20260301_00000000", day(1));
        assert!(!output.success);
        assert!(output.error.unwrap().contains("pl_20260301_00000000"));
    }

    #[test]
    fn test_water_json_and_quiet() {
        let (svc, id) = setup();
        let cmd = WaterCommand::new(&svc, "alice");
        let output = cmd.run(&id, day(4));

        let json = cmd.format_output(
            &output,
            &WaterOptions {
                json: true,
                ..Default::default()
            },
        );
        let parsed: WaterOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.previous_health, Some(80));
        assert_eq!(parsed.plant.unwrap().health, 100);

        let quiet = WaterOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &quiet).is_empty());
    }
}
