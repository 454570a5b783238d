//! Sweep command for Sprig.
//!
//! Recomputes every plant of the owner at the current time and saves the
//! snapshots that changed. Meant for a periodic job (cron, systemd timer)
//! so stored records stay current without persisting on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::service::{CareService, SweepReport};
use crate::storage::PlantStore;

/// Options for the sweep command.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the sweep command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutput {
    /// Whether the sweep completed.
    pub success: bool,
    /// What the sweep did.
    #[serde(flatten)]
    pub report: SweepReport,
    /// Error message if the sweep failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SweepOutput {
    /// Create a successful output.
    pub fn success(report: SweepReport) -> Self {
        Self {
            success: true,
            report,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            report: SweepReport::default(),
            error: Some(error.into()),
        }
    }
}

/// The sweep command implementation.
pub struct SweepCommand<'a, S: PlantStore> {
    service: &'a CareService<S>,
    owner_id: String,
}

impl<'a, S: PlantStore> SweepCommand<'a, S> {
    /// Create a new sweep command.
    pub fn new(service: &'a CareService<S>, owner_id: impl Into<String>) -> Self {
        Self {
            service,
            owner_id: owner_id.into(),
        }
    }

    /// Run the sweep at `now`.
    pub fn run(&self, now: DateTime<Utc>) -> SweepOutput {
        match self.service.sweep(&self.owner_id, now) {
            Ok(report) => SweepOutput::success(report),
            Err(e) => SweepOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SweepOutput, options: &SweepOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Sweep failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let report = &output.report;
        let mut lines = vec![format!(
            "Swept {} plant(s): {} updated, {} overdue, {} never watered",
            report.examined,
            report.updated,
            report.overdue.len(),
            report.untracked
        )];
        for id in &report.overdue {
            lines.push(format!("  needs water: {}", id));
        }

        lines.join("\n") + "\n"
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
            .create(NewPlant::new("alice", "Basil", "img://basil"), day(0))
            .unwrap();
        svc.water("alice", &plant.id, day(0)).unwrap();
        svc.create(NewPlant::new("alice", "Moss", "img://moss"), day(0))
            .unwrap();
        (svc, plant.id)
    }

    #[test]
    fn test_sweep_persists_decay() {
        let (svc, id) = setup();
        let cmd = SweepCommand::new(&svc, "alice");

        let output = cmd.run(day(3));
        assert!(output.success);
        assert_eq!(output.report.examined, 2);
        assert_eq!(output.report.updated, 1);
        assert_eq!(output.report.overdue, vec![id.clone()]);

        let stored = svc.store().get(&id).unwrap().unwrap();
        assert_eq!(stored.health, 90);

        let text = cmd.format_output(&output, &SweepOptions::default());
        assert!(text.starts_with("Swept 2 plant(s): 1 updated, 1 overdue, 1 never watered"));
        assert!(text.contains(&format!("needs water: {}", id)));
    }

    #[test]
    fn test_sweep_nothing_due() {
        let (svc, _) = setup();
        let cmd = SweepCommand::new(&svc, "alice");

        let output = cmd.run(day(1));
        assert_eq!(output.report.updated, 0);
        assert!(output.report.overdue.is_empty());
    }

    #[test]
    fn test_sweep_json_is_flat() {
        let (svc, _) = setup();
        let cmd = SweepCommand::new(&svc, "alice");
        let options = SweepOptions {
            json: true,
            ..Default::default()
        };

        let output = cmd.run(day(3));
        let value: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &options)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["examined"], 2);
        assert_eq!(value["updated"], 1);
    }
}
