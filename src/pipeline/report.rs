//! Run report written to `run_report.json`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    /// Completed with substituted content, images or data
    Fallback,
    Skipped,
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Ok => "ok",
            StepStatus::Fallback => "fallback",
            StepStatus::Skipped => "skipped",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub name: String,
    pub status: StepStatus,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub steps: Vec<StepReport>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, name: &str, status: StepStatus, detail: impl Into<String>) {
        self.steps.push(StepReport {
            name: name.to_string(),
            status,
            detail: detail.into(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn failed_steps(&self) -> Vec<&StepReport> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .collect()
    }

    /// Duration in milliseconds, once finished
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_lowercase_status() {
        let mut report = RunReport::start();
        report.push("seo", StepStatus::Fallback, "2 pages");
        report.finish();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["steps"][0]["status"], "fallback");
        assert!(json["finished_at"].is_string());
        assert!(report.duration_ms().unwrap() >= 0);
    }

    #[test]
    fn test_failed_steps() {
        let mut report = RunReport::start();
        report.push("a", StepStatus::Ok, "");
        report.push("b", StepStatus::Failed, "boom");

        assert_eq!(report.failed_steps().len(), 1);
        assert_eq!(report.step("b").unwrap().detail, "boom");
        assert!(report.step("c").is_none());
    }
}
