use console::style;

use crate::pipeline::{RunReport, StepStatus};

/// User-facing console lines; diagnostics go through `tracing`
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    /// Aligned `key: value` line
    pub fn field(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<14} {}", style(key).dim(), value);
        }
    }

    /// One line per step, then a summary
    pub fn run_report(&self, report: &RunReport) {
        self.section("Steps");
        for step in &report.steps {
            let marker = match step.status {
                StepStatus::Ok => style("✓").green(),
                StepStatus::Fallback => style("↺").yellow(),
                StepStatus::Skipped => style("-").dim(),
                StepStatus::Failed => style("✗").red(),
            };
            if !self.quiet || step.status == StepStatus::Failed {
                println!("{} {:<20} {}", marker, step.name, style(&step.detail).dim());
            }
        }

        let failed = report.failed_steps().len();
        if failed == 0 {
            self.success(&format!("Run {} finished", report.run_id));
        } else {
            self.warning(&format!("Run {} finished with {} failed step(s)", report.run_id, failed));
        }
        if let Some(ms) = report.duration_ms() {
            self.field("Duration", &format!("{:.1}s", ms as f64 / 1000.0));
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(false)
    }
}
