//! Validation reports and their rendering

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::violation::Violation;

/// What a report was produced for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportKind {
    Index { path: PathBuf, vertical_count: usize },
    Package { name: String },
}

/// Outcome of one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub subject: ReportKind,
    pub passed: bool,
    pub error_count: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(subject: ReportKind, violations: Vec<Violation>) -> Self {
        Self {
            subject,
            passed: violations.is_empty(),
            error_count: violations.len(),
            violations,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Process exit code for this report
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }

    /// Human-readable summary, one line per violation
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if !self.passed {
            let _ = writeln!(
                out,
                "VALIDATION FAILED: {} error(s) found",
                self.error_count
            );
            for violation in &self.violations {
                let _ = writeln!(out, "  - {violation}");
            }
            return out;
        }

        match &self.subject {
            ReportKind::Index { vertical_count, .. } => {
                let _ = writeln!(
                    out,
                    "VALIDATION PASSED: {vertical_count} vertical(s) validated successfully"
                );
            }
            ReportKind::Package { name } => {
                let _ = writeln!(out, "VALIDATION PASSED: Package {name} is valid");
            }
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
