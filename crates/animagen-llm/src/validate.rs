//! Advisory structural validation of generated scripts
//!
//! Heuristic sanity check run before rendering. Purely a logging signal:
//! the render step is the authoritative judge of correctness, so a failed
//! validation never blocks an attempt.

use serde::{Deserialize, Serialize};

/// Outcome of a structural sanity check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// Single-line summary for logging
    pub fn summary(&self) -> String {
        if self.passed {
            "Script structure looks good".to_string()
        } else {
            self.issues.join("; ")
        }
    }
}

/// Check a script for the structural features a renderable scene needs
pub fn validate_script(code: &str) -> ValidationReport {
    let mut issues = Vec::new();

    if !code.contains("from manim import") && !code.contains("import manim") {
        issues.push("Missing Manim imports".to_string());
    }

    if !code.contains("class ") {
        issues.push("Missing Scene class definition".to_string());
    }

    if !code.contains("def construct(self)") {
        issues.push("Missing construct method".to_string());
    }

    if !code.contains("self.play") && !code.contains("self.add") {
        issues.push("No animations or objects added to scene".to_string());
    }

    ValidationReport {
        passed: issues.is_empty(),
        issues,
    }
}
