use serde::{Deserialize, Serialize};

/// Result of a print failure analysis. Build it with [`FailureReport::new`]
/// so the score stays in range.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// 0 (no risk) to 100.
    pub risk_score: u8,
    pub issues: Vec<Issue>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Issue {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl FailureReport {
    pub fn new(risk_score: f64, issues: Vec<Issue>) -> Self {
        Self {
            risk_score: risk_score.round().clamp(0.0, 100.0) as u8,
            issues,
        }
    }

    pub fn worst_severity(&self) -> Option<Severity> {
        self.issues
            .iter()
            .map(|x| x.severity)
            .filter(|x| *x != Severity::Unknown)
            .max()
    }
}
