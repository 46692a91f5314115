// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Image scan severity analysis: weighted risk score and alert level
//! derived from ECR finding counts.

use serde::{Deserialize, Serialize};

/// How many findings of interest to surface in the report.
pub const TOP_FINDINGS: usize = 5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityCounts {
    /// Weighted risk score: criticals dominate, lows barely register.
    pub fn risk_score(&self) -> u32 {
        self.critical * 10 + self.high * 5 + self.medium * 2 + self.low
    }

    pub fn alert_level(&self) -> AlertLevel {
        if self.critical > 0 {
            AlertLevel::Critical
        } else if self.high > 5 {
            AlertLevel::High
        } else if self.high > 0 {
            AlertLevel::Medium
        } else {
            AlertLevel::Info
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "INFO",
            AlertLevel::Medium => "MEDIUM",
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanFinding {
    pub name: String,
    pub severity: String,
    pub package: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanFindings {
    pub counts: SeverityCounts,
    pub findings: Vec<ScanFinding>,
}

impl ScanFindings {
    /// The most severe findings first, capped at [`TOP_FINDINGS`].
    pub fn top_findings(&self) -> Vec<&ScanFinding> {
        let mut sorted: Vec<&ScanFinding> = self.findings.iter().collect();
        sorted.sort_by_key(|f| std::cmp::Reverse(severity_rank(&f.severity)));
        sorted.truncate(TOP_FINDINGS);
        sorted
    }
}

pub fn severity_rank(severity: &str) -> u8 {
    match severity.to_ascii_uppercase().as_str() {
        "CRITICAL" => 4,
        "HIGH" => 3,
        "MEDIUM" => 2,
        "LOW" => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_score_weighting() {
        let counts = SeverityCounts {
            critical: 1,
            high: 2,
            medium: 3,
            low: 4,
        };
        assert_eq!(counts.risk_score(), 10 + 10 + 6 + 4);
        assert_eq!(SeverityCounts::default().risk_score(), 0);
    }

    #[test]
    fn test_alert_levels() {
        let mut counts = SeverityCounts::default();
        assert_eq!(counts.alert_level(), AlertLevel::Info);

        counts.high = 1;
        assert_eq!(counts.alert_level(), AlertLevel::Medium);

        counts.high = 6;
        assert_eq!(counts.alert_level(), AlertLevel::High);

        counts.critical = 1;
        assert_eq!(counts.alert_level(), AlertLevel::Critical);
    }

    #[test]
    fn test_top_findings_sorted_and_capped() {
        let finding = |name: &str, severity: &str| ScanFinding {
            name: name.to_string(),
            severity: severity.to_string(),
            package: "pkg".to_string(),
            uri: String::new(),
        };

        let findings = ScanFindings {
            counts: SeverityCounts::default(),
            findings: vec![
                finding("a", "LOW"),
                finding("b", "CRITICAL"),
                finding("c", "MEDIUM"),
                finding("d", "HIGH"),
                finding("e", "LOW"),
                finding("f", "HIGH"),
                finding("g", "LOW"),
            ],
        };

        let top = findings.top_findings();
        assert_eq!(top.len(), TOP_FINDINGS);
        assert_eq!(top[0].name, "b");
        assert_eq!(top[1].severity, "HIGH");
        assert_eq!(top[2].severity, "HIGH");
        assert_eq!(top[3].severity, "MEDIUM");
    }
}
