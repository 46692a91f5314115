//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::pipeline::context::StepResult;
use crate::domain::pipeline::inventory::ResourceInventory;
use crate::domain::scan::ScanFindings;
use crate::infrastructure::constants::{COST_ESTIMATES, COST_ESTIMATE_TOTAL};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render the static monthly cost estimate shown before the deploy
    /// confirmation gate
    pub fn render_cost_estimate(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("RESOURCE").set_alignment(CellAlignment::Left),
                Cell::new("MONTHLY ESTIMATE").set_alignment(CellAlignment::Right),
            ]);

        for (resource, estimate) in COST_ESTIMATES {
            table.add_row(vec![
                Cell::new(resource),
                Cell::new(estimate).set_alignment(CellAlignment::Right),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total").fg(self.theme.warning),
            Cell::new(COST_ESTIMATE_TOTAL)
                .fg(self.theme.warning)
                .set_alignment(CellAlignment::Right),
        ]);

        let mut output = String::new();
        output.push_str("💰 Estimated running cost\n");
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(
            &"Estimates are fixed list prices; actual billing varies with usage."
                .bright_black()
                .to_string(),
        );
        output
    }

    /// Render the per-step cleanup summary
    pub fn render_step_summary(&self, steps: &[StepResult]) -> String {
        if steps.is_empty() {
            return "No steps executed".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("STEP").set_alignment(CellAlignment::Left),
                Cell::new("RESULT").set_alignment(CellAlignment::Center),
            ]);

        for step in steps {
            let icon = StatusIcon::get_step_icon(step.succeeded, step.retryable);
            let label = if step.succeeded { "ok" } else { "failed" };
            table.add_row(vec![
                Cell::new(&step.step_name),
                Cell::new(format!("{} {}", icon, label))
                    .fg(self.theme.get_step_color(step.succeeded)),
            ]);
        }

        table.to_string()
    }

    /// Render the post-teardown verification checklist
    pub fn render_inventory(&self, inventory: &ResourceInventory) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("CATEGORY").set_alignment(CellAlignment::Left),
                Cell::new("REMAINING").set_alignment(CellAlignment::Left),
            ]);

        for (category, items) in [
            ("EKS clusters", &inventory.clusters),
            ("ECR repositories", &inventory.registries),
            ("VPCs", &inventory.networks),
        ] {
            let icon = StatusIcon::get_checklist_icon(items.len());
            let listing = if items.is_empty() {
                "none".to_string()
            } else {
                items.join(", ")
            };
            let color = if items.is_empty() {
                self.theme.success
            } else {
                self.theme.warning
            };
            table.add_row(vec![
                Cell::new(category),
                Cell::new(format!("{} {}", icon, listing)).fg(color),
            ]);
        }

        let mut output = String::new();
        output.push_str("🔍 Post-cleanup verification\n");
        output.push_str(&table.to_string());
        output.push('\n');
        if inventory.is_empty() {
            output.push_str(&format!(
                "{} No resources remaining\n",
                StatusIcon::SUCCESS.green()
            ));
        } else {
            output.push_str(&format!(
                "{} {} resource(s) still present, review in the AWS console\n",
                StatusIcon::WARNING.yellow(),
                inventory.total()
            ));
        }
        output
    }

    /// Render the scan report for one repository image
    pub fn render_scan_report(&self, repository: &str, tag: &str, scan: &ScanFindings) -> String {
        let counts = &scan.counts;
        let level = counts.alert_level();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("SEVERITY").set_alignment(CellAlignment::Left),
                Cell::new("COUNT").set_alignment(CellAlignment::Right),
            ]);

        for (label, count) in [
            ("CRITICAL", counts.critical),
            ("HIGH", counts.high),
            ("MEDIUM", counts.medium),
            ("LOW", counts.low),
        ] {
            table.add_row(vec![
                Cell::new(label).fg(self.theme.get_severity_color(label)),
                Cell::new(count.to_string()).set_alignment(CellAlignment::Right),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "🛡 Scan report for {}:{} ({})\n",
            repository,
            tag,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Risk score: {}  Alert level: {}\n",
            counts.risk_score(),
            level.as_str()
        ));

        let top = scan.top_findings();
        if !top.is_empty() {
            output.push_str("Top findings:\n");
            for (i, finding) in top.iter().enumerate() {
                output.push_str(&format!(
                    "{}. {} ({}) package: {}\n",
                    i + 1,
                    finding.name,
                    finding.severity,
                    finding.package
                ));
                if !finding.uri.is_empty() {
                    output.push_str(&format!("   {}\n", finding.uri.bright_black()));
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scan::{ScanFinding, SeverityCounts};

    #[test]
    fn test_render_cost_estimate() {
        let renderer = TableRenderer::new();
        let output = renderer.render_cost_estimate();
        assert!(output.contains("EKS control plane"));
        assert!(output.contains("Total"));
    }

    #[test]
    fn test_render_empty_steps() {
        let renderer = TableRenderer::new();
        assert!(renderer
            .render_step_summary(&[])
            .contains("No steps executed"));
    }

    #[test]
    fn test_render_inventory_empty_and_nonempty() {
        let renderer = TableRenderer::new();

        let empty = ResourceInventory::default();
        let output = renderer.render_inventory(&empty);
        assert!(output.contains("No resources remaining"));

        let leftover = ResourceInventory {
            clusters: vec!["dev".to_string()],
            registries: Vec::new(),
            networks: Vec::new(),
        };
        let output = renderer.render_inventory(&leftover);
        assert!(output.contains("dev"));
        assert!(output.contains("still present"));
    }

    #[test]
    fn test_render_scan_report() {
        let renderer = TableRenderer::new();
        let scan = ScanFindings {
            counts: SeverityCounts {
                critical: 1,
                high: 0,
                medium: 2,
                low: 0,
            },
            findings: vec![ScanFinding {
                name: "CVE-2024-0001".to_string(),
                severity: "CRITICAL".to_string(),
                package: "openssl".to_string(),
                uri: String::new(),
            }],
        };

        let output = renderer.render_scan_report("app", "latest", &scan);
        assert!(output.contains("app:latest"));
        assert!(output.contains("Risk score: 14"));
        assert!(output.contains("CRITICAL"));
        assert!(output.contains("CVE-2024-0001"));
    }
}
