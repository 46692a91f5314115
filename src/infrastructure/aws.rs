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

//! AWS CLI wrapper: identity introspection, kubeconfig, ECR and the
//! read-only existence scans used after teardown.

use crate::domain::scan::{ScanFinding, ScanFindings, SeverityCounts};
use crate::infrastructure::exec::{CommandRunner, CommandSpec};
use crate::shared::error::{Result, StackError};
use serde_json::Value;
use std::sync::Arc;

const AWS_BIN: &str = "aws";

#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

pub struct AwsCli {
    runner: Arc<dyn CommandRunner>,
}

impl AwsCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn run_json(&self, spec: &CommandSpec) -> Result<Value> {
        let output = self.runner.run(spec).await?;
        if !output.success() {
            return Err(output.into_error(spec));
        }
        serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| StackError::output_parse(AWS_BIN, e.to_string()))
    }

    /// Resolve the active credentials. Failure means the operator has no
    /// usable session and must fix credentials out of band.
    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        let spec = CommandSpec::new(AWS_BIN).args([
            "sts",
            "get-caller-identity",
            "--output",
            "json",
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::AuthenticationError(
                output.stderr_trimmed().to_string(),
            ));
        }

        let value: Value = serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| StackError::output_parse(AWS_BIN, e.to_string()))?;
        let account = value["Account"].as_str().unwrap_or_default().to_string();
        let arn = value["Arn"].as_str().unwrap_or_default().to_string();
        if account.is_empty() || arn.is_empty() {
            return Err(StackError::AuthenticationError(
                "caller identity response missing Account or Arn".to_string(),
            ));
        }
        Ok(CallerIdentity { account, arn })
    }

    pub async fn update_kubeconfig(&self, cluster_name: &str, region: &str) -> Result<()> {
        let spec = CommandSpec::new(AWS_BIN).args([
            "eks",
            "update-kubeconfig",
            "--name",
            cluster_name,
            "--region",
            region,
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::ConnectivityError(format!(
                "failed to write kubeconfig for '{}': {}",
                cluster_name,
                output.stderr_trimmed()
            )));
        }
        Ok(())
    }

    /// List all image ids stored in a repository. A missing repository is
    /// treated as empty.
    pub async fn list_image_ids(&self, repository: &str, region: &str) -> Result<Vec<Value>> {
        let spec = CommandSpec::new(AWS_BIN).args([
            "ecr",
            "list-images",
            "--repository-name",
            repository,
            "--region",
            region,
            "--output",
            "json",
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            if output.stderr.contains("RepositoryNotFoundException") {
                return Ok(Vec::new());
            }
            return Err(output.into_error(&spec));
        }

        let value: Value = serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| StackError::output_parse(AWS_BIN, e.to_string()))?;
        Ok(value["imageIds"].as_array().cloned().unwrap_or_default())
    }

    /// Force-delete a batch of images. ECR refuses to delete a non-empty
    /// repository, so this must run before `terraform destroy`.
    pub async fn batch_delete_images(
        &self,
        repository: &str,
        region: &str,
        image_ids: &[Value],
    ) -> Result<()> {
        let ids = serde_json::to_string(image_ids)?;
        let spec = CommandSpec::new(AWS_BIN).args([
            "ecr",
            "batch-delete-image",
            "--repository-name",
            repository,
            "--region",
            region,
            "--image-ids",
            &ids,
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(output.into_error(&spec));
        }
        Ok(())
    }

    pub async fn eks_cluster_exists(&self, cluster_name: &str, region: &str) -> Result<bool> {
        let spec = CommandSpec::new(AWS_BIN).args([
            "eks",
            "describe-cluster",
            "--name",
            cluster_name,
            "--region",
            region,
        ]);
        let output = self.runner.run(&spec).await?;
        if output.success() {
            return Ok(true);
        }
        if output.stderr.contains("ResourceNotFoundException") {
            return Ok(false);
        }
        Err(output.into_error(&spec))
    }

    pub async fn ecr_repository_names(&self, region: &str) -> Result<Vec<String>> {
        let spec = CommandSpec::new(AWS_BIN).args([
            "ecr",
            "describe-repositories",
            "--region",
            region,
            "--output",
            "json",
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            if output.stderr.contains("RepositoryNotFoundException") {
                return Ok(Vec::new());
            }
            return Err(output.into_error(&spec));
        }

        let value: Value = serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| StackError::output_parse(AWS_BIN, e.to_string()))?;
        let names = value["repositories"]
            .as_array()
            .map(|repos| {
                repos
                    .iter()
                    .filter_map(|r| r["repositoryName"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }

    /// VPC ids carrying the given Name tag.
    pub async fn vpc_ids_by_name(&self, name: &str, region: &str) -> Result<Vec<String>> {
        let filter = format!("Name=tag:Name,Values={}", name);
        let spec = CommandSpec::new(AWS_BIN).args([
            "ec2",
            "describe-vpcs",
            "--filters",
            &filter,
            "--region",
            region,
            "--output",
            "json",
        ]);
        let value = self.run_json(&spec).await?;
        let ids = value["Vpcs"]
            .as_array()
            .map(|vpcs| {
                vpcs.iter()
                    .filter_map(|v| v["VpcId"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }

    /// Fetch completed scan findings for one image.
    pub async fn describe_image_scan_findings(
        &self,
        repository: &str,
        tag: &str,
        region: &str,
    ) -> Result<ScanFindings> {
        let image_id = format!("imageTag={}", tag);
        let spec = CommandSpec::new(AWS_BIN).args([
            "ecr",
            "describe-image-scan-findings",
            "--repository-name",
            repository,
            "--image-id",
            &image_id,
            "--region",
            region,
            "--output",
            "json",
        ]);
        let value = self.run_json(&spec).await?;
        let scan = &value["imageScanFindings"];

        let sev = &scan["findingSeverityCounts"];
        let counts = SeverityCounts {
            critical: sev["CRITICAL"].as_u64().unwrap_or(0) as u32,
            high: sev["HIGH"].as_u64().unwrap_or(0) as u32,
            medium: sev["MEDIUM"].as_u64().unwrap_or(0) as u32,
            low: sev["LOW"].as_u64().unwrap_or(0) as u32,
        };

        let findings = scan["findings"]
            .as_array()
            .map(|items| items.iter().map(parse_finding).collect())
            .unwrap_or_default();

        Ok(ScanFindings { counts, findings })
    }
}

fn parse_finding(value: &Value) -> ScanFinding {
    let package = value["attributes"]
        .as_array()
        .and_then(|attrs| {
            attrs.iter().find_map(|a| {
                let key = a["key"].as_str()?;
                if key.eq_ignore_ascii_case("package_name") {
                    a["value"].as_str().map(String::from)
                } else {
                    None
                }
            })
        })
        .unwrap_or_else(|| "unknown".to_string());

    ScanFinding {
        name: value["name"].as_str().unwrap_or("unknown").to_string(),
        severity: value["severity"].as_str().unwrap_or("UNKNOWN").to_string(),
        uri: value["uri"].as_str().unwrap_or_default().to_string(),
        package,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finding_package_attribute() {
        let value: Value = serde_json::from_str(
            r#"{
                "name": "CVE-2024-0001",
                "severity": "HIGH",
                "uri": "https://nvd.example/CVE-2024-0001",
                "attributes": [
                    {"key": "CVSS2_SCORE", "value": "7.5"},
                    {"key": "package_name", "value": "openssl"}
                ]
            }"#,
        )
        .unwrap();

        let finding = parse_finding(&value);
        assert_eq!(finding.name, "CVE-2024-0001");
        assert_eq!(finding.severity, "HIGH");
        assert_eq!(finding.package, "openssl");
    }

    #[test]
    fn test_parse_finding_missing_fields() {
        let value: Value = serde_json::from_str("{}").unwrap();
        let finding = parse_finding(&value);
        assert_eq!(finding.name, "unknown");
        assert_eq!(finding.severity, "UNKNOWN");
        assert_eq!(finding.package, "unknown");
    }
}
