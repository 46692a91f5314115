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

//! kubectl wrapper: the connectivity probe and best-effort draining of
//! cluster-managed external resources.

use crate::infrastructure::exec::{CommandRunner, CommandSpec};
use crate::shared::error::{Result, StackError};
use serde_json::Value;
use std::sync::Arc;

const KUBECTL_BIN: &str = "kubectl";

pub struct KubectlCli {
    runner: Arc<dyn CommandRunner>,
}

impl KubectlCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Read-only probe that the cluster is actually reachable with the
    /// freshly written kubeconfig.
    pub async fn get_nodes(&self) -> Result<String> {
        let spec = CommandSpec::new(KUBECTL_BIN).args(["get", "nodes", "-o", "wide"]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::ConnectivityError(
                output.stderr_trimmed().to_string(),
            ));
        }
        Ok(output.stdout.clone())
    }

    /// Delete every LoadBalancer-type service so the cloud-side load
    /// balancers start tearing down before `terraform destroy` runs.
    /// Best-effort: per-service failures are logged, never fatal.
    pub async fn delete_loadbalancer_services(&self) -> Result<usize> {
        let spec =
            CommandSpec::new(KUBECTL_BIN).args(["get", "svc", "--all-namespaces", "-o", "json"]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            tracing::warn!(
                "Could not list services, skipping drain: {}",
                output.stderr_trimmed()
            );
            return Ok(0);
        }

        let value: Value = serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| StackError::output_parse(KUBECTL_BIN, e.to_string()))?;

        let mut deleted = 0;
        for item in value["items"].as_array().into_iter().flatten() {
            if item["spec"]["type"].as_str() != Some("LoadBalancer") {
                continue;
            }
            let name = item["metadata"]["name"].as_str().unwrap_or_default();
            let namespace = item["metadata"]["namespace"].as_str().unwrap_or("default");
            if name.is_empty() {
                continue;
            }

            let spec = CommandSpec::new(KUBECTL_BIN).args([
                "delete",
                "svc",
                name,
                "-n",
                namespace,
                "--ignore-not-found",
            ]);
            match self.runner.run(&spec).await {
                Ok(out) if out.success() => deleted += 1,
                Ok(out) => tracing::warn!(
                    "Failed to delete service {}/{}: {}",
                    namespace,
                    name,
                    out.stderr_trimmed()
                ),
                Err(e) => tracing::warn!("Failed to delete service {}/{}: {}", namespace, name, e),
            }
        }
        Ok(deleted)
    }

    /// Delete all ingress objects so ingress-managed ALBs are released.
    pub async fn delete_all_ingresses(&self) -> Result<()> {
        let spec = CommandSpec::new(KUBECTL_BIN).args([
            "delete",
            "ingress",
            "--all",
            "--all-namespaces",
            "--ignore-not-found",
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            tracing::warn!("Failed to delete ingresses: {}", output.stderr_trimmed());
        }
        Ok(())
    }
}
