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

//! Helm wrapper for the load-balancer controller add-on.

use crate::infrastructure::constants::{
    ADDON_CHART, ADDON_NAMESPACE, ADDON_RELEASE_NAME, HELM_REPO_NAME, HELM_REPO_URL,
};
use crate::infrastructure::exec::{CommandRunner, CommandSpec};
use crate::shared::error::{Result, StackError};
use std::sync::Arc;

const HELM_BIN: &str = "helm";

pub struct HelmCli {
    runner: Arc<dyn CommandRunner>,
}

impl HelmCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Install (or upgrade) the AWS load-balancer controller. Re-runnable:
    /// the repo add is forced and the release uses `upgrade --install`.
    pub async fn install_loadbalancer_controller(
        &self,
        cluster_name: &str,
        region: &str,
    ) -> Result<()> {
        let spec = CommandSpec::new(HELM_BIN).args([
            "repo",
            "add",
            HELM_REPO_NAME,
            HELM_REPO_URL,
            "--force-update",
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::AddonInstallFailure(format!(
                "helm repo add failed: {}",
                output.stderr_trimmed()
            )));
        }

        let cluster_set = format!("clusterName={}", cluster_name);
        let region_set = format!("region={}", region);
        let spec = CommandSpec::new(HELM_BIN).args([
            "upgrade",
            "--install",
            ADDON_RELEASE_NAME,
            ADDON_CHART,
            "-n",
            ADDON_NAMESPACE,
            "--set",
            &cluster_set,
            "--set",
            &region_set,
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::AddonInstallFailure(
                output.stderr_trimmed().to_string(),
            ));
        }
        Ok(())
    }

    /// Uninstall the add-on release. A release that was never installed is
    /// not an error during teardown.
    pub async fn uninstall_loadbalancer_controller(&self) -> Result<()> {
        let spec = CommandSpec::new(HELM_BIN).args([
            "uninstall",
            ADDON_RELEASE_NAME,
            "-n",
            ADDON_NAMESPACE,
        ]);
        let output = self.runner.run(&spec).await?;
        if !output.success() && !output.stderr.contains("not found") {
            tracing::warn!(
                "Failed to uninstall {}: {}",
                ADDON_RELEASE_NAME,
                output.stderr_trimmed()
            );
        }
        Ok(())
    }
}
