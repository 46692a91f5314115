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

//! Deploy pipeline: preflight → credentials → cost gate → terraform →
//! cluster access → add-on. Strictly sequential; each step gates the next.
//! Failures after the gate abort immediately so partial infrastructure is
//! left for Terraform to reconcile on a re-run, except the add-on install
//! which is best-effort and re-runnable.

use crate::domain::config::StackConf;
use crate::domain::pipeline::context::DeploymentContext;
use crate::domain::pipeline::preflight::PreflightChecker;
use crate::infrastructure::constants::{
    DEPLOY_CONFIRMATION, OUTPUT_CLUSTER_NAME, OUTPUT_REGION,
};
use crate::infrastructure::exec::{CommandRunner, ConfirmationPrompt};
use crate::infrastructure::helm::HelmCli;
use crate::infrastructure::kubectl::KubectlCli;
use crate::infrastructure::terraform::TerraformCli;
use crate::shared::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub enum DeployOutcome {
    Completed(DeploymentContext),
    Cancelled,
}

pub struct DeployPipeline {
    conf: StackConf,
    runner: Arc<dyn CommandRunner>,
    prompt: Box<dyn ConfirmationPrompt>,
    work_dir: PathBuf,
    gate_banner: String,
}

impl DeployPipeline {
    pub fn new(
        conf: StackConf,
        runner: Arc<dyn CommandRunner>,
        prompt: Box<dyn ConfirmationPrompt>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            conf,
            runner,
            prompt,
            work_dir: work_dir.into(),
            gate_banner: String::new(),
        }
    }

    /// Text shown before the confirmation gate, typically the rendered
    /// cost estimate. Rendering stays with the caller.
    pub fn with_gate_banner(mut self, banner: impl Into<String>) -> Self {
        self.gate_banner = banner.into();
        self
    }

    pub async fn run(&self) -> Result<DeployOutcome> {
        let preflight = PreflightChecker::new(self.runner.clone());
        preflight.check_tools().await?;

        let identity = preflight.validate_credentials().await?;
        println!("✓ Authenticated as {} (account {})", identity.arn, identity.account);

        if !self.gate_banner.is_empty() {
            println!("{}", self.gate_banner);
        }
        let answer = self
            .prompt
            .read_line("Proceed with deployment? Type 'yes' to continue: ")?;
        if answer.trim() != DEPLOY_CONFIRMATION {
            return Ok(DeployOutcome::Cancelled);
        }

        let mut ctx = DeploymentContext::new(&self.conf);
        ctx.confirmed = true;

        let terraform = TerraformCli::new(self.runner.clone(), self.work_dir.clone());
        println!("Initializing Terraform...");
        terraform.init().await?;
        println!("✓ Terraform initialized");

        println!("Planning and applying infrastructure...");
        terraform.plan_and_apply(&self.conf.var_args()?).await?;
        println!("✓ Infrastructure applied");

        // Refresh the context from applied state rather than trusting the
        // local settings file.
        ctx.cluster_name = terraform.output_raw(OUTPUT_CLUSTER_NAME).await?;
        ctx.region = terraform.output_raw(OUTPUT_REGION).await?;

        let aws = crate::infrastructure::aws::AwsCli::new(self.runner.clone());
        aws.update_kubeconfig(&ctx.cluster_name, &ctx.region).await?;
        println!("✓ Kubeconfig written for '{}'", ctx.cluster_name);

        let kubectl = KubectlCli::new(self.runner.clone());
        let nodes = kubectl.get_nodes().await?;
        println!("✓ Cluster reachable");
        if !nodes.trim().is_empty() {
            println!("{}", nodes.trim_end());
        }

        let helm = HelmCli::new(self.runner.clone());
        match helm
            .install_loadbalancer_controller(&ctx.cluster_name, &ctx.region)
            .await
        {
            Ok(()) => println!("✓ Load-balancer controller installed"),
            Err(e) => {
                // Non-fatal: the release install is idempotent and can be
                // re-run once the failure is resolved.
                tracing::warn!("Add-on install failed: {}", e);
                println!("⚠ {} (re-run after fixing; infrastructure is up)", e);
            }
        }

        Ok(DeployOutcome::Completed(ctx))
    }
}
