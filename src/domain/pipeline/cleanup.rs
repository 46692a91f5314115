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

//! Teardown state machine.
//!
//! Transitions are strictly forward: `Confirming → Inspecting →
//! DrainingCluster → EmptyingRegistries → Destroying → Verifying → Done`.
//! Unlike the deploy path, a failing step degrades to best-effort
//! continuation toward `Verifying`. Leaving billable resources running is
//! worse than an incomplete log.

use crate::domain::config::StackConf;
use crate::domain::pipeline::context::{DeploymentContext, StepResult};
use crate::domain::pipeline::inventory::ResourceInventory;
use crate::infrastructure::aws::AwsCli;
use crate::infrastructure::constants::{
    CLEANUP_CONFIRMATION, DESTROY_MAX_RETRIES, DESTROY_RETRY_DELAY_SECS,
    OUTPUT_ECR_REPOSITORY_URLS, SETTLE_DELAY_SECS, VPC_NAME_SUFFIX,
};
use crate::infrastructure::exec::{CommandRunner, ConfirmationPrompt};
use crate::infrastructure::helm::HelmCli;
use crate::infrastructure::kubectl::KubectlCli;
use crate::infrastructure::terraform::TerraformCli;
use crate::shared::error::{Result, StackError};
use backon::{ConstantBuilder, Retryable};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupState {
    Confirming,
    Inspecting,
    DrainingCluster,
    EmptyingRegistries,
    Destroying,
    Verifying,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Confirmation token not entered; zero side effects.
    Cancelled,
    /// No remote state existed; nothing destroyed.
    NothingToDestroy,
    Completed,
    /// One or more steps failed; verification still ran. Manual
    /// intervention may be required.
    CompletedWithErrors,
}

#[derive(Debug)]
pub struct CleanupReport {
    pub steps: Vec<StepResult>,
    pub inventory: Option<ResourceInventory>,
    pub outcome: CleanupOutcome,
}

pub struct CleanupPipeline {
    conf: StackConf,
    runner: Arc<dyn CommandRunner>,
    prompt: Box<dyn ConfirmationPrompt>,
    work_dir: PathBuf,
    settle_delay: Duration,
    destroy_retry_delay: Duration,
}

impl CleanupPipeline {
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
            settle_delay: Duration::from_secs(SETTLE_DELAY_SECS),
            destroy_retry_delay: Duration::from_secs(DESTROY_RETRY_DELAY_SECS),
        }
    }

    /// Override the settle and retry delays, e.g. for tests.
    pub fn with_delays(mut self, settle: Duration, destroy_retry: Duration) -> Self {
        self.settle_delay = settle;
        self.destroy_retry_delay = destroy_retry;
        self
    }

    pub async fn run(&self) -> Result<CleanupReport> {
        let ctx = DeploymentContext::new(&self.conf);
        let terraform = TerraformCli::new(self.runner.clone(), self.work_dir.clone());

        let mut steps: Vec<StepResult> = Vec::new();
        let mut inventory = None;
        let mut cancelled = false;
        let mut nothing_to_destroy = false;

        let mut state = CleanupState::Confirming;
        loop {
            state = match state {
                CleanupState::Confirming => {
                    let prompt_text = format!(
                        "This will destroy cluster '{}' and all associated resources.\n\
                         Type '{}' to confirm: ",
                        ctx.cluster_name, CLEANUP_CONFIRMATION
                    );
                    let answer = self.prompt.read_line(&prompt_text)?;
                    if answer.trim() != CLEANUP_CONFIRMATION {
                        cancelled = true;
                        CleanupState::Done
                    } else {
                        CleanupState::Inspecting
                    }
                }

                CleanupState::Inspecting => match terraform.has_state().await {
                    Ok(true) => {
                        steps.push(StepResult::ok("inspect state"));
                        CleanupState::DrainingCluster
                    }
                    Ok(false) => {
                        println!("No Terraform state found, nothing to destroy.");
                        nothing_to_destroy = true;
                        CleanupState::Done
                    }
                    Err(e) => {
                        tracing::warn!("State inspection failed: {}", e);
                        println!("✗ Could not inspect state: {}", e);
                        steps.push(StepResult::failed("inspect state", false));
                        CleanupState::Verifying
                    }
                },

                CleanupState::DrainingCluster => {
                    self.drain_cluster().await;
                    steps.push(StepResult::ok("drain cluster"));
                    println!(
                        "Waiting {}s for load balancers to release...",
                        self.settle_delay.as_secs()
                    );
                    sleep(self.settle_delay).await;
                    CleanupState::EmptyingRegistries
                }

                CleanupState::EmptyingRegistries => {
                    match self.empty_registries(&terraform, &ctx).await {
                        Ok(()) => {
                            steps.push(StepResult::ok("empty registries"));
                            CleanupState::Destroying
                        }
                        Err(e) => {
                            tracing::warn!("Registry emptying failed: {}", e);
                            println!("✗ Could not empty registries: {}", e);
                            steps.push(StepResult::failed("empty registries", false));
                            CleanupState::Verifying
                        }
                    }
                }

                CleanupState::Destroying => {
                    match self.destroy_with_retry(&terraform).await {
                        Ok(()) => {
                            println!("✓ Infrastructure destroyed");
                            steps.push(StepResult::ok("destroy"));
                        }
                        Err(e) => {
                            println!("✗ {} (manual intervention required)", e);
                            steps.push(StepResult::failed("destroy", true));
                        }
                    }
                    CleanupState::Verifying
                }

                CleanupState::Verifying => {
                    inventory = Some(self.verify(&ctx).await);
                    steps.push(StepResult::ok("verify"));
                    CleanupState::Done
                }

                CleanupState::Done => break,
            };
        }

        let outcome = if cancelled {
            CleanupOutcome::Cancelled
        } else if nothing_to_destroy {
            CleanupOutcome::NothingToDestroy
        } else if steps.iter().all(|s| s.succeeded) {
            CleanupOutcome::Completed
        } else {
            CleanupOutcome::CompletedWithErrors
        };

        Ok(CleanupReport {
            steps,
            inventory,
            outcome,
        })
    }

    /// Delete cluster-managed external resources so the declarative destroy
    /// does not race dangling dependents. Every deletion is best-effort.
    async fn drain_cluster(&self) {
        let kubectl = KubectlCli::new(self.runner.clone());

        match kubectl.delete_loadbalancer_services().await {
            Ok(0) => {}
            Ok(n) => println!("✓ Deleted {} LoadBalancer service(s)", n),
            Err(e) => tracing::warn!("Service drain failed: {}", e),
        }

        if let Err(e) = kubectl.delete_all_ingresses().await {
            tracing::warn!("Ingress drain failed: {}", e);
        }

        let helm = HelmCli::new(self.runner.clone());
        if let Err(e) = helm.uninstall_loadbalancer_controller().await {
            tracing::warn!("Add-on uninstall failed: {}", e);
        }
    }

    /// ECR refuses to delete non-empty repositories, so every image known
    /// to the applied state is force-deleted first. Zero images means zero
    /// delete calls.
    async fn empty_registries(
        &self,
        terraform: &TerraformCli,
        ctx: &DeploymentContext,
    ) -> Result<()> {
        let repositories = match terraform.output_string_map(OUTPUT_ECR_REPOSITORY_URLS).await {
            Ok(map) => map,
            Err(StackError::CommandFailed { .. }) => {
                // The stack was applied without registries; nothing to do.
                tracing::debug!("No registry output in state");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let aws = AwsCli::new(self.runner.clone());
        for name in repositories.keys() {
            let image_ids = aws.list_image_ids(name, &ctx.region).await?;
            if image_ids.is_empty() {
                continue;
            }
            aws.batch_delete_images(name, &ctx.region, &image_ids).await?;
            println!("✓ Deleted {} image(s) from '{}'", image_ids.len(), name);
        }
        Ok(())
    }

    /// Destroy with exactly one fixed-backoff retry: transient
    /// dependency-ordering failures usually clear once AWS finishes the
    /// asynchronous deletions started by the drain step.
    async fn destroy_with_retry(&self, terraform: &TerraformCli) -> Result<()> {
        let var_args = self.conf.var_args()?;
        let policy = ConstantBuilder::default()
            .with_delay(self.destroy_retry_delay)
            .with_max_times(DESTROY_MAX_RETRIES);

        (|| async { terraform.destroy(&var_args).await })
            .retry(&policy)
            .notify(|err: &StackError, dur: Duration| {
                tracing::warn!("Destroy attempt failed: {}", err);
                println!("⚠ Destroy failed, retrying in {}s...", dur.as_secs());
            })
            .await
    }

    /// Read-only existence scan across the major resource categories,
    /// filtered by the cluster name. Check failures degrade to warnings so
    /// the checklist is always produced.
    async fn verify(&self, ctx: &DeploymentContext) -> ResourceInventory {
        let aws = AwsCli::new(self.runner.clone());
        let mut inventory = ResourceInventory::default();

        match aws.eks_cluster_exists(&ctx.cluster_name, &ctx.region).await {
            Ok(true) => inventory.clusters.push(ctx.cluster_name.clone()),
            Ok(false) => {}
            Err(e) => tracing::warn!("Cluster existence check failed: {}", e),
        }

        match aws.ecr_repository_names(&ctx.region).await {
            Ok(names) => {
                let prefix = regex::Regex::new(&format!(
                    "^{}-",
                    regex::escape(&ctx.cluster_name)
                ))
                .ok();
                for name in names {
                    let configured = self.conf.registries.contains(&name);
                    let prefixed = prefix.as_ref().is_some_and(|re| re.is_match(&name));
                    if configured || prefixed {
                        inventory.registries.push(name);
                    }
                }
            }
            Err(e) => tracing::warn!("Registry scan failed: {}", e),
        }

        let vpc_name = format!("{}{}", ctx.cluster_name, VPC_NAME_SUFFIX);
        match aws.vpc_ids_by_name(&vpc_name, &ctx.region).await {
            Ok(ids) => inventory.networks.extend(ids),
            Err(e) => tracing::warn!("VPC scan failed: {}", e),
        }

        inventory
    }
}
