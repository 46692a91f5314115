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

//! Terraform CLI wrapper.
//!
//! Wraps init/plan/apply/destroy/output behind typed results. The plan is
//! always written to a named artifact and removed again on every exit path.

use crate::infrastructure::constants::{PLAN_ARTIFACT, TERRAFORM_BIN};
use crate::infrastructure::exec::{CommandRunner, CommandSpec};
use crate::shared::error::{Result, StackError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct TerraformCli {
    runner: Arc<dyn CommandRunner>,
    work_dir: PathBuf,
}

impl TerraformCli {
    pub fn new(runner: Arc<dyn CommandRunner>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn plan_artifact_path(&self) -> PathBuf {
        self.work_dir.join(PLAN_ARTIFACT)
    }

    fn spec<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(TERRAFORM_BIN)
            .args(args)
            .current_dir(&self.work_dir)
    }

    pub async fn init(&self) -> Result<()> {
        let spec = self.spec(["init", "-input=false"]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::apply_failure("init", output.stderr_trimmed()));
        }
        Ok(())
    }

    /// Plan into the named artifact, apply it, then remove the artifact
    /// whether or not the apply succeeded.
    pub async fn plan_and_apply(&self, var_args: &[String]) -> Result<()> {
        let result = self.plan_and_apply_inner(var_args).await;
        self.remove_plan_artifact();
        result
    }

    async fn plan_and_apply_inner(&self, var_args: &[String]) -> Result<()> {
        let mut plan_args = vec![
            "plan".to_string(),
            "-input=false".to_string(),
            format!("-out={}", PLAN_ARTIFACT),
        ];
        plan_args.extend(var_args.iter().cloned());

        let spec = self.spec(plan_args);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::apply_failure("plan", output.stderr_trimmed()));
        }

        let spec = self.spec(["apply", "-input=false", PLAN_ARTIFACT]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::apply_failure("apply", output.stderr_trimmed()));
        }
        Ok(())
    }

    fn remove_plan_artifact(&self) {
        match std::fs::remove_file(self.plan_artifact_path()) {
            Ok(()) => tracing::debug!("plan artifact removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove plan artifact: {}", e),
        }
    }

    pub async fn destroy(&self, var_args: &[String]) -> Result<()> {
        let mut args = vec![
            "destroy".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
        ];
        args.extend(var_args.iter().cloned());

        let spec = self.spec(args);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(StackError::DestroyFailure(
                output.stderr_trimmed().to_string(),
            ));
        }
        Ok(())
    }

    /// Whether remote state with at least one resource exists.
    pub async fn has_state(&self) -> Result<bool> {
        let spec = self.spec(["state", "list"]);
        let output = self.runner.run(&spec).await?;
        if output.success() {
            return Ok(!output.stdout_trimmed().is_empty());
        }
        // Terraform exits non-zero when the working directory has no state.
        if output.stderr.contains("No state file") {
            return Ok(false);
        }
        Err(output.into_error(&spec))
    }

    pub async fn output_raw(&self, key: &str) -> Result<String> {
        let spec = self.spec(["output", "-raw", key]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(output.into_error(&spec));
        }
        Ok(output.stdout_trimmed().to_string())
    }

    /// Read a string→string map output, e.g. registry name to URL.
    pub async fn output_string_map(&self, key: &str) -> Result<BTreeMap<String, String>> {
        let spec = self.spec(["output", "-json", key]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(output.into_error(&spec));
        }
        let map: BTreeMap<String, String> = serde_json::from_str(output.stdout_trimmed())
            .map_err(|e| {
                StackError::output_parse(
                    TERRAFORM_BIN,
                    format!("output '{}' is not a string map: {}", key, e),
                )
            })?;
        Ok(map)
    }
}
