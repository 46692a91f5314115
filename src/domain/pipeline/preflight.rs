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

//! Pre-flight checks: external tool availability and cloud credentials.
//! Both run before any remote side effect.

use crate::infrastructure::aws::{AwsCli, CallerIdentity};
use crate::infrastructure::constants::{HELM_INSTALL_SCRIPT, OPTIONAL_TOOLS, REQUIRED_TOOLS};
use crate::infrastructure::exec::{CommandRunner, CommandSpec};
use crate::shared::error::{Result, StackError};
use std::sync::Arc;

pub struct PreflightChecker {
    runner: Arc<dyn CommandRunner>,
}

impl PreflightChecker {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Verify every required tool is runnable; attempt best-effort install
    /// of missing optional tools. A missing required tool fails the run
    /// before anything else happens.
    pub async fn check_tools(&self) -> Result<()> {
        for (tool, probe_args) in REQUIRED_TOOLS {
            if !self.tool_available(tool, probe_args).await? {
                return Err(StackError::MissingDependency(tool.to_string()));
            }
        }

        for (tool, probe_args) in OPTIONAL_TOOLS {
            if self.tool_available(tool, probe_args).await? {
                continue;
            }
            println!("⚠ Optional tool '{}' not found, attempting install...", tool);
            if let Err(e) = self.install_optional_tool(tool).await {
                tracing::warn!("Could not install '{}': {}", tool, e);
                println!("⚠ Could not install '{}', continuing without it", tool);
            }
        }

        Ok(())
    }

    async fn tool_available(&self, tool: &str, probe_args: &[&str]) -> Result<bool> {
        let spec = CommandSpec::new(tool).args(probe_args.iter().copied());
        match self.runner.run(&spec).await {
            // A non-zero probe still proves the binary is present.
            Ok(_) => Ok(true),
            Err(StackError::MissingDependency(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn install_optional_tool(&self, tool: &str) -> Result<()> {
        let script = match tool {
            "helm" => HELM_INSTALL_SCRIPT,
            other => {
                return Err(StackError::MissingDependency(other.to_string()));
            }
        };

        let command = format!("curl -fsSL {} | bash", script);
        let spec = CommandSpec::new("bash").args(["-c", &command]);
        let output = self.runner.run(&spec).await?;
        if !output.success() {
            return Err(output.into_error(&spec));
        }
        println!("✓ Installed '{}'", tool);
        Ok(())
    }

    /// Confirm the active identity can authenticate. No retry: expired or
    /// absent credentials must be fixed out of band.
    pub async fn validate_credentials(&self) -> Result<CallerIdentity> {
        AwsCli::new(self.runner.clone()).caller_identity().await
    }
}
