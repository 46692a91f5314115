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

use crate::domain::config::StackConf;

/// Process-local state for a single deploy or cleanup run. Discarded at
/// exit; the Terraform state file remains the single source of truth for
/// what exists.
#[derive(Debug, Clone)]
pub struct DeploymentContext {
    pub cluster_name: String,
    pub region: String,
    pub confirmed: bool,
}

impl DeploymentContext {
    pub fn new(conf: &StackConf) -> Self {
        Self {
            cluster_name: conf.cluster_name.clone(),
            region: conf.region.clone(),
            confirmed: false,
        }
    }
}

/// Outcome of one pipeline step, consumed by the sequencer and the final
/// summary table.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_name: String,
    pub succeeded: bool,
    pub retryable: bool,
}

impl StepResult {
    pub fn ok(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            succeeded: true,
            retryable: false,
        }
    }

    pub fn failed(step_name: impl Into<String>, retryable: bool) -> Self {
        Self {
            step_name: step_name.into(),
            succeeded: false,
            retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_unconfirmed() {
        let ctx = DeploymentContext::new(&StackConf::default());
        assert!(!ctx.confirmed);
        assert_eq!(ctx.cluster_name, "ekstack-dev");
        assert_eq!(ctx.region, "us-west-2");
    }

    #[test]
    fn test_step_result_constructors() {
        let ok = StepResult::ok("destroy");
        assert!(ok.succeeded);
        assert!(!ok.retryable);

        let failed = StepResult::failed("destroy", true);
        assert!(!failed.succeeded);
        assert!(failed.retryable);
    }
}
