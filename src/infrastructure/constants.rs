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

/// Configuration file resolution
pub const DEFAULT_CONF_FILE: &str = "ekstack.toml";
pub const ENV_CONF_FILE: &str = "EKSTACK_CONF_FILE";

/// Confirmation tokens. Cleanup requires a stricter literal token than the
/// deploy gate because destroy is irreversible.
pub const DEPLOY_CONFIRMATION: &str = "yes";
pub const CLEANUP_CONFIRMATION: &str = "DELETE";

/// Terraform invocation
pub const TERRAFORM_BIN: &str = "terraform";
pub const PLAN_ARTIFACT: &str = "tfplan";

/// Terraform output keys consumed by the orchestrator
pub const OUTPUT_CLUSTER_NAME: &str = "cluster_name";
pub const OUTPUT_REGION: &str = "region";
pub const OUTPUT_ECR_REPOSITORY_URLS: &str = "ecr_repository_urls";

/// Required external tools with the argument list used to probe them
pub const REQUIRED_TOOLS: &[(&str, &[&str])] = &[
    ("terraform", &["version"]),
    ("aws", &["--version"]),
    ("kubectl", &["version", "--client"]),
];

/// Optional tools. Absence triggers a best-effort install, never a failure.
pub const OPTIONAL_TOOLS: &[(&str, &[&str])] = &[("helm", &["version", "--short"])];

/// Remediation script for missing helm
pub const HELM_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/helm/helm/main/scripts/get-helm-3";

/// Load-balancer controller add-on
pub const ADDON_RELEASE_NAME: &str = "aws-load-balancer-controller";
pub const ADDON_CHART: &str = "eks/aws-load-balancer-controller";
pub const ADDON_NAMESPACE: &str = "kube-system";
pub const HELM_REPO_NAME: &str = "eks";
pub const HELM_REPO_URL: &str = "https://aws.github.io/eks-charts";

/// Teardown timing. The settle delay lets asynchronous ELB deletion
/// propagate before `terraform destroy` races the dangling dependents.
pub const SETTLE_DELAY_SECS: u64 = 30;
pub const DESTROY_RETRY_DELAY_SECS: u64 = 30;
pub const DESTROY_MAX_RETRIES: usize = 1;

/// Resource naming used by the verification scan
pub const VPC_NAME_SUFFIX: &str = "-vpc";

/// Image scanning
pub const DEFAULT_SCAN_TAG: &str = "latest";

/// Static monthly cost estimate shown before the deploy confirmation gate
pub const COST_ESTIMATES: &[(&str, &str)] = &[
    ("EKS control plane", "$73.00"),
    ("EC2 worker nodes (2x t3.medium)", "$60.00"),
    ("NAT gateway", "$32.00"),
    ("EBS volumes", "$8.00"),
    ("CloudWatch logs & KMS", "$5.00"),
];
pub const COST_ESTIMATE_TOTAL: &str = "~$178.00 / month";
