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

mod common;

use common::{fail, ok, stub_preflight, FakePrompt, FakeResponse, FakeRunner};
use ekstack::{DeployOutcome, DeployPipeline, StackConf, StackError};
use std::sync::Arc;

fn pipeline(
    runner: Arc<FakeRunner>,
    answers: &[&str],
    work_dir: &std::path::Path,
) -> DeployPipeline {
    DeployPipeline::new(
        StackConf::default(),
        runner,
        FakePrompt::new(answers),
        work_dir,
    )
    .with_gate_banner("Estimated running cost: ~$178.00 / month")
}

/// Stub the whole happy path after the confirmation gate.
fn stub_applied_stack(runner: &FakeRunner) {
    stub_preflight(runner);
    runner.stub(
        "terraform",
        &["output", "-raw", "cluster_name"],
        ok("payments\n"),
    );
    runner.stub("terraform", &["output", "-raw", "region"], ok("eu-central-1\n"));
}

#[tokio::test]
async fn test_missing_required_tool_fails_before_any_side_effect() {
    let runner = FakeRunner::new();
    runner.stub("terraform", &["version"], FakeResponse::Missing);

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline(runner.clone(), &["yes"], dir.path()).run().await;

    match result {
        Err(StackError::MissingDependency(tool)) => assert_eq!(tool, "terraform"),
        other => panic!("expected MissingDependency, got {:?}", other),
    }

    // Nothing beyond the probe itself ran, not even a remediation attempt.
    assert_eq!(runner.count_calls("aws", &[]), 0);
    assert_eq!(runner.count_calls("bash", &[]), 0);
    assert_eq!(runner.count_calls("terraform", &["init"]), 0);
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_missing_helm_triggers_best_effort_install() {
    let runner = FakeRunner::new();
    stub_preflight(&runner);
    runner.stub("helm", &["version"], FakeResponse::Missing);

    let dir = tempfile::tempdir().unwrap();
    let outcome = pipeline(runner.clone(), &["n"], dir.path())
        .run()
        .await
        .unwrap();

    // The install script ran and preflight still passed.
    assert_eq!(runner.count_calls("bash", &["-c"]), 1);
    assert_eq!(runner.count_calls("aws", &["get-caller-identity"]), 1);
    assert!(matches!(outcome, DeployOutcome::Cancelled));
}

#[tokio::test]
async fn test_failed_helm_install_demotes_to_warning() {
    let runner = FakeRunner::new();
    stub_applied_stack(&runner);
    runner.stub("helm", &["version"], FakeResponse::Missing);
    runner.stub("bash", &["-c"], fail(22, "curl: (22) The requested URL returned error: 404"));

    let dir = tempfile::tempdir().unwrap();
    let outcome = pipeline(runner.clone(), &["yes"], dir.path())
        .run()
        .await
        .unwrap();

    // Remediation failure never fails the run; the deploy went through.
    assert!(matches!(outcome, DeployOutcome::Completed(_)));
    assert_eq!(runner.count_calls("terraform", &["apply"]), 1);
}

#[tokio::test]
async fn test_declining_the_cost_gate_cancels_without_mutation() {
    let runner = FakeRunner::new();
    stub_preflight(&runner);

    let dir = tempfile::tempdir().unwrap();
    let outcome = pipeline(runner.clone(), &["n"], dir.path())
        .run()
        .await
        .unwrap();

    assert!(matches!(outcome, DeployOutcome::Cancelled));
    assert_eq!(runner.count_calls("terraform", &["init"]), 0);
    assert_eq!(runner.count_calls("terraform", &["plan"]), 0);
    assert_eq!(runner.count_calls("terraform", &["apply"]), 0);
}

#[tokio::test]
async fn test_happy_path_reports_applied_context() {
    let runner = FakeRunner::new();
    stub_applied_stack(&runner);

    let dir = tempfile::tempdir().unwrap();
    let outcome = pipeline(runner.clone(), &["yes"], dir.path())
        .run()
        .await
        .unwrap();

    match outcome {
        DeployOutcome::Completed(ctx) => {
            // Context comes from applied state, not the local settings.
            assert_eq!(ctx.cluster_name, "payments");
            assert_eq!(ctx.region, "eu-central-1");
            assert!(ctx.confirmed);
        }
        other => panic!("expected Completed, got {:?}", other),
    }

    assert_eq!(runner.count_calls("terraform", &["init"]), 1);
    assert_eq!(runner.count_calls("terraform", &["-out=tfplan"]), 1);
    assert_eq!(runner.count_calls("terraform", &["apply"]), 1);
    assert_eq!(runner.count_calls("aws", &["update-kubeconfig"]), 1);
    assert_eq!(runner.count_calls("helm", &["upgrade", "--install"]), 1);
}

#[tokio::test]
async fn test_plan_artifact_removed_after_successful_apply() {
    let runner = FakeRunner::new();
    stub_applied_stack(&runner);

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("tfplan");
    std::fs::write(&artifact, b"plan").unwrap();

    pipeline(runner, &["yes"], dir.path()).run().await.unwrap();

    assert!(!artifact.exists());
}

#[tokio::test]
async fn test_plan_artifact_removed_when_apply_fails() {
    let runner = FakeRunner::new();
    stub_applied_stack(&runner);
    runner.stub(
        "terraform",
        &["apply"],
        fail(1, "Error: creating EKS Cluster: AccessDenied"),
    );

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("tfplan");
    std::fs::write(&artifact, b"plan").unwrap();

    let result = pipeline(runner, &["yes"], dir.path()).run().await;

    match result {
        Err(StackError::ApplyFailure { stage, .. }) => assert_eq!(stage, "apply"),
        other => panic!("expected ApplyFailure, got {:?}", other),
    }
    assert!(!artifact.exists());
}

#[tokio::test]
async fn test_unreachable_cluster_is_a_connectivity_error() {
    let runner = FakeRunner::new();
    stub_applied_stack(&runner);
    runner.stub(
        "kubectl",
        &["get", "nodes"],
        fail(1, "Unable to connect to the server"),
    );

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline(runner, &["yes"], dir.path()).run().await;

    assert!(matches!(result, Err(StackError::ConnectivityError(_))));
}

#[tokio::test]
async fn test_addon_failure_does_not_fail_the_deploy() {
    let runner = FakeRunner::new();
    stub_applied_stack(&runner);
    runner.stub(
        "helm",
        &["upgrade", "--install"],
        fail(1, "Error: Kubernetes cluster unreachable"),
    );

    let dir = tempfile::tempdir().unwrap();
    let outcome = pipeline(runner, &["yes"], dir.path()).run().await.unwrap();

    assert!(matches!(outcome, DeployOutcome::Completed(_)));
}

#[tokio::test]
async fn test_bad_credentials_fail_before_the_gate() {
    let runner = FakeRunner::new();
    runner.stub(
        "aws",
        &["get-caller-identity"],
        fail(255, "An error occurred (ExpiredToken)"),
    );

    let dir = tempfile::tempdir().unwrap();
    let result = pipeline(runner.clone(), &["yes"], dir.path()).run().await;

    assert!(matches!(result, Err(StackError::AuthenticationError(_))));
    assert_eq!(runner.count_calls("terraform", &["init"]), 0);
}
