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

//! Scripted command runner and prompt so pipeline tests never touch real
//! CLIs or a terminal.

#![allow(dead_code)]

use ekstack::{CommandOutput, CommandRunner, CommandSpec, ConfirmationPrompt, StackError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Output(CommandOutput),
    /// Simulate a binary that is not installed.
    Missing,
}

pub fn ok(stdout: &str) -> FakeResponse {
    FakeResponse::Output(CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub fn fail(code: i32, stderr: &str) -> FakeResponse {
    FakeResponse::Output(CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

struct FakeRule {
    program: String,
    needles: Vec<String>,
    responses: VecDeque<FakeResponse>,
}

/// Command runner that records every invocation and answers from stubbed
/// rules. Unstubbed commands succeed with empty output.
#[derive(Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<CommandSpec>>,
    rules: Mutex<Vec<FakeRule>>,
}

impl FakeRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stub every matching invocation with the same response. A rule
    /// matches when the program name equals and every needle appears in
    /// some argument.
    pub fn stub(&self, program: &str, needles: &[&str], response: FakeResponse) {
        self.stub_sequence(program, needles, vec![response]);
    }

    /// Stub successive matching invocations with successive responses; the
    /// last response repeats.
    pub fn stub_sequence(&self, program: &str, needles: &[&str], responses: Vec<FakeResponse>) {
        self.rules.lock().unwrap().push(FakeRule {
            program: program.to_string(),
            needles: needles.iter().map(|s| s.to_string()).collect(),
            responses: responses.into(),
        });
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Count recorded invocations of `program` whose arguments contain
    /// every needle.
    pub fn count_calls(&self, program: &str, needles: &[&str]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|spec| {
                spec.program == program
                    && needles
                        .iter()
                        .all(|n| spec.args.iter().any(|a| a.contains(n)))
            })
            .count()
    }
}

#[async_trait::async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> ekstack::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());

        // Later stubs take precedence over earlier ones.
        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut().rev() {
            let matches = rule.program == spec.program
                && rule
                    .needles
                    .iter()
                    .all(|n| spec.args.iter().any(|a| a.contains(n.as_str())));
            if !matches {
                continue;
            }

            let response = if rule.responses.len() > 1 {
                rule.responses.pop_front().unwrap()
            } else {
                rule.responses.front().cloned().unwrap_or_else(|| ok(""))
            };
            return match response {
                FakeResponse::Output(output) => Ok(output),
                FakeResponse::Missing => Err(StackError::MissingDependency(spec.program.clone())),
            };
        }

        Ok(CommandOutput {
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Prompt answering from a scripted list; empty string once exhausted.
pub struct FakePrompt {
    answers: Mutex<VecDeque<String>>,
}

impl FakePrompt {
    pub fn new(answers: &[&str]) -> Box<Self> {
        Box::new(Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
        })
    }
}

impl ConfirmationPrompt for FakePrompt {
    fn read_line(&self, _prompt: &str) -> ekstack::Result<String> {
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Identity JSON for a valid `sts get-caller-identity` stub.
pub const CALLER_IDENTITY_JSON: &str =
    r#"{"Account": "123456789012", "Arn": "arn:aws:iam::123456789012:user/operator", "UserId": "AIDAEXAMPLE"}"#;

/// Stub the happy pre-flight path: all tools present, valid credentials.
pub fn stub_preflight(runner: &FakeRunner) {
    runner.stub("aws", &["get-caller-identity"], ok(CALLER_IDENTITY_JSON));
}
