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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("Required tool not found: '{0}'. Install it and re-run.")]
    MissingDependency(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Terraform {stage} failed: {message}")]
    ApplyFailure { stage: String, message: String },

    #[error("Cluster connectivity check failed: {0}")]
    ConnectivityError(String),

    #[error("Add-on installation failed: {0}")]
    AddonInstallFailure(String),

    #[error("Terraform destroy failed: {0}")]
    DestroyFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Command '{program}' exited with status {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Unexpected output from '{program}': {message}")]
    OutputParse { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl StackError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn apply_failure(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApplyFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn command_failed(
        program: impl Into<String>,
        code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            program: program.into(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn output_parse(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutputParse {
            program: program.into(),
            message: message.into(),
        }
    }
}
