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

use crate::shared::error::Result;
use std::io::Write;

/// Interactive confirmation input, injectable for tests.
pub trait ConfirmationPrompt: Send + Sync {
    /// Print `prompt` and block until one line of input is available.
    /// Returns the line with trailing newline removed.
    fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Prompt backed by the process terminal.
pub struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn read_line(&self, prompt: &str) -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
