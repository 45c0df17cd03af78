// Copyright 2025 Eric Jingryd (tidynest@proton.me)
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

//! External collaborators: child processes, distribution, Launchpad
//!
//! # Safety Modes
//!
//! Process-running clients operate in one of two modes:
//! - **DryRun**: Reports what would happen, never spawns anything
//! - **Live**: Runs commands for real
//!
//! Tests default to DryRun or to fake `CommandRunner`s.
//!
//! # Example
//! ```
//! use apt_repo_manager::system::{AptClient, ClientMode, SystemRunner};
//!
//! // Safe: DryRun never runs apt-get
//! let apt = AptClient::new(ClientMode::DryRun, Box::new(SystemRunner));
//! assert!(apt.update_cache().is_ok());
//! ```

pub mod distro;
pub mod keys;
pub mod launchpad;

pub use distro::{DistroFamily, Distribution};
pub use keys::{KeyAction, PpaKeyLookup, SigningKeyInstaller};
pub use launchpad::LaunchpadClient;

use std::process::Command;
use tracing::{debug, info};

use crate::config::RepoError;

/// Process client operation mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientMode {
    /// Compute and report only - NEVER runs commands
    DryRun,

    /// Full access
    Live,
}

/// Captured output of a successful command
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a program with arguments
///
/// `argv[0]` is the program. Implementations return
/// `RepoError::ExternalCommandFailure` for a non-zero exit.
pub trait CommandRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput, RepoError>;
}

/// Runs commands with `std::process::Command`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput, RepoError> {
        let command = argv.join(" ");
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| RepoError::ExternalCommandFailure {
                command: command.clone(),
                status: "empty command".to_string(),
                stderr: String::new(),
            })?;

        debug!("Running: {}", command);
        let output = Command::new(program).args(args).output().map_err(|e| {
            RepoError::ExternalCommandFailure {
                command: command.clone(),
                status: format!("failed to start: {e}"),
                stderr: String::new(),
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(RepoError::ExternalCommandFailure {
                command,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Command refreshing the package cache
pub fn update_cache_command() -> Vec<String> {
    vec!["apt-get".to_string(), "update".to_string()]
}

/// apt front-end gated by `ClientMode`
pub struct AptClient {
    mode: ClientMode,
    runner: Box<dyn CommandRunner>,
}

impl AptClient {
    pub fn new(mode: ClientMode, runner: Box<dyn CommandRunner>) -> Self {
        Self { mode, runner }
    }

    pub fn mode(&self) -> ClientMode {
        self.mode
    }

    /// Refreshes the package cache (`apt-get update`)
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Cache refreshed (Live) or skipped (DryRun)
    /// * `Err(RepoError::ExternalCommandFailure)` - apt-get failed
    pub fn update_cache(&self) -> Result<(), RepoError> {
        match self.mode {
            ClientMode::DryRun => {
                debug!("Dry run: skipping package cache update");
                Ok(())
            }
            ClientMode::Live => {
                info!("Updating package cache");
                self.runner.run(&update_cache_command())?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests;
