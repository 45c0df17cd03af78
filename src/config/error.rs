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

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while managing APT sources.
///
/// Every variant is fatal for the current run. Tolerant file loading never
/// produces `InvalidSource`; malformed lines are kept instead.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Operand is not an active `deb`/`deb-src` line (or valid PPA shorthand).
    #[error("Invalid repository string: {0}")]
    InvalidSource(String),

    /// Running distribution is not Debian or Ubuntu based.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A list file could not be read or enumerated.
    #[error("Failed to load {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    /// Writing, replacing or deleting a list file failed.
    #[error("Failed to write {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A child process (apt-key, apt-get, apt-config) failed.
    #[error("Command `{command}` failed ({status}){}", stderr_suffix(.stderr))]
    ExternalCommandFailure {
        command: String,
        status: String,
        stderr: String,
    },

    /// Fetching PPA metadata from Launchpad failed.
    #[error("Failed to fetch PPA information: {0}")]
    NetworkFailure(String),

    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
