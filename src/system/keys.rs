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

//! PPA signing-key installation
//!
//! The installer is only ever constructed for live runs. Dry runs pass
//! `None` in its place, so expansion and mutation code never has to know
//! which mode it is in.

use tracing::info;

use crate::config::RepoError;
use crate::core::PpaSpec;
use crate::system::CommandRunner;

/// Keyserver the PPA signing keys are received from
pub const KEYSERVER: &str = "hkp://keyserver.ubuntu.com:80";

/// Resolves the signing-key fingerprint of a PPA
pub trait PpaKeyLookup {
    fn signing_key_fingerprint(&self, ppa: &PpaSpec) -> Result<String, RepoError>;
}

/// Outcome of an installation request
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyAction {
    /// Key was already in the apt keyring
    AlreadyPresent(String),
    /// Key was received from the keyserver
    Imported(String),
}

/// `apt-key` command importing `fingerprint` from the keyserver
pub fn import_key_command(fingerprint: &str) -> Vec<String> {
    ["apt-key", "adv", "--recv-keys", "--keyserver", KEYSERVER, fingerprint]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}

/// `apt-key` command exporting `fingerprint` (used as an existence check)
pub fn export_key_command(fingerprint: &str) -> Vec<String> {
    ["apt-key", "export", fingerprint]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
}

/// Looks up and imports PPA signing keys
pub struct SigningKeyInstaller {
    lookup: Box<dyn PpaKeyLookup>,
    runner: Box<dyn CommandRunner>,
}

impl SigningKeyInstaller {
    pub fn new(lookup: Box<dyn PpaKeyLookup>, runner: Box<dyn CommandRunner>) -> Self {
        Self { lookup, runner }
    }

    /// Ensures the signing key of `ppa` is in the apt keyring
    ///
    /// # Errors
    ///
    /// `RepoError::NetworkFailure` if the fingerprint cannot be fetched,
    /// `RepoError::ExternalCommandFailure` if apt-key fails.
    pub fn install_for(&self, ppa: &PpaSpec) -> Result<KeyAction, RepoError> {
        let fingerprint = self.lookup.signing_key_fingerprint(ppa)?;

        if self.key_exists(&fingerprint)? {
            info!("Signing key {} for {} already present", fingerprint, ppa);
            return Ok(KeyAction::AlreadyPresent(fingerprint));
        }

        info!("Importing signing key {} for {}", fingerprint, ppa);
        self.runner.run(&import_key_command(&fingerprint))?;
        Ok(KeyAction::Imported(fingerprint))
    }

    /// apt-key exits 0 for unknown keys, so presence is judged by whether
    /// anything was exported
    fn key_exists(&self, fingerprint: &str) -> Result<bool, RepoError> {
        let output = self.runner.run(&export_key_command(fingerprint))?;
        Ok(!output.stdout.trim().is_empty())
    }
}
