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

//! Repository state management
//!
//! `SourcesManager` is selected once from the detected distribution:
//! - `Plain`: `deb`/`deb-src` lines only
//! - `UbuntuWithPpa`: additionally expands `ppa:` shorthand and installs
//!   the PPA signing key when an installer is supplied
//!
//! `apply()` runs one add or remove, decides whether anything changed by
//! comparing dumps, and persists/refreshes only for live runs.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{RepoError, DEFAULT_SOURCES_MODE};
use crate::core::ppa::{expand_ppa, is_ppa, ppa_filename_seed};
use crate::core::{suggest_filename, SourcesList};
use crate::system::{AptClient, ClientMode, DistroFamily, Distribution, SigningKeyInstaller};

/// Requested state of a repository
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoState {
    Present,
    Absent,
}

impl fmt::Display for RepoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoState::Present => write!(f, "present"),
            RepoState::Absent => write!(f, "absent"),
        }
    }
}

/// One add/remove request
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApplyRequest {
    /// Source line or `ppa:` shorthand
    pub repo: String,
    pub state: RepoState,
    /// Trailing comment for a newly added line
    pub comment: String,
    /// Target file for a newly added line; derived from the repo when `None`
    pub filename: Option<String>,
    /// Mode for newly created list files
    pub mode: u32,
    /// Run `apt-get update` after a saved change
    pub update_cache: bool,
}

impl ApplyRequest {
    fn with_state(repo: impl Into<String>, state: RepoState) -> Self {
        Self {
            repo: repo.into(),
            state,
            comment: String::new(),
            filename: None,
            mode: DEFAULT_SOURCES_MODE,
            update_cache: true,
        }
    }

    pub fn present(repo: impl Into<String>) -> Self {
        Self::with_state(repo, RepoState::Present)
    }

    pub fn absent(repo: impl Into<String>) -> Self {
        Self::with_state(repo, RepoState::Absent)
    }
}

/// Before/after content of one file; a missing side is empty
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FileDiff {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

impl FileDiff {
    /// Unified diff of the two sides
    pub fn unified(&self) -> String {
        diffy::create_patch(&self.before, &self.after).to_string()
    }
}

/// Result of `apply()`, echoing the request
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ApplyOutcome {
    pub changed: bool,
    pub repo: String,
    pub state: RepoState,
    pub diff: Vec<FileDiff>,
}

/// Sources list plus the distribution capabilities in effect
pub enum SourcesManager {
    Plain(SourcesList),
    UbuntuWithPpa {
        sources: SourcesList,
        codename: String,
        /// `None` in dry runs: no metadata fetch, no key import
        key_installer: Option<SigningKeyInstaller>,
    },
}

impl SourcesManager {
    /// Selects the variant for a distribution
    ///
    /// # Errors
    ///
    /// `RepoError::UnsupportedPlatform` for Ubuntu without a known codename
    /// (and no override).
    pub fn for_distribution(
        distro: &Distribution,
        sources: SourcesList,
        codename_override: Option<String>,
        key_installer: Option<SigningKeyInstaller>,
    ) -> Result<Self, RepoError> {
        match distro.family {
            DistroFamily::Debian => Ok(Self::Plain(sources)),
            DistroFamily::Ubuntu => {
                let codename = codename_override
                    .or_else(|| distro.codename.clone())
                    .ok_or_else(|| {
                        RepoError::UnsupportedPlatform(format!(
                            "cannot determine the release codename of '{}'",
                            distro.id
                        ))
                    })?;
                Ok(Self::UbuntuWithPpa {
                    sources,
                    codename,
                    key_installer,
                })
            }
        }
    }

    pub fn sources(&self) -> &SourcesList {
        match self {
            Self::Plain(sources) => sources,
            Self::UbuntuWithPpa { sources, .. } => sources,
        }
    }

    pub fn sources_mut(&mut self) -> &mut SourcesList {
        match self {
            Self::Plain(sources) => sources,
            Self::UbuntuWithPpa { sources, .. } => sources,
        }
    }

    pub fn into_sources(self) -> SourcesList {
        match self {
            Self::Plain(sources) => sources,
            Self::UbuntuWithPpa { sources, .. } => sources,
        }
    }

    /// Adds a repository
    ///
    /// On `UbuntuWithPpa`, `ppa:` shorthand is expanded first. An already
    /// enabled PPA is left alone without contacting Launchpad; otherwise the
    /// signing key is installed (when an installer is present) before the
    /// line is added to `ppa_<owner>_<name>_<codename>.list`.
    pub fn add_source(
        &mut self,
        line: &str,
        comment: &str,
        file: Option<&str>,
    ) -> Result<(), RepoError> {
        match self {
            Self::UbuntuWithPpa {
                sources,
                codename,
                key_installer,
            } if is_ppa(line) => {
                let expanded = expand_ppa(line, codename)?;
                if sources.has_enabled_source(&expanded.line) {
                    debug!("{} already enabled", expanded.ppa);
                    return Ok(());
                }

                if let Some(installer) = key_installer.as_ref() {
                    installer.install_for(&expanded.ppa)?;
                }

                let target = match file {
                    Some(name) => Some(sources.expand_path(name)),
                    None => suggest_filename(&ppa_filename_seed(line, codename))
                        .map(|name| sources.expand_path(&name)),
                };
                sources.add_valid_source(&expanded.line, comment, target);
                Ok(())
            }
            _ => self.sources_mut().add_source(line, comment, file),
        }
    }

    /// Removes a repository
    ///
    /// PPA shorthand is only expanded; the signing key stays installed.
    pub fn remove_source(&mut self, line: &str) -> Result<(), RepoError> {
        match self {
            Self::UbuntuWithPpa {
                sources, codename, ..
            } if is_ppa(line) => {
                let expanded = expand_ppa(line, codename)?;
                sources.remove_valid_source(&expanded.line);
                Ok(())
            }
            _ => self.sources_mut().remove_source(line),
        }
    }

    /// Runs one request end to end
    ///
    /// 1. Snapshot the rendered files
    /// 2. Add or remove in memory
    /// 3. Compare snapshots to decide `changed` and build the diff
    /// 4. Live only: save, then refresh the cache if requested
    ///
    /// # Errors
    ///
    /// Any error aborts immediately; files already written stay written.
    pub fn apply(
        &mut self,
        request: &ApplyRequest,
        apt: &AptClient,
    ) -> Result<ApplyOutcome, RepoError> {
        if request.repo.trim().is_empty() {
            return Err(RepoError::InvalidSource(
                "repository string must not be empty".to_string(),
            ));
        }

        let before = self.sources().dump();
        match request.state {
            RepoState::Present => self.add_source(
                &request.repo,
                &request.comment,
                request.filename.as_deref(),
            )?,
            RepoState::Absent => self.remove_source(&request.repo)?,
        }
        let after = self.sources().dump();

        let changed = before != after;
        let diff = if changed {
            file_diffs(&before, &after)
        } else {
            Vec::new()
        };

        if changed && apt.mode() == ClientMode::Live {
            self.sources_mut().save(request.mode)?;
            if request.update_cache {
                apt.update_cache()?;
            }
        }

        info!(
            "{} '{}': {}",
            request.state,
            request.repo,
            if changed { "changed" } else { "unchanged" }
        );
        Ok(ApplyOutcome {
            changed,
            repo: request.repo.clone(),
            state: request.state,
            diff,
        })
    }
}

/// Normalizes a caller-supplied file name to end in `.list`
pub fn list_filename(name: &str) -> String {
    if name.ends_with(".list") {
        name.to_string()
    } else {
        format!("{name}.list")
    }
}

fn file_diffs(
    before: &BTreeMap<PathBuf, String>,
    after: &BTreeMap<PathBuf, String>,
) -> Vec<FileDiff> {
    let paths: BTreeSet<&Path> = before
        .keys()
        .chain(after.keys())
        .map(PathBuf::as_path)
        .collect();

    paths
        .into_iter()
        .filter_map(|path| {
            let old = before.get(path).cloned().unwrap_or_default();
            let new = after.get(path).cloned().unwrap_or_default();
            (old != new).then(|| FileDiff {
                path: path.to_path_buf(),
                before: old,
                after: new,
            })
        })
        .collect()
}
