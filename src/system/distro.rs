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

//! Distribution detection from os-release

use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::RepoError;

/// Standard os-release location
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Supported distribution families
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum DistroFamily {
    /// Ubuntu and derivatives; PPAs available
    Ubuntu,
    /// Debian and non-Ubuntu derivatives; plain sources only
    Debian,
}

/// The running distribution
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Distribution {
    /// os-release `ID`
    pub id: String,
    pub family: DistroFamily,
    /// Release codename used for PPA expansion
    pub codename: Option<String>,
}

impl Distribution {
    /// Reads and classifies an os-release file
    ///
    /// # Errors
    ///
    /// `RepoError::UnsupportedPlatform` if the file is unreadable or the
    /// distribution is not Debian/Ubuntu based.
    pub fn detect(path: &Path) -> Result<Self, RepoError> {
        let content = fs::read_to_string(path).map_err(|e| {
            RepoError::UnsupportedPlatform(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_os_release(&content)
    }

    /// Classifies os-release content
    ///
    /// `ID` or `ID_LIKE` containing `ubuntu` selects Ubuntu, else `debian`
    /// selects Debian. For Ubuntu derivatives `UBUNTU_CODENAME` wins over
    /// `VERSION_CODENAME`, since PPAs are built per Ubuntu release.
    pub fn from_os_release(content: &str) -> Result<Self, RepoError> {
        let fields = parse_os_release(content);
        let id = fields.get("ID").cloned().unwrap_or_default();
        let mut lineage: Vec<&str> = vec![id.as_str()];
        if let Some(like) = fields.get("ID_LIKE") {
            lineage.extend(like.split_whitespace());
        }

        let family = if lineage.contains(&"ubuntu") {
            DistroFamily::Ubuntu
        } else if lineage.contains(&"debian") {
            DistroFamily::Debian
        } else {
            let name = if id.is_empty() { "unknown" } else { id.as_str() };
            return Err(RepoError::UnsupportedPlatform(format!(
                "'{name}' is not a Debian or Ubuntu based distribution"
            )));
        };

        let codename = match family {
            DistroFamily::Ubuntu => fields
                .get("UBUNTU_CODENAME")
                .or_else(|| fields.get("VERSION_CODENAME")),
            DistroFamily::Debian => fields.get("VERSION_CODENAME"),
        }
        .filter(|codename| !codename.is_empty())
        .cloned();

        debug!("Detected {} ({:?}, codename {:?})", id, family, codename);
        Ok(Self {
            id,
            family,
            codename,
        })
    }
}

/// Parses `KEY=value` lines, unquoting values
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
