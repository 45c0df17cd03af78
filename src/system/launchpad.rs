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

//! Launchpad API client for PPA metadata
//!
//! Uses a blocking reqwest client with rustls certificate validation. There
//! is no retry: any failure is reported as `RepoError::NetworkFailure`.

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RepoError;
use crate::core::PpaSpec;
use crate::system::keys::PpaKeyLookup;

/// Launchpad REST API root
pub const LAUNCHPAD_API: &str = "https://launchpad.net/api/1.0";

/// The subset of a Launchpad archive record this tool reads
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct PpaInfo {
    /// Fingerprint of the archive signing key; absent until Launchpad
    /// generates one
    #[serde(default)]
    pub signing_key_fingerprint: Option<String>,

    #[serde(default)]
    pub displayname: Option<String>,
}

/// HTTP client for Launchpad archive metadata
pub struct LaunchpadClient {
    client: Client,
    base_url: String,
}

impl LaunchpadClient {
    /// Client for the public Launchpad API
    pub fn new() -> Result<Self, RepoError> {
        Self::with_base_url(LAUNCHPAD_API)
    }

    /// Client for another API root (mirrors, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RepoError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepoError::NetworkFailure(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// API URL of a PPA: `<root>/~owner/+archive/name`
    pub fn ppa_url(&self, ppa: &PpaSpec) -> String {
        format!("{}/~{}/+archive/{}", self.base_url, ppa.owner, ppa.name)
    }

    /// Fetches the archive record of a PPA
    pub fn fetch_ppa_info(&self, ppa: &PpaSpec) -> Result<PpaInfo, RepoError> {
        let url = self.ppa_url(ppa);
        info!("Fetching PPA information from {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| RepoError::NetworkFailure(format!("{url}: {e}")))?;

        if !response.status().is_success() {
            return Err(RepoError::NetworkFailure(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let info: PpaInfo = response
            .json()
            .map_err(|e| RepoError::NetworkFailure(format!("Failed to parse PPA JSON: {e}")))?;

        debug!("PPA {} signing key: {:?}", ppa, info.signing_key_fingerprint);
        Ok(info)
    }
}

impl PpaKeyLookup for LaunchpadClient {
    fn signing_key_fingerprint(&self, ppa: &PpaSpec) -> Result<String, RepoError> {
        self.fetch_ppa_info(ppa)?
            .signing_key_fingerprint
            .filter(|fingerprint| !fingerprint.is_empty())
            .ok_or_else(|| RepoError::NetworkFailure(format!("{ppa} has no signing key yet")))
    }
}
