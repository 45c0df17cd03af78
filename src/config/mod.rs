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

//! Sources list file management with atomic writes.
//!
//! This module owns everything that touches list files on disk:
//!
//! - **Locations**: `AptPaths` resolves the primary list and the
//!   source-parts directory from `apt-config dump`
//! - **Loading**: tolerant, line-preserving reads (`store`)
//! - **Atomic writes**: temp-file-then-rename, empty files deleted
//!   (`transaction`)
//!
//! # Example
//!
//! ```no_run
//! use apt_repo_manager::config::AptPaths;
//! use apt_repo_manager::core::SourcesList;
//! use apt_repo_manager::system::SystemRunner;
//!
//! let paths = AptPaths::discover(&SystemRunner);
//! let mut sources = SourcesList::load(paths)?;
//!
//! sources.add_source("deb http://deb.debian.org/debian bookworm contrib", "", None)?;
//! sources.save(0o644)?;
//! # Ok::<(), apt_repo_manager::RepoError>(())
//! ```

pub mod error;
pub mod store;
pub mod transaction;

pub use error::RepoError;
pub use transaction::{SaveReport, DEFAULT_SOURCES_MODE};

use nom::{
    bytes::complete::{take_till1, take_until},
    character::complete::{char, space0, space1},
    sequence::delimited,
    IResult, Parser,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::system::CommandRunner;

/// Primary list used when apt-config is unavailable
pub const DEFAULT_SOURCES_LIST: &str = "/etc/apt/sources.list";

/// Source-parts directory used when apt-config is unavailable
pub const DEFAULT_SOURCES_DIR: &str = "/etc/apt/sources.list.d";

/// Where apt keeps its source lists
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AptPaths {
    /// Primary list file (`Dir::Etc::sourcelist`)
    pub sources_list: PathBuf,
    /// Directory of additional `*.list` files (`Dir::Etc::sourceparts`)
    pub sources_dir: PathBuf,
}

impl Default for AptPaths {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCES_LIST, DEFAULT_SOURCES_DIR)
    }
}

impl AptPaths {
    pub fn new(sources_list: impl Into<PathBuf>, sources_dir: impl Into<PathBuf>) -> Self {
        Self {
            sources_list: sources_list.into(),
            sources_dir: sources_dir.into(),
        }
    }

    /// Asks apt for its configured locations
    ///
    /// Runs `apt-config dump`. If apt-config is missing or fails, the
    /// Debian defaults are used and a warning is logged.
    pub fn discover(runner: &dyn CommandRunner) -> Self {
        let argv = ["apt-config".to_string(), "dump".to_string()];
        match runner.run(&argv) {
            Ok(output) => Self::from_apt_config_dump(&output.stdout),
            Err(e) => {
                warn!("apt-config unavailable, using default locations: {}", e);
                Self::default()
            }
        }
    }

    /// Resolves locations from `apt-config dump` output
    ///
    /// Relative values resolve against their parent key the way apt does:
    /// `Dir::Etc::sourcelist` against `Dir::Etc`, which resolves against
    /// `Dir`. Missing keys take apt's built-in defaults.
    pub fn from_apt_config_dump(dump: &str) -> Self {
        let values = parse_apt_config_dump(dump);
        let lookup = |key: &str, default: &str| -> String {
            values
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        let root = PathBuf::from(lookup("Dir", "/"));
        let etc = resolve(&root, &lookup("Dir::Etc", "etc/apt/"));
        let sources_list = resolve(&etc, &lookup("Dir::Etc::sourcelist", "sources.list"));
        let sources_dir = resolve(&etc, &lookup("Dir::Etc::sourceparts", "sources.list.d"));

        debug!(
            "apt locations: list={} parts={}",
            sources_list.display(),
            sources_dir.display()
        );
        Self {
            sources_list,
            sources_dir,
        }
    }

    /// Glob matching every list file in the source-parts directory
    pub fn parts_pattern(&self) -> String {
        let dir = glob::Pattern::escape(&self.sources_dir.to_string_lossy());
        format!("{}/*.list", dir.trim_end_matches('/'))
    }
}

fn resolve(base: &Path, value: &str) -> PathBuf {
    if value.starts_with('/') {
        PathBuf::from(value)
    } else {
        base.join(value)
    }
}

/// Parse one `Key "value";` line of apt-config dump output
pub fn parse_dump_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = take_till1(|c: char| c.is_whitespace()).parse(input)?;
    let (input, _) = space1(input)?;
    let (input, value) = delimited(char('"'), take_until("\""), char('"')).parse(input)?;
    let (input, _) = (space0, char(';')).parse(input)?;
    Ok((input, (key, value)))
}

/// Collects `Key -> value` pairs from apt-config dump output
///
/// Lines that don't match `Key "value";` are skipped.
pub fn parse_apt_config_dump(dump: &str) -> HashMap<String, String> {
    dump.lines()
        .filter_map(|line| parse_dump_line(line.trim()).ok())
        .map(|(_, (key, value))| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests;
