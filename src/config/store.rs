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

//! Loading list files from disk
//!
//! Parsing is tolerant: a file with nonsense in it still loads, and every
//! line is kept. Only I/O failures abort a load.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{AptPaths, RepoError};
use crate::core::SourcesList;

impl SourcesList {
    /// Loads the primary list (if present) and every `*.list` file in the
    /// source-parts directory
    ///
    /// # Errors
    ///
    /// Returns `RepoError::LoadFailed` if a file exists but cannot be read,
    /// or the parts glob is unusable.
    pub fn load(paths: AptPaths) -> Result<Self, RepoError> {
        let mut sources = SourcesList::new(paths);

        let primary = sources.paths().sources_list.clone();
        if primary.is_file() {
            sources.load_file(&primary)?;
        } else {
            debug!("Primary list {} not present", primary.display());
        }

        for path in list_part_files(sources.paths())? {
            sources.load_file(&path)?;
        }

        info!(
            "Loaded {} list files ({} sources)",
            sources.files().count(),
            sources.iter().count()
        );
        Ok(sources)
    }

    /// Reads one file into the set, replacing any records held for it
    pub fn load_file(&mut self, path: &Path) -> Result<(), RepoError> {
        let content = fs::read_to_string(path).map_err(|e| RepoError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.insert_file(path, &content);
        Ok(())
    }
}

/// Enumerates `*.list` files in the source-parts directory
///
/// A missing directory yields no files. Unreadable entries are skipped
/// with a warning.
pub fn list_part_files(paths: &AptPaths) -> Result<Vec<PathBuf>, RepoError> {
    let pattern = paths.parts_pattern();
    let entries = glob::glob(&pattern).map_err(|e| RepoError::LoadFailed {
        path: paths.sources_dir.clone(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(path) => debug!("Skipping non-file {}", path.display()),
            Err(e) => warn!("Skipping unreadable entry {}: {}", e.path().display(), e),
        }
    }
    Ok(files)
}
