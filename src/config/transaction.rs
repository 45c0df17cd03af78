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

//! Atomic persistence of the sources list file set
//!
//! Each file is written to a temporary file in its own directory and
//! renamed over the destination, so readers only ever see the old or the
//! new content. Saving is per-file: if a later file fails, files already
//! written stay written.

use atomic_write_file::AtomicWriteFile;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::config::RepoError;
use crate::core::sources::{render_records, SourcesList};

/// Permissions applied to list files created by this tool
pub const DEFAULT_SOURCES_MODE: u32 = 0o644;

/// What a save did to the filesystem
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SaveReport {
    /// Files atomically replaced or created
    pub written: Vec<PathBuf>,
    /// Files removed because no records were left
    pub deleted: Vec<PathBuf>,
}

impl SourcesList {
    /// Writes every file in the set back to disk
    ///
    /// - Non-empty files are rendered and atomically replaced. Files that
    ///   received a new record get `mode`; existing files keep theirs.
    /// - Files emptied by a removal are dropped from the set and deleted if
    ///   present. Files that were already empty when loaded are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::PersistenceFailure` with the path and cause on
    /// the first failure. Files written before it are not rolled back.
    pub fn save(&mut self, mode: u32) -> Result<SaveReport, RepoError> {
        let mut report = SaveReport::default();

        let emptied: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|(path, records)| records.is_empty() && self.shrunk_files.contains(*path))
            .map(|(path, _)| path.clone())
            .collect();

        for (path, records) in self.files.iter().filter(|(_, records)| !records.is_empty()) {
            write_atomically(path, &render_records(records))?;
            if self.new_files.contains(path) {
                apply_mode(path, mode)?;
            }
            debug!("Wrote {}", path.display());
            report.written.push(path.clone());
        }

        for path in emptied {
            self.files.remove(&path);
            if path.exists() {
                fs::remove_file(&path).map_err(|source| RepoError::PersistenceFailure {
                    path: path.clone(),
                    source,
                })?;
                debug!("Deleted empty {}", path.display());
                report.deleted.push(path);
            }
        }

        self.new_files.clear();
        self.shrunk_files.clear();
        info!(
            "Saved sources: {} written, {} deleted",
            report.written.len(),
            report.deleted.len()
        );
        Ok(report)
    }
}

/// Replaces `path` with `content` via temp file and rename
pub fn write_atomically(path: &Path, content: &str) -> Result<(), RepoError> {
    let failure = |source| RepoError::PersistenceFailure {
        path: path.to_path_buf(),
        source,
    };

    // Open file for atomic writing
    let mut file = AtomicWriteFile::options().open(path).map_err(failure)?;

    // Write content
    file.write_all(content.as_bytes()).map_err(failure)?;

    // Commit atomically
    file.commit().map_err(failure)?;

    Ok(())
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<(), RepoError> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        RepoError::PersistenceFailure {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<(), RepoError> {
    Ok(())
}
