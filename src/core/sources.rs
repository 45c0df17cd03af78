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

//! src/core/sources.rs
//!
//! In-memory model of the APT sources list file set
//!
//! `SourcesList` maps each list file to its ordered records and implements
//! the add/remove semantics:
//! - Adding a source that already exists (in any file, enabled or not) enables
//!   every copy instead of appending a duplicate
//! - Adding a new source appends it to a per-repository file whose name is
//!   derived from the source line
//! - Removing deletes every enabled copy outright; disabled copies stay
//!
//! Matching is plain string equality of whitespace-collapsed source lines.
//! Loading from disk lives in `config::store`, saving in
//! `config::transaction`.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use crate::config::{AptPaths, RepoError};
use crate::core::parser::{is_source_type, parse_file_content, parse_source_spec};
use crate::core::types::{RecordUpdate, SourceEntry, SourceRecord};

#[allow(clippy::expect_used)]
static OPTIONS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]+\]").expect("options block pattern should be valid regex")
});

#[allow(clippy::expect_used)]
static URI_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w+.-]+://").expect("uri scheme pattern should be valid regex")
});

#[allow(clippy::expect_used)]
static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9]+").expect("non-alphanumeric pattern should be valid regex")
});

/// The set of list files and their parsed records
///
/// Files are kept in a `BTreeMap`, so iteration visits them in path order;
/// the order of records within a file is always preserved.
#[derive(Clone, Debug)]
pub struct SourcesList {
    pub(crate) paths: AptPaths,
    pub(crate) files: BTreeMap<PathBuf, Vec<SourceRecord>>,
    /// Files that received an appended record during this run
    pub(crate) new_files: BTreeSet<PathBuf>,
    /// Files that lost records during this run; only these may be deleted
    /// when they end up empty
    pub(crate) shrunk_files: BTreeSet<PathBuf>,
}

impl SourcesList {
    /// Creates an empty list bound to the given apt locations
    pub fn new(paths: AptPaths) -> Self {
        Self {
            paths,
            files: BTreeMap::new(),
            new_files: BTreeSet::new(),
            shrunk_files: BTreeSet::new(),
        }
    }

    pub fn paths(&self) -> &AptPaths {
        &self.paths
    }

    /// Parses `content` and stores it as the records of `path`
    ///
    /// Replaces any records previously held for that path. Never fails:
    /// unparsable lines become invalid placeholder records.
    pub fn insert_file(&mut self, path: impl Into<PathBuf>, content: &str) {
        let path = path.into();
        let records = parse_file_content(content);
        debug!("Parsed {} lines from {}", records.len(), path.display());
        self.files.insert(path, records);
    }

    /// Records held for `path`, if the file is part of the set
    pub fn records(&self, path: &Path) -> Option<&[SourceRecord]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// All files in the set, including ones emptied by removals
    pub fn files(&self) -> impl Iterator<Item = (&Path, &[SourceRecord])> {
        self.files
            .iter()
            .map(|(path, records)| (path.as_path(), records.as_slice()))
    }

    pub fn new_files(&self) -> &BTreeSet<PathBuf> {
        &self.new_files
    }

    /// Iterates over every valid record across all files
    ///
    /// Invalid lines (blank, comments, malformed) are skipped, so matching
    /// logic never sees them.
    pub fn iter(&self) -> impl Iterator<Item = SourceEntry<'_>> {
        self.files.iter().flat_map(|(path, records)| {
            records
                .iter()
                .enumerate()
                .filter_map(move |(index, record)| {
                    Some(SourceEntry {
                        file: path.as_path(),
                        index,
                        source_type: record.source_type()?,
                        enabled: record.enabled,
                        source: &record.source,
                        comment: &record.comment,
                    })
                })
        })
    }

    /// Replaces fields of the record at `index` in `file`
    ///
    /// Fields left as `None` in `update` keep their value. A new `source` must
    /// be an active directive; it is normalized, and turns an invalid record
    /// (comment, blank line) into an enabled source.
    ///
    /// # Returns
    /// `false` if no such record exists or `update.source` is not a directive.
    /// Nothing is changed in that case.
    pub fn modify(&mut self, file: &Path, index: usize, update: RecordUpdate) -> bool {
        let source = match update.source.as_deref().map(parse_source_spec) {
            Some(Ok(source)) => Some(source),
            Some(Err(_)) => return false,
            None => None,
        };

        let Some(record) = self.files.get_mut(file).and_then(|records| records.get_mut(index))
        else {
            return false;
        };

        if let Some(source) = source {
            if !record.valid {
                record.valid = true;
                record.enabled = true;
            }
            record.source = source;
        }
        if let Some(enabled) = update.enabled {
            record.enabled = enabled;
        }
        if let Some(comment) = update.comment {
            record.comment = comment;
        }
        true
    }

    /// True if an enabled record carries exactly this normalized source
    pub fn has_enabled_source(&self, source: &str) -> bool {
        self.iter().any(|entry| entry.enabled && entry.source == source)
    }

    /// Renders every non-empty file as it would be written
    ///
    /// Empty files are omitted. A file emptied by a removal disappears from
    /// the dump and is deleted by `save()`; a file that was empty to begin
    /// with is absent from both sides and left alone on disk. Comparing two
    /// dumps tells whether an operation changed anything.
    pub fn dump(&self) -> BTreeMap<PathBuf, String> {
        self.files
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(path, records)| (path.clone(), render_records(records)))
            .collect()
    }

    /// Resolves a caller-supplied file name
    ///
    /// Names containing a path separator are used as-is; bare names land in
    /// the source-parts directory.
    pub fn expand_path(&self, filename: &str) -> PathBuf {
        if filename.contains('/') {
            PathBuf::from(filename)
        } else {
            self.paths.sources_dir.join(filename)
        }
    }

    /// Adds a source line, enabling existing copies instead of duplicating
    ///
    /// # Arguments
    ///
    /// * `line` - A `deb`/`deb-src` line; whitespace is normalized
    /// * `comment` - Trailing comment for a newly appended record
    /// * `file` - Target file name; derived from the line when `None`
    ///
    /// # Errors
    ///
    /// Returns `RepoError::InvalidSource` if `line` is not an active
    /// directive. Nothing is modified in that case.
    pub fn add_source(
        &mut self,
        line: &str,
        comment: &str,
        file: Option<&str>,
    ) -> Result<(), RepoError> {
        let source = parse_source_spec(line)?;
        let target = match file {
            Some(name) => Some(self.expand_path(name)),
            None => suggest_filename(&source).map(|name| self.expand_path(&name)),
        };
        self.add_valid_source(&source, comment, target);
        Ok(())
    }

    /// Adds an already-normalized source
    ///
    /// Every existing record with the same source is enabled. Only when none
    /// exists is a new record appended to `target` (or the primary list).
    pub(crate) fn add_valid_source(
        &mut self,
        source: &str,
        comment: &str,
        target: Option<PathBuf>,
    ) {
        let matches: Vec<(PathBuf, usize)> = self
            .iter()
            .filter(|entry| entry.source == source)
            .map(|entry| (entry.file.to_path_buf(), entry.index))
            .collect();

        if !matches.is_empty() {
            for (file, index) in &matches {
                debug!("Enabling existing source at {}:{}", file.display(), index + 1);
                self.modify(file, *index, RecordUpdate::enabled(true));
            }
            return;
        }

        let path = target.unwrap_or_else(|| self.paths.sources_list.clone());
        debug!("Appending '{}' to {}", source, path.display());
        self.files
            .entry(path.clone())
            .or_default()
            .push(SourceRecord::new_source(source, comment));
        self.new_files.insert(path);
    }

    /// Removes every enabled copy of a source line
    ///
    /// Removing a source that is not present is not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::InvalidSource` if `line` is not an active directive.
    pub fn remove_source(&mut self, line: &str) -> Result<(), RepoError> {
        let source = parse_source_spec(line)?;
        self.remove_valid_source(&source);
        Ok(())
    }

    /// Deletes enabled records matching `source`, returning how many went
    pub(crate) fn remove_valid_source(&mut self, source: &str) -> usize {
        let matches: Vec<(PathBuf, usize)> = self
            .iter()
            .filter(|entry| entry.enabled && entry.source == source)
            .map(|entry| (entry.file.to_path_buf(), entry.index))
            .collect();

        // Indices ascend within each file, so removing back to front keeps
        // the remaining ones valid
        for (file, index) in matches.iter().rev() {
            if let Some(records) = self.files.get_mut(file) {
                debug!("Removing source at {}:{}", file.display(), index + 1);
                records.remove(*index);
                self.shrunk_files.insert(file.clone());
            }
        }

        matches.len()
    }
}

/// Joins records into file content, one newline-terminated line each
pub fn render_records(records: &[SourceRecord]) -> String {
    records.iter().fold(String::new(), |mut out, record| {
        out.push_str(&record.render());
        out.push('\n');
        out
    })
}

/// Derives a per-repository file name from a source line
///
/// Drops the `[...]` options block and the directive keyword, takes the
/// first remaining token, strips credentials, and for URIs keeps only the
/// host part. Runs of other characters become underscores.
///
/// # Example
/// ```
/// use apt_repo_manager::core::sources::suggest_filename;
///
/// assert_eq!(
///     suggest_filename("deb http://archive.ubuntu.com/ubuntu hardy partner").as_deref(),
///     Some("archive_ubuntu_com.list"),
/// );
/// ```
///
/// Returns `None` if nothing usable is left (e.g. a bare `deb`).
pub fn suggest_filename(line: &str) -> Option<String> {
    let line = OPTIONS_BLOCK.replace_all(line, "");
    let first = line.split_whitespace().find(|part| !is_source_type(part))?;

    let (token, is_uri) = match URI_SCHEME.find(first) {
        Some(scheme) => (&first[scheme.end()..], true),
        None => (first, false),
    };

    let token = token.split_once('@').map_or(token, |(_, host)| host);
    let token = if is_uri {
        token.split('/').next().unwrap_or(token)
    } else {
        token
    };

    let cleaned = NON_ALPHANUMERIC.replace_all(token, " ");
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }

    Some(format!("{}.list", words.join("_")))
}
