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

//! src/core/types.rs
//!
//! Core type definitions for sources list management
//!
//! This module defines the fundamental types used throughout the crate:
//! - `SourceType`: The two APT directive types (`deb`, `deb-src`)
//! - `SourceRecord`: One parsed line of a list file
//! - `SourceEntry`: Borrowed view of a valid record, as produced by iteration
//! - `RecordUpdate`: Tri-state field replacement for in-place edits
//! - `PpaSpec`: Owner and archive name of a Launchpad PPA

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::core::parser::parse_source_type;

/// APT source directive type
///
/// Only these two directives make a line a source; anything else is kept
/// verbatim but never matched.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// Binary packages (`deb`)
    Deb,
    /// Source packages (`deb-src`)
    DebSrc,
}

impl SourceType {
    /// Keyword as written in a list file
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Deb => "deb",
            SourceType::DebSrc => "deb-src",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One logical line within a list file
///
/// The record's index is its position in the owning file's sequence; it is
/// not stored so that removals can never leave a stale index behind.
///
/// # Invariants
/// - `valid == false` implies `source` is empty
/// - `valid == true` implies `source` starts with `deb` or `deb-src`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceRecord {
    /// Line is a `deb`/`deb-src` directive (possibly disabled)
    pub valid: bool,

    /// Line is active (not `#`-prefixed)
    pub enabled: bool,

    /// Whitespace-collapsed directive, empty when invalid
    pub source: String,

    /// Trailing text after an interior `#`, trimmed
    pub comment: String,

    /// Original text without line terminator
    /// Written back verbatim for invalid lines so unrelated content survives
    pub line: String,
}

impl SourceRecord {
    /// Creates an enabled record for a normalized source line
    pub fn new_source(source: impl Into<String>, comment: impl Into<String>) -> Self {
        let mut record = Self {
            valid: true,
            enabled: true,
            source: source.into(),
            comment: comment.into(),
            line: String::new(),
        };
        record.line = record.render();
        record
    }

    /// Renders the record as a list file line (without newline)
    ///
    /// Valid records are rebuilt from their fields:
    /// `[# ]<source>[ # <comment>]`. Invalid records return the original text.
    pub fn render(&self) -> String {
        if !self.valid {
            return self.line.clone();
        }

        let mut out = String::with_capacity(self.source.len() + self.comment.len() + 5);
        if !self.enabled {
            out.push_str("# ");
        }
        out.push_str(&self.source);
        if !self.comment.is_empty() {
            out.push_str(" # ");
            out.push_str(&self.comment);
        }
        out
    }

    /// Directive type of a valid record, `None` for invalid lines
    pub fn source_type(&self) -> Option<SourceType> {
        if !self.valid {
            return None;
        }
        parse_source_type(&self.source)
            .ok()
            .map(|(_, source_type)| source_type)
    }
}

impl fmt::Display for SourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A valid record as seen through `SourcesList::iter()`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SourceEntry<'a> {
    /// File holding the record
    pub file: &'a Path,
    /// Position within that file
    pub index: usize,
    pub source_type: SourceType,
    pub enabled: bool,
    pub source: &'a str,
    pub comment: &'a str,
}

/// Field replacements for `SourcesList::modify`
///
/// `None` keeps the record's current value; `Some` replaces it, including
/// `Some(String::new())` which explicitly clears a comment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordUpdate {
    pub enabled: Option<bool>,
    pub source: Option<String>,
    pub comment: Option<String>,
}

impl RecordUpdate {
    /// Update that only toggles the enabled flag
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }
}

/// A Launchpad Personal Package Archive
///
/// Parsed from `ppa:owner[/name]`; the name defaults to `ppa`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PpaSpec {
    /// Launchpad user or team
    pub owner: String,
    /// Archive name within the owner's namespace
    pub name: String,
}

impl fmt::Display for PpaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ppa:{}/{}", self.owner, self.name)
    }
}
