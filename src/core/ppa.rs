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

//! Launchpad PPA shorthand expansion
//!
//! `ppa:owner/name` becomes
//! `deb http://ppa.launchpad.net/<owner>/<name>/ubuntu <codename> main`.

use crate::config::RepoError;
use crate::core::parser::parse_ppa_spec;
use crate::core::types::PpaSpec;

/// Archive host serving every PPA
pub const PPA_ARCHIVE_URL: &str = "http://ppa.launchpad.net";

/// An expanded PPA operand
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpandedPpa {
    /// Canonical `deb` line for the running release
    pub line: String,
    /// Owner and name, for signing-key lookup
    pub ppa: PpaSpec,
}

/// True if the operand uses PPA shorthand
pub fn is_ppa(line: &str) -> bool {
    line.trim_start().starts_with("ppa:")
}

/// Builds the canonical source line for a PPA
pub fn ppa_source_line(ppa: &PpaSpec, codename: &str) -> String {
    format!(
        "deb {}/{}/{}/ubuntu {} main",
        PPA_ARCHIVE_URL, ppa.owner, ppa.name, codename
    )
}

/// Expands `ppa:owner[/name]` for the given distribution codename
///
/// # Example
/// ```
/// use apt_repo_manager::core::ppa::expand_ppa;
///
/// let expanded = expand_ppa("ppa:nginx/stable", "focal")?;
/// assert_eq!(
///     expanded.line,
///     "deb http://ppa.launchpad.net/nginx/stable/ubuntu focal main"
/// );
/// # Ok::<(), apt_repo_manager::RepoError>(())
/// ```
///
/// # Errors
/// `RepoError::InvalidSource` if the shorthand is malformed.
pub fn expand_ppa(path: &str, codename: &str) -> Result<ExpandedPpa, RepoError> {
    let ppa = parse_ppa_spec(path)?;
    Ok(ExpandedPpa {
        line: ppa_source_line(&ppa, codename),
        ppa,
    })
}

/// Seed for `suggest_filename` so each PPA and release gets its own file
///
/// `ppa:nginx/stable` on `focal` yields `ppa_nginx_stable_focal.list`.
pub fn ppa_filename_seed(path: &str, codename: &str) -> String {
    format!("{}_{}", path.trim(), codename)
}
