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

//! src/core/parser.rs
//!
//! APT sources list line parser
//!
//! This module turns raw list-file lines into `SourceRecord`s. It handles:
//! - `deb` and `deb-src` directives
//! - Disabled (`#`-prefixed) directives, so they can be re-enabled later
//! - Trailing `# comment` text
//! - Redundant whitespace, collapsed so specs compare by plain string equality
//! - `ppa:owner[/name]` shorthand
//!
//! # Architecture
//! There is one pure line parser, `parse_line`, which never fails. Callers
//! that need an active directive (operands to add/remove) escalate through
//! `parse_source_spec`, which rejects invalid or disabled lines. Loading
//! existing files always uses the tolerant path.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{all_consuming, map, opt},
    sequence::preceded,
    IResult, Parser,
};

use crate::config::RepoError;
use crate::core::types::{PpaSpec, SourceRecord, SourceType};

/// Parse a complete list file into ordered records
///
/// Every line produces exactly one record, so a load/save cycle keeps the
/// file's line structure intact.
pub fn parse_file_content(content: &str) -> Vec<SourceRecord> {
    content.lines().map(parse_line).collect()
}

/// Parse a single raw line (tolerant)
///
/// # Example
/// ```
/// use apt_repo_manager::core::parser::parse_line;
///
/// let record = parse_line("#  deb   http://example.com/  stable main # mirror");
/// assert!(record.valid);
/// assert!(!record.enabled);
/// assert_eq!(record.source, "deb http://example.com/ stable main");
/// assert_eq!(record.comment, "mirror");
/// ```
pub fn parse_line(raw: &str) -> SourceRecord {
    let line = raw.trim_end_matches(['\r', '\n']);
    let mut text = line.trim();
    let mut enabled = true;

    if let Some(rest) = text.strip_prefix('#') {
        enabled = false;
        text = rest;
    }

    // An interior '#' starts the comment; one at position 0 belongs to the text
    let (candidate, comment) = match text.find('#') {
        Some(i) if i > 0 => (&text[..i], text[i + 1..].trim()),
        _ => (text, ""),
    };

    let chunks: Vec<&str> = candidate.split_whitespace().collect();
    let valid = chunks.first().is_some_and(|first| is_source_type(first));
    let source = if valid { chunks.join(" ") } else { String::new() };

    SourceRecord {
        valid,
        enabled,
        source,
        comment: comment.to_string(),
        line: line.to_string(),
    }
}

/// Parse an operand line, requiring an active directive (strict)
///
/// # Returns
/// The normalized source line.
///
/// # Errors
/// `RepoError::InvalidSource` if the line is not a valid directive or is
/// commented out.
pub fn parse_source_spec(raw: &str) -> Result<String, RepoError> {
    let record = parse_line(raw);
    if !record.valid || !record.enabled {
        return Err(RepoError::InvalidSource(raw.trim().to_string()));
    }
    Ok(record.source)
}

/// Parse a directive keyword (deb, deb-src)
///
/// `deb-src` is tried first since `deb` is its prefix.
pub fn parse_source_type(input: &str) -> IResult<&str, SourceType> {
    map(alt((tag("deb-src"), tag("deb"))), |s: &str| match s {
        "deb-src" => SourceType::DebSrc,
        _ => SourceType::Deb,
    })
    .parse(input)
}

/// True if the whole token is a directive keyword
pub fn is_source_type(token: &str) -> bool {
    all_consuming(parse_source_type).parse(token).is_ok()
}

fn is_ppa_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+' | '_')
}

/// Parse PPA shorthand
///
/// Formats supported:
/// - "ppa:owner/name"
/// - "ppa:owner" (name defaults to "ppa")
pub fn parse_ppa(input: &str) -> IResult<&str, PpaSpec> {
    let (input, _) = tag("ppa:").parse(input)?;
    let (input, owner) = take_while1(is_ppa_char).parse(input)?;
    let (input, name) = opt(preceded(char('/'), take_while1(is_ppa_char))).parse(input)?;

    Ok((
        input,
        PpaSpec {
            owner: owner.to_string(),
            name: name.unwrap_or("ppa").to_string(),
        },
    ))
}

/// Parse a complete PPA operand, rejecting trailing garbage
pub fn parse_ppa_spec(raw: &str) -> Result<PpaSpec, RepoError> {
    all_consuming(parse_ppa)
        .parse(raw.trim())
        .map(|(_, ppa)| ppa)
        .map_err(|_| RepoError::InvalidSource(raw.trim().to_string()))
}
