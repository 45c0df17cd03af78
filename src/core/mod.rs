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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the data structures and algorithms for sources
//! list management:
//! - Type definitions for records, entries and PPAs
//! - The tolerant/strict line parser
//! - The in-memory sources model with add/remove semantics
//! - PPA shorthand expansion
//!
//! Nothing here touches the filesystem, the network or child processes,
//! so all of it is unit-testable against in-memory content.

pub mod parser;
pub mod ppa;
pub mod sources;
pub mod types;

pub use parser::{parse_line, parse_source_spec};
pub use ppa::{expand_ppa, ExpandedPpa};
pub use sources::{suggest_filename, SourcesList};
pub use types::*;

#[cfg(test)]
mod tests;
