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

//! APT Repository Manager
//!
//! Idempotent management of Debian/Ubuntu APT `sources.list` entries,
//! including Launchpad PPA shorthand and signing-key installation.
//!
//! # Features
//!
//! - **Tolerant parsing:** Comments, blank and malformed lines survive a
//!   load/save cycle untouched
//! - **Idempotent edits:** Adding an existing source re-enables it instead of
//!   duplicating it; removing a missing source is a no-op
//! - **Multi-file aware:** The primary list and every `*.list` file in the
//!   source-parts directory are edited as one set
//! - **Atomic writes:** Temp-file-then-rename, empty files are deleted
//! - **PPA support:** `ppa:owner/name` is expanded for the running Ubuntu
//!   release and its signing key is fetched from Launchpad
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, line parser, sources model, PPA expansion)
//! - **`config`:** File operations (apt paths, loading, atomic persistence, errors)
//! - **`system`:** External collaborators (processes, distribution, Launchpad)
//! - **`manager`:** Plain vs. PPA-capable behaviour and the apply workflow
//!
//! # Examples
//!
//! ## Editing a sources list in memory
//!
//! ```
//! use apt_repo_manager::config::AptPaths;
//! use apt_repo_manager::core::SourcesList;
//!
//! let mut sources = SourcesList::new(AptPaths::new("/tmp/sources.list", "/tmp/sources.list.d"));
//! sources.insert_file("/tmp/sources.list", "# deb http://example.com/ stable main\n");
//!
//! sources.add_source("deb http://example.com/ stable main", "", None)?;
//! assert!(sources.iter().all(|entry| entry.enabled));
//! # Ok::<(), apt_repo_manager::RepoError>(())
//! ```
//!
//! ## Applying a change to disk
//!
//! ```no_run
//! use apt_repo_manager::config::AptPaths;
//! use apt_repo_manager::core::SourcesList;
//! use apt_repo_manager::manager::{ApplyRequest, SourcesManager};
//! use apt_repo_manager::system::{AptClient, ClientMode, SystemRunner};
//!
//! let sources = SourcesList::load(AptPaths::default())?;
//! let mut manager = SourcesManager::Plain(sources);
//! let apt = AptClient::new(ClientMode::Live, Box::new(SystemRunner));
//!
//! let request = ApplyRequest::present("deb http://deb.debian.org/debian bookworm main");
//! let outcome = manager.apply(&request, &apt)?;
//! println!("changed: {}", outcome.changed);
//! # Ok::<(), apt_repo_manager::RepoError>(())
//! ```

pub mod config;
pub mod core;
pub mod manager;
pub mod system;

// Re-export commonly used types for convenience
pub use crate::config::{AptPaths, RepoError};
pub use crate::core::{SourceEntry, SourceRecord, SourceType, SourcesList};
pub use crate::manager::{ApplyOutcome, ApplyRequest, RepoState, SourcesManager};
