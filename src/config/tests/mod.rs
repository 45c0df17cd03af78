//! Config module tests
//!
//! - apt location discovery (`apt-config dump` parsing and resolution)
//! - Loading list files from a temporary directory tree
//! - Atomic save, file modes and deletion of emptied files
