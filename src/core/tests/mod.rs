//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Line parser tests (tolerant and strict paths, PPA shorthand)
//! - Sources list mutation tests (add/remove/enable semantics)
//! - PPA expansion tests
//! - Type tests (SourceRecord rendering, PpaSpec)

#[cfg(test)]
mod sources_tests;
