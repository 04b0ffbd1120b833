//! refsort - an ordered reference list engine
//!
//! This crate provides the core functionality for the `refsort` CLI tool:
//! building a numbered list of free-text references, reordering it, exporting
//! it for copying, and saving it as a named project.
//!
//! # Architecture
//!
//! - [`list`] - Import parser, ordered list store and export formatter
//! - [`sync`] - Change detection against the last saved state
//! - [`session`] - Project session lifecycle (load, edit, save)
//! - [`storage`] - Project store trait with SQLite and in-memory backends
//! - [`model`] - Data types (`ReferenceItem`, `Project`, `Snapshot`)
//! - [`export`] - Export sinks (stdout, file)
//! - [`config`] - Paths, owner resolution, settings and workspace files
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod list;
pub mod model;
pub mod session;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
