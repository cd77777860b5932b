//! GitHub releases for deployment tags.
//!
//! The crate lists a repository's releases, then updates or creates the
//! release for a deploy tag. Transport lives in [`http`], reconciliation in
//! [`release`].

pub mod changelog;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod release;
pub mod repo;
pub mod runtime;

pub use error::{ApiError, Error, Result};
