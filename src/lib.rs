//! linguasync - keep JSON translation files in sync with a base language
//!
//! linguasync finds keys that are missing from target-language translation
//! trees, or whose base-language text changed since the last sync, sends them
//! to an AI translation provider in batches, and merges the results back
//! without disturbing the rest of each file.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands, reports, exit statuses)
//! - `config`: Configuration file loading and validation
//! - `core`: Tree diffing, merging, snapshots and the sync pipeline
//! - `provider`: Translation provider trait and the OpenAI implementation

pub mod cli;
pub mod config;
pub mod core;
pub mod provider;
