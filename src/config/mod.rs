//! Configuration module for Pocketbook
//!
//! This module provides configuration management including:
//! - Platform path resolution for the data root
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
