//! Configuration module for Maildown
//!
//! This module provides configuration management including:
//! - Home directory and file path resolution
//! - The TOML key-value config store and its provider namespaces

pub mod paths;
pub mod store;

pub use paths::MaildownPaths;
pub use store::{
    load_namespace, update_namespace, ConfigStore, Configuration, FileConfigStore,
    MemoryConfigStore,
};
