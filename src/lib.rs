//! Maildown - send Markdown emails through a transactional email provider
//!
//! Messages are written in Markdown, rendered to HTML with highlighted code
//! blocks, styled by inlining a CSS theme into every element, and sent
//! alongside the raw Markdown as the plain-text part.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path management and the TOML config store
//! - `credentials`: Credential resolution and validation
//! - `render`: Markdown rendering, CSS inlining and variable substitution
//! - `backend`: Email providers (Amazon SES)
//! - `cli`: Command handlers
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use std::collections::BTreeMap;
//! use maildown::render::{Renderer, DEFAULT_THEME};
//!
//! let html = Renderer::new().render("# Hello {{ name }}", DEFAULT_THEME, &BTreeMap::new())?;
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod render;

pub use error::{MaildownError, MaildownResult};
