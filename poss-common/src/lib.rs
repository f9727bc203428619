//! # Possessão Common Library
//!
//! Shared code for the assessment engine, the image compositor and the
//! session service:
//! - Entity catalog definitions and the static seed list
//! - SQLite entity store
//! - Question and demographic vocabularies
//! - Configuration loading
//! - Common error type

pub mod catalog;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod demographics;
pub mod error;
pub mod questions;

pub use catalog::{EntityCatalog, EntityDefinition};
pub use error::{Error, Result};
