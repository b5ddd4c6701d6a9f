//! # Memoir Infrastructure
//!
//! Concrete implementations of the ports defined in `memoir-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All backends enabled
//! - `minimal` - JSON file storage only
//! - `mongo` - MongoDB document store via the official driver

pub mod file;

#[cfg(feature = "mongo")]
pub mod mongo;

pub use file::JsonFilePostRepository;

#[cfg(feature = "mongo")]
pub use mongo::{MongoConfig, MongoPostRepository};
