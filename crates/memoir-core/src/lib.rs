//! # Memoir Core
//!
//! The domain layer of the El-Memoir blog backend.
//! This crate contains the post model, the storage ports and the selector
//! that routes every call to whichever backend is currently able to serve it.
//! It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod selector;

pub use error::{DomainError, RepoError};
pub use selector::{Backend, StorageSelector};
