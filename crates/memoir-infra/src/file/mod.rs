//! Flat-file JSON storage - used as fallback when the document store is unavailable.

mod record;
mod repository;

pub use repository::JsonFilePostRepository;
