//! MongoDB document store - the primary backend when reachable.

mod document;
mod repository;

pub use repository::{MongoConfig, MongoPostRepository};
