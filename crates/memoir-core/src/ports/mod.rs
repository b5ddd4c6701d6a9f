//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod connectivity;
mod repository;

pub use connectivity::Connectivity;
pub use repository::PostRepository;
