//! Data model for crawled films and their fans
//!
//! # Components
//!
//! - `Entity`: one film from the catalog listing, identified by its slug
//! - `Associate`: one fan of a film

mod associate;
mod entity;

// Re-export main types
pub use associate::Associate;
pub use entity::{slug_from_link, Entity, NO_SLUG};
