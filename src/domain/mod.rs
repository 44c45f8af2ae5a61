//! Domain entities and value objects.

pub mod attachment;
pub mod catalog;
pub mod product;
pub mod task;
pub mod types;
