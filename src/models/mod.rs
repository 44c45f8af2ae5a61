pub mod attachment;
#[cfg(feature = "server")]
pub mod config;
pub mod product;
