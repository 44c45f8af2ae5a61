//! Core library exports for the catalog sync service.
//!
//! The `data` feature exposes the domain, Diesel models and repositories. The
//! `server` feature adds the sync services, the task queue and the admin
//! routes used by the `pushkind-catalog-sync` binary.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod queue;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
