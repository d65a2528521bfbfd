//! Domain logic: configuration, error taxonomy, and the correlation table.

pub mod config;
pub mod error;
pub mod pending;
