//! CLI command implementations.

pub mod config;
pub mod info;
pub mod resources;
pub mod rows;
