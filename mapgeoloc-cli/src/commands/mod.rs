//! CLI command implementations.

pub mod common;
pub mod config;
pub mod geo;
pub mod replay;
pub mod session;
pub mod simulate;
