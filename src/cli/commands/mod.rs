//! Command implementations

pub mod completions;
pub mod config;
pub mod export;
pub mod list;
pub mod stats;
pub mod utils;
