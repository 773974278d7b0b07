//! CLI command handling

pub mod show_config;
pub mod simulate;

pub use show_config::*;
pub use simulate::*;
