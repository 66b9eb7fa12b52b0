//! acorr-bench CLI library
//!
//! Exposes the configuration, exit-code and output modules for testing.

pub mod commands;
pub mod config;
pub mod exit;
pub mod output;
