//! Execution modes: HTTP server and one-shot CLI commands

pub mod commands;
pub mod server;

pub use commands::{run_config_generate, run_token};
pub use server::{AppState, run_server};
