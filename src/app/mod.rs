pub mod api;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod models;
pub mod roles;
pub mod session;
pub mod state;
