//! Command handlers.
//!
//! Handlers orchestrate: gather input, call into `steamfetch-runtime` or
//! `steamfetch-axum`, render output. Download policy lives below them.

pub mod fetch;
pub mod paths;
pub mod serve;
pub mod steamcmd;
