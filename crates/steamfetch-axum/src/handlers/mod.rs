//! HTTP request handlers.
//!
//! Handlers are thin: extract, delegate to the job manager or filesystem,
//! translate errors. Policy lives in `steamfetch-runtime`.

pub mod events;
pub mod files;
pub mod job;
pub mod steamcmd;
pub mod ui;
