//! # CLI Layer
//!
//! One possible UI client for sailsync. This is the only place that:
//! - Knows about terminal I/O (stdout, stderr, interactive prompts)
//! - Decides exit codes
//! - Handles argument parsing
//! - Sets up logging
//!
//! ## Exit Codes
//!
//! | Outcome | Code |
//! |---------|------|
//! | Flow finished, or the user said no / backed out | 0 |
//! | Watched file removed | 0 |
//! | Config error, failed flow, any failed item in a batch | 1 |
//!
//! ## Structure
//!
//! - `commands`: Startup, workflow dispatch and the watch loop
//! - `prompt`: `Prompter` on top of dialoguer
//! - `render`: Message printing
//! - `setup`: Argument parsing via clap

mod commands;
mod prompt;
mod render;
pub mod setup;

pub use commands::run;
