//! # Sailsync CLI Binary
//!
//! Thin entry point. Everything interesting lives in `cli/`, which wires the
//! terminal (menus, prompts, colors, exit codes) to [`sailsync::api::SyncApi`].
//! See the library docs for the layer overview.

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
