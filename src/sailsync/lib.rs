//! # Sailsync Architecture
//!
//! Sailsync keeps Sailthru email templates and a local folder of HTML files in
//! step: send a test of a remote template, pull remote templates down, push
//! local ones up, and optionally keep pushing a file every time it is saved.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Menus and prompts, colored output, logging setup         │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Owns the cached remote catalog                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - The sync engine: test, pull, push, watch                 │
//! │  - Asks questions through the Prompter trait only           │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Local Store (store/)         │ │  Remote (remote/)         │
//! │  - TemplateStore trait        │ │  - TemplateRepository     │
//! │  - FileStore, InMemoryStore   │ │  - SailthruClient,        │
//! │                               │ │    InMemoryRepository     │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never calls
//! `std::process::exit` and never reads the terminal directly. Questions go
//! through [`prompt::Prompter`], results come back as
//! [`commands::CmdResult`]. A "no" to a confirmation is a result, not an
//! error.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: flow tests against `InMemoryStore`, `InMemoryRepository`
//!    and a `ScriptedPrompter`. Most tests live here.
//! 2. **API**: dispatch tests.
//! 3. **Stores and adapters**: `FileStore` against temp dirs, the Sailthru
//!    request signing in isolation.
//! 4. **CLI**: binary tests with `assert_cmd`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: The sync engine, one module per workflow
//! - [`store`]: Local template files and their sidecars
//! - [`remote`]: The Sailthru template API
//! - [`model`]: Templates, metadata and the save payload
//! - [`recipients`]: Recipient parsing and alias expansion
//! - [`prompt`]: The "ask the user" seam
//! - [`watcher`]: File change notifications for one template
//! - [`config`]: Project config, env files and credentials
//! - [`error`]: Error types
//! - `cli`: Menus, prompts and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod prompt;
pub mod recipients;
pub mod remote;
pub mod store;
pub mod watcher;
