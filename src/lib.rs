//! Shell configuration transpiler.
//!
//! Reads a declarative YAML manifest of functions and modules and renders
//! each one into idiomatic fish, zsh, bash and PowerShell files, with a
//! `.gitignore` ledger per output directory.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** — load, merge and validate manifests; typed model; settings
//! - **[`render`]** — guard/predicate tables, construct renderers, file generators
//! - **[`output`]** — output directory mapping, file writing and drift checks
//! - **[`commands`]** — top-level subcommand orchestration (`generate`, `validate`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod output;
pub mod render;
pub mod shell;
pub mod syntax;
