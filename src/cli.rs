use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the shell configuration transpiler.
#[derive(Parser, Debug)]
#[command(
    name = "shellgen",
    about = "Generate fish, zsh, bash and PowerShell configuration from a YAML manifest",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the source root directory
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Do not read source paths from a piped stdin
    #[arg(long = "no-stdin", global = true, action = clap::ArgAction::SetFalse)]
    pub stdin: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render every function and module for every shell
    Generate(GenerateOpts),
    /// Load, merge and validate the manifest without writing anything
    Validate(SourceOpts),
    /// Report generated files that are out of sync with the manifest
    Check(CheckOpts),
    /// Print version information
    Version,
}

/// Manifest source paths, shared by every subcommand that reads a manifest.
#[derive(Parser, Debug, Clone, Default)]
pub struct SourceOpts {
    /// Manifest files or directories containing shell.yaml, merged left to right
    pub sources: Vec<String>,
}

/// Options for the `generate` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct GenerateOpts {
    #[command(flatten)]
    pub source: SourceOpts,

    /// Write into real config directories under DIR instead of the source tree
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,
}

/// Options for the `check` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckOpts {
    #[command(flatten)]
    pub source: SourceOpts,

    /// Check real config directories under DIR instead of the source tree
    #[arg(short, long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Also parse-check generated files with any installed shell interpreters
    #[arg(long)]
    pub syntax: bool,
}
