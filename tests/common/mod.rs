// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed source root and a fluent builder so
// each integration test can set up an isolated manifest tree without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use shellgen::cli::{GlobalOpts, SourceOpts};
use shellgen::commands::CommandSetup;
use shellgen::logging::Logger;

/// A manifest exercising predicates, per-shell bodies, guards, `not`,
/// aliases, paths and a three-branch conditional.
pub const SAMPLE_MANIFEST: &str = r#"functions:
  - name: is-linux
    description: Return success on Linux
    predicate: os_is_linux
  - name: mkcd
    description: Create a directory and enter it
    usage: mkcd <dir>
    body:
      shared: |
        mkdir -p "$1" && cd "$1"
      fish: |
        mkdir -p $argv[1]; and cd $argv[1]
      pwsh: |
        New-Item -ItemType Directory -Force -Path $args[0] | Out-Null
        Set-Location $args[0]
modules:
  - name: path
    prefix: "00"
    description: User binaries on PATH
    paths:
      - $HOME/.local/bin
      - $HOME/.cargo/bin
  - name: eza
    prefix: "40"
    description: Modern ls replacement
    url: https://eza.rocks
    guard:
      command_exists: eza
    aliases:
      ls: eza
      ll: eza -l
  - name: editor
    prefix: "10"
    description: Preferred editor
    guards:
      - is_interactive
      - not:
          env_set: SSH_CONNECTION
    conditional:
      - if:
          command_exists: nvim
        env:
          EDITOR: nvim
      - elif:
          command_exists: vim
        env:
          EDITOR: vim
      - else: true
        env:
          EDITOR: vi
"#;

/// An isolated source root backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestRepo {
    /// Temporary directory used as the source root.
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    /// Create an empty source root.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Path to the source root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel` under the root, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    /// Read `rel` under the root.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.root().join(rel)).expect("read file")
    }

    /// Global options pointing at this root with stdin disabled.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            quiet: true,
            root: Some(self.root().to_path_buf()),
            stdin: false,
        }
    }

    /// Run the shared command setup for `sources` (defaults when empty).
    pub fn setup(&self, sources: &[&str], log: &Logger) -> anyhow::Result<CommandSetup> {
        let opts = SourceOpts {
            sources: sources.iter().map(ToString::to_string).collect(),
        };
        CommandSetup::from_sources(&self.global(), Vec::new(), &opts, log)
    }
}

/// Fluent builder for [`TestRepo`].
pub struct TestRepoBuilder {
    repo: TestRepo,
}

impl TestRepoBuilder {
    /// Begin building an empty source root.
    pub fn new() -> Self {
        Self {
            repo: TestRepo::new(),
        }
    }

    /// Write the conventional `.shellgen/shell.yaml`.
    pub fn with_manifest(self, yaml: &str) -> Self {
        self.repo.write(".shellgen/shell.yaml", yaml);
        self
    }

    /// Write the `.shellgen/config.toml` settings file.
    pub fn with_settings(self, toml: &str) -> Self {
        self.repo.write(".shellgen/config.toml", toml);
        self
    }

    /// Write an extra file at `rel`.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.repo.write(rel, content);
        self
    }

    /// Finalise and return the repository.
    pub fn build(self) -> TestRepo {
        self.repo
    }
}

/// Paths relative to `root`, with `/` separators on every platform.
pub fn relative_paths(root: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .expect("path under root")
                .display()
                .to_string()
                .replace('\\', "/")
        })
        .collect()
}
