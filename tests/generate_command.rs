#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `generate` command.
//!
//! These tests run the full pipeline (source resolution, merge, validation,
//! rendering and writing) against a temporary source root, and snapshot
//! complete rendered files for each shell.

mod common;

use common::*;
use shellgen::cli::GenerateOpts;
use shellgen::commands::generate;
use shellgen::config::manifest::Manifest;
use shellgen::error::ShellgenError;
use shellgen::logging::{FileStatus, Logger};
use shellgen::output::{self, LEDGER_FILENAME};
use shellgen::render::HEADER;

fn generated_repo() -> (TestRepo, std::path::PathBuf) {
    let repo = TestRepoBuilder::new().with_manifest(SAMPLE_MANIFEST).build();
    let out = repo.root().join("out");
    let log = Logger::new();
    let setup = repo.setup(&[], &log).unwrap();
    let opts = GenerateOpts {
        target: Some(out.clone()),
        ..GenerateOpts::default()
    };
    generate::execute(&setup, &opts, &log).unwrap();
    (repo, out)
}

// ---------------------------------------------------------------------------
// Snapshots: written files and rendered text
// ---------------------------------------------------------------------------

/// Every written file, in generation order, relative to the target.
#[test]
fn generated_file_list() {
    let repo = TestRepo::new();
    let manifest = Manifest::from_yaml_str(SAMPLE_MANIFEST, std::path::Path::new("t.yaml")).unwrap();
    let written = output::generate_all(&manifest, Some(repo.root()), repo.root()).unwrap();
    insta::assert_snapshot!(
        "generated_file_list",
        relative_paths(repo.root(), &written).join("\n")
    );
}

#[test]
fn zsh_guarded_alias_module() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!("zsh_eza_module", repo.read("out/zsh/.zshrc.d/40-eza.zsh"));
}

#[test]
fn powershell_guarded_alias_module() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!(
        "powershell_eza_module",
        repo.read("out/powershell/conf.d/40-eza.ps1")
    );
}

#[test]
fn fish_conditional_module() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!("fish_editor_module", repo.read("out/fish/conf.d/10-editor.fish"));
}

#[test]
fn bash_conditional_module() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!("bash_editor_module", repo.read("out/bash/bashrc.d/10-editor.bash"));
}

#[test]
fn fish_body_function() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!("fish_mkcd_function", repo.read("out/fish/functions/mkcd.fish"));
}

#[test]
fn powershell_predicate_function() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!(
        "powershell_is_linux_function",
        repo.read("out/powershell/functions/is-linux.ps1")
    );
}

#[test]
fn zsh_module_ledger() {
    let (repo, _) = generated_repo();
    insta::assert_snapshot!(
        "zsh_module_ledger",
        repo.read(&format!("out/zsh/.zshrc.d/{LEDGER_FILENAME}"))
    );
}

// ---------------------------------------------------------------------------
// Structural invariants
// ---------------------------------------------------------------------------

/// Every generated file starts with the header and ends with one newline.
#[test]
fn every_file_has_header_and_single_trailing_newline() {
    let (_repo, out) = generated_repo();
    let manifest = Manifest::from_yaml_str(SAMPLE_MANIFEST, std::path::Path::new("t.yaml")).unwrap();
    let plan = output::plan(&manifest, Some(&out), std::path::Path::new("/unused")).unwrap();
    assert_eq!(plan.files.len(), 20);
    for file in &plan.files {
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with(HEADER), "{}", file.path().display());
        assert!(text.ends_with('\n') && !text.ends_with("\n\n"), "{}", file.path().display());
    }
}

/// The zsh function file is the bare autoloaded body.
#[test]
fn zsh_functions_are_bare_bodies() {
    let (repo, _) = generated_repo();
    let text = repo.read("out/zsh/.zfunctions/mkcd");
    assert!(text.ends_with("\nmkdir -p \"$1\" && cd \"$1\"\n"));
    assert!(!text.contains("mkcd()"));
}

/// Without a target, files land in the managed source tree.
#[test]
fn source_tree_mode_writes_under_dot_config() {
    let repo = TestRepoBuilder::new().with_manifest(SAMPLE_MANIFEST).build();
    let log = Logger::new();
    let setup = repo.setup(&[], &log).unwrap();
    generate::execute(&setup, &GenerateOpts::default(), &log).unwrap();

    assert!(repo.root().join("dot_config/fish/conf.d/40-eza.fish").is_file());
    assert!(repo.root().join("dot_config/zsh/dot_zfunctions/is-linux").is_file());
    assert!(repo.root().join("dot_config/bash/bashrc.d/00-path.bash").is_file());
    assert!(repo.root().join("dot_config/powershell/functions/mkcd.ps1").is_file());
    assert_eq!(log.count(FileStatus::Written), 20);
}

/// A configured target is used when none is given on the command line.
#[test]
fn configured_target_is_used() {
    let repo = TestRepoBuilder::new().with_manifest(SAMPLE_MANIFEST).build();
    let configured = repo.root().join("configured");
    repo.write(
        ".shellgen/config.toml",
        &format!("target = '{}'\n", configured.display()),
    );
    let log = Logger::new();
    let setup = repo.setup(&[], &log).unwrap();
    assert_eq!(setup.settings.target.as_deref(), Some(configured.as_path()));
    generate::execute(&setup, &GenerateOpts::default(), &log).unwrap();
    assert!(repo.root().join("configured/zsh/.zshrc.d/10-editor.zsh").is_file());
}

/// Running generation twice reproduces identical bytes.
#[test]
fn regeneration_is_byte_identical() {
    let (repo, out) = generated_repo();
    let before = repo.read("out/fish/conf.d/10-editor.fish");
    let log = Logger::new();
    let setup = repo.setup(&[], &log).unwrap();
    let opts = GenerateOpts {
        target: Some(out),
        ..GenerateOpts::default()
    };
    generate::execute(&setup, &opts, &log).unwrap();
    assert_eq!(repo.read("out/fish/conf.d/10-editor.fish"), before);
}

// ---------------------------------------------------------------------------
// Merging and failure modes
// ---------------------------------------------------------------------------

/// A later source replaces a same-named module in place and appends new ones.
#[test]
fn later_source_overrides_by_name() {
    let repo = TestRepoBuilder::new()
        .with_manifest(SAMPLE_MANIFEST)
        .with_file(
            "local/shell.yaml",
            "modules:\n  - name: eza\n    prefix: \"40\"\n    description: Local eza\n    aliases:\n      la: eza -a\n  - name: local\n    prefix: \"90\"\n    description: Local tweaks\n    env:\n      PAGER: less\n",
        )
        .build();
    let log = Logger::new();
    let base = repo.root().join(".shellgen").display().to_string();
    let local = repo.root().join("local").display().to_string();
    let setup = repo.setup(&[&base, &local], &log).unwrap();

    let names: Vec<&str> = setup
        .manifest
        .modules
        .iter()
        .filter_map(|m| m.get("name").and_then(|n| n.as_str()))
        .collect();
    assert_eq!(names, vec!["path", "eza", "editor", "local"]);

    let out = repo.root().join("out");
    let opts = GenerateOpts {
        target: Some(out),
        ..GenerateOpts::default()
    };
    generate::execute(&setup, &opts, &log).unwrap();
    let eza = repo.read("out/zsh/.zshrc.d/40-eza.zsh");
    assert!(eza.contains("# Local eza"));
    assert!(eza.contains("alias la=\"eza -a\""));
    assert!(!eza.contains("commands[eza]"));
}

/// Sources that do not resolve are skipped with a warning.
#[test]
fn unresolvable_sources_are_skipped() {
    let repo = TestRepoBuilder::new().with_manifest(SAMPLE_MANIFEST).build();
    let log = Logger::new();
    let base = repo.root().join(".shellgen").display().to_string();
    let missing = repo.root().join("nope.yaml").display().to_string();
    let empty_dir = repo.root().join("empty");
    std::fs::create_dir_all(&empty_dir).unwrap();
    let empty = empty_dir.display().to_string();

    let setup = repo.setup(&[&missing, &base, &empty], &log).unwrap();
    assert_eq!(setup.manifest.functions.len(), 2);
    assert_eq!(log.warning_count(), 2);
}

/// No resolvable source is fatal.
#[test]
fn no_sources_is_an_error() {
    let repo = TestRepo::new();
    let log = Logger::new();
    let err = repo.setup(&[], &log).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ShellgenError>(),
        Some(ShellgenError::NoSources)
    ));
}

/// An invalid manifest reports every error and writes nothing.
#[test]
fn invalid_manifest_writes_nothing() {
    let repo = TestRepoBuilder::new()
        .with_manifest(
            "functions:\n  - name: f\n    description: d\n    predicate: os_is_beos\nmodules:\n  - name: m\n    prefix: \"10\"\n    description: d\n    guard: is_root\n    paths: [x]\n",
        )
        .build();
    let log = Logger::new();
    let err = repo.setup(&[], &log).unwrap_err();
    let count = match err.downcast_ref::<ShellgenError>() {
        Some(ShellgenError::Validation(errors)) => errors.len(),
        _ => 0,
    };
    assert_eq!(count, 2, "{err:#}");
    assert!(!repo.root().join("dot_config").exists());
}
