//! Command: print version information.

/// Print the shellgen version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("SHELLGEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("shellgen {version}");
}
