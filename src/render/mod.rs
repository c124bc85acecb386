//! Render engine: turns typed functions and modules into complete shell files.
//!
//! - [`guards`] — guard and predicate registries, bail and condition forms
//! - [`constructs`] — one renderer per body construct, plus conditional blocks
//!
//! [`generate_function`] and [`generate_module`] assemble those pieces into
//! file text that always starts with [`HEADER`] and ends with exactly one
//! newline.
pub mod constructs;
pub mod guards;

use crate::config::model::{Function, FunctionKind, Module};
use crate::error::Result;
use crate::shell::{PerShell, Shell};

/// First line of every generated file.
pub const HEADER: &str = "# Generated from .shellgen/shell.yaml -- DO NOT EDIT";

/// Indentation for lines nested in a function or `if` block.
const INDENT: &str = "    ";

/// Function wrapper per shell: opening line (with `{name}` and
/// `{description}` placeholders) and closing line. `None` emits the body bare.
const FUNCTION_WRAPPERS: PerShell<Option<(&str, &str)>> = PerShell {
    fish: Some(("function {name} --description '{description}'", "end")),
    zsh: None,
    bash: Some(("{name}() {", "}")),
    pwsh: Some(("function {name} {", "}")),
};

/// Replace each `(key, value)` token in `template` in a single pass, so
/// substituted text is never re-scanned.
pub(crate) fn substitute(template: &str, subs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let (head, tail) = rest.split_at(start);
        out.push_str(head);
        if let Some((key, value)) = subs.iter().find(|(key, _)| tail.starts_with(key)) {
            out.push_str(value);
            rest = tail.strip_prefix(key).unwrap_or_default();
        } else {
            out.push('{');
            rest = tail.strip_prefix('{').unwrap_or_default();
        }
    }
    out.push_str(rest);
    out
}

/// Indent a nested line; blank lines stay empty.
pub(crate) fn indent(line: &str) -> String {
    if line.trim().is_empty() {
        String::new()
    } else {
        format!("{INDENT}{line}")
    }
}

/// Rewrite a leading `~` to `$HOME`, which every supported shell expands
/// inside double quotes.
pub(crate) fn home_relative(path: &str) -> String {
    if path == "~" {
        "$HOME".to_string()
    } else if let Some(rest) = path.strip_prefix("~/") {
        format!("$HOME/{rest}")
    } else {
        path.to_string()
    }
}

/// Escape text for a fish single-quoted string.
fn fish_single_quoted(text: &str) -> String {
    text.replace('\\', r"\\").replace('\'', r"\'")
}

/// Generate the complete file for one function and shell.
///
/// Predicate functions wrap the predicate's condition; body functions wrap
/// the resolved text. zsh function files are autoloaded, so their body is
/// emitted bare.
///
/// # Errors
///
/// Returns an error if the predicate is not in the registry.
pub fn generate_function(func: &Function, shell: Shell) -> Result<String> {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(comment_lines(&func.description));
    if let Some(usage) = &func.usage {
        lines.push(format!("# Usage: {usage}"));
    }
    lines.push(String::new());

    let body = match &func.kind {
        FunctionKind::Predicate(name) => {
            let cond = guards::translate_predicate(name, shell)?;
            if shell == Shell::PowerShell {
                vec![format!("[bool]({cond})")]
            } else {
                vec![cond.to_string()]
            }
        }
        FunctionKind::Body(text) => constructs::body_lines(text, shell),
    };

    match FUNCTION_WRAPPERS.get(shell) {
        None => lines.extend(body),
        Some((open, close)) => {
            let description = fish_single_quoted(&func.description);
            lines.push(substitute(
                open,
                &[
                    ("{name}", func.name.as_str()),
                    ("{description}", description.as_str()),
                ],
            ));
            if body.is_empty() && shell == Shell::Bash {
                lines.push(indent(":"));
            }
            lines.extend(body.iter().map(|l| indent(l)));
            lines.push((*close).to_string());
        }
    }

    Ok(finish(lines))
}

/// Generate the complete file for one module and shell.
///
/// Guards come first in bail form, then every body construct present, then
/// the conditional block.
///
/// # Errors
///
/// Returns an error if a guard is not in the registry.
pub fn generate_module(module: &Module, shell: Shell) -> Result<String> {
    let mut lines = vec![HEADER.to_string()];
    lines.extend(comment_lines(&module.description));
    if let Some(url) = &module.url {
        lines.push(format!("# {url}"));
    }
    if let Some(comment) = &module.comment {
        lines.extend(comment_lines(comment));
    }
    lines.push(String::new());

    if !module.guards.is_empty() {
        for guard in &module.guards {
            lines.push(guards::translate_guard(guard, shell)?);
        }
        lines.push(String::new());
    }

    for group in constructs::snippet_groups(&module.snippet, shell) {
        lines.extend(group);
        lines.push(String::new());
    }

    if let Some(conditional) = &module.conditional {
        lines.extend(constructs::conditional_block(conditional, shell)?);
    }

    Ok(finish(lines))
}

fn comment_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(|line| {
        if line.is_empty() {
            "#".to_string()
        } else {
            format!("# {line}")
        }
    })
}

/// Drop trailing blank lines and terminate with exactly one newline.
fn finish(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::model::{Guard, ShellText, Snippet};

    fn predicate_fn(name: &str, predicate: &str) -> Function {
        Function {
            name: name.to_string(),
            description: "Check platform".to_string(),
            usage: None,
            kind: FunctionKind::Predicate(predicate.to_string()),
        }
    }

    fn module(name: &str, snippet: Snippet) -> Module {
        Module {
            name: name.to_string(),
            prefix: "10".to_string(),
            description: "Test module".to_string(),
            url: None,
            comment: None,
            guards: Vec::new(),
            snippet,
            conditional: None,
        }
    }

    #[test]
    fn substitute_single_pass() {
        assert_eq!(
            substitute("a {x} b {y}", &[("{x}", "{y}"), ("{y}", "2")]),
            "a {y} b 2"
        );
        assert_eq!(substitute("{ return }", &[("{cond}", "x")]), "{ return }");
        assert_eq!(substitute("trailing {", &[]), "trailing {");
    }

    #[test]
    fn predicate_function_per_shell() {
        let func = predicate_fn("is-darwin", "os_is_darwin");
        let fish = generate_function(&func, Shell::Fish).unwrap();
        assert!(fish.contains(r#"test (uname) = "Darwin""#));
        assert!(fish.contains("function is-darwin --description 'Check platform'"));
        let pwsh = generate_function(&func, Shell::PowerShell).unwrap();
        assert!(pwsh.contains("$IsMacOS"));
        let zsh = generate_function(&func, Shell::Zsh).unwrap();
        assert!(zsh.ends_with("\n[[ $OSTYPE == *darwin* ]]\n"));
    }

    #[test]
    fn body_function_uses_shared_fallback() {
        let func = Function {
            name: "mkcd".to_string(),
            description: "Make and enter a directory".to_string(),
            usage: Some("mkcd <dir>".to_string()),
            kind: FunctionKind::Body(
                ShellText::shared("mkdir -p \"$1\" && cd \"$1\"")
                    .with(Shell::Fish, "mkdir -p $argv[1]; and cd $argv[1]"),
            ),
        };
        let bash = generate_function(&func, Shell::Bash).unwrap();
        assert!(bash.contains("# Usage: mkcd <dir>"));
        assert!(bash.contains("mkcd() {\n    mkdir -p \"$1\" && cd \"$1\"\n}\n"));
        let fish = generate_function(&func, Shell::Fish).unwrap();
        assert!(fish.contains("    mkdir -p $argv[1]; and cd $argv[1]\nend\n"));
    }

    #[test]
    fn empty_bash_function_gets_placeholder() {
        let func = Function {
            name: "noop".to_string(),
            description: "Nothing".to_string(),
            usage: None,
            kind: FunctionKind::Body(ShellText::default().with(Shell::Fish, "true")),
        };
        let bash = generate_function(&func, Shell::Bash).unwrap();
        assert!(bash.ends_with("noop() {\n    :\n}\n"));
    }

    #[test]
    fn fish_description_quotes_are_escaped() {
        let mut func = predicate_fn("is-wsl", "os_is_wsl");
        func.description = "Running in Windows' subsystem".to_string();
        let fish = generate_function(&func, Shell::Fish).unwrap();
        assert!(fish.contains(r"--description 'Running in Windows\' subsystem'"));
    }

    #[test]
    fn fish_description_backslashes_are_escaped() {
        let mut func = predicate_fn("is-wsl", "os_is_wsl");
        func.description = r"C:\ drive\".to_string();
        let fish = generate_function(&func, Shell::Fish).unwrap();
        assert!(fish.contains(r"--description 'C:\\ drive\\'"), "{fish}");
    }

    #[test]
    fn home_relative_expands_leading_tilde_only() {
        assert_eq!(home_relative("~"), "$HOME");
        assert_eq!(home_relative("~/.work.sh"), "$HOME/.work.sh");
        assert_eq!(home_relative("~other/x"), "~other/x");
        assert_eq!(home_relative("/etc/~x"), "/etc/~x");
    }

    #[test]
    fn module_renders_guards_then_constructs() {
        let mut m = module(
            "eza",
            Snippet {
                aliases: vec![("ls".to_string(), "eza".to_string())],
                ..Snippet::default()
            },
        );
        m.url = Some("https://eza.rocks".to_string());
        m.guards = vec![Guard::value("command_exists", "eza")];
        let zsh = generate_module(&m, Shell::Zsh).unwrap();
        assert_eq!(
            zsh,
            format!(
                "{HEADER}\n# Test module\n# https://eza.rocks\n\n\
                 (( $+commands[eza] )) || return 0\n\nalias ls=\"eza\"\n"
            )
        );
    }

    #[test]
    fn module_paths_posix() {
        let m = module(
            "local-bin",
            Snippet {
                paths: vec!["$HOME/.local/bin".to_string()],
                ..Snippet::default()
            },
        );
        let bash = generate_module(&m, Shell::Bash).unwrap();
        assert!(bash.contains(r#"export PATH="$HOME/.local/bin:$PATH""#));
    }

    #[test]
    fn every_file_starts_with_header_and_ends_with_one_newline() {
        let m = module("empty", Snippet::default());
        for shell in Shell::ALL {
            let text = generate_module(&m, shell).unwrap();
            assert!(text.starts_with(HEADER));
            assert!(text.ends_with('\n'));
            assert!(!text.ends_with("\n\n"));
        }
    }

    #[test]
    fn unknown_predicate_fails_generation() {
        let func = predicate_fn("is-beos", "os_is_beos");
        assert!(generate_function(&func, Shell::Fish).is_err());
    }
}
