//! One renderer per body construct, plus the multi-branch conditional block.
use super::guards::translate_guard_condition;
use super::{home_relative, indent, substitute};
use crate::config::model::{BranchTest, Conditional, ShellText, Snippet};
use crate::error::Result;
use crate::shell::{PerShell, Shell};

/// Block keywords for a shell's `if` chain, with a `{cond}` placeholder.
#[derive(Debug, Clone, Copy)]
struct BlockSyntax {
    open_if: &'static str,
    open_elif: &'static str,
    open_else: &'static str,
    close: &'static str,
    /// Placeholder statement for a branch that renders no lines.
    empty: Option<&'static str>,
}

const POSIX_BLOCK: BlockSyntax = BlockSyntax {
    open_if: "if {cond}; then",
    open_elif: "elif {cond}; then",
    open_else: "else",
    close: "fi",
    empty: Some(":"),
};

const BLOCKS: PerShell<BlockSyntax> = PerShell {
    fish: BlockSyntax {
        open_if: "if {cond}",
        open_elif: "else if {cond}",
        open_else: "else",
        close: "end",
        empty: None,
    },
    zsh: POSIX_BLOCK,
    bash: POSIX_BLOCK,
    pwsh: BlockSyntax {
        open_if: "if ({cond}) {",
        open_elif: "} elseif ({cond}) {",
        open_else: "} else {",
        close: "}",
        empty: None,
    },
};

/// Prepend a directory to the command search path.
#[must_use]
pub fn path_prepend(path: &str, shell: Shell) -> String {
    match shell {
        Shell::Fish => format!("fish_add_path {path}"),
        Shell::Zsh | Shell::Bash => format!(r#"export PATH="{path}:$PATH""#),
        Shell::PowerShell => {
            format!(r#"$env:PATH = "{path}" + [IO.Path]::PathSeparator + $env:PATH"#)
        }
    }
}

/// Define an alias. PowerShell aliases cannot take arguments, so they become
/// forwarding functions after any built-in alias of the same name is removed.
#[must_use]
pub fn alias(name: &str, command: &str, shell: Shell) -> Vec<String> {
    match shell {
        Shell::Fish => vec![format!("alias {name}='{}'", command.replace('\'', r"\'"))],
        Shell::Zsh | Shell::Bash => {
            vec![format!(r#"alias {name}="{}""#, command.replace('"', r#"\""#))]
        }
        Shell::PowerShell => vec![
            format!("Remove-Item -Path Alias:{name} -Force -ErrorAction SilentlyContinue"),
            format!("function {name} {{ {command} @args }}"),
        ],
    }
}

/// Load a tool's shell integration via its `init` subcommand.
#[must_use]
pub fn tool_init(tool: &str, shell: Shell) -> String {
    let target = shell.tool_init_name();
    match shell {
        Shell::Fish => format!("{tool} init {target} | source"),
        Shell::Zsh | Shell::Bash => format!(r#"eval "$({tool} init {target})""#),
        Shell::PowerShell => format!("{tool} init {target} | Out-String | Invoke-Expression"),
    }
}

/// Export an environment variable.
#[must_use]
pub fn env_export(key: &str, value: &str, shell: Shell) -> String {
    match shell {
        Shell::Fish => format!(r#"set -gx {key} "{}""#, escape_double(value)),
        Shell::Zsh | Shell::Bash => format!(r#"export {key}="{}""#, escape_double(value)),
        Shell::PowerShell => format!(r#"$env:{key} = "{}""#, value.replace('"', "`\"")),
    }
}

/// Source a file only if it exists.
#[must_use]
pub fn source_file(path: &str, shell: Shell) -> String {
    let path = home_relative(path);
    match shell {
        Shell::Fish => format!(r#"if test -f "{path}"; source "{path}"; end"#),
        Shell::Zsh | Shell::Bash => format!(r#"if [[ -f "{path}" ]]; then source "{path}"; fi"#),
        Shell::PowerShell => format!(r#"if (Test-Path "{path}") {{ . "{path}" }}"#),
    }
}

/// Evaluate a command's output in the current shell. `{shell}` in the
/// command is replaced with the shell's identifier.
#[must_use]
pub fn eval_command(command: &str, shell: Shell) -> String {
    let command = substitute(command, &[("{shell}", shell.name())]);
    match shell {
        Shell::Fish => format!("{command} | source"),
        Shell::Zsh | Shell::Bash => format!(r#"eval "$({command})""#),
        Shell::PowerShell => format!("{command} | Out-String | Invoke-Expression"),
    }
}

/// Literal body text for `shell`, split into lines, trailing newlines dropped.
#[must_use]
pub fn body_lines(text: &ShellText, shell: Shell) -> Vec<String> {
    let body = text.resolve(shell).trim_end_matches('\n');
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n').map(str::to_string).collect()
}

/// Render every construct present in a snippet, one group per construct,
/// in fixed order: env, paths, aliases, tool, source files, eval, body.
#[must_use]
pub fn snippet_groups(snippet: &Snippet, shell: Shell) -> Vec<Vec<String>> {
    let groups: [Vec<String>; 7] = [
        snippet
            .env
            .iter()
            .map(|(k, v)| env_export(k, v, shell))
            .collect(),
        snippet
            .paths
            .iter()
            .map(|p| path_prepend(p, shell))
            .collect(),
        snippet
            .aliases
            .iter()
            .flat_map(|(name, cmd)| alias(name, cmd, shell))
            .collect(),
        snippet
            .tool
            .iter()
            .map(|t| tool_init(t, shell))
            .collect(),
        snippet
            .source_files
            .iter()
            .map(|p| source_file(p, shell))
            .collect(),
        snippet
            .eval_command
            .iter()
            .map(|c| eval_command(c, shell))
            .collect(),
        snippet
            .body
            .as_ref()
            .map(|b| body_lines(b, shell))
            .unwrap_or_default(),
    ];
    groups.into_iter().filter(|g| !g.is_empty()).collect()
}

/// Render a conditional as a native `if` chain with nested lines indented.
///
/// # Errors
///
/// Returns an error if a branch guard is not in the registry.
pub fn conditional_block(conditional: &Conditional, shell: Shell) -> Result<Vec<String>> {
    let syntax = *BLOCKS.get(shell);
    let mut lines = Vec::new();

    for branch in &conditional.branches {
        let opener = match &branch.test {
            BranchTest::If(guard) => {
                let cond = translate_guard_condition(guard, shell)?;
                substitute(syntax.open_if, &[("{cond}", cond.as_str())])
            }
            BranchTest::Elif(guard) => {
                let cond = translate_guard_condition(guard, shell)?;
                substitute(syntax.open_elif, &[("{cond}", cond.as_str())])
            }
            BranchTest::Else => syntax.open_else.to_string(),
        };
        lines.push(opener);

        let body: Vec<String> = snippet_groups(&branch.snippet, shell)
            .into_iter()
            .flatten()
            .collect();
        if body.is_empty() {
            lines.extend(syntax.empty.map(indent));
        }
        lines.extend(body.iter().map(|l| indent(l)));
    }

    lines.push(syntax.close.to_string());
    Ok(lines)
}

fn escape_double(value: &str) -> String {
    value.replace('"', r#"\""#)
}
