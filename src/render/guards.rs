//! Guard and predicate registries, and their translation into shell text.
//!
//! Each registry entry carries one template per shell in two forms:
//!
//! - **bail**: a guard clause that ends the sourced file early when the
//!   check fails
//! - **condition**: a bare boolean expression for `if` / `elif` branches
//!
//! Adding a check means adding one entry; the translators never look at a
//! guard's name beyond the registry lookup.
use super::{home_relative, substitute};
use crate::config::model::{Guard, GuardParam};
use crate::error::{Result, ShellgenError};
use crate::shell::{PerShell, Shell};

/// The parameter shape a guard template expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Bare name, e.g. `is_tty`.
    None,
    /// One positional value substituted for `{0}`.
    Value,
    /// A filesystem path substituted for `{0}`, with a leading `~` expanded.
    Path,
    /// A `var`/`value` record substituted for `{var}` and `{value}`.
    Named,
}

impl Arity {
    const fn expectation(self) -> &'static str {
        match self {
            Self::None => "takes no parameter",
            Self::Value | Self::Path => "expects a value",
            Self::Named => "expects var and value",
        }
    }
}

/// A registry entry for a module guard.
#[derive(Debug)]
pub struct GuardTemplate {
    pub name: &'static str,
    pub arity: Arity,
    pub bail: PerShell<&'static str>,
    pub condition: PerShell<&'static str>,
}

impl GuardTemplate {
    /// Check that `param` has the shape this template expects.
    ///
    /// # Errors
    ///
    /// Returns a message naming the expected shape.
    pub fn accepts(&self, param: &GuardParam) -> Result<(), String> {
        let ok = matches!(
            (self.arity, param),
            (Arity::None, GuardParam::None)
                | (Arity::Value | Arity::Path, GuardParam::Value(_))
                | (Arity::Named, GuardParam::Named { .. })
        );
        if ok {
            Ok(())
        } else {
            Err(format!(
                "guard '{}' {}",
                self.name,
                self.arity.expectation()
            ))
        }
    }

    fn fill(&self, template: &str, param: &GuardParam) -> Result<String> {
        self.accepts(param)
            .map_err(|message| ShellgenError::InvalidItem {
                item: format!("guard '{}'", self.name),
                message,
            })?;
        Ok(match param {
            GuardParam::None => template.to_string(),
            GuardParam::Value(value) if self.arity == Arity::Path => {
                substitute(template, &[("{0}", home_relative(value).as_str())])
            }
            GuardParam::Value(value) => substitute(template, &[("{0}", value.as_str())]),
            GuardParam::Named { var, value } => {
                substitute(
                    template,
                    &[("{var}", var.as_str()), ("{value}", value.as_str())],
                )
            }
        })
    }
}

/// A registry entry for a function predicate.
#[derive(Debug)]
pub struct PredicateTemplate {
    pub name: &'static str,
    pub condition: PerShell<&'static str>,
}

/// Guard clause that bails unless `{cond}` holds.
pub const BAIL_UNLESS: PerShell<&str> = PerShell {
    fish: "{cond}; or return 0",
    zsh: "{cond} || return 0",
    bash: "{cond} || return 0",
    pwsh: "if (-not ({cond})) { return }",
};

/// Guard clause that bails when `{cond}` holds.
pub const BAIL_IF: PerShell<&str> = PerShell {
    fish: "{cond}; and return 0",
    zsh: "{cond} && return 0",
    bash: "{cond} && return 0",
    pwsh: "if ({cond}) { return }",
};

/// Boolean negation of `{cond}`.
pub const NEGATE: PerShell<&str> = PerShell {
    fish: "not {cond}",
    zsh: "! {cond}",
    bash: "! {cond}",
    pwsh: "-not ({cond})",
};

/// Guard registry, sorted by name.
pub static GUARDS: &[GuardTemplate] = &[
    GuardTemplate {
        name: "command_exists",
        arity: Arity::Value,
        bail: PerShell {
            fish: "command -q {0}; or return 0",
            zsh: "(( $+commands[{0}] )) || return 0",
            bash: "command -v {0} >/dev/null 2>&1 || return 0",
            pwsh: "if (-not (Get-Command {0} -ErrorAction SilentlyContinue)) { return }",
        },
        condition: PerShell {
            fish: "command -q {0}",
            zsh: "(( $+commands[{0}] ))",
            bash: "command -v {0} >/dev/null 2>&1",
            pwsh: "Get-Command {0} -ErrorAction SilentlyContinue",
        },
    },
    GuardTemplate {
        name: "dir_exists",
        arity: Arity::Path,
        bail: PerShell {
            fish: r#"test -d "{0}"; or return 0"#,
            zsh: r#"[[ -d "{0}" ]] || return 0"#,
            bash: r#"[[ -d "{0}" ]] || return 0"#,
            pwsh: r#"if (-not (Test-Path -PathType Container "{0}")) { return }"#,
        },
        condition: PerShell {
            fish: r#"test -d "{0}""#,
            zsh: r#"[[ -d "{0}" ]]"#,
            bash: r#"[[ -d "{0}" ]]"#,
            pwsh: r#"Test-Path -PathType Container "{0}""#,
        },
    },
    GuardTemplate {
        name: "env_equals",
        arity: Arity::Named,
        bail: PerShell {
            fish: r#"test "${var}" = "{value}"; or return 0"#,
            zsh: r#"[[ "${var}" == "{value}" ]] || return 0"#,
            bash: r#"[[ "${var}" == "{value}" ]] || return 0"#,
            pwsh: r#"if ($env:{var} -ne "{value}") { return }"#,
        },
        condition: PerShell {
            fish: r#"test "${var}" = "{value}""#,
            zsh: r#"[[ "${var}" == "{value}" ]]"#,
            bash: r#"[[ "${var}" == "{value}" ]]"#,
            pwsh: r#"$env:{var} -eq "{value}""#,
        },
    },
    GuardTemplate {
        name: "env_not_set",
        arity: Arity::Value,
        bail: PerShell {
            fish: "not set -q {0}; or return 0",
            zsh: "[[ -z ${0} ]] || return 0",
            bash: "[[ -z ${0} ]] || return 0",
            pwsh: "if (Test-Path Env:{0}) { return }",
        },
        condition: PerShell {
            fish: "not set -q {0}",
            zsh: "[[ -z ${0} ]]",
            bash: "[[ -z ${0} ]]",
            pwsh: "-not (Test-Path Env:{0})",
        },
    },
    GuardTemplate {
        name: "env_set",
        arity: Arity::Value,
        bail: PerShell {
            fish: "set -q {0}; or return 0",
            zsh: "[[ -n ${0} ]] || return 0",
            bash: "[[ -n ${0} ]] || return 0",
            pwsh: "if (-not (Test-Path Env:{0})) { return }",
        },
        condition: PerShell {
            fish: "set -q {0}",
            zsh: "[[ -n ${0} ]]",
            bash: "[[ -n ${0} ]]",
            pwsh: "Test-Path Env:{0}",
        },
    },
    GuardTemplate {
        name: "file_exists",
        arity: Arity::Path,
        bail: PerShell {
            fish: r#"test -f "{0}"; or return 0"#,
            zsh: r#"[[ -f "{0}" ]] || return 0"#,
            bash: r#"[[ -f "{0}" ]] || return 0"#,
            pwsh: r#"if (-not (Test-Path -PathType Leaf "{0}")) { return }"#,
        },
        condition: PerShell {
            fish: r#"test -f "{0}""#,
            zsh: r#"[[ -f "{0}" ]]"#,
            bash: r#"[[ -f "{0}" ]]"#,
            pwsh: r#"Test-Path -PathType Leaf "{0}""#,
        },
    },
    GuardTemplate {
        name: "is_interactive",
        arity: Arity::None,
        bail: PerShell {
            fish: "status is-interactive; or return 0",
            zsh: "[[ -o interactive ]] || return 0",
            bash: "[[ $- == *i* ]] || return 0",
            pwsh: "if (-not ([Environment]::UserInteractive)) { return }",
        },
        condition: PerShell {
            fish: "status is-interactive",
            zsh: "[[ -o interactive ]]",
            bash: "[[ $- == *i* ]]",
            pwsh: "[Environment]::UserInteractive",
        },
    },
    GuardTemplate {
        name: "is_tty",
        arity: Arity::None,
        bail: PerShell {
            fish: "isatty stdin; or return 0",
            zsh: "[[ -t 0 ]] || return 0",
            bash: "[[ -t 0 ]] || return 0",
            pwsh: "if ([Console]::IsInputRedirected) { return }",
        },
        condition: PerShell {
            fish: "isatty stdin",
            zsh: "[[ -t 0 ]]",
            bash: "[[ -t 0 ]]",
            pwsh: "-not [Console]::IsInputRedirected",
        },
    },
    GuardTemplate {
        name: "not_env_equals",
        arity: Arity::Named,
        bail: PerShell {
            fish: r#"test "${var}" != "{value}"; or return 0"#,
            zsh: r#"[[ "${var}" != "{value}" ]] || return 0"#,
            bash: r#"[[ "${var}" != "{value}" ]] || return 0"#,
            pwsh: r#"if ($env:{var} -eq "{value}") { return }"#,
        },
        condition: PerShell {
            fish: r#"test "${var}" != "{value}""#,
            zsh: r#"[[ "${var}" != "{value}" ]]"#,
            bash: r#"[[ "${var}" != "{value}" ]]"#,
            pwsh: r#"$env:{var} -ne "{value}""#,
        },
    },
];

/// Predicate registry, sorted by name.
pub static PREDICATES: &[PredicateTemplate] = &[
    PredicateTemplate {
        name: "os_is_darwin",
        condition: PerShell {
            fish: r#"test (uname) = "Darwin""#,
            zsh: "[[ $OSTYPE == *darwin* ]]",
            bash: "[[ $OSTYPE == darwin* ]]",
            pwsh: "$IsMacOS",
        },
    },
    PredicateTemplate {
        name: "os_is_linux",
        condition: PerShell {
            fish: r#"test (uname) = "Linux""#,
            zsh: "[[ $OSTYPE == *linux* ]]",
            bash: "[[ $OSTYPE == linux* ]]",
            pwsh: "$IsLinux",
        },
    },
    PredicateTemplate {
        name: "os_is_windows",
        condition: PerShell {
            fish: "string match -qr 'MINGW|MSYS|CYGWIN' (uname)",
            zsh: "[[ $OSTYPE == msys* || $OSTYPE == cygwin* ]]",
            bash: "[[ $OSTYPE == msys* || $OSTYPE == cygwin* ]]",
            pwsh: "$IsWindows",
        },
    },
    PredicateTemplate {
        name: "os_is_wsl",
        condition: PerShell {
            fish: "set -q WSL_DISTRO_NAME",
            zsh: "[[ -n $WSL_DISTRO_NAME ]]",
            bash: "[[ -n $WSL_DISTRO_NAME ]]",
            pwsh: "[bool]$env:WSL_DISTRO_NAME",
        },
    },
];

/// Look up a guard by name.
#[must_use]
pub fn guard_template(name: &str) -> Option<&'static GuardTemplate> {
    GUARDS.iter().find(|g| g.name == name)
}

/// Look up a predicate by name.
#[must_use]
pub fn predicate_template(name: &str) -> Option<&'static PredicateTemplate> {
    PREDICATES.iter().find(|p| p.name == name)
}

/// Comma-separated guard names for error messages.
#[must_use]
pub fn known_guards() -> String {
    GUARDS.iter().map(|g| g.name).collect::<Vec<_>>().join(", ")
}

/// Comma-separated predicate names for error messages.
#[must_use]
pub fn known_predicates() -> String {
    PREDICATES
        .iter()
        .map(|p| p.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that a guard (and any negated inner guard) resolves in the registry
/// with the right parameter shape.
///
/// # Errors
///
/// Returns a human-readable message for the first problem found.
pub fn check_guard(guard: &Guard) -> Result<(), String> {
    match guard {
        Guard::Not(inner) => check_guard(inner),
        Guard::Check { name, param } => {
            let template = guard_template(name).ok_or_else(|| {
                let kind = if matches!(param, GuardParam::None) {
                    "string guard"
                } else {
                    "guard type"
                };
                format!("unknown {kind} '{name}' (known: {})", known_guards())
            })?;
            template.accepts(param)
        }
    }
}

/// Render a guard in bail form for `shell`.
///
/// A negated guard bails when its inner condition holds.
///
/// # Errors
///
/// Returns [`ShellgenError::UnknownGuard`] for a name missing from the
/// registry, or [`ShellgenError::InvalidItem`] for a parameter-shape mismatch.
pub fn translate_guard(guard: &Guard, shell: Shell) -> Result<String> {
    match guard {
        Guard::Check { name, param } => {
            let template = lookup(name)?;
            template.fill(template.bail.get(shell), param)
        }
        Guard::Not(inner) => {
            let cond = translate_guard_condition(inner, shell)?;
            Ok(substitute(BAIL_IF.get(shell), &[("{cond}", cond.as_str())]))
        }
    }
}

/// Render a guard as a bare boolean expression for `shell`.
///
/// # Errors
///
/// Same as [`translate_guard`].
pub fn translate_guard_condition(guard: &Guard, shell: Shell) -> Result<String> {
    match guard {
        Guard::Check { name, param } => {
            let template = lookup(name)?;
            template.fill(template.condition.get(shell), param)
        }
        Guard::Not(inner) => {
            let cond = translate_guard_condition(inner, shell)?;
            Ok(substitute(NEGATE.get(shell), &[("{cond}", cond.as_str())]))
        }
    }
}

/// Render a predicate's condition expression for `shell`.
///
/// # Errors
///
/// Returns [`ShellgenError::UnknownPredicate`] for a name missing from the registry.
pub fn translate_predicate(name: &str, shell: Shell) -> Result<&'static str> {
    predicate_template(name)
        .map(|p| *p.condition.get(shell))
        .ok_or_else(|| ShellgenError::UnknownPredicate(name.to_string()))
}

fn lookup(name: &str) -> Result<&'static GuardTemplate> {
    guard_template(name).ok_or_else(|| ShellgenError::UnknownGuard(name.to_string()))
}
