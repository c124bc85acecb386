//! The closed set of target shells and per-shell lookup tables.
use std::fmt;

/// A target shell the transpiler renders for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shell {
    Fish,
    Zsh,
    Bash,
    PowerShell,
}

impl Shell {
    /// Every supported shell, in generation order.
    pub const ALL: [Self; 4] = [Self::Fish, Self::Zsh, Self::Bash, Self::PowerShell];

    /// Identifier used in manifests (`body` keys) and substituted for `{shell}`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fish => "fish",
            Self::Zsh => "zsh",
            Self::Bash => "bash",
            Self::PowerShell => "pwsh",
        }
    }

    /// Name a tool's `init` subcommand expects for this shell.
    #[must_use]
    pub const fn tool_init_name(self) -> &'static str {
        match self {
            Self::PowerShell => "powershell",
            other => other.name(),
        }
    }

    /// Extension of a generated function file (zsh autoloads bare names).
    #[must_use]
    pub const fn function_ext(self) -> &'static str {
        match self {
            Self::Fish => ".fish",
            Self::Zsh => "",
            Self::Bash => ".bash",
            Self::PowerShell => ".ps1",
        }
    }

    /// Extension of a generated module file.
    #[must_use]
    pub const fn module_ext(self) -> &'static str {
        match self {
            Self::Fish => ".fish",
            Self::Zsh => ".zsh",
            Self::Bash => ".bash",
            Self::PowerShell => ".ps1",
        }
    }

    /// Whether function files are loaded by autoload from their bare body
    /// rather than by sourcing a function definition.
    #[must_use]
    pub const fn autoloads_functions(self) -> bool {
        matches!(self, Self::Zsh)
    }

    /// Resolve a manifest body key to a shell. `shared` is not a shell.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "fish" => Some(Self::Fish),
            "zsh" => Some(Self::Zsh),
            "bash" => Some(Self::Bash),
            "pwsh" | "powershell" => Some(Self::PowerShell),
            _ => None,
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per supported shell.
///
/// Adding a shell adds a field here, so every table built from `PerShell`
/// fails to compile until it grows a slot for the new shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerShell<T> {
    pub fish: T,
    pub zsh: T,
    pub bash: T,
    pub pwsh: T,
}

impl<T> PerShell<T> {
    /// Borrow the slot for `shell`.
    pub const fn get(&self, shell: Shell) -> &T {
        match shell {
            Shell::Fish => &self.fish,
            Shell::Zsh => &self.zsh,
            Shell::Bash => &self.bash,
            Shell::PowerShell => &self.pwsh,
        }
    }

    /// Mutably borrow the slot for `shell`.
    pub const fn get_mut(&mut self, shell: Shell) -> &mut T {
        match shell {
            Shell::Fish => &mut self.fish,
            Shell::Zsh => &mut self.zsh,
            Shell::Bash => &mut self.bash,
            Shell::PowerShell => &mut self.pwsh,
        }
    }

    /// Build a table by evaluating `f` for every shell.
    pub fn from_fn(mut f: impl FnMut(Shell) -> T) -> Self {
        Self {
            fish: f(Shell::Fish),
            zsh: f(Shell::Zsh),
            bash: f(Shell::Bash),
            pwsh: f(Shell::PowerShell),
        }
    }
}
