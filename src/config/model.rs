//! Typed manifest items.
//!
//! The YAML document is kept as raw [`Value`]s through loading and merging so
//! that validation can report every shape problem at once. The parsers here
//! are shared by [`validation`](super::validation) (which collects their
//! messages) and by the `from_value` conversions (which turn them into a
//! [`ShellgenError`]).
use serde_yaml::{Mapping, Value};

use crate::error::{Result, ShellgenError};
use crate::shell::{PerShell, Shell};

/// Every key that contributes rendered output to a module, sorted.
pub const MODULE_BODY_KEYS: &[&str] = &[
    "aliases",
    "body",
    "conditional",
    "env",
    "eval_command",
    "paths",
    "source_file",
    "tool",
];

/// Keys allowed in the body of a conditional branch, sorted.
pub const BRANCH_BODY_KEYS: &[&str] = &[
    "aliases",
    "body",
    "env",
    "eval_command",
    "paths",
    "source_file",
    "tool",
];

/// Keys accepted in a `body` mapping besides shell identifiers.
const SHARED_KEY: &str = "shared";

/// Parameter supplied to a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardParam {
    /// Bare guard name, no parameter.
    None,
    /// One positional value (`{command_exists: eza}`).
    Value(String),
    /// Named record (`{env_equals: {var: TERM, value: xterm}}`).
    Named { var: String, value: String },
}

impl GuardParam {
    fn parse(name: &str, value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(Self::None),
            Value::Mapping(map) => {
                let var = map.get("var").and_then(scalar_string);
                let val = map.get("value").and_then(scalar_string);
                match (var, val) {
                    (Some(var), Some(value)) => Ok(Self::Named { var, value }),
                    _ => Err(format!(
                        "guard '{name}' parameter mapping requires scalar 'var' and 'value'"
                    )),
                }
            }
            other => scalar_string(other).map(Self::Value).ok_or_else(|| {
                format!(
                    "guard '{name}' parameter must be a scalar or a var/value mapping, found {}",
                    kind(other)
                )
            }),
        }
    }
}

/// A declarative precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// A registry check with its parameter.
    Check { name: String, param: GuardParam },
    /// Logical negation of the inner guard.
    Not(Box<Guard>),
}

impl Guard {
    /// Shorthand for a [`Guard::Check`].
    pub fn check(name: impl Into<String>, param: GuardParam) -> Self {
        Self::Check {
            name: name.into(),
            param,
        }
    }

    /// Shorthand for a single-value check such as `command_exists: eza`.
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::check(name, GuardParam::Value(value.into()))
    }

    /// Wrap a guard in `not`.
    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Parse a guard from a bare string or a single-key mapping.
    ///
    /// # Errors
    ///
    /// Returns a message when the value has the wrong shape or nests `not`.
    pub fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(name) => Ok(Self::check(name.clone(), GuardParam::None)),
            Value::Mapping(map) => {
                let mut entries = map.iter();
                let (Some((key, inner)), None) = (entries.next(), entries.next()) else {
                    return Err(format!(
                        "guard mapping must have exactly one key, found {}",
                        map.len()
                    ));
                };
                let Some(key) = key.as_str() else {
                    return Err("guard key must be a string".to_string());
                };
                if key == "not" {
                    let inner = Self::parse(inner)?;
                    if matches!(inner, Self::Not(_)) {
                        return Err("nested 'not' guards are not supported".to_string());
                    }
                    return Ok(Self::negate(inner));
                }
                Ok(Self::check(key, GuardParam::parse(key, inner)?))
            }
            other => Err(format!("invalid guard type: {}", kind(other))),
        }
    }
}

/// Literal shell source keyed by shell, with an optional `shared` fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellText {
    pub per_shell: PerShell<Option<String>>,
    pub shared: Option<String>,
}

impl ShellText {
    /// Text used verbatim for every shell.
    pub fn shared(text: impl Into<String>) -> Self {
        Self {
            per_shell: PerShell::default(),
            shared: Some(text.into()),
        }
    }

    /// Set the text for one shell.
    #[must_use]
    pub fn with(mut self, shell: Shell, text: impl Into<String>) -> Self {
        *self.per_shell.get_mut(shell) = Some(text.into());
        self
    }

    /// Text for `shell`: exact match, else `shared`, else empty.
    #[must_use]
    pub fn resolve(&self, shell: Shell) -> &str {
        self.per_shell
            .get(shell)
            .as_deref()
            .or(self.shared.as_deref())
            .unwrap_or("")
    }

    /// Parse a `body` mapping.
    ///
    /// # Errors
    ///
    /// Returns a message for a non-mapping value, an unknown key or a non-string text.
    pub fn parse(value: &Value) -> Result<Self, String> {
        let Value::Mapping(map) = value else {
            return Err(format!(
                "'body' must be a mapping of shell to text, found {}",
                kind(value)
            ));
        };
        let mut text = Self::default();
        for (key, body) in map {
            let Some(key) = key.as_str() else {
                return Err("'body' keys must be strings".to_string());
            };
            let Some(body) = body.as_str() else {
                return Err(format!("'body.{key}' must be a string"));
            };
            if key == SHARED_KEY {
                text.shared = Some(body.to_string());
            } else if let Some(shell) = Shell::from_key(key) {
                *text.per_shell.get_mut(shell) = Some(body.to_string());
            } else {
                return Err(format!(
                    "unknown 'body' key '{key}' (known: bash, fish, powershell, pwsh, shared, zsh)"
                ));
            }
        }
        Ok(text)
    }
}

/// The renderable body constructs of a module or conditional branch.
///
/// Constructs compose: every one present is rendered, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snippet {
    pub env: Vec<(String, String)>,
    pub paths: Vec<String>,
    pub aliases: Vec<(String, String)>,
    pub tool: Option<String>,
    pub source_files: Vec<String>,
    pub eval_command: Option<String>,
    pub body: Option<ShellText>,
}

impl Snippet {
    /// Parse every body construct present in `map`, collecting all errors.
    ///
    /// # Errors
    ///
    /// Returns one message per malformed construct.
    pub fn parse(map: &Mapping) -> Result<Self, Vec<String>> {
        let mut snippet = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = map.get("env") {
            collect(parse_env(value), &mut errors, |v| snippet.env = v);
        }
        if let Some(value) = map.get("paths") {
            collect(
                string_list(value, "paths"),
                &mut errors,
                |v| snippet.paths = v,
            );
        }
        if let Some(value) = map.get("aliases") {
            collect(parse_aliases(value), &mut errors, |v| snippet.aliases = v);
        }
        if let Some(value) = map.get("tool") {
            collect(
                plain_string(value, "tool"),
                &mut errors,
                |v| snippet.tool = Some(v),
            );
        }
        if let Some(value) = map.get("source_file") {
            let parsed = match value {
                Value::String(path) => Ok(vec![path.clone()]),
                Value::Sequence(_) => string_list(value, "source_file"),
                other => Err(format!(
                    "'source_file' must be a string or a list of strings, found {}",
                    kind(other)
                )),
            };
            collect(parsed, &mut errors, |v| snippet.source_files = v);
        }
        if let Some(value) = map.get("eval_command") {
            collect(
                plain_string(value, "eval_command"),
                &mut errors,
                |v| snippet.eval_command = Some(v),
            );
        }
        if let Some(value) = map.get("body") {
            collect(ShellText::parse(value), &mut errors, |v| {
                snippet.body = Some(v);
            });
        }

        if errors.is_empty() {
            Ok(snippet)
        } else {
            Err(errors)
        }
    }
}

/// Which test a conditional branch performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchTest {
    If(Guard),
    Elif(Guard),
    Else,
}

/// One branch of a conditional block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub test: BranchTest,
    pub snippet: Snippet,
}

/// An `if` / `elif` / `else` chain rendered after a module's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub branches: Vec<Branch>,
}

impl Conditional {
    /// Parse a `conditional` list, collecting every error.
    ///
    /// # Errors
    ///
    /// Returns one message per structural problem, prefixed with the branch index.
    pub fn parse(value: &Value) -> Result<Self, Vec<String>> {
        let Value::Sequence(items) = value else {
            return Err(vec![format!(
                "'conditional' must be a non-empty list, found {}",
                kind(value)
            )]);
        };
        if items.is_empty() {
            return Err(vec!["'conditional' must be a non-empty list".to_string()]);
        }

        let mut branches = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        let last = items.len() - 1;

        for (i, item) in items.iter().enumerate() {
            let ctx = format!("conditional[{i}]");
            let Value::Mapping(map) = item else {
                errors.push(format!("{ctx}: expected a mapping, found {}", kind(item)));
                continue;
            };
            match parse_branch(map, i, i == last) {
                Ok(branch) => branches.push(branch),
                Err(messages) => errors.extend(messages.into_iter().map(|m| format!("{ctx}: {m}"))),
            }
        }

        if errors.is_empty() {
            Ok(Self { branches })
        } else {
            Err(errors)
        }
    }

    /// Every branch test that parses as a guard, with its branch index,
    /// regardless of structural errors elsewhere in the chain.
    #[must_use]
    pub fn parsed_guards(value: &Value) -> Vec<(usize, Guard)> {
        let Value::Sequence(items) = value else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let test = item.as_mapping()?.get(branch_test_key(i))?;
                Guard::parse(test).ok().map(|guard| (i, guard))
            })
            .collect()
    }

    /// Every guard referenced by the chain, in branch order.
    pub fn guards(&self) -> impl Iterator<Item = &Guard> {
        self.branches.iter().filter_map(|b| match &b.test {
            BranchTest::If(g) | BranchTest::Elif(g) => Some(g),
            BranchTest::Else => None,
        })
    }
}

/// Key holding the guard of branch `index`.
const fn branch_test_key(index: usize) -> &'static str {
    if index == 0 { "if" } else { "elif" }
}

fn parse_branch(map: &Mapping, index: usize, is_last: bool) -> Result<Branch, Vec<String>> {
    let mut errors = Vec::new();
    let has_if = map.contains_key("if");
    let has_elif = map.contains_key("elif");
    let has_else = map.contains_key("else");

    let test_value = if index == 0 {
        if !has_if {
            errors.push("first branch must have an 'if' key".to_string());
        }
        if has_elif || has_else {
            errors.push("first branch must not have 'elif' or 'else'".to_string());
        }
        map.get(branch_test_key(index))
    } else {
        if has_if {
            errors.push("'if' is only allowed in the first branch".to_string());
        }
        if has_elif == has_else {
            errors.push("must have exactly one of 'elif' or 'else'".to_string());
        }
        if has_else && !is_last {
            errors.push("'else' must be the last branch".to_string());
        }
        map.get(branch_test_key(index))
    };

    if map.contains_key("conditional") {
        errors.push("nested 'conditional' is not supported".to_string());
    }
    if !BRANCH_BODY_KEYS.iter().any(|k| map.contains_key(*k)) {
        errors.push(format!(
            "must have at least one of: {}",
            BRANCH_BODY_KEYS.join(", ")
        ));
    }

    let guard = match test_value.map(Guard::parse) {
        Some(Ok(guard)) => Some(guard),
        Some(Err(message)) => {
            errors.push(message);
            None
        }
        None => None,
    };
    let snippet = Snippet::parse(map).unwrap_or_else(|messages| {
        errors.extend(messages);
        Snippet::default()
    });

    if !errors.is_empty() {
        return Err(errors);
    }
    let test = match (index, guard) {
        (0, Some(g)) => BranchTest::If(g),
        (_, Some(g)) => BranchTest::Elif(g),
        _ => BranchTest::Else,
    };
    Ok(Branch { test, snippet })
}

/// What a function's implementation is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionKind {
    /// Named zero-argument check from the predicate registry.
    Predicate(String),
    /// Literal per-shell source text.
    Body(ShellText),
}

/// A generated named routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub description: String,
    pub usage: Option<String>,
    pub kind: FunctionKind,
}

impl Function {
    /// Convert a raw manifest item into a typed function.
    ///
    /// # Errors
    ///
    /// Returns [`ShellgenError::InvalidItem`] when required fields are missing or malformed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = as_mapping(value, "function")?;
        let name = required_string(map, "name")
            .map_err(|m| ShellgenError::invalid_item("function", &[m]))?;
        let ctx = format!("function '{name}'");
        let item_err = |m: String| ShellgenError::invalid_item(ctx.clone(), &[m]);

        let description = required_string(map, "description").map_err(item_err)?;
        let usage = optional_string(map, "usage").map_err(item_err)?;
        let kind = if let Some(predicate) = map.get("predicate") {
            FunctionKind::Predicate(plain_string(predicate, "predicate").map_err(item_err)?)
        } else if let Some(body) = map.get("body") {
            FunctionKind::Body(ShellText::parse(body).map_err(item_err)?)
        } else {
            return Err(item_err("must have either 'predicate' or 'body'".to_string()));
        };

        Ok(Self {
            name,
            description,
            usage,
            kind,
        })
    }
}

/// A generated configuration snippet, sourced at shell start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub prefix: String,
    pub description: String,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub guards: Vec<Guard>,
    pub snippet: Snippet,
    pub conditional: Option<Conditional>,
}

impl Module {
    /// `{prefix}-{name}`, the file name without extension.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.prefix, self.name)
    }

    /// Convert a raw manifest item into a typed module.
    ///
    /// # Errors
    ///
    /// Returns [`ShellgenError::InvalidItem`] when required fields are missing or malformed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = as_mapping(value, "module")?;
        let name = required_string(map, "name")
            .map_err(|m| ShellgenError::invalid_item("module", &[m]))?;
        let ctx = format!("module '{name}'");

        let mut errors = Vec::new();
        let prefix = required_string(map, "prefix").unwrap_or_else(|m| {
            errors.push(m);
            String::new()
        });
        let description = required_string(map, "description").unwrap_or_else(|m| {
            errors.push(m);
            String::new()
        });
        let url = optional_string(map, "url").unwrap_or_else(|m| {
            errors.push(m);
            None
        });
        let comment = optional_string(map, "comment").unwrap_or_else(|m| {
            errors.push(m);
            None
        });
        let guards = parse_guards(map).unwrap_or_else(|m| {
            errors.extend(m);
            Vec::new()
        });
        let snippet = Snippet::parse(map).unwrap_or_else(|m| {
            errors.extend(m);
            Snippet::default()
        });
        let conditional = match map.get("conditional").map(Conditional::parse) {
            Some(Ok(c)) => Some(c),
            Some(Err(m)) => {
                errors.extend(m);
                None
            }
            None => None,
        };

        if !errors.is_empty() {
            return Err(ShellgenError::invalid_item(ctx, &errors));
        }
        Ok(Self {
            name,
            prefix,
            description,
            url,
            comment,
            guards,
            snippet,
            conditional,
        })
    }
}

/// Normalize `guard` (single) or `guards` (list) into an ordered list.
///
/// # Errors
///
/// Returns one message per malformed guard.
pub fn parse_guards(map: &Mapping) -> Result<Vec<Guard>, Vec<String>> {
    let (guards, errors) = collect_guards(map);
    if errors.is_empty() {
        Ok(guards)
    } else {
        Err(errors)
    }
}

/// Like [`parse_guards`], but keeps every guard that parsed alongside the
/// messages for those that did not.
#[must_use]
pub fn collect_guards(map: &Mapping) -> (Vec<Guard>, Vec<String>) {
    let raw: Vec<&Value> = match (map.get("guards"), map.get("guard")) {
        (Some(_), Some(_)) => {
            return (
                Vec::new(),
                vec!["use either 'guard' or 'guards', not both".to_string()],
            );
        }
        (Some(Value::Sequence(list)), None) => list.iter().collect(),
        (Some(other), None) => {
            return (
                Vec::new(),
                vec![format!("'guards' must be a list, found {}", kind(other))],
            );
        }
        (None, Some(single)) => vec![single],
        (None, None) => Vec::new(),
    };

    let mut guards = Vec::with_capacity(raw.len());
    let mut errors = Vec::new();
    for value in raw {
        match Guard::parse(value) {
            Ok(g) => guards.push(g),
            Err(m) => errors.push(m),
        }
    }
    (guards, errors)
}

/// Stringify a YAML scalar; `None` for null, sequences and mappings.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A string or number as text; booleans and collections are rejected.
fn string_or_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human-readable name of a YAML node kind, for error messages.
pub(crate) const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Read a required scalar field as a string.
pub(crate) fn required_string(map: &Mapping, key: &str) -> Result<String, String> {
    match map.get(key) {
        None | Some(Value::Null) => Err(format!("missing required field '{key}'")),
        Some(value) => scalar_string(value)
            .ok_or_else(|| format!("field '{key}' must be a string, found {}", kind(value))),
    }
}

fn optional_string(map: &Mapping, key: &str) -> Result<Option<String>, String> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_string(value)
            .map(Some)
            .ok_or_else(|| format!("field '{key}' must be a string, found {}", kind(value))),
    }
}

fn plain_string(value: &Value, field: &str) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("'{field}' must be a string, found {}", kind(value)))
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>, String> {
    let Value::Sequence(items) = value else {
        return Err(format!(
            "'{field}' must be a list of strings, found {}",
            kind(value)
        ));
    };
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                format!(
                    "'{field}' must be a list of strings, found a {} entry",
                    kind(item)
                )
            })
        })
        .collect()
}

fn parse_env(value: &Value) -> Result<Vec<(String, String)>, String> {
    let Value::Mapping(map) = value else {
        return Err(format!(
            "'env' must be a mapping of variable to value, found {}",
            kind(value)
        ));
    };
    map.iter()
        .map(|(k, v)| {
            let key = k
                .as_str()
                .ok_or_else(|| "'env' keys must be strings".to_string())?;
            let val = string_or_number(v).ok_or_else(|| {
                format!(
                    "'env.{key}' must be a string or number, found {}",
                    kind(v)
                )
            })?;
            Ok((key.to_string(), val))
        })
        .collect()
}

fn parse_aliases(value: &Value) -> Result<Vec<(String, String)>, String> {
    let Value::Mapping(map) = value else {
        return Err(format!(
            "'aliases' must be a mapping of name to command, found {}",
            kind(value)
        ));
    };
    map.iter()
        .map(|(k, v)| {
            let key = k
                .as_str()
                .ok_or_else(|| "'aliases' keys must be strings".to_string())?;
            let cmd = v
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("'aliases.{key}' must be a string, found {}", kind(v)))?;
            Ok((key.to_string(), cmd))
        })
        .collect()
}

fn as_mapping<'a>(value: &'a Value, what: &str) -> Result<&'a Mapping> {
    value.as_mapping().ok_or_else(|| ShellgenError::InvalidItem {
        item: what.to_string(),
        message: format!("expected a mapping, found {}", kind(value)),
    })
}

fn collect<T>(parsed: Result<T, String>, errors: &mut Vec<String>, store: impl FnOnce(T)) {
    match parsed {
        Ok(value) => store(value),
        Err(message) => errors.push(message),
    }
}
