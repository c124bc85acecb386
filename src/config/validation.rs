//! Manifest validation.
//!
//! Validation is pure and exhaustive: every problem in every item is
//! reported, so a user can fix a manifest in one pass. Callers decide
//! whether a non-empty result aborts generation.
use std::fmt;

use serde_yaml::{Mapping, Value};

use super::manifest::Manifest;
use super::model::{
    Conditional, MODULE_BODY_KEYS, ShellText, Snippet, collect_guards, kind, required_string,
    scalar_string,
};
use crate::render::guards::{check_guard, known_predicates, predicate_template};

/// A problem found in one manifest item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Item context, e.g. `module 'eza'` or `functions[2]`.
    pub item: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item, self.message)
    }
}

/// A validator for one manifest section.
pub trait ItemValidator {
    /// Validate the section and return every problem found.
    fn validate(&self) -> Vec<ValidationError>;

    /// Section key in the manifest (`functions`, `modules`), used to label
    /// items that have no usable name.
    fn section(&self) -> &'static str;
}

/// Validator for the `functions` section.
#[derive(Debug)]
pub struct FunctionValidator<'a> {
    functions: &'a [Value],
}

impl<'a> FunctionValidator<'a> {
    #[must_use]
    pub const fn new(functions: &'a [Value]) -> Self {
        Self { functions }
    }

    fn check(map: &Mapping, ctx: &str, errors: &mut Vec<ValidationError>) {
        if let Err(m) = required_string(map, "description") {
            errors.push(ValidationError::new(ctx, m));
        }
        if let Some(usage) = map.get("usage")
            && !usage.is_null()
            && scalar_string(usage).is_none()
        {
            errors.push(ValidationError::new(
                ctx,
                format!("field 'usage' must be a string, found {}", kind(usage)),
            ));
        }

        match (map.get("predicate"), map.get("body")) {
            (None, None) => {
                errors.push(ValidationError::new(
                    ctx,
                    "must have either 'predicate' or 'body'",
                ));
            }
            (Some(_), Some(_)) => {
                errors.push(ValidationError::new(
                    ctx,
                    "must have either 'predicate' or 'body', not both",
                ));
            }
            (Some(predicate), None) => match predicate.as_str() {
                None => errors.push(ValidationError::new(
                    ctx,
                    format!("'predicate' must be a string, found {}", kind(predicate)),
                )),
                Some(name) if predicate_template(name).is_none() => {
                    errors.push(ValidationError::new(
                        ctx,
                        format!(
                            "unknown predicate '{name}' (known: {})",
                            known_predicates()
                        ),
                    ));
                }
                Some(_) => {}
            },
            (None, Some(body)) => {
                if let Err(m) = ShellText::parse(body) {
                    errors.push(ValidationError::new(ctx, m));
                }
            }
        }
    }
}

impl ItemValidator for FunctionValidator<'_> {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (i, value) in self.functions.iter().enumerate() {
            if let Some((map, ctx)) = item_context(value, self.section(), "function", i, &mut errors)
            {
                Self::check(map, &ctx, &mut errors);
            }
        }
        errors
    }

    fn section(&self) -> &'static str {
        "functions"
    }
}

/// Validator for the `modules` section.
#[derive(Debug)]
pub struct ModuleValidator<'a> {
    modules: &'a [Value],
}

impl<'a> ModuleValidator<'a> {
    #[must_use]
    pub const fn new(modules: &'a [Value]) -> Self {
        Self { modules }
    }

    fn check(map: &Mapping, ctx: &str, errors: &mut Vec<ValidationError>) {
        for field in ["prefix", "description"] {
            if let Err(m) = required_string(map, field) {
                errors.push(ValidationError::new(ctx, m));
            }
        }
        for field in ["url", "comment"] {
            if let Some(value) = map.get(field)
                && !value.is_null()
                && scalar_string(value).is_none()
            {
                errors.push(ValidationError::new(
                    ctx,
                    format!("field '{field}' must be a string, found {}", kind(value)),
                ));
            }
        }

        if !MODULE_BODY_KEYS.iter().any(|k| map.contains_key(*k)) {
            errors.push(ValidationError::new(
                ctx,
                format!("must have at least one of: {}", MODULE_BODY_KEYS.join(", ")),
            ));
        }

        let (guards, messages) = collect_guards(map);
        errors.extend(messages.into_iter().map(|m| ValidationError::new(ctx, m)));
        for guard in &guards {
            if let Err(m) = check_guard(guard) {
                errors.push(ValidationError::new(ctx, m));
            }
        }

        if let Err(messages) = Snippet::parse(map) {
            errors.extend(messages.into_iter().map(|m| ValidationError::new(ctx, m)));
        }

        if let Some(value) = map.get("conditional") {
            if let Err(messages) = Conditional::parse(value) {
                errors.extend(messages.into_iter().map(|m| {
                    if let Some((branch, rest)) = m.split_once(": ")
                        && branch.starts_with("conditional[")
                    {
                        return ValidationError::new(format!("{ctx} {branch}"), rest);
                    }
                    ValidationError::new(ctx, m)
                }));
            }
            for (i, guard) in Conditional::parsed_guards(value) {
                if let Err(m) = check_guard(&guard) {
                    errors.push(ValidationError::new(format!("{ctx} conditional[{i}]"), m));
                }
            }
        }
    }
}

impl ItemValidator for ModuleValidator<'_> {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (i, value) in self.modules.iter().enumerate() {
            if let Some((map, ctx)) = item_context(value, self.section(), "module", i, &mut errors) {
                Self::check(map, &ctx, &mut errors);
            }
        }
        errors
    }

    fn section(&self) -> &'static str {
        "modules"
    }
}

/// Resolve an item's mapping and its error context.
///
/// Records an error and returns `None` when the item is not a mapping or
/// has no usable `name`; further checks for that item are skipped.
fn item_context<'v>(
    value: &'v Value,
    section: &str,
    noun: &str,
    index: usize,
    errors: &mut Vec<ValidationError>,
) -> Option<(&'v Mapping, String)> {
    let position = format!("{section}[{index}]");
    let Some(map) = value.as_mapping() else {
        errors.push(ValidationError::new(
            position,
            format!("expected a mapping, found {}", kind(value)),
        ));
        return None;
    };
    match required_string(map, "name") {
        Ok(name) => Some((map, format!("{noun} '{name}'"))),
        Err(m) => {
            errors.push(ValidationError::new(position, m));
            None
        }
    }
}

/// Validate a merged manifest and return every problem as a display string.
///
/// An empty list means the manifest is valid.
#[must_use]
pub fn validate_manifest(manifest: &Manifest) -> Vec<String> {
    let validators: [&dyn ItemValidator; 2] = [
        &FunctionValidator::new(&manifest.functions),
        &ModuleValidator::new(&manifest.modules),
    ];
    validators
        .iter()
        .flat_map(|v| v.validate())
        .map(|e| e.to_string())
        .collect()
}
