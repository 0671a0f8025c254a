//! Template interpolation for request paths and GAQL queries
//!
//! Handles `{{ variable }}` interpolation. Supports nested access like
//! `{{ config.customer_id }}` and `{{ context.customer_id }}`, plus bare
//! names resolved against `vars` first (e.g. `{{ start_date }}`) and then
//! `config`.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ variable.path }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)*)\s*\}\}").unwrap()
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Connector configuration values
    pub config: Value,
    /// Values of the stream context the node is invoked with
    pub context: Value,
    /// Per-invocation variables (date window bounds)
    pub vars: Value,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create context with config values
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set config values
    pub fn set_config(&mut self, config: Value) -> &mut Self {
        self.config = config;
        self
    }

    /// Set stream context values
    pub fn set_context(&mut self, context: Value) -> &mut Self {
        self.context = context;
        self
    }

    /// Set a single variable
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        if !self.vars.is_object() {
            self.vars = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.vars {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Get a value by path (e.g., "config.customer_id")
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.is_empty() {
            return None;
        }

        // First part determines the root object
        let root = match parts[0] {
            "config" => &self.config,
            "context" => &self.context,
            "vars" => &self.vars,
            _ => {
                if let Some(val) = get_nested_value(&self.vars, &parts) {
                    return Some(val);
                }
                return get_nested_value(&self.config, &parts);
            }
        };

        if parts.len() == 1 {
            Some(root)
        } else {
            get_nested_value(root, &parts[1..])
        }
    }
}

/// Get a nested value from a JSON value by path
fn get_nested_value<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for part in path {
        match current {
            Value::Object(map) => {
                current = map.get(*part)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Render a template string with the given context
///
/// Every variable must resolve; all unresolved names are reported together.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut errors = Vec::new();

    let result = TEMPLATE_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let var_path = &cap[1];
        match ctx.get(var_path) {
            Some(value) if !value.is_null() => value_to_string(value),
            _ => {
                errors.push(var_path.to_string());
                String::new()
            }
        }
    });

    if errors.is_empty() {
        Ok(result.into_owned())
    } else {
        Err(Error::undefined_var(errors.join(", ")))
    }
}

/// Convert a JSON value to a string for template substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_substitution() {
        let ctx = TemplateContext::with_config(json!({
            "customer_id": "1234567890"
        }));

        let result = render("/customers/{{ config.customer_id }}/googleAds:search", &ctx).unwrap();
        assert_eq!(result, "/customers/1234567890/googleAds:search");
    }

    #[test]
    fn test_bare_names_prefer_vars() {
        let mut ctx = TemplateContext::with_config(json!({"start_date": "config"}));
        ctx.set_var("start_date", "'2024-02-09'");

        let result = render("segments.date >= {{ start_date }}", &ctx).unwrap();
        assert_eq!(result, "segments.date >= '2024-02-09'");
    }

    #[test]
    fn test_bare_names_fall_back_to_config() {
        let ctx = TemplateContext::with_config(json!({"api_version": "v17"}));
        assert_eq!(render("/{{ api_version }}/x", &ctx).unwrap(), "/v17/x");
    }

    #[test]
    fn test_context_values() {
        let mut ctx = TemplateContext::new();
        ctx.set_context(json!({"customer_id": "42"}));

        let result = render("{{ context.customer_id }}", &ctx).unwrap();
        assert_eq!(result, "42");
    }

    #[test]
    fn test_undefined_variables_reported_together() {
        let ctx = TemplateContext::new();
        let err = render("{{ start_date }} {{ end_date }}", &ctx).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("start_date"));
        assert!(message.contains("end_date"));
    }

    #[test]
    fn test_null_is_undefined() {
        let ctx = TemplateContext::with_config(json!({"login_customer_id": null}));
        assert!(render("{{ config.login_customer_id }}", &ctx).is_err());
    }

    #[test]
    fn test_repeated_variable() {
        let mut ctx = TemplateContext::new();
        ctx.set_var("d", "x");
        assert_eq!(render("{{d}}-{{ d }}", &ctx).unwrap(), "x-x");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("\n  SELECT a,\n\tb  FROM c\n "),
            "SELECT a, b FROM c"
        );
    }
}
