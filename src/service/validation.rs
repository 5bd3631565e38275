//! Request validation from workflow input rules.

use crate::config::{InputField, InputSource, ValidationRule, ValueKind};
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct RequestValidator;

impl RequestValidator {
    /// Check every declared input and return the normalized values by input name.
    ///
    /// Missing inputs take their default, are skipped when optional, and are an issue otherwise.
    /// Query strings are coerced for numeric rules. Undeclared keys are dropped. All issues are
    /// reported together in one `Validation` error.
    pub fn validate(
        fields: &[InputField],
        body: &Map<String, Value>,
        query: &HashMap<String, String>,
    ) -> Result<Map<String, Value>, AppError> {
        let mut out = Map::new();
        let mut issues = Vec::new();
        for field in fields {
            let raw = match field.source {
                InputSource::Body => body.get(&field.name).filter(|v| !v.is_null()).cloned(),
                InputSource::Query => query.get(&field.name).map(|s| Value::String(s.clone())),
            };
            let Some(raw) = raw.or_else(|| field.rule.default.clone()) else {
                if !field.rule.optional {
                    issues.push(format!("{} is required", field.name));
                }
                continue;
            };
            match validate_field(&field.name, raw, &field.rule) {
                Ok(v) => {
                    out.insert(field.name.clone(), v);
                }
                Err(issue) => issues.push(issue),
            }
        }
        if issues.is_empty() {
            Ok(out)
        } else {
            Err(AppError::Validation(issues.join("; ")))
        }
    }
}

fn validate_field(name: &str, v: Value, rule: &ValidationRule) -> Result<Value, String> {
    let v = coerce(name, v, rule.kind)?;
    let v = match v {
        Value::String(s) if rule.trim => Value::String(s.trim().to_string()),
        other => other,
    };

    if let (Some(min), Some(s)) = (rule.min_length, v.as_str()) {
        if s.chars().count() < min as usize {
            return Err(format!("{} must be at least {} characters", name, min));
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Err(format!("{} must be at least {}", name, min));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Err(format!("{} must be at most {}", name, max));
            }
        }
    }
    if let (Some(format), Some(s)) = (&rule.format, v.as_str()) {
        validate_format(name, s, format)?;
    }
    Ok(v)
}

/// Bring `v` to the rule's kind. Strings from the query string parse into integers.
fn coerce(name: &str, v: Value, kind: ValueKind) -> Result<Value, String> {
    match (kind, v) {
        (ValueKind::String, v @ Value::String(_)) => Ok(v),
        (ValueKind::String, _) => Err(format!("{} must be a string", name)),
        (ValueKind::Integer, Value::Number(n)) => n
            .as_i64()
            .map(Value::from)
            .ok_or_else(|| format!("{} must be an integer", name)),
        (ValueKind::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("{} must be an integer", name)),
        (ValueKind::Integer, _) => Err(format!("{} must be an integer", name)),
    }
}

fn url_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").ok()).as_ref()
}

fn validate_format(name: &str, s: &str, format: &str) -> Result<(), String> {
    match format {
        "uuid" => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Err(format!("{} must be a valid UUID", name));
            }
        }
        "url" => {
            if !url_regex().is_some_and(|re| re.is_match(s)) {
                return Err(format!("{} must be a valid URL", name));
            }
        }
        _ => {}
    }
    Ok(())
}
