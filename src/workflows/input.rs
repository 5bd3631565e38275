//! Declared workflow input: extracted from the request and validated against its rules.

use crate::config::ResolvedWorkflow;
use crate::error::AppError;
use crate::service::RequestValidator;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct WorkflowInput {
    values: Map<String, Value>,
}

fn body_to_map(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

impl WorkflowInput {
    /// Parse the body (empty means `{}`) and validate it with the query string against the
    /// workflow's declared inputs.
    pub fn extract(
        workflow: &ResolvedWorkflow,
        body: &[u8],
        query: &HashMap<String, String>,
    ) -> Result<Self, AppError> {
        let body = body_to_map(body)?;
        let values = RequestValidator::validate(&workflow.input, &body, query)?;
        tracing::debug!(workflow = %workflow.name, inputs = values.len(), "input validated");
        Ok(WorkflowInput { values })
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(Value::as_i64)
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        self.value(name).and_then(Value::as_u64)
    }

    pub fn require_i64(&self, name: &str) -> Result<i64, AppError> {
        self.i64(name)
            .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
    }

    /// All validated values, keyed by input name.
    pub fn into_values(self) -> HashMap<String, Value> {
        self.values.into_iter().collect()
    }

    /// Split off `id` from the remaining values, for updates.
    pub fn split_id(self) -> Result<(Value, HashMap<String, Value>), AppError> {
        let mut values = self.into_values();
        let id = values
            .remove("id")
            .ok_or_else(|| AppError::Validation("id is required".into()))?;
        Ok((id, values))
    }
}
