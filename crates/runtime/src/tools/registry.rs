//! Normalization of advertised tools into model-facing declarations.

use super::AdvertisedTool;
use crate::model::{ParameterSpec, ToolDeclaration};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::warn;

/// Why a single tool's schema could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("input schema is not an object")]
    NotAnObject,
    #[error("input schema has type `{0}`, expected `object`")]
    NotObjectType(String),
    #[error("`properties` is not an object")]
    PropertiesNotAnObject,
    #[error("parameter `{0}` is not an object")]
    ParameterNotAnObject(String),
    #[error("parameter `{0}` has no usable type")]
    ParameterWithoutType(String),
}

/// Normalize a server's tool list.
///
/// Tools whose schema cannot be normalized are skipped with a warning, as
/// are repeated names after their first occurrence. Order is preserved.
pub fn normalize(tools: impl IntoIterator<Item = AdvertisedTool>) -> Vec<ToolDeclaration> {
    let mut seen = HashSet::new();
    let mut declarations = Vec::new();

    for tool in tools {
        if seen.contains(&tool.name) {
            warn!(tool = %tool.name, "skipping duplicate tool name");
            continue;
        }
        match declare(&tool) {
            Ok(declaration) => {
                seen.insert(tool.name);
                declarations.push(declaration);
            }
            Err(e) => warn!(tool = %tool.name, error = %e, "skipping tool with unusable schema"),
        }
    }

    declarations
}

/// Normalize one advertised tool.
pub fn declare(tool: &AdvertisedTool) -> Result<ToolDeclaration, SchemaError> {
    Ok(ToolDeclaration {
        name: tool.name.clone(),
        description: tool.description.clone().unwrap_or_default(),
        parameters: parameters(&tool.input_schema)?,
    })
}

fn parameters(schema: &Value) -> Result<BTreeMap<String, ParameterSpec>, SchemaError> {
    let schema = match schema {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Object(map) => map,
        _ => return Err(SchemaError::NotAnObject),
    };

    if let Some(kind) = schema.get("type").and_then(Value::as_str) {
        if kind != "object" {
            return Err(SchemaError::NotObjectType(kind.to_string()));
        }
    }

    let properties = match schema.get("properties") {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(props)) => props,
        Some(_) => return Err(SchemaError::PropertiesNotAnObject),
    };

    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| {
            let property = property
                .as_object()
                .ok_or_else(|| SchemaError::ParameterNotAnObject(name.clone()))?;
            let spec = ParameterSpec {
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or(name.as_str())
                    .to_string(),
                kind: parameter_type(property)
                    .ok_or_else(|| SchemaError::ParameterWithoutType(name.clone()))?,
                required: required.contains(name.as_str()),
            };
            Ok((name.clone(), spec))
        })
        .collect()
}

fn parameter_type(property: &Map<String, Value>) -> Option<String> {
    match property.get("type")? {
        Value::String(kind) => Some(kind.clone()),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null")
            .map(str::to_string),
        _ => None,
    }
}
