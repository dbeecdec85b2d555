//! Pulls the ES|QL statement out of the resolved input.

use crate::error::InputError;

const JSON: &str = "JSON";
const TOML: &str = "TOML";

/// How the resolved input is to be read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// The input is the statement itself
    #[default]
    Esql,
    /// JSON document; the statement is the first property with this name
    Json(String),
    /// TOML document; the statement sits under this dotted key
    Toml(String),
    /// Elastic detection rule in TOML
    ElasticDetectionRule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Query(String),
    /// Nothing to validate, e.g. a detection rule of another language
    Skip,
}

impl InputFormat {
    pub fn extract(&self, content: String) -> Result<Extracted, InputError> {
        match self {
            InputFormat::Esql => Ok(Extracted::Query(content)),
            InputFormat::Json(field) => json_field(&content, field).map(Extracted::Query),
            InputFormat::Toml(field) => {
                let table = parse_toml(&content)?;
                toml_string(&table, field).map(Extracted::Query)
            }
            InputFormat::ElasticDetectionRule => detection_rule(&content),
        }
    }
}

fn json_field(content: &str, field: &str) -> Result<String, InputError> {
    let document: serde_json::Value =
        serde_json::from_str(content).map_err(|e| InputError::Malformed {
            format: JSON,
            message: e.to_string(),
        })?;

    match find_property(&document, field) {
        Some(serde_json::Value::String(query)) => Ok(query.clone()),
        Some(_) => Err(InputError::NotAString {
            format: JSON,
            field: field.to_string(),
        }),
        None => Err(InputError::FieldNotFound {
            format: JSON,
            field: field.to_string(),
        }),
    }
}

/// First property named `name` in document order, at any depth
fn find_property<'a>(value: &'a serde_json::Value, name: &str) -> Option<&'a serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map.iter().find_map(|(key, value)| {
            if key == name {
                Some(value)
            } else {
                find_property(value, name)
            }
        }),
        serde_json::Value::Array(items) => items.iter().find_map(|item| find_property(item, name)),
        _ => None,
    }
}

fn parse_toml(content: &str) -> Result<toml::Table, InputError> {
    content.parse::<toml::Table>().map_err(|e| InputError::Malformed {
        format: TOML,
        message: e.to_string(),
    })
}

fn toml_lookup<'a>(table: &'a toml::Table, path: &str) -> Option<&'a toml::Value> {
    let mut keys = path.split('.');
    let mut value = table.get(keys.next()?)?;
    for key in keys {
        value = value.as_table()?.get(key)?;
    }
    Some(value)
}

fn toml_string(table: &toml::Table, path: &str) -> Result<String, InputError> {
    match toml_lookup(table, path) {
        Some(toml::Value::String(query)) => Ok(query.clone()),
        Some(_) => Err(InputError::NotAString {
            format: TOML,
            field: path.to_string(),
        }),
        None => Err(InputError::FieldNotFound {
            format: TOML,
            field: path.to_string(),
        }),
    }
}

fn detection_rule(content: &str) -> Result<Extracted, InputError> {
    let rule = parse_toml(content)?;
    let language = toml_lookup(&rule, "rule.type").and_then(toml::Value::as_str);
    if language != Some("esql") {
        tracing::info!(?language, "not an ES|QL detection rule");
        return Ok(Extracted::Skip);
    }
    toml_string(&rule, "rule.query").map(Extracted::Query)
}
