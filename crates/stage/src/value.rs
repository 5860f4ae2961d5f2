use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An attribute value as held by the stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Token(String),
    Vec3([f64; 3]),
}

impl Value {
    /// Convert user-entered text into a value of the given value type
    ///
    /// Unknown value types keep the text as a string and log a warning.
    pub fn parse(type_name: &str, text: &str) -> Result<Self> {
        let text = text.trim();
        let value = match type_name {
            "bool" => Value::Bool(matches!(
                text.to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            )),
            "int" | "uint" | "int64" | "uint64" => Value::Int(
                text.parse()
                    .with_context(|| format!("Expected an integer, got {:?}", text))?,
            ),
            "float" | "double" | "half" => Value::Float(
                text.parse()
                    .with_context(|| format!("Expected a number, got {:?}", text))?,
            ),
            "string" => Value::String(text.to_string()),
            "token" => Value::Token(text.to_string()),
            "vector3f" | "vector3d" | "color3f" | "float3" | "double3" | "point3f" | "normal3f" => {
                Value::Vec3(parse_vec3(text)?)
            }
            other => {
                warn!("Unsupported value type {}, keeping string value", other);
                Value::String(text.to_string())
            }
        };
        Ok(value)
    }
}

fn parse_vec3(text: &str) -> Result<[f64; 3]> {
    let inner = text.trim_start_matches('(').trim_end_matches(')');
    let parts = inner
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid vector component {:?}", p.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => bail!("Expected three components, got {}", parts.len()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) | Value::Token(v) => write!(f, "{}", v),
            Value::Vec3([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
        }
    }
}
