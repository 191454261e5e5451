//! Typed attribute values.
//!
//! Categories declare each attribute with an [`AttributeKind`]. Incoming
//! values arrive as JSON and are checked against the declared kind at write
//! time; the canonical text form is what lands in the `value` column, and
//! reads turn it back into a typed JSON value. The legacy behavior of
//! accepting any opaque string is gone.

use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use crate::EngineError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared type of a category attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttributeKind {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl AttributeKind {
    /// Returns the canonical tag stored in the `attributes.kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
        }
    }

    /// Validates `value` against the declared kind and returns the canonical
    /// text form for storage.
    ///
    /// `NUMBER` and `BOOLEAN` also accept their string spellings so legacy
    /// clients that send everything as strings keep working.
    pub fn canonicalize(self, name: &str, value: &JsonValue) -> Result<String, EngineError> {
        match self {
            Self::String => match value {
                JsonValue::String(s) => Ok(s.clone()),
                other => Err(invalid(name, self, other)),
            },
            Self::Number => {
                let parsed = match value {
                    JsonValue::Number(n) => n.as_f64(),
                    JsonValue::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                match parsed {
                    Some(n) if n.is_finite() => Ok(format_number(n)),
                    _ => Err(invalid(name, self, value)),
                }
            }
            Self::Boolean => match value {
                JsonValue::Bool(b) => Ok(b.to_string()),
                JsonValue::String(s) if s == "true" || s == "false" => Ok(s.clone()),
                other => Err(invalid(name, self, other)),
            },
            Self::Date => match value {
                JsonValue::String(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map(|_| s.clone())
                    .map_err(|_| invalid(name, self, value)),
                other => Err(invalid(name, self, other)),
            },
        }
    }

    /// Renders a stored canonical value back into a typed JSON value.
    ///
    /// Stored values always originate from [`canonicalize`], so the parse
    /// failures here can only come from rows written before the type column
    /// existed; those fall back to the raw string.
    ///
    /// [`canonicalize`]: AttributeKind::canonicalize
    pub fn render(self, raw: &str) -> JsonValue {
        match self {
            Self::String | Self::Date => JsonValue::String(raw.to_string()),
            Self::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(raw.to_string())),
            Self::Boolean => match raw {
                "true" => JsonValue::Bool(true),
                "false" => JsonValue::Bool(false),
                other => JsonValue::String(other.to_string()),
            },
        }
    }
}

impl TryFrom<&str> for AttributeKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "STRING" => Ok(Self::String),
            "NUMBER" => Ok(Self::Number),
            "BOOLEAN" => Ok(Self::Boolean),
            "DATE" => Ok(Self::Date),
            other => Err(EngineError::InvalidValue(format!(
                "unknown attribute type: {other}"
            ))),
        }
    }
}

fn invalid(name: &str, kind: AttributeKind, value: &JsonValue) -> EngineError {
    EngineError::InvalidValue(format!(
        "attribute '{name}' expects a {} value, got {value}",
        kind.as_str()
    ))
}

// Integers keep their integer spelling so "42" does not become "42.0".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_accepts_only_strings() {
        assert_eq!(
            AttributeKind::String
                .canonicalize("color", &json!("red"))
                .unwrap(),
            "red"
        );
        assert!(AttributeKind::String.canonicalize("color", &json!(3)).is_err());
    }

    #[test]
    fn number_accepts_numbers_and_numeric_strings() {
        assert_eq!(
            AttributeKind::Number
                .canonicalize("size", &json!(42))
                .unwrap(),
            "42"
        );
        assert_eq!(
            AttributeKind::Number
                .canonicalize("size", &json!("2.5"))
                .unwrap(),
            "2.5"
        );
        assert!(
            AttributeKind::Number
                .canonicalize("size", &json!("large"))
                .is_err()
        );
    }

    #[test]
    fn boolean_accepts_bools_and_their_spellings() {
        assert_eq!(
            AttributeKind::Boolean
                .canonicalize("waterproof", &json!(true))
                .unwrap(),
            "true"
        );
        assert_eq!(
            AttributeKind::Boolean
                .canonicalize("waterproof", &json!("false"))
                .unwrap(),
            "false"
        );
        assert!(
            AttributeKind::Boolean
                .canonicalize("waterproof", &json!("yes"))
                .is_err()
        );
    }

    #[test]
    fn date_requires_iso_format() {
        assert_eq!(
            AttributeKind::Date
                .canonicalize("released", &json!("2024-02-29"))
                .unwrap(),
            "2024-02-29"
        );
        assert!(
            AttributeKind::Date
                .canonicalize("released", &json!("02/29/2024"))
                .is_err()
        );
        assert!(
            AttributeKind::Date
                .canonicalize("released", &json!("2023-02-29"))
                .is_err()
        );
    }

    #[test]
    fn render_round_trips_typed_values() {
        assert_eq!(AttributeKind::Number.render("42"), json!(42.0));
        assert_eq!(AttributeKind::Boolean.render("true"), json!(true));
        assert_eq!(AttributeKind::String.render("red"), json!("red"));
        assert_eq!(AttributeKind::Date.render("2024-01-01"), json!("2024-01-01"));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(AttributeKind::try_from("FLOAT").is_err());
        assert_eq!(
            AttributeKind::try_from("DATE").unwrap(),
            AttributeKind::Date
        );
    }
}
