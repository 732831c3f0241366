use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

/// Identifiers arrive either as JSON strings or numbers depending on the
/// resource, they're normalized to strings.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let res = match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(num)) => Some(num.to_string()),
        _ => None,
    };

    return Ok(res);
}

pub fn required<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let res = optional(deserializer)?;
    return Ok(res.unwrap_or_default());
}
