use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truncate a string to `max` characters, appending "..." when shortened.
///
/// Respects UTF-8 character boundaries.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "..."
    }
}

/// Collapse newlines and whitespace runs so a prompt fits on one line.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deserialize free-form JSON into optional text.
///
/// The agent proxy sends `""` for absent values and occasionally a JSON
/// object or number where text is expected; those are stringified.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_text")]
        value: Option<String>,
    }

    #[test]
    fn test_lenient_text_variants() {
        let empty: Probe = serde_json::from_str(r#"{"value": ""}"#).unwrap();
        assert_eq!(empty.value, None);

        let missing: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.value, None);

        let number: Probe = serde_json::from_str(r#"{"value": 42}"#).unwrap();
        assert_eq!(number.value.as_deref(), Some("42"));

        let text: Probe = serde_json::from_str(r#"{"value": "SELECT 1"}"#).unwrap();
        assert_eq!(text.value.as_deref(), Some("SELECT 1"));
    }
}
