/*!
 * Serde utilities for the loosely typed order-status payload.
 *
 * The order endpoint is not consistent about scalar types: counters such as
 * `start_count` or `remains` may arrive as JSON numbers or as numeric strings,
 * and identifiers such as `id` or `service_id` may arrive as either as well.
 * These helpers accept both representations.
 */

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional integer that may be represented as a number or string.
///
/// - Missing/null returns `None`
/// - Integers pass through
/// - Floating-point numbers are truncated
/// - Strings are parsed; an empty string is treated as missing
///
/// # Usage with serde
///
/// ```rust
/// use serde::Deserialize;
/// use ticketdesk_core::utils::serde::deserialize_optional_numeric;
///
/// #[derive(Deserialize)]
/// struct Payload {
///     #[serde(default, deserialize_with = "deserialize_optional_numeric")]
///     remains: Option<i64>,
/// }
///
/// let payload: Payload = serde_json::from_str(r#"{"remains": "120"}"#).unwrap();
/// assert_eq!(payload.remains, Some(120));
/// ```
pub fn deserialize_optional_numeric<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Some(f as i64))
            } else {
                Err(D::Error::custom(format!("Invalid numeric value: {n}")))
            }
        }
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map(Some)
                .or_else(|_| trimmed.parse::<f64>().map(|f| Some(f as i64)))
                .map_err(|_| D::Error::custom(format!("Cannot parse '{s}' as numeric")))
        }
        Some(other) => Err(D::Error::custom(format!(
            "Expected numeric value, found: {other:?}"
        ))),
    }
}

/// Deserialize an optional scalar as a string, accepting numbers and booleans.
pub fn deserialize_optional_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "Expected scalar value, found: {other:?}"
        ))),
    }
}
