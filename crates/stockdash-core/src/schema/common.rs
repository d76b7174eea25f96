use serde::Deserialize;
use serde_json::Value;

/// Alpha Vantage answers with `200 OK` even when refusing a request; the reason is carried in
/// one of these top-level fields instead of the data, e.g.,
///
/// ```json
/// { "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is ..." }
/// { "Error Message": "Invalid API call. Please retry or visit the documentation ..." }
/// ```
#[derive(Deserialize, Debug, Default)]
pub struct Notice {
    #[serde(rename = "Note")]
    pub note: Option<String>,
    #[serde(rename = "Information")]
    pub information: Option<String>,
    #[serde(rename = "Error Message")]
    pub error_message: Option<String>,
}

impl Notice {
    pub fn message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }
}

/// Coerce a JSON value to a finite number, the way a lenient table loader would:
///
/// ```text
/// "181.9900"  -> Some(181.99)
/// 181.99      -> Some(181.99)
/// "n/a", null -> None
/// ```
pub fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(num) => num.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// As [`numeric`], for whole non-negative counts such as volume.
pub fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(num) => num.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// `None` for absent, blank or whitespace-only strings.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_coerces_strings_and_numbers() {
        assert_eq!(numeric(&json!("181.9900")), Some(181.99));
        assert_eq!(numeric(&json!(12.5)), Some(12.5));
        assert_eq!(numeric(&json!(" 3 ")), Some(3.0));
        assert_eq!(numeric(&json!("n/a")), None);
        assert_eq!(numeric(&json!("NaN")), None);
        assert_eq!(numeric(&Value::Null), None);
    }

    #[test]
    fn count_rejects_fractions() {
        assert_eq!(count(&json!("62379661")), Some(62379661));
        assert_eq!(count(&json!(100)), Some(100));
        assert_eq!(count(&json!("1.5")), None);
        assert_eq!(count(&json!(-4)), None);
    }

    #[test]
    fn notice_prefers_error_message() {
        let notice: Notice = serde_json::from_value(json!({
            "Note": "rate limited",
            "Error Message": "invalid symbol",
        }))
        .unwrap();
        assert_eq!(notice.message(), Some("invalid symbol"));
        assert_eq!(Notice::default().message(), None);
    }
}
