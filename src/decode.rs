use serde_json::Value;

/// Decodes an (already interpolated) secret string.
///
/// Secrets holding JSON come back as the parsed structure; anything else is
/// a plain string secret and is returned unchanged.
pub fn decode_secret(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_object() {
        assert_eq!(decode_secret(r#"{"a":1}"#), json!({"a": 1}));
    }

    #[test]
    fn test_decode_quoted_string() {
        assert_eq!(decode_secret(r#""hunter2""#), json!("hunter2"));
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_secret("5"), json!(5));
        assert_eq!(decode_secret("true"), json!(true));
        assert_eq!(decode_secret("null"), Value::Null);
        assert_eq!(decode_secret("[1, \"two\"]"), json!([1, "two"]));
    }

    #[test]
    fn test_plain_text_falls_back_to_string() {
        assert_eq!(decode_secret("plain-text"), json!("plain-text"));
    }

    #[test]
    fn test_truncated_json_falls_back_to_string() {
        assert_eq!(decode_secret(r#"{"a":"#), json!(r#"{"a":"#));
    }
}
