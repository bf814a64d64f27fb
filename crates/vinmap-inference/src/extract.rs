//! Locating the JSON object inside a free-form model reply.
//!
//! Models wrap their JSON in prose or code fences. The scanner walks the
//! reply tracking brace depth, skipping braces inside string literals, and
//! returns the first balanced object that parses.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::error;

use vinmap_core::{Error, PipelineStep, Result};

/// End offset (exclusive) of the balanced object starting at `start`.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced `{...}` in `text` that parses as a JSON object.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let end = balanced_end(text, start)?;
        match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    })
}

/// Extract the reply's JSON object, tagging failure with the step.
pub fn parse_object(step: PipelineStep, raw: &str) -> Result<Map<String, Value>> {
    extract_json_object(raw).ok_or_else(|| {
        error!(
            subsystem = "inference",
            component = "extract",
            step = step.as_str(),
            raw = %raw,
            "No JSON object found in AI response"
        );
        Error::ResponseFormat {
            step,
            raw: raw.to_string(),
        }
    })
}

/// Extract the reply's JSON object and deserialize it as `T`.
pub fn parse_reply<T: DeserializeOwned>(step: PipelineStep, raw: &str) -> Result<T> {
    let map = parse_object(step, raw)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        error!(
            subsystem = "inference",
            component = "extract",
            step = step.as_str(),
            error = %e,
            raw = %raw,
            "AI response JSON has an unexpected shape"
        );
        Error::ResponseFormat {
            step,
            raw: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(text: &str) -> Option<Value> {
        extract_json_object(text).map(Value::Object)
    }

    #[test]
    fn test_prose_before_object_is_ignored() {
        assert_eq!(
            extract(r#"Sure! {"wineName":"X"}"#),
            Some(json!({ "wineName": "X" }))
        );
    }

    #[test]
    fn test_trailing_prose_with_braces_is_ignored() {
        let text = r#"{"a":1} and then {oops"#;
        assert_eq!(extract(text), Some(json!({ "a": 1 })));
    }

    #[test]
    fn test_code_fence() {
        let text = "```json\n{\n  \"name\": \"Barolo\",\n  \"body\": 5\n}\n```";
        assert_eq!(extract(text), Some(json!({ "name": "Barolo", "body": 5 })));
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"Result: {"description":"notes of {cherry} and \"oak\"","n":2}"#;
        assert_eq!(
            extract(text),
            Some(json!({ "description": "notes of {cherry} and \"oak\"", "n": 2 }))
        );
    }

    #[test]
    fn test_nested_object() {
        let text = r#"{"outer":{"inner":true}} {"second":1}"#;
        assert_eq!(extract(text), Some(json!({ "outer": { "inner": true } })));
    }

    #[test]
    fn test_skips_unparseable_candidate() {
        let text = r#"Use {placeholders} like this: {"ok":true}"#;
        assert_eq!(extract(text), Some(json!({ "ok": true })));
    }

    #[test]
    fn test_korean_text_around_object() {
        let text = "분석 결과입니다: {\"name\":\"마주앙\"} 감사합니다";
        assert_eq!(extract(text), Some(json!({ "name": "마주앙" })));
    }

    #[test]
    fn test_no_object() {
        assert!(extract("I could not read the label.").is_none());
        assert!(extract("{unterminated").is_none());
        assert!(extract("").is_none());
    }

    #[test]
    fn test_parse_object_preserves_raw_on_failure() {
        let err = parse_object(PipelineStep::LabelExtraction, "no json here").unwrap_err();
        match err {
            Error::ResponseFormat { step, raw } => {
                assert_eq!(step, PipelineStep::LabelExtraction);
                assert_eq!(raw, "no json here");
            }
            other => panic!("expected response format error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reply_typed() {
        #[derive(Debug, serde::Deserialize)]
        struct Named {
            name: String,
        }
        let named: Named = parse_reply(PipelineStep::DetailSynthesis, r#"ok {"name":"X"}"#).unwrap();
        assert_eq!(named.name, "X");

        let err = parse_reply::<Named>(PipelineStep::DetailSynthesis, r#"{"other":1}"#).unwrap_err();
        assert!(matches!(err, Error::ResponseFormat { .. }));
    }
}
