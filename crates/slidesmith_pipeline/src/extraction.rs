//! Structured response extraction from LLM output.
//!
//! LLM responses often wrap JSON in markdown code fences or surround it with
//! explanatory prose, and some local models emit `<think>` reasoning blocks.
//! This module extracts exactly one JSON object from such text.

use regex::Regex;
use serde_json::Value as JsonValue;
use slidesmith_error::ResponseError;
use std::sync::OnceLock;

/// Remove `<think>...</think>` reasoning blocks from a response.
///
/// # Examples
///
/// ```
/// use slidesmith_pipeline::strip_think_tags;
///
/// let text = "<think>planning...</think>\n{\"a\": 1}";
/// assert_eq!(strip_think_tags(text), "{\"a\": 1}");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>\s*").unwrap());
    re.replace_all(text, "").trim().to_string()
}

/// Extract one JSON object from a response that may contain markdown or
/// extra text.
///
/// Strategies, in order:
/// 1. Markdown code fences: ```json ... ``` (or bare ``` ... ```), kept
///    only when the fenced content is itself a JSON object, so a stray
///    fence in surrounding prose cannot shadow the real payload
/// 2. Balanced braces: first `{` to its matching `}` honoring nesting and
///    quoted strings
///
/// # Errors
///
/// Returns `MalformedResponse` if no balanced JSON object is found.
///
/// # Examples
///
/// ```
/// use slidesmith_pipeline::extract_json;
///
/// let response = "Here is the result:\n```json\n{\"a\": 1}\n```\nThanks";
/// assert_eq!(extract_json(response).unwrap(), "{\"a\": 1}");
/// ```
pub fn extract_json(response: &str) -> Result<String, ResponseError> {
    let cleaned = strip_think_tags(response);

    if let Some(json) = extract_from_code_block(&cleaned, "json")
        && is_json_object(&json)
    {
        return Ok(json);
    }

    if let Some(json) = extract_balanced(&cleaned, '{', '}') {
        return Ok(json);
    }

    tracing::error!(
        response_length = response.len(),
        "No JSON object found in LLM response"
    );

    Err(ResponseError::malformed(format!(
        "No JSON object found in response (length: {}). Hint: ensure the prompt requests 'Output ONLY valid JSON'.",
        response.len()
    )))
}

fn is_json_object(candidate: &str) -> bool {
    serde_json::from_str::<JsonValue>(candidate)
        .map(|v| v.is_object())
        .unwrap_or(false)
}

/// Extract content from markdown code blocks.
///
/// Looks for ```language\n...\n``` and falls back to bare ``` fences. A
/// missing closing fence is treated as a truncated response and the content
/// runs to end of text.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        if let Some(end) = response[content_start..].find("```") {
            let content = &response[content_start..content_start + end];
            return Some(content.trim().to_string());
        }
        return Some(response[content_start..].trim().to_string());
    }

    if let Some(start) = response.find("```") {
        let content_start = start + 3;
        // Skip to next newline in case there's a language specifier
        let skip_to = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);

        if let Some(end) = response[skip_to..].find("```") {
            let content = &response[skip_to..skip_to + end];
            return Some(content.trim().to_string());
        }
        return Some(response[skip_to..].trim().to_string());
    }

    None
}

/// Extract content between balanced delimiters, handling nesting and
/// string literals with escapes.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse an extracted JSON substring into a `serde_json::Value` object.
///
/// # Errors
///
/// Returns `MalformedResponse` if the substring is not valid JSON or is not
/// an object.
pub fn parse_json(json_str: &str) -> Result<JsonValue, ResponseError> {
    let value: JsonValue = serde_json::from_str(json_str).map_err(|e| {
        let preview = json_str.chars().take(100).collect::<String>();

        tracing::error!(
            error = %e,
            json_preview = %preview,
            "JSON parsing failed"
        );

        ResponseError::malformed(format!("Failed to parse JSON: {} (JSON: {}...)", e, preview))
    })?;

    if !value.is_object() {
        return Err(ResponseError::malformed(format!(
            "Expected a JSON object, got {}",
            json_type_name(&value)
        )));
    }

    Ok(value)
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"
Here's the JSON you requested:

```json
{
  "main_theme": "Async Rust"
}
```

Hope this helps!
"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("\"main_theme\": \"Async Rust\""));
    }

    #[test]
    fn test_extract_json_balanced_braces() {
        let response = r#"Sure! Here it is: {"id": 456, "nested": {"value": "test"}} done."#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("nested"));
    }

    #[test]
    fn test_extract_json_with_string_escapes() {
        let response = r#"{"text": "She said \"hello}\"", "n": 1}"#;
        let json = extract_json(response).unwrap();
        let value = parse_json(&json).unwrap();
        assert_eq!(value["text"], "She said \"hello}\"");
    }

    #[test]
    fn test_stray_fence_in_prose_does_not_shadow_json() {
        let response = "Note: do not wrap in ``` next time.\nResult: {\"a\": 1}";
        let json = extract_json(response).unwrap();
        assert_eq!(json, "{\"a\": 1}");
        assert_eq!(parse_json(&json).unwrap()["a"], 1);
    }

    #[test]
    fn test_fenced_prose_falls_back_to_balanced_scan() {
        let response = "```\nnot json at all\n```\nThe object: {\"ok\": true}";
        let json = extract_json(response).unwrap();
        assert_eq!(parse_json(&json).unwrap()["ok"], true);
    }

    #[test]
    fn test_extract_json_strips_think_tags() {
        let response = "<think>the user wants {json}</think>\n{\"a\": 1}";
        let json = extract_json(response).unwrap();
        assert_eq!(parse_json(&json).unwrap()["a"], 1);
    }

    #[test]
    fn test_spec_fence_example() {
        let response = "Here is the result:\n```json\n{\"a\":1}\n```\nThanks";
        let json = extract_json(response).unwrap();
        assert_eq!(parse_json(&json).unwrap()["a"], 1);
    }

    #[test]
    fn test_no_json_found() {
        assert!(extract_json("This is just plain text with no JSON").is_err());
    }

    #[test]
    fn test_truncated_fence_runs_to_end() {
        let response = "```json\n{\"a\": 1}";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_json_rejects_non_object() {
        assert!(parse_json("[1, 2, 3]").is_err());
        assert!(parse_json("\"text\"").is_err());
    }
}
