//! Stage schemas and the validated LLM call.
//!
//! Every LLM-backed stage expects a specific JSON shape. This module checks
//! that shape after extraction instead of trusting the model, and factors
//! the shared retry-then-give-up policy into one place: each call gets
//! exactly one corrective retry with an augmented prompt before the stage's
//! own failure policy applies.

use crate::extraction::{extract_json, parse_json};
use serde::de::DeserializeOwned;
use slidesmith_core::GenerateRequest;
use slidesmith_error::{ResponseError, SlidesmithError, SlidesmithErrorKind};
use slidesmith_interface::{SlideDriver, Stage};
use std::time::Duration;

/// Expected response shape for one pipeline stage.
pub(crate) trait StageSchema: DeserializeOwned {
    /// The stage this schema belongs to.
    const STAGE: Stage;

    /// Top-level keys that must be present in the parsed object.
    fn required_keys() -> &'static [&'static str];

    /// Semantic checks beyond key presence (e.g. non-empty sequences).
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Extract, parse and validate a stage response.
///
/// # Errors
///
/// `MalformedResponse` when no JSON object can be extracted or parsed;
/// `SchemaViolation` when required keys are absent, the shape mismatches,
/// or a semantic check fails.
pub(crate) fn parse_stage<T: StageSchema>(raw: &str) -> Result<T, ResponseError> {
    let json = extract_json(raw)?;
    let value = parse_json(&json)?;

    let object = value
        .as_object()
        .ok_or_else(|| ResponseError::malformed("expected a JSON object"))?;

    let missing: Vec<&str> = T::required_keys()
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();

    if !missing.is_empty() {
        return Err(ResponseError::schema(format!(
            "missing required keys: {}",
            missing.join(", ")
        )));
    }

    let parsed: T = serde_json::from_value(value)
        .map_err(|e| ResponseError::schema(format!("shape mismatch: {}", e)))?;

    parsed.check().map_err(ResponseError::schema)?;

    Ok(parsed)
}

/// One prompt/response exchange, kept for run traces.
#[derive(Debug, Clone)]
pub(crate) struct Attempt {
    pub prompt: String,
    pub response: String,
}

/// A successful validated call with its attempt history.
pub(crate) struct CallOutcome<T> {
    pub value: T,
    pub attempts: Vec<Attempt>,
}

/// A failed validated call with its attempt history.
pub(crate) struct CallFailure {
    pub error: SlidesmithError,
    pub attempts: Vec<Attempt>,
}

/// Invoke the driver once and parse the response against the stage schema.
async fn attempt_once<T, D>(
    driver: &D,
    request: &GenerateRequest,
    call_timeout: Duration,
    extra_check: &impl Fn(&T) -> Result<(), String>,
) -> (Attempt, Result<T, SlidesmithError>)
where
    T: StageSchema,
    D: SlideDriver + ?Sized,
{
    let response = match tokio::time::timeout(call_timeout, driver.generate(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            let attempt = Attempt {
                prompt: request.prompt.clone(),
                response: String::new(),
            };
            return (attempt, Err(e));
        }
        Err(_) => {
            // A timed-out call follows the same retry path as a parse failure.
            let attempt = Attempt {
                prompt: request.prompt.clone(),
                response: String::new(),
            };
            let err = ResponseError::malformed(format!(
                "call exceeded the {}s deadline",
                call_timeout.as_secs()
            ));
            return (attempt, Err(err.into()));
        }
    };

    let attempt = Attempt {
        prompt: request.prompt.clone(),
        response: response.text.clone(),
    };

    let result = parse_stage::<T>(&response.text)
        .and_then(|value| match extra_check(&value) {
            Ok(()) => Ok(value),
            Err(message) => Err(ResponseError::schema(message)),
        })
        .map_err(SlidesmithError::from);

    (attempt, result)
}

/// Invoke the driver with schema validation and a single corrective retry.
///
/// On the first failure the prompt is re-sent with `corrective(error)`
/// appended; a second failure is returned to the caller together with the
/// attempt history so the stage can apply its own failure policy.
#[tracing::instrument(skip_all, fields(stage = %T::STAGE, prompt_length = base.prompt.len()))]
pub(crate) async fn validated_call<T, D>(
    driver: &D,
    base: &GenerateRequest,
    call_timeout: Duration,
    extra_check: impl Fn(&T) -> Result<(), String>,
    corrective: impl Fn(&str) -> String,
) -> Result<CallOutcome<T>, CallFailure>
where
    T: StageSchema,
    D: SlideDriver + ?Sized,
{
    let mut attempts = Vec::with_capacity(2);

    let (attempt, result) = attempt_once(driver, base, call_timeout, &extra_check).await;
    attempts.push(attempt);

    let first_error = match result {
        Ok(value) => return Ok(CallOutcome { value, attempts }),
        Err(e) => e,
    };

    // A corrective prompt can only fix what the model said, not how the
    // call transport failed.
    let retryable = matches!(
        first_error.kind(),
        SlidesmithErrorKind::Response(r) if r.kind.is_retryable()
    );
    if !retryable {
        tracing::error!(stage = %T::STAGE, error = %first_error, "Stage call failed");
        return Err(CallFailure {
            error: first_error,
            attempts,
        });
    }

    let error_text = first_error.to_string();
    tracing::warn!(
        stage = %T::STAGE,
        error = %error_text,
        "Stage call failed, retrying once with corrective instruction"
    );

    let retry = GenerateRequest {
        prompt: format!("{}\n\n{}", base.prompt, corrective(&error_text)),
        ..base.clone()
    };

    let (attempt, result) = attempt_once(driver, &retry, call_timeout, &extra_check).await;
    attempts.push(attempt);

    match result {
        Ok(value) => Ok(CallOutcome { value, attempts }),
        Err(error) => {
            tracing::error!(
                stage = %T::STAGE,
                error = %error,
                "Stage call failed after corrective retry"
            );
            Err(CallFailure { error, attempts })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        name: String,
        #[serde(default)]
        values: Vec<String>,
    }

    impl StageSchema for Probe {
        const STAGE: Stage = Stage::Analyze;

        fn required_keys() -> &'static [&'static str] {
            &["name"]
        }

        fn check(&self) -> Result<(), String> {
            if self.name.is_empty() {
                return Err("name must be non-empty".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn test_parse_stage_happy_path() {
        let probe: Probe = parse_stage(r#"{"name": "x", "values": ["a"]}"#).unwrap();
        assert_eq!(probe.name, "x");
        assert_eq!(probe.values, vec!["a"]);
    }

    #[test]
    fn test_parse_stage_missing_key_is_schema_violation() {
        let err = parse_stage::<Probe>(r#"{"values": []}"#).unwrap_err();
        assert!(err.to_string().contains("missing required keys: name"));
    }

    #[test]
    fn test_parse_stage_semantic_check() {
        let err = parse_stage::<Probe>(r#"{"name": ""}"#).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn test_parse_stage_no_json_is_malformed() {
        let err = parse_stage::<Probe>("no json at all").unwrap_err();
        assert!(err.to_string().contains("Malformed"));
    }
}
