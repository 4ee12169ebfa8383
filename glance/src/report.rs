//! Reporting of the model's answer.

use std::io::Write;

use tracing::debug;

use crate::chat::{ChatResponse, Choice};
use crate::error::{Error, LlmError, Result};

/// Get the first choice of a response.
///
/// # Errors
///
/// Returns [`LlmError::ResponseFormat`] if `choices` is empty.
pub fn first_choice(response: &ChatResponse) -> Result<&Choice> {
    response
        .choices
        .first()
        .ok_or_else(|| LlmError::response_format("at least one choice", "empty choices").into())
}

/// Write the representation of the first choice, followed by a newline.
///
/// # Errors
///
/// Fails if `choices` is empty or the writer fails.
pub fn report(response: &ChatResponse, out: &mut impl Write) -> Result<()> {
    let choice = first_choice(response)?;
    debug!(has_content = choice.content().is_some(), "reporting first choice");
    writeln!(out, "{choice:?}")
        .and_then(|()| out.flush())
        .map_err(Error::Output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ChatResponse {
        serde_json::from_str(json).expect("valid response")
    }

    #[test]
    fn test_report_prints_first_choice() {
        let response = response(
            r#"{"choices":[{"message":{"content":"a cat"}},{"message":{"content":"a dog"}}]}"#,
        );
        let mut out = Vec::new();
        report(&response, &mut out).expect("report should succeed");

        let printed = String::from_utf8(out).expect("utf-8");
        assert!(printed.contains("\"a cat\""));
        assert!(!printed.contains("a dog"));
        assert!(printed.ends_with('\n'));
        assert_eq!(printed.lines().count(), 1);
    }

    #[test]
    fn test_report_keeps_unmodelled_fields() {
        let response = response(
            r#"{"choices":[{"message":{"content":"a cat","tool_calls":[]},"logprobs":null}]}"#,
        );
        let mut out = Vec::new();
        report(&response, &mut out).expect("report should succeed");

        let printed = String::from_utf8(out).expect("utf-8");
        assert!(printed.contains("\"a cat\""));
        assert!(printed.contains("tool_calls"));
        assert!(printed.contains("logprobs"));
    }

    #[test]
    fn test_report_null_message() {
        let response = response(r#"{"choices":[{"message":null,"finish_reason":"stop"}]}"#);
        let mut out = Vec::new();
        report(&response, &mut out).expect("report should succeed");

        let printed = String::from_utf8(out).expect("utf-8");
        assert!(printed.contains("message: None"));
        assert!(printed.contains("finish_reason"));
    }

    #[test]
    fn test_report_empty_choices() {
        let response = response(r#"{"choices":[]}"#);
        let mut out = Vec::new();

        let err = report(&response, &mut out).expect_err("should fail");
        assert!(matches!(err, Error::Llm(LlmError::ResponseFormat { .. })));
        assert!(out.is_empty());
    }
}
