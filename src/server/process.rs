use axum::http::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ProcessError;
use crate::providers::{Provider, ProviderUsage};
use crate::translations::{self, Mode, TranslateOptions};

use super::models::{ProcessRequest, ProcessResponse};
use super::state::ServerState;

/// Runs one request and converts every outcome into a response payload.
pub async fn handle_request<P: Provider + Clone>(
    state: &ServerState<P>,
    request: ProcessRequest,
) -> (StatusCode, ProcessResponse) {
    match process_request(state, request).await {
        Ok(data) => (StatusCode::OK, ProcessResponse::ok(data)),
        Err(err) => failure_response(state, &err),
    }
}

pub(crate) fn failure_response<P: Provider + Clone>(
    state: &ServerState<P>,
    err: &ProcessError,
) -> (StatusCode, ProcessResponse) {
    let status = err.status(state.provider_failure_status);
    if err.is_validation() {
        debug!("rejected request: {}", err);
    }
    (status, ProcessResponse::failure(state.locale.message(err)))
}

/// Validates the request, builds the prompt for its mode and returns the
/// provider's completion text untouched.
pub async fn process_request<P: Provider + Clone>(
    state: &ServerState<P>,
    request: ProcessRequest,
) -> Result<String, ProcessError> {
    let (Some(text), Some(input_language), Some(output_language), Some(mode)) = (
        present(request.text),
        present(request.input_language),
        present(request.output_language),
        present(request.mode),
    ) else {
        return Err(ProcessError::MissingParameter);
    };

    let key = present(request.key)
        .or_else(|| state.default_key.clone())
        .ok_or(ProcessError::MissingCredential)?;

    let data: Value = serde_json::from_str(&text).map_err(ProcessError::InvalidJson)?;

    if !Mode::is_known(&mode) {
        warn!("unknown mode '{}', falling back to translate", mode);
    }
    let mode = Mode::from_wire(&mode);
    let options = TranslateOptions {
        input_language,
        output_language,
    };
    let prompt = translations::build_prompt(mode, &options, &data)
        .map_err(ProcessError::ProviderFailure)?;

    info!(
        "{} {} -> {}",
        mode.as_str(),
        options.input_language,
        options.output_language
    );
    let response = state
        .translator
        .exec(key, prompt)
        .await
        .map_err(|err| {
            warn!("completion provider failed: {:#}", err);
            ProcessError::ProviderFailure(err)
        })?;
    debug!(
        "completion received from {} ({} bytes, {})",
        response.model.as_deref().unwrap_or("unknown model"),
        response.text.len(),
        format_usage(response.usage.as_ref())
    );
    Ok(response.text)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn format_usage(usage: Option<&ProviderUsage>) -> String {
    let Some(usage) = usage else {
        return "tokens: unavailable".to_string();
    };
    let total = usage.total_tokens.or_else(|| {
        usage
            .prompt_tokens
            .zip(usage.completion_tokens)
            .map(|(prompt, completion)| prompt + completion)
    });

    let mut parts = Vec::new();
    if let Some(prompt) = usage.prompt_tokens {
        parts.push(format!("prompt={}", prompt));
    }
    if let Some(completion) = usage.completion_tokens {
        parts.push(format!("completion={}", completion));
    }
    if let Some(total) = total {
        parts.push(format!("total={}", total));
    }

    if parts.is_empty() {
        "tokens: unavailable".to_string()
    } else {
        format!("tokens: {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Locale;
    use crate::providers::MessageRole;
    use crate::test_util::RecordingProvider;
    use serde_json::json;

    fn request(text: &str, mode: &str) -> ProcessRequest {
        ProcessRequest {
            text: Some(text.to_string()),
            input_language: Some("de".to_string()),
            output_language: Some("en".to_string()),
            mode: Some(mode.to_string()),
            key: None,
        }
    }

    fn state(provider: RecordingProvider) -> ServerState<RecordingProvider> {
        ServerState::new(provider, Some("sk-default".to_string()))
    }

    #[tokio::test]
    async fn missing_parameters_are_rejected_before_calling_provider() {
        let provider = RecordingProvider::replying("unused");
        let state = state(provider.clone());
        let complete = request(r#"{"hello":"Hallo"}"#, "translate");

        let mut variants = Vec::new();
        let mut missing_text = complete.clone();
        missing_text.text = Some(String::new());
        variants.push(missing_text);
        let mut missing_input = complete.clone();
        missing_input.input_language = None;
        variants.push(missing_input);
        let mut missing_output = complete.clone();
        missing_output.output_language = Some(String::new());
        variants.push(missing_output);
        let mut missing_mode = complete.clone();
        missing_mode.mode = None;
        variants.push(missing_mode);

        for variant in variants {
            let (status, response) = handle_request(&state, variant).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                response,
                ProcessResponse::failure("Please provide all required parameters")
            );
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_is_rejected() {
        let provider = RecordingProvider::replying("unused");
        let state = ServerState::new(provider.clone(), None);
        let (status, response) =
            handle_request(&state, request(r#"{"hello":"Hallo"}"#, "translate")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.as_deref(), Some("Please provide an OpenAI API key"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_request_key_does_not_count_as_credential() {
        let provider = RecordingProvider::replying("unused");
        let state = ServerState::new(provider.clone(), Some("   ".to_string()));
        let mut req = request(r#"{"hello":"Hallo"}"#, "translate");
        req.key = Some(String::new());
        let err = process_request(&state, req).await.unwrap_err();
        assert!(matches!(err, ProcessError::MissingCredential));
    }

    #[tokio::test]
    async fn presence_is_checked_before_credential() {
        let state = ServerState::new(RecordingProvider::replying("unused"), None);
        let err = process_request(&state, ProcessRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::MissingParameter));
    }

    #[tokio::test]
    async fn credential_is_checked_before_json_parse() {
        let provider = RecordingProvider::replying("unused");
        let state = ServerState::new(provider.clone(), None);
        let err = process_request(&state, request("{bad", "translate"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::MissingCredential));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn padded_mode_is_not_fill_empty() {
        let provider = RecordingProvider::replying("{}");
        let state = state(provider.clone());
        process_request(&state, request("{}", " fillEmpty "))
            .await
            .unwrap();
        let calls = provider.calls();
        assert_eq!(calls[0].messages[0].content, "Translate the following text to en");
        assert!(calls[0].messages[1].content.contains("\"data\""));
    }

    #[tokio::test]
    async fn nesting_beyond_parser_limit_is_invalid_json() {
        let provider = RecordingProvider::replying("unused");
        let state = state(provider.clone());
        let text = format!("{}{}", "[".repeat(200), "]".repeat(200));
        let err = process_request(&state, request(&text, "translate"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidJson(_)));
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn usage_is_summarized_for_logging() {
        let usage = ProviderUsage {
            prompt_tokens: Some(57),
            completion_tokens: Some(17),
            total_tokens: None,
        };
        assert_eq!(
            format_usage(Some(&usage)),
            "tokens: prompt=57, completion=17, total=74"
        );
        assert_eq!(format_usage(None), "tokens: unavailable");
        let empty = ProviderUsage {
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
        };
        assert_eq!(format_usage(Some(&empty)), "tokens: unavailable");
    }

    #[tokio::test]
    async fn invalid_json_is_rejected_before_calling_provider() {
        let provider = RecordingProvider::replying("unused");
        let state = state(provider.clone());
        for text in ["{bad", "not json"] {
            let (status, response) = handle_request(&state, request(text, "translate")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response.error.as_deref(), Some("Invalid JSON format"));
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn translate_sends_system_then_user_message() {
        let provider = RecordingProvider::replying(r#"{"hello":"Hello"}"#);
        let state = state(provider.clone());
        let (status, response) =
            handle_request(&state, request(r#"{"hello":"Hallo"}"#, "translate")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, ProcessResponse::ok(r#"{"hello":"Hello"}"#.to_string()));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.key, "sk-default");
        assert_eq!(call.messages.len(), 2);
        assert_eq!(call.messages[0].role, MessageRole::System);
        assert!(call.messages[0].content.contains("en"));
        assert_eq!(call.messages[1].role, MessageRole::User);

        let user: Value = serde_json::from_str(&call.messages[1].content).unwrap();
        assert_eq!(
            user,
            json!({"inputLanguage": "de", "outputLanguage": "en", "data": {"hello": "Hallo"}})
        );
    }

    #[tokio::test]
    async fn fill_empty_wraps_parsed_object_under_keys() {
        let provider = RecordingProvider::replying(r#"{"hello":"Hallo","world":"Welt"}"#);
        let state = state(provider.clone());
        let mut req = request(r#"{"hello": "", "world": "Welt"}"#, "fillEmpty");
        req.input_language = Some("en".to_string());
        req.output_language = Some("de".to_string());
        let data = process_request(&state, req).await.unwrap();
        assert_eq!(data, r#"{"hello":"Hallo","world":"Welt"}"#);

        let calls = provider.calls();
        let user: Value = serde_json::from_str(&calls[0].messages[1].content).unwrap();
        assert_eq!(user["keyLanguage"], "en");
        assert_eq!(user["outputLanguage"], "de");
        assert_eq!(user["keys"], json!({"hello": "", "world": "Welt"}));
        assert!(calls[0].messages[0].content.contains("fills in the blanks"));
    }

    #[tokio::test]
    async fn unknown_mode_falls_back_to_translate() {
        let provider = RecordingProvider::replying("{}");
        let state = state(provider.clone());
        process_request(&state, request("{}", "summarize"))
            .await
            .unwrap();
        let calls = provider.calls();
        assert_eq!(calls[0].messages[0].content, "Translate the following text to en");
    }

    #[tokio::test]
    async fn request_key_overrides_default() {
        let provider = RecordingProvider::replying("{}");
        let state = state(provider.clone());
        let mut req = request("{}", "translate");
        req.key = Some("sk-request".to_string());
        process_request(&state, req).await.unwrap();
        assert_eq!(provider.calls()[0].key, "sk-request");
    }

    #[tokio::test]
    async fn provider_output_is_relayed_verbatim() {
        let raw = "Sure! Here you go:\n{\"hello\": \"Hello\"}";
        let state = state(RecordingProvider::replying(raw));
        let (_, response) =
            handle_request(&state, request(r#"{"hello":"Hallo"}"#, "translate")).await;
        assert_eq!(response.data.as_deref(), Some(raw));
    }

    #[tokio::test]
    async fn provider_failure_is_collapsed_into_generic_message() {
        let provider = RecordingProvider::failing("OpenAI API error (401): invalid_api_key");
        let state = state(provider.clone());
        let (status, response) =
            handle_request(&state, request(r#"{"hello":"Hallo"}"#, "translate")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response,
            ProcessResponse::failure(
                "The request could not be processed. The API key may be invalid."
            )
        );
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_status_and_locale_are_configurable() {
        let state = state(RecordingProvider::failing("timeout"))
            .with_locale(Locale::Turkish)
            .with_provider_failure_status(StatusCode::BAD_GATEWAY);
        let (status, response) = handle_request(&state, request("{}", "translate")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.error.as_deref(),
            Some("İstek işlenemedi. API anahtarı geçersiz olabilir.")
        );
    }
}
