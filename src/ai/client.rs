// src/ai/client.rs
use crate::ai::models::{build_request, parse_ai_output, AiOutput, AiSettings, ChatResponse};
use crate::utils::dom::plain_text;
use crate::utils::error::AiError;
use reqwest::header;

/// Creates a reqwest client whose requests give up after the configured timeout.
fn build_ai_client(settings: &AiSettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
}

/// Asks the configured provider to write FAQs for `document_html`.
///
/// This is the only outbound call in the crate. It is bounded by
/// `settings.timeout`, and dropping the returned future cancels it.
pub async fn generate_faqs(settings: &AiSettings, document_html: &str) -> Result<AiOutput, AiError> {
    let api_key = settings
        .api_key
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or(AiError::MissingApiKey)?;

    let content = plain_text(document_html);
    let content = content.split_whitespace().collect::<Vec<_>>().join(" ");
    let request = build_request(settings, &content);
    let url = settings.url();

    tracing::info!("Requesting FAQs from {:?} ({} chars of content)", settings.provider, content.len());
    tracing::debug!("Endpoint: {}, model: {}", url, settings.model);

    let client = build_ai_client(settings)?;
    let response = client
        .post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| timeout_or_network(e, settings))?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} from {}", status, url);
        return Err(AiError::Http(status));
    }

    let body: ChatResponse = response
        .json()
        .await
        .map_err(|e| timeout_or_network(e, settings))?;
    let output = body.first_content().ok_or(AiError::EmptyResponse)?;
    tracing::debug!("AI reply: {} bytes", output.len());

    Ok(parse_ai_output(output))
}

fn timeout_or_network(e: reqwest::Error, settings: &AiSettings) -> AiError {
    if e.is_timeout() {
        tracing::warn!("AI request exceeded {:?}", settings.timeout);
        AiError::Timeout(settings.timeout.as_secs())
    } else if e.is_decode() {
        AiError::Parse(e.to_string())
    } else {
        AiError::Network(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_api_key_fails_before_any_request() {
        let settings = AiSettings { api_key: None, ..AiSettings::default() };
        let result = tokio_test::block_on(generate_faqs(&settings, "<p>Article</p>"));
        assert!(matches!(result, Err(AiError::MissingApiKey)));

        let blank = AiSettings { api_key: Some("  ".to_string()), ..AiSettings::default() };
        let result = tokio_test::block_on(generate_faqs(&blank, "<p>Article</p>"));
        assert!(matches!(result, Err(AiError::MissingApiKey)));
    }

    fn mock_settings(server: &mockito::Server) -> AiSettings {
        AiSettings {
            api_key: Some("test-key".to_string()),
            endpoint: Some(format!("{}/v1/chat/completions", server.url())),
            ..AiSettings::default()
        }
    }

    #[test]
    fn test_error_status_maps_to_http() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":"rate limited"}"#)
            .create();

        let result = tokio_test::block_on(generate_faqs(&mock_settings(&server), "<p>Article</p>"));

        mock.assert();
        match result {
            Err(AiError::Http(status)) => assert_eq!(status.as_u16(), 429),
            other => panic!("expected Http(429), got {:?}", other),
        }
    }

    #[test]
    fn test_no_choices_maps_to_empty_response() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create();

        let result = tokio_test::block_on(generate_faqs(&mock_settings(&server), "<p>Article</p>"));
        assert!(matches!(result, Err(AiError::EmptyResponse)));
    }

    #[test]
    fn test_undecodable_body_maps_to_parse() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>gateway error</html>")
            .create();

        let result = tokio_test::block_on(generate_faqs(&mock_settings(&server), "<p>Article</p>"));
        assert!(matches!(result, Err(AiError::Parse(_))), "got {:?}", result);
    }

    #[test]
    fn test_structured_reply_becomes_items() {
        let reply = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "[{\"question\":\"What is it?\",\"answer\":\"A tool.\"}]"
                }
            }]
        });
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply.to_string())
            .create();

        let result = tokio_test::block_on(generate_faqs(&mock_settings(&server), "<p>Article</p>"));

        mock.assert();
        match result {
            Ok(AiOutput::Items(items)) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].question, "What is it?");
            }
            other => panic!("expected items, got {:?}", other),
        }
    }

    #[test]
    fn test_client_builds_with_timeout() {
        let settings = AiSettings { timeout: Duration::from_secs(5), ..AiSettings::default() };
        assert!(build_ai_client(&settings).is_ok());
    }
}
