use httpmock::prelude::*;
use learning_platform::{LLMProviderFactory, LLMProviderType, LLMService};
use serde_json::json;
use std::time::Duration;

fn provider_for(server: &MockServer, provider_type: LLMProviderType) -> LLMService {
    LLMService::from_provider(LLMProviderFactory::create_provider(
        provider_type,
        "test-key".to_string(),
        Some(server.base_url()),
        None,
        Some(Duration::from_secs(5)),
    ))
}

#[tokio::test]
async fn test_openai_chat_completion() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer test-key")
                .body_contains("gpt-4o-mini")
                .body_contains("Explain borrowing");
            then.status(200).json_body(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "Borrowing is temporary access."}}
                ]
            }));
        })
        .await;

    let service = provider_for(&server, LLMProviderType::OpenAI);
    assert_eq!(service.provider_name(), "OpenAI");
    assert_eq!(service.model_name(), "gpt-4o-mini");

    let reply = service.generate("Explain borrowing").await.unwrap();
    assert_eq!(reply, "Borrowing is temporary access.");
    completion.assert_async().await;
}

#[tokio::test]
async fn test_openai_error_status_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        })
        .await;

    let service = provider_for(&server, LLMProviderType::OpenAI);
    let err = service.generate("anything").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("429"), "{}", message);
    assert!(message.contains("rate limited"), "{}", message);
}

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/gemini-2.0-flash:generateContent")
                .query_param("key", "test-key")
                .body_contains("maxOutputTokens")
                .body_contains("Name three goroutine patterns");
            then.status(200).json_body(json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Fan-in, fan-out, pipelines."}]}}
                ]
            }));
        })
        .await;

    let service = provider_for(&server, LLMProviderType::Gemini);
    assert_eq!(service.provider_name(), "Gemini");

    let reply = service.generate("Name three goroutine patterns").await.unwrap();
    assert_eq!(reply, "Fan-in, fan-out, pipelines.");
    generate.assert_async().await;
}

#[tokio::test]
async fn test_gemini_without_candidates_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/models/gemini-2.0-flash:generateContent");
            then.status(200).json_body(json!({ "promptFeedback": {"blockReason": "SAFETY"} }));
        })
        .await;

    let service = provider_for(&server, LLMProviderType::Gemini);
    let err = service.generate("blocked prompt").await.unwrap_err();
    assert!(err.to_string().contains("No candidates"), "{}", err);
}

#[tokio::test]
async fn test_gemini_roadmap_generation_end_to_end() {
    let roadmap = r##"```json
{"name": "SQL Fundamentals", "icon": "🗄️", "color": "#336791", "description": "Query data.",
 "roadmap": [{"title": "Select", "description": "Reading", "modules": [
   {"name": "WHERE", "completed": false, "description": "Filtering"}]}]}
```"##;
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/gemini-2.0-flash:generateContent")
                .body_contains("SQL");
            then.status(200).json_body(json!({
                "candidates": [{"content": {"parts": [{"text": roadmap}]}}]
            }));
        })
        .await;

    let service = provider_for(&server, LLMProviderType::Gemini);
    let generated = service.generate_roadmap("SQL").await.unwrap();
    assert_eq!(generated.value.name, "SQL Fundamentals");
    assert_eq!(generated.value.lesson_count, 1);
}

#[tokio::test]
async fn test_unreachable_service_is_an_error() {
    let service = LLMService::from_provider(LLMProviderFactory::create_provider(
        LLMProviderType::OpenAI,
        "test-key".to_string(),
        Some("http://127.0.0.1:1".to_string()),
        None,
        Some(Duration::from_secs(2)),
    ));

    assert!(service.generate_quiz().await.is_err());
}
