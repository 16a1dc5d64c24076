use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LLMConfig;
use crate::fallbacks::{fallback_problems, fallback_quiz, fallback_roadmap};
use crate::llm_providers::{LLMProvider, LLMProviderFactory, LLMProviderType};
use crate::models::{
    ContentSource, Generated, Problem, ProblemDraft, QuizQuestion, RoadmapPlan, ValidationResult,
};
use crate::prompts::{PromptRequest, build_prompt};
use crate::response_parser::{parse_problems, parse_quiz, parse_roadmap, parse_validation};

/// Prompt, call the model, normalize, and fall back where a default exists.
#[derive(Debug, Clone)]
pub struct LLMService {
    provider: LLMProvider,
}

impl LLMService {
    pub fn new_with_provider(
        api_key: String,
        base_url: Option<String>,
        provider_type: LLMProviderType,
        model: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        let provider =
            LLMProviderFactory::create_provider(provider_type, api_key, base_url, model, timeout);

        Self { provider }
    }

    pub fn from_config(config: &LLMConfig) -> Self {
        Self::new_with_provider(
            config.api_key.clone(),
            config.base_url.clone(),
            config.provider,
            config.model.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn from_provider(provider: LLMProvider) -> Self {
        Self { provider }
    }

    /// Get the provider name for logging and testing
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Get the model name being used
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Send a rendered prompt to the model and return its raw text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.provider.make_request(None, prompt).await
    }

    async fn generate_for(&self, request: &PromptRequest<'_>) -> Result<String> {
        let prompt = build_prompt(request);
        info!(
            kind = request.kind(),
            provider = self.provider_name(),
            model = self.model_name(),
            prompt_length = prompt.len(),
            "Requesting model generation"
        );

        let response_text = self.generate(&prompt).await?;
        debug!(
            kind = request.kind(),
            response_content = %response_text,
            "Raw LLM response"
        );

        Ok(response_text)
    }

    pub async fn generate_roadmap(&self, language: &str) -> Result<Generated<RoadmapPlan>> {
        let response_text = self.generate_for(&PromptRequest::Roadmap { language }).await?;

        match parse_roadmap(&response_text) {
            Ok(plan) => {
                info!(
                    language = %language,
                    sections = plan.sections.len(),
                    lessons = plan.lesson_count,
                    "Parsed generated roadmap"
                );
                Ok(Generated {
                    value: plan,
                    source: ContentSource::Model,
                })
            }
            Err(e) => {
                warn!(
                    language = %language,
                    error = %e,
                    "Roadmap response could not be parsed, using fallback roadmap"
                );
                Ok(Generated {
                    value: fallback_roadmap(language),
                    source: ContentSource::Fallback,
                })
            }
        }
    }

    pub async fn generate_problems(&self, topics: &[String]) -> Result<Generated<Vec<ProblemDraft>>> {
        let response_text = self.generate_for(&PromptRequest::Problems { topics }).await?;

        match parse_problems(&response_text) {
            Ok(problems) => {
                info!(count = problems.len(), "Parsed generated problems");
                Ok(Generated {
                    value: problems,
                    source: ContentSource::Model,
                })
            }
            Err(e) => {
                warn!(
                    topic_count = topics.len(),
                    error = %e,
                    "Problem response could not be parsed, using fallback problems"
                );
                Ok(Generated {
                    value: fallback_problems(),
                    source: ContentSource::Fallback,
                })
            }
        }
    }

    pub async fn generate_quiz(&self) -> Result<Generated<Vec<QuizQuestion>>> {
        let response_text = self.generate_for(&PromptRequest::Quiz).await?;

        let questions = parse_quiz(&response_text);
        if questions.is_empty() {
            warn!("Quiz response contained no complete questions, using fallback quiz");
            return Ok(Generated {
                value: fallback_quiz(),
                source: ContentSource::Fallback,
            });
        }

        info!(count = questions.len(), "Parsed generated quiz");
        Ok(Generated {
            value: questions,
            source: ContentSource::Model,
        })
    }

    pub async fn validate_solution(
        &self,
        problem: &Problem,
        user_solution: &str,
    ) -> Result<ValidationResult> {
        let response_text = self
            .generate_for(&PromptRequest::Validate {
                problem,
                user_solution,
            })
            .await?;

        let result = parse_validation(&response_text);
        info!(
            problem_id = %problem.id,
            verdict = ?result.verdict,
            "Evaluated user solution"
        );

        Ok(result)
    }

    pub async fn explain_subtopic(
        &self,
        course_title: &str,
        module_title: &str,
        subtopic: &str,
    ) -> Result<String> {
        self.generate_for(&PromptRequest::Explanation {
            course_title,
            module_title,
            subtopic,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_providers::MockProvider;
    use crate::models::{Difficulty, Verdict};

    fn service_with(responses: &[&str]) -> (LLMService, MockProvider) {
        let mock = MockProvider::new(responses.iter().copied());
        (
            LLMService::from_provider(LLMProvider::Mock(mock.clone())),
            mock,
        )
    }

    #[tokio::test]
    async fn test_roadmap_falls_back_on_garbage() {
        let (service, mock) = service_with(&["I cannot help with that."]);

        let generated = service.generate_roadmap("Go").await.unwrap();
        assert_eq!(generated.source, ContentSource::Fallback);
        assert_eq!(generated.value, fallback_roadmap("Go"));
        assert_eq!(mock.call_count(), 1);
        assert!(mock.prompts()[0].contains("learning roadmap for Go"));
    }

    #[tokio::test]
    async fn test_problems_from_model() {
        let (service, _mock) = service_with(&[
            r#"Here you go: [{"title":"T","difficulty":"Easy","category":"C","solution":"S","examplesList":[{"id":1,"input":"a","output":"b","explanation":"c"}]}]"#,
        ]);

        let generated = service.generate_problems(&["Loops".to_string()]).await.unwrap();
        assert_eq!(generated.source, ContentSource::Model);
        assert_eq!(generated.value.len(), 1);
        assert_eq!(generated.value[0].difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn test_empty_quiz_uses_fallback() {
        let (service, _mock) = service_with(&["QUESTION: unfinished"]);

        let generated = service.generate_quiz().await.unwrap();
        assert_eq!(generated.source, ContentSource::Fallback);
        assert_eq!(generated.value.len(), 5);
    }

    #[tokio::test]
    async fn test_model_failure_is_surfaced() {
        let service =
            LLMService::from_provider(LLMProvider::Mock(MockProvider::failing("connection refused")));

        let err = service.generate_quiz().await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_validation_garbled_text_is_incorrect() {
        let (service, _mock) = service_with(&["%%% garbled %%%"]);
        let problem = Problem {
            id: uuid::Uuid::new_v4(),
            user_id: uuid::Uuid::new_v4(),
            title: "T".to_string(),
            difficulty: Difficulty::Hard,
            solved: true,
            category: "Graphs".to_string(),
            solution: "S".to_string(),
            examples: Vec::new(),
            created_at: chrono::Utc::now(),
        };

        let result = service.validate_solution(&problem, "code").await.unwrap();
        assert_eq!(result.verdict, Verdict::Incorrect);
        assert_eq!(result.raw_text, "%%% garbled %%%");
    }

    #[test]
    fn test_configured_service_uses_the_selected_provider() {
        for (provider, name) in [
            (LLMProviderType::OpenAI, "OpenAI"),
            (LLMProviderType::Gemini, "Gemini"),
        ] {
            let config = LLMConfig {
                api_key: "test-key".to_string(),
                base_url: None,
                provider,
                model: None,
                timeout_secs: None,
            };
            assert_eq!(LLMService::from_config(&config).provider_name(), name);
        }
    }
}
