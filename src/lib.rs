pub mod logging;

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod fallbacks;
pub mod learning_service;
pub mod llm_providers;
pub mod llm_service;
pub mod models;
pub mod prompts;
pub mod response_parser;

pub use database::Database;
pub use errors::*;
pub use learning_service::LearningService;
pub use llm_providers::{LLMProvider, LLMProviderFactory, LLMProviderType};
#[cfg(any(test, feature = "mock"))]
pub use llm_providers::{MockProvider, MockReply};
pub use llm_service::LLMService;
pub use models::*;
