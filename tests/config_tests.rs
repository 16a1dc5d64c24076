use learning_platform::{
    config::{Config, LLMConfig},
    LLMProviderType, LLMService,
};
use std::env;
use std::sync::Mutex;

// Every test here rewrites process-wide environment variables
static ENV_LOCK: Mutex<()> = Mutex::new(());

const LLM_VARS: [&str; 5] = [
    "LLM_PROVIDER",
    "LLM_MODEL",
    "LLM_API_KEY",
    "LLM_BASE_URL",
    "LLM_TIMEOUT_SECS",
];

fn clear_llm_env() {
    for var in LLM_VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
fn test_provider_string_parsing() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let test_cases = vec![
        ("openai", LLMProviderType::OpenAI),
        ("ChatGPT", LLMProviderType::OpenAI),
        ("GPT", LLMProviderType::OpenAI),
        ("gemini", LLMProviderType::Gemini),
        ("Google", LLMProviderType::Gemini),
        // Unknown names fall back to the default provider
        ("claude", LLMProviderType::Gemini),
        ("", LLMProviderType::Gemini),
    ];

    for (input, expected) in test_cases {
        clear_llm_env();
        unsafe { env::set_var("LLM_PROVIDER", input) };

        let config = LLMConfig::from_env().unwrap();
        assert_eq!(config.provider, expected, "Input '{}' should map to {:?}", input, expected);
    }

    clear_llm_env();
}

#[test]
fn test_model_defaults_follow_provider() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_llm_env();

    let config = LLMConfig::from_env().unwrap();
    assert_eq!(config.provider, LLMProviderType::Gemini);
    assert_eq!(config.model.as_deref(), Some("gemini-2.0-flash"));
    assert_eq!(config.timeout_secs, None);

    unsafe {
        env::set_var("LLM_PROVIDER", "openai");
        env::set_var("LLM_API_KEY", "sk-test");
    }
    let config = LLMConfig::from_env().unwrap();
    assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));

    let service = LLMService::from_config(&config);
    assert_eq!(service.provider_name(), "OpenAI");
    assert_eq!(service.model_name(), "gpt-4o-mini");

    unsafe { env::set_var("LLM_MODEL", "gpt-4.1") };
    let config = LLMConfig::from_env().unwrap();
    assert_eq!(LLMService::from_config(&config).model_name(), "gpt-4.1");

    clear_llm_env();
}

#[test]
fn test_full_config_round_trip() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_llm_env();
    unsafe {
        env::set_var("DATABASE_URL", "sqlite::memory:");
        env::set_var("PORT", "8080");
        env::set_var("LLM_TIMEOUT_SECS", "30");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.llm.timeout_secs, Some(30));
    assert!(config.validate().is_ok());

    unsafe { env::set_var("DATABASE_URL", "postgres://localhost/learning") };
    let config = Config::from_env().unwrap();
    assert!(config.validate().is_err());

    unsafe {
        env::remove_var("DATABASE_URL");
        env::remove_var("PORT");
    }
    clear_llm_env();
}

#[test]
fn test_invalid_timeout_is_rejected() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_llm_env();

    unsafe { env::set_var("LLM_TIMEOUT_SECS", "soon") };
    assert!(LLMConfig::from_env().is_err());

    clear_llm_env();
}
