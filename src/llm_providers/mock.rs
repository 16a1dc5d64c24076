use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Scripted provider for tests, built with the `mock` feature.
///
/// Replies are handed out in order; once the script is exhausted the last
/// reply is repeated. Clones share the script and the call counter.
#[derive(Debug, Clone)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    last_reply: Arc<Mutex<Option<MockReply>>>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

impl MockProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(responses.into_iter().map(|r| MockReply::Text(r.into())))
    }

    /// A provider whose every call fails, as an unreachable service would
    pub fn failing(message: &str) -> Self {
        Self::scripted([MockReply::Failure(message.to_string())])
    }

    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            last_reply: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn make_request(&self, _system_message: Option<&str>, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        let reply = match next {
            Some(reply) => {
                if let Ok(mut last) = self.last_reply.lock() {
                    *last = Some(reply.clone());
                }
                Some(reply)
            }
            None => self.last_reply.lock().ok().and_then(|last| last.clone()),
        };

        debug!(provider = self.provider_name(), call = self.call_count(), "Serving scripted reply");

        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("Mock provider has no scripted replies")),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn provider_name(&self) -> &'static str {
        "Mock"
    }

    pub fn model_name(&self) -> &str {
        "scripted"
    }
}
