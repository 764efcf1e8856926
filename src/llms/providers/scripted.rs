use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::llms::base_llm::{BaseLLM, CallOptions, LLMError, LLMMessage, LLMResponse};
use crate::types::usage_metrics::UsageMetrics;

/// A scripted LLM for tests. Returns pre-defined replies in order and records
/// every conversation it was sent.
#[derive(Debug)]
pub struct ScriptedLLM {
    replies: Vec<String>,
    index: AtomicUsize,
    pub calls: Mutex<Vec<(Vec<LLMMessage>, CallOptions)>>,
}

impl ScriptedLLM {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl BaseLLM for ScriptedLLM {
    fn model(&self) -> &str {
        "scripted"
    }

    fn provider(&self) -> &str {
        "test"
    }

    async fn acall(
        &self,
        messages: &[LLMMessage],
        options: &CallOptions,
    ) -> Result<LLMResponse, LLMError> {
        self.calls.lock().push((messages.to_vec(), options.clone()));
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let content = self.replies.get(i).cloned().ok_or_else(|| {
            LLMError::MalformedResponse(format!("ScriptedLLM: no more replies (called {} times)", i + 1))
        })?;
        Ok(LLMResponse {
            content,
            usage: UsageMetrics {
                total_tokens: 10,
                prompt_tokens: 7,
                completion_tokens: 3,
                successful_requests: 1,
                ..Default::default()
            },
        })
    }
}
