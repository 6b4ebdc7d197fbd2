use async_trait::async_trait;
use pizzabot_core::services::{IntentClassifier, IntentExample, ServiceError};
use tracing::debug;

use crate::llm::LlmClient;

const SYSTEM_PROMPT: &str = "You are an intent classifier for a pizza ordering assistant. \
You are given labelled examples and one new text. Decide whether the new text expresses the \
same intent as the examples labelled `yes`. Answer with exactly one word: yes or no.";

/// Few-shot yes/no intent classification through a language model.
pub struct LlmIntentClassifier<C> {
    client: C,
}

impl<C> LlmIntentClassifier<C>
where
    C: LlmClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

fn build_prompt(text: &str, examples: &[IntentExample]) -> String {
    let mut prompt = String::from("Examples:\n");
    for example in examples {
        let label = if example.matches { "yes" } else { "no" };
        prompt.push_str(&format!("Text: {}\nAnswer: {label}\n", example.text));
    }
    prompt.push_str(&format!("\nText: {text}\nAnswer:"));
    prompt
}

fn parse_answer(answer: &str) -> Result<bool, ServiceError> {
    let normalized = answer
        .trim()
        .trim_start_matches(|ch: char| !ch.is_alphanumeric())
        .to_ascii_lowercase();
    if normalized.starts_with("yes") {
        Ok(true)
    } else if normalized.starts_with("no") {
        Ok(false)
    } else {
        Err(ServiceError::InvalidResponse(format!("expected yes or no, got `{}`", answer.trim())))
    }
}

#[async_trait]
impl<C> IntentClassifier for LlmIntentClassifier<C>
where
    C: LlmClient,
{
    async fn classify(&self, text: &str, examples: &[IntentExample]) -> Result<bool, ServiceError> {
        let answer = self
            .client
            .complete(SYSTEM_PROMPT, &build_prompt(text, examples))
            .await
            .map_err(|error| ServiceError::Transport(error.to_string()))?;
        let detected = parse_answer(&answer)?;
        debug!(event_name = "agent.intent.classified", detected, "intent classified");
        Ok(detected)
    }
}
