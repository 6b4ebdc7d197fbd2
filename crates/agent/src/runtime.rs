use std::sync::Arc;

use anyhow::{Context, Result};
use pizzabot_core::config::{AddressExtraction, AppConfig, IntentMode};
use pizzabot_core::dialogue::{
    DialogueEngine, DialogueServices, DialogueState, FewShotIntentDetector, IntentDetector,
    KeywordIntentDetector, TurnOutcome, GREETING,
};
use pizzabot_core::services::{AddressExtractor, InMemoryPizzaService, MenuSource};
use pizzabot_core::validation::RegexAddressExtractor;
use tracing::info;

use crate::entities::LlmAddressExtractor;
use crate::intent::LlmIntentClassifier;
use crate::llm::OpenAiCompatibleClient;
use crate::pizza_api::PizzaApiClient;

/// Wires the dialogue engine to its collaborators as configured.
#[derive(Clone)]
pub struct AgentRuntime {
    engine: DialogueEngine,
    menu: Arc<dyn MenuSource>,
}

impl AgentRuntime {
    pub fn new(engine: DialogueEngine, menu: Arc<dyn MenuSource>) -> Self {
        Self { engine, menu }
    }

    /// Talks to the pizza API over HTTP and, when configured, to the
    /// language model for intents and address extraction.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api = Arc::new(
            PizzaApiClient::from_config(&config.services)
                .context("failed to build pizza api client")?,
        );

        let llm = if config.uses_llm() {
            Some(
                OpenAiCompatibleClient::from_config(&config.llm)
                    .context("failed to build language model client")?,
            )
        } else {
            None
        };

        let intents: Arc<dyn IntentDetector> = match (config.dialogue.intent_mode, &llm) {
            (IntentMode::Llm, Some(client)) => Arc::new(FewShotIntentDetector::new(Arc::new(
                LlmIntentClassifier::new(client.clone()),
            ))),
            _ => Arc::new(keyword_intents(config)),
        };
        let address_extractor: Arc<dyn AddressExtractor> =
            match (config.dialogue.address_extraction, &llm) {
                (AddressExtraction::Llm, Some(client)) => {
                    Arc::new(LlmAddressExtractor::new(client.clone()))
                }
                _ => Arc::new(RegexAddressExtractor::new()),
            };

        let services = DialogueServices {
            menu: api.clone(),
            address_extractor,
            address_verifier: api.clone(),
            orders: api.clone(),
            intents,
        };
        let settings = config.dialogue.settings()?;

        info!(
            event_name = "agent.runtime.configured",
            pizza_api = %api.base_url(),
            intent_mode = ?config.dialogue.intent_mode,
            address_extraction = ?config.dialogue.address_extraction,
            "agent runtime configured"
        );
        Ok(Self::new(DialogueEngine::new(services, settings), api))
    }

    /// Keyword intents and regex addresses against an in-process pizza service.
    pub fn offline(config: &AppConfig, service: Arc<InMemoryPizzaService>) -> Result<Self> {
        let services = DialogueServices::in_memory(service.clone())
            .with_intents(Arc::new(keyword_intents(config)));
        let settings = config.dialogue.settings()?;
        info!(event_name = "agent.runtime.offline", "agent runtime configured for offline use");
        Ok(Self::new(DialogueEngine::new(services, settings), service))
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    pub fn menu_source(&self) -> Arc<dyn MenuSource> {
        self.menu.clone()
    }

    /// A fresh conversation and the greeting to show for it.
    pub fn start_conversation(&self) -> (DialogueState, String) {
        (self.engine.start(), GREETING.to_string())
    }

    pub async fn handle_turn(&self, state: &mut DialogueState, text: &str) -> TurnOutcome {
        self.engine.process_turn(state, text).await
    }
}

fn keyword_intents(config: &AppConfig) -> KeywordIntentDetector {
    KeywordIntentDetector::new(
        config.dialogue.order_keyword_set(),
        config.dialogue.description_keyword_set(),
    )
}
