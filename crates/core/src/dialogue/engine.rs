use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::dialogue::checker::Checker;
use crate::dialogue::description::DescriptionNode;
use crate::dialogue::intent::{IntentDetector, KeywordIntentDetector};
use crate::dialogue::order_node::OrderNode;
use crate::dialogue::retrieval::retrieve;
use crate::dialogue::router::{route, Route};
use crate::dialogue::slots::SlotCatalog;
use crate::dialogue::state::DialogueState;
use crate::services::{
    AddressExtractor, AddressVerifier, InMemoryPizzaService, MenuSource, OrderSubmitter,
};
use crate::validation::{
    AddressValidator, ConfirmationMatcher, KeywordSet, PizzaNameValidator, RegexAddressExtractor,
    DEFAULT_MATCH_THRESHOLD,
};

pub const GREETING: &str =
    "Hi! I am a pizza bot. I can help you order a pizza. What would you like to order?";

/// External capabilities one engine talks to.
#[derive(Clone)]
pub struct DialogueServices {
    pub menu: Arc<dyn MenuSource>,
    pub address_extractor: Arc<dyn AddressExtractor>,
    pub address_verifier: Arc<dyn AddressVerifier>,
    pub orders: Arc<dyn OrderSubmitter>,
    pub intents: Arc<dyn IntentDetector>,
}

impl DialogueServices {
    /// Keyword intents, regex addresses and an in-process pizza service.
    pub fn in_memory(service: Arc<InMemoryPizzaService>) -> Self {
        Self {
            menu: service.clone(),
            address_extractor: Arc::new(RegexAddressExtractor::new()),
            address_verifier: service.clone(),
            orders: service,
            intents: Arc::new(KeywordIntentDetector::default()),
        }
    }

    pub fn with_intents(mut self, intents: Arc<dyn IntentDetector>) -> Self {
        self.intents = intents;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueSettings {
    pub catalog: SlotCatalog,
    pub match_threshold: u8,
    pub confirm_keywords: KeywordSet,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            catalog: SlotCatalog::default(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            confirm_keywords: KeywordSet::new(["yes"]),
        }
    }
}

/// What one user turn produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub route: Route,
    /// Assistant texts appended during this turn, in order.
    pub messages: Vec<String>,
    pub ended: bool,
    pub order_id: Option<String>,
}

/// The per-conversation state machine. Holds no conversation state itself, so
/// one engine serves any number of concurrent conversations.
#[derive(Clone)]
pub struct DialogueEngine {
    checker: Checker,
    description: DescriptionNode,
    order_node: OrderNode,
}

impl DialogueEngine {
    pub fn new(services: DialogueServices, settings: DialogueSettings) -> Self {
        let pizza = PizzaNameValidator::new(services.menu.clone(), settings.match_threshold);
        let address =
            AddressValidator::new(services.address_extractor, services.address_verifier);
        let checker = Checker::new(
            services.intents,
            pizza,
            address,
            ConfirmationMatcher::new(settings.confirm_keywords),
        );

        Self {
            checker,
            description: DescriptionNode::new(services.menu),
            order_node: OrderNode::new(settings.catalog, services.orders),
        }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        self.order_node.catalog()
    }

    /// Fresh conversation state carrying the greeting.
    pub fn start(&self) -> DialogueState {
        let mut state = DialogueState::new();
        state.say(GREETING);
        state
    }

    pub async fn process_turn(&self, state: &mut DialogueState, utterance: &str) -> TurnOutcome {
        if state.ended {
            return TurnOutcome {
                route: Route::Terminate,
                messages: Vec::new(),
                ended: true,
                order_id: state.order_id.clone(),
            };
        }

        let mark = state.transcript.len();
        state.last_user_input = utterance.to_string();

        let checked = self.checker.check(state, utterance).await;
        let next = route(state);
        match next {
            Route::Description => self.description.describe(state).await,
            Route::Retrieval => {
                retrieve(state, utterance);
                self.order_node.advance(state).await;
            }
            Route::Terminate => {}
        }

        let outcome = TurnOutcome {
            route: next,
            messages: state.assistant_messages_since(mark),
            ended: state.ended,
            order_id: state.order_id.clone(),
        };
        info!(
            event_name = "dialogue.turn.completed",
            check = ?checked,
            route = next.as_str(),
            messages = outcome.messages.len(),
            ended = outcome.ended,
            "dialogue turn completed"
        );
        outcome
    }

    /// Feeds utterances one turn at a time until the conversation ends or the
    /// input runs out.
    pub async fn run<I, S>(&self, state: &mut DialogueState, utterances: I) -> Vec<TurnOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcomes = Vec::new();
        for utterance in utterances {
            if state.ended {
                break;
            }
            outcomes.push(self.process_turn(state, utterance.as_ref()).await);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{DialogueEngine, DialogueServices, DialogueSettings, GREETING};
    use crate::dialogue::checker::{INVALID_ADDRESS_MESSAGE, NO_ORDER_INTENT_MESSAGE};
    use crate::dialogue::fixtures::{engine_with, menu_service};
    use crate::dialogue::order_node::{COMPLETION_MESSAGE, SUBMISSION_FAILED_MESSAGE};
    use crate::dialogue::router::Route;
    use crate::dialogue::slots::SlotId;
    use crate::dialogue::state::DialogueState;
    use crate::domain::menu::PizzaId;
    use crate::domain::order::{DeliveryAddress, OrderReceipt, OrderRequest, OrderStatus};
    use crate::services::{OrderSubmitter, ServiceError};

    struct FixedReceipt;

    #[async_trait]
    impl OrderSubmitter for FixedReceipt {
        async fn create_order(&self, _request: &OrderRequest) -> Result<OrderReceipt, ServiceError> {
            Ok(OrderReceipt { order_id: "abc123".to_string(), status: OrderStatus::Received })
        }
    }

    #[tokio::test]
    async fn start_greets_without_awaiting_anything() {
        let engine = engine_with(menu_service());
        let state = engine.start();

        assert_eq!(state.last_assistant_message(), Some(GREETING));
        assert_eq!(state.awaiting_slot, None);
        assert!(!state.active_order);
    }

    #[tokio::test]
    async fn order_intent_routes_to_retrieval_and_asks_for_pizza() {
        let engine = engine_with(menu_service());
        let mut state = engine.start();

        let outcome = engine.process_turn(&mut state, "I want to order a pizza").await;

        assert_eq!(outcome.route, Route::Retrieval);
        assert!(state.active_order);
        assert_eq!(outcome.messages, vec![SlotId::PizzaName.prompt().to_string()]);
        assert_eq!(state.awaiting_slot, Some(SlotId::PizzaName));
        assert_eq!(state.last_user_input, "I want to order a pizza");
    }

    #[tokio::test]
    async fn non_order_chatter_repeats_entry_rejection() {
        let engine = engine_with(menu_service());
        let mut state = engine.start();

        for _ in 0..2 {
            let outcome = engine.process_turn(&mut state, "hello there").await;
            assert_eq!(outcome.route, Route::Terminate);
            assert_eq!(outcome.messages, vec![NO_ORDER_INTENT_MESSAGE.to_string()]);
            assert!(!outcome.ended);
        }
        assert!(state.slots.is_empty());
    }

    #[tokio::test]
    async fn full_conversation_places_order() {
        let service = menu_service();
        let engine = engine_with(service.clone());
        let mut state = engine.start();

        let outcomes = engine
            .run(
                &mut state,
                ["I want to order a pizza", "Pepperoni please", "Hauptstraße 5, Leipzig", "no"],
            )
            .await;

        let last = outcomes.last().expect("conversation should produce turns");
        assert!(last.ended);
        assert_eq!(last.messages[0], COMPLETION_MESSAGE);
        let order_id = last.order_id.clone().expect("order id should be reported");
        assert!(last.messages[1].contains(&order_id));

        let orders = service.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1.pizza_id, PizzaId("2".to_string()));
        assert_eq!(orders[0].1.address, DeliveryAddress::new("Leipzig", "Hauptstraße", "5"));
        assert_eq!(state.slots.get(&SlotId::PizzaName).map(String::as_str), Some("pepperoni please"));
    }

    #[tokio::test]
    async fn optional_information_is_collected_after_yes() {
        let engine = engine_with(menu_service());
        let mut state = engine.start();

        let outcomes = engine
            .run(
                &mut state,
                [
                    "I want to order a pizza",
                    "margherita",
                    "Hauptstraße 5 Leipzig",
                    "yes",
                    "0341 555 0101",
                    "around 7pm",
                ],
            )
            .await;

        assert_eq!(outcomes[3].messages, vec![SlotId::CustomerTelNumber.prompt().to_string()]);
        assert_eq!(outcomes[4].messages, vec![SlotId::DeliveryTime.prompt().to_string()]);
        assert!(outcomes[5].ended);
        assert!(state.order_id.is_some());
        assert_eq!(state.slots.get(&SlotId::DeliveryTime).map(String::as_str), Some("around 7pm"));
    }

    #[tokio::test]
    async fn declined_confirmation_completes_the_order() {
        let mut services = DialogueServices::in_memory(menu_service());
        services.orders = Arc::new(FixedReceipt);
        let engine = DialogueEngine::new(services, DialogueSettings::default());
        let mut state = engine.start();
        engine
            .run(&mut state, ["I want to order a pizza", "pepperoni", "Hauptstraße 5 Leipzig"])
            .await;
        assert!(state.pending_confirmation);

        let outcome = engine.process_turn(&mut state, "no thanks").await;

        assert!(!state.pending_confirmation);
        assert!(!state.wants_optional_info);
        assert!(outcome.ended);
        assert_eq!(outcome.order_id.as_deref(), Some("abc123"));
        assert!(outcome.messages.iter().any(|message| message.contains("abc123")));
    }

    #[tokio::test]
    async fn rejected_address_re_asks_same_question() {
        let service = menu_service();
        let engine = engine_with(service.clone());
        let mut state = engine.start();
        engine.run(&mut state, ["I want to order a pizza", "pepperoni"]).await;

        service.set_available(false);
        let outcome = engine.process_turn(&mut state, "Hauptstraße 5 Leipzig").await;

        assert_eq!(
            outcome.messages,
            vec![
                INVALID_ADDRESS_MESSAGE.to_string(),
                SlotId::CustomerAddress.prompt().to_string()
            ]
        );
        assert_eq!(state.awaiting_slot, Some(SlotId::CustomerAddress));
        assert!(!state.is_filled(SlotId::CustomerAddress));
        assert!(state.awaiting_matches_transcript());
    }

    #[tokio::test]
    async fn order_request_mentioning_menu_starts_the_order() {
        let engine = engine_with(menu_service());
        let mut state = engine.start();

        let outcome = engine.process_turn(&mut state, "I want to order a pizza from your menu").await;

        assert_eq!(outcome.route, Route::Retrieval);
        assert!(state.active_order);
        assert_eq!(outcome.messages, vec![SlotId::PizzaName.prompt().to_string()]);

        let outcome = engine.process_turn(&mut state, "the Margherita from the menu please").await;

        assert_eq!(outcome.route, Route::Retrieval);
        assert!(state.is_filled(SlotId::PizzaName));
        assert_eq!(state.resolved_pizza_id, Some(PizzaId("1".to_string())));
        assert_eq!(state.awaiting_slot, Some(SlotId::CustomerAddress));
    }

    #[tokio::test]
    async fn menu_question_mid_order_keeps_the_open_question() {
        let engine = engine_with(menu_service());
        let mut state = engine.start();
        engine.process_turn(&mut state, "I want to order a pizza").await;

        let outcome = engine.process_turn(&mut state, "what is on the menu?").await;

        assert_eq!(outcome.route, Route::Description);
        assert_eq!(outcome.messages.len(), 2);
        assert!(outcome.messages[0].starts_with("We currently offer: Margherita"));
        assert_eq!(state.awaiting_slot, Some(SlotId::PizzaName));
        assert!(!state.is_filled(SlotId::PizzaName));
        assert!(!state.wants_description);
    }

    #[tokio::test]
    async fn submission_failure_is_terminal() {
        let service = menu_service();
        let engine = engine_with(service.clone());
        let mut state = engine.start();
        engine
            .run(&mut state, ["I want to order a pizza", "pepperoni", "Hauptstraße 5 Leipzig"])
            .await;

        service.set_available(false);
        let outcome = engine.process_turn(&mut state, "no").await;

        assert!(outcome.ended);
        assert_eq!(outcome.order_id, None);
        assert_eq!(state.last_assistant_message(), Some(SUBMISSION_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn ended_conversation_ignores_further_turns() {
        let engine = engine_with(menu_service());
        let mut state = DialogueState { ended: true, ..DialogueState::default() };
        let before = state.clone();

        let outcome = engine.process_turn(&mut state, "I want to order a pizza").await;

        assert!(outcome.ended);
        assert!(outcome.messages.is_empty());
        assert_eq!(state, before);
    }
}
