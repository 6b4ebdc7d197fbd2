//! Builders shared by the dialogue unit tests.

use std::sync::Arc;

use crate::dialogue::checker::Checker;
use crate::dialogue::engine::{DialogueEngine, DialogueServices, DialogueSettings};
use crate::dialogue::intent::KeywordIntentDetector;
use crate::services::InMemoryPizzaService;
use crate::validation::{
    AddressValidator, ConfirmationMatcher, KeywordSet, PizzaNameValidator, RegexAddressExtractor,
    DEFAULT_MATCH_THRESHOLD,
};

pub(crate) fn menu_service() -> Arc<InMemoryPizzaService> {
    Arc::new(InMemoryPizzaService::default())
}

pub(crate) fn checker_with(service: Arc<InMemoryPizzaService>, order_keywords: KeywordSet) -> Checker {
    let intents = KeywordIntentDetector::new(
        order_keywords,
        KeywordSet::new(["menu", "describe", "description"]),
    );
    Checker::new(
        Arc::new(intents),
        PizzaNameValidator::new(service.clone(), DEFAULT_MATCH_THRESHOLD),
        AddressValidator::new(Arc::new(RegexAddressExtractor::new()), service),
        ConfirmationMatcher::default(),
    )
}

pub(crate) fn engine_with(service: Arc<InMemoryPizzaService>) -> DialogueEngine {
    DialogueEngine::new(DialogueServices::in_memory(service), DialogueSettings::default())
}
