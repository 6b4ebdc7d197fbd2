use std::sync::Arc;

use tracing::{debug, info};

use crate::dialogue::intent::{Intent, IntentDetector};
use crate::dialogue::slots::{SlotId, SlotValidator};
use crate::dialogue::state::DialogueState;
use crate::validation::{AddressValidator, ConfirmationMatcher, PizzaNameValidator};

pub const NO_ORDER_INTENT_MESSAGE: &str =
    "Invalid order. Please specify a pizza order. Try writing 'I want to order a pizza'.";
pub const UNKNOWN_PIZZA_MESSAGE: &str = "Sorry, we don't have that pizza on our menu.";
pub const INVALID_ADDRESS_MESSAGE: &str = "Sorry, I could not verify that delivery address. Please give street, house number and city (we deliver to Leipzig, Halle and Dresden).";
pub const UNCONFIRMED_MESSAGE: &str = "Please answer with yes to confirm your order.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    OrderStarted,
    NoOrderIntent,
    DescriptionRequested,
    ConfirmationAccepted,
    ConfirmationDeclined,
    Accepted(SlotId),
    Rejected(SlotId),
    /// Active order without an outstanding question; nothing to check.
    Ignored,
}

/// Interprets the latest utterance against what the conversation is waiting for.
#[derive(Clone)]
pub struct Checker {
    intents: Arc<dyn IntentDetector>,
    pizza: PizzaNameValidator,
    address: AddressValidator,
    confirmation: ConfirmationMatcher,
}

impl Checker {
    pub fn new(
        intents: Arc<dyn IntentDetector>,
        pizza: PizzaNameValidator,
        address: AddressValidator,
        confirmation: ConfirmationMatcher,
    ) -> Self {
        Self { intents, pizza, address, confirmation }
    }

    /// Appends at most one assistant message.
    pub async fn check(&self, state: &mut DialogueState, utterance: &str) -> CheckOutcome {
        if state.pending_confirmation {
            state.pending_confirmation = false;
            if self.confirmation.is_confirmation(utterance) {
                state.wants_optional_info = true;
                return CheckOutcome::ConfirmationAccepted;
            }
            return CheckOutcome::ConfirmationDeclined;
        }

        if state.active_order {
            let Some(slot) = state.awaiting_slot else {
                if self.wants_description(state, utterance).await {
                    return CheckOutcome::DescriptionRequested;
                }
                return CheckOutcome::Ignored;
            };
            return self.check_answer(state, slot, utterance).await;
        }

        if self.intents.detects(Intent::PlaceOrder, utterance).await {
            state.active_order = true;
            info!(event_name = "dialogue.checker.order_started", "order intent recognised");
            return CheckOutcome::OrderStarted;
        }

        if self.wants_description(state, utterance).await {
            return CheckOutcome::DescriptionRequested;
        }

        state.say(NO_ORDER_INTENT_MESSAGE);
        debug!(event_name = "dialogue.checker.no_order_intent", "utterance is not an order");
        CheckOutcome::NoOrderIntent
    }

    async fn wants_description(&self, state: &mut DialogueState, utterance: &str) -> bool {
        let detected = self.intents.detects(Intent::Describe, utterance).await;
        if detected {
            state.wants_description = true;
        }
        detected
    }

    async fn check_answer(
        &self,
        state: &mut DialogueState,
        slot: SlotId,
        utterance: &str,
    ) -> CheckOutcome {
        // A valid answer wins over a menu question; free text would swallow
        // the question, so it is checked first there.
        match slot.validator() {
            SlotValidator::PizzaName => match self.pizza.validate(utterance).await {
                Some(pizza_id) => {
                    state.resolved_pizza_id = Some(pizza_id);
                    CheckOutcome::Accepted(slot)
                }
                None => self.describe_or_reject(state, slot, utterance, UNKNOWN_PIZZA_MESSAGE).await,
            },
            SlotValidator::Address => match self.address.validate(utterance).await {
                Some(address) => {
                    state.resolved_address = Some(address);
                    CheckOutcome::Accepted(slot)
                }
                None => {
                    self.describe_or_reject(state, slot, utterance, INVALID_ADDRESS_MESSAGE).await
                }
            },
            SlotValidator::Confirmation => {
                if self.confirmation.is_confirmation(utterance) {
                    CheckOutcome::Accepted(slot)
                } else {
                    self.describe_or_reject(state, slot, utterance, UNCONFIRMED_MESSAGE).await
                }
            }
            SlotValidator::FreeText => {
                if self.wants_description(state, utterance).await {
                    CheckOutcome::DescriptionRequested
                } else {
                    CheckOutcome::Accepted(slot)
                }
            }
        }
    }

    async fn describe_or_reject(
        &self,
        state: &mut DialogueState,
        slot: SlotId,
        utterance: &str,
        message: &str,
    ) -> CheckOutcome {
        if self.wants_description(state, utterance).await {
            return CheckOutcome::DescriptionRequested;
        }
        reject(state, slot, message)
    }
}

fn reject(state: &mut DialogueState, slot: SlotId, message: &str) -> CheckOutcome {
    state.last_input_invalid = true;
    state.say(message);
    info!(
        event_name = "dialogue.checker.rejected",
        slot = slot.as_str(),
        "answer rejected; slot will be asked again"
    );
    CheckOutcome::Rejected(slot)
}
