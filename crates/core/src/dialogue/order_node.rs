use std::sync::Arc;

use tracing::{info, warn};

use crate::dialogue::slots::{SlotCatalog, SlotId};
use crate::dialogue::state::DialogueState;
use crate::domain::order::OrderRequest;
use crate::services::OrderSubmitter;

pub const COMPLETION_MESSAGE: &str =
    "Thank you for providing all the details. Your order is being processed!";
pub const SUBMISSION_FAILED_MESSAGE: &str =
    "Sorry, we could not place your order right now. Please try again later.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Reprompted(SlotId),
    Asked(SlotId),
    Submitted { order_id: String },
    SubmissionFailed,
}

/// Decides what the assistant asks next, or places the order once nothing is
/// left to ask.
#[derive(Clone)]
pub struct OrderNode {
    catalog: SlotCatalog,
    submitter: Arc<dyn OrderSubmitter>,
}

impl OrderNode {
    pub fn new(catalog: SlotCatalog, submitter: Arc<dyn OrderSubmitter>) -> Self {
        Self { catalog, submitter }
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub async fn advance(&self, state: &mut DialogueState) -> Advance {
        if state.last_input_invalid {
            state.last_input_invalid = false;
            if let Some(slot) = state.awaiting_slot {
                state.ask(slot);
                return Advance::Reprompted(slot);
            }
        }

        match self.next_slot(state) {
            Some(slot) => {
                state.ask(slot);
                if slot.opens_optional_info() {
                    state.pending_confirmation = true;
                    state.wants_optional_info = false;
                }
                Advance::Asked(slot)
            }
            None => self.complete(state).await,
        }
    }

    /// Lowest-ranked missing required slot, competing with the missing
    /// optional slots only while the optional-info flow is open.
    fn next_slot(&self, state: &DialogueState) -> Option<SlotId> {
        let required = self.catalog.missing_required(&state.slots).into_iter().next();
        let optional = if state.wants_optional_info {
            self.catalog.missing_optional(&state.slots).into_iter().next()
        } else {
            None
        };

        match (required, optional) {
            (Some(required), Some(optional)) => Some(required.min(optional)),
            (required, optional) => required.or(optional),
        }
    }

    async fn complete(&self, state: &mut DialogueState) -> Advance {
        state.say(COMPLETION_MESSAGE);
        state.awaiting_slot = None;
        state.wants_optional_info = false;
        state.pending_confirmation = false;
        state.ended = true;

        let request = match (state.resolved_pizza_id.clone(), state.resolved_address.clone()) {
            (Some(pizza_id), Some(address)) => OrderRequest { pizza_id, address },
            _ => {
                warn!(
                    event_name = "dialogue.order.incomplete",
                    "order completed without a resolved pizza or address"
                );
                state.say(SUBMISSION_FAILED_MESSAGE);
                return Advance::SubmissionFailed;
            }
        };

        match self.submitter.create_order(&request).await {
            Ok(receipt) if receipt.is_accepted() => {
                info!(
                    event_name = "dialogue.order.submitted",
                    order_id = %receipt.order_id,
                    pizza_id = %request.pizza_id,
                    "order accepted"
                );
                state.say(format!(
                    "Your order has been received. Your order id is {}.",
                    receipt.order_id
                ));
                state.order_id = Some(receipt.order_id.clone());
                Advance::Submitted { order_id: receipt.order_id }
            }
            Ok(receipt) => {
                warn!(
                    event_name = "dialogue.order.not_accepted",
                    status = ?receipt.status,
                    "order service did not accept the order"
                );
                state.say(SUBMISSION_FAILED_MESSAGE);
                Advance::SubmissionFailed
            }
            Err(error) => {
                warn!(
                    event_name = "dialogue.order.submission_failed",
                    error = %error,
                    "order submission failed"
                );
                state.say(SUBMISSION_FAILED_MESSAGE);
                Advance::SubmissionFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{Advance, OrderNode, COMPLETION_MESSAGE, SUBMISSION_FAILED_MESSAGE};
    use crate::dialogue::slots::{SlotCatalog, SlotId};
    use crate::dialogue::state::{DialogueState, Message};
    use crate::domain::menu::PizzaId;
    use crate::domain::order::{DeliveryAddress, OrderReceipt, OrderRequest, OrderStatus};
    use crate::services::{InMemoryPizzaService, OrderSubmitter, ServiceError};

    struct FixedReceipt(OrderReceipt);

    #[async_trait]
    impl OrderSubmitter for FixedReceipt {
        async fn create_order(&self, _request: &OrderRequest) -> Result<OrderReceipt, ServiceError> {
            Ok(self.0.clone())
        }
    }

    fn node() -> OrderNode {
        OrderNode::new(SlotCatalog::default(), Arc::new(InMemoryPizzaService::default()))
    }

    fn filled_required() -> DialogueState {
        let mut state = DialogueState { active_order: true, ..DialogueState::default() };
        state.slots.insert(SlotId::PizzaName, "pepperoni".to_string());
        state.slots.insert(SlotId::CustomerAddress, "hauptstraße 5 leipzig".to_string());
        state.slots.insert(SlotId::AdditionalInfoFlag, "no thanks".to_string());
        state.resolved_pizza_id = Some(PizzaId("2".to_string()));
        state.resolved_address = Some(DeliveryAddress::new("Leipzig", "Hauptstraße", "5"));
        state
    }

    #[tokio::test]
    async fn asks_missing_required_slots_in_rank_order() {
        let node = node();
        let mut state = DialogueState { active_order: true, ..DialogueState::default() };

        assert_eq!(node.advance(&mut state).await, Advance::Asked(SlotId::PizzaName));
        state.slots.insert(SlotId::PizzaName, "pepperoni".to_string());
        assert_eq!(node.advance(&mut state).await, Advance::Asked(SlotId::CustomerAddress));
        assert!(state.awaiting_matches_transcript());
    }

    #[tokio::test]
    async fn filled_slots_are_never_requested_again() {
        let node = node();
        let mut state = DialogueState { active_order: true, ..DialogueState::default() };

        while !state.ended {
            let Advance::Asked(slot) = node.advance(&mut state).await else {
                break;
            };
            assert!(!state.is_filled(slot), "{slot} was asked twice");
            state.awaiting_slot = None;
            state.slots.insert(slot, "answer".to_string());
        }
    }

    #[tokio::test]
    async fn additional_info_question_opens_pending_confirmation() {
        let node = node();
        let mut state = filled_required();
        state.slots.remove(&SlotId::AdditionalInfoFlag);

        assert_eq!(node.advance(&mut state).await, Advance::Asked(SlotId::AdditionalInfoFlag));
        assert!(state.pending_confirmation);
        assert!(!state.wants_optional_info);
    }

    #[tokio::test]
    async fn invalid_input_re_asks_the_same_slot() {
        let node = node();
        let mut state = DialogueState { active_order: true, ..DialogueState::default() };
        state.ask(SlotId::CustomerAddress);
        state.say("Sorry, I could not verify that delivery address.");
        state.last_input_invalid = true;

        assert_eq!(node.advance(&mut state).await, Advance::Reprompted(SlotId::CustomerAddress));
        assert!(!state.last_input_invalid);
        assert_eq!(state.transcript.last(), Some(&Message::SlotPrompt(SlotId::CustomerAddress)));
        assert!(state.awaiting_matches_transcript());
    }

    #[tokio::test]
    async fn optional_slots_follow_an_accepted_confirmation() {
        let node = node();
        let mut state = filled_required();
        state.wants_optional_info = true;

        assert_eq!(node.advance(&mut state).await, Advance::Asked(SlotId::CustomerTelNumber));
        state.slots.insert(SlotId::CustomerTelNumber, "0341 123456".to_string());
        assert_eq!(node.advance(&mut state).await, Advance::Asked(SlotId::DeliveryTime));
        state.slots.insert(SlotId::DeliveryTime, "7pm".to_string());
        assert!(matches!(node.advance(&mut state).await, Advance::Submitted { .. }));
    }

    #[tokio::test]
    async fn accepted_receipt_reports_order_id_and_ends() {
        let receipt = OrderReceipt { order_id: "abc123".to_string(), status: OrderStatus::Received };
        let node = OrderNode::new(SlotCatalog::default(), Arc::new(FixedReceipt(receipt)));
        let mut state = filled_required();
        state.ask(SlotId::AdditionalInfoFlag);
        state.awaiting_slot = None;
        let mark = state.transcript.len();

        let outcome = node.advance(&mut state).await;

        assert_eq!(outcome, Advance::Submitted { order_id: "abc123".to_string() });
        assert!(state.ended);
        assert_eq!(state.order_id.as_deref(), Some("abc123"));
        let messages = state.assistant_messages_since(mark);
        assert_eq!(messages[0], COMPLETION_MESSAGE);
        assert!(messages[1].contains("abc123"));
    }

    #[tokio::test]
    async fn non_received_status_is_a_terminal_failure() {
        let receipt = OrderReceipt { order_id: "abc123".to_string(), status: OrderStatus::Preparing };
        let node = OrderNode::new(SlotCatalog::default(), Arc::new(FixedReceipt(receipt)));
        let mut state = filled_required();

        assert_eq!(node.advance(&mut state).await, Advance::SubmissionFailed);
        assert!(state.ended);
        assert_eq!(state.order_id, None);
        assert_eq!(state.last_assistant_message(), Some(SUBMISSION_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn service_reporting_non_received_status_is_not_an_order() {
        let service =
            Arc::new(InMemoryPizzaService::default().with_order_status(OrderStatus::OnDelivery));
        let node = OrderNode::new(SlotCatalog::default(), service.clone());
        let mut state = filled_required();

        assert_eq!(node.advance(&mut state).await, Advance::SubmissionFailed);
        assert_eq!(service.orders().len(), 1);
        assert_eq!(state.order_id, None);
        assert_eq!(state.last_assistant_message(), Some(SUBMISSION_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn unreachable_order_service_ends_with_apology() {
        let service = Arc::new(InMemoryPizzaService::default());
        service.set_available(false);
        let node = OrderNode::new(SlotCatalog::default(), service);
        let mut state = filled_required();

        assert_eq!(node.advance(&mut state).await, Advance::SubmissionFailed);
        assert!(state.ended);
        assert_eq!(state.last_assistant_message(), Some(SUBMISSION_FAILED_MESSAGE));
    }
}
