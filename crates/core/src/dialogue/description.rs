use std::sync::Arc;

use tracing::warn;

use crate::dialogue::state::{DialogueState, Message};
use crate::services::MenuSource;

pub const MENU_UNAVAILABLE_MESSAGE: &str =
    "Sorry, I cannot look up our menu right now. Please try again in a moment.";

/// Answers menu questions without disturbing the outstanding question.
#[derive(Clone)]
pub struct DescriptionNode {
    menu: Arc<dyn MenuSource>,
}

impl DescriptionNode {
    pub fn new(menu: Arc<dyn MenuSource>) -> Self {
        Self { menu }
    }

    pub async fn describe(&self, state: &mut DialogueState) {
        state.wants_description = false;

        match self.menu.menu().await {
            Ok(menu) if !menu.is_empty() => {
                let names = menu.iter().map(|item| item.name.as_str()).collect::<Vec<_>>();
                state.say(format!("We currently offer: {}.", names.join(", ")));
            }
            Ok(_) => state.say(MENU_UNAVAILABLE_MESSAGE),
            Err(error) => {
                warn!(
                    event_name = "dialogue.description.menu_unavailable",
                    error = %error,
                    "menu lookup failed while describing"
                );
                state.say(MENU_UNAVAILABLE_MESSAGE);
            }
        }

        if let Some(slot) = state.awaiting_slot {
            state.say(slot.prompt());
            state.transcript.push(Message::SlotPrompt(slot));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DescriptionNode, MENU_UNAVAILABLE_MESSAGE};
    use crate::dialogue::slots::SlotId;
    use crate::dialogue::state::DialogueState;
    use crate::services::InMemoryPizzaService;

    #[tokio::test]
    async fn lists_menu_and_re_asks_outstanding_question() {
        let node = DescriptionNode::new(Arc::new(InMemoryPizzaService::default()));
        let mut state = DialogueState { active_order: true, wants_description: true, ..DialogueState::default() };
        state.ask(SlotId::PizzaName);
        let mark = state.transcript.len();

        node.describe(&mut state).await;

        assert_eq!(
            state.assistant_messages_since(mark),
            vec![
                "We currently offer: Margherita, Pepperoni, Hawaiian, Quattro Formaggi.".to_string(),
                "What pizza would you like to order?".to_string(),
            ]
        );
        assert!(!state.wants_description);
        assert!(state.awaiting_matches_transcript());
    }

    #[tokio::test]
    async fn unavailable_menu_yields_apology() {
        let service = Arc::new(InMemoryPizzaService::default());
        service.set_available(false);
        let node = DescriptionNode::new(service);
        let mut state = DialogueState { wants_description: true, ..DialogueState::default() };

        node.describe(&mut state).await;

        assert_eq!(state.last_assistant_message(), Some(MENU_UNAVAILABLE_MESSAGE));
        assert!(state.awaiting_matches_transcript());
    }
}
