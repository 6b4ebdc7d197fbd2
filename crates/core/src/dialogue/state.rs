use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dialogue::slots::SlotId;
use crate::domain::menu::PizzaId;
use crate::domain::order::DeliveryAddress;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Message {
    Assistant(String),
    /// Marks which slot the next user turn answers. Never shown to the user.
    SlotPrompt(SlotId),
}

/// Everything one conversation knows. Owned by a single dialogue loop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueState {
    pub last_user_input: String,
    pub slots: BTreeMap<SlotId, String>,
    pub transcript: Vec<Message>,
    pub awaiting_slot: Option<SlotId>,
    pub active_order: bool,
    pub pending_confirmation: bool,
    pub wants_optional_info: bool,
    pub wants_description: bool,
    pub last_input_invalid: bool,
    pub ended: bool,
    pub resolved_pizza_id: Option<PizzaId>,
    pub resolved_address: Option<DeliveryAddress>,
    pub order_id: Option<String>,
}

impl DialogueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, text: impl Into<String>) {
        self.transcript.push(Message::Assistant(text.into()));
    }

    /// Appends the slot's question followed by its marker and points the
    /// next turn at it.
    pub fn ask(&mut self, slot: SlotId) {
        self.say(slot.prompt());
        self.transcript.push(Message::SlotPrompt(slot));
        self.awaiting_slot = Some(slot);
    }

    pub fn is_filled(&self, slot: SlotId) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Assistant texts appended at or after `from`.
    pub fn assistant_messages_since(&self, from: usize) -> Vec<String> {
        self.transcript
            .iter()
            .skip(from)
            .filter_map(|message| match message {
                Message::Assistant(text) => Some(text.clone()),
                Message::SlotPrompt(_) => None,
            })
            .collect()
    }

    pub fn last_assistant_message(&self) -> Option<&str> {
        self.transcript.iter().rev().find_map(|message| match message {
            Message::Assistant(text) => Some(text.as_str()),
            Message::SlotPrompt(_) => None,
        })
    }

    /// `awaiting_slot` is set exactly when the transcript ends in that slot's marker.
    pub fn awaiting_matches_transcript(&self) -> bool {
        match (self.awaiting_slot, self.transcript.last()) {
            (Some(slot), Some(Message::SlotPrompt(last))) => slot == *last,
            (None, Some(Message::SlotPrompt(_))) | (Some(_), _) => false,
            (None, _) => true,
        }
    }
}
