use tracing::debug;

use crate::dialogue::slots::SlotId;
use crate::dialogue::state::DialogueState;

/// Records the raw answer to the outstanding question.
///
/// Rejected answers are never recorded; the question stays outstanding so the
/// order node can ask it again.
pub fn retrieve(state: &mut DialogueState, utterance: &str) -> Option<SlotId> {
    if state.last_input_invalid || !state.active_order {
        return None;
    }

    let slot = state.awaiting_slot.take()?;
    state.slots.insert(slot, utterance.trim().to_lowercase());
    debug!(event_name = "dialogue.retrieval.slot_filled", slot = slot.as_str(), "slot recorded");
    Some(slot)
}
