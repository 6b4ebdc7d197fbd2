//! The slot-filling state machine.
//!
//! One turn runs Checker, then Router, then either Description or Retrieval
//! followed by the Order Node. All conversation state lives in
//! [`DialogueState`]; the engine itself is shared and stateless.

pub mod checker;
pub mod description;
pub mod engine;
pub mod intent;
pub mod order_node;
pub mod retrieval;
pub mod router;
pub mod slots;
pub mod state;

#[cfg(test)]
mod fixtures;

pub use checker::{CheckOutcome, Checker};
pub use engine::{DialogueEngine, DialogueServices, DialogueSettings, TurnOutcome, GREETING};
pub use intent::{FewShotIntentDetector, Intent, IntentDetector, KeywordIntentDetector};
pub use router::Route;
pub use slots::{Requirement, SlotCatalog, SlotId, SlotSpec};
pub use state::{DialogueState, Message};
