use serde::{Deserialize, Serialize};

use crate::dialogue::state::DialogueState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Retrieval,
    Description,
    Terminate,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval",
            Self::Description => "description",
            Self::Terminate => "terminate",
        }
    }
}

/// Picks the path for the rest of the turn once the checker has run.
pub fn route(state: &DialogueState) -> Route {
    if state.ended {
        Route::Terminate
    } else if state.wants_description {
        Route::Description
    } else if state.active_order {
        Route::Retrieval
    } else {
        Route::Terminate
    }
}

#[cfg(test)]
mod tests {
    use super::{route, Route};
    use crate::dialogue::state::DialogueState;

    #[test]
    fn description_request_takes_precedence() {
        let state =
            DialogueState { wants_description: true, active_order: true, ..DialogueState::default() };
        assert_eq!(route(&state), Route::Description);
    }

    #[test]
    fn active_order_routes_to_retrieval() {
        let state = DialogueState { active_order: true, ..DialogueState::default() };
        assert_eq!(route(&state), Route::Retrieval);
    }

    #[test]
    fn idle_or_ended_conversation_terminates() {
        assert_eq!(route(&DialogueState::default()), Route::Terminate);

        let ended = DialogueState { active_order: true, ended: true, ..DialogueState::default() };
        assert_eq!(route(&ended), Route::Terminate);
    }
}
