use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use pizzabot_agent::AgentRuntime;
use pizzabot_core::dialogue::DialogueState;
use pizzabot_core::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// One lock per conversation so turns of the same conversation run one at a
/// time while different conversations proceed independently.
type Session = Arc<Mutex<DialogueState>>;

struct SessionEntry {
    dialogue: Session,
    last_active: Instant,
}

#[derive(Clone)]
pub struct ConversationState {
    agent: Arc<AgentRuntime>,
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    idle_timeout: Duration,
}

impl ConversationState {
    pub fn new(agent: Arc<AgentRuntime>, idle_timeout: Duration) -> Self {
        Self { agent, sessions: Arc::new(RwLock::new(HashMap::new())), idle_timeout }
    }

    /// Drops idle conversations, then registers the new one.
    async fn insert(&self, conversation_id: String, dialogue: DialogueState) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_active) < self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(
                event_name = "server.conversation.evicted",
                evicted,
                idle_secs = self.idle_timeout.as_secs(),
                "idle conversations discarded"
            );
        }
        sessions.insert(
            conversation_id,
            SessionEntry { dialogue: Arc::new(Mutex::new(dialogue)), last_active: now },
        );
    }

    /// Looks up a live conversation and marks it active.
    async fn session(&self, conversation_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(conversation_id)?;
        entry.last_active = Instant::now();
        Some(entry.dialogue.clone())
    }

    async fn discard(&self, conversation_id: &str) {
        self.sessions.write().await.remove(conversation_id);
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationStarted {
    pub conversation_id: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub messages: Vec<String>,
    pub ended: bool,
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
}

/// JSON error response for an [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ApiErrorBody {
            error: self.0.user_message(),
            message: self.0.to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(agent: Arc<AgentRuntime>, idle_timeout: Duration) -> Router {
    Router::new()
        .route("/api/v1/conversations", post(start_conversation))
        .route("/api/v1/conversations/{conversation_id}/turns", post(take_turn))
        .with_state(ConversationState::new(agent, idle_timeout))
}

pub async fn start_conversation(
    State(state): State<ConversationState>,
) -> (StatusCode, Json<ConversationStarted>) {
    let conversation_id = Uuid::new_v4().to_string();
    let (dialogue, greeting) = state.agent.start_conversation();
    state.insert(conversation_id.clone(), dialogue).await;

    info!(
        event_name = "server.conversation.started",
        conversation_id = %conversation_id,
        "conversation started"
    );
    (StatusCode::CREATED, Json(ConversationStarted { conversation_id, messages: vec![greeting] }))
}

pub async fn take_turn(
    State(state): State<ConversationState>,
    Path(conversation_id): Path<String>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let Some(session) = state.session(&conversation_id).await else {
        warn!(
            event_name = "server.conversation.not_found",
            correlation_id = %correlation_id,
            conversation_id = %conversation_id,
            "turn for unknown conversation"
        );
        return Err(ApiError(
            ApplicationError::ConversationNotFound(conversation_id).into_interface(correlation_id),
        ));
    };

    if request.text.trim().is_empty() {
        return Err(ApiError(InterfaceError::BadRequest {
            message: "turn text must not be empty".to_string(),
            correlation_id,
        }));
    }

    let outcome = {
        let mut dialogue = session.lock().await;
        state.agent.handle_turn(&mut dialogue, request.text.trim()).await
    };

    if outcome.ended {
        state.discard(&conversation_id).await;
        info!(
            event_name = "server.conversation.ended",
            correlation_id = %correlation_id,
            conversation_id = %conversation_id,
            order_id = outcome.order_id.as_deref().unwrap_or("none"),
            "conversation ended and discarded"
        );
    }

    Ok(Json(TurnResponse {
        messages: outcome.messages,
        ended: outcome.ended,
        order_id: outcome.order_id,
    }))
}
