use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use pizzabot_core::services::MenuSource;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    menu: Arc<dyn MenuSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub pizza_api: HealthCheck,
    pub checked_at: String,
}

pub fn router(menu: Arc<dyn MenuSource>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { menu })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let pizza_api = menu_check(state.menu.as_ref()).await;
    let ready = pizza_api.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "pizzabot-server runtime initialized".to_string(),
        },
        pizza_api,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn menu_check(menu: &dyn MenuSource) -> HealthCheck {
    match menu.menu().await {
        Ok(items) => HealthCheck {
            status: "ready",
            detail: format!("menu request returned {} item(s)", items.len()),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("menu request failed: {error}") }
        }
    }
}
