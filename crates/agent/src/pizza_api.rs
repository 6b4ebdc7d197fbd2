use std::time::Duration;

use async_trait::async_trait;
use pizzabot_core::config::ServicesConfig;
use pizzabot_core::domain::menu::{MenuItem, PizzaId};
use pizzabot_core::domain::order::{DeliveryAddress, OrderReceipt, OrderRequest};
use pizzabot_core::services::{AddressVerifier, MenuSource, OrderSubmitter, ServiceError};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// HTTP client for the pizza ordering API (`/pizza`, `/address/validate`,
/// `/order`).
#[derive(Clone, Debug)]
pub struct PizzaApiClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PizzaPayload {
    id: i64,
    name: String,
}

#[derive(Serialize)]
struct AddressPayload<'a> {
    city: &'a str,
    street: &'a str,
    house_number: &'a str,
}

#[derive(Serialize)]
struct OrderPayload<'a> {
    pizza_id: i64,
    city: &'a str,
    street: &'a str,
    house_number: &'a str,
}

impl<'a> From<&'a DeliveryAddress> for AddressPayload<'a> {
    fn from(address: &'a DeliveryAddress) -> Self {
        Self { city: &address.city, street: &address.street, house_number: &address.house_number }
    }
}

impl PizzaApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ServiceError::Transport(error.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ServicesConfig) -> Result<Self, ServiceError> {
        Self::new(config.pizza_api_base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn transport(error: reqwest::Error) -> ServiceError {
    ServiceError::Transport(error.to_string())
}

/// Passes 2xx responses through; anything else becomes
/// [`ServiceError::Status`] carrying the API's `detail` when present.
async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|payload| payload.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(ServiceError::Status { status: status.as_u16(), detail })
}

fn numeric_pizza_id(id: &PizzaId) -> Result<i64, ServiceError> {
    id.0.trim()
        .parse::<i64>()
        .map_err(|_| ServiceError::InvalidRequest(format!("pizza id `{id}` is not numeric")))
}

#[async_trait]
impl MenuSource for PizzaApiClient {
    async fn menu(&self) -> Result<Vec<MenuItem>, ServiceError> {
        let response = self.client.get(self.url("/pizza")).send().await.map_err(transport)?;
        let pizzas: Vec<PizzaPayload> = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|error| ServiceError::InvalidResponse(error.to_string()))?;

        debug!(event_name = "agent.pizza_api.menu_fetched", items = pizzas.len(), "menu fetched");
        Ok(pizzas.into_iter().map(|pizza| MenuItem::new(pizza.id.to_string(), pizza.name)).collect())
    }
}

#[async_trait]
impl AddressVerifier for PizzaApiClient {
    async fn verify(&self, address: &DeliveryAddress) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.url("/address/validate"))
            .json(&AddressPayload::from(address))
            .send()
            .await
            .map_err(transport)?;

        match ensure_success(response).await {
            Ok(_) => Ok(()),
            Err(error) => {
                debug!(
                    event_name = "agent.pizza_api.address_rejected",
                    error = %error,
                    "address validation rejected"
                );
                Err(error)
            }
        }
    }
}

#[async_trait]
impl OrderSubmitter for PizzaApiClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ServiceError> {
        let payload = OrderPayload {
            pizza_id: numeric_pizza_id(&request.pizza_id)?,
            city: &request.address.city,
            street: &request.address.street,
            house_number: &request.address.house_number,
        };

        let response =
            self.client.post(self.url("/order")).json(&payload).send().await.map_err(transport)?;
        let response = ensure_success(response).await.map_err(|error| {
            warn!(event_name = "agent.pizza_api.order_rejected", error = %error, "order rejected");
            error
        })?;

        response.json::<OrderReceipt>().await.map_err(|error| {
            ServiceError::InvalidResponse(format!("order response could not be decoded: {error}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use pizzabot_core::domain::menu::PizzaId;
    use pizzabot_core::domain::order::{DeliveryAddress, OrderRequest, OrderStatus};
    use pizzabot_core::services::{AddressVerifier, MenuSource, OrderSubmitter, ServiceError};
    use serde_json::{json, Value};

    use super::PizzaApiClient;

    /// Mirrors the reference pizza API closely enough for client tests.
    fn mock_api() -> Router {
        Router::new()
            .route(
                "/pizza",
                get(|| async {
                    Json(json!([
                        { "id": 1, "name": "Margherita" },
                        { "id": 2, "name": "Pepperoni" }
                    ]))
                }),
            )
            .route(
                "/address/validate",
                post(|Json(address): Json<Value>| async move {
                    if address["city"] == "Leipzig" {
                        (StatusCode::OK, Json(json!({ "message": "Address is valid" })))
                    } else {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "detail": "We don't deliver to Berlin. Available cities: Leipzig" })),
                        )
                    }
                }),
            )
            .route(
                "/order",
                post(|Json(order): Json<Value>| async move {
                    if order["pizza_id"] == 2 {
                        (StatusCode::OK, Json(json!({ "order_id": "abc123", "status": "received" })))
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Pizza not found" })))
                    }
                }),
            )
    }

    async fn client() -> PizzaApiClient {
        let listener =
            tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
        let address = listener.local_addr().expect("listener should have an address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, mock_api()).await;
        });
        PizzaApiClient::new(format!("http://{address}/"), Duration::from_secs(5))
            .expect("client should build")
    }

    fn order(pizza_id: &str) -> OrderRequest {
        OrderRequest {
            pizza_id: PizzaId(pizza_id.to_string()),
            address: DeliveryAddress::new("Leipzig", "Hauptstraße", "5"),
        }
    }

    #[tokio::test]
    async fn menu_ids_become_strings() {
        let menu = client().await.menu().await.expect("menu should load");

        assert_eq!(menu.len(), 2);
        assert_eq!(menu[1].id, PizzaId("2".to_string()));
        assert_eq!(menu[1].name, "Pepperoni");
    }

    #[tokio::test]
    async fn address_rejection_carries_detail() {
        let client = client().await;

        assert_eq!(client.verify(&DeliveryAddress::new("Leipzig", "Ring", "1")).await, Ok(()));
        let error = client
            .verify(&DeliveryAddress::new("Berlin", "Ring", "1"))
            .await
            .expect_err("berlin is not deliverable");
        assert!(matches!(
            error,
            ServiceError::Status { status: 400, ref detail } if detail.contains("Berlin")
        ));
    }

    #[tokio::test]
    async fn order_creation_returns_receipt() {
        let receipt = client().await.create_order(&order("2")).await.expect("order should work");

        assert_eq!(receipt.order_id, "abc123");
        assert_eq!(receipt.status, OrderStatus::Received);
        assert!(receipt.is_accepted());
    }

    #[tokio::test]
    async fn unknown_pizza_is_a_status_error() {
        let error = client().await.create_order(&order("9")).await.expect_err("9 is unknown");

        assert_eq!(error, ServiceError::Status { status: 404, detail: "Pizza not found".to_string() });
    }

    #[tokio::test]
    async fn non_numeric_pizza_id_is_rejected_before_sending() {
        let error = client().await.create_order(&order("pepperoni")).await.expect_err("bad id");

        assert!(matches!(error, ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let client = PizzaApiClient::new("http://127.0.0.1:9", Duration::from_secs(2))
            .expect("client should build");

        assert!(matches!(client.menu().await, Err(ServiceError::Transport(_))));
    }
}
