//! Capabilities the dialogue core calls out to.
//!
//! Every external collaborator (menu lookup, address validation, order
//! creation, language-model classification and entity extraction) is reached
//! through one of these traits. Implementations are injected into the engine
//! at construction; nothing in the core looks them up from global state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::menu::MenuItem;
use crate::domain::order::{DeliveryAddress, OrderReceipt, OrderRequest, OrderStatus};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service responded with status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("malformed response: {0}")]
    InvalidResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// One labelled few-shot example for intent classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentExample {
    pub text: String,
    pub matches: bool,
}

impl IntentExample {
    pub fn positive(text: impl Into<String>) -> Self {
        Self { text: text.into(), matches: true }
    }

    pub fn negative(text: impl Into<String>) -> Self {
        Self { text: text.into(), matches: false }
    }
}

#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn menu(&self) -> Result<Vec<MenuItem>, ServiceError>;
}

#[async_trait]
pub trait AddressVerifier: Send + Sync {
    /// `Ok(())` means the address is deliverable; a rejection arrives as
    /// [`ServiceError::Status`].
    async fn verify(&self, address: &DeliveryAddress) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait AddressExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Option<DeliveryAddress>, ServiceError>;
}

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str, examples: &[IntentExample]) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ServiceError>;
}

/// In-process stand-in for the pizza ordering API.
#[derive(Debug)]
pub struct InMemoryPizzaService {
    menu: Vec<MenuItem>,
    deliverable_cities: Vec<String>,
    order_status: OrderStatus,
    available: AtomicBool,
    orders: Mutex<Vec<(String, OrderRequest)>>,
}

impl Default for InMemoryPizzaService {
    fn default() -> Self {
        Self {
            menu: vec![
                MenuItem::new("1", "Margherita"),
                MenuItem::new("2", "Pepperoni"),
                MenuItem::new("3", "Hawaiian"),
                MenuItem::new("4", "Quattro Formaggi"),
            ],
            deliverable_cities: ["Leipzig", "Halle", "Dresden"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            order_status: OrderStatus::Received,
            available: AtomicBool::new(true),
            orders: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryPizzaService {
    pub fn with_menu(mut self, menu: Vec<MenuItem>) -> Self {
        self.menu = menu;
        self
    }

    pub fn with_order_status(mut self, status: OrderStatus) -> Self {
        self.order_status = status;
        self
    }

    /// Simulates the whole API going away; every call fails with a transport error.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn orders(&self) -> Vec<(String, OrderRequest)> {
        self.orders.lock().map(|orders| orders.clone()).unwrap_or_default()
    }

    fn ensure_available(&self) -> Result<(), ServiceError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServiceError::Transport("pizza service is unavailable".to_string()))
        }
    }

    fn check_address(&self, address: &DeliveryAddress) -> Result<(), ServiceError> {
        if !self.deliverable_cities.iter().any(|city| city == &address.city) {
            return Err(ServiceError::Status {
                status: 400,
                detail: format!(
                    "We don't deliver to {}. Available cities: {}",
                    address.city,
                    self.deliverable_cities.join(", ")
                ),
            });
        }
        if address.street.chars().count() < 2 {
            return Err(ServiceError::Status {
                status: 400,
                detail: "Invalid street name".to_string(),
            });
        }
        if address.house_number.trim().is_empty() {
            return Err(ServiceError::Status {
                status: 400,
                detail: "House number is required".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MenuSource for InMemoryPizzaService {
    async fn menu(&self) -> Result<Vec<MenuItem>, ServiceError> {
        self.ensure_available()?;
        Ok(self.menu.clone())
    }
}

#[async_trait]
impl AddressVerifier for InMemoryPizzaService {
    async fn verify(&self, address: &DeliveryAddress) -> Result<(), ServiceError> {
        self.ensure_available()?;
        self.check_address(address)
    }
}

#[async_trait]
impl OrderSubmitter for InMemoryPizzaService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, ServiceError> {
        self.ensure_available()?;
        if !self.menu.iter().any(|item| item.id == request.pizza_id) {
            return Err(ServiceError::Status { status: 404, detail: "Pizza not found".to_string() });
        }
        self.check_address(&request.address)?;

        let order_id = Uuid::new_v4().to_string();
        if let Ok(mut orders) = self.orders.lock() {
            orders.push((order_id.clone(), request.clone()));
        }
        Ok(OrderReceipt { order_id, status: self.order_status })
    }
}
