use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::menu::PizzaId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub city: String,
    pub street: String,
    pub house_number: String,
}

impl DeliveryAddress {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        house_number: impl Into<String>,
    ) -> Self {
        Self { city: city.into(), street: street.into(), house_number: house_number.into() }
    }

    /// True when every component carries non-whitespace text.
    pub fn is_complete(&self) -> bool {
        [&self.city, &self.street, &self.house_number].iter().all(|part| !part.trim().is_empty())
    }
}

impl fmt::Display for DeliveryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.street, self.house_number, self.city)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub pizza_id: PizzaId,
    pub address: DeliveryAddress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Preparing,
    OnDelivery,
    Delivered,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub status: OrderStatus,
}

impl OrderReceipt {
    /// Only a freshly `received` order counts as a successful submission.
    pub fn is_accepted(&self) -> bool {
        self.status == OrderStatus::Received && !self.order_id.trim().is_empty()
    }
}
