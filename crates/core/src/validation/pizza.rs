use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::menu::{MenuItem, PizzaId};
use crate::services::MenuSource;
use crate::validation::fuzzy::partial_ratio;

pub const DEFAULT_MATCH_THRESHOLD: u8 = 80;

/// Resolves a free-text pizza answer to a menu id.
#[derive(Clone)]
pub struct PizzaNameValidator {
    menu: Arc<dyn MenuSource>,
    threshold: u8,
}

impl PizzaNameValidator {
    pub fn new(menu: Arc<dyn MenuSource>, threshold: u8) -> Self {
        Self { menu, threshold }
    }

    pub async fn validate(&self, text: &str) -> Option<PizzaId> {
        let menu = match self.menu.menu().await {
            Ok(menu) => menu,
            Err(error) => {
                warn!(
                    event_name = "validation.pizza_name.menu_unavailable",
                    error = %error,
                    "menu lookup failed; treating pizza name as unmatched"
                );
                return None;
            }
        };

        let matched = first_match(&menu, text, self.threshold).map(|item| item.id.clone());
        debug!(
            event_name = "validation.pizza_name.evaluated",
            matched = matched.is_some(),
            menu_size = menu.len(),
            "pizza name evaluated against menu"
        );
        matched
    }
}

/// First menu item in menu order whose similarity reaches `threshold`.
pub fn first_match<'a>(menu: &'a [MenuItem], text: &str, threshold: u8) -> Option<&'a MenuItem> {
    menu.iter().find(|item| partial_ratio(text, &item.name) >= threshold)
}
