use async_trait::async_trait;
use pizzabot_core::domain::order::DeliveryAddress;
use pizzabot_core::services::{AddressExtractor, ServiceError};
use serde::Deserialize;
use tracing::debug;

use crate::llm::{extract_json_object, LlmClient};

const SYSTEM_PROMPT: &str = "You are a named entity recognition tool for delivery addresses. \
Extract the city, the street and the house number from the text. Output ONLY a JSON object \
with the keys \"city\", \"street\" and \"house_number\". Use null for anything not present.";

/// Delivery address extraction through a language model.
pub struct LlmAddressExtractor<C> {
    client: C,
}

impl<C> LlmAddressExtractor<C>
where
    C: LlmClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct AddressEntities {
    city: Option<serde_json::Value>,
    street: Option<serde_json::Value>,
    house_number: Option<serde_json::Value>,
}

fn entity_text(value: Option<serde_json::Value>) -> Option<String> {
    let text = match value? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Number(number) => number.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Every field must be present; a partial address is no address.
fn parse_entities(answer: &str) -> Result<Option<DeliveryAddress>, ServiceError> {
    let Some(object) = extract_json_object(answer) else {
        return Err(ServiceError::InvalidResponse("no json object in answer".to_string()));
    };
    let entities: AddressEntities = serde_json::from_str(object)
        .map_err(|error| ServiceError::InvalidResponse(error.to_string()))?;

    let address = match (
        entity_text(entities.city),
        entity_text(entities.street),
        entity_text(entities.house_number),
    ) {
        (Some(city), Some(street), Some(house_number)) => {
            Some(DeliveryAddress::new(city, street, house_number))
        }
        _ => None,
    };
    Ok(address)
}

#[async_trait]
impl<C> AddressExtractor for LlmAddressExtractor<C>
where
    C: LlmClient,
{
    async fn extract(&self, text: &str) -> Result<Option<DeliveryAddress>, ServiceError> {
        let answer = self
            .client
            .complete(SYSTEM_PROMPT, text)
            .await
            .map_err(|error| ServiceError::Transport(error.to_string()))?;
        let address = parse_entities(&answer)?;
        debug!(
            event_name = "agent.entities.extracted",
            complete = address.is_some(),
            "address entities extracted"
        );
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use pizzabot_core::domain::order::DeliveryAddress;
    use pizzabot_core::services::{AddressExtractor, ServiceError};

    use super::{parse_entities, LlmAddressExtractor};
    use crate::llm::LlmClient;

    struct CannedClient(&'static str);

    #[async_trait]
    impl LlmClient for CannedClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn complete_entities_become_an_address() {
        let answer = "```json\n{\"city\": \"Leipzig\", \"street\": \"Hauptstraße\", \"house_number\": 5}\n```";
        assert_eq!(
            parse_entities(answer),
            Ok(Some(DeliveryAddress::new("Leipzig", "Hauptstraße", "5")))
        );
    }

    #[test]
    fn missing_or_blank_fields_yield_none() {
        assert_eq!(
            parse_entities("{\"city\": \"Leipzig\", \"street\": null, \"house_number\": \"5\"}"),
            Ok(None)
        );
        assert_eq!(
            parse_entities("{\"city\": \" \", \"street\": \"Ring\", \"house_number\": \"5\"}"),
            Ok(None)
        );
    }

    #[test]
    fn prose_without_json_is_a_malformed_response() {
        assert!(matches!(parse_entities("I cannot help"), Err(ServiceError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn extractor_returns_parsed_address() {
        let extractor = LlmAddressExtractor::new(CannedClient(
            "{\"city\": \"Dresden\", \"street\": \"Prager Straße\", \"house_number\": \"12a\"}",
        ));

        let address = extractor.extract("bring it to Prager Straße 12a in Dresden").await;

        assert_eq!(address, Ok(Some(DeliveryAddress::new("Dresden", "Prager Straße", "12a"))));
    }
}
