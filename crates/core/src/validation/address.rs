use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::order::DeliveryAddress;
use crate::services::{AddressExtractor, AddressVerifier, ServiceError};

const LEADING_PHRASE: &str = r"(?i)^\s*(?:(?:my\s+)?address\s+is|i\s+live\s+(?:at|in)|deliver\s+(?:it\s+)?to|it'?s)\b\s*:?\s*";
const ADDRESS_SHAPE: &str = r"(?i)^\s*(?P<street>\p{L}[\p{L}\s.'\-]*?)\s+(?P<number>\d+[a-z]?)\s*,?\s+(?P<city>\p{L}[\p{L}\s\-]*?)\s*[.!]?\s*$";

fn leading_phrase() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LEADING_PHRASE).ok()).as_ref()
}

fn address_shape() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ADDRESS_SHAPE).ok()).as_ref()
}

/// Pulls `<street> <house number> <city>` out of an answer without any
/// external call.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegexAddressExtractor;

impl RegexAddressExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> Option<DeliveryAddress> {
        let stripped = match leading_phrase() {
            Some(pattern) => pattern.replace(text, "").into_owned(),
            None => text.to_string(),
        };
        let captures = address_shape()?.captures(&stripped)?;

        let address = DeliveryAddress::new(
            captures.name("city")?.as_str().trim(),
            captures.name("street")?.as_str().trim(),
            captures.name("number")?.as_str().trim(),
        );
        address.is_complete().then_some(address)
    }
}

#[async_trait]
impl AddressExtractor for RegexAddressExtractor {
    async fn extract(&self, text: &str) -> Result<Option<DeliveryAddress>, ServiceError> {
        Ok(self.parse(text))
    }
}

/// Extracts an address from an answer and confirms it with the delivery
/// service. Anything short of a fully verified triple is `None`.
#[derive(Clone)]
pub struct AddressValidator {
    extractor: Arc<dyn AddressExtractor>,
    verifier: Arc<dyn AddressVerifier>,
}

impl AddressValidator {
    pub fn new(extractor: Arc<dyn AddressExtractor>, verifier: Arc<dyn AddressVerifier>) -> Self {
        Self { extractor, verifier }
    }

    pub async fn validate(&self, text: &str) -> Option<DeliveryAddress> {
        let address = match self.extractor.extract(text).await {
            Ok(Some(address)) if address.is_complete() => address,
            Ok(_) => {
                debug!(
                    event_name = "validation.address.not_extracted",
                    "no complete address found in answer"
                );
                return None;
            }
            Err(error) => {
                warn!(
                    event_name = "validation.address.extraction_failed",
                    error = %error,
                    "address extraction failed"
                );
                return None;
            }
        };

        match self.verifier.verify(&address).await {
            Ok(()) => Some(address),
            Err(error) => {
                warn!(
                    event_name = "validation.address.rejected",
                    city = %address.city,
                    error = %error,
                    "address verification did not succeed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{AddressValidator, RegexAddressExtractor};
    use crate::domain::order::DeliveryAddress;
    use crate::services::{AddressExtractor, AddressVerifier, InMemoryPizzaService, ServiceError};

    struct RejectingVerifier;

    #[async_trait]
    impl AddressVerifier for RejectingVerifier {
        async fn verify(&self, _address: &DeliveryAddress) -> Result<(), ServiceError> {
            Err(ServiceError::Status { status: 503, detail: "down for maintenance".to_string() })
        }
    }

    struct PartialExtractor;

    #[async_trait]
    impl AddressExtractor for PartialExtractor {
        async fn extract(&self, _text: &str) -> Result<Option<DeliveryAddress>, ServiceError> {
            Ok(Some(DeliveryAddress::new("Leipzig", "Hauptstraße", "")))
        }
    }

    #[test]
    fn regex_extracts_street_number_and_city() {
        let extractor = RegexAddressExtractor::new();

        assert_eq!(
            extractor.parse("Hauptstraße 5 Leipzig"),
            Some(DeliveryAddress::new("Leipzig", "Hauptstraße", "5"))
        );
        assert_eq!(
            extractor.parse("Gustav-Freytag-Straße 42a, Leipzig"),
            Some(DeliveryAddress::new("Leipzig", "Gustav-Freytag-Straße", "42a"))
        );
        assert_eq!(
            extractor.parse("My address is Am Markt 1 Halle."),
            Some(DeliveryAddress::new("Halle", "Am Markt", "1"))
        );
    }

    #[test]
    fn regex_rejects_answers_without_the_expected_shape() {
        let extractor = RegexAddressExtractor::new();

        assert_eq!(extractor.parse("Leipzig"), None);
        assert_eq!(extractor.parse("Hauptstraße Leipzig"), None);
        assert_eq!(extractor.parse("5 Leipzig"), None);
        assert_eq!(extractor.parse(""), None);
    }

    #[tokio::test]
    async fn verified_address_is_returned() {
        let service = Arc::new(InMemoryPizzaService::default());
        let validator = AddressValidator::new(Arc::new(RegexAddressExtractor::new()), service);

        assert_eq!(
            validator.validate("Hauptstraße 5 Leipzig").await,
            Some(DeliveryAddress::new("Leipzig", "Hauptstraße", "5"))
        );
    }

    #[tokio::test]
    async fn non_success_verification_yields_none() {
        let validator = AddressValidator::new(
            Arc::new(RegexAddressExtractor::new()),
            Arc::new(RejectingVerifier),
        );

        assert_eq!(validator.validate("Hauptstraße 5 Leipzig").await, None);
    }

    #[tokio::test]
    async fn undeliverable_city_yields_none() {
        let validator = AddressValidator::new(
            Arc::new(RegexAddressExtractor::new()),
            Arc::new(InMemoryPizzaService::default()),
        );

        assert_eq!(validator.validate("Hauptstraße 5 Berlin").await, None);
    }

    #[tokio::test]
    async fn partial_extraction_never_reaches_verifier() {
        let validator =
            AddressValidator::new(Arc::new(PartialExtractor), Arc::new(InMemoryPizzaService::default()));

        assert_eq!(validator.validate("Hauptstraße Leipzig").await, None);
    }
}
