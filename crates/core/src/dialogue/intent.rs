use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::{IntentClassifier, IntentExample};
use crate::validation::KeywordSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PlaceOrder,
    Describe,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlaceOrder => "place_order",
            Self::Describe => "describe",
        }
    }
}

#[async_trait]
pub trait IntentDetector: Send + Sync {
    async fn detects(&self, intent: Intent, text: &str) -> bool;
}

/// Order intent needs every order keyword; description intent needs any
/// description keyword.
#[derive(Clone, Debug)]
pub struct KeywordIntentDetector {
    order: KeywordSet,
    description: KeywordSet,
}

impl KeywordIntentDetector {
    pub fn new(order: KeywordSet, description: KeywordSet) -> Self {
        Self { order, description }
    }
}

impl Default for KeywordIntentDetector {
    fn default() -> Self {
        Self::new(
            KeywordSet::new(["order", "pizza"]),
            KeywordSet::new(["menu", "describe", "description"]),
        )
    }
}

#[async_trait]
impl IntentDetector for KeywordIntentDetector {
    async fn detects(&self, intent: Intent, text: &str) -> bool {
        match intent {
            Intent::PlaceOrder => self.order.matches_all(text),
            Intent::Describe => self.description.matches_any(text),
        }
    }
}

/// Asks a classifier with a fixed set of labelled examples per intent.
#[derive(Clone)]
pub struct FewShotIntentDetector {
    classifier: Arc<dyn IntentClassifier>,
    order_examples: Vec<IntentExample>,
    description_examples: Vec<IntentExample>,
}

impl FewShotIntentDetector {
    pub fn new(classifier: Arc<dyn IntentClassifier>) -> Self {
        Self {
            classifier,
            order_examples: vec![
                IntentExample::positive("I want to order a pizza"),
                IntentExample::positive("Can I get a pizza delivered to my place?"),
                IntentExample::positive("I'd like to place an order"),
                IntentExample::negative("What's the weather like today?"),
                IntentExample::negative("Hello there"),
                IntentExample::negative("What pizzas do you have?"),
            ],
            description_examples: vec![
                IntentExample::positive("What pizzas do you have?"),
                IntentExample::positive("Can you show me the menu?"),
                IntentExample::positive("What is on a Quattro Formaggi?"),
                IntentExample::negative("I want to order a pizza"),
                IntentExample::negative("Pepperoni"),
                IntentExample::negative("Hauptstraße 5 Leipzig"),
            ],
        }
    }

    pub fn examples(&self, intent: Intent) -> &[IntentExample] {
        match intent {
            Intent::PlaceOrder => &self.order_examples,
            Intent::Describe => &self.description_examples,
        }
    }
}

#[async_trait]
impl IntentDetector for FewShotIntentDetector {
    async fn detects(&self, intent: Intent, text: &str) -> bool {
        match self.classifier.classify(text, self.examples(intent)).await {
            Ok(detected) => detected,
            Err(error) => {
                warn!(
                    event_name = "dialogue.intent.classification_failed",
                    intent = intent.as_str(),
                    error = %error,
                    "intent classification failed; treating as not detected"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{FewShotIntentDetector, Intent, IntentDetector, KeywordIntentDetector};
    use crate::services::{IntentClassifier, IntentExample, ServiceError};
    use crate::validation::KeywordSet;

    #[derive(Default)]
    struct RecordingClassifier {
        seen: Mutex<Vec<(String, usize)>>,
        fail: bool,
    }

    #[async_trait]
    impl IntentClassifier for RecordingClassifier {
        async fn classify(
            &self,
            text: &str,
            examples: &[IntentExample],
        ) -> Result<bool, ServiceError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((text.to_string(), examples.len()));
            }
            if self.fail {
                return Err(ServiceError::Transport("timeout".to_string()));
            }
            Ok(examples.iter().any(|example| example.matches && example.text == text))
        }
    }

    #[tokio::test]
    async fn keyword_detector_requires_every_order_keyword() {
        let detector = KeywordIntentDetector::new(KeywordSet::new(["order"]), KeywordSet::default());

        assert!(detector.detects(Intent::PlaceOrder, "I want to order a pizza").await);
        assert!(!detector.detects(Intent::PlaceOrder, "hello").await);
        assert!(!detector.detects(Intent::Describe, "show me the menu").await);
    }

    #[tokio::test]
    async fn default_keyword_detector_spots_menu_requests() {
        let detector = KeywordIntentDetector::default();

        assert!(detector.detects(Intent::Describe, "Can I see the MENU?").await);
        assert!(!detector.detects(Intent::PlaceOrder, "I want to order").await);
    }

    #[tokio::test]
    async fn few_shot_detector_passes_intent_specific_examples() {
        let classifier = Arc::new(RecordingClassifier::default());
        let detector = FewShotIntentDetector::new(classifier.clone());

        assert!(detector.detects(Intent::PlaceOrder, "I want to order a pizza").await);
        assert!(detector.detects(Intent::Describe, "Can you show me the menu?").await);

        let seen = classifier.seen.lock().map(|seen| seen.clone()).unwrap_or_default();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1, detector.examples(Intent::PlaceOrder).len());
    }

    #[tokio::test]
    async fn classifier_failure_counts_as_not_detected() {
        let classifier = Arc::new(RecordingClassifier { fail: true, ..Default::default() });
        let detector = FewShotIntentDetector::new(classifier);

        assert!(!detector.detects(Intent::PlaceOrder, "I want to order a pizza").await);
    }
}
