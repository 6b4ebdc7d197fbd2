pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod services;
pub mod validation;

pub use dialogue::{
    DialogueEngine, DialogueServices, DialogueSettings, DialogueState, Message, Route, SlotCatalog,
    SlotId, TurnOutcome,
};
pub use domain::menu::{MenuItem, PizzaId};
pub use domain::order::{DeliveryAddress, OrderReceipt, OrderRequest, OrderStatus};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use services::{
    AddressExtractor, AddressVerifier, InMemoryPizzaService, IntentClassifier, IntentExample,
    MenuSource, OrderSubmitter, ServiceError,
};
