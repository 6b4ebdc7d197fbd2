pub mod address;
pub mod fuzzy;
pub mod keywords;
pub mod pizza;

pub use address::{AddressValidator, RegexAddressExtractor};
pub use fuzzy::partial_ratio;
pub use keywords::{ConfirmationMatcher, KeywordSet};
pub use pizza::{PizzaNameValidator, DEFAULT_MATCH_THRESHOLD};
