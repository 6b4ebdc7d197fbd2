use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Declaration order is the elicitation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotId {
    PizzaName,
    CustomerAddress,
    #[serde(rename = "additional_information")]
    AdditionalInfoFlag,
    CustomerTelNumber,
    DeliveryTime,
    #[serde(rename = "order_confirmation")]
    OrderIdConfirmation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Required,
    Optional,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotValidator {
    PizzaName,
    Address,
    Confirmation,
    FreeText,
}

impl SlotId {
    pub const ALL: [SlotId; 6] = [
        SlotId::PizzaName,
        SlotId::CustomerAddress,
        SlotId::AdditionalInfoFlag,
        SlotId::CustomerTelNumber,
        SlotId::DeliveryTime,
        SlotId::OrderIdConfirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PizzaName => "pizza_name",
            Self::CustomerAddress => "customer_address",
            Self::AdditionalInfoFlag => "additional_information",
            Self::CustomerTelNumber => "customer_tel_number",
            Self::DeliveryTime => "delivery_time",
            Self::OrderIdConfirmation => "order_confirmation",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::PizzaName => 0,
            Self::CustomerAddress => 1,
            Self::AdditionalInfoFlag => 2,
            Self::CustomerTelNumber => 3,
            Self::DeliveryTime => 4,
            Self::OrderIdConfirmation => 5,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::PizzaName => "What pizza would you like to order?",
            Self::CustomerAddress => "What is your delivery address?",
            Self::AdditionalInfoFlag => {
                "Would you like to add additional information to your order (e.g. telephone number / specific delivery time)?"
            }
            Self::CustomerTelNumber => "What telephone number would you like to be reached at?",
            Self::DeliveryTime => "What delivery time would you prefer?",
            Self::OrderIdConfirmation => {
                "Shall I place your order now? Please answer with yes to confirm."
            }
        }
    }

    pub fn default_requirement(&self) -> Requirement {
        match self {
            Self::PizzaName | Self::CustomerAddress | Self::AdditionalInfoFlag => {
                Requirement::Required
            }
            Self::CustomerTelNumber | Self::DeliveryTime | Self::OrderIdConfirmation => {
                Requirement::Optional
            }
        }
    }

    pub fn validator(&self) -> SlotValidator {
        match self {
            Self::PizzaName => SlotValidator::PizzaName,
            Self::CustomerAddress => SlotValidator::Address,
            Self::OrderIdConfirmation => SlotValidator::Confirmation,
            Self::AdditionalInfoFlag | Self::CustomerTelNumber | Self::DeliveryTime => {
                SlotValidator::FreeText
            }
        }
    }

    /// The yes/no question that opens the optional-information sub-dialogue.
    pub fn opens_optional_info(&self) -> bool {
        matches!(self, Self::AdditionalInfoFlag)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        SlotId::ALL
            .into_iter()
            .find(|slot| slot.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownSlot(value.trim().to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotSpec {
    pub id: SlotId,
    pub requirement: Requirement,
}

/// The slot set a deployment elicits, kept in elicitation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotCatalog {
    specs: Vec<SlotSpec>,
}

impl Default for SlotCatalog {
    fn default() -> Self {
        let specs = [
            SlotId::PizzaName,
            SlotId::CustomerAddress,
            SlotId::AdditionalInfoFlag,
            SlotId::CustomerTelNumber,
            SlotId::DeliveryTime,
        ]
        .into_iter()
        .map(|id| SlotSpec { id, requirement: id.default_requirement() })
        .collect();
        Self { specs }
    }
}

impl SlotCatalog {
    pub fn new(required: &[SlotId], optional: &[SlotId]) -> Result<Self, DomainError> {
        let mut specs: Vec<SlotSpec> = Vec::with_capacity(required.len() + optional.len());
        let tagged = required
            .iter()
            .map(|id| (*id, Requirement::Required))
            .chain(optional.iter().map(|id| (*id, Requirement::Optional)));

        for (id, requirement) in tagged {
            if specs.iter().any(|spec| spec.id == id) {
                return Err(DomainError::DuplicateSlot(id.to_string()));
            }
            specs.push(SlotSpec { id, requirement });
        }

        specs.sort_by_key(|spec| spec.id.rank());
        Ok(Self { specs })
    }

    pub fn from_names(required: &[String], optional: &[String]) -> Result<Self, DomainError> {
        let parse = |names: &[String]| {
            names.iter().map(|name| name.parse::<SlotId>()).collect::<Result<Vec<_>, _>>()
        };
        Self::new(&parse(required)?, &parse(optional)?)
    }

    pub fn specs(&self) -> &[SlotSpec] {
        &self.specs
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.specs.iter().any(|spec| spec.id == slot)
    }

    pub fn missing_required(&self, filled: &BTreeMap<SlotId, String>) -> Vec<SlotId> {
        self.missing(filled, Requirement::Required)
    }

    pub fn missing_optional(&self, filled: &BTreeMap<SlotId, String>) -> Vec<SlotId> {
        self.missing(filled, Requirement::Optional)
    }

    fn missing(&self, filled: &BTreeMap<SlotId, String>, requirement: Requirement) -> Vec<SlotId> {
        self.specs
            .iter()
            .filter(|spec| spec.requirement == requirement && !filled.contains_key(&spec.id))
            .map(|spec| spec.id)
            .collect()
    }
}
