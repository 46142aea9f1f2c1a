use serde::{Deserialize, Serialize};

use ebol_core::ValueObject;

/// A named party to the contract of carriage.
///
/// Fields mirror the document surface: free-form strings, empty when the
/// document leaves them blank. A bill consigned "to order" typically leaves
/// the consignee name empty until the first endorsement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Party {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub legal_form: String,
}

impl Party {
    /// Whether the document names this party at all.
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl ValueObject for Party {}

/// The carrier: a party plus the trailer/equipment reference it operates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Carrier {
    #[serde(flatten)]
    pub party: Party,
    pub trailer_number: String,
}

impl Carrier {
    /// The carrier's name; endorsing the bill to this name surrenders it.
    pub fn name(&self) -> &str {
        &self.party.name
    }
}

impl ValueObject for Carrier {}
