//! Cargo and freight value objects, plus the selective amendment set.

use serde::{Deserialize, Serialize};

use ebol_core::ValueObject;

/// Gross weight with its unit of measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Weight {
    pub amount: u64,
    pub unit: String,
}

impl ValueObject for Weight {}

/// Volumetric measurement with its unit of measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    pub amount: f64,
    pub unit: String,
}

impl ValueObject for Measurement {}

/// Declared cargo value in a named currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeclaredValue {
    pub amount: u64,
    pub currency: String,
}

impl ValueObject for DeclaredValue {}

/// The cargo/freight description block of the bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CargoDetails {
    pub marks_and_numbers: String,
    pub number_of_packages: u32,
    pub gross_weight: Weight,
    pub description_of_goods: String,
    pub description_per_package: String,
    pub measurement: Measurement,
    pub declared_value: DeclaredValue,
    pub additional_information: String,
    pub hazardous_material: bool,
}

/// Field-selective correction of cargo/freight attributes after issuance.
///
/// `None` leaves the stored attribute unchanged; `Some` overwrites exactly
/// that attribute. Conversions from raw input happen before any of this is
/// applied, so a stored record is never left partially amended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CargoAmendment {
    pub number_of_packages: Option<u32>,
    pub gross_weight: Option<u64>,
    pub gross_weight_unit: Option<String>,
    pub description_of_goods: Option<String>,
    pub description_per_package: Option<String>,
    pub measurement: Option<f64>,
    pub measurement_unit: Option<String>,
    pub declared_value_amount: Option<u64>,
    pub declared_value_currency: Option<String>,
    pub additional_information: Option<String>,
    pub hazardous_material: Option<bool>,
}

impl CargoAmendment {
    /// True when no attribute is being amended.
    pub fn is_empty(&self) -> bool {
        self.number_of_packages.is_none()
            && self.gross_weight.is_none()
            && self.gross_weight_unit.is_none()
            && self.description_of_goods.is_none()
            && self.description_per_package.is_none()
            && self.measurement.is_none()
            && self.measurement_unit.is_none()
            && self.declared_value_amount.is_none()
            && self.declared_value_currency.is_none()
            && self.additional_information.is_none()
            && self.hazardous_material.is_none()
    }

    /// Overwrite exactly the supplied attributes on `cargo`.
    pub fn apply_to(&self, cargo: &mut CargoDetails) {
        if let Some(v) = self.number_of_packages {
            cargo.number_of_packages = v;
        }
        if let Some(v) = self.gross_weight {
            cargo.gross_weight.amount = v;
        }
        if let Some(v) = &self.gross_weight_unit {
            cargo.gross_weight.unit = v.clone();
        }
        if let Some(v) = &self.description_of_goods {
            cargo.description_of_goods = v.clone();
        }
        if let Some(v) = &self.description_per_package {
            cargo.description_per_package = v.clone();
        }
        if let Some(v) = self.measurement {
            cargo.measurement.amount = v;
        }
        if let Some(v) = &self.measurement_unit {
            cargo.measurement.unit = v.clone();
        }
        if let Some(v) = self.declared_value_amount {
            cargo.declared_value.amount = v;
        }
        if let Some(v) = &self.declared_value_currency {
            cargo.declared_value.currency = v.clone();
        }
        if let Some(v) = &self.additional_information {
            cargo.additional_information = v.clone();
        }
        if let Some(v) = self.hazardous_material {
            cargo.hazardous_material = v;
        }
    }
}
