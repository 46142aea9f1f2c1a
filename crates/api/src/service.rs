//! Application service: one method per front-end command.
//!
//! Business time is stamped here (`Utc::now`) so the domain layer stays
//! deterministic, and every operation runs inside a tracing span carrying a
//! correlation ID.

use chrono::Utc;
use uuid::Uuid;

use ebol_core::{BlNumber, DomainError, FieldFault};
use ebol_lading::{
    AmendCargo, BillCommand, BillOfLading, CargoAmendment, Endorse, MarkShippedOnBoard, Party,
    ReassignVessel, RecordCargoReceipt, RedirectContainer,
};
use ebol_registry::payload::{parse_bool, parse_f64, parse_u32, parse_u64};
use ebol_registry::{BillRegistry, KeyValueStore, RegistryError};

/// Raw amendment values as collected by the front-end.
///
/// `None` **and** empty strings mean "leave unchanged"; supplied values are
/// converted before any domain call, so a bad value rejects the whole
/// amendment and the stored record is never partially amended.
#[derive(Debug, Clone, Default)]
pub struct AmendRequest {
    pub number_of_packages: Option<String>,
    pub gross_weight: Option<String>,
    pub gross_weight_unit: Option<String>,
    pub description_of_goods: Option<String>,
    pub description_per_package: Option<String>,
    pub measurement: Option<String>,
    pub measurement_unit: Option<String>,
    pub declared_value_amount: Option<String>,
    pub declared_value_currency: Option<String>,
    pub additional_information: Option<String>,
    pub hazardous_material: Option<String>,
}

fn supplied(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
}

fn convert<T>(
    raw: Option<String>,
    faults: &mut Vec<FieldFault>,
    parse: impl Fn(&str) -> Result<T, FieldFault>,
) -> Option<T> {
    match supplied(raw) {
        None => None,
        Some(value) => match parse(&value) {
            Ok(parsed) => Some(parsed),
            Err(fault) => {
                faults.push(fault);
                None
            }
        },
    }
}

impl AmendRequest {
    fn into_amendment(self) -> Result<CargoAmendment, DomainError> {
        let mut faults = Vec::new();

        let amendment = CargoAmendment {
            number_of_packages: convert(self.number_of_packages, &mut faults, |v| {
                parse_u32("NumberOfPackages", v)
            }),
            gross_weight: convert(self.gross_weight, &mut faults, |v| {
                parse_u64("GrossWeight", v)
            }),
            gross_weight_unit: supplied(self.gross_weight_unit),
            description_of_goods: supplied(self.description_of_goods),
            description_per_package: supplied(self.description_per_package),
            measurement: convert(self.measurement, &mut faults, |v| {
                parse_f64("Measurement", v)
            }),
            measurement_unit: supplied(self.measurement_unit),
            declared_value_amount: convert(self.declared_value_amount, &mut faults, |v| {
                parse_u64("DeclaredCargoValueAmount", v)
            }),
            declared_value_currency: supplied(self.declared_value_currency),
            additional_information: supplied(self.additional_information),
            hazardous_material: convert(self.hazardous_material, &mut faults, |v| {
                parse_bool("HazardousMaterial", v)
            }),
        };

        if !faults.is_empty() {
            return Err(DomainError::conversion(faults));
        }
        Ok(amendment)
    }
}

/// The command surface over one registry.
#[derive(Debug)]
pub struct BillService<S> {
    registry: BillRegistry<S>,
}

impl<S> BillService<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self {
            registry: BillRegistry::new(store),
        }
    }

    pub fn registry(&self) -> &BillRegistry<S> {
        &self.registry
    }

    /// Create a bill of lading from the positional creation payload.
    pub fn create_bl(&self, payload: &str) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("create_bl", request_id = %Uuid::now_v7()).entered();
        self.registry.create_from_payload(payload, Utc::now())
    }

    /// Read one bill of lading.
    pub fn query_bl(&self, bl_number: &str) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("query_bl", bl_number, request_id = %Uuid::now_v7()).entered();
        let number = BlNumber::new(bl_number)?;
        self.registry.get(&number)
    }

    /// Read every bill of lading, in the store's native key ordering.
    pub fn query_all_bls(&self) -> Result<Vec<BillOfLading>, RegistryError> {
        let _span =
            tracing::info_span!("query_all_bls", request_id = %Uuid::now_v7()).entered();
        self.registry.list()
    }

    /// Overwrite the ocean vessel name.
    pub fn change_ocean_vessel(
        &self,
        bl_number: &str,
        new_vessel: &str,
    ) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("change_ocean_vessel", bl_number, request_id = %Uuid::now_v7())
                .entered();
        let number = BlNumber::new(bl_number)?;
        self.registry.execute(BillCommand::ReassignVessel(ReassignVessel {
            bl_number: number,
            new_vessel_name: new_vessel.to_string(),
            occurred_at: Utc::now(),
        }))
    }

    /// Confirm the cargo was loaded on board; gates the first endorsement.
    pub fn load_on_board(&self, bl_number: &str) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("load_on_board", bl_number, request_id = %Uuid::now_v7())
                .entered();
        let number = BlNumber::new(bl_number)?;
        self.registry
            .execute(BillCommand::MarkShippedOnBoard(MarkShippedOnBoard {
                bl_number: number,
                occurred_at: Utc::now(),
            }))
    }

    /// Endorse the bill to a new holder, optionally replacing the
    /// notify-party tuple.
    pub fn endorse(
        &self,
        bl_number: &str,
        notify_name: &str,
        notify_address: &str,
        notify_legal_form: &str,
        new_holder: &str,
        authorizer: &str,
    ) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("endorse", bl_number, new_holder, request_id = %Uuid::now_v7())
                .entered();
        let number = BlNumber::new(bl_number)?;

        let notify_supplied = !notify_name.trim().is_empty()
            || !notify_address.trim().is_empty()
            || !notify_legal_form.trim().is_empty();
        let notify_party = notify_supplied.then(|| Party {
            name: notify_name.to_string(),
            address: notify_address.to_string(),
            contact: String::new(),
            legal_form: notify_legal_form.to_string(),
        });

        let bill = self.registry.execute(BillCommand::Endorse(Endorse {
            bl_number: number,
            new_holder: new_holder.to_string(),
            authorizer: authorizer.to_string(),
            notify_party,
            occurred_at: Utc::now(),
        }))?;

        tracing::info!(state = ?bill.state(), "endorsement recorded");
        Ok(bill)
    }

    /// Selectively amend cargo/freight attributes from raw values.
    pub fn amend(
        &self,
        bl_number: &str,
        request: AmendRequest,
    ) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("amend", bl_number, request_id = %Uuid::now_v7()).entered();
        let number = BlNumber::new(bl_number)?;
        let updates = request.into_amendment()?;

        self.registry.execute(BillCommand::AmendCargo(AmendCargo {
            bl_number: number,
            updates,
            occurred_at: Utc::now(),
        }))
    }

    /// Redirect the container to a new place of delivery.
    pub fn redirect_container(
        &self,
        bl_number: &str,
        new_destination: &str,
    ) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("redirect_container", bl_number, request_id = %Uuid::now_v7())
                .entered();
        let number = BlNumber::new(bl_number)?;
        self.registry
            .execute(BillCommand::RedirectContainer(RedirectContainer {
                bl_number: number,
                new_destination: new_destination.to_string(),
                occurred_at: Utc::now(),
            }))
    }

    /// Record the container as returned before loading.
    pub fn record_cargo_receipt(&self, bl_number: &str) -> Result<BillOfLading, RegistryError> {
        let _span =
            tracing::info_span!("record_cargo_receipt", bl_number, request_id = %Uuid::now_v7())
                .entered();
        let number = BlNumber::new(bl_number)?;
        self.registry
            .execute(BillCommand::RecordCargoReceipt(RecordCargoReceipt {
                bl_number: number,
                occurred_at: Utc::now(),
            }))
    }
}
