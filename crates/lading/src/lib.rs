//! Bill-of-lading domain module.
//!
//! This crate contains the business rules for the B/L lifecycle -
//! issuance, shipped-on-board gating, the endorsement state machine and
//! cargo amendment - implemented purely as deterministic domain logic
//! (no IO, no storage).

pub mod bill;
pub mod cargo;
pub mod party;

pub use bill::{
    AmendCargo, BillCommand, BillEndorsed, BillEvent, BillIssued, BillOfLading, BillParticulars,
    BillState, CargoAmended, CargoReceiptRecorded, CommercialTerms, ContainerRedirected, Endorse,
    IssueBill, Issuance, LegalConditions, MarkShippedOnBoard, RecordCargoReceipt,
    RedirectContainer, ReassignVessel, ShippedOnBoard, TransportDetails, VesselReassigned,
    format_lifecycle_date, LIFECYCLE_DATE_FORMAT, SCHEMA_VERSION,
};
pub use cargo::{CargoAmendment, CargoDetails, DeclaredValue, Measurement, Weight};
pub use party::{Carrier, Party};
