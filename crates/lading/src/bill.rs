use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ebol_core::{Aggregate, AggregateRoot, BlNumber, Command, DomainError, Event};

use crate::cargo::{CargoAmendment, CargoDetails};
use crate::party::{Carrier, Party};

/// Version tag of the persisted record schema.
pub const SCHEMA_VERSION: u32 = 1;

/// Fixed lifecycle timestamp format (`DD.MM.YYYY hh:mm:ss`).
///
/// Compatibility contract: the shipped-on-board, cargo-received and
/// endorsement dates are stored in this rendering.
pub const LIFECYCLE_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Render business time for the lifecycle/endorsement date fields.
pub fn format_lifecycle_date(at: DateTime<Utc>) -> String {
    at.format(LIFECYCLE_DATE_FORMAT).to_string()
}

/// Issuance block: when, where and in how many originals the bill was issued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Issuance {
    /// Document date as printed on the bill (free-form).
    pub date_of_issue: String,
    pub place_of_issue: String,
    pub number_of_originals: u32,
}

/// Commercial terms of the carriage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommercialTerms {
    pub incoterms: String,
    pub freight_charges_currency: String,
    pub prepaid: bool,
    pub collect: bool,
}

/// Routing and equipment details of the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransportDetails {
    pub port_of_loading: String,
    pub port_of_discharge: String,
    pub place_of_receipt: String,
    pub place_of_delivery: String,
    pub ocean_vessel_name: String,
    pub container_number: String,
    pub full_container_load: bool,
    pub less_than_container_load: bool,
}

/// Conditions of carriage, governing law and forum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegalConditions {
    pub transport_conditions: String,
    pub applicable_law: String,
    pub place_of_jurisdiction: String,
}

/// The full attribute set supplied at issuance.
///
/// This is the named creation structure; the positional wire payload is
/// decoded into it at the registry boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillParticulars {
    pub issuance: Issuance,
    pub shipper: Party,
    pub consignee: Party,
    pub carrier: Carrier,
    pub forwarding_agent: Party,
    pub notify_party: Party,
    pub commercial_terms: CommercialTerms,
    pub transport: TransportDetails,
    pub cargo: CargoDetails,
    pub customer_order_number: u64,
    pub legal_conditions: LegalConditions,
    /// Issued "to order" (negotiable) versus straight (fixed consignee).
    pub to_order: bool,
}

/// Negotiability lifecycle of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillState {
    /// Issued, cargo not yet shipped on board.
    Issued,
    /// Shipped and transferable; zero or more endorsements made.
    Negotiable,
    /// No longer transferable: straight bill, or redeemed to the carrier.
    Closed,
}

fn issued_on_load() -> bool {
    true
}

/// Aggregate root: one bill of lading, keyed by its reference number.
///
/// The serialized form of this struct is the persisted record (canonical
/// schema, `SchemaVersion` tag). Endorsement state is only ever mutated
/// through `apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillOfLading {
    schema_version: u32,
    #[serde(rename = "BLNumber")]
    bl_number: BlNumber,
    issuance: Issuance,
    shipper: Party,
    consignee: Party,
    carrier: Carrier,
    forwarding_agent: Party,
    notify_party: Party,
    commercial_terms: CommercialTerms,
    transport: TransportDetails,
    cargo: CargoDetails,
    customer_order_number: u64,
    legal_conditions: LegalConditions,
    cargo_received_date: Option<String>,
    shipped_on_board_date: Option<String>,
    to_order: bool,
    transferable: bool,
    order_date: Option<String>,
    order_to: Option<String>,
    order_at: Option<String>,
    // Snapshots exist only for issued bills; fresh instances come from `empty`.
    #[serde(skip, default = "issued_on_load")]
    created: bool,
    #[serde(skip)]
    version: u64,
}

impl BillOfLading {
    /// Create an empty, not-yet-issued instance for rehydration.
    pub fn empty(bl_number: BlNumber) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            bl_number,
            issuance: Issuance::default(),
            shipper: Party::default(),
            consignee: Party::default(),
            carrier: Carrier::default(),
            forwarding_agent: Party::default(),
            notify_party: Party::default(),
            commercial_terms: CommercialTerms::default(),
            transport: TransportDetails::default(),
            cargo: CargoDetails::default(),
            customer_order_number: 0,
            legal_conditions: LegalConditions::default(),
            cargo_received_date: None,
            shipped_on_board_date: None,
            to_order: false,
            transferable: false,
            order_date: None,
            order_to: None,
            order_at: None,
            created: false,
            version: 0,
        }
    }

    pub fn bl_number(&self) -> &BlNumber {
        &self.bl_number
    }

    /// Derived negotiability state.
    pub fn state(&self) -> BillState {
        if !self.transferable {
            BillState::Closed
        } else if self.shipped_on_board_date.is_none() {
            BillState::Issued
        } else {
            BillState::Negotiable
        }
    }

    pub fn transferable(&self) -> bool {
        self.transferable
    }

    pub fn to_order(&self) -> bool {
        self.to_order
    }

    pub fn shipped_on_board_date(&self) -> Option<&str> {
        self.shipped_on_board_date.as_deref()
    }

    pub fn cargo_received_date(&self) -> Option<&str> {
        self.cargo_received_date.as_deref()
    }

    /// Current holder, set by the most recent endorsement.
    pub fn order_to(&self) -> Option<&str> {
        self.order_to.as_deref()
    }

    /// Party that performed the most recent endorsement.
    pub fn order_at(&self) -> Option<&str> {
        self.order_at.as_deref()
    }

    pub fn order_date(&self) -> Option<&str> {
        self.order_date.as_deref()
    }

    pub fn issuance(&self) -> &Issuance {
        &self.issuance
    }

    pub fn shipper(&self) -> &Party {
        &self.shipper
    }

    pub fn consignee(&self) -> &Party {
        &self.consignee
    }

    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    pub fn forwarding_agent(&self) -> &Party {
        &self.forwarding_agent
    }

    pub fn notify_party(&self) -> &Party {
        &self.notify_party
    }

    pub fn commercial_terms(&self) -> &CommercialTerms {
        &self.commercial_terms
    }

    pub fn transport(&self) -> &TransportDetails {
        &self.transport
    }

    pub fn cargo(&self) -> &CargoDetails {
        &self.cargo
    }

    pub fn customer_order_number(&self) -> u64 {
        self.customer_order_number
    }

    pub fn legal_conditions(&self) -> &LegalConditions {
        &self.legal_conditions
    }
}

impl AggregateRoot for BillOfLading {
    type Id = BlNumber;

    fn id(&self) -> &Self::Id {
        &self.bl_number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueBill - create the record with its full particulars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueBill {
    pub bl_number: BlNumber,
    pub particulars: BillParticulars,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkShippedOnBoard - confirm cargo was loaded onto the vessel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkShippedOnBoard {
    pub bl_number: BlNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Endorse - transfer custody to a new holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorse {
    pub bl_number: BlNumber,
    pub new_holder: String,
    pub authorizer: String,
    /// Replacement notify-party tuple, applied only on success.
    pub notify_party: Option<Party>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AmendCargo - selective correction of cargo/freight attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmendCargo {
    pub bl_number: BlNumber,
    pub updates: CargoAmendment,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReassignVessel - overwrite the ocean vessel name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignVessel {
    pub bl_number: BlNumber,
    pub new_vessel_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RedirectContainer - change the place of delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectContainer {
    pub bl_number: BlNumber,
    pub new_destination: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordCargoReceipt - container returned before loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCargoReceipt {
    pub bl_number: BlNumber,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BillCommand {
    IssueBill(IssueBill),
    MarkShippedOnBoard(MarkShippedOnBoard),
    Endorse(Endorse),
    AmendCargo(AmendCargo),
    ReassignVessel(ReassignVessel),
    RedirectContainer(RedirectContainer),
    RecordCargoReceipt(RecordCargoReceipt),
}

impl Command for BillCommand {
    fn target(&self) -> &BlNumber {
        match self {
            BillCommand::IssueBill(c) => &c.bl_number,
            BillCommand::MarkShippedOnBoard(c) => &c.bl_number,
            BillCommand::Endorse(c) => &c.bl_number,
            BillCommand::AmendCargo(c) => &c.bl_number,
            BillCommand::ReassignVessel(c) => &c.bl_number,
            BillCommand::RedirectContainer(c) => &c.bl_number,
            BillCommand::RecordCargoReceipt(c) => &c.bl_number,
        }
    }
}

/// Event: BillIssued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillIssued {
    pub bl_number: BlNumber,
    pub particulars: BillParticulars,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ShippedOnBoard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippedOnBoard {
    pub bl_number: BlNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BillEndorsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillEndorsed {
    pub bl_number: BlNumber,
    pub new_holder: String,
    pub endorsed_by: String,
    pub notify_party: Option<Party>,
    /// True when the bill was endorsed to the carrier (redemption); the
    /// bill stops being transferable.
    pub surrendered: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CargoAmended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoAmended {
    pub bl_number: BlNumber,
    pub updates: CargoAmendment,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VesselReassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselReassigned {
    pub bl_number: BlNumber,
    pub new_vessel_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ContainerRedirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRedirected {
    pub bl_number: BlNumber,
    pub new_destination: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CargoReceiptRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoReceiptRecorded {
    pub bl_number: BlNumber,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BillEvent {
    BillIssued(BillIssued),
    ShippedOnBoard(ShippedOnBoard),
    BillEndorsed(BillEndorsed),
    CargoAmended(CargoAmended),
    VesselReassigned(VesselReassigned),
    ContainerRedirected(ContainerRedirected),
    CargoReceiptRecorded(CargoReceiptRecorded),
}

impl Event for BillEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BillEvent::BillIssued(_) => "lading.bill.issued",
            BillEvent::ShippedOnBoard(_) => "lading.bill.shipped_on_board",
            BillEvent::BillEndorsed(_) => "lading.bill.endorsed",
            BillEvent::CargoAmended(_) => "lading.bill.cargo_amended",
            BillEvent::VesselReassigned(_) => "lading.bill.vessel_reassigned",
            BillEvent::ContainerRedirected(_) => "lading.bill.container_redirected",
            BillEvent::CargoReceiptRecorded(_) => "lading.bill.cargo_receipt_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BillEvent::BillIssued(e) => e.occurred_at,
            BillEvent::ShippedOnBoard(e) => e.occurred_at,
            BillEvent::BillEndorsed(e) => e.occurred_at,
            BillEvent::CargoAmended(e) => e.occurred_at,
            BillEvent::VesselReassigned(e) => e.occurred_at,
            BillEvent::ContainerRedirected(e) => e.occurred_at,
            BillEvent::CargoReceiptRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for BillOfLading {
    type Command = BillCommand;
    type Event = BillEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BillEvent::BillIssued(e) => {
                let p = e.particulars.clone();
                self.schema_version = SCHEMA_VERSION;
                self.bl_number = e.bl_number.clone();
                self.issuance = p.issuance;
                self.shipper = p.shipper;
                self.consignee = p.consignee;
                self.carrier = p.carrier;
                self.forwarding_agent = p.forwarding_agent;
                self.notify_party = p.notify_party;
                self.commercial_terms = p.commercial_terms;
                self.transport = p.transport;
                self.cargo = p.cargo;
                self.customer_order_number = p.customer_order_number;
                self.legal_conditions = p.legal_conditions;
                self.cargo_received_date = None;
                self.shipped_on_board_date = None;
                self.to_order = p.to_order;
                // Negotiable bills start transferable; straight bills never are.
                self.transferable = p.to_order;
                self.order_date = None;
                self.order_to = None;
                self.order_at = None;
                self.created = true;
            }
            BillEvent::ShippedOnBoard(e) => {
                self.shipped_on_board_date = Some(format_lifecycle_date(e.occurred_at));
            }
            BillEvent::BillEndorsed(e) => {
                if let Some(notify) = &e.notify_party {
                    self.notify_party = notify.clone();
                }
                self.order_date = Some(format_lifecycle_date(e.occurred_at));
                self.order_to = Some(e.new_holder.clone());
                self.order_at = Some(e.endorsed_by.clone());
                if e.surrendered {
                    self.transferable = false;
                }
            }
            BillEvent::CargoAmended(e) => {
                e.updates.apply_to(&mut self.cargo);
            }
            BillEvent::VesselReassigned(e) => {
                self.transport.ocean_vessel_name = e.new_vessel_name.clone();
            }
            BillEvent::ContainerRedirected(e) => {
                self.transport.place_of_delivery = e.new_destination.clone();
            }
            BillEvent::CargoReceiptRecorded(e) => {
                self.cargo_received_date = Some(format_lifecycle_date(e.occurred_at));
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BillCommand::IssueBill(cmd) => self.handle_issue(cmd),
            BillCommand::MarkShippedOnBoard(cmd) => self.handle_mark_shipped(cmd),
            BillCommand::Endorse(cmd) => self.handle_endorse(cmd),
            BillCommand::AmendCargo(cmd) => self.handle_amend(cmd),
            BillCommand::ReassignVessel(cmd) => self.handle_reassign_vessel(cmd),
            BillCommand::RedirectContainer(cmd) => self.handle_redirect(cmd),
            BillCommand::RecordCargoReceipt(cmd) => self.handle_record_receipt(cmd),
        }
    }
}

impl BillOfLading {
    fn ensure_bl_number(&self, bl_number: &BlNumber) -> Result<(), DomainError> {
        if &self.bl_number != bl_number {
            return Err(DomainError::validation("bl_number mismatch"));
        }
        Ok(())
    }

    fn ensure_issued(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(self.bl_number.as_str()));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueBill) -> Result<Vec<BillEvent>, DomainError> {
        if self.created {
            return Err(DomainError::duplicate_key(self.bl_number.as_str()));
        }
        self.ensure_bl_number(&cmd.bl_number)?;

        if !cmd.particulars.shipper.is_named() {
            return Err(DomainError::validation("shipper name cannot be empty"));
        }
        if cmd.particulars.carrier.name().trim().is_empty() {
            return Err(DomainError::validation("carrier name cannot be empty"));
        }

        Ok(vec![BillEvent::BillIssued(BillIssued {
            bl_number: cmd.bl_number.clone(),
            particulars: cmd.particulars.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_shipped(&self, cmd: &MarkShippedOnBoard) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_issued()?;
        self.ensure_bl_number(&cmd.bl_number)?;

        if let Some(date) = &self.shipped_on_board_date {
            return Err(DomainError::already_shipped(self.bl_number.as_str(), date));
        }

        Ok(vec![BillEvent::ShippedOnBoard(ShippedOnBoard {
            bl_number: cmd.bl_number.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_endorse(&self, cmd: &Endorse) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_issued()?;
        self.ensure_bl_number(&cmd.bl_number)?;

        if !self.transferable {
            return Err(DomainError::not_negotiable(self.bl_number.as_str()));
        }

        if self.shipped_on_board_date.is_none() {
            return Err(DomainError::not_shipped(self.bl_number.as_str()));
        }

        if cmd.new_holder.trim().is_empty() {
            return Err(DomainError::InvalidHolder);
        }

        // First endorsement: entitlement sits with the named consignee, or
        // with the shipper when the bill is consigned to shipper's order.
        // Straight bills never reach this point (transferability gate).
        // Later endorsements: entitlement sits with the current holder.
        let expected = match &self.order_to {
            None => {
                if self.consignee.is_named() {
                    self.consignee.name.as_str()
                } else {
                    self.shipper.name.as_str()
                }
            }
            Some(current_holder) => current_holder.as_str(),
        };
        if cmd.authorizer != expected {
            return Err(DomainError::unauthorized_endorser(&cmd.authorizer, expected));
        }

        // Endorsing to the carrier surrenders the document for cargo release.
        let surrendered = cmd.new_holder == self.carrier.name();

        Ok(vec![BillEvent::BillEndorsed(BillEndorsed {
            bl_number: cmd.bl_number.clone(),
            new_holder: cmd.new_holder.clone(),
            endorsed_by: cmd.authorizer.clone(),
            notify_party: cmd.notify_party.clone(),
            surrendered,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_amend(&self, cmd: &AmendCargo) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_issued()?;
        self.ensure_bl_number(&cmd.bl_number)?;

        // No constraint from the negotiability state machine; an empty
        // amendment is a no-op and produces no write.
        if cmd.updates.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![BillEvent::CargoAmended(CargoAmended {
            bl_number: cmd.bl_number.clone(),
            updates: cmd.updates.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reassign_vessel(&self, cmd: &ReassignVessel) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_issued()?;
        self.ensure_bl_number(&cmd.bl_number)?;

        if cmd.new_vessel_name.trim().is_empty() {
            return Err(DomainError::validation("vessel name cannot be empty"));
        }

        Ok(vec![BillEvent::VesselReassigned(VesselReassigned {
            bl_number: cmd.bl_number.clone(),
            new_vessel_name: cmd.new_vessel_name.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_redirect(&self, cmd: &RedirectContainer) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_issued()?;
        self.ensure_bl_number(&cmd.bl_number)?;

        if cmd.new_destination.trim().is_empty() {
            return Err(DomainError::validation("destination cannot be empty"));
        }

        Ok(vec![BillEvent::ContainerRedirected(ContainerRedirected {
            bl_number: cmd.bl_number.clone(),
            new_destination: cmd.new_destination.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_receipt(&self, cmd: &RecordCargoReceipt) -> Result<Vec<BillEvent>, DomainError> {
        self.ensure_issued()?;
        self.ensure_bl_number(&cmd.bl_number)?;

        Ok(vec![BillEvent::CargoReceiptRecorded(CargoReceiptRecorded {
            bl_number: cmd.bl_number.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cargo::{DeclaredValue, Measurement, Weight};
    use chrono::TimeZone;

    fn bl(number: &str) -> BlNumber {
        BlNumber::new(number).unwrap()
    }

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap()
    }

    fn named(name: &str) -> Party {
        Party {
            name: name.to_string(),
            address: "address".to_string(),
            contact: "contact".to_string(),
            legal_form: "GmbH".to_string(),
        }
    }

    fn particulars(consignee: &str, to_order: bool) -> BillParticulars {
        BillParticulars {
            issuance: Issuance {
                date_of_issue: "10.11.2025".to_string(),
                place_of_issue: "Bremerhaven".to_string(),
                number_of_originals: 3,
            },
            shipper: named("Autohaus Main GmbH"),
            consignee: if consignee.is_empty() {
                Party::default()
            } else {
                named(consignee)
            },
            carrier: Carrier {
                party: named("OceanCo"),
                trailer_number: "HB-KK-596".to_string(),
            },
            forwarding_agent: named("BLG AutoTerminal"),
            notify_party: named("German-Cars Ltd."),
            commercial_terms: CommercialTerms {
                incoterms: "FOB (2020)".to_string(),
                freight_charges_currency: "USD".to_string(),
                prepaid: true,
                collect: false,
            },
            transport: TransportDetails {
                port_of_loading: "Bremerhaven Containerterminal".to_string(),
                port_of_discharge: "Shanghai Yangshan".to_string(),
                place_of_receipt: "Frankfurt am Main".to_string(),
                place_of_delivery: "Shanghai".to_string(),
                ocean_vessel_name: "MSC Gulsun".to_string(),
                container_number: "OOLU1548378".to_string(),
                full_container_load: true,
                less_than_container_load: false,
            },
            cargo: CargoDetails {
                marks_and_numbers: "40' container CSQU3054383".to_string(),
                number_of_packages: 15,
                gross_weight: Weight {
                    amount: 4250,
                    unit: "Kg".to_string(),
                },
                description_of_goods: "engines and fitting engine parts".to_string(),
                description_per_package: "palletized".to_string(),
                measurement: Measurement {
                    amount: 40.2,
                    unit: "Feet".to_string(),
                },
                declared_value: DeclaredValue {
                    amount: 75_000,
                    currency: "USD".to_string(),
                },
                additional_information: "-".to_string(),
                hazardous_material: false,
            },
            customer_order_number: 1,
            legal_conditions: LegalConditions {
                transport_conditions: "ERA600 Art. 20a".to_string(),
                applicable_law: "German law".to_string(),
                place_of_jurisdiction: "Bremen".to_string(),
            },
            to_order,
        }
    }

    fn issue(number: &str, consignee: &str, to_order: bool) -> BillOfLading {
        let mut bill = BillOfLading::empty(bl(number));
        let events = bill
            .handle(&BillCommand::IssueBill(IssueBill {
                bl_number: bl(number),
                particulars: particulars(consignee, to_order),
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
        bill
    }

    fn ship(bill: &mut BillOfLading) {
        let events = bill
            .handle(&BillCommand::MarkShippedOnBoard(MarkShippedOnBoard {
                bl_number: bill.bl_number().clone(),
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
    }

    fn endorse_cmd(bill: &BillOfLading, new_holder: &str, authorizer: &str) -> BillCommand {
        BillCommand::Endorse(Endorse {
            bl_number: bill.bl_number().clone(),
            new_holder: new_holder.to_string(),
            authorizer: authorizer.to_string(),
            notify_party: None,
            occurred_at: test_time(),
        })
    }

    #[test]
    fn issue_bill_emits_bill_issued_event() {
        let bill = BillOfLading::empty(bl("BL1"));
        let events = bill
            .handle(&BillCommand::IssueBill(IssueBill {
                bl_number: bl("BL1"),
                particulars: particulars("Acme Corp", true),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            BillEvent::BillIssued(e) => {
                assert_eq!(e.bl_number.as_str(), "BL1");
                assert_eq!(e.particulars.consignee.name, "Acme Corp");
                assert!(e.particulars.to_order);
            }
            _ => panic!("Expected BillIssued event"),
        }
    }

    #[test]
    fn issued_negotiable_bill_starts_transferable_with_empty_endorsement_state() {
        let bill = issue("BL1", "Acme Corp", true);

        assert!(bill.transferable());
        assert_eq!(bill.state(), BillState::Issued);
        assert_eq!(bill.order_to(), None);
        assert_eq!(bill.order_at(), None);
        assert_eq!(bill.order_date(), None);
        assert_eq!(bill.shipped_on_board_date(), None);
    }

    #[test]
    fn issue_rejects_already_issued_bill() {
        let bill = issue("BL1", "Acme Corp", true);
        let err = bill
            .handle(&BillCommand::IssueBill(IssueBill {
                bl_number: bl("BL1"),
                particulars: particulars("Acme Corp", true),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateKey(_)));
    }

    #[test]
    fn issue_rejects_unnamed_shipper() {
        let bill = BillOfLading::empty(bl("BL1"));
        let mut p = particulars("Acme Corp", true);
        p.shipper = Party::default();

        let err = bill
            .handle(&BillCommand::IssueBill(IssueBill {
                bl_number: bl("BL1"),
                particulars: p,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn straight_bill_is_closed_and_cannot_be_endorsed() {
        let mut bill = issue("BL1", "Acme Corp", false);
        assert_eq!(bill.state(), BillState::Closed);
        ship(&mut bill);

        let err = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotNegotiable(_)));
    }

    #[test]
    fn endorse_before_shipment_fails_even_with_correct_authorizer() {
        let bill = issue("BL1", "Acme Corp", true);

        let err = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotShipped(_)));
    }

    #[test]
    fn endorse_requires_a_named_new_holder() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);

        let err = bill
            .handle(&endorse_cmd(&bill, "   ", "Acme Corp"))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidHolder));
    }

    #[test]
    fn first_endorsement_must_come_from_the_named_consignee() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);

        let err = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Mallory GmbH"))
            .unwrap_err();
        match err {
            DomainError::UnauthorizedEndorser { given, expected } => {
                assert_eq!(given, "Mallory GmbH");
                assert_eq!(expected, "Acme Corp");
            }
            other => panic!("Expected UnauthorizedEndorser, got {other:?}"),
        }

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.order_to(), Some("Acme Logistics"));
        assert_eq!(bill.order_at(), Some("Acme Corp"));
    }

    #[test]
    fn first_endorsement_falls_back_to_the_shipper_without_a_consignee() {
        let mut bill = issue("BL1", "", true);
        ship(&mut bill);

        let err = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Somebody Else"))
            .unwrap_err();
        assert!(matches!(err, DomainError::UnauthorizedEndorser { .. }));

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Autohaus Main GmbH"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.order_to(), Some("Acme Logistics"));
    }

    #[test]
    fn later_endorsements_must_come_from_the_current_holder() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap();
        bill.apply(&events[0]);

        // The original consignee is no longer entitled to transfer.
        let err = bill
            .handle(&endorse_cmd(&bill, "Third Trading", "Acme Corp"))
            .unwrap_err();
        assert!(matches!(err, DomainError::UnauthorizedEndorser { .. }));

        let events = bill
            .handle(&endorse_cmd(&bill, "Third Trading", "Acme Logistics"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.order_to(), Some("Third Trading"));
    }

    #[test]
    fn endorsing_to_the_carrier_closes_the_bill() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.state(), BillState::Negotiable);

        let events = bill
            .handle(&endorse_cmd(&bill, "OceanCo", "Acme Logistics"))
            .unwrap();
        match &events[0] {
            BillEvent::BillEndorsed(e) => assert!(e.surrendered),
            _ => panic!("Expected BillEndorsed event"),
        }
        bill.apply(&events[0]);

        assert!(!bill.transferable());
        assert_eq!(bill.state(), BillState::Closed);

        let err = bill
            .handle(&endorse_cmd(&bill, "Fourth Trading", "OceanCo"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotNegotiable(_)));
    }

    #[test]
    fn endorsement_overwrites_notify_party_only_when_supplied() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);
        let original_notify = bill.notify_party().clone();

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.notify_party(), &original_notify);

        let replacement = Party {
            name: "New Notify Ltd.".to_string(),
            address: "Fue Avenue, Shanghai".to_string(),
            contact: String::new(),
            legal_form: "Ltd.".to_string(),
        };
        let events = bill
            .handle(&BillCommand::Endorse(Endorse {
                bl_number: bill.bl_number().clone(),
                new_holder: "Third Trading".to_string(),
                authorizer: "Acme Logistics".to_string(),
                notify_party: Some(replacement.clone()),
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.notify_party(), &replacement);
    }

    #[test]
    fn shipped_on_board_is_set_exactly_once() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);
        assert_eq!(bill.shipped_on_board_date(), Some("01.03.2026 12:30:05"));

        let err = bill
            .handle(&BillCommand::MarkShippedOnBoard(MarkShippedOnBoard {
                bl_number: bill.bl_number().clone(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::AlreadyShipped(number, date) => {
                assert_eq!(number, "BL1");
                assert_eq!(date, "01.03.2026 12:30:05");
            }
            other => panic!("Expected AlreadyShipped, got {other:?}"),
        }
    }

    #[test]
    fn endorsement_dates_use_the_fixed_format() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme Corp"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.order_date(), Some("01.03.2026 12:30:05"));
    }

    #[test]
    fn amendment_changes_only_the_supplied_attributes() {
        let mut bill = issue("BL1", "Acme Corp", true);
        let before = bill.cargo().clone();

        let events = bill
            .handle(&BillCommand::AmendCargo(AmendCargo {
                bl_number: bill.bl_number().clone(),
                updates: CargoAmendment {
                    gross_weight: Some(3900),
                    ..CargoAmendment::default()
                },
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);

        assert_eq!(bill.cargo().gross_weight.amount, 3900);
        assert_eq!(bill.cargo().gross_weight.unit, before.gross_weight.unit);
        assert_eq!(bill.cargo().number_of_packages, before.number_of_packages);
        assert_eq!(bill.cargo().description_of_goods, before.description_of_goods);
        assert_eq!(bill.cargo().declared_value, before.declared_value);
    }

    #[test]
    fn amendment_is_allowed_after_the_bill_is_closed() {
        let mut bill = issue("BL1", "Acme Corp", false);

        let events = bill
            .handle(&BillCommand::AmendCargo(AmendCargo {
                bl_number: bill.bl_number().clone(),
                updates: CargoAmendment {
                    hazardous_material: Some(true),
                    ..CargoAmendment::default()
                },
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
        assert!(bill.cargo().hazardous_material);
    }

    #[test]
    fn empty_amendment_produces_no_events() {
        let bill = issue("BL1", "Acme Corp", true);

        let events = bill
            .handle(&BillCommand::AmendCargo(AmendCargo {
                bl_number: bill.bl_number().clone(),
                updates: CargoAmendment::default(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn vessel_reassignment_overwrites_the_vessel_name() {
        let mut bill = issue("BL1", "Acme Corp", true);

        let events = bill
            .handle(&BillCommand::ReassignVessel(ReassignVessel {
                bl_number: bill.bl_number().clone(),
                new_vessel_name: "MSC Oscar".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.transport().ocean_vessel_name, "MSC Oscar");
    }

    #[test]
    fn container_redirect_updates_the_place_of_delivery() {
        let mut bill = issue("BL1", "Acme Corp", true);

        let events = bill
            .handle(&BillCommand::RedirectContainer(RedirectContainer {
                bl_number: bill.bl_number().clone(),
                new_destination: "Ningbo".to_string(),
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.transport().place_of_delivery, "Ningbo");
    }

    #[test]
    fn cargo_receipt_records_the_date() {
        let mut bill = issue("BL1", "Acme Corp", true);

        let events = bill
            .handle(&BillCommand::RecordCargoReceipt(RecordCargoReceipt {
                bl_number: bill.bl_number().clone(),
                occurred_at: test_time(),
            }))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.cargo_received_date(), Some("01.03.2026 12:30:05"));
    }

    #[test]
    fn operations_on_an_unissued_bill_fail_not_found() {
        let bill = BillOfLading::empty(bl("BL1"));

        let err = bill
            .handle(&BillCommand::MarkShippedOnBoard(MarkShippedOnBoard {
                bl_number: bl("BL1"),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut bill = issue("BL1", "Acme Corp", true);
        ship(&mut bill);
        let before = bill.clone();

        let cmd = endorse_cmd(&bill, "Acme Logistics", "Acme Corp");
        let events1 = bill.handle(&cmd).unwrap();
        let events2 = bill.handle(&cmd).unwrap();

        assert_eq!(bill, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn full_lifecycle_issue_ship_endorse_redeem() {
        let mut bill = issue("BL1", "Acme", true);
        ship(&mut bill);

        let events = bill
            .handle(&endorse_cmd(&bill, "Acme Logistics", "Acme"))
            .unwrap();
        bill.apply(&events[0]);
        assert_eq!(bill.order_to(), Some("Acme Logistics"));

        let events = bill
            .handle(&endorse_cmd(&bill, "OceanCo", "Acme Logistics"))
            .unwrap();
        bill.apply(&events[0]);
        assert!(!bill.transferable());

        let err = bill
            .handle(&endorse_cmd(&bill, "X", "OceanCo"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotNegotiable(_)));
    }

    #[test]
    fn version_increments_on_apply() {
        let mut bill = issue("BL1", "Acme Corp", true);
        assert_eq!(bill.version(), 1);
        ship(&mut bill);
        assert_eq!(bill.version(), 2);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a rejected endorsement leaves the bill untouched.
            #[test]
            fn rejected_endorsements_never_mutate(authorizer in "[a-z]{1,12}") {
                let mut bill = issue("BL1", "Acme Corp", true);
                ship(&mut bill);
                let before = bill.clone();

                // Generated lowercase names never match "Acme Corp".
                let err = bill
                    .handle(&endorse_cmd(&bill, "Acme Logistics", &authorizer))
                    .unwrap_err();

                let is_unauthorized = matches!(err, DomainError::UnauthorizedEndorser { .. });
                prop_assert!(is_unauthorized);
                prop_assert_eq!(bill, before);
            }

            /// Property: handle is deterministic (same state + command = same events).
            #[test]
            fn handle_is_deterministic(holder in "[A-Za-z][A-Za-z ]{0,20}") {
                let mut bill = issue("BL1", "Acme Corp", true);
                ship(&mut bill);

                let cmd = endorse_cmd(&bill, &holder, "Acme Corp");
                let events1 = bill.handle(&cmd).unwrap();
                let events2 = bill.handle(&cmd).unwrap();
                prop_assert_eq!(events1, events2);
            }
        }
    }
}
