//! Positional creation-payload codec.
//!
//! The front-end serializes the creation fields as one string joined by a
//! fixed 3-character delimiter. Field order is a compatibility contract:
//! the positions decoded here must not change independently of the
//! serializer. Decoding is strict on arity and reports **every** field
//! that fails conversion, not just the first one.

use ebol_core::{BlNumber, DomainError, DomainResult, FieldFault};
use ebol_lading::{
    BillParticulars, Carrier, CargoDetails, CommercialTerms, DeclaredValue, Issuance,
    LegalConditions, Measurement, Party, TransportDetails, Weight,
};

/// Separator between positional fields.
pub const FIELD_DELIMITER: &str = "_|_";

/// Number of positional fields in the canonical (v1) creation layout.
///
/// Positions 0–55 follow the legacy layout; position 56 carries the
/// negotiability flag. Positions 35/36 (cargo received, shipped on board)
/// and 53–55 (endorsement state) are reserved: those attributes always
/// start empty, so their values are accepted and ignored.
pub const FIELD_COUNT: usize = 57;

pub fn parse_u32(field: &str, raw: &str) -> Result<u32, FieldFault> {
    raw.trim()
        .parse()
        .map_err(|_| FieldFault::new(field, raw, "unsigned integer"))
}

pub fn parse_u64(field: &str, raw: &str) -> Result<u64, FieldFault> {
    raw.trim()
        .parse()
        .map_err(|_| FieldFault::new(field, raw, "unsigned integer"))
}

pub fn parse_f64(field: &str, raw: &str) -> Result<f64, FieldFault> {
    raw.trim()
        .parse()
        .map_err(|_| FieldFault::new(field, raw, "decimal number"))
}

pub fn parse_bool(field: &str, raw: &str) -> Result<bool, FieldFault> {
    raw.trim()
        .parse()
        .map_err(|_| FieldFault::new(field, raw, "boolean ('true' or 'false')"))
}

/// Positional cursor that collects conversion faults instead of stopping
/// at the first bad index.
struct Fields<'a> {
    values: Vec<&'a str>,
    faults: Vec<FieldFault>,
}

impl<'a> Fields<'a> {
    fn text(&self, index: usize) -> String {
        self.values[index].to_string()
    }

    fn u32_at(&mut self, index: usize, field: &str) -> u32 {
        match parse_u32(field, self.values[index]) {
            Ok(value) => value,
            Err(fault) => {
                self.faults.push(fault);
                0
            }
        }
    }

    fn u64_at(&mut self, index: usize, field: &str) -> u64 {
        match parse_u64(field, self.values[index]) {
            Ok(value) => value,
            Err(fault) => {
                self.faults.push(fault);
                0
            }
        }
    }

    fn f64_at(&mut self, index: usize, field: &str) -> f64 {
        match parse_f64(field, self.values[index]) {
            Ok(value) => value,
            Err(fault) => {
                self.faults.push(fault);
                0.0
            }
        }
    }

    fn bool_at(&mut self, index: usize, field: &str) -> bool {
        match parse_bool(field, self.values[index]) {
            Ok(value) => value,
            Err(fault) => {
                self.faults.push(fault);
                false
            }
        }
    }
}

/// Decode one creation payload into the key and the named particulars.
pub fn decode(raw: &str) -> DomainResult<(BlNumber, BillParticulars)> {
    let values: Vec<&str> = raw.split(FIELD_DELIMITER).collect();
    if values.len() != FIELD_COUNT {
        return Err(DomainError::validation(format!(
            "expected {FIELD_COUNT} positional fields, got {}",
            values.len()
        )));
    }

    let mut f = Fields {
        values,
        faults: Vec::new(),
    };

    let particulars = BillParticulars {
        issuance: Issuance {
            date_of_issue: f.text(1),
            place_of_issue: f.text(2),
            number_of_originals: f.u32_at(3, "NumberOfOriginals"),
        },
        shipper: Party {
            name: f.text(4),
            address: f.text(5),
            contact: f.text(6),
            legal_form: f.text(7),
        },
        consignee: Party {
            name: f.text(8),
            address: f.text(9),
            contact: f.text(10),
            legal_form: f.text(11),
        },
        carrier: Carrier {
            party: Party {
                name: f.text(12),
                address: f.text(13),
                contact: f.text(14),
                legal_form: f.text(15),
            },
            trailer_number: f.text(16),
        },
        // The agent block is serialized name / legal form / address; no
        // contact travels on the wire for agent and notify party.
        forwarding_agent: Party {
            name: f.text(17),
            legal_form: f.text(18),
            address: f.text(19),
            contact: String::new(),
        },
        notify_party: Party {
            name: f.text(20),
            address: f.text(21),
            legal_form: f.text(22),
            contact: String::new(),
        },
        commercial_terms: CommercialTerms {
            incoterms: f.text(23),
            freight_charges_currency: f.text(24),
            prepaid: f.bool_at(25, "Prepaid"),
            collect: f.bool_at(26, "Collect"),
        },
        transport: TransportDetails {
            port_of_loading: f.text(27),
            port_of_discharge: f.text(28),
            place_of_receipt: f.text(29),
            place_of_delivery: f.text(30),
            ocean_vessel_name: f.text(31),
            container_number: f.text(32),
            full_container_load: f.bool_at(33, "FullContainerLoad"),
            less_than_container_load: f.bool_at(34, "LessThanContainerLoad"),
        },
        cargo: CargoDetails {
            marks_and_numbers: f.text(37),
            number_of_packages: f.u32_at(38, "NumberOfPackages"),
            gross_weight: Weight {
                amount: f.u64_at(39, "GrossWeight"),
                unit: f.text(40),
            },
            description_of_goods: f.text(41),
            description_per_package: f.text(42),
            measurement: Measurement {
                amount: f.f64_at(43, "Measurement"),
                unit: f.text(44),
            },
            declared_value: DeclaredValue {
                amount: f.u64_at(45, "DeclaredCargoValueAmount"),
                currency: f.text(46),
            },
            additional_information: f.text(47),
            hazardous_material: f.bool_at(48, "HazardousMaterial"),
        },
        customer_order_number: f.u64_at(49, "CustomerOrderNumber"),
        legal_conditions: LegalConditions {
            transport_conditions: f.text(50),
            applicable_law: f.text(51),
            place_of_jurisdiction: f.text(52),
        },
        to_order: f.bool_at(56, "Negotiable"),
    };

    if !f.faults.is_empty() {
        return Err(DomainError::conversion(f.faults));
    }

    let bl_number = BlNumber::new(f.text(0))?;
    Ok((bl_number, particulars))
}
