//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// One field that could not be converted to its typed representation.
///
/// Conversion failures are collected so a caller sees every offending field
/// at once instead of the first bad position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFault {
    /// External field name (the schema surface, e.g. `NumberOfPackages`).
    pub field: String,
    /// The raw value as received.
    pub value: String,
    /// Human-readable description of the expected type.
    pub expected: &'static str,
}

impl FieldFault {
    pub fn new(field: impl Into<String>, value: impl Into<String>, expected: &'static str) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            expected,
        }
    }
}

impl core::fmt::Display for FieldFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}='{}' (expected {})",
            self.field, self.value, self.expected
        )
    }
}

fn join_faults(faults: &[FieldFault]) -> String {
    faults
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Domain-level error.
///
/// Keep this focused on deterministic business failures; infrastructure
/// concerns (storage, concurrency) belong elsewhere. None of these are
/// retried internally - retry policy is the caller's.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A bill of lading already exists under the given number.
    #[error("bill of lading '{0}' already exists")]
    DuplicateKey(String),

    /// No bill of lading is stored under the given number.
    #[error("bill of lading '{0}' does not exist")]
    NotFound(String),

    /// One or more raw field values could not be converted; the whole
    /// operation is rejected.
    #[error("field conversion failed: {}", join_faults(.0))]
    FieldConversion(Vec<FieldFault>),

    /// The bill is no longer transferable (straight bill, or already
    /// surrendered to the carrier).
    #[error("bill of lading '{0}' is not negotiable")]
    NotNegotiable(String),

    /// The endorsing party does not hold the entitlement to transfer.
    #[error("'{given}' is not authorized to endorse; expected '{expected}'")]
    UnauthorizedEndorser { given: String, expected: String },

    /// Endorsement attempted before the cargo was shipped on board.
    #[error("bill of lading '{0}' has not been shipped on board")]
    NotShipped(String),

    /// Endorsement attempted without naming a new holder.
    #[error("endorsement requires a non-empty new holder")]
    InvalidHolder,

    /// The shipped-on-board timestamp is set exactly once.
    #[error("bill of lading '{0}' was already shipped on board at {1}")]
    AlreadyShipped(String, String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn duplicate_key(bl_number: impl Into<String>) -> Self {
        Self::DuplicateKey(bl_number.into())
    }

    pub fn not_found(bl_number: impl Into<String>) -> Self {
        Self::NotFound(bl_number.into())
    }

    pub fn conversion(faults: Vec<FieldFault>) -> Self {
        Self::FieldConversion(faults)
    }

    pub fn not_negotiable(bl_number: impl Into<String>) -> Self {
        Self::NotNegotiable(bl_number.into())
    }

    pub fn unauthorized_endorser(given: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnauthorizedEndorser {
            given: given.into(),
            expected: expected.into(),
        }
    }

    pub fn not_shipped(bl_number: impl Into<String>) -> Self {
        Self::NotShipped(bl_number.into())
    }

    pub fn already_shipped(bl_number: impl Into<String>, date: impl Into<String>) -> Self {
        Self::AlreadyShipped(bl_number.into(), date.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
