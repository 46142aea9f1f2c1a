//! Command surface consumed by the CLI front-end.
//!
//! This crate maps raw front-end inputs (positional payloads, optional raw
//! field values) onto typed domain commands and runs them through the
//! registry. Transport and argument collection live in the front-end; this
//! is the outermost layer of the core.

pub mod service;

pub use service::{AmendRequest, BillService};
