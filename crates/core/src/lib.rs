//! # rxscan Core
//!
//! Core logic for the rxscan prescription review service.
//!
//! This crate contains pure data operations over structured prescriptions:
//! - The prescription data model, tolerant of missing or mistyped fields
//! - The rule-based warning engine and its configurable rules
//! - Canonical single-line rendering and per-medicine explanation cards
//!
//! **No API concerns**: HTTP servers, OpenAPI documents and CLI handling belong in `api-rest`,
//! `api-shared` and `rxscan-cli`.

pub mod canonical;
pub mod config;
pub mod constants;
pub mod dosage;
pub mod engine;
pub mod error;
pub mod matchers;
pub mod medicine_info;
pub mod prescription;
pub mod warning;

pub use canonical::canonical_lines;
pub use config::{resolve_rules, WarningRules};
pub use constants::{DEFAULT_REST_ADDR, REST_ADDR_ENV, RULES_FILE_ENV};
pub use engine::{analyze_prescription, WarningEngine};
pub use error::{RxError, RxResult};
pub use medicine_info::{medicine_info, MedicineInfo};
pub use prescription::{
    parse_payload, DoctorsNotes, MedicineDetails, OnExamination, PatientDetails,
    PrescriptionRecord, TreatmentItem,
};
pub use warning::{Severity, Warning, WarningCode, WarningReport};
