//! Warning records produced by the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Machine-readable warning identifiers.
///
/// The serialised names are a compatibility contract with existing callers and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    InvalidPayload,
    MissingPatientName,
    DuplicateMedicine,
    MissingDosage,
    HighDailyDose,
    UnrecognizedDosageFormat,
    MissingTiming,
    MissingDurationAntibiotic,
    MissingRouteForInjection,
    UrgentInstruction,
    SedativeWarning,
    SteroidNsaidInteraction,
    MultipleSedatives,
    NoMedicinesDetected,
}

impl WarningCode {
    pub const ALL: [WarningCode; 14] = [
        WarningCode::InvalidPayload,
        WarningCode::MissingPatientName,
        WarningCode::DuplicateMedicine,
        WarningCode::MissingDosage,
        WarningCode::HighDailyDose,
        WarningCode::UnrecognizedDosageFormat,
        WarningCode::MissingTiming,
        WarningCode::MissingDurationAntibiotic,
        WarningCode::MissingRouteForInjection,
        WarningCode::UrgentInstruction,
        WarningCode::SedativeWarning,
        WarningCode::SteroidNsaidInteraction,
        WarningCode::MultipleSedatives,
        WarningCode::NoMedicinesDetected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::InvalidPayload => "invalid_payload",
            WarningCode::MissingPatientName => "missing_patient_name",
            WarningCode::DuplicateMedicine => "duplicate_medicine",
            WarningCode::MissingDosage => "missing_dosage",
            WarningCode::HighDailyDose => "high_daily_dose",
            WarningCode::UnrecognizedDosageFormat => "unrecognized_dosage_format",
            WarningCode::MissingTiming => "missing_timing",
            WarningCode::MissingDurationAntibiotic => "missing_duration_antibiotic",
            WarningCode::MissingRouteForInjection => "missing_route_for_injection",
            WarningCode::UrgentInstruction => "urgent_instruction",
            WarningCode::SedativeWarning => "sedative_warning",
            WarningCode::SteroidNsaidInteraction => "steroid_nsaid_interaction",
            WarningCode::MultipleSedatives => "multiple_sedatives",
            WarningCode::NoMedicinesDetected => "no_medicines_detected",
        }
    }

    /// The severity every warning with this code carries.
    pub fn severity(&self) -> Severity {
        match self {
            WarningCode::InvalidPayload
            | WarningCode::HighDailyDose
            | WarningCode::MissingDurationAntibiotic
            | WarningCode::MissingRouteForInjection
            | WarningCode::UrgentInstruction
            | WarningCode::MultipleSedatives => Severity::High,
            WarningCode::MissingPatientName
            | WarningCode::DuplicateMedicine
            | WarningCode::MissingDosage
            | WarningCode::SedativeWarning
            | WarningCode::SteroidNsaidInteraction => Severity::Medium,
            WarningCode::UnrecognizedDosageFormat
            | WarningCode::MissingTiming
            | WarningCode::NoMedicinesDetected => Severity::Low,
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal urgency of a warning.
///
/// `Unrecognised` only arises when deserialising warnings from elsewhere; it sorts last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unrecognised,
}

impl Severity {
    /// Sort rank, lowest first.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
            Severity::Unrecognised => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unrecognised => "unrecognised",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding about a prescription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Warning {
    pub code: WarningCode,
    pub severity: Severity,
    pub message: String,
    /// Path into the input record, e.g. `treatmentAndAdvice[2].dosage`; `null` for record-level
    /// findings.
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub meta: Option<Map<String, Value>>,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            message: message.into(),
            field,
            meta: None,
        }
    }

    /// Attach a diagnostic value under `key`.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// Engine output as returned to API callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WarningReport {
    pub warnings: Vec<Warning>,
    /// Always equal to `warnings.len()`.
    pub count: usize,
}

impl From<Vec<Warning>> for WarningReport {
    fn from(warnings: Vec<Warning>) -> Self {
        let count = warnings.len();
        Self { warnings, count }
    }
}

/// Stable sort by severity rank; equal severities keep their emission order.
pub fn sort_by_severity(warnings: &mut [Warning]) {
    warnings.sort_by_key(|w| w.severity.rank());
}

/// Path of a field on the treatment item at `index`.
pub(crate) fn item_field(index: usize, field: &str) -> Option<String> {
    Some(format!("treatmentAndAdvice[{index}].{field}"))
}
