//! Wire types for the REST API.
//!
//! Engine output types come from `rxscan-core`; this module adds the response envelopes that
//! only exist at the API boundary.

use rxscan_core::MedicineInfo;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use rxscan_core::{
    DoctorsNotes, MedicineDetails, OnExamination, PatientDetails, PrescriptionRecord, Severity,
    TreatmentItem, Warning, WarningCode, WarningReport, WarningRules,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CanonicalRes {
    pub canonical: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicineInfoRes {
    pub medicines: Vec<MedicineInfo>,
}
