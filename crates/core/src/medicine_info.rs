//! Per-medicine explanation cards.
//!
//! Each treatment item is projected to its name plus the explanation attached by the summariser.
//! Items without an explanation get an empty one so clients can render a uniform list.

use crate::prescription::{MedicineDetails, PrescriptionRecord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MedicineInfo {
    pub item: String,
    pub details: MedicineDetails,
}

pub fn medicine_info(record: &PrescriptionRecord) -> Vec<MedicineInfo> {
    record
        .treatment_and_advice
        .iter()
        .map(|med| MedicineInfo {
            item: med.item.clone(),
            details: med.details.clone().unwrap_or_default(),
        })
        .collect()
}
