//! Structured prescription records.
//!
//! Records arrive from an external extraction step and from user edits, so every field is
//! treated as untrusted. Deserialisation never fails on shape: a field that is missing, `null`
//! or of the wrong type degrades to its empty default.

use crate::{RxError, RxResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A structured prescription as produced by extraction and edited by the user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct PrescriptionRecord {
    #[serde(deserialize_with = "lenient::object")]
    pub patient_details: PatientDetails,
    #[serde(deserialize_with = "lenient::object")]
    pub doctors_notes: DoctorsNotes,
    #[serde(deserialize_with = "lenient::items")]
    pub treatment_and_advice: Vec<TreatmentItem>,
    #[serde(deserialize_with = "lenient::text")]
    pub raw_extracted_text: String,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct PatientDetails {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub age: String,
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct DoctorsNotes {
    #[serde(deserialize_with = "lenient::text")]
    pub complaint: String,
    #[serde(deserialize_with = "lenient::object")]
    pub on_examination: OnExamination,
    #[serde(deserialize_with = "lenient::text")]
    pub impression: String,
    #[serde(deserialize_with = "lenient::text")]
    pub explanation: String,
}

/// Vital signs recorded on examination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct OnExamination {
    #[serde(deserialize_with = "lenient::text")]
    pub bp: String,
    #[serde(deserialize_with = "lenient::text")]
    pub pr: String,
    #[serde(deserialize_with = "lenient::text")]
    pub temp: String,
    #[serde(deserialize_with = "lenient::text")]
    pub spo2: String,
}

/// One line of the treatment plan: a medicine or a piece of advice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct TreatmentItem {
    /// Free-text medicine or advice name.
    #[serde(deserialize_with = "lenient::text")]
    pub item: String,
    /// Administration route, e.g. "oral", "iv", "im".
    #[serde(deserialize_with = "lenient::text")]
    pub route: String,
    /// Dosage pattern, e.g. "1-0-1".
    #[serde(deserialize_with = "lenient::text")]
    pub dosage: String,
    /// Schedule and duration notes.
    #[serde(deserialize_with = "lenient::text")]
    pub timing: String,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: String,
    /// Patient-facing explanation attached by the summariser, if any.
    #[serde(
        deserialize_with = "lenient::optional_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub details: Option<MedicineDetails>,
}

/// Patient-facing explanation of a single medicine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct MedicineDetails {
    #[serde(deserialize_with = "lenient::text")]
    pub purpose: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mechanism: String,
    #[serde(deserialize_with = "lenient::text")]
    pub common_side_effects: String,
    #[serde(deserialize_with = "lenient::text")]
    pub why_prescribed: String,
}

impl PrescriptionRecord {
    /// Interpret an arbitrary JSON payload as a prescription.
    ///
    /// Returns `None` when the payload is not a JSON object (`null`, arrays, strings, numbers,
    /// booleans). Any object is accepted; its fields degrade to defaults as needed.
    pub fn from_json(payload: &Value) -> Option<Self> {
        if !payload.is_object() {
            return None;
        }

        // Every field deserialiser is lenient, so an object always deserialises.
        Self::deserialize(payload).ok()
    }
}

/// Parse raw JSON text into a payload value without imposing any shape on it.
///
/// # Errors
///
/// Returns `RxError::PrescriptionParse` if the text is not valid JSON.
pub fn parse_payload(text: &str) -> RxResult<Value> {
    serde_json::from_str(text).map_err(RxError::PrescriptionParse)
}

/// Deserialisers that accept any JSON value and fall back to an empty default.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn from_value_or_default<T: DeserializeOwned + Default>(value: Value) -> T {
        if value.is_object() {
            serde_json::from_value(value).unwrap_or_default()
        } else {
            T::default()
        }
    }

    /// Strings pass through, numbers and `true` are rendered, everything else is empty.
    pub(super) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => "true".to_string(),
            _ => String::new(),
        })
    }

    pub(super) fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(from_value_or_default(Value::deserialize(deserializer)?))
    }

    pub(super) fn optional_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.is_object().then(|| from_value_or_default(value)))
    }

    /// Arrays keep their order; non-object elements become default items.
    pub(super) fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(values) => values.into_iter().map(from_value_or_default).collect(),
            _ => Vec::new(),
        })
    }
}
