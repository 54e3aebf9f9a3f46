//! Constants used throughout the rxscan core crate.
//!
//! Keyword lists and thresholds here are the built-in defaults for
//! [`WarningRules`](crate::config::WarningRules). Deployments can override them with a rules file.

/// Total daily units above which a dosage pattern is flagged as high.
pub const DEFAULT_MAX_DAILY_UNITS: f64 = 6.0;

/// Name fragments that mark a medicine as an antibiotic.
pub const ANTIBIOTIC_KEYWORDS: &[&str] = &[
    "cillin",
    "amoxi",
    "augmentin",
    "azithro",
    "cef",
    "ceph",
    "doxy",
    "cipro",
    "levo",
    "moxi",
    "erythro",
];

/// Name fragments that mark a medicine as a corticosteroid.
pub const STEROID_KEYWORDS: &[&str] = &[
    "pred",
    "predsow",
    "prednisone",
    "dexa",
    "dexamethasone",
    "methylpred",
];

/// Name fragments that mark a medicine as an NSAID.
pub const NSAID_KEYWORDS: &[&str] = &[
    "ibuprofen",
    "naproxen",
    "diclofenac",
    "aspirin",
    "nsaid",
    "etoricoxib",
];

/// Name fragments that mark a medicine as a sedative.
pub const SEDATIVE_KEYWORDS: &[&str] = &["diazepam", "alprazolam", "lorazepam", "zolpidem"];

/// Field path of the treatment list, used for cross-item findings.
pub const TREATMENT_FIELD: &str = "treatmentAndAdvice";

/// Field path of the patient name.
pub const PATIENT_NAME_FIELD: &str = "patientDetails.name";

/// Environment variable naming an optional YAML rules file.
pub const RULES_FILE_ENV: &str = "RXSCAN_RULES_FILE";

/// Environment variable holding the REST listen address.
pub const REST_ADDR_ENV: &str = "RXSCAN_REST_ADDR";

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:5000";
