//! Rule-based prescription warning engine.
//!
//! Analysis runs in two phases:
//! 1. a left-to-right pass over the treatment items that applies the per-item checks and records
//!    the first index at which each normalised name appears;
//! 2. a cross-item pass over the recorded names (steroid/NSAID combination, multiple sedatives).
//!
//! The engine is pure: no I/O, no shared state, and the input is never modified. Problems with
//! the input are reported as warnings, never as errors. The result is sorted by severity with
//! emission order preserved inside each severity.
//!
//! These heuristics flag prescriptions for human review. They are not clinical advice.

use crate::config::WarningRules;
use crate::constants::{PATIENT_NAME_FIELD, TREATMENT_FIELD};
use crate::dosage::DosagePattern;
use crate::matchers::{
    contains_any, is_parenteral_route, is_urgent, looks_injectable, mentions_duration,
    normalize_name,
};
use crate::prescription::{PrescriptionRecord, TreatmentItem};
use crate::warning::{item_field, sort_by_severity, Warning, WarningCode};
use serde_json::Value;
use std::collections::HashMap;

/// Applies [`WarningRules`] to prescriptions.
#[derive(Clone, Debug, Default)]
pub struct WarningEngine {
    rules: WarningRules,
}

/// Normalised name to the index of its first occurrence.
type FirstSeen = HashMap<String, usize>;

impl WarningEngine {
    pub fn new(rules: WarningRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &WarningRules {
        &self.rules
    }

    /// Analyse an untrusted JSON payload.
    ///
    /// A payload that is not a JSON object yields a single `invalid_payload` warning and no
    /// other checks run.
    pub fn analyze(&self, payload: &Value) -> Vec<Warning> {
        match PrescriptionRecord::from_json(payload) {
            Some(record) => self.analyze_record(&record),
            None => vec![Warning::new(
                WarningCode::InvalidPayload,
                "Invalid prescription payload. Expected JSON object.",
                None,
            )],
        }
    }

    /// Analyse an already-typed record.
    pub fn analyze_record(&self, record: &PrescriptionRecord) -> Vec<Warning> {
        let mut warnings = Vec::new();

        if record.patient_details.name.trim().is_empty() {
            warnings.push(Warning::new(
                WarningCode::MissingPatientName,
                "Patient name is missing. Please confirm patient identity.",
                Some(PATIENT_NAME_FIELD.to_string()),
            ));
        }

        let items = &record.treatment_and_advice;
        let mut first_seen = FirstSeen::new();
        for (index, item) in items.iter().enumerate() {
            self.check_item(index, item, &mut first_seen, &mut warnings);
        }

        self.check_combinations(&first_seen, &mut warnings);

        if items.is_empty() {
            warnings.push(Warning::new(
                WarningCode::NoMedicinesDetected,
                "No medicines detected in the prescription. Confirm this is not a non-medication advice note.",
                Some(TREATMENT_FIELD.to_string()),
            ));
        }

        sort_by_severity(&mut warnings);

        tracing::debug!(
            items = items.len(),
            warnings = warnings.len(),
            "prescription analysed"
        );

        warnings
    }

    fn check_item(
        &self,
        index: usize,
        item: &TreatmentItem,
        first_seen: &mut FirstSeen,
        warnings: &mut Vec<Warning>,
    ) {
        let original = item.item.as_str();
        let name = normalize_name(original);

        if !name.is_empty() {
            match first_seen.get(&name) {
                Some(&first) => warnings.push(
                    Warning::new(
                        WarningCode::DuplicateMedicine,
                        format!(
                            "Medicine appears multiple times ({original}). Confirm this is not duplicated."
                        ),
                        item_field(index, "item"),
                    )
                    .with_meta("original", original)
                    .with_meta("duplicateOf", first),
                ),
                None => {
                    first_seen.insert(name.clone(), index);
                }
            }
        }

        self.check_dosage(index, item, warnings);

        if item.timing.trim().is_empty() {
            warnings.push(Warning::new(
                WarningCode::MissingTiming,
                format!(
                    "Timing not specified for \"{original}\". E.g., \"after meals\", \"stat\", \"once a day\"."
                ),
                item_field(index, "timing"),
            ));
        }

        if contains_any(&name, &self.rules.antibiotic_keywords)
            && !mentions_duration(&item.timing)
            && !mentions_duration(&item.notes)
        {
            warnings.push(Warning::new(
                WarningCode::MissingDurationAntibiotic,
                format!(
                    "Duration missing for antibiotic \"{original}\". Antibiotics require a clear duration (e.g., \"for 5 days\") to ensure a proper course."
                ),
                item_field(index, "timing"),
            ));
        }

        let injectable = looks_injectable(original)
            || looks_injectable(&item.timing)
            || looks_injectable(&item.notes);
        if injectable && !is_parenteral_route(&item.route) {
            warnings.push(Warning::new(
                WarningCode::MissingRouteForInjection,
                format!(
                    "Medicine \"{original}\" looks like an injectable/IV but the route is not specified as IV/IM. Confirm administration route."
                ),
                item_field(index, "route"),
            ));
        }

        if is_urgent(&format!("{} {} {}", original, item.timing, item.notes)) {
            warnings.push(Warning::new(
                WarningCode::UrgentInstruction,
                format!(
                    "Prescription contains an urgent instruction for \"{original}\" (e.g., stat). Ensure immediate administration."
                ),
                item_field(index, "timing"),
            ));
        }

        if contains_any(&name, &self.rules.sedative_keywords) {
            warnings.push(Warning::new(
                WarningCode::SedativeWarning,
                format!(
                    "Medicine \"{original}\" is a sedative-like medication. Advise caution with driving or operating machinery."
                ),
                item_field(index, "item"),
            ));
        }
    }

    fn check_dosage(&self, index: usize, item: &TreatmentItem, warnings: &mut Vec<Warning>) {
        let original = item.item.as_str();
        let dosage = item.dosage.as_str();

        if dosage.trim().is_empty() {
            warnings.push(Warning::new(
                WarningCode::MissingDosage,
                format!(
                    "Dosage not provided for \"{original}\". Please confirm dosage (e.g., 1-0-1)."
                ),
                item_field(index, "dosage"),
            ));
            return;
        }

        let parsed = DosagePattern::parse(dosage);
        if parsed.total > self.rules.max_daily_units {
            warnings.push(
                Warning::new(
                    WarningCode::HighDailyDose,
                    format!(
                        "Total daily units ({}) for \"{original}\" looks high. Please verify with prescriber.",
                        parsed.total_text()
                    ),
                    item_field(index, "dosage"),
                )
                .with_meta("totalPerDay", parsed.total_json()),
            );
        } else if parsed.is_unrecognised() {
            warnings.push(Warning::new(
                WarningCode::UnrecognizedDosageFormat,
                format!(
                    "Dosage format for \"{original}\" is unrecognized: \"{dosage}\". Consider using formats like 1-0-1 or \"1 tablet twice daily\"."
                ),
                item_field(index, "dosage"),
            ));
        }
    }

    fn check_combinations(&self, first_seen: &FirstSeen, warnings: &mut Vec<Warning>) {
        let rules = &self.rules;
        let any_name = |keywords: &[String]| first_seen.keys().any(|n| contains_any(n, keywords));

        if any_name(rules.steroid_keywords.as_slice()) && any_name(rules.nsaid_keywords.as_slice()) {
            warnings.push(Warning::new(
                WarningCode::SteroidNsaidInteraction,
                "Combination of steroid and NSAID detected. This can increase risk of gastrointestinal side effects; review if gastroprotection is needed.",
                Some(TREATMENT_FIELD.to_string()),
            ));
        }

        let sedatives = first_seen
            .keys()
            .filter(|n| contains_any(n, &rules.sedative_keywords))
            .count();
        if sedatives > 1 {
            warnings.push(
                Warning::new(
                    WarningCode::MultipleSedatives,
                    "Multiple sedative-type medications detected. This increases risk of excessive sedation; verify dosing and interactions.",
                    Some(TREATMENT_FIELD.to_string()),
                )
                .with_meta("sedativeCount", sedatives),
            );
        }
    }
}

/// Analyse `payload` with the built-in rules.
pub fn analyze_prescription(payload: &Value) -> Vec<Warning> {
    WarningEngine::default().analyze(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::Severity;
    use serde_json::json;

    fn codes(warnings: &[Warning]) -> Vec<&'static str> {
        warnings.iter().map(|w| w.code.as_str()).collect()
    }

    fn find(warnings: &[Warning], code: WarningCode) -> Option<&Warning> {
        warnings.iter().find(|w| w.code == code)
    }

    fn has(warnings: &[Warning], code: WarningCode) -> bool {
        find(warnings, code).is_some()
    }

    /// A named patient with a single, fully specified item.
    fn with_items(items: Value) -> Value {
        json!({
            "patientDetails": { "name": "Test Patient", "age": "40", "date": "2024-01-01" },
            "treatmentAndAdvice": items
        })
    }

    fn item(name: &str, dosage: &str, timing: &str) -> Value {
        json!({ "item": name, "route": "oral", "dosage": dosage, "timing": timing, "notes": "" })
    }

    #[test]
    fn test_non_object_payloads_yield_single_invalid_payload() {
        for payload in [json!(null), json!("prescription"), json!(12), json!([])] {
            let warnings = analyze_prescription(&payload);
            assert_eq!(warnings.len(), 1, "{payload}");
            let warning = &warnings[0];
            assert_eq!(warning.code, WarningCode::InvalidPayload);
            assert_eq!(warning.severity, Severity::High);
            assert_eq!(warning.field, None);
        }
    }

    #[test]
    fn test_clean_prescription_has_no_warnings() {
        let payload = with_items(json!([item("Paracetamol 650", "1-0-1", "after food")]));
        assert!(analyze_prescription(&payload).is_empty());
    }

    #[test]
    fn test_empty_object_reports_missing_name_and_no_medicines() {
        let warnings = analyze_prescription(&json!({}));
        assert_eq!(codes(&warnings), vec!["missing_patient_name", "no_medicines_detected"]);
        assert_eq!(
            warnings[0].field.as_deref(),
            Some("patientDetails.name")
        );
        assert_eq!(warnings[1].field.as_deref(), Some("treatmentAndAdvice"));
    }

    #[test]
    fn test_blank_patient_name_is_missing() {
        let payload = json!({ "patientDetails": { "name": "   " }, "treatmentAndAdvice": [] });
        assert!(has(&analyze_prescription(&payload), WarningCode::MissingPatientName));
    }

    #[test]
    fn test_empty_list_excludes_item_and_cross_item_codes() {
        let warnings = analyze_prescription(&with_items(json!([])));
        assert_eq!(codes(&warnings), vec!["no_medicines_detected"]);
    }

    #[test]
    fn test_non_list_treatment_is_treated_as_empty() {
        let payload = json!({
            "patientDetails": { "name": "P" },
            "treatmentAndAdvice": "Paracetamol"
        });
        assert_eq!(codes(&analyze_prescription(&payload)), vec!["no_medicines_detected"]);
    }

    #[test]
    fn test_duplicates_reference_first_index() {
        let payload = with_items(json!([
            item("Paracetamol", "1-0-1", "after food"),
            item("Cetirizine", "0-0-1", "night"),
            item("paracetamol!", "1-0-1", "after food"),
            item("PARACETAMOL", "1-0-1", "after food"),
        ]));
        let warnings = analyze_prescription(&payload);
        let duplicates: Vec<&Warning> = warnings
            .iter()
            .filter(|w| w.code == WarningCode::DuplicateMedicine)
            .collect();

        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].field.as_deref(), Some("treatmentAndAdvice[2].item"));
        assert_eq!(duplicates[1].field.as_deref(), Some("treatmentAndAdvice[3].item"));
        for duplicate in duplicates {
            let meta = duplicate.meta.as_ref().expect("meta");
            assert_eq!(meta["duplicateOf"], json!(0));
        }
    }

    #[test]
    fn test_blank_names_are_not_duplicates() {
        let payload = with_items(json!([item("", "1-0-1", "x"), item("  ", "1-0-1", "x")]));
        assert!(!has(&analyze_prescription(&payload), WarningCode::DuplicateMedicine));
    }

    #[test]
    fn test_dosage_checks() {
        let cases = [
            ("1-0-1", None),
            ("2-2-3", Some(WarningCode::HighDailyDose)),
            ("", Some(WarningCode::MissingDosage)),
            ("   ", Some(WarningCode::MissingDosage)),
            ("twice daily", Some(WarningCode::UnrecognizedDosageFormat)),
            ("2-2-2", None),
        ];

        let dosage_codes = [
            WarningCode::HighDailyDose,
            WarningCode::MissingDosage,
            WarningCode::UnrecognizedDosageFormat,
        ];
        for (dosage, expected) in cases {
            let warnings = analyze_prescription(&with_items(json!([item("Paracetamol", dosage, "after food")])));
            let found: Vec<WarningCode> = warnings
                .iter()
                .map(|w| w.code)
                .filter(|c| dosage_codes.contains(c))
                .collect();
            assert_eq!(found, expected.into_iter().collect::<Vec<_>>(), "dosage {dosage:?}");
        }
    }

    #[test]
    fn test_high_daily_dose_reports_total() {
        let warnings = analyze_prescription(&with_items(json!([item("Paracetamol", "2-2-3", "after food")])));
        let warning = find(&warnings, WarningCode::HighDailyDose).expect("high dose");
        assert_eq!(warning.severity, Severity::High);
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice[0].dosage"));
        assert_eq!(warning.meta.as_ref().expect("meta")["totalPerDay"], json!(7));
        assert!(warning.message.contains("(7)"));
    }

    #[test]
    fn test_overflowing_dosage_is_high_daily_dose() {
        for dosage in ["1e400", "Infinity", "1e308 1e308"] {
            let warnings = analyze_prescription(&with_items(json!([item("Paracetamol", dosage, "after food")])));
            let warning = find(&warnings, WarningCode::HighDailyDose).expect("high dose");
            assert_eq!(warning.meta.as_ref().expect("meta")["totalPerDay"], Value::Null);
            assert!(warning.message.contains("(Infinity)"), "dosage {dosage:?}");
            assert!(!has(&warnings, WarningCode::UnrecognizedDosageFormat), "dosage {dosage:?}");
        }
    }

    #[test]
    fn test_threshold_comes_from_rules() {
        let engine = WarningEngine::new(WarningRules {
            max_daily_units: 2.0,
            ..WarningRules::default()
        });
        let warnings = engine.analyze(&with_items(json!([item("Paracetamol", "1-1-1", "after food")])));
        assert!(has(&warnings, WarningCode::HighDailyDose));
    }

    #[test]
    fn test_missing_timing() {
        let warnings = analyze_prescription(&with_items(json!([item("Paracetamol", "1-0-1", " ")])));
        let warning = find(&warnings, WarningCode::MissingTiming).expect("missing timing");
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice[0].timing"));
    }

    #[test]
    fn test_antibiotic_requires_duration() {
        let without = analyze_prescription(&with_items(json!([
            { "item": "Amoxicillin 500mg", "dosage": "1-0-1", "timing": "", "notes": "" }
        ])));
        assert!(has(&without, WarningCode::MissingDurationAntibiotic));

        let with_timing = analyze_prescription(&with_items(json!([
            { "item": "Amoxicillin 500mg", "dosage": "1-0-1", "timing": "for 5 days", "notes": "" }
        ])));
        assert!(!has(&with_timing, WarningCode::MissingDurationAntibiotic));

        let with_notes = analyze_prescription(&with_items(json!([
            { "item": "Azithromycin", "dosage": "1-0-0", "timing": "after food", "notes": "3 days" }
        ])));
        assert!(!has(&with_notes, WarningCode::MissingDurationAntibiotic));
    }

    #[test]
    fn test_injection_requires_parenteral_route() {
        let without = analyze_prescription(&with_items(json!([
            { "item": "Inj Ceftriaxone", "route": "", "dosage": "1-0-1", "timing": "for 5 days" }
        ])));
        let warning = find(&without, WarningCode::MissingRouteForInjection).expect("route");
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice[0].route"));

        let with_route = analyze_prescription(&with_items(json!([
            { "item": "Inj Ceftriaxone", "route": "iv", "dosage": "1-0-1", "timing": "for 5 days" }
        ])));
        assert!(!has(&with_route, WarningCode::MissingRouteForInjection));
    }

    #[test]
    fn test_injection_signal_in_notes() {
        let warnings = analyze_prescription(&with_items(json!([
            { "item": "Pantoprazole", "route": "oral", "dosage": "1-0-0", "timing": "morning", "notes": "give as IV" }
        ])));
        assert!(has(&warnings, WarningCode::MissingRouteForInjection));
    }

    #[test]
    fn test_injection_signal_in_timing() {
        let warnings = analyze_prescription(&with_items(json!([
            { "item": "Ondansetron", "route": "oral", "dosage": "1-0-1", "timing": "inj before meals" }
        ])));
        let warning = find(&warnings, WarningCode::MissingRouteForInjection).expect("route");
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice[0].route"));
    }

    #[test]
    fn test_urgent_instruction() {
        let warnings = analyze_prescription(&with_items(json!([item("Adrenaline", "1", "stat")])));
        let warning = find(&warnings, WarningCode::UrgentInstruction).expect("urgent");
        assert_eq!(warning.severity, Severity::High);

        let calm = analyze_prescription(&with_items(json!([item("Nystatin", "1-1-1", "after food")])));
        assert!(!has(&calm, WarningCode::UrgentInstruction));
    }

    #[test]
    fn test_urgent_marker_only_in_notes() {
        let warnings = analyze_prescription(&with_items(json!([
            { "item": "Salbutamol", "route": "inhaled", "dosage": "2", "timing": "as needed", "notes": "SOS for wheeze" }
        ])));
        let warning = find(&warnings, WarningCode::UrgentInstruction).expect("urgent");
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice[0].timing"));
    }

    #[test]
    fn test_urgent_marker_after_non_ascii_letter() {
        let warnings = analyze_prescription(&with_items(json!([item("Adrenaline", "1", "éstat")])));
        assert!(has(&warnings, WarningCode::UrgentInstruction));
    }

    #[test]
    fn test_single_sedative() {
        let warnings = analyze_prescription(&with_items(json!([item("Diazepam 5mg", "0-0-1", "bedtime")])));
        assert!(has(&warnings, WarningCode::SedativeWarning));
        assert!(!has(&warnings, WarningCode::MultipleSedatives));
    }

    #[test]
    fn test_multiple_sedatives() {
        let warnings = analyze_prescription(&with_items(json!([
            item("Diazepam", "0-0-1", "bedtime"),
            item("Alprazolam", "0-0-1", "bedtime"),
        ])));
        let sedative_warnings = warnings
            .iter()
            .filter(|w| w.code == WarningCode::SedativeWarning)
            .count();
        assert_eq!(sedative_warnings, 2);
        let warning = find(&warnings, WarningCode::MultipleSedatives).expect("multiple");
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice"));
    }

    #[test]
    fn test_repeated_sedative_counts_once() {
        let warnings = analyze_prescription(&with_items(json!([
            item("Diazepam", "0-0-1", "bedtime"),
            item("Diazepam", "0-0-1", "bedtime"),
        ])));
        assert!(has(&warnings, WarningCode::DuplicateMedicine));
        assert!(!has(&warnings, WarningCode::MultipleSedatives));
    }

    #[test]
    fn test_steroid_nsaid_interaction() {
        let warnings = analyze_prescription(&with_items(json!([
            item("Dexamethasone 4mg", "1-0-0", "morning"),
            item("Ibuprofen 400", "1-0-1", "after food"),
        ])));
        let warning = find(&warnings, WarningCode::SteroidNsaidInteraction).expect("interaction");
        assert_eq!(warning.severity, Severity::Medium);
        assert_eq!(warning.field.as_deref(), Some("treatmentAndAdvice"));

        let steroid_only = analyze_prescription(&with_items(json!([
            item("Prednisolone", "1-0-0", "morning"),
        ])));
        assert!(!has(&steroid_only, WarningCode::SteroidNsaidInteraction));
    }

    #[test]
    fn test_output_sorted_by_severity_with_emission_order() {
        let payload = json!({
            "patientDetails": { "name": "" },
            "treatmentAndAdvice": [
                { "item": "Amoxicillin", "dosage": "", "timing": "" },
                { "item": "Diazepam", "dosage": "3-3-3", "timing": "stat" }
            ]
        });
        let warnings = analyze_prescription(&payload);
        assert_eq!(
            codes(&warnings),
            vec![
                "missing_duration_antibiotic",
                "high_daily_dose",
                "urgent_instruction",
                "missing_patient_name",
                "missing_dosage",
                "sedative_warning",
                "missing_timing",
            ]
        );

        let ranks: Vec<u8> = warnings.iter().map(|w| w.severity.rank()).collect();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_malformed_item_does_not_stop_analysis() {
        let payload = with_items(json!([
            null,
            item("Diazepam", "0-0-1", "bedtime"),
            item("Lorazepam", "0-0-1", "bedtime"),
        ]));
        let warnings = analyze_prescription(&payload);
        assert!(has(&warnings, WarningCode::MissingDosage));
        assert!(has(&warnings, WarningCode::MultipleSedatives));
        let missing_dosage = find(&warnings, WarningCode::MissingDosage).expect("dosage");
        assert_eq!(missing_dosage.field.as_deref(), Some("treatmentAndAdvice[0].dosage"));
    }

    #[test]
    fn test_analysis_is_idempotent_and_does_not_mutate_input() {
        let payload = with_items(json!([
            item("Diazepam", "", ""),
            item("Alprazolam", "twice daily", "stat"),
            item("Dexa", "9", "for 3 days"),
            item("Aspirin", "1", "after food"),
            item("diazepam", "0-0-1", "bedtime"),
        ]));
        let before = payload.clone();

        let engine = WarningEngine::default();
        let first = serde_json::to_string(&engine.analyze(&payload)).unwrap();
        let second = serde_json::to_string(&engine.analyze(&payload)).unwrap();

        assert_eq!(first, second);
        assert_eq!(payload, before);
    }
}
