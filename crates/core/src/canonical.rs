//! Single-line rendering of treatment items.

use crate::prescription::{PrescriptionRecord, TreatmentItem};

impl TreatmentItem {
    /// Render as e.g. `Amoxicillin via oral, dosage: 1-0-1, timing: after food (with water)`.
    ///
    /// Empty optional fields are left out; whitespace is kept as written.
    pub fn canonical_line(&self) -> String {
        let mut line = self.item.clone();

        if !self.route.is_empty() {
            line.push_str(&format!(" via {}", self.route));
        }
        if !self.dosage.is_empty() {
            line.push_str(&format!(", dosage: {}", self.dosage));
        }
        if !self.timing.is_empty() {
            line.push_str(&format!(", timing: {}", self.timing));
        }
        if !self.notes.is_empty() {
            line.push_str(&format!(" ({})", self.notes));
        }

        line
    }
}

/// Canonical lines for every treatment item, in order.
pub fn canonical_lines(record: &PrescriptionRecord) -> Vec<String> {
    record
        .treatment_and_advice
        .iter()
        .map(TreatmentItem::canonical_line)
        .collect()
}
