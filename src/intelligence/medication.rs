use super::keywords::MEDICATION_PATTERNS;
use crate::models::PatientContext;

/// True when the query asks about medication in general or names one of the
/// patient's current medications.
pub fn is_medication_request(text: &str, patient: &PatientContext) -> bool {
    if MEDICATION_PATTERNS.iter().any(|p| p.is_match(text)) {
        return true;
    }

    let names = patient.medication_names();
    if names.is_empty() {
        return false;
    }
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| names.iter().any(|name| name == token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientContext {
        PatientContext {
            id: "P001".into(),
            medications: vec!["Metformin 500mg".into(), "Lisinopril 10mg".into()],
            allergies: vec![],
            assigned_nurse_id: "NURSE_001".into(),
            assigned_physician_id: "DR_001".into(),
        }
    }

    #[test]
    fn generic_medication_words() {
        assert!(is_medication_request("Can I have a painkiller?", &patient()));
        assert!(is_medication_request("when is my next dose", &patient()));
    }

    #[test]
    fn patient_medication_names() {
        assert!(is_medication_request("did I take my Lisinopril today", &patient()));
    }

    #[test]
    fn unrelated_text() {
        assert!(!is_medication_request("can I get some water", &patient()));
        // partial names do not count
        assert!(!is_medication_request("metform", &patient()));
    }
}
