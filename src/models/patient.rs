use serde::{Deserialize, Serialize};

/// Static patient attributes consumed by the decision core. Never mutated
/// while a decision is being made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContext {
    pub id: String,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub assigned_nurse_id: String,
    pub assigned_physician_id: String,
}

/// Full hospital record for a patient. Read-only from the core's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(flatten)]
    pub context: PatientContext,
    pub name: String,
    pub bed_number: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl PatientContext {
    /// Lowercased first token of each medication entry ("Metformin 500mg" -> "metformin").
    pub fn medication_names(&self) -> Vec<String> {
        self.medications
            .iter()
            .filter_map(|m| m.split_whitespace().next())
            .map(|name| name.to_lowercase())
            .filter(|name| name.chars().count() >= 3)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PatientContext {
        PatientContext {
            id: "P001".into(),
            medications: vec!["Metformin 500mg".into(), "Lisinopril 10mg".into(), "B 1mg".into()],
            allergies: vec!["Penicillin".into()],
            assigned_nurse_id: "NURSE_001".into(),
            assigned_physician_id: "DR_001".into(),
        }
    }

    #[test]
    fn medication_names_take_first_token() {
        assert_eq!(context().medication_names(), vec!["metformin", "lisinopril"]);
    }

    #[test]
    fn record_flattens_context_in_json() {
        let record = PatientRecord {
            context: context(),
            name: "Sample Patient".into(),
            bed_number: "B012".into(),
            language: "en".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "P001");
        assert_eq!(json["assigned_nurse_id"], "NURSE_001");
        assert_eq!(json["bed_number"], "B012");
    }

    #[test]
    fn language_defaults_to_english() {
        let record: PatientRecord = serde_json::from_str(
            r#"{"id":"P2","assigned_nurse_id":"N","assigned_physician_id":"D","name":"X","bed_number":"B1"}"#,
        )
        .unwrap();
        assert_eq!(record.language, "en");
        assert!(record.context.medications.is_empty());
    }
}
