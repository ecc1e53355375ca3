use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured symptom entry collected during the health assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub duration: String,
}

/// Doctor chosen for an appointment, carried alongside the patient record
/// so the mapping layer can synthesize the informational symptom entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedDoctor {
    pub doctor_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub hospital: String,
}

/// A confirmed appointment selection. Date and time stay textual here;
/// normalization happens in the mapping layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSelection {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// The free-form patient record accumulated over an intake conversation.
///
/// Empty strings mean "not collected"; the mapping layer omits them. The
/// `previous_*` fields are display strings aggregated from the store for
/// returning patients, never written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, rename = "DOB")]
    pub dob: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub current_symptoms: Vec<SymptomEntry>,
    #[serde(default)]
    pub other_concerns: String,
    #[serde(default)]
    pub additional_notes: String,
    #[serde(default)]
    pub previous_symptoms: String,
    #[serde(default)]
    pub previous_medications: String,
    #[serde(default)]
    pub previous_allergies: String,
    #[serde(default)]
    pub previous_surgeries: String,
    #[serde(default)]
    pub selected_doctor: Option<SelectedDoctor>,
    #[serde(default)]
    pub appointment: Option<AppointmentSelection>,
}

impl PatientRecord {
    /// Merge an oracle-produced `patient_data` object into this record.
    ///
    /// Only recognized keys are taken; present keys overwrite, absent keys
    /// leave the accumulated value untouched.
    pub fn merge(&mut self, data: &Value) {
        let Some(obj) = data.as_object() else {
            return;
        };

        for (field, key) in [
            (&mut self.full_name, "full_name"),
            (&mut self.email, "email"),
            (&mut self.phone, "phone"),
            (&mut self.gender, "gender"),
            (&mut self.address, "address"),
            (&mut self.other_concerns, "other_concerns"),
            (&mut self.additional_notes, "additional_notes"),
        ] {
            if let Some(text) = obj.get(key).and_then(Value::as_str) {
                *field = text.to_string();
            }
        }

        // Some upstream producers use "DOB", others "dob".
        if let Some(dob) = obj
            .get("DOB")
            .or_else(|| obj.get("dob"))
            .and_then(Value::as_str)
        {
            self.dob = dob.to_string();
        }

        if let Some(age) = obj.get("age").and_then(Value::as_i64) {
            self.age = Some(age);
        }

        if let Some(symptoms) = obj.get("current_symptoms").and_then(Value::as_array) {
            let parsed: Vec<SymptomEntry> = symptoms
                .iter()
                .filter_map(|s| serde_json::from_value(s.clone()).ok())
                .collect();
            if !parsed.is_empty() {
                self.current_symptoms = parsed;
            }
        }
    }

    pub fn has_history(&self) -> bool {
        !self.previous_symptoms.is_empty()
            || !self.previous_medications.is_empty()
            || !self.previous_allergies.is_empty()
            || !self.previous_surgeries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut record = PatientRecord {
            full_name: "John Smith".to_string(),
            email: "john@example.com".to_string(),
            ..Default::default()
        };

        record.merge(&json!({
            "phone": "+91-98765-43210",
            "age": 42,
            "current_symptoms": [
                {"description": "cough", "severity": "mild", "duration": "2 days"}
            ]
        }));

        assert_eq!(record.full_name, "John Smith");
        assert_eq!(record.phone, "+91-98765-43210");
        assert_eq!(record.age, Some(42));
        assert_eq!(record.current_symptoms.len(), 1);
        assert_eq!(record.current_symptoms[0].description, "cough");
    }

    #[test]
    fn merge_accepts_both_dob_spellings() {
        let mut record = PatientRecord::default();
        record.merge(&json!({"DOB": "1990-01-01"}));
        assert_eq!(record.dob, "1990-01-01");

        record.merge(&json!({"dob": "1985-06-15"}));
        assert_eq!(record.dob, "1985-06-15");
    }

    #[test]
    fn merge_ignores_non_object_payloads() {
        let mut record = PatientRecord::default();
        record.merge(&json!("not an object"));
        assert!(record.full_name.is_empty());
    }

    #[test]
    fn record_round_trips_with_renamed_dob() {
        let record = PatientRecord {
            dob: "2003-12-13".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["DOB"], "2003-12-13");
        let back: PatientRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back.dob, "2003-12-13");
    }
}
