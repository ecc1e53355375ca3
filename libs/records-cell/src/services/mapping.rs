use chrono::NaiveDateTime;
use serde_json::{json, Map, Value};

use shared_models::PatientRecord;
use shared_utils::dates::normalize_date;

use crate::models::MappedOperation;

/// Map an accumulated patient record to the ordered operation list the
/// importer executes: a patients upsert with empty fields omitted, an
/// optional appointments insert, and a symptoms batch.
///
/// `recorded_at` is the server-assigned timestamp stamped on every symptom
/// record; callers pass the current time.
pub fn map_patient_record(
    record: &PatientRecord,
    recorded_at: NaiveDateTime,
) -> Vec<MappedOperation> {
    let mut operations = Vec::new();
    let recorded_at = recorded_at.format("%Y-%m-%d %H:%M:%S").to_string();

    let mut patient_columns = Map::new();
    let dob = if record.dob.is_empty() {
        String::new()
    } else {
        normalize_date(&record.dob)
    };
    for (column, value) in [
        ("full_name", record.full_name.as_str()),
        ("email", record.email.as_str()),
        ("phone", record.phone.as_str()),
        ("DOB", dob.as_str()),
        ("gender", record.gender.as_str()),
        ("address", record.address.as_str()),
    ] {
        if !value.is_empty() {
            patient_columns.insert(column.to_string(), json!(value));
        }
    }
    if !patient_columns.is_empty() {
        operations.push(MappedOperation::Single {
            table: "patients".to_string(),
            columns: patient_columns,
        });
    }

    let mut symptom_records: Vec<Map<String, Value>> = record
        .current_symptoms
        .iter()
        .map(|symptom| {
            let mut columns = Map::new();
            columns.insert("symptom_description".to_string(), json!(symptom.description));
            columns.insert("severity".to_string(), json!(symptom.severity));
            columns.insert("duration".to_string(), json!(symptom.duration));
            columns.insert("recorded_at".to_string(), json!(recorded_at));
            columns
        })
        .collect();

    if let (Some(doctor), Some(appointment)) = (&record.selected_doctor, &record.appointment) {
        let mut appointment_columns = Map::new();
        appointment_columns.insert("doctor_id".to_string(), json!(doctor.doctor_id));
        let date = normalize_date(&appointment.date);
        if !date.is_empty() {
            appointment_columns.insert("appointment_date".to_string(), json!(date));
        }
        if !appointment.time.is_empty() {
            appointment_columns.insert("appointment_time".to_string(), json!(appointment.time));
        }
        appointment_columns.insert("status".to_string(), json!(1));

        operations.push(MappedOperation::Single {
            table: "appointments".to_string(),
            columns: appointment_columns,
        });

        let mut note = Map::new();
        note.insert(
            "symptom_description".to_string(),
            json!(format!(
                "Scheduled appointment with Dr. {} ({}) at {} for {} {}",
                doctor.name,
                doctor.specialization,
                doctor.hospital,
                appointment.date,
                appointment.time
            )),
        );
        note.insert("severity".to_string(), json!("info"));
        note.insert("duration".to_string(), json!("N/A"));
        note.insert("recorded_at".to_string(), json!(recorded_at));
        symptom_records.push(note);
    }

    if !symptom_records.is_empty() {
        operations.push(MappedOperation::Batch {
            table: "symptoms".to_string(),
            records: symptom_records,
        });
    }

    operations
}
