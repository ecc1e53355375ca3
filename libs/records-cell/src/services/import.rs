use serde_json::{json, Map, Value};
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::MySql;
use tracing::{debug, info};

use shared_database::Database;

use crate::models::{ImportError, ImportReport, MappedOperation};

/// Maximum stored length of a symptom description (TEXT column).
const MAX_DESCRIPTION_CHARS: usize = 65_535;

/// Executes a mapped operation list against the store in one transaction.
///
/// Order matters: the patients insert runs first and its generated id is
/// attached to every subsequent appointments/symptoms row. Any failure
/// rolls the whole transaction back; partial commits never happen.
pub struct ImportService {
    db: Database,
}

impl ImportService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    pub async fn import_operations(
        &self,
        operations: &[MappedOperation],
    ) -> Result<ImportReport, ImportError> {
        let mut tx = self.db.pool().begin().await?;
        let mut patient_id: Option<i64> = None;

        for operation in operations {
            match operation {
                MappedOperation::Single { table, columns } if table == "patients" => {
                    if !columns.is_empty() {
                        let id = insert_record(&mut tx, table, columns).await?;
                        patient_id = Some(id);
                    }
                }
                MappedOperation::Single { table, columns } if table == "appointments" => {
                    let Some(patient_id) = patient_id else {
                        debug!("Skipping appointments operation without a patient id");
                        continue;
                    };
                    if !columns.is_empty() {
                        let mut columns = columns.clone();
                        columns.insert("patient_id".to_string(), json!(patient_id));
                        insert_record(&mut tx, table, &columns).await?;
                    }
                }
                MappedOperation::Batch { table, records } if table == "symptoms" => {
                    let Some(patient_id) = patient_id else {
                        debug!("Skipping symptoms operation without a patient id");
                        continue;
                    };
                    for record in records {
                        let mut record = record.clone();
                        record.insert("patient_id".to_string(), json!(patient_id));
                        if let Some(Value::String(description)) =
                            record.get("symptom_description").cloned()
                        {
                            record.insert(
                                "symptom_description".to_string(),
                                json!(truncate_chars(&description, MAX_DESCRIPTION_CHARS)),
                            );
                        }
                        insert_record(&mut tx, table, &record).await?;
                    }
                }
                other => {
                    debug!("Skipping operation for unrecognized table {}", other.table());
                }
            }
        }

        tx.commit().await?;
        info!("Imported {} mapped operations", operations.len());

        Ok(ImportReport {
            status: "success".to_string(),
            patient_id,
        })
    }
}

async fn insert_record(
    tx: &mut sqlx::Transaction<'_, MySql>,
    table: &str,
    columns: &Map<String, Value>,
) -> Result<i64, ImportError> {
    let column_names = columns
        .keys()
        .map(|key| format!("`{}`", key))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO `{}` ({}) VALUES ({})",
        table, column_names, placeholders
    );
    debug!("Executing import insert into {}", table);

    let mut query = sqlx::query(&sql);
    for value in columns.values() {
        query = bind_value(query, value);
    }

    let result = query.execute(&mut **tx).await?;
    Ok(result.last_insert_id() as i64)
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => query.bind(integer),
            None => query.bind(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => query.bind(text.clone()),
        other => query.bind(other.to_string()),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_character_based() {
        let long = "é".repeat(70_000);
        assert_eq!(
            truncate_chars(&long, MAX_DESCRIPTION_CHARS).chars().count(),
            MAX_DESCRIPTION_CHARS
        );
        assert_eq!(truncate_chars("short", MAX_DESCRIPTION_CHARS), "short");
    }
}
