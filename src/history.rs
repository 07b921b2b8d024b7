//! Diagnostic logging and the write-only API call history.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::TOKEN_FIELD;
use crate::models::RawForm;
use crate::response::EligibilityResult;

/// One row of `dsapi.api_call_hist`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub id: Uuid,
    pub api_name: String,
    pub api_error_label: String,
    pub api_status: String,
    pub logic_status: String,
    pub api_request: Value,
    pub api_response: Value,
    pub created_at: DateTime<Utc>,
}

impl CallRecord {
    /// Builds the record for a finished request. The token never reaches storage.
    pub fn new(
        api_name: &str,
        api_error_label: impl Into<String>,
        form: &RawForm,
        result: &EligibilityResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            api_name: api_name.to_string(),
            api_error_label: api_error_label.into(),
            api_status: "success".to_string(),
            logic_status: result.logic_status().to_string(),
            api_request: redacted_request(form),
            api_response: serde_json::to_value(result).unwrap_or(Value::Null),
            created_at: Utc::now(),
        }
    }
}

/// Form as JSON with the token replaced.
pub fn redacted_request(form: &RawForm) -> Value {
    let map = form
        .iter()
        .map(|(key, value)| {
            let value = if key == TOKEN_FIELD {
                "[REDACTED]".to_string()
            } else {
                value.clone()
            };
            (key.clone(), Value::String(value))
        })
        .collect();
    Value::Object(map)
}

/// Audit sink for finished requests.
///
/// Recording is fire-and-forget: implementations must not block the
/// response and must swallow their own failures.
pub trait CallHistory: Send + Sync {
    fn add_api_call_hist_data(&self, record: CallRecord);
}

/// Writes history rows on a spawned task.
pub struct PgCallHistory {
    pool: PgPool,
}

impl PgCallHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CallHistory for PgCallHistory {
    fn add_api_call_hist_data(&self, record: CallRecord) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let result = sqlx::query(
                r#"
                INSERT INTO dsapi.api_call_hist
                    (id, api_name, api_error_label, api_status, logic_status, api_request, api_response, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(record.id)
            .bind(&record.api_name)
            .bind(&record.api_error_label)
            .bind(&record.api_status)
            .bind(&record.logic_status)
            .bind(&record.api_request)
            .bind(&record.api_response)
            .bind(record.created_at)
            .execute(&pool)
            .await;

            if let Err(e) = result {
                tracing::error!(
                    "Failed to store API call history {} ({}): {}",
                    record.id,
                    record.api_error_label,
                    e
                );
            }
        });
    }
}

/// Step-level diagnostic event tied to the request's application id.
pub fn make_log(form: &RawForm, message: &str, api_name: &str) {
    let application_id = form
        .get("application_id")
        .map(String::as_str)
        .unwrap_or("unknown");
    tracing::info!(api_name, application_id, "{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted() {
        let form: RawForm = [
            ("token".to_string(), "s3cret".to_string()),
            ("application_id".to_string(), "APP-1".to_string()),
        ]
        .into_iter()
        .collect();

        let value = redacted_request(&form);
        assert_eq!(value["token"], "[REDACTED]");
        assert_eq!(value["application_id"], "APP-1");
    }

    #[test]
    fn test_record_mirrors_result() {
        let form = RawForm::new();
        let result = EligibilityResult::rule_failure("Low vintage", "255");
        let record = CallRecord::new("api", "Low vintage", &form, &result);

        assert_eq!(record.api_status, "success");
        assert_eq!(record.logic_status, "fail");
        assert_eq!(record.api_response["body"]["error_response_code"], "255");
    }
}
