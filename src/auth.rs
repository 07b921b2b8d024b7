use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};
use crate::models::RawForm;

/// Form field carrying the caller's API token.
pub const TOKEN_FIELD: &str = "token";

/// Outcome of the token and API-access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// Denied with the message returned to the caller.
    Denied(String),
}

/// Authentication gate in front of the eligibility pipeline.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn validate_token_and_api_access(
        &self,
        form: &RawForm,
        api_name: &str,
    ) -> Result<AccessDecision, AppError>;
}

/// Hex-encoded SHA-256 of a token. Only hashes are stored or compared.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Token lookup against `dsapi.api_access_tokens`.
///
/// A token may be granted several APIs; each grant is its own row.
pub struct PgAccessGate {
    pool: PgPool,
}

impl PgAccessGate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessGate for PgAccessGate {
    async fn validate_token_and_api_access(
        &self,
        form: &RawForm,
        api_name: &str,
    ) -> Result<AccessDecision, AppError> {
        let Some(token) = form.get(TOKEN_FIELD).map(|t| t.trim()).filter(|t| !t.is_empty()) else {
            return Ok(AccessDecision::Denied("token is missing".to_string()));
        };

        let granted_apis = sqlx::query_scalar::<_, String>(
            "SELECT api_name FROM dsapi.api_access_tokens
             WHERE token_sha256 = $1 AND is_active = TRUE",
        )
        .bind(hash_token(token))
        .fetch_all(&self.pool)
        .await
        .context("checking API token")?;

        Ok(decide(&granted_apis, api_name))
    }
}

/// Maps the APIs granted to a token onto a decision for `api_name`.
pub fn decide(granted_apis: &[String], api_name: &str) -> AccessDecision {
    if granted_apis.is_empty() {
        tracing::warn!("Rejected unknown or inactive API token");
        return AccessDecision::Denied("invalid token".to_string());
    }
    if granted_apis.iter().any(|granted| granted == api_name) {
        AccessDecision::Granted
    } else {
        tracing::warn!("API token has no grant for {}", api_name);
        AccessDecision::Denied("token does not have access to this API".to_string())
    }
}
