//! Rule bounds stored in `dsapi.los_thresholds`, keyed by API name.

use async_trait::async_trait;
use moka::future::Cache;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{AppError, ResultExt};

pub const MIN_VINTAGE: &str = "MIN_VINTAGE";
pub const MAX_VINTAGE: &str = "MAX_VINTAGE";
pub const MIN_TURNOVER: &str = "MIN_TURNOVER";
pub const MAX_TURNOVER: &str = "MAX_TURNOVER";
pub const MIN_LOAN_AMOUNT: &str = "MIN_LOAN_AMOUNT";
pub const MAX_LOAN_AMOUNT: &str = "MAX_LOAN_AMOUNT";
pub const MIN_CRIF_SCORE: &str = "MIN_CRIF_SCORE";
pub const MAX_CRIF_SCORE: &str = "MAX_CRIF_SCORE";

/// One `(var_key, var_value)` row of the threshold table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ThresholdRow {
    pub var_key: String,
    pub var_value: String,
}

impl ThresholdRow {
    pub fn new(var_key: impl Into<String>, var_value: impl Into<String>) -> Self {
        Self {
            var_key: var_key.into(),
            var_value: var_value.into(),
        }
    }
}

/// Immutable snapshot of every bound the rule chain reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdSet {
    pub min_vintage: i64,
    pub max_vintage: i64,
    pub min_turnover: i64,
    pub max_turnover: i64,
    pub min_loan_amount: i64,
    pub max_loan_amount: i64,
    pub min_crif_score: i64,
    pub max_crif_score: i64,
}

impl ThresholdSet {
    /// Builds the set from table rows.
    ///
    /// Each of the eight keys must match exactly one row holding an integer.
    /// Anything else is a configuration error, not a business rejection.
    pub fn from_rows(api_name: &str, rows: &[ThresholdRow]) -> Result<Self, AppError> {
        let value = |key: &str| -> Result<i64, AppError> {
            let mut matches = rows.iter().filter(|row| row.var_key == key);
            let row = match (matches.next(), matches.next()) {
                (Some(row), None) => row,
                (None, _) => {
                    return Err(AppError::Configuration(format!(
                        "threshold {} is not configured for {}",
                        key, api_name
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(AppError::Configuration(format!(
                        "threshold {} is configured more than once for {}",
                        key, api_name
                    )))
                }
            };
            row.var_value.trim().parse::<i64>().map_err(|_| {
                AppError::Configuration(format!(
                    "threshold {} for {} is not an integer: {:?}",
                    key, api_name, row.var_value
                ))
            })
        };

        Ok(Self {
            min_vintage: value(MIN_VINTAGE)?,
            max_vintage: value(MAX_VINTAGE)?,
            min_turnover: value(MIN_TURNOVER)?,
            max_turnover: value(MAX_TURNOVER)?,
            min_loan_amount: value(MIN_LOAN_AMOUNT)?,
            max_loan_amount: value(MAX_LOAN_AMOUNT)?,
            min_crif_score: value(MIN_CRIF_SCORE)?,
            max_crif_score: value(MAX_CRIF_SCORE)?,
        })
    }
}

/// Source of rule bounds for an API.
#[async_trait]
pub trait ThresholdProvider: Send + Sync {
    async fn thresholds(&self, api_name: &str) -> Result<ThresholdSet, AppError>;
}

/// Reads thresholds from Postgres on every call.
pub struct PgThresholdProvider {
    pool: PgPool,
}

impl PgThresholdProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThresholdProvider for PgThresholdProvider {
    async fn thresholds(&self, api_name: &str) -> Result<ThresholdSet, AppError> {
        let rows = sqlx::query_as::<_, ThresholdRow>(
            "SELECT var_key, var_value FROM dsapi.los_thresholds WHERE api_name = $1",
        )
        .bind(api_name)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("loading thresholds for {}", api_name))?;

        tracing::debug!("Loaded {} threshold rows for {}", rows.len(), api_name);
        ThresholdSet::from_rows(api_name, &rows)
    }
}

/// Caches complete threshold sets per API name.
///
/// Failed lookups are not cached, so a fixed table is picked up on the next
/// request.
pub struct CachedThresholdProvider {
    inner: Arc<dyn ThresholdProvider>,
    cache: Cache<String, ThresholdSet>,
}

impl CachedThresholdProvider {
    pub fn new(inner: Arc<dyn ThresholdProvider>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(64)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl ThresholdProvider for CachedThresholdProvider {
    async fn thresholds(&self, api_name: &str) -> Result<ThresholdSet, AppError> {
        if let Some(cached) = self.cache.get(api_name).await {
            tracing::debug!("Threshold cache HIT for {}", api_name);
            return Ok(cached);
        }

        tracing::debug!("Threshold cache MISS for {}", api_name);
        let thresholds = self.inner.thresholds(api_name).await?;
        self.cache.insert(api_name.to_string(), thresholds).await;
        Ok(thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn full_rows() -> Vec<ThresholdRow> {
        vec![
            ThresholdRow::new(MIN_VINTAGE, "12"),
            ThresholdRow::new(MAX_VINTAGE, "24"),
            ThresholdRow::new(MIN_TURNOVER, "600000"),
            ThresholdRow::new(MAX_TURNOVER, "180000000"),
            ThresholdRow::new(MIN_LOAN_AMOUNT, "50000"),
            ThresholdRow::new(MAX_LOAN_AMOUNT, "3000000"),
            ThresholdRow::new(MIN_CRIF_SCORE, "300"),
            ThresholdRow::new(MAX_CRIF_SCORE, "650"),
        ]
    }

    #[test]
    fn test_complete_rows_build_set() {
        let set = ThresholdSet::from_rows("api", &full_rows()).unwrap();
        assert_eq!(set.min_vintage, 12);
        assert_eq!(set.max_vintage, 24);
        assert_eq!(set.max_turnover, 180_000_000);
        assert_eq!(set.max_crif_score, 650);
    }

    #[test]
    fn test_unrelated_rows_are_ignored() {
        let mut rows = full_rows();
        rows.push(ThresholdRow::new("MAX_EMI", "not a number"));
        assert!(ThresholdSet::from_rows("api", &rows).is_ok());
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let rows: Vec<_> = full_rows()
            .into_iter()
            .filter(|row| row.var_key != MAX_LOAN_AMOUNT)
            .collect();

        let err = ThresholdSet::from_rows("api", &rows).unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref msg) if msg.contains(MAX_LOAN_AMOUNT)));
    }

    #[test]
    fn test_duplicate_key_is_configuration_error() {
        let mut rows = full_rows();
        rows.push(ThresholdRow::new(MIN_VINTAGE, "6"));

        let err = ThresholdSet::from_rows("api", &rows).unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref msg) if msg.contains("more than once")));
    }

    #[test]
    fn test_non_integer_value_is_configuration_error() {
        let mut rows = full_rows();
        rows.retain(|row| row.var_key != MIN_CRIF_SCORE);
        rows.push(ThresholdRow::new(MIN_CRIF_SCORE, "3.5"));

        assert!(matches!(
            ThresholdSet::from_rows("api", &rows),
            Err(AppError::Configuration(_))
        ));
    }

    struct CountingProvider {
        calls: AtomicUsize,
        rows: Vec<ThresholdRow>,
    }

    #[async_trait]
    impl ThresholdProvider for CountingProvider {
        async fn thresholds(&self, api_name: &str) -> Result<ThresholdSet, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ThresholdSet::from_rows(api_name, &self.rows)
        }
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_lookups() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            rows: full_rows(),
        });
        let cached = CachedThresholdProvider::new(inner.clone(), Duration::from_secs(60));

        let first = cached.thresholds("api").await.unwrap();
        let second = cached.thresholds("api").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_does_not_keep_failures() {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            rows: Vec::new(),
        });
        let cached = CachedThresholdProvider::new(inner.clone(), Duration::from_secs(60));

        assert!(cached.thresholds("api").await.is_err());
        assert!(cached.thresholds("api").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
