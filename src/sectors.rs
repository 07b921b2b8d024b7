use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::{AppError, ResultExt};

/// Sector and sub-sector exclusion lists.
#[async_trait]
pub trait SectorCatalog: Send + Sync {
    /// True when the main sector is financed for this business type.
    async fn validate_sector(&self, main_sector: &str, business_type: &str)
        -> Result<bool, AppError>;

    /// True when the specific sector is on the exclusion list.
    async fn validate_subsector(
        &self,
        main_sector: &str,
        business_type: &str,
        specific_sector: &str,
    ) -> Result<bool, AppError>;
}

/// Catalog backed by `dsapi.los_sector_master` and
/// `dsapi.los_excluded_subsectors`. Matching is case-insensitive.
pub struct PgSectorCatalog {
    pool: PgPool,
}

impl PgSectorCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectorCatalog for PgSectorCatalog {
    async fn validate_sector(
        &self,
        main_sector: &str,
        business_type: &str,
    ) -> Result<bool, AppError> {
        // Unknown sectors are not financed.
        let is_valid = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM dsapi.los_sector_master
                WHERE LOWER(business_type) = LOWER($1)
                  AND LOWER(main_sector) = LOWER($2)
                  AND is_excluded = FALSE
            )
            "#,
        )
        .bind(business_type.trim())
        .bind(main_sector.trim())
        .fetch_one(&self.pool)
        .await
        .context("validating business sector")?;

        tracing::debug!(
            "Sector '{}' for business type '{}' valid: {}",
            main_sector,
            business_type,
            is_valid
        );
        Ok(is_valid)
    }

    async fn validate_subsector(
        &self,
        main_sector: &str,
        business_type: &str,
        specific_sector: &str,
    ) -> Result<bool, AppError> {
        let is_excluded = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM dsapi.los_excluded_subsectors
                WHERE LOWER(business_type) = LOWER($1)
                  AND LOWER(main_sector) = LOWER($2)
                  AND LOWER(specific_sector) = LOWER($3)
            )
            "#,
        )
        .bind(business_type.trim())
        .bind(main_sector.trim())
        .bind(specific_sector.trim())
        .fetch_one(&self.pool)
        .await
        .context("validating business sub-sector")?;

        tracing::debug!(
            "Sub-sector '{}' under '{}' excluded: {}",
            specific_sector,
            main_sector,
            is_excluded
        );
        Ok(is_excluded)
    }
}
