use serde::Deserialize;

/// Default API name used for access checks, threshold lookup and call history.
pub const DEFAULT_API_NAME: &str = "los/v1/online_leads_eligibility";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub pincode_service_url: String,
    pub pincode_timeout_secs: u64,
    pub threshold_cache_ttl_secs: u64,
    pub api_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            pincode_service_url: std::env::var("PINCODE_SERVICE_URL")
                .map_err(|_| anyhow::anyhow!("PINCODE_SERVICE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("PINCODE_SERVICE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("PINCODE_SERVICE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })?,
            pincode_timeout_secs: std::env::var("PINCODE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PINCODE_TIMEOUT_SECS must be a whole number"))?,
            threshold_cache_ttl_secs: std::env::var("THRESHOLD_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("THRESHOLD_CACHE_TTL_SECS must be a whole number"))?,
            api_name: std::env::var("API_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_NAME.to_string()),
        };

        // Never log the full database URL, it carries credentials.
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_preview(&config.database_url));
        tracing::debug!("Pincode service URL: {}", config.pincode_service_url);
        tracing::debug!(
            "Threshold cache TTL: {}s, pincode timeout: {}s",
            config.threshold_cache_ttl_secs,
            config.pincode_timeout_secs
        );
        tracing::debug!("API name: {}", config.api_name);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// First 20 characters of a connection URL, for logs.
fn url_preview(url: &str) -> String {
    url.chars().take(20).collect()
}
