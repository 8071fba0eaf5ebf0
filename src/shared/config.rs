use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, warn};

use crate::shared::application::PageLimits;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::retry::RetryConfig;

/// Bayesian smoothing parameters
#[derive(Debug, Clone)]
pub struct RatingConfig {
    /// Number of virtual reviews at the prior mean every item starts with (C)
    pub prior_weight: f64,
    /// Prior mean used while no item has any review
    pub default_prior_mean: f64,
    /// How long a computed global prior mean stays valid
    pub prior_mean_ttl: Duration,
    /// Review count from which the raw average is considered trustworthy
    pub trusted_review_threshold: u32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            prior_weight: 10.0,
            default_prior_mean: 5.5,
            prior_mean_ttl: Duration::from_secs(300),
            trusted_review_threshold: 10,
        }
    }
}

/// Maintenance cycle and job delivery settings
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    pub reassign_interval: Duration,
    pub reassign_after_events: u64,
    pub job_max_attempts: u32,
    pub poll_interval: Duration,
    pub retry: RetryConfig,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            reassign_interval: Duration::from_secs(900),
            reassign_after_events: 50,
            job_max_attempts: 5,
            poll_interval: Duration::from_secs(1),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub taxonomy_path: Option<PathBuf>,
    pub seed_path: Option<PathBuf>,
    pub rating: RatingConfig,
    pub pages: PageLimits,
    pub maintenance: MaintenanceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            taxonomy_path: None,
            seed_path: None,
            rating: RatingConfig::default(),
            pages: PageLimits::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let retry = RetryConfig {
            base_delay: Duration::from_millis(try_load(
                &lookup,
                "RANKING_RETRY_BASE_MS",
                defaults.maintenance.retry.base_delay.as_millis() as u64,
            )?),
            ..RetryConfig::default()
        };

        let config = Self {
            bind_addr: try_load(&lookup, "RANKINGS_BIND_ADDR", defaults.bind_addr)?,
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            taxonomy_path: lookup("TAXONOMY_PATH").map(PathBuf::from),
            seed_path: lookup("SEED_PATH").map(PathBuf::from),
            rating: RatingConfig {
                prior_weight: try_load(&lookup, "RANKING_PRIOR_WEIGHT", defaults.rating.prior_weight)?,
                default_prior_mean: try_load(
                    &lookup,
                    "RANKING_DEFAULT_PRIOR_MEAN",
                    defaults.rating.default_prior_mean,
                )?,
                prior_mean_ttl: Duration::from_secs(try_load(
                    &lookup,
                    "RANKING_PRIOR_MEAN_TTL_SECS",
                    defaults.rating.prior_mean_ttl.as_secs(),
                )?),
                trusted_review_threshold: try_load(
                    &lookup,
                    "RANKING_TRUSTED_REVIEWS",
                    defaults.rating.trusted_review_threshold,
                )?,
            },
            pages: PageLimits {
                default_limit: try_load(
                    &lookup,
                    "RANKING_DEFAULT_PAGE_LIMIT",
                    defaults.pages.default_limit,
                )?,
                max_limit: try_load(&lookup, "RANKING_MAX_PAGE_LIMIT", defaults.pages.max_limit)?,
            },
            maintenance: MaintenanceConfig {
                reassign_interval: Duration::from_secs(try_load(
                    &lookup,
                    "RANKING_REASSIGN_INTERVAL_SECS",
                    defaults.maintenance.reassign_interval.as_secs(),
                )?),
                reassign_after_events: try_load(
                    &lookup,
                    "RANKING_REASSIGN_AFTER_EVENTS",
                    defaults.maintenance.reassign_after_events,
                )?,
                job_max_attempts: try_load(
                    &lookup,
                    "RANKING_JOB_MAX_ATTEMPTS",
                    defaults.maintenance.job_max_attempts,
                )?,
                poll_interval: defaults.maintenance.poll_interval,
                retry,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let rating = &self.rating;
        if !(rating.prior_weight.is_finite() && rating.prior_weight > 0.0) {
            return Err(AppError::ConfigError(format!(
                "RANKING_PRIOR_WEIGHT must be a positive number, got {}",
                rating.prior_weight
            )));
        }
        if !(1.0..=10.0).contains(&rating.default_prior_mean) {
            return Err(AppError::ConfigError(format!(
                "RANKING_DEFAULT_PRIOR_MEAN must lie on the 1-10 rating scale, got {}",
                rating.default_prior_mean
            )));
        }
        if self.pages.max_limit == 0 || self.pages.default_limit == 0 {
            return Err(AppError::ConfigError(
                "page limits must be positive".to_string(),
            ));
        }
        if self.pages.default_limit > self.pages.max_limit {
            return Err(AppError::ConfigError(format!(
                "RANKING_DEFAULT_PAGE_LIMIT ({}) exceeds RANKING_MAX_PAGE_LIMIT ({})",
                self.pages.default_limit, self.pages.max_limit
            )));
        }
        if self.maintenance.reassign_interval.is_zero() {
            return Err(AppError::ConfigError(
                "RANKING_REASSIGN_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.maintenance.job_max_attempts == 0 {
            return Err(AppError::ConfigError(
                "RANKING_JOB_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(AppError::ConfigError(
                    "Invalid database URL format. Must start with postgres:// or postgresql://"
                        .to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value '{raw}': {e}");
            AppError::ConfigError(format!("Invalid {key} value '{raw}': {e}"))
        }),
    }
}
