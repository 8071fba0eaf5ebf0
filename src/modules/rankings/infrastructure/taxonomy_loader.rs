use std::path::Path;

use crate::log_info;
use crate::modules::rankings::domain::Taxonomy;
use crate::shared::errors::{AppError, AppResult};

/// Load the category table from a JSON file, or the built-in table when no path is set.
pub async fn load_taxonomy(path: Option<&Path>) -> AppResult<Taxonomy> {
    let taxonomy = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::ConfigError(format!("cannot read taxonomy {}: {}", path.display(), e))
            })?;
            parse_taxonomy(&raw)?
        }
        None => Taxonomy::builtin(),
    };

    let taxonomy = taxonomy.validated()?;
    log_info!(
        categories = taxonomy.categories.len(),
        source = %path.map_or_else(|| "builtin".to_string(), |p| p.display().to_string()),
        "Taxonomy loaded"
    );
    Ok(taxonomy)
}

pub fn parse_taxonomy(raw: &str) -> AppResult<Taxonomy> {
    serde_json::from_str(raw).map_err(|e| AppError::ConfigError(format!("invalid taxonomy: {}", e)))
}
