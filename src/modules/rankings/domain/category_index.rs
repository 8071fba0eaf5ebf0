use serde::Serialize;
use std::sync::Arc;

use crate::modules::catalog::domain::ItemAttributes;
use crate::modules::rankings::domain::taxonomy::{Category, Predicate, Subcategory, Taxonomy};
use crate::shared::errors::{AppError, AppResult};

/// Evaluates category and subcategory membership against the taxonomy table
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    taxonomy: Arc<Taxonomy>,
}

/// A category (and optional subcategory) resolved once per query
#[derive(Debug, Clone, Copy)]
pub struct CategoryFilter<'a> {
    category: &'a Category,
    subcategory: Option<&'a Subcategory>,
}

impl<'a> CategoryFilter<'a> {
    /// A subcategory matches only when its parent category matches too.
    pub fn matches(&self, attributes: &ItemAttributes) -> bool {
        self.category.predicate.evaluate(attributes)
            && self
                .subcategory
                .map_or(true, |sub| sub.predicate.evaluate(attributes))
    }

    pub fn is_identity(&self) -> bool {
        self.subcategory.is_none() && self.category.predicate == Predicate::Always
    }

    pub fn category_id(&self) -> &str {
        &self.category.id
    }

    pub fn subcategory_id(&self) -> Option<&str> {
        self.subcategory.map(|s| s.id.as_str())
    }
}

/// Listing entry for `GET /categories`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub examples: Vec<String>,
    pub subcategories: Vec<SubcategorySummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategorySummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub examples: Vec<String>,
}

impl CategoryIndex {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy: Arc::new(taxonomy),
        }
    }

    /// Look up the requested (sub)category; unknown ids are `NotFound`.
    pub fn resolve(
        &self,
        category_id: &str,
        subcategory_id: Option<&str>,
    ) -> AppResult<CategoryFilter<'_>> {
        let category = self
            .taxonomy
            .category(category_id)
            .ok_or_else(|| AppError::NotFound(format!("category '{}'", category_id)))?;

        let subcategory = match subcategory_id {
            Some(id) => Some(category.subcategory(id).ok_or_else(|| {
                AppError::NotFound(format!("subcategory '{}' of '{}'", id, category_id))
            })?),
            None => None,
        };

        Ok(CategoryFilter {
            category,
            subcategory,
        })
    }

    pub fn matches(
        &self,
        attributes: &ItemAttributes,
        category_id: &str,
        subcategory_id: Option<&str>,
    ) -> AppResult<bool> {
        Ok(self.resolve(category_id, subcategory_id)?.matches(attributes))
    }

    pub fn summaries(&self) -> Vec<CategorySummary> {
        self.taxonomy
            .categories
            .iter()
            .map(|category| CategorySummary {
                id: category.id.clone(),
                name: category.name.clone(),
                description: category.description.clone(),
                examples: category.examples.clone(),
                subcategories: category
                    .subcategories
                    .iter()
                    .map(|sub| SubcategorySummary {
                        id: sub.id.clone(),
                        name: sub.name.clone(),
                        description: sub.description.clone(),
                        examples: sub.examples.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}
