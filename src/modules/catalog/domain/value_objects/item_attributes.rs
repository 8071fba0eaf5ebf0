use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable descriptive attributes of a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttributes {
    pub title: String,
    pub genre: String,
    #[serde(rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub adventure_type: Option<String>,
}

impl ItemAttributes {
    pub fn new(title: impl Into<String>, genre: impl Into<String>, product_type: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genre: genre.into(),
            product_type: product_type.into(),
            system: None,
            publisher: None,
            year_published: None,
            theme: None,
            adventure_type: None,
        }
    }

    /// Value of one attribute as text, `None` when unset
    pub fn get(&self, attribute: Attribute) -> Option<String> {
        match attribute {
            Attribute::Genre => Some(self.genre.clone()),
            Attribute::Type => Some(self.product_type.clone()),
            Attribute::System => self.system.clone(),
            Attribute::Publisher => self.publisher.clone(),
            Attribute::Year => self.year_published.map(|y| y.to_string()),
            Attribute::Theme => self.theme.clone(),
            Attribute::AdventureType => self.adventure_type.clone(),
        }
    }
}

/// Attributes a category predicate may test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Genre,
    Type,
    System,
    Publisher,
    Year,
    Theme,
    AdventureType,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Genre => "genre",
            Attribute::Type => "type",
            Attribute::System => "system",
            Attribute::Publisher => "publisher",
            Attribute::Year => "year",
            Attribute::Theme => "theme",
            Attribute::AdventureType => "adventureType",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_attributes_by_name() {
        let mut attrs = ItemAttributes::new("Curse of Strahd", "horror", "adventure");
        attrs.year_published = Some(2016);

        assert_eq!(attrs.get(Attribute::Genre).as_deref(), Some("horror"));
        assert_eq!(attrs.get(Attribute::Year).as_deref(), Some("2016"));
        assert_eq!(attrs.get(Attribute::Theme), None);
    }

    #[test]
    fn deserializes_camel_case_with_type_keyword() {
        let attrs: ItemAttributes = serde_json::from_str(
            r#"{"title":"Tomb","genre":"fantasy","type":"adventure","adventureType":"one-shot"}"#,
        )
        .unwrap();
        assert_eq!(attrs.product_type, "adventure");
        assert_eq!(attrs.adventure_type.as_deref(), Some("one-shot"));
    }
}
