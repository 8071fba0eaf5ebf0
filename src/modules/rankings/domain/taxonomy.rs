use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::modules::catalog::domain::{Attribute, ItemAttributes};
use crate::shared::errors::{AppError, AppResult};

pub const OVERALL: &str = "overall";

/// Declarative membership rule over static item attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate {
    Always,
    Eq { attribute: Attribute, value: String },
    In { attribute: Attribute, values: Vec<String> },
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn eq(attribute: Attribute, value: impl Into<String>) -> Self {
        Predicate::Eq {
            attribute,
            value: value.into(),
        }
    }

    pub fn one_of<I, S>(attribute: Attribute, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::In {
            attribute,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Pure evaluation; string comparisons ignore ASCII case and surrounding whitespace.
    pub fn evaluate(&self, attributes: &ItemAttributes) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Eq { attribute, value } => attributes
                .get(*attribute)
                .is_some_and(|actual| same_value(&actual, value)),
            Predicate::In { attribute, values } => attributes
                .get(*attribute)
                .is_some_and(|actual| values.iter().any(|v| same_value(&actual, v))),
            Predicate::All(rules) => rules.iter().all(|rule| rule.evaluate(attributes)),
            Predicate::Any(rules) => rules.iter().any(|rule| rule.evaluate(attributes)),
            Predicate::Not(rule) => !rule.evaluate(attributes),
        }
    }
}

fn same_value(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Well-known titles shown next to the description
    #[serde(default)]
    pub examples: Vec<String>,
    pub predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
    pub predicate: Predicate,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    fn overall() -> Self {
        Category {
            id: OVERALL.to_string(),
            name: "Overall".to_string(),
            description: "Every rated product, ranked together".to_string(),
            examples: Vec::new(),
            predicate: Predicate::Always,
            subcategories: Vec::new(),
        }
    }

    pub fn subcategory(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }
}

/// Static category table. Membership is always computed from it, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    pub categories: Vec<Category>,
}

impl Taxonomy {
    /// Check ids and guarantee an identity "overall" category listed first.
    pub fn validated(mut self) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                return Err(AppError::ConfigError("category with empty id".to_string()));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(AppError::ConfigError(format!(
                    "duplicate category id '{}'",
                    category.id
                )));
            }

            let mut sub_seen = HashSet::new();
            for sub in &category.subcategories {
                if sub.id.trim().is_empty() || !sub_seen.insert(sub.id.as_str()) {
                    return Err(AppError::ConfigError(format!(
                        "invalid or duplicate subcategory id '{}' in '{}'",
                        sub.id, category.id
                    )));
                }
            }
        }

        match self.categories.iter().position(|c| c.id == OVERALL) {
            Some(index) => {
                if self.categories[index].predicate != Predicate::Always {
                    return Err(AppError::ConfigError(
                        "the overall category must use the always predicate".to_string(),
                    ));
                }
                let overall = self.categories.remove(index);
                self.categories.insert(0, overall);
            }
            None => self.categories.insert(
                0,
                Category::overall(),
            ),
        }

        Ok(self)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Default table covering genres, product types, adventure formats and themes
    pub fn builtin() -> Self {
        let adventure = || Predicate::eq(Attribute::Type, "adventure");

        let genres = [
            ("fantasy", "Fantasy", "Swords, sorcery and other worlds"),
            ("sci-fi", "Science Fiction", "Starships, far futures and strange science"),
            ("horror", "Horror", "Dread, investigation and the things that lurk"),
            ("modern", "Modern", "Present-day settings, from spies to urban weirdness"),
            ("superhero", "Superhero", "Capes, powers and four-colour action"),
            ("historical", "Historical", "Real eras, with or without a supernatural twist"),
        ];
        let types: [Entry; 4] = [
            (
                "core-rules",
                "Core Rules",
                "Rulebooks needed to play the game",
                &["Player's Handbook", "Call of Cthulhu Keeper Rulebook"],
            ),
            (
                "adventure",
                "Adventures",
                "Ready-to-run scenarios and campaigns",
                &["Curse of Strahd", "Masks of Nyarlathotep"],
            ),
            (
                "setting",
                "Settings",
                "World books describing places, peoples and history",
                &["Eberron: Rising from the Last War", "The Forgotten Realms Campaign Setting"],
            ),
            (
                "supplement",
                "Supplements",
                "Optional rules, monsters, gear and GM tools",
                &["Xanathar's Guide to Everything", "Monster Manual"],
            ),
        ];
        let formats: [Entry; 5] = [
            (
                "one-shot",
                "One-Shots",
                "Self-contained adventures played in a single session",
                &["The Wandering Inn", "The Haunting"],
            ),
            (
                "module",
                "Modules",
                "Shorter adventures spanning a few sessions",
                &["Keep on the Borderlands", "The Sunless Citadel"],
            ),
            (
                "campaign",
                "Campaigns",
                "Long adventures that run for months of play",
                &["Curse of Strahd", "Masks of Nyarlathotep"],
            ),
            (
                "anthology",
                "Anthologies",
                "Collections of shorter adventures in one book",
                &["Tales from the Yawning Portal", "Candlekeep Mysteries"],
            ),
            (
                "setting-book",
                "Setting Books",
                "Locations built to host many adventures",
                &["Waterdeep: Dragon Heist", "Blades in the Dark: Doskvol"],
            ),
        ];
        let themes: [Entry; 6] = [
            (
                "action",
                "Action",
                "Combat-forward adventures with set-piece battles",
                &["Tomb of Annihilation"],
            ),
            (
                "horror",
                "Horror",
                "Adventures built around fear and tension",
                &["Curse of Strahd", "The Haunting of Harrowstone"],
            ),
            (
                "mystery",
                "Mystery",
                "Investigations driven by clues and deduction",
                &["Masks of Nyarlathotep", "Candlekeep Mysteries"],
            ),
            (
                "exploration",
                "Exploration",
                "Wilderness, dungeons and the unknown",
                &["Tomb of Annihilation", "The Isle of Dread"],
            ),
            (
                "political",
                "Political",
                "Factions, intrigue and shifting alliances",
                &["Waterdeep: Dragon Heist"],
            ),
            (
                "social",
                "Social",
                "Roleplay-heavy adventures about people and relationships",
                &["The Wild Beyond the Witchlight"],
            ),
        ];

        let mut categories = vec![Category::overall()];

        categories.extend(genres.iter().map(|(id, name, description)| Category {
            id: (*id).to_string(),
            name: (*name).to_string(),
            description: (*description).to_string(),
            examples: Vec::new(),
            predicate: Predicate::eq(Attribute::Genre, *id),
            subcategories: subcategories(&types, Attribute::Type),
        }));

        categories.push(Category {
            id: "adventures".to_string(),
            name: "Adventures".to_string(),
            description: "Adventures of every genre, by format".to_string(),
            examples: Vec::new(),
            predicate: adventure(),
            subcategories: subcategories(&formats, Attribute::AdventureType),
        });

        categories.push(Category {
            id: "themes".to_string(),
            name: "Adventures by Theme".to_string(),
            description: "Adventures grouped by what the table spends its time doing".to_string(),
            examples: Vec::new(),
            predicate: adventure(),
            subcategories: subcategories(&themes, Attribute::Theme),
        });

        categories.push(Category {
            id: "rulebooks".to_string(),
            name: "Rulebooks & Supplements".to_string(),
            description: "Everything that is not an adventure".to_string(),
            examples: vec!["Player's Handbook".to_string(), "Monster Manual".to_string()],
            predicate: Predicate::Not(Box::new(adventure())),
            subcategories: Vec::new(),
        });

        Self { categories }
    }
}

/// Builtin subcategory row: id, name, description, examples
type Entry = (&'static str, &'static str, &'static str, &'static [&'static str]);

fn subcategories(entries: &[Entry], attribute: Attribute) -> Vec<Subcategory> {
    entries
        .iter()
        .map(|(id, name, description, examples)| Subcategory {
            id: (*id).to_string(),
            name: (*name).to_string(),
            description: (*description).to_string(),
            examples: examples.iter().map(|e| (*e).to_string()).collect(),
            predicate: Predicate::eq(attribute, *id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horror_one_shot() -> ItemAttributes {
        let mut attrs = ItemAttributes::new("The Haunting", "Horror", "adventure");
        attrs.adventure_type = Some("one-shot".to_string());
        attrs.theme = Some("mystery".to_string());
        attrs
    }

    #[test]
    fn eq_is_case_insensitive() {
        assert!(Predicate::eq(Attribute::Genre, "horror").evaluate(&horror_one_shot()));
        assert!(!Predicate::eq(Attribute::Genre, "fantasy").evaluate(&horror_one_shot()));
    }

    #[test]
    fn missing_attribute_never_matches() {
        let attrs = ItemAttributes::new("Core", "fantasy", "core-rules");
        assert!(!Predicate::eq(Attribute::Theme, "action").evaluate(&attrs));
        assert!(Predicate::Not(Box::new(Predicate::eq(Attribute::Theme, "action"))).evaluate(&attrs));
    }

    #[test]
    fn combinators_compose() {
        let rule = Predicate::All(vec![
            Predicate::one_of(Attribute::Genre, ["fantasy", "horror"]),
            Predicate::Any(vec![
                Predicate::eq(Attribute::AdventureType, "campaign"),
                Predicate::eq(Attribute::Theme, "mystery"),
            ]),
        ]);
        assert!(rule.evaluate(&horror_one_shot()));
    }

    #[test]
    fn predicates_deserialize_from_rule_table() {
        let json = r#"{"all": [{"eq": {"attribute": "genre", "value": "fantasy"}}, {"in": {"attribute": "type", "values": ["adventure"]}}]}"#;
        let predicate: Predicate = serde_json::from_str(json).unwrap();
        assert_eq!(
            predicate,
            Predicate::All(vec![
                Predicate::eq(Attribute::Genre, "fantasy"),
                Predicate::one_of(Attribute::Type, ["adventure"]),
            ])
        );

        let always: Predicate = serde_json::from_str(r#""always""#).unwrap();
        assert_eq!(always, Predicate::Always);
    }

    #[test]
    fn validation_puts_overall_first() {
        let taxonomy = Taxonomy {
            categories: vec![Category {
                id: "fantasy".to_string(),
                name: "Fantasy".to_string(),
                description: String::new(),
                examples: vec![],
                predicate: Predicate::eq(Attribute::Genre, "fantasy"),
                subcategories: vec![],
            }],
        }
        .validated()
        .unwrap();

        assert_eq!(taxonomy.categories[0].id, OVERALL);
        assert_eq!(taxonomy.categories.len(), 2);
    }

    #[test]
    fn validation_rejects_duplicates() {
        let fantasy = Category {
            id: "fantasy".to_string(),
            name: "Fantasy".to_string(),
            description: String::new(),
            examples: vec![],
            predicate: Predicate::Always,
            subcategories: vec![],
        };
        let result = Taxonomy {
            categories: vec![fantasy.clone(), fantasy],
        }
        .validated();
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn builtin_table_is_valid() {
        let taxonomy = Taxonomy::builtin().validated().unwrap();
        assert_eq!(taxonomy.categories[0].id, OVERALL);
        assert!(taxonomy.category("horror").unwrap().subcategory("adventure").is_some());
        let one_shot = taxonomy.category("adventures").unwrap().subcategory("one-shot").unwrap();
        assert!(!one_shot.description.is_empty());
        assert!(!one_shot.examples.is_empty());
    }

    #[test]
    fn descriptions_are_optional_in_rule_files() {
        let json = r#"{"id": "one-shot", "name": "One-Shots", "predicate": "always"}"#;
        let sub: Subcategory = serde_json::from_str(json).unwrap();
        assert!(sub.description.is_empty());
        assert!(sub.examples.is_empty());
    }
}
