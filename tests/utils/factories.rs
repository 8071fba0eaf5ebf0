/// Test data factories using builder pattern
///
/// Provides convenient methods to create catalog items with sensible defaults
use rpg_rankings_lib::modules::catalog::domain::{Item, ItemAttributes};
use uuid::Uuid;

pub struct ItemFactory {
    id: Uuid,
    title: String,
    genre: String,
    product_type: String,
    system: Option<String>,
    publisher: Option<String>,
    theme: Option<String>,
    adventure_type: Option<String>,
}

impl Default for ItemFactory {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: format!("Test Adventure {}", rand::random::<u32>() % 100_000),
            genre: "fantasy".to_string(),
            product_type: "adventure".to_string(),
            system: None,
            publisher: None,
            theme: None,
            adventure_type: None,
        }
    }
}

impl ItemFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fantasy one-shot adventure
    pub fn adventure() -> Self {
        Self::default().with_adventure_type("one-shot")
    }

    /// A rulebook, which never belongs to the adventure categories
    pub fn rulebook() -> Self {
        Self::default()
            .with_title("Core Rulebook")
            .with_type("core-rules")
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_genre(mut self, genre: &str) -> Self {
        self.genre = genre.to_string();
        self
    }

    pub fn with_type(mut self, product_type: &str) -> Self {
        self.product_type = product_type.to_string();
        self
    }

    pub fn with_system(mut self, system: &str) -> Self {
        self.system = Some(system.to_string());
        self
    }

    pub fn with_publisher(mut self, publisher: &str) -> Self {
        self.publisher = Some(publisher.to_string());
        self
    }

    pub fn with_theme(mut self, theme: &str) -> Self {
        self.theme = Some(theme.to_string());
        self
    }

    pub fn with_adventure_type(mut self, adventure_type: &str) -> Self {
        self.adventure_type = Some(adventure_type.to_string());
        self
    }

    pub fn attributes(&self) -> ItemAttributes {
        let mut attributes =
            ItemAttributes::new(self.title.clone(), self.genre.clone(), self.product_type.clone());
        attributes.system = self.system.clone();
        attributes.publisher = self.publisher.clone();
        attributes.theme = self.theme.clone();
        attributes.adventure_type = self.adventure_type.clone();
        attributes
    }

    pub fn build(self) -> Item {
        Item::new(self.id, self.attributes(), 5.5)
    }
}
