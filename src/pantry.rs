//! The user's ingredient list, the common-ingredient catalog and photo encoding.

use std::path::Path;

use base64::Engine;

use crate::error::PhotoError;
use crate::schema::PhotoDataUri;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientCategory {
    pub name: &'static str,
    pub items: &'static [&'static str],
}

const COMMON_INGREDIENTS: &[IngredientCategory] = &[
    IngredientCategory {
        name: "Produce",
        items: &[
            "Onion", "Garlic", "Carrot", "Celery", "Bell Pepper", "Tomato", "Potato",
            "Sweet Potato", "Broccoli", "Spinach", "Lettuce", "Cucumber", "Zucchini",
            "Mushroom", "Avocado", "Lemon", "Lime", "Apple", "Banana", "Orange",
        ],
    },
    IngredientCategory {
        name: "Protein",
        items: &[
            "Chicken Breast", "Ground Beef", "Pork Chop", "Bacon", "Sausage", "Salmon",
            "Tuna", "Shrimp", "Eggs", "Tofu", "Black Beans", "Chickpeas", "Lentils",
        ],
    },
    IngredientCategory {
        name: "Dairy & Alternatives",
        items: &[
            "Milk", "Cheddar Cheese", "Mozzarella Cheese", "Parmesan Cheese", "Yogurt",
            "Butter", "Sour Cream", "Cream Cheese", "Almond Milk", "Soy Milk",
        ],
    },
    IngredientCategory {
        name: "Pantry Staples",
        items: &[
            "All-Purpose Flour", "Sugar", "Brown Sugar", "Honey", "Baking Soda",
            "Baking Powder", "Yeast", "Vanilla Extract", "Olive Oil", "Vegetable Oil",
            "Vinegar", "Ketchup", "Mayonnaise", "Mustard", "Soy Sauce",
            "Worcestershire Sauce", "Hot Sauce", "Peanut Butter",
        ],
    },
    IngredientCategory {
        name: "Grains",
        items: &[
            "White Rice", "Brown Rice", "Quinoa", "Pasta", "Spaghetti", "Bread", "Oats",
            "Tortillas",
        ],
    },
    IngredientCategory {
        name: "Spices & Herbs",
        items: &[
            "Salt", "Black Pepper", "Cumin", "Paprika", "Chili Powder", "Garlic Powder",
            "Onion Powder", "Oregano", "Thyme", "Rosemary", "Basil", "Cilantro", "Parsley",
        ],
    },
];

pub fn common_ingredients() -> &'static [IngredientCategory] {
    COMMON_INGREDIENTS
}

/// Category of a catalog item, matched case-insensitively.
pub fn find_category(item: &str) -> Option<&'static str> {
    let item = item.trim();
    COMMON_INGREDIENTS
        .iter()
        .find(|category| category.items.iter().any(|i| i.eq_ignore_ascii_case(item)))
        .map(|category| category.name)
}

/// Ordered, duplicate-free list of ingredient names the user has on hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pantry {
    items: Vec<String>,
}

impl Pantry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    /// Returns true when the item was added.
    pub fn add(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() || self.contains(item) {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    /// Add free-form text split on commas and newlines. Returns how many new items were added.
    pub fn add_manual(&mut self, text: &str) -> usize {
        text.split([',', '\n'])
            .filter(|item| self.add(item))
            .count()
    }

    pub fn remove(&mut self, item: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        self.items.len() != before
    }

    /// Replace everything, e.g. with the result of photo recognition.
    pub fn replace_all<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.items.clear();
        for item in items {
            self.add(item.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Pantry {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut pantry = Pantry::new();
        pantry.replace_all(iter);
        pantry
    }
}

/// Encode raw image bytes as a `data:` URI.
pub fn photo_data_uri(bytes: &[u8], mime_type: &str) -> Result<PhotoDataUri, PhotoError> {
    if !mime_type.starts_with("image/") {
        return Err(PhotoError::UnsupportedType(mime_type.to_string()));
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(PhotoDataUri::new(format!("data:{};base64,{}", mime_type, encoded))?)
}

pub async fn photo_data_uri_from_path(path: &Path) -> Result<PhotoDataUri, PhotoError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let mime_type = mime_for_extension(&extension)
        .ok_or_else(|| PhotoError::UnsupportedType(format!(".{}", extension)))?;

    let bytes = tokio::fs::read(path).await.map_err(|source| PhotoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), mime_type, "Encoding photo");
    photo_data_uri(&bytes, mime_type)
}

fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
