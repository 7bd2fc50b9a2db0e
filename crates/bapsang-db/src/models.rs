use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Category of a dish. The set is closed: every catalog record belongs to
/// exactly one of these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Soup,
    Main,
    Side,
    Rice,
}

impl Category {
    /// All categories, in the order menus list them.
    pub const ALL: [Category; 4] = [Category::Soup, Category::Main, Category::Side, Category::Rice];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Soup => "soup",
            Self::Main => "main",
            Self::Side => "side",
            Self::Rice => "rice",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soup" => Ok(Self::Soup),
            "main" => Ok(Self::Main),
            "side" => Ok(Self::Side),
            "rice" => Ok(Self::Rice),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Category`] string.
#[derive(Debug, Clone)]
pub struct CategoryParseError(pub String);

impl fmt::Display for CategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid category: {:?}", self.0)
    }
}

impl std::error::Error for CategoryParseError {}

// ---------------------------------------------------------------------------
// Dish
// ---------------------------------------------------------------------------

/// A dish -- one catalog record. The name is the primary key; upserting a
/// name replaces the whole record, so a name maps to exactly one category at
/// any moment.
///
/// Nutrient values are per serving: kcal for calories, grams for protein /
/// fat / carbs, milligrams for sodium. All non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Dish {
    pub name: String,
    pub category: Category,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sodium: f64,
}

impl Dish {
    /// Build a dish record with every nutrient field given at once.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        calories: f64,
        protein: f64,
        fat: f64,
        carbs: f64,
        sodium: f64,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            calories,
            protein,
            fat,
            carbs,
            sodium,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display_roundtrip() {
        for v in &Category::ALL {
            let s = v.to_string();
            let parsed: Category = s.parse().expect("should parse");
            assert_eq!(*v, parsed);
        }
    }

    #[test]
    fn category_invalid() {
        let result = "dessert".parse::<Category>();
        assert!(result.is_err());
    }

    #[test]
    fn category_serde_matches_display() {
        let json = serde_json::to_string(&Category::Soup).unwrap();
        assert_eq!(json, "\"soup\"");
        let back: Category = serde_json::from_str("\"side\"").unwrap();
        assert_eq!(back, Category::Side);
    }

    #[test]
    fn dish_new_sets_all_fields() {
        let dish = Dish::new("된장국", Category::Soup, 150.0, 8.0, 5.0, 12.0, 900.0);
        assert_eq!(dish.name, "된장국");
        assert_eq!(dish.category, Category::Soup);
        assert_eq!(dish.calories, 150.0);
        assert_eq!(dish.sodium, 900.0);
    }
}
