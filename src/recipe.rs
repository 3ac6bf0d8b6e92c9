use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_SERVINGS: u32 = 4;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy")]
    Easy,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Hard")]
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// Ingredient amounts are numeric in most corpora, but free text ("a pinch") shows up too.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Quantity {
    Amount(f64),
    Text(String),
}

impl Quantity {
    fn scaled(&self, factor: f64) -> Quantity {
        match self {
            Quantity::Amount(value) => Quantity::Amount(value * factor),
            Quantity::Text(text) => Quantity::Text(text.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

impl Nutrition {
    pub fn scaled(&self, factor: f64) -> Nutrition {
        Nutrition {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber.map(|v| v * factor),
        }
    }

    pub fn per_serving(&self, servings: u32) -> Nutrition {
        self.scaled(1.0 / f64::from(servings.max(1)))
    }

    pub(crate) fn has_negative_value(&self) -> bool {
        [self.calories, self.protein, self.carbs, self.fat, self.fiber.unwrap_or(0.0)]
            .iter()
            .any(|v| *v < 0.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub dietary: Vec<String>,
    #[serde(default)]
    pub cuisine: String,
    /// Minutes.
    #[serde(default)]
    pub cooking_time: i64,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Recipe {
    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn base_servings(&self) -> u32 {
        self.servings.filter(|s| *s > 0).unwrap_or(DEFAULT_SERVINGS)
    }

    /// Copy of the recipe with quantities and nutrition adjusted to `servings`.
    pub fn scaled(&self, servings: u32) -> Recipe {
        let servings = servings.max(1);
        let factor = f64::from(servings) / f64::from(self.base_servings());
        let mut scaled = self.clone();
        for ingredient in &mut scaled.ingredients {
            ingredient.quantity = ingredient.quantity.as_ref().map(|q| q.scaled(factor));
        }
        scaled.nutrition = self.nutrition.scaled(factor);
        scaled.servings = Some(servings);
        scaled
    }
}

/// A user-supplied ingredient, accepted either as a bare string or as a
/// `{ "name": ... }` record and reduced to its name on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "IngredientShape", into = "String")]
pub struct IngredientName(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientShape {
    Bare(String),
    Record { name: String },
}

impl From<IngredientShape> for IngredientName {
    fn from(shape: IngredientShape) -> Self {
        match shape {
            IngredientShape::Bare(name) | IngredientShape::Record { name } => IngredientName(name),
        }
    }
}

impl From<IngredientName> for String {
    fn from(name: IngredientName) -> Self {
        name.0
    }
}

impl From<&str> for IngredientName {
    fn from(name: &str) -> Self {
        IngredientName(name.to_string())
    }
}

impl From<String> for IngredientName {
    fn from(name: String) -> Self {
        IngredientName(name)
    }
}

impl AsRef<str> for IngredientName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
