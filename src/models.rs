// ABOUTME: Domain models for recipes, ingredients, and join records plus controlled vocabularies
// ABOUTME: Handles record-to-model conversion and the wire-format field conventions of the store
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Common data models
//!
//! Wire field names match the hosted store schema (`Name`, `CaloriesTotal`,
//! `IngredientsDetails`, …) via serde renames. Derived recipe totals are never
//! accepted from clients; they are recomputed by the nutrition aggregator
//! after every join-set change and persisted by the orchestration layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::fields;
use crate::errors::AppResult;
use crate::store::Record;

/// Dish type vocabulary; anything else is coerced to `Autre`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DishType {
    /// Starter
    #[serde(rename = "Entrée")]
    Entree,
    /// Main course
    Plat,
    /// Dessert
    Dessert,
    /// Anything else
    Autre,
}

impl DishType {
    /// All accepted values, in display order
    pub const ALL: [Self; 4] = [Self::Entree, Self::Plat, Self::Dessert, Self::Autre];

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entree => "Entrée",
            Self::Plat => "Plat",
            Self::Dessert => "Dessert",
            Self::Autre => "Autre",
        }
    }

    /// Parse an exact vocabulary value
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }

    /// Coerce an arbitrary value into the vocabulary, defaulting to `Autre`
    #[must_use]
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Autre)
    }
}

/// Measure unit vocabulary for join records; unknown units are preserved
/// as-is by the store and pass through aggregation unconverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureUnit {
    /// Grams
    #[serde(rename = "g")]
    Gram,
    /// Kilograms
    #[serde(rename = "kg")]
    Kilogram,
    /// Millilitres
    #[serde(rename = "mL")]
    Millilitre,
    /// Litres
    #[serde(rename = "L")]
    Litre,
    /// Tablespoon (15 mL equivalent)
    #[serde(rename = "cuillere")]
    Cuillere,
    /// Pinch
    #[serde(rename = "pince")]
    Pince,
    /// One average piece, treated as a 100-unit portion
    #[serde(rename = "piece")]
    Piece,
}

impl MeasureUnit {
    /// All accepted values
    pub const ALL: [Self; 7] = [
        Self::Gram,
        Self::Kilogram,
        Self::Millilitre,
        Self::Litre,
        Self::Cuillere,
        Self::Pince,
        Self::Piece,
    ];

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Millilitre => "mL",
            Self::Litre => "L",
            Self::Cuillere => "cuillere",
            Self::Pince => "pince",
            Self::Piece => "piece",
        }
    }

    /// Case-insensitive parse of a vocabulary value
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let lower = value.to_lowercase();
        Self::ALL.into_iter().find(|u| u.as_str().to_lowercase() == lower)
    }

    /// Coerce an arbitrary value into the vocabulary, defaulting to grams
    #[must_use]
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Gram)
    }
}

/// One line of a recipe's ingredient list as exchanged with clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientDetail {
    /// Free-text ingredient reference: a name, or a store record id
    #[serde(rename = "Nom")]
    pub nom: String,
    /// Quantity expressed in `unite`
    #[serde(rename = "Quantite", default)]
    pub quantite: f64,
    /// Measure unit
    #[serde(rename = "Unite", default)]
    pub unite: String,
}

/// Client payload for recipe create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeInput {
    /// Recipe name, unique case-insensitively
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Preparation instructions
    #[serde(rename = "Instructions", default)]
    pub instructions: Option<String>,
    /// Serving count
    #[serde(rename = "Servings", default)]
    pub servings: Option<u32>,
    /// Free-text allergen list
    #[serde(rename = "Intolerances", default)]
    pub intolerances: Option<String>,
    /// Dish type; coerced to the vocabulary
    #[serde(rename = "DishType", default)]
    pub dish_type: Option<String>,
    /// Ingredient lines; must be non-empty for create and update
    #[serde(rename = "IngredientsDetails", default)]
    pub ingredients_details: Vec<IngredientDetail>,
}

impl RecipeInput {
    /// Scalar recipe fields as a store field map, empty values dropped
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(name) = &self.name {
            out.insert(fields::NAME.to_owned(), Value::from(name.clone()));
        }
        if let Some(instructions) = &self.instructions {
            out.insert(
                fields::INSTRUCTIONS.to_owned(),
                Value::from(instructions.clone()),
            );
        }
        if let Some(servings) = self.servings {
            out.insert(fields::SERVINGS.to_owned(), Value::from(servings));
        }
        if let Some(intolerances) = &self.intolerances {
            out.insert(
                fields::INTOLERANCES.to_owned(),
                Value::from(intolerances.clone()),
            );
        }
        if let Some(dish_type) = &self.dish_type {
            out.insert(
                fields::DISH_TYPE.to_owned(),
                Value::from(DishType::coerce(dish_type).as_str()),
            );
        }
        pick_non_empty(out)
    }
}

/// A value clients may send either as a comma-joined string or as a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    /// Already comma-joined
    Text(String),
    /// To be joined with `", "`
    List(Vec<String>),
}

impl StringOrList {
    /// Normalize to the comma-joined wire form
    #[must_use]
    pub fn into_joined(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::List(items) => items.join(", "),
        }
    }
}

/// Client payload for ingredient create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientInput {
    /// Ingredient name, unique case-insensitively
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Reference unit: "g" for solids, "mL" for liquids
    #[serde(rename = "Unit", default)]
    pub unit: Option<String>,
    /// Calories per 100 reference units
    #[serde(rename = "Calories", default)]
    pub calories: Option<f64>,
    /// Proteins per 100 reference units
    #[serde(rename = "Proteines", default)]
    pub proteines: Option<f64>,
    /// Carbohydrates per 100 reference units
    #[serde(rename = "Glucides", default)]
    pub glucides: Option<f64>,
    /// Fats per 100 reference units
    #[serde(rename = "Lipides", default)]
    pub lipides: Option<f64>,
    /// Vitamin names, string or list
    #[serde(rename = "Vitamines", default)]
    pub vitamines: Option<StringOrList>,
    /// Mineral names, string or list
    #[serde(rename = "Mineraux", default)]
    pub mineraux: Option<StringOrList>,
}

impl IngredientInput {
    /// Ingredient fields as a store field map, empty values dropped and
    /// list-form vitamins/minerals joined to comma strings
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();
        if let Some(name) = &self.name {
            out.insert(fields::NAME.to_owned(), Value::from(name.clone()));
        }
        if let Some(unit) = &self.unit {
            out.insert(fields::UNIT.to_owned(), Value::from(unit.clone()));
        }
        if let Some(calories) = self.calories {
            out.insert(fields::CALORIES.to_owned(), Value::from(calories));
        }
        if let Some(proteines) = self.proteines {
            out.insert(fields::PROTEINES.to_owned(), Value::from(proteines));
        }
        if let Some(glucides) = self.glucides {
            out.insert(fields::GLUCIDES.to_owned(), Value::from(glucides));
        }
        if let Some(lipides) = self.lipides {
            out.insert(fields::LIPIDES.to_owned(), Value::from(lipides));
        }
        if let Some(vitamines) = &self.vitamines {
            out.insert(
                fields::VITAMINES.to_owned(),
                Value::from(vitamines.clone().into_joined()),
            );
        }
        if let Some(mineraux) = &self.mineraux {
            out.insert(
                fields::MINERAUX.to_owned(),
                Value::from(mineraux.clone().into_joined()),
            );
        }
        pick_non_empty(out)
    }
}

/// Nutrition facts for one ingredient, per 100 reference units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    /// Reference unit decided for the ingredient: "g" or "mL"
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Calories")]
    pub calories: f64,
    #[serde(rename = "Proteines")]
    pub proteines: f64,
    #[serde(rename = "Glucides")]
    pub glucides: f64,
    #[serde(rename = "Lipides")]
    pub lipides: f64,
    /// Normalized comma-joined vitamin names
    #[serde(rename = "Vitamines")]
    pub vitamines: String,
    /// Normalized comma-joined mineral names
    #[serde(rename = "Mineraux")]
    pub mineraux: String,
}

impl NutritionFacts {
    /// Store field map for persisting these facts on an ingredient record
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert(fields::UNIT.to_owned(), Value::from(self.unit.clone()));
        out.insert(fields::CALORIES.to_owned(), Value::from(self.calories));
        out.insert(fields::PROTEINES.to_owned(), Value::from(self.proteines));
        out.insert(fields::GLUCIDES.to_owned(), Value::from(self.glucides));
        out.insert(fields::LIPIDES.to_owned(), Value::from(self.lipides));
        out.insert(
            fields::VITAMINES.to_owned(),
            Value::from(self.vitamines.clone()),
        );
        out.insert(
            fields::MINERAUX.to_owned(),
            Value::from(self.mineraux.clone()),
        );
        out
    }
}

/// Derived recipe totals computed by the nutrition aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    #[serde(rename = "CaloriesTotal")]
    pub calories_total: f64,
    #[serde(rename = "ProteinesTotal")]
    pub proteines_total: f64,
    #[serde(rename = "GlucidesTotal")]
    pub glucides_total: f64,
    #[serde(rename = "LipidesTotal")]
    pub lipides_total: f64,
    /// Union of vitamin names across the join set
    #[serde(rename = "Vitamines")]
    pub vitamines: String,
    /// Union of mineral names across the join set
    #[serde(rename = "Mineraux")]
    pub mineraux: String,
}

impl NutritionTotals {
    /// Store field map for persisting the totals on a recipe record
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert(
            fields::CALORIES_TOTAL.to_owned(),
            Value::from(self.calories_total),
        );
        out.insert(
            fields::PROTEINES_TOTAL.to_owned(),
            Value::from(self.proteines_total),
        );
        out.insert(
            fields::GLUCIDES_TOTAL.to_owned(),
            Value::from(self.glucides_total),
        );
        out.insert(
            fields::LIPIDES_TOTAL.to_owned(),
            Value::from(self.lipides_total),
        );
        out.insert(
            fields::VITAMINES.to_owned(),
            Value::from(self.vitamines.clone()),
        );
        out.insert(
            fields::MINERAUX.to_owned(),
            Value::from(self.mineraux.clone()),
        );
        out
    }
}

/// Recipe summary as returned by list and write endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Instructions", skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(rename = "Servings", skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(rename = "Intolerances", skip_serializing_if = "Option::is_none")]
    pub intolerances: Option<String>,
    #[serde(rename = "DishType", skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
    /// Forward list of join-record ids
    #[serde(rename = "Recipe Items", default)]
    pub recipe_items: Vec<String>,
    #[serde(rename = "CaloriesTotal", skip_serializing_if = "Option::is_none")]
    pub calories_total: Option<f64>,
    #[serde(rename = "ProteinesTotal", skip_serializing_if = "Option::is_none")]
    pub proteines_total: Option<f64>,
    #[serde(rename = "GlucidesTotal", skip_serializing_if = "Option::is_none")]
    pub glucides_total: Option<f64>,
    #[serde(rename = "LipidesTotal", skip_serializing_if = "Option::is_none")]
    pub lipides_total: Option<f64>,
    #[serde(rename = "Vitamines", skip_serializing_if = "Option::is_none")]
    pub vitamines: Option<String>,
    #[serde(rename = "Mineraux", skip_serializing_if = "Option::is_none")]
    pub mineraux: Option<String>,
}

impl RecipeSummary {
    /// Build a summary from a raw store record
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.str_field(fields::NAME).unwrap_or_default(),
            instructions: record.str_field(fields::INSTRUCTIONS),
            servings: record.u32_field(fields::SERVINGS),
            intolerances: record.str_field(fields::INTOLERANCES),
            dish_type: record.str_field(fields::DISH_TYPE),
            recipe_items: record.id_list_field(fields::RECIPE_ITEMS),
            calories_total: record.f64_field(fields::CALORIES_TOTAL),
            proteines_total: record.f64_field(fields::PROTEINES_TOTAL),
            glucides_total: record.f64_field(fields::GLUCIDES_TOTAL),
            lipides_total: record.f64_field(fields::LIPIDES_TOTAL),
            vitamines: record.str_field(fields::VITAMINES),
            mineraux: record.str_field(fields::MINERAUX),
        }
    }
}

/// Recipe detail: summary plus the assembled ingredient lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    #[serde(rename = "IngredientsDetails")]
    pub ingredients_details: Vec<IngredientDetail>,
}

/// Ingredient as returned by read endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientView {
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Unit", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "Calories", skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(rename = "Proteines", skip_serializing_if = "Option::is_none")]
    pub proteines: Option<f64>,
    #[serde(rename = "Glucides", skip_serializing_if = "Option::is_none")]
    pub glucides: Option<f64>,
    #[serde(rename = "Lipides", skip_serializing_if = "Option::is_none")]
    pub lipides: Option<f64>,
    #[serde(rename = "Vitamines", default)]
    pub vitamines: String,
    #[serde(rename = "Mineraux", default)]
    pub mineraux: String,
    /// Join records referencing this ingredient
    #[serde(rename = "linkedItems", default)]
    pub linked_items: Vec<String>,
}

impl IngredientView {
    /// Build a view from a raw store record, normalizing vitamins/minerals
    /// that may have been stored as a key→value mapping
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.str_field(fields::NAME).unwrap_or_default(),
            unit: record.str_field(fields::UNIT),
            calories: record.f64_field(fields::CALORIES),
            proteines: record.f64_field(fields::PROTEINES),
            glucides: record.f64_field(fields::GLUCIDES),
            lipides: record.f64_field(fields::LIPIDES),
            vitamines: format_name_value_list(record.fields.get(fields::VITAMINES)),
            mineraux: format_name_value_list(record.fields.get(fields::MINERAUX)),
            linked_items: record.id_list_field(fields::RECIPE_ITEMS),
        }
    }
}

/// Recipe draft produced by the generation collaborator, after vocabulary
/// coercion and ingredient resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Instructions", default)]
    pub instructions: String,
    #[serde(rename = "Servings", default)]
    pub servings: u32,
    #[serde(rename = "DishType", default)]
    pub dish_type: String,
    #[serde(rename = "Intolerances", default)]
    pub intolerances: String,
    #[serde(rename = "IngredientsDetails", default)]
    pub ingredients_details: Vec<IngredientDetail>,
}

/// Drop empty-string and null values from a field map before a store write;
/// the hosted store rejects empty values on typed columns. Zeros and `false`
/// are kept.
#[must_use]
pub fn pick_non_empty(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter(|(_, v)| !v.is_null() && v.as_str() != Some(""))
        .collect()
}

/// Normalize a vitamins/minerals value to a `"key: value, key: value"` string.
///
/// The inference collaborator sometimes answers with a mapping instead of the
/// requested flat string; records written before normalization may carry
/// either form.
#[must_use]
pub fn format_name_value_list(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}: {s}"),
                other => format!("{k}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Parse a JSON value that should be a number but may arrive as a string
#[must_use]
pub fn lenient_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Validation helper shared by the recipe sagas
///
/// # Errors
///
/// Returns `MissingRequiredField` when the detail list is empty.
pub fn require_details(details: &[IngredientDetail]) -> AppResult<()> {
    if details.is_empty() {
        return Err(crate::errors::AppError::missing_field("IngredientsDetails"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dish_type_coercion() {
        assert_eq!(DishType::coerce("Plat"), DishType::Plat);
        assert_eq!(DishType::coerce("Entrée"), DishType::Entree);
        assert_eq!(DishType::coerce("Soupe"), DishType::Autre);
        assert_eq!(DishType::coerce(""), DishType::Autre);
    }

    #[test]
    fn test_measure_unit_coercion_is_case_insensitive() {
        assert_eq!(MeasureUnit::coerce("ML"), MeasureUnit::Millilitre);
        assert_eq!(MeasureUnit::coerce("Cuillere"), MeasureUnit::Cuillere);
        assert_eq!(MeasureUnit::coerce("poignée"), MeasureUnit::Gram);
    }

    #[test]
    fn test_pick_non_empty_keeps_zero_and_false() {
        let mut fields = Map::new();
        fields.insert("a".to_owned(), json!(""));
        fields.insert("b".to_owned(), Value::Null);
        fields.insert("c".to_owned(), json!(0));
        fields.insert("d".to_owned(), json!(false));
        fields.insert("e".to_owned(), json!("x"));

        let kept = pick_non_empty(fields);
        assert_eq!(kept.len(), 3);
        assert!(kept.contains_key("c"));
        assert!(kept.contains_key("d"));
        assert!(kept.contains_key("e"));
    }

    #[test]
    fn test_format_name_value_list_variants() {
        assert_eq!(
            format_name_value_list(Some(&json!({"C": "12mg", "B6": "0.4mg"}))),
            "B6: 0.4mg, C: 12mg"
        );
        assert_eq!(format_name_value_list(Some(&json!("A, C"))), "A, C");
        assert_eq!(format_name_value_list(None), "");
    }

    #[test]
    fn test_string_or_list_normalization() {
        let list = StringOrList::List(vec!["A".to_owned(), "C".to_owned()]);
        assert_eq!(list.into_joined(), "A, C");
        let text = StringOrList::Text("A, C".to_owned());
        assert_eq!(text.into_joined(), "A, C");
    }
}
