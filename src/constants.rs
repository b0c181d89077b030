// ABOUTME: Application constants organized by domain: store schema, vocabularies, limits
// ABOUTME: Single source for table/field names shared by the store adapter and the services
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Constants module
//!
//! Constants are grouped into logical domains: the record-store schema names,
//! the controlled vocabularies (units, dish types), and operational limits
//! imposed by the store's API.

/// Record store table names
pub mod tables {
    /// Recipes table
    pub const RECIPES: &str = "Recipes";
    /// Ingredients table
    pub const INGREDIENTS: &str = "Ingredients";
    /// Join table linking one recipe to one ingredient with quantity + unit
    pub const RECIPE_ITEMS: &str = "Recipe Items";
}

/// Record store field names
pub mod fields {
    /// Display name, unique case-insensitively within a table
    pub const NAME: &str = "Name";
    /// Recipe preparation instructions
    pub const INSTRUCTIONS: &str = "Instructions";
    /// Number of servings
    pub const SERVINGS: &str = "Servings";
    /// Free-text allergen list
    pub const INTOLERANCES: &str = "Intolerances";
    /// Dish type enum field
    pub const DISH_TYPE: &str = "DishType";
    /// Forward list of join-record ids on a recipe
    pub const RECIPE_ITEMS: &str = "Recipe Items";
    /// Link from a join record back to its recipe
    pub const RECIPE: &str = "Recipe";
    /// Link from a join record to its ingredient
    pub const INGREDIENT: &str = "Ingredient";
    /// Denormalized ingredient name on a join record, used by search
    pub const INGREDIENT_NAME: &str = "IngredientName";
    /// Join record quantity
    pub const QUANTITY: &str = "Quantity";
    /// Measure unit (join record) or reference unit (ingredient)
    pub const UNIT: &str = "Unit";
    /// Calories per 100 reference units
    pub const CALORIES: &str = "Calories";
    /// Proteins per 100 reference units
    pub const PROTEINES: &str = "Proteines";
    /// Carbohydrates per 100 reference units
    pub const GLUCIDES: &str = "Glucides";
    /// Fats per 100 reference units
    pub const LIPIDES: &str = "Lipides";
    /// Comma-joined vitamin names
    pub const VITAMINES: &str = "Vitamines";
    /// Comma-joined mineral names
    pub const MINERAUX: &str = "Mineraux";
    /// Derived recipe calorie total
    pub const CALORIES_TOTAL: &str = "CaloriesTotal";
    /// Derived recipe protein total
    pub const PROTEINES_TOTAL: &str = "ProteinesTotal";
    /// Derived recipe carbohydrate total
    pub const GLUCIDES_TOTAL: &str = "GlucidesTotal";
    /// Derived recipe fat total
    pub const LIPIDES_TOTAL: &str = "LipidesTotal";
}

/// Limits imposed by the record store API or the search contract
pub mod limits {
    /// Maximum number of ids accepted by a single bulk destroy call
    pub const MAX_DESTROY_BATCH: usize = 10;
    /// Page size used when iterating select results
    pub const SELECT_PAGE_SIZE: usize = 100;
    /// Cap on merged search results, and on each source set before merging
    pub const SEARCH_CAP: usize = 10;
}

/// Record-id conventions of the hosted store
pub mod ids {
    /// Prefix carried by every record id issued by the store
    pub const RECORD_ID_PREFIX: &str = "rec";
}

/// Environment-based configuration helpers
pub mod env_config {
    use std::env;

    /// Get HTTP server port from environment or default
    #[must_use]
    pub fn http_port() -> u16 {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000)
    }
}
