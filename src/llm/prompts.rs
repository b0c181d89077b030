// ABOUTME: Prompt builders for nutrition inference and recipe generation
// ABOUTME: Keeps the French instruction text and strict-JSON response shapes in one place
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Toque.dev

//! Prompt construction for the chat collaborator
//!
//! The response shapes requested here are what the parsers in [`crate::llm`]
//! expect; changing one side means changing the other.

/// Prompt asking for per-100-unit nutrition facts for one ingredient.
///
/// The model decides whether the food is a solid (per 100 g) or a liquid
/// (per 100 mL) and reports the chosen reference unit.
#[must_use]
pub fn nutrition_prompt(name: &str) -> String {
    format!(
        r#"Pour l'aliment "{name}", décide s'il s'agit d'un solide ou d'un liquide.
- Si c'est un solide, donne les apports pour 100 g.
- Si c'est un liquide, donne-les pour 100 mL.
Rends un JSON strict avec ces clés :
{{
  "Unit": "g" ou "mL",
  "Calories": nombre,
  "Proteines": nombre,
  "Glucides": nombre,
  "Lipides": nombre,
  "Vitamines": chaîne ou objet,
  "Mineraux": chaîne ou objet
}}"#
    )
}

/// System prompt pinning the strict JSON shape of a generated recipe
#[must_use]
pub fn generation_system_prompt() -> &'static str {
    r#"Génère une recette JSON STRICT :

{
 "Name": "...",
 "Instructions": "...",
 "Servings": 4,
 "DishType": "Entrée|Plat|Dessert|Autre",
 "Intolerances": "",
 "IngredientsDetails": [
   { "Nom": "...",
     "Quantite": 250,
     "Unite": "g|kg|mL|L|cuillere|pince|piece" }
 ]
}

Ne renvoie QUE le JSON, aucun commentaire."#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrition_prompt_names_the_food() {
        let prompt = nutrition_prompt("carotte");
        assert!(prompt.contains("\"carotte\""));
        assert!(prompt.contains("100 g"));
        assert!(prompt.contains("100 mL"));
    }
}
