//! Furnace-style cooking.

use craftworks_common::NamespacedKey;
use serde::{Deserialize, Serialize};

use super::{ingredient, CustomRecipe, RecipeMeta, RecipeVariant};
use crate::document::Document;
use crate::error::RecipeResult;
use crate::family::RecipeFamily;
use crate::ingredient::IngredientSpec;

/// A furnace, blast furnace, smoker or campfire recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookingRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Cooked item.
    pub result: IngredientSpec,
    /// Item placed in the input slot.
    pub source: IngredientSpec,
    /// Experience awarded.
    pub exp: f32,
    /// Cooking time in ticks.
    pub cooking_time: u32,
}

impl CookingRecipe {
    /// Default cooking time in ticks for a station.
    #[must_use]
    pub fn default_cooking_time(family: RecipeFamily) -> u32 {
        match family {
            RecipeFamily::BlastFurnace | RecipeFamily::Smoker => 100,
            RecipeFamily::Campfire => 600,
            _ => 200,
        }
    }

    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        vec![
            ("result".to_string(), &self.result),
            ("source".to_string(), &self.source),
        ]
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        vec![&mut self.result, &mut self.source]
    }
}

impl RecipeVariant for CookingRecipe {
    const TYPE_NAME: &'static str = "CookingRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family.is_cooking()
    }

    fn from_document(
        key: NamespacedKey,
        family: RecipeFamily,
        doc: &Document<'_>,
    ) -> RecipeResult<Self> {
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            source: ingredient(doc, "source")?,
            exp: doc.f32_or("exp", 0.0)?,
            cooking_time: doc.u32_or("cooking_time", Self::default_cooking_time(family))?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Cooking(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Cooking(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> NamespacedKey {
        NamespacedKey::parse(s).expect("valid key")
    }

    #[test]
    fn test_defaults_per_station() {
        let value = json!({ "source": { "items": ["beef"] }, "result": { "items": ["cooked_beef"] } });
        let doc = Document::new(&value);
        for (family, ticks) in [
            (RecipeFamily::Furnace, 200),
            (RecipeFamily::BlastFurnace, 100),
            (RecipeFamily::Smoker, 100),
            (RecipeFamily::Campfire, 600),
        ] {
            let recipe = CookingRecipe::from_document(key("custom:beef"), family, &doc).expect("cooking");
            assert_eq!(recipe.cooking_time, ticks, "{family}");
            assert!(recipe.exp.abs() < f32::EPSILON);
        }
    }

    #[test]
    fn test_explicit_values() {
        let value = json!({
            "source": { "items": ["iron_ore"] },
            "result": { "items": ["iron_ingot"] },
            "exp": 0.7,
            "cooking_time": 150,
        });
        let recipe = CookingRecipe::from_document(key("custom:iron"), RecipeFamily::Furnace, &Document::new(&value))
            .expect("cooking");
        assert_eq!(recipe.cooking_time, 150);
        assert!((recipe.exp - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_negative_time_rejected() {
        let value = json!({
            "source": { "items": ["iron_ore"] },
            "result": { "items": ["iron_ingot"] },
            "cooking_time": -5,
        });
        assert!(
            CookingRecipe::from_document(key("custom:iron"), RecipeFamily::Furnace, &Document::new(&value))
                .is_err()
        );
    }

    #[test]
    fn test_supports_only_cooking() {
        assert!(CookingRecipe::supports(RecipeFamily::Campfire));
        assert!(!CookingRecipe::supports(RecipeFamily::Anvil));
    }
}
