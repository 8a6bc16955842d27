//! Single-station recipes: anvil, stonecutter, cauldron, grindstone,
//! brewing stand and smithing table.

use craftworks_common::NamespacedKey;
use serde::{Deserialize, Serialize};

use super::{ingredient, ingredient_list, CustomRecipe, RecipeMeta, RecipeVariant};
use crate::document::Document;
use crate::error::RecipeResult;
use crate::family::RecipeFamily;
use crate::ingredient::IngredientSpec;

fn named<'a>(slots: &[(&str, &'a IngredientSpec)]) -> Vec<(String, &'a IngredientSpec)> {
    slots
        .iter()
        .map(|(name, spec)| ((*name).to_string(), *spec))
        .collect()
}

// ============================================================================
// Anvil
// ============================================================================

/// Combines a base item with an addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnvilRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Produced item.
    pub result: IngredientSpec,
    /// Left input.
    pub base: IngredientSpec,
    /// Right input.
    pub addition: IngredientSpec,
    /// Experience levels charged.
    pub repair_cost: u32,
}

impl AnvilRecipe {
    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        named(&[
            ("result", &self.result),
            ("base", &self.base),
            ("addition", &self.addition),
        ])
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        vec![&mut self.result, &mut self.base, &mut self.addition]
    }
}

impl RecipeVariant for AnvilRecipe {
    const TYPE_NAME: &'static str = "AnvilRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family == RecipeFamily::Anvil
    }

    fn from_document(key: NamespacedKey, family: RecipeFamily, doc: &Document<'_>) -> RecipeResult<Self> {
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            base: ingredient(doc, "base")?,
            addition: ingredient(doc, "addition")?,
            repair_cost: doc.u32_or("repair_cost", 1)?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Anvil(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Anvil(self)
    }
}

// ============================================================================
// Stonecutter
// ============================================================================

/// Cuts one item into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StonecutterRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Produced item.
    pub result: IngredientSpec,
    /// Input item.
    pub source: IngredientSpec,
}

impl StonecutterRecipe {
    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        named(&[("result", &self.result), ("source", &self.source)])
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        vec![&mut self.result, &mut self.source]
    }
}

impl RecipeVariant for StonecutterRecipe {
    const TYPE_NAME: &'static str = "StonecutterRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family == RecipeFamily::Stonecutter
    }

    fn from_document(key: NamespacedKey, family: RecipeFamily, doc: &Document<'_>) -> RecipeResult<Self> {
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            source: ingredient(doc, "source")?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Stonecutter(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Stonecutter(self)
    }
}

// ============================================================================
// Cauldron
// ============================================================================

/// Highest cauldron water level.
pub const MAX_WATER_LEVEL: u8 = 3;

/// Brews ingredients in a filled cauldron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauldronRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Produced item.
    pub result: IngredientSpec,
    /// Items thrown into the cauldron.
    pub ingredients: Vec<IngredientSpec>,
    /// Required water level, `0..=3`.
    pub water_level: u8,
    /// Brewing time in ticks.
    pub cooking_time: u32,
}

impl CauldronRecipe {
    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        let mut slots = vec![("result".to_string(), &self.result)];
        slots.extend(
            self.ingredients
                .iter()
                .enumerate()
                .map(|(i, spec)| (format!("ingredients[{i}]"), spec)),
        );
        slots
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        let mut specs = vec![&mut self.result];
        specs.extend(self.ingredients.iter_mut());
        specs
    }
}

impl RecipeVariant for CauldronRecipe {
    const TYPE_NAME: &'static str = "CauldronRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family == RecipeFamily::Cauldron
    }

    fn from_document(key: NamespacedKey, family: RecipeFamily, doc: &Document<'_>) -> RecipeResult<Self> {
        let water_level = doc.int_in_range("water_level", 1, 0, i64::from(MAX_WATER_LEVEL))?;
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            ingredients: ingredient_list(doc, "ingredients")?,
            water_level: u8::try_from(water_level).unwrap_or(MAX_WATER_LEVEL),
            cooking_time: doc.u32_or("cooking_time", 80)?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Cauldron(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Cauldron(self)
    }
}

// ============================================================================
// Grindstone
// ============================================================================

/// Grinds one or two inputs into a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrindstoneRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Produced item.
    pub result: IngredientSpec,
    /// Upper input.
    pub input_top: IngredientSpec,
    /// Lower input.
    pub input_bottom: IngredientSpec,
    /// Experience awarded.
    pub xp: i32,
}

impl GrindstoneRecipe {
    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        named(&[
            ("result", &self.result),
            ("input_top", &self.input_top),
            ("input_bottom", &self.input_bottom),
        ])
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        vec![&mut self.result, &mut self.input_top, &mut self.input_bottom]
    }
}

impl RecipeVariant for GrindstoneRecipe {
    const TYPE_NAME: &'static str = "GrindstoneRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family == RecipeFamily::Grindstone
    }

    fn from_document(key: NamespacedKey, family: RecipeFamily, doc: &Document<'_>) -> RecipeResult<Self> {
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            input_top: ingredient(doc, "input_top")?,
            input_bottom: ingredient(doc, "input_bottom")?,
            xp: doc.i32_or("xp", 0)?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Grindstone(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Grindstone(self)
    }
}

// ============================================================================
// Brewing stand
// ============================================================================

/// Brewing stand recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewingRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Produced item.
    pub result: IngredientSpec,
    /// Item placed in the top slot.
    pub ingredient: IngredientSpec,
    /// Blaze fuel consumed.
    pub fuel_cost: u32,
    /// Brewing time in ticks.
    pub brew_time: u32,
}

impl BrewingRecipe {
    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        named(&[("result", &self.result), ("ingredient", &self.ingredient)])
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        vec![&mut self.result, &mut self.ingredient]
    }
}

impl RecipeVariant for BrewingRecipe {
    const TYPE_NAME: &'static str = "BrewingRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family == RecipeFamily::BrewingStand
    }

    fn from_document(key: NamespacedKey, family: RecipeFamily, doc: &Document<'_>) -> RecipeResult<Self> {
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            ingredient: ingredient(doc, "ingredient")?,
            fuel_cost: doc.u32_or("fuel_cost", 1)?,
            brew_time: doc.u32_or("brew_time", 400)?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Brewing(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Brewing(self)
    }
}

// ============================================================================
// Smithing
// ============================================================================

/// Smithing table upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmithingRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Produced item.
    pub result: IngredientSpec,
    /// Item being upgraded.
    pub base: IngredientSpec,
    /// Upgrade material.
    pub addition: IngredientSpec,
}

impl SmithingRecipe {
    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        named(&[
            ("result", &self.result),
            ("base", &self.base),
            ("addition", &self.addition),
        ])
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        vec![&mut self.result, &mut self.base, &mut self.addition]
    }
}

impl RecipeVariant for SmithingRecipe {
    const TYPE_NAME: &'static str = "SmithingRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family == RecipeFamily::Smithing
    }

    fn from_document(key: NamespacedKey, family: RecipeFamily, doc: &Document<'_>) -> RecipeResult<Self> {
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            base: ingredient(doc, "base")?,
            addition: ingredient(doc, "addition")?,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Smithing(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Smithing(self)
    }
}
