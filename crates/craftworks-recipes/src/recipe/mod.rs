//! Concrete recipe implementation types.
//!
//! Every recipe kind materializes one of the types in this module. They all
//! share a [`RecipeMeta`] header and a `result` ingredient, and expose their
//! ingredient slots by name so resolution and validation can walk them
//! without knowing the concrete type.

mod cooking;
mod crafting;
mod station;

pub use cooking::CookingRecipe;
pub use crafting::{CraftingLayout, CraftingRecipe, ELITE_GRID, STANDARD_GRID};
pub use station::{
    AnvilRecipe, BrewingRecipe, CauldronRecipe, GrindstoneRecipe, SmithingRecipe,
    StonecutterRecipe, MAX_WATER_LEVEL,
};

use craftworks_common::{DocumentError, NamespacedKey};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::RecipeResult;
use crate::family::RecipeFamily;
use crate::ingredient::IngredientSpec;
use crate::item::ResolveContext;
use crate::validation::RecipeReport;

/// Fields every recipe document may carry.
pub const COMMON_FIELDS: &[&str] = &["group", "hidden", "result"];

/// Header shared by every recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMeta {
    /// Recipe identity.
    pub key: NamespacedKey,
    /// Family of the kind that produced it.
    pub family: RecipeFamily,
    /// Recipe book group.
    pub group: Option<String>,
    /// Hidden from the recipe book.
    pub hidden: bool,
}

impl RecipeMeta {
    /// Reads the common header fields.
    pub fn from_document(
        key: NamespacedKey,
        family: RecipeFamily,
        doc: &Document<'_>,
    ) -> Result<Self, DocumentError> {
        Ok(Self {
            key,
            family,
            group: doc.optional_str("group")?.map(str::to_string),
            hidden: doc.bool_or("hidden", false)?,
        })
    }
}

/// Reads a required ingredient field.
pub(crate) fn ingredient(doc: &Document<'_>, name: &str) -> Result<IngredientSpec, DocumentError> {
    IngredientSpec::from_document(&doc.required(name)?)
}

/// Reads a required, non-empty list of ingredients.
pub(crate) fn ingredient_list(
    doc: &Document<'_>,
    name: &str,
) -> Result<Vec<IngredientSpec>, DocumentError> {
    let list = doc.required(name)?.as_list()?;
    if list.is_empty() {
        return Err(DocumentError::invalid(doc.field_path(name), "cannot be empty"));
    }
    list.iter().map(IngredientSpec::from_document).collect()
}

/// Contract between a recipe kind and the concrete type it materializes.
pub trait RecipeVariant: Sized {
    /// Type name used in cast diagnostics.
    const TYPE_NAME: &'static str;

    /// Whether this type can represent recipes of `family`.
    fn supports(family: RecipeFamily) -> bool;

    /// Canonical constructor from a raw document.
    fn from_document(
        key: NamespacedKey,
        family: RecipeFamily,
        doc: &Document<'_>,
    ) -> RecipeResult<Self>;

    /// Borrows a recipe as this type if it is one.
    fn narrow(recipe: &CustomRecipe) -> Option<&Self>;

    /// Wraps into the closed recipe enum.
    fn into_recipe(self) -> CustomRecipe;
}

/// Runtime capability shared by the members of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeSupertype {
    /// Grid crafting: [`CraftingRecipe`].
    Crafting,
    /// Furnace-style cooking: [`CookingRecipe`].
    Cooking,
}

impl RecipeSupertype {
    /// Name of the supertype.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Crafting => CraftingRecipe::TYPE_NAME,
            Self::Cooking => CookingRecipe::TYPE_NAME,
        }
    }

    /// Narrows `recipe` to this supertype.
    #[must_use]
    pub fn narrow(self, recipe: &CustomRecipe) -> Option<SupertypeRef<'_>> {
        match self {
            Self::Crafting => CraftingRecipe::narrow(recipe).map(SupertypeRef::Crafting),
            Self::Cooking => CookingRecipe::narrow(recipe).map(SupertypeRef::Cooking),
        }
    }
}

/// A recipe borrowed as its container's supertype.
#[derive(Debug, Clone, Copy)]
pub enum SupertypeRef<'a> {
    /// Grid crafting recipe.
    Crafting(&'a CraftingRecipe),
    /// Cooking recipe.
    Cooking(&'a CookingRecipe),
}

impl SupertypeRef<'_> {
    /// Header of the borrowed recipe.
    #[must_use]
    pub fn meta(&self) -> &RecipeMeta {
        match self {
            Self::Crafting(r) => &r.meta,
            Self::Cooking(r) => &r.meta,
        }
    }
}

/// Any materialized recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum CustomRecipe {
    /// Workbench or elite workbench crafting.
    Crafting(CraftingRecipe),
    /// Furnace, blast furnace, smoker or campfire.
    Cooking(CookingRecipe),
    /// Anvil.
    Anvil(AnvilRecipe),
    /// Stonecutter.
    Stonecutter(StonecutterRecipe),
    /// Cauldron.
    Cauldron(CauldronRecipe),
    /// Grindstone.
    Grindstone(GrindstoneRecipe),
    /// Brewing stand.
    Brewing(BrewingRecipe),
    /// Smithing table.
    Smithing(SmithingRecipe),
}

impl CustomRecipe {
    /// Shared header.
    #[must_use]
    pub fn meta(&self) -> &RecipeMeta {
        match self {
            Self::Crafting(r) => &r.meta,
            Self::Cooking(r) => &r.meta,
            Self::Anvil(r) => &r.meta,
            Self::Stonecutter(r) => &r.meta,
            Self::Cauldron(r) => &r.meta,
            Self::Grindstone(r) => &r.meta,
            Self::Brewing(r) => &r.meta,
            Self::Smithing(r) => &r.meta,
        }
    }

    /// Recipe identity.
    #[must_use]
    pub fn key(&self) -> &NamespacedKey {
        &self.meta().key
    }

    /// Family of the kind that produced this recipe.
    #[must_use]
    pub fn family(&self) -> RecipeFamily {
        self.meta().family
    }

    /// Result ingredient.
    #[must_use]
    pub fn result(&self) -> &IngredientSpec {
        match self {
            Self::Crafting(r) => &r.result,
            Self::Cooking(r) => &r.result,
            Self::Anvil(r) => &r.result,
            Self::Stonecutter(r) => &r.result,
            Self::Cauldron(r) => &r.result,
            Self::Grindstone(r) => &r.result,
            Self::Brewing(r) => &r.result,
            Self::Smithing(r) => &r.result,
        }
    }

    /// Every ingredient slot with its name, result first.
    #[must_use]
    pub fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        match self {
            Self::Crafting(r) => r.slots(),
            Self::Cooking(r) => r.slots(),
            Self::Anvil(r) => r.slots(),
            Self::Stonecutter(r) => r.slots(),
            Self::Cauldron(r) => r.slots(),
            Self::Grindstone(r) => r.slots(),
            Self::Brewing(r) => r.slots(),
            Self::Smithing(r) => r.slots(),
        }
    }

    /// Mutable access to every ingredient slot, in [`Self::slots`] order.
    pub fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        match self {
            Self::Crafting(r) => r.specs_mut(),
            Self::Cooking(r) => r.specs_mut(),
            Self::Anvil(r) => r.specs_mut(),
            Self::Stonecutter(r) => r.specs_mut(),
            Self::Cauldron(r) => r.specs_mut(),
            Self::Grindstone(r) => r.specs_mut(),
            Self::Brewing(r) => r.specs_mut(),
            Self::Smithing(r) => r.specs_mut(),
        }
    }

    /// Rebuilds the choice cache of every slot.
    pub fn resolve_all(&mut self, ctx: ResolveContext<'_>) {
        for spec in self.specs_mut() {
            spec.resolve(ctx);
        }
    }

    /// Validates every slot.
    #[must_use]
    pub fn validate(&self, ctx: ResolveContext<'_>) -> RecipeReport {
        RecipeReport::collect(
            self.key().clone(),
            self.slots()
                .into_iter()
                .map(|(slot, spec)| (slot, spec.validate(ctx))),
        )
    }

    /// Fields a document of `family` may carry besides the kind field.
    #[must_use]
    pub fn known_fields(family: RecipeFamily) -> Vec<&'static str> {
        let specific: &[&str] = if family.is_crafting() {
            if family.is_shapeless() {
                &["ingredients", "shapeless"]
            } else {
                &["shape", "ingredients", "shapeless"]
            }
        } else if family.is_cooking() {
            &["source", "exp", "cooking_time"]
        } else {
            match family {
                RecipeFamily::Anvil => &["base", "addition", "repair_cost"],
                RecipeFamily::Stonecutter => &["source"],
                RecipeFamily::Cauldron => &["ingredients", "water_level", "cooking_time"],
                RecipeFamily::Grindstone => &["input_top", "input_bottom", "xp"],
                RecipeFamily::BrewingStand => &["ingredient", "fuel_cost", "brew_time"],
                _ => &["base", "addition"],
            }
        };
        COMMON_FIELDS.iter().chain(specific).copied().collect()
    }
}
