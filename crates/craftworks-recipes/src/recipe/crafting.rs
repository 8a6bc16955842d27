//! Workbench and elite workbench crafting.

use craftworks_common::{DocumentError, NamespacedKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::{ingredient, ingredient_list, CustomRecipe, RecipeMeta, RecipeVariant};
use crate::document::Document;
use crate::error::RecipeResult;
use crate::family::RecipeFamily;
use crate::ingredient::IngredientSpec;

/// Side length of the workbench grid.
pub const STANDARD_GRID: usize = 3;

/// Side length of the elite workbench grid.
pub const ELITE_GRID: usize = 6;

/// Grid arrangement of a crafting recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum CraftingLayout {
    /// Fixed pattern. Spaces in `shape` are empty cells.
    Shaped {
        /// Rows of the pattern, all the same width.
        shape: Vec<String>,
        /// Ingredient for each symbol used in `shape`.
        ingredients: BTreeMap<char, IngredientSpec>,
    },
    /// Any arrangement of the listed ingredients.
    Shapeless {
        /// Required ingredients, one per consumed item.
        ingredients: Vec<IngredientSpec>,
    },
}

/// A grid crafting recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftingRecipe {
    /// Shared header.
    pub meta: RecipeMeta,
    /// Crafted item.
    pub result: IngredientSpec,
    /// Grid arrangement.
    pub layout: CraftingLayout,
}

impl CraftingRecipe {
    /// Grid side length for this recipe's workbench.
    #[must_use]
    pub fn grid_size(&self) -> usize {
        grid_size(self.meta.family)
    }

    /// Whether the arrangement is free.
    #[must_use]
    pub fn is_shapeless(&self) -> bool {
        matches!(self.layout, CraftingLayout::Shapeless { .. })
    }

    /// Pattern width and height; shapeless recipes report `(0, 0)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        match &self.layout {
            CraftingLayout::Shaped { shape, .. } => (
                shape.first().map_or(0, |row| row.chars().count()),
                shape.len(),
            ),
            CraftingLayout::Shapeless { .. } => (0, 0),
        }
    }

    /// Ingredient bound to a pattern symbol.
    #[must_use]
    pub fn ingredient(&self, symbol: char) -> Option<&IngredientSpec> {
        match &self.layout {
            CraftingLayout::Shaped { ingredients, .. } => ingredients.get(&symbol),
            CraftingLayout::Shapeless { .. } => None,
        }
    }

    pub(crate) fn slots(&self) -> Vec<(String, &IngredientSpec)> {
        let mut slots = vec![("result".to_string(), &self.result)];
        match &self.layout {
            CraftingLayout::Shaped { ingredients, .. } => {
                slots.extend(ingredients.iter().map(|(c, spec)| (format!("ingredients.{c}"), spec)));
            }
            CraftingLayout::Shapeless { ingredients } => {
                slots.extend(
                    ingredients
                        .iter()
                        .enumerate()
                        .map(|(i, spec)| (format!("ingredients[{i}]"), spec)),
                );
            }
        }
        slots
    }

    pub(crate) fn specs_mut(&mut self) -> Vec<&mut IngredientSpec> {
        let mut specs = vec![&mut self.result];
        match &mut self.layout {
            CraftingLayout::Shaped { ingredients, .. } => specs.extend(ingredients.values_mut()),
            CraftingLayout::Shapeless { ingredients } => specs.extend(ingredients.iter_mut()),
        }
        specs
    }
}

fn grid_size(family: RecipeFamily) -> usize {
    if family.is_elite() {
        ELITE_GRID
    } else {
        STANDARD_GRID
    }
}

fn read_shaped(doc: &Document<'_>, grid: usize) -> Result<CraftingLayout, DocumentError> {
    let shape_path = doc.field_path("shape");
    let shape = doc
        .required("shape")?
        .as_list()?
        .iter()
        .map(|row| row.as_str().map(str::to_string))
        .collect::<Result<Vec<_>, _>>()?;

    if shape.is_empty() {
        return Err(DocumentError::invalid(shape_path, "cannot be empty"));
    }
    if shape.len() > grid {
        return Err(DocumentError::invalid(
            shape_path,
            format!("{} rows exceed the {grid}x{grid} grid", shape.len()),
        ));
    }
    let width = shape[0].chars().count();
    if width == 0 || width > grid {
        return Err(DocumentError::invalid(
            shape_path,
            format!("row width {width} must be within 1..={grid}"),
        ));
    }
    if let Some(row) = shape.iter().position(|row| row.chars().count() != width) {
        return Err(DocumentError::invalid(
            format!("{shape_path}[{row}]"),
            format!("every row must be {width} wide"),
        ));
    }

    let mut ingredients = BTreeMap::new();
    for (name, entry) in doc.required("ingredients")?.as_entries()? {
        let mut chars = name.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) if c != ' ' => c,
            _ => {
                return Err(DocumentError::invalid(
                    entry.path(),
                    "symbol must be a single non-space character",
                ))
            }
        };
        ingredients.insert(symbol, IngredientSpec::from_document(&entry)?);
    }

    for symbol in shape.iter().flat_map(|row| row.chars()).filter(|c| *c != ' ') {
        if !ingredients.contains_key(&symbol) {
            return Err(DocumentError::invalid(
                doc.field_path("ingredients"),
                format!("symbol '{symbol}' used in shape has no ingredient"),
            ));
        }
    }
    let unused: Vec<char> = ingredients
        .keys()
        .filter(|c| !shape.iter().any(|row| row.contains(**c)))
        .copied()
        .collect();
    if !unused.is_empty() {
        debug!(path = %doc.path(), ?unused, "Ingredient symbols not used in shape");
    }

    Ok(CraftingLayout::Shaped { shape, ingredients })
}

fn read_shapeless(doc: &Document<'_>, grid: usize) -> Result<CraftingLayout, DocumentError> {
    let ingredients = ingredient_list(doc, "ingredients")?;
    let max = grid * grid;
    if ingredients.len() > max {
        return Err(DocumentError::invalid(
            doc.field_path("ingredients"),
            format!("{} ingredients exceed the {max} grid cells", ingredients.len()),
        ));
    }
    Ok(CraftingLayout::Shapeless { ingredients })
}

impl RecipeVariant for CraftingRecipe {
    const TYPE_NAME: &'static str = "CraftingRecipe";

    fn supports(family: RecipeFamily) -> bool {
        family.is_crafting()
    }

    fn from_document(
        key: NamespacedKey,
        family: RecipeFamily,
        doc: &Document<'_>,
    ) -> RecipeResult<Self> {
        let grid = grid_size(family);
        let layout = if family.is_shapeless() {
            read_shapeless(doc, grid)?
        } else {
            read_shaped(doc, grid)?
        };
        Ok(Self {
            meta: RecipeMeta::from_document(key, family, doc)?,
            result: ingredient(doc, "result")?,
            layout,
        })
    }

    fn narrow(recipe: &CustomRecipe) -> Option<&Self> {
        match recipe {
            CustomRecipe::Crafting(r) => Some(r),
            _ => None,
        }
    }

    fn into_recipe(self) -> CustomRecipe {
        CustomRecipe::Crafting(self)
    }
}
