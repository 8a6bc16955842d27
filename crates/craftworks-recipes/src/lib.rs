//! # Craftworks Recipes
//!
//! Recipe type registry and ingredient resolution for Craftworks.
//!
//! This crate provides:
//! - Recipe families, kinds and containers, with document dispatch
//! - The populate-once [`RecipeTypeRegistry`] and its standard catalog
//! - Ingredient specifications and the resolution engine
//! - Ingredient and recipe validation
//! - The raw-document boundary recipe constructors read from
//! - Concrete recipe types for every family

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod container;
pub mod document;
pub mod error;
pub mod family;
pub mod ingredient;
pub mod item;
pub mod kind;
pub mod recipe;
pub mod registry;
pub mod validation;

pub use container::{ContainerRef, ContainerSpec, DispatchRule, RecipeContainer};
pub use document::{Document, NodeType, RawNode};
pub use error::{CastError, CatalogError, CatalogResult, RecipeError, RecipeResult};
pub use family::RecipeFamily;
pub use ingredient::{DisplayItem, IngredientSpec, SharedIngredient};
pub use item::{
    ItemCandidate, ItemCatalog, ItemReference, ItemResolver, PermissionSet, ResolveContext,
    TagCatalog, TagDefinition, TagResolver, Unrestricted, Viewer,
};
pub use kind::{KindRef, RecipeImpl, RecipeKind};
pub use recipe::{CustomRecipe, RecipeMeta, RecipeSupertype, RecipeVariant, SupertypeRef};
pub use registry::{LoaderTarget, RecipeTypeRegistry};
pub use validation::{ElementRef, Fault, RecipeReport, ValidationReport, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::container::*;
    pub use crate::document::*;
    pub use crate::error::*;
    pub use crate::family::*;
    pub use crate::ingredient::*;
    pub use crate::item::*;
    pub use crate::kind::*;
    pub use crate::recipe::*;
    pub use crate::registry::*;
    pub use crate::validation::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftworks_common::NamespacedKey;
    use serde_json::json;

    fn key(s: &str) -> NamespacedKey {
        NamespacedKey::parse(s).expect("valid key")
    }

    #[test]
    fn test_document_to_validated_recipe() {
        let registry = RecipeTypeRegistry::standard().expect("catalog");
        let mut items = ItemCatalog::new();
        items
            .add_material(key("iron_ore"))
            .add_material(key("iron_ingot"));
        let tags = TagCatalog::new();
        let ctx = ResolveContext::new(&items, &tags);

        let value = json!({
            "source": { "items": ["iron_ore", { "provider": "oraxen", "id": "ores:tin" }] },
            "result": { "items": ["iron_ingot"] },
        });
        let Some(LoaderTarget::Kind(kind)) = registry.resolve_loader("blast_furnace") else {
            panic!("blast_furnace is a kind");
        };
        let mut recipe = kind
            .materialize(key("custom:iron"), &Document::new(&value))
            .expect("materialize");
        recipe.resolve_all(ctx);

        assert_eq!(kind.creator_id(), "cooking");
        assert_eq!(recipe.slots()[1].1.len(), 1);
        assert_eq!(recipe.validate(ctx).verdict, Verdict::Pending);
    }
}
