//! Loaded recipes with lookup indexes.

use ahash::AHashMap;
use craftworks_common::NamespacedKey;
use craftworks_recipes::{CustomRecipe, RecipeContainer, RecipeFamily, RecipeReport, ResolveContext};
use tracing::debug;

/// Every recipe the loader accepted, indexed by key and by family.
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: AHashMap<NamespacedKey, CustomRecipe>,
    order: Vec<NamespacedKey>,
    by_family: AHashMap<RecipeFamily, Vec<NamespacedKey>>,
}

impl RecipeBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the book is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Whether a recipe with `key` is loaded.
    #[must_use]
    pub fn contains(&self, key: &NamespacedKey) -> bool {
        self.recipes.contains_key(key)
    }

    /// Adds a recipe, returning the one it replaced.
    pub fn insert(&mut self, recipe: CustomRecipe) -> Option<CustomRecipe> {
        let key = recipe.key().clone();
        let replaced = self.remove(&key);
        self.by_family
            .entry(recipe.family())
            .or_default()
            .push(key.clone());
        self.order.push(key.clone());
        self.recipes.insert(key, recipe);
        replaced
    }

    /// Removes a recipe.
    pub fn remove(&mut self, key: &NamespacedKey) -> Option<CustomRecipe> {
        let recipe = self.recipes.remove(key)?;
        self.order.retain(|k| k != key);
        if let Some(keys) = self.by_family.get_mut(&recipe.family()) {
            keys.retain(|k| k != key);
        }
        Some(recipe)
    }

    /// Recipe by key.
    #[must_use]
    pub fn get(&self, key: &NamespacedKey) -> Option<&CustomRecipe> {
        self.recipes.get(key)
    }

    /// Mutable recipe by key, for interactive editing.
    pub fn get_mut(&mut self, key: &NamespacedKey) -> Option<&mut CustomRecipe> {
        self.recipes.get_mut(key)
    }

    /// Recipes of one kind, in load order.
    #[must_use]
    pub fn by_kind(&self, family: RecipeFamily) -> Vec<&CustomRecipe> {
        self.by_family
            .get(&family)
            .map(|keys| keys.iter().filter_map(|k| self.recipes.get(k)).collect())
            .unwrap_or_default()
    }

    /// Recipes of every member kind of `container`, grouped by member order.
    #[must_use]
    pub fn by_container(&self, container: &RecipeContainer) -> Vec<&CustomRecipe> {
        container
            .member_families()
            .iter()
            .flat_map(|family| self.by_kind(*family))
            .collect()
    }

    /// Every recipe in load order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomRecipe> {
        self.order.iter().filter_map(|k| self.recipes.get(k))
    }

    /// Rebuilds every ingredient's choices after item or tag definitions
    /// changed.
    pub fn refresh_choices(&mut self, ctx: ResolveContext<'_>) {
        for recipe in self.recipes.values_mut() {
            recipe.resolve_all(ctx);
        }
        debug!(recipes = self.recipes.len(), "Refreshed ingredient choices");
    }

    /// Validates every recipe, in load order.
    #[must_use]
    pub fn validate_all(&self, ctx: ResolveContext<'_>) -> Vec<RecipeReport> {
        self.iter().map(|recipe| recipe.validate(ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftworks_recipes::{
        Document, ItemCatalog, RecipeTypeRegistry, TagCatalog, Verdict,
    };
    use serde_json::json;

    fn key(s: &str) -> NamespacedKey {
        NamespacedKey::parse(s).expect("valid key")
    }

    fn cooking(registry: &RecipeTypeRegistry, family: RecipeFamily, name: &str) -> CustomRecipe {
        let value = json!({ "source": { "items": ["iron_ore"] }, "result": { "items": ["iron_ingot"] } });
        registry
            .kind(family)
            .expect("kind")
            .materialize(key(name), &Document::new(&value))
            .expect("recipe")
    }

    #[test]
    fn test_indexes() {
        let registry = RecipeTypeRegistry::standard().expect("catalog");
        let mut book = RecipeBook::new();
        book.insert(cooking(&registry, RecipeFamily::Smoker, "custom:a"));
        book.insert(cooking(&registry, RecipeFamily::Furnace, "custom:b"));
        book.insert(cooking(&registry, RecipeFamily::Furnace, "custom:c"));

        assert_eq!(book.len(), 3);
        assert_eq!(book.by_kind(RecipeFamily::Furnace).len(), 2);
        assert!(book.by_kind(RecipeFamily::Anvil).is_empty());

        let container = registry.lookup_container("cooking").expect("cooking");
        let keys: Vec<_> = book
            .by_container(container.inner())
            .iter()
            .map(|r| r.key().to_string())
            .collect();
        assert_eq!(keys, ["custom:b", "custom:c", "custom:a"]);

        let order: Vec<_> = book.iter().map(|r| r.key().to_string()).collect();
        assert_eq!(order, ["custom:a", "custom:b", "custom:c"]);
    }

    #[test]
    fn test_replace_updates_indexes() {
        let registry = RecipeTypeRegistry::standard().expect("catalog");
        let mut book = RecipeBook::new();
        book.insert(cooking(&registry, RecipeFamily::Smoker, "custom:a"));
        let replaced = book.insert(cooking(&registry, RecipeFamily::Campfire, "custom:a"));

        assert_eq!(replaced.map(|r| r.family()), Some(RecipeFamily::Smoker));
        assert_eq!(book.len(), 1);
        assert!(book.by_kind(RecipeFamily::Smoker).is_empty());
        assert_eq!(book.by_kind(RecipeFamily::Campfire).len(), 1);
    }

    #[test]
    fn test_refresh_and_validate() {
        let registry = RecipeTypeRegistry::standard().expect("catalog");
        let mut book = RecipeBook::new();
        book.insert(cooking(&registry, RecipeFamily::Furnace, "custom:iron"));

        let mut items = ItemCatalog::new();
        items.add_material(key("iron_ingot"));
        let tags = TagCatalog::new();
        let ctx = ResolveContext::new(&items, &tags);
        book.refresh_choices(ctx);

        let recipe = book.get(&key("custom:iron")).expect("loaded");
        assert_eq!(recipe.result().snapshot().map(|s| s.len()), Some(1));
        assert_eq!(recipe.slots()[1].1.snapshot().map(|s| s.len()), Some(0));

        let reports = book.validate_all(ctx);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].verdict, Verdict::Invalid);
    }
}
