//! The recipe type registry.
//!
//! The registry is populated once during a single-threaded bootstrap through
//! `&mut self`, then shared read-only. [`RecipeTypeRegistry::install`] moves
//! a finished registry into the process-wide handle; lookups after that need
//! no synchronization.
//!
//! Kinds are indexed by family tag and by lower-cased id; containers by
//! lower-cased id. Both keep registration order for iteration.

use ahash::AHashMap;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::container::{ContainerRef, ContainerSpec, DispatchRule, RecipeContainer};
use crate::error::{CatalogError, CatalogResult};
use crate::family::RecipeFamily;
use crate::kind::{KindRef, RecipeImpl, RecipeKind};
use crate::recipe::{
    AnvilRecipe, BrewingRecipe, CauldronRecipe, CookingRecipe, CraftingRecipe, CustomRecipe,
    GrindstoneRecipe, RecipeSupertype, SmithingRecipe, StonecutterRecipe,
};

static GLOBAL: OnceLock<RecipeTypeRegistry> = OnceLock::new();

/// Id of the workbench container.
pub const WORKBENCH: &str = "workbench";
/// Id of the elite workbench container.
pub const ELITE_WORKBENCH: &str = "elite_workbench";
/// Id of the cooking container.
pub const COOKING: &str = "cooking";
/// Discriminator field the crafting containers dispatch on.
pub const SHAPELESS_FIELD: &str = "shapeless";

/// What a loader-supplied id names.
#[derive(Debug, Clone, Copy)]
pub enum LoaderTarget<'r> {
    /// A single kind.
    Kind(KindRef<'r>),
    /// A container; the document must be dispatched.
    Container(ContainerRef<'r>),
}

/// Catalog of every recipe kind and container.
#[derive(Debug, Default)]
pub struct RecipeTypeRegistry {
    kinds: Vec<RecipeKind>,
    by_family: AHashMap<RecipeFamily, usize>,
    kind_ids: AHashMap<String, usize>,
    containers: Vec<RecipeContainer>,
    container_ids: AHashMap<String, usize>,
}

impl RecipeTypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard catalog.
    ///
    /// Containers and their member order:
    /// - `workbench` (creator `crafting`): `[CRAFTING_SHAPED, CRAFTING_SHAPELESS]`,
    ///   dispatched on the `shapeless` flag
    /// - `elite_workbench` (creator `elite_crafting`):
    ///   `[ELITE_CRAFTING_SHAPED, ELITE_CRAFTING_SHAPELESS]`, dispatched on `shapeless`
    /// - `cooking`: `[FURNACE, BLAST_FURNACE, SMOKER, CAMPFIRE]`, no dispatch
    ///
    /// The remaining kinds stand alone.
    pub fn standard() -> CatalogResult<Self> {
        let mut registry = Self::new();
        for family in RecipeFamily::ALL {
            let implementation = match family {
                f if f.is_crafting() => RecipeImpl::of::<CraftingRecipe>(),
                f if f.is_cooking() => RecipeImpl::of::<CookingRecipe>(),
                RecipeFamily::Anvil => RecipeImpl::of::<AnvilRecipe>(),
                RecipeFamily::Stonecutter => RecipeImpl::of::<StonecutterRecipe>(),
                RecipeFamily::Cauldron => RecipeImpl::of::<CauldronRecipe>(),
                RecipeFamily::Grindstone => RecipeImpl::of::<GrindstoneRecipe>(),
                RecipeFamily::BrewingStand => RecipeImpl::of::<BrewingRecipe>(),
                _ => RecipeImpl::of::<SmithingRecipe>(),
            };
            registry.register_kind(family, implementation)?;
        }

        registry.register_container(
            ContainerSpec::new(
                WORKBENCH,
                RecipeSupertype::Crafting,
                [RecipeFamily::CraftingShaped, RecipeFamily::CraftingShapeless],
            )
            .creator_id("crafting")
            .dispatch(DispatchRule::flag(SHAPELESS_FIELD)),
        )?;
        registry.register_container(
            ContainerSpec::new(
                ELITE_WORKBENCH,
                RecipeSupertype::Crafting,
                [
                    RecipeFamily::EliteCraftingShaped,
                    RecipeFamily::EliteCraftingShapeless,
                ],
            )
            .creator_id("elite_crafting")
            .dispatch(DispatchRule::flag(SHAPELESS_FIELD)),
        )?;
        registry.register_container(ContainerSpec::new(
            COOKING,
            RecipeSupertype::Cooking,
            [
                RecipeFamily::Furnace,
                RecipeFamily::BlastFurnace,
                RecipeFamily::Smoker,
                RecipeFamily::Campfire,
            ],
        ))?;

        info!(
            kinds = registry.kinds.len(),
            containers = registry.containers.len(),
            "Recipe type registry bootstrapped"
        );
        Ok(registry)
    }

    // ------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------

    /// Registers the kind for `family`.
    pub fn register_kind(
        &mut self,
        family: RecipeFamily,
        implementation: RecipeImpl,
    ) -> CatalogResult<&RecipeKind> {
        self.insert_kind(RecipeKind::new(family, implementation, None))
    }

    /// Registers the kind for `family` with its own creator id.
    pub fn register_kind_with_creator(
        &mut self,
        family: RecipeFamily,
        implementation: RecipeImpl,
        creator_id: impl Into<String>,
    ) -> CatalogResult<&RecipeKind> {
        self.insert_kind(RecipeKind::new(family, implementation, Some(creator_id.into())))
    }

    fn insert_kind(&mut self, kind: RecipeKind) -> CatalogResult<&RecipeKind> {
        let family = kind.family();
        let id = kind.id().to_ascii_lowercase();
        if self.by_family.contains_key(&family) || self.kind_ids.contains_key(&id) {
            return Err(CatalogError::DuplicateKind(family));
        }

        let index = self.kinds.len();
        debug!(kind = %id, implementation = kind.implementation().type_name(), "Registered recipe kind");
        self.kinds.push(kind);
        self.by_family.insert(family, index);
        self.kind_ids.insert(id, index);
        Ok(&self.kinds[index])
    }

    /// Registers a container and attaches its members.
    ///
    /// If a container with the same id (case-insensitive) exists, it is
    /// returned unchanged and `spec` is ignored.
    pub fn register_container(&mut self, spec: ContainerSpec) -> CatalogResult<&RecipeContainer> {
        let id = spec.id.to_ascii_lowercase();
        if let Some(&existing) = self.container_ids.get(&id) {
            debug!(container = %spec.id, "Container already registered, keeping the first");
            return Ok(&self.containers[existing]);
        }

        if spec.members.is_empty() {
            return Err(CatalogError::EmptyContainer(spec.id));
        }
        if let Some(rule) = &spec.dispatch {
            if spec.members.len() != rule.arity() {
                return Err(CatalogError::DispatchArity {
                    container: spec.id,
                    members: spec.members.len(),
                });
            }
        }

        let mut member_indices = Vec::with_capacity(spec.members.len());
        for family in &spec.members {
            let Some(&index) = self.by_family.get(family) else {
                return Err(CatalogError::UnknownKind {
                    container: spec.id,
                    family: *family,
                });
            };
            if let Some(parent) = self.kinds[index].parent_id() {
                return Err(CatalogError::KindAlreadyContained {
                    family: *family,
                    container: parent.to_string(),
                });
            }
            if member_indices.contains(&index) {
                return Err(CatalogError::KindAlreadyContained {
                    family: *family,
                    container: spec.id,
                });
            }
            member_indices.push(index);
        }

        let container = RecipeContainer::from_spec(spec);
        for index in member_indices {
            self.kinds[index].attach(container.id());
        }

        let index = self.containers.len();
        info!(
            container = container.id(),
            creator_id = container.creator_id(),
            members = container.member_families().len(),
            "Registered recipe container"
        );
        self.containers.push(container);
        self.container_ids.insert(id, index);
        Ok(&self.containers[index])
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Kind by id, case-insensitive.
    #[must_use]
    pub fn lookup_kind(&self, id: &str) -> Option<KindRef<'_>> {
        self.kind_ids
            .get(&id.to_ascii_lowercase())
            .map(|&index| KindRef::new(self, &self.kinds[index]))
    }

    /// Kind by family tag.
    #[must_use]
    pub fn kind(&self, family: RecipeFamily) -> Option<KindRef<'_>> {
        self.by_family
            .get(&family)
            .map(|&index| KindRef::new(self, &self.kinds[index]))
    }

    /// Container by id, case-insensitive.
    #[must_use]
    pub fn lookup_container(&self, id: &str) -> Option<ContainerRef<'_>> {
        self.container_ids
            .get(&id.to_ascii_lowercase())
            .map(|&index| ContainerRef::new(self, &self.containers[index]))
    }

    /// Every kind in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = KindRef<'_>> + '_ {
        self.kinds.iter().map(move |kind| KindRef::new(self, kind))
    }

    /// Every container in registration order.
    pub fn containers(&self) -> impl Iterator<Item = ContainerRef<'_>> + '_ {
        self.containers
            .iter()
            .map(move |container| ContainerRef::new(self, container))
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kind that produced `recipe`.
    #[must_use]
    pub fn kind_of(&self, recipe: &CustomRecipe) -> Option<KindRef<'_>> {
        self.kind(recipe.family())
    }

    /// Container of the kind that produced `recipe`.
    #[must_use]
    pub fn container_of(&self, recipe: &CustomRecipe) -> Option<ContainerRef<'_>> {
        self.kind_of(recipe).and_then(|kind| kind.container())
    }

    /// Resolves an id supplied by an external loader.
    ///
    /// Tried in order: kind id, container id, container creator id, then
    /// the own creator id of a kind outside any container. All matches are
    /// case-insensitive.
    #[must_use]
    pub fn resolve_loader(&self, id: &str) -> Option<LoaderTarget<'_>> {
        if let Some(kind) = self.lookup_kind(id) {
            return Some(LoaderTarget::Kind(kind));
        }
        if let Some(container) = self.lookup_container(id) {
            return Some(LoaderTarget::Container(container));
        }
        if let Some(container) = self
            .containers()
            .find(|c| c.creator_id().eq_ignore_ascii_case(id))
        {
            return Some(LoaderTarget::Container(container));
        }
        self.kinds()
            .find(|k| k.parent_id().is_none() && k.own_creator_id().eq_ignore_ascii_case(id))
            .map(LoaderTarget::Kind)
    }

    // ------------------------------------------------------------------
    // Process-wide handle
    // ------------------------------------------------------------------

    /// Moves this registry into the process-wide handle.
    pub fn install(self) -> CatalogResult<&'static Self> {
        GLOBAL.set(self).map_err(|_| CatalogError::AlreadyInstalled)?;
        GLOBAL.get().ok_or(CatalogError::AlreadyInstalled)
    }

    /// The installed registry, if any.
    #[must_use]
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use craftworks_common::NamespacedKey;
    use serde_json::json;

    fn key(s: &str) -> NamespacedKey {
        NamespacedKey::parse(s).expect("valid key")
    }

    fn standard() -> RecipeTypeRegistry {
        RecipeTypeRegistry::standard().expect("standard catalog")
    }

    #[test]
    fn test_standard_catalog_covers_every_family() {
        let registry = standard();
        assert_eq!(registry.len(), RecipeFamily::ALL.len());
        for family in RecipeFamily::ALL {
            let kind = registry.kind(family).expect("registered");
            assert_eq!(kind.family(), family);
            assert!(kind.implementation().supports(family));
        }
        assert_eq!(registry.containers().count(), 3);
    }

    #[test]
    fn test_duplicate_kind_is_rejected() {
        let mut registry = RecipeTypeRegistry::new();
        registry
            .register_kind(RecipeFamily::Anvil, RecipeImpl::of::<AnvilRecipe>())
            .expect("first");
        let err = registry
            .register_kind(RecipeFamily::Anvil, RecipeImpl::of::<AnvilRecipe>())
            .expect_err("second");
        assert_eq!(err, CatalogError::DuplicateKind(RecipeFamily::Anvil));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = standard();
        for kind in registry.kinds() {
            let upper = kind.id().to_ascii_uppercase();
            let found = registry.lookup_kind(&upper).expect("found by upper-case id");
            assert_eq!(found.family(), kind.family());
        }
        assert!(registry.lookup_container("COOKING").is_some());
        assert!(registry.lookup_kind("kiln").is_none());
    }

    #[test]
    fn test_cooking_container_order() {
        let registry = standard();
        let cooking = registry.lookup_container("cooking").expect("cooking");
        let families: Vec<_> = cooking.members().iter().map(|k| k.family()).collect();
        assert_eq!(
            families,
            [
                RecipeFamily::Furnace,
                RecipeFamily::BlastFurnace,
                RecipeFamily::Smoker,
                RecipeFamily::Campfire,
            ]
        );
        assert_eq!(cooking.members()[0].family(), RecipeFamily::Furnace);
    }

    #[test]
    fn test_creator_id_follows_container() {
        let mut registry = RecipeTypeRegistry::new();
        registry
            .register_kind(RecipeFamily::Furnace, RecipeImpl::of::<CookingRecipe>())
            .expect("furnace");
        assert_eq!(
            registry.kind(RecipeFamily::Furnace).expect("kind").creator_id(),
            "furnace"
        );

        registry
            .register_container(
                ContainerSpec::new("ovens", RecipeSupertype::Cooking, [RecipeFamily::Furnace])
                    .creator_id("oven"),
            )
            .expect("container");
        let kind = registry.kind(RecipeFamily::Furnace).expect("kind");
        assert_eq!(kind.id(), "furnace");
        assert_eq!(kind.creator_id(), "oven");
        assert_eq!(kind.creator_id(), "oven");
        assert_eq!(kind.container().map(|c| c.id().to_string()), Some("ovens".to_string()));
    }

    #[test]
    fn test_container_registration_is_first_writer_wins() {
        let mut registry = standard();
        registry
            .register_kind_with_creator(RecipeFamily::Furnace, RecipeImpl::of::<CookingRecipe>(), "x")
            .expect_err("already registered");

        let existing = registry
            .register_container(ContainerSpec::new(
                "Cooking",
                RecipeSupertype::Crafting,
                [RecipeFamily::Anvil],
            ))
            .expect("ignored, not an error");
        assert_eq!(existing.supertype(), RecipeSupertype::Cooking);
        assert_eq!(existing.member_families().len(), 4);
        assert!(registry
            .kind(RecipeFamily::Anvil)
            .expect("anvil")
            .parent_id()
            .is_none());
    }

    #[test]
    fn test_container_validation() {
        let mut registry = standard();
        assert_eq!(
            registry
                .register_container(ContainerSpec::new("none", RecipeSupertype::Cooking, []))
                .expect_err("empty"),
            CatalogError::EmptyContainer("none".to_string())
        );
        assert!(matches!(
            registry
                .register_container(ContainerSpec::new(
                    "furnaces",
                    RecipeSupertype::Cooking,
                    [RecipeFamily::Furnace]
                ))
                .expect_err("already contained"),
            CatalogError::KindAlreadyContained { ref container, .. } if container == "cooking"
        ));
        assert!(matches!(
            registry
                .register_container(
                    ContainerSpec::new("tools", RecipeSupertype::Crafting, [RecipeFamily::Anvil])
                        .dispatch(DispatchRule::flag("x"))
                )
                .expect_err("arity"),
            CatalogError::DispatchArity { members: 1, .. }
        ));

        let mut sparse = RecipeTypeRegistry::new();
        assert!(matches!(
            sparse
                .register_container(ContainerSpec::new(
                    "cooking",
                    RecipeSupertype::Cooking,
                    [RecipeFamily::Furnace]
                ))
                .expect_err("unregistered member"),
            CatalogError::UnknownKind {
                family: RecipeFamily::Furnace,
                ..
            }
        ));
    }

    #[test]
    fn test_workbench_dispatch() {
        let registry = standard();
        let workbench = registry.lookup_container(WORKBENCH).expect("workbench");

        let shapeless = json!({
            "shapeless": true,
            "ingredients": [{ "items": ["oak_log"] }],
            "result": { "items": ["oak_planks"] },
        });
        let recipe = workbench
            .materialize(key("custom:planks"), &Document::new(&shapeless))
            .expect("shapeless");
        assert_eq!(recipe.family(), RecipeFamily::CraftingShapeless);
        assert!(workbench.is_instance(&recipe));
        assert!(matches!(workbench.cast(&recipe), crate::recipe::SupertypeRef::Crafting(_)));

        let shaped = json!({
            "shape": ["#", "#"],
            "ingredients": { "#": { "items": ["oak_planks"] } },
            "result": { "items": ["stick"] },
        });
        let recipe = workbench
            .materialize(key("custom:sticks"), &Document::new(&shaped))
            .expect("shaped");
        assert_eq!(recipe.family(), RecipeFamily::CraftingShaped);
        assert_eq!(
            registry.container_of(&recipe).map(|c| c.id().to_string()),
            Some(WORKBENCH.to_string())
        );
    }

    #[test]
    fn test_cooking_has_no_dispatch_rule() {
        let registry = standard();
        let cooking = registry.lookup_container(COOKING).expect("cooking");
        let value = json!({});
        let err = cooking
            .materialize(key("custom:x"), &Document::new(&value))
            .expect_err("no rule");
        assert_eq!(err, crate::error::RecipeError::NoDispatchRule("cooking".to_string()));
    }

    #[test]
    fn test_container_cast_rejects_foreign_recipe() {
        let registry = standard();
        let value = json!({ "source": { "items": ["stone"] }, "result": { "items": ["stone_bricks"] } });
        let recipe = registry
            .kind(RecipeFamily::Stonecutter)
            .expect("stonecutter")
            .materialize(key("custom:bricks"), &Document::new(&value))
            .expect("stonecutter recipe");

        let cooking = registry.lookup_container(COOKING).expect("cooking");
        assert!(!cooking.is_instance(&recipe));
        let err = cooking.try_cast(&recipe).expect_err("not cooking");
        assert_eq!(err.target, "CookingRecipe");
        assert!(registry.container_of(&recipe).is_none());
    }

    #[test]
    fn test_container_rejects_same_supertype_from_other_container() {
        let registry = standard();
        let value = json!({
            "shapeless": true,
            "ingredients": [{ "items": ["diamond"] }],
            "result": { "items": ["diamond_block"] },
        });
        let elite = registry.lookup_container(ELITE_WORKBENCH).expect("elite");
        let recipe = elite
            .materialize(key("custom:block"), &Document::new(&value))
            .expect("elite recipe");
        assert_eq!(recipe.family(), RecipeFamily::EliteCraftingShapeless);

        let workbench = registry.lookup_container(WORKBENCH).expect("workbench");
        assert!(elite.is_instance(&recipe));
        assert!(!workbench.is_instance(&recipe));
        assert!(workbench.try_cast(&recipe).is_err());

        let shaped = registry.kind(RecipeFamily::CraftingShaped).expect("shaped");
        assert!(!shaped.is_instance(&recipe));
        assert_eq!(
            registry.container_of(&recipe).map(|c| c.id().to_string()),
            Some(ELITE_WORKBENCH.to_string())
        );

        let smoked_value = json!({ "source": { "items": ["cod"] }, "result": { "items": ["cooked_cod"] } });
        let smoked = registry
            .kind(RecipeFamily::Smoker)
            .expect("smoker")
            .materialize(key("custom:cod"), &Document::new(&smoked_value))
            .expect("smoker recipe");
        let furnace = registry.kind(RecipeFamily::Furnace).expect("furnace");
        assert!(!furnace.is_instance(&smoked));
        assert!(registry.lookup_container(COOKING).expect("cooking").is_instance(&smoked));
    }

    #[test]
    fn test_resolve_loader() {
        let registry = standard();
        assert!(matches!(
            registry.resolve_loader("FURNACE"),
            Some(LoaderTarget::Kind(k)) if k.family() == RecipeFamily::Furnace
        ));
        assert!(matches!(
            registry.resolve_loader("workbench"),
            Some(LoaderTarget::Container(c)) if c.id() == WORKBENCH
        ));
        assert!(matches!(
            registry.resolve_loader("Elite_Crafting"),
            Some(LoaderTarget::Container(c)) if c.id() == ELITE_WORKBENCH
        ));
        assert!(registry.resolve_loader("kiln").is_none());
    }

    #[test]
    fn test_install_once() {
        let installed = standard().install().expect("first install");
        assert!(std::ptr::eq(
            installed,
            RecipeTypeRegistry::global().expect("installed")
        ));
        assert_eq!(
            standard().install().expect_err("second install"),
            CatalogError::AlreadyInstalled
        );
    }
}
