//! Recipe kinds.
//!
//! A [`RecipeKind`] binds one [`RecipeFamily`] to the concrete type that
//! materializes its recipes. Kinds never own their container: the parent is
//! stored as a container id and looked up through the registry, which is why
//! the creator id is only available from a registry-bound [`KindRef`].

use craftworks_common::NamespacedKey;
use std::fmt;
use std::ops::Deref;
use tracing::{debug, warn};

use crate::container::ContainerRef;
use crate::document::Document;
use crate::error::{CastError, RecipeError, RecipeResult};
use crate::family::RecipeFamily;
use crate::recipe::{CustomRecipe, RecipeVariant};
use crate::registry::RecipeTypeRegistry;

type Construct = fn(NamespacedKey, RecipeFamily, &Document<'_>) -> RecipeResult<CustomRecipe>;

/// Type-erased handle to a [`RecipeVariant`] implementation.
#[derive(Clone, Copy)]
pub struct RecipeImpl {
    type_name: &'static str,
    supports: fn(RecipeFamily) -> bool,
    construct: Construct,
    narrows: fn(&CustomRecipe) -> bool,
}

fn construct<T: RecipeVariant>(
    key: NamespacedKey,
    family: RecipeFamily,
    doc: &Document<'_>,
) -> RecipeResult<CustomRecipe> {
    T::from_document(key, family, doc).map(T::into_recipe)
}

fn narrows<T: RecipeVariant>(recipe: &CustomRecipe) -> bool {
    T::narrow(recipe).is_some()
}

impl RecipeImpl {
    /// Handle for `T`.
    #[must_use]
    pub fn of<T: RecipeVariant>() -> Self {
        Self {
            type_name: T::TYPE_NAME,
            supports: T::supports,
            construct: construct::<T>,
            narrows: narrows::<T>,
        }
    }

    /// Name of the implementation type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the type can represent `family`.
    #[must_use]
    pub fn supports(&self, family: RecipeFamily) -> bool {
        (self.supports)(family)
    }

    /// Whether `recipe`'s runtime type is this implementation.
    #[must_use]
    pub fn matches(&self, recipe: &CustomRecipe) -> bool {
        (self.narrows)(recipe)
    }
}

impl fmt::Debug for RecipeImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecipeImpl").field(&self.type_name).finish()
    }
}

impl PartialEq for RecipeImpl {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl Eq for RecipeImpl {}

/// Descriptor of one recipe family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeKind {
    family: RecipeFamily,
    id: String,
    own_creator_id: String,
    implementation: RecipeImpl,
    parent: Option<String>,
}

impl RecipeKind {
    pub(crate) fn new(family: RecipeFamily, implementation: RecipeImpl, creator_id: Option<String>) -> Self {
        let id = family.id().to_string();
        Self {
            family,
            own_creator_id: creator_id.unwrap_or_else(|| id.clone()),
            id,
            implementation,
            parent: None,
        }
    }

    pub(crate) fn attach(&mut self, container: &str) {
        self.parent = Some(container.to_string());
    }

    /// Family tag.
    #[must_use]
    pub fn family(&self) -> RecipeFamily {
        self.family
    }

    /// Lower-case kind id, unique among kinds.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creator id used when the kind has no container.
    #[must_use]
    pub fn own_creator_id(&self) -> &str {
        &self.own_creator_id
    }

    /// Implementation type handle.
    #[must_use]
    pub fn implementation(&self) -> RecipeImpl {
        self.implementation
    }

    /// Id of the enclosing container, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether `recipe` was produced by this kind: same family, and its
    /// runtime type is this kind's implementation type. Families sharing an
    /// implementation type never match each other's recipes.
    #[must_use]
    pub fn is_instance(&self, recipe: &CustomRecipe) -> bool {
        recipe.family() == self.family && self.implementation.matches(recipe)
    }

    /// Narrows `recipe` to this kind's implementation type `T`.
    pub fn try_cast<'a, T: RecipeVariant>(&self, recipe: &'a CustomRecipe) -> Result<&'a T, CastError> {
        let fail = || CastError {
            key: recipe.key().clone(),
            found: recipe.family(),
            target: T::TYPE_NAME,
        };
        if T::TYPE_NAME != self.implementation.type_name || !self.is_instance(recipe) {
            return Err(fail());
        }
        T::narrow(recipe).ok_or_else(fail)
    }

    /// Narrows `recipe` to `T`.
    ///
    /// # Panics
    ///
    /// Panics if `recipe` is not an instance of this kind's implementation
    /// type `T`. Check [`Self::is_instance`] first.
    #[must_use]
    pub fn cast<'a, T: RecipeVariant>(&self, recipe: &'a CustomRecipe) -> &'a T {
        match self.try_cast(recipe) {
            Ok(narrowed) => narrowed,
            Err(err) => panic!("{err}"),
        }
    }

    /// Builds a recipe of this kind from a raw document.
    pub fn materialize(&self, key: NamespacedKey, doc: &Document<'_>) -> RecipeResult<CustomRecipe> {
        if !self.implementation.supports(self.family) {
            warn!(kind = %self.id, implementation = self.implementation.type_name, "Implementation cannot represent kind");
            return Err(RecipeError::InstantiationFailure {
                kind: self.id.clone(),
                reason: format!("{} does not support {}", self.implementation.type_name, self.family),
            });
        }

        let recipe = (self.implementation.construct)(key, self.family, doc)?;
        if !self.is_instance(&recipe) {
            return Err(RecipeError::InstantiationFailure {
                kind: self.id.clone(),
                reason: format!(
                    "{} produced a {} recipe",
                    self.implementation.type_name,
                    recipe.family()
                ),
            });
        }

        debug!(kind = %self.id, key = %recipe.key(), "Materialized recipe");
        Ok(recipe)
    }
}

/// A kind viewed through the registry that owns it.
#[derive(Debug, Clone, Copy)]
pub struct KindRef<'r> {
    registry: &'r RecipeTypeRegistry,
    kind: &'r RecipeKind,
}

impl<'r> KindRef<'r> {
    pub(crate) fn new(registry: &'r RecipeTypeRegistry, kind: &'r RecipeKind) -> Self {
        Self { registry, kind }
    }

    /// The underlying kind.
    #[must_use]
    pub fn kind(&self) -> &'r RecipeKind {
        self.kind
    }

    /// Enclosing container, looked up by id.
    #[must_use]
    pub fn container(&self) -> Option<ContainerRef<'r>> {
        self.kind
            .parent_id()
            .and_then(|id| self.registry.lookup_container(id))
    }

    /// The container's creator id if the kind has one, else its own.
    ///
    /// Derived on every call.
    #[must_use]
    pub fn creator_id(&self) -> &'r str {
        match self.container() {
            Some(container) => container.inner().creator_id(),
            None => self.kind.own_creator_id(),
        }
    }
}

impl Deref for KindRef<'_> {
    type Target = RecipeKind;

    fn deref(&self) -> &Self::Target {
        self.kind
    }
}
