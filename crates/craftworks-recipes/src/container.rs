//! Recipe containers: groups of kinds sharing a supertype.

use craftworks_common::NamespacedKey;
use std::ops::Deref;
use tracing::debug;

use crate::document::Document;
use crate::error::{CastError, RecipeError, RecipeResult};
use crate::family::RecipeFamily;
use crate::kind::KindRef;
use crate::recipe::{CustomRecipe, RecipeSupertype, SupertypeRef};
use crate::registry::RecipeTypeRegistry;

/// How a container picks a member kind from an untyped document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRule {
    /// Boolean discriminator: absent or `false` selects `members[0]`,
    /// `true` selects `members[1]`. A string counts as `true` only when it
    /// reads `true`; numbers, lists and objects are malformed.
    Flag {
        /// Discriminator field name.
        field: String,
    },
}

impl DispatchRule {
    /// Boolean discriminator on `field`.
    #[must_use]
    pub fn flag(field: impl Into<String>) -> Self {
        Self::Flag {
            field: field.into(),
        }
    }

    /// Number of members the rule chooses between.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Flag { .. } => 2,
        }
    }

    /// Index of the member `doc` represents.
    pub fn select(&self, doc: &Document<'_>) -> RecipeResult<usize> {
        match self {
            Self::Flag { field } => Ok(usize::from(doc.flag_or(field, false)?)),
        }
    }
}

/// Declaration of a container, consumed by
/// [`RecipeTypeRegistry::register_container`].
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub(crate) id: String,
    pub(crate) creator_id: Option<String>,
    pub(crate) supertype: RecipeSupertype,
    pub(crate) members: Vec<RecipeFamily>,
    pub(crate) dispatch: Option<DispatchRule>,
}

impl ContainerSpec {
    /// Container `id` whose members all satisfy `supertype`. Member order is
    /// the dispatch order.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        supertype: RecipeSupertype,
        members: impl IntoIterator<Item = RecipeFamily>,
    ) -> Self {
        Self {
            id: id.into(),
            creator_id: None,
            supertype,
            members: members.into_iter().collect(),
            dispatch: None,
        }
    }

    /// Creator id shared by every member; defaults to the container id.
    #[must_use]
    pub fn creator_id(mut self, creator_id: impl Into<String>) -> Self {
        self.creator_id = Some(creator_id.into());
        self
    }

    /// Dispatch rule used when loading documents through the container.
    #[must_use]
    pub fn dispatch(mut self, rule: DispatchRule) -> Self {
        self.dispatch = Some(rule);
        self
    }
}

/// A registered container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeContainer {
    id: String,
    creator_id: String,
    supertype: RecipeSupertype,
    members: Vec<RecipeFamily>,
    dispatch: Option<DispatchRule>,
}

impl RecipeContainer {
    pub(crate) fn from_spec(spec: ContainerSpec) -> Self {
        Self {
            creator_id: spec.creator_id.unwrap_or_else(|| spec.id.clone()),
            id: spec.id,
            supertype: spec.supertype,
            members: spec.members,
            dispatch: spec.dispatch,
        }
    }

    /// Container id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creator id reported by every member kind.
    #[must_use]
    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    /// Supertype every member satisfies.
    #[must_use]
    pub fn supertype(&self) -> RecipeSupertype {
        self.supertype
    }

    /// Member families in declaration order.
    #[must_use]
    pub fn member_families(&self) -> &[RecipeFamily] {
        &self.members
    }

    /// Whether `family` is a member.
    #[must_use]
    pub fn has(&self, family: RecipeFamily) -> bool {
        self.members.contains(&family)
    }

    /// Dispatch rule, if the container can load documents itself.
    #[must_use]
    pub fn dispatch(&self) -> Option<&DispatchRule> {
        self.dispatch.as_ref()
    }
}

/// A container viewed through the registry that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ContainerRef<'r> {
    registry: &'r RecipeTypeRegistry,
    container: &'r RecipeContainer,
}

impl<'r> ContainerRef<'r> {
    pub(crate) fn new(registry: &'r RecipeTypeRegistry, container: &'r RecipeContainer) -> Self {
        Self {
            registry,
            container,
        }
    }

    /// The underlying container.
    #[must_use]
    pub fn inner(&self) -> &'r RecipeContainer {
        self.container
    }

    /// Member kinds in declaration order.
    #[must_use]
    pub fn members(&self) -> Vec<KindRef<'r>> {
        self.container
            .members
            .iter()
            .filter_map(|family| self.registry.kind(*family))
            .collect()
    }

    /// Whether `recipe`'s runtime type matches any member's implementation.
    #[must_use]
    pub fn is_instance(&self, recipe: &CustomRecipe) -> bool {
        self.members().iter().any(|kind| kind.is_instance(recipe))
    }

    /// Narrows `recipe` to the container's supertype.
    pub fn try_cast<'a>(&self, recipe: &'a CustomRecipe) -> Result<SupertypeRef<'a>, CastError> {
        let narrowed = if self.is_instance(recipe) {
            self.container.supertype.narrow(recipe)
        } else {
            None
        };
        narrowed.ok_or_else(|| CastError {
            key: recipe.key().clone(),
            found: recipe.family(),
            target: self.container.supertype.name(),
        })
    }

    /// Narrows `recipe` to the container's supertype.
    ///
    /// # Panics
    ///
    /// Panics if `recipe` is not an instance of this container. Check
    /// [`Self::is_instance`] first.
    #[must_use]
    pub fn cast<'a>(&self, recipe: &'a CustomRecipe) -> SupertypeRef<'a> {
        match self.try_cast(recipe) {
            Ok(narrowed) => narrowed,
            Err(err) => panic!("{err}"),
        }
    }

    /// Member kind a document represents, chosen by the dispatch rule.
    pub fn select(&self, doc: &Document<'_>) -> RecipeResult<KindRef<'r>> {
        let rule = self
            .container
            .dispatch
            .as_ref()
            .ok_or_else(|| RecipeError::NoDispatchRule(self.container.id.clone()))?;
        let index = rule.select(doc)?;
        let family = self.container.members.get(index).copied().ok_or_else(|| {
            RecipeError::InstantiationFailure {
                kind: self.container.id.clone(),
                reason: format!("dispatch selected missing member {index}"),
            }
        })?;
        let kind = self
            .registry
            .kind(family)
            .ok_or_else(|| RecipeError::UnknownKind(family.id().to_string()))?;
        debug!(container = %self.container.id, kind = kind.id(), "Dispatched document");
        Ok(kind)
    }

    /// Dispatches and materializes a document.
    pub fn materialize(&self, key: NamespacedKey, doc: &Document<'_>) -> RecipeResult<CustomRecipe> {
        self.select(doc)?.materialize(key, doc)
    }
}

impl Deref for ContainerRef<'_> {
    type Target = RecipeContainer;

    fn deref(&self) -> &Self::Target {
        self.container
    }
}
