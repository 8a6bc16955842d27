//! Item references, resolved candidates and the resolution providers.
//!
//! This module provides:
//! - [`ItemReference`]: what an ingredient author wrote (vanilla material or
//!   a third-party provider's item)
//! - [`ItemCandidate`]: a concrete item a reference or tag resolved to
//! - Provider traits the host item/tag/permission subsystems implement
//! - In-memory [`ItemCatalog`] and [`TagCatalog`] providers

use ahash::{AHashMap, AHashSet};
use craftworks_common::{DocumentError, NamespacedKey, PermissionId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::{Document, NodeType};

// ============================================================================
// References and candidates
// ============================================================================

/// Reference to an item definition as written in a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemReference {
    /// Built-in material, e.g. `minecraft:iron_ingot`.
    Vanilla(NamespacedKey),
    /// Item owned by a third-party provider that may register late.
    External {
        /// Provider name (plugin or data pack id).
        provider: String,
        /// Item id within the provider.
        id: NamespacedKey,
    },
}

impl ItemReference {
    /// Vanilla reference to a material.
    #[must_use]
    pub fn vanilla(material: NamespacedKey) -> Self {
        Self::Vanilla(material)
    }

    /// Third-party reference.
    #[must_use]
    pub fn external(provider: impl Into<String>, id: NamespacedKey) -> Self {
        Self::External {
            provider: provider.into(),
            id,
        }
    }

    /// Whether this is a built-in reference.
    #[must_use]
    pub fn is_vanilla(&self) -> bool {
        matches!(self, Self::Vanilla(_))
    }

    /// Referenced item id.
    #[must_use]
    pub fn id(&self) -> &NamespacedKey {
        match self {
            Self::Vanilla(id) | Self::External { id, .. } => id,
        }
    }

    /// Reads a reference: a string is a vanilla material key, an object is
    /// `{ "provider": "...", "id": "ns:key" }`.
    pub fn from_document(doc: &Document<'_>) -> Result<Self, DocumentError> {
        match doc.node_type() {
            NodeType::String => doc.as_key().map(Self::Vanilla),
            NodeType::Object => {
                let provider = doc.required_str("provider")?;
                if provider.trim().is_empty() {
                    return Err(DocumentError::invalid(
                        doc.field_path("provider"),
                        "provider cannot be empty",
                    ));
                }
                let id = doc.required("id")?.as_key()?;
                Ok(Self::external(provider, id))
            }
            other => Err(DocumentError::WrongType {
                field: doc.path().to_string(),
                expected: "string or object",
                found: other.name(),
            }),
        }
    }
}

impl fmt::Display for ItemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vanilla(id) => write!(f, "{id}"),
            Self::External { provider, id } => write!(f, "{provider}/{id}"),
        }
    }
}

/// A concrete item usable to satisfy an ingredient.
///
/// Identity is the item id: two candidates with the same id are the same
/// choice regardless of how they were reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCandidate {
    /// Item id.
    pub id: NamespacedKey,
    /// Reference that produces this item.
    pub reference: ItemReference,
    /// Permission a viewer needs to see this item.
    pub permission: Option<PermissionId>,
}

impl ItemCandidate {
    /// Candidate for a built-in material.
    #[must_use]
    pub fn vanilla(material: NamespacedKey) -> Self {
        Self {
            id: material.clone(),
            reference: ItemReference::Vanilla(material),
            permission: None,
        }
    }

    /// Candidate for a third-party item.
    #[must_use]
    pub fn external(provider: impl Into<String>, id: NamespacedKey) -> Self {
        Self {
            reference: ItemReference::external(provider, id.clone()),
            id,
            permission: None,
        }
    }

    /// Requires a permission to view this candidate.
    #[must_use]
    pub fn with_permission(mut self, permission: PermissionId) -> Self {
        self.permission = Some(permission);
        self
    }

    /// Permission required to view this candidate, if any.
    #[must_use]
    pub fn requires_permission(&self) -> Option<&PermissionId> {
        self.permission.as_ref()
    }

    /// Whether this is the air placeholder.
    #[must_use]
    pub fn is_air(&self) -> bool {
        self.id.is_air()
    }

    /// Whether `viewer` may see this candidate.
    #[must_use]
    pub fn visible_to(&self, viewer: &dyn Viewer) -> bool {
        self.permission
            .as_ref()
            .map_or(true, |perm| viewer.has_permission(perm))
    }
}

// ============================================================================
// Provider contracts
// ============================================================================

/// Resolves item references to concrete candidates.
pub trait ItemResolver: Send + Sync {
    /// Resolves a reference; `None` when the referenced item is unknown.
    fn resolve(&self, reference: &ItemReference) -> Option<ItemCandidate>;

    /// Candidate for a built-in material, used to expand built-in tags.
    fn material_candidate(&self, material: &NamespacedKey) -> ItemCandidate {
        ItemCandidate::vanilla(material.clone())
    }
}

/// A tag and its member items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    id: NamespacedKey,
    members: Vec<ItemCandidate>,
}

impl TagDefinition {
    /// Creates a tag definition.
    #[must_use]
    pub fn new(id: NamespacedKey, members: Vec<ItemCandidate>) -> Self {
        Self { id, members }
    }

    /// Tag id.
    #[must_use]
    pub fn id(&self) -> &NamespacedKey {
        &self.id
    }

    /// Member items in definition order.
    #[must_use]
    pub fn members(&self) -> &[ItemCandidate] {
        &self.members
    }

    /// Whether this is a built-in tag.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.id.is_minecraft()
    }
}

/// Resolves tag identities to their definitions.
pub trait TagResolver: Send + Sync {
    /// Looks up a tag; `None` when no such tag is defined.
    fn resolve_tag(&self, id: &NamespacedKey) -> Option<&TagDefinition>;
}

/// Someone looking at ingredient choices.
pub trait Viewer {
    /// Whether the viewer holds `permission`.
    fn has_permission(&self, permission: &PermissionId) -> bool;
}

/// A viewer holding every permission (console, recipe validation).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl Viewer for Unrestricted {
    fn has_permission(&self, _permission: &PermissionId) -> bool {
        true
    }
}

/// A viewer with an explicit permission set.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    granted: AHashSet<PermissionId>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a permission.
    #[must_use]
    pub fn grant(mut self, permission: PermissionId) -> Self {
        self.granted.insert(permission);
        self
    }
}

impl Viewer for PermissionSet {
    fn has_permission(&self, permission: &PermissionId) -> bool {
        self.granted.contains(permission)
    }
}

/// The external state ingredient resolution reads.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Item provider.
    pub items: &'a dyn ItemResolver,
    /// Tag provider.
    pub tags: &'a dyn TagResolver,
}

impl<'a> ResolveContext<'a> {
    /// Bundles the two providers.
    #[must_use]
    pub fn new(items: &'a dyn ItemResolver, tags: &'a dyn TagResolver) -> Self {
        Self { items, tags }
    }
}

impl fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext").finish_non_exhaustive()
    }
}

// ============================================================================
// In-memory providers
// ============================================================================

/// In-memory item provider.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    materials: AHashSet<NamespacedKey>,
    external: AHashMap<(String, NamespacedKey), ItemCandidate>,
    permissions: AHashMap<NamespacedKey, PermissionId>,
}

impl ItemCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a built-in material.
    pub fn add_material(&mut self, material: NamespacedKey) -> &mut Self {
        self.materials.insert(material);
        self
    }

    /// Registers a third-party item under its provider.
    pub fn add_external(&mut self, provider: impl Into<String>, id: NamespacedKey) -> &mut Self {
        let provider = provider.into();
        let candidate = ItemCandidate::external(provider.clone(), id.clone());
        self.external.insert((provider, id), candidate);
        self
    }

    /// Removes a third-party item, e.g. when its provider unloads.
    pub fn remove_external(&mut self, provider: &str, id: &NamespacedKey) -> bool {
        self.external
            .remove(&(provider.to_string(), id.clone()))
            .is_some()
    }

    /// Requires `permission` to view the item `id`.
    pub fn set_permission(&mut self, id: NamespacedKey, permission: PermissionId) -> &mut Self {
        self.permissions.insert(id, permission);
        self
    }

    fn decorate(&self, mut candidate: ItemCandidate) -> ItemCandidate {
        if let Some(perm) = self.permissions.get(&candidate.id) {
            candidate.permission = Some(perm.clone());
        }
        candidate
    }
}

impl ItemResolver for ItemCatalog {
    fn resolve(&self, reference: &ItemReference) -> Option<ItemCandidate> {
        match reference {
            ItemReference::Vanilla(material) => self
                .materials
                .contains(material)
                .then(|| self.material_candidate(material)),
            ItemReference::External { provider, id } => self
                .external
                .get(&(provider.clone(), id.clone()))
                .cloned()
                .map(|c| self.decorate(c)),
        }
    }

    fn material_candidate(&self, material: &NamespacedKey) -> ItemCandidate {
        self.decorate(ItemCandidate::vanilla(material.clone()))
    }
}

/// In-memory tag provider.
#[derive(Debug, Default)]
pub struct TagCatalog {
    tags: AHashMap<NamespacedKey, TagDefinition>,
}

impl TagCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or replaces a tag.
    pub fn insert(&mut self, tag: TagDefinition) -> &mut Self {
        self.tags.insert(tag.id().clone(), tag);
        self
    }

    /// Removes a tag.
    pub fn remove(&mut self, id: &NamespacedKey) -> Option<TagDefinition> {
        self.tags.remove(id)
    }

    /// Number of defined tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tags are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl TagResolver for TagCatalog {
    fn resolve_tag(&self, id: &NamespacedKey) -> Option<&TagDefinition> {
        self.tags.get(id)
    }
}
