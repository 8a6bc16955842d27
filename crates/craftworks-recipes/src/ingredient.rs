//! Ingredient specifications and the resolution engine.
//!
//! An [`IngredientSpec`] declares what can fill one recipe slot: an ordered
//! list of explicit item references plus a set of tag identities. Resolving
//! it produces the deduplicated candidate list callers display and match
//! against. The list is a cache: it is rebuilt by [`IngredientSpec::resolve`]
//! and every mutation marks it stale. Readers taking a [`ResolveContext`]
//! rebuild a stale cache before answering; only
//! [`IngredientSpec::choices_for`] serves the cache as is.
//!
//! [`SharedIngredient`] is the form handed to concurrent editors and readers.

use ahash::AHashSet;
use craftworks_common::{DocumentError, NamespacedKey};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::document::Document;
use crate::item::{ItemCandidate, ItemReference, ItemResolver, ResolveContext, Viewer};
use crate::validation::{self, ValidationReport};

// ============================================================================
// Choice cache
// ============================================================================

/// Snapshot of resolved choices plus its staleness flag.
#[derive(Debug, Clone)]
struct ChoiceCache {
    snapshot: Arc<[ItemCandidate]>,
    stale: bool,
}

impl Default for ChoiceCache {
    fn default() -> Self {
        Self {
            snapshot: Arc::from(Vec::new()),
            stale: true,
        }
    }
}

/// What to render for an ingredient when showing it as a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayItem {
    /// A concrete resolved item.
    Item(ItemCandidate),
    /// Only tags are declared and none resolved yet.
    TagPlaceholder {
        /// First declared tag.
        tag: NamespacedKey,
    },
    /// Nothing to show.
    Air,
}

impl DisplayItem {
    /// Whether this is the empty sentinel.
    #[must_use]
    pub fn is_air(&self) -> bool {
        matches!(self, Self::Air)
    }
}

// ============================================================================
// IngredientSpec
// ============================================================================

/// Declarative requirement for one recipe slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientSpec {
    items: Vec<ItemReference>,
    tags: Vec<NamespacedKey>,
    #[serde(skip)]
    cache: ChoiceCache,
}

impl PartialEq for IngredientSpec {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && self.tags == other.tags
    }
}

impl IngredientSpec {
    /// Creates an empty specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a specification from explicit items and tags. Duplicate tags
    /// are dropped, keeping the first occurrence.
    #[must_use]
    pub fn with(items: Vec<ItemReference>, tags: impl IntoIterator<Item = NamespacedKey>) -> Self {
        let mut spec = Self {
            items,
            ..Self::default()
        };
        for tag in tags {
            spec.push_tag(tag);
        }
        spec
    }

    /// Creates a specification from explicit items only.
    #[must_use]
    pub fn from_items(items: Vec<ItemReference>) -> Self {
        Self::with(items, [])
    }

    /// Creates a specification from tags only.
    #[must_use]
    pub fn from_tags(tags: impl IntoIterator<Item = NamespacedKey>) -> Self {
        Self::with(Vec::new(), tags)
    }

    /// Reads `{ "items": [...], "tags": [...] }`. Both lists are optional;
    /// an ingredient with neither is accepted here and flagged by validation.
    pub fn from_document(doc: &Document<'_>) -> Result<Self, DocumentError> {
        let items = match doc.optional("items") {
            Some(list) => list
                .as_list()?
                .iter()
                .map(ItemReference::from_document)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let tags = match doc.optional("tags") {
            Some(list) => list
                .as_list()?
                .iter()
                .map(Document::as_key)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        Ok(Self::with(items, tags))
    }

    /// Explicit item alternatives in priority order.
    #[must_use]
    pub fn items(&self) -> &[ItemReference] {
        &self.items
    }

    /// Declared tags in insertion order.
    #[must_use]
    pub fn tags(&self) -> &[NamespacedKey] {
        &self.tags
    }

    // ------------------------------------------------------------------
    // Mutation. Every entry point below marks the cache stale.
    // ------------------------------------------------------------------

    /// Slot editing: replace the item at `slot`, remove it when `candidate`
    /// is `None`, or append when `slot` is at or past the end.
    pub fn put(&mut self, slot: usize, candidate: Option<&ItemCandidate>) {
        match (slot < self.items.len(), candidate) {
            (true, Some(candidate)) => self.items[slot] = candidate.reference.clone(),
            (true, None) => {
                self.items.remove(slot);
            }
            (false, Some(candidate)) => self.items.push(candidate.reference.clone()),
            (false, None) => return,
        }
        self.invalidate();
    }

    /// Replaces every explicit item.
    pub fn set_items(&mut self, items: Vec<ItemReference>) {
        self.items = items;
        self.invalidate();
    }

    /// Replaces every tag.
    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = NamespacedKey>) {
        self.tags.clear();
        for tag in tags {
            self.push_tag(tag);
        }
        self.invalidate();
    }

    /// Adds a tag; returns false if it was already declared.
    pub fn add_tag(&mut self, tag: NamespacedKey) -> bool {
        let added = self.push_tag(tag);
        if added {
            self.invalidate();
        }
        added
    }

    /// Removes a tag; returns false if it was not declared.
    pub fn remove_tag(&mut self, tag: &NamespacedKey) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        let removed = self.tags.len() != before;
        if removed {
            self.invalidate();
        }
        removed
    }

    fn push_tag(&mut self, tag: NamespacedKey) -> bool {
        if self.tags.contains(&tag) {
            false
        } else {
            self.tags.push(tag);
            true
        }
    }

    fn invalidate(&mut self) {
        self.cache.stale = true;
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Whether the cached choices predate the latest mutation.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.cache.stale
    }

    /// Rebuilds the cached choices from the current items and tags.
    pub fn resolve(&mut self, ctx: ResolveContext<'_>) -> Arc<[ItemCandidate]> {
        let snapshot: Arc<[ItemCandidate]> = resolve_choices(&self.items, &self.tags, ctx).into();
        self.cache = ChoiceCache {
            snapshot: Arc::clone(&snapshot),
            stale: false,
        };
        snapshot
    }

    /// Current choices. Resolves first if a mutation happened since the
    /// last resolve, so the result always reflects this instance's edits.
    pub fn choices(&mut self, ctx: ResolveContext<'_>) -> Arc<[ItemCandidate]> {
        if self.cache.stale {
            self.resolve(ctx)
        } else {
            Arc::clone(&self.cache.snapshot)
        }
    }

    /// Cached choices, or `None` if they predate the latest mutation.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<[ItemCandidate]>> {
        (!self.cache.stale).then(|| Arc::clone(&self.cache.snapshot))
    }

    /// Cached choices the viewer may see. Reads the cache, never resolves,
    /// and may lag behind the latest mutation.
    #[must_use]
    pub fn choices_for(&self, viewer: &dyn Viewer) -> Vec<ItemCandidate> {
        filter_visible(&self.cache.snapshot, viewer)
    }

    /// Number of current choices.
    pub fn len(&mut self, ctx: ResolveContext<'_>) -> usize {
        self.choices(ctx).len()
    }

    /// True when nothing is declared, or when resolution yields no real
    /// item. An ingredient with only dangling references is empty.
    pub fn is_empty(&mut self, ctx: ResolveContext<'_>) -> bool {
        (self.items.is_empty() && self.tags.is_empty())
            || self.choices(ctx).iter().all(ItemCandidate::is_air)
    }

    /// First current choice; else a placeholder for the first tag; else air.
    pub fn representative_display(&mut self, ctx: ResolveContext<'_>) -> DisplayItem {
        if let Some(first) = self.choices(ctx).first() {
            DisplayItem::Item(first.clone())
        } else if let Some(tag) = self.tags.first() {
            DisplayItem::TagPlaceholder { tag: tag.clone() }
        } else {
            DisplayItem::Air
        }
    }

    /// Display for one explicit slot; air if out of range or unresolvable.
    #[must_use]
    pub fn slot_display(&self, slot: usize, items: &dyn ItemResolver) -> DisplayItem {
        self.items
            .get(slot)
            .and_then(|reference| items.resolve(reference))
            .filter(|candidate| !candidate.is_air())
            .map_or(DisplayItem::Air, DisplayItem::Item)
    }

    /// Integrity check against the current external state.
    #[must_use]
    pub fn validate(&self, ctx: ResolveContext<'_>) -> ValidationReport {
        validation::validate_ingredient(self, ctx)
    }
}

/// Explicit items first in their order, then each tag's members in tag
/// order; first occurrence of a candidate id wins.
fn resolve_choices(
    items: &[ItemReference],
    tags: &[NamespacedKey],
    ctx: ResolveContext<'_>,
) -> Vec<ItemCandidate> {
    let mut seen = AHashSet::new();
    let mut choices = Vec::new();

    for reference in items {
        match ctx.items.resolve(reference) {
            Some(candidate) if !candidate.is_air() => {
                if seen.insert(candidate.id.clone()) {
                    choices.push(candidate);
                }
            }
            _ => debug!(%reference, "Dropping unresolvable ingredient item"),
        }
    }

    for tag in tags {
        let Some(definition) = ctx.tags.resolve_tag(tag) else {
            debug!(%tag, "Unknown tag contributes no choices");
            continue;
        };
        for member in definition.members() {
            if !member.is_air() && seen.insert(member.id.clone()) {
                choices.push(member.clone());
            }
        }
    }

    trace!(count = choices.len(), "Resolved ingredient choices");
    choices
}

fn filter_visible(choices: &[ItemCandidate], viewer: &dyn Viewer) -> Vec<ItemCandidate> {
    choices
        .iter()
        .filter(|candidate| candidate.visible_to(viewer))
        .cloned()
        .collect()
}

// ============================================================================
// SharedIngredient
// ============================================================================

/// An ingredient edited and read from several threads.
///
/// Edits are serialized under one mutex, and each edit resolves and
/// publishes a new snapshot before the mutex is released, so an editor never
/// reads choices older than its own edit. Readers only take the snapshot
/// lock long enough to clone an `Arc`.
///
/// Resolution runs while the edit mutex is held. Providers must therefore be
/// in-memory; a provider backed by I/O would stall other editors.
#[derive(Debug)]
pub struct SharedIngredient {
    spec: Mutex<IngredientSpec>,
    published: RwLock<Arc<[ItemCandidate]>>,
    version: AtomicU64,
}

impl SharedIngredient {
    /// Wraps a specification, resolving it first.
    #[must_use]
    pub fn new(mut spec: IngredientSpec, ctx: ResolveContext<'_>) -> Self {
        let snapshot = spec.resolve(ctx);
        Self {
            spec: Mutex::new(spec),
            published: RwLock::new(snapshot),
            version: AtomicU64::new(1),
        }
    }

    /// Applies `edit` and republishes, all under the edit lock.
    pub fn edit<R>(&self, ctx: ResolveContext<'_>, edit: impl FnOnce(&mut IngredientSpec) -> R) -> R {
        let mut spec = self.spec.lock();
        let out = edit(&mut spec);
        let snapshot = spec.resolve(ctx);
        *self.published.write() = snapshot;
        self.version.fetch_add(1, Ordering::Release);
        out
    }

    /// [`IngredientSpec::put`] followed by a resolve.
    pub fn put(&self, ctx: ResolveContext<'_>, slot: usize, candidate: Option<&ItemCandidate>) {
        self.edit(ctx, |spec| spec.put(slot, candidate));
    }

    /// Re-resolves after external item or tag definitions changed.
    pub fn refresh(&self, ctx: ResolveContext<'_>) -> Arc<[ItemCandidate]> {
        self.edit(ctx, |spec| spec.invalidate());
        self.choices()
    }

    /// Latest published choices.
    #[must_use]
    pub fn choices(&self) -> Arc<[ItemCandidate]> {
        Arc::clone(&self.published.read())
    }

    /// Latest published choices the viewer may see.
    #[must_use]
    pub fn choices_for(&self, viewer: &dyn Viewer) -> Vec<ItemCandidate> {
        filter_visible(&self.choices(), viewer)
    }

    /// Number of snapshots published so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Copy of the current specification.
    #[must_use]
    pub fn spec(&self) -> IngredientSpec {
        self.spec.lock().clone()
    }

    /// Unwraps the specification.
    #[must_use]
    pub fn into_inner(self) -> IngredientSpec {
        self.spec.into_inner()
    }
}
