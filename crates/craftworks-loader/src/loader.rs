//! Recipe document loading.
//!
//! This module provides:
//! - Kind resolution from a document's kind field (kind or container id)
//! - Materialization, ingredient resolution and validation on load
//! - Skip-and-report handling of bad documents with per-cause statistics
//! - Parsing of JSON and TOML text the host already read

use craftworks_common::NamespacedKey;
use craftworks_recipes::{
    CustomRecipe, Document, LoaderTarget, RawNode, RecipeError, RecipeReport,
    RecipeTypeRegistry, ResolveContext, Verdict,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::book::RecipeBook;
use crate::config::LoaderConfig;

/// Errors that can occur while loading one recipe document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The kind field names no kind or container.
    #[error("Unknown recipe kind '{0}'")]
    UnknownKind(String),

    /// Materialization failed.
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// Failed to parse JSON.
    #[error("Failed to parse recipe JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse recipe TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A recipe with this key is already loaded.
    #[error("Duplicate recipe key: {0}")]
    DuplicateRecipe(NamespacedKey),

    /// Validation verdict not accepted by the loader config.
    #[error("Recipe {key} rejected as {verdict}")]
    Rejected {
        /// Recipe key.
        key: NamespacedKey,
        /// Its verdict.
        verdict: Verdict,
        /// Faults found.
        report: Box<RecipeReport>,
    },

    /// No registry was installed for the process.
    #[error("Recipe type registry is not installed")]
    RegistryNotInstalled,
}

/// Result type for recipe loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Loader statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Documents offered to the loader.
    pub documents: usize,
    /// Recipes stored in the book.
    pub loaded: usize,
    /// Stored recipes whose verdict was PENDING.
    pub pending: usize,
    /// Documents with missing or ill-typed fields.
    pub malformed: usize,
    /// Documents whose kind failed to construct a recipe.
    pub instantiation_failures: usize,
    /// Documents naming no known kind or container.
    pub unknown_kinds: usize,
    /// Recipes dropped by the validation policy.
    pub rejected: usize,
    /// Documents whose key was already loaded.
    pub duplicates: usize,
}

impl LoaderStats {
    /// Documents that did not produce a stored recipe.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.documents - self.loaded
    }
}

/// Turns raw documents into recipes in a [`RecipeBook`].
#[derive(Debug)]
pub struct RecipeLoader<'r> {
    registry: &'r RecipeTypeRegistry,
    config: LoaderConfig,
    book: RecipeBook,
    stats: LoaderStats,
}

impl<'r> RecipeLoader<'r> {
    /// Creates a loader over `registry`.
    #[must_use]
    pub fn new(registry: &'r RecipeTypeRegistry, config: LoaderConfig) -> Self {
        debug!(kind_field = %config.kind_field, "Initializing recipe loader");
        Self {
            registry,
            config,
            book: RecipeBook::new(),
            stats: LoaderStats::default(),
        }
    }

    /// Registry used to resolve kinds.
    #[must_use]
    pub fn registry(&self) -> &'r RecipeTypeRegistry {
        self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loaded recipes.
    #[must_use]
    pub fn book(&self) -> &RecipeBook {
        &self.book
    }

    /// Loaded recipes, mutable.
    pub fn book_mut(&mut self) -> &mut RecipeBook {
        &mut self.book
    }

    /// Consumes the loader, keeping the book.
    #[must_use]
    pub fn into_book(self) -> RecipeBook {
        self.book
    }

    /// Statistics so far.
    #[must_use]
    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Loads one document and stores the recipe. Returns its verdict.
    pub fn load_document(
        &mut self,
        key: NamespacedKey,
        node: &dyn RawNode,
        ctx: ResolveContext<'_>,
    ) -> LoadResult<Verdict> {
        self.stats.documents += 1;
        let result = self.try_load(key, node, ctx);
        if let Err(err) = &result {
            self.record_failure(err);
        }
        result
    }

    fn try_load(
        &mut self,
        key: NamespacedKey,
        node: &dyn RawNode,
        ctx: ResolveContext<'_>,
    ) -> LoadResult<Verdict> {
        if !self.config.allow_replace && self.book.contains(&key) {
            return Err(LoadError::DuplicateRecipe(key));
        }

        let doc = Document::new(node);
        let kind_id = doc
            .required_str(&self.config.kind_field)
            .map_err(RecipeError::from)?;
        let target = self
            .registry
            .resolve_loader(kind_id)
            .ok_or_else(|| LoadError::UnknownKind(kind_id.to_string()))?;

        let mut recipe = match target {
            LoaderTarget::Kind(kind) => kind.materialize(key, &doc)?,
            LoaderTarget::Container(container) => container.materialize(key, &doc)?,
        };
        self.log_extra_fields(&recipe, &doc);

        recipe.resolve_all(ctx);
        let report = recipe.validate(ctx);
        let verdict = report.verdict;
        let rejected = match verdict {
            Verdict::Valid => false,
            Verdict::Pending => self.config.reject_pending,
            Verdict::Invalid => self.config.reject_invalid,
        };
        if rejected {
            return Err(LoadError::Rejected {
                key: recipe.key().clone(),
                verdict,
                report: Box::new(report),
            });
        }
        for (slot, fault) in report.faults() {
            debug!(key = %recipe.key(), slot, %fault, "Recipe loaded with fault");
        }

        if verdict == Verdict::Pending {
            self.stats.pending += 1;
        }
        self.stats.loaded += 1;
        if let Some(previous) = self.book.insert(recipe) {
            info!(key = %previous.key(), "Replaced loaded recipe");
        }
        Ok(verdict)
    }

    fn log_extra_fields(&self, recipe: &CustomRecipe, doc: &Document<'_>) {
        let mut known: Vec<&str> = CustomRecipe::known_fields(recipe.family());
        known.push(self.config.kind_field.as_str());
        let extra = doc.extra_fields(&known);
        if !extra.is_empty() {
            debug!(key = %recipe.key(), ?extra, "Ignoring unknown recipe fields");
        }
    }

    fn record_failure(&mut self, err: &LoadError) {
        match err {
            LoadError::UnknownKind(_)
            | LoadError::Recipe(RecipeError::UnknownKind(_) | RecipeError::NoDispatchRule(_)) => {
                self.stats.unknown_kinds += 1;
                warn!("Skipping recipe: {err}");
            }
            LoadError::Recipe(RecipeError::InstantiationFailure { .. }) => {
                self.stats.instantiation_failures += 1;
                error!("Skipping recipe: {err}");
            }
            LoadError::Recipe(RecipeError::MalformedDocument(_))
            | LoadError::Json(_)
            | LoadError::Toml(_) => {
                self.stats.malformed += 1;
                warn!("Skipping recipe: {err}");
            }
            LoadError::DuplicateRecipe(_) => {
                self.stats.duplicates += 1;
                warn!("Skipping recipe: {err}");
            }
            LoadError::Rejected { report, .. } => {
                self.stats.rejected += 1;
                warn!("Skipping recipe: {err}");
                for (slot, fault) in report.faults() {
                    warn!("  {slot}: {fault}");
                }
            }
            LoadError::RegistryNotInstalled => {}
        }
    }

    /// Loads several documents, skipping the ones that fail. Returns the
    /// number of recipes stored.
    pub fn load_batch<'d>(
        &mut self,
        documents: impl IntoIterator<Item = (NamespacedKey, &'d dyn RawNode)>,
        ctx: ResolveContext<'_>,
    ) -> usize {
        let before = self.stats.loaded;
        for (key, node) in documents {
            // Failures are counted and logged by load_document.
            let _ = self.load_document(key, node, ctx);
        }
        let loaded = self.stats.loaded - before;
        info!(
            loaded,
            total = self.book.len(),
            failed = self.stats.failed(),
            pending = self.stats.pending,
            "Loaded recipe batch"
        );
        loaded
    }

    /// Parses JSON text and loads it.
    pub fn load_json_str(
        &mut self,
        key: NamespacedKey,
        text: &str,
        ctx: ResolveContext<'_>,
    ) -> LoadResult<Verdict> {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => self.load_document(key, &value, ctx),
            Err(e) => self.parse_failure(e.into()),
        }
    }

    /// Parses TOML text and loads it.
    pub fn load_toml_str(
        &mut self,
        key: NamespacedKey,
        text: &str,
        ctx: ResolveContext<'_>,
    ) -> LoadResult<Verdict> {
        match text.parse::<toml::Table>() {
            Ok(table) => self.load_document(key, &toml::Value::Table(table), ctx),
            Err(e) => self.parse_failure(e.into()),
        }
    }

    fn parse_failure(&mut self, err: LoadError) -> LoadResult<Verdict> {
        self.stats.documents += 1;
        self.record_failure(&err);
        Err(err)
    }
}

impl RecipeLoader<'static> {
    /// Creates a loader over the installed process-wide registry.
    pub fn with_global(config: LoaderConfig) -> LoadResult<Self> {
        RecipeTypeRegistry::global()
            .map(|registry| Self::new(registry, config))
            .ok_or(LoadError::RegistryNotInstalled)
    }
}
