//! Ingredient and recipe integrity checks.
//!
//! Validation is a separate pass from resolution. It never fails: every
//! problem becomes a [`Fault`] attached to the element that caused it, and
//! the faults fold into one [`Verdict`] with `Invalid > Pending > Valid`.

use craftworks_common::NamespacedKey;
use serde::Serialize;
use std::fmt;

use crate::ingredient::IngredientSpec;
use crate::item::{ItemReference, ResolveContext};

/// Message for a spec that declares neither items nor tags.
pub const MSG_NO_ITEMS_OR_TAGS: &str = "Must have either valid items or valid tags!";
/// Message for a third-party item whose provider has not registered it.
pub const MSG_MISSING_EXTERNAL: &str = "References a missing third-party item!";
/// Message for a built-in item that does not resolve.
pub const MSG_ITEM_NOT_LOADED: &str = "Item could not be loaded!";

/// Message for an unknown tag.
#[must_use]
pub fn tag_not_found(tag: &NamespacedKey) -> String {
    format!("Tag '{tag}' could not be found!")
}

/// Outcome of a check, ordered by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Usable as-is.
    #[default]
    Valid,
    /// Not usable yet; may become valid once a provider registers.
    Pending,
    /// Broken.
    Invalid,
}

impl Verdict {
    /// Whether nothing is wrong.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    /// Whether this is a hard failure.
    #[must_use]
    pub fn is_invalid(self) -> bool {
        self == Self::Invalid
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "VALID",
            Self::Pending => "PENDING",
            Self::Invalid => "INVALID",
        })
    }
}

/// The part of an ingredient a fault is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ElementRef {
    /// The ingredient as a whole.
    Spec,
    /// An explicit item, by index.
    Item(usize),
    /// A declared tag.
    Tag(NamespacedKey),
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec => f.write_str("ingredient"),
            Self::Item(index) => write!(f, "items[{index}]"),
            Self::Tag(tag) => write!(f, "tag {tag}"),
        }
    }
}

/// One problem found by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    /// Faulting element.
    pub element: ElementRef,
    /// Severity.
    pub verdict: Verdict,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.element, self.verdict, self.message)
    }
}

/// Validation result for one ingredient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Aggregate verdict.
    pub verdict: Verdict,
    /// Every fault found, in element order.
    pub faults: Vec<Fault>,
}

impl ValidationReport {
    fn push(&mut self, element: ElementRef, verdict: Verdict, message: impl Into<String>) {
        self.verdict = self.verdict.max(verdict);
        self.faults.push(Fault {
            element,
            verdict,
            message: message.into(),
        });
    }

    /// Whether the ingredient is usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }
}

/// Checks every explicit item and tag of `spec` against the current
/// external state.
#[must_use]
pub fn validate_ingredient(spec: &IngredientSpec, ctx: ResolveContext<'_>) -> ValidationReport {
    let mut report = ValidationReport::default();

    if spec.items().is_empty() && spec.tags().is_empty() {
        report.push(ElementRef::Spec, Verdict::Invalid, MSG_NO_ITEMS_OR_TAGS);
        return report;
    }

    for (index, reference) in spec.items().iter().enumerate() {
        let loaded = ctx
            .items
            .resolve(reference)
            .is_some_and(|candidate| !candidate.is_air());
        if loaded {
            continue;
        }
        match reference {
            ItemReference::Vanilla(_) => {
                report.push(ElementRef::Item(index), Verdict::Invalid, MSG_ITEM_NOT_LOADED);
            }
            ItemReference::External { .. } => {
                report.push(ElementRef::Item(index), Verdict::Pending, MSG_MISSING_EXTERNAL);
            }
        }
    }

    for tag in spec.tags() {
        if ctx.tags.resolve_tag(tag).is_none() {
            report.push(ElementRef::Tag(tag.clone()), Verdict::Invalid, tag_not_found(tag));
        }
    }

    report
}

/// Validation result for a whole recipe: one report per ingredient slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeReport {
    /// Recipe checked.
    pub key: NamespacedKey,
    /// Aggregate over every slot.
    pub verdict: Verdict,
    /// Slot name and its report, for slots that are not valid.
    pub slots: Vec<(String, ValidationReport)>,
}

impl RecipeReport {
    /// Folds per-slot reports. Valid slots are dropped from the listing.
    #[must_use]
    pub fn collect(
        key: NamespacedKey,
        reports: impl IntoIterator<Item = (String, ValidationReport)>,
    ) -> Self {
        let mut verdict = Verdict::Valid;
        let mut slots = Vec::new();
        for (slot, report) in reports {
            verdict = verdict.max(report.verdict);
            if !report.is_valid() {
                slots.push((slot, report));
            }
        }
        Self {
            key,
            verdict,
            slots,
        }
    }

    /// Every fault with its slot name.
    pub fn faults(&self) -> impl Iterator<Item = (&str, &Fault)> + '_ {
        self.slots
            .iter()
            .flat_map(|(slot, report)| report.faults.iter().map(move |f| (slot.as_str(), f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemCandidate, ItemCatalog, TagCatalog, TagDefinition};

    fn key(s: &str) -> NamespacedKey {
        NamespacedKey::parse(s).expect("valid key")
    }

    fn providers() -> (ItemCatalog, TagCatalog) {
        let mut items = ItemCatalog::new();
        items.add_material(key("stick"));
        items.add_external("oraxen", key("gems:ruby"));
        let mut tags = TagCatalog::new();
        tags.insert(TagDefinition::new(
            key("minecraft:logs"),
            vec![ItemCandidate::vanilla(key("oak_log"))],
        ));
        (items, tags)
    }

    #[test]
    fn test_verdict_precedence() {
        assert!(Verdict::Invalid > Verdict::Pending);
        assert!(Verdict::Pending > Verdict::Valid);
        assert_eq!(Verdict::Pending.max(Verdict::Invalid), Verdict::Invalid);
    }

    #[test]
    fn test_empty_spec_is_invalid() {
        let (items, tags) = providers();
        let report = validate_ingredient(&IngredientSpec::new(), ResolveContext::new(&items, &tags));
        assert_eq!(report.verdict, Verdict::Invalid);
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].element, ElementRef::Spec);
        assert_eq!(report.faults[0].message, MSG_NO_ITEMS_OR_TAGS);
    }

    #[test]
    fn test_invalid_beats_pending() {
        let (items, tags) = providers();
        let spec = IngredientSpec::from_items(vec![
            ItemReference::vanilla(key("bedrock")),
            ItemReference::external("itemsadder", key("gems:opal")),
        ]);
        let report = validate_ingredient(&spec, ResolveContext::new(&items, &tags));
        assert_eq!(report.verdict, Verdict::Invalid);
        assert_eq!(report.faults.len(), 2);
        assert_eq!(report.faults[0].message, MSG_ITEM_NOT_LOADED);
        assert_eq!(report.faults[1].element, ElementRef::Item(1));
        assert_eq!(report.faults[1].verdict, Verdict::Pending);
    }

    #[test]
    fn test_only_pending_reports_pending() {
        let (items, tags) = providers();
        let spec = IngredientSpec::from_items(vec![
            ItemReference::vanilla(key("stick")),
            ItemReference::external("itemsadder", key("gems:opal")),
        ]);
        let report = validate_ingredient(&spec, ResolveContext::new(&items, &tags));
        assert_eq!(report.verdict, Verdict::Pending);
        assert_eq!(report.faults[0].message, MSG_MISSING_EXTERNAL);
    }

    #[test]
    fn test_unknown_tag_is_invalid() {
        let (items, tags) = providers();
        let spec = IngredientSpec::from_tags([key("minecraft:logs"), key("custom:gems")]);
        let report = validate_ingredient(&spec, ResolveContext::new(&items, &tags));
        assert_eq!(report.verdict, Verdict::Invalid);
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.faults[0].message, "Tag 'custom:gems' could not be found!");
        assert_eq!(report.faults[0].element, ElementRef::Tag(key("custom:gems")));
    }

    #[test]
    fn test_valid_spec() {
        let (items, tags) = providers();
        let spec = IngredientSpec::with(
            vec![ItemReference::external("oraxen", key("gems:ruby"))],
            [key("minecraft:logs")],
        );
        assert!(validate_ingredient(&spec, ResolveContext::new(&items, &tags)).is_valid());
    }

    #[test]
    fn test_recipe_report_aggregates_slots() {
        let ok = ValidationReport::default();
        let mut pending = ValidationReport::default();
        pending.push(ElementRef::Item(0), Verdict::Pending, MSG_MISSING_EXTERNAL);

        let report = RecipeReport::collect(
            key("custom:test"),
            [("result".to_string(), ok), ("source".to_string(), pending)],
        );
        assert_eq!(report.verdict, Verdict::Pending);
        assert_eq!(report.slots.len(), 1);
        let faults: Vec<_> = report.faults().map(|(slot, _)| slot).collect();
        assert_eq!(faults, ["source"]);
    }

    #[test]
    fn test_fault_display() {
        let fault = Fault {
            element: ElementRef::Item(2),
            verdict: Verdict::Invalid,
            message: MSG_ITEM_NOT_LOADED.to_string(),
        };
        assert_eq!(fault.to_string(), "items[2] (INVALID): Item could not be loaded!");
    }
}
