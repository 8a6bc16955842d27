//! End-to-end loading: documents in, validated recipes out, then a late
//! third-party provider turning pending recipes valid.

use craftworks_common::NamespacedKey;
use craftworks_loader::{LoaderConfig, RecipeLoader};
use craftworks_recipes::recipe::CraftingRecipe;
use craftworks_recipes::{
    ItemCandidate, ItemCatalog, RawNode, RecipeFamily, RecipeTypeRegistry, ResolveContext,
    TagCatalog, TagDefinition, Verdict,
};
use serde_json::json;

fn key(s: &str) -> NamespacedKey {
    NamespacedKey::parse(s).expect("valid key")
}

fn item_catalog() -> ItemCatalog {
    let mut items = ItemCatalog::new();
    for m in ["oak_planks", "birch_planks", "stick", "iron_ingot", "iron_ore", "cobblestone", "stone"] {
        items.add_material(key(m));
    }
    items
}

fn tag_catalog() -> TagCatalog {
    let mut tags = TagCatalog::new();
    tags.insert(TagDefinition::new(
        key("minecraft:planks"),
        vec![
            ItemCandidate::vanilla(key("oak_planks")),
            ItemCandidate::vanilla(key("birch_planks")),
        ],
    ));
    tags
}

#[test]
fn batch_load_then_late_provider() {
    let registry = RecipeTypeRegistry::standard().expect("catalog");
    let mut items = item_catalog();
    let tags = tag_catalog();

    let sticks = json!({
        "type": "workbench",
        "shape": ["P", "P"],
        "ingredients": { "P": { "tags": ["minecraft:planks"] } },
        "result": { "items": ["stick"] },
    });
    let ruby_block = json!({
        "type": "crafting",
        "shapeless": true,
        "ingredients": [
            { "items": [{ "provider": "oraxen", "id": "gems:ruby" }] },
            { "items": ["stick"] },
        ],
        "result": { "items": [{ "provider": "oraxen", "id": "gems:ruby_block" }] },
    });
    let smelt = json!({
        "type": "furnace",
        "source": { "items": ["iron_ore"] },
        "result": { "items": ["iron_ingot"] },
        "exp": 0.7,
    });
    let broken = json!({
        "type": "stonecutter",
        "source": { "tags": ["custom:rocks"] },
        "result": { "items": ["stone"] },
    });
    let documents: Vec<(NamespacedKey, &dyn RawNode)> = vec![
        (key("custom:sticks"), &sticks),
        (key("custom:ruby_block"), &ruby_block),
        (key("custom:iron"), &smelt),
        (key("custom:broken"), &broken),
    ];

    let mut loader = RecipeLoader::new(&registry, LoaderConfig::default());
    let loaded = loader.load_batch(documents, ResolveContext::new(&items, &tags));
    assert_eq!(loaded, 3);
    assert_eq!(loader.stats().pending, 1);
    assert_eq!(loader.stats().rejected, 1);

    let mut book = loader.into_book();
    let sticks = book.get(&key("custom:sticks")).expect("sticks");
    let kind = registry.kind_of(sticks).expect("kind");
    assert_eq!(kind.creator_id(), "crafting");
    let crafting = kind.cast::<CraftingRecipe>(sticks);
    assert_eq!(crafting.dimensions(), (1, 2));
    assert_eq!(
        crafting.ingredient('P').and_then(|spec| spec.snapshot()).map(|s| s.len()),
        Some(2)
    );

    let workbench = registry.lookup_container("workbench").expect("workbench");
    assert_eq!(book.by_container(workbench.inner()).len(), 2);
    assert_eq!(book.by_kind(RecipeFamily::CraftingShapeless).len(), 1);

    // The provider registers its items after loading.
    items.add_external("oraxen", key("gems:ruby"));
    items.add_external("oraxen", key("gems:ruby_block"));
    let ctx = ResolveContext::new(&items, &tags);
    book.refresh_choices(ctx);

    let verdicts: Vec<_> = book.validate_all(ctx).into_iter().map(|r| r.verdict).collect();
    assert_eq!(verdicts, [Verdict::Valid, Verdict::Valid, Verdict::Valid]);
    let ruby = book.get(&key("custom:ruby_block")).expect("ruby block");
    assert_eq!(ruby.result().snapshot().map(|s| s.len()), Some(1));
}

#[test]
fn toml_documents_and_config() {
    let registry = RecipeTypeRegistry::standard().expect("catalog");
    let items = item_catalog();
    let tags = tag_catalog();
    let ctx = ResolveContext::new(&items, &tags);

    let config = LoaderConfig::from_toml_str("kind_field = \"kind\"\nreject_invalid = false")
        .expect("config");
    let mut loader = RecipeLoader::new(&registry, config);

    let text = r#"
        kind = "STONECUTTER"
        group = "stone"

        [source]
        items = ["cobblestone"]
        tags = ["custom:unknown"]

        [result]
        items = ["stone"]
    "#;
    let verdict = loader
        .load_toml_str(key("custom:stone"), text, ctx)
        .expect("kept despite invalid tag");
    assert_eq!(verdict, Verdict::Invalid);

    let recipe = loader.book().get(&key("custom:stone")).expect("stored");
    assert_eq!(recipe.family(), RecipeFamily::Stonecutter);
    assert_eq!(recipe.meta().group.as_deref(), Some("stone"));
    let report = recipe.validate(ctx);
    let messages: Vec<_> = report.faults().map(|(_, f)| f.message.clone()).collect();
    assert_eq!(messages, ["Tag 'custom:unknown' could not be found!"]);
}
