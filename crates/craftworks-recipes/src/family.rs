//! Recipe family tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed enumeration of recipe families.
///
/// Exactly one [`crate::RecipeKind`] exists per family in a bootstrapped
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeFamily {
    /// Shaped workbench crafting.
    CraftingShaped,
    /// Shapeless workbench crafting.
    CraftingShapeless,
    /// Shaped elite workbench crafting.
    EliteCraftingShaped,
    /// Shapeless elite workbench crafting.
    EliteCraftingShapeless,
    /// Anvil combining.
    Anvil,
    /// Furnace smelting.
    Furnace,
    /// Blast furnace smelting.
    BlastFurnace,
    /// Smoker cooking.
    Smoker,
    /// Campfire cooking.
    Campfire,
    /// Stonecutter.
    Stonecutter,
    /// Cauldron brewing.
    Cauldron,
    /// Grindstone.
    Grindstone,
    /// Brewing stand.
    BrewingStand,
    /// Smithing table.
    Smithing,
}

impl RecipeFamily {
    /// All families in declaration order.
    pub const ALL: [Self; 14] = [
        Self::CraftingShaped,
        Self::CraftingShapeless,
        Self::EliteCraftingShaped,
        Self::EliteCraftingShapeless,
        Self::Anvil,
        Self::Furnace,
        Self::BlastFurnace,
        Self::Smoker,
        Self::Campfire,
        Self::Stonecutter,
        Self::Cauldron,
        Self::Grindstone,
        Self::BrewingStand,
        Self::Smithing,
    ];

    /// Lower-case id, also the default kind id.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::CraftingShaped => "crafting_shaped",
            Self::CraftingShapeless => "crafting_shapeless",
            Self::EliteCraftingShaped => "elite_crafting_shaped",
            Self::EliteCraftingShapeless => "elite_crafting_shapeless",
            Self::Anvil => "anvil",
            Self::Furnace => "furnace",
            Self::BlastFurnace => "blast_furnace",
            Self::Smoker => "smoker",
            Self::Campfire => "campfire",
            Self::Stonecutter => "stonecutter",
            Self::Cauldron => "cauldron",
            Self::Grindstone => "grindstone",
            Self::BrewingStand => "brewing_stand",
            Self::Smithing => "smithing",
        }
    }

    /// Upper-case constant name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CraftingShaped => "CRAFTING_SHAPED",
            Self::CraftingShapeless => "CRAFTING_SHAPELESS",
            Self::EliteCraftingShaped => "ELITE_CRAFTING_SHAPED",
            Self::EliteCraftingShapeless => "ELITE_CRAFTING_SHAPELESS",
            Self::Anvil => "ANVIL",
            Self::Furnace => "FURNACE",
            Self::BlastFurnace => "BLAST_FURNACE",
            Self::Smoker => "SMOKER",
            Self::Campfire => "CAMPFIRE",
            Self::Stonecutter => "STONECUTTER",
            Self::Cauldron => "CAULDRON",
            Self::Grindstone => "GRINDSTONE",
            Self::BrewingStand => "BREWING_STAND",
            Self::Smithing => "SMITHING",
        }
    }

    /// Get display name for this family.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::CraftingShaped => "Shaped Crafting",
            Self::CraftingShapeless => "Shapeless Crafting",
            Self::EliteCraftingShaped => "Shaped Elite Crafting",
            Self::EliteCraftingShapeless => "Shapeless Elite Crafting",
            Self::Anvil => "Anvil",
            Self::Furnace => "Furnace",
            Self::BlastFurnace => "Blast Furnace",
            Self::Smoker => "Smoker",
            Self::Campfire => "Campfire",
            Self::Stonecutter => "Stonecutter",
            Self::Cauldron => "Cauldron",
            Self::Grindstone => "Grindstone",
            Self::BrewingStand => "Brewing Stand",
            Self::Smithing => "Smithing",
        }
    }

    /// Case-insensitive lookup by id (`furnace`) or constant name (`FURNACE`).
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.id().eq_ignore_ascii_case(id))
    }

    /// Workbench or elite workbench crafting.
    #[must_use]
    pub fn is_crafting(self) -> bool {
        matches!(
            self,
            Self::CraftingShaped
                | Self::CraftingShapeless
                | Self::EliteCraftingShaped
                | Self::EliteCraftingShapeless
        )
    }

    /// Elite workbench crafting.
    #[must_use]
    pub fn is_elite(self) -> bool {
        matches!(
            self,
            Self::EliteCraftingShaped | Self::EliteCraftingShapeless
        )
    }

    /// Shapeless crafting of either workbench.
    #[must_use]
    pub fn is_shapeless(self) -> bool {
        matches!(
            self,
            Self::CraftingShapeless | Self::EliteCraftingShapeless
        )
    }

    /// Furnace-style cooking.
    #[must_use]
    pub fn is_cooking(self) -> bool {
        matches!(
            self,
            Self::Furnace | Self::BlastFurnace | Self::Smoker | Self::Campfire
        )
    }
}

impl fmt::Display for RecipeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_lowercase_names() {
        for family in RecipeFamily::ALL {
            assert_eq!(family.id().to_ascii_uppercase(), family.name());
        }
    }

    #[test]
    fn test_from_id_is_case_insensitive() {
        assert_eq!(
            RecipeFamily::from_id("blast_furnace"),
            Some(RecipeFamily::BlastFurnace)
        );
        assert_eq!(
            RecipeFamily::from_id("BLAST_FURNACE"),
            Some(RecipeFamily::BlastFurnace)
        );
        assert_eq!(RecipeFamily::from_id("kiln"), None);
    }

    #[test]
    fn test_family_groups() {
        assert!(RecipeFamily::CraftingShaped.is_crafting());
        assert!(!RecipeFamily::CraftingShaped.is_elite());
        assert!(RecipeFamily::EliteCraftingShapeless.is_shapeless());
        assert!(RecipeFamily::Campfire.is_cooking());
        assert!(!RecipeFamily::Stonecutter.is_cooking());
    }

    #[test]
    fn test_serde_uses_constant_names() {
        let json = serde_json::to_string(&RecipeFamily::BrewingStand).expect("serialize");
        assert_eq!(json, "\"BREWING_STAND\"");
    }
}
