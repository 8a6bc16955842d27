//! Identity types for recipes, tags, items and permissions.
//!
//! A [`NamespacedKey`] is the universal lookup key of the recipe core: recipes,
//! item tags and item definitions are all addressed by a `namespace:key` pair.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KeyError;

/// Namespace of built-in (vanilla) items, tags and materials.
pub const MINECRAFT_NAMESPACE: &str = "minecraft";

/// Longest accepted namespace.
const MAX_NAMESPACE_LEN: usize = 64;

/// Longest accepted key.
const MAX_KEY_LEN: usize = 256;

/// Immutable `namespace:key` identifier.
///
/// Both parts are lower-case; parsing rejects upper-case input rather than
/// folding it so that ids written by authors stay byte-identical to the ids
/// the host item and tag subsystems use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespacedKey {
    namespace: String,
    key: String,
}

impl NamespacedKey {
    /// Creates a key from its two parts, validating both.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Result<Self, KeyError> {
        let namespace = namespace.into();
        let key = key.into();
        validate_namespace(&namespace)?;
        validate_key(&key)?;
        Ok(Self { namespace, key })
    }

    /// Parses `namespace:key`, or `key` alone in the [`MINECRAFT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, KeyError> {
        Self::parse_with_default_namespace(input, MINECRAFT_NAMESPACE)
    }

    /// Parses a key using a caller-provided default namespace.
    pub fn parse_with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, KeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(KeyError::Empty);
        }

        let (namespace, key) = match input.split_once(':') {
            Some((ns, k)) => (ns, k),
            None => (default_namespace, input),
        };

        Self::new(namespace, key)
    }

    /// Creates a key in the built-in namespace.
    pub fn minecraft(key: impl Into<String>) -> Result<Self, KeyError> {
        Self::new(MINECRAFT_NAMESPACE, key)
    }

    /// The `minecraft:air` material, the empty-slot sentinel.
    #[must_use]
    pub fn air() -> Self {
        Self {
            namespace: MINECRAFT_NAMESPACE.to_string(),
            key: "air".to_string(),
        }
    }

    /// Namespace part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key part.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this key lives in the built-in namespace.
    #[must_use]
    pub fn is_minecraft(&self) -> bool {
        self.namespace == MINECRAFT_NAMESPACE
    }

    /// Whether this key is `minecraft:air`.
    #[must_use]
    pub fn is_air(&self) -> bool {
        self.is_minecraft() && self.key == "air"
    }
}

impl fmt::Display for NamespacedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl FromStr for NamespacedKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NamespacedKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NamespacedKey> for String {
    fn from(value: NamespacedKey) -> Self {
        value.to_string()
    }
}

fn validate_namespace(ns: &str) -> Result<(), KeyError> {
    if ns.is_empty() {
        return Err(KeyError::EmptyNamespace);
    }
    if ns.len() > MAX_NAMESPACE_LEN {
        return Err(KeyError::TooLong {
            part: "namespace",
            max: MAX_NAMESPACE_LEN,
        });
    }
    if let Some(c) = ns
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
    {
        return Err(KeyError::InvalidCharacter {
            part: "namespace",
            character: c,
        });
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::EmptyKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(KeyError::TooLong {
            part: "key",
            max: MAX_KEY_LEN,
        });
    }
    if let Some(c) = key
        .chars()
        .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.' | '/'))
    {
        return Err(KeyError::InvalidCharacter {
            part: "key",
            character: c,
        });
    }
    Ok(())
}

/// Permission node a viewer must hold to see an item candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a permission id from its node string (e.g. `craftworks.item.ruby`).
    #[must_use]
    pub fn new(node: impl Into<String>) -> Self {
        Self(node.into())
    }

    /// Returns the permission node.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_namespaced_key() {
        let key = NamespacedKey::parse("minecraft:oak_planks").expect("valid");
        assert_eq!(key.namespace(), "minecraft");
        assert_eq!(key.key(), "oak_planks");
        assert!(key.is_minecraft());
    }

    #[test]
    fn test_parses_with_default_namespace() {
        let key = NamespacedKey::parse("stick").expect("valid");
        assert_eq!(key.to_string(), "minecraft:stick");

        let key = NamespacedKey::parse_with_default_namespace("ruby", "gems").expect("valid");
        assert_eq!(key.to_string(), "gems:ruby");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert_eq!(NamespacedKey::parse(""), Err(KeyError::Empty));
        assert_eq!(NamespacedKey::parse("   "), Err(KeyError::Empty));
        assert_eq!(NamespacedKey::parse(":stone"), Err(KeyError::EmptyNamespace));
        assert_eq!(NamespacedKey::parse("minecraft:"), Err(KeyError::EmptyKey));
        assert!(matches!(
            NamespacedKey::parse("Minecraft:stone"),
            Err(KeyError::InvalidCharacter {
                part: "namespace",
                character: 'M'
            })
        ));
        assert!(NamespacedKey::parse("minecraft:stone?").is_err());
    }

    #[test]
    fn test_key_paths_allow_slashes() {
        let key = NamespacedKey::parse("customcrafting:recipes/iron_plate").expect("valid");
        assert_eq!(key.key(), "recipes/iron_plate");
    }

    #[test]
    fn test_air_sentinel() {
        assert!(NamespacedKey::air().is_air());
        assert!(!NamespacedKey::minecraft("stone").expect("valid").is_air());
    }

    #[test]
    fn test_key_serde_as_string() {
        let key = NamespacedKey::parse("gems:ruby").expect("valid");
        let json = serde_json::to_string(&key).expect("serialize");
        assert_eq!(json, "\"gems:ruby\"");
        let back: NamespacedKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, key);
        assert!(serde_json::from_str::<NamespacedKey>("\"Bad Key\"").is_err());
    }

    #[test]
    fn test_permission_id() {
        let perm = PermissionId::new("craftworks.item.ruby");
        assert_eq!(perm.as_str(), "craftworks.item.ruby");
        assert_eq!(perm.to_string(), "craftworks.item.ruby");
    }
}
