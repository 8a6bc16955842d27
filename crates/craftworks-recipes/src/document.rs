//! Raw recipe documents.
//!
//! Loaders hand the core an already-parsed tree of named fields. The core
//! only sees it through [`RawNode`], so any configuration format whose values
//! form such a tree can feed the registry. Implementations are provided for
//! `serde_json::Value` and `toml::Value`.
//!
//! [`Document`] wraps a node with the field path it was reached by and offers
//! the typed accessors recipe constructors use. Every accessor failure is a
//! [`DocumentError`] naming the full path of the offending field.

use craftworks_common::{DocumentError, NamespacedKey};

/// Type of a raw node, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Explicit null
    Null,
    /// Boolean
    Bool,
    /// Integer number
    Integer,
    /// Floating point number
    Float,
    /// String
    String,
    /// Ordered list
    List,
    /// Object / table of named fields
    Object,
    /// Anything else the format supports (e.g. datetimes)
    Other,
}

impl NodeType {
    /// Human-readable type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
            Self::Other => "other",
        }
    }
}

/// A node in an untyped configuration tree.
pub trait RawNode {
    /// Type of this node.
    fn node_type(&self) -> NodeType;

    /// String value.
    fn as_str(&self) -> Option<&str>;

    /// Boolean value.
    fn as_bool(&self) -> Option<bool>;

    /// Integer value.
    fn as_i64(&self) -> Option<i64>;

    /// Numeric value; integers widen to floats.
    fn as_f64(&self) -> Option<f64>;

    /// List elements.
    fn elements(&self) -> Option<Vec<&dyn RawNode>>;

    /// Named field of an object node.
    fn field(&self, name: &str) -> Option<&dyn RawNode>;

    /// Names of every field of an object node, in document order where the
    /// format preserves it.
    fn field_names(&self) -> Vec<&str>;
}

impl RawNode for serde_json::Value {
    fn node_type(&self) -> NodeType {
        match self {
            Self::Null => NodeType::Null,
            Self::Bool(_) => NodeType::Bool,
            Self::Number(n) if n.is_f64() => NodeType::Float,
            Self::Number(_) => NodeType::Integer,
            Self::String(_) => NodeType::String,
            Self::Array(_) => NodeType::List,
            Self::Object(_) => NodeType::Object,
        }
    }

    fn as_str(&self) -> Option<&str> {
        serde_json::Value::as_str(self)
    }

    fn as_bool(&self) -> Option<bool> {
        serde_json::Value::as_bool(self)
    }

    fn as_i64(&self) -> Option<i64> {
        serde_json::Value::as_i64(self)
    }

    fn as_f64(&self) -> Option<f64> {
        serde_json::Value::as_f64(self)
    }

    fn elements(&self) -> Option<Vec<&dyn RawNode>> {
        self.as_array()
            .map(|items| items.iter().map(|v| v as &dyn RawNode).collect())
    }

    fn field(&self, name: &str) -> Option<&dyn RawNode> {
        self.as_object()
            .and_then(|map| map.get(name))
            .map(|v| v as &dyn RawNode)
    }

    fn field_names(&self) -> Vec<&str> {
        self.as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl RawNode for toml::Value {
    fn node_type(&self) -> NodeType {
        match self {
            Self::String(_) => NodeType::String,
            Self::Integer(_) => NodeType::Integer,
            Self::Float(_) => NodeType::Float,
            Self::Boolean(_) => NodeType::Bool,
            Self::Array(_) => NodeType::List,
            Self::Table(_) => NodeType::Object,
            Self::Datetime(_) => NodeType::Other,
        }
    }

    fn as_str(&self) -> Option<&str> {
        toml::Value::as_str(self)
    }

    fn as_bool(&self) -> Option<bool> {
        toml::Value::as_bool(self)
    }

    fn as_i64(&self) -> Option<i64> {
        self.as_integer()
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    fn elements(&self) -> Option<Vec<&dyn RawNode>> {
        self.as_array()
            .map(|items| items.iter().map(|v| v as &dyn RawNode).collect())
    }

    fn field(&self, name: &str) -> Option<&dyn RawNode> {
        self.as_table()
            .and_then(|table| table.get(name))
            .map(|v| v as &dyn RawNode)
    }

    fn field_names(&self) -> Vec<&str> {
        self.as_table()
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// A raw node together with the path it was reached by.
#[derive(Clone)]
pub struct Document<'a> {
    node: &'a dyn RawNode,
    path: String,
}

impl std::fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("type", &self.node.node_type())
            .finish()
    }
}

impl<'a> Document<'a> {
    /// Wraps a root node.
    #[must_use]
    pub fn new(node: &'a dyn RawNode) -> Self {
        Self {
            node,
            path: String::new(),
        }
    }

    /// Underlying node.
    #[must_use]
    pub fn node(&self) -> &'a dyn RawNode {
        self.node
    }

    /// Dotted path of this node from the document root; empty at the root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of a field of this node.
    #[must_use]
    pub fn field_path(&self, name: &str) -> String {
        join_path(&self.path, name)
    }

    /// Type of this node.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.node.node_type()
    }

    /// Raw field lookup. Explicit nulls count as absent.
    #[must_use]
    pub fn raw_field(&self, name: &str) -> Option<&'a dyn RawNode> {
        self.node
            .field(name)
            .filter(|node| node.node_type() != NodeType::Null)
    }

    /// Whether the field is present and not null.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.raw_field(name).is_some()
    }

    /// A child document for a field, if present.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<Document<'a>> {
        self.raw_field(name).map(|node| Document {
            node,
            path: self.field_path(name),
        })
    }

    /// A child document for a required field.
    pub fn required(&self, name: &str) -> Result<Document<'a>, DocumentError> {
        self.optional(name)
            .ok_or_else(|| DocumentError::missing(self.field_path(name)))
    }

    /// This node as a string.
    pub fn as_str(&self) -> Result<&'a str, DocumentError> {
        self.node.as_str().ok_or_else(|| self.wrong_type("string"))
    }

    /// This node as a namespaced key.
    pub fn as_key(&self) -> Result<NamespacedKey, DocumentError> {
        let raw = self.as_str()?;
        NamespacedKey::parse(raw).map_err(|source| DocumentError::InvalidKey {
            field: self.path.clone(),
            source,
        })
    }

    /// This node's list elements, each paired with its indexed path.
    pub fn as_list(&self) -> Result<Vec<Document<'a>>, DocumentError> {
        let elements = self.node.elements().ok_or_else(|| self.wrong_type("list"))?;
        Ok(elements
            .into_iter()
            .enumerate()
            .map(|(i, node)| Document {
                node,
                path: format!("{}[{i}]", self.path),
            })
            .collect())
    }

    /// This node's fields, each paired with its path, in document order.
    pub fn as_entries(&self) -> Result<Vec<(&'a str, Document<'a>)>, DocumentError> {
        if self.node.node_type() != NodeType::Object {
            return Err(self.wrong_type("object"));
        }
        let node = self.node;
        Ok(node
            .field_names()
            .into_iter()
            .filter_map(|name| {
                node.field(name).map(|child| {
                    (
                        name,
                        Document {
                            node: child,
                            path: join_path(&self.path, name),
                        },
                    )
                })
            })
            .collect())
    }

    /// Required string field.
    pub fn required_str(&self, name: &str) -> Result<&'a str, DocumentError> {
        let node = self
            .raw_field(name)
            .ok_or_else(|| DocumentError::missing(self.field_path(name)))?;
        node.as_str()
            .ok_or_else(|| self.field_wrong_type(name, "string", node))
    }

    /// Optional string field.
    pub fn optional_str(&self, name: &str) -> Result<Option<&'a str>, DocumentError> {
        match self.raw_field(name) {
            None => Ok(None),
            Some(node) => node
                .as_str()
                .map(Some)
                .ok_or_else(|| self.field_wrong_type(name, "string", node)),
        }
    }

    /// Optional boolean field.
    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, DocumentError> {
        match self.raw_field(name) {
            None => Ok(None),
            Some(node) => node
                .as_bool()
                .map(Some)
                .ok_or_else(|| self.field_wrong_type(name, "boolean", node)),
        }
    }

    /// Boolean field with a default.
    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool, DocumentError> {
        Ok(self.optional_bool(name)?.unwrap_or(default))
    }

    /// Lenient boolean switch: a boolean, or a string that reads `true`
    /// (case-insensitive). Any other string is `false`.
    pub fn flag_or(&self, name: &str, default: bool) -> Result<bool, DocumentError> {
        match self.raw_field(name) {
            None => Ok(default),
            Some(node) => match node.node_type() {
                NodeType::Bool => node
                    .as_bool()
                    .ok_or_else(|| self.field_wrong_type(name, "boolean", node)),
                NodeType::String => Ok(node
                    .as_str()
                    .is_some_and(|text| text.trim().eq_ignore_ascii_case("true"))),
                _ => Err(self.field_wrong_type(name, "boolean or string", node)),
            },
        }
    }

    /// Integer field with a default, bounded to `min..=max`.
    pub fn int_in_range(
        &self,
        name: &str,
        default: i64,
        min: i64,
        max: i64,
    ) -> Result<i64, DocumentError> {
        let value = match self.raw_field(name) {
            None => return Ok(default),
            Some(node) => node
                .as_i64()
                .ok_or_else(|| self.field_wrong_type(name, "integer", node))?,
        };
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(DocumentError::invalid(
                self.field_path(name),
                format!("{value} is outside {min}..={max}"),
            ))
        }
    }

    /// Non-negative integer field with a default.
    pub fn u32_or(&self, name: &str, default: u32) -> Result<u32, DocumentError> {
        self.int_in_range(name, i64::from(default), 0, i64::from(u32::MAX))
            .map(|v| v as u32)
    }

    /// Signed integer field with a default.
    pub fn i32_or(&self, name: &str, default: i32) -> Result<i32, DocumentError> {
        self.int_in_range(name, i64::from(default), i64::from(i32::MIN), i64::from(i32::MAX))
            .map(|v| v as i32)
    }

    /// Finite float field with a default.
    pub fn f32_or(&self, name: &str, default: f32) -> Result<f32, DocumentError> {
        let value = match self.raw_field(name) {
            None => return Ok(default),
            Some(node) => node
                .as_f64()
                .ok_or_else(|| self.field_wrong_type(name, "number", node))?,
        };
        let narrowed = value as f32;
        if narrowed.is_finite() {
            Ok(narrowed)
        } else {
            Err(DocumentError::invalid(
                self.field_path(name),
                "must be a finite 32-bit float",
            ))
        }
    }

    /// Fields of this object that are not in `known`.
    ///
    /// Extra fields are never an error; loaders may log them.
    #[must_use]
    pub fn extra_fields(&self, known: &[&str]) -> Vec<&'a str> {
        let node = self.node;
        node.field_names()
            .into_iter()
            .filter(|name| !known.contains(name))
            .collect()
    }

    fn wrong_type(&self, expected: &'static str) -> DocumentError {
        DocumentError::WrongType {
            field: self.path.clone(),
            expected,
            found: self.node.node_type().name(),
        }
    }

    fn field_wrong_type(
        &self,
        name: &str,
        expected: &'static str,
        node: &dyn RawNode,
    ) -> DocumentError {
        DocumentError::WrongType {
            field: self.field_path(name),
            expected,
            found: node.node_type().name(),
        }
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_accessors() {
        let value = json!({
            "group": "plates",
            "hidden": true,
            "exp": 0.5,
            "cooking_time": 120,
        });
        let doc = Document::new(&value);

        assert_eq!(doc.required_str("group"), Ok("plates"));
        assert_eq!(doc.bool_or("hidden", false), Ok(true));
        assert_eq!(doc.bool_or("shapeless", false), Ok(false));
        assert_eq!(doc.f32_or("exp", 0.0), Ok(0.5));
        assert_eq!(doc.u32_or("cooking_time", 200), Ok(120));
        assert_eq!(doc.u32_or("missing", 200), Ok(200));
    }

    #[test]
    fn test_missing_and_wrong_type_paths() {
        let value = json!({ "source": { "items": 5 } });
        let doc = Document::new(&value);

        let err = doc.required("result").expect_err("missing");
        assert_eq!(err, DocumentError::missing("result"));

        let source = doc.required("source").expect("present");
        let err = source
            .required("items")
            .and_then(|items| items.as_list())
            .expect_err("wrong type");
        assert_eq!(
            err,
            DocumentError::WrongType {
                field: "source.items".to_string(),
                expected: "list",
                found: "integer",
            }
        );
    }

    #[test]
    fn test_list_paths_are_indexed() {
        let value = json!({ "tags": ["minecraft:planks", 7] });
        let doc = Document::new(&value);
        let tags = doc.required("tags").and_then(|t| t.as_list()).expect("list");

        assert_eq!(tags[0].as_key().expect("key").key(), "planks");
        let err = tags[1].as_str().expect_err("not a string");
        assert_eq!(err.field(), "tags[1]");
    }

    #[test]
    fn test_null_counts_as_absent() {
        let value = json!({ "group": null });
        let doc = Document::new(&value);
        assert!(!doc.has("group"));
        assert_eq!(doc.optional_str("group"), Ok(None));
    }

    #[test]
    fn test_float_overflowing_f32_is_rejected() {
        let value = json!({ "exp": 1e300, "small": 0.5 });
        let doc = Document::new(&value);
        let err = doc.f32_or("exp", 0.0).expect_err("overflows f32");
        assert_eq!(err.field(), "exp");
        assert_eq!(doc.f32_or("small", 0.0), Ok(0.5));
        assert_eq!(doc.f32_or("missing", 1.5), Ok(1.5));
    }

    #[test]
    fn test_flag_accepts_textual_booleans() {
        let value = json!({ "a": true, "b": "TRUE", "c": "yes", "d": 1 });
        let doc = Document::new(&value);
        assert_eq!(doc.flag_or("a", false), Ok(true));
        assert_eq!(doc.flag_or("b", false), Ok(true));
        assert_eq!(doc.flag_or("c", true), Ok(false));
        assert_eq!(doc.flag_or("missing", true), Ok(true));
        assert!(doc.flag_or("d", false).is_err());
    }

    #[test]
    fn test_out_of_range_integer() {
        let value = json!({ "water_level": 9 });
        let doc = Document::new(&value);
        let err = doc.int_in_range("water_level", 1, 0, 3).expect_err("range");
        assert_eq!(err.field(), "water_level");
    }

    #[test]
    fn test_extra_fields_are_reported_not_rejected() {
        let value = json!({ "result": {}, "author": "someone" });
        let doc = Document::new(&value);
        assert_eq!(doc.extra_fields(&["result"]), vec!["author"]);
    }

    #[test]
    fn test_toml_documents() {
        let value: toml::Value = toml::from_str(
            r#"
            type = "furnace"
            exp = 2
            [source]
            items = ["minecraft:iron_ore"]
            "#,
        )
        .expect("toml");
        let doc = Document::new(&value);

        assert_eq!(doc.required_str("type"), Ok("furnace"));
        assert_eq!(doc.f32_or("exp", 0.0), Ok(2.0));
        let source = doc.required("source").expect("source");
        let items = source.required("items").and_then(|i| i.as_list()).expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path(), "source.items[0]");
    }
}
