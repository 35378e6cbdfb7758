//! OpenAPI 3.0.3 document model.
//!
//! Only the parts of OpenAPI 3.0.3 this generator emits are modelled.
//! Every name → value collection is a [`NamedMap`], which keeps insertion
//! order and serializes as a YAML mapping in that order.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// OpenAPI version written to every document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Prefix of every component schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Ordered name → value collection.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMap<T>(Vec<(String, T)>);

impl<T> Default for NamedMap<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> NamedMap<T> {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Store `value` under `name`, replacing (in place) and returning any
    /// previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    /// Value under `name`, inserting `make()` first when absent.
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> T) -> &mut T {
        let index = match self.0.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.0.push((name.to_string(), make()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    /// Names in current order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    /// Entries in current order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sort entries by name (byte order).
    pub fn sort_by_name(&mut self) {
        self.0.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
}

impl<T: Serialize> Serialize for NamedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Root of an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Always [`OPENAPI_VERSION`].
    pub openapi: String,
    /// Title, description and version.
    pub info: Info,
    /// URL template → path item.
    pub paths: NamedMap<PathItem>,
    /// Reusable schemas.
    pub components: Components,
    /// One tag per service that produced operations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Document {
    /// Empty document with the given info block.
    #[must_use]
    pub fn new(info: Info) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths: NamedMap::new(),
            components: Components::default(),
            tags: Vec::new(),
        }
    }
}

/// `info` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// API version.
    pub version: String,
}

/// `components` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    /// Schema name → schema.
    pub schemas: NamedMap<SchemaOrReference>,
}

/// A tag grouping the operations of one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tag {
    /// Service name.
    pub name: String,
    /// Service description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Operations bound to one URL template, at most one per verb.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[allow(missing_docs)]
    pub patch: Option<Operation>,
}

/// One RPC method's HTTP binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// The owning service's name.
    pub tags: Vec<String>,
    /// Short summary.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Long description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// `Service_Method`.
    pub operation_id: String,
    /// Path parameters, then query parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Present when the binding has a body selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code → response; always exactly `"200"`.
    pub responses: NamedMap<Response>,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// A `{...}` segment of the URL template.
    Path,
    /// The query string.
    Query,
}

/// One operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Human-readable description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Always `true` for path parameters.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Value schema.
    pub schema: SchemaOrReference,
}

/// Request body of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestBody {
    /// Media type → content.
    pub content: NamedMap<MediaType>,
    /// Always `true` for generated bodies.
    pub required: bool,
}

/// One response of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    /// Response description.
    pub description: String,
    /// Media type → content; empty for `Empty`/`Struct` outputs.
    #[serde(skip_serializing_if = "NamedMap::is_empty")]
    pub content: NamedMap<MediaType>,
}

/// Content of one media type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaType {
    /// Payload schema, absent for opaque payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrReference>,
}

/// A schema, either inline or by reference to a component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaOrReference {
    /// `$ref: '#/components/schemas/<Name>'`
    Reference {
        /// Full reference string.
        #[serde(rename = "$ref")]
        reference: String,
    },
    /// An inline schema.
    Schema(Box<Schema>),
}

impl SchemaOrReference {
    /// Reference to the component schema `name`.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self::Reference {
            reference: format!("{SCHEMA_REF_PREFIX}{name}"),
        }
    }

    /// The inline schema, if this is not a reference.
    #[must_use]
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Reference { .. } => None,
        }
    }

    /// Mutable access to the inline schema, if this is not a reference.
    pub fn as_schema_mut(&mut self) -> Option<&mut Schema> {
        match self {
            Self::Schema(schema) => Some(schema),
            Self::Reference { .. } => None,
        }
    }
}

impl From<Schema> for SchemaOrReference {
    fn from(schema: Schema) -> Self {
        Self::Schema(Box::new(schema))
    }
}

/// JSON type of an inline schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// An inline schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub write_only: bool,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "NamedMap::is_empty")]
    pub properties: NamedMap<SchemaOrReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaOrReference>>,
}

impl Schema {
    /// Schema of the given type and nothing else.
    #[must_use]
    pub fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Set `format`.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Mark `nullable: true`.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
