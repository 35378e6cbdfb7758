//! Schema Translator: protobuf field, enum and message shapes to schemas.
//!
//! Every non-well-known message reached through a field becomes a `$ref`
//! and its fully-qualified name is queued in [`SchemaRequests`]; the
//! assembler drains that queue to emit the referenced components.

use std::collections::{HashSet, VecDeque};

use proto_openapi_core::walk::{Field, FieldKind, Message, ProtoSet};

use crate::config::Naming;
use crate::naming::{field_name, filter_comment, message_name};
use crate::openapi::{NamedMap, Schema, SchemaOrReference, SchemaType};
use crate::validate;

/// `google.protobuf.Empty`
pub(crate) const EMPTY: &str = ".google.protobuf.Empty";
/// `google.protobuf.Struct`
pub(crate) const STRUCT: &str = ".google.protobuf.Struct";
/// `google.api.HttpBody`
pub(crate) const HTTP_BODY: &str = ".google.api.HttpBody";

/// Character class substituted for each variable of a resource pattern.
const RESOURCE_ID_PATTERN: &str = "[a-z2-7]{26}";

/// Message types referenced so far, in discovery order, each queued once.
#[derive(Debug, Default)]
pub(crate) struct SchemaRequests {
    pending: VecDeque<String>,
    requested: HashSet<String>,
}

impl SchemaRequests {
    /// Queue `full_name` unless it was requested before.
    pub(crate) fn request(&mut self, full_name: &str) {
        if self.requested.insert(full_name.to_string()) {
            self.pending.push_back(full_name.to_string());
        }
    }

    /// Next queued name.
    pub(crate) fn next(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Whether `full_name` was ever requested.
    #[cfg(test)]
    pub(crate) fn contains(&self, full_name: &str) -> bool {
        self.requested.contains(full_name)
    }
}

/// Maps protobuf shapes to schemas for one generator invocation.
pub(crate) struct Translator<'s, 'a> {
    pool: &'s ProtoSet<'a>,
    naming: Naming,
    validate: bool,
    requests: SchemaRequests,
}

impl<'s, 'a> Translator<'s, 'a> {
    pub(crate) fn new(pool: &'s ProtoSet<'a>, naming: Naming, validate: bool) -> Self {
        Self {
            pool,
            naming,
            validate,
            requests: SchemaRequests::default(),
        }
    }

    pub(crate) fn pool(&self) -> &'s ProtoSet<'a> {
        self.pool
    }

    pub(crate) fn naming(&self) -> Naming {
        self.naming
    }

    pub(crate) fn requests(&mut self) -> &mut SchemaRequests {
        &mut self.requests
    }

    /// Component name for a fully-qualified message name.
    ///
    /// Used for both `$ref` targets and `components.schemas` keys so the two
    /// always agree.
    pub(crate) fn schema_name(&self, full_name: &str) -> String {
        let base = match self.pool.message(full_name) {
            Some(message) => message.schema_name(),
            None => full_name
                .rsplit('.')
                .next()
                .unwrap_or(full_name)
                .to_string(),
        };
        message_name(self.naming, &base)
    }

    /// `$ref` to `full_name`'s component, queueing it for generation.
    pub(crate) fn reference(&mut self, full_name: &str) -> SchemaOrReference {
        self.requests.request(full_name);
        SchemaOrReference::reference(&self.schema_name(full_name))
    }

    /// Schema for a message type: a fixed schema for well-known types, a
    /// `$ref` otherwise. `None` for `google.protobuf.Empty`.
    pub(crate) fn schema_for_type(&mut self, full_name: &str) -> Option<SchemaOrReference> {
        let schema = match full_name {
            ".google.protobuf.Timestamp" | ".google.type.DateTime" => {
                Schema::of(SchemaType::String).with_format("date-time")
            }
            ".google.type.Date" => Schema::of(SchemaType::String).with_format("date"),
            STRUCT => Schema::of(SchemaType::Object),
            EMPTY => return None,
            ".google.protobuf.BoolValue" => Schema::of(SchemaType::Boolean).nullable(),
            ".google.protobuf.BytesValue" => Schema::of(SchemaType::String)
                .with_format("bytes")
                .nullable(),
            ".google.protobuf.DoubleValue" | ".google.protobuf.FloatValue" => {
                Schema::of(SchemaType::Number).with_format("float").nullable()
            }
            ".google.protobuf.Int64Value"
            | ".google.protobuf.UInt64Value"
            | ".google.protobuf.Int32Value"
            | ".google.protobuf.UInt32Value" => Schema::of(SchemaType::Integer).nullable(),
            ".google.protobuf.StringValue" => Schema::of(SchemaType::String).nullable(),
            _ => return Some(self.reference(full_name)),
        };
        Some(schema.into())
    }

    /// Schema for one field. `None` when the field has no representation
    /// (an `Empty` message, or a kind with no mapping).
    pub(crate) fn schema_for_field(&mut self, field: &Field<'a>) -> Option<SchemaOrReference> {
        if let Some(value) = self.pool.map_value(field) {
            let mut schema = Schema::of(SchemaType::Object);
            schema.additional_properties = self.schema_for_field(&value).map(Box::new);
            return Some(schema.into());
        }

        let kind = field.kind();
        let item: SchemaOrReference = match kind {
            FieldKind::Message(type_name) => self.schema_for_type(type_name)?,
            FieldKind::String => Schema::of(SchemaType::String).into(),
            FieldKind::Int32
            | FieldKind::Sint32
            | FieldKind::Uint32
            | FieldKind::Int64
            | FieldKind::Sint64
            | FieldKind::Uint64
            | FieldKind::Sfixed32
            | FieldKind::Fixed32
            | FieldKind::Sfixed64
            | FieldKind::Fixed64 => Schema::of(SchemaType::Integer)
                .with_format(kind.name())
                .into(),
            FieldKind::Enum(type_name) => self.enum_schema(type_name).into(),
            FieldKind::Bool => Schema::of(SchemaType::Boolean).into(),
            FieldKind::Float | FieldKind::Double => Schema::of(SchemaType::Number)
                .with_format(kind.name())
                .into(),
            FieldKind::Bytes => Schema::of(SchemaType::String).with_format("bytes").into(),
            FieldKind::Group | FieldKind::Unknown(_) => {
                tracing::warn!(
                    field = field.name(),
                    kind = kind.name(),
                    "unsupported field kind, skipping"
                );
                return None;
            }
        };

        if field.is_repeated() {
            let mut array = Schema::of(SchemaType::Array);
            array.items = Some(Box::new(item));
            return Some(array.into());
        }

        Some(item)
    }

    /// `type: string, format: enum` listing every value except `*_UNSPECIFIED`,
    /// in declaration order.
    pub(crate) fn enum_schema(&self, full_name: &str) -> Schema {
        let values = self.pool.enum_values(full_name).unwrap_or_default();
        if values.is_empty() {
            tracing::warn!(enum_type = full_name, "enum not found in descriptors");
        }
        Schema {
            enum_values: values
                .iter()
                .filter_map(|v| v.name.as_deref())
                .filter(|name| !name.ends_with("_UNSPECIFIED"))
                .map(ToString::to_string)
                .collect(),
            ..Schema::of(SchemaType::String).with_format("enum")
        }
    }

    /// Component schema for a message.
    pub(crate) fn message_schema(&mut self, message: &Message<'a>) -> Schema {
        let pattern = message.resource_pattern().map(resource_name_pattern);
        let mut properties = NamedMap::new();
        let mut required = Vec::new();

        for field in message.fields() {
            let Some(mut field_schema) = self.schema_for_field(field) else {
                continue;
            };
            let name = field_name(self.naming, field);
            let behaviors = field.behaviors();

            if let Some(schema) = field_schema.as_schema_mut() {
                if field.name() == "name" {
                    if let Some(pattern) = &pattern {
                        schema.pattern = Some(pattern.clone());
                    }
                }
                schema.description = filter_comment(field.leading_comments(), true);
                schema.read_only = behaviors.output_only();
                schema.write_only = behaviors.input_only();
            }
            if behaviors.required() {
                required.push(name.clone());
            }
            if self.validate {
                validate::apply(self.pool, field, &mut field_schema);
            }

            properties.insert(name, field_schema);
        }

        Schema {
            description: filter_comment(message.leading_comments(), true),
            properties,
            required,
            ..Schema::of(SchemaType::Object)
        }
    }
}

/// `shelves/{shelf}/books/{book}` → `^shelves/[a-z2-7]{26}/books/[a-z2-7]{26}$`
fn resource_name_pattern(resource: &str) -> String {
    let mut pattern = String::from("^");
    let mut rest = resource;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let variable = &rest[open + 1..open + len];
        pattern.push_str(&rest[..open]);
        if variable.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            pattern.push_str(RESOURCE_ID_PATTERN);
        } else {
            pattern.push_str(&rest[open..=open + len]);
        }
        rest = &rest[open + len + 1..];
    }

    pattern.push_str(rest);
    pattern.push('$');
    pattern
}
