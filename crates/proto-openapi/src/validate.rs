//! Projection of `validate.rules` onto field schemas.
//!
//! Supported subset:
//!
//! - string: `format` from the first set well-known flag, `minLength`,
//!   `maxLength`, `pattern`
//! - int32 / int64: `minimum` from `gte`, `maximum` from `lte`
//! - enum: `const`, `in` and `not_in` narrow the `enum` list
//! - repeated: `minItems`, `maxItems`, and the `items` rules applied to the
//!   array's item schema
//!
//! Maps, references and every other kind are left untouched.

use proto_openapi_core::descriptor::{FieldRules, StringRules};
use proto_openapi_core::walk::{Field, FieldKind, ProtoSet};

use crate::openapi::{Schema, SchemaOrReference, SchemaType};

/// Apply the field's rules (if any) to its inline schema.
pub(crate) fn apply(pool: &ProtoSet<'_>, field: &Field<'_>, target: &mut SchemaOrReference) {
    let Some(rules) = field.validation_rules() else {
        return;
    };
    let Some(schema) = target.as_schema_mut() else {
        return;
    };
    if pool.is_map(field) {
        return;
    }

    if field.is_repeated() {
        let Some(repeated) = &rules.repeated else {
            return;
        };
        if schema.schema_type != Some(SchemaType::Array) {
            return;
        }
        if let Some(min) = repeated.min_items {
            schema.min_items = Some(min);
        }
        if let Some(max) = repeated.max_items {
            schema.max_items = Some(max);
        }
        if let (Some(item_rules), Some(item)) = (
            repeated.items.as_deref(),
            schema.items.as_deref_mut().and_then(SchemaOrReference::as_schema_mut),
        ) {
            apply_kind(pool, field.kind(), item_rules, item);
        }
        return;
    }

    apply_kind(pool, field.kind(), rules, schema);
}

fn apply_kind(pool: &ProtoSet<'_>, kind: FieldKind<'_>, rules: &FieldRules, schema: &mut Schema) {
    match kind {
        FieldKind::String => {
            if let Some(string) = &rules.string {
                apply_string(string, schema);
            }
        }
        FieldKind::Int32 => {
            if let Some(int32) = &rules.int32 {
                apply_bounds(int32.gte.map(i64::from), int32.lte.map(i64::from), schema);
            }
        }
        FieldKind::Int64 => {
            if let Some(int64) = &rules.int64 {
                apply_bounds(int64.gte, int64.lte, schema);
            }
        }
        FieldKind::Enum(type_name) => {
            if let Some(rules) = &rules.r#enum {
                let Some(values) = pool.enum_values(type_name) else {
                    return;
                };
                let number_of = |name: &str| {
                    values
                        .iter()
                        .find(|v| v.name.as_deref() == Some(name))
                        .and_then(|v| v.number)
                };
                schema.enum_values.retain(|name| {
                    let Some(number) = number_of(name) else {
                        return false;
                    };
                    rules.r#const.is_none_or(|c| c == number)
                        && (rules.r#in.is_empty() || rules.r#in.contains(&number))
                        && !rules.not_in.contains(&number)
                });
            }
        }
        _ => {}
    }
}

fn apply_string(rules: &StringRules, schema: &mut Schema) {
    let formats = [
        (rules.email, "email"),
        (rules.hostname, "hostname"),
        (rules.ip, "ip"),
        (rules.ipv4, "ipv4"),
        (rules.ipv6, "ipv6"),
        (rules.uri, "uri"),
        (rules.uri_ref, "uri_ref"),
        (rules.uuid, "uuid"),
    ];
    if let Some((_, format)) = formats.iter().find(|(flag, _)| flag.unwrap_or(false)) {
        schema.format = Some((*format).to_string());
    }

    if let Some(min) = rules.min_len.filter(|&v| v > 0) {
        schema.min_length = Some(min);
    }
    if let Some(max) = rules.max_len.filter(|&v| v > 0) {
        schema.max_length = Some(max);
    }
    if let Some(pattern) = rules.pattern.as_deref().filter(|p| !p.is_empty()) {
        schema.pattern = Some(pattern.to_string());
    }
}

/// Only strictly positive bounds are projected.
fn apply_bounds(gte: Option<i64>, lte: Option<i64>, schema: &mut Schema) {
    if let Some(min) = gte.filter(|&v| v > 0) {
        schema.minimum = Some(min);
    }
    if let Some(max) = lte.filter(|&v| v > 0) {
        schema.maximum = Some(max);
    }
}
