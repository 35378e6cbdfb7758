//! Declaration-order traversal over a set of file descriptors.
//!
//! [`ProtoSet`] indexes every file, service, method, message (nested ones
//! included) and field once, resolving leading comments from
//! `SourceCodeInfo` along the way. It has no logic of its own beyond
//! traversal and extension lookup: absent annotations come back as `None`
//! or an empty set, never as an error.

use std::collections::HashMap;

use crate::descriptor::{
    self, field_label, field_type, CodeGeneratorRequest, DescriptorProto,
    EnumValueDescriptorProto, FieldBehavior, FieldDescriptorProto, FieldRules,
    FileDescriptorProto, HttpPattern, HttpVerb, MethodDescriptorProto, ServiceDescriptorProto,
};

/// `FileDescriptorProto.message_type`
const FILE_MESSAGE_TYPE: i32 = 4;
/// `FileDescriptorProto.service`
const FILE_SERVICE: i32 = 6;
/// `DescriptorProto.field`
const MESSAGE_FIELD: i32 = 2;
/// `DescriptorProto.nested_type`
const MESSAGE_NESTED_TYPE: i32 = 3;
/// `ServiceDescriptorProto.method`
const SERVICE_METHOD: i32 = 2;

/// Leading comments of one file, keyed by descriptor path.
type CommentIndex<'a> = HashMap<Vec<i32>, &'a str>;

/// All input files with their services, messages and enums indexed by
/// fully-qualified name.
#[derive(Debug)]
pub struct ProtoSet<'a> {
    files: Vec<ProtoFile<'a>>,
    /// `.pkg.Outer.Inner` → (file index, message index within the file)
    messages: HashMap<String, (usize, usize)>,
    /// `.pkg.Outer.State` → enum values
    enums: HashMap<String, &'a [EnumValueDescriptorProto]>,
}

impl<'a> ProtoSet<'a> {
    /// Index a plugin request; files listed in `file_to_generate` are marked
    /// for generation.
    #[must_use]
    pub fn from_request(request: &'a CodeGeneratorRequest) -> Self {
        Self::new(&request.proto_file, |name| {
            request.file_to_generate.iter().any(|f| f == name)
        })
    }

    /// Index `files`, asking `generate` for each file name whether it
    /// contributes paths.
    #[must_use]
    pub fn new(files: &'a [FileDescriptorProto], mut generate: impl FnMut(&str) -> bool) -> Self {
        let mut set = Self {
            files: Vec::with_capacity(files.len()),
            messages: HashMap::new(),
            enums: HashMap::new(),
        };

        for file in files {
            let file_index = set.files.len();
            let comments = index_comments(file);
            let package = file.package.as_deref().unwrap_or("");
            let scope = if package.is_empty() {
                String::new()
            } else {
                format!(".{package}")
            };

            for enum_type in &file.enum_type {
                let name = enum_type.name.as_deref().unwrap_or("");
                set.enums
                    .insert(format!("{scope}.{name}"), enum_type.value.as_slice());
            }

            let mut messages = Vec::new();
            for (i, msg) in file.message_type.iter().enumerate() {
                collect_messages(
                    &mut messages,
                    &mut set.enums,
                    &comments,
                    &scope,
                    None,
                    msg,
                    vec![FILE_MESSAGE_TYPE, index(i)],
                );
            }
            for (i, message) in messages.iter().enumerate() {
                set.messages
                    .insert(message.full_name.clone(), (file_index, i));
            }

            let services = file
                .service
                .iter()
                .enumerate()
                .map(|(i, svc)| build_service(&comments, svc, vec![FILE_SERVICE, index(i)]))
                .collect();

            set.files.push(ProtoFile {
                descriptor: file,
                generate: generate(file.name.as_deref().unwrap_or("")),
                services,
                messages,
            });
        }

        set
    }

    /// Files in host order.
    #[must_use]
    pub fn files(&self) -> &[ProtoFile<'a>] {
        &self.files
    }

    /// Look up a message by fully-qualified name (`.pkg.Outer.Inner`).
    #[must_use]
    pub fn message(&self, full_name: &str) -> Option<&Message<'a>> {
        let &(file, msg) = self.messages.get(full_name)?;
        self.files.get(file)?.messages.get(msg)
    }

    /// Values of an enum, by fully-qualified name, in declaration order.
    #[must_use]
    pub fn enum_values(&self, full_name: &str) -> Option<&'a [EnumValueDescriptorProto]> {
        self.enums.get(full_name).copied()
    }

    /// The value field of a map field's synthesized entry message.
    ///
    /// Returns `None` when `field` is not a map.
    #[must_use]
    pub fn map_value(&self, field: &Field<'a>) -> Option<Field<'a>> {
        if !field.is_repeated() {
            return None;
        }
        let FieldKind::Message(type_name) = field.kind() else {
            return None;
        };
        let entry = self.message(type_name).filter(|m| m.is_map_entry())?;
        entry
            .fields()
            .iter()
            .find(|f| f.descriptor.number == Some(2) || f.name() == "value")
            .cloned()
    }

    /// Whether `field` is a map (`map<K, V>`).
    #[must_use]
    pub fn is_map(&self, field: &Field<'a>) -> bool {
        self.map_value(field).is_some()
    }
}

fn index(i: usize) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX)
}

fn index_comments(file: &FileDescriptorProto) -> CommentIndex<'_> {
    file.source_code_info
        .iter()
        .flat_map(|info| &info.location)
        .filter_map(|loc| {
            loc.leading_comments
                .as_deref()
                .map(|c| (loc.path.clone(), c))
        })
        .collect()
}

fn comment_at(comments: &CommentIndex<'_>, path: &[i32]) -> String {
    comments.get(path).map_or_else(String::new, ToString::to_string)
}

/// Depth-first: nested messages are pushed before the message that declares them.
fn collect_messages<'a>(
    out: &mut Vec<Message<'a>>,
    enums: &mut HashMap<String, &'a [EnumValueDescriptorProto]>,
    comments: &CommentIndex<'a>,
    scope: &str,
    parent_name: Option<&'a str>,
    msg: &'a DescriptorProto,
    path: Vec<i32>,
) {
    let name = msg.name.as_deref().unwrap_or("");
    let full_name = format!("{scope}.{name}");

    for enum_type in &msg.enum_type {
        let enum_name = enum_type.name.as_deref().unwrap_or("");
        enums.insert(
            format!("{full_name}.{enum_name}"),
            enum_type.value.as_slice(),
        );
    }

    for (i, nested) in msg.nested_type.iter().enumerate() {
        let mut nested_path = path.clone();
        nested_path.extend([MESSAGE_NESTED_TYPE, index(i)]);
        collect_messages(
            out,
            enums,
            comments,
            &full_name,
            Some(name),
            nested,
            nested_path,
        );
    }

    let fields = msg
        .field
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let mut field_path = path.clone();
            field_path.extend([MESSAGE_FIELD, index(i)]);
            Field {
                descriptor: field,
                leading_comments: comment_at(comments, &field_path),
            }
        })
        .collect();

    out.push(Message {
        descriptor: msg,
        full_name,
        parent_name,
        leading_comments: comment_at(comments, &path),
        fields,
    });
}

fn build_service<'a>(
    comments: &CommentIndex<'a>,
    svc: &'a ServiceDescriptorProto,
    path: Vec<i32>,
) -> Service<'a> {
    let methods = svc
        .method
        .iter()
        .enumerate()
        .map(|(i, method)| {
            let mut method_path = path.clone();
            method_path.extend([SERVICE_METHOD, index(i)]);
            Method {
                descriptor: method,
                leading_comments: comment_at(comments, &method_path),
            }
        })
        .collect();

    Service {
        descriptor: svc,
        leading_comments: comment_at(comments, &path),
        methods,
    }
}

/// One input file.
#[derive(Debug)]
pub struct ProtoFile<'a> {
    descriptor: &'a FileDescriptorProto,
    generate: bool,
    services: Vec<Service<'a>>,
    messages: Vec<Message<'a>>,
}

impl<'a> ProtoFile<'a> {
    /// File name relative to the include root (e.g., `library/v1/library.proto`).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.descriptor.name.as_deref().unwrap_or("")
    }

    /// Proto package (e.g., `library.v1`).
    #[must_use]
    pub fn package(&self) -> &'a str {
        self.descriptor.package.as_deref().unwrap_or("")
    }

    /// Whether this file was selected for generation.
    #[must_use]
    pub fn generate(&self) -> bool {
        self.generate
    }

    /// Services in declaration order.
    #[must_use]
    pub fn services(&self) -> &[Service<'a>] {
        &self.services
    }

    /// Every message in the file, nested messages before their parent.
    #[must_use]
    pub fn messages(&self) -> &[Message<'a>] {
        &self.messages
    }
}

/// One service with its methods.
#[derive(Debug)]
pub struct Service<'a> {
    descriptor: &'a ServiceDescriptorProto,
    leading_comments: String,
    methods: Vec<Method<'a>>,
}

impl<'a> Service<'a> {
    /// Service name (e.g., `LibraryService`).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.descriptor.name.as_deref().unwrap_or("")
    }

    /// Raw leading comment (empty when absent).
    #[must_use]
    pub fn leading_comments(&self) -> &str {
        &self.leading_comments
    }

    /// Methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[Method<'a>] {
        &self.methods
    }
}

/// One RPC method.
#[derive(Debug)]
pub struct Method<'a> {
    descriptor: &'a MethodDescriptorProto,
    leading_comments: String,
}

impl<'a> Method<'a> {
    /// Method name (e.g., `GetShelf`).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.descriptor.name.as_deref().unwrap_or("")
    }

    /// Fully-qualified input message name.
    #[must_use]
    pub fn input_type(&self) -> &'a str {
        self.descriptor.input_type.as_deref().unwrap_or("")
    }

    /// Fully-qualified output message name.
    #[must_use]
    pub fn output_type(&self) -> &'a str {
        self.descriptor.output_type.as_deref().unwrap_or("")
    }

    /// Raw leading comment (empty when absent).
    #[must_use]
    pub fn leading_comments(&self) -> &str {
        &self.leading_comments
    }

    /// The method's `google.api.http` binding, if annotated.
    #[must_use]
    pub fn http_binding(&self) -> Option<HttpBinding<'a>> {
        let rule = self.descriptor.options.as_ref()?.http.as_ref()?;
        let route = if let Some(HttpPattern::Custom(custom)) = &rule.pattern {
            HttpRoute::Unsupported {
                reason: "custom-unsupported",
                kind: custom.kind.as_str(),
            }
        } else if let Some((verb, path)) = descriptor::extract_http_pattern(self.descriptor) {
            HttpRoute::Bound { verb, path }
        } else {
            HttpRoute::Unsupported {
                reason: "unknown-unsupported",
                kind: "",
            }
        };
        Some(HttpBinding {
            route,
            body: rule.body.as_str(),
        })
    }
}

/// A resolved `google.api.http` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpBinding<'a> {
    /// Verb and URL template, or why the rule cannot be bound.
    pub route: HttpRoute<'a>,
    /// Body selector: `""` (none), `"*"` (whole input message) or a field name.
    pub body: &'a str,
}

/// Where an HTTP rule routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpRoute<'a> {
    /// One of the five standard verbs with its URL template.
    Bound {
        /// HTTP verb.
        verb: HttpVerb,
        /// URL template (e.g., `/v1/{name=shelves/*}`).
        path: &'a str,
    },
    /// A `custom` pattern or a rule without a pattern; never becomes an operation.
    Unsupported {
        /// Sentinel marker (`custom-unsupported` / `unknown-unsupported`).
        reason: &'static str,
        /// Custom verb, if any.
        kind: &'a str,
    },
}

/// One message (top-level or nested).
#[derive(Debug, Clone)]
pub struct Message<'a> {
    descriptor: &'a DescriptorProto,
    full_name: String,
    parent_name: Option<&'a str>,
    leading_comments: String,
    fields: Vec<Field<'a>>,
}

impl<'a> Message<'a> {
    /// Simple name (e.g., `Inner`).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.descriptor.name.as_deref().unwrap_or("")
    }

    /// Fully-qualified name with leading dot (e.g., `.pkg.Outer.Inner`).
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Base schema name: immediate parent and own name joined by `_`
    /// (`Outer_Inner`), or the plain name for top-level messages.
    #[must_use]
    pub fn schema_name(&self) -> String {
        match self.parent_name {
            Some(parent) => format!("{parent}_{}", self.name()),
            None => self.name().to_string(),
        }
    }

    /// Raw leading comment (empty when absent).
    #[must_use]
    pub fn leading_comments(&self) -> &str {
        &self.leading_comments
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field<'a>] {
        &self.fields
    }

    /// Whether this is the synthesized entry message of a map field.
    #[must_use]
    pub fn is_map_entry(&self) -> bool {
        self.descriptor
            .options
            .as_ref()
            .and_then(|o| o.map_entry)
            .unwrap_or(false)
    }

    /// First pattern of the message's `google.api.resource` annotation.
    #[must_use]
    pub fn resource_pattern(&self) -> Option<&'a str> {
        self.descriptor
            .options
            .as_ref()?
            .resource
            .as_ref()?
            .pattern
            .first()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

/// One field of a message.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    descriptor: &'a FieldDescriptorProto,
    leading_comments: String,
}

impl<'a> Field<'a> {
    /// Wrap a bare descriptor (no comments).
    #[must_use]
    pub fn new(descriptor: &'a FieldDescriptorProto) -> Self {
        Self {
            descriptor,
            leading_comments: String::new(),
        }
    }

    /// Proto field name (e.g., `display_name`).
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.descriptor.name.as_deref().unwrap_or("")
    }

    /// Canonical JSON name: the host-provided `json_name`, else the
    /// lowerCamelCase derivation `protoc` uses.
    #[must_use]
    pub fn json_name(&self) -> String {
        match self.descriptor.json_name.as_deref() {
            Some(json) if !json.is_empty() => json.to_string(),
            _ => to_json_name(self.name()),
        }
    }

    /// Raw leading comment (empty when absent).
    #[must_use]
    pub fn leading_comments(&self) -> &str {
        &self.leading_comments
    }

    /// Whether the field is `repeated` (maps included).
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.descriptor.label == Some(field_label::REPEATED)
    }

    /// The field's protobuf kind.
    #[must_use]
    pub fn kind(&self) -> FieldKind<'a> {
        let type_name = self.descriptor.type_name.as_deref().unwrap_or("");
        match self.descriptor.r#type.unwrap_or(0) {
            field_type::DOUBLE => FieldKind::Double,
            field_type::FLOAT => FieldKind::Float,
            field_type::INT64 => FieldKind::Int64,
            field_type::UINT64 => FieldKind::Uint64,
            field_type::INT32 => FieldKind::Int32,
            field_type::FIXED64 => FieldKind::Fixed64,
            field_type::FIXED32 => FieldKind::Fixed32,
            field_type::BOOL => FieldKind::Bool,
            field_type::STRING => FieldKind::String,
            field_type::GROUP => FieldKind::Group,
            field_type::MESSAGE => FieldKind::Message(type_name),
            field_type::BYTES => FieldKind::Bytes,
            field_type::UINT32 => FieldKind::Uint32,
            field_type::ENUM => FieldKind::Enum(type_name),
            field_type::SFIXED32 => FieldKind::Sfixed32,
            field_type::SFIXED64 => FieldKind::Sfixed64,
            field_type::SINT32 => FieldKind::Sint32,
            field_type::SINT64 => FieldKind::Sint64,
            other => FieldKind::Unknown(other),
        }
    }

    /// `google.api.field_behavior` flags; empty when unannotated.
    #[must_use]
    pub fn behaviors(&self) -> FieldBehaviors {
        let flags = self
            .descriptor
            .options
            .iter()
            .flat_map(|o| &o.field_behavior)
            .filter_map(|&v| FieldBehavior::try_from(v).ok())
            .collect();
        FieldBehaviors(flags)
    }

    /// `validate.rules` attached to the field, if any.
    #[must_use]
    pub fn validation_rules(&self) -> Option<&'a FieldRules> {
        self.descriptor.options.as_ref()?.rules.as_ref()
    }
}

/// `foo_bar_baz` → `fooBarBaz`, the way `protoc` derives `json_name`.
fn to_json_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut capitalize_next = false;

    for c in name.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Protobuf field kinds, with the referenced type name for messages and enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FieldKind<'a> {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message(&'a str),
    Bytes,
    Uint32,
    Enum(&'a str),
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    /// A type id this crate does not know.
    Unknown(i32),
}

impl FieldKind<'_> {
    /// Lower-case kind name as written in `.proto` source (e.g., `sfixed64`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Int32 => "int32",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Group => "group",
            Self::Message(_) => "message",
            Self::Bytes => "bytes",
            Self::Uint32 => "uint32",
            Self::Enum(_) => "enum",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Set of `google.api.field_behavior` flags on one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBehaviors(Vec<FieldBehavior>);

impl FieldBehaviors {
    /// Whether `behavior` is present.
    #[must_use]
    pub fn contains(&self, behavior: FieldBehavior) -> bool {
        self.0.contains(&behavior)
    }

    /// `REQUIRED`
    #[must_use]
    pub fn required(&self) -> bool {
        self.contains(FieldBehavior::Required)
    }

    /// `OUTPUT_ONLY`
    #[must_use]
    pub fn output_only(&self) -> bool {
        self.contains(FieldBehavior::OutputOnly)
    }

    /// `INPUT_ONLY`
    #[must_use]
    pub fn input_only(&self) -> bool {
        self.contains(FieldBehavior::InputOnly)
    }
}
