//! Minimal protobuf descriptor types with option-extension support.
//!
//! Standard [`prost_types`](https://docs.rs/prost-types) descriptors drop
//! extension fields during decoding because prost doesn't retain unknown
//! fields. These custom types declare the extensions the generator reads as
//! ordinary fields so they survive decoding:
//!
//! | Extension                   | Extendee         | Field      |
//! |-----------------------------|------------------|------------|
//! | `google.api.http`           | `MethodOptions`  | 72295728   |
//! | `google.api.resource`       | `MessageOptions` | 1053       |
//! | `google.api.field_behavior` | `FieldOptions`   | 1052       |
//! | `validate.rules`            | `FieldOptions`   | 1071       |

#[allow(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
mod types {
    use prost::Message;

    /// Request sent by `protoc` (or `buf`) to a compiler plugin on stdin.
    #[derive(Clone, PartialEq, Message)]
    pub struct CodeGeneratorRequest {
        /// Files explicitly listed on the command line; only these produce output.
        #[prost(string, repeated, tag = "1")]
        pub file_to_generate: Vec<String>,
        /// Plugin parameter string (`--openapi_out=<parameter>:<dir>`).
        #[prost(string, optional, tag = "2")]
        pub parameter: Option<String>,
        /// All files in `file_to_generate` plus everything they import,
        /// in topological order.
        #[prost(message, repeated, tag = "15")]
        pub proto_file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorSet {
        #[prost(message, repeated, tag = "1")]
        pub file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub package: Option<String>,
        #[prost(message, repeated, tag = "4")]
        pub message_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "5")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, repeated, tag = "6")]
        pub service: Vec<ServiceDescriptorProto>,
        /// Comments and spans; only present with `--include_source_info`
        /// or when invoked as a plugin.
        #[prost(message, optional, tag = "9")]
        pub source_code_info: Option<SourceCodeInfo>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct DescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub field: Vec<FieldDescriptorProto>,
        #[prost(message, repeated, tag = "3")]
        pub nested_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "4")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, optional, tag = "7")]
        pub options: Option<MessageOptions>,
    }

    /// Message options with the `google.api.resource` extension (field 1053).
    #[derive(Clone, PartialEq, Message)]
    pub struct MessageOptions {
        /// Set by `protoc` on the synthesized `XxxEntry` message of a map field.
        #[prost(bool, optional, tag = "7")]
        pub map_entry: Option<bool>,
        #[prost(message, optional, tag = "1053")]
        pub resource: Option<ResourceDescriptor>,
    }

    /// [`google.api.ResourceDescriptor`]: the canonical name shape of a resource.
    #[derive(Clone, PartialEq, Message)]
    pub struct ResourceDescriptor {
        /// Resource type, e.g. `library.googleapis.com/Shelf`.
        #[prost(string, tag = "1")]
        pub r#type: String,
        /// Name patterns, e.g. `shelves/{shelf}`.
        #[prost(string, repeated, tag = "2")]
        pub pattern: Vec<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FieldDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "3")]
        pub number: Option<i32>,
        /// 1=optional, 2=required, 3=repeated.
        #[prost(int32, optional, tag = "4")]
        pub label: Option<i32>,
        /// Protobuf field type enum: 1=double, 5=int32, 9=string, 11=message, 14=enum, …
        #[prost(int32, optional, tag = "5")]
        pub r#type: Option<i32>,
        /// Fully-qualified type name for message/enum fields (e.g., `.library.v1.Shelf`).
        #[prost(string, optional, tag = "6")]
        pub type_name: Option<String>,
        /// Field options including behavior flags and validation rules.
        #[prost(message, optional, tag = "8")]
        pub options: Option<FieldOptions>,
        /// Canonical lowerCamelCase JSON name, filled in by `protoc`.
        #[prost(string, optional, tag = "10")]
        pub json_name: Option<String>,
    }

    /// Field-level options: `google.api.field_behavior` and `validate.rules`.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldOptions {
        #[prost(
            enumeration = "FieldBehavior",
            repeated,
            packed = "false",
            tag = "1052"
        )]
        pub field_behavior: Vec<i32>,
        /// `validate.rules` extension (tag 1071 from validate.proto).
        #[prost(message, optional, tag = "1071")]
        pub rules: Option<FieldRules>,
    }

    /// [`google.api.FieldBehavior`] values.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum FieldBehavior {
        Unspecified = 0,
        Optional = 1,
        Required = 2,
        OutputOnly = 3,
        InputOnly = 4,
        Immutable = 5,
        UnorderedList = 6,
        NonEmptyDefault = 7,
        Identifier = 8,
    }

    /// Minimal `validate.FieldRules`, only the rule types mapped to OpenAPI.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldRules {
        #[prost(message, optional, tag = "3")]
        pub int32: Option<Int32Rules>,
        #[prost(message, optional, tag = "4")]
        pub int64: Option<Int64Rules>,
        #[prost(message, optional, tag = "14")]
        pub string: Option<StringRules>,
        #[prost(message, optional, tag = "16")]
        pub r#enum: Option<EnumRules>,
        #[prost(message, optional, tag = "18")]
        pub repeated: Option<RepeatedRules>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct StringRules {
        #[prost(uint64, optional, tag = "2")]
        pub min_len: Option<u64>,
        #[prost(uint64, optional, tag = "3")]
        pub max_len: Option<u64>,
        #[prost(string, optional, tag = "6")]
        pub pattern: Option<String>,
        /// `well_known` oneof members, in `validate.proto` order.
        #[prost(bool, optional, tag = "12")]
        pub email: Option<bool>,
        #[prost(bool, optional, tag = "13")]
        pub hostname: Option<bool>,
        #[prost(bool, optional, tag = "14")]
        pub ip: Option<bool>,
        #[prost(bool, optional, tag = "15")]
        pub ipv4: Option<bool>,
        #[prost(bool, optional, tag = "16")]
        pub ipv6: Option<bool>,
        #[prost(bool, optional, tag = "17")]
        pub uri: Option<bool>,
        #[prost(bool, optional, tag = "18")]
        pub uri_ref: Option<bool>,
        #[prost(bool, optional, tag = "22")]
        pub uuid: Option<bool>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Int32Rules {
        #[prost(int32, optional, tag = "2")]
        pub lt: Option<i32>,
        #[prost(int32, optional, tag = "3")]
        pub lte: Option<i32>,
        #[prost(int32, optional, tag = "4")]
        pub gt: Option<i32>,
        #[prost(int32, optional, tag = "5")]
        pub gte: Option<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct Int64Rules {
        #[prost(int64, optional, tag = "2")]
        pub lt: Option<i64>,
        #[prost(int64, optional, tag = "3")]
        pub lte: Option<i64>,
        #[prost(int64, optional, tag = "4")]
        pub gt: Option<i64>,
        #[prost(int64, optional, tag = "5")]
        pub gte: Option<i64>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumRules {
        #[prost(int32, optional, tag = "1")]
        pub r#const: Option<i32>,
        #[prost(int32, repeated, packed = "false", tag = "3")]
        pub r#in: Vec<i32>,
        #[prost(int32, repeated, packed = "false", tag = "4")]
        pub not_in: Vec<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct RepeatedRules {
        #[prost(uint64, optional, tag = "1")]
        pub min_items: Option<u64>,
        #[prost(uint64, optional, tag = "2")]
        pub max_items: Option<u64>,
        /// Rules applied to every item of the repeated field.
        #[prost(message, optional, boxed, tag = "4")]
        pub items: Option<Box<FieldRules>>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub value: Vec<EnumValueDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "2")]
        pub number: Option<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub method: Vec<MethodDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MethodDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub input_type: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub output_type: Option<String>,
        #[prost(message, optional, tag = "4")]
        pub options: Option<MethodOptions>,
        #[prost(bool, optional, tag = "5")]
        pub client_streaming: Option<bool>,
        #[prost(bool, optional, tag = "6")]
        pub server_streaming: Option<bool>,
    }

    /// Method options with the `google.api.http` extension (field 72295728).
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodOptions {
        #[prost(message, optional, tag = "72295728")]
        pub http: Option<HttpRule>,
    }

    /// [`google.api.HttpRule`]: defines REST mapping for an RPC.
    #[derive(Clone, PartialEq, Message)]
    pub struct HttpRule {
        #[prost(oneof = "HttpPattern", tags = "2, 3, 4, 5, 6, 8")]
        pub pattern: Option<HttpPattern>,
        #[prost(string, tag = "7")]
        pub body: String,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum HttpPattern {
        #[prost(string, tag = "2")]
        Get(String),
        #[prost(string, tag = "3")]
        Put(String),
        #[prost(string, tag = "4")]
        Post(String),
        #[prost(string, tag = "5")]
        Delete(String),
        #[prost(string, tag = "6")]
        Patch(String),
        #[prost(message, tag = "8")]
        Custom(CustomHttpPattern),
    }

    /// A verb outside the five standard ones, e.g. `HEAD`.
    #[derive(Clone, PartialEq, Message)]
    pub struct CustomHttpPattern {
        #[prost(string, tag = "1")]
        pub kind: String,
        #[prost(string, tag = "2")]
        pub path: String,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct SourceCodeInfo {
        #[prost(message, repeated, tag = "1")]
        pub location: Vec<Location>,
    }

    /// One commented/spanned element, addressed by its descriptor path.
    #[derive(Clone, PartialEq, Message)]
    pub struct Location {
        #[prost(int32, repeated, tag = "1")]
        pub path: Vec<i32>,
        #[prost(string, optional, tag = "3")]
        pub leading_comments: Option<String>,
        #[prost(string, optional, tag = "4")]
        pub trailing_comments: Option<String>,
    }
}

pub use types::*;

/// Proto field type constants (from `google.protobuf.FieldDescriptorProto.Type`).
pub mod field_type {
    /// `TYPE_DOUBLE = 1`
    pub const DOUBLE: i32 = 1;
    /// `TYPE_FLOAT = 2`
    pub const FLOAT: i32 = 2;
    /// `TYPE_INT64 = 3`
    pub const INT64: i32 = 3;
    /// `TYPE_UINT64 = 4`
    pub const UINT64: i32 = 4;
    /// `TYPE_INT32 = 5`
    pub const INT32: i32 = 5;
    /// `TYPE_FIXED64 = 6`
    pub const FIXED64: i32 = 6;
    /// `TYPE_FIXED32 = 7`
    pub const FIXED32: i32 = 7;
    /// `TYPE_BOOL = 8`
    pub const BOOL: i32 = 8;
    /// `TYPE_STRING = 9`
    pub const STRING: i32 = 9;
    /// `TYPE_GROUP = 10`
    pub const GROUP: i32 = 10;
    /// `TYPE_MESSAGE = 11`
    pub const MESSAGE: i32 = 11;
    /// `TYPE_BYTES = 12`
    pub const BYTES: i32 = 12;
    /// `TYPE_UINT32 = 13`
    pub const UINT32: i32 = 13;
    /// `TYPE_ENUM = 14`
    pub const ENUM: i32 = 14;
    /// `TYPE_SFIXED32 = 15`
    pub const SFIXED32: i32 = 15;
    /// `TYPE_SFIXED64 = 16`
    pub const SFIXED64: i32 = 16;
    /// `TYPE_SINT32 = 17`
    pub const SINT32: i32 = 17;
    /// `TYPE_SINT64 = 18`
    pub const SINT64: i32 = 18;
}

/// Proto field label constants (from `google.protobuf.FieldDescriptorProto.Label`).
pub mod field_label {
    /// `LABEL_OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `LABEL_REQUIRED = 2`
    pub const REQUIRED: i32 = 2;
    /// `LABEL_REPEATED = 3`
    pub const REPEATED: i32 = 3;
}

/// HTTP verbs a `google.api.http` rule can bind to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
}

impl HttpVerb {
    /// Upper-case verb name (e.g., `"GET"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

/// Extract `(verb, path)` from a method's `google.api.http` annotation.
///
/// Returns `None` when the method has no annotation, the rule carries no
/// pattern, or the pattern is a `custom` verb.
#[must_use]
pub fn extract_http_pattern(method: &MethodDescriptorProto) -> Option<(HttpVerb, &str)> {
    let pattern = method
        .options
        .as_ref()
        .and_then(|o| o.http.as_ref())
        .and_then(|h| h.pattern.as_ref())?;

    Some(match pattern {
        HttpPattern::Get(p) => (HttpVerb::Get, p.as_str()),
        HttpPattern::Put(p) => (HttpVerb::Put, p.as_str()),
        HttpPattern::Post(p) => (HttpVerb::Post, p.as_str()),
        HttpPattern::Delete(p) => (HttpVerb::Delete, p.as_str()),
        HttpPattern::Patch(p) => (HttpVerb::Patch, p.as_str()),
        HttpPattern::Custom(_) => return None,
    })
}
