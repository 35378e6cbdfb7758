//! Document Assembler: paths, operations, tags and the component closure.
//!
//! One [`Generator`] lives for one invocation. It owns the schema request
//! queue (through its [`Translator`]) and the set of already generated
//! component names, so nothing leaks between invocations.

use std::collections::HashSet;

use proto_openapi_core::descriptor::HttpVerb;
use proto_openapi_core::walk::{FieldKind, HttpRoute, Message, Method, ProtoSet, Service};

use crate::config::{Configuration, Naming};
use crate::naming::{field_name, filter_comment, find_field_name, singular, summary};
use crate::openapi::{
    Document, Info, MediaType, NamedMap, Operation, Parameter, ParameterLocation, PathItem,
    RequestBody, Response, Schema, SchemaOrReference, SchemaType, Tag,
};
use crate::schema::{Translator, EMPTY, HTTP_BODY, STRUCT};
use crate::validate;

const JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Build the OpenAPI document for every file in `pool`.
///
/// Only files marked for generation contribute paths; messages from every
/// file are available to the component closure.
#[must_use]
pub fn build_document(pool: &ProtoSet<'_>, config: &Configuration) -> Document {
    Generator::new(pool, config).run()
}

struct Generator<'s, 'a> {
    config: &'s Configuration,
    translator: Translator<'s, 'a>,
    generated: HashSet<String>,
    document: Document,
}

impl<'s, 'a> Generator<'s, 'a> {
    fn new(pool: &'s ProtoSet<'a>, config: &'s Configuration) -> Self {
        Self {
            config,
            translator: Translator::new(pool, config.naming, config.validate),
            generated: HashSet::new(),
            document: Document::new(Info {
                title: config.title.clone(),
                description: config.description.clone(),
                version: config.version.clone(),
            }),
        }
    }

    fn run(mut self) -> Document {
        let pool = self.translator.pool();
        for file in pool.files().iter().filter(|f| f.generate()) {
            for service in file.services() {
                self.add_service(service);
            }
        }

        self.infer_title();
        self.close_schemas();

        let document = &mut self.document;
        document.tags.sort_by(|a, b| a.name.cmp(&b.name));
        document.paths.sort_by_name();
        document.components.schemas.sort_by_name();

        self.document
    }

    fn add_service(&mut self, service: &Service<'a>) {
        let mut operations = 0;

        for method in service.methods() {
            let Some(binding) = method.http_binding() else {
                continue;
            };
            match binding.route {
                HttpRoute::Bound { verb, path } => {
                    let (path, operation) =
                        self.build_operation(service, method, path, binding.body);
                    install(&mut self.document.paths, &path, verb, operation);
                    operations += 1;
                }
                HttpRoute::Unsupported { reason, kind } => {
                    tracing::debug!(
                        method = method.name(),
                        reason,
                        kind,
                        "http rule has no standard verb, skipping"
                    );
                }
            }
        }

        if operations > 0 {
            self.document.tags.push(Tag {
                name: service.name().to_string(),
                description: filter_comment(service.leading_comments(), false),
            });
        }
    }

    fn build_operation(
        &mut self,
        service: &Service<'a>,
        method: &Method<'a>,
        template: &str,
        body: &str,
    ) -> (String, Operation) {
        let pool = self.translator.pool();
        let naming = self.translator.naming();
        let input = pool.message(method.input_type());

        let bound = bind_path(template, input, naming);
        let mut covered = bound.covered;
        if !body.is_empty() {
            covered.push(body.to_string());
        }

        let mut parameters: Vec<Parameter> = bound
            .simple
            .into_iter()
            .map(|name| path_parameter(name, String::new()))
            .chain(bound.named.into_iter().map(|name| {
                let description = format!("The {name} id.");
                path_parameter(name, description)
            }))
            .collect();

        if body != "*" {
            for field in input.iter().flat_map(|m| m.fields()) {
                if covered.iter().any(|c| c == field.name()) {
                    continue;
                }
                let mut schema = coalesce_to_string(self.translator.schema_for_field(field));
                if self.config.validate {
                    validate::apply(pool, field, &mut schema);
                }
                parameters.push(Parameter {
                    name: field_name(naming, field),
                    location: ParameterLocation::Query,
                    description: filter_comment(field.leading_comments(), true),
                    required: false,
                    schema,
                });
            }
        }

        let request_body = (!body.is_empty()).then(|| self.request_body(method, input, body));

        let mut responses = NamedMap::new();
        responses.insert(
            "200",
            Response {
                description: "OK".to_string(),
                content: self.response_content(method.output_type()),
            },
        );

        let operation = Operation {
            tags: vec![service.name().to_string()],
            summary: summary(method.leading_comments(), method.name()),
            description: filter_comment(method.leading_comments(), false),
            operation_id: format!("{}_{}", service.name(), method.name()),
            parameters,
            request_body,
            responses,
        };

        (bound.path, operation)
    }

    fn request_body(
        &mut self,
        method: &Method<'a>,
        input: Option<&Message<'a>>,
        body: &str,
    ) -> RequestBody {
        let schema = if body == "*" {
            Some(self.body_schema(method.input_type()))
        } else {
            match input.and_then(|m| m.fields().iter().find(|f| f.name() == body)) {
                Some(field) => match field.kind() {
                    FieldKind::String => Some(Schema::of(SchemaType::String).into()),
                    FieldKind::Message(type_name) => Some(self.body_schema(type_name)),
                    other => {
                        tracing::warn!(
                            method = method.name(),
                            body,
                            kind = other.name(),
                            "unsupported body field type"
                        );
                        None
                    }
                },
                None => {
                    tracing::warn!(
                        method = method.name(),
                        body,
                        "body field not found in input message"
                    );
                    None
                }
            }
        };

        let mut content = NamedMap::new();
        content.insert(JSON, MediaType { schema });
        RequestBody {
            content,
            required: true,
        }
    }

    fn body_schema(&mut self, type_name: &str) -> SchemaOrReference {
        match type_name {
            EMPTY | STRUCT => Schema::of(SchemaType::Object).into(),
            _ => self.translator.reference(type_name),
        }
    }

    fn response_content(&mut self, output_type: &str) -> NamedMap<MediaType> {
        let mut content = NamedMap::new();
        match output_type {
            EMPTY | STRUCT => {}
            HTTP_BODY => {
                content.insert(OCTET_STREAM, MediaType::default());
            }
            _ => {
                let schema = self.translator.reference(output_type);
                content.insert(
                    JSON,
                    MediaType {
                        schema: Some(schema),
                    },
                );
            }
        }
        content
    }

    /// Backfill title and description from the only tag, if there is one.
    fn infer_title(&mut self) {
        let [tag] = self.document.tags.as_mut_slice() else {
            return;
        };
        let info = &mut self.document.info;
        if info.title.is_empty() && !tag.name.is_empty() {
            info.title = format!("{} API", tag.name);
        }
        if info.description.is_empty() {
            info.description = std::mem::take(&mut tag.description);
        }
        tag.description.clear();
    }

    /// Emit every requested component, including those requested while
    /// emitting others.
    fn close_schemas(&mut self) {
        let pool = self.translator.pool();

        while let Some(full_name) = self.translator.requests().next() {
            if self.generated.contains(&full_name) {
                continue;
            }
            let Some(message) = pool.message(&full_name) else {
                tracing::warn!(
                    type_name = %full_name,
                    "referenced message not found in descriptors"
                );
                continue;
            };
            self.generated.insert(full_name.clone());

            let name = self.translator.schema_name(&full_name);
            let schema = self.translator.message_schema(message);
            let previous = self.document.components.schemas.insert(name.clone(), schema.into());
            if previous.is_some() {
                tracing::warn!(
                    schema = %name,
                    type_name = %full_name,
                    "duplicate component name, replacing"
                );
            }
        }
    }
}

/// Install `operation` under `path`/`verb`, replacing any earlier one.
fn install(paths: &mut NamedMap<PathItem>, path: &str, verb: HttpVerb, operation: Operation) {
    let item = paths.get_or_insert_with(path, PathItem::default);
    let slot = match verb {
        HttpVerb::Get => &mut item.get,
        HttpVerb::Put => &mut item.put,
        HttpVerb::Post => &mut item.post,
        HttpVerb::Delete => &mut item.delete,
        HttpVerb::Patch => &mut item.patch,
    };
    *slot = Some(operation);
}

fn path_parameter(name: String, description: String) -> Parameter {
    Parameter {
        name,
        location: ParameterLocation::Path,
        description,
        required: true,
        schema: Schema::of(SchemaType::String).into(),
    }
}

/// Query parameters only carry numbers, integers and plain strings.
fn coalesce_to_string(schema: Option<SchemaOrReference>) -> SchemaOrReference {
    match schema {
        Some(schema)
            if schema.as_schema().is_some_and(|s| {
                matches!(s.schema_type, Some(SchemaType::Number | SchemaType::Integer))
            }) =>
        {
            schema
        }
        _ => Schema::of(SchemaType::String).into(),
    }
}

/// A URL template rewritten to OpenAPI form.
#[derive(Debug, Default, PartialEq, Eq)]
struct BoundPath {
    /// Rewritten path, e.g. `/v1/shelves/{shelf}`.
    path: String,
    /// Parameter names from `{field}` tokens, in order.
    simple: Vec<String>,
    /// Parameter names from the `{field=collection/*}` capture, in order.
    named: Vec<String>,
    /// Input fields consumed by the path.
    covered: Vec<String>,
}

/// `book` for `book.name`: the input field a path variable binds.
fn top_field(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Rewrite `template`'s `{field}` tokens and its first `{field=pattern}`
/// capture into OpenAPI path parameters.
fn bind_path(template: &str, input: Option<&Message<'_>>, naming: Naming) -> BoundPath {
    let mut bound = BoundPath::default();
    let mut rest = template;
    let mut captured = false;

    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        bound.path.push_str(&rest[..open]);
        let token = &rest[open + 1..open + len];
        rest = &rest[open + len + 1..];

        match token.split_once('=') {
            None => {
                bound.covered.push(top_field(token).to_string());
                let name = find_field_name(naming, input, token);
                bound.path.push('{');
                bound.path.push_str(&name);
                bound.path.push('}');
                bound.simple.push(name);
            }
            Some((field, pattern)) if !captured => {
                captured = true;
                bound.covered.push(top_field(field).to_string());

                let mut parts: Vec<String> = pattern.split('/').map(ToString::to_string).collect();
                for i in (0..parts.len().saturating_sub(1)).step_by(2) {
                    let name = singular(&find_field_name(naming, input, &parts[i]));
                    parts[i + 1] = format!("{{{name}}}");
                    bound.named.push(name);
                }

                // `/v1/shelves/{name=shelves/*}` must not repeat `shelves`.
                let lead = format!("/{}/", parts[0]);
                if bound.path.ends_with(&lead) {
                    bound.path.truncate(bound.path.len() - lead.len() + 1);
                }
                bound.path.push_str(&parts.join("/"));
            }
            Some(_) => {
                bound.path.push('{');
                bound.path.push_str(token);
                bound.path.push('}');
            }
        }
    }

    bound.path.push_str(rest);
    bound
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proto_openapi_core::descriptor::{
        field_label, field_type, DescriptorProto, FieldDescriptorProto, FileDescriptorProto,
        HttpPattern, HttpRule, MethodDescriptorProto, MethodOptions, ServiceDescriptorProto,
    };

    use super::*;

    fn make_field(name: &str, ty: i32, type_name: Option<&str>) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(1),
            label: Some(field_label::OPTIONAL),
            r#type: Some(ty),
            type_name: type_name.map(ToString::to_string),
            ..Default::default()
        }
    }

    fn make_message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            ..Default::default()
        }
    }

    fn make_method(
        name: &str,
        input: &str,
        output: &str,
        pattern: HttpPattern,
        body: &str,
    ) -> MethodDescriptorProto {
        MethodDescriptorProto {
            name: Some(name.to_string()),
            input_type: Some(input.to_string()),
            output_type: Some(output.to_string()),
            options: Some(MethodOptions {
                http: Some(HttpRule {
                    pattern: Some(pattern),
                    body: body.to_string(),
                }),
            }),
            ..Default::default()
        }
    }

    fn make_file(
        messages: Vec<DescriptorProto>,
        methods: Vec<MethodDescriptorProto>,
    ) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("test.proto".to_string()),
            package: Some("test.v1".to_string()),
            message_type: messages,
            service: vec![ServiceDescriptorProto {
                name: Some("Library".to_string()),
                method: methods,
            }],
            ..Default::default()
        }
    }

    /// `GET /v1/x` from `GetRequest` to `Shelf`.
    fn get_x(name: &str) -> MethodDescriptorProto {
        make_method(
            name,
            ".test.v1.GetRequest",
            ".test.v1.Shelf",
            HttpPattern::Get("/v1/x".into()),
            "",
        )
    }

    fn input_message() -> DescriptorProto {
        make_message(
            "GetRequest",
            vec![
                make_field("name", field_type::STRING, None),
                make_field("message_id", field_type::STRING, None),
            ],
        )
    }

    fn bind(template: &str, naming: Naming) -> BoundPath {
        let files = vec![make_file(vec![input_message()], vec![])];
        let pool = ProtoSet::new(&files, |_| true);
        bind_path(template, pool.message(".test.v1.GetRequest"), naming)
    }

    #[test]
    fn simple_token_follows_naming() {
        let bound = bind("/v1/messages/{message_id}", Naming::Json);
        assert_eq!(bound.path, "/v1/messages/{messageId}");
        assert_eq!(bound.simple, vec!["messageId"]);
        assert_eq!(bound.covered, vec!["message_id"]);

        let bound = bind("/v1/messages/{message_id}", Naming::Proto);
        assert_eq!(bound.path, "/v1/messages/{message_id}");
        assert_eq!(bound.simple, vec!["message_id"]);
    }

    #[test]
    fn simple_token_rewrite_is_token_exact() {
        let bound = bind("/v1/message_id/{message_id}", Naming::Json);
        assert_eq!(bound.path, "/v1/message_id/{messageId}");
    }

    #[test]
    fn named_capture_is_singularized() {
        let bound = bind("/v1/{name=shelves/*}", Naming::Json);
        assert_eq!(bound.path, "/v1/shelves/{shelf}");
        assert_eq!(bound.named, vec!["shelf"]);
        assert_eq!(bound.covered, vec!["name"]);
    }

    #[test]
    fn named_capture_does_not_repeat_literal() {
        let bound = bind("/v1/shelves/{name=shelves/*}", Naming::Json);
        assert_eq!(bound.path, "/v1/shelves/{shelf}");
        assert_eq!(bound.named, vec!["shelf"]);
    }

    #[test]
    fn named_capture_with_several_collections() {
        let bound = bind("/v1/{name=shelves/*/books/*}:archive", Naming::Json);
        assert_eq!(bound.path, "/v1/shelves/{shelf}/books/{book}:archive");
        assert_eq!(bound.named, vec!["shelf", "book"]);
    }

    #[test]
    fn nested_token_covers_top_field() {
        let bound = bind("/v1/{book.name}", Naming::Json);
        assert_eq!(bound.path, "/v1/{book.name}");
        assert_eq!(bound.covered, vec!["book"]);
    }

    #[test]
    fn dotted_capture_covers_top_field() {
        let bound = bind("/v1/{book.name=shelves/*/books/*}", Naming::Json);
        assert_eq!(bound.path, "/v1/shelves/{shelf}/books/{book}");
        assert_eq!(bound.named, vec!["shelf", "book"]);
        assert_eq!(bound.covered, vec!["book"]);
    }

    #[test]
    fn dotted_capture_field_is_not_a_query_parameter() {
        let book = make_message("Book", vec![make_field("name", field_type::STRING, None)]);
        let request = make_message(
            "GetBookRequest",
            vec![
                make_field("book", field_type::MESSAGE, Some(".test.v1.Book")),
                make_field("view", field_type::STRING, None),
            ],
        );
        let files = vec![make_file(
            vec![book, request],
            vec![make_method(
                "GetBook",
                ".test.v1.GetBookRequest",
                ".test.v1.Book",
                HttpPattern::Get("/v1/{book.name=shelves/*/books/*}".into()),
                "",
            )],
        )];
        let pool = ProtoSet::new(&files, |_| true);
        let document = build_document(&pool, &Configuration::default());

        let get = document
            .paths
            .get("/v1/shelves/{shelf}/books/{book}")
            .and_then(|p| p.get.as_ref())
            .unwrap();
        let params: Vec<(&str, ParameterLocation)> = get
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location))
            .collect();
        assert_eq!(
            params,
            vec![
                ("shelf", ParameterLocation::Path),
                ("book", ParameterLocation::Path),
                ("view", ParameterLocation::Query),
            ]
        );
    }

    #[test]
    fn second_capture_is_left_verbatim() {
        let bound = bind("/v1/{name=shelves/*}/{parent=a/*}", Naming::Json);
        assert_eq!(bound.path, "/v1/shelves/{shelf}/{parent=a/*}");
        assert_eq!(bound.covered, vec!["name"]);
    }

    #[test]
    fn coalesce_keeps_numbers_only() {
        let integer: SchemaOrReference =
            Schema::of(SchemaType::Integer).with_format("int32").into();
        assert_eq!(coalesce_to_string(Some(integer.clone())), integer);

        let string: SchemaOrReference = Schema::of(SchemaType::String).into();
        let array: SchemaOrReference = Schema::of(SchemaType::Array).into();
        assert_eq!(coalesce_to_string(Some(array)), string);
        assert_eq!(coalesce_to_string(Some(SchemaOrReference::reference("X"))), string);
        assert_eq!(coalesce_to_string(None), string);
        let bytes: SchemaOrReference = Schema::of(SchemaType::String).with_format("bytes").into();
        assert_eq!(coalesce_to_string(Some(bytes)), string);
    }

    #[test]
    fn later_binding_wins() {
        let files = vec![make_file(
            vec![input_message(), make_message("Shelf", vec![])],
            vec![get_x("First"), get_x("Second")],
        )];
        let pool = ProtoSet::new(&files, |_| true);
        let document = build_document(&pool, &Configuration::default());

        assert_eq!(document.paths.len(), 1);
        let get = document.paths.get("/v1/x").and_then(|p| p.get.as_ref()).unwrap();
        assert_eq!(get.operation_id, "Library_Second");
    }

    #[test]
    fn closure_skips_unknown_types() {
        let files = vec![make_file(
            vec![input_message()],
            vec![make_method(
                "Get",
                ".test.v1.GetRequest",
                ".elsewhere.Missing",
                HttpPattern::Get("/v1/x".into()),
                "",
            )],
        )];
        let pool = ProtoSet::new(&files, |_| true);
        let document = build_document(&pool, &Configuration::default());
        assert!(document.components.schemas.is_empty());
        let get = document.paths.get("/v1/x").and_then(|p| p.get.as_ref()).unwrap();
        let schema = get.responses.get("200").unwrap().content.get(JSON).unwrap().schema.as_ref();
        assert_eq!(schema, Some(&SchemaOrReference::reference("Missing")));
    }

    #[test]
    fn single_tag_moves_description_to_info() {
        let mut file = make_file(
            vec![input_message(), make_message("Shelf", vec![])],
            vec![get_x("Get")],
        );
        file.source_code_info = Some(proto_openapi_core::descriptor::SourceCodeInfo {
            location: vec![proto_openapi_core::descriptor::Location {
                path: vec![6, 0],
                leading_comments: Some(" Manages shelves.\n".to_string()),
                trailing_comments: None,
            }],
        });
        let files = vec![file];
        let pool = ProtoSet::new(&files, |_| true);
        let document = build_document(&pool, &Configuration::default());

        assert_eq!(document.info.title, "Library API");
        assert_eq!(document.info.description, "Manages shelves.");
        assert_eq!(document.tags.len(), 1);
        assert_eq!(document.tags[0].description, "");
    }

    #[test]
    fn configured_title_is_kept() {
        let files = vec![make_file(
            vec![input_message(), make_message("Shelf", vec![])],
            vec![get_x("Get")],
        )];
        let pool = ProtoSet::new(&files, |_| true);
        let config = Configuration::default().with_title("Books");
        let document = build_document(&pool, &config);
        assert_eq!(document.info.title, "Books");
    }

    #[test]
    fn files_not_selected_add_no_paths() {
        let files = vec![make_file(
            vec![input_message(), make_message("Shelf", vec![])],
            vec![get_x("Get")],
        )];
        let pool = ProtoSet::new(&files, |_| false);
        let document = build_document(&pool, &Configuration::default());
        assert!(document.paths.is_empty());
        assert!(document.tags.is_empty());
        assert!(document.components.schemas.is_empty());
    }
}
