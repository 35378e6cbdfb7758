//! Name formatting and comment clean-up shared by the translator and assembler.

use proto_openapi_core::walk::{Field, Message};

use crate::config::Naming;

/// Schema name for a message's base name (`Outer_Inner` for nested ones).
///
/// [`Naming::Proto`] keeps it verbatim; [`Naming::Json`] upper-cases the
/// first letter and leaves the rest untouched.
pub(crate) fn message_name(naming: Naming, base: &str) -> String {
    match naming {
        Naming::Proto => base.to_string(),
        Naming::Json => {
            let mut chars = base.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

/// Property/parameter name for a field.
pub(crate) fn field_name(naming: Naming, field: &Field<'_>) -> String {
    match naming {
        Naming::Proto => field.name().to_string(),
        Naming::Json => field.json_name(),
    }
}

/// Format `name` as a field of `message` if such a field exists, else return
/// it unchanged.
pub(crate) fn find_field_name(naming: Naming, message: Option<&Message<'_>>, name: &str) -> String {
    message
        .and_then(|m| m.fields().iter().find(|f| f.name() == name))
        .map_or_else(|| name.to_string(), |f| field_name(naming, f))
}

/// Singular form of a collection segment: `shelves` → `shelf`,
/// `libraries` → `library`, `books` → `book`.
pub(crate) fn singular(plural: &str) -> String {
    if let Some(stem) = plural.strip_suffix("ves") {
        return format!("{stem}f");
    }
    if let Some(stem) = plural.strip_suffix("ies") {
        return format!("{stem}y");
    }
    plural.strip_suffix('s').unwrap_or(plural).to_string()
}

/// Clean a leading comment for use as a description.
///
/// Keeps only the text after the first `|` when present, optionally joins
/// lines, removes `(-- ... --)` API-linter directives and trims.
pub(crate) fn filter_comment(comment: &str, remove_newlines: bool) -> String {
    let text = comment.split_once('|').map_or(comment, |(_, after)| after);
    let text = if remove_newlines {
        text.replace('\n', "")
    } else {
        text.to_string()
    };
    strip_linter_rules(&text).trim().to_string()
}

/// Operation summary: the comment up to its first newline, comma or period,
/// falling back to `method_name` when nothing is left.
pub(crate) fn summary(comment: &str, method_name: &str) -> String {
    let head = comment
        .split(['\n', ',', '.'])
        .next()
        .unwrap_or_default();
    let head = strip_linter_rules(head);
    let head = head.trim();
    if head.is_empty() {
        method_name.trim().to_string()
    } else {
        head.to_string()
    }
}

/// Remove every `(-- ... --)` directive, including ones spanning lines.
fn strip_linter_rules(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("(--") {
        let Some(len) = rest[start + 3..].find("--)") else {
            break;
        };
        result.push_str(&rest[..start]);
        rest = &rest[start + 3 + len + 3..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proto_openapi_core::descriptor::{field_type, FieldDescriptorProto};

    use super::*;

    fn make_field(name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            r#type: Some(field_type::STRING),
            ..Default::default()
        }
    }

    #[test]
    fn message_name_by_mode() {
        assert_eq!(message_name(Naming::Json, "shelf_Book"), "Shelf_Book");
        assert_eq!(message_name(Naming::Proto, "shelf_Book"), "shelf_Book");
        assert_eq!(message_name(Naming::Json, "a"), "A");
        assert_eq!(message_name(Naming::Json, ""), "");
    }

    #[test]
    fn field_name_by_mode() {
        let descriptor = make_field("message_id");
        let field = Field::new(&descriptor);
        assert_eq!(field_name(Naming::Proto, &field), "message_id");
        assert_eq!(field_name(Naming::Json, &field), "messageId");
    }

    #[test]
    fn find_field_name_falls_back_to_input() {
        assert_eq!(find_field_name(Naming::Json, None, "shelves"), "shelves");
    }

    #[test]
    fn singular_suffix_rules() {
        assert_eq!(singular("shelves"), "shelf");
        assert_eq!(singular("libraries"), "library");
        assert_eq!(singular("books"), "book");
        assert_eq!(singular("data"), "data");
    }

    #[test]
    fn filter_keeps_text_after_pipe() {
        assert_eq!(
            filter_comment(" Internal note | Public text.\n", false),
            "Public text."
        );
    }

    #[test]
    fn filter_removes_newlines_on_request() {
        assert_eq!(filter_comment(" First line\n second line\n", true), "First line second line");
        assert_eq!(
            filter_comment(" First line\n second line\n", false),
            "First line\n second line"
        );
    }

    #[test]
    fn filter_strips_linter_directives() {
        let comment = " Gets a shelf.\n (-- api-linter: core::0131=disabled\n     \
                       aip.dev/not-precedent: reasons --)\n";
        assert_eq!(filter_comment(comment, false), "Gets a shelf.");
        assert_eq!(filter_comment("(-- only --)", true), "");
    }

    #[test]
    fn summary_takes_first_clause() {
        assert_eq!(summary(" Gets a shelf, by name.\n", "GetShelf"), "Gets a shelf");
        assert_eq!(summary(" Lists books\n in a shelf.", "ListBooks"), "Lists books");
    }

    #[test]
    fn summary_falls_back_to_method_name() {
        assert_eq!(summary("", "GetShelf"), "GetShelf");
        assert_eq!(summary(" (-- api-linter: x --)\n", "GetShelf"), "GetShelf");
    }
}
