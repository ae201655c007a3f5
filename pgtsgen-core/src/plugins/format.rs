//! TypeScript text helpers shared by the built-in plugins.

use crate::models::TargetType;
use inflector::Inflector;

/// Indentation used inside generated declarations
pub const INDENT: &str = "  ";

/// How a catalog comment is attached to a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/* comment */` on the line above
    Line,
    /// `/** ... */` doc comment block
    Block,
}

/// Prefixes `value` with `comment` rendered in `style`.
///
/// Missing or blank comments leave `value` untouched. A `*/` inside the
/// comment is broken up so it cannot terminate the generated comment early.
pub fn with_comment(value: &str, comment: Option<&str>, style: CommentStyle) -> String {
    let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) else {
        return value.to_string();
    };
    let comment = comment.replace("*/", "* /");

    let rendered = match style {
        CommentStyle::Line => format!("/* {} */", comment.lines().collect::<Vec<_>>().join(" ")),
        CommentStyle::Block => {
            let mut block = String::from("/**\n");
            for line in comment.lines() {
                let line = line.trim_end();
                if line.is_empty() {
                    block.push_str(" *\n");
                } else {
                    block.push_str(" * ");
                    block.push_str(line);
                    block.push('\n');
                }
            }
            block.push_str(" */");
            block
        }
    };

    format!("{}\n{}", rendered, value)
}

/// Indents every non-empty line of `text` by `INDENT`.
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{INDENT}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// TypeScript spelling of a type category.
pub fn ts_type(target: TargetType) -> &'static str {
    match target {
        TargetType::String => "string",
        TargetType::StringArray => "string[]",
        TargetType::Number => "number",
        TargetType::NumberArray => "number[]",
        TargetType::Boolean => "boolean",
        TargetType::BooleanArray => "boolean[]",
        TargetType::Date => "Date",
        TargetType::DateArray => "Date[]",
        TargetType::Json => "JsonValue",
        TargetType::JsonArray => "JsonValue[]",
        TargetType::Unknown => "unknown",
    }
}

/// `user_roles` -> `UserRoles`
pub fn type_name(name: &str) -> String {
    name.to_pascal_case()
}

/// `created_at` -> `createdAt`
pub fn field_name(name: &str) -> String {
    name.to_camel_case()
}

/// Single-quoted TypeScript string literal.
///
/// Line terminators are escaped so the literal stays on one line.
pub fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('\'');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\u{2028}' => literal.push_str("\\u2028"),
            '\u{2029}' => literal.push_str("\\u2029"),
            c => literal.push(c),
        }
    }
    literal.push('\'');
    literal
}
