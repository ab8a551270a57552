//! Naming utilities for code generation

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToUpperCamelCase};
use std::path::PathBuf;

/// Convert a table name to a class name (UpperCamelCase)
pub fn to_class_name(table_name: &str) -> String {
    table_name.to_upper_camel_case()
}

/// Convert a column name to a Java variable name (lowerCamelCase)
/// e.g., "FIRST_NAME" -> "firstName", "first_name" -> "firstName"
pub fn to_variable_name(column_name: &str) -> String {
    escape_variable_name(&column_name.to_lower_camel_case())
}

/// Convert a Java variable name to a constant suffix
/// e.g., "firstName" -> "FIRST_NAME"
pub fn to_constant_name(variable_name: &str) -> String {
    variable_name.to_shouty_snake_case()
}

/// Uppercase the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Getter name following JavaBeans: `is` for boolean, `get` otherwise
pub fn getter_name(java_type: &str, variable_name: &str) -> String {
    if java_type == "boolean" || java_type == "Boolean" {
        format!("is{}", capitalize(variable_name))
    } else {
        format!("get{}", capitalize(variable_name))
    }
}

/// Setter name following JavaBeans
pub fn setter_name(variable_name: &str) -> String {
    format!("set{}", capitalize(variable_name))
}

/// Display string derived from an enum member name
/// e.g., "IN_PROGRESS" -> "In Progress"
pub fn enum_display_value(member: &str) -> String {
    let mut out = String::with_capacity(member.len());
    let mut prev = ' ';
    for (i, c) in member.chars().enumerate() {
        if i == 0 || prev == '_' {
            out.extend(c.to_uppercase());
        } else if c == '_' {
            out.push(' ');
        } else {
            out.extend(c.to_lowercase());
        }
        prev = c;
    }
    out
}

/// Package for an entity: `base[.dbname].classname` (lowercased segments)
pub fn entity_package(
    base_package: &str,
    database_name: &str,
    class_name: &str,
    include_database_name: bool,
) -> String {
    let mut package = base_package.to_string();
    if include_database_name {
        package.push('.');
        package.push_str(&database_name.to_lowercase());
    }
    package.push('.');
    package.push_str(&class_name.to_lowercase());
    package
}

/// Package of another entity living next to `package`
/// e.g., ("org.x.main.person", "Address") -> "org.x.main.address"
pub fn sibling_package(package: &str, other_class_name: &str) -> String {
    match package.rsplit_once('.') {
        Some((parent, _)) => format!("{}.{}", parent, other_class_name.to_lowercase()),
        None => other_class_name.to_lowercase(),
    }
}

/// Package holding the per-database DatabaseManager
pub fn database_manager_package(package: &str, include_database_name: bool) -> String {
    let mut parent = package.rsplit_once('.').map(|(p, _)| p).unwrap_or(package);
    if include_database_name {
        parent = parent.rsplit_once('.').map(|(p, _)| p).unwrap_or(parent);
    }
    parent.to_string()
}

/// Relative directory for a package
pub fn package_to_path(package: &str) -> PathBuf {
    package.split('.').collect()
}

/// Check if a name is a Java reserved word
pub fn is_java_keyword(name: &str) -> bool {
    matches!(
        name,
        "abstract"
            | "assert"
            | "boolean"
            | "break"
            | "byte"
            | "case"
            | "catch"
            | "char"
            | "class"
            | "const"
            | "continue"
            | "default"
            | "do"
            | "double"
            | "else"
            | "enum"
            | "extends"
            | "final"
            | "finally"
            | "float"
            | "for"
            | "goto"
            | "if"
            | "implements"
            | "import"
            | "instanceof"
            | "int"
            | "interface"
            | "long"
            | "native"
            | "new"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "short"
            | "static"
            | "strictfp"
            | "super"
            | "switch"
            | "synchronized"
            | "this"
            | "throw"
            | "throws"
            | "transient"
            | "try"
            | "void"
            | "volatile"
            | "while"
            | "true"
            | "false"
            | "null"
    )
}

/// Suffix a variable name with `_` if it's a Java keyword
pub fn escape_variable_name(name: &str) -> String {
    if is_java_keyword(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}
