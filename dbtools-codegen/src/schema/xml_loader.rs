//! XML schema loading using quick-xml's serde support
//!
//! The document is first deserialized into raw mirror structs that keep the
//! attribute spelling of the file, then converted into the model with
//! defaults applied, and finally validated.

use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::model::*;
use crate::codegen::naming;
use crate::error::{CodegenError, Result};

#[derive(Debug, Deserialize)]
struct RawSchema {
    #[serde(rename = "database", default)]
    databases: Vec<RawDatabase>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@fieldsDefaultNotNull", default)]
    fields_default_not_null: bool,
    #[serde(rename = "table", default)]
    tables: Vec<RawTable>,
    #[serde(rename = "view", default)]
    views: Vec<RawView>,
    #[serde(rename = "query", default)]
    queries: Vec<RawView>,
    #[serde(rename = "postSQLScriptFile", default)]
    post_sql_scripts: Vec<RawPostScript>,
}

#[derive(Debug, Deserialize)]
struct RawPostScript {
    #[serde(rename = "@relativePath", default = "default_true")]
    relative_path: bool,
    #[serde(rename = "@pathname")]
    pathname: String,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@className", default)]
    class_name: Option<String>,
    #[serde(rename = "@enumerations", default)]
    enumerations: Option<String>,
    #[serde(rename = "@fieldsDefaultNotNull", default)]
    fields_default_not_null: Option<bool>,
    #[serde(rename = "@readOnly", default)]
    read_only: bool,
    #[serde(rename = "field", default)]
    fields: Vec<RawField>,
    #[serde(rename = "unique", default)]
    uniques: Vec<RawUnique>,
    #[serde(rename = "index", default)]
    indexes: Vec<RawIndex>,
    #[serde(rename = "tableParameter", default)]
    parameters: Vec<RawTableParameter>,
}

#[derive(Debug, Deserialize)]
struct RawView {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@className", default)]
    class_name: Option<String>,
    #[serde(rename = "@fieldsDefaultNotNull", default)]
    fields_default_not_null: Option<bool>,
    #[serde(rename = "field", default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawUnique {
    #[serde(rename = "@sqliteOnConflict", default)]
    sqlite_on_conflict: Option<String>,
    #[serde(rename = "uniqueField", default)]
    fields: Vec<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "field", default)]
    fields: Vec<RawNamed>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTableParameter {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@jdbcDataType")]
    jdbc_data_type: String,
    #[serde(rename = "@varName", default)]
    var_name: Option<String>,
    #[serde(rename = "@size", default)]
    size: Option<u32>,
    #[serde(rename = "@decimals", default)]
    decimals: Option<u32>,
    #[serde(rename = "@defaultValue", default)]
    default_value: Option<String>,
    #[serde(rename = "@notNull", default)]
    not_null: Option<bool>,
    #[serde(rename = "@primaryKey", default)]
    primary_key: bool,
    #[serde(rename = "@increment", default)]
    increment: bool,
    #[serde(rename = "@unique", default)]
    unique: bool,
    #[serde(rename = "@index", default)]
    index: bool,
    #[serde(rename = "@createdField", default)]
    created_field: bool,
    #[serde(rename = "@lastModifiedField", default)]
    last_modified_field: bool,
    #[serde(rename = "@incrementInitialValue", default)]
    increment_initial_value: Option<i64>,
    #[serde(rename = "@sequencerName", default)]
    sequencer_name: Option<String>,
    #[serde(rename = "@sequencerStartValue", default)]
    sequencer_start_value: Option<i64>,
    #[serde(rename = "@sqliteCollate", default)]
    sqlite_collate: Option<String>,
    #[serde(rename = "@foreignKeyTable", default)]
    foreign_key_table: Option<String>,
    #[serde(rename = "@foreignKeyField", default)]
    foreign_key_field: Option<String>,
    #[serde(rename = "@foreignKeyType", default)]
    foreign_key_type: Option<String>,
    #[serde(rename = "@foreignKeyFetchType", default)]
    foreign_key_fetch_type: Option<String>,
    #[serde(rename = "@foreignKeyCascadeType", default)]
    foreign_key_cascade_type: Option<String>,
    #[serde(rename = "@foreignKeyOrderByColumn", default)]
    foreign_key_order_by_column: Option<String>,
    #[serde(rename = "@enumerationClass", default)]
    enumeration_class: Option<String>,
    #[serde(rename = "@enumerations", default)]
    enumerations: Option<String>,
    #[serde(rename = "@enumerationDefault", default)]
    enumeration_default: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Load and validate a schema file
pub fn load_schema(path: &Path) -> Result<DatabaseSchema> {
    let xml = std::fs::read_to_string(path)?;
    let mut schema = parse_schema(&xml)?;
    schema.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(schema)
}

/// Parse and validate schema XML text
pub fn parse_schema(xml: &str) -> Result<DatabaseSchema> {
    let raw: RawSchema = quick_xml::de::from_str(xml)?;

    let mut databases = Vec::with_capacity(raw.databases.len());
    for raw_db in raw.databases {
        databases.push(convert_database(raw_db)?);
    }

    let schema = DatabaseSchema {
        databases,
        base_dir: Default::default(),
    };
    schema.validate()?;
    Ok(schema)
}

fn convert_database(raw: RawDatabase) -> Result<SchemaDatabase> {
    debug!(
        "Loading database {} ({} tables, {} views, {} queries)",
        raw.name,
        raw.tables.len(),
        raw.views.len(),
        raw.queries.len()
    );
    let db_default = raw.fields_default_not_null;

    let tables = raw
        .tables
        .into_iter()
        .map(|t| convert_table(t, db_default))
        .collect::<Result<Vec<_>>>()?;
    let views = raw
        .views
        .into_iter()
        .map(|v| convert_view(v, db_default, EntityKind::View))
        .collect::<Result<Vec<_>>>()?;
    let queries = raw
        .queries
        .into_iter()
        .map(|q| convert_view(q, db_default, EntityKind::Query))
        .collect::<Result<Vec<_>>>()?;

    let mut database = SchemaDatabase {
        name: raw.name,
        tables,
        views,
        queries,
        post_sql_scripts: raw
            .post_sql_scripts
            .into_iter()
            .map(|p| PostSqlScriptFile {
                relative_path: p.relative_path,
                pathname: p.pathname,
            })
            .collect(),
    };

    resolve_table_enumerations(&mut database);
    Ok(database)
}

fn convert_table(raw: RawTable, db_default: bool) -> Result<SchemaEntity> {
    let default_not_null = raw.fields_default_not_null.unwrap_or(db_default);
    let fields = raw
        .fields
        .into_iter()
        .map(|f| convert_field(f, default_not_null))
        .collect::<Result<Vec<_>>>()?;

    let uniques = raw
        .uniques
        .into_iter()
        .map(|u| {
            let on_conflict = u
                .sqlite_on_conflict
                .as_deref()
                .unwrap_or_default()
                .parse::<OnConflict>()
                .map_err(CodegenError::XmlError)?;
            Ok(UniqueDeclaration {
                fields: u.fields.into_iter().map(|f| f.name).collect(),
                on_conflict,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let indexes = raw
        .indexes
        .into_iter()
        .map(|i| {
            let fields: Vec<String> = i.fields.into_iter().map(|f| f.name).collect();
            let name = i
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("{}{}_IDX", raw.name, fields.join("")));
            IndexDeclaration { name, fields }
        })
        .collect();

    Ok(SchemaEntity {
        class_name: class_name_for(&raw.name, raw.class_name.as_deref()),
        kind: EntityKind::Table(TableDetails {
            enumerations: parse_table_enums(raw.enumerations.as_deref().unwrap_or_default()),
            uniques,
            indexes,
            parameters: raw
                .parameters
                .into_iter()
                .map(|p| TableParameter {
                    name: p.name,
                    value: p.value,
                })
                .collect(),
        }),
        name: raw.name,
        fields,
        readonly: raw.read_only,
    })
}

fn convert_view(raw: RawView, db_default: bool, kind: EntityKind) -> Result<SchemaEntity> {
    let default_not_null = raw.fields_default_not_null.unwrap_or(db_default);
    let fields = raw
        .fields
        .into_iter()
        .map(|f| convert_field(f, default_not_null))
        .collect::<Result<Vec<_>>>()?;

    Ok(SchemaEntity {
        class_name: class_name_for(&raw.name, raw.class_name.as_deref()),
        name: raw.name,
        kind,
        fields,
        readonly: true,
    })
}

fn convert_field(raw: RawField, default_not_null: bool) -> Result<SchemaField> {
    let mut field = SchemaField::new(&raw.name, FieldType::parse(&raw.jdbc_data_type));
    field.var_name = non_empty(raw.var_name);
    field.size = raw.size.unwrap_or(0);
    field.decimals = raw.decimals.unwrap_or(0);
    field.default_value = non_empty(raw.default_value);
    field.not_null = raw.not_null.unwrap_or(default_not_null);
    field.primary_key = raw.primary_key;
    field.increment = raw.increment;
    field.unique = raw.unique;
    field.index = raw.index;
    field.created_timestamp = raw.created_field;
    field.last_modified_timestamp = raw.last_modified_field;
    field.increment_initial_value = raw.increment_initial_value;
    field.sequencer_name = non_empty(raw.sequencer_name);
    field.sequencer_start_value = raw.sequencer_start_value;
    field.collate = non_empty(raw.sqlite_collate);

    if let Some(table) = non_empty(raw.foreign_key_table) {
        let kind = raw
            .foreign_key_type
            .as_deref()
            .unwrap_or_default()
            .parse::<ForeignKeyType>()
            .map_err(CodegenError::XmlError)?;
        let fetch = raw
            .foreign_key_fetch_type
            .as_deref()
            .unwrap_or_default()
            .parse::<FetchType>()
            .map_err(CodegenError::XmlError)?;

        // ENUM references are always stored
        if kind == ForeignKeyType::Enum {
            field.not_null = true;
        }

        field.foreign_key = Some(ForeignKey {
            table,
            field: non_empty(raw.foreign_key_field).unwrap_or_default(),
            kind,
            fetch,
            cascade: non_empty(raw.foreign_key_cascade_type)
                .unwrap_or_else(|| "ALL".to_string())
                .to_ascii_uppercase(),
            order_by_column: non_empty(raw.foreign_key_order_by_column),
        });
    }

    let local_values = parse_field_enums(raw.enumerations.as_deref().unwrap_or_default());
    let enum_default = non_empty(raw.enumeration_default);
    if !local_values.is_empty() {
        let default = enum_default.or_else(|| local_values.first().cloned());
        field.enumeration = Some(FieldEnumeration {
            source: EnumSource::Local(local_values),
            default,
        });
    } else if let Some(class) = non_empty(raw.enumeration_class) {
        field.enumeration = Some(FieldEnumeration {
            source: EnumSource::Class(class),
            default: enum_default,
        });
    } else if field.foreign_key_type() == ForeignKeyType::Enum {
        if let Some(table) = field.foreign_key_table().map(str::to_string) {
            field.enumeration = Some(FieldEnumeration {
                source: EnumSource::Table(table),
                default: enum_default,
            });
        }
    }

    Ok(field)
}

/// Numeric fields pointing at an enumeration table enumerate too; enum
/// defaults fall back to the first member of the referenced table.
fn resolve_table_enumerations(database: &mut SchemaDatabase) {
    let enum_tables: Vec<(String, Vec<TableEnum>)> = database
        .tables
        .iter()
        .filter(|t| t.is_enumeration_table())
        .map(|t| (t.name.clone(), t.table_enums().unwrap_or_default().to_vec()))
        .collect();

    let lookup = |name: &str| {
        enum_tables
            .iter()
            .find(|(table, _)| table.eq_ignore_ascii_case(name))
            .map(|(_, enums)| enums)
    };

    let entities = database
        .tables
        .iter_mut()
        .chain(database.views.iter_mut())
        .chain(database.queries.iter_mut());
    for entity in entities {
        for field in entity.fields.iter_mut() {
            if field.enumeration.is_none() && field.data_type.is_number() {
                if let Some(table) = field.foreign_key_table().map(str::to_string) {
                    if lookup(&table).is_some() {
                        field.enumeration = Some(FieldEnumeration {
                            source: EnumSource::Table(table),
                            default: None,
                        });
                    }
                }
            }

            if let Some(enumeration) = field.enumeration.as_mut() {
                if enumeration.default.is_none() {
                    if let EnumSource::Table(table) = &enumeration.source {
                        let first = lookup(table)
                            .and_then(|enums| enums.first())
                            .map(|e| e.name.clone());
                        enumeration.default = first;
                    }
                }
            }
        }
    }
}

fn class_name_for(name: &str, class_name: Option<&str>) -> String {
    match class_name {
        Some(class) if !class.trim().is_empty() => class.trim().to_string(),
        _ => naming::to_class_name(name),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a field-level enum list: `A, B, C`
pub fn parse_field_enums(text: &str) -> Vec<String> {
    text.split(',')
        .map(|item| item.replace(' ', ""))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse a table-level enum list: `A, B=Display Text, IN_PROGRESS`
pub fn parse_table_enums(text: &str) -> Vec<TableEnum> {
    text.split(',')
        .filter_map(|item| {
            let (name, value) = match item.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (item.trim(), None),
            };
            if name.is_empty() {
                return None;
            }
            let value = match value {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => naming::enum_display_value(name),
            };
            Some(TableEnum {
                name: name.to_string(),
                value,
            })
        })
        .collect()
}
