//! SQLite DDL rendering: CREATE/DROP statements, enum seed rows and
//! foreign-key aware table ordering

use std::collections::HashSet;
use std::fs;
use tracing::{debug, warn};

use crate::codegen::type_resolver::TypeResolver;
use crate::error::{CodegenError, Result};
use crate::schema::{DatabaseSchema, FieldType, SchemaDatabase, SchemaEntity, SchemaField};

/// Per-run rendering state shared by every DDL pass of one generator invocation
#[derive(Debug, Default)]
pub struct RenderSession {
    emitted_enums: HashSet<String>,
}

impl RenderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether INSERT statements for this enumeration table were already emitted
    pub fn has_emitted_enum(&self, table_name: &str) -> bool {
        self.emitted_enums.contains(&table_name.to_ascii_lowercase())
    }

    fn mark_enum_emitted(&mut self, table_name: &str) {
        self.emitted_enums.insert(table_name.to_ascii_lowercase());
    }
}

/// Full DDL for a table: the CREATE TABLE statement, its indexes and,
/// for enumeration tables, the seed INSERTs
pub fn render_create_table(
    table: &SchemaEntity,
    session: &mut RenderSession,
    create_enum_inserts: bool,
) -> Result<String> {
    let mut sql = render_table_statement(table)?;
    sql.push('\n');

    for index in render_index_statements(table) {
        sql.push_str(&index);
        sql.push('\n');
    }

    if create_enum_inserts {
        for insert in render_enum_inserts(table, session) {
            sql.push_str(&insert);
            sql.push('\n');
        }
    }

    Ok(sql)
}

/// The single `CREATE TABLE IF NOT EXISTS` statement
pub fn render_table_statement(table: &SchemaEntity) -> Result<String> {
    // fails on a second primary key before anything is rendered
    table.primary_key()?;

    let mut clauses: Vec<String> = Vec::with_capacity(table.fields.len());
    let mut unique_fields: Vec<&str> = Vec::new();

    for field in &table.fields {
        clauses.push(render_column(table, field)?);
        if field.unique {
            unique_fields.push(&field.name);
        }
    }

    if !unique_fields.is_empty() {
        clauses.push(format!("UNIQUE({})", unique_fields.join(", ")));
    }

    if let Some(details) = table.table_details() {
        for unique in &details.uniques {
            let mut clause = format!("UNIQUE({})", unique.fields.join(", "));
            if let Some(conflict) = unique.on_conflict.as_sql() {
                clause.push_str(" ON CONFLICT ");
                clause.push_str(conflict);
            }
            clauses.push(clause);
        }
    }

    for field in table.foreign_key_fields() {
        if let Some(fk) = &field.foreign_key {
            clauses.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                field.name, fk.table, fk.field
            ));
        }
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        table.name,
        clauses.join(", ")
    ))
}

fn render_column(table: &SchemaEntity, field: &SchemaField) -> Result<String> {
    let sql_type = TypeResolver::sqlite_type(&field.data_type).ok_or_else(|| {
        CodegenError::UnsupportedDataType {
            entity: table.name.clone(),
            field: field.name.clone(),
            data_type: field.data_type.to_string(),
        }
    })?;

    let mut column = format!("{} {}", field.name, sql_type);

    if field.size > 0 {
        if field.decimals > 0 {
            column.push_str(&format!("({},{})", field.size, field.decimals));
        } else {
            column.push_str(&format!("({})", field.size));
        }
    }

    if let Some(collate) = field.collate.as_deref().filter(|c| !c.is_empty()) {
        column.push_str(" COLLATE ");
        column.push_str(collate);
    }

    if let Some(default) = field.default_value.as_deref().filter(|d| !d.is_empty()) {
        column.push_str(" DEFAULT ");
        column.push_str(&format_sql_default(&field.data_type, default));
    }

    if field.not_null && !field.increment {
        column.push_str(" NOT NULL");
    }
    if field.primary_key {
        column.push_str(" PRIMARY KEY");
    }
    if field.increment {
        column.push_str(" AUTOINCREMENT");
    }

    Ok(column)
}

/// Format a schema default for SQLite
pub fn format_sql_default(data_type: &FieldType, value: &str) -> String {
    if data_type.is_boolean() || *data_type == FieldType::TinyInt {
        return if value.eq_ignore_ascii_case("true") || value == "1" {
            "1".to_string()
        } else {
            "0".to_string()
        };
    }

    if data_type.is_date() && value.eq_ignore_ascii_case("now") {
        return "CURRENT_TIMESTAMP".to_string();
    }

    match data_type {
        FieldType::Char
        | FieldType::Varchar
        | FieldType::LongVarchar
        | FieldType::Clob
        | FieldType::Date
        | FieldType::Time
        | FieldType::DateTime => quote_sql(value),
        _ => value.to_string(),
    }
}

fn quote_sql(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}

/// `CREATE INDEX` statements for `index` fields and declared indexes
pub fn render_index_statements(table: &SchemaEntity) -> Vec<String> {
    let mut statements: Vec<String> = table
        .fields
        .iter()
        .filter(|f| f.index)
        .map(|f| {
            format!(
                "CREATE INDEX IF NOT EXISTS {}{}_IDX ON {} ({});",
                table.name, f.name, table.name, f.name
            )
        })
        .collect();

    if let Some(details) = table.table_details() {
        for index in &details.indexes {
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
                index.name,
                table.name,
                index.fields.join(", ")
            ));
        }
    }

    statements
}

/// Seed rows for an enumeration table, at most once per session
///
/// Rows go into the primary key column (ordinal from 0) and the first
/// VARCHAR column (display value). Tables lacking either get none.
pub fn render_enum_inserts(table: &SchemaEntity, session: &mut RenderSession) -> Vec<String> {
    let Some(enums) = table.table_enums().filter(|e| !e.is_empty()) else {
        return Vec::new();
    };
    if session.has_emitted_enum(&table.name) {
        debug!("Enum inserts for {} already emitted", table.name);
        return Vec::new();
    }

    let pk_field = table.fields.iter().find(|f| f.primary_key);
    let value_field = table
        .fields
        .iter()
        .find(|f| f.data_type == FieldType::Varchar);
    let (Some(pk_field), Some(value_field)) = (pk_field, value_field) else {
        return Vec::new();
    };

    session.mark_enum_emitted(&table.name);

    enums
        .iter()
        .enumerate()
        .map(|(ordinal, item)| {
            format!(
                "INSERT INTO {} ({}, {}) VALUES ({}, '{}');",
                table.name,
                pk_field.name,
                value_field.name,
                ordinal,
                item.value.replace('\'', "''")
            )
        })
        .collect()
}

pub fn render_drop_table(table: &SchemaEntity) -> String {
    format!("DROP TABLE IF EXISTS {};", table.name)
}

pub fn render_drop_view(view: &SchemaEntity) -> String {
    format!("DROP VIEW IF EXISTS {};", view.name)
}

/// Order tables so every table follows the tables its foreign keys target
///
/// Returns the creation order and the tables that could not be placed.
/// Unplaceable tables (cycles, dangling targets) are appended to the order
/// in declaration order.
pub fn order_tables_for_creation(
    database: &SchemaDatabase,
) -> (Vec<&SchemaEntity>, Vec<&SchemaEntity>) {
    let mut ordered: Vec<&SchemaEntity> = Vec::with_capacity(database.tables.len());
    let mut placed: HashSet<String> = HashSet::new();
    let mut remaining: Vec<&SchemaEntity> = database.tables.iter().collect();

    loop {
        let before = remaining.len();
        let mut still_waiting = Vec::with_capacity(before);

        for table in remaining {
            let ready = table.foreign_key_fields().iter().all(|f| {
                f.foreign_key_table()
                    .map(|target| {
                        target.eq_ignore_ascii_case(&table.name)
                            || placed.contains(&target.to_ascii_lowercase())
                    })
                    .unwrap_or(true)
            });

            if ready {
                placed.insert(table.name.to_ascii_lowercase());
                ordered.push(table);
            } else {
                still_waiting.push(table);
            }
        }

        remaining = still_waiting;
        if remaining.is_empty() || remaining.len() == before {
            break;
        }
    }

    if !remaining.is_empty() {
        let names: Vec<&str> = remaining.iter().map(|t| t.name.as_str()).collect();
        warn!(
            "Could not resolve foreign key dependencies in database {} for tables: {}",
            database.name,
            names.join(", ")
        );
        ordered.extend(remaining.iter().copied());
    }

    (ordered, remaining)
}

/// CREATE script for the whole schema followed by post-creation scripts
pub fn render_schema_script(
    schema: &DatabaseSchema,
    session: &mut RenderSession,
    create_enum_inserts: bool,
) -> Result<String> {
    let mut script = String::new();

    for database in &schema.databases {
        script.push_str(&format!("-- Database: {}\n\n", database.name));

        let (ordered, _) = order_tables_for_creation(database);
        for table in ordered {
            script.push_str(&render_create_table(table, session, create_enum_inserts)?);
            script.push('\n');
        }

        for post_script in &database.post_sql_scripts {
            let path = if post_script.relative_path {
                schema.base_dir.join(&post_script.pathname)
            } else {
                post_script.pathname.clone().into()
            };

            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!("Appending post script {}", path.display());
                    for line in filter_post_script(&content, session) {
                        script.push_str(line);
                        script.push('\n');
                    }
                    script.push('\n');
                }
                Err(e) => {
                    warn!("Skipping post script {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(script)
}

/// Drop comment lines and INSERTs into enumeration tables already seeded
fn filter_post_script<'a>(content: &'a str, session: &RenderSession) -> Vec<&'a str> {
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                return false;
            }
            match insert_target(trimmed) {
                Some(table) => !session.has_emitted_enum(table),
                None => true,
            }
        })
        .collect()
}

fn insert_target(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    let insert = tokens.next()?;
    let into = tokens.next()?;
    if !insert.eq_ignore_ascii_case("INSERT") || !into.eq_ignore_ascii_case("INTO") {
        return None;
    }
    let table = tokens.next()?;
    Some(table.split('(').next().unwrap_or(table))
}

/// DROP script: views first, then tables in reverse creation order
pub fn render_drop_script(schema: &DatabaseSchema) -> String {
    let mut script = String::new();

    for database in &schema.databases {
        for view in database.views.iter().rev() {
            script.push_str(&render_drop_view(view));
            script.push('\n');
        }

        let (ordered, _) = order_tables_for_creation(database);
        for table in ordered.iter().rev() {
            script.push_str(&render_drop_table(table));
            script.push('\n');
        }
    }

    script
}
