//! In-memory schema model built once per generator run

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::codegen::naming;
use crate::error::{CodegenError, Result};

/// A parsed schema document: one or more databases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// Databases in declaration order
    pub databases: Vec<SchemaDatabase>,

    /// Directory used to resolve relative post-creation script paths
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// A single database with its tables, views and queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDatabase {
    pub name: String,
    pub tables: Vec<SchemaEntity>,
    pub views: Vec<SchemaEntity>,
    pub queries: Vec<SchemaEntity>,
    pub post_sql_scripts: Vec<PostSqlScriptFile>,
}

/// Reference to an external SQL script run after table creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSqlScriptFile {
    /// Resolve `pathname` against the schema file's directory
    pub relative_path: bool,
    pub pathname: String,
}

/// Discriminator for the three kinds of schema entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityKind {
    Table(TableDetails),
    View,
    Query,
}

/// Table-only declarations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDetails {
    /// Table-level enumeration values; non-empty makes this an enumeration table
    pub enumerations: Vec<TableEnum>,
    pub uniques: Vec<UniqueDeclaration>,
    pub indexes: Vec<IndexDeclaration>,
    pub parameters: Vec<TableParameter>,
}

/// A table, view or query and the record class generated for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntity {
    pub name: String,
    pub class_name: String,
    pub kind: EntityKind,
    pub fields: Vec<SchemaField>,
    pub readonly: bool,
}

/// One member of a table-level enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEnum {
    pub name: String,
    /// Display string for the member
    pub value: String,
}

/// ON CONFLICT clause for a SQLite unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnConflict {
    #[default]
    None,
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

impl FromStr for OnConflict {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(OnConflict::None),
            "ROLLBACK" => Ok(OnConflict::Rollback),
            "ABORT" => Ok(OnConflict::Abort),
            "FAIL" => Ok(OnConflict::Fail),
            "IGNORE" => Ok(OnConflict::Ignore),
            "REPLACE" => Ok(OnConflict::Replace),
            other => Err(format!("unknown sqliteOnConflict value '{}'", other)),
        }
    }
}

impl OnConflict {
    /// SQL keyword, `None` when no clause is emitted
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            OnConflict::None => None,
            OnConflict::Rollback => Some("ROLLBACK"),
            OnConflict::Abort => Some("ABORT"),
            OnConflict::Fail => Some("FAIL"),
            OnConflict::Ignore => Some("IGNORE"),
            OnConflict::Replace => Some("REPLACE"),
        }
    }
}

/// Multi-field unique constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueDeclaration {
    pub fields: Vec<String>,
    pub on_conflict: OnConflict,
}

/// Named multi-field index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDeclaration {
    pub name: String,
    pub fields: Vec<String>,
}

/// Free-form table parameter carried through from the schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableParameter {
    pub name: String,
    pub value: String,
}

/// Abstract JDBC-like column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Boolean,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Decimal,
    Numeric,
    Char,
    Varchar,
    LongVarchar,
    Clob,
    Blob,
    Date,
    Time,
    Timestamp,
    DateTime,
    JavaObject,
    BigInteger,
    BigDecimal,
    /// Any type token without a mapping (MONEY, FRACTION, typos)
    Unsupported(String),
}

impl FieldType {
    /// Parse a `jdbcDataType` attribute; unknown tokens are kept as `Unsupported`
    pub fn parse(token: &str) -> FieldType {
        match token.trim().to_ascii_uppercase().as_str() {
            "BOOLEAN" => FieldType::Boolean,
            "BIT" => FieldType::Bit,
            "TINYINT" => FieldType::TinyInt,
            "SMALLINT" => FieldType::SmallInt,
            "INTEGER" | "INT" => FieldType::Integer,
            "BIGINT" => FieldType::BigInt,
            "REAL" => FieldType::Real,
            "FLOAT" => FieldType::Float,
            "DOUBLE" => FieldType::Double,
            "DECIMAL" => FieldType::Decimal,
            "NUMERIC" => FieldType::Numeric,
            "CHAR" => FieldType::Char,
            "VARCHAR" => FieldType::Varchar,
            "LONGVARCHAR" => FieldType::LongVarchar,
            "CLOB" => FieldType::Clob,
            "BLOB" => FieldType::Blob,
            "DATE" => FieldType::Date,
            "TIME" => FieldType::Time,
            "TIMESTAMP" => FieldType::Timestamp,
            "DATETIME" => FieldType::DateTime,
            "JAVA_OBJECT" => FieldType::JavaObject,
            "BIGINTEGER" => FieldType::BigInteger,
            "BIGDECIMAL" => FieldType::BigDecimal,
            _ => FieldType::Unsupported(token.trim().to_string()),
        }
    }

    /// Numeric types usable as enumeration ordinals
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            FieldType::Integer
                | FieldType::Decimal
                | FieldType::Double
                | FieldType::Numeric
                | FieldType::Real
                | FieldType::SmallInt
                | FieldType::BigInt
                | FieldType::TinyInt
        )
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, FieldType::Boolean | FieldType::Bit)
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::Time | FieldType::Timestamp | FieldType::DateTime
        )
    }

    /// Large object types excluded from toString and lazily fetched by JPA
    pub fn is_lob(&self) -> bool {
        matches!(self, FieldType::Blob | FieldType::Clob)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FieldType::Boolean => "BOOLEAN",
            FieldType::Bit => "BIT",
            FieldType::TinyInt => "TINYINT",
            FieldType::SmallInt => "SMALLINT",
            FieldType::Integer => "INTEGER",
            FieldType::BigInt => "BIGINT",
            FieldType::Real => "REAL",
            FieldType::Float => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::Decimal => "DECIMAL",
            FieldType::Numeric => "NUMERIC",
            FieldType::Char => "CHAR",
            FieldType::Varchar => "VARCHAR",
            FieldType::LongVarchar => "LONGVARCHAR",
            FieldType::Clob => "CLOB",
            FieldType::Blob => "BLOB",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::DateTime => "DATETIME",
            FieldType::JavaObject => "JAVA_OBJECT",
            FieldType::BigInteger => "BIGINTEGER",
            FieldType::BigDecimal => "BIGDECIMAL",
            FieldType::Unsupported(token) => token.as_str(),
        };
        write!(f, "{}", text)
    }
}

/// Relationship kind declared on a foreign-key field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForeignKeyType {
    #[default]
    Ignore,
    OneToOne,
    ManyToOne,
    OneToMany,
    Enum,
}

impl FromStr for ForeignKeyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "").as_str() {
            "" | "IGNORE" => Ok(ForeignKeyType::Ignore),
            "ONETOONE" => Ok(ForeignKeyType::OneToOne),
            "MANYTOONE" => Ok(ForeignKeyType::ManyToOne),
            "ONETOMANY" => Ok(ForeignKeyType::OneToMany),
            "ENUM" => Ok(ForeignKeyType::Enum),
            other => Err(format!("unknown foreignKeyType '{}'", other)),
        }
    }
}

impl ForeignKeyType {
    /// Kinds rendered as an object reference instead of a scalar column
    pub fn is_relationship(&self) -> bool {
        matches!(
            self,
            ForeignKeyType::OneToOne | ForeignKeyType::ManyToOne | ForeignKeyType::OneToMany
        )
    }
}

/// JPA fetch mode for a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchType {
    #[default]
    Lazy,
    Eager,
}

impl FromStr for FetchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "LAZY" => Ok(FetchType::Lazy),
            "EAGER" => Ok(FetchType::Eager),
            other => Err(format!("unknown foreignKeyFetchType '{}'", other)),
        }
    }
}

impl FetchType {
    pub fn as_java(&self) -> &'static str {
        match self {
            FetchType::Lazy => "LAZY",
            FetchType::Eager => "EAGER",
        }
    }
}

/// Foreign-key descriptor on a field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    pub table: String,
    pub field: String,
    pub kind: ForeignKeyType,
    pub fetch: FetchType,
    /// JPA cascade type name (ALL, PERSIST, MERGE, ...)
    pub cascade: String,
    pub order_by_column: Option<String>,
}

/// Where an enumerated field gets its members from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumSource {
    /// Inline value list on the field; rendered as an inner enum
    Local(Vec<String>),
    /// Foreign enumeration table; rendered with that table's enum class
    Table(String),
    /// User-supplied enum class name
    Class(String),
}

/// Enumeration descriptor on a field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEnumeration {
    pub source: EnumSource,
    /// Member used as the field's initial value
    pub default: Option<String>,
}

/// A column of a table, view or query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub data_type: FieldType,
    /// Custom Java variable name
    pub var_name: Option<String>,
    pub size: u32,
    pub decimals: u32,
    pub default_value: Option<String>,
    pub not_null: bool,
    pub primary_key: bool,
    pub increment: bool,
    pub unique: bool,
    pub index: bool,
    pub created_timestamp: bool,
    pub last_modified_timestamp: bool,
    pub increment_initial_value: Option<i64>,
    pub sequencer_name: Option<String>,
    pub sequencer_start_value: Option<i64>,
    pub collate: Option<String>,
    pub foreign_key: Option<ForeignKey>,
    pub enumeration: Option<FieldEnumeration>,
}

impl SchemaField {
    /// Minimal field with everything else off; used by the loader and tests
    pub fn new(name: &str, data_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            var_name: None,
            size: 0,
            decimals: 0,
            default_value: None,
            not_null: false,
            primary_key: false,
            increment: false,
            unique: false,
            index: false,
            created_timestamp: false,
            last_modified_timestamp: false,
            increment_initial_value: None,
            sequencer_name: None,
            sequencer_start_value: None,
            collate: None,
            foreign_key: None,
            enumeration: None,
        }
    }

    /// Java-style variable name: the custom name when set, camelCase otherwise
    pub fn java_name(&self) -> String {
        match &self.var_name {
            Some(var) if !var.is_empty() => var.clone(),
            _ => naming::to_variable_name(&self.name),
        }
    }

    pub fn is_enumeration(&self) -> bool {
        self.enumeration.is_some()
    }

    pub fn foreign_key_type(&self) -> ForeignKeyType {
        self.foreign_key
            .as_ref()
            .map(|fk| fk.kind)
            .unwrap_or_default()
    }

    /// Referenced table name when the field carries a foreign key
    pub fn foreign_key_table(&self) -> Option<&str> {
        self.foreign_key.as_ref().map(|fk| fk.table.as_str())
    }

    /// Whether the field becomes an object reference instead of a scalar
    pub fn is_relationship(&self) -> bool {
        self.foreign_key_type().is_relationship()
    }
}

impl SchemaEntity {
    pub fn is_table(&self) -> bool {
        matches!(self.kind, EntityKind::Table(_))
    }

    pub fn is_view(&self) -> bool {
        matches!(self.kind, EntityKind::View)
    }

    pub fn is_query(&self) -> bool {
        matches!(self.kind, EntityKind::Query)
    }

    pub fn table_details(&self) -> Option<&TableDetails> {
        match &self.kind {
            EntityKind::Table(details) => Some(details),
            _ => None,
        }
    }

    pub fn is_enumeration_table(&self) -> bool {
        self.table_enums().map(|e| !e.is_empty()).unwrap_or(false)
    }

    pub fn table_enums(&self) -> Option<&[TableEnum]> {
        self.table_details().map(|d| d.enumerations.as_slice())
    }

    /// The primary key field; errors if more than one field claims it
    pub fn primary_key(&self) -> Result<Option<&SchemaField>> {
        let mut found: Option<&SchemaField> = None;
        for field in &self.fields {
            if field.primary_key {
                if found.is_some() {
                    return Err(CodegenError::DuplicatePrimaryKey {
                        entity: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
                found = Some(field);
            }
        }
        Ok(found)
    }

    /// Fields whose foreign key targets `table_name` (case-insensitive)
    pub fn foreign_key_fields_to(&self, table_name: &str) -> Vec<&SchemaField> {
        self.fields
            .iter()
            .filter(|f| {
                f.foreign_key_table()
                    .map(|t| t.eq_ignore_ascii_case(table_name))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Fields that carry a foreign key to any table
    pub fn foreign_key_fields(&self) -> Vec<&SchemaField> {
        self.fields
            .iter()
            .filter(|f| f.foreign_key_table().map(|t| !t.is_empty()).unwrap_or(false))
            .collect()
    }

    pub fn get_field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            EntityKind::Table(_) => "table",
            EntityKind::View => "view",
            EntityKind::Query => "query",
        }
    }
}

impl SchemaDatabase {
    /// Look up a table by name (case-insensitive)
    pub fn find_table(&self, name: &str) -> Option<&SchemaEntity> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Tables, then views, then queries
    pub fn entities(&self) -> impl Iterator<Item = &SchemaEntity> {
        self.tables
            .iter()
            .chain(self.views.iter())
            .chain(self.queries.iter())
    }

    /// Integrity checks that make the whole run fail
    pub fn validate(&self) -> Result<()> {
        let mut names: HashSet<String> = HashSet::new();
        let mut sequences: HashSet<String> = HashSet::new();

        for entity in self.entities() {
            entity.primary_key()?;

            if !names.insert(entity.name.to_ascii_lowercase()) {
                return Err(CodegenError::DuplicateEntityName {
                    database: self.name.clone(),
                    name: entity.name.clone(),
                });
            }

            for field in &entity.fields {
                if let Some(seq) = &field.sequencer_name {
                    if !sequences.insert(seq.clone()) {
                        return Err(CodegenError::DuplicateSequence {
                            database: self.name.clone(),
                            name: seq.clone(),
                        });
                    }
                }

                if let Some(fk) = &field.foreign_key {
                    if entity.is_table() && !fk.table.is_empty() && self.find_table(&fk.table).is_none() {
                        return Err(CodegenError::UnknownForeignKeyTable {
                            entity: entity.name.clone(),
                            field: field.name.clone(),
                            table: fk.table.clone(),
                        });
                    }
                }

                validate_enumeration(entity, field)?;
            }
        }

        Ok(())
    }
}

fn validate_enumeration(entity: &SchemaEntity, field: &SchemaField) -> Result<()> {
    let Some(enumeration) = &field.enumeration else {
        return Ok(());
    };

    if let EnumSource::Local(values) = &enumeration.source {
        if !field.data_type.is_number() && field.data_type != FieldType::Varchar {
            return Err(CodegenError::InvalidEnumeration(format!(
                "Enumerations can only be used with number or VARCHAR types for field [{}.{}]",
                entity.name, field.name
            )));
        }
        if let Some(default) = &enumeration.default {
            if !values.iter().any(|v| v == default) {
                return Err(CodegenError::InvalidEnumeration(format!(
                    "Default [{}] is not one of {:?} for field [{}.{}]",
                    default, values, entity.name, field.name
                )));
            }
        }
    }

    Ok(())
}

impl DatabaseSchema {
    pub fn validate(&self) -> Result<()> {
        for database in &self.databases {
            database.validate()?;
        }
        Ok(())
    }
}
