//! Schema field types to Java and SQLite type mapping

use crate::config::DateType;
use crate::schema::{FieldType, SchemaField};

/// Represents a Java type for code generation
#[derive(Debug, Clone, PartialEq)]
pub enum JavaType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Bytes,
    /// `java.util.Date`
    Date,
    /// `org.joda.time.DateTime`
    JodaDateTime,
    /// `org.threeten.bp.LocalDate`
    LocalDate,
    /// `org.threeten.bp.LocalTime`
    LocalTime,
    /// `org.threeten.bp.LocalDateTime`
    LocalDateTime,
    BigInteger,
    BigDecimal,
    Object,
    /// Enum type with the (possibly qualified) enum name
    Enum(String),
    /// Nullable wrapper (boxed type for primitives)
    Nullable(Box<JavaType>),
}

impl JavaType {
    /// Get the type string for code generation
    pub fn to_type_string(&self) -> String {
        match self {
            JavaType::Boolean => "boolean".to_string(),
            JavaType::Int => "int".to_string(),
            JavaType::Long => "long".to_string(),
            JavaType::Float => "float".to_string(),
            JavaType::Double => "double".to_string(),
            JavaType::Char => "char".to_string(),
            JavaType::String => "String".to_string(),
            JavaType::Bytes => "byte[]".to_string(),
            JavaType::Date => "java.util.Date".to_string(),
            JavaType::JodaDateTime => "org.joda.time.DateTime".to_string(),
            JavaType::LocalDate => "org.threeten.bp.LocalDate".to_string(),
            JavaType::LocalTime => "org.threeten.bp.LocalTime".to_string(),
            JavaType::LocalDateTime => "org.threeten.bp.LocalDateTime".to_string(),
            JavaType::BigInteger => "java.math.BigInteger".to_string(),
            JavaType::BigDecimal => "java.math.BigDecimal".to_string(),
            JavaType::Object => "Object".to_string(),
            JavaType::Enum(name) => name.clone(),
            JavaType::Nullable(inner) => inner.boxed_type_string(),
        }
    }

    /// Object form of the type (`Integer` for `int`, unchanged for reference types)
    pub fn boxed_type_string(&self) -> String {
        match self {
            JavaType::Boolean => "Boolean".to_string(),
            JavaType::Int => "Integer".to_string(),
            JavaType::Long => "Long".to_string(),
            JavaType::Float => "Float".to_string(),
            JavaType::Double => "Double".to_string(),
            JavaType::Char => "Character".to_string(),
            JavaType::Nullable(inner) => inner.boxed_type_string(),
            other => other.to_type_string(),
        }
    }

    /// Get the inner type if this is nullable
    pub fn inner_type(&self) -> &JavaType {
        match self {
            JavaType::Nullable(inner) => inner,
            _ => self,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, JavaType::Nullable(_))
    }

    /// Primitive value types that can never hold null
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            JavaType::Boolean
                | JavaType::Int
                | JavaType::Long
                | JavaType::Float
                | JavaType::Double
                | JavaType::Char
        )
    }

    /// Reference types whose accessors hand out clones
    pub fn is_mutable(&self) -> bool {
        matches!(self.inner_type(), JavaType::Date | JavaType::Bytes)
    }

    /// Initial value of a field without an explicit default
    ///
    /// Nullable fields start as `null`; non-null fields get the zero value
    /// of their type, `""` for strings.
    pub fn default_literal(&self) -> Option<String> {
        let literal = match self {
            JavaType::Nullable(_) => return None,
            JavaType::Boolean => "false",
            JavaType::Int => "0",
            JavaType::Long => "0",
            JavaType::Float => "0.0f",
            JavaType::Double => "0.0d",
            JavaType::Char => "' '",
            JavaType::String => "\"\"",
            _ => return None,
        };
        Some(literal.to_string())
    }

    /// Expression for "now" on date types
    pub fn now_expression(&self) -> Option<&'static str> {
        match self.inner_type() {
            JavaType::Date => Some("new java.util.Date()"),
            JavaType::JodaDateTime => Some("org.joda.time.DateTime.now()"),
            JavaType::LocalDate => Some("org.threeten.bp.LocalDate.now()"),
            JavaType::LocalTime => Some("org.threeten.bp.LocalTime.now()"),
            JavaType::LocalDateTime => Some("org.threeten.bp.LocalDateTime.now()"),
            _ => None,
        }
    }

    /// Format a schema default value as a Java initializer
    pub fn format_default(&self, value: &str) -> String {
        let value = value.trim();
        let inner = self.inner_type();
        match inner {
            JavaType::String => {
                if value.eq_ignore_ascii_case("null") && !self.is_nullable() {
                    "\"\"".to_string()
                } else if value.eq_ignore_ascii_case("null") {
                    "null".to_string()
                } else {
                    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
                }
            }
            JavaType::Boolean => match value.to_ascii_lowercase().as_str() {
                "1" | "true" => "true".to_string(),
                "null" if self.is_nullable() => "null".to_string(),
                _ => "false".to_string(),
            },
            JavaType::Float => {
                let number = value.trim_end_matches(['f', 'F']);
                if number.contains('.') {
                    format!("{}f", number)
                } else {
                    format!("{}.0f", number)
                }
            }
            JavaType::Long => format!("{}L", value.trim_end_matches(['l', 'L'])),
            JavaType::BigDecimal => format!("new java.math.BigDecimal(\"{}\")", value),
            JavaType::BigInteger => format!("new java.math.BigInteger(\"{}\")", value),
            JavaType::Char => format!("'{}'", value.chars().next().unwrap_or(' ')),
            _ if inner.now_expression().is_some() => {
                if value.eq_ignore_ascii_case("now") {
                    inner.now_expression().unwrap_or("null").to_string()
                } else {
                    "null".to_string()
                }
            }
            _ => value.to_string(),
        }
    }
}

/// Storage category that selects the marshalling templates of a field
#[derive(Debug, Clone, PartialEq)]
pub enum Marshal {
    Bool,
    Int,
    Long,
    Float,
    Double,
    Text,
    Blob,
    /// Date stored as formatted text
    DateText {
        to_db: &'static str,
        from_db: &'static str,
    },
    /// Date stored as epoch milliseconds
    DateEpoch(EpochCodec),
    /// Enum stored as its ordinal
    EnumOrdinal {
        enum_class: String,
        default: Option<String>,
    },
    /// No template exists; output carries the given placeholder
    Unsupported(String),
}

/// How an epoch-millis date converts to and from its Java type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpochCodec {
    /// `java.util.Date#getTime` / `new java.util.Date(long)`
    JavaDate,
    /// DBToolsDateFormatter conversion functions
    Formatter {
        to_db: &'static str,
        from_db: &'static str,
    },
}

/// Fully qualified date formatter used by generated marshalling code
pub const DATE_FORMATTER: &str = "org.dbtools.android.domain.date.DBToolsDateFormatter";

const TIME_PLACEHOLDER: &str = "[[TIME IS CURRENTLY ONLY SUPPORTED BY JSR_310]]";

impl Marshal {
    /// Expression converting Java value `value` to its stored form
    pub fn to_db(&self, value: &str) -> String {
        match self {
            Marshal::Bool => format!("{} ? 1 : 0", value),
            Marshal::Int
            | Marshal::Long
            | Marshal::Float
            | Marshal::Double
            | Marshal::Text
            | Marshal::Blob => value.to_string(),
            Marshal::DateText { to_db, .. } => format!("{}.{}({})", DATE_FORMATTER, to_db, value),
            Marshal::DateEpoch(EpochCodec::JavaDate) => format!("{}.getTime()", value),
            Marshal::DateEpoch(EpochCodec::Formatter { to_db, .. }) => {
                format!("{}.{}({})", DATE_FORMATTER, to_db, value)
            }
            Marshal::EnumOrdinal { .. } => format!("{}.ordinal()", value),
            Marshal::Unsupported(placeholder) => placeholder.clone(),
        }
    }

    /// Expression converting stored value `raw` back to the Java value
    pub fn from_db(&self, raw: &str) -> String {
        match self {
            Marshal::Bool => format!("{} != 0 ? true : false", raw),
            Marshal::Int
            | Marshal::Long
            | Marshal::Float
            | Marshal::Double
            | Marshal::Text
            | Marshal::Blob => raw.to_string(),
            Marshal::DateText { from_db, .. } => format!("{}.{}({})", DATE_FORMATTER, from_db, raw),
            Marshal::DateEpoch(EpochCodec::JavaDate) => format!("new java.util.Date({})", raw),
            Marshal::DateEpoch(EpochCodec::Formatter { from_db, .. }) => {
                format!("{}.{}({})", DATE_FORMATTER, from_db, raw)
            }
            Marshal::EnumOrdinal {
                enum_class,
                default,
            } => format!(
                "org.dbtools.android.domain.util.EnumUtil.ordinalToEnum({}.class, {}, {})",
                enum_class,
                raw,
                default
                    .as_ref()
                    .map(|d| format!("{}.{}", enum_class, d))
                    .unwrap_or_else(|| "null".to_string())
            ),
            Marshal::Unsupported(placeholder) => placeholder.clone(),
        }
    }

    /// Representation of the stored value
    pub fn stored(&self) -> Option<StoredKind> {
        match self {
            Marshal::Bool | Marshal::Int | Marshal::EnumOrdinal { .. } => Some(StoredKind::Integer),
            Marshal::Long | Marshal::DateEpoch(_) => Some(StoredKind::Long),
            Marshal::Float => Some(StoredKind::Float),
            Marshal::Double => Some(StoredKind::Double),
            Marshal::Text | Marshal::DateText { .. } => Some(StoredKind::Text),
            Marshal::Blob => Some(StoredKind::Blob),
            Marshal::Unsupported(_) => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Marshal::Unsupported(_))
    }
}

/// Column-level storage classes used by ContentValues, Cursor and statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredKind {
    Integer,
    Long,
    Float,
    Double,
    Text,
    Blob,
}

impl StoredKind {
    /// `DBToolsContentValues` getter
    pub fn values_getter(&self) -> &'static str {
        match self {
            StoredKind::Integer => "getAsInteger",
            StoredKind::Long => "getAsLong",
            StoredKind::Float => "getAsFloat",
            StoredKind::Double => "getAsDouble",
            StoredKind::Text => "getAsString",
            StoredKind::Blob => "getAsByteArray",
        }
    }

    /// `Cursor` getter
    pub fn cursor_getter(&self) -> &'static str {
        match self {
            StoredKind::Integer => "getInt",
            StoredKind::Long => "getLong",
            StoredKind::Float => "getFloat",
            StoredKind::Double => "getDouble",
            StoredKind::Text => "getString",
            StoredKind::Blob => "getBlob",
        }
    }

    /// `StatementWrapper` bind method
    pub fn bind_method(&self) -> &'static str {
        match self {
            StoredKind::Integer | StoredKind::Long => "bindLong",
            StoredKind::Float | StoredKind::Double => "bindDouble",
            StoredKind::Text => "bindString",
            StoredKind::Blob => "bindBlob",
        }
    }
}

/// Resolve schema field types to Java and SQLite types
pub struct TypeResolver;

impl TypeResolver {
    /// Get the Java type for a field
    pub fn resolve(field: &SchemaField, date_type: DateType) -> JavaType {
        let base_type = Self::resolve_base_type(&field.data_type, date_type);

        if field.not_null {
            base_type
        } else {
            JavaType::Nullable(Box::new(base_type))
        }
    }

    /// Resolve the base type (without nullable wrapper)
    pub fn resolve_base_type(data_type: &FieldType, date_type: DateType) -> JavaType {
        match data_type {
            FieldType::Boolean | FieldType::Bit | FieldType::TinyInt => JavaType::Boolean,
            FieldType::SmallInt | FieldType::Integer => JavaType::Int,
            FieldType::BigInt => JavaType::Long,
            FieldType::Real | FieldType::Float | FieldType::Decimal | FieldType::Numeric => {
                JavaType::Float
            }
            FieldType::Double => JavaType::Double,
            FieldType::Char => JavaType::Char,
            FieldType::Varchar | FieldType::LongVarchar | FieldType::Clob => JavaType::String,
            FieldType::Blob => JavaType::Bytes,
            FieldType::Date | FieldType::Time | FieldType::Timestamp | FieldType::DateTime => {
                Self::resolve_date_type(data_type, date_type)
            }
            FieldType::JavaObject => JavaType::Object,
            FieldType::BigInteger => JavaType::BigInteger,
            FieldType::BigDecimal => JavaType::BigDecimal,
            FieldType::Unsupported(_) => JavaType::Object,
        }
    }

    fn resolve_date_type(data_type: &FieldType, date_type: DateType) -> JavaType {
        match date_type {
            DateType::JavaDate => JavaType::Date,
            DateType::Joda => JavaType::JodaDateTime,
            DateType::Jsr310 => match data_type {
                FieldType::Date => JavaType::LocalDate,
                FieldType::Time => JavaType::LocalTime,
                _ => JavaType::LocalDateTime,
            },
        }
    }

    /// SQLite column type; `None` when the type has no mapping in the dialect
    pub fn sqlite_type(data_type: &FieldType) -> Option<&'static str> {
        let sql = match data_type {
            FieldType::Boolean
            | FieldType::Bit
            | FieldType::TinyInt
            | FieldType::SmallInt
            | FieldType::Integer
            | FieldType::BigInt
            | FieldType::BigInteger
            | FieldType::Timestamp => "INTEGER",
            FieldType::Real
            | FieldType::Float
            | FieldType::Double
            | FieldType::Decimal
            | FieldType::Numeric
            | FieldType::BigDecimal => "REAL",
            FieldType::Char => "CHAR",
            FieldType::Varchar => "VARCHAR",
            FieldType::LongVarchar | FieldType::Clob => "TEXT",
            FieldType::Date | FieldType::Time | FieldType::DateTime => "TEXT",
            FieldType::Blob | FieldType::JavaObject => "BLOB",
            FieldType::Unsupported(_) => return None,
        };
        Some(sql)
    }

    /// Marshalling category for a non-enumerated field
    pub fn marshal(data_type: &FieldType, date_type: DateType) -> Marshal {
        match data_type {
            FieldType::Boolean | FieldType::Bit | FieldType::TinyInt => Marshal::Bool,
            FieldType::SmallInt | FieldType::Integer => Marshal::Int,
            FieldType::BigInt => Marshal::Long,
            FieldType::Real | FieldType::Float | FieldType::Decimal | FieldType::Numeric => {
                Marshal::Float
            }
            FieldType::Double => Marshal::Double,
            FieldType::Varchar | FieldType::LongVarchar | FieldType::Clob => Marshal::Text,
            FieldType::Blob => Marshal::Blob,
            FieldType::Date | FieldType::Time | FieldType::Timestamp | FieldType::DateTime => {
                Self::date_marshal(data_type, date_type)
            }
            FieldType::Char
            | FieldType::JavaObject
            | FieldType::BigInteger
            | FieldType::BigDecimal
            | FieldType::Unsupported(_) => {
                Marshal::Unsupported(format!("[[UNHANDLED FIELD TYPE: {}]]", data_type))
            }
        }
    }

    fn date_marshal(data_type: &FieldType, date_type: DateType) -> Marshal {
        match (date_type, data_type) {
            (DateType::JavaDate, FieldType::Date) => Marshal::DateText {
                to_db: "dateToDBString",
                from_db: "dbStringToDate",
            },
            (DateType::JavaDate, FieldType::Timestamp) => Marshal::DateEpoch(EpochCodec::JavaDate),
            (DateType::Joda, FieldType::Date) => Marshal::DateText {
                to_db: "dateTimeToDBString",
                from_db: "dbStringToDateTime",
            },
            (DateType::Joda, FieldType::Timestamp) => Marshal::DateEpoch(EpochCodec::Formatter {
                to_db: "dateTimeToLong",
                from_db: "longToDateTime",
            }),
            (DateType::Jsr310, FieldType::Date) => Marshal::DateText {
                to_db: "localDateToDBString",
                from_db: "dbStringToLocalDate",
            },
            (DateType::Jsr310, FieldType::Time) => Marshal::DateText {
                to_db: "localTimeToDBString",
                from_db: "dbStringToLocalTime",
            },
            (DateType::Jsr310, FieldType::DateTime) => Marshal::DateText {
                to_db: "localDateTimeToDBString",
                from_db: "dbStringToLocalDateTime",
            },
            (DateType::Jsr310, FieldType::Timestamp) => {
                Marshal::DateEpoch(EpochCodec::Formatter {
                    to_db: "localDateTimeToLong",
                    from_db: "longToLocalDateTime",
                })
            }
            _ => Marshal::Unsupported(TIME_PLACEHOLDER.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_field(name: &str, data_type: FieldType, not_null: bool) -> SchemaField {
        let mut field = SchemaField::new(name, data_type);
        field.not_null = not_null;
        field
    }

    #[test]
    fn test_nullability_drives_type() {
        let field = make_field("count", FieldType::Integer, true);
        assert_eq!(
            TypeResolver::resolve(&field, DateType::JavaDate).to_type_string(),
            "int"
        );

        let field = make_field("count", FieldType::Integer, false);
        let resolved = TypeResolver::resolve(&field, DateType::JavaDate);
        assert_eq!(resolved.to_type_string(), "Integer");
        assert!(resolved.is_nullable());
    }

    #[test]
    fn test_boolean_types() {
        for data_type in [FieldType::Boolean, FieldType::Bit, FieldType::TinyInt] {
            let field = make_field("flag", data_type, true);
            assert_eq!(
                TypeResolver::resolve(&field, DateType::JavaDate),
                JavaType::Boolean
            );
        }
    }

    #[test]
    fn test_date_types_follow_date_type() {
        let field = make_field("created", FieldType::Timestamp, true);
        assert_eq!(
            TypeResolver::resolve(&field, DateType::JavaDate).to_type_string(),
            "java.util.Date"
        );
        assert_eq!(
            TypeResolver::resolve(&field, DateType::Joda).to_type_string(),
            "org.joda.time.DateTime"
        );
        assert_eq!(
            TypeResolver::resolve(&field, DateType::Jsr310).to_type_string(),
            "org.threeten.bp.LocalDateTime"
        );

        let day = make_field("day", FieldType::Date, true);
        assert_eq!(
            TypeResolver::resolve(&day, DateType::Jsr310),
            JavaType::LocalDate
        );
    }

    #[test]
    fn test_sqlite_types() {
        assert_eq!(TypeResolver::sqlite_type(&FieldType::Integer), Some("INTEGER"));
        assert_eq!(TypeResolver::sqlite_type(&FieldType::Varchar), Some("VARCHAR"));
        assert_eq!(TypeResolver::sqlite_type(&FieldType::Timestamp), Some("INTEGER"));
        assert_eq!(TypeResolver::sqlite_type(&FieldType::Date), Some("TEXT"));
        assert_eq!(
            TypeResolver::sqlite_type(&FieldType::Unsupported("MONEY".into())),
            None
        );
    }

    #[test]
    fn test_boolean_round_trip_templates() {
        let marshal = TypeResolver::marshal(&FieldType::Boolean, DateType::JavaDate);
        assert_eq!(marshal.to_db("enabled"), "enabled ? 1 : 0");
        assert_eq!(marshal.from_db("raw"), "raw != 0 ? true : false");
        assert_eq!(marshal.stored(), Some(StoredKind::Integer));
    }

    #[test]
    fn test_date_round_trip_templates_are_inverse_pairs() {
        let epoch = TypeResolver::marshal(&FieldType::Timestamp, DateType::JavaDate);
        assert_eq!(epoch.to_db("created"), "created.getTime()");
        assert_eq!(epoch.from_db("raw"), "new java.util.Date(raw)");

        let text = TypeResolver::marshal(&FieldType::Date, DateType::JavaDate);
        assert!(text.to_db("day").ends_with("dateToDBString(day)"));
        assert!(text.from_db("raw").ends_with("dbStringToDate(raw)"));

        let joda = TypeResolver::marshal(&FieldType::Timestamp, DateType::Joda);
        assert!(joda.to_db("t").ends_with("dateTimeToLong(t)"));
        assert!(joda.from_db("raw").ends_with("longToDateTime(raw)"));
    }

    #[test]
    fn test_time_requires_jsr310() {
        let marshal = TypeResolver::marshal(&FieldType::Time, DateType::JavaDate);
        assert!(marshal.is_unsupported());
        let marshal = TypeResolver::marshal(&FieldType::Time, DateType::Jsr310);
        assert_eq!(marshal.stored(), Some(StoredKind::Text));
    }

    #[test]
    fn test_unsupported_placeholder() {
        let marshal = TypeResolver::marshal(&FieldType::Unsupported("MONEY".into()), DateType::JavaDate);
        assert_eq!(marshal.to_db("x"), "[[UNHANDLED FIELD TYPE: MONEY]]");
        assert_eq!(marshal.stored(), None);
    }

    #[test]
    fn test_enum_ordinal_templates() {
        let marshal = Marshal::EnumOrdinal {
            enum_class: "Status".to_string(),
            default: Some("ACTIVE".to_string()),
        };
        assert_eq!(marshal.to_db("status"), "status.ordinal()");
        assert_eq!(
            marshal.from_db("raw"),
            "org.dbtools.android.domain.util.EnumUtil.ordinalToEnum(Status.class, raw, Status.ACTIVE)"
        );
    }

    #[test]
    fn test_format_default() {
        assert_eq!(JavaType::String.format_default("abc"), "\"abc\"");
        assert_eq!(JavaType::String.format_default("null"), "\"\"");
        assert_eq!(JavaType::Boolean.format_default("1"), "true");
        assert_eq!(JavaType::Boolean.format_default("0"), "false");
        assert_eq!(JavaType::Float.format_default("2"), "2.0f");
        assert_eq!(JavaType::Long.format_default("5"), "5L");
        assert_eq!(JavaType::Date.format_default("NOW"), "new java.util.Date()");
        assert_eq!(
            JavaType::BigDecimal.format_default("1.5"),
            "new java.math.BigDecimal(\"1.5\")"
        );
    }

    #[test]
    fn test_default_literals() {
        assert_eq!(JavaType::Int.default_literal().as_deref(), Some("0"));
        assert_eq!(JavaType::String.default_literal().as_deref(), Some("\"\""));
        assert_eq!(
            JavaType::Nullable(Box::new(JavaType::Int)).default_literal(),
            None
        );
        assert!(JavaType::Date.is_mutable());
        assert!(!JavaType::String.is_mutable());
    }
}
