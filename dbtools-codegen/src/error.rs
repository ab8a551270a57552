//! Error types for dbtools-codegen

use thiserror::Error;

/// Result type alias for dbtools-codegen operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to parse XML schema: {0}")]
    XmlError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Entity [{entity}] has more than one primary key (second primary key on field [{field}])")]
    DuplicatePrimaryKey { entity: String, field: String },

    #[error("Table or view named [{name}] already exists in database [{database}]")]
    DuplicateEntityName { database: String, name: String },

    #[error("Sequencer named [{name}] already exists in database [{database}]")]
    DuplicateSequence { database: String, name: String },

    #[error("Field [{entity}.{field}] references unknown foreign key table [{table}]")]
    UnknownForeignKeyTable {
        entity: String,
        field: String,
        table: String,
    },

    #[error("Unsupported data type [{data_type}] for field [{entity}.{field}]")]
    UnsupportedDataType {
        entity: String,
        field: String,
        data_type: String,
    },

    #[error("Invalid enumeration: {0}")]
    InvalidEnumeration(String),
}

impl From<quick_xml::DeError> for CodegenError {
    fn from(err: quick_xml::DeError) -> Self {
        CodegenError::XmlError(err.to_string())
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::ConfigError(err.to_string())
    }
}
