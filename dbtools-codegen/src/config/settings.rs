//! Configuration settings for dbtools-codegen

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::defaults;
use crate::error::{CodegenError, Result};

/// Target platform for the generated data-access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// javax.persistence entities and EntityManager-backed managers
    Jpa,
    /// Android SQLite records and managers
    Android,
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpa" => Ok(Platform::Jpa),
            "android" | "android-java" => Ok(Platform::Android),
            other => Err(format!("unknown platform '{}' (expected jpa or android)", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Jpa => write!(f, "jpa"),
            Platform::Android => write!(f, "android"),
        }
    }
}

/// Representation used for DATE/TIME/TIMESTAMP/DATETIME fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateType {
    #[serde(rename = "java-date", alias = "JAVA-DATE")]
    JavaDate,
    #[serde(rename = "joda", alias = "JODA")]
    Joda,
    #[serde(rename = "jsr-310", alias = "JSR-310")]
    Jsr310,
}

impl FromStr for DateType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "java-date" => Ok(DateType::JavaDate),
            "joda" => Ok(DateType::Joda),
            "jsr-310" => Ok(DateType::Jsr310),
            other => Err(format!(
                "unknown date type '{}' (expected java-date, joda or jsr-310)",
                other
            )),
        }
    }
}

/// Main configuration struct for code generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Path to the XML schema file
    #[serde(default)]
    pub schema_file: PathBuf,

    /// Root directory for generated main sources
    #[serde(default = "default_output_src_dir")]
    pub output_src_dir: PathBuf,

    /// Root directory for generated test sources
    #[serde(default = "default_output_test_dir")]
    pub output_test_dir: PathBuf,

    /// Base Java package; each entity lands in a sub-package of it
    #[serde(default = "default_base_package")]
    pub base_package: String,

    /// Target platform
    #[serde(default = "default_platform")]
    pub platform: Platform,

    /// Date representation
    #[serde(default = "default_date_type")]
    pub date_type: DateType,

    /// Generate managers for dependency injection instead of static helpers
    #[serde(default = "default_injection_support")]
    pub injection_support: bool,

    /// Emit `@Nonnull`/`@Nullable` markers
    #[serde(default = "default_jsr305_support")]
    pub jsr305_support: bool,

    /// Assemble view/query SQL with SQLQueryBuilder
    #[serde(default = "default_sql_query_builder_support")]
    pub sql_query_builder_support: bool,

    /// Insert the lowercased database name as a package segment
    #[serde(default = "default_include_database_name_in_package")]
    pub include_database_name_in_package: bool,

    /// Generate the SQLCipher manager variant (Android)
    #[serde(default = "default_encryption_support")]
    pub encryption_support: bool,

    /// Annotate JPA manager mutations with `@javax.transaction.Transactional`
    #[serde(default = "default_javaee_support")]
    pub javaee_support: bool,

    /// Generate a JUnit scaffold per JPA record
    #[serde(default = "default_generate_tests")]
    pub generate_tests: bool,

    /// Append INSERT statements for enumeration tables to their DDL
    #[serde(default = "default_create_enum_inserts")]
    pub create_enum_inserts: bool,

    /// Fail on unsupported field types instead of emitting placeholders
    #[serde(default = "default_strict_types")]
    pub strict_types: bool,

    /// Dry run mode - render everything, write nothing
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    /// Can be overridden by RUST_LOG env var
    #[serde(default)]
    pub log_level: Option<String>,
}

// Default value functions for serde
fn default_output_src_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_SRC_DIR)
}
fn default_output_test_dir() -> PathBuf {
    PathBuf::from(defaults::OUTPUT_TEST_DIR)
}
fn default_base_package() -> String {
    defaults::BASE_PACKAGE.to_string()
}
fn default_platform() -> Platform {
    defaults::PLATFORM
}
fn default_date_type() -> DateType {
    defaults::DATE_TYPE
}
fn default_injection_support() -> bool {
    defaults::INJECTION_SUPPORT
}
fn default_jsr305_support() -> bool {
    defaults::JSR305_SUPPORT
}
fn default_sql_query_builder_support() -> bool {
    defaults::SQL_QUERY_BUILDER_SUPPORT
}
fn default_include_database_name_in_package() -> bool {
    defaults::INCLUDE_DATABASE_NAME_IN_PACKAGE
}
fn default_encryption_support() -> bool {
    defaults::ENCRYPTION_SUPPORT
}
fn default_javaee_support() -> bool {
    defaults::JAVAEE_SUPPORT
}
fn default_generate_tests() -> bool {
    defaults::GENERATE_TESTS
}
fn default_create_enum_inserts() -> bool {
    defaults::CREATE_ENUM_INSERTS
}
fn default_strict_types() -> bool {
    defaults::STRICT_TYPES
}
fn default_dry_run() -> bool {
    defaults::DRY_RUN
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            schema_file: PathBuf::new(),
            output_src_dir: default_output_src_dir(),
            output_test_dir: default_output_test_dir(),
            base_package: default_base_package(),
            platform: default_platform(),
            date_type: default_date_type(),
            injection_support: default_injection_support(),
            jsr305_support: default_jsr305_support(),
            sql_query_builder_support: default_sql_query_builder_support(),
            include_database_name_in_package: default_include_database_name_in_package(),
            encryption_support: default_encryption_support(),
            javaee_support: default_javaee_support(),
            generate_tests: default_generate_tests(),
            create_enum_inserts: default_create_enum_inserts(),
            strict_types: default_strict_types(),
            dry_run: default_dry_run(),
            log_level: None,
        }
    }
}

impl CodegenConfig {
    /// Create a default config with the given schema file
    pub fn default_with_schema(schema_file: PathBuf) -> Self {
        Self {
            schema_file,
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CodegenConfig = toml::from_str(&content).map_err(|e| {
            CodegenError::ConfigError(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(config)
    }

    /// Load configuration using config-rs (file + environment variables)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        } else {
            builder =
                builder.add_source(File::with_name(defaults::CONFIG_FILE_NAME).required(false));
        }

        // DBTOOLS_CODEGEN_OUTPUT_SRC_DIR -> output_src_dir (no nesting, keys keep underscores)
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: CodegenConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CodegenError::ValidationError(
                "schema_file is required".into(),
            ));
        }

        if !self.schema_file.exists() {
            return Err(CodegenError::ValidationError(format!(
                "Schema file not found: {}",
                self.schema_file.display()
            )));
        }

        validate_package_name(&self.base_package)?;

        if self.encryption_support && self.platform != Platform::Android {
            return Err(CodegenError::ValidationError(
                "encryption_support is only available for the android platform".into(),
            ));
        }

        Ok(())
    }
}

fn validate_package_name(package: &str) -> Result<()> {
    if package.trim().is_empty() {
        return Err(CodegenError::ValidationError(
            "base_package is required".into(),
        ));
    }

    for segment in package.split('.') {
        let mut chars = segment.chars();
        let valid_start = chars
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            .unwrap_or(false);
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_start || !valid_rest {
            return Err(CodegenError::ValidationError(format!(
                "base_package [{}] has an invalid segment [{}]",
                package, segment
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodegenConfig::default();
        assert_eq!(config.platform, Platform::Android);
        assert_eq!(config.date_type, DateType::JavaDate);
        assert!(config.jsr305_support);
        assert!(config.include_database_name_in_package);
        assert!(!config.strict_types);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validation_missing_schema() {
        let config = CodegenConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_with_log_level() {
        let toml_content = r#"
            schema_file = "test.xml"
            log_level = "debug"
        "#;
        let config: CodegenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_config_platform_and_date_type() {
        let toml_content = r#"
            schema_file = "schema.xml"
            platform = "jpa"
            date_type = "jsr-310"
            base_package = "com.acme.data"
        "#;
        let config: CodegenConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.platform, Platform::Jpa);
        assert_eq!(config.date_type, DateType::Jsr310);
        assert_eq!(config.base_package, "com.acme.data");
    }

    #[test]
    fn test_from_str_variants() {
        assert_eq!("ANDROID-JAVA".parse::<Platform>().unwrap(), Platform::Android);
        assert_eq!("JSR_310".parse::<DateType>().unwrap(), DateType::Jsr310);
        assert!("kotlin".parse::<Platform>().is_err());
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("org.dbtools.example").is_ok());
        assert!(validate_package_name("org..example").is_err());
        assert!(validate_package_name("org.1abc").is_err());
        assert!(validate_package_name("").is_err());
    }

    #[test]
    fn test_validate_existing_schema() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = CodegenConfig::default_with_schema(file.path().to_path_buf());
        assert!(config.validate().is_ok());

        let mut jpa = config.clone();
        jpa.platform = Platform::Jpa;
        jpa.encryption_support = true;
        assert!(jpa.validate().is_err());
    }
}
