//! Default configuration values - single source of truth

use super::settings::{DateType, Platform};

/// Default output root for generated main sources
pub const OUTPUT_SRC_DIR: &str = "./generated/src";

/// Default output root for generated test sources
pub const OUTPUT_TEST_DIR: &str = "./generated/test";

/// Default base Java package
pub const BASE_PACKAGE: &str = "org.dbtools.example";

/// Default target platform
pub const PLATFORM: Platform = Platform::Android;

/// Default date representation
pub const DATE_TYPE: DateType = DateType::JavaDate;

/// Whether managers are generated for dependency injection by default
pub const INJECTION_SUPPORT: bool = false;

/// Whether JSR-305 nullability annotations are generated by default
pub const JSR305_SUPPORT: bool = true;

/// Whether view/query SQL uses SQLQueryBuilder by default
pub const SQL_QUERY_BUILDER_SUPPORT: bool = false;

/// Whether the database name becomes a package segment by default
pub const INCLUDE_DATABASE_NAME_IN_PACKAGE: bool = true;

/// Whether the SQLCipher manager variant is generated by default
pub const ENCRYPTION_SUPPORT: bool = false;

/// Whether JPA managers carry JavaEE transaction annotations by default
pub const JAVAEE_SUPPORT: bool = false;

/// Whether JPA unit test scaffolds are generated by default
pub const GENERATE_TESTS: bool = false;

/// Whether enumeration tables get INSERT statements in their DDL by default
pub const CREATE_ENUM_INSERTS: bool = true;

/// Whether unsupported field types abort generation by default
pub const STRICT_TYPES: bool = false;

/// Whether to run in dry-run mode by default
pub const DRY_RUN: bool = false;

/// Default config file name looked up by `CodegenConfig::load`
pub const CONFIG_FILE_NAME: &str = "dbtools-codegen";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "DBTOOLS_CODEGEN";
