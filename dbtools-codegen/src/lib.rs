//! dbtools-codegen: Generate Java data-access classes from a dbtools XML schema
//!
//! This crate provides both a CLI tool and a library for turning an XML
//! database schema into Java sources for one of two platforms:
//!
//! - Android: SQLite base records with `ContentValues`/`Cursor` marshalling,
//!   `CREATE TABLE` constants and base managers
//! - JPA: `@MappedSuperclass` base records, `@Entity` user records and
//!   `EntityManager`-backed managers (optionally with JUnit test scaffolds)
//!
//! Base classes are regenerated on every run. User classes are written once
//! and never overwritten afterwards.
//!
//! # Usage in build.rs (Recommended)
//!
//! Configure in your `Cargo.toml`:
//!
//! ```toml
//! [package.metadata.dbtools-codegen]
//! schema_file = "schema.xml"
//! base_package = "com.example.data"
//! platform = "android"
//! ```
//!
//! Then use a minimal `build.rs`:
//!
//! ```rust,ignore
//! fn main() {
//!     dbtools_codegen::generate_from_cargo_metadata()
//!         .expect("Failed to generate Java sources");
//! }
//! ```
//!
//! # Alternative: Programmatic Configuration
//!
//! ```rust,ignore
//! use dbtools_codegen::config::Platform;
//!
//! fn main() {
//!     dbtools_codegen::CodegenBuilder::new("schema.xml")
//!         .output_src_dir("java/src")
//!         .base_package("com.example.data")
//!         .platform(Platform::Jpa)
//!         .generate()
//!         .expect("Failed to generate Java sources");
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! dbtools-codegen --schema schema.xml --output ./java/src --package com.example.data generate
//! dbtools-codegen --schema schema.xml sql --drop
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod schema;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use codegen::{CodeGenerator, GenerationReport};
pub use config::CodegenConfig;
pub use error::{CodegenError, Result};

use config::{DateType, Platform};

/// Main entry point for code generation
pub fn generate(config: &CodegenConfig) -> Result<GenerationReport> {
    info!("Loading schema: {:?}", config.schema_file);
    let schema = schema::load_schema(&config.schema_file)?;
    debug!(
        "Found {} databases ({} entities)",
        schema.databases.len(),
        schema
            .databases
            .iter()
            .map(|db| db.entities().count())
            .sum::<usize>()
    );

    CodeGenerator::new(config).generate(&schema)
}

/// Render the CREATE (or DROP) SQL script for the configured schema
pub fn render_sql(config: &CodegenConfig, drop: bool) -> Result<String> {
    let schema = schema::load_schema(&config.schema_file)?;
    if drop {
        return Ok(codegen::ddl::render_drop_script(&schema));
    }
    let mut session = codegen::ddl::RenderSession::new();
    codegen::ddl::render_schema_script(&schema, &mut session, config.create_enum_inserts)
}

/// Builder pattern for easy configuration in build.rs
pub struct CodegenBuilder {
    config: CodegenConfig,
}

impl CodegenBuilder {
    /// Create a new builder with the given schema file
    pub fn new(schema_file: impl AsRef<Path>) -> Self {
        Self {
            config: CodegenConfig::default_with_schema(schema_file.as_ref().to_path_buf()),
        }
    }

    /// Set the root directory for generated sources
    pub fn output_src_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_src_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the root directory for generated test scaffolds
    pub fn output_test_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_test_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn base_package(mut self, package: &str) -> Self {
        self.config.base_package = package.to_string();
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = platform;
        self
    }

    pub fn date_type(mut self, date_type: DateType) -> Self {
        self.config.date_type = date_type;
        self
    }

    /// Generate injectable managers instead of static ones
    pub fn injection_support(mut self, enabled: bool) -> Self {
        self.config.injection_support = enabled;
        self
    }

    /// Toggle `@Nonnull`/`@Nullable` annotations on accessors
    pub fn jsr305_support(mut self, enabled: bool) -> Self {
        self.config.jsr305_support = enabled;
        self
    }

    pub fn include_database_name_in_package(mut self, enabled: bool) -> Self {
        self.config.include_database_name_in_package = enabled;
        self
    }

    /// Also write JUnit scaffolds (JPA only)
    pub fn generate_tests(mut self, enabled: bool) -> Self {
        self.config.generate_tests = enabled;
        self
    }

    /// Fail on data types without a marshalling instead of emitting placeholders
    pub fn strict_types(mut self, enabled: bool) -> Self {
        self.config.strict_types = enabled;
        self
    }

    /// Enable dry run mode (preview without writing files)
    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    /// Generate the code
    pub fn generate(self) -> Result<GenerationReport> {
        self.config.validate()?;
        generate(&self.config)
    }
}

/// Configuration for `[package.metadata.dbtools-codegen]` in Cargo.toml
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct CargoMetadataConfig {
    /// Path to the XML schema file (required)
    schema_file: Option<String>,

    /// Java package prefix of all generated classes
    base_package: Option<String>,

    /// "android" or "jpa"
    platform: Option<Platform>,

    date_type: Option<DateType>,

    /// Output directory for sources (default: $OUT_DIR/src)
    output_src_dir: Option<String>,

    /// Output directory for test scaffolds (default: $OUT_DIR/test)
    output_test_dir: Option<String>,

    injection_support: Option<bool>,
    jsr305_support: Option<bool>,
    include_database_name_in_package: Option<bool>,
    generate_tests: Option<bool>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoToml {
    package: Option<CargoPackage>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackage {
    metadata: Option<CargoPackageMetadata>,
}

#[derive(Debug, serde::Deserialize)]
struct CargoPackageMetadata {
    #[serde(rename = "dbtools-codegen")]
    dbtools_codegen: Option<CargoMetadataConfig>,
}

/// Generate code from `[package.metadata.dbtools-codegen]` in Cargo.toml
///
/// ```rust,ignore
/// // build.rs
/// fn main() {
///     dbtools_codegen::generate_from_cargo_metadata()
///         .expect("Failed to generate Java sources");
/// }
/// ```
///
/// Relative paths are resolved against the manifest directory.
pub fn generate_from_cargo_metadata() -> Result<GenerationReport> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        CodegenError::ConfigError(
            "CARGO_MANIFEST_DIR not set - are you running from build.rs?".into(),
        )
    })?;
    let manifest_dir = PathBuf::from(manifest_dir);

    let cargo_toml_path = manifest_dir.join("Cargo.toml");
    let cargo_toml_content = std::fs::read_to_string(&cargo_toml_path)?;
    let metadata_config = parse_cargo_metadata(&cargo_toml_content).map_err(|e| match e {
        CodegenError::ConfigError(msg) => CodegenError::ConfigError(format!(
            "{} ({})",
            msg,
            cargo_toml_path.display()
        )),
        other => other,
    })?;

    let schema_file = metadata_config.schema_file.clone().ok_or_else(|| {
        CodegenError::ConfigError(
            "schema_file is required in [package.metadata.dbtools-codegen]".into(),
        )
    })?;
    let schema_path = manifest_dir.join(&schema_file);

    let out_dir = std::env::var("OUT_DIR").map(PathBuf::from).map_err(|_| {
        CodegenError::ConfigError("OUT_DIR not set - are you running from build.rs?".into())
    })?;

    let builder = apply_cargo_metadata(
        CodegenBuilder::new(&schema_path),
        metadata_config,
        &manifest_dir,
        &out_dir,
    );

    println!("cargo:rerun-if-changed={}", schema_path.display());
    println!("cargo:rerun-if-changed={}", cargo_toml_path.display());

    builder.generate()
}

fn parse_cargo_metadata(content: &str) -> Result<CargoMetadataConfig> {
    let cargo_toml: CargoToml = toml::from_str(content)
        .map_err(|e| CodegenError::ConfigError(format!("Failed to parse Cargo.toml: {}", e)))?;

    cargo_toml
        .package
        .and_then(|p| p.metadata)
        .and_then(|m| m.dbtools_codegen)
        .ok_or_else(|| {
            CodegenError::ConfigError(
                "Missing [package.metadata.dbtools-codegen] section in Cargo.toml".into(),
            )
        })
}

fn apply_cargo_metadata(
    mut builder: CodegenBuilder,
    metadata: CargoMetadataConfig,
    manifest_dir: &Path,
    out_dir: &Path,
) -> CodegenBuilder {
    builder = match metadata.output_src_dir {
        Some(dir) => builder.output_src_dir(manifest_dir.join(dir)),
        None => builder.output_src_dir(out_dir.join("src")),
    };
    builder = match metadata.output_test_dir {
        Some(dir) => builder.output_test_dir(manifest_dir.join(dir)),
        None => builder.output_test_dir(out_dir.join("test")),
    };

    if let Some(package) = metadata.base_package {
        builder = builder.base_package(&package);
    }
    if let Some(platform) = metadata.platform {
        builder = builder.platform(platform);
    }
    if let Some(date_type) = metadata.date_type {
        builder = builder.date_type(date_type);
    }
    if let Some(enabled) = metadata.injection_support {
        builder = builder.injection_support(enabled);
    }
    if let Some(enabled) = metadata.jsr305_support {
        builder = builder.jsr305_support(enabled);
    }
    if let Some(enabled) = metadata.include_database_name_in_package {
        builder = builder.include_database_name_in_package(enabled);
    }
    if let Some(enabled) = metadata.generate_tests {
        builder = builder.generate_tests(enabled);
    }

    builder
}
