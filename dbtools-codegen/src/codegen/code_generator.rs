//! Main code generator orchestrator

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codegen::entity::{plan_entity, PlanContext};
use crate::codegen::java::{write_java_file, JavaClass, WriteOutcome};
use crate::codegen::{android, database_manager, jpa, records};
use crate::config::{CodegenConfig, Platform};
use crate::error::Result;
use crate::schema::{DatabaseSchema, SchemaDatabase, SchemaEntity};

/// Timestamp format used in scaffold headers
const CREATED_FORMAT: &str = "%m/%d/%Y %I:%M:%S";

/// Files produced by one generator run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub files_written: usize,
    /// User files left alone because they already existed
    pub files_skipped: usize,
    /// Every path written, skipped, or (in a dry run) planned
    pub paths: Vec<PathBuf>,
}

impl GenerationReport {
    fn record(&mut self, outcome: WriteOutcome) {
        match &outcome {
            WriteOutcome::Written(_) => self.files_written += 1,
            WriteOutcome::Skipped(_) => self.files_skipped += 1,
        }
        self.paths.push(outcome.path().to_path_buf());
    }
}

/// How a rendered class is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileRole {
    /// Regenerated on every run
    Base,
    /// Scaffold the user owns once it exists
    User,
    /// Test scaffold under the test root
    Test,
}

struct RenderedFile {
    class: JavaClass,
    role: FileRole,
}

/// Main code generator that renders and writes every entity of a schema
pub struct CodeGenerator<'a> {
    config: &'a CodegenConfig,
    created: String,
}

impl<'a> CodeGenerator<'a> {
    /// Create a new code generator with the given configuration
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self {
            config,
            created: chrono::Local::now().format(CREATED_FORMAT).to_string(),
        }
    }

    /// Fix the scaffold header timestamp
    pub fn with_created(mut self, created: impl Into<String>) -> Self {
        self.created = created.into();
        self
    }

    /// Generate all databases of `schema`
    pub fn generate(&self, schema: &DatabaseSchema) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();

        for database in &schema.databases {
            info!(
                "Generating {} sources for database {}",
                self.config.platform, database.name
            );

            for entity in database.entities() {
                // everything for an entity renders before anything is written
                let files = self.render_entity(database, entity)?;
                self.write_files(files, &mut report)?;
            }
        }

        if self.config.platform == Platform::Android && !schema.databases.is_empty() {
            let files = vec![
                RenderedFile {
                    class: database_manager::render_database_base_manager(schema, self.config),
                    role: FileRole::Base,
                },
                RenderedFile {
                    class: database_manager::render_database_manager(
                        schema,
                        self.config,
                        &self.created,
                    ),
                    role: FileRole::User,
                },
            ];
            self.write_files(files, &mut report)?;
        }

        if self.config.dry_run {
            info!("Dry run: {} files planned", report.paths.len());
        } else {
            info!(
                "Code generation complete: {} written, {} skipped",
                report.files_written, report.files_skipped
            );
        }
        Ok(report)
    }

    fn render_entity(
        &self,
        database: &SchemaDatabase,
        entity: &SchemaEntity,
    ) -> Result<Vec<RenderedFile>> {
        let ctx = PlanContext::new(self.config, database, entity);

        if entity.is_enumeration_table() {
            return Ok(vec![RenderedFile {
                class: records::render_enum_class(entity, &database.name, &ctx.package)?,
                role: FileRole::Base,
            }]);
        }

        let plan = plan_entity(entity, &ctx)?;
        let created = self.created.as_str();
        let config = self.config;

        let files = match config.platform {
            Platform::Android => vec![
                (android::render_base_record(&plan, config)?, FileRole::Base),
                (android::render_base_manager(&plan, config), FileRole::Base),
                (android::render_user_record(&plan, config, created), FileRole::User),
                (android::render_user_manager(&plan, config, created), FileRole::User),
            ],
            Platform::Jpa if plan.is_query() => {
                debug!("Skipping query {} for JPA", entity.name);
                Vec::new()
            }
            Platform::Jpa => {
                let mut files = vec![
                    (jpa::render_base_record(&plan, config), FileRole::Base),
                    (jpa::render_base_manager(&plan, config), FileRole::Base),
                    (jpa::render_user_record(&plan, created), FileRole::User),
                    (jpa::render_user_manager(&plan, config, created), FileRole::User),
                ];
                if config.generate_tests {
                    files.push((jpa::render_test_class(&plan, created), FileRole::Test));
                }
                files
            }
        };

        Ok(files
            .into_iter()
            .map(|(class, role)| RenderedFile { class, role })
            .collect())
    }

    fn root_for(&self, role: FileRole) -> &Path {
        match role {
            FileRole::Base | FileRole::User => &self.config.output_src_dir,
            FileRole::Test => &self.config.output_test_dir,
        }
    }

    fn write_files(&self, files: Vec<RenderedFile>, report: &mut GenerationReport) -> Result<()> {
        for file in files {
            let root = self.root_for(file.role);

            if self.config.dry_run {
                let path = file.class.file_path(root);
                debug!("Dry run: would write {}", path.display());
                report.paths.push(path);
                continue;
            }

            let outcome = write_java_file(&file.class, root, file.role == FileRole::Base)?;
            if !outcome.is_written() {
                debug!("Keeping user file {}", outcome.path().display());
            }
            report.record(outcome);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;
    use std::fs;

    const SCHEMA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dbSchema>
    <database name="main">
        <table name="ROLE_TYPE" enumerations="ADMIN,GUEST">
            <field name="_id" jdbcDataType="INTEGER" primaryKey="true" increment="true"/>
            <field name="NAME" jdbcDataType="VARCHAR" notNull="true"/>
        </table>
        <table name="PHONE">
            <field name="_id" jdbcDataType="INTEGER" primaryKey="true" increment="true"/>
            <field name="PERSON_ID" jdbcDataType="INTEGER" foreignKeyTable="PERSON" foreignKeyField="_id" foreignKeyType="ONETOMANY"/>
        </table>
        <table name="PERSON">
            <field name="_id" jdbcDataType="INTEGER" primaryKey="true" increment="true"/>
            <field name="NAME" jdbcDataType="VARCHAR" notNull="true"/>
        </table>
        <view name="PERSON_VIEW">
            <field name="NAME" jdbcDataType="VARCHAR" notNull="true"/>
        </view>
    </database>
</dbSchema>"#;

    fn make_config(dir: &Path, platform: Platform) -> CodegenConfig {
        CodegenConfig {
            output_src_dir: dir.join("src"),
            output_test_dir: dir.join("test"),
            base_package: "org.example".to_string(),
            platform,
            ..Default::default()
        }
    }

    #[test]
    fn test_android_generation_writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_config(dir.path(), Platform::Android);
        let schema = parse_schema(SCHEMA).unwrap();

        let report = CodeGenerator::new(&config).generate(&schema).unwrap();

        // enum table: 1, two tables and a view: 4 each, database managers: 2
        assert_eq!(report.files_written, 15);
        assert_eq!(report.files_skipped, 0);
        let package = dir.path().join("src/org/example/main");
        assert!(package.join("roletype/RoleType.java").exists());
        assert!(package.join("person/PersonBaseRecord.java").exists());
        assert!(package.join("personview/PersonViewManager.java").exists());
        assert!(!package.join("roletype/RoleTypeManager.java").exists());
        assert!(dir.path().join("src/org/example/DatabaseBaseManager.java").exists());
        assert!(dir.path().join("src/org/example/DatabaseManager.java").exists());
    }

    #[test]
    fn test_injected_managers_reference_generated_database_manager() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            injection_support: true,
            ..make_config(dir.path(), Platform::Android)
        };
        let schema = parse_schema(SCHEMA).unwrap();
        CodeGenerator::new(&config).generate(&schema).unwrap();

        let manager = fs::read_to_string(
            dir.path().join("src/org/example/main/person/PersonBaseManager.java"),
        )
        .unwrap();
        assert!(manager.contains("import org.example.DatabaseManager;"));
        let database_manager =
            fs::read_to_string(dir.path().join("src/org/example/DatabaseManager.java")).unwrap();
        assert!(database_manager.contains("package org.example;"));
        assert!(database_manager.contains("public class DatabaseManager extends DatabaseBaseManager {"));
    }

    #[test]
    fn test_tables_are_generated_in_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            dry_run: true,
            ..make_config(dir.path(), Platform::Android)
        };
        let schema = parse_schema(SCHEMA).unwrap();
        let report = CodeGenerator::new(&config).generate(&schema).unwrap();

        let person = report
            .paths
            .iter()
            .position(|p| p.ends_with("PersonBaseRecord.java"))
            .unwrap();
        let phone = report
            .paths
            .iter()
            .position(|p| p.ends_with("PhoneBaseRecord.java"))
            .unwrap();
        assert!(phone < person);
    }

    #[test]
    fn test_user_files_survive_regeneration() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_config(dir.path(), Platform::Android);
        let schema = parse_schema(SCHEMA).unwrap();
        let generator = CodeGenerator::new(&config).with_created("01/01/2026 12:00:00");

        generator.generate(&schema).unwrap();
        let package = dir.path().join("src/org/example/main/person");
        let user_file = package.join("Person.java");
        let base_file = package.join("PersonBaseRecord.java");
        fs::write(&user_file, "// hand edited").unwrap();
        let base_before = fs::read_to_string(&base_file).unwrap();

        let report = generator.generate(&schema).unwrap();
        assert_eq!(fs::read_to_string(&user_file).unwrap(), "// hand edited");
        assert_eq!(fs::read_to_string(&base_file).unwrap(), base_before);
        assert_eq!(report.files_skipped, 7);
        assert_eq!(report.files_written, 8);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            dry_run: true,
            ..make_config(dir.path(), Platform::Android)
        };
        let schema = parse_schema(SCHEMA).unwrap();

        let report = CodeGenerator::new(&config).generate(&schema).unwrap();
        assert_eq!(report.files_written, 0);
        assert_eq!(report.paths.len(), 15);
        assert!(!dir.path().join("src").exists());
    }

    #[test]
    fn test_jpa_generation_with_tests() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            generate_tests: true,
            ..make_config(dir.path(), Platform::Jpa)
        };
        let schema = parse_schema(SCHEMA).unwrap();

        let report = CodeGenerator::new(&config).generate(&schema).unwrap();
        // enum: 1, tables and view: 5 each
        assert_eq!(report.files_written, 16);
        assert!(dir
            .path()
            .join("test/org/example/main/person/PersonTest.java")
            .exists());
        let record =
            fs::read_to_string(dir.path().join("src/org/example/main/person/PersonBaseRecord.java"))
                .unwrap();
        assert!(record.contains("@javax.persistence.MappedSuperclass()"));
    }

    #[test]
    fn test_strict_types_abort_before_writing_entity() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodegenConfig {
            strict_types: true,
            ..make_config(dir.path(), Platform::Android)
        };
        let schema = parse_schema(
            r#"<dbSchema><database name="main">
                <view name="LEDGER"><field name="AMOUNT" jdbcDataType="MONEY" notNull="true"/></view>
            </database></dbSchema>"#,
        )
        .unwrap();

        assert!(CodeGenerator::new(&config).generate(&schema).is_err());
        assert!(!dir.path().join("src/org/example/main/ledger").exists());
    }
}
