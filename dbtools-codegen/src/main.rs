//! CLI entry point for dbtools-codegen

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dbtools_codegen::config::{CodegenConfig, Platform};
use dbtools_codegen::schema::{self, DatabaseSchema};

#[derive(Parser)]
#[command(name = "dbtools-codegen")]
#[command(about = "Generate Java record and manager classes from a dbtools XML schema")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to XML schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Output source directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base Java package (overrides config)
    #[arg(short, long)]
    package: Option<String>,

    /// Target platform: android or jpa (overrides config)
    #[arg(long)]
    platform: Option<Platform>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Java sources (default)
    Generate,
    /// Print the SQL script for the schema
    Sql {
        /// Print DROP statements instead of CREATE statements
        #[arg(long)]
        drop: bool,
    },
    /// Inspect schema (show parsed entities for debugging)
    Inspect {
        /// Print the parsed model as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = match &cli.config {
        Some(path) => CodegenConfig::from_file(path)?,
        None => CodegenConfig::load(None)?,
    };

    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(output) = cli.output {
        config.output_src_dir = output;
    }
    if let Some(package) = cli.package {
        config.base_package = package;
    }
    if let Some(platform) = cli.platform {
        config.platform = platform;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    config.validate()?;

    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => {
            info!("Generating code from schema: {:?}", config.schema_file);
            let report = dbtools_codegen::generate(&config)?;

            if config.dry_run {
                println!("Dry run mode - would generate:");
                for path in &report.paths {
                    println!("  {}", path.display());
                }
            } else {
                info!(
                    "Code generation completed successfully ({} written, {} kept)",
                    report.files_written, report.files_skipped
                );
            }
        }
        Commands::Sql { drop } => {
            print!("{}", dbtools_codegen::render_sql(&config, drop)?);
        }
        Commands::Inspect { json } => {
            let schema = schema::load_schema(&config.schema_file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else {
                print_schema(&schema);
            }
        }
    }

    Ok(())
}

fn print_schema(schema: &DatabaseSchema) {
    for database in &schema.databases {
        println!("Database: {}\n", database.name);
        for entity in database.entities() {
            println!("{} {} ({})", entity.kind_label(), entity.name, entity.class_name);
            for field in &entity.fields {
                let nullable = if field.not_null { "NOT NULL" } else { "NULL" };
                let pk = if field.primary_key { " PRIMARY KEY" } else { "" };
                println!("    - {} {} {}{}", field.name, field.data_type, nullable, pk);
                if let Some(target) = field.foreign_key_table() {
                    println!("      -> {} ({:?})", target, field.foreign_key_type());
                }
            }
            if let Some(enums) = entity.table_enums().filter(|e| !e.is_empty()) {
                let names: Vec<&str> = enums.iter().map(|e| e.name.as_str()).collect();
                println!("  Enumerations: {}", names.join(", "));
            }
            println!();
        }
    }
}
