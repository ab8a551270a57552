//! Android `DatabaseBaseManager` and `DatabaseManager` rendering
//!
//! One pair per schema, placed in the base package. The base class creates
//! every table and view of each database; the scaffold registers the
//! databases with their versions and is left to the user after the first run.

use tracing::debug;

use crate::codegen::android::sqlite_imports;
use crate::codegen::java::{
    generated_file_header, quote, user_file_header, Access, ClassKind, JavaClass, JavaMethod,
    JavaParam, JavaVariable,
};
use crate::codegen::naming;
use crate::config::CodegenConfig;
use crate::schema::{DatabaseSchema, SchemaDatabase};

const BASE_CLASS: &str = "DatabaseBaseManager";
const USER_CLASS: &str = "DatabaseManager";
const ANDROID_DATABASE: &str = "org.dbtools.android.domain.AndroidDatabase";

/// Constant prefix for a database name, periods dropped ("mydb.sqlite" -> `MYDBSQLITE`)
fn database_constant(database: &SchemaDatabase) -> String {
    naming::to_constant_name(&database.name.replace('.', ""))
}

/// e.g., ("create", MAIN, "TABLES") -> "createMainTables"
fn database_method(prefix: &str, database: &SchemaDatabase, suffix: &str) -> String {
    let var = naming::to_variable_name(&format!("{}_{}", database_constant(database), suffix));
    format!("{}{}", prefix, naming::capitalize(&var))
}

fn android_database_param(config: &CodegenConfig) -> JavaParam {
    let mut param = JavaParam::new("AndroidDatabase", "androidDatabase");
    if config.jsr305_support {
        param.annotations.push("@Nonnull".to_string());
    }
    param
}

/// Fully qualified name of an entity class of `database`
fn qualified_class(config: &CodegenConfig, database: &SchemaDatabase, class_name: &str) -> String {
    let package = naming::entity_package(
        &config.base_package,
        &database.name,
        class_name,
        config.include_database_name_in_package,
    );
    format!("{}.{}", package, class_name)
}

/// Dispatch on the database name: `if (name.equals(MAIN_DATABASE_NAME)) { call(androidDatabase); }`
fn dispatch_lines(database: &SchemaDatabase, method: &str) -> [String; 3] {
    [
        format!(
            "if (androidDatabase.getName().equals({}_DATABASE_NAME)) {{",
            database_constant(database)
        ),
        format!("    {}(androidDatabase);", method),
        "}".to_string(),
    ]
}

/// Body of a per-database method: one `AndroidBaseManager` call per statement, in a transaction
fn transaction_body(config: &CodegenConfig, sections: Vec<(&str, Vec<String>)>) -> Vec<String> {
    let getter = if config.encryption_support {
        "getSecureSqLiteDatabase"
    } else {
        "getSqLiteDatabase"
    };

    let mut lines = vec![
        format!("SQLiteDatabase database = androidDatabase.{}();", getter),
        "database.beginTransaction();".to_string(),
    ];
    for (title, statements) in sections {
        lines.push(String::new());
        lines.push(format!("// {}", title));
        lines.extend(statements);
    }
    lines.push(String::new());
    lines.push("database.setTransactionSuccessful();".to_string());
    lines.push("database.endTransaction();".to_string());
    lines
}

/// Abstract `DatabaseBaseManager`, regenerated on every run
pub fn render_database_base_manager(schema: &DatabaseSchema, config: &CodegenConfig) -> JavaClass {
    debug!("Rendering {} in {}", BASE_CLASS, config.base_package);

    let mut class = JavaClass::new(&config.base_package, BASE_CLASS);
    class.kind = ClassKind::AbstractClass;
    class.file_header = Some(generated_file_header(BASE_CLASS));
    class.add_annotation("@SuppressWarnings(\"all\")");
    class.extends = Some("AndroidDatabaseManager".to_string());
    class.add_import("android.util.Log");
    class.add_import(ANDROID_DATABASE);
    class.add_import(if config.encryption_support {
        "org.dbtools.android.domain.secure.AndroidDatabaseManager"
    } else {
        "org.dbtools.android.domain.AndroidDatabaseManager"
    });
    sqlite_imports(&mut class, config);
    if config.jsr305_support {
        class.add_import("javax.annotation.Nonnull");
    }

    let param = android_database_param(config);
    let mut on_create = vec!["Log.i(TAG, \"Creating database: \" + androidDatabase.getName());".to_string()];
    let mut on_create_views =
        vec!["Log.i(TAG, \"Creating database views: \" + androidDatabase.getName());".to_string()];
    let mut on_drop_views =
        vec!["Log.i(TAG, \"Dropping database views: \" + androidDatabase.getName());".to_string()];
    let mut database_methods = Vec::new();

    for database in &schema.databases {
        class.add_constant(
            "String",
            format!("{}_DATABASE_NAME", database_constant(database)),
            quote(&database.name),
        );

        let create_table = |enums: bool| -> Vec<String> {
            database
                .tables
                .iter()
                .filter(|t| t.is_enumeration_table() == enums)
                .map(|t| {
                    format!(
                        "AndroidBaseManager.createTable(database, {}.CREATE_TABLE);",
                        qualified_class(config, database, &t.class_name)
                    )
                })
                .collect()
        };
        let create_tables = database_method("create", database, "TABLES");
        on_create.extend(dispatch_lines(database, &create_tables));
        database_methods.push(
            JavaMethod::new("void", &create_tables)
                .param_with(param.clone())
                .lines(transaction_body(
                    config,
                    vec![("Enum Tables", create_table(true)), ("Tables", create_table(false))],
                )),
        );

        if database.views.is_empty() {
            continue;
        }

        let view_statements = |call: &str, constant: &str| -> Vec<String> {
            database
                .views
                .iter()
                .map(|v| {
                    format!(
                        "AndroidBaseManager.{}(database, {}.{});",
                        call,
                        qualified_class(config, database, &v.class_name),
                        constant
                    )
                })
                .collect()
        };
        let create_views = database_method("create", database, "VIEWS");
        let drop_views = database_method("drop", database, "VIEWS");
        on_create_views.extend(dispatch_lines(database, &create_views));
        on_drop_views.extend(dispatch_lines(database, &drop_views));
        database_methods.push(
            JavaMethod::new("void", &create_views)
                .param_with(param.clone())
                .lines(transaction_body(
                    config,
                    vec![("Views", view_statements("createTable", "CREATE_VIEW"))],
                )),
        );
        database_methods.push(
            JavaMethod::new("void", &drop_views)
                .param_with(param.clone())
                .lines(transaction_body(
                    config,
                    vec![("Views", view_statements("dropTable", "DROP_VIEW"))],
                )),
        );
    }

    class.add_method(JavaMethod::new("void", "onCreate").param_with(param.clone()).lines(on_create));
    class.add_method(
        JavaMethod::new("void", "onCreateViews")
            .param_with(param.clone())
            .lines(on_create_views),
    );
    class.add_method(JavaMethod::new("void", "onDropViews").param_with(param).lines(on_drop_views));
    for method in database_methods {
        class.add_method(method);
    }

    class
}

/// `DatabaseManager` scaffold, written only when absent
pub fn render_database_manager(
    schema: &DatabaseSchema,
    config: &CodegenConfig,
    created: &str,
) -> JavaClass {
    debug!("Rendering {} in {}", USER_CLASS, config.base_package);

    let mut class = JavaClass::new(&config.base_package, USER_CLASS);
    class.file_header = Some(user_file_header(USER_CLASS, created));
    class.extends = Some(BASE_CLASS.to_string());
    class.add_import("android.util.Log");
    class.add_import("android.app.Application");
    class.add_import(ANDROID_DATABASE);
    class.add_import("org.dbtools.android.domain.database.DatabaseWrapper");
    class.add_import("org.dbtools.android.domain.database.AndroidDatabaseWrapper");

    let mut application = JavaVariable::new("Application", "application");
    if config.injection_support {
        class.add_import("javax.inject.Inject");
        class.add_import("javax.inject.Singleton");
        class.add_annotation("@Singleton");
        application = application
            .with_annotation("@Inject")
            .with_access(Access::PackagePrivate)
            .without_accessors();
    } else {
        application.generate_getter = false;
    }
    class.add_variable(application);

    let mut identify = JavaMethod::new("void", "identifyDatabases");
    for database in &schema.databases {
        let constant = database_constant(database);
        class.add_constant("int", format!("{}_VERSION", constant), "1");
        class.add_constant("int", format!("{}_VIEWS_VERSION", constant), "1");
        identify = identify.line(format!(
            "addDatabase(application, {0}_DATABASE_NAME, {0}_VERSION, {0}_VIEWS_VERSION);",
            constant
        ));
    }
    class.add_method(identify);

    class.add_method(
        JavaMethod::new("DatabaseWrapper", "createNewDatabaseWrapper")
            .param("AndroidDatabase", "androidDatabase")
            .line("return new AndroidDatabaseWrapper(androidDatabase.getPath());"),
    );

    let upgrade = |name: &str, label: &str| {
        JavaMethod::new("void", name)
            .param("AndroidDatabase", "androidDatabase")
            .param("int", "oldVersion")
            .param("int", "newVersion")
            .line("String databaseName = androidDatabase.getName();")
            .line(format!(
                "Log.i(TAG, \"Upgrading database [\" + databaseName + \"] {}from version \" + oldVersion + \" to \" + newVersion);",
                label
            ))
    };
    class.add_method(upgrade("onUpgrade", ""));
    class.add_method(
        upgrade("onUpgradeViews", "VIEWS ")
            .line("// automatically drop/create views")
            .line("super.onUpgradeViews(androidDatabase, oldVersion, newVersion);"),
    );

    class
}
