//! Android SQLite record and manager rendering

use tracing::debug;

use crate::codegen::ddl;
use crate::codegen::entity::{EntityPlan, EnumPlan, FieldPlan};
use crate::codegen::java::{
    generated_file_header, quote, user_file_header, Access, ClassKind, JavaClass, JavaEnum,
    JavaMethod, JavaParam, JavaVariable,
};
use crate::codegen::type_resolver::{JavaType, Marshal};
use crate::codegen::{naming, records};
use crate::config::CodegenConfig;
use crate::error::Result;

const ANDROID_BASE_RECORD: &str = "org.dbtools.android.domain.AndroidBaseRecord";
const CONTENT_VALUES: &str = "org.dbtools.android.domain.database.contentvalues.DBToolsContentValues";
const STATEMENT_WRAPPER: &str = "org.dbtools.android.domain.database.statement.StatementWrapper";
const CURSOR: &str = "android.database.Cursor";
const QUERY_BUILDER: &str = "org.dbtools.query.sql.SQLQueryBuilder";
const QUERY_TABLES_TEMPLATE: &str = "FROM SOME TABLE(S)";

/// Abstract `<Class>BaseRecord`, regenerated on every run
pub fn render_base_record(plan: &EntityPlan, config: &CodegenConfig) -> Result<JavaClass> {
    let class_name = plan.base_record_name();
    debug!("Rendering Android base record {}", class_name);

    let mut class = JavaClass::new(&plan.package, &class_name);
    class.kind = ClassKind::AbstractClass;
    class.file_header = Some(generated_file_header(&class_name));
    class.add_annotation("@SuppressWarnings(\"all\")");
    class.extends = Some("AndroidBaseRecord".to_string());
    class.add_import(ANDROID_BASE_RECORD);
    class.add_import(CONTENT_VALUES);
    class.add_import(STATEMENT_WRAPPER);
    class.add_import(CURSOR);
    for import in &plan.imports {
        class.add_import(import);
    }
    if config.jsr305_support {
        class.add_import("javax.annotation.Nonnull");
        class.add_import("javax.annotation.Nullable");
    }

    add_table_constants(&mut class, plan)?;
    add_field_variables(&mut class, plan, config);
    add_primary_key_methods(&mut class, plan);
    add_marshalling_methods(&mut class, plan);
    add_references(&mut class, plan, config);
    add_collections(&mut class, plan);

    class.add_method(
        JavaMethod::new("boolean", "isNewRecord").line("return getPrimaryKeyId() <= 0;"),
    );

    Ok(class)
}

fn add_table_constants(class: &mut JavaClass, plan: &EntityPlan) -> Result<()> {
    let entity = plan.entity;

    class.add_constant("String", "DATABASE", quote(&plan.database_name));
    if !plan.is_query() {
        class.add_constant("String", "TABLE", quote(&entity.name));
        class.add_constant(
            "String",
            "FULL_TABLE",
            quote(&format!("{}.{}", plan.database_name, entity.name)),
        );
    }

    if let Some(pk) = plan.primary_key_column() {
        class.add_constant("String", "PRIMARY_KEY_COLUMN", quote(&pk.column));
    }

    for column in &plan.columns {
        class.add_constant("String", column.column_constant(), quote(&column.column));
        class.add_constant(
            "String",
            column.full_column_constant(),
            quote(&column.full_column),
        );
    }

    if plan.is_table() {
        class.add_constant(
            "String",
            "CREATE_TABLE",
            quote(&ddl::render_table_statement(entity)?),
        );
        class.add_constant("String", "DROP_TABLE", quote(&ddl::render_drop_table(entity)));

        let insert_columns: Vec<&str> = plan
            .fields
            .iter()
            .filter(|f| !f.column.is_generated_key())
            .map(|f| f.column.column.as_str())
            .collect();
        let placeholders = vec!["?"; insert_columns.len()].join(",");
        class.add_constant(
            "String",
            "INSERT_STATEMENT",
            quote(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                entity.name,
                insert_columns.join(","),
                placeholders
            )),
        );

        let assignments: Vec<String> = insert_columns.iter().map(|c| format!("{}=?", c)).collect();
        let mut update = format!("UPDATE {} SET {}", entity.name, assignments.join(", "));
        if let Some(pk) = plan.primary_key_column() {
            update.push_str(&format!(" WHERE {} = ?", pk.column));
        }
        class.add_constant("String", "UPDATE_STATEMENT", quote(&update));
    }

    let columns: Vec<String> = plan.columns.iter().map(|c| c.column_constant()).collect();
    let full_columns: Vec<String> = plan
        .columns
        .iter()
        .map(|c| c.full_column_constant())
        .collect();
    class.add_constant(
        "String[]",
        "ALL_COLUMNS",
        format!("new String[] {{{}}}", columns.join(", ")),
    );
    class.add_constant(
        "String[]",
        "ALL_COLUMNS_FULL",
        format!("new String[] {{{}}}", full_columns.join(", ")),
    );

    Ok(())
}

fn add_field_variables(class: &mut JavaClass, plan: &EntityPlan, config: &CodegenConfig) {
    for field in &plan.fields {
        if let Some(EnumPlan {
            enum_class,
            inner_values: Some(values),
            ..
        }) = &field.enumeration
        {
            class.add_inner_enum(JavaEnum::new(enum_class, values.clone()));
        }

        let mut variable = JavaVariable::new(field.type_string(), &field.var_name);
        variable.default_value = field.default_value.clone();
        variable.clone_on_access = field.java_type.is_mutable();
        variable.accessor_annotation =
            records::accessor_annotation(&field.java_type, field.not_null(), config.jsr305_support);
        class.add_variable(variable);
    }
}

fn add_primary_key_methods(class: &mut JavaClass, plan: &EntityPlan) {
    let integral_pk = plan.primary_key_field().filter(|pk| {
        matches!(
            pk.java_type.inner_type(),
            JavaType::Int | JavaType::Long
        )
    });

    let (column, getter, setter) = match integral_pk {
        Some(pk) => {
            let var = &pk.var_name;
            let getter = if pk.is_nullable() {
                format!("return {0} != null ? {0} : 0;", var)
            } else {
                format!("return {};", var)
            };
            let setter = if matches!(pk.java_type.inner_type(), JavaType::Long) {
                format!("this.{} = id;", var)
            } else {
                format!("this.{} = (int) id;", var)
            };
            (pk.column.column_constant(), getter, setter)
        }
        None if plan.is_table() => (
            quote("NO_PRIMARY_KEY"),
            "return 0;".to_string(),
            "// NO_PRIMARY_KEY".to_string(),
        ),
        None => ("null".to_string(), "return 0;".to_string(), String::new()),
    };

    class.add_method(
        JavaMethod::new("String", "getIdColumnName")
            .annotation("@Override")
            .line(format!("return {};", column)),
    );
    class.add_method(
        JavaMethod::new("long", "getPrimaryKeyId")
            .annotation("@Override")
            .line(getter),
    );
    let mut set_id = JavaMethod::new("void", "setPrimaryKeyId")
        .annotation("@Override")
        .param("long", "id");
    if !setter.is_empty() {
        set_id = set_id.line(setter);
    }
    class.add_method(set_id);
}

/// Expression stored into a column-value map
fn write_expression(field: &FieldPlan) -> String {
    let var = &field.var_name;
    let converted = field.marshal.to_db(var);
    if field.is_nullable() && converted != *var && !field.marshal.is_unsupported() {
        format!("{} != null ? ({}) : null", var, converted)
    } else {
        converted
    }
}

/// Expression reading the field back from `DBToolsContentValues values`
fn values_read_expression(field: &FieldPlan) -> String {
    let constant = field.column.column_constant();
    if matches!(field.marshal, Marshal::Bool) {
        return format!("values.getAsBoolean({})", constant);
    }
    let Some(stored) = field.marshal.stored() else {
        return field.marshal.from_db("");
    };

    let raw = format!("values.{}({})", stored.values_getter(), constant);
    let converted = field.marshal.from_db(&raw);
    if converted == raw || !field.is_nullable() {
        converted
    } else {
        format!("{} != null ? {} : null", raw, converted)
    }
}

/// Expression reading the field from `Cursor cursor`
fn cursor_read_expression(field: &FieldPlan) -> String {
    let Some(stored) = field.marshal.stored() else {
        return field.marshal.from_db("");
    };

    let index = format!(
        "cursor.getColumnIndexOrThrow({})",
        field.column.column_constant()
    );
    let raw = format!("cursor.{}({})", stored.cursor_getter(), index);
    let converted = field.marshal.from_db(&raw);
    if field.is_nullable() {
        format!("!cursor.isNull({}) ? {} : null", index, converted)
    } else {
        converted
    }
}

/// Statement binding at a 1-based index
fn bind_lines(field: &FieldPlan, index: usize) -> Vec<String> {
    let Some(stored) = field.marshal.stored() else {
        return vec![field.marshal.to_db(&field.var_name)];
    };

    let call = format!(
        "statement.{}({}, {});",
        stored.bind_method(),
        index,
        field.marshal.to_db(&field.var_name)
    );
    if field.is_nullable() {
        vec![
            format!("if ({} != null) {{", field.var_name),
            format!("    {}", call),
            "} else {".to_string(),
            format!("    statement.bindNull({});", index),
            "}".to_string(),
        ]
    } else {
        vec![call]
    }
}

fn add_marshalling_methods(class: &mut JavaClass, plan: &EntityPlan) {
    let writable: Vec<&FieldPlan> = plan
        .fields
        .iter()
        .filter(|f| !f.column.is_generated_key())
        .collect();

    class.add_method(
        JavaMethod::new("String[]", "getAllColumns")
            .annotation("@Override")
            .line("return ALL_COLUMNS.clone();"),
    );
    class.add_method(
        JavaMethod::new("String[]", "getAllColumnsFull").line("return ALL_COLUMNS_FULL.clone();"),
    );

    class.add_method(
        JavaMethod::new("void", "getContentValues")
            .annotation("@Override")
            .param("DBToolsContentValues", "values")
            .lines(writable.iter().map(|f| {
                format!("values.put({}, {});", f.column.column_constant(), write_expression(f))
            })),
    );

    let mut get_values = JavaMethod::new("Object[]", "getValues")
        .annotation("@Override")
        .line("Object[] values = new Object[]{");
    for field in &plan.fields {
        let value = if field.column.is_generated_key() {
            field.var_name.clone()
        } else {
            write_expression(field)
        };
        get_values = get_values.line(format!("    {},", value));
    }
    class.add_method(get_values.line("};").line("return values;"));

    let mut copy = JavaMethod::new(&plan.class_name, "copy").line(format!(
        "{0} copy = new {0}();",
        plan.class_name
    ));
    for field in &plan.fields {
        copy = copy.line(format!("copy.{}({});", field.setter(), field.var_name));
    }
    class.add_method(copy.line("return copy;"));

    let mut insert = JavaMethod::new("void", "bindInsertStatement")
        .annotation("@Override")
        .param("StatementWrapper", "statement");
    for (i, field) in writable.iter().enumerate() {
        insert = insert.lines(bind_lines(field, i + 1));
    }
    class.add_method(insert);

    let mut update = JavaMethod::new("void", "bindUpdateStatement")
        .annotation("@Override")
        .param("StatementWrapper", "statement");
    for (i, field) in writable.iter().enumerate() {
        update = update.lines(bind_lines(field, i + 1));
    }
    // primary key is the WHERE argument, bound last
    if let Some(pk) = plan.primary_key_field() {
        update = update.lines(bind_lines(pk, writable.len() + 1));
    }
    class.add_method(update);

    class.add_method(
        JavaMethod::new("void", "setContent")
            .param("DBToolsContentValues", "values")
            .lines(
                writable
                    .iter()
                    .map(|f| format!("{} = {};", f.var_name, values_read_expression(f))),
            ),
    );
    class.add_method(
        JavaMethod::new("void", "setContent")
            .annotation("@Override")
            .param("Cursor", "cursor")
            .lines(
                plan.fields
                    .iter()
                    .map(|f| format!("{} = {};", f.var_name, cursor_read_expression(f))),
            ),
    );
}

fn add_references(class: &mut JavaClass, plan: &EntityPlan, config: &CodegenConfig) {
    for reference in &plan.references {
        let mut variable = JavaVariable::new(&reference.class_name, &reference.var_name);
        if config.jsr305_support {
            variable.accessor_annotation = Some("@Nullable".to_string());
        }
        class.add_variable(variable);
    }
}

fn add_collections(class: &mut JavaClass, plan: &EntityPlan) {
    if plan.collections.is_empty() {
        return;
    }
    class.add_import("java.util.Set");
    class.add_import("java.util.HashSet");

    let mut cleanup: Vec<String> = Vec::new();

    for collection in &plan.collections {
        let related = &collection.class_name;
        let set_type = format!("Set<{}>", related);
        let new_set = format!("new HashSet<{}>()", related);

        class.add_variable(
            JavaVariable::new(&set_type, &collection.items)
                .with_default(&new_set)
                .without_accessors(),
        );
        class.add_variable(
            JavaVariable::new(&set_type, &collection.items_to_delete)
                .with_default(&new_set)
                .without_accessors(),
        );

        class.add_method(JavaMethod::new(&set_type, collection.items_getter()).line(format!(
            "return java.util.Collections.unmodifiableSet({});",
            collection.items
        )));
        class.add_method(records::add_related_method(plan, collection));
        class.add_method(records::delete_related_method(collection, "getPrimaryKeyId"));

        cleanup.extend([
            format!("for ({} itemToDelete : {}) {{", related, collection.items_to_delete),
            "    try {".to_string(),
            format!("        itemToDelete.{}(null);", collection.back_reference_setter()),
            "    } catch(RuntimeException e) {// do nothing... it is ok if it does not exist".to_string(),
            "    }".to_string(),
            "}".to_string(),
            format!("{}.clear();", collection.items_to_delete),
        ]);
    }

    class.add_method(
        JavaMethod::new("void", "cleanupOrphans")
            .access(Access::Protected)
            .lines(cleanup),
    );
}

pub(super) fn sqlite_imports(class: &mut JavaClass, config: &CodegenConfig) {
    if config.encryption_support {
        class.add_import("org.dbtools.android.domain.secure.AndroidBaseManager");
        class.add_import("net.sqlcipher.database.SQLiteDatabase");
    } else {
        class.add_import("org.dbtools.android.domain.AndroidBaseManager");
        class.add_import("android.database.sqlite.SQLiteDatabase");
    }
}

/// Abstract `<Class>BaseManager`, regenerated on every run
pub fn render_base_manager(plan: &EntityPlan, config: &CodegenConfig) -> JavaClass {
    let class_name = plan.base_manager_name();
    debug!("Rendering Android base manager {}", class_name);

    let mut class = JavaClass::new(&plan.package, &class_name);
    class.kind = ClassKind::AbstractClass;
    class.file_header = Some(generated_file_header(&class_name));
    class.add_annotation("@SuppressWarnings(\"all\")");
    sqlite_imports(&mut class, config);

    if config.injection_support {
        add_injected_manager_methods(&mut class, plan, config);
    } else {
        add_static_manager_methods(&mut class, plan);
    }

    class
}

fn add_injected_manager_methods(class: &mut JavaClass, plan: &EntityPlan, config: &CodegenConfig) {
    let record = &plan.class_name;
    let base = plan.base_record_name();
    let jsr305 = config.jsr305_support;
    if jsr305 {
        class.add_import("javax.annotation.Nonnull");
    }

    let db_manager_package =
        naming::database_manager_package(&plan.package, config.include_database_name_in_package);
    class.add_import(format!("{}.DatabaseManager", db_manager_package));
    class.extends = Some(format!("AndroidBaseManager<{}>", record));

    class.add_variable(
        JavaVariable::new("DatabaseManager", "databaseManager")
            .with_annotation("@javax.inject.Inject")
            .without_accessors()
            .with_access(Access::PackagePrivate),
    );

    let nonnull = |method: JavaMethod| method.annotation_if(jsr305, "@Nonnull");
    let mut name_param = JavaParam::new("String", "databaseName");
    if jsr305 {
        name_param.annotations.push("@Nonnull".to_string());
    }

    class.add_method(nonnull(
        JavaMethod::new("String", "getDatabaseName").line(format!("return {}.DATABASE;", base)),
    ));
    class.add_method(nonnull(
        JavaMethod::new(record, "newRecord").line(format!("return new {}();", record)),
    ));
    if !plan.is_query() {
        class.add_method(nonnull(
            JavaMethod::new("String", "getTableName").line(format!("return {}.TABLE;", base)),
        ));
    }
    class.add_method(nonnull(
        JavaMethod::new("String[]", "getAllColumns").line(format!("return {}.ALL_COLUMNS;", base)),
    ));

    for kind in ["Readable", "Writable"] {
        let method = format!("get{}Database", kind);
        class.add_method(nonnull(
            JavaMethod::new("SQLiteDatabase", &method)
                .param_with(name_param.clone())
                .line(format!("return databaseManager.{}(databaseName);", method)),
        ));
        class.add_method(nonnull(
            JavaMethod::new("SQLiteDatabase", &method)
                .line(format!("return databaseManager.{}(getDatabaseName());", method)),
        ));
    }

    class.add_method(nonnull(
        JavaMethod::new("org.dbtools.android.domain.AndroidDatabase", "getAndroidDatabase")
            .param_with(name_param.clone())
            .line("return databaseManager.getDatabase(databaseName);"),
    ));

    let sql_methods: [(&str, String); 5] = if plan.is_table() {
        let primary_key = if plan.primary_key_column().is_some() {
            format!("{}.PRIMARY_KEY_COLUMN", base)
        } else {
            quote("NO_PRIMARY_KEY")
        };
        [
            ("getPrimaryKey", primary_key),
            ("getDropSql", format!("{}.DROP_TABLE", base)),
            ("getCreateSql", format!("{}.CREATE_TABLE", base)),
            ("getInsertSql", format!("{}.INSERT_STATEMENT", base)),
            ("getUpdateSql", format!("{}.UPDATE_STATEMENT", base)),
        ]
    } else if plan.is_view() {
        [
            ("getPrimaryKey", "null".to_string()),
            ("getDropSql", format!("{}.DROP_VIEW", record)),
            ("getCreateSql", format!("{}.CREATE_VIEW", record)),
            ("getInsertSql", quote("")),
            ("getUpdateSql", quote("")),
        ]
    } else {
        [
            ("getPrimaryKey", "null".to_string()),
            ("getDropSql", quote("")),
            ("getCreateSql", quote("")),
            ("getInsertSql", quote("")),
            ("getUpdateSql", quote("")),
        ]
    };

    if plan.is_query() {
        class.add_method(JavaMethod::new("String", "getQuery").abstract_method());
        class.add_method(nonnull(
            JavaMethod::new("String", "getTableName").line("return getQuery();"),
        ));
    }

    for (name, value) in sql_methods {
        let method = JavaMethod::new("String", name).line(format!("return {};", value));
        class.add_method(if value == "null" { method } else { nonnull(method) });
    }

    if !plan.is_table() {
        let mut record_param = JavaParam::new(record, "e");
        if jsr305 {
            record_param.annotations.push("@Nonnull".to_string());
        }
        class.add_method(
            JavaMethod::new("boolean", "save")
                .annotation("@Override")
                .param_with(name_param)
                .param_with(record_param)
                .line(format!(
                    "throw new IllegalStateException(\"Cannot call SAVE on a {} View or Query\");",
                    record
                )),
        );
    }
}

fn add_static_manager_methods(class: &mut JavaClass, plan: &EntityPlan) {
    let record = &plan.class_name;
    let base = plan.base_record_name();
    class.add_import(CURSOR);
    class.add_import("android.content.ContentValues");
    class.add_import("java.util.List");
    class.add_import("java.util.ArrayList");

    let table = if plan.is_query() {
        format!("{}.QUERY", record)
    } else {
        format!("{}.TABLE", base)
    };
    let pk_column = if plan.primary_key_column().is_some() {
        format!("{}.PRIMARY_KEY_COLUMN", base)
    } else {
        quote("NO_PRIMARY_KEY")
    };
    if plan.is_table() {
        for (return_type, name) in [("boolean", "save"), ("long", "insert"), ("int", "update"), ("long", "delete")] {
            class.add_method(
                static_method(return_type, name)
                    .param(record, "record")
                    .line(format!("return AndroidBaseManager.{}(db, record);", name)),
            );
        }
        class.add_method(
            static_method("int", "update")
                .param("ContentValues", "values")
                .param("long", "rowId")
                .line(format!(
                    "return AndroidBaseManager.update(db, {}, values, {}, rowId);",
                    table, pk_column
                )),
        );
        class.add_method(
            static_method("int", "update")
                .param("ContentValues", "values")
                .param("String", "where")
                .param("String[]", "whereArgs")
                .line(format!(
                    "return AndroidBaseManager.update(db, {}, values, where, whereArgs);",
                    table
                )),
        );
        class.add_method(
            static_method("long", "delete")
                .param("long", "rowId")
                .line(format!(
                    "return AndroidBaseManager.delete(db, {}, {}, rowId);",
                    table, pk_column
                )),
        );
        class.add_method(
            static_method("long", "delete")
                .param("String", "where")
                .param("String[]", "whereArgs")
                .line(format!(
                    "return AndroidBaseManager.delete(db, {}, where, whereArgs);",
                    table
                )),
        );
        class.add_method(
            static_method("Cursor", "findCursorByRowId")
                .param("long", "rowId")
                .line(format!(
                    "return AndroidBaseManager.findCursorByRowId(db, {}, {}.ALL_COLUMNS, {}, rowId);",
                    table, base, pk_column
                )),
        );
        class.add_method(
            static_method(record, "findByRowId")
                .param("long", "rowId")
                .lines(first_record_lines(record, "findCursorByRowId(db, rowId)")),
        );
    }

    let (drop, create) = if plan.is_table() {
        (format!("{}.DROP_TABLE", base), format!("{}.CREATE_TABLE", base))
    } else {
        (format!("{}.DROP_VIEW", record), format!("{}.CREATE_VIEW", record))
    };
    if !plan.is_query() {
        class.add_method(
            static_method("void", "dropSql")
                .line(format!("AndroidBaseManager.executeSql(db, {});", drop)),
        );
        class.add_method(
            static_method("void", "createSql")
                .line(format!("AndroidBaseManager.executeSql(db, {});", create)),
        );
    }

    class.add_method(
        static_method("Cursor", "findCursorBySelection")
            .param("String", "selection")
            .param("String", "orderBy")
            .lines([
                format!(
                    "Cursor cursor = db.query(true, {}, {}.ALL_COLUMNS, selection, null, null, null, orderBy, null);",
                    table, base
                ),
                "if (cursor != null) {".to_string(),
                "    if (cursor.moveToFirst()) {".to_string(),
                "        return cursor;".to_string(),
                "    }".to_string(),
                "    cursor.close();".to_string(),
                "}".to_string(),
                "return null;".to_string(),
            ]),
    );
    class.add_method(
        static_method(record, "findBySelection")
            .param("String", "selection")
            .param("String", "orderBy")
            .lines(first_record_lines(
                record,
                "findCursorBySelection(db, selection, orderBy)",
            )),
    );
    class.add_method(
        static_method(record, "findBySelection")
            .param("String", "selection")
            .line("return findBySelection(db, selection, null);"),
    );
    class.add_method(
        static_method(&format!("List<{}>", record), "findAllBySelection")
            .param("String", "selection")
            .param("String", "orderBy")
            .lines([
                format!("List<{0}> foundItems = new ArrayList<{0}>();", record),
                String::new(),
                "Cursor cursor = findCursorBySelection(db, selection, orderBy);".to_string(),
                "if (cursor != null) {".to_string(),
                "    do {".to_string(),
                format!("        foundItems.add(new {}(cursor));", record),
                "    } while (cursor.moveToNext());".to_string(),
                "    cursor.close();".to_string(),
                "}".to_string(),
                String::new(),
                "return foundItems;".to_string(),
            ]),
    );
    class.add_method(
        static_method(&format!("List<{}>", record), "findAllBySelection")
            .param("String", "selection")
            .line("return findAllBySelection(db, selection, null);"),
    );
    class.add_method(
        static_method("long", "findCount")
            .param("String", "selection")
            .lines([
                "long count = 0;".to_string(),
                format!(
                    "Cursor cursor = db.query({}, new String[]{{\"count(1)\"}}, selection, null, null, null, null);",
                    table
                ),
                "if (cursor != null) {".to_string(),
                "    if (cursor.moveToFirst()) {".to_string(),
                "        count = cursor.getLong(0);".to_string(),
                "    }".to_string(),
                "    cursor.close();".to_string(),
                "}".to_string(),
                "return count;".to_string(),
            ]),
    );
}

fn static_method(return_type: &str, name: &str) -> JavaMethod {
    JavaMethod::new(return_type, name)
        .static_if(true)
        .param("SQLiteDatabase", "db")
}

fn first_record_lines(record: &str, cursor_call: &str) -> Vec<String> {
    vec![
        format!("Cursor cursor = {};", cursor_call),
        "if (cursor != null) {".to_string(),
        format!("    {} record = null;", record),
        "    if (cursor.moveToFirst()) {".to_string(),
        format!("        record = new {}(cursor);", record),
        "    }".to_string(),
        "    cursor.close();".to_string(),
        "    return record;".to_string(),
        "}".to_string(),
        "return null;".to_string(),
    ]
}

/// `<Class>` scaffold extending the base record; written once
pub fn render_user_record(plan: &EntityPlan, config: &CodegenConfig, created: &str) -> JavaClass {
    let record = &plan.class_name;
    let base = plan.base_record_name();
    debug!("Rendering Android record {}", record);

    let mut class = JavaClass::new(&plan.package, record);
    class.file_header = Some(user_file_header(record, created));
    class.extends = Some(base.clone());
    class.add_import(CURSOR);
    class.add_import(CONTENT_VALUES);

    if plan.is_view() {
        class.class_header = Some(
            "// todo Replace the following the CREATE_VIEW sql (The following is a template)"
                .to_string(),
        );
        class.add_constant(
            "String",
            "DROP_VIEW",
            format!("\"DROP VIEW IF EXISTS \" + {}.TABLE + \";\"", base),
        );
        let select = select_template(plan, config, &format!("{}.TABLE", base), true);
        class.add_constant(
            "String",
            "CREATE_VIEW",
            format!("\"CREATE VIEW IF NOT EXISTS \" + {}.TABLE + \" AS \" + {}", base, select),
        );
        if config.sql_query_builder_support {
            class.add_import(QUERY_BUILDER);
        }
    } else if plan.is_query() {
        class.class_header = Some(
            "// todo Replace the following the QUERY sql (The following is a template)".to_string(),
        );
        let select = select_template(plan, config, &quote(QUERY_TABLES_TEMPLATE), false);
        class.add_constant("String", "QUERY", format!("\"(\" + {} + \")\"", select));
        class.add_constant("String", "QUERY_RAW", "\"SELECT * FROM \" + QUERY");
        if config.sql_query_builder_support {
            class.add_import(QUERY_BUILDER);
        }
    }

    class.add_constructor(JavaMethod::constructor(record));
    class.add_constructor(
        JavaMethod::constructor(record)
            .param("Cursor", "cursor")
            .line("setContent(cursor);"),
    );
    class.add_constructor(
        JavaMethod::constructor(record)
            .param("DBToolsContentValues", "values")
            .line("setContent(values);"),
    );

    class
}

/// SELECT template over the entity columns, by concatenation or SQLQueryBuilder
///
/// `from` is a Java expression; when `from_is_table` is false it is the
/// literal FROM clause placeholder.
fn select_template(plan: &EntityPlan, config: &CodegenConfig, from: &str, from_is_table: bool) -> String {
    let base = plan.base_record_name();

    if config.sql_query_builder_support {
        let mut builder = "new SQLQueryBuilder()".to_string();
        for column in &plan.columns {
            builder.push_str(&format!(
                ".field({0}.{1}, {0}.{2})",
                base,
                column.full_column_constant(),
                column.column_constant()
            ));
        }
        builder.push_str(&format!(".table({}).buildQuery()", from));
        return builder;
    }

    let fields: Vec<String> = plan
        .columns
        .iter()
        .map(|c| {
            format!(
                "{0}.{1} + \" AS \" + {0}.{2}",
                base,
                c.full_column_constant(),
                c.column_constant()
            )
        })
        .collect();
    let from_clause = if from_is_table {
        format!("\" FROM \" + {}", from)
    } else {
        format!("\" \" + {}", from)
    };
    format!(
        "\"SELECT \" + {} + {}",
        fields.join(" + \", \" + "),
        from_clause
    )
}

/// `<Class>Manager` scaffold extending the base manager; written once
pub fn render_user_manager(plan: &EntityPlan, config: &CodegenConfig, created: &str) -> JavaClass {
    let name = plan.manager_name();
    debug!("Rendering Android manager {}", name);

    let mut class = JavaClass::new(&plan.package, &name);
    class.file_header = Some(user_file_header(&name, created));
    class.extends = Some(plan.base_manager_name());

    if config.injection_support {
        class.add_annotation("@javax.inject.Singleton");
        class.add_constructor(JavaMethod::constructor(&name).annotation("@javax.inject.Inject"));

        if plan.is_query() {
            class.add_method(
                JavaMethod::new("String", "getQuery")
                    .annotation("@Override")
                    .line(format!("return {}.QUERY;", plan.class_name)),
            );
        }
    }

    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::entity::{plan_entity, PlanContext};
    use crate::schema::{
        EntityKind, EnumSource, FetchType, FieldEnumeration, FieldType, ForeignKey,
        ForeignKeyType, SchemaDatabase, SchemaEntity, SchemaField, TableDetails,
    };

    fn make_field(name: &str, data_type: FieldType, not_null: bool) -> SchemaField {
        let mut field = SchemaField::new(name, data_type);
        field.not_null = not_null;
        field
    }

    fn make_entity(name: &str, kind: EntityKind, fields: Vec<SchemaField>) -> SchemaEntity {
        SchemaEntity {
            name: name.to_string(),
            class_name: naming::to_class_name(name),
            kind,
            fields,
            readonly: false,
        }
    }

    fn make_person() -> SchemaEntity {
        let mut id = make_field("_id", FieldType::Integer, true);
        id.primary_key = true;
        id.increment = true;
        id.var_name = Some("id".to_string());
        let name = make_field("NAME", FieldType::Varchar, true);
        let mut status = make_field("STATUS", FieldType::Integer, true);
        status.enumeration = Some(FieldEnumeration {
            source: EnumSource::Local(vec!["ACTIVE".to_string(), "INACTIVE".to_string()]),
            default: Some("ACTIVE".to_string()),
        });
        let birth = make_field("BIRTH_DATE", FieldType::Timestamp, false);
        let enabled = make_field("ENABLED", FieldType::Boolean, false);
        make_entity(
            "PERSON",
            EntityKind::Table(TableDetails::default()),
            vec![id, name, status, birth, enabled],
        )
    }

    fn make_phone() -> SchemaEntity {
        let mut person = make_field("PERSON_ID", FieldType::Integer, true);
        person.foreign_key = Some(ForeignKey {
            table: "PERSON".to_string(),
            field: "_id".to_string(),
            kind: ForeignKeyType::OneToMany,
            fetch: FetchType::Lazy,
            cascade: "ALL".to_string(),
            order_by_column: None,
        });
        make_entity(
            "PHONE",
            EntityKind::Table(TableDetails::default()),
            vec![make_field("NUMBER", FieldType::Varchar, true), person],
        )
    }

    fn make_database(tables: Vec<SchemaEntity>, views: Vec<SchemaEntity>) -> SchemaDatabase {
        SchemaDatabase {
            name: "main".to_string(),
            tables,
            views,
            queries: vec![],
            post_sql_scripts: vec![],
        }
    }

    fn make_config() -> CodegenConfig {
        CodegenConfig {
            base_package: "org.example".to_string(),
            ..Default::default()
        }
    }

    fn render_person(config: &CodegenConfig) -> String {
        let db = make_database(vec![make_person(), make_phone()], vec![]);
        let entity = &db.tables[0];
        let ctx = PlanContext::new(config, &db, entity);
        let plan = plan_entity(entity, &ctx).unwrap();
        render_base_record(&plan, config).unwrap().render()
    }

    #[test]
    fn test_base_record_constants() {
        let text = render_person(&make_config());
        assert!(text.contains("public abstract class PersonBaseRecord extends AndroidBaseRecord {"));
        assert!(text.contains("public static final String TABLE = \"PERSON\";"));
        assert!(text.contains("public static final String PRIMARY_KEY_COLUMN = \"_id\";"));
        assert!(text.contains("public static final String C_ID = \"_id\";"));
        assert!(text.contains("public static final String FULL_C_NAME = \"PERSON.NAME\";"));
        assert!(text.contains(
            "public static final String INSERT_STATEMENT = \"INSERT INTO PERSON (NAME,STATUS,BIRTH_DATE,ENABLED) VALUES (?,?,?,?)\";"
        ));
        assert!(text.contains("WHERE _id = ?\";"));
        assert!(text.contains(
            "public static final String[] ALL_COLUMNS = new String[] {C_ID, C_NAME, C_STATUS, C_BIRTH_DATE, C_ENABLED};"
        ));
        assert!(text.contains("GENERATED FILE - DO NOT EDIT"));
    }

    #[test]
    fn test_base_record_enum_field() {
        let text = render_person(&make_config());
        assert!(text.contains("public enum Status {ACTIVE, INACTIVE}"));
        assert!(text.contains("private Status status = Status.ACTIVE;"));
        assert!(text.contains("public Status getStatus() {"));
        assert!(text.contains("values.put(C_STATUS, status.ordinal());"));
        assert!(text.contains(
            "status = org.dbtools.android.domain.util.EnumUtil.ordinalToEnum(Status.class, cursor.getInt(cursor.getColumnIndexOrThrow(C_STATUS)), Status.ACTIVE);"
        ));
    }

    #[test]
    fn test_nullable_marshalling_null_checks_both_ways() {
        let text = render_person(&make_config());
        assert!(text.contains(
            "values.put(C_BIRTH_DATE, birthDate != null ? (birthDate.getTime()) : null);"
        ));
        assert!(text.contains(
            "birthDate = !cursor.isNull(cursor.getColumnIndexOrThrow(C_BIRTH_DATE)) ? new java.util.Date(cursor.getLong(cursor.getColumnIndexOrThrow(C_BIRTH_DATE))) : null;"
        ));
        assert!(text.contains("values.put(C_ENABLED, enabled != null ? (enabled ? 1 : 0) : null);"));
        assert!(text.contains("if (enabled != null) {"));
        assert!(text.contains("statement.bindNull(4);"));
        // non-null fields are bound and read directly
        assert!(text.contains("statement.bindString(1, name);"));
        assert!(text.contains("name = cursor.getString(cursor.getColumnIndexOrThrow(C_NAME));"));
    }

    #[test]
    fn test_primary_key_bound_last_in_update() {
        let text = render_person(&make_config());
        assert!(text.contains("statement.bindLong(5, id);"));
        assert!(text.contains("this.id = (int) id;"));
        assert!(text.contains("return C_ID;"));
    }

    #[test]
    fn test_incoming_collection_methods() {
        let text = render_person(&make_config());
        assert!(text.contains("private Set<Phone> phoneItems = new HashSet<Phone>();"));
        assert!(text.contains("return java.util.Collections.unmodifiableSet(phoneItems);"));
        assert!(text.contains("public void addPhone(Phone phone) {"));
        assert!(text.contains("phone.setPerson((Person) this);"));
        assert!(text.contains("if (!phoneItems.remove(phone)) {"));
        assert!(text.contains("phoneItemsToDelete.add(phone);"));
        assert!(text.contains("throw new IllegalStateException(\"deleteItem failed: Cannot find itemId \"+ phone.getPrimaryKeyId());"));
        assert!(text.contains("protected void cleanupOrphans() {"));
        assert!(text.contains("import org.example.main.phone.*;"));
    }

    #[test]
    fn test_jsr305_annotations() {
        let text = render_person(&make_config());
        assert!(text.contains("    @Nonnull\n    public String getName() {"));
        assert!(text.contains("    @Nullable\n    public java.util.Date getBirthDate() {"));

        let config = CodegenConfig {
            jsr305_support: false,
            ..make_config()
        };
        let text = render_person(&config);
        assert!(!text.contains("@Nonnull"));
        assert!(!text.contains("import javax.annotation"));
    }

    #[test]
    fn test_static_base_manager() {
        let config = make_config();
        let db = make_database(vec![make_person()], vec![]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();
        let text = render_base_manager(&plan, &config).render();

        assert!(text.contains("import android.database.sqlite.SQLiteDatabase;"));
        assert!(text.contains("public static long insert(SQLiteDatabase db, Person record) {"));
        assert!(text.contains("AndroidBaseManager.executeSql(db, PersonBaseRecord.CREATE_TABLE);"));
        assert!(text.contains("public static List<Person> findAllBySelection(SQLiteDatabase db, String selection) {"));
        assert!(text.contains("db.query(true, PersonBaseRecord.TABLE, PersonBaseRecord.ALL_COLUMNS, selection, null, null, null, orderBy, null);"));
    }

    #[test]
    fn test_injected_base_manager_with_encryption() {
        let config = CodegenConfig {
            injection_support: true,
            encryption_support: true,
            ..make_config()
        };
        let db = make_database(vec![make_person()], vec![]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();
        let text = render_base_manager(&plan, &config).render();

        assert!(text.contains("import org.dbtools.android.domain.secure.AndroidBaseManager;"));
        assert!(text.contains("import net.sqlcipher.database.SQLiteDatabase;"));
        assert!(text.contains("import org.example.DatabaseManager;"));
        assert!(text.contains("extends AndroidBaseManager<Person>"));
        assert!(text.contains("    @javax.inject.Inject\n    DatabaseManager databaseManager;"));
        assert!(text.contains("return PersonBaseRecord.PRIMARY_KEY_COLUMN;"));
        assert!(text.contains("public SQLiteDatabase getWritableDatabase(@Nonnull String databaseName) {"));
    }

    #[test]
    fn test_view_scaffolds() {
        let config = CodegenConfig {
            injection_support: true,
            ..make_config()
        };
        let view = make_entity(
            "PERSON_VIEW",
            EntityKind::View,
            vec![make_field("NAME", FieldType::Varchar, true)],
        );
        let db = make_database(vec![], vec![view]);
        let entity = &db.views[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let record = render_user_record(&plan, &config, "now").render();
        assert!(record.contains("public class PersonView extends PersonViewBaseRecord {"));
        assert!(record.contains(
            "public static final String CREATE_VIEW = \"CREATE VIEW IF NOT EXISTS \" + PersonViewBaseRecord.TABLE + \" AS \" + \"SELECT \" + PersonViewBaseRecord.FULL_C_NAME + \" AS \" + PersonViewBaseRecord.C_NAME + \" FROM \" + PersonViewBaseRecord.TABLE;"
        ));
        assert!(record.contains("public PersonView(Cursor cursor) {"));

        let manager = render_base_manager(&plan, &config).render();
        assert!(manager.contains("throw new IllegalStateException(\"Cannot call SAVE on a PersonView View or Query\");"));
        assert!(manager.contains("return PersonView.DROP_VIEW;"));

        let builder_config = CodegenConfig {
            sql_query_builder_support: true,
            ..config.clone()
        };
        let record = render_user_record(&plan, &builder_config, "now").render();
        assert!(record.contains("import org.dbtools.query.sql.SQLQueryBuilder;"));
        assert!(record.contains(
            "new SQLQueryBuilder().field(PersonViewBaseRecord.FULL_C_NAME, PersonViewBaseRecord.C_NAME).table(PersonViewBaseRecord.TABLE).buildQuery()"
        ));
    }

    #[test]
    fn test_query_scaffolds() {
        let config = CodegenConfig {
            injection_support: true,
            ..make_config()
        };
        let query = make_entity(
            "ACTIVE_PEOPLE",
            EntityKind::Query,
            vec![make_field("NAME", FieldType::Varchar, true)],
        );
        let mut db = make_database(vec![], vec![]);
        db.queries.push(query);
        let entity = &db.queries[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let base = render_base_record(&plan, &config).unwrap().render();
        assert!(!base.contains("String TABLE ="));

        let record = render_user_record(&plan, &config, "now").render();
        assert!(record.contains("+ \" \" + \"FROM SOME TABLE(S)\" + \")\";"));
        assert!(record.contains("public static final String QUERY_RAW = \"SELECT * FROM \" + QUERY;"));

        let base_manager = render_base_manager(&plan, &config).render();
        assert!(base_manager.contains("public abstract String getQuery();"));
        assert!(base_manager.contains("return getQuery();"));

        let manager = render_user_manager(&plan, &config, "now").render();
        assert!(manager.contains("@javax.inject.Singleton"));
        assert!(manager.contains("return ActivePeople.QUERY;"));
    }

    #[test]
    fn test_user_record_constructors() {
        let config = make_config();
        let db = make_database(vec![make_person()], vec![]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();
        let text = render_user_record(&plan, &config, "10/18/2026").render();

        assert!(text.contains(" * Created: 10/18/2026"));
        assert!(text.contains("public class Person extends PersonBaseRecord {"));
        assert!(text.contains("    public Person(DBToolsContentValues values) {\n        setContent(values);\n    }"));
    }
}
