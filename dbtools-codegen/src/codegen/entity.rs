//! Entity planning: one classification pass over the fields and one
//! relationship pass over the database, shared by both platform renderers

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::codegen::naming;
use crate::codegen::type_resolver::{JavaType, Marshal, TypeResolver};
use crate::config::CodegenConfig;
use crate::error::{CodegenError, Result};
use crate::schema::{EnumSource, ForeignKeyType, SchemaDatabase, SchemaEntity, SchemaField};

/// Inputs shared by every class rendered for one entity
pub struct PlanContext<'a> {
    pub config: &'a CodegenConfig,
    pub database: &'a SchemaDatabase,
    /// Package of the entity being rendered
    pub package: String,
}

impl<'a> PlanContext<'a> {
    pub fn new(config: &'a CodegenConfig, database: &'a SchemaDatabase, entity: &SchemaEntity) -> Self {
        let package = naming::entity_package(
            &config.base_package,
            &database.name,
            &entity.class_name,
            config.include_database_name_in_package,
        );
        Self {
            config,
            database,
            package,
        }
    }

    /// Class name of a table in this database; falls back to the converted name
    pub fn class_name_of(&self, table_name: &str) -> String {
        self.database
            .find_table(table_name)
            .map(|t| t.class_name.clone())
            .unwrap_or_else(|| naming::to_class_name(table_name))
    }

    /// Package holding the classes of another entity
    pub fn package_of(&self, class_name: &str) -> String {
        naming::sibling_package(&self.package, class_name)
    }
}

/// Column constants for one field
#[derive(Debug, Clone)]
pub struct ColumnPlan {
    /// Suffix of `C_`, `FULL_C_` and `P_` constants
    pub constant: String,
    pub column: String,
    /// `table.column`
    pub full_column: String,
    pub var_name: String,
    pub primary_key: bool,
    pub increment: bool,
}

impl ColumnPlan {
    pub fn column_constant(&self) -> String {
        format!("C_{}", self.constant)
    }

    pub fn full_column_constant(&self) -> String {
        format!("FULL_C_{}", self.constant)
    }

    /// Auto-increment primary keys are left out of INSERT/UPDATE column lists
    pub fn is_generated_key(&self) -> bool {
        self.primary_key && self.increment
    }
}

/// Enum typing of an enumerated numeric field
#[derive(Debug, Clone)]
pub struct EnumPlan {
    pub enum_class: String,
    /// Members of an inner enum declared on the record
    pub inner_values: Option<Vec<String>>,
    /// Import of an enumeration table class
    pub import: Option<String>,
}

/// A scalar or enum-typed field of the record
#[derive(Debug, Clone)]
pub struct FieldPlan<'a> {
    pub field: &'a SchemaField,
    pub column: ColumnPlan,
    pub var_name: String,
    pub java_type: JavaType,
    pub marshal: Marshal,
    /// Java initializer expression
    pub default_value: Option<String>,
    pub enumeration: Option<EnumPlan>,
}

impl FieldPlan<'_> {
    pub fn not_null(&self) -> bool {
        self.field.not_null
    }

    pub fn type_string(&self) -> String {
        self.java_type.to_type_string()
    }

    pub fn is_primary_key(&self) -> bool {
        self.field.primary_key
    }

    /// Whether values of this field can be null in Java
    pub fn is_nullable(&self) -> bool {
        self.java_type.is_nullable()
    }

    pub fn getter(&self) -> String {
        naming::getter_name(&self.type_string(), &self.var_name)
    }

    pub fn setter(&self) -> String {
        naming::setter_name(&self.var_name)
    }
}

/// Object reference created from an outgoing relationship field
#[derive(Debug, Clone)]
pub struct ReferencePlan<'a> {
    pub field: &'a SchemaField,
    pub kind: ForeignKeyType,
    pub class_name: String,
    pub var_name: String,
    /// Wildcard import of the target package
    pub import: String,
}

/// Collection created on this entity for another table's ONE_TO_MANY field
#[derive(Debug, Clone)]
pub struct CollectionPlan<'a> {
    pub fk_field: &'a SchemaField,
    pub class_name: String,
    pub list_var: String,
    pub items: String,
    pub items_to_delete: String,
    /// Name of the reference back to this entity on the related class
    pub mapped_by: String,
    pub import: String,
}

impl CollectionPlan<'_> {
    pub fn back_reference_setter(&self) -> String {
        naming::setter_name(&self.mapped_by)
    }

    pub fn items_getter(&self) -> String {
        format!("get{}", naming::capitalize(&self.items))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    Table,
    View,
    Query,
}

/// Everything the platform renderers need to know about one entity
#[derive(Debug, Clone)]
pub struct EntityPlan<'a> {
    pub entity: &'a SchemaEntity,
    pub database_name: String,
    pub category: EntityCategory,
    pub package: String,
    pub class_name: String,
    /// Column constants for every field, relationship fields included
    pub columns: Vec<ColumnPlan>,
    /// Scalar and enum fields in declaration order
    pub fields: Vec<FieldPlan<'a>>,
    pub references: Vec<ReferencePlan<'a>>,
    pub collections: Vec<CollectionPlan<'a>>,
    /// Index into `fields` of the primary key
    pub primary_key: Option<usize>,
    pub imports: BTreeSet<String>,
}

impl<'a> EntityPlan<'a> {
    pub fn base_record_name(&self) -> String {
        if self.entity.is_enumeration_table() {
            self.class_name.clone()
        } else {
            format!("{}BaseRecord", self.class_name)
        }
    }

    pub fn base_manager_name(&self) -> String {
        format!("{}BaseManager", self.class_name)
    }

    pub fn manager_name(&self) -> String {
        format!("{}Manager", self.class_name)
    }

    pub fn primary_key_field(&self) -> Option<&FieldPlan<'a>> {
        self.primary_key.map(|i| &self.fields[i])
    }

    pub fn primary_key_column(&self) -> Option<&ColumnPlan> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn is_table(&self) -> bool {
        self.category == EntityCategory::Table
    }

    pub fn is_view(&self) -> bool {
        self.category == EntityCategory::View
    }

    pub fn is_query(&self) -> bool {
        self.category == EntityCategory::Query
    }
}

/// Run the classification and relationship passes for an entity
pub fn plan_entity<'a>(entity: &'a SchemaEntity, ctx: &PlanContext<'a>) -> Result<EntityPlan<'a>> {
    debug!("Planning {} {}", entity.kind_label(), entity.name);

    // fails on the second primary key before anything is classified
    entity.primary_key()?;

    let category = if entity.is_table() {
        EntityCategory::Table
    } else if entity.is_view() {
        EntityCategory::View
    } else {
        EntityCategory::Query
    };

    let mut plan = EntityPlan {
        entity,
        database_name: ctx.database.name.clone(),
        category,
        package: ctx.package.clone(),
        class_name: entity.class_name.clone(),
        columns: Vec::with_capacity(entity.fields.len()),
        fields: Vec::with_capacity(entity.fields.len()),
        references: Vec::new(),
        collections: Vec::new(),
        primary_key: None,
        imports: BTreeSet::new(),
    };

    classify_fields(entity, ctx, &mut plan)?;
    if entity.is_table() {
        expand_incoming(entity, ctx, &mut plan);
    }

    Ok(plan)
}

fn classify_fields<'a>(
    entity: &'a SchemaEntity,
    ctx: &PlanContext<'a>,
    plan: &mut EntityPlan<'a>,
) -> Result<()> {
    for field in &entity.fields {
        let var_name = field.java_name();
        let column = ColumnPlan {
            constant: naming::to_constant_name(&var_name),
            column: field.name.clone(),
            full_column: format!("{}.{}", entity.name, field.name),
            var_name: var_name.clone(),
            primary_key: field.primary_key,
            increment: field.increment,
        };
        plan.columns.push(column.clone());

        if field.is_relationship() {
            let reference = plan_reference(field, ctx);
            plan.imports.insert(reference.import.clone());
            plan.references.push(reference);
            continue;
        }

        let field_plan = match &field.enumeration {
            Some(_) if field.data_type.is_number() => plan_enum_field(field, column, var_name, ctx),
            _ => plan_scalar_field(entity, field, column, var_name, ctx)?,
        };

        if let Some(import) = field_plan.enumeration.as_ref().and_then(|e| e.import.clone()) {
            plan.imports.insert(import);
        }
        if field.primary_key {
            plan.primary_key = Some(plan.fields.len());
        }
        plan.fields.push(field_plan);
    }

    Ok(())
}

fn plan_reference<'a>(field: &'a SchemaField, ctx: &PlanContext<'a>) -> ReferencePlan<'a> {
    let target = field.foreign_key_table().unwrap_or_default();
    let class_name = ctx.class_name_of(target);
    let var_name = match &field.var_name {
        Some(var) if !var.is_empty() => var.clone(),
        _ => naming::decapitalize(&class_name),
    };

    ReferencePlan {
        field,
        kind: field.foreign_key_type(),
        import: format!("{}.*", ctx.package_of(&class_name)),
        class_name,
        var_name,
    }
}

fn plan_enum_field<'a>(
    field: &'a SchemaField,
    column: ColumnPlan,
    var_name: String,
    ctx: &PlanContext<'a>,
) -> FieldPlan<'a> {
    let enumeration = field.enumeration.as_ref();
    let default_member = enumeration.and_then(|e| e.default.clone());

    let (enum_class, inner_values, import) = match enumeration.map(|e| &e.source) {
        Some(EnumSource::Table(table)) => {
            let class_name = ctx.class_name_of(table);
            let import = format!("{}.{}", ctx.package_of(&class_name), class_name);
            (class_name, None, Some(import))
        }
        Some(EnumSource::Class(class_name)) => (class_name.clone(), None, None),
        Some(EnumSource::Local(values)) => {
            (naming::capitalize(&var_name), Some(values.clone()), None)
        }
        None => (naming::capitalize(&var_name), None, None),
    };

    let base_type = JavaType::Enum(enum_class.clone());
    let java_type = if field.not_null {
        base_type
    } else {
        JavaType::Nullable(Box::new(base_type))
    };

    let default_value = match &default_member {
        Some(member) => Some(format!("{}.{}", enum_class, member)),
        None => Some("null".to_string()),
    };

    FieldPlan {
        field,
        column,
        var_name,
        java_type,
        marshal: Marshal::EnumOrdinal {
            enum_class: enum_class.clone(),
            default: default_member,
        },
        default_value,
        enumeration: Some(EnumPlan {
            enum_class,
            inner_values,
            import,
        }),
    }
}

fn plan_scalar_field<'a>(
    entity: &SchemaEntity,
    field: &'a SchemaField,
    column: ColumnPlan,
    var_name: String,
    ctx: &PlanContext<'a>,
) -> Result<FieldPlan<'a>> {
    let date_type = ctx.config.date_type;
    let java_type = TypeResolver::resolve(field, date_type);
    let marshal = TypeResolver::marshal(&field.data_type, date_type);

    if marshal.is_unsupported() {
        if ctx.config.strict_types {
            return Err(CodegenError::UnsupportedDataType {
                entity: entity.name.clone(),
                field: field.name.clone(),
                data_type: field.data_type.to_string(),
            });
        }
        warn!(
            "No marshalling for {}.{} ({}), emitting placeholder",
            entity.name, field.name, field.data_type
        );
    }

    let default_value = match field.default_value.as_deref().filter(|d| !d.is_empty()) {
        Some(value) => Some(java_type.format_default(value)),
        None if java_type.is_nullable() => Some("null".to_string()),
        None => java_type
            .default_literal()
            .or_else(|| java_type.now_expression().map(str::to_string)),
    };

    Ok(FieldPlan {
        field,
        column,
        var_name,
        java_type,
        marshal,
        default_value,
        enumeration: None,
    })
}

/// Collections for other tables' ONE_TO_MANY fields that target this entity
///
/// Incoming ONE_TO_ONE fields are not expanded; only the owning side holds
/// a reference.
fn expand_incoming<'a>(entity: &'a SchemaEntity, ctx: &PlanContext<'a>, plan: &mut EntityPlan<'a>) {
    let database: &'a SchemaDatabase = ctx.database;
    for other in &database.tables {
        if std::ptr::eq(other, entity) {
            continue;
        }

        for fk_field in other.foreign_key_fields_to(&entity.name) {
            if fk_field.foreign_key_type() != ForeignKeyType::OneToMany {
                continue;
            }

            let class_name = other.class_name.clone();
            let list_var = naming::decapitalize(&class_name);
            let mapped_by = match &fk_field.var_name {
                Some(var) if !var.is_empty() => var.clone(),
                _ => naming::decapitalize(&entity.class_name),
            };
            let import = format!("{}.*", ctx.package_of(&class_name));

            debug!(
                "{} gets collection {}Items from {}.{}",
                entity.name, list_var, other.name, fk_field.name
            );

            plan.imports.insert(import.clone());
            plan.collections.push(CollectionPlan {
                fk_field,
                items: format!("{}Items", list_var),
                items_to_delete: format!("{}ItemsToDelete", list_var),
                class_name,
                list_var,
                mapped_by,
                import,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        EntityKind, FetchType, FieldEnumeration, FieldType, ForeignKey, TableDetails,
    };

    fn make_field(name: &str, data_type: FieldType, not_null: bool) -> SchemaField {
        let mut field = SchemaField::new(name, data_type);
        field.not_null = not_null;
        field
    }

    fn make_fk(name: &str, table: &str, kind: ForeignKeyType) -> SchemaField {
        let mut field = SchemaField::new(name, FieldType::Integer);
        field.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            field: "_id".to_string(),
            kind,
            fetch: FetchType::Lazy,
            cascade: "ALL".to_string(),
            order_by_column: None,
        });
        field
    }

    fn make_table(name: &str, fields: Vec<SchemaField>) -> SchemaEntity {
        SchemaEntity {
            name: name.to_string(),
            class_name: naming::to_class_name(name),
            kind: EntityKind::Table(TableDetails::default()),
            fields,
            readonly: false,
        }
    }

    fn make_person() -> SchemaEntity {
        let mut id = make_field("id", FieldType::Integer, true);
        id.primary_key = true;
        id.increment = true;
        let name = make_field("name", FieldType::Varchar, true);
        let mut status = make_field("status", FieldType::Integer, true);
        status.enumeration = Some(FieldEnumeration {
            source: EnumSource::Local(vec!["ACTIVE".to_string(), "INACTIVE".to_string()]),
            default: Some("ACTIVE".to_string()),
        });
        make_table("Person", vec![id, name, status])
    }

    fn make_database(tables: Vec<SchemaEntity>) -> SchemaDatabase {
        SchemaDatabase {
            name: "main".to_string(),
            tables,
            views: vec![],
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

    #[test]
    fn test_person_plan() {
        let config = make_config();
        let db = make_database(vec![make_person()]);
        let entity = &db.tables[0];
        let ctx = PlanContext::new(&config, &db, entity);
        let plan = plan_entity(entity, &ctx).unwrap();

        assert_eq!(plan.package, "org.example.main.person");
        let constants: Vec<&str> = plan.columns.iter().map(|c| c.constant.as_str()).collect();
        assert_eq!(constants, vec!["ID", "NAME", "STATUS"]);

        let status = &plan.fields[2];
        assert_eq!(status.type_string(), "Status");
        assert_eq!(status.getter(), "getStatus");
        assert_eq!(status.default_value.as_deref(), Some("Status.ACTIVE"));
        assert_eq!(
            status.enumeration.as_ref().unwrap().inner_values,
            Some(vec!["ACTIVE".to_string(), "INACTIVE".to_string()])
        );

        assert_eq!(plan.primary_key_field().unwrap().var_name, "id");
        assert_eq!(plan.fields[1].type_string(), "String");
        assert_eq!(plan.fields[1].default_value.as_deref(), Some("\"\""));
    }

    #[test]
    fn test_nullable_fields_use_wrappers() {
        let config = make_config();
        let db = make_database(vec![make_table(
            "item",
            vec![
                make_field("count", FieldType::Integer, false),
                make_field("total", FieldType::Integer, true),
            ],
        )]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        assert_eq!(plan.fields[0].type_string(), "Integer");
        assert_eq!(plan.fields[0].default_value.as_deref(), Some("null"));
        assert_eq!(plan.fields[1].type_string(), "int");
        assert_eq!(plan.fields[1].default_value.as_deref(), Some("0"));
    }

    #[test]
    fn test_varchar_enumeration_stays_string() {
        let mut color = make_field("color", FieldType::Varchar, true);
        color.enumeration = Some(FieldEnumeration {
            source: EnumSource::Local(vec!["RED".to_string()]),
            default: Some("RED".to_string()),
        });
        let config = make_config();
        let db = make_database(vec![make_table("paint", vec![color])]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();
        assert_eq!(plan.fields[0].type_string(), "String");
        assert!(plan.fields[0].enumeration.is_none());
    }

    #[test]
    fn test_enum_table_reference_imports_enum_class() {
        let mut role = make_fk("role_type_id", "ROLE_TYPE", ForeignKeyType::Enum);
        role.not_null = true;
        role.enumeration = Some(FieldEnumeration {
            source: EnumSource::Table("ROLE_TYPE".to_string()),
            default: Some("ADMIN".to_string()),
        });
        let config = make_config();
        let mut role_type = make_table("ROLE_TYPE", vec![]);
        role_type.class_name = "RoleType".to_string();
        let db = make_database(vec![make_table("member", vec![role]), role_type]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let field = &plan.fields[0];
        assert_eq!(field.type_string(), "RoleType");
        assert_eq!(field.default_value.as_deref(), Some("RoleType.ADMIN"));
        assert!(plan.imports.contains("org.example.main.roletype.RoleType"));
    }

    #[test]
    fn test_outgoing_reference_replaces_scalar() {
        let config = make_config();
        let db = make_database(vec![
            make_table("person", vec![]),
            make_table(
                "phone",
                vec![
                    make_field("number", FieldType::Varchar, true),
                    make_fk("person_id", "person", ForeignKeyType::ManyToOne),
                ],
            ),
        ]);
        let entity = &db.tables[1];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        assert_eq!(plan.columns.len(), 2);
        assert_eq!(plan.fields.len(), 1);
        assert_eq!(plan.references.len(), 1);
        assert_eq!(plan.references[0].class_name, "Person");
        assert_eq!(plan.references[0].var_name, "person");
        assert!(plan.imports.contains("org.example.main.person.*"));
    }

    #[test]
    fn test_incoming_one_to_many_expands_collection() {
        let config = make_config();
        let db = make_database(vec![
            make_table("person", vec![]),
            make_table(
                "phone",
                vec![make_fk("person_id", "PERSON", ForeignKeyType::OneToMany)],
            ),
        ]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        assert_eq!(plan.collections.len(), 1);
        let collection = &plan.collections[0];
        assert_eq!(collection.class_name, "Phone");
        assert_eq!(collection.items, "phoneItems");
        assert_eq!(collection.items_to_delete, "phoneItemsToDelete");
        assert_eq!(collection.back_reference_setter(), "setPerson");
        assert_eq!(collection.items_getter(), "getPhoneItems");
    }

    #[test]
    fn test_collection_named_after_related_class() {
        let mut owner = make_fk("person_id", "PERSON", ForeignKeyType::OneToMany);
        owner.var_name = Some("owner".to_string());
        let config = make_config();
        let db = make_database(vec![make_table("person", vec![]), make_table("phone", vec![owner])]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let collection = &plan.collections[0];
        assert_eq!(collection.list_var, "phone");
        assert_eq!(collection.items, "phoneItems");
        assert_eq!(collection.back_reference_setter(), "setOwner");
    }

    #[test]
    fn test_incoming_one_to_one_is_not_expanded() {
        let config = make_config();
        let db = make_database(vec![
            make_table("person", vec![]),
            make_table(
                "passport",
                vec![make_fk("person_id", "person", ForeignKeyType::OneToOne)],
            ),
        ]);
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();
        assert!(plan.collections.is_empty());
    }

    #[test]
    fn test_unsupported_type_placeholder_and_strict_mode() {
        let db = make_database(vec![make_table(
            "ledger",
            vec![make_field("amount", FieldType::parse("MONEY"), true)],
        )]);
        let entity = &db.tables[0];

        let config = make_config();
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();
        assert!(plan.fields[0].marshal.is_unsupported());

        let strict = CodegenConfig {
            strict_types: true,
            ..make_config()
        };
        assert!(matches!(
            plan_entity(entity, &PlanContext::new(&strict, &db, entity)),
            Err(CodegenError::UnsupportedDataType { .. })
        ));
    }

    #[test]
    fn test_duplicate_primary_key_fails() {
        let mut a = make_field("a", FieldType::Integer, true);
        a.primary_key = true;
        let mut b = make_field("b", FieldType::Integer, true);
        b.primary_key = true;
        let config = make_config();
        let db = make_database(vec![make_table("t", vec![a, b])]);
        let entity = &db.tables[0];
        assert!(matches!(
            plan_entity(entity, &PlanContext::new(&config, &db, entity)),
            Err(CodegenError::DuplicatePrimaryKey { .. })
        ));
    }
}
