//! JPA entity and EntityManager-backed manager rendering

use tracing::debug;

use crate::codegen::entity::{EntityPlan, EnumPlan, FieldPlan, ReferencePlan};
use crate::codegen::java::{
    generated_file_header, quote, user_file_header, Access, ClassKind, JavaClass, JavaEnum,
    JavaMethod, JavaVariable,
};
use crate::codegen::type_resolver::JavaType;
use crate::codegen::{naming, records};
use crate::config::{CodegenConfig, DateType};
use crate::schema::{FieldType, ForeignKeyType};

const JPA_BASE_RECORD: &str = "org.dbtools.jpa.domain.JPABaseRecord";
const ENTITY_MANAGER: &str = "javax.persistence.EntityManager";
const TRANSACTIONAL: &str = "@javax.transaction.Transactional";

/// Abstract `<Class>BaseRecord` mapped superclass, regenerated on every run
pub fn render_base_record(plan: &EntityPlan, config: &CodegenConfig) -> JavaClass {
    let class_name = plan.base_record_name();
    debug!("Rendering JPA base record {}", class_name);

    let mut class = JavaClass::new(&plan.package, &class_name);
    class.kind = ClassKind::AbstractClass;
    class.file_header = Some(generated_file_header(&class_name));
    class.add_annotation("@SuppressWarnings(\"all\")");
    class.add_annotation("@javax.persistence.MappedSuperclass()");
    class.extends = Some("JPABaseRecord".to_string());
    class.add_implements("java.io.Serializable");
    class.add_import(JPA_BASE_RECORD);
    for import in &plan.imports {
        class.add_import(import);
    }

    add_constants(&mut class, plan);

    for field in &plan.fields {
        if let Some(EnumPlan {
            enum_class,
            inner_values: Some(values),
            ..
        }) = &field.enumeration
        {
            class.add_inner_enum(JavaEnum::new(enum_class, values.clone()));
        }
        let variable = field_variable(&mut class, field, config);
        class.add_variable(variable);
    }

    for reference in &plan.references {
        let variable = reference_variable(&mut class, reference);
        class.add_variable(variable);
    }

    add_collections(&mut class, plan);
    add_identity_methods(&mut class, plan);

    let mut to_string = JavaMethod::new("String", "toString")
        .annotation("@Override")
        .line("String text = \"\\n\";");
    for field in plan.fields.iter().filter(|f| !f.field.data_type.is_lob()) {
        to_string = to_string.line(format!(
            "text += \"{0} = \"+ {0} +\"\\n\";",
            field.var_name
        ));
    }
    class.add_method(to_string.line("return text;"));

    class
}

fn add_constants(class: &mut JavaClass, plan: &EntityPlan) {
    class.add_constant("String", "TABLE", quote(&plan.entity.name));
    class.add_constant("String", "TABLE_CLASSNAME", quote(&plan.class_name));

    if let Some(pk) = plan.primary_key_column() {
        class.add_constant("String", "PRIMARY_KEY_COLUMN", quote(&pk.column));
        class.add_constant("String", "PRIMARY_KEY_PROPERTY_COLUMN", quote(&pk.var_name));
    }

    for column in &plan.columns {
        class.add_constant("String", column.column_constant(), quote(&column.column));
        class.add_constant(
            "String",
            column.full_column_constant(),
            quote(&column.full_column),
        );

        // references are addressed by their object property
        let property = plan
            .references
            .iter()
            .find(|r| r.field.name == column.column)
            .map(|r| r.var_name.clone())
            .unwrap_or_else(|| column.var_name.clone());
        class.add_constant(
            "String",
            format!("P_{}", naming::to_constant_name(&property)),
            quote(&property),
        );
    }
}

fn column_annotation(field: &FieldPlan) -> String {
    let schema_field = field.field;
    let mut annotation = format!("@Column(name={}", quote(&schema_field.name));
    if schema_field.size > 0 {
        annotation.push_str(&format!(", length={}", schema_field.size));
    }
    if schema_field.decimals > 0 {
        annotation.push_str(&format!(", precision={}", schema_field.decimals));
    }
    if schema_field.not_null {
        annotation.push_str(", nullable=false");
    }
    if schema_field.unique {
        annotation.push_str(", unique=true");
    }
    annotation.push(')');
    annotation
}

fn field_variable(class: &mut JavaClass, field: &FieldPlan, config: &CodegenConfig) -> JavaVariable {
    let schema_field = field.field;
    let mut variable = JavaVariable::new(field.type_string(), &field.var_name);
    variable.default_value = field.default_value.clone();
    variable.clone_on_access = field.java_type.is_mutable();
    variable.accessor_annotation = records::accessor_annotation(
        &field.java_type,
        field.not_null(),
        config.jsr305_support,
    );
    if variable.accessor_annotation.is_some() {
        class.add_import("javax.annotation.Nonnull");
        class.add_import("javax.annotation.Nullable");
    }

    if field.is_primary_key() {
        class.add_import("javax.persistence.Id");
        variable.annotations.push("@Id".to_string());

        match schema_field.sequencer_name.as_deref().filter(|s| !s.is_empty()) {
            Some(sequencer) => {
                class.add_import("javax.persistence.GeneratedValue");
                class.add_import("javax.persistence.SequenceGenerator");
                variable
                    .annotations
                    .push(format!("@GeneratedValue(generator={})", quote(sequencer)));
                variable.annotations.push(format!(
                    "@SequenceGenerator(name={0}, sequenceName={0}, allocationSize=1)",
                    quote(sequencer)
                ));
            }
            None if schema_field.increment => {
                class.add_import("javax.persistence.GeneratedValue");
                class.add_import("javax.persistence.GenerationType");
                variable
                    .annotations
                    .push("@GeneratedValue(strategy=GenerationType.AUTO)".to_string());
            }
            None => {}
        }
    }

    if schema_field.data_type.is_lob() {
        class.add_import("javax.persistence.Basic");
        class.add_import("javax.persistence.FetchType");
        class.add_import("javax.persistence.Lob");
        variable.annotations.push("@Basic(fetch=FetchType.LAZY)".to_string());
        variable.annotations.push("@Lob".to_string());
    }

    class.add_import("javax.persistence.Column");
    variable.annotations.push(column_annotation(field));

    if config.date_type == DateType::JavaDate {
        let temporal = match schema_field.data_type {
            FieldType::Date => Some("DATE"),
            FieldType::Time => Some("TIME"),
            FieldType::Timestamp | FieldType::DateTime => Some("TIMESTAMP"),
            _ => None,
        };
        if let Some(temporal) = temporal {
            class.add_import("javax.persistence.Temporal");
            class.add_import("javax.persistence.TemporalType");
            variable
                .annotations
                .push(format!("@Temporal(value = TemporalType.{})", temporal));
        }
    }

    if field.enumeration.is_some() {
        class.add_import("javax.persistence.Enumerated");
        class.add_import("javax.persistence.EnumType");
        variable
            .annotations
            .push("@Enumerated(EnumType.ORDINAL)".to_string());
    }

    variable
}

fn join_column(reference: &ReferencePlan) -> String {
    if reference.field.not_null {
        format!("@JoinColumn(name={}, nullable=false)", quote(&reference.field.name))
    } else {
        format!("@JoinColumn(name={})", quote(&reference.field.name))
    }
}

fn reference_variable(class: &mut JavaClass, reference: &ReferencePlan) -> JavaVariable {
    let mut variable = JavaVariable::new(&reference.class_name, &reference.var_name);
    let fetch = reference
        .field
        .foreign_key
        .as_ref()
        .map(|fk| fk.fetch.as_java())
        .unwrap_or("LAZY");

    class.add_import("javax.persistence.FetchType");
    class.add_import("javax.persistence.JoinColumn");

    if reference.kind == ForeignKeyType::OneToOne {
        class.add_import("javax.persistence.OneToOne");
        let cascade = reference
            .field
            .foreign_key
            .as_ref()
            .map(|fk| fk.cascade.as_str())
            .filter(|c| !c.is_empty());
        let cascade = match cascade {
            Some(cascade) => {
                class.add_import("javax.persistence.CascadeType");
                format!("cascade=CascadeType.{}, ", cascade)
            }
            None => String::new(),
        };
        variable
            .annotations
            .push(format!("@OneToOne({}fetch=FetchType.{})", cascade, fetch));
    } else {
        // the owning side of a one-to-many maps as many-to-one
        class.add_import("javax.persistence.ManyToOne");
        variable
            .annotations
            .push(format!("@ManyToOne(fetch=FetchType.{})", fetch));
    }
    variable.annotations.push(join_column(reference));

    variable
}

fn add_collections(class: &mut JavaClass, plan: &EntityPlan) {
    let mut cleanup: Vec<String> = Vec::new();

    for collection in &plan.collections {
        let related = &collection.class_name;
        let set_type = format!("Set<{}>", related);
        let new_set = format!("new HashSet<{}>()", related);
        let foreign_key = collection.fk_field.foreign_key.as_ref();
        let fetch = foreign_key.map(|fk| fk.fetch.as_java()).unwrap_or("LAZY");

        class.add_import("java.util.Set");
        class.add_import("java.util.HashSet");
        class.add_import("javax.persistence.OneToMany");
        class.add_import("javax.persistence.FetchType");
        class.add_import("javax.persistence.Transient");

        let cascade = match foreign_key.map(|fk| fk.cascade.as_str()).filter(|c| !c.is_empty()) {
            Some(cascade) => {
                class.add_import("javax.persistence.CascadeType");
                format!("cascade=CascadeType.{}, ", cascade)
            }
            None => String::new(),
        };

        let mut items = JavaVariable::new(&set_type, &collection.items)
            .with_default(&new_set)
            .without_accessors()
            .with_annotation(format!(
                "@OneToMany(mappedBy={}, {}fetch=FetchType.{})",
                quote(&collection.mapped_by),
                cascade,
                fetch
            ));
        if let Some(order_by) = foreign_key
            .and_then(|fk| fk.order_by_column.as_deref())
            .filter(|o| !o.is_empty())
        {
            class.add_import("javax.persistence.OrderBy");
            items = items.with_annotation(format!("@OrderBy({})", quote(order_by)));
        }
        class.add_variable(items);
        class.add_variable(
            JavaVariable::new(&set_type, &collection.items_to_delete)
                .with_default(&new_set)
                .without_accessors()
                .with_annotation("@Transient"),
        );

        class.add_method(JavaMethod::new(&set_type, collection.items_getter()).line(format!(
            "return java.util.Collections.unmodifiableSet({});",
            collection.items
        )));
        class.add_method(records::add_related_method(plan, collection));
        class.add_method(records::delete_related_method(collection, "getID"));

        cleanup.extend([
            format!("for ({} itemToDelete : {}) {{", related, collection.items_to_delete),
            "    try {".to_string(),
            "        em.remove(itemToDelete);".to_string(),
            "    } catch(RuntimeException e) {// do nothing... it is ok if it does not exist".to_string(),
            "    }".to_string(),
            "}".to_string(),
            format!("{}.clear();", collection.items_to_delete),
        ]);
    }

    // managers call this on every update, so it exists even when empty
    class.add_method(
        JavaMethod::new("void", "cleanupOrphans")
            .param(ENTITY_MANAGER, "em")
            .lines(cleanup),
    );
}

fn add_identity_methods(class: &mut JavaClass, plan: &EntityPlan) {
    let Some(pk) = plan.primary_key_field() else {
        class.add_method(JavaMethod::new("boolean", "isNewRecord").line("return true;"));
        return;
    };

    class.add_method(
        JavaMethod::new(pk.type_string(), "getID").line(format!("return {};", pk.var_name)),
    );

    let numeric = matches!(
        pk.java_type.inner_type(),
        JavaType::Int | JavaType::Long | JavaType::Float | JavaType::Double
    );
    let check = match (numeric, pk.is_nullable()) {
        (true, false) => "return getID() <= 0;",
        (true, true) => "return getID() == null || getID() <= 0;",
        (false, _) => "return getID() == null;",
    };
    class.add_method(JavaMethod::new("boolean", "isNewRecord").line(check));
}

/// Abstract `<Class>BaseManager`, regenerated on every run
pub fn render_base_manager(plan: &EntityPlan, config: &CodegenConfig) -> JavaClass {
    let class_name = plan.base_manager_name();
    let record = &plan.class_name;
    let manager = plan.manager_name();
    debug!("Rendering JPA base manager {}", class_name);

    let mut class = JavaClass::new(&plan.package, &class_name);
    class.kind = ClassKind::AbstractClass;
    class.file_header = Some(generated_file_header(&class_name));
    class.add_annotation("@SuppressWarnings(\"all\")");
    class.add_import(ENTITY_MANAGER);
    class.add_import("javax.persistence.Query");
    class.add_import("java.util.List");

    if !config.injection_support {
        class.add_constructor(JavaMethod::constructor(&class_name).access(Access::Private));
        class.add_constructor(
            JavaMethod::constructor(&class_name)
                .param("EntityManager", "em")
                .lines([
                    "if (em == null) {",
                    "    throw new IllegalArgumentException(\"EntityManager parameter cannot be null\");",
                    "}",
                    "this.entityManager = em;",
                ]),
        );

        // settable so tests can swap in a mock
        let mut singleton = JavaVariable::new(&manager, "manager");
        singleton.is_static = true;
        singleton.generate_getter = false;
        class.add_variable(singleton);

        class.add_method(
            JavaMethod::new(&manager, format!("get{}", manager))
                .static_if(true)
                .param("EntityManager", "em")
                .lines([
                    "if (manager == null) {".to_string(),
                    format!("    manager = new {}(em);", manager),
                    "}".to_string(),
                    String::new(),
                    "manager.setEntityManager(em);".to_string(),
                    "return manager;".to_string(),
                ]),
        );
    }

    class.add_variable(
        JavaVariable::new("EntityManager", "entityManager")
            .with_annotation("@javax.persistence.PersistenceContext"),
    );

    let transactional = config.javaee_support;
    class.add_method(
        JavaMethod::new("void", "create")
            .annotation_if(transactional, TRANSACTIONAL)
            .param(record, "record")
            .line("entityManager.persist(record);"),
    );
    class.add_method(
        JavaMethod::new("void", "update")
            .annotation_if(transactional, TRANSACTIONAL)
            .param(record, "record")
            .line(format!("{} mergedRecord = entityManager.merge(record);", record))
            .line("mergedRecord.cleanupOrphans(entityManager);"),
    );
    class.add_method(
        JavaMethod::new("void", "delete")
            .annotation_if(transactional, TRANSACTIONAL)
            .param(record, "record")
            .line(format!("{} mergedRecord = entityManager.merge(record);", record))
            .line("mergedRecord.cleanupOrphans(entityManager);")
            .line("entityManager.remove(mergedRecord);"),
    );
    class.add_method(
        JavaMethod::new("void", "save")
            .annotation_if(transactional, TRANSACTIONAL)
            .param(record, "record")
            .lines([
                "if (record.isNewRecord()) {",
                "    create(record);",
                "} else {",
                "    update(record);",
                "}",
            ]),
    );
    class.add_method(
        JavaMethod::new(record, "find")
            .param("Object", "pk")
            .line(format!(
                "return ({0}) entityManager.find({0}.class, pk);",
                record
            )),
    );
    class.add_method(
        JavaMethod::new(format!("List<{}>", record), "findAll")
            .line(format!(
                "Query q = getEntityManager().createQuery(\"SELECT o FROM \" + {}.TABLE_CLASSNAME + \" o\");",
                record
            ))
            .line("return q.getResultList();"),
    );
    class.add_method(
        JavaMethod::new("long", "findCount")
            .line(format!(
                "Query q = getEntityManager().createNativeQuery(\"SELECT count(0) FROM \" + {}.TABLE);",
                record
            ))
            .line("return ((Number) q.getSingleResult()).longValue();"),
    );

    class
}

/// `@Entity` scaffold extending the base record; written once
pub fn render_user_record(plan: &EntityPlan, created: &str) -> JavaClass {
    let record = &plan.class_name;
    let base = plan.base_record_name();
    debug!("Rendering JPA record {}", record);

    let mut class = JavaClass::new(&plan.package, record);
    class.file_header = Some(user_file_header(record, created));
    class.extends = Some(base.clone());
    class.add_annotation("@javax.persistence.Entity()");

    let constraints: Vec<String> = plan
        .entity
        .table_details()
        .map(|details| {
            details
                .uniques
                .iter()
                .map(|unique| {
                    let columns: Vec<String> = unique.fields.iter().map(|f| quote(f)).collect();
                    format!(
                        "@javax.persistence.UniqueConstraint(columnNames={{{}}})",
                        columns.join(", ")
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if constraints.is_empty() {
        class.add_annotation(format!("@javax.persistence.Table(name={}.TABLE)", base));
    } else {
        class.add_annotation(format!(
            "@javax.persistence.Table(name={}.TABLE, uniqueConstraints={{{}}})",
            base,
            constraints.join(", ")
        ));
    }

    class
}

/// `<Class>Manager` scaffold extending the base manager; written once
pub fn render_user_manager(plan: &EntityPlan, config: &CodegenConfig, created: &str) -> JavaClass {
    let name = plan.manager_name();
    debug!("Rendering JPA manager {}", name);

    let mut class = JavaClass::new(&plan.package, &name);
    class.file_header = Some(user_file_header(&name, created));
    class.extends = Some(plan.base_manager_name());

    if config.injection_support {
        class.add_annotation("@javax.inject.Singleton");
        class.add_constructor(JavaMethod::constructor(&name).annotation("@javax.inject.Inject"));
    } else {
        class.add_import(ENTITY_MANAGER);
        class.add_constructor(
            JavaMethod::constructor(&name)
                .param("EntityManager", "em")
                .line("super(em);"),
        );
    }

    class
}

/// JUnit 4 accessor tests for one record; written once
pub fn render_test_class(plan: &EntityPlan, created: &str) -> JavaClass {
    let record = &plan.class_name;
    let name = format!("{}Test", record);
    debug!("Rendering JPA test {}", name);

    let mut class = JavaClass::new(&plan.package, &name);
    class.file_header = Some(user_file_header(&name, created));
    class.add_import("org.junit.*");
    class.add_import("static org.junit.Assert.*");

    class.add_variable(JavaVariable::new(record, "testRecord").without_accessors());
    class.add_method(
        JavaMethod::new("void", "setUp")
            .annotation("@Before")
            .line(format!("testRecord = new {}();", record))
            .line("assertNotNull(testRecord);"),
    );
    class.add_method(JavaMethod::new("void", "tearDown").annotation("@After"));

    for field in &plan.fields {
        if let Some(body) = accessor_test_body(field) {
            if body.iter().any(|line| line.contains("Calendar")) {
                class.add_import("java.util.Calendar");
                class.add_import("java.util.Date");
            }
            class.add_method(
                JavaMethod::new("void", format!("test{}", naming::capitalize(&field.var_name)))
                    .annotation("@Test")
                    .lines(body),
            );
        }
    }

    class.add_method(
        JavaMethod::new("void", "testToString")
            .annotation("@Test")
            .line("assertNotNull(testRecord.toString());"),
    );

    class
}

fn accessor_test_body(field: &FieldPlan) -> Option<Vec<String>> {
    let setter = field.setter();
    let getter = field.getter();

    let (java_type, value, delta) = match field.java_type.inner_type() {
        JavaType::String => ("String", "\"abc\"", None),
        JavaType::Boolean => ("boolean", "false", None),
        JavaType::Int => ("int", "123", None),
        JavaType::Long => ("long", "123L", None),
        JavaType::Float => ("float", "123.56f", Some("0")),
        JavaType::Double => ("double", "123.56", Some("0")),
        JavaType::Date => {
            return Some(vec![
                "Calendar testData = Calendar.getInstance();".to_string(),
                "testData.set(1980, 2, 1);".to_string(),
                format!("testRecord.{}(testData.getTime());", setter),
                format!("Date recordDataDate = testRecord.{}();", getter),
                "Calendar recordData = Calendar.getInstance();".to_string(),
                "recordData.setTime(recordDataDate);".to_string(),
                "assertEquals(1980, recordData.get(Calendar.YEAR));".to_string(),
                "assertEquals(2, recordData.get(Calendar.MONTH));".to_string(),
                "assertEquals(1, recordData.get(Calendar.DATE));".to_string(),
            ]);
        }
        _ => return None,
    };

    let assertion = match delta {
        Some(delta) => format!("assertEquals(testData, recordData, {});", delta),
        None => "assertEquals(testData, recordData);".to_string(),
    };
    Some(vec![
        format!("{} testData = {};", java_type, value),
        format!("testRecord.{}(testData);", setter),
        format!("{} recordData = testRecord.{}();", java_type, getter),
        assertion,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::entity::{plan_entity, PlanContext};
    use crate::schema::{
        EntityKind, FetchType, FieldEnumeration, EnumSource, ForeignKey, OnConflict,
        SchemaDatabase, SchemaEntity, SchemaField, TableDetails, UniqueDeclaration,
    };

    fn make_field(name: &str, data_type: FieldType, not_null: bool) -> SchemaField {
        let mut field = SchemaField::new(name, data_type);
        field.not_null = not_null;
        field
    }

    fn make_fk(name: &str, table: &str, kind: ForeignKeyType) -> SchemaField {
        let mut field = SchemaField::new(name, FieldType::Integer);
        field.not_null = true;
        field.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            field: "ID".to_string(),
            kind,
            fetch: FetchType::Lazy,
            cascade: "ALL".to_string(),
            order_by_column: Some("NUMBER".to_string()),
        });
        field
    }

    fn make_table(name: &str, details: TableDetails, fields: Vec<SchemaField>) -> SchemaEntity {
        SchemaEntity {
            name: name.to_string(),
            class_name: naming::to_class_name(name),
            kind: EntityKind::Table(details),
            fields,
            readonly: false,
        }
    }

    fn make_database() -> SchemaDatabase {
        let mut id = make_field("ID", FieldType::BigInt, true);
        id.primary_key = true;
        id.increment = true;
        let mut name = make_field("NAME", FieldType::Varchar, true);
        name.size = 100;
        let mut status = make_field("STATUS", FieldType::Integer, true);
        status.enumeration = Some(FieldEnumeration {
            source: EnumSource::Local(vec!["ACTIVE".to_string(), "INACTIVE".to_string()]),
            default: Some("ACTIVE".to_string()),
        });
        let photo = make_field("PHOTO", FieldType::Blob, false);
        let born = make_field("BORN", FieldType::Date, false);
        let person = make_table(
            "PERSON",
            TableDetails {
                uniques: vec![UniqueDeclaration {
                    fields: vec!["NAME".to_string(), "BORN".to_string()],
                    on_conflict: OnConflict::default(),
                }],
                ..Default::default()
            },
            vec![id, name, status, photo, born],
        );

        let phone = make_table(
            "PHONE",
            TableDetails::default(),
            vec![
                make_field("NUMBER", FieldType::Varchar, true),
                make_fk("PERSON_ID", "PERSON", ForeignKeyType::OneToMany),
            ],
        );
        let passport = make_table(
            "PASSPORT",
            TableDetails::default(),
            vec![make_fk("PERSON_ID", "PERSON", ForeignKeyType::OneToOne)],
        );

        SchemaDatabase {
            name: "main".to_string(),
            tables: vec![person, phone, passport],
            views: vec![],
            queries: vec![],
            post_sql_scripts: vec![],
        }
    }

    fn make_config() -> CodegenConfig {
        CodegenConfig {
            base_package: "org.example".to_string(),
            platform: crate::config::Platform::Jpa,
            ..Default::default()
        }
    }

    fn render(table: usize, config: &CodegenConfig) -> String {
        let db = make_database();
        let entity = &db.tables[table];
        let plan = plan_entity(entity, &PlanContext::new(config, &db, entity)).unwrap();
        render_base_record(&plan, config).render()
    }

    #[test]
    fn test_base_record_declaration_and_constants() {
        let text = render(0, &make_config());
        assert!(text.contains("@javax.persistence.MappedSuperclass()\npublic abstract class PersonBaseRecord extends JPABaseRecord implements java.io.Serializable {"));
        assert!(text.contains("public static final String TABLE_CLASSNAME = \"Person\";"));
        assert!(text.contains("public static final String PRIMARY_KEY_PROPERTY_COLUMN = \"id\";"));
        assert!(text.contains("public static final String P_NAME = \"name\";"));
        assert!(text.contains("public static final String FULL_C_BORN = \"PERSON.BORN\";"));
    }

    #[test]
    fn test_field_annotations() {
        let text = render(0, &make_config());
        assert!(text.contains(
            "    @Id\n    @GeneratedValue(strategy=GenerationType.AUTO)\n    @Column(name=\"ID\", nullable=false)\n    private long id = 0;"
        ));
        assert!(text.contains("@Column(name=\"NAME\", length=100, nullable=false)"));
        assert!(text.contains("    @Basic(fetch=FetchType.LAZY)\n    @Lob\n    @Column(name=\"PHOTO\")"));
        assert!(text.contains("@Temporal(value = TemporalType.DATE)"));
        assert!(text.contains("    @Enumerated(EnumType.ORDINAL)\n    private Status status = Status.ACTIVE;"));
        assert!(text.contains("public enum Status {ACTIVE, INACTIVE}"));
    }

    #[test]
    fn test_to_string_skips_lobs() {
        let text = render(0, &make_config());
        assert!(text.contains("text += \"name = \"+ name +\"\\n\";"));
        assert!(!text.contains("text += \"photo"));
        assert!(text.contains("return getID() <= 0;"));
    }

    #[test]
    fn test_one_to_many_collection() {
        let text = render(0, &make_config());
        assert!(text.contains(
            "    @OneToMany(mappedBy=\"person\", cascade=CascadeType.ALL, fetch=FetchType.LAZY)\n    @OrderBy(\"NUMBER\")\n    private Set<Phone> phoneItems = new HashSet<Phone>();"
        ));
        assert!(text.contains("    @Transient\n    private Set<Phone> phoneItemsToDelete"));
        assert!(text.contains("public void cleanupOrphans(javax.persistence.EntityManager em) {"));
        assert!(text.contains("em.remove(itemToDelete);"));
        assert!(text.contains("Cannot find itemId \"+ phone.getID());"));
        // passport is one-to-one: no back-reference collection
        assert!(!text.contains("passportItems"));
    }

    #[test]
    fn test_outgoing_references() {
        let text = render(1, &make_config());
        assert!(text.contains(
            "    @ManyToOne(fetch=FetchType.LAZY)\n    @JoinColumn(name=\"PERSON_ID\", nullable=false)\n    private Person person;"
        ));
        assert!(text.contains("public static final String P_PERSON = \"person\";"));

        let text = render(2, &make_config());
        assert!(text.contains("@OneToOne(cascade=CascadeType.ALL, fetch=FetchType.LAZY)"));
        assert!(text.contains("public void cleanupOrphans(javax.persistence.EntityManager em) {\n    }"));
    }

    #[test]
    fn test_managers() {
        let config = make_config();
        let db = make_database();
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let base = render_base_manager(&plan, &config).render();
        assert!(base.contains("    private PersonBaseManager() {\n    }"));
        assert!(base.contains("public static PersonManager getPersonManager(EntityManager em) {"));
        assert!(base.contains("public static void setManager(PersonManager manager) {"));
        assert!(base.contains("    @javax.persistence.PersistenceContext\n    private EntityManager entityManager;"));
        assert!(base.contains("mergedRecord.cleanupOrphans(entityManager);"));
        assert!(!base.contains("Transactional"));

        let user = render_user_manager(&plan, &config, "now").render();
        assert!(user.contains("public PersonManager(EntityManager em) {\n        super(em);\n    }"));

        let injected = CodegenConfig {
            injection_support: true,
            javaee_support: true,
            ..make_config()
        };
        let base = render_base_manager(&plan, &injected).render();
        assert!(!base.contains("getPersonManager"));
        assert!(base.contains("    @javax.transaction.Transactional\n    public void save(Person record) {"));
        let user = render_user_manager(&plan, &injected, "now").render();
        assert!(user.contains("@javax.inject.Singleton\npublic class PersonManager extends PersonBaseManager {"));
    }

    #[test]
    fn test_user_record_unique_constraints() {
        let config = make_config();
        let db = make_database();
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let text = render_user_record(&plan, "now").render();
        assert!(text.contains("@javax.persistence.Entity()"));
        assert!(text.contains(
            "@javax.persistence.Table(name=PersonBaseRecord.TABLE, uniqueConstraints={@javax.persistence.UniqueConstraint(columnNames={\"NAME\", \"BORN\"})})"
        ));
    }

    #[test]
    fn test_test_class() {
        let config = make_config();
        let db = make_database();
        let entity = &db.tables[0];
        let plan = plan_entity(entity, &PlanContext::new(&config, &db, entity)).unwrap();

        let text = render_test_class(&plan, "now").render();
        assert!(text.contains("public class PersonTest {"));
        assert!(text.contains("import static org.junit.Assert.*;"));
        assert!(text.contains("    @Test\n    public void testName() {\n        String testData = \"abc\";"));
        assert!(text.contains("assertEquals(1980, recordData.get(Calendar.YEAR));"));
        assert!(!text.contains("testStatus"));
        assert!(!text.contains("testPhoto"));
        assert!(text.contains("public void testToString() {"));
    }
}
