//! Rendering shared by the Android and JPA record classes

use tracing::debug;

use crate::codegen::entity::{CollectionPlan, EntityPlan};
use crate::codegen::java::{
    generated_file_header, quote, ClassKind, JavaClass, JavaMethod, JavaVariable,
};
use crate::codegen::type_resolver::JavaType;
use crate::codegen::{ddl, naming};
use crate::error::Result;
use crate::schema::SchemaEntity;

/// `@Nonnull`/`@Nullable` for object-typed accessors
pub fn accessor_annotation(java_type: &JavaType, not_null: bool, jsr305: bool) -> Option<String> {
    if !jsr305 || (!java_type.is_nullable() && java_type.is_primitive()) {
        return None;
    }
    Some(if not_null { "@Nonnull" } else { "@Nullable" }.to_string())
}

/// `add<Related>`: sets the back-reference and collects the item
pub fn add_related_method(plan: &EntityPlan, collection: &CollectionPlan) -> JavaMethod {
    JavaMethod::new("void", format!("add{}", collection.class_name))
        .param(&collection.class_name, &collection.list_var)
        .line(format!(
            "{}.{}(({}) this);",
            collection.list_var,
            collection.back_reference_setter(),
            plan.class_name
        ))
        .line(format!("{}.add({});", collection.items, collection.list_var))
}

/// `delete<Related>`: moves the item to the pending-deletion set
pub fn delete_related_method(collection: &CollectionPlan, id_getter: &str) -> JavaMethod {
    let var = &collection.list_var;
    JavaMethod::new("void", format!("delete{}", collection.class_name))
        .param(&collection.class_name, var)
        .lines([
            format!("if ({} == null) {{", var),
            "    return;".to_string(),
            "}".to_string(),
            String::new(),
            format!("if (!{}.remove({})) {{", collection.items, var),
            format!(
                "    throw new IllegalStateException(\"deleteItem failed: Cannot find itemId \"+ {}.{}());",
                var, id_getter
            ),
            "}".to_string(),
            format!("{}.add({});", collection.items_to_delete, var),
        ])
}

/// Java enum for an enumeration table; shared by both platforms
///
/// The enum also carries the table's name, column and DDL constants, since
/// no record class is generated for it.
pub fn render_enum_class(
    entity: &SchemaEntity,
    database_name: &str,
    package: &str,
) -> Result<JavaClass> {
    let name = &entity.class_name;
    debug!("Rendering enum class {}", name);

    let mut class = JavaClass::new(package, name);
    class.kind = ClassKind::Enum;
    class.file_header = Some(generated_file_header(name));

    let enums = entity.table_enums().unwrap_or_default();
    class.enum_constants = enums.iter().map(|e| e.name.clone()).collect();

    class.add_constant("String", "DATABASE", quote(database_name));
    class.add_constant("String", "TABLE", quote(&entity.name));
    class.add_constant(
        "String",
        "FULL_TABLE",
        quote(&format!("{}.{}", database_name, entity.name)),
    );
    for field in &entity.fields {
        let constant = naming::to_constant_name(&field.java_name());
        class.add_constant("String", format!("C_{}", constant), quote(&field.name));
        class.add_constant(
            "String",
            format!("FULL_C_{}", constant),
            quote(&format!("{}.{}", entity.name, field.name)),
        );
    }
    class.add_constant("String", "CREATE_TABLE", quote(&ddl::render_table_statement(entity)?));
    class.add_constant("String", "DROP_TABLE", quote(&ddl::render_drop_table(entity)));

    class.add_import("java.util.Map");
    class.add_import("java.util.EnumMap");
    class.add_import("java.util.List");
    class.add_import("java.util.ArrayList");
    class.add_import("java.util.Collections");

    let mut string_map = JavaVariable::new(format!("Map<{}, String>", name), "enumStringMap")
        .with_default(format!("new EnumMap<{0}, String>({0}.class)", name))
        .without_accessors();
    string_map.is_static = true;
    class.add_variable(string_map);

    let mut string_list = JavaVariable::new("List<String>", "stringList")
        .with_default("new ArrayList<String>()")
        .without_accessors();
    string_list.is_static = true;
    class.add_variable(string_list);

    for item in enums {
        class.add_static_init_line(format!("enumStringMap.put({}, {});", item.name, quote(&item.value)));
        class.add_static_init_line(format!("stringList.add({});", quote(&item.value)));
    }

    class.add_method(
        JavaMethod::new("String", "getString")
            .static_if(true)
            .param(name, "key")
            .line("return enumStringMap.get(key);"),
    );
    class.add_method(
        JavaMethod::new("List<String>", "getList")
            .static_if(true)
            .line("return Collections.unmodifiableList(stringList);"),
    );

    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityKind, FieldType, SchemaField, TableDetails, TableEnum};

    fn make_entity(name: &str, kind: EntityKind) -> SchemaEntity {
        SchemaEntity {
            name: name.to_string(),
            class_name: naming::to_class_name(name),
            kind,
            fields: vec![],
            readonly: false,
        }
    }

    #[test]
    fn test_enum_class() {
        let mut table = make_entity(
            "ROLE_TYPE",
            EntityKind::Table(TableDetails {
                enumerations: vec![
                    TableEnum {
                        name: "ADMIN".to_string(),
                        value: "Admin".to_string(),
                    },
                    TableEnum {
                        name: "GUEST_USER".to_string(),
                        value: "Guest User".to_string(),
                    },
                ],
                ..Default::default()
            }),
        );

        let mut id = SchemaField::new("_id", FieldType::Integer);
        id.primary_key = true;
        id.increment = true;
        let mut label = SchemaField::new("NAME", FieldType::Varchar);
        label.size = 255;
        label.not_null = true;
        table.fields = vec![id, label];

        let text = render_enum_class(&table, "main", "org.example.main.roletype")
            .unwrap()
            .render();
        assert!(text.contains("public enum RoleType {\n    ADMIN, GUEST_USER;"));
        assert!(text.contains("public static final String DATABASE = \"main\";"));
        assert!(text.contains("public static final String TABLE = \"ROLE_TYPE\";"));
        assert!(text.contains("public static final String FULL_TABLE = \"main.ROLE_TYPE\";"));
        assert!(text.contains("public static final String C_ID = \"_id\";"));
        assert!(text.contains("public static final String FULL_C_NAME = \"ROLE_TYPE.NAME\";"));
        assert!(text.contains("public static final String CREATE_TABLE = \"CREATE TABLE IF NOT EXISTS ROLE_TYPE ("));
        assert!(text.contains("public static final String DROP_TABLE = \"DROP TABLE IF EXISTS ROLE_TYPE;\";"));
        assert!(text.contains("enumStringMap.put(ADMIN, \"Admin\");"));
        let first = text.find("stringList.add(\"Admin\");").unwrap();
        let second = text.find("stringList.add(\"Guest User\");").unwrap();
        assert!(first < second);
        assert!(text.contains("public static List<String> getList() {"));
    }

    #[test]
    fn test_delete_related_fails_on_missing_item() {
        let fk_field = SchemaField::new("PERSON_ID", FieldType::Integer);
        let collection = CollectionPlan {
            fk_field: &fk_field,
            class_name: "Phone".to_string(),
            list_var: "phone".to_string(),
            items: "phoneItems".to_string(),
            items_to_delete: "phoneItemsToDelete".to_string(),
            mapped_by: "person".to_string(),
            import: "org.example.main.phone.*".to_string(),
        };

        let mut class = JavaClass::new("org.example.main.person", "PersonBaseRecord");
        class.add_method(delete_related_method(&collection, "getPrimaryKeyId"));
        let text = class.render();

        // an empty set must still reach the throw
        assert!(!text.contains("Iterator"));
        let check = text.find("if (!phoneItems.remove(phone)) {").unwrap();
        let throw = text
            .find("throw new IllegalStateException(\"deleteItem failed: Cannot find itemId \"+ phone.getPrimaryKeyId());")
            .unwrap();
        let pending = text.find("phoneItemsToDelete.add(phone);").unwrap();
        assert!(check < throw);
        assert!(throw < pending);
    }

    #[test]
    fn test_accessor_annotation() {
        assert_eq!(accessor_annotation(&JavaType::Int, true, true), None);
        assert_eq!(
            accessor_annotation(&JavaType::Nullable(Box::new(JavaType::Int)), false, true),
            Some("@Nullable".to_string())
        );
        assert_eq!(
            accessor_annotation(&JavaType::String, true, true),
            Some("@Nonnull".to_string())
        );
        assert_eq!(accessor_annotation(&JavaType::String, true, false), None);
    }
}
