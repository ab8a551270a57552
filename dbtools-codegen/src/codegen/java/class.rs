//! Declaration tree for a single Java source file

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::codegen::naming;

const TAB: &str = "    ";

/// Member visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
    PackagePrivate,
}

impl Access {
    fn keyword(&self) -> &'static str {
        match self {
            Access::Public => "public ",
            Access::Protected => "protected ",
            Access::Private => "private ",
            Access::PackagePrivate => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassKind {
    #[default]
    Class,
    AbstractClass,
    Enum,
}

/// A field or constant declaration
#[derive(Debug, Clone, Default)]
pub struct JavaVariable {
    pub java_type: String,
    pub name: String,
    pub default_value: Option<String>,
    pub access: Access,
    pub is_static: bool,
    pub is_final: bool,
    pub annotations: Vec<String>,
    pub generate_getter: bool,
    pub generate_setter: bool,
    /// Getters and setters copy the value (`java.util.Date`, `byte[]`)
    pub clone_on_access: bool,
    /// `@Nonnull`/`@Nullable` placed on the getter and setter parameter
    pub accessor_annotation: Option<String>,
    /// Overrides the JavaBeans getter name
    pub getter_name: Option<String>,
}

impl JavaVariable {
    /// Private field with a getter and setter
    pub fn new(java_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            java_type: java_type.into(),
            name: name.into(),
            access: Access::Private,
            generate_getter: true,
            generate_setter: true,
            ..Default::default()
        }
    }

    /// `public static final` constant, `value` is the Java expression
    pub fn constant(
        java_type: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            java_type: java_type.into(),
            name: name.into(),
            default_value: Some(value.into()),
            access: Access::Public,
            is_static: true,
            is_final: true,
            ..Default::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn without_accessors(mut self) -> Self {
        self.generate_getter = false;
        self.generate_setter = false;
        self
    }

    pub fn getter(&self) -> String {
        self.getter_name
            .clone()
            .unwrap_or_else(|| naming::getter_name(&self.java_type, &self.name))
    }

    pub fn setter(&self) -> String {
        naming::setter_name(&self.name)
    }

    fn render_declaration(&self, out: &mut String) {
        for annotation in &self.annotations {
            out.push_str(&format!("{}{}\n", TAB, annotation));
        }
        out.push_str(TAB);
        out.push_str(self.access.keyword());
        if self.is_static {
            out.push_str("static ");
        }
        if self.is_final {
            out.push_str("final ");
        }
        out.push_str(&format!("{} {}", self.java_type, self.name));
        if let Some(value) = &self.default_value {
            out.push_str(" = ");
            out.push_str(value);
        }
        out.push_str(";\n");
    }

    fn accessor_methods(&self, class_name: &str) -> Vec<JavaMethod> {
        let mut methods = Vec::new();

        if self.generate_getter {
            let body = if self.clone_on_access {
                format!(
                    "return {0} != null ? ({1}) {0}.clone() : null;",
                    self.name, self.java_type
                )
            } else {
                format!("return {};", self.name)
            };
            let mut getter = JavaMethod::new(&self.java_type, self.getter())
                .static_if(self.is_static)
                .line(body);
            if let Some(annotation) = &self.accessor_annotation {
                getter = getter.annotation(annotation);
            }
            methods.push(getter);
        }

        if self.generate_setter && !self.is_final {
            let value = if self.clone_on_access {
                format!(
                    "{0} != null ? ({1}) {0}.clone() : null",
                    self.name, self.java_type
                )
            } else {
                self.name.clone()
            };
            let target = if self.is_static {
                format!("{}.{}", class_name, self.name)
            } else {
                format!("this.{}", self.name)
            };
            let mut param = JavaParam::new(&self.java_type, &self.name);
            if let Some(annotation) = &self.accessor_annotation {
                param.annotations.push(annotation.clone());
            }
            methods.push(
                JavaMethod::new("void", self.setter())
                    .static_if(self.is_static)
                    .param_with(param)
                    .line(format!("{} = {};", target, value)),
            );
        }

        methods
    }
}

/// A method or constructor parameter
#[derive(Debug, Clone, Default)]
pub struct JavaParam {
    pub java_type: String,
    pub name: String,
    pub annotations: Vec<String>,
}

impl JavaParam {
    pub fn new(java_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            java_type: java_type.into(),
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    fn render(&self) -> String {
        let mut text = String::new();
        for annotation in &self.annotations {
            text.push_str(annotation);
            text.push(' ');
        }
        text.push_str(&format!("{} {}", self.java_type, self.name));
        text
    }
}

/// A method, or a constructor when `return_type` is `None`
#[derive(Debug, Clone, Default)]
pub struct JavaMethod {
    pub access: Access,
    pub return_type: Option<String>,
    pub name: String,
    pub params: Vec<JavaParam>,
    /// Body lines, indented relative to the method body
    pub body: Vec<String>,
    pub annotations: Vec<String>,
    pub is_static: bool,
    pub is_abstract: bool,
}

impl JavaMethod {
    pub fn new(return_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            return_type: Some(return_type.into()),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn constructor(class_name: impl Into<String>) -> Self {
        Self {
            name: class_name.into(),
            ..Default::default()
        }
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn param(mut self, java_type: impl Into<String>, name: impl Into<String>) -> Self {
        self.params.push(JavaParam::new(java_type, name));
        self
    }

    pub fn param_with(mut self, param: JavaParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Add `annotation` when `condition` holds
    pub fn annotation_if(self, condition: bool, annotation: impl Into<String>) -> Self {
        if condition {
            self.annotation(annotation)
        } else {
            self
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn static_if(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    fn render(&self, out: &mut String) {
        for annotation in &self.annotations {
            out.push_str(&format!("{}{}\n", TAB, annotation));
        }

        out.push_str(TAB);
        out.push_str(self.access.keyword());
        if self.is_abstract {
            out.push_str("abstract ");
        }
        if self.is_static {
            out.push_str("static ");
        }
        if let Some(return_type) = &self.return_type {
            out.push_str(return_type);
            out.push(' ');
        }

        let params: Vec<String> = self.params.iter().map(JavaParam::render).collect();
        out.push_str(&format!("{}({})", self.name, params.join(", ")));

        if self.is_abstract {
            out.push_str(";\n");
            return;
        }

        out.push_str(" {\n");
        for line in &self.body {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("{}{}{}\n", TAB, TAB, line));
            }
        }
        out.push_str(&format!("{}}}\n", TAB));
    }
}

/// Nested enum declaration
#[derive(Debug, Clone)]
pub struct JavaEnum {
    pub name: String,
    pub values: Vec<String>,
}

impl JavaEnum {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A top-level Java class or enum
#[derive(Debug, Clone, Default)]
pub struct JavaClass {
    pub package: String,
    pub name: String,
    pub file_header: Option<String>,
    pub class_header: Option<String>,
    pub imports: BTreeSet<String>,
    pub annotations: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub kind: ClassKind,
    pub constants: Vec<JavaVariable>,
    pub variables: Vec<JavaVariable>,
    pub constructors: Vec<JavaMethod>,
    pub methods: Vec<JavaMethod>,
    pub inner_enums: Vec<JavaEnum>,
    /// Members of an `Enum` kind class
    pub enum_constants: Vec<String>,
    pub static_init: Vec<String>,
}

impl JavaClass {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_import(&mut self, import: impl Into<String>) {
        self.imports.insert(import.into());
    }

    pub fn add_annotation(&mut self, annotation: impl Into<String>) {
        self.annotations.push(annotation.into());
    }

    pub fn add_implements(&mut self, interface: impl Into<String>) {
        self.implements.push(interface.into());
    }

    pub fn add_constant(
        &mut self,
        java_type: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.constants.push(JavaVariable::constant(java_type, name, value));
    }

    pub fn add_variable(&mut self, variable: JavaVariable) {
        self.variables.push(variable);
    }

    pub fn add_constructor(&mut self, constructor: JavaMethod) {
        self.constructors.push(constructor);
    }

    pub fn add_method(&mut self, method: JavaMethod) {
        self.methods.push(method);
    }

    pub fn add_inner_enum(&mut self, inner: JavaEnum) {
        self.inner_enums.push(inner);
    }

    pub fn add_static_init_line(&mut self, line: impl Into<String>) {
        self.static_init.push(line.into());
    }

    pub fn file_name(&self) -> String {
        format!("{}.java", self.name)
    }

    /// Location of the source file below `root`
    pub fn file_path(&self, root: &Path) -> PathBuf {
        root.join(naming::package_to_path(&self.package))
            .join(self.file_name())
    }

    /// Serialize the declaration tree to Java source
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(header) = &self.file_header {
            out.push_str(header);
            if !header.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }

        if !self.package.is_empty() {
            out.push_str(&format!("package {};\n\n", self.package));
        }

        if !self.imports.is_empty() {
            for import in &self.imports {
                out.push_str(&format!("import {};\n", import));
            }
            out.push('\n');
        }

        if let Some(header) = &self.class_header {
            out.push_str(header);
            if !header.ends_with('\n') {
                out.push('\n');
            }
        }
        for annotation in &self.annotations {
            out.push_str(annotation);
            out.push('\n');
        }

        let keyword = match self.kind {
            ClassKind::Class => "public class",
            ClassKind::AbstractClass => "public abstract class",
            ClassKind::Enum => "public enum",
        };
        out.push_str(&format!("{} {}", keyword, self.name));
        if let Some(extends) = &self.extends {
            out.push_str(&format!(" extends {}", extends));
        }
        if !self.implements.is_empty() {
            out.push_str(&format!(" implements {}", self.implements.join(", ")));
        }
        out.push_str(" {\n");

        if self.kind == ClassKind::Enum {
            out.push_str(&format!("{}{};\n", TAB, self.enum_constants.join(", ")));
        }

        if !self.constants.is_empty() {
            out.push('\n');
            for constant in &self.constants {
                constant.render_declaration(&mut out);
            }
        }

        for inner in &self.inner_enums {
            out.push('\n');
            out.push_str(&format!(
                "{}public enum {} {{{}}}\n",
                TAB,
                inner.name,
                inner.values.join(", ")
            ));
        }

        if !self.variables.is_empty() {
            out.push('\n');
            for variable in &self.variables {
                variable.render_declaration(&mut out);
            }
        }

        if !self.static_init.is_empty() {
            out.push('\n');
            out.push_str(&format!("{}static {{\n", TAB));
            for line in &self.static_init {
                out.push_str(&format!("{}{}{}\n", TAB, TAB, line));
            }
            out.push_str(&format!("{}}}\n", TAB));
        }

        for constructor in &self.constructors {
            out.push('\n');
            constructor.render(&mut out);
        }

        for method in &self.methods {
            out.push('\n');
            method.render(&mut out);
        }

        for variable in self.constants.iter().chain(self.variables.iter()) {
            for accessor in variable.accessor_methods(&self.name) {
                out.push('\n');
                accessor.render(&mut out);
            }
        }

        out.push_str("}\n");
        out
    }
}

/// Banner for files regenerated on every run
pub fn generated_file_header(class_name: &str) -> String {
    format!(
        "/*\n * {}.java\n *\n * GENERATED FILE - DO NOT EDIT\n * CHECKSTYLE:OFF\n * \n */",
        class_name
    )
}

/// Banner for scaffolds the user owns after the first run
pub fn user_file_header(class_name: &str, created: &str) -> String {
    format!("/*\n * {}.java\n *\n * Created: {}\n */", class_name, created)
}

/// Java string literal
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
