//! Host-language symbol table: the classes, methods and fields references
//! resolve to.
//!
//! The resolution engine only needs a narrow slice of the host language:
//! class lookup by qualified and simple name, class-name enumeration,
//! member introspection and, for workflow scopes, the literal value a return
//! statement yields. [`SymbolTable`] is that slice; [`MemorySymbolTable`] is
//! an in-memory implementation fed by whatever parses the host sources.

mod matcher;
mod table;

use std::sync::Arc;

use crate::base::path;

pub use matcher::CamelHumpMatcher;
pub use table::MemorySymbolTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

/// What a `return` statement returns, as far as static inspection can tell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnExpr {
    /// A string literal, quotes included.
    Literal(Arc<str>),
    /// `Owner::NAME`. `class` is `None` for `self::` and `static::`.
    ClassConstant { class: Option<Arc<str>>, name: Arc<str> },
    /// Anything else, kept as source text.
    Other(Arc<str>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodEntity {
    pub name: Arc<str>,
    pub is_static: bool,
    /// Return statements in source order.
    pub returns: Vec<ReturnExpr>,
}

impl MethodEntity {
    /// A public instance method.
    pub fn instance(name: &str) -> Self {
        Self { name: Arc::from(name), is_static: false, returns: Vec::new() }
    }

    /// A public static method.
    pub fn static_method(name: &str) -> Self {
        Self { is_static: true, ..Self::instance(name) }
    }

    /// Add a statement the method returns.
    pub fn returning(mut self, expr: ReturnExpr) -> Self {
        self.returns.push(expr);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldEntity {
    pub name: Arc<str>,
    pub is_constant: bool,
    /// Default value as source text.
    pub default_value: Option<Arc<str>>,
}

impl FieldEntity {
    /// A property without default value.
    pub fn property(name: &str) -> Self {
        Self { name: Arc::from(name), is_constant: false, default_value: None }
    }

    /// A class constant with its default value.
    pub fn constant(name: &str, default_value: &str) -> Self {
        Self { name: Arc::from(name), is_constant: true, default_value: Some(Arc::from(default_value)) }
    }
}

/// A class, interface or trait of the host language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntity {
    /// Fully-qualified name without leading separator.
    pub fqn: Arc<str>,
    pub kind: ClassKind,
    /// Canonical path of the declaring file, when known.
    pub file_path: Option<Arc<str>>,
    pub methods: Vec<MethodEntity>,
    pub fields: Vec<FieldEntity>,
}

impl ClassEntity {
    /// Create a class; a leading separator is dropped.
    pub fn new(fqn: &str) -> Self {
        Self {
            fqn: Arc::from(fqn.trim_start_matches('\\')),
            kind: ClassKind::Class,
            file_path: None,
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Set the declaration kind.
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the declaring file path.
    pub fn in_file(mut self, path: &str) -> Self {
        self.file_path = Some(Arc::from(path));
        self
    }

    /// Add a method.
    pub fn with_method(mut self, method: MethodEntity) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldEntity) -> Self {
        self.fields.push(field);
        self
    }

    /// Unqualified class name.
    pub fn name(&self) -> &str {
        path::simple_name(&self.fqn)
    }

    /// Namespace without separators at either end (`Acme\Demo`).
    pub fn namespace(&self) -> &str {
        path::namespace_of(&self.fqn)
    }

    /// Namespace wrapped in separators (`\Acme\Demo\`), convenient for
    /// segment containment checks.
    pub fn namespace_name(&self) -> String {
        let namespace = self.namespace();
        if namespace.is_empty() { "\\".to_string() } else { format!("\\{namespace}\\") }
    }

    /// Check if this is an interface declaration.
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Check if this is a trait declaration.
    pub fn is_trait(&self) -> bool {
        self.kind == ClassKind::Trait
    }

    /// Method by name, ignoring case.
    pub fn method(&self, name: &str) -> Option<&MethodEntity> {
        self.methods.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Field by name.
    pub fn field(&self, name: &str) -> Option<&FieldEntity> {
        self.fields.iter().find(|f| f.name.as_ref() == name)
    }
}

/// Lookup service over the host language's classes.
pub trait SymbolTable: Send + Sync {
    /// Classes declared with exactly this fully-qualified name.
    fn classes_by_fqn(&self, fqn: &str) -> Vec<Arc<ClassEntity>>;

    /// Classes whose simple name is exactly `name`.
    fn classes_by_name(&self, name: &str) -> Vec<Arc<ClassEntity>>;

    /// Distinct simple class names accepted by `matcher`, in index order.
    fn all_class_names(&self, matcher: &CamelHumpMatcher) -> Vec<Arc<str>>;

    /// Classes whose simple name camel-hump start-matches `prefix`.
    fn classes_by_name_prefix(&self, prefix: &str) -> Vec<Arc<ClassEntity>> {
        let matcher = CamelHumpMatcher::new(prefix);
        self.all_class_names(&matcher)
            .into_iter()
            .filter(|name| matcher.is_start_match(name))
            .flat_map(|name| self.classes_by_name(&name))
            .collect()
    }

    /// The literal string a return expression statically yields, quotes
    /// stripped. Class constants resolve to their default value.
    fn resolve_return(&self, owner: &ClassEntity, expr: &ReturnExpr) -> Option<String> {
        match expr {
            ReturnExpr::Literal(text) => Some(path::strip_quotes(text).to_string()),
            ReturnExpr::ClassConstant { class, name } => {
                let owners = match class {
                    None => vec![Arc::new(owner.clone())],
                    Some(class) => self.classes_by_fqn(class),
                };
                owners.iter().find_map(|owner| {
                    owner
                        .field(name)
                        .filter(|field| field.is_constant)
                        .and_then(|field| field.default_value.as_deref())
                        .map(|value| path::strip_quotes(value).to_string())
                })
            }
            ReturnExpr::Other(_) => None,
        }
    }
}
