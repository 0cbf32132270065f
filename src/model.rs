//! Abstract declaration model the generator works from.
//!
//! Nothing here knows about a host project model. An adapter (or a JSON model
//! file, see [`crate::loader`]) builds these descriptions once; the generator
//! only reads them.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::field::Dialect;

// ------------------------------- Types ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

/// Parameter/field types the dispatcher knows how to synthesize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    List { element: Box<TypeRef> },
    Set { element: Box<TypeRef> },
    Array { element: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Enum { name: String },
    Class { name: String },
    /// A type the model cannot describe (type variables, interfaces, ...).
    Opaque { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub dialect: Dialect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstructorDescription {
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub parameters: Vec<ParameterDescription>, // declaration order
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescription {
    pub qualified_name: String,
    /// Dialect the class is declared in. Gates argument flattening.
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub constructors: Vec<ConstructorDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescription {
    pub qualified_name: String,
    #[serde(default)]
    pub constants: Vec<String>,
}

/// Everything one model document declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub classes: Vec<ClassDescription>,
    #[serde(default)]
    pub enums: Vec<EnumDescription>,
}

/// Declarations by qualified name, in the order they were registered.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<ClassDescription>>,
    enums: IndexMap<String, Arc<EnumDescription>>,
}

// ------------------------------- Impls ----------------------------------- //

impl ParameterDescription {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self { name: name.into(), ty, dialect: Dialect::default() }
    }
}

impl ConstructorDescription {
    pub fn new(parameters: Vec<ParameterDescription>) -> Self {
        Self { visibility: Visibility::Public, parameters }
    }
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
    pub fn is_accessible(&self) -> bool {
        self.visibility != Visibility::Private
    }
}

impl ClassDescription {
    pub fn new(qualified_name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            dialect,
            is_abstract: false,
            constructors: Vec::new(),
        }
    }
    pub fn with_constructor(mut self, constructor: ConstructorDescription) -> Self {
        self.constructors.push(constructor);
        self
    }
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }
    /// Native = declared in the secondary dialect.
    pub fn is_native_to_secondary(&self) -> bool {
        self.dialect == Dialect::Secondary
    }
    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }
}

impl EnumDescription {
    pub fn new<I, S>(qualified_name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            qualified_name: qualified_name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }
}

impl ClassRegistry {
    pub fn new() -> Self { Self::default() }

    /// Returns the replaced description, if the name was already taken.
    pub fn insert_class(&mut self, class: ClassDescription) -> Option<Arc<ClassDescription>> {
        self.classes.insert(class.qualified_name.clone(), Arc::new(class))
    }
    pub fn insert_enum(&mut self, desc: EnumDescription) -> Option<Arc<EnumDescription>> {
        self.enums.insert(desc.qualified_name.clone(), Arc::new(desc))
    }
    pub fn class(&self, qualified_name: &str) -> Option<&Arc<ClassDescription>> {
        self.classes.get(qualified_name)
    }
    pub fn enum_(&self, qualified_name: &str) -> Option<&Arc<EnumDescription>> {
        self.enums.get(qualified_name)
    }
    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassDescription>> {
        self.classes.values()
    }
    pub fn class_count(&self) -> usize { self.classes.len() }
}

impl fmt::Display for TypeRef {
    /// Secondary-dialect spelling; used for explicit type arguments.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Boolean => f.write_str("Boolean"),
            TypeRef::Byte => f.write_str("Byte"),
            TypeRef::Short => f.write_str("Short"),
            TypeRef::Int => f.write_str("Int"),
            TypeRef::Long => f.write_str("Long"),
            TypeRef::Float => f.write_str("Float"),
            TypeRef::Double => f.write_str("Double"),
            TypeRef::Char => f.write_str("Char"),
            TypeRef::String => f.write_str("String"),
            TypeRef::List { element } => write!(f, "List<{element}>"),
            TypeRef::Set { element } => write!(f, "Set<{element}>"),
            TypeRef::Array { element } => write!(f, "Array<{element}>"),
            TypeRef::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            TypeRef::Enum { name } | TypeRef::Class { name } | TypeRef::Opaque { name } => {
                f.write_str(name)
            }
        }
    }
}

impl TypeRef {
    /// Primary-dialect spelling, boxed where a generic argument needs it.
    pub fn primary_name(&self) -> String {
        match self {
            TypeRef::Boolean => "Boolean".into(),
            TypeRef::Byte => "Byte".into(),
            TypeRef::Short => "Short".into(),
            TypeRef::Int => "Integer".into(),
            TypeRef::Long => "Long".into(),
            TypeRef::Float => "Float".into(),
            TypeRef::Double => "Double".into(),
            TypeRef::Char => "Character".into(),
            TypeRef::String => "String".into(),
            TypeRef::List { element } => format!("java.util.List<{}>", element.primary_name()),
            TypeRef::Set { element } => format!("java.util.Set<{}>", element.primary_name()),
            TypeRef::Array { element } => format!("{}[]", element.primary_array_component()),
            TypeRef::Map { key, value } => {
                format!("java.util.Map<{}, {}>", key.primary_name(), value.primary_name())
            }
            TypeRef::Enum { name } | TypeRef::Class { name } | TypeRef::Opaque { name } => name.clone(),
        }
    }

    /// Array components stay unboxed.
    pub fn primary_array_component(&self) -> String {
        match self {
            TypeRef::Boolean => "boolean".into(),
            TypeRef::Byte => "byte".into(),
            TypeRef::Short => "short".into(),
            TypeRef::Int => "int".into(),
            TypeRef::Long => "long".into(),
            TypeRef::Float => "float".into(),
            TypeRef::Double => "double".into(),
            TypeRef::Char => "char".into(),
            other => other.primary_name(),
        }
    }
}

pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name.rsplit('.').next().unwrap_or(qualified_name)
}

// ------------------------------- Tests ------------------------------------ //
