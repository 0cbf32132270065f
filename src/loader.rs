//! Model documents: JSON → validated [`ClassRegistry`].
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::ModelError;
use crate::model::{ClassRegistry, ModelDocument, TypeRef};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());
static QUALIFIED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").unwrap());

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ModelError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ModelError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ModelError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| ModelError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Parse one document, optionally selecting a sub-node by JSON Pointer first.
pub fn parse_document(src: &str, json_pointer: Option<&str>) -> Result<ModelDocument, ModelError> {
    let Some(pointer) = json_pointer else {
        return from_str_with_path(src);
    };
    let mut root = from_str_with_path::<serde_json::Value>(src)?;
    let selected = root.pointer_mut(pointer).map(serde_json::Value::take).ok_or_else(|| ModelError::Parse {
        path: pointer.to_string(),
        message: "JSON pointer selects nothing".into(),
    })?;
    from_value_with_path(selected)
}

/// Merge documents into one registry, rejecting malformed names and
/// duplicate declarations (across documents too).
pub fn build_registry<I>(documents: I) -> Result<ClassRegistry, ModelError>
where
    I: IntoIterator<Item = ModelDocument>,
{
    let mut registry = ClassRegistry::new();
    for document in documents {
        for desc in document.enums {
            check_qualified_name(&desc.qualified_name)?;
            for constant in &desc.constants {
                check_identifier(&desc.qualified_name, constant)?;
            }
            if registry.enum_(&desc.qualified_name).is_some() {
                return Err(ModelError::Duplicate(desc.qualified_name));
            }
            registry.insert_enum(desc);
        }
        for class in document.classes {
            check_qualified_name(&class.qualified_name)?;
            for constructor in &class.constructors {
                for parameter in &constructor.parameters {
                    check_identifier(&class.qualified_name, &parameter.name)?;
                    check_type(&parameter.ty)?;
                }
            }
            if registry.class(&class.qualified_name).is_some() {
                return Err(ModelError::Duplicate(class.qualified_name));
            }
            registry.insert_class(class);
        }
    }
    Ok(registry)
}

fn check_qualified_name(name: &str) -> Result<(), ModelError> {
    if QUALIFIED_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidQualifiedName(name.to_string()))
    }
}

fn check_identifier(owner: &str, name: &str) -> Result<(), ModelError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidParameterName { owner: owner.to_string(), name: name.to_string() })
    }
}

/// Referenced names must at least look like names; whether they resolve is
/// decided at generation time.
fn check_type(ty: &TypeRef) -> Result<(), ModelError> {
    match ty {
        TypeRef::List { element } | TypeRef::Set { element } | TypeRef::Array { element } => check_type(element),
        TypeRef::Map { key, value } => {
            check_type(key)?;
            check_type(value)
        }
        TypeRef::Enum { name } | TypeRef::Class { name } => check_qualified_name(name),
        _ => Ok(()),
    }
}

// ------------------------------- Tests ------------------------------------ //
