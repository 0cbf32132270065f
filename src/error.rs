use thiserror::Error;

use crate::model::TypeRef;

/// Failures while building a synthesis tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SynthError {
    #[error("parameter `{parameter}` refers to unknown class `{name}`")]
    UnresolvedClass { parameter: String, name: String },
    #[error("parameter `{parameter}` refers to unknown enum `{name}`")]
    UnresolvedEnum { parameter: String, name: String },
    #[error("cannot synthesize a value for parameter `{parameter}` of type `{ty}`")]
    UnsupportedType { parameter: String, ty: TypeRef },
    #[error("unknown class `{0}`")]
    UnknownTarget(String),
}

/// Failures while loading a model document.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },
    #[error("invalid qualified name `{0}`")]
    InvalidQualifiedName(String),
    #[error("invalid parameter name `{name}` in `{owner}`")]
    InvalidParameterName { owner: String, name: String },
    #[error("`{0}` is declared more than once")]
    Duplicate(String),
}
