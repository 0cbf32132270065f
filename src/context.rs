//! Construction context threaded through rendering.
use std::fmt;

use crate::model::{simple_name, ClassDescription, ParameterDescription};

/// Where a generated value is anchored. Only used for identity and
/// diagnostics; the generator never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetElement {
    Class { qualified_name: String },
    Parameter { owner: String, name: String },
}

/// Immutable; each recursion step derives a copy with overrides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldConstructionContext {
    pub field_name: String,
    pub target_element: TargetElement,
}

impl TargetElement {
    pub fn of_class(class: &ClassDescription) -> Self {
        TargetElement::Class { qualified_name: class.qualified_name.clone() }
    }
    pub fn of_parameter(owner: &str, parameter: &ParameterDescription) -> Self {
        TargetElement::Parameter { owner: owner.to_string(), name: parameter.name.clone() }
    }
}

impl fmt::Display for TargetElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetElement::Class { qualified_name } => f.write_str(qualified_name),
            TargetElement::Parameter { owner, name } => write!(f, "{owner}#{name}"),
        }
    }
}

impl FieldConstructionContext {
    pub fn new(field_name: impl Into<String>, target_element: TargetElement) -> Self {
        Self { field_name: field_name.into(), target_element }
    }

    /// Root context for a top-level class: `com.acme.Point` → field `point`.
    pub fn for_class(class: &ClassDescription) -> Self {
        Self::new(variable_name(&class.qualified_name), TargetElement::of_class(class))
    }

    pub fn with_field_name(&self, field_name: impl Into<String>) -> Self {
        Self { field_name: field_name.into(), ..self.clone() }
    }

    pub fn with_target_element(&self, target_element: TargetElement) -> Self {
        Self { target_element, ..self.clone() }
    }

    /// What a constructor parameter's value sees.
    pub fn for_parameter(&self, owner: &str, parameter: &ParameterDescription) -> Self {
        Self {
            field_name: parameter.name.clone(),
            target_element: TargetElement::of_parameter(owner, parameter),
        }
    }
}

fn variable_name(qualified_name: &str) -> String {
    let mut chars = simple_name(qualified_name).chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Dialect;

    #[test]
    fn root_context_uses_lowercased_simple_name() {
        let class = ClassDescription::new("com.acme.OrderLine", Dialect::Primary);
        let ctx = FieldConstructionContext::for_class(&class);
        assert_eq!(ctx.field_name, "orderLine");
        assert_eq!(ctx.target_element.to_string(), "com.acme.OrderLine");
    }

    #[test]
    fn overrides_leave_the_parent_context_untouched() {
        let class = ClassDescription::new("Point", Dialect::Primary);
        let root = FieldConstructionContext::for_class(&class);
        let param = ParameterDescription::new("x", crate::model::TypeRef::Int);
        let derived = root
            .with_field_name("x")
            .with_target_element(TargetElement::of_parameter("Point", &param));
        assert_eq!(root.field_name, "point");
        assert_eq!(derived.field_name, "x");
        assert_eq!(derived.target_element.to_string(), "Point#x");
    }
}
