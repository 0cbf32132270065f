//! Per-type field dispatch.
//!
//! The generator only sees [`FieldDispatcher`]. [`TypeDrivenDispatcher`] is the
//! registry-backed implementation used by the binary: literals for primitives,
//! one sample element for collections, first constant for enums, recursion
//! for class types.
use std::sync::Arc;

use crate::class_gen::ClassGenerator;
use crate::context::FieldConstructionContext;
use crate::error::SynthError;
use crate::field::{CallbackField, Dialect, Form, InstantiationField, NullField, ValueGenerator};
use crate::model::{ClassRegistry, ParameterDescription, TypeRef};
use crate::selection::{ClassInstantiationContext, ConstructorSelector, ElementInstantiationContext};

pub trait FieldDispatcher: Send + Sync {
    fn resolve_field_for_parameter(
        &self,
        parameter: &ParameterDescription,
        context: &ElementInstantiationContext,
    ) -> Result<Box<dyn InstantiationField>, SynthError>;
}

#[derive(Debug, Clone, Copy)]
pub struct TypeDrivenDispatcher<'r> {
    registry: &'r ClassRegistry,
}

type SharedField = Arc<dyn InstantiationField>;

// ------------------------------- Dispatch -------------------------------- //

impl<'r> TypeDrivenDispatcher<'r> {
    pub fn new(registry: &'r ClassRegistry) -> Self { Self { registry } }

    fn field_for_type(
        &self,
        parameter: &ParameterDescription,
        ty: &TypeRef,
        context: &ElementInstantiationContext,
    ) -> Result<Box<dyn InstantiationField>, SynthError> {
        let field: Box<dyn InstantiationField> = match ty {
            TypeRef::Boolean => Box::new(CallbackField::literal("false")),
            TypeRef::Int => Box::new(CallbackField::literal("0")),
            TypeRef::Long => Box::new(CallbackField::literal("0L")),
            TypeRef::Float => Box::new(CallbackField::literal("0.0f")),
            TypeRef::Double => Box::new(CallbackField::literal("0.0")),
            TypeRef::Char => Box::new(CallbackField::literal("'a'")),
            TypeRef::Byte => Box::new(narrowed_literal("byte", "toByte")),
            TypeRef::Short => Box::new(narrowed_literal("short", "toShort")),
            TypeRef::String => Box::new(string_literal()),
            TypeRef::List { element } => {
                let item = self.shared(parameter, element, context)?;
                Box::new(sequence_field("java.util.List.of", "listOf", element, item))
            }
            TypeRef::Set { element } => {
                let item = self.shared(parameter, element, context)?;
                Box::new(sequence_field("java.util.Set.of", "setOf", element, item))
            }
            TypeRef::Array { element } => {
                let item = self.shared(parameter, element, context)?;
                Box::new(array_field(element, item))
            }
            TypeRef::Map { key, value } => {
                let k = self.shared(parameter, key, context)?;
                let v = self.shared(parameter, value, context)?;
                Box::new(map_field(key, value, k, v))
            }
            TypeRef::Enum { name } => {
                let desc = self.registry.enum_(name).ok_or_else(|| SynthError::UnresolvedEnum {
                    parameter: parameter.name.clone(),
                    name: name.clone(),
                })?;
                match desc.constants.first() {
                    Some(constant) => Box::new(CallbackField::literal(format!("{name}.{constant}"))),
                    None => Box::new(NullField),
                }
            }
            TypeRef::Class { name } => {
                let class = self.registry.class(name).ok_or_else(|| SynthError::UnresolvedClass {
                    parameter: parameter.name.clone(),
                    name: name.clone(),
                })?;
                tracing::trace!("[dispatch] {} → {name} (lineage {:?})", parameter.name, context.lineage());
                ClassGenerator::new(self).generate_class(&context.instantiate(class.clone()))?
            }
            TypeRef::Opaque { .. } => {
                return Err(SynthError::UnsupportedType {
                    parameter: parameter.name.clone(),
                    ty: ty.clone(),
                });
            }
        };
        Ok(field)
    }

    fn shared(
        &self,
        parameter: &ParameterDescription,
        ty: &TypeRef,
        context: &ElementInstantiationContext,
    ) -> Result<SharedField, SynthError> {
        self.field_for_type(parameter, ty, context).map(Arc::from)
    }
}

impl FieldDispatcher for TypeDrivenDispatcher<'_> {
    fn resolve_field_for_parameter(
        &self,
        parameter: &ParameterDescription,
        context: &ElementInstantiationContext,
    ) -> Result<Box<dyn InstantiationField>, SynthError> {
        self.field_for_type(parameter, &parameter.ty, context)
    }
}

/// Build the synthesis tree for a registered class.
pub fn synthesize(
    registry: &ClassRegistry,
    qualified_name: &str,
    selector: Arc<dyn ConstructorSelector>,
) -> Result<Box<dyn InstantiationField>, SynthError> {
    let class = registry
        .class(qualified_name)
        .ok_or_else(|| SynthError::UnknownTarget(qualified_name.to_string()))?;
    let dispatcher = TypeDrivenDispatcher::new(registry);
    ClassGenerator::new(&dispatcher).generate_class(&ClassInstantiationContext::new(class.clone(), selector))
}

// ------------------------------- Literals -------------------------------- //

/// Quoted current field name. The secondary dialect also treats `$` as a
/// template marker.
fn string_literal() -> CallbackField {
    let primary = |ctx: &FieldConstructionContext| format!("\"{}\"", escape_string(&ctx.field_name, false));
    let secondary = |ctx: &FieldConstructionContext| format!("\"{}\"", escape_string(&ctx.field_name, true));
    CallbackField::new(ValueGenerator::neutral(primary).with_dialect(Dialect::Secondary, secondary))
}

fn escape_string(raw: &str, escape_dollar: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' if escape_dollar => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn narrowed_literal(primary_cast: &'static str, secondary_conversion: &'static str) -> CallbackField {
    CallbackField::new(
        ValueGenerator::constant("0")
            .with_dialect(Dialect::Primary, move |_| format!("({primary_cast}) 0"))
            .with_dialect(Dialect::Secondary, move |_| format!("0.{secondary_conversion}()")),
    )
}

/// Secondary flat form spells out the element type so nothing is inferred
/// across the dialect boundary.
fn sequence_field(primary_factory: &'static str, secondary_factory: &'static str, element: &TypeRef, item: SharedField) -> CallbackField {
    let type_argument = element.to_string();
    let (a, b, c) = (item.clone(), item.clone(), item);
    CallbackField::new(
        ValueGenerator::neutral(move |ctx| format!("{primary_factory}({})", a.as_constructor_argument(Dialect::Primary, ctx)))
            .with_cell(Dialect::Secondary, Form::ConstructorArgument, move |ctx| {
                format!("{secondary_factory}({})", b.as_constructor_argument(Dialect::Secondary, ctx))
            })
            .with_cell(Dialect::Secondary, Form::FlatValue, move |ctx| {
                format!("{secondary_factory}<{type_argument}>({})", c.as_flat_value(Dialect::Secondary, ctx))
            }),
    )
}

fn array_field(element: &TypeRef, item: SharedField) -> CallbackField {
    let component = element.primary_array_component();
    let type_argument = element.to_string();
    let (a, b, c) = (item.clone(), item.clone(), item);
    CallbackField::new(
        ValueGenerator::neutral(move |ctx| format!("new {component}[]{{{}}}", a.as_constructor_argument(Dialect::Primary, ctx)))
            .with_cell(Dialect::Secondary, Form::ConstructorArgument, move |ctx| {
                format!("arrayOf({})", b.as_constructor_argument(Dialect::Secondary, ctx))
            })
            .with_cell(Dialect::Secondary, Form::FlatValue, move |ctx| {
                format!("arrayOf<{type_argument}>({})", c.as_flat_value(Dialect::Secondary, ctx))
            }),
    )
}

fn map_field(key: &TypeRef, value: &TypeRef, k: SharedField, v: SharedField) -> CallbackField {
    let type_arguments = format!("{key}, {value}");
    let (ka, va) = (k.clone(), v.clone());
    let (kb, vb) = (k.clone(), v.clone());
    CallbackField::new(
        ValueGenerator::neutral(move |ctx| {
            format!("java.util.Map.of({})", map_entry(&*ka, &*va, Dialect::Primary, Form::ConstructorArgument, ctx, ", "))
        })
        .with_cell(Dialect::Secondary, Form::ConstructorArgument, move |ctx| {
            format!("mapOf({})", map_entry(&*kb, &*vb, Dialect::Secondary, Form::ConstructorArgument, ctx, " to "))
        })
        .with_cell(Dialect::Secondary, Form::FlatValue, move |ctx| {
            format!("mapOf<{type_arguments}>({})", map_entry(&*k, &*v, Dialect::Secondary, Form::FlatValue, ctx, " to "))
        }),
    )
}

fn map_entry(
    key: &dyn InstantiationField,
    value: &dyn InstantiationField,
    dialect: Dialect,
    form: Form,
    ctx: &FieldConstructionContext,
    separator: &str,
) -> String {
    format!("{}{separator}{}", key.render(dialect, form, ctx), value.render(dialect, form, ctx))
}

// ------------------------------- Tests ------------------------------------ //
