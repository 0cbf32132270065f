//! Class instantiation: constructor selection, per-parameter fields, and the
//! dual-dialect constructor call rendering.
//!
//! Primary-dialect calls always nest their arguments inline. Secondary-dialect
//! calls nest only when the class being constructed is itself native to the
//! secondary dialect; a foreign class gets every argument in flat form.
use crate::context::{FieldConstructionContext, TargetElement};
use crate::dispatch::FieldDispatcher;
use crate::error::SynthError;
use crate::field::{Dialect, FieldKind, Form, InstantiationField, NullField, ParameterBoundField};
use crate::model::{ClassDescription, ParameterDescription};
use crate::selection::ClassInstantiationContext;

const ARGUMENT_SEPARATOR: &str = ", ";

// ------------------------------- Field ----------------------------------- //

#[derive(Debug)]
pub struct ClassInstantiationField {
    qualified_name: String,
    native_to_secondary: bool,
    arguments: Vec<Box<dyn InstantiationField>>, // constructor parameter order
}

impl ClassInstantiationField {
    pub fn new(target_class: &ClassDescription, arguments: Vec<Box<dyn InstantiationField>>) -> Self {
        Self {
            qualified_name: target_class.qualified_name.clone(),
            native_to_secondary: target_class.is_native_to_secondary(),
            arguments,
        }
    }

    fn argument_list(&self, dialect: Dialect, context: &FieldConstructionContext) -> String {
        let form = match dialect {
            Dialect::Primary => Form::ConstructorArgument,
            Dialect::Secondary if self.native_to_secondary => Form::ConstructorArgument,
            Dialect::Secondary => Form::FlatValue,
        };
        self.arguments
            .iter()
            .map(|arg| arg.render(dialect, form, context))
            .collect::<Vec<_>>()
            .join(ARGUMENT_SEPARATOR)
    }
}

impl InstantiationField for ClassInstantiationField {
    /// Both forms render the same call; the form only matters for the
    /// arguments, and that is decided by the target class.
    fn render(&self, dialect: Dialect, _form: Form, context: &FieldConstructionContext) -> String {
        format!("{}({})", self.qualified_name, self.argument_list(dialect, context))
    }
    fn kind(&self) -> FieldKind { FieldKind::ClassInstantiation }
    fn children(&self) -> &[Box<dyn InstantiationField>] { &self.arguments }
}

// ------------------------------- Generator -------------------------------- //

pub struct ClassGenerator<'d> {
    dispatcher: &'d dyn FieldDispatcher,
}

impl<'d> ClassGenerator<'d> {
    pub fn new(dispatcher: &'d dyn FieldDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Build the synthesis tree for `context.target_class`.
    ///
    /// No selectable constructor → [`NullField`]. A class already being
    /// expanded further up the tree also yields [`NullField`], so
    /// self-referential class graphs terminate. Dispatcher errors propagate.
    pub fn generate_class(&self, context: &ClassInstantiationContext) -> Result<Box<dyn InstantiationField>, SynthError> {
        let target_class = &context.target_class;
        if context.is_cyclic() {
            tracing::warn!(
                "[class_gen] cycle through {} (lineage {:?}), emitting null",
                target_class.qualified_name,
                context.lineage()
            );
            return Ok(Box::new(NullField));
        }
        let Some(constructor) = context.constructor_selector.select(target_class) else {
            tracing::debug!(
                "[class_gen] {} has no constructor under {}, emitting null",
                target_class.qualified_name,
                context.constructor_selector.name()
            );
            return Ok(Box::new(NullField));
        };
        tracing::debug!(
            "[class_gen] {} via {}-parameter constructor (depth {})",
            target_class.qualified_name,
            constructor.parameters.len(),
            context.depth()
        );

        let arguments = constructor
            .parameters
            .into_iter()
            .map(|parameter| self.parameter_field(parameter, context))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(ClassInstantiationField::new(target_class, arguments)))
    }

    fn parameter_field(
        &self,
        parameter: ParameterDescription,
        context: &ClassInstantiationContext,
    ) -> Result<Box<dyn InstantiationField>, SynthError> {
        let owner = &context.target_class.qualified_name;
        tracing::trace!("[class_gen] {owner}#{}: {}", parameter.name, parameter.ty);
        let element = context.for_element(TargetElement::of_parameter(owner, &parameter));
        let field = self.dispatcher.resolve_field_for_parameter(&parameter, &element)?;
        Ok(Box::new(ParameterBoundField::new(owner.clone(), parameter, field)))
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::field::{CallbackField, ValueGenerator};
    use crate::model::{ConstructorDescription, TypeRef};
    use crate::selection::{ElementInstantiationContext, SelectionStrategy};

    /// Ints render `0`, strings echo their field name, opaque types fail,
    /// anything else is a stub whose secondary forms differ.
    struct StubDispatcher;

    impl FieldDispatcher for StubDispatcher {
        fn resolve_field_for_parameter(
            &self,
            parameter: &ParameterDescription,
            _context: &ElementInstantiationContext,
        ) -> Result<Box<dyn InstantiationField>, SynthError> {
            match &parameter.ty {
                TypeRef::Int => Ok(Box::new(CallbackField::literal("0"))),
                TypeRef::String => Ok(Box::new(CallbackField::new(ValueGenerator::neutral(|c| c.field_name.clone())))),
                TypeRef::Opaque { .. } => Err(SynthError::UnsupportedType {
                    parameter: parameter.name.clone(),
                    ty: parameter.ty.clone(),
                }),
                _ => Ok(Box::new(CallbackField::new(
                    ValueGenerator::constant("Inner(1)")
                        .with_cell(Dialect::Secondary, Form::FlatValue, |_| "innerFlatValue".into()),
                ))),
            }
        }
    }

    fn context(class: ClassDescription, selector: SelectionStrategy) -> ClassInstantiationContext {
        ClassInstantiationContext::new(Arc::new(class), Arc::new(selector))
    }

    fn point(dialect: Dialect) -> ClassDescription {
        ClassDescription::new("Point", dialect).with_constructor(ConstructorDescription::new(vec![
            ParameterDescription::new("x", TypeRef::Int),
            ParameterDescription::new("y", TypeRef::Int),
        ]))
    }

    fn outer(dialect: Dialect) -> ClassDescription {
        ClassDescription::new("Outer", dialect).with_constructor(ConstructorDescription::new(vec![
            ParameterDescription::new("inner", TypeRef::Class { name: "Inner".into() }),
        ]))
    }

    fn root_ctx(class: &ClassDescription) -> FieldConstructionContext {
        FieldConstructionContext::for_class(class)
    }

    #[test]
    fn point_renders_positionally_in_primary() {
        let class = point(Dialect::Primary);
        let field = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FirstAccessible))
            .unwrap();
        assert_eq!(field.as_constructor_argument(Dialect::Primary, &root_ctx(&class)), "Point(0, 0)");
    }

    #[test]
    fn children_follow_declared_parameter_order() {
        let names = ["c", "a", "b"];
        let class = ClassDescription::new("Triple", Dialect::Primary).with_constructor(ConstructorDescription::new(
            names.iter().map(|n| ParameterDescription::new(*n, TypeRef::String)).collect(),
        ));
        let field = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FirstAccessible))
            .unwrap();
        assert_eq!(field.kind(), FieldKind::ClassInstantiation);
        assert_eq!(field.children().len(), 3);
        assert!(field.children().iter().all(|child| child.kind() == FieldKind::ParameterBound));
        assert_eq!(field.as_constructor_argument(Dialect::Primary, &root_ctx(&class)), "Triple(c, a, b)");
    }

    #[test]
    fn no_selectable_constructor_yields_null_in_both_dialects() {
        let class = point(Dialect::Secondary).abstract_class();
        let field = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FirstAccessible))
            .unwrap();
        assert_eq!(field.kind(), FieldKind::Null);
        assert_eq!(field.as_constructor_argument(Dialect::Primary, &root_ctx(&class)), "null");
        assert_eq!(field.as_constructor_argument(Dialect::Secondary, &root_ctx(&class)), "null");
    }

    #[test]
    fn native_secondary_target_nests_arguments() {
        let class = outer(Dialect::Secondary);
        let field = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FirstAccessible))
            .unwrap();
        assert_eq!(field.as_constructor_argument(Dialect::Secondary, &root_ctx(&class)), "Outer(Inner(1))");
    }

    #[test]
    fn foreign_target_flattens_arguments_in_secondary() {
        let class = outer(Dialect::Primary);
        let field = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FirstAccessible))
            .unwrap();
        assert_eq!(field.as_constructor_argument(Dialect::Secondary, &root_ctx(&class)), "Outer(innerFlatValue)");
        assert_eq!(field.as_flat_value(Dialect::Secondary, &root_ctx(&class)), "Outer(innerFlatValue)");
    }

    #[test]
    fn primary_rendering_ignores_origin() {
        let generator = ClassGenerator::new(&StubDispatcher);
        let native = generator.generate_class(&context(outer(Dialect::Secondary), SelectionStrategy::FirstAccessible)).unwrap();
        let foreign = generator.generate_class(&context(outer(Dialect::Primary), SelectionStrategy::FirstAccessible)).unwrap();
        let ctx = root_ctx(&outer(Dialect::Primary));
        for form in [Form::ConstructorArgument, Form::FlatValue] {
            assert_eq!(native.render(Dialect::Primary, form, &ctx), foreign.render(Dialect::Primary, form, &ctx));
        }
        assert_eq!(native.as_constructor_argument(Dialect::Primary, &ctx), "Outer(Inner(1))");
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let class = outer(Dialect::Primary);
        let field = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FirstAccessible))
            .unwrap();
        let ctx = root_ctx(&class);
        assert_eq!(field.as_flat_value(Dialect::Secondary, &ctx), field.as_flat_value(Dialect::Secondary, &ctx));
    }

    #[test]
    fn dispatcher_errors_fail_the_whole_call() {
        let class = ClassDescription::new("Holder", Dialect::Primary).with_constructor(ConstructorDescription::new(vec![
            ParameterDescription::new("ok", TypeRef::Int),
            ParameterDescription::new("value", TypeRef::Opaque { name: "T".into() }),
        ]));
        let err = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class, SelectionStrategy::FirstAccessible))
            .unwrap_err();
        assert_eq!(err, SynthError::UnsupportedType {
            parameter: "value".into(),
            ty: TypeRef::Opaque { name: "T".into() },
        });
    }

    #[test]
    fn policy_choice_drives_the_arity() {
        let class = point(Dialect::Primary).with_constructor(ConstructorDescription::default());
        let fewest = ClassGenerator::new(&StubDispatcher)
            .generate_class(&context(class.clone(), SelectionStrategy::FewestParameters))
            .unwrap();
        assert_eq!(fewest.as_constructor_argument(Dialect::Primary, &root_ctx(&class)), "Point()");
    }
}
