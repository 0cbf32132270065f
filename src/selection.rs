//! Constructor selection and the instantiation contexts that carry it.
use std::fmt;
use std::sync::Arc;

use crate::context::TargetElement;
use crate::model::{ClassDescription, ConstructorDescription};

// ------------------------------- Policy ---------------------------------- //

/// Picks which constructor to synthesize a call for. Must be deterministic.
pub trait ConstructorSelector: Send + Sync {
    fn select(&self, class: &ClassDescription) -> Option<ConstructorDescription>;

    fn name(&self) -> &str { "custom" }
}

impl<F> ConstructorSelector for F
where
    F: Fn(&ClassDescription) -> Option<ConstructorDescription> + Send + Sync,
{
    fn select(&self, class: &ClassDescription) -> Option<ConstructorDescription> {
        self(class)
    }
}

/// Built-in policies. All of them refuse abstract classes and skip private
/// constructors; ties go to the earliest declared constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SelectionStrategy {
    #[default]
    FirstAccessible,
    MostParameters,
    FewestParameters,
}

impl ConstructorSelector for SelectionStrategy {
    fn select(&self, class: &ClassDescription) -> Option<ConstructorDescription> {
        if class.is_abstract {
            return None;
        }
        let mut accessible = class.constructors.iter().filter(|c| c.is_accessible());
        let picked = match self {
            SelectionStrategy::FirstAccessible => accessible.next(),
            // `max_by_key` keeps the last maximum; fold keeps the first.
            SelectionStrategy::MostParameters => accessible.fold(None, |best: Option<&ConstructorDescription>, c| {
                match best {
                    Some(b) if b.parameters.len() >= c.parameters.len() => Some(b),
                    _ => Some(c),
                }
            }),
            SelectionStrategy::FewestParameters => accessible.min_by_key(|c| c.parameters.len()),
        };
        picked.cloned()
    }

    fn name(&self) -> &str {
        match self {
            SelectionStrategy::FirstAccessible => "first-accessible",
            SelectionStrategy::MostParameters => "most-parameters",
            SelectionStrategy::FewestParameters => "fewest-parameters",
        }
    }
}

// ------------------------------- Contexts -------------------------------- //

/// A class to instantiate plus the policy to instantiate it with.
#[derive(Clone)]
pub struct ClassInstantiationContext {
    pub target_class: Arc<ClassDescription>,
    pub constructor_selector: Arc<dyn ConstructorSelector>,
    /// Classes currently being expanded above this one, outermost first.
    lineage: Vec<String>,
}

/// Handed to the per-type dispatcher for one constructor parameter.
#[derive(Clone)]
pub struct ElementInstantiationContext {
    pub target_element: TargetElement,
    pub constructor_selector: Arc<dyn ConstructorSelector>,
    lineage: Vec<String>,
}

impl ClassInstantiationContext {
    pub fn new(target_class: Arc<ClassDescription>, constructor_selector: Arc<dyn ConstructorSelector>) -> Self {
        Self { target_class, constructor_selector, lineage: Vec::new() }
    }

    pub fn for_element(&self, target_element: TargetElement) -> ElementInstantiationContext {
        let mut lineage = self.lineage.clone();
        lineage.push(self.target_class.qualified_name.clone());
        ElementInstantiationContext {
            target_element,
            constructor_selector: self.constructor_selector.clone(),
            lineage,
        }
    }

    /// True when the target class is already being expanded further up.
    pub fn is_cyclic(&self) -> bool {
        self.lineage.iter().any(|name| *name == self.target_class.qualified_name)
    }

    pub fn depth(&self) -> usize { self.lineage.len() }

    pub fn lineage(&self) -> &[String] { &self.lineage }
}

impl ElementInstantiationContext {
    /// Context for a nested class-typed value at this element.
    pub fn instantiate(&self, target_class: Arc<ClassDescription>) -> ClassInstantiationContext {
        ClassInstantiationContext {
            target_class,
            constructor_selector: self.constructor_selector.clone(),
            lineage: self.lineage.clone(),
        }
    }

    pub fn lineage(&self) -> &[String] { &self.lineage }
}

impl fmt::Debug for ClassInstantiationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInstantiationContext")
            .field("target_class", &self.target_class.qualified_name)
            .field("constructor_selector", &self.constructor_selector.name())
            .field("lineage", &self.lineage)
            .finish()
    }
}

impl fmt::Debug for ElementInstantiationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementInstantiationContext")
            .field("target_element", &self.target_element)
            .field("constructor_selector", &self.constructor_selector.name())
            .field("lineage", &self.lineage)
            .finish()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Dialect;
    use crate::model::{ParameterDescription, TypeRef, Visibility};

    fn ctor(arity: usize) -> ConstructorDescription {
        ConstructorDescription::new(
            (0..arity).map(|i| ParameterDescription::new(format!("p{i}"), TypeRef::Int)).collect(),
        )
    }

    fn sample() -> ClassDescription {
        ClassDescription::new("com.acme.Sample", Dialect::Primary)
            .with_constructor(ctor(3).with_visibility(Visibility::Private))
            .with_constructor(ctor(1))
            .with_constructor(ctor(2))
            .with_constructor(ctor(2).with_visibility(Visibility::Protected))
            .with_constructor(ctor(1).with_visibility(Visibility::Internal))
    }

    #[test]
    fn built_in_strategies_skip_private_constructors() {
        let class = sample();
        assert_eq!(SelectionStrategy::FirstAccessible.select(&class), Some(ctor(1)));
        assert_eq!(SelectionStrategy::MostParameters.select(&class), Some(ctor(2)));
        assert_eq!(SelectionStrategy::FewestParameters.select(&class), Some(ctor(1)));
    }

    #[test]
    fn ties_go_to_the_first_declared() {
        let class = sample();
        let most = SelectionStrategy::MostParameters.select(&class).unwrap();
        assert_eq!(most.visibility, Visibility::Public);
        let fewest = SelectionStrategy::FewestParameters.select(&class).unwrap();
        assert_eq!(fewest.visibility, Visibility::Public);
    }

    #[test]
    fn abstract_and_constructorless_classes_yield_none() {
        let abstract_class = sample().abstract_class();
        let bare = ClassDescription::new("com.acme.Bare", Dialect::Secondary);
        for strategy in [
            SelectionStrategy::FirstAccessible,
            SelectionStrategy::MostParameters,
            SelectionStrategy::FewestParameters,
        ] {
            assert_eq!(strategy.select(&abstract_class), None);
            assert_eq!(strategy.select(&bare), None);
        }
    }

    #[test]
    fn closures_are_selectors() {
        let last = |class: &ClassDescription| class.constructors.last().cloned();
        let class = sample();
        assert_eq!(last.select(&class).unwrap().visibility, Visibility::Internal);
        assert_eq!(last.name(), "custom");
    }

    #[test]
    fn lineage_grows_through_element_contexts() {
        let outer = Arc::new(ClassDescription::new("a.Outer", Dialect::Primary));
        let inner = Arc::new(ClassDescription::new("a.Inner", Dialect::Primary));
        let root = ClassInstantiationContext::new(outer.clone(), Arc::new(SelectionStrategy::default()));
        assert!(!root.is_cyclic());

        let element = root.for_element(TargetElement::Class { qualified_name: "a.Outer".into() });
        let nested = element.instantiate(inner);
        assert_eq!(nested.lineage(), ["a.Outer".to_string()]);
        assert_eq!(nested.depth(), 1);
        assert!(!nested.is_cyclic());

        let back = nested.for_element(TargetElement::Class { qualified_name: "a.Inner".into() }).instantiate(outer);
        assert!(back.is_cyclic());
    }
}
