//! Instantiation fields: the nodes of the synthesis tree.
//!
//! Every node renders itself in four ways, one per (dialect, form) pair. Leaf
//! nodes that do not care about the distinction go through a
//! [`ValueGenerator`] table whose neutral fallback answers for any cell the
//! generator leaves empty.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::FieldConstructionContext;
use crate::model::ParameterDescription;

// ------------------------------- Types ----------------------------------- //

/// Output source syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Tolerates arbitrarily nested constructor calls anywhere.
    #[default]
    Primary,
    /// Nests only inside calls to its own native classes.
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    /// May contain nested inline constructor calls.
    #[value(name = "argument")]
    ConstructorArgument,
    /// Self-contained; relies on no inference across a dialect boundary.
    #[value(name = "flat")]
    FlatValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Null,
    Value,
    ClassInstantiation,
    ParameterBound,
}

pub type Render = Arc<dyn Fn(&FieldConstructionContext) -> String + Send + Sync>;

/// (dialect × form) table of render callbacks with a neutral fallback.
#[derive(Clone)]
pub struct ValueGenerator {
    cells: [[Option<Render>; 2]; 2],
    fallback: Render,
}

/// A node of the synthesis tree. Rendering is a pure read.
pub trait InstantiationField: fmt::Debug + Send + Sync {
    fn render(&self, dialect: Dialect, form: Form, context: &FieldConstructionContext) -> String;

    fn as_constructor_argument(&self, dialect: Dialect, context: &FieldConstructionContext) -> String {
        self.render(dialect, Form::ConstructorArgument, context)
    }

    fn as_flat_value(&self, dialect: Dialect, context: &FieldConstructionContext) -> String {
        self.render(dialect, Form::FlatValue, context)
    }

    fn kind(&self) -> FieldKind { FieldKind::Value }

    fn children(&self) -> &[Box<dyn InstantiationField>] { &[] }
}

/// Terminal leaf used when no constructor can be selected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullField;

/// Leaf backed by a [`ValueGenerator`].
#[derive(Debug, Clone)]
pub struct CallbackField {
    generator: ValueGenerator,
}

/// Decorator: the wrapped child sees the parameter as its field name and
/// target element.
#[derive(Debug)]
pub struct ParameterBoundField {
    owner: String,
    parameter: ParameterDescription,
    inner: [Box<dyn InstantiationField>; 1],
}

// ------------------------------- Impls ----------------------------------- //

impl Dialect {
    pub fn null_literal(self) -> &'static str {
        match self {
            Dialect::Primary => "null",
            Dialect::Secondary => "null",
        }
    }
    fn index(self) -> usize {
        match self {
            Dialect::Primary => 0,
            Dialect::Secondary => 1,
        }
    }
}

impl Form {
    fn index(self) -> usize {
        match self {
            Form::ConstructorArgument => 0,
            Form::FlatValue => 1,
        }
    }
}

impl ValueGenerator {
    /// Same callback for every cell.
    pub fn neutral(render: impl Fn(&FieldConstructionContext) -> String + Send + Sync + 'static) -> Self {
        Self { cells: Default::default(), fallback: Arc::new(render) }
    }

    pub fn constant(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::neutral(move |_| text.clone())
    }

    /// Fills both forms of `dialect`.
    pub fn with_dialect(
        self,
        dialect: Dialect,
        render: impl Fn(&FieldConstructionContext) -> String + Send + Sync + 'static,
    ) -> Self {
        let render: Render = Arc::new(render);
        let mut out = self;
        out.cells[dialect.index()] = [Some(render.clone()), Some(render)];
        out
    }

    pub fn with_cell(
        mut self,
        dialect: Dialect,
        form: Form,
        render: impl Fn(&FieldConstructionContext) -> String + Send + Sync + 'static,
    ) -> Self {
        self.cells[dialect.index()][form.index()] = Some(Arc::new(render));
        self
    }

    pub fn generate(&self, dialect: Dialect, form: Form, context: &FieldConstructionContext) -> String {
        match &self.cells[dialect.index()][form.index()] {
            Some(render) => render(context),
            None => (self.fallback)(context),
        }
    }
}

impl fmt::Debug for ValueGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.cells.iter().flatten().filter(|c| c.is_some()).count();
        f.debug_struct("ValueGenerator").field("specialized_cells", &filled).finish()
    }
}

impl InstantiationField for NullField {
    fn render(&self, dialect: Dialect, _form: Form, _context: &FieldConstructionContext) -> String {
        dialect.null_literal().to_string()
    }
    fn kind(&self) -> FieldKind { FieldKind::Null }
}

impl CallbackField {
    pub fn new(generator: ValueGenerator) -> Self { Self { generator } }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(ValueGenerator::constant(text))
    }
}

impl InstantiationField for CallbackField {
    fn render(&self, dialect: Dialect, form: Form, context: &FieldConstructionContext) -> String {
        self.generator.generate(dialect, form, context)
    }
}

impl ParameterBoundField {
    pub fn new(owner: impl Into<String>, parameter: ParameterDescription, inner: Box<dyn InstantiationField>) -> Self {
        Self { owner: owner.into(), parameter, inner: [inner] }
    }

    fn bind(&self, context: &FieldConstructionContext) -> FieldConstructionContext {
        context.for_parameter(&self.owner, &self.parameter)
    }
}

impl InstantiationField for ParameterBoundField {
    fn render(&self, dialect: Dialect, form: Form, context: &FieldConstructionContext) -> String {
        self.inner[0].render(dialect, form, &self.bind(context))
    }
    fn kind(&self) -> FieldKind { FieldKind::ParameterBound }
    fn children(&self) -> &[Box<dyn InstantiationField>] { &self.inner }
}

// ------------------------------- Tests ------------------------------------ //
