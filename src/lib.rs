//! Constructor-expression synthesis for test fixtures.
//!
//! Given a class description and a constructor selection policy,
//! [`class_gen::ClassGenerator`] builds a tree of [`field::InstantiationField`]s
//! that renders as a constructor call in either output dialect.
pub mod model;
pub mod context;
pub mod field;
pub mod selection;
pub mod class_gen;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod logging;
pub mod cli;

pub use class_gen::{ClassGenerator, ClassInstantiationField};
pub use context::{FieldConstructionContext, TargetElement};
pub use dispatch::{synthesize, FieldDispatcher, TypeDrivenDispatcher};
pub use error::{ModelError, SynthError};
pub use field::{Dialect, Form, InstantiationField};
pub use selection::{ClassInstantiationContext, ConstructorSelector, SelectionStrategy};
