//! Golden-case runner: each `cases/*.json` holds a model, a class to build,
//! and the exact text expected per (dialect, form).
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;

use fixgen::model::ModelDocument;
use fixgen::{Dialect, FieldConstructionContext, Form, SelectionStrategy};

#[derive(Debug, Deserialize)]
struct GoldenCase {
    name: String,
    model: ModelDocument,
    class: String,
    expect: Vec<Expectation>,
}

#[derive(Debug, Deserialize)]
struct Expectation {
    dialect: Dialect,
    form: Form,
    text: String,
}

fn run_case(path: &Path) -> Result<Vec<String>> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let case: GoldenCase = fixgen::loader::from_str_with_path(&source)?;
    let registry = fixgen::loader::build_registry([case.model])?;
    let field = fixgen::synthesize(&registry, &case.class, Arc::new(SelectionStrategy::default()))?;
    let class = registry.class(&case.class).context("class vanished from registry")?;
    let root = FieldConstructionContext::for_class(class);

    let mut failures = Vec::new();
    for expectation in &case.expect {
        let actual = field.render(expectation.dialect, expectation.form, &root);
        if actual != expectation.text {
            failures.push(format!(
                "[{}] {:?}/{:?}\n    expected: {}\n    actual:   {}",
                case.name, expectation.dialect, expectation.form, expectation.text, actual
            ));
        }
    }
    Ok(failures)
}

fn main() -> Result<()> {
    let pattern = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("{}/cases/*.json", env!("CARGO_MANIFEST_DIR")));
    let paths = glob::glob(&pattern)?.collect::<Result<Vec<PathBuf>, _>>()?;
    anyhow::ensure!(!paths.is_empty(), "no cases match {pattern}");

    let mut failed = 0usize;
    for path in &paths {
        match run_case(path) {
            Ok(failures) if failures.is_empty() => eprintln!("✅ {}", path.display()),
            Ok(failures) => {
                failed += 1;
                eprintln!("❌ {}", path.display().to_string().red());
                for failure in failures {
                    eprintln!("  {failure}");
                }
            }
            Err(error) => {
                failed += 1;
                eprintln!("❌ {}: {error:#}", path.display().to_string().red());
            }
        }
    }

    eprintln!("{} cases, {} failed", paths.len(), failed);
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
