//! Minimal CLI: load models → (render one class | batch all classes)
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::context::FieldConstructionContext;
use crate::dispatch::synthesize;
use crate::field::{Dialect, Form};
use crate::loader::{build_registry, parse_document};
use crate::model::ClassRegistry;
use crate::selection::{ConstructorSelector, SelectionStrategy};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// synthesize constructor-call expressions for classes described in JSON model files
#[derive(Parser, Debug)]
#[command(name = "fixgen")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render one class as a constructor expression
    Render(RenderOut),
    /// render every concrete class; prints a JSON object keyed by class name
    Batch(BatchOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer selecting the model inside each document (e.g. /data/model)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more model files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct RenderSettings {
    /// output dialect
    #[arg(long, value_enum, default_value_t = Dialect::Primary)]
    dialect: Dialect,

    /// rendering form of the outermost expression
    #[arg(long, value_enum, default_value_t = Form::ConstructorArgument)]
    form: Form,

    /// constructor selection policy
    #[arg(long, value_enum, default_value_t = SelectionStrategy::FirstAccessible)]
    policy: SelectionStrategy,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    render_settings: RenderSettings,

    /// qualified name of the class to build
    #[arg(long = "class")]
    class_name: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct BatchOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    render_settings: RenderSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_registry(&self) -> Result<ClassRegistry> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut documents = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read model file {}", source_path.display()))?;
            let document = parse_document(&source, self.json_pointer.as_deref())
                .with_context(|| format!("failed to parse model file {}", source_path.display()))?;
            tracing::debug!(
                "[cli] {}: {} classes, {} enums",
                source_path.display(),
                document.classes.len(),
                document.enums.len()
            );
            documents.push(document);
        }
        Ok(build_registry(documents)?)
    }
}

impl RenderSettings {
    fn render(&self, registry: &ClassRegistry, class_name: &str) -> Result<String> {
        let selector: Arc<dyn ConstructorSelector> = Arc::new(self.policy);
        let field = synthesize(registry, class_name, selector)
            .with_context(|| format!("failed to synthesize {class_name}"))?;
        let class = registry
            .class(class_name)
            .with_context(|| format!("unknown class {class_name}"))?;
        Ok(field.render(self.dialect, self.form, &FieldConstructionContext::for_class(class)))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Render(target) => {
                let registry = target.input_settings.load_registry()?;
                let source = target.render_settings.render(&registry, &target.class_name)?;
                write_output(target.out.as_ref(), &source)
            }
            Command::Batch(target) => {
                let registry = target.input_settings.load_registry()?;
                let concrete = registry.classes().filter(|c| !c.is_abstract).collect::<Vec<_>>();
                let rendered = concrete
                    .par_iter()
                    .map(|class| {
                        let name = class.qualified_name.clone();
                        target.render_settings.render(&registry, &name).map(|src| (name, src))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let rendered: IndexMap<String, String> = rendered.into_iter().collect();
                let json_src = serde_json::to_string_pretty(&rendered)?;
                write_output(target.out.as_ref(), &json_src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&PathBuf>, source: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, source).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{source}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    const INNER: &str = r#"{"classes": [{"qualified_name": "com.acme.Inner", "dialect": "secondary",
        "constructors": [{"parameters": [{"name": "id", "type": {"kind": "int"}}]}]}]}"#;
    const OUTER: &str = r#"{"classes": [
        {"qualified_name": "com.acme.Outer",
         "constructors": [{"parameters": [{"name": "inner", "type": {"kind": "class", "name": "com.acme.Inner"}}]}]},
        {"qualified_name": "com.acme.Shape", "abstract": true}
    ]}"#;

    fn write_models(dir: &tempfile::TempDir) {
        std::fs::write(dir.path().join("inner.json"), INNER).unwrap();
        std::fs::write(dir.path().join("outer.json"), OUTER).unwrap();
    }

    #[test]
    fn render_merges_globbed_models() {
        let dir = tempfile::tempdir().unwrap();
        write_models(&dir);
        let out = dir.path().join("out/outer.kt");
        let pattern = format!("{}/*.json", dir.path().display());
        let cli = CommandLineInterface::try_parse_from([
            "fixgen", "render", "-i", pattern.as_str(), "--class", "com.acme.Outer",
            "--dialect", "secondary", "-o", out.to_str().unwrap(),
        ])
        .unwrap();
        cli.run().unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "com.acme.Outer(com.acme.Inner(0))");
    }

    #[test]
    fn batch_skips_abstract_classes_and_keeps_model_order() {
        let dir = tempfile::tempdir().unwrap();
        write_models(&dir);
        let out = dir.path().join("batch.json");
        let inner = dir.path().join("inner.json");
        let outer = dir.path().join("outer.json");
        let cli = CommandLineInterface::try_parse_from([
            "fixgen", "batch", "-i", inner.to_str().unwrap(), outer.to_str().unwrap(),
            "-o", out.to_str().unwrap(),
        ])
        .unwrap();
        cli.run().unwrap();
        let written: IndexMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        let keys: Vec<_> = written.keys().map(String::as_str).collect();
        assert_eq!(keys, ["com.acme.Inner", "com.acme.Outer"]);
        assert_eq!(written["com.acme.Outer"], "com.acme.Outer(com.acme.Inner(0))");
    }

    #[test]
    fn unmatched_globs_and_unknown_classes_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_file_path_patterns([format!("{}/*.json", dir.path().display())]).is_err());

        write_models(&dir);
        let inner = dir.path().join("inner.json");
        let cli = CommandLineInterface::try_parse_from([
            "fixgen", "render", "-i", inner.to_str().unwrap(), "--class", "com.acme.Missing",
        ])
        .unwrap();
        assert!(cli.run().is_err());
    }
}
