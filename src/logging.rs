//! Tracing setup for the binary.
//!
//! `FIXGEN_LOG` (or `RUST_LOG`) turns the subscriber on; `FIXGEN_LOG_FORMAT`
//! picks `text` (default) or `json`. Output goes to stderr so stdout stays
//! clean for generated source.
//!
//! ```bash
//! FIXGEN_LOG=debug fixgen render -i model.json --class com.acme.Point
//! FIXGEN_LOG="fixgen::class_gen=trace" FIXGEN_LOG_FORMAT=json fixgen batch -i 'models/*.json'
//! ```
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

fn build_filter() -> EnvFilter {
    match std::env::var("FIXGEN_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Does nothing unless `FIXGEN_LOG` or `RUST_LOG` is set.
pub fn init_tracing() {
    if std::env::var("FIXGEN_LOG").is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }
    let format = LogFormat::parse(&std::env::var("FIXGEN_LOG_FORMAT").unwrap_or_default());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_formats_fall_back_to_text() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("tree"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }
}
