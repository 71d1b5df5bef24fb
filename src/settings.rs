use std::collections::HashMap;
use std::path::Path;

// config lets you read a separate config file, overridden by the environment
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

/// Knobs of the compiler, read from `hedge-compiler.toml` (or any file given
/// explicitly) and `HEDGE_COMPILER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Fail a compile on warnings too.
    pub warnings_as_errors: bool,
    /// Direction of sort items without one, by dialect name.
    pub default_descending: HashMap<String, bool>,
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
}
impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            warnings_as_errors: false,
            default_descending: HashMap::new(),
            log_filter: "info".to_string(),
        }
    }
}
impl CompilerSettings {
    pub fn load(path: Option<&Path>) -> Result<CompilerSettings> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("hedge-compiler").required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("HEDGE_COMPILER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
    pub fn default_descending(&self, dialect: &str) -> Option<bool> {
        self.default_descending.get(dialect).copied()
    }
}
