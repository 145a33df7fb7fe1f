//! Named variable sources consulted by the settings resolver

use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;

use contracts::ContractError;

use crate::parser::{self, ConfigFormat};

/// A named lookup of raw string values
pub trait VarSource: Send + Sync {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Look up `key`. A present-but-empty value is still `Some`.
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVars;

impl VarSource for EnvVars {
    fn name(&self) -> &str {
        "env"
    }

    /// A set but non-UTF-8 value is returned lossily so typed fields fail to parse
    fn lookup(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(raw)) => Some(raw.to_string_lossy().into_owned()),
        }
    }
}

/// In-memory values, mostly for tests and embedding
impl VarSource for HashMap<String, String> {
    fn name(&self) -> &str {
        "map"
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Values loaded from a settings file
#[derive(Debug, Clone)]
pub struct FileVars {
    name: String,
    vars: HashMap<String, String>,
}

impl FileVars {
    /// Load a settings file
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    pub fn load_from_path(path: &Path) -> Result<Self, ContractError> {
        let format = detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        let vars = parser::parse(&content, format)?;
        Ok(Self {
            name: path.display().to_string(),
            vars,
        })
    }

    /// Parse settings from a string
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<Self, ContractError> {
        Ok(Self {
            name: "inline".to_string(),
            vars: parser::parse(content, format)?,
        })
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VarSource for FileVars {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Infer configuration format from file extension
fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
    let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
        ContractError::config_parse("cannot determine file format from extension")
    })?;

    ConfigFormat::from_extension(ext)
        .ok_or_else(|| ContractError::config_parse(format!("unsupported config format: .{ext}")))
}
