// Parameter Loaders
// Pluggable parsers for the two parameter file formats

use crate::error::{PipelineError, PipelineResult};
use crate::params::store::ParameterStore;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Parses the text of a parameter file into a store
pub trait ParameterLoader {
    fn parse(&self, content: &str, strict: bool) -> PipelineResult<ParameterStore>;
}

/// Supported parameter file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFormat {
    /// One `key: value` record per line (`parameters.yml`)
    KeyValue,
    /// Header row, then `stage<TAB>script<TAB>name<TAB>value` rows (`parameters.tsv`)
    Tabular,
}

impl ParameterFormat {
    /// Infer the format from a file extension; anything but `.tsv` is key-value
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => ParameterFormat::Tabular,
            _ => ParameterFormat::KeyValue,
        }
    }

    pub fn loader(&self) -> Box<dyn ParameterLoader> {
        match self {
            ParameterFormat::KeyValue => Box::new(KeyValueLoader),
            ParameterFormat::Tabular => Box::new(TabularLoader),
        }
    }
}

impl FromStr for ParameterFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "key-value" | "keyvalue" | "yml" | "yaml" => Ok(ParameterFormat::KeyValue),
            "tabular" | "tsv" => Ok(ParameterFormat::Tabular),
            other => Err(format!(
                "unknown parameter format '{}' (expected 'key-value' or 'tabular')",
                other
            )),
        }
    }
}

impl fmt::Display for ParameterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterFormat::KeyValue => write!(f, "key-value"),
            ParameterFormat::Tabular => write!(f, "tabular"),
        }
    }
}

/// Loader for `key: value` files
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueLoader;

impl ParameterLoader for KeyValueLoader {
    fn parse(&self, content: &str, strict: bool) -> PipelineResult<ParameterStore> {
        let mut store = ParameterStore::default();

        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = match line.split_once(':') {
                Some((key, value)) if !key.trim().is_empty() => (key.trim(), value.trim()),
                _ => {
                    return Err(PipelineError::MalformedParameterRecord {
                        line: line_number,
                        content: raw.to_string(),
                    })
                }
            };

            store.insert_record(key, strip_quotes(value), line_number, strict)?;
        }

        Ok(store)
    }
}

/// Loader for tab-separated `stage, script, parameter-name, value` files
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularLoader;

impl ParameterLoader for TabularLoader {
    fn parse(&self, content: &str, strict: bool) -> PipelineResult<ParameterStore> {
        let mut store = ParameterStore::default();

        // First line is the header
        for (index, raw) in content.lines().enumerate().skip(1) {
            let line_number = index + 1;
            if raw.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = raw.split('\t').collect();
            if fields.len() < 4 || fields[2].trim().is_empty() {
                return Err(PipelineError::MalformedParameterRecord {
                    line: line_number,
                    content: raw.to_string(),
                });
            }

            store.insert_record(fields[2].trim(), fields[3].trim(), line_number, strict)?;
        }

        Ok(store)
    }
}

/// Remove one pair of matching surrounding quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
