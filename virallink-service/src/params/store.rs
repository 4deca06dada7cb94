// Global Parameter Store
// Immutable name -> value mapping shared by every script of a run

use crate::error::{PipelineError, PipelineResult};
use crate::params::loader::ParameterFormat;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Key holding the root directory that every output-relative path is anchored under
pub const OUTPUT_DIR_KEY: &str = "outdir";

/// Flat parameter mapping loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterStore {
    values: HashMap<String, String>,
}

impl ParameterStore {
    /// Load the store from a parameter file in the given format.
    ///
    /// With `strict` set, a key appearing twice is an error; otherwise the
    /// first occurrence wins and later ones are ignored.
    pub fn load(path: &Path, format: ParameterFormat, strict: bool) -> PipelineResult<Self> {
        if !path.is_file() {
            return Err(PipelineError::MissingConfigFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let store = format.loader().parse(&content, strict)?;

        tracing::debug!(
            path = %path.display(),
            parameters = store.len(),
            "loaded parameter file"
        );

        Ok(store)
    }

    /// Build a store from key/value pairs. The first occurrence of a key wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = HashMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { values }
    }

    /// Record one parameter read from line `line` of a parameter file
    pub(crate) fn insert_record(
        &mut self,
        key: &str,
        value: &str,
        line: usize,
        strict: bool,
    ) -> PipelineResult<()> {
        if self.values.contains_key(key) {
            if strict {
                return Err(PipelineError::DuplicateParameter {
                    key: key.to_string(),
                    line,
                });
            }
            tracing::debug!(key, line, "ignoring duplicate parameter");
            return Ok(());
        }

        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The configured output root (`outdir`)
    pub fn output_dir(&self) -> PipelineResult<&str> {
        self.get(OUTPUT_DIR_KEY)
            .ok_or_else(|| PipelineError::MissingRequiredParameter(OUTPUT_DIR_KEY.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check that every required key is present, reporting the first missing one
    pub fn validate_mandatory(&self, required: &[&str]) -> PipelineResult<()> {
        match required.iter().find(|key| !self.contains(key)) {
            Some(missing) => Err(PipelineError::MissingRequiredParameter(missing.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_from_pairs_first_occurrence_wins() {
        let store = ParameterStore::from_pairs([
            ("outdir", "/first"),
            ("counts", "/data/counts.txt"),
            ("outdir", "/second"),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("outdir"), Some("/first"));
    }

    #[test]
    fn test_validate_mandatory_reports_first_missing() {
        let store = ParameterStore::from_pairs([
            ("outdir", "/out"),
            ("counts", "/data/counts.txt"),
        ]);

        let err = store
            .validate_mandatory(&["counts", "lfccutoff", "pcutoff", "outdir"])
            .unwrap_err();

        match err {
            PipelineError::MissingRequiredParameter(key) => assert_eq!(key, "lfccutoff"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_mandatory_ok() {
        let store = ParameterStore::from_pairs([("outdir", "/out"), ("meta", "m.txt")]);
        assert!(store.validate_mandatory(&["meta", "outdir"]).is_ok());
        assert!(store.validate_mandatory(&[]).is_ok());
    }

    #[test]
    fn test_output_dir_missing() {
        let store = ParameterStore::from_pairs([("counts", "c.txt")]);
        assert!(matches!(
            store.output_dir(),
            Err(PipelineError::MissingRequiredParameter(key)) if key == OUTPUT_DIR_KEY
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("parameters.yml");

        let err = ParameterStore::load(&path, ParameterFormat::KeyValue, false).unwrap_err();
        assert!(matches!(err, PipelineError::MissingConfigFile(p) if p == path));
    }

    #[test]
    fn test_load_key_value_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("parameters.yml");
        fs::write(&path, "outdir: /out\ncounts: /data/counts.txt\noutdir: /ignored\n").unwrap();

        let store = ParameterStore::load(&path, ParameterFormat::KeyValue, false).unwrap();
        assert_eq!(store.get("outdir"), Some("/out"));
        assert_eq!(store.get("counts"), Some("/data/counts.txt"));
    }

    #[test]
    fn test_load_strict_rejects_duplicates() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("parameters.yml");
        fs::write(&path, "outdir: /out\ncounts: c.txt\noutdir: /again\n").unwrap();

        let err = ParameterStore::load(&path, ParameterFormat::KeyValue, true).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DuplicateParameter { ref key, line: 3 } if key == "outdir"
        ));
    }
}
