//! YAML configuration for a nearsim run.
//!
//! A single file selects the search method, the search parameters, the input
//! corpus and where results go. Every section except `corpus.data_file` and
//! `output.pairs_file` has defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "questions dedup"
//! method: lsh
//!
//! search:
//!   num_hashes: 120
//!   num_bands: 20
//!   num_buckets: 2000
//!   threshold: 0.5
//!   num_shingles: 1000
//!   seed: 7825942
//!   use_parallel: false
//!   similarity: signature_set
//!   empty_documents: skip
//!
//! corpus:
//!   data_file: "questions.tsv"
//!   shingle_length: 5
//!
//! output:
//!   pairs_file: "pairs.csv"
//!   signatures_file: "signatures.csv"
//!   test_file: "duplicates.csv"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use lsh::SearchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Search strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// MinHash signatures with LSH banding.
    #[default]
    Lsh,
    /// Exact Jaccard over every pair.
    Bf,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Lsh => "lsh",
            Method::Bf => "bf",
        }
    }
}

/// Top-level configuration of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearsimConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub method: Method,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub corpus: CorpusYamlConfig,

    #[serde(default)]
    pub output: OutputYamlConfig,
}

impl NearsimConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NearsimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.search
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("search: {err}")))?;
        if u32::try_from(self.search.num_shingles).is_err() {
            return Err(ConfigLoadError::Validation(format!(
                "search.num_shingles must fit in 32 bits (got {})",
                self.search.num_shingles
            )));
        }
        self.corpus.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

impl Default for NearsimConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            method: Method::default(),
            search: SearchConfig::default(),
            corpus: CorpusYamlConfig::default(),
            output: OutputYamlConfig::default(),
        }
    }
}

/// Input corpus configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorpusYamlConfig {
    #[serde(default)]
    pub data_file: PathBuf,

    #[serde(default = "default_shingle_length")]
    pub shingle_length: usize,
}

impl CorpusYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigLoadError::MissingField("corpus.data_file".to_string()));
        }
        if self.shingle_length == 0 {
            return Err(ConfigLoadError::Validation(
                "corpus.shingle_length must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result destinations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputYamlConfig {
    #[serde(default)]
    pub pairs_file: PathBuf,

    /// Signature table destination, LSH only
    #[serde(default)]
    pub signatures_file: Option<PathBuf>,

    /// Reference pairs to evaluate the results against
    #[serde(default)]
    pub test_file: Option<PathBuf>,
}

impl OutputYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.pairs_file.as_os_str().is_empty() {
            return Err(ConfigLoadError::MissingField("output.pairs_file".to_string()));
        }
        Ok(())
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_shingle_length() -> usize {
    5
}
