//! Run configuration.
//!
//! A run is driven by an immutable [`RunConfig`]. It is assembled from two
//! sources:
//! - [`PackOptions`], the raw values collected by the command line (roots may be absent)
//! - [`PackConfig`], optional tuning defaults loaded from a TOML file
//!
//! # Configuration File Format
//!
//! ```toml
//! [pack]
//! concurrency = 32
//! identifier_length = 10
//! extension_match = "exact"
//!
//! [pack.exclude]
//! patterns = ["**/drafts/**", "*.bak.vym"]
//! ```

use crate::category::Category;
use crate::identifier::DEFAULT_IDENTIFIER_LENGTH;
use crate::manifest::ManifestWriter;
use crate::scanner::ExtensionMatch;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of files copied at the same time.
pub const DEFAULT_CONCURRENCY: usize = 64;

/// Shortest identifier token a run accepts.
pub const MIN_IDENTIFIER_LENGTH: usize = 4;

/// Longest identifier token a run accepts.
pub const MAX_IDENTIFIER_LENGTH: usize = 32;

/// Name of the directory holding the category directories.
pub const RESOURCES_DIR_NAME: &str = "resources";

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No input root was given.
    #[error("No input directory given")]
    MissingInputRoot,
    /// No output root was given.
    #[error("No output directory given")]
    MissingOutputRoot,
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Everything a run needs, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the raw asset tree.
    pub input_root: PathBuf,
    /// Root of the packaged output.
    pub output_root: PathBuf,
    /// Drop audio files instead of packaging them.
    pub ignore_sound: bool,
    verbose: bool,
    concurrency: usize,
    identifier_length: usize,
    /// How extensions are tested against the whitelist.
    pub extension_match: ExtensionMatch,
    /// Files (relative to the input root) never packaged.
    pub exclude: Vec<Pattern>,
}

impl RunConfig {
    /// Creates a configuration with default tuning values.
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::config::RunConfig;
    /// use std::path::Path;
    ///
    /// let config = RunConfig::new("assets", "dist").with_ignore_sound(true);
    /// assert_eq!(config.manifest_path(), Path::new("dist/resource.json"));
    /// assert_eq!(config.resources_dir(), Path::new("dist/resources"));
    /// ```
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            ignore_sound: false,
            verbose: false,
            concurrency: DEFAULT_CONCURRENCY,
            identifier_length: DEFAULT_IDENTIFIER_LENGTH,
            extension_match: ExtensionMatch::default(),
            exclude: Vec::new(),
        }
    }

    pub fn with_ignore_sound(mut self, ignore_sound: bool) -> Self {
        self.ignore_sound = ignore_sound;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the copy concurrency; zero is raised to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the identifier length, clamped to the supported range.
    pub fn with_identifier_length(mut self, length: usize) -> Self {
        self.identifier_length = length.clamp(MIN_IDENTIFIER_LENGTH, MAX_IDENTIFIER_LENGTH);
        self
    }

    pub fn with_extension_match(mut self, extension_match: ExtensionMatch) -> Self {
        self.extension_match = extension_match;
        self
    }

    pub fn with_excludes(mut self, exclude: Vec<Pattern>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Report per-file detail. Has no effect on what is written.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Maximum number of files copied at the same time (at least 1).
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Length of generated identifier tokens, within
    /// `MIN_IDENTIFIER_LENGTH..=MAX_IDENTIFIER_LENGTH`.
    pub fn identifier_length(&self) -> usize {
        self.identifier_length
    }

    /// `<output_root>/resources`
    pub fn resources_dir(&self) -> PathBuf {
        self.output_root.join(RESOURCES_DIR_NAME)
    }

    /// `<output_root>/resources/<category dir>`
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.resources_dir().join(category.dir_name())
    }

    /// `<output_root>/resource.json`
    pub fn manifest_path(&self) -> PathBuf {
        ManifestWriter::manifest_path(&self.output_root)
    }
}

/// Raw run options as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    pub input_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub ignore_sound: bool,
    pub verbose: bool,
    /// Overrides the file's `concurrency`.
    pub concurrency: Option<usize>,
    /// Overrides the file's `identifier_length`.
    pub identifier_length: Option<usize>,
    /// Overrides the file's `extension_match`.
    pub extension_match: Option<ExtensionMatch>,
}

impl PackOptions {
    /// Validates the options and merges them over the file defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingInputRoot` or `ConfigError::MissingOutputRoot`
    /// when a root is absent, and `ConfigError::InvalidGlobPattern` when an
    /// exclude pattern does not compile.
    pub fn into_run_config(self, file: PackConfig) -> Result<RunConfig, ConfigError> {
        let input_root = self.input_root.ok_or(ConfigError::MissingInputRoot)?;
        let output_root = self.output_root.ok_or(ConfigError::MissingOutputRoot)?;
        let exclude = file.compile_excludes()?;
        let settings = file.pack;

        Ok(RunConfig::new(input_root, output_root)
            .with_ignore_sound(self.ignore_sound)
            .with_verbose(self.verbose)
            .with_concurrency(self.concurrency.unwrap_or(settings.concurrency))
            .with_identifier_length(
                self.identifier_length
                    .unwrap_or(settings.identifier_length),
            )
            .with_extension_match(self.extension_match.unwrap_or(settings.extension_match))
            .with_excludes(exclude))
    }
}

/// Tuning defaults read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackConfig {
    #[serde(default)]
    pub pack: PackSettings,
}

/// The `[pack]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSettings {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_identifier_length")]
    pub identifier_length: usize,

    #[serde(default)]
    pub extension_match: ExtensionMatch,

    #[serde(default)]
    pub exclude: ExcludeRules,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_identifier_length() -> usize {
    DEFAULT_IDENTIFIER_LENGTH
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            identifier_length: DEFAULT_IDENTIFIER_LENGTH,
            extension_match: ExtensionMatch::default(),
            exclude: ExcludeRules::default(),
        }
    }
}

/// The `[pack.exclude]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Glob patterns matched against paths relative to the input root.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl PackConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.vypackrc.toml` in the current directory
    /// 3. Look for `~/.config/vypack/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".vypackrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("vypack")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!("Loaded configuration from {}", path.display());

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidGlobPattern` for the first pattern that fails.
    pub fn compile_excludes(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.pack
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect()
    }
}
