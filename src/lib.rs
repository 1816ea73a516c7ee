//! vypack - An asset packager for resource bundles
//!
//! This library scans a tree of raw asset files, copies every recognized file
//! into a category directory under a generated identifier, and writes a
//! `resource.json` manifest mapping each identifier back to its original
//! file name.

pub mod category;
pub mod cli;
pub mod completion;
pub mod config;
pub mod identifier;
pub mod logging;
pub mod manifest;
pub mod materializer;
pub mod output;
pub mod output_dirs;
pub mod pipeline;
pub mod scanner;

pub use category::{Category, Classification, ResourceClassifier};
pub use completion::CompletionDetector;
pub use config::{ConfigError, PackConfig, PackOptions, RunConfig};
pub use identifier::IdentifierGenerator;
pub use manifest::{ManifestWriter, ResourceManifest, ResourceRecord};
pub use materializer::FileMaterializer;
pub use output_dirs::OutputDirectoryManager;
pub use pipeline::{Pipeline, RunIssue, RunReport, run, run_blocking};
pub use scanner::{DirectoryScanner, ExtensionMatch};

pub use cli::{Args, RunStatus, run_cli};
