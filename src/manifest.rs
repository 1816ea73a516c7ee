/// The resource manifest: per-category records of packaged files.
///
/// A [`ResourceManifest`] accumulates one [`ResourceRecord`] per copied file
/// while a run is in progress. [`ManifestWriter::finalize`] serializes it to
/// `resource.json`, replacing any manifest from an earlier run.
///
/// # File Format
///
/// ```json
/// {
///   "interface": [{ "resourceIdentifier": "k3j9a2x0pq.vyint", "fileName": "main.vyint" }],
///   "icon": [],
///   "map": [],
///   "macro": [],
///   "sound": []
/// }
/// ```
use crate::category::Category;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the manifest file written at the output root.
pub const MANIFEST_FILE_NAME: &str = "resource.json";

/// One packaged file: its generated identifier and the name it had in the input tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Generated token plus the original extension.
    pub resource_identifier: String,
    /// Original base name of the source file.
    pub file_name: String,
}

impl ResourceRecord {
    pub fn new(resource_identifier: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            resource_identifier: resource_identifier.into(),
            file_name: file_name.into(),
        }
    }
}

/// Errors that can occur while writing or reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to serialize the manifest.
    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Failed to write the manifest file.
    #[error("Failed to write manifest {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to read the manifest file.
    #[error("Failed to read manifest {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The manifest file exists but is not a valid manifest.
    #[error("Invalid manifest format: {reason}")]
    InvalidFormat { reason: String },
}

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Borrowed, key-ordered view used for serialization.
#[derive(Serialize)]
struct ManifestView<'a> {
    interface: &'a [ResourceRecord],
    icon: &'a [ResourceRecord],
    map: &'a [ResourceRecord],
    #[serde(rename = "macro")]
    macros: &'a [ResourceRecord],
    sound: &'a [ResourceRecord],
}

/// Owned form used for parsing. Every key is required and no others are allowed.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    interface: Vec<ResourceRecord>,
    icon: Vec<ResourceRecord>,
    map: Vec<ResourceRecord>,
    #[serde(rename = "macro")]
    macros: Vec<ResourceRecord>,
    sound: Vec<ResourceRecord>,
}

/// Records produced so far, grouped by category.
///
/// Within a category, records keep the order they were appended in, which
/// for a run is the order copies completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceManifest {
    records: [Vec<ResourceRecord>; 5],
}

impl ResourceManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to `category`.
    pub fn append(&mut self, category: Category, record: ResourceRecord) {
        self.records[category.index()].push(record);
    }

    /// Records of one category, in append order.
    pub fn records(&self, category: Category) -> &[ResourceRecord] {
        &self.records[category.index()]
    }

    /// Total number of records across all categories.
    pub fn len(&self) -> usize {
        self.records.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record count per category, in manifest key order.
    pub fn counts(&self) -> [(Category, usize); 5] {
        Category::ALL.map(|category| (category, self.records(category).len()))
    }

    fn view(&self) -> ManifestView<'_> {
        ManifestView {
            interface: self.records(Category::Interface),
            icon: self.records(Category::Icon),
            map: self.records(Category::Map),
            macros: self.records(Category::Macro),
            sound: self.records(Category::Sound),
        }
    }

    /// Serializes the manifest as pretty-printed JSON with all five keys.
    pub fn to_json_string(&self) -> ManifestResult<String> {
        Ok(serde_json::to_string_pretty(&self.view())?)
    }

    /// Parses a manifest from JSON text.
    pub fn from_json_str(json: &str) -> ManifestResult<Self> {
        let file: ManifestFile =
            serde_json::from_str(json).map_err(|e| ManifestError::InvalidFormat {
                reason: e.to_string(),
            })?;

        Ok(Self {
            records: [file.interface, file.icon, file.map, file.macros, file.sound],
        })
    }

    /// Loads a manifest previously written by [`ManifestWriter::finalize`].
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| ManifestError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }
}

/// Writes the finished manifest to disk.
pub struct ManifestWriter;

impl ManifestWriter {
    /// Returns the manifest path for an output root.
    pub fn manifest_path(output_root: &Path) -> PathBuf {
        output_root.join(MANIFEST_FILE_NAME)
    }

    /// Replaces the file at `output_path` with `manifest`.
    ///
    /// A prior file is deleted first; "not found" is ignored and any other
    /// deletion error is logged before the write is attempted anyway. Missing
    /// parent directories are created. Calling this repeatedly leaves one
    /// well-formed manifest (last write wins).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vypack::manifest::{ManifestWriter, ResourceManifest};
    /// use std::path::Path;
    ///
    /// let manifest = ResourceManifest::new();
    /// ManifestWriter::finalize(&manifest, Path::new("out/resource.json"))
    ///     .expect("manifest written");
    /// ```
    pub fn finalize(manifest: &ResourceManifest, output_path: &Path) -> ManifestResult<()> {
        match fs::remove_file(output_path) {
            Ok(()) => tracing::debug!("Removed previous manifest {}", output_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Could not remove previous manifest {}: {}",
                output_path.display(),
                e
            ),
        }

        let json = manifest.to_json_string()?;

        if let Some(parent) = output_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ManifestError::WriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(output_path, json).map_err(|e| ManifestError::WriteFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            "Wrote manifest {} ({} record(s))",
            output_path.display(),
            manifest.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn test_empty_manifest_has_all_keys() {
        let json = ResourceManifest::new()
            .to_json_string()
            .expect("Failed to serialize");
        let value: Value = serde_json::from_str(&json).expect("Invalid JSON");
        let object = value.as_object().expect("Manifest is an object");

        assert_eq!(object.len(), 5);
        for category in Category::ALL {
            let entries = object[category.manifest_key()]
                .as_array()
                .expect("Category is an array");
            assert!(entries.is_empty());
        }
    }

    #[test]
    fn test_keys_are_written_in_category_order() {
        let json = ResourceManifest::new()
            .to_json_string()
            .expect("Failed to serialize");
        let positions: Vec<usize> = ["\"interface\"", "\"icon\"", "\"map\"", "\"macro\"", "\"sound\""]
            .iter()
            .map(|key| json.find(key).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_records_use_camel_case_fields() {
        let mut manifest = ResourceManifest::new();
        manifest.append(Category::Macro, ResourceRecord::new("abc.vymac", "boot.vymac"));

        let value: Value =
            serde_json::from_str(&manifest.to_json_string().expect("Failed to serialize"))
                .expect("Invalid JSON");

        assert_eq!(value["macro"][0]["resourceIdentifier"], "abc.vymac");
        assert_eq!(value["macro"][0]["fileName"], "boot.vymac");
    }

    #[test]
    fn test_append_keeps_order_per_category() {
        let mut manifest = ResourceManifest::new();
        manifest.append(Category::Sound, ResourceRecord::new("1.mp3", "b.mp3"));
        manifest.append(Category::Map, ResourceRecord::new("2.vym", "m.vym"));
        manifest.append(Category::Sound, ResourceRecord::new("3.wav", "c.wav"));

        let sounds: Vec<_> = manifest
            .records(Category::Sound)
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(sounds, vec!["b.mp3", "c.wav"]);
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.counts()[4], (Category::Sound, 2));
    }

    #[test]
    fn test_finalize_then_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("resource.json");

        let mut manifest = ResourceManifest::new();
        manifest.append(Category::Icon, ResourceRecord::new("q1.vyi", "gear.vyi"));
        ManifestWriter::finalize(&manifest, &path).expect("Failed to finalize");

        assert_eq!(ResourceManifest::load(&path).expect("Failed to load"), manifest);
    }

    #[test]
    fn test_finalize_twice_leaves_one_valid_manifest() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = ManifestWriter::manifest_path(temp_dir.path());

        let mut first = ResourceManifest::new();
        first.append(Category::Map, ResourceRecord::new("a.vym", "one.vym"));
        let mut second = first.clone();
        second.append(Category::Map, ResourceRecord::new("b.vym", "two.vym"));

        ManifestWriter::finalize(&first, &path).expect("First finalize failed");
        ManifestWriter::finalize(&second, &path).expect("Second finalize failed");

        let files: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Failed to read dir")
            .flatten()
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(ResourceManifest::load(&path).expect("Failed to load"), second);
    }

    #[test]
    fn test_finalize_creates_output_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("deep").join("out").join(MANIFEST_FILE_NAME);

        ManifestWriter::finalize(&ResourceManifest::new(), &path).expect("Failed to finalize");
        assert!(path.is_file());
    }

    #[test]
    fn test_load_rejects_missing_key() {
        let json = r#"{"interface": [], "icon": [], "map": [], "sound": []}"#;
        let result = ResourceManifest::from_json_str(json);
        assert!(matches!(result, Err(ManifestError::InvalidFormat { .. })));
    }

    #[test]
    fn test_load_rejects_extra_key() {
        let json = r#"{"interface": [], "icon": [], "map": [], "macro": [], "sound": [], "video": []}"#;
        assert!(ResourceManifest::from_json_str(json).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = ResourceManifest::load(&temp_dir.path().join("resource.json"));
        assert!(matches!(result, Err(ManifestError::ReadFailed { .. })));
    }
}
