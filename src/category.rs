/// Resource categorization for packaged assets.
///
/// This module maps asset file extensions to the fixed set of resource
/// categories understood by the runtime (interface, icon, map, macro, sound),
/// and decides which files are skipped for a given run.
///
/// # Examples
///
/// ```
/// use vypack::category::{Category, Classification, ResourceClassifier};
///
/// let classifier = ResourceClassifier::new(false);
/// assert_eq!(classifier.classify("vyint"), Classification::Accept(Category::Interface));
/// assert_eq!(classifier.classify("ogg"), Classification::Accept(Category::Sound));
/// ```
use std::collections::HashMap;
use std::fmt;

/// Recognized asset extensions, in the order the scanner checks them.
///
/// Matching against this list is case-sensitive.
pub const RECOGNIZED_EXTENSIONS: [&str; 10] = [
    "vyint", "vyi", "vym", "vymac", "mp3", "aac", "wav", "m4a", "ogg", "flac",
];

/// Audio extensions, all of which map to [`Category::Sound`].
pub const SOUND_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "ogg", "aac", "flac"];

/// A resource kind understood by the downstream runtime.
///
/// Each category owns one output subdirectory and one manifest key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Interface layouts (`.vyint`)
    Interface,
    /// Icons (`.vyi`)
    Icon,
    /// Maps (`.vym`)
    Map,
    /// Macros (`.vymac`)
    Macro,
    /// Audio (`.mp3`, `.wav`, `.m4a`, `.ogg`, `.aac`, `.flac`)
    Sound,
}

impl Category {
    /// Every category, in manifest key order.
    pub const ALL: [Category; 5] = [
        Category::Interface,
        Category::Icon,
        Category::Map,
        Category::Macro,
        Category::Sound,
    ];

    /// Returns the output subdirectory name for this category.
    ///
    /// This is the only place directory names are defined; both the copy
    /// step and the pre-run clearing step read it.
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::category::Category;
    ///
    /// assert_eq!(Category::Interface.dir_name(), "interface");
    /// assert_eq!(Category::Macro.dir_name(), "macro");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Interface => "interface",
            Category::Icon => "icon",
            Category::Map => "map",
            Category::Macro => "macro",
            Category::Sound => "sound",
        }
    }

    /// Returns the key under which this category's records appear in `resource.json`.
    pub fn manifest_key(&self) -> &'static str {
        self.dir_name()
    }

    /// Returns a human-readable description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Interface => "Interface layouts",
            Category::Icon => "Icons",
            Category::Map => "Maps",
            Category::Macro => "Macros",
            Category::Sound => "Sounds",
        }
    }

    /// Returns the directory names of all categories, in manifest key order.
    pub fn dir_names() -> [&'static str; 5] {
        Self::ALL.map(|category| category.dir_name())
    }

    /// Returns the position of this category in [`Category::ALL`].
    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Interface => 0,
            Category::Icon => 1,
            Category::Map => 2,
            Category::Macro => 3,
            Category::Sound => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Why a candidate was dropped from the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Audio file while the run ignores sound.
    SoundIgnored,
    /// The extension has no category. Only reachable with substring matching.
    Unrecognized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SoundIgnored => f.write_str("sound ignored"),
            SkipReason::Unrecognized => f.write_str("unrecognized extension"),
        }
    }
}

/// Outcome of classifying one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Copy the file into this category.
    Accept(Category),
    /// Remove the candidate from the run's bookkeeping entirely.
    Skip(SkipReason),
}

/// Maps file extensions to categories and applies the run's skip policy.
#[derive(Debug, Clone)]
pub struct ResourceClassifier {
    extension_map: HashMap<String, Category>,
    ignore_sound: bool,
}

impl ResourceClassifier {
    /// Creates a classifier with the standard extension table.
    pub fn new(ignore_sound: bool) -> Self {
        let mut classifier = Self {
            extension_map: HashMap::new(),
            ignore_sound,
        };
        classifier.populate_standard_mappings();
        classifier
    }

    fn populate_standard_mappings(&mut self) {
        self.add_extension_mapping("vyint", Category::Interface);
        self.add_extension_mapping("vyi", Category::Icon);
        self.add_extension_mapping("vym", Category::Map);
        self.add_extension_mapping("vymac", Category::Macro);

        for ext in SOUND_EXTENSIONS {
            self.add_extension_mapping(ext, Category::Sound);
        }
    }

    /// Adds an extension to category mapping. Extensions are case-sensitive.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        self.extension_map.insert(ext.to_string(), category);
    }

    /// Maps a file extension to a category, ignoring the skip policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::category::{Category, ResourceClassifier};
    ///
    /// let classifier = ResourceClassifier::default();
    /// assert_eq!(classifier.extension_to_category("vym"), Some(Category::Map));
    /// assert_eq!(classifier.extension_to_category("VYM"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(ext).copied()
    }

    /// Returns true when this classifier drops audio files.
    pub fn ignores_sound(&self) -> bool {
        self.ignore_sound
    }

    /// Classifies a file by its extension.
    ///
    /// Audio files are skipped when the classifier was built with
    /// `ignore_sound`. An extension without a category is skipped as
    /// [`SkipReason::Unrecognized`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::category::{Classification, ResourceClassifier, SkipReason};
    ///
    /// let classifier = ResourceClassifier::new(true);
    /// assert_eq!(
    ///     classifier.classify("wav"),
    ///     Classification::Skip(SkipReason::SoundIgnored)
    /// );
    /// ```
    pub fn classify(&self, ext: &str) -> Classification {
        match self.extension_to_category(ext) {
            Some(Category::Sound) if self.ignore_sound => {
                Classification::Skip(SkipReason::SoundIgnored)
            }
            Some(category) => Classification::Accept(category),
            None => Classification::Skip(SkipReason::Unrecognized),
        }
    }
}

impl Default for ResourceClassifier {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions_are_distinct() {
        let descriptions: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| c.description()).collect();
        assert_eq!(descriptions.len(), Category::ALL.len());
        assert_eq!(Category::Macro.description(), "Macros");
    }

    #[test]
    fn test_category_dir_names() {
        assert_eq!(Category::Interface.dir_name(), "interface");
        assert_eq!(Category::Icon.dir_name(), "icon");
        assert_eq!(Category::Map.dir_name(), "map");
        assert_eq!(Category::Macro.dir_name(), "macro");
        assert_eq!(Category::Sound.dir_name(), "sound");
    }

    #[test]
    fn test_clear_list_matches_copy_directories() {
        let names = Category::dir_names();
        for category in Category::ALL {
            assert!(names.contains(&category.dir_name()));
        }
        assert_eq!(names, ["interface", "icon", "map", "macro", "sound"]);
    }

    #[test]
    fn test_index_follows_all_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_classify_game_assets() {
        let classifier = ResourceClassifier::default();
        assert_eq!(
            classifier.classify("vyint"),
            Classification::Accept(Category::Interface)
        );
        assert_eq!(classifier.classify("vyi"), Classification::Accept(Category::Icon));
        assert_eq!(classifier.classify("vym"), Classification::Accept(Category::Map));
        assert_eq!(
            classifier.classify("vymac"),
            Classification::Accept(Category::Macro)
        );
    }

    #[test]
    fn test_classify_all_audio_as_sound() {
        let classifier = ResourceClassifier::default();
        for ext in SOUND_EXTENSIONS {
            assert_eq!(
                classifier.classify(ext),
                Classification::Accept(Category::Sound),
                "{ext} should be sound"
            );
        }
    }

    #[test]
    fn test_ignore_sound_skips_audio_only() {
        let classifier = ResourceClassifier::new(true);
        assert!(classifier.ignores_sound());
        for ext in SOUND_EXTENSIONS {
            assert_eq!(
                classifier.classify(ext),
                Classification::Skip(SkipReason::SoundIgnored)
            );
        }
        assert_eq!(
            classifier.classify("vyint"),
            Classification::Accept(Category::Interface)
        );
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        let classifier = ResourceClassifier::default();
        assert_eq!(
            classifier.classify("MP3"),
            Classification::Skip(SkipReason::Unrecognized)
        );
        assert_eq!(
            classifier.classify("Vyint"),
            Classification::Skip(SkipReason::Unrecognized)
        );
    }

    #[test]
    fn test_every_recognized_extension_has_a_category() {
        let classifier = ResourceClassifier::default();
        for ext in RECOGNIZED_EXTENSIONS {
            assert!(classifier.extension_to_category(ext).is_some(), "{ext}");
        }
    }

    #[test]
    fn test_custom_mapping() {
        let mut classifier = ResourceClassifier::default();
        classifier.add_extension_mapping("vyfont", Category::Interface);
        assert_eq!(
            classifier.classify("vyfont"),
            Classification::Accept(Category::Interface)
        );
    }
}
