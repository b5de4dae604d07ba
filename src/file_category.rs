/// Extension-based file categorization.
///
/// A [`CategoryTable`] is built once at start-up from a fixed set of
/// (category, extensions) pairs and handed to whoever needs to classify.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::{Category, CategoryTable};
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify("photo.JPG"), Category::Images);
/// assert_eq!(table.classify("notes.txt"), Category::Text);
/// assert_eq!(table.classify("README"), Category::Others);
/// ```
use std::collections::HashMap;

/// A category folder that files are sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Images,
    Documents,
    Text,
    Excel,
    Compressed,
    Programs,
    Audio,
    Video,
    /// Fallback for unknown or missing extensions.
    Others,
}

impl Category {
    /// Every category that owns extensions, in table order.
    pub const KNOWN: [Category; 8] = [
        Category::Images,
        Category::Documents,
        Category::Text,
        Category::Excel,
        Category::Compressed,
        Category::Programs,
        Category::Audio,
        Category::Video,
    ];

    /// Returns the name of the subfolder this category's files go into.
    ///
    /// ```
    /// use dirsort::file_category::Category;
    ///
    /// assert_eq!(Category::Compressed.dir_name(), "Compressed");
    /// assert_eq!(Category::Others.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Text => "Text",
            Category::Excel => "Excel",
            Category::Compressed => "Compressed",
            Category::Programs => "Programs",
            Category::Audio => "Audio",
            Category::Video => "Video",
            Category::Others => "Others",
        }
    }

    /// The built-in extensions for this category, lowercase with leading dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Images => &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"],
            Category::Documents => &[".pdf", ".doc", ".docx", ".ppt", ".pptx", ".odt"],
            Category::Text => &[".txt", ".md", ".rtf"],
            Category::Excel => &[".xls", ".xlsx", ".csv"],
            Category::Compressed => &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2"],
            Category::Programs => &[".exe", ".msi", ".deb", ".rpm", ".pkg", ".sh"],
            Category::Audio => &[".mp3", ".wav", ".aac", ".flac", ".ogg", ".m4a"],
            Category::Video => &[".mp4", ".mkv", ".mov", ".avi", ".flv"],
            Category::Others => &[],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Immutable reverse index from extension to category.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    extension_map: HashMap<String, Category>,
}

impl CategoryTable {
    /// Builds a table from (category, extensions) pairs.
    ///
    /// Extensions are stored lowercase with a leading dot. A duplicated
    /// extension keeps the category listed last.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, &'a [&'a str])>,
    {
        let mut extension_map = HashMap::new();
        for (category, extensions) in pairs {
            for ext in extensions {
                extension_map.insert(normalize_extension(ext), category);
            }
        }
        Self { extension_map }
    }

    /// Returns the suffix starting at the last `.` of `filename`.
    ///
    /// Leading dots of hidden files do not start an extension, so
    /// `.bashrc` has none. A name without a dot yields an empty string.
    pub fn extension_of(filename: &str) -> &str {
        let stem_start = filename.len() - filename.trim_start_matches('.').len();
        match filename[stem_start..].rfind('.') {
            Some(idx) => &filename[stem_start + idx..],
            None => "",
        }
    }

    /// Looks up a single extension (with or without its leading dot).
    pub fn category_for_extension(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&normalize_extension(ext)).copied()
    }

    /// Classifies a file by name. Never fails: anything unknown is `Others`.
    pub fn classify(&self, filename: &str) -> Category {
        let ext = Self::extension_of(filename);
        if ext.is_empty() {
            return Category::Others;
        }
        self.category_for_extension(ext).unwrap_or(Category::Others)
    }

    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::from_pairs(Category::KNOWN.iter().map(|c| (*c, c.extensions())))
    }
}

fn normalize_extension(ext: &str) -> String {
    let lower = ext.to_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}
