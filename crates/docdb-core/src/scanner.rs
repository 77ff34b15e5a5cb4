//! Filesystem discovery of markdown files and their conversion into [`Document`]s.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::extract::{content_preview, extract_description, extract_keywords, extract_title};
use crate::traits::DocumentSource;
use crate::types::{Category, Difficulty, Document};

/// One discovered file, as handed over by a [`DocumentSource`].
#[derive(Debug, Clone)]
pub struct RawFile {
    pub path: PathBuf,
    /// Path below the corpus root, always `/`-separated.
    pub relative_path: String,
    pub bytes: Vec<u8>,
    pub size: u64,
    pub modified: SystemTime,
}

impl RawFile {
    /// In-memory file; handy for tests and embedders that do not read from disk.
    pub fn from_text(relative_path: &str, text: &str) -> Self {
        Self {
            path: PathBuf::from(relative_path),
            relative_path: relative_path.to_string(),
            bytes: text.as_bytes().to_vec(),
            size: text.len() as u64,
            modified: SystemTime::UNIX_EPOCH,
        }
    }
}

/// Walks a corpus root for `*.md` files.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn list_markdown_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable corpus entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let is_md = entry
                .path()
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
            if is_md {
                files.push(entry.into_path());
            }
        }
        files.sort();
        files
    }

    fn read(&self, path: &Path) -> std::io::Result<RawFile> {
        let meta = fs::metadata(path)?;
        let bytes = fs::read(path)?;
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Ok(RawFile {
            path: path.to_path_buf(),
            relative_path,
            bytes,
            size: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        })
    }
}

impl DocumentSource for FsSource {
    fn files(&self) -> Result<Vec<RawFile>> {
        let meta = fs::metadata(&self.root).map_err(|e| Error::CorpusAccess {
            path: self.root.clone(),
            reason: e.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(Error::CorpusAccess { path: self.root.clone(), reason: "not a directory".into() });
        }

        let paths = self.list_markdown_files();
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read(&path) {
                Ok(raw) => files.push(raw),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to read document, skipping"),
            }
        }
        debug!(root = %self.root.display(), files = files.len(), "corpus walk finished");
        Ok(files)
    }
}

/// Builds a top-level document from a raw file. Fails only when the path has no usable file name.
pub fn parse_document(raw: &RawFile) -> Result<Document> {
    let parts: Vec<&str> = raw.relative_path.split('/').filter(|p| !p.is_empty()).collect();
    let file_name = parts.last().copied().ok_or_else(|| Error::Parse {
        path: raw.path.clone(),
        reason: "empty relative path".into(),
    })?;
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Parse { path: raw.path.clone(), reason: "missing file stem".into() })?;

    let content = String::from_utf8_lossy(&raw.bytes).into_owned();
    let (category, subcategory) = determine_category(&parts);
    let id = document_id(category, &subcategory, stem);
    let full_path_id = strip_extension(&raw.relative_path);

    Ok(Document {
        id,
        full_path_id,
        title: extract_title(&content),
        category,
        subcategory,
        description: extract_description(&content),
        keywords: extract_keywords(&content),
        file_path: raw.path.clone(),
        relative_path: raw.relative_path.clone(),
        difficulty: determine_difficulty(&raw.relative_path),
        file_size: raw.size,
        last_modified: DateTime::<Utc>::from(raw.modified),
        content_preview: content_preview(&content),
        content,
        prerequisites: Vec::new(),
        related: Vec::new(),
    })
}

/// Category from the first path component. Only `manual`, `libs` and `ohos`
/// keep a subcategory, and only when the second component is a directory.
fn determine_category(parts: &[&str]) -> (Category, String) {
    let category = match parts.first().copied() {
        Some("libs") => Category::Libs,
        Some("tools") => Category::Tools,
        Some("extra") => Category::Extra,
        Some("ohos") => Category::Ohos,
        _ => Category::Manual,
    };
    let known_root = parts.first().is_some_and(|p| *p == category.as_str());
    let subcategory = if known_root && category.has_subcategories() && parts.len() > 2 {
        parts[1].to_string()
    } else {
        String::new()
    };
    (category, subcategory)
}

fn determine_difficulty(relative_path: &str) -> Difficulty {
    if relative_path.contains("first_understanding") || relative_path.contains("basic") {
        Difficulty::Beginner
    } else if relative_path.contains("advanced") {
        Difficulty::Advanced
    } else {
        Difficulty::Intermediate
    }
}

fn document_id(category: Category, subcategory: &str, stem: &str) -> String {
    let base = stem.replace('-', "_").to_lowercase();
    if subcategory.is_empty() {
        format!("{}_{}", category, base)
    } else {
        format!("{}_{}_{}", category, subcategory, base)
    }
}

fn strip_extension(relative_path: &str) -> String {
    match relative_path.rfind('.') {
        Some(dot) if !relative_path[dot..].contains('/') => relative_path[..dot].to_string(),
        _ => relative_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_and_subcategory() {
        assert_eq!(determine_category(&["manual", "function", "a.md"]), (Category::Manual, "function".to_string()));
        assert_eq!(determine_category(&["manual", "a.md"]), (Category::Manual, String::new()));
        assert_eq!(determine_category(&["tools", "cjpm", "a.md"]), (Category::Tools, String::new()));
        assert_eq!(determine_category(&["misc", "x", "a.md"]), (Category::Manual, String::new()));
    }

    #[test]
    fn ids_are_lowercased_with_underscores() {
        assert_eq!(document_id(Category::Libs, "std", "Core-Package"), "libs_std_core_package");
        assert_eq!(document_id(Category::Extra, "", "faq"), "extra_faq");
    }

    #[test]
    fn full_path_id_drops_extension() {
        assert_eq!(strip_extension("manual/function/define.md"), "manual/function/define");
        assert_eq!(strip_extension("a.dir/readme"), "a.dir/readme");
    }

    #[test]
    fn difficulty_from_path() {
        assert_eq!(determine_difficulty("manual/first_understanding/hello.md"), Difficulty::Beginner);
        assert_eq!(determine_difficulty("manual/basic_data_type/int.md"), Difficulty::Beginner);
        assert_eq!(determine_difficulty("extra/advanced_macro.md"), Difficulty::Advanced);
        assert_eq!(determine_difficulty("libs/std/core.md"), Difficulty::Intermediate);
    }

    #[test]
    fn parse_fills_metadata() {
        let raw = RawFile::from_text("manual/function/define_functions.md", "# 定义函数\n\n函数 is a function.\n");
        let doc = parse_document(&raw).unwrap();
        assert_eq!(doc.id, "manual_function_define_functions");
        assert_eq!(doc.full_path_id, "manual/function/define_functions");
        assert_eq!(doc.title, "定义函数");
        assert_eq!(doc.description, "函数 is a function.");
        assert!(doc.keywords.contains(&"函数".to_string()));
        assert!(!doc.is_derived());
    }
}
