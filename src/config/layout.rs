use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

use super::schema::Settings;

/// Extension of per-recording metadata documents.
pub const DOCUMENT_EXT: &str = "json";
/// Extension of compressed cache artifacts.
pub const COMPRESSED_EXT: &str = "m4a";
/// Where compressed audio lives inside the publish tree.
pub const ASSETS_AUDIO_DIR: &str = "assets/audio";
/// Singleton documents stored beside the per-recording ones.
pub const SPECIAL_DOCUMENTS: &[&str] = &["about.json", "settings.json"];

/// The resolved directory layout shared by every component.
///
/// The three working trees (sources, documents, cache) mirror one another:
/// a source at `a/b.wav` owns the document `a/b.json` and the cache file
/// `a/b.m4a`. All derived paths are pure functions of the source path.
#[derive(Debug, Clone)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub publish_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Lowercase source extensions without the dot.
    pub extensions: Vec<String>,
    pub follow_links: bool,
    pub include_hidden: bool,
}

impl Settings {
    /// Build the `Layout`, with `source_override` taking precedence over the
    /// configured source directory.
    pub fn layout(&self, source_override: Option<&Path>) -> Result<Layout> {
        let source_dir = source_override
            .map(Path::to_path_buf)
            .or_else(|| self.paths.source_dir.clone())
            .ok_or_else(|| {
                Error::Config("no source directory (pass --wav or set paths.source_dir)".into())
            })?;

        let base = source_dir.parent().map(Path::to_path_buf).unwrap_or_default();
        let metadata_dir = self
            .paths
            .metadata_dir
            .clone()
            .unwrap_or_else(|| base.join("json"));
        let cache_dir = self
            .paths
            .cache_dir
            .clone()
            .unwrap_or_else(|| base.join(COMPRESSED_EXT));

        let extensions = self
            .library
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(Layout {
            source_dir,
            metadata_dir,
            cache_dir,
            publish_dir: self.paths.publish_dir.clone(),
            static_dir: self.paths.static_dir.clone(),
            extensions,
            follow_links: self.library.follow_links,
            include_hidden: self.library.include_hidden,
        })
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Folder key of a source path: its parent directory, or `/` for the root.
pub fn folder_of(source: &str) -> String {
    match Path::new(source).parent().map(to_slash) {
        Some(dir) if !dir.is_empty() => dir,
        _ => "/".to_string(),
    }
}

fn swap_extension(rel: &Path, ext: &str) -> PathBuf {
    rel.with_extension(ext)
}

impl Layout {
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }

    pub fn source_path(&self, source: &str) -> PathBuf {
        self.source_dir.join(source)
    }

    /// Document path relative to `metadata_dir`.
    pub fn document_rel(&self, source: &str) -> PathBuf {
        swap_extension(Path::new(source), DOCUMENT_EXT)
    }

    pub fn document_path(&self, source: &str) -> PathBuf {
        self.metadata_dir.join(self.document_rel(source))
    }

    pub fn cache_path(&self, source: &str) -> PathBuf {
        self.cache_dir
            .join(swap_extension(Path::new(source), COMPRESSED_EXT))
    }

    /// Cache artifact belonging to a document given relative to `metadata_dir`.
    pub fn cache_path_for_document(&self, document_rel: &Path) -> PathBuf {
        self.cache_dir.join(swap_extension(document_rel, COMPRESSED_EXT))
    }

    /// Publish-relative location of the compressed audio for `source`.
    pub fn compressed_path(&self, source: &str) -> String {
        let rel = swap_extension(Path::new(source), COMPRESSED_EXT);
        format!("{ASSETS_AUDIO_DIR}/{}", to_slash(&rel))
    }

    pub fn publish_path(&self, compressed_path: &str) -> PathBuf {
        self.publish_dir.join(compressed_path)
    }

    pub fn assets_audio_dir(&self) -> PathBuf {
        self.publish_dir.join(ASSETS_AUDIO_DIR)
    }

    /// Source paths (relative, `/`-separated) a document could belong to:
    /// every configured extension in both lower and upper case.
    pub fn source_candidates(&self, document_rel: &Path) -> Vec<String> {
        let mut out = Vec::with_capacity(self.extensions.len() * 2);
        for ext in &self.extensions {
            for variant in [ext.to_ascii_lowercase(), ext.to_ascii_uppercase()] {
                let candidate = to_slash(&swap_extension(document_rel, &variant));
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    pub fn settings_document(&self) -> PathBuf {
        self.metadata_dir.join("settings.json")
    }

    pub fn about_document(&self) -> PathBuf {
        self.metadata_dir.join("about.json")
    }
}

pub fn is_special_document(file_name: &str) -> bool {
    SPECIAL_DOCUMENTS.contains(&file_name)
}
