//! Durable storage for uploaded images.
//!
//! Files live flat inside one directory and are exposed read-only under
//! `PUBLIC_PREFIX`. Records only ever store the public path, so the same string
//! works for the browser (through the static file service) and for the report
//! renderer (through `UploadDir::resolve`).

use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Builds a fresh file name for an uploaded file: millisecond timestamp,
    /// a short random tag, then the sanitised client-side name.
    pub fn file_name_for(original: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let tag = Uuid::new_v4().simple().to_string();
        format!("{millis}_{}_{}", &tag[..8], sanitize_file_name(original))
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn public_path(file_name: &str) -> String {
        format!("{PUBLIC_PREFIX}/{file_name}")
    }

    /// Maps a stored public path back to an existing file inside the upload
    /// directory. Paths outside the prefix, paths with `..` or absolute parts,
    /// and files that are gone all resolve to `None`.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let relative = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let relative = Path::new(relative);
        let mut components = relative.components().peekable();
        components.peek()?;
        if !components.all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }

        let full = self.root.join(relative);
        full.is_file().then_some(full)
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    match cleaned.trim_start_matches('.') {
        "" => "image".to_string(),
        name => name.to_string(),
    }
}
