//! Multi-file uploader: an accumulating, de-duplicated file list plus the
//! scoped preview URLs rendered for it.
//!
//! Unlike the single-file cover zones in [`crate::intake`], this list keeps
//! every distinct file the user drops. Two files are the same when name, size
//! and modification time agree.

use crate::snapshot::FileRef;

/// Default ceiling for the generic uploader, in decimal megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 20;

/// Why a dropped file was left out of the list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("{name}: file type {mime} is not accepted")]
    InvalidType { name: String, mime: String },

    #[error("{name}: file is larger than {limit} bytes")]
    TooLarge { name: String, limit: u64 },

    #[error("{name}: too many files (limit {limit})")]
    TooMany { name: String, limit: usize },
}

/// Result of one `FileList::add` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddReport {
    pub added: usize,
    pub duplicates: usize,
    pub rejected: Vec<UploadRejection>,
}

#[derive(Debug, Clone)]
pub struct FileList {
    files: Vec<FileRef>,
    /// MIME patterns: exact (`application/pdf`) or category (`image/*`). Empty accepts all.
    accepted_types: Vec<String>,
    max_size: u64,
    max_files: Option<usize>,
}

impl Default for FileList {
    fn default() -> Self {
        Self::new()
    }
}

impl FileList {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            accepted_types: Vec::new(),
            max_size: DEFAULT_MAX_SIZE_MB * 1_000_000,
            max_files: None,
        }
    }

    #[must_use]
    pub fn with_accepted_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    #[must_use]
    pub fn with_max_files(mut self, limit: usize) -> Self {
        self.max_files = Some(limit);
        self
    }

    #[must_use]
    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check type and size of a single file.
    ///
    /// # Errors
    ///
    /// Returns the rejection the uploader would report for `file`.
    pub fn accepts(&self, file: &FileRef) -> Result<(), UploadRejection> {
        if !self.type_allowed(&file.mime) {
            return Err(UploadRejection::InvalidType { name: file.name.clone(), mime: file.mime.clone() });
        }
        if file.size > self.max_size {
            return Err(UploadRejection::TooLarge { name: file.name.clone(), limit: self.max_size });
        }
        Ok(())
    }

    /// Append every new, acceptable file in drop order.
    pub fn add(&mut self, files: impl IntoIterator<Item = FileRef>) -> AddReport {
        let mut report = AddReport::default();
        for file in files {
            if let Err(rejection) = self.accepts(&file) {
                report.rejected.push(rejection);
                continue;
            }
            if self.files.iter().any(|existing| existing.is_same_file(&file)) {
                report.duplicates += 1;
                continue;
            }
            if let Some(limit) = self.max_files {
                if self.files.len() >= limit {
                    report.rejected.push(UploadRejection::TooMany { name: file.name, limit });
                    continue;
                }
            }
            self.files.push(file);
            report.added += 1;
        }
        report
    }

    /// Remove `file` (by identity); `false` if it was not listed.
    pub fn remove(&mut self, file: &FileRef) -> bool {
        let before = self.files.len();
        self.files.retain(|existing| !existing.is_same_file(file));
        self.files.len() != before
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    fn type_allowed(&self, mime: &str) -> bool {
        self.accepted_types.is_empty()
            || self.accepted_types.iter().any(|pattern| match pattern.strip_suffix("/*") {
                Some(category) => mime.split_once('/').is_some_and(|(head, _)| head == category),
                None => pattern == mime,
            })
    }
}

// =============================================================================
// PREVIEW URLS
// =============================================================================

/// Creates and releases blob URLs for local previews.
pub trait ObjectUrls {
    fn create(&mut self, file: &FileRef) -> String;
    fn revoke(&mut self, url: &str);
}

/// Preview URLs for the image and video entries of a file list.
///
/// Each URL lives until the next `refresh` or until the set is dropped.
pub struct PreviewUrls<U: ObjectUrls> {
    urls: U,
    live: Vec<(FileRef, String)>,
}

impl<U: ObjectUrls> PreviewUrls<U> {
    #[must_use]
    pub fn new(urls: U) -> Self {
        Self { urls, live: Vec::new() }
    }

    /// Revoke every current URL, then create one per previewable file.
    pub fn refresh(&mut self, files: &[FileRef]) {
        self.revoke_all();
        for file in files {
            if is_previewable(&file.mime) {
                let url = self.urls.create(file);
                self.live.push((file.clone(), url));
            }
        }
    }

    #[must_use]
    pub fn url_for(&self, file: &FileRef) -> Option<&str> {
        self.live
            .iter()
            .find(|(owner, _)| owner.is_same_file(file))
            .map(|(_, url)| url.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn revoke_all(&mut self) {
        for (_, url) in self.live.drain(..) {
            self.urls.revoke(&url);
        }
    }
}

impl<U: ObjectUrls> Drop for PreviewUrls<U> {
    fn drop(&mut self) {
        self.revoke_all();
    }
}

fn is_previewable(mime: &str) -> bool {
    mime.starts_with("image/") || mime.starts_with("video/")
}

#[cfg(test)]
#[path = "uploads_test.rs"]
mod tests;
