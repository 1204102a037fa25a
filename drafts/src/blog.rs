//! Blog-post authoring form: fields, limits, validation and submission shape.
//!
//! SYSTEM CONTEXT
//! ==============
//! The create-blog page autosaves under [`BLOG_DRAFT_KEY`], strips media with
//! [`strip_media`] before persisting, and submits through the proxy's
//! `/api/create-blog` endpoint as `multipart/form-data`.

use std::sync::Arc;

use crate::intake::{IntakePolicy, MIB, MediaKind};
use crate::schema::{FieldErrors, FieldKind, FieldSpec, FormSchema, MultipartField, encode_multipart};
use crate::session::FormSession;
use crate::snapshot::{FieldValue, FileRef, Snapshot};
use crate::store::DraftStore;

/// Local-storage slot for the in-progress blog post.
pub const BLOG_DRAFT_KEY: &str = "blog_post_draft";

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_CONTENT_LENGTH: usize = 5000;
pub const MAX_IMAGE_SIZE: u64 = 5 * MIB;
pub const MAX_VIDEO_SIZE: u64 = 50 * MIB;
pub const MAX_TAGS: usize = 5;

pub const VALID_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const VALID_VIDEO_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/ogg"];

/// Types the cover-image drop zone offers in its file picker.
pub const COVER_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];
/// Types the cover-video drop zone offers in its file picker.
pub const COVER_VIDEO_TYPES: [&str; 1] = ["video/mp4"];

pub const TAG_OPTIONS: [&str; 8] = [
    "House Hunting",
    "Rental",
    "EzyRent",
    "House Inspection Tips",
    "Smart Renting",
    "EzyRent Nigeria",
    "Affordable Living",
    "Student Housing",
];

/// Status sent with every submission from the create page.
pub const PUBLISHED_STATUS: &str = "PUBLISHED";

const BLOG_FIELDS: [FieldSpec; 5] = [
    FieldSpec { name: "title", kind: FieldKind::Text },
    FieldSpec { name: "content", kind: FieldKind::Text },
    FieldSpec { name: "image", kind: FieldKind::File(MediaKind::Image) },
    FieldSpec { name: "video", kind: FieldKind::File(MediaKind::Video) },
    FieldSpec { name: "tags", kind: FieldKind::List },
];

#[derive(Clone, Copy, Debug, Default)]
pub struct BlogPostSchema;

impl FormSchema for BlogPostSchema {
    fn fields(&self) -> &[FieldSpec] {
        &BLOG_FIELDS
    }

    fn validate(&self, values: &Snapshot) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let mut fail = |field: &str, message: &str| {
            errors.insert(field.to_owned(), message.to_owned());
        };

        let title = text_of(values, "title");
        if title.is_empty() {
            fail("title", "Title is required");
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            fail("title", "Title must be less than 100 characters");
        }

        let content = text_of(values, "content");
        if content.is_empty() {
            fail("content", "Content is required");
        } else if content.chars().count() > MAX_CONTENT_LENGTH {
            fail("content", "Content must be less than 5000 characters");
        }

        match file_of(values, "image") {
            None => fail("image", "Cover image is required"),
            Some(file) if !VALID_IMAGE_TYPES.contains(&file.mime.as_str()) => {
                fail("image", "Cover image must be an image (JPEG, PNG, GIF, WEBP)");
            }
            Some(file) if file.size > MAX_IMAGE_SIZE => fail("image", "Cover image size must be less than 5MB"),
            Some(_) => {}
        }

        if let Some(file) = file_of(values, "video") {
            if !VALID_VIDEO_TYPES.contains(&file.mime.as_str()) {
                fail("video", "Cover video must be a video (MP4, WEBM, OGG)");
            } else if file.size > MAX_VIDEO_SIZE {
                fail("video", "Cover video size must be less than 50MB");
            }
        }

        let tags = values.get("tags").and_then(FieldValue::as_list).map_or(0, <[String]>::len);
        if tags == 0 {
            fail("tags", "Please select at least one tag");
        } else if tags > MAX_TAGS {
            fail("tags", "You can select up to 5 tags only");
        }

        errors
    }

    fn multipart(&self, values: &Snapshot) -> Vec<MultipartField> {
        let mut parts = encode_multipart(&BLOG_FIELDS, values);
        parts.push(MultipartField::text("status", PUBLISHED_STATUS));
        parts
    }

    fn submitted_notice(&self) -> &'static str {
        "Blog post created successfully"
    }
}

/// Autosave sanitizer: cover media are live file handles and never persist.
#[must_use]
pub fn strip_media(mut data: Snapshot) -> Snapshot {
    data.insert("image".to_owned(), FieldValue::Null);
    data.insert("video".to_owned(), FieldValue::Null);
    data
}

/// Submission parts for a blog post, ending with `status=PUBLISHED`.
#[must_use]
pub fn multipart_fields(values: &Snapshot) -> Vec<MultipartField> {
    BlogPostSchema.multipart(values)
}

/// Session for the create-blog page: blog schema, blog draft slot, media stripped on save.
#[must_use]
pub fn blog_session(drafts: DraftStore) -> FormSession {
    FormSession::new(Arc::new(BlogPostSchema), drafts, BLOG_DRAFT_KEY).with_sanitizer(strip_media)
}

/// Intake rules for the cover-image drop zone.
#[must_use]
pub fn image_policy() -> IntakePolicy {
    IntakePolicy::new(MediaKind::Image, MAX_IMAGE_SIZE).with_accepted_types(COVER_IMAGE_TYPES)
}

/// Intake rules for the cover-video drop zone.
#[must_use]
pub fn video_policy() -> IntakePolicy {
    IntakePolicy::new(MediaKind::Video, MAX_VIDEO_SIZE).with_accepted_types(COVER_VIDEO_TYPES)
}

fn text_of<'a>(values: &'a Snapshot, field: &str) -> &'a str {
    values.get(field).and_then(FieldValue::as_text).unwrap_or_default()
}

fn file_of<'a>(values: &'a Snapshot, field: &str) -> Option<&'a FileRef> {
    values.get(field).and_then(FieldValue::as_file)
}

#[cfg(test)]
#[path = "blog_test.rs"]
mod tests;
