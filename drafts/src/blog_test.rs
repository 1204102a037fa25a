use super::*;
use crate::intake::{IntakeError, accept_file};
use crate::schema::PartValue;

fn valid_post() -> Snapshot {
    let mut values = BlogPostSchema.defaults();
    values.insert("title".to_owned(), FieldValue::text("Five inspection tips"));
    values.insert("content".to_owned(), FieldValue::text("<p>Check the water pressure.</p>"));
    values.insert("image".to_owned(), FieldValue::File(FileRef::new("cover.jpg", "image/jpeg", 300_000)));
    values.insert("tags".to_owned(), FieldValue::list(["House Inspection Tips", "Rental"]));
    values
}

// =============================================================================
// validation
// =============================================================================

#[test]
fn valid_post_has_no_errors() {
    assert!(BlogPostSchema.validate(&valid_post()).is_empty());
}

#[test]
fn defaults_report_every_required_field() {
    let errors = BlogPostSchema.validate(&BlogPostSchema.defaults());
    assert_eq!(errors.get("title").map(String::as_str), Some("Title is required"));
    assert_eq!(errors.get("content").map(String::as_str), Some("Content is required"));
    assert_eq!(errors.get("image").map(String::as_str), Some("Cover image is required"));
    assert_eq!(errors.get("tags").map(String::as_str), Some("Please select at least one tag"));
    assert!(!errors.contains_key("video"));
}

#[test]
fn title_length_is_counted_in_characters() {
    let mut values = valid_post();
    values.insert("title".to_owned(), FieldValue::text("é".repeat(MAX_TITLE_LENGTH)));
    assert!(!BlogPostSchema.validate(&values).contains_key("title"));

    values.insert("title".to_owned(), FieldValue::text("x".repeat(MAX_TITLE_LENGTH + 1)));
    assert_eq!(
        BlogPostSchema.validate(&values).get("title").map(String::as_str),
        Some("Title must be less than 100 characters")
    );
}

#[test]
fn content_over_limit_is_rejected() {
    let mut values = valid_post();
    values.insert("content".to_owned(), FieldValue::text("x".repeat(MAX_CONTENT_LENGTH + 1)));
    assert!(BlogPostSchema.validate(&values).contains_key("content"));
}

#[test]
fn cover_image_must_be_an_image_within_limit() {
    let mut values = valid_post();
    values.insert("image".to_owned(), FieldValue::File(FileRef::new("clip.mp4", "video/mp4", 10)));
    assert_eq!(
        BlogPostSchema.validate(&values).get("image").map(String::as_str),
        Some("Cover image must be an image (JPEG, PNG, GIF, WEBP)")
    );

    values.insert("image".to_owned(), FieldValue::File(FileRef::new("huge.png", "image/png", MAX_IMAGE_SIZE + 1)));
    assert_eq!(
        BlogPostSchema.validate(&values).get("image").map(String::as_str),
        Some("Cover image size must be less than 5MB")
    );
}

#[test]
fn optional_video_is_checked_when_present() {
    let mut values = valid_post();
    values.insert("video".to_owned(), FieldValue::File(FileRef::new("clip.mov", "video/quicktime", 10)));
    assert!(BlogPostSchema.validate(&values).contains_key("video"));

    values.insert("video".to_owned(), FieldValue::File(FileRef::new("clip.mp4", "video/mp4", MAX_VIDEO_SIZE)));
    assert!(BlogPostSchema.validate(&values).is_empty());
}

#[test]
fn more_than_five_tags_is_rejected() {
    let mut values = valid_post();
    values.insert("tags".to_owned(), FieldValue::list(TAG_OPTIONS.iter().take(6).copied()));
    assert_eq!(
        BlogPostSchema.validate(&values).get("tags").map(String::as_str),
        Some("You can select up to 5 tags only")
    );
}

// =============================================================================
// persistence + submission shape
// =============================================================================

#[test]
fn strip_media_nulls_cover_fields_only() {
    let stripped = strip_media(valid_post());
    assert_eq!(stripped.get("image"), Some(&FieldValue::Null));
    assert_eq!(stripped.get("video"), Some(&FieldValue::Null));
    assert_eq!(stripped.get("title"), Some(&FieldValue::text("Five inspection tips")));
}

#[test]
fn multipart_matches_backend_shape() {
    let parts = multipart_fields(&valid_post());
    let names: Vec<&str> = parts.iter().map(|part| part.name.as_str()).collect();
    assert_eq!(names, vec!["title", "content", "image", "tags[]", "tags[]", "status"]);

    assert_eq!(parts[2].value, PartValue::File(FileRef::new("cover.jpg", "image/jpeg", 300_000)));
    assert_eq!(parts[3], MultipartField::text("tags[]", "House Inspection Tips"));
    assert_eq!(parts.last(), Some(&MultipartField::text("status", PUBLISHED_STATUS)));
}

#[test]
fn multipart_includes_video_when_selected() {
    let mut values = valid_post();
    values.insert("video".to_owned(), FieldValue::File(FileRef::new("clip.mp4", "video/mp4", 10)));
    let parts = multipart_fields(&values);
    assert!(parts.iter().any(|part| part.name == "video"));
}

// =============================================================================
// drop-zone policies
// =============================================================================

#[test]
fn image_zone_rejects_video_drop() {
    let err = accept_file(&[FileRef::new("clip.mp4", "video/mp4", 10)], &image_policy()).unwrap_err();
    assert_eq!(err, IntakeError::InvalidType { kind: MediaKind::Image });
}

#[test]
fn image_zone_rejects_six_megabyte_file() {
    let err = accept_file(&[FileRef::new("photo.png", "image/png", 6 * MIB)], &image_policy()).unwrap_err();
    assert_eq!(err.to_string(), "File photo.png exceeds 5MB limit");
}

#[test]
fn video_zone_accepts_mp4_within_limit() {
    let file = accept_file(&[FileRef::new("tour.mp4", "video/mp4", 40 * MIB)], &video_policy()).unwrap();
    assert_eq!(file.name, "tour.mp4");
}
