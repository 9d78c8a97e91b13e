//! Client-side file checks applied before a file enters a slot.

use std::path::Path;

use crate::config::{ACCEPTED_MIME_TYPES, MAX_FILE_SIZE};
use crate::error::FileRejection;

use super::slot::LocalFile;

/// Reject files over 5 MiB, then files outside the accepted MIME types.
pub fn validate_file(file: &LocalFile) -> Result<(), FileRejection> {
    validate_parts(file.size(), &file.mime_type)
}

/// Same checks on a bare size / MIME pair.
pub fn validate_parts(size: u64, mime_type: &str) -> Result<(), FileRejection> {
    if size > MAX_FILE_SIZE {
        return Err(FileRejection::TooLarge { size });
    }

    let normalized = mime_type.trim().to_lowercase();
    if !ACCEPTED_MIME_TYPES.contains(&normalized.as_str()) {
        return Err(FileRejection::UnsupportedType { mime_type: mime_type.to_string() });
    }

    Ok(())
}

/// Best-effort MIME type from a file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_five_mib_is_accepted() {
        assert!(validate_parts(5 * 1024 * 1024, "application/pdf").is_ok());
    }

    #[test]
    fn test_one_byte_over_is_rejected() {
        let err = validate_parts(5 * 1024 * 1024 + 1, "application/pdf").unwrap_err();
        assert_eq!(err, FileRejection::TooLarge { size: 5 * 1024 * 1024 + 1 });
    }

    #[test]
    fn test_plain_text_always_rejected() {
        for size in [0, 1, 1024, 5 * 1024 * 1024] {
            assert!(matches!(
                validate_parts(size, "text/plain"),
                Err(FileRejection::UnsupportedType { .. })
            ));
        }
    }

    #[test]
    fn test_six_mb_pdf_reports_size() {
        let file = LocalFile::new("estimate.pdf", "application/pdf", vec![0; 6 * 1024 * 1024]);
        let err = validate_file(&file).unwrap_err();
        assert!(err.to_string().contains("exceeds 5MB"));
    }

    #[test]
    fn test_accepted_types() {
        for mime in ["image/jpeg", "image/png", "image/gif", "application/pdf", "IMAGE/PNG"] {
            assert!(validate_parts(10, mime).is_ok(), "{mime}");
        }
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("front.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("rc.pdf")), "application/pdf");
        assert_eq!(mime_from_path(Path::new("notes")), "application/octet-stream");
    }
}
