//! Uploaded file validation.
//!
//! [`validate_file`] checks size, MIME type and extension against
//! [`FileValidationOptions`] and collects every violation instead of
//! stopping at the first. [`FileValidationError`] converts into a 400
//! [`TransportError`] so upload handlers can return it directly.

use thiserror::Error;

use crate::{error::TransportError, thrown::Thrown};

/// Default upper bound on file size: 10 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Message used when an upload carries no file at all.
pub const NO_FILE_PROVIDED: &str = "No file provided";

const BAD_REQUEST: u16 = 400;
const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Metadata of one uploaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as sent by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
}

impl UploadedFile {
    /// Describe an uploaded file.
    pub fn new(original_name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            size,
        }
    }
}

/// Limits applied by [`validate_file`].
///
/// Empty allow-lists accept everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileValidationOptions {
    /// Largest accepted size in bytes.
    ///
    /// Default: [`DEFAULT_MAX_FILE_SIZE`].
    pub max_size: u64,
    /// Accepted MIME types.
    pub allowed_mime_types: Vec<String>,
    /// Accepted lower-case extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for FileValidationOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Vec::new(),
            allowed_extensions: Vec::new(),
        }
    }
}

impl FileValidationOptions {
    /// Set the size limit.
    #[must_use]
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Restrict MIME types.
    #[must_use]
    pub fn allowed_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict extensions.
    #[must_use]
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

/// An upload failed validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FileValidationError {
    /// No file was attached.
    #[error("No file provided")]
    Missing,
    /// The file broke one or more limits.
    #[error("File validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<FileValidationError> for TransportError {
    fn from(error: FileValidationError) -> Self {
        TransportError::new(error.to_string()).with_status(BAD_REQUEST)
    }
}

impl From<FileValidationError> for Thrown {
    fn from(error: FileValidationError) -> Self { Thrown::Transport(error.into()) }
}

/// Check `file` against `options`.
///
/// # Errors
///
/// Returns [`FileValidationError::Invalid`] with one message per violated
/// limit.
pub fn validate_file(
    file: &UploadedFile,
    options: &FileValidationOptions,
) -> Result<(), FileValidationError> {
    let mut errors = Vec::new();

    if file.size > options.max_size {
        errors.push(format!(
            "File size exceeds maximum allowed size of {} bytes",
            options.max_size
        ));
    }

    if !options.allowed_mime_types.is_empty()
        && !options.allowed_mime_types.contains(&file.mime_type)
    {
        errors.push(format!(
            "File type {} is not allowed. Allowed types: {}",
            file.mime_type,
            options.allowed_mime_types.join(", ")
        ));
    }

    if !options.allowed_extensions.is_empty() {
        let extension = file_extension(&file.original_name);
        if extension.is_empty() || !options.allowed_extensions.contains(&extension) {
            let shown = if extension.is_empty() { "unknown" } else { &extension };
            errors.push(format!(
                "File extension {shown} is not allowed. Allowed extensions: {}",
                options.allowed_extensions.join(", ")
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(FileValidationError::Invalid(errors))
    }
}

/// Validate every file of a multi-file upload, stopping at the first
/// failure.
///
/// # Errors
///
/// Returns [`FileValidationError::Missing`] for an empty upload, otherwise
/// the first file's [`FileValidationError::Invalid`].
pub fn validate_files(
    files: &[UploadedFile],
    options: &FileValidationOptions,
) -> Result<(), FileValidationError> {
    if files.is_empty() {
        return Err(FileValidationError::Missing);
    }
    files.iter().try_for_each(|file| validate_file(file, options))
}

/// Lower-cased text after the last `.` of `name`, or an empty string when
/// the name has no dot.
#[must_use]
pub fn file_extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
        .unwrap_or_default()
}

/// Human-readable size with up to two decimals, e.g. `1.5 KB`.
///
/// ```
/// use errorframe::file::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "sizes are rounded to two decimals for display"
)]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{value} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::classify::classify;

    fn png(size: u64) -> UploadedFile { UploadedFile::new("Photo.PNG", "image/png", size) }

    #[rstest]
    fn defaults_accept_small_files() {
        assert_eq!(validate_file(&png(1024), &FileValidationOptions::default()), Ok(()));
    }

    #[rstest]
    fn collects_every_violation() {
        let options = FileValidationOptions::default()
            .max_size(100)
            .allowed_mime_types(["application/pdf"])
            .allowed_extensions(["pdf"]);
        let error = validate_file(&png(101), &options).expect_err("three limits broken");
        assert_eq!(
            error,
            FileValidationError::Invalid(vec![
                "File size exceeds maximum allowed size of 100 bytes".to_owned(),
                "File type image/png is not allowed. Allowed types: application/pdf".to_owned(),
                "File extension png is not allowed. Allowed extensions: pdf".to_owned(),
            ])
        );
        assert!(error.to_string().starts_with("File validation failed: File size"));
    }

    #[rstest]
    fn extension_match_ignores_case() {
        let options = FileValidationOptions::default().allowed_extensions(["png", "jpg"]);
        assert_eq!(validate_file(&png(1), &options), Ok(()));
    }

    #[rstest]
    fn missing_extension_is_reported_as_unknown() {
        let options = FileValidationOptions::default().allowed_extensions(["txt"]);
        let file = UploadedFile::new("README", "text/plain", 1);
        let Err(FileValidationError::Invalid(errors)) = validate_file(&file, &options) else {
            panic!("file without extension must be rejected");
        };
        assert_eq!(
            errors,
            vec!["File extension unknown is not allowed. Allowed extensions: txt".to_owned()]
        );
    }

    #[rstest]
    fn empty_upload_is_rejected() {
        let error = validate_files(&[], &FileValidationOptions::default())
            .expect_err("no files");
        assert_eq!(error.to_string(), NO_FILE_PROVIDED);
    }

    #[rstest]
    fn multi_file_upload_stops_at_first_failure() {
        let options = FileValidationOptions::default().max_size(10);
        let files = [png(5), png(50), png(500)];
        let Err(FileValidationError::Invalid(errors)) = validate_files(&files, &options) else {
            panic!("second file must be rejected");
        };
        assert_eq!(errors.len(), 1);
    }

    #[rstest]
    fn converts_to_bad_request() {
        let thrown = Thrown::from(FileValidationError::Missing);
        let classified = classify(&thrown);
        assert_eq!(classified.status_code, Some(400));
        assert_eq!(classified.message, NO_FILE_PROVIDED);
    }

    #[rstest]
    #[case("archive.tar.GZ", "gz")]
    #[case("report.pdf", "pdf")]
    #[case("README", "")]
    #[case(".env", "env")]
    fn extensions(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(file_extension(name), expected);
    }

    #[rstest]
    #[case(0, "0 Bytes")]
    #[case(512, "512 Bytes")]
    #[case(1024, "1 KB")]
    #[case(1536, "1.5 KB")]
    #[case(1_572_864, "1.5 MB")]
    #[case(1_234_567_890, "1.15 GB")]
    fn sizes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_file_size(bytes), expected);
    }
}
