//! Field rules and file constraints
//!
//! Rules are static descriptions attached to a field in a form schema. They carry
//! no state and are evaluated by [`super::validator::FieldValidator`].

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

const MB: u64 = 1024 * 1024;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?([\w-]+\.)+[\w-]+(:\d+)?(/[^\s]*)?$").expect("valid url regex")
});
static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid mobile regex"));

/// Text patterns a field value must match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Email,
    Url,
    Mobile,
}

impl Pattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Email => EMAIL_RE.is_match(value),
            Pattern::Url => URL_RE.is_match(value),
            Pattern::Mobile => MOBILE_RE.is_match(value),
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            Pattern::Email => "validation.email_invalid",
            Pattern::Url => "validation.url_invalid",
            Pattern::Mobile => "validation.mobile_invalid",
        }
    }
}

/// MIME allow-list plus a byte ceiling for one kind of upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileConstraint {
    pub allowed_mimes: &'static [&'static str],
    /// Extensions shown to the user in the type error message
    pub allowed_label: &'static str,
    pub max_bytes: u64,
}

impl FileConstraint {
    pub const AUDIO: FileConstraint = FileConstraint {
        allowed_mimes: &["audio/mpeg", "audio/wav"],
        allowed_label: "MP3, WAV",
        max_bytes: 10 * MB,
    };

    pub const VIDEO: FileConstraint = FileConstraint {
        allowed_mimes: &["video/mp4", "video/webm", "video/ogg"],
        allowed_label: "MP4, WEBM, OGG",
        max_bytes: 500 * MB,
    };

    pub const IMAGE: FileConstraint = FileConstraint {
        allowed_mimes: &["image/jpeg", "image/png", "image/gif", "image/webp"],
        allowed_label: "JPG, PNG, GIF, WEBP",
        max_bytes: 50 * MB,
    };

    pub const DOCUMENT: FileConstraint = FileConstraint {
        allowed_mimes: &[
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "application/vnd.ms-powerpoint",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            "application/epub+zip",
            "application/x-mobipocket-ebook",
        ],
        allowed_label: "PDF, DOC, DOCX, XLS, XLSX, PPT, PPTX, EPUB, MOBI",
        max_bytes: 10 * MB,
    };

    pub const ASSIGNMENT: FileConstraint = FileConstraint {
        allowed_mimes: &[
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "text/plain",
            "application/rtf",
            "image/jpeg",
            "image/png",
            "image/gif",
        ],
        allowed_label: "PDF, DOC, DOCX, TXT, RTF, JPG, JPEG, PNG, GIF",
        max_bytes: 50 * MB,
    };

    pub const PROFILE_PICTURE: FileConstraint = FileConstraint {
        allowed_mimes: &["image/jpeg", "image/png"],
        allowed_label: "JPG, PNG",
        max_bytes: 5 * MB,
    };

    pub const SCORM_PACKAGE: FileConstraint = FileConstraint {
        allowed_mimes: &["application/zip", "application/x-zip-compressed"],
        allowed_label: "ZIP",
        max_bytes: 100 * MB,
    };

    pub fn allows(&self, mime: &str) -> bool {
        self.allowed_mimes.contains(&mime)
    }

    /// Human-readable ceiling, e.g. "10MB"
    pub fn max_label(&self) -> String {
        format!("{}MB", self.max_bytes / MB)
    }
}

/// Condition on a sibling field deciding whether a dependent field is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Sibling has exactly this value (select/radio mode)
    Equals(&'static str, &'static str),
    /// Sibling is non-empty after trimming
    HasValue(&'static str),
}

/// A single validation rule for one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// Value must be non-empty after trimming. The key selects the message.
    Required(&'static str),
    Length { min: Option<usize>, max: Option<usize> },
    /// Loosely parsed number within an inclusive range
    NumberRange { min: f64, max: Option<f64> },
    Pattern(Pattern),
    /// Date or datetime-local value not earlier than now
    NotInPast,
    /// Uploaded file must satisfy the constraint. `required` only applies when
    /// no previously uploaded file is on record.
    File { constraint: FileConstraint, required: bool },
}

impl FieldRule {
    pub const REQUIRED: FieldRule = FieldRule::Required("validation.required");
    pub const TITLE_REQUIRED: FieldRule = FieldRule::Required("validation.title_required");
    pub const PERCENTAGE: FieldRule = FieldRule::NumberRange {
        min: 0.0,
        max: Some(100.0),
    };
}

/// A file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub size: u64,
    pub path: Option<PathBuf>,
}

impl FileUpload {
    /// Describe an upload without a backing file (sizes and types supplied directly)
    pub fn new(file_name: &str, mime: &str, size: u64) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            size,
            path: None,
        }
    }

    /// Inspect a local file; the MIME type is derived from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("Not a file: {}", path.display());
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            mime: mime_for_path(path),
            file_name,
            size: metadata.len(),
            path: Some(path.to_path_buf()),
        })
    }
}

/// MIME type guessed from the file extension, `application/octet-stream` when unknown
pub fn mime_for_path(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// `parseInt`-style coercion: optional sign followed by leading digits.
/// Returns None for empty input or when no digits lead the value.
pub fn parse_loose_int(value: &str) -> Option<i64> {
    let prefix = numeric_prefix(value.trim(), false);
    prefix.parse().ok()
}

/// `parseFloat`-style coercion over the leading numeric prefix
pub fn parse_loose_float(value: &str) -> Option<f64> {
    let prefix = numeric_prefix(value.trim(), true);
    prefix.parse().ok()
}

fn numeric_prefix(s: &str, allow_fraction: bool) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => end += 1,
            b'.' if allow_fraction && !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    let prefix = &s[..end];
    // "1." parses fine, "." and "-" do not
    prefix.trim_end_matches('.')
}
