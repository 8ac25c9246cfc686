//! Translation lookup
//!
//! Messages are keyed by dotted strings (`validation.title_required`). Lookup order
//! is the active locale catalog, then the built-in English catalog, then the raw key.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Built-in English messages. Placeholders use `{name}` syntax.
const ENGLISH: &[(&str, &str)] = &[
    ("validation.required", "This field is required"),
    ("validation.title_required", "Title is required"),
    ("validation.tags_required", "Please add at least one tag"),
    ("validation.number_invalid", "Please enter a valid number"),
    ("validation.number_range", "Value must be between {min} and {max}"),
    ("validation.number_min", "Value must be at least {min}"),
    ("validation.min_length", "Must be at least {min} characters"),
    ("validation.max_length", "Must not exceed {max} characters"),
    ("validation.email_invalid", "Please enter a valid email address"),
    ("validation.url_invalid", "Please enter a valid URL"),
    ("validation.mobile_invalid", "Please enter a valid 10 digit mobile number"),
    ("validation.date_invalid", "Please enter a valid date"),
    ("validation.date_past", "Date cannot be in the past"),
    ("validation.date_range", "End date must be after the start date"),
    ("validation.file_required", "Please upload a file"),
    ("validation.file_type", "Invalid file type. Allowed: {allowed}"),
    ("validation.file_size", "File size must not exceed {max}"),
    ("validation.correct_answer_required", "Please mark at least one correct answer"),
    ("validation.questions_required", "Please select at least {min} question(s)"),
    ("modal.add_scorm", "Add SCORM Package"),
    ("modal.edit_scorm", "Edit SCORM Package"),
    ("modal.add_video", "Add Video"),
    ("modal.edit_video", "Edit Video"),
    ("modal.add_audio", "Add Audio"),
    ("modal.edit_audio", "Edit Audio"),
    ("modal.add_image", "Add Image"),
    ("modal.edit_image", "Edit Image"),
    ("modal.add_document", "Add Document"),
    ("modal.edit_document", "Edit Document"),
    ("modal.add_external", "Add External Content"),
    ("modal.edit_external", "Edit External Content"),
    ("modal.add_assessment", "Add Assessment"),
    ("modal.edit_assessment", "Edit Assessment"),
    ("modal.add_survey", "Add Survey"),
    ("modal.edit_survey", "Edit Survey"),
    ("modal.add_feedback", "Add Feedback"),
    ("modal.edit_feedback", "Edit Feedback"),
    ("modal.add_announcement", "Add Announcement"),
    ("modal.edit_announcement", "Edit Announcement"),
    ("modal.add_user", "Add User"),
    ("modal.edit_user", "Edit User"),
    ("modal.add_assignment_submission", "Submit Assignment"),
    ("modal.edit_assignment_submission", "Update Submission"),
    ("modal.add_question", "Add Question"),
    ("modal.edit_question", "Edit Question"),
    ("list.no_results", "No records found"),
    ("list.showing_all", "Showing all {count} {noun}"),
    ("list.load_failed", "Failed to load data. Please try again."),
    ("delete.confirm", "Are you sure you want to delete \"{title}\"?"),
];

/// Dotted-key message catalog with English fallback
#[derive(Debug, Clone)]
pub struct Translator {
    locale: String,
    messages: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator {
    /// Catalog containing only the built-in English messages
    pub fn english() -> Self {
        Self {
            locale: "en".to_string(),
            messages: HashMap::new(),
            fallback: ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Build a translator from an already-parsed catalog (nested or flat JSON object)
    pub fn from_value(locale: &str, catalog: &Value) -> Self {
        let mut messages = HashMap::new();
        flatten_catalog("", catalog, &mut messages);
        Self {
            locale: locale.to_string(),
            messages,
            ..Self::english()
        }
    }

    /// Load `<dir>/<locale>.json`. English needs no file; a missing English file is not an error.
    pub fn load(dir: &Path, locale: &str) -> Result<Self> {
        let path = dir.join(format!("{}.json", locale));
        if !path.exists() {
            if locale == "en" {
                return Ok(Self::english());
            }
            anyhow::bail!("Translation file not found: {}", path.display());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read translation file: {}", path.display()))?;
        let catalog: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid translation file: {}", path.display()))?;

        log::debug!("Loaded {} translations from {}", locale, path.display());
        Ok(Self::from_value(locale, &catalog))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Look up a key, falling back to English and then to the key itself
    pub fn translate(&self, key: &str) -> String {
        self.messages
            .get(key)
            .or_else(|| self.fallback.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Look up a key and substitute `{name}` placeholders
    pub fn translate_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut message = self.translate(key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }
}

fn flatten_catalog(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let full = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_catalog(&full, child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
