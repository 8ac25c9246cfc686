use serde_json::Value;
use std::collections::BTreeMap;

use crate::api::models::value_text;

use super::rules::{Condition, FileUpload};
use super::schema::{FieldKind, FieldSpec, FormSchema, SELECTED_QUESTIONS_FIELD, TAG_FIELD};
use super::tags::TagInputState;

/// Values sent to the backend on submit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, FileUpload)>,
}

impl Submission {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Transient state of one create/edit form
#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: BTreeMap<String, String>,
    /// Newly picked uploads
    files: BTreeMap<String, FileUpload>,
    /// References to files uploaded in an earlier session (edit mode)
    existing_files: BTreeMap<String, String>,
    /// Inline error per field; presence marks the field invalid
    errors: BTreeMap<String, String>,
    pub tags: TagInputState,
    selected_questions: Vec<String>,
}

impl FormState {
    pub fn new(schema: &FormSchema) -> Self {
        let mut state = Self::default();
        state.reset(schema);
        state
    }

    /// Clear every value, file, error and tag, then apply schema defaults
    pub fn reset(&mut self, schema: &FormSchema) {
        self.values.clear();
        self.files.clear();
        self.existing_files.clear();
        self.errors.clear();
        self.selected_questions.clear();
        self.tags = if schema.comma_commits_tags {
            TagInputState::with_comma_commit()
        } else {
            TagInputState::new()
        };

        for field in &schema.fields {
            if let Some(default) = field.default {
                self.values.insert(field.id.to_string(), default.to_string());
            }
        }
    }

    /// Current value, empty when unset
    pub fn value(&self, id: &str) -> &str {
        self.values.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn set_value(&mut self, id: &str, value: &str) {
        self.values.insert(id.to_string(), value.to_string());
    }

    pub fn is_checked(&self, id: &str) -> bool {
        matches!(self.value(id), "1" | "true" | "on" | "yes")
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) {
        self.set_value(id, if checked { "1" } else { "" });
    }

    pub fn attach_file(&mut self, id: &str, file: FileUpload) {
        self.files.insert(id.to_string(), file);
    }

    pub fn file(&self, id: &str) -> Option<&FileUpload> {
        self.files.get(id)
    }

    pub fn existing_file(&self, id: &str) -> Option<&str> {
        self.existing_files.get(id).map(String::as_str)
    }

    /// File previews: (field id, display name) for new and existing uploads
    pub fn file_previews(&self) -> Vec<(String, String)> {
        let mut previews: Vec<(String, String)> = self
            .existing_files
            .iter()
            .filter(|(id, _)| !self.files.contains_key(*id))
            .map(|(id, path)| (id.clone(), path.clone()))
            .collect();
        previews.extend(
            self.files
                .iter()
                .map(|(id, file)| (id.clone(), file.file_name.clone())),
        );
        previews
    }

    /// Whether all of the field's conditions hold
    pub fn is_visible(&self, field: &FieldSpec) -> bool {
        field.when.iter().all(|condition| match condition {
            Condition::Equals(sibling, expected) => self.value(sibling) == *expected,
            Condition::HasValue(sibling) => !self.value(sibling).trim().is_empty(),
        })
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }

    pub fn is_invalid(&self, id: &str) -> bool {
        self.errors.contains_key(id)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn set_error(&mut self, id: &str, message: String) {
        self.errors.insert(id.to_string(), message);
    }

    pub fn clear_error(&mut self, id: &str) {
        self.errors.remove(id);
    }

    pub fn selected_questions(&self) -> &[String] {
        &self.selected_questions
    }

    pub fn set_selected_questions(&mut self, ids: Vec<String>) {
        self.selected_questions = ids;
    }

    /// Copy values out of an entity payload. Keys are field ids; `tags` holds a
    /// comma-separated tag string and `selected_question_ids` the picked questions.
    /// File fields record the stored file reference instead of a value.
    pub fn apply_payload(&mut self, schema: &FormSchema, payload: &Value) {
        for field in &schema.fields {
            let Some(raw) = payload.get(field.id) else {
                continue;
            };
            if raw.is_null() {
                continue;
            }
            let text = match (field.kind, raw) {
                (FieldKind::Checkbox, Value::Bool(b)) => (if *b { "1" } else { "" }).to_string(),
                _ => value_text(raw),
            };
            if field.kind == FieldKind::File {
                if !text.is_empty() {
                    self.existing_files.insert(field.id.to_string(), text);
                }
            } else {
                self.values.insert(field.id.to_string(), text);
            }
        }

        if schema.has_tags {
            if let Some(tags) = payload.get("tags") {
                self.tags.seed_from_csv(&list_text(tags));
            }
        }

        if let Some(ids) = payload.get("selected_question_ids") {
            self.selected_questions = list_text(ids)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Build the submission for the visible fields
    pub fn submission(&self, schema: &FormSchema, id: Option<&str>) -> Submission {
        let mut submission = Submission::default();
        if let Some(id) = id {
            submission.fields.push(("id".to_string(), id.to_string()));
        }

        for field in schema.fields.iter().filter(|f| self.is_visible(f)) {
            if field.kind == FieldKind::File {
                if let Some(file) = self.files.get(field.id) {
                    submission.files.push((field.id.to_string(), file.clone()));
                } else if let Some(existing) = self.existing_files.get(field.id) {
                    submission
                        .fields
                        .push((format!("existing_{}", field.id), existing.clone()));
                }
                continue;
            }
            submission
                .fields
                .push((field.id.to_string(), self.value(field.id).trim().to_string()));
        }

        if schema.has_tags {
            submission
                .fields
                .push((TAG_FIELD.to_string(), self.tags.hidden_value().to_string()));
        }
        if schema.uses_question_picker() {
            submission.fields.push((
                SELECTED_QUESTIONS_FIELD.to_string(),
                self.selected_questions.join(","),
            ));
        }

        submission
    }
}

/// Comma-joined text for a string or array payload value
fn list_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        other => value_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::schema::ContentKind;
    use serde_json::json;

    #[test]
    fn test_defaults_applied_on_reset() {
        let schema = ContentKind::Assessment.schema();
        let mut state = FormState::new(&schema);
        assert_eq!(state.value("negative_marking"), "No");
        state.set_value("negative_marking", "Yes");
        state.reset(&schema);
        assert_eq!(state.value("negative_marking"), "No");
    }

    #[test]
    fn test_apply_payload_populates_fields_tags_and_files() {
        let schema = ContentKind::Audio.schema();
        let mut state = FormState::new(&schema);
        state.apply_payload(
            &schema,
            &json!({
                "id": 17,
                "title": "Lecture 1",
                "version": 2,
                "audio_file": "uploads/audio/lecture1.mp3",
                "tags": "physics, intro",
                "mobile_support": "1"
            }),
        );
        assert_eq!(state.value("title"), "Lecture 1");
        assert_eq!(state.value("version"), "2");
        assert_eq!(state.existing_file("audio_file"), Some("uploads/audio/lecture1.mp3"));
        assert_eq!(state.tags.hidden_value(), "physics,intro");
        assert_eq!(state.file_previews(), vec![("audio_file".to_string(), "uploads/audio/lecture1.mp3".to_string())]);
    }

    #[test]
    fn test_submission_skips_hidden_fields() {
        let schema = ContentKind::External.schema();
        let mut state = FormState::new(&schema);
        state.set_value("title", " Rust Book ");
        state.set_value("content_type", "web-links-blogs");
        state.set_value("article_url", "https://doc.rust-lang.org/book/");
        state.set_value("video_url", "leftover");
        state.tags.add_tag("rust");

        let submission = state.submission(&schema, Some("5"));
        assert_eq!(submission.field("id"), Some("5"));
        assert_eq!(submission.field("title"), Some("Rust Book"));
        assert_eq!(submission.field("article_url"), Some("https://doc.rust-lang.org/book/"));
        assert_eq!(submission.field("video_url"), None);
        assert_eq!(submission.field(TAG_FIELD), Some("rust"));
    }

    #[test]
    fn test_selected_questions_from_array_payload() {
        let schema = ContentKind::Survey.schema();
        let mut state = FormState::new(&schema);
        state.apply_payload(&schema, &json!({ "title": "Pulse", "selected_question_ids": [3, 9] }));
        assert_eq!(state.selected_questions(), &["3", "9"]);
        let submission = state.submission(&schema, None);
        assert_eq!(submission.field(SELECTED_QUESTIONS_FIELD), Some("3,9"));
    }
}
