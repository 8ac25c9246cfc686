//! Field and form validation
//!
//! Validation never fails with an error: it produces inline messages stored on the
//! [`FormState`] and a boolean telling the caller whether submit may proceed.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::i18n::Translator;

use super::rules::{FieldRule, parse_loose_float};
use super::schema::{FieldKind, FieldSpec, FormCheck, FormSchema, SELECTED_QUESTIONS_FIELD, TAG_FIELD};
use super::state::FormState;

pub struct FieldValidator<'a> {
    translator: &'a Translator,
    now: NaiveDateTime,
}

impl<'a> FieldValidator<'a> {
    pub fn new(translator: &'a Translator) -> Self {
        Self {
            translator,
            now: Local::now().naive_local(),
        }
    }

    /// Use a fixed clock for "not in the past" checks
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Evaluate a field's rules without touching the form. Hidden fields always pass.
    pub fn check_field(&self, field: &FieldSpec, form: &FormState) -> Option<String> {
        if !form.is_visible(field) {
            return None;
        }

        if field.kind == FieldKind::File {
            return field
                .rules
                .iter()
                .find_map(|rule| self.check_file_rule(rule, field, form));
        }

        let value = form.value(field.id).trim();
        for rule in &field.rules {
            if let FieldRule::Required(key) = rule {
                if value.is_empty() {
                    return Some(self.translator.translate(key));
                }
            }
        }

        // Optional fields left empty skip their remaining rules
        if value.is_empty() {
            return None;
        }

        field
            .rules
            .iter()
            .find_map(|rule| self.check_value_rule(rule, field, value))
    }

    /// Validate one field and update its inline error. Returns true when valid.
    pub fn validate_field(&self, field: &FieldSpec, form: &mut FormState) -> bool {
        match self.check_field(field, form) {
            Some(message) => {
                form.set_error(field.id, message);
                false
            }
            None => {
                form.clear_error(field.id);
                true
            }
        }
    }

    /// Blur handler: validate a field by id. Unknown ids are valid.
    pub fn validate_field_by_id(&self, schema: &FormSchema, id: &str, form: &mut FormState) -> bool {
        match schema.field(id) {
            Some(field) => self.validate_field(field, form),
            None => {
                log::debug!("No field '{}' in {} form", id, schema.kind);
                true
            }
        }
    }

    /// Validate every field carrying rules, then the schema's cross-field checks
    pub fn validate_form(&self, schema: &FormSchema, form: &mut FormState) -> bool {
        let mut valid = true;

        for field in &schema.fields {
            if field.rules.is_empty() {
                form.clear_error(field.id);
                continue;
            }
            valid &= self.validate_field(field, form);
        }

        for check in &schema.checks {
            valid &= self.run_check(schema, check, form);
        }

        valid
    }

    /// Start must be strictly earlier than end. Flags the end field when it is not;
    /// clears a previous range error otherwise. Unparseable values are left to the
    /// fields' own rules.
    pub fn validate_date_range(&self, form: &mut FormState, start: &str, end: &str) -> bool {
        let (Some(start_at), Some(end_at)) = (
            parse_datetime(form.value(start)),
            parse_datetime(form.value(end)),
        ) else {
            return true;
        };

        let message = self.translator.translate("validation.date_range");
        if start_at >= end_at {
            form.set_error(end, message);
            false
        } else {
            if form.error(end) == Some(message.as_str()) {
                form.clear_error(end);
            }
            true
        }
    }

    fn run_check(&self, schema: &FormSchema, check: &FormCheck, form: &mut FormState) -> bool {
        match check {
            FormCheck::TagsRequired => {
                if form.tags.is_empty() {
                    form.set_error(TAG_FIELD, self.translator.translate("validation.tags_required"));
                    false
                } else {
                    form.clear_error(TAG_FIELD);
                    true
                }
            }
            FormCheck::DateRange { start, end } => self.validate_date_range(form, start, end),
            FormCheck::AtLeastOneChecked { fields, anchor } => {
                // Only visible checkboxes are submitted
                let visible: Vec<&str> = fields
                    .iter()
                    .copied()
                    .filter(|id| schema.field(id).is_some_and(|f| form.is_visible(f)))
                    .collect();
                if visible.is_empty() || visible.iter().any(|id| form.is_checked(id)) {
                    form.clear_error(anchor);
                    true
                } else {
                    form.set_error(
                        anchor,
                        self.translator.translate("validation.correct_answer_required"),
                    );
                    false
                }
            }
            FormCheck::QuestionsSelected { min } => {
                if form.selected_questions().len() >= *min {
                    form.clear_error(SELECTED_QUESTIONS_FIELD);
                    true
                } else {
                    let min = min.to_string();
                    form.set_error(
                        SELECTED_QUESTIONS_FIELD,
                        self.translator
                            .translate_with("validation.questions_required", &[("min", min.as_str())]),
                    );
                    false
                }
            }
        }
    }

    fn check_value_rule(&self, rule: &FieldRule, field: &FieldSpec, value: &str) -> Option<String> {
        let t = self.translator;
        match rule {
            FieldRule::Required(_) | FieldRule::File { .. } => None,
            FieldRule::Length { min, max } => {
                let len = value.chars().count();
                if let Some(min) = min.filter(|m| len < *m) {
                    return Some(t.translate_with("validation.min_length", &[("min", min.to_string().as_str())]));
                }
                if let Some(max) = max.filter(|m| len > *m) {
                    return Some(t.translate_with("validation.max_length", &[("max", max.to_string().as_str())]));
                }
                None
            }
            FieldRule::NumberRange { min, max } => {
                let Some(number) = parse_loose_float(value) else {
                    return Some(t.translate("validation.number_invalid"));
                };
                let below = number < *min;
                let above = max.is_some_and(|m| number > m);
                if !(below || above) {
                    return None;
                }
                Some(match max {
                    Some(max) => t.translate_with(
                        "validation.number_range",
                        &[("min", format_number(*min).as_str()), ("max", format_number(*max).as_str())],
                    ),
                    None => t.translate_with("validation.number_min", &[("min", format_number(*min).as_str())]),
                })
            }
            FieldRule::Pattern(pattern) => {
                if pattern.matches(value) {
                    None
                } else {
                    Some(t.translate(pattern.message_key()))
                }
            }
            FieldRule::NotInPast => {
                let Some(at) = parse_datetime(value) else {
                    return Some(t.translate("validation.date_invalid"));
                };
                let in_past = if field.kind == FieldKind::Date {
                    at.date() < self.now.date()
                } else {
                    at < self.now
                };
                if in_past {
                    Some(t.translate("validation.date_past"))
                } else {
                    None
                }
            }
        }
    }

    fn check_file_rule(&self, rule: &FieldRule, field: &FieldSpec, form: &FormState) -> Option<String> {
        let FieldRule::File { constraint, required } = rule else {
            return None;
        };
        let t = self.translator;

        match form.file(field.id) {
            Some(upload) => {
                if !constraint.allows(&upload.mime) {
                    Some(t.translate_with("validation.file_type", &[("allowed", constraint.allowed_label)]))
                } else if upload.size > constraint.max_bytes {
                    Some(t.translate_with("validation.file_size", &[("max", constraint.max_label().as_str())]))
                } else {
                    None
                }
            }
            // Edit mode tolerates "no new file" when one is already stored
            None if *required && form.existing_file(field.id).is_none() => {
                Some(t.translate("validation.file_required"))
            }
            None => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parse `date` and `datetime-local` style values. Dates resolve to midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let formats = [
        "%Y-%m-%dT%H:%M",    // 2024-01-15T10:30 (datetime-local)
        "%Y-%m-%dT%H:%M:%S", // 2024-01-15T10:30:00
        "%Y-%m-%d %H:%M:%S", // 2024-01-15 10:30:00
        "%Y-%m-%d %H:%M",    // 2024-01-15 10:30
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::rules::FileUpload;
    use crate::forms::schema::ContentKind;

    const MB: u64 = 1024 * 1024;

    fn fixed_now() -> NaiveDateTime {
        parse_datetime("2026-03-01T09:00").unwrap()
    }

    #[test]
    fn test_whitespace_title_blocks_submit_with_one_error() {
        let t = Translator::english();
        let v = FieldValidator::new(&t).at(fixed_now());
        let schema = ContentKind::Scorm.schema();
        let mut form = FormState::new(&schema);
        form.set_value("title", "   ");

        assert!(!v.validate_form(&schema, &mut form));
        assert_eq!(form.error("title"), Some("Title is required"));
        assert_eq!(form.errors().keys().filter(|k| *k == "title").count(), 1);

        // Re-validating does not stack messages
        v.validate_form(&schema, &mut form);
        assert_eq!(form.errors().keys().filter(|k| *k == "title").count(), 1);

        form.set_value("title", "Onboarding");
        assert!(v.validate_field_by_id(&schema, "title", &mut form));
        assert!(!form.is_invalid("title"));
    }

    #[test]
    fn test_date_range() {
        let t = Translator::english();
        let v = FieldValidator::new(&t).at(fixed_now());
        let schema = ContentKind::Announcement.schema();
        let mut form = FormState::new(&schema);

        form.set_value("start_datetime", "2026-04-01T10:00");
        form.set_value("end_datetime", "2026-04-01T10:00");
        assert!(!v.validate_date_range(&mut form, "start_datetime", "end_datetime"));
        assert!(form.is_invalid("end_datetime"));
        assert!(!form.is_invalid("start_datetime"));

        form.set_value("end_datetime", "2026-03-31T10:00");
        assert!(!v.validate_date_range(&mut form, "start_datetime", "end_datetime"));

        form.set_value("end_datetime", "2026-04-02T08:00");
        assert!(v.validate_date_range(&mut form, "start_datetime", "end_datetime"));
        assert!(!form.is_invalid("end_datetime"));
    }

    #[test]
    fn test_start_date_not_in_past() {
        let t = Translator::english();
        let v = FieldValidator::new(&t).at(fixed_now());
        let schema = ContentKind::Announcement.schema();
        let mut form = FormState::new(&schema);
        form.set_value("start_datetime", "2026-02-28T23:59");
        assert!(!v.validate_field_by_id(&schema, "start_datetime", &mut form));
        assert_eq!(form.error("start_datetime"), Some("Date cannot be in the past"));
    }

    #[test]
    fn test_file_type_then_size_then_ok() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Audio.schema();
        let mut form = FormState::new(&schema);

        form.attach_file("audio_file", FileUpload::new("song.ogg", "audio/ogg", MB));
        assert!(!v.validate_field_by_id(&schema, "audio_file", &mut form));
        assert_eq!(form.error("audio_file"), Some("Invalid file type. Allowed: MP3, WAV"));

        form.attach_file("audio_file", FileUpload::new("long.mp3", "audio/mpeg", 10 * MB + 1));
        assert!(!v.validate_field_by_id(&schema, "audio_file", &mut form));
        assert_eq!(form.error("audio_file"), Some("File size must not exceed 10MB"));

        form.attach_file("audio_file", FileUpload::new("ok.mp3", "audio/mpeg", 10 * MB));
        assert!(v.validate_field_by_id(&schema, "audio_file", &mut form));
        assert!(!form.is_invalid("audio_file"));
    }

    #[test]
    fn test_missing_file_tolerated_when_already_uploaded() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Document.schema();
        let mut form = FormState::new(&schema);
        assert!(!v.validate_field_by_id(&schema, "document_file", &mut form));
        assert_eq!(form.error("document_file"), Some("Please upload a file"));

        form.apply_payload(&schema, &serde_json::json!({ "document_file": "uploads/doc/handbook.pdf" }));
        assert!(v.validate_field_by_id(&schema, "document_file", &mut form));
    }

    #[test]
    fn test_percentage_range_and_missing_vs_zero() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Assessment.schema();
        let mut form = FormState::new(&schema);

        form.set_value("passing_percentage", "");
        assert!(!v.validate_field_by_id(&schema, "passing_percentage", &mut form));
        assert_eq!(form.error("passing_percentage"), Some("This field is required"));

        form.set_value("passing_percentage", "0");
        assert!(v.validate_field_by_id(&schema, "passing_percentage", &mut form));

        form.set_value("passing_percentage", "101");
        assert!(!v.validate_field_by_id(&schema, "passing_percentage", &mut form));
        assert_eq!(form.error("passing_percentage"), Some("Value must be between 0 and 100"));

        form.set_value("passing_percentage", "abc");
        assert!(!v.validate_field_by_id(&schema, "passing_percentage", &mut form));
        assert_eq!(form.error("passing_percentage"), Some("Please enter a valid number"));
    }

    #[test]
    fn test_conditional_field_only_checked_when_mode_selected() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Assessment.schema();
        let mut form = FormState::new(&schema);

        // Negative marking defaults to "No": percentage not required
        assert!(v.validate_field_by_id(&schema, "negative_marking_percentage", &mut form));

        form.set_value("negative_marking", "Yes");
        assert!(!v.validate_field_by_id(&schema, "negative_marking_percentage", &mut form));

        form.set_value("negative_marking_percentage", "25");
        assert!(v.validate_field_by_id(&schema, "negative_marking_percentage", &mut form));
    }

    #[test]
    fn test_cross_field_checks() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Question.schema();
        let mut form = FormState::new(&schema);
        form.set_value("question_text", "2 + 2 = ?");
        form.set_value("marks", "1");
        form.set_value("option_1", "3");
        form.set_value("option_2", "4");

        assert!(!v.validate_form(&schema, &mut form));
        assert!(form.is_invalid(TAG_FIELD));
        assert_eq!(form.error("correct_1"), Some("Please mark at least one correct answer"));

        form.tags.add_tag("arithmetic");
        form.set_checked("correct_2", true);
        assert!(v.validate_form(&schema, &mut form));
        assert!(!form.has_errors());
    }

    fn objective_question(schema: &FormSchema) -> FormState {
        let mut form = FormState::new(schema);
        form.set_value("question_text", "Largest planet?");
        form.set_value("marks", "2");
        form.set_value("option_1", "Mars");
        form.set_value("option_2", "Jupiter");
        form.tags.add_tag("astronomy");
        form
    }

    #[test]
    fn test_hidden_correct_answer_does_not_count() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Question.schema();
        let mut form = objective_question(&schema);

        // Option 3 is empty so its checkbox is hidden and never submitted
        form.set_checked("correct_3", true);
        assert!(!v.validate_form(&schema, &mut form));
        assert_eq!(form.error("correct_1"), Some("Please mark at least one correct answer"));

        form.set_value("option_3", "Saturn");
        assert!(v.validate_form(&schema, &mut form));
        let submission = form.submission(&schema, None);
        assert_eq!(submission.field("correct_3"), Some("1"));
    }

    #[test]
    fn test_subjective_question_needs_no_correct_answer() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::Question.schema();
        let mut form = FormState::new(&schema);
        form.set_value("question_text", "Explain orbital resonance.");
        form.set_value("question_type", "subjective");
        form.set_value("marks", "5");
        form.tags.add_tag("astronomy");

        assert!(v.validate_form(&schema, &mut form));
        assert!(!form.has_errors());
        let submission = form.submission(&schema, None);
        assert_eq!(submission.field("option_1"), None);
        assert_eq!(submission.field("correct_1"), None);
    }

    #[test]
    fn test_user_patterns() {
        let t = Translator::english();
        let v = FieldValidator::new(&t);
        let schema = ContentKind::User.schema();
        let mut form = FormState::new(&schema);
        form.set_value("full_name", "Ada Lovelace");
        form.set_value("email", "ada@");
        form.set_value("contact_number", "12345");
        assert!(!v.validate_form(&schema, &mut form));
        assert_eq!(form.error("email"), Some("Please enter a valid email address"));
        assert!(form.is_invalid("contact_number"));
        // Optional profile picture absent: no error
        assert!(!form.is_invalid("profile_picture"));
    }
}
