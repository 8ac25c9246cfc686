//! Declarative form schemas, one per content kind
//!
//! A schema lists the fields of a create/edit form, the rules attached to each,
//! the cross-field checks run at submit, and the backend endpoints the form talks to.

use std::fmt;

use super::rules::{Condition, FieldRule, FileConstraint, Pattern};

/// Id of the hidden field carrying the comma-joined tag list
pub const TAG_FIELD: &str = "tagList";

/// Id under which the picked question ids are submitted
pub const SELECTED_QUESTIONS_FIELD: &str = "selected_questions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ContentKind {
    Scorm,
    Video,
    Audio,
    Image,
    Document,
    External,
    Assessment,
    Survey,
    Feedback,
    Announcement,
    User,
    AssignmentSubmission,
    Question,
}

impl ContentKind {
    pub const ALL: [ContentKind; 13] = [
        ContentKind::Scorm,
        ContentKind::Video,
        ContentKind::Audio,
        ContentKind::Image,
        ContentKind::Document,
        ContentKind::External,
        ContentKind::Assessment,
        ContentKind::Survey,
        ContentKind::Feedback,
        ContentKind::Announcement,
        ContentKind::User,
        ContentKind::AssignmentSubmission,
        ContentKind::Question,
    ];

    /// Key used in `modal.add_<key>` / `modal.edit_<key>` titles
    pub fn key(&self) -> &'static str {
        match self {
            ContentKind::Scorm => "scorm",
            ContentKind::Video => "video",
            ContentKind::Audio => "audio",
            ContentKind::Image => "image",
            ContentKind::Document => "document",
            ContentKind::External => "external",
            ContentKind::Assessment => "assessment",
            ContentKind::Survey => "survey",
            ContentKind::Feedback => "feedback",
            ContentKind::Announcement => "announcement",
            ContentKind::User => "user",
            ContentKind::AssignmentSubmission => "assignment_submission",
            ContentKind::Question => "question",
        }
    }

    pub fn schema(&self) -> FormSchema {
        match self {
            ContentKind::Scorm => scorm_schema(),
            ContentKind::Video => media_schema(*self, "video_file", FileConstraint::VIDEO),
            ContentKind::Audio => media_schema(*self, "audio_file", FileConstraint::AUDIO),
            ContentKind::Image => media_schema(*self, "image_file", FileConstraint::IMAGE),
            ContentKind::Document => document_schema(),
            ContentKind::External => external_schema(),
            ContentKind::Assessment => assessment_schema(),
            ContentKind::Survey => question_set_schema(*self, "addOrEditSurvey", "deleteSurvey"),
            ContentKind::Feedback => question_set_schema(*self, "addOrEditFeedback", "deleteFeedback"),
            ContentKind::Announcement => announcement_schema(),
            ContentKind::User => user_schema(),
            ContentKind::AssignmentSubmission => assignment_schema(),
            ContentKind::Question => question_schema(),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Select,
    Radio,
    Checkbox,
    Date,
    DateTime,
    File,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::TextArea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::File => "file",
        };
        write!(f, "{}", name)
    }
}

/// One form field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: Vec<FieldRule>,
    /// All conditions must hold for the field to be shown and validated
    pub when: Vec<Condition>,
    /// Value applied on reset (radio/select defaults)
    pub default: Option<&'static str>,
}

impl FieldSpec {
    pub fn new(id: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            label,
            kind,
            rules: Vec::new(),
            when: Vec::new(),
            default: None,
        }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when.push(condition);
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// Cross-field checks run by `validate_form` after the per-field rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCheck {
    TagsRequired,
    /// Start must be strictly before end; the end field is flagged otherwise
    DateRange { start: &'static str, end: &'static str },
    /// At least one of the checkboxes must be checked; the error is shown on `anchor`
    AtLeastOneChecked {
        fields: &'static [&'static str],
        anchor: &'static str,
    },
    QuestionsSelected { min: usize },
}

/// Backend routes of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub controller: &'static str,
    pub add: &'static str,
    pub edit: &'static str,
    pub delete: &'static str,
}

#[derive(Debug, Clone)]
pub struct FormSchema {
    pub kind: ContentKind,
    /// `data-*` attribute carrying the edit payload
    pub payload_attr: &'static str,
    pub endpoints: Endpoints,
    pub fields: Vec<FieldSpec>,
    pub checks: Vec<FormCheck>,
    pub has_tags: bool,
    /// Whether `,` commits a tag in addition to Enter
    pub comma_commits_tags: bool,
}

impl FormSchema {
    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn add_title_key(&self) -> String {
        format!("modal.add_{}", self.kind.key())
    }

    pub fn edit_title_key(&self) -> String {
        format!("modal.edit_{}", self.kind.key())
    }

    pub fn uses_question_picker(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(c, FormCheck::QuestionsSelected { .. }))
    }
}

fn title_field() -> FieldSpec {
    FieldSpec::new("title", "Title", FieldKind::Text)
        .rule(FieldRule::TITLE_REQUIRED)
        .rule(FieldRule::Length { min: None, max: Some(255) })
}

fn description_field() -> FieldSpec {
    FieldSpec::new("description", "Description", FieldKind::TextArea)
        .rule(FieldRule::Length { min: None, max: Some(2000) })
}

fn version_field() -> FieldSpec {
    FieldSpec::new("version", "Version", FieldKind::Text)
        .rule(FieldRule::REQUIRED)
        .rule(FieldRule::NumberRange { min: 0.0, max: None })
}

fn language_field() -> FieldSpec {
    FieldSpec::new("language", "Language", FieldKind::Select)
}

fn time_limit_field() -> FieldSpec {
    FieldSpec::new("time_limit", "Time Limit (minutes)", FieldKind::Number)
        .rule(FieldRule::NumberRange { min: 0.0, max: None })
}

fn mobile_support_field() -> FieldSpec {
    FieldSpec::new("mobile_support", "Mobile & Tablet Support", FieldKind::Radio).default_value("0")
}

fn vlr_endpoints(action: &'static str, delete: &'static str) -> Endpoints {
    Endpoints {
        controller: "VLRController",
        add: action,
        edit: action,
        delete,
    }
}

fn scorm_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::Scorm,
        payload_attr: "data-scorm",
        endpoints: vlr_endpoints("addOrEditScormPackage", "deleteScormPackage"),
        fields: vec![
            title_field(),
            FieldSpec::new("scorm_category", "SCORM Category", FieldKind::Select)
                .rule(FieldRule::REQUIRED),
            FieldSpec::new("zip_file", "SCORM Package", FieldKind::File).rule(FieldRule::File {
                constraint: FileConstraint::SCORM_PACKAGE,
                required: true,
            }),
            version_field(),
            language_field(),
            time_limit_field(),
            description_field(),
            mobile_support_field(),
            FieldSpec::new("assessment", "Assessment Included", FieldKind::Radio).default_value("0"),
        ],
        checks: vec![FormCheck::TagsRequired],
        has_tags: true,
        comma_commits_tags: false,
    }
}

fn media_schema(kind: ContentKind, file_field: &'static str, constraint: FileConstraint) -> FormSchema {
    let (payload_attr, action, delete) = match kind {
        ContentKind::Video => ("data-video", "addOrEditVideoPackage", "deleteVideoPackage"),
        ContentKind::Audio => ("data-audio", "addOrEditAudioPackage", "deleteAudioPackage"),
        _ => ("data-image", "addOrEditImagePackage", "deleteImagePackage"),
    };
    FormSchema {
        kind,
        payload_attr,
        endpoints: vlr_endpoints(action, delete),
        fields: vec![
            title_field(),
            FieldSpec::new(file_field, "File", FieldKind::File).rule(FieldRule::File {
                constraint,
                required: true,
            }),
            version_field(),
            language_field(),
            time_limit_field(),
            description_field(),
            mobile_support_field(),
        ],
        checks: vec![FormCheck::TagsRequired],
        has_tags: true,
        comma_commits_tags: false,
    }
}

fn document_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::Document,
        payload_attr: "data-document",
        endpoints: vlr_endpoints("addOrEditDocument", "deleteDocument"),
        fields: vec![
            title_field(),
            FieldSpec::new("document_category", "Category", FieldKind::Select)
                .rule(FieldRule::REQUIRED),
            FieldSpec::new("document_file", "Document", FieldKind::File).rule(FieldRule::File {
                constraint: FileConstraint::DOCUMENT,
                required: true,
            }),
            version_field(),
            language_field(),
            description_field(),
            mobile_support_field(),
        ],
        checks: vec![FormCheck::TagsRequired],
        has_tags: true,
        comma_commits_tags: false,
    }
}

fn external_schema() -> FormSchema {
    const TYPE: &str = "content_type";
    FormSchema {
        kind: ContentKind::External,
        payload_attr: "data-external",
        endpoints: vlr_endpoints("addOrEditExternalContent", "deleteExternalContent"),
        fields: vec![
            title_field(),
            FieldSpec::new(TYPE, "Content Type", FieldKind::Select).rule(FieldRule::REQUIRED),
            FieldSpec::new("video_url", "Video URL", FieldKind::Text)
                .when(Condition::Equals(TYPE, "youtube-vimeo"))
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Pattern(Pattern::Url)),
            FieldSpec::new("course_url", "Course URL", FieldKind::Text)
                .when(Condition::Equals(TYPE, "linkedin-udemy"))
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Pattern(Pattern::Url)),
            FieldSpec::new("platform_name", "Platform Name", FieldKind::Text)
                .when(Condition::Equals(TYPE, "linkedin-udemy"))
                .rule(FieldRule::REQUIRED),
            FieldSpec::new("article_url", "Article URL", FieldKind::Text)
                .when(Condition::Equals(TYPE, "web-links-blogs"))
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Pattern(Pattern::Url)),
            FieldSpec::new("author", "Author", FieldKind::Text)
                .when(Condition::Equals(TYPE, "web-links-blogs")),
            FieldSpec::new("audio_source", "Audio Source", FieldKind::Radio)
                .when(Condition::Equals(TYPE, "podcasts-audio"))
                .default_value("upload"),
            FieldSpec::new("audio_url", "Audio URL", FieldKind::Text)
                .when(Condition::Equals(TYPE, "podcasts-audio"))
                .when(Condition::Equals("audio_source", "url"))
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Pattern(Pattern::Url)),
            FieldSpec::new("audio_file", "Audio File", FieldKind::File)
                .when(Condition::Equals(TYPE, "podcasts-audio"))
                .when(Condition::Equals("audio_source", "upload"))
                .rule(FieldRule::File {
                    constraint: FileConstraint::AUDIO,
                    required: true,
                }),
            description_field(),
            mobile_support_field(),
        ],
        checks: vec![FormCheck::TagsRequired],
        has_tags: true,
        comma_commits_tags: false,
    }
}

fn assessment_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::Assessment,
        payload_attr: "data-assessment",
        endpoints: vlr_endpoints("addOrEditAssessment", "deleteAssessment"),
        fields: vec![
            title_field(),
            FieldSpec::new("num_attempts", "Number of Attempts", FieldKind::Number)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::NumberRange { min: 1.0, max: None }),
            FieldSpec::new("passing_percentage", "Passing Percentage", FieldKind::Number)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::PERCENTAGE),
            time_limit_field(),
            FieldSpec::new("negative_marking", "Negative Marking", FieldKind::Radio)
                .default_value("No"),
            FieldSpec::new("negative_marking_percentage", "Negative Marking Percentage", FieldKind::Number)
                .when(Condition::Equals("negative_marking", "Yes"))
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::PERCENTAGE),
            FieldSpec::new("assessment_type", "Assessment Type", FieldKind::Radio)
                .default_value("fixed"),
            FieldSpec::new("num_questions_to_display", "Questions to Display", FieldKind::Number)
                .when(Condition::Equals("assessment_type", "dynamic"))
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::NumberRange { min: 1.0, max: None }),
        ],
        checks: vec![FormCheck::TagsRequired, FormCheck::QuestionsSelected { min: 1 }],
        has_tags: true,
        comma_commits_tags: true,
    }
}

fn question_set_schema(kind: ContentKind, action: &'static str, delete: &'static str) -> FormSchema {
    let payload_attr = if kind == ContentKind::Survey {
        "data-survey"
    } else {
        "data-feedback"
    };
    FormSchema {
        kind,
        payload_attr,
        endpoints: vlr_endpoints(action, delete),
        fields: vec![title_field()],
        checks: vec![FormCheck::TagsRequired, FormCheck::QuestionsSelected { min: 1 }],
        has_tags: true,
        comma_commits_tags: true,
    }
}

fn announcement_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::Announcement,
        payload_attr: "data-announcement",
        endpoints: Endpoints {
            controller: "AnnouncementController",
            add: "create",
            edit: "update",
            delete: "delete",
        },
        fields: vec![
            title_field(),
            FieldSpec::new("body", "Message", FieldKind::TextArea)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Length { min: Some(10), max: Some(5000) }),
            FieldSpec::new("audience", "Audience", FieldKind::Select).rule(FieldRule::REQUIRED),
            FieldSpec::new("urgency", "Urgency", FieldKind::Select).default_value("info"),
            FieldSpec::new("start_datetime", "Start", FieldKind::DateTime)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::NotInPast),
            FieldSpec::new("end_datetime", "End", FieldKind::DateTime).rule(FieldRule::REQUIRED),
        ],
        checks: vec![FormCheck::DateRange {
            start: "start_datetime",
            end: "end_datetime",
        }],
        has_tags: false,
        comma_commits_tags: false,
    }
}

fn user_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::User,
        payload_attr: "data-user",
        endpoints: Endpoints {
            controller: "UserManagementController",
            add: "addUser",
            edit: "editUser",
            delete: "deleteUser",
        },
        fields: vec![
            FieldSpec::new("full_name", "Full Name", FieldKind::Text)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Length { min: Some(2), max: Some(100) }),
            FieldSpec::new("email", "Email", FieldKind::Text)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Pattern(Pattern::Email)),
            FieldSpec::new("contact_number", "Contact Number", FieldKind::Text)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::Pattern(Pattern::Mobile)),
            FieldSpec::new("gender", "Gender", FieldKind::Select),
            FieldSpec::new("dob", "Date of Birth", FieldKind::Date),
            FieldSpec::new("user_role", "Role", FieldKind::Select)
                .rule(FieldRule::REQUIRED)
                .default_value("user"),
            FieldSpec::new("profile_picture", "Profile Picture", FieldKind::File).rule(
                FieldRule::File {
                    constraint: FileConstraint::PROFILE_PICTURE,
                    required: false,
                },
            ),
        ],
        checks: Vec::new(),
        has_tags: false,
        comma_commits_tags: false,
    }
}

fn assignment_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::AssignmentSubmission,
        payload_attr: "data-submission",
        endpoints: Endpoints {
            controller: "AssignmentSubmissionController",
            add: "submit",
            edit: "resubmit",
            delete: "withdraw",
        },
        fields: vec![
            FieldSpec::new("submission_file", "Submission File", FieldKind::File).rule(
                FieldRule::File {
                    constraint: FileConstraint::ASSIGNMENT,
                    required: true,
                },
            ),
            FieldSpec::new("comments", "Comments", FieldKind::TextArea)
                .rule(FieldRule::Length { min: None, max: Some(1000) }),
        ],
        checks: Vec::new(),
        has_tags: false,
        comma_commits_tags: false,
    }
}

const CORRECT_ANSWER_FIELDS: &[&str] = &["correct_1", "correct_2", "correct_3", "correct_4"];

/// Answer options only exist for objective questions
fn objective(field: FieldSpec) -> FieldSpec {
    field.when(Condition::Equals("question_type", "objective"))
}

fn question_schema() -> FormSchema {
    FormSchema {
        kind: ContentKind::Question,
        payload_attr: "data-question",
        endpoints: Endpoints {
            controller: "QuestionController",
            add: "save",
            edit: "save",
            delete: "delete",
        },
        fields: vec![
            FieldSpec::new("question_text", "Question", FieldKind::TextArea).rule(FieldRule::REQUIRED),
            FieldSpec::new("question_type", "Type", FieldKind::Select).default_value("objective"),
            FieldSpec::new("difficulty", "Difficulty", FieldKind::Select).default_value("medium"),
            FieldSpec::new("marks", "Marks", FieldKind::Number)
                .rule(FieldRule::REQUIRED)
                .rule(FieldRule::NumberRange { min: 1.0, max: Some(100.0) }),
            objective(FieldSpec::new("option_1", "Option 1", FieldKind::Text).rule(FieldRule::REQUIRED)),
            objective(FieldSpec::new("option_2", "Option 2", FieldKind::Text).rule(FieldRule::REQUIRED)),
            objective(FieldSpec::new("option_3", "Option 3", FieldKind::Text)),
            objective(FieldSpec::new("option_4", "Option 4", FieldKind::Text)),
            objective(FieldSpec::new("correct_1", "Option 1 correct", FieldKind::Checkbox)),
            objective(FieldSpec::new("correct_2", "Option 2 correct", FieldKind::Checkbox)),
            objective(FieldSpec::new("correct_3", "Option 3 correct", FieldKind::Checkbox))
                .when(Condition::HasValue("option_3")),
            objective(FieldSpec::new("correct_4", "Option 4 correct", FieldKind::Checkbox))
                .when(Condition::HasValue("option_4")),
        ],
        checks: vec![
            FormCheck::TagsRequired,
            FormCheck::AtLeastOneChecked {
                fields: CORRECT_ANSWER_FIELDS,
                anchor: "correct_1",
            },
        ],
        has_tags: true,
        comma_commits_tags: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_unique_field_ids() {
        for kind in ContentKind::ALL {
            let schema = kind.schema();
            let mut ids: Vec<_> = schema.fields.iter().map(|f| f.id).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(before, ids.len(), "duplicate field id in {}", kind);
        }
    }

    #[test]
    fn test_conditions_reference_existing_fields() {
        for kind in ContentKind::ALL {
            let schema = kind.schema();
            for field in &schema.fields {
                for condition in &field.when {
                    let sibling = match condition {
                        Condition::Equals(s, _) | Condition::HasValue(s) => *s,
                    };
                    assert!(schema.field(sibling).is_some(), "{}: unknown sibling {}", kind, sibling);
                }
            }
        }
    }

    #[test]
    fn test_media_delete_actions() {
        assert_eq!(ContentKind::Audio.schema().endpoints.delete, "deleteAudioPackage");
        assert_eq!(ContentKind::Video.schema().endpoints.add, "addOrEditVideoPackage");
    }

    #[test]
    fn test_question_picker_forms() {
        assert!(ContentKind::Assessment.schema().uses_question_picker());
        assert!(ContentKind::Survey.schema().uses_question_picker());
        assert!(!ContentKind::Scorm.schema().uses_question_picker());
    }
}
