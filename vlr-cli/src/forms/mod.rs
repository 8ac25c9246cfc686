//! Content forms: one schema per content kind, a tag chip input, field
//! validation and the modal lifecycle that ties them together.

pub mod delete;
pub mod modal;
pub mod picker;
pub mod rules;
pub mod schema;
pub mod state;
pub mod tags;
pub mod validator;

pub use delete::DeleteRequest;
pub use modal::{ModalController, ModalEffect, ModalMode, ModalMsg, ModalPhase, ModalStack};
pub use picker::QuestionPicker;
pub use rules::{FieldRule, FileConstraint, FileUpload};
pub use schema::{ContentKind, FieldKind, FieldSpec, FormSchema};
pub use state::{FormState, Submission};
pub use tags::{TagEvent, TagInputState};
pub use validator::FieldValidator;
