//! Modal lifecycle for create/edit forms
//!
//! A [`ModalController`] owns one form and drives it through
//! Closed → Open(Add | Edit) → Submitting → Closed, resetting the form whenever
//! the modal is reused. [`ModalStack`] tracks nested modals (e.g. the question
//! picker opened over an assessment form).

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use serde_json::Value;

use crate::api::backend::Route;
use crate::api::models::{ApiResponse, value_text};
use crate::i18n::Translator;

use super::rules::FileUpload;
use super::schema::{ContentKind, FormSchema};
use super::state::{FormState, Submission};
use super::tags::TagEvent;
use super::validator::FieldValidator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMode {
    Add,
    Edit { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Open(ModalMode),
    Submitting(ModalMode),
}

/// Events delivered to an open modal
#[derive(Debug, Clone)]
pub enum ModalMsg {
    FieldChanged(String, String),
    FieldBlurred(String),
    CheckboxToggled(String, bool),
    FileSelected(String, FileUpload),
    TagKey(KeyCode),
    ChipClicked(Option<String>),
    Submit,
    SubmitFinished(Result<Value, String>),
    Cancel,
}

/// What the caller has to do after an update
#[derive(Debug, Clone, PartialEq)]
pub enum ModalEffect {
    None,
    /// Send this submission to the route
    Send(Route, Submission),
    /// Validation failed; the form carries the inline errors
    Blocked,
    /// Saved and closed, with the server's message if any
    Saved(Option<String>),
    /// Server or network rejected the submission; the modal stays open
    Rejected(String),
    Closed,
}

pub struct ModalController {
    schema: FormSchema,
    phase: ModalPhase,
    pub form: FormState,
    title: String,
    server_message: Option<String>,
}

impl ModalController {
    pub fn new(kind: ContentKind) -> Self {
        let schema = kind.schema();
        Self {
            form: FormState::new(&schema),
            schema,
            phase: ModalPhase::Closed,
            title: String::new(),
            server_message: None,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn phase(&self) -> &ModalPhase {
        &self.phase
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.phase, ModalPhase::Closed)
    }

    pub fn mode(&self) -> Option<&ModalMode> {
        match &self.phase {
            ModalPhase::Closed => None,
            ModalPhase::Open(mode) | ModalPhase::Submitting(mode) => Some(mode),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Last message returned by the server for this session
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    /// Open an empty form
    pub fn open_add(&mut self, translator: &Translator) {
        self.form.reset(&self.schema);
        self.server_message = None;
        self.title = translator.translate(&self.schema.add_title_key());
        self.phase = ModalPhase::Open(ModalMode::Add);
    }

    /// Open the form populated from an entity payload. The payload must be an
    /// object carrying an `id`.
    pub fn open_edit(&mut self, payload: &Value, translator: &Translator) -> Result<()> {
        if !payload.is_object() {
            anyhow::bail!("{} payload is not an object", self.schema.payload_attr);
        }
        let id = payload
            .get("id")
            .map(value_text)
            .filter(|id| !id.is_empty())
            .with_context(|| format!("{} payload has no id", self.schema.payload_attr))?;

        self.form.reset(&self.schema);
        self.form.apply_payload(&self.schema, payload);
        self.server_message = None;
        self.title = translator.translate(&self.schema.edit_title_key());
        self.phase = ModalPhase::Open(ModalMode::Edit { id });
        Ok(())
    }

    /// Open the edit form from the raw JSON of a `data-*` attribute
    pub fn open_edit_from_attr(&mut self, attr_json: &str, translator: &Translator) -> Result<()> {
        let payload: Value = serde_json::from_str(attr_json)
            .with_context(|| format!("Invalid JSON in {}", self.schema.payload_attr))?;
        self.open_edit(&payload, translator)
    }

    /// Route the current mode submits to
    pub fn submit_route(&self) -> Option<Route> {
        let endpoints = &self.schema.endpoints;
        match self.mode()? {
            ModalMode::Add => Some(Route::new(endpoints.controller, endpoints.add)),
            ModalMode::Edit { .. } => Some(Route::new(endpoints.controller, endpoints.edit)),
        }
    }

    /// Validate and, when valid, move to Submitting and hand back what to send
    pub fn begin_submit(&mut self, validator: &FieldValidator) -> ModalEffect {
        let ModalPhase::Open(mode) = &self.phase else {
            log::warn!("Submit ignored: {} modal is not open", self.schema.kind);
            return ModalEffect::None;
        };
        let mode = mode.clone();

        if !validator.validate_form(&self.schema, &mut self.form) {
            log::debug!(
                "{} form blocked by {} error(s)",
                self.schema.kind,
                self.form.errors().len()
            );
            return ModalEffect::Blocked;
        }

        let id = match &mode {
            ModalMode::Add => None,
            ModalMode::Edit { id } => Some(id.as_str()),
        };
        let submission = self.form.submission(&self.schema, id);
        let Some(route) = self.submit_route() else {
            return ModalEffect::None;
        };
        self.phase = ModalPhase::Submitting(mode);
        ModalEffect::Send(route, submission)
    }

    /// Apply the backend's answer to a submission
    pub fn finish_submit(&mut self, result: Result<Value, String>) -> ModalEffect {
        let ModalPhase::Submitting(mode) = &self.phase else {
            log::debug!("Late submit result ignored for {} modal", self.schema.kind);
            return ModalEffect::None;
        };
        let mode = mode.clone();

        let rejection = match result {
            Ok(body) => {
                let response = ApiResponse::from_value(body);
                if response.success {
                    self.close();
                    return ModalEffect::Saved(response.message);
                }
                response
                    .message
                    .unwrap_or_else(|| "The server rejected the request".to_string())
            }
            Err(e) => {
                log::error!("{} submit failed: {}", self.schema.kind, e);
                "Request failed. Please try again.".to_string()
            }
        };

        self.server_message = Some(rejection.clone());
        self.phase = ModalPhase::Open(mode);
        ModalEffect::Rejected(rejection)
    }

    pub fn cancel(&mut self) -> ModalEffect {
        self.close();
        ModalEffect::Closed
    }

    /// Modal hidden: the form is reset so nothing leaks into the next session
    pub fn close(&mut self) {
        self.form.reset(&self.schema);
        self.server_message = None;
        self.phase = ModalPhase::Closed;
    }

    pub fn update(&mut self, msg: ModalMsg, validator: &FieldValidator) -> ModalEffect {
        if !self.is_open() {
            return ModalEffect::None;
        }
        match msg {
            ModalMsg::FieldChanged(id, value) => {
                self.form.set_value(&id, &value);
                ModalEffect::None
            }
            ModalMsg::FieldBlurred(id) => {
                validator.validate_field_by_id(&self.schema, &id, &mut self.form);
                ModalEffect::None
            }
            ModalMsg::CheckboxToggled(id, checked) => {
                self.form.set_checked(&id, checked);
                ModalEffect::None
            }
            ModalMsg::FileSelected(id, file) => {
                self.form.attach_file(&id, file);
                validator.validate_field_by_id(&self.schema, &id, &mut self.form);
                ModalEffect::None
            }
            ModalMsg::TagKey(key) => {
                if let TagEvent::Added(tag) = self.form.tags.handle_key(key) {
                    log::debug!("Tag added: {}", tag);
                }
                ModalEffect::None
            }
            ModalMsg::ChipClicked(tag) => {
                self.form.tags.handle_container_click(tag.as_deref());
                ModalEffect::None
            }
            ModalMsg::Submit => self.begin_submit(validator),
            ModalMsg::SubmitFinished(result) => self.finish_submit(result),
            ModalMsg::Cancel => self.cancel(),
        }
    }
}

/// One open modal in a stack of nested modals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalLayer {
    pub name: String,
    /// Hidden from assistive technology while a child modal covers it
    pub aria_hidden: bool,
    /// Element to focus when this layer becomes topmost again
    pub focus: Option<String>,
}

/// Nested modal bookkeeping. Exactly one backdrop exists per open layer.
#[derive(Debug, Clone, Default)]
pub struct ModalStack {
    layers: Vec<ModalLayer>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, focus: Option<&str>) {
        if let Some(parent) = self.layers.last_mut() {
            parent.aria_hidden = true;
        }
        self.layers.push(ModalLayer {
            name: name.to_string(),
            aria_hidden: false,
            focus: focus.map(String::from),
        });
    }

    /// Close the topmost modal and restore its parent
    pub fn pop(&mut self) -> Option<ModalLayer> {
        let closed = self.layers.pop();
        if let Some(parent) = self.layers.last_mut() {
            parent.aria_hidden = false;
        }
        closed
    }

    /// Close the named modal along with anything stacked above it
    pub fn close(&mut self, name: &str) -> bool {
        let Some(pos) = self.layers.iter().rposition(|l| l.name == name) else {
            return false;
        };
        while self.layers.len() > pos {
            self.pop();
        }
        true
    }

    pub fn top(&self) -> Option<&ModalLayer> {
        self.layers.last()
    }

    /// Element that should hold focus now
    pub fn focus_target(&self) -> Option<&str> {
        self.top().and_then(|l| l.focus.as_deref())
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn backdrop_count(&self) -> usize {
        self.layers.len()
    }

    pub fn body_scroll_locked(&self) -> bool {
        !self.layers.is_empty()
    }
}
