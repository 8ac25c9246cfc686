//! Question picker opened over assessment, survey and feedback forms
//!
//! The selection persists while paging through the picker and across closing
//! and reopening it. It is written into the parent form on confirm and only
//! cleared when the parent form is reset for a new entity.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::api::backend::{Backend, Route};
use crate::api::models::{ApiResponse, value_text};
use crate::list::specs::{ListKind, ListSpec};

use super::schema::ContentKind;
use super::state::FormState;

/// Question list the picker pages through for a content kind
pub fn picker_list(kind: ContentKind) -> Option<ListKind> {
    match kind {
        ContentKind::Assessment => Some(ListKind::Questions),
        ContentKind::Survey => Some(ListKind::SurveyQuestions),
        ContentKind::Feedback => Some(ListKind::FeedbackQuestions),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct QuestionPicker {
    spec: ListSpec,
    /// Selected question ids in the order they were picked
    selected: Vec<String>,
    is_open: bool,
}

impl QuestionPicker {
    pub fn new(list: ListKind) -> Self {
        Self {
            spec: list.spec(),
            selected: Vec::new(),
            is_open: false,
        }
    }

    pub fn for_kind(kind: ContentKind) -> Option<Self> {
        picker_list(kind).map(Self::new)
    }

    pub fn spec(&self) -> &ListSpec {
        &self.spec
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Close without writing back; the selection is kept for the next open
    pub fn cancel(&mut self) {
        self.is_open = false;
    }

    /// Take over the parent's selection, e.g. after loading an edit payload
    pub fn seed(&mut self, form: &FormState) {
        self.selected.clear();
        for id in form.selected_questions() {
            self.select(id);
        }
    }

    /// Forget the selection when the parent form starts a new entity
    pub fn clear(&mut self) {
        self.selected.clear();
        self.is_open = false;
    }

    pub fn select(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() || self.is_selected(id) {
            return false;
        }
        self.selected.push(id.to_string());
        true
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s != id);
        self.selected.len() != before
    }

    /// Flip one checkbox; returns the new checked state
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.select(id)
        }
    }

    /// "Select all" for the rows of the current page
    pub fn set_page(&mut self, rows: &[Value], checked: bool) {
        for id in self.row_ids(rows) {
            if checked {
                self.select(&id);
            } else {
                self.deselect(&id);
            }
        }
    }

    /// Checkbox state for each row of a freshly loaded page
    pub fn page_marks(&self, rows: &[Value]) -> Vec<(String, bool)> {
        self.row_ids(rows)
            .into_iter()
            .map(|id| {
                let checked = self.is_selected(&id);
                (id, checked)
            })
            .collect()
    }

    /// Write the selection into the parent form and close
    pub fn confirm(&mut self, form: &mut FormState) {
        form.set_selected_questions(self.selected.clone());
        self.is_open = false;
    }

    /// Route returning full question rows for a list of ids
    pub fn selected_route(&self) -> Route {
        Route::new(self.spec.controller, "getSelectedQuestions")
    }

    /// Load the selected questions to display them in the parent form
    pub async fn fetch_selected(&self, backend: &dyn Backend) -> Result<Vec<Value>> {
        if self.selected.is_empty() {
            return Ok(Vec::new());
        }
        let route = self.selected_route();
        let body = backend
            .post_json(&route, &json!({ "ids": self.selected }))
            .await
            .with_context(|| format!("Failed to fetch selected questions from {}", route))?;

        let envelope = ApiResponse::from_value(body);
        if !envelope.success {
            anyhow::bail!(
                "{}",
                envelope
                    .message
                    .unwrap_or_else(|| "could not load selected questions".to_string())
            );
        }
        let rows = envelope
            .body
            .get(self.spec.rows_key)
            .and_then(Value::as_array)
            .cloned()
            .with_context(|| format!("{} response has no '{}' array", route, self.spec.rows_key))?;
        Ok(rows)
    }

    fn row_ids(&self, rows: &[Value]) -> Vec<String> {
        rows.iter()
            .filter_map(|row| row.get(self.spec.id_key).map(value_text))
            .filter(|id| !id.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Recorded, ScriptedBackend};

    fn rows(ids: &[u64]) -> Vec<Value> {
        ids.iter().map(|id| json!({ "id": id })).collect()
    }

    #[test]
    fn test_selection_survives_paging_and_cancel() {
        let mut picker = QuestionPicker::new(ListKind::Questions);
        picker.open();
        picker.set_page(&rows(&[1, 2, 3]), true);
        picker.toggle("2");
        picker.cancel();

        picker.open();
        let marks = picker.page_marks(&rows(&[1, 2, 3]));
        assert_eq!(
            marks,
            vec![
                ("1".to_string(), true),
                ("2".to_string(), false),
                ("3".to_string(), true)
            ]
        );
        assert!(!picker.page_marks(&rows(&[4]))[0].1);
    }

    #[test]
    fn test_confirm_writes_parent_form() {
        let schema = ContentKind::Assessment.schema();
        let mut form = FormState::new(&schema);
        let mut picker = QuestionPicker::for_kind(ContentKind::Assessment).unwrap();
        picker.open();
        picker.select("12");
        picker.select("5");
        picker.select("12");
        picker.confirm(&mut form);

        assert!(!picker.is_open());
        assert_eq!(form.selected_questions(), &["12", "5"]);
    }

    #[test]
    fn test_clear_and_seed() {
        let schema = ContentKind::Survey.schema();
        let mut form = FormState::new(&schema);
        form.set_selected_questions(vec!["8".into()]);

        let mut picker = QuestionPicker::for_kind(ContentKind::Survey).unwrap();
        picker.select("1");
        picker.seed(&form);
        assert_eq!(picker.selected(), &["8"]);

        picker.clear();
        assert!(picker.selected().is_empty());
        assert!(QuestionPicker::for_kind(ContentKind::Video).is_none());
    }

    #[tokio::test]
    async fn test_fetch_selected_posts_ids() {
        let backend = ScriptedBackend::new().respond(json!({
            "success": true,
            "questions": [{ "id": 3 }, { "id": 9 }]
        }));
        let mut picker = QuestionPicker::new(ListKind::Questions);
        picker.select("3");
        picker.select("9");

        let fetched = picker.fetch_selected(&backend).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(
            backend.calls(),
            vec![Recorded::PostJson(
                Route::new("QuestionController", "getSelectedQuestions"),
                json!({ "ids": ["3", "9"] })
            )]
        );
    }

    #[tokio::test]
    async fn test_fetch_selected_empty_skips_request() {
        let backend = ScriptedBackend::new();
        let picker = QuestionPicker::new(ListKind::Questions);
        assert!(picker.fetch_selected(&backend).await.unwrap().is_empty());
        assert!(backend.calls().is_empty());
    }
}
