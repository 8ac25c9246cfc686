//! Confirm-then-post delete flow shared by every list

use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::api::backend::{Backend, Route};
use crate::api::models::ApiResponse;
use crate::i18n::Translator;

use super::schema::ContentKind;
use super::state::Submission;

/// What a delete button carries in its `data-*` attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub route: Route,
    pub id: String,
    pub title: String,
}

impl DeleteRequest {
    /// Build from `data-id`, `data-title`, `data-controller` and `data-action`
    pub fn from_attrs(attrs: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| -> Result<String> {
            attrs
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("Delete trigger is missing data-{}", key))
        };
        Ok(Self {
            route: Route::new(&get("controller")?, &get("action")?),
            id: get("id")?,
            title: attrs.get("title").cloned().unwrap_or_default(),
        })
    }

    /// Delete route of a content kind's schema
    pub fn for_kind(kind: ContentKind, id: &str, title: &str) -> Self {
        let endpoints = kind.schema().endpoints;
        Self {
            route: Route::new(endpoints.controller, endpoints.delete),
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    pub fn confirm_message(&self, translator: &Translator) -> String {
        let title = if self.title.is_empty() { self.id.as_str() } else { self.title.as_str() };
        translator.translate_with("delete.confirm", &[("title", title)])
    }

    pub fn submission(&self) -> Submission {
        Submission {
            fields: vec![("id".to_string(), self.id.clone())],
            files: Vec::new(),
        }
    }

    /// Post the delete. A `success: false` envelope is returned, not raised.
    pub async fn send(&self, backend: &dyn Backend) -> Result<ApiResponse> {
        log::debug!("Deleting {} via {}", self.id, self.route);
        let body = backend
            .post_form(&self.route, &self.submission())
            .await
            .with_context(|| format!("Delete request to {} failed", self.route))?;
        let response = ApiResponse::from_value(body);
        if !response.success {
            log::warn!(
                "Delete of {} rejected: {}",
                self.id,
                response.message.as_deref().unwrap_or("no message")
            );
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Recorded, ScriptedBackend};
    use serde_json::json;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_attrs_requires_route_and_id() {
        let request = DeleteRequest::from_attrs(&attrs(&[
            ("id", "42"),
            ("title", "Unit 1"),
            ("controller", "VLRController"),
            ("action", "deleteAudioPackage"),
        ]))
        .unwrap();
        assert_eq!(request.route.to_string(), "VLRController/deleteAudioPackage");

        let err = DeleteRequest::from_attrs(&attrs(&[("id", "42"), ("controller", "VLRController")]))
            .unwrap_err();
        assert!(err.to_string().contains("data-action"));
    }

    #[test]
    fn test_confirm_message_falls_back_to_id() {
        let t = Translator::english();
        let named = DeleteRequest::for_kind(ContentKind::Audio, "7", "Lecture");
        assert_eq!(named.confirm_message(&t), "Are you sure you want to delete \"Lecture\"?");
        let unnamed = DeleteRequest::for_kind(ContentKind::Audio, "7", "");
        assert!(unnamed.confirm_message(&t).contains("\"7\""));
    }

    #[tokio::test]
    async fn test_send_posts_id() {
        let backend = ScriptedBackend::new().respond(json!({ "success": true, "message": "Deleted" }));
        let request = DeleteRequest::for_kind(ContentKind::User, "3", "Eve");
        let response = request.send(&backend).await.unwrap();
        assert!(response.success);

        let Recorded::PostForm(route, submission) = &backend.calls()[0] else {
            panic!("expected a form post");
        };
        assert_eq!(route.action, "deleteUser");
        assert_eq!(submission.field("id"), Some("3"));
    }
}
