use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::forms::Submission;

/// A backend endpoint: `index.php?controller=<controller>&action=<action>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub controller: String,
    pub action: String,
}

impl Route {
    pub fn new(controller: &str, action: &str) -> Self {
        Self {
            controller: controller.to_string(),
            action: action.to_string(),
        }
    }

    /// URL-encoded query string for this route plus extra parameters
    pub fn query_string(&self, params: &[(String, String)]) -> String {
        let mut parts = vec![
            format!("controller={}", urlencoding::encode(&self.controller)),
            format!("action={}", urlencoding::encode(&self.action)),
        ];
        parts.extend(
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))),
        );
        parts.join("&")
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.controller, self.action)
    }
}

/// Transport to the LMS backend. Every call yields the decoded JSON body.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, route: &Route, params: &[(String, String)]) -> Result<Value>;

    /// Multipart form post (fields and file uploads)
    async fn post_form(&self, route: &Route, submission: &Submission) -> Result<Value>;

    async fn post_json(&self, route: &Route, body: &Value) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encoding() {
        let route = Route::new("QuestionController", "getQuestions");
        let qs = route.query_string(&[
            ("search".into(), "x & y".into()),
            ("page".into(), "1".into()),
        ]);
        assert_eq!(
            qs,
            "controller=QuestionController&action=getQuestions&search=x%20%26%20y&page=1"
        );
    }
}
