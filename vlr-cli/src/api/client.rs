//! HTTP client for the LMS backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::config::Config;
use crate::forms::Submission;

use super::backend::{Backend, Route};

/// reqwest-backed [`Backend`] talking to `index.php`
#[derive(Debug, Clone)]
pub struct LmsClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<String>,
}

impl LmsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("vlr-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('?').to_string(),
            session: config.session.clone(),
        })
    }

    fn url(&self, route: &Route, params: &[(String, String)]) -> String {
        format!("{}?{}", self.base_url, route.query_string(params))
    }

    fn with_session(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => request.header(reqwest::header::COOKIE, format!("PHPSESSID={}", session)),
            None => request,
        }
    }

    async fn read_json(route: &Route, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {}", route))?;

        if !status.is_success() {
            anyhow::bail!("{} returned HTTP {}: {}", route, status, truncate(&text, 200));
        }

        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON from {}: {}", route, truncate(&text, 200)))
    }
}

#[async_trait]
impl Backend for LmsClient {
    async fn get(&self, route: &Route, params: &[(String, String)]) -> Result<Value> {
        let url = self.url(route, params);
        debug!("GET {}", url);
        let response = self
            .with_session(self.http.get(&url))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", route))?;
        Self::read_json(route, response).await
    }

    async fn post_form(&self, route: &Route, submission: &Submission) -> Result<Value> {
        let url = self.url(route, &[]);
        debug!(
            "POST {} ({} fields, {} files)",
            url,
            submission.fields.len(),
            submission.files.len()
        );

        let mut form = Form::new();
        for (name, value) in &submission.fields {
            form = form.text(name.clone(), value.clone());
        }
        for (name, upload) in &submission.files {
            let path = upload
                .path
                .as_ref()
                .with_context(|| format!("No local file behind upload '{}'", upload.file_name))?;
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let part = Part::bytes(bytes)
                .file_name(upload.file_name.clone())
                .mime_str(&upload.mime)
                .with_context(|| format!("Invalid MIME type '{}'", upload.mime))?;
            form = form.part(name.clone(), part);
        }

        let response = self
            .with_session(self.http.post(&url).multipart(form))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", route))?;
        Self::read_json(route, response).await
    }

    async fn post_json(&self, route: &Route, body: &Value) -> Result<Value> {
        let url = self.url(route, &[]);
        debug!("POST {} (json)", url);
        let response = self
            .with_session(self.http.post(&url).json(body))
            .send()
            .await
            .with_context(|| format!("Request to {} failed", route))?;
        Self::read_json(route, response).await
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let mut config = Config::default();
        config.base_url = "https://lms.example.com/index.php".into();
        let client = LmsClient::new(&config).unwrap();
        let url = client.url(
            &Route::new("UserManagementController", "ajaxSearch"),
            &[("page".into(), "2".into())],
        );
        assert_eq!(
            url,
            "https://lms.example.com/index.php?controller=UserManagementController&action=ajaxSearch&page=2"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
