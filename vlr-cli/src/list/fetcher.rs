//! Paginated, filterable list loading
//!
//! Requests may overlap (a slow search followed by a quick page change). Every
//! request takes a [`RequestTicket`] with a sequence number; only the response
//! to the newest ticket is applied, older ones are dropped as stale.

use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::api::backend::Backend;
use crate::api::models::{ApiResponse, PageResponse, value_text};
use crate::i18n::Translator;

use super::pagination::PaginationView;
use super::query::PageQuery;
use super::specs::ListSpec;

/// Issued when a request starts, handed back with its response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    pub params: Vec<(String, String)>,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Rendered,
    /// A newer request was issued in the meantime; nothing changed
    Stale,
    /// Rows kept from the last good load
    Failed(String),
}

pub struct ListFetcher {
    spec: ListSpec,
    query: PageQuery,
    rows: Vec<Value>,
    page: Option<PageResponse>,
    loading: bool,
    latest: u64,
    last_error: Option<String>,
}

impl ListFetcher {
    pub fn new(spec: ListSpec, page_size: u32) -> Self {
        Self {
            spec,
            query: PageQuery::new(page_size),
            rows: Vec::new(),
            page: None,
            loading: false,
            latest: 0,
            last_error: None,
        }
    }

    pub fn spec(&self) -> &ListSpec {
        &self.spec
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut PageQuery {
        &mut self.query
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True once a page has loaded and it had no rows
    pub fn shows_no_results(&self) -> bool {
        self.page.is_some() && self.rows.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.page.as_ref().map(|p| p.total_count).unwrap_or(0)
    }

    /// Pagination for the last good page
    pub fn pagination(&self, translator: &Translator) -> Option<PaginationView> {
        let noun = self.spec.noun;
        self.view(|count| {
            translator.translate_with(
                "list.showing_all",
                &[("count", count.to_string().as_str()), ("noun", noun)],
            )
        })
    }

    /// Whether the last good page shows a Next control
    pub fn has_next_page(&self) -> bool {
        matches!(
            self.view(|_| String::new()),
            Some(PaginationView::Pages { show_next: true, .. })
        )
    }

    /// Whether the last good page shows a Previous control
    pub fn has_previous_page(&self) -> bool {
        matches!(
            self.view(|_| String::new()),
            Some(PaginationView::Pages { show_previous: true, .. })
        )
    }

    fn view(&self, message: impl FnOnce(u64) -> String) -> Option<PaginationView> {
        let page = self.page.as_ref()?;
        Some(PaginationView::build(
            page.current_page,
            page.total_pages,
            page.total_count,
            self.query.page_size(),
            message,
        ))
    }

    /// Start a request for the current query
    pub fn begin(&mut self) -> RequestTicket {
        self.latest += 1;
        self.loading = true;
        RequestTicket {
            seq: self.latest,
            params: self.query.to_params(),
        }
    }

    /// Apply a response. Stale tickets are ignored; otherwise the loading flag
    /// is cleared whatever the result.
    pub fn apply(&mut self, ticket: RequestTicket, result: Result<Value>) -> LoadOutcome {
        if ticket.seq != self.latest {
            log::debug!(
                "Dropping stale {} response (seq {} < {})",
                self.spec.route(),
                ticket.seq,
                self.latest
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;

        let body = match result {
            Ok(body) => body,
            Err(e) => return self.fail(format!("{:#}", e)),
        };

        if body.get("success").is_some() {
            let envelope = ApiResponse::from_value(body.clone());
            if !envelope.success {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string());
                return self.fail(message);
            }
        }

        let Some(page) = PageResponse::parse(&body, self.spec.rows_key, self.spec.total_key) else {
            return self.fail(format!("response has no '{}' array", self.spec.rows_key));
        };

        log::debug!(
            "{}: page {}/{} with {} of {} rows",
            self.spec.route(),
            page.current_page,
            page.total_pages,
            page.rows.len(),
            page.total_count
        );
        self.query.go_to(page.current_page);
        self.rows = page.rows.clone();
        self.page = Some(page);
        self.last_error = None;
        LoadOutcome::Rendered
    }

    fn fail(&mut self, message: String) -> LoadOutcome {
        log::error!("Failed to load {}: {}", self.spec.route(), message);
        self.last_error = Some(message.clone());
        LoadOutcome::Failed(message)
    }

    /// Fetch `page` with the current search and filters
    pub async fn load_page(&mut self, backend: &dyn Backend, page: u32) -> LoadOutcome {
        self.query.go_to(page);
        let ticket = self.begin();
        let result = backend.get(&self.spec.route(), &ticket.params).await;
        self.apply(ticket, result)
    }

    /// Explicit search: resets to page 1 and fetches immediately
    pub async fn search(&mut self, backend: &dyn Backend, term: &str) -> LoadOutcome {
        self.query.set_search(term);
        self.load_page(backend, 1).await
    }

    pub async fn filter(&mut self, backend: &dyn Backend, key: &str, value: &str) -> LoadOutcome {
        if !self.spec.accepts_filter(key) {
            log::warn!("{} has no '{}' filter", self.spec.route(), key);
        }
        self.query.set_filter(key, value);
        self.load_page(backend, 1).await
    }

    pub async fn next_page(&mut self, backend: &dyn Backend) -> LoadOutcome {
        let next = self.query.page() + 1;
        self.load_page(backend, next).await
    }

    pub async fn previous_page(&mut self, backend: &dyn Backend) -> LoadOutcome {
        let previous = self.query.page().saturating_sub(1);
        self.load_page(backend, previous).await
    }

    /// Values for each filter dropdown
    pub async fn filter_options(&self, backend: &dyn Backend) -> Result<BTreeMap<String, Vec<String>>> {
        let body = backend.get(&self.spec.filter_options_route(), &[]).await?;
        let envelope = ApiResponse::from_value(body);
        if !envelope.success {
            anyhow::bail!(
                "{}",
                envelope
                    .message
                    .unwrap_or_else(|| "could not load filter options".to_string())
            );
        }
        Ok(parse_filter_options(&envelope.body))
    }
}

/// Accepts options under `data` or at top level. Each option is a string or an
/// object with `value`, `name` or `id`.
fn parse_filter_options(body: &Value) -> BTreeMap<String, Vec<String>> {
    let source = body.get("data").filter(|d| d.is_object()).unwrap_or(body);
    let Some(map) = source.as_object() else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let items = value.as_array()?;
            let options = items
                .iter()
                .map(|item| match item {
                    Value::Object(obj) => ["value", "name", "id"]
                        .iter()
                        .find_map(|k| obj.get(*k))
                        .map(value_text)
                        .unwrap_or_default(),
                    other => value_text(other),
                })
                .filter(|s| !s.is_empty())
                .collect();
            Some((key.clone(), options))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::backend::Route;
    use crate::api::mock::{Recorded, ScriptedBackend};
    use crate::list::specs::ListKind;
    use serde_json::json;

    fn questions_page(ids: &[u64], total_pages: u64, total: u64) -> Value {
        let rows: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "question_text": format!("Question {}", id) }))
            .collect();
        json!({
            "success": true,
            "questions": rows,
            "currentPage": 1,
            "totalPages": total_pages,
            "totalQuestions": total,
        })
    }

    #[tokio::test]
    async fn test_algebra_search() {
        let backend = ScriptedBackend::new().respond(questions_page(&[1, 2, 3], 1, 3));
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        fetcher.query_mut().go_to(3);

        let outcome = fetcher.search(&backend, "algebra").await;
        assert_eq!(outcome, LoadOutcome::Rendered);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let Recorded::Get(route, params) = &calls[0] else {
            panic!("expected a GET");
        };
        assert_eq!(*route, Route::new("QuestionController", "getQuestions"));
        assert!(params.contains(&("search".into(), "algebra".into())));
        assert!(params.contains(&("page".into(), "1".into())));

        assert_eq!(fetcher.rows().len(), 3);
        let view = fetcher.pagination(&Translator::english()).unwrap();
        assert_eq!(
            view,
            PaginationView::Hidden {
                message: "Showing all 3 questions".into()
            }
        );
        assert!(!fetcher.is_loading());
    }

    #[tokio::test]
    async fn test_page_controls_follow_server_counters() {
        let mut middle = questions_page(&[11, 12], 3, 25);
        middle["currentPage"] = json!(2);
        let mut last = questions_page(&[21], 3, 25);
        last["currentPage"] = json!(3);
        let backend = ScriptedBackend::new()
            .respond(questions_page(&[1, 2], 3, 25))
            .respond(middle)
            .respond(last);
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        assert!(!fetcher.has_next_page());

        fetcher.load_page(&backend, 1).await;
        assert!(fetcher.has_next_page());
        assert!(!fetcher.has_previous_page());

        fetcher.next_page(&backend).await;
        assert!(fetcher.has_next_page() && fetcher.has_previous_page());

        fetcher.next_page(&backend).await;
        assert!(!fetcher.has_next_page());
        assert!(fetcher.has_previous_page());
    }

    #[tokio::test]
    async fn test_single_page_has_no_controls() {
        let backend = ScriptedBackend::new().respond(questions_page(&[1, 2, 3], 1, 3));
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        fetcher.load_page(&backend, 1).await;
        assert!(!fetcher.has_next_page());
        assert!(!fetcher.has_previous_page());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        let slow = fetcher.begin();
        let fast = fetcher.begin();

        assert_eq!(
            fetcher.apply(fast, Ok(questions_page(&[7], 1, 1))),
            LoadOutcome::Rendered
        );
        assert_eq!(
            fetcher.apply(slow, Ok(questions_page(&[1, 2], 1, 2))),
            LoadOutcome::Stale
        );
        assert_eq!(fetcher.rows().len(), 1);
        assert_eq!(fetcher.rows()[0]["id"], 7);
    }

    #[test]
    fn test_stale_response_keeps_loading_for_newer_request() {
        let mut fetcher = ListFetcher::new(ListKind::Users.spec(), 10);
        let old = fetcher.begin();
        let _newer = fetcher.begin();
        assert_eq!(fetcher.apply(old, Ok(json!({}))), LoadOutcome::Stale);
        assert!(fetcher.is_loading());
    }

    #[tokio::test]
    async fn test_failure_keeps_last_good_rows() {
        let backend = ScriptedBackend::new()
            .respond(questions_page(&[1, 2], 1, 2))
            .fail("connection reset")
            .respond(json!({ "success": false, "message": "Session expired" }));
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);

        assert_eq!(fetcher.load_page(&backend, 1).await, LoadOutcome::Rendered);

        let outcome = fetcher.load_page(&backend, 2).await;
        assert!(matches!(outcome, LoadOutcome::Failed(m) if m.contains("connection reset")));
        assert_eq!(fetcher.rows().len(), 2);
        assert!(!fetcher.is_loading());

        let outcome = fetcher.load_page(&backend, 1).await;
        assert_eq!(outcome, LoadOutcome::Failed("Session expired".into()));
        assert_eq!(fetcher.last_error(), Some("Session expired"));
        assert_eq!(fetcher.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_shows_no_results() {
        let backend = ScriptedBackend::new().respond(questions_page(&[], 1, 0));
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        assert!(!fetcher.shows_no_results());
        fetcher.load_page(&backend, 1).await;
        assert!(fetcher.shows_no_results());
    }

    #[tokio::test]
    async fn test_filter_resets_page() {
        let backend = ScriptedBackend::new().respond(questions_page(&[4], 1, 1));
        let mut fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        fetcher.query_mut().go_to(5);
        fetcher.filter(&backend, "difficulty", "hard").await;

        let Recorded::Get(_, params) = &backend.calls()[0] else {
            panic!("expected a GET");
        };
        assert!(params.contains(&("difficulty".into(), "hard".into())));
        assert!(params.contains(&("page".into(), "1".into())));
    }

    #[tokio::test]
    async fn test_filter_options() {
        let backend = ScriptedBackend::new().respond(json!({
            "success": true,
            "data": {
                "question_type": ["objective", "subjective"],
                "tags": [{ "value": "math" }, { "name": "physics" }],
            }
        }));
        let fetcher = ListFetcher::new(ListKind::Questions.spec(), 10);
        let options = fetcher.filter_options(&backend).await.unwrap();
        assert_eq!(options["question_type"], vec!["objective", "subjective"]);
        assert_eq!(options["tags"], vec!["math", "physics"]);
    }
}
