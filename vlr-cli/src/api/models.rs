//! Response envelope and page payloads returned by the backend

use serde_json::Value;

/// `{ success, message?, ...data }` envelope shared by every endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub success: bool,
    pub message: Option<String>,
    pub body: Value,
}

impl ApiResponse {
    /// A missing `success` flag counts as failure. PHP endpoints sometimes send
    /// `"1"`/`1` instead of `true`.
    pub fn from_value(body: Value) -> Self {
        let success = match body.get("success") {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
            _ => false,
        };
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(String::from);
        Self {
            success,
            message,
            body,
        }
    }
}

/// One page of list rows plus server-reported paging
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub rows: Vec<Value>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl PageResponse {
    /// Read `rows_key` and the paging counters. Counters are accepted at top level
    /// or nested under `pagination`; numbers may arrive as strings.
    pub fn parse(body: &Value, rows_key: &str, total_key: &str) -> Option<Self> {
        let rows = body.get(rows_key)?.as_array()?.clone();
        let paging = body.get("pagination").filter(|p| p.is_object());
        let counter = |key: &str| -> Option<u64> {
            paging
                .and_then(|p| p.get(key))
                .or_else(|| body.get(key))
                .and_then(loose_u64)
        };

        let total_pages = counter("totalPages").unwrap_or(1).max(1) as u32;
        let current_page = counter("currentPage")
            .unwrap_or(1)
            .clamp(1, total_pages as u64) as u32;
        // Without a total the page itself is the whole result
        let total_count = counter(total_key).unwrap_or(rows.len() as u64);

        Some(Self {
            rows,
            current_page,
            total_pages,
            total_count,
        })
    }
}

fn loose_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Display text for a JSON value: strings as-is, arrays comma-joined, null empty
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success_variants() {
        assert!(ApiResponse::from_value(json!({ "success": true })).success);
        assert!(ApiResponse::from_value(json!({ "success": "1" })).success);
        assert!(!ApiResponse::from_value(json!({ "questions": [] })).success);
        let r = ApiResponse::from_value(json!({ "success": false, "message": "Not allowed" }));
        assert_eq!(r.message.as_deref(), Some("Not allowed"));
    }

    #[test]
    fn test_page_nested_pagination() {
        let body = json!({
            "success": true,
            "users": [{ "id": 1 }, { "id": 2 }],
            "pagination": { "currentPage": "2", "totalPages": 3, "totalUsers": "25" }
        });
        let page = PageResponse::parse(&body, "users", "totalUsers").unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 25);
    }

    #[test]
    fn test_page_top_level_without_total() {
        let body = json!({ "success": true, "questions": [1, 2, 3], "totalPages": 1 });
        let page = PageResponse::parse(&body, "questions", "totalQuestions").unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_count, 3);
        assert!(PageResponse::parse(&body, "users", "totalUsers").is_none());
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(["a", 2])), "a, 2");
        assert_eq!(value_text(&json!(4.5)), "4.5");
    }
}
