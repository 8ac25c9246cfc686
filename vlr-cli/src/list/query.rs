use std::collections::BTreeMap;

/// Search, filter and paging state of one list view
///
/// The page number never drops below 1 and is reset to 1 whenever the search
/// term or a filter changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    search: String,
    filters: BTreeMap<String, String>,
    page: u32,
    page_size: u32,
}

impl PageQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns true when the term actually changed
    pub fn set_search(&mut self, term: &str) -> bool {
        let term = term.trim();
        let changed = self.search != term;
        self.search = term.to_string();
        self.page = 1;
        changed
    }

    /// Set a filter; an empty value removes it
    pub fn set_filter(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_string(), value.to_string());
        }
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn go_to(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Parameters sent with every request
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push(("search".to_string(), self.search.clone()));
        }
        for (key, value) in &self.filters {
            params.push((key.clone(), value.clone()));
        }
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("limit".to_string(), self.page_size.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_changes_reset_page() {
        let mut q = PageQuery::new(10);
        q.go_to(4);
        q.set_search("algebra");
        assert_eq!(q.page(), 1);

        q.go_to(3);
        q.set_filter("difficulty", "hard");
        assert_eq!(q.page(), 1);

        q.go_to(2);
        q.set_filter("difficulty", "");
        assert_eq!(q.page(), 1);
        assert!(q.filters().is_empty());
    }

    #[test]
    fn test_page_never_below_one() {
        let mut q = PageQuery::new(0);
        q.go_to(0);
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), 1);
    }

    #[test]
    fn test_params_order() {
        let mut q = PageQuery::new(10);
        q.set_search(" algebra ");
        q.set_filter("type", "objective");
        assert_eq!(
            q.to_params(),
            vec![
                ("search".to_string(), "algebra".to_string()),
                ("type".to_string(), "objective".to_string()),
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }
}
