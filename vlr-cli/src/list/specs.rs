use serde::Serialize;

use crate::api::backend::Route;

/// A column shown for each row: header label and the JSON key it reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub header: &'static str,
    pub key: &'static str,
}

const fn col(header: &'static str, key: &'static str) -> Column {
    Column { header, key }
}

/// Backend lists the console can page through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ListKind {
    Questions,
    SurveyQuestions,
    FeedbackQuestions,
    Users,
    Content,
}

impl ListKind {
    pub fn spec(&self) -> ListSpec {
        match self {
            ListKind::Questions => ListSpec {
                kind: *self,
                controller: "QuestionController",
                action: "getQuestions",
                rows_key: "questions",
                total_key: "totalQuestions",
                noun: "questions",
                id_key: "id",
                columns: vec![
                    col("ID", "id"),
                    col("Title", "question_text"),
                    col("Type", "question_type"),
                    col("Difficulty", "difficulty_level"),
                    col("Tags", "tags"),
                ],
                filters: vec!["question_type", "difficulty", "tags"],
            },
            ListKind::SurveyQuestions => ListSpec {
                kind: *self,
                controller: "SurveyQuestionController",
                action: "getQuestions",
                rows_key: "questions",
                total_key: "totalQuestions",
                noun: "questions",
                id_key: "id",
                columns: vec![
                    col("ID", "id"),
                    col("Title", "title"),
                    col("Type", "type"),
                    col("Tags", "tags"),
                ],
                filters: vec!["type", "tags"],
            },
            ListKind::FeedbackQuestions => ListSpec {
                kind: *self,
                controller: "FeedbackQuestionController",
                action: "getQuestions",
                rows_key: "questions",
                total_key: "totalQuestions",
                noun: "questions",
                id_key: "id",
                columns: vec![
                    col("ID", "id"),
                    col("Title", "title"),
                    col("Type", "type"),
                    col("Tags", "tags"),
                ],
                filters: vec!["type", "tags"],
            },
            ListKind::Users => ListSpec {
                kind: *self,
                controller: "UserManagementController",
                action: "ajaxSearch",
                rows_key: "users",
                total_key: "totalUsers",
                noun: "users",
                id_key: "id",
                columns: vec![
                    col("ID", "id"),
                    col("Name", "full_name"),
                    col("Email", "email"),
                    col("Role", "user_role"),
                    col("Status", "user_status"),
                ],
                filters: vec!["user_status", "locked_status", "user_role", "gender"],
            },
            ListKind::Content => ListSpec {
                kind: *self,
                controller: "VLRController",
                action: "getContent",
                rows_key: "content",
                total_key: "totalContent",
                noun: "items",
                id_key: "id",
                columns: vec![
                    col("ID", "id"),
                    col("Title", "title"),
                    col("Type", "type"),
                    col("Tags", "tags"),
                ],
                filters: vec!["type", "tags"],
            },
        }
    }
}

/// Where a list lives and how to read its rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpec {
    pub kind: ListKind,
    pub controller: &'static str,
    pub action: &'static str,
    pub rows_key: &'static str,
    pub total_key: &'static str,
    /// Plural noun for "Showing all N <noun>"
    pub noun: &'static str,
    pub id_key: &'static str,
    pub columns: Vec<Column>,
    /// Filter parameters the list endpoint understands
    pub filters: Vec<&'static str>,
}

impl ListSpec {
    pub fn route(&self) -> Route {
        Route::new(self.controller, self.action)
    }

    pub fn filter_options_route(&self) -> Route {
        Route::new(self.controller, "getFilterOptions")
    }

    pub fn accepts_filter(&self, key: &str) -> bool {
        self.filters.iter().any(|f| *f == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_list_routes() {
        let spec = ListKind::Questions.spec();
        assert_eq!(spec.route().to_string(), "QuestionController/getQuestions");
        assert_eq!(
            spec.filter_options_route().to_string(),
            "QuestionController/getFilterOptions"
        );
        assert!(spec.accepts_filter("difficulty"));
        assert!(!spec.accepts_filter("user_role"));
    }

    #[test]
    fn test_users_list_reads_total_users() {
        let spec = ListKind::Users.spec();
        assert_eq!(spec.rows_key, "users");
        assert_eq!(spec.total_key, "totalUsers");
        assert_eq!(spec.noun, "users");
    }
}
