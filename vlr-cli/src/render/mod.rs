//! HTML fragments for chips, list rows, pagination and inline errors
//!
//! Templates are embedded and every `.html` template is auto-escaped, so tag
//! text and row values from the server can never inject markup.

use anyhow::{Context, Result};
use minijinja::{Environment, Value, context, default_auto_escape_callback};
use serde::Serialize;

use crate::api::models::value_text;
use crate::forms::schema::TAG_FIELD;
use crate::i18n::Translator;
use crate::list::pagination::PaginationView;
use crate::list::specs::ListSpec;

pub struct HtmlRenderer {
    env: Environment<'static>,
}

#[derive(Debug, Serialize)]
struct RowContext {
    id: String,
    cells: Vec<String>,
}

#[derive(Debug, Serialize)]
struct FileLink {
    field: String,
    path: String,
    name: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String> {
        let tmpl = self
            .env
            .get_template(name)
            .with_context(|| format!("Template '{}' not found", name))?;
        tmpl.render(ctx)
            .with_context(|| format!("Failed to render '{}'", name))
    }

    /// Chips for the current tags plus the hidden comma-joined field
    pub fn render_chips(&self, tags: &[String]) -> Result<String> {
        self.render(
            "tags/chips.html",
            context! { tags => tags, field => TAG_FIELD, hidden => tags.join(",") },
        )
    }

    /// Table rows, or a single "no results" row spanning every column
    pub fn render_rows(&self, spec: &ListSpec, rows: &[serde_json::Value], translator: &Translator) -> Result<String> {
        let rows: Vec<RowContext> = rows
            .iter()
            .map(|row| RowContext {
                id: row.get(spec.id_key).map(value_text).unwrap_or_default(),
                cells: spec
                    .columns
                    .iter()
                    .map(|col| row.get(col.key).map(value_text).unwrap_or_default())
                    .collect(),
            })
            .collect();
        self.render(
            "list/rows.html",
            context! {
                rows => rows,
                columns => spec.columns.len(),
                empty_message => translator.translate("list.no_results"),
            },
        )
    }

    pub fn render_pagination(&self, view: &PaginationView) -> Result<String> {
        self.render(
            "list/pagination.html",
            context! { view => Value::from_serialize(view) },
        )
    }

    pub fn render_field_error(&self, field: &str, message: &str) -> Result<String> {
        self.render(
            "forms/field_error.html",
            context! { field => field, message => message },
        )
    }

    /// Links to files already stored for an edited entity
    pub fn render_existing_files(&self, files: &[(String, String)]) -> Result<String> {
        let files: Vec<FileLink> = files
            .iter()
            .map(|(field, path)| FileLink {
                field: field.clone(),
                path: path.clone(),
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
            })
            .collect();
        self.render("forms/existing_files.html", context! { files => files })
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template = match name {
        "tags/chips.html" => Some(include_str!("templates/tags/chips.html")),
        "list/rows.html" => Some(include_str!("templates/list/rows.html")),
        "list/pagination.html" => Some(include_str!("templates/list/pagination.html")),
        "forms/field_error.html" => Some(include_str!("templates/forms/field_error.html")),
        "forms/existing_files.html" => Some(include_str!("templates/forms/existing_files.html")),
        _ => None,
    };
    Ok(template.map(|s| s.to_string()))
}
