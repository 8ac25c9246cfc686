//! List output in table, JSON, HTML and CSV form

use anyhow::{Context, Result};
use colored::*;
use serde_json::{Value, json};
use unicode_width::UnicodeWidthStr;

use crate::api::models::value_text;
use crate::i18n::Translator;
use crate::list::{ListFetcher, ListSpec, PaginationView};
use crate::render::HtmlRenderer;

const MAX_CELL_WIDTH: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Html,
    Csv,
}

/// Render the fetcher's current page
pub fn format_list(fetcher: &ListFetcher, format: OutputFormat, translator: &Translator) -> Result<String> {
    let spec = fetcher.spec();
    let view = fetcher.pagination(translator);
    match format {
        OutputFormat::Table => Ok(format_table(spec, fetcher.rows(), view.as_ref(), translator)),
        OutputFormat::Json => {
            let out = json!({
                "rows": fetcher.rows(),
                "totalCount": fetcher.total_count(),
                "pagination": view,
            });
            serde_json::to_string_pretty(&out).context("Failed to format JSON output")
        }
        OutputFormat::Html => {
            let renderer = HtmlRenderer::new();
            let mut html = renderer.render_rows(spec, fetcher.rows(), translator)?;
            if let Some(view) = &view {
                html.push_str(&renderer.render_pagination(view)?);
            }
            Ok(html)
        }
        OutputFormat::Csv => format_csv(spec, fetcher.rows()),
    }
}

fn cells(spec: &ListSpec, row: &Value) -> Vec<String> {
    spec.columns
        .iter()
        .map(|col| row.get(col.key).map(value_text).unwrap_or_default())
        .collect()
}

/// Cut to a display width, counting wide characters twice
fn truncate_cell(text: &str, max: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.width() <= max {
        return flat;
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in flat.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

pub fn format_table(
    spec: &ListSpec,
    rows: &[Value],
    view: Option<&PaginationView>,
    translator: &Translator,
) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            cells(spec, row)
                .iter()
                .map(|c| truncate_cell(c, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = spec
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            body.iter()
                .map(|r| r[i].width())
                .chain(std::iter::once(col.header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::new();
    let header: Vec<String> = spec
        .columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| pad(col.header, *w))
        .collect();
    lines.push(header.join("  ").bold().to_string());

    if body.is_empty() {
        lines.push(translator.translate("list.no_results").dimmed().to_string());
    }
    for row in &body {
        let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        lines.push(line.join("  ").trim_end().to_string());
    }

    match view {
        Some(PaginationView::Hidden { message }) => {
            lines.push(String::new());
            lines.push(message.dimmed().to_string());
        }
        Some(PaginationView::Pages {
            current,
            pages,
            show_previous,
            show_next,
        }) => {
            let mut nav = Vec::new();
            if *show_previous {
                nav.push("‹ Previous".to_string());
            }
            for page in pages {
                if page == current {
                    nav.push(format!("[{}]", page).bright_green().bold().to_string());
                } else {
                    nav.push(page.to_string());
                }
            }
            if *show_next {
                nav.push("Next ›".to_string());
            }
            lines.push(String::new());
            lines.push(nav.join(" "));
        }
        None => {}
    }

    lines.join("\n")
}

fn format_csv(spec: &ListSpec, rows: &[Value]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(spec.columns.iter().map(|c| c.header))
        .context("Failed to write CSV header")?;
    for row in rows {
        writer
            .write_record(cells(spec, row))
            .context("Failed to write CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to finish CSV output")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
