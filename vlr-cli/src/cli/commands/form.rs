use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::api::{Backend, value_text};
use crate::cli::{AppContext, FormArgs, parse_pair};
use crate::forms::{
    FieldKind, FieldValidator, FileUpload, ModalController, ModalEffect, ModalMsg, ModalStack, QuestionPicker,
};

/// Build the modal from the command arguments, as if a user had filled it in
pub fn fill_modal(args: &FormArgs, ctx: &AppContext) -> Result<ModalController> {
    let validator = FieldValidator::new(&ctx.translator);
    let mut modal = ModalController::new(args.kind);
    match &args.payload {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
            modal.open_edit_from_attr(&raw, &ctx.translator)?;
        }
        None => modal.open_add(&ctx.translator),
    }

    let schema = modal.schema().clone();
    for raw in &args.values {
        let (id, value) = parse_pair(raw)?;
        let Some(field) = schema.field(&id) else {
            anyhow::bail!("{} form has no field '{}'", args.kind, id);
        };
        let msg = match field.kind {
            FieldKind::Checkbox => {
                let checked = matches!(value.trim(), "1" | "true" | "yes" | "on");
                ModalMsg::CheckboxToggled(id, checked)
            }
            FieldKind::File => anyhow::bail!("Use --file {}=<path> for file fields", id),
            _ => ModalMsg::FieldChanged(id, value),
        };
        modal.update(msg, &validator);
    }

    for raw in &args.files {
        let (id, path) = parse_pair(raw)?;
        if schema.field(&id).map(|f| f.kind) != Some(FieldKind::File) {
            anyhow::bail!("{} form has no file field '{}'", args.kind, id);
        }
        let upload = FileUpload::from_path(Path::new(&path))?;
        modal.update(ModalMsg::FileSelected(id, upload), &validator);
    }

    for tag in &args.tags {
        modal.form.tags.add_tag(tag);
    }

    if !args.questions.is_empty() {
        let Some(mut picker) = QuestionPicker::for_kind(args.kind) else {
            anyhow::bail!("{} forms do not take questions", args.kind);
        };
        let mut stack = ModalStack::new();
        stack.push(args.kind.key(), None);
        stack.push("question-picker", Some("selected_question_ids"));

        picker.seed(&modal.form);
        picker.open();
        for id in &args.questions {
            picker.select(id);
        }
        picker.confirm(&mut modal.form);
        stack.pop();
        log::debug!(
            "{} question(s) picked for {} form",
            modal.form.selected_questions().len(),
            stack.top().map(|l| l.name.as_str()).unwrap_or_default()
        );
    }

    Ok(modal)
}

/// Print the questions a question set is about to be saved with
async fn show_selected_questions(modal: &ModalController, backend: &dyn Backend) -> Result<()> {
    let Some(mut picker) = QuestionPicker::for_kind(modal.schema().kind) else {
        return Ok(());
    };
    picker.seed(&modal.form);
    let rows = picker.fetch_selected(backend).await?;
    let spec = picker.spec();
    let text_key = spec.columns.get(1).map(|c| c.key).unwrap_or(spec.id_key);
    println!("{}", format!("{} question(s):", rows.len()).bold());
    for row in &rows {
        let id = row.get(spec.id_key).map(value_text).unwrap_or_default();
        let text = row.get(text_key).map(value_text).unwrap_or_default();
        println!("  {} {}", format!("#{}", id).dimmed(), text);
    }
    Ok(())
}

fn print_errors(modal: &ModalController) {
    eprintln!("{}", format!("{} is not valid:", modal.title()).red().bold());
    for (field, message) in modal.form.errors() {
        eprintln!("  {} {}", format!("{}:", field).bold(), message);
    }
}

/// Submit and wait for the backend's answer
pub async fn send(modal: &mut ModalController, validator: &FieldValidator<'_>, backend: &dyn Backend) -> ModalEffect {
    let (route, submission) = match modal.update(ModalMsg::Submit, validator) {
        ModalEffect::Send(route, submission) => (route, submission),
        other => return other,
    };
    log::debug!("Submitting {} fields to {}", submission.fields.len(), route);
    let result = backend
        .post_form(&route, &submission)
        .await
        .map_err(|e| format!("{:#}", e));
    modal.update(ModalMsg::SubmitFinished(result), validator)
}

pub async fn handle_form_command(args: FormArgs, ctx: &AppContext, submit: bool) -> Result<()> {
    let mut modal = fill_modal(&args, ctx)?;
    let validator = FieldValidator::new(&ctx.translator);

    if !submit {
        if validator.validate_form(&modal.schema().clone(), &mut modal.form) {
            println!("{} {}", "✓".bright_green(), format!("{} is valid", modal.title()));
            return Ok(());
        }
        print_errors(&modal);
        anyhow::bail!("Validation failed");
    }

    let client = ctx.client()?;
    if !modal.form.selected_questions().is_empty() {
        show_selected_questions(&modal, &client).await?;
    }
    match send(&mut modal, &validator, &client).await {
        ModalEffect::Saved(message) => {
            println!(
                "{} {}",
                "✓".bright_green(),
                message.unwrap_or_else(|| "Saved".to_string())
            );
            Ok(())
        }
        ModalEffect::Blocked => {
            print_errors(&modal);
            anyhow::bail!("Validation failed")
        }
        ModalEffect::Rejected(message) => anyhow::bail!("{}", message),
        other => {
            log::debug!("Unexpected modal effect: {:?}", other);
            anyhow::bail!("Form was not submitted")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{Recorded, ScriptedBackend};
    use crate::config::Config;
    use crate::forms::ContentKind;
    use serde_json::json;

    fn ctx() -> AppContext {
        AppContext::new(Config::default(), None).unwrap()
    }

    fn args(kind: ContentKind) -> FormArgs {
        FormArgs {
            kind,
            payload: None,
            values: Vec::new(),
            files: Vec::new(),
            tags: Vec::new(),
            questions: Vec::new(),
        }
    }

    #[test]
    fn test_fill_rejects_unknown_field() {
        let mut a = args(ContentKind::External);
        a.values.push("nope=1".into());
        assert!(fill_modal(&a, &ctx()).is_err());
    }

    #[test]
    fn test_questions_only_for_question_sets() {
        let mut a = args(ContentKind::Video);
        a.questions.push("4".into());
        assert!(fill_modal(&a, &ctx()).is_err());

        let mut a = args(ContentKind::Assessment);
        a.questions.extend(["4".to_string(), "9".to_string()]);
        let modal = fill_modal(&a, &ctx()).unwrap();
        assert_eq!(modal.form.selected_questions(), &["4", "9"]);
    }

    #[tokio::test]
    async fn test_selected_questions_fetched_by_id() {
        let ctx = ctx();
        let mut a = args(ContentKind::Assessment);
        a.questions.extend(["4".to_string(), "9".to_string()]);
        let modal = fill_modal(&a, &ctx).unwrap();
        let backend = ScriptedBackend::new().respond(json!({
            "success": true,
            "questions": [
                { "id": 4, "question_text": "2 + 2 = ?" },
                { "id": 9, "question_text": "Largest planet?" }
            ]
        }));

        show_selected_questions(&modal, &backend).await.unwrap();
        let Recorded::PostJson(route, body) = &backend.calls()[0] else {
            panic!("expected a JSON post");
        };
        assert_eq!(route.action, "getSelectedQuestions");
        assert_eq!(body, &json!({ "ids": ["4", "9"] }));
    }

    #[tokio::test]
    async fn test_send_blocked_form_makes_no_request() {
        let ctx = ctx();
        let mut modal = fill_modal(&args(ContentKind::External), &ctx).unwrap();
        let backend = ScriptedBackend::new();
        let validator = FieldValidator::new(&ctx.translator);

        let effect = send(&mut modal, &validator, &backend).await;
        assert_eq!(effect, ModalEffect::Blocked);
        assert!(backend.calls().is_empty());
        assert!(modal.form.error("title").is_some());
    }

    fn valid_external() -> FormArgs {
        let mut a = args(ContentKind::External);
        a.values.extend([
            "title=Rust book".to_string(),
            "content_type=web-links-blogs".to_string(),
            "article_url=https://doc.rust-lang.org/book/".to_string(),
        ]);
        a.tags.push("rust".into());
        a
    }

    #[tokio::test]
    async fn test_send_rejected_keeps_modal_open() {
        let ctx = ctx();
        let mut modal = fill_modal(&valid_external(), &ctx).unwrap();
        let validator = FieldValidator::new(&ctx.translator);
        let backend = ScriptedBackend::new().respond(json!({ "success": false, "message": "Duplicate" }));

        let effect = send(&mut modal, &validator, &backend).await;
        assert_eq!(effect, ModalEffect::Rejected("Duplicate".into()));
        assert!(modal.is_open());
        assert_eq!(modal.server_message(), Some("Duplicate"));
    }

    #[tokio::test]
    async fn test_send_saved_posts_visible_fields() {
        let ctx = ctx();
        let mut modal = fill_modal(&valid_external(), &ctx).unwrap();
        let validator = FieldValidator::new(&ctx.translator);
        let backend = ScriptedBackend::new().respond(json!({ "success": true, "message": "Saved" }));

        let effect = send(&mut modal, &validator, &backend).await;
        assert_eq!(effect, ModalEffect::Saved(Some("Saved".into())));
        assert!(!modal.is_open());

        let Recorded::PostForm(route, submission) = &backend.calls()[0] else {
            panic!("expected a form post");
        };
        assert_eq!(route.action, "addOrEditExternalContent");
        assert_eq!(submission.field("tagList"), Some("rust"));
        assert_eq!(submission.field("article_url"), Some("https://doc.rust-lang.org/book/"));
        assert_eq!(submission.field("video_url"), None);
    }
}
