use anyhow::{Context, Result};
use colored::*;
use dialoguer::Confirm;
use std::collections::HashMap;

use crate::cli::{AppContext, DeleteArgs};
use crate::forms::DeleteRequest;

/// Resolve the delete route from explicit controller/action or the content kind
pub fn build_request(args: &DeleteArgs) -> Result<DeleteRequest> {
    match (&args.controller, &args.action, args.kind) {
        (Some(controller), Some(action), _) => {
            let attrs: HashMap<String, String> = [
                ("id", args.id.as_str()),
                ("title", args.title.as_str()),
                ("controller", controller.as_str()),
                ("action", action.as_str()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
            DeleteRequest::from_attrs(&attrs)
        }
        (_, _, Some(kind)) => Ok(DeleteRequest::for_kind(kind, &args.id, &args.title)),
        _ => anyhow::bail!("Give a content kind or both --controller and --action"),
    }
}

pub async fn handle_delete_command(args: DeleteArgs, ctx: &AppContext) -> Result<()> {
    let request = build_request(&args)?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(request.confirm_message(&ctx.translator))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let client = ctx.client()?;
    let response = request.send(&client).await?;
    if !response.success {
        anyhow::bail!(
            "{}",
            response
                .message
                .unwrap_or_else(|| "The server refused the delete".to_string())
        );
    }
    println!(
        "{} {}",
        "✓".bright_green(),
        response.message.unwrap_or_else(|| format!("Deleted {}", request.id))
    );
    Ok(())
}
