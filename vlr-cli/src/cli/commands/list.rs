use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;

use crate::cli::output::format_list;
use crate::cli::{AppContext, ListArgs, parse_pair};
use crate::list::{ListFetcher, LoadOutcome};

pub async fn handle_list_command(args: ListArgs, ctx: &AppContext) -> Result<()> {
    if args.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let client = ctx.client()?;
    let page_size = args.page_size.unwrap_or(ctx.config.page_size);
    let mut fetcher = ListFetcher::new(args.kind.spec(), page_size);

    if args.filter_options {
        let options = fetcher.filter_options(&client).await?;
        for (key, values) in options {
            println!("{}: {}", key.bold(), values.join(", "));
        }
        return Ok(());
    }

    if let Some(term) = &args.search {
        fetcher.query_mut().set_search(term);
    }
    for raw in &args.filters {
        let (key, value) = parse_pair(raw)?;
        if !fetcher.spec().accepts_filter(&key) {
            log::warn!("{} does not list '{}' as a filter", fetcher.spec().route(), key);
        }
        fetcher.query_mut().set_filter(&key, &value);
    }

    match fetcher.load_page(&client, args.page).await {
        LoadOutcome::Rendered => {}
        LoadOutcome::Failed(_) | LoadOutcome::Stale => {
            anyhow::bail!("{}", ctx.translator.translate("list.load_failed"));
        }
    }

    let formatted = format_list(&fetcher, args.format, &ctx.translator)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &formatted)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            eprintln!("Saved to {}", path.display().to_string().bright_green());
        }
        None => println!("{}", formatted),
    }
    Ok(())
}
