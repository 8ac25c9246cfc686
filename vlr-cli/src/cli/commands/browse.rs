//! Live search over a list: typing searches after a pause, Enter searches at
//! once, arrows page.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use is_terminal::IsTerminal;
use std::io::Write;
use tokio::sync::mpsc;

use crate::cli::output::format_list;
use crate::cli::{AppContext, BrowseArgs, OutputFormat, parse_pair};
use crate::list::{ListFetcher, LoadOutcome, SearchDebouncer};

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

enum Action {
    Type,
    SearchNow,
    Next,
    Previous,
    Quit,
    Ignore,
}

fn key_action(key: &KeyEvent, input: &mut String) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Enter => Action::SearchNow,
        KeyCode::Right | KeyCode::PageDown => Action::Next,
        KeyCode::Left | KeyCode::PageUp => Action::Previous,
        KeyCode::Backspace => {
            if input.pop().is_some() {
                Action::Type
            } else {
                Action::Ignore
            }
        }
        KeyCode::Char(c) => {
            input.push(c);
            Action::Type
        }
        _ => Action::Ignore,
    }
}

fn draw(fetcher: &ListFetcher, ctx: &AppContext, input: &str, status: Option<&str>) -> Result<()> {
    let mut out = std::io::stdout();
    execute!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    let table = format_list(fetcher, OutputFormat::Table, &ctx.translator)?;
    // Raw mode needs explicit carriage returns
    for line in table.lines() {
        write!(out, "{}\r\n", line)?;
    }
    if let Some(status) = status {
        write!(out, "\r\n{}\r\n", status)?;
    }
    write!(
        out,
        "\r\nSearch: {}\r\n(Enter search now · ←/→ page · Esc quit)",
        input
    )?;
    out.flush()?;
    Ok(())
}

fn redraw(fetcher: &ListFetcher, ctx: &AppContext, outcome: LoadOutcome, input: &str) -> Result<()> {
    let status = match outcome {
        LoadOutcome::Failed(_) => Some(ctx.translator.translate("list.load_failed")),
        _ => None,
    };
    draw(fetcher, ctx, input, status.as_deref())
}

pub async fn handle_browse_command(args: BrowseArgs, ctx: &AppContext) -> Result<()> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        anyhow::bail!("browse needs an interactive terminal; use 'vlr list' instead");
    }

    let client = ctx.client()?;
    let page_size = args.page_size.unwrap_or(ctx.config.page_size);
    let mut fetcher = ListFetcher::new(args.kind.spec(), page_size);
    for raw in &args.filters {
        let (key, value) = parse_pair(raw)?;
        fetcher.query_mut().set_filter(&key, &value);
    }

    let debouncer = SearchDebouncer::new(ctx.config.search_debounce());
    let (tx, mut rx) = mpsc::unbounded_channel::<KeyEvent>();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("Terminal input failed: {}", e);
                    break;
                }
            }
        }
    });

    let guard = RawModeGuard::enable()?;
    let mut input = String::new();
    let mut pending: Option<u64> = None;

    let outcome = fetcher.load_page(&client, 1).await;
    redraw(&fetcher, ctx, outcome, &input)?;

    loop {
        let generation = pending.unwrap_or_default();
        tokio::select! {
            key = rx.recv() => {
                let Some(key) = key else { break };
                let outcome = match key_action(&key, &mut input) {
                    Action::Quit => break,
                    Action::Ignore => continue,
                    Action::Type => {
                        pending = Some(debouncer.touch());
                        draw(&fetcher, ctx, &input, None)?;
                        continue;
                    }
                    Action::SearchNow => {
                        pending = None;
                        debouncer.touch();
                        fetcher.search(&client, &input).await
                    }
                    Action::Next if fetcher.has_next_page() => fetcher.next_page(&client).await,
                    Action::Previous if fetcher.has_previous_page() => {
                        fetcher.previous_page(&client).await
                    }
                    Action::Next | Action::Previous => continue,
                };
                redraw(&fetcher, ctx, outcome, &input)?;
            }
            fresh = debouncer.settle(generation), if pending.is_some() => {
                pending = None;
                if fresh && fetcher.query().search() != input.trim() {
                    let outcome = fetcher.search(&client, &input).await;
                    redraw(&fetcher, ctx, outcome, &input)?;
                }
            }
        }
    }

    drop(guard);
    println!();
    Ok(())
}
