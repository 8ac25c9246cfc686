use anyhow::{Context, Result};
use colored::*;

use crate::cli::{AppContext, ConfigCommands};
use crate::config::Config;

fn config_path(ctx: &AppContext) -> Result<std::path::PathBuf> {
    match &ctx.config_path {
        Some(path) => Ok(path.clone()),
        None => Config::default_path(),
    }
}

/// Session cookies are shown only by length
fn masked(config: &Config) -> Config {
    let mut shown = config.clone();
    shown.session = shown
        .session
        .as_ref()
        .map(|s| format!("<{} chars hidden>", s.chars().count()));
    shown
}

/// Values written by `config init`; the session id stays out unless asked for
fn to_save(config: &Config, keep_session: bool) -> Config {
    let mut saved = config.clone();
    if !keep_session {
        saved.session = None;
    }
    saved
}

pub fn handle_config_command(command: ConfigCommands, ctx: &AppContext) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let content =
                toml::to_string_pretty(&masked(&ctx.config)).context("Failed to serialize config")?;
            println!("{}", content.trim_end());
            println!();
            println!("{} {}", "locale:".dimmed(), ctx.translator.locale());
        }
        ConfigCommands::Init { force, keep_session } => {
            let path = config_path(ctx)?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            if ctx.config.session.is_some() && !keep_session {
                log::info!("Session id not saved; pass --keep-session to store it");
            }
            to_save(&ctx.config, keep_session).save(&path)?;
            println!("{} {}", "Wrote".bright_green(), path.display());
        }
        ConfigCommands::Path => {
            println!("{}", config_path(ctx)?.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_is_masked() {
        let config = Config {
            session: Some("abcdef".into()),
            ..Config::default()
        };
        let shown = masked(&config);
        assert_eq!(shown.session.as_deref(), Some("<6 chars hidden>"));
        assert_eq!(shown.base_url, config.base_url);
    }

    #[test]
    fn test_init_leaves_session_out_unless_kept() {
        let config = Config {
            session: Some("abcdef".into()),
            page_size: 25,
            ..Config::default()
        };
        let saved = to_save(&config, false);
        assert_eq!(saved.session, None);
        assert_eq!(saved.page_size, 25);

        let saved = to_save(&config, true);
        assert_eq!(saved.session.as_deref(), Some("abcdef"));
    }
}
