//! Command-line surface of the console

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::api::LmsClient;
use crate::config::Config;
use crate::forms::ContentKind;
use crate::i18n::Translator;
use crate::list::ListKind;

pub use output::OutputFormat;

/// Resolved configuration and message catalog shared by every command
pub struct AppContext {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub translator: Translator,
}

impl AppContext {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Result<Self> {
        let translator = match &config.translations_dir {
            Some(dir) => Translator::load(dir, &config.locale)?,
            None => {
                if config.locale != "en" {
                    log::warn!(
                        "No translations_dir configured, using English instead of '{}'",
                        config.locale
                    );
                }
                Translator::english()
            }
        };
        Ok(Self {
            config,
            config_path,
            translator,
        })
    }

    pub fn client(&self) -> Result<LmsClient> {
        LmsClient::new(&self.config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one page of a backend list
    List(ListArgs),
    /// Interactively search and page through a list
    Browse(BrowseArgs),
    /// Validate a content form without sending it
    Validate(FormArgs),
    /// Validate and submit a content form
    Submit(FormArgs),
    /// Delete a record after confirmation
    Delete(DeleteArgs),
    /// Show the fields and rules of a content form
    Schema {
        #[arg(value_enum)]
        kind: ContentKind,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub kind: ListKind,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter as key=value (repeatable)
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the values available for each filter and exit
    #[arg(long)]
    pub filter_options: bool,

    #[arg(long)]
    pub no_color: bool,
}

#[derive(Args)]
pub struct BrowseArgs {
    #[arg(value_enum)]
    pub kind: ListKind,

    /// Filter as key=value (repeatable)
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Args)]
pub struct FormArgs {
    #[arg(value_enum)]
    pub kind: ContentKind,

    /// JSON payload of an existing record; opens the form in edit mode
    #[arg(long, value_name = "FILE")]
    pub payload: Option<PathBuf>,

    /// Field value as field=value (repeatable)
    #[arg(short = 'S', long = "set", value_name = "FIELD=VALUE")]
    pub values: Vec<String>,

    /// File upload as field=path (repeatable)
    #[arg(short = 'F', long = "file", value_name = "FIELD=PATH")]
    pub files: Vec<String>,

    /// Tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Picked question id for assessment, survey and feedback forms (repeatable)
    #[arg(short, long = "question")]
    pub questions: Vec<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Content kind whose delete route is used
    #[arg(value_enum, required_unless_present_all = ["controller", "action"])]
    pub kind: Option<ContentKind>,

    #[arg(long)]
    pub id: String,

    /// Shown in the confirmation prompt
    #[arg(long, default_value = "")]
    pub title: String,

    /// Explicit controller, overriding the content kind's
    #[arg(long, requires = "action")]
    pub controller: Option<String>,

    #[arg(long, requires = "controller")]
    pub action: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with the current values
    Init {
        #[arg(long)]
        force: bool,
        /// Also store the session id (written in plain text)
        #[arg(long)]
        keep_session: bool,
    },
    /// Print the configuration file location
    Path,
}

/// Split `key=value`
pub fn parse_pair(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        anyhow::bail!("Expected KEY=VALUE, got '{}'", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Empty key in '{}'", raw);
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn run(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::List(args) => commands::list::handle_list_command(args, ctx).await,
        Commands::Browse(args) => commands::browse::handle_browse_command(args, ctx).await,
        Commands::Validate(args) => commands::form::handle_form_command(args, ctx, false).await,
        Commands::Submit(args) => commands::form::handle_form_command(args, ctx, true).await,
        Commands::Delete(args) => commands::delete::handle_delete_command(args, ctx).await,
        Commands::Schema { kind } => commands::schema::handle_schema_command(kind),
        Commands::Config { command } => commands::config::handle_config_command(command, ctx),
    }
}
