//! VLR console
//!
//! Command-line admin client for the Virtual Learning Resources section of the
//! LMS: validate and submit content forms, page through question and user
//! lists, delete records.
//!
//! ```bash
//! vlr list questions --search algebra
//! vlr submit external -S title="Rust book" -S content_type=web-links-blogs \
//!     -S article_url=https://doc.rust-lang.org/book/ -t rust
//! vlr delete audio --id 42 --title "Lecture 1"
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use vlr_cli::cli::{self, AppContext, Commands};
use vlr_cli::config::Config;

#[derive(Parser)]
#[command(name = "vlr")]
#[command(version, about = "Admin console for LMS Virtual Learning Resources", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/vlr-console/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend entry point, e.g. https://lms.example.com/index.php
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// PHP session id to authenticate with
    #[arg(long, global = true)]
    session: Option<String>,

    /// Message locale
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.verbose);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    if let Some(session) = args.session {
        config.session = Some(session);
    }
    if let Some(locale) = args.locale {
        config.locale = locale;
    }
    config.validate()?;

    let ctx = AppContext::new(config, args.config)?;
    cli::run(args.command, &ctx).await
}
