use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use afterlife::cms::{AdminSession, SessionStore};
use afterlife::config::SiteConfig;
use afterlife::logging;

use crate::cli_commands::{AdminCommands, Commands};

#[derive(Parser)]
#[command(name = "afterlife")]
#[command(about = "AfterlifeOS site tooling and changelog admin", long_about = None)]
pub(crate) struct Cli {
    /// Config file (defaults to ./afterlife.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// API root for the changelog and OTA repositories, e.g. a local afterlife-store
    #[arg(long, global = true, value_name = "URL")]
    api_base: Option<String>,

    /// Where the login token is kept (defaults to the per-user runtime dir)
    #[arg(long, global = true, value_name = "PATH")]
    session_file: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// What every command needs: the loaded config and where the session lives.
pub(crate) struct Ctx {
    pub(crate) cfg: SiteConfig,
    session_file: Option<PathBuf>,
}

impl Ctx {
    pub(crate) fn sessions(&self) -> Result<SessionStore> {
        match &self.session_file {
            Some(p) => Ok(SessionStore::at(p)),
            None => SessionStore::default_location(),
        }
    }

    /// The session of the stored token, validated against the identity endpoint.
    pub(crate) fn require_session(&self) -> Result<AdminSession> {
        let sessions = self.sessions()?;
        AdminSession::resume(&self.cfg.cms, &sessions)?
            .context("not logged in (run `afterlife admin login --token ...`)")
    }
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    // The console owns the terminal, so it logs to a file instead.
    if matches!(
        cli.command,
        Commands::Admin {
            command: AdminCommands::Tui
        }
    ) {
        let path = logging::init_file()?;
        tracing::debug!("console log at {}", path.display());
    } else {
        logging::init_stderr(cli.verbose);
    }

    let mut cfg = SiteConfig::load(cli.config.as_deref()).context("load config")?;
    if let Some(base) = cli.api_base {
        let base = base.trim_end_matches('/').to_string();
        cfg.cms.api_base = base.clone();
        cfg.ota.api_base = base;
    }

    let ctx = Ctx {
        cfg,
        session_file: cli.session_file,
    };
    crate::cli_exec::handle_command(&ctx, cli.command)
}
