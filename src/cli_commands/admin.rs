use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub(crate) struct LoginArgs {
    /// Personal access token; read from stdin when omitted
    #[arg(long)]
    pub(crate) token: Option<String>,
}

#[derive(Args)]
pub(crate) struct JsonArgs {
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct ChangesArgs {
    /// Release notes, one change per line
    #[arg(long, conflicts_with = "changes_file")]
    pub(crate) changes: Option<String>,

    /// Read release notes from a file (`-` for stdin)
    #[arg(long, value_name = "PATH")]
    pub(crate) changes_file: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct AddArgs {
    #[arg(long)]
    pub(crate) version: String,

    /// Display date, e.g. "March 1, 2026"
    #[arg(long)]
    pub(crate) date: String,

    #[command(flatten)]
    pub(crate) changes: ChangesArgs,

    /// Publish without marking this release as the latest
    #[arg(long)]
    pub(crate) not_latest: bool,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    /// Position as shown by `admin list`
    pub(crate) index: usize,

    #[arg(long)]
    pub(crate) version: Option<String>,

    #[arg(long)]
    pub(crate) date: Option<String>,

    #[command(flatten)]
    pub(crate) changes: ChangesArgs,

    /// Mark as the latest release
    #[arg(long, conflicts_with = "not_latest")]
    pub(crate) latest: bool,

    /// Clear the latest flag
    #[arg(long)]
    pub(crate) not_latest: bool,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    /// Position as shown by `admin list`
    pub(crate) index: usize,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
}
