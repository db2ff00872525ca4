use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub(crate) struct OtaSourceArgs {
    /// Read OTA data from a local checkout instead of the raw-content endpoint
    #[arg(long, value_name = "DIR", conflicts_with = "raw_base")]
    pub(crate) ota_dir: Option<PathBuf>,

    /// Raw-content root, e.g. https://raw.githubusercontent.com
    #[arg(long, value_name = "URL")]
    pub(crate) raw_base: Option<String>,
}

#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory
    #[arg(long, value_name = "DIR")]
    pub(crate) out: PathBuf,

    /// Directory holding the changelog data file and team.json
    #[arg(long, value_name = "DIR")]
    pub(crate) data_dir: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) ota: OtaSourceArgs,
}

#[derive(Args)]
pub(crate) struct DevicesArgs {
    /// Match against device name or codename
    #[arg(long, default_value = "")]
    pub(crate) search: String,

    /// Restore filters from a query string, e.g. "?search=pixel&status=active"
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["search", "brand", "status"])]
    pub(crate) query: Option<String>,

    #[arg(long)]
    pub(crate) brand: Option<String>,

    /// active or inactive
    #[arg(long)]
    pub(crate) status: Option<String>,

    /// Highlight the device named in this user agent
    #[arg(long, value_name = "UA")]
    pub(crate) user_agent: Option<String>,

    /// Print the rendered grid instead of a table
    #[arg(long, conflicts_with = "json")]
    pub(crate) html: bool,

    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,

    #[command(flatten)]
    pub(crate) ota: OtaSourceArgs,
}

#[derive(Args)]
pub(crate) struct DeviceArgs {
    pub(crate) codename: String,

    #[command(flatten)]
    pub(crate) ota: OtaSourceArgs,
}

#[derive(Args)]
pub(crate) struct BustCacheArgs {
    /// Site root to walk
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub(crate) root: PathBuf,

    /// Version stamp (defaults to the current unix time)
    #[arg(long)]
    pub(crate) version: Option<String>,
}

#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Where to write the index
    #[arg(long, value_name = "PATH", default_value = "devices.json")]
    pub(crate) out: PathBuf,

    /// Raw-content root, e.g. https://raw.githubusercontent.com
    #[arg(long, value_name = "URL")]
    pub(crate) raw_base: Option<String>,
}
