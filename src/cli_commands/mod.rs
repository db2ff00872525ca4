use clap::Subcommand;

pub(crate) mod admin;
pub(crate) mod site;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Edit the published changelog (requires a GitHub token)
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Render and maintain the public site
    Site {
        #[command(subcommand)]
        command: SiteCommands,
    },

    /// Maintain the OTA device index
    Devices {
        #[command(subcommand)]
        command: DevicesCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum AdminCommands {
    /// Validate a token and keep it for this login session
    Login(admin::LoginArgs),

    /// Forget the stored token
    Logout,

    /// Show the account the stored token belongs to
    Whoami(admin::JsonArgs),

    /// List changelog entries (newest first)
    List(admin::JsonArgs),

    /// Publish a new release entry
    Add(admin::AddArgs),

    /// Change an existing entry
    Edit(admin::EditArgs),

    /// Delete an entry
    #[command(alias = "rm")]
    Remove(admin::RemoveArgs),

    /// Open the interactive console
    Tui,
}

#[derive(Subcommand)]
pub(crate) enum SiteCommands {
    /// Render every page fragment into a directory
    Build(site::BuildArgs),

    /// List devices, optionally filtered
    Devices(site::DevicesArgs),

    /// Show the detail view of one device
    Device(site::DeviceArgs),

    /// Stamp local css/js references in HTML files with a version query
    BustCache(site::BustCacheArgs),
}

#[derive(Subcommand)]
pub(crate) enum DevicesCommands {
    /// Rebuild devices.json from the per-device update manifests
    Generate(site::GenerateArgs),
}
