use anyhow::Result;

use crate::cli_commands::{Commands, DevicesCommands};
use crate::cli_runtime::Ctx;

mod admin;
mod site;

pub(super) fn handle_command(ctx: &Ctx, command: Commands) -> Result<()> {
    match command {
        Commands::Admin { command } => admin::handle_admin_command(ctx, command),
        Commands::Site { command } => site::handle_site_command(ctx, command),
        Commands::Devices { command } => match command {
            DevicesCommands::Generate(args) => site::generate_devices(ctx, args),
        },
    }
}
