use anyhow::Result;

use crate::cms::SessionStore;
use crate::config::CmsConfig;

/// Opens the interactive changelog console. Requires a TTY.
pub fn run(cfg: CmsConfig, sessions: SessionStore) -> Result<()> {
    crate::tui_shell::run(cfg, sessions)
}
