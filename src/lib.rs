pub mod cms;
pub mod codec;
pub mod config;
pub mod error;
pub mod fsutil;
pub mod logging;
pub mod model;
pub mod remote;
pub mod site;
pub mod store;
pub mod tui;
mod tui_shell;
