use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use afterlife::logging;
use afterlife::store::MemoryStore;

use super::AppState;
use super::routes::router;

#[derive(Parser)]
#[command(name = "afterlife-store")]
#[command(about = "In-memory content store (development)", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Preload files from `<dir>/<owner>/<repo>/<branch>/<path>`
    #[arg(long, value_name = "DIR")]
    seed_dir: Option<PathBuf>,

    /// Accepted access token
    #[arg(long, default_value = "dev")]
    token: String,

    /// Login reported by /user
    #[arg(long, default_value = "dev")]
    user: String,

    /// Branch used when a read names no ref
    #[arg(long, default_value = "main")]
    default_branch: String,

    /// Debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

pub(super) async fn run() -> Result<()> {
    let args = Args::parse();
    logging::init_stderr(args.verbose);

    let store = MemoryStore::new();
    if let Some(dir) = &args.seed_dir {
        let n = store
            .seed_from_dir(dir)
            .with_context(|| format!("seed from {}", dir.display()))?;
        tracing::info!(files = n, "seeded from {}", dir.display());
    }

    let state = Arc::new(AppState {
        store,
        token: args.token,
        user: args.user,
        default_branch: args.default_branch,
    });
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("afterlife-store listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
