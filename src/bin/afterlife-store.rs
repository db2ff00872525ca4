//! In-memory stand-in for the parts of the GitHub REST API the afterlife tools use:
//! identity, contents read/write with sha checks, recursive tree listing and raw
//! file access. For local development and the integration tests.

use std::sync::Arc;

use afterlife::store::MemoryStore;

#[path = "afterlife_store/http_error.rs"]
mod http_error;
#[path = "afterlife_store/handlers.rs"]
mod handlers;
#[path = "afterlife_store/routes.rs"]
mod routes;
#[path = "afterlife_store/runtime.rs"]
mod runtime;

struct AppState {
    store: MemoryStore,
    token: String,
    user: String,
    default_branch: String,
}

type SharedState = Arc<AppState>;

#[tokio::main]
async fn main() {
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
