use axum::Router;
use axum::middleware;
use axum::routing::get;

use super::SharedState;
use super::handlers::{
    get_contents, get_raw, get_tree, healthz, list_commits, put_contents, require_token, whoami,
};

pub(super) fn router(state: SharedState) -> Router {
    let authed = Router::new()
        .route("/user", get(whoami))
        .route("/_dev/commits", get(list_commits))
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/repos/:owner/:repo/contents/*path",
            get(get_contents).put(put_contents),
        )
        .route("/repos/:owner/:repo/git/trees/:branch", get(get_tree))
        .route("/raw/:owner/:repo/:branch/*path", get(get_raw))
        .merge(authed)
        .with_state(state)
}
