use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use afterlife::codec;
use afterlife::error::CmsError;
use afterlife::model::FileLocation;
use afterlife::remote::{
    ContentRef, ContentsResponse, Identity, PutContentsRequest, PutContentsResponse, TreeItem,
    TreeResponse,
};
use afterlife::store::{WriteOutcome, content_sha};

use super::SharedState;
use super::http_error::{bad_request, conflict, not_found, unauthorized};

enum Credential {
    Missing,
    Valid,
    Invalid,
}

/// Accepts both `token X` (the API's classic form) and `Bearer X`.
fn credential(state: &SharedState, headers: &HeaderMap) -> Credential {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Credential::Missing;
    };
    let Ok(value) = value.to_str() else {
        return Credential::Invalid;
    };
    let token = value
        .strip_prefix("token ")
        .or_else(|| value.strip_prefix("Bearer "));
    match token {
        Some(t) if t.trim() == state.token => Credential::Valid,
        _ => Credential::Invalid,
    }
}

pub(super) async fn require_token(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    match credential(&state, req.headers()) {
        Credential::Valid => next.run(req).await,
        Credential::Missing | Credential::Invalid => unauthorized(),
    }
}

/// Public reads work anonymously, but a wrong token is still rejected.
fn allow_anonymous(state: &SharedState, headers: &HeaderMap) -> Result<(), Response> {
    match credential(state, headers) {
        Credential::Missing | Credential::Valid => Ok(()),
        Credential::Invalid => Err(unauthorized()),
    }
}

pub(super) async fn healthz() -> &'static str {
    "ok"
}

pub(super) async fn whoami(State(state): State<SharedState>) -> Json<Identity> {
    Json(Identity {
        login: state.user.clone(),
        name: None,
    })
}

pub(super) async fn list_commits(State(state): State<SharedState>) -> Response {
    Json(state.store.commits()).into_response()
}

#[derive(Deserialize)]
pub(super) struct RefQuery {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
}

/// The API wraps base64 payloads at 60 columns.
fn wrap_base64(encoded: &str) -> String {
    encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) async fn get_contents(
    State(state): State<SharedState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(q): Query<RefQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = allow_anonymous(&state, &headers) {
        return resp;
    }
    let branch = q.git_ref.unwrap_or_else(|| state.default_branch.clone());
    let loc = FileLocation::new(&owner, &repo, &path, &branch);
    let Some(file) = state.store.get(&loc) else {
        return not_found();
    };
    Json(ContentsResponse {
        path: loc.path,
        sha: file.sha,
        content: wrap_base64(&codec::encode_content(&file.text)),
        encoding: "base64".to_string(),
    })
    .into_response()
}

pub(super) async fn put_contents(
    State(state): State<SharedState>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(req): Json<PutContentsRequest>,
) -> Response {
    if !matches!(credential(&state, &headers), Credential::Valid) {
        return unauthorized();
    }
    let text = match codec::decode_content(&req.content) {
        Ok(t) => t,
        Err(err) => return bad_request(&err.to_string()),
    };
    let loc = FileLocation::new(&owner, &repo, &path, &req.branch);
    match state
        .store
        .commit(&loc, &text, req.sha.as_deref(), &req.message)
    {
        Ok(WriteOutcome { sha, created }) => {
            tracing::info!(path = %loc.path, %sha, message = %req.message, "commit");
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(PutContentsResponse {
                    content: ContentRef {
                        path: loc.path,
                        sha,
                    },
                }),
            )
                .into_response()
        }
        Err(CmsError::Conflict { message, .. }) => {
            let msg = message.unwrap_or_else(|| "sha does not match".to_string());
            tracing::warn!(path = %loc.path, "rejected stale write: {}", msg);
            conflict(&msg)
        }
        Err(err) => bad_request(&err.to_string()),
    }
}

/// Every file as a `blob` plus each parent directory as a `tree`, like a recursive
/// listing.
pub(super) async fn get_tree(
    State(state): State<SharedState>,
    Path((owner, repo, branch)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = allow_anonymous(&state, &headers) {
        return resp;
    }
    let paths = state.store.list_paths(&owner, &repo, &branch);
    if paths.is_empty() {
        return not_found();
    }

    let mut dirs = BTreeSet::new();
    for p in &paths {
        let mut prefix = p.as_str();
        while let Some((parent, _)) = prefix.rsplit_once('/') {
            dirs.insert(parent.to_string());
            prefix = parent;
        }
    }
    let mut tree: Vec<TreeItem> = dirs
        .into_iter()
        .map(|path| TreeItem {
            path,
            kind: "tree".to_string(),
        })
        .collect();
    tree.extend(paths.iter().map(|path| TreeItem {
        path: path.clone(),
        kind: "blob".to_string(),
    }));
    tree.sort_by(|a, b| a.path.cmp(&b.path));

    Json(TreeResponse {
        sha: content_sha(&paths.join("\n")),
        tree,
        truncated: false,
    })
    .into_response()
}

pub(super) async fn get_raw(
    State(state): State<SharedState>,
    Path((owner, repo, branch, path)): Path<(String, String, String, String)>,
) -> Response {
    let loc = FileLocation::new(&owner, &repo, &path, &branch);
    match state.store.get(&loc) {
        Some(file) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            file.text,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "404: Not Found").into_response(),
    }
}
