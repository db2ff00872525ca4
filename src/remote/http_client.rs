use reqwest::StatusCode;
use reqwest::blocking::{RequestBuilder, Response};

use super::{ApiErrorBody, ContentStoreClient};
use crate::error::{CmsError, CmsResult};

pub(super) const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// Best-effort extraction of the `message` field from an error response.
fn error_message(resp: Response) -> Option<String> {
    resp.json::<ApiErrorBody>().ok().and_then(ApiErrorBody::text)
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

impl ContentStoreClient {
    pub(super) fn ensure_read_ok(&self, resp: Response, what: &str) -> CmsResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = error_message(resp);
        if is_auth_failure(status) {
            return Err(CmsError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }
        Err(CmsError::Fetch {
            what: what.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    pub(super) fn ensure_write_ok(&self, resp: Response, path: &str) -> CmsResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = error_message(resp);
        if is_auth_failure(status) {
            return Err(CmsError::Unauthorized {
                status: status.as_u16(),
                message,
            });
        }

        // The API answers 409 for a stale sha and 422 when the sha is missing entirely.
        let sha_complaint = status == StatusCode::UNPROCESSABLE_ENTITY
            && message.as_deref().is_some_and(|m| m.contains("sha"));
        if status == StatusCode::CONFLICT || sha_complaint {
            return Err(CmsError::Conflict {
                path: path.to_string(),
                message,
            });
        }

        Err(CmsError::WriteRejected {
            status: status.as_u16(),
            message,
        })
    }

    pub(super) fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header(reqwest::header::ACCEPT, ACCEPT_V3);
        match &self.token {
            Some(token) => req.header(reqwest::header::AUTHORIZATION, format!("token {}", token)),
            None => req,
        }
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}
