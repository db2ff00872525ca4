use super::{ContentStoreClient, Identity};
use crate::error::CmsResult;

impl ContentStoreClient {
    /// Validates the credential; the login is shown in the console header.
    pub fn whoami(&self) -> CmsResult<Identity> {
        let resp = self.with_auth(self.client.get(self.url("/user"))).send()?;
        let identity: Identity = self.ensure_read_ok(resp, "user")?.json()?;
        tracing::debug!(login = %identity.login, "credential validated");
        Ok(identity)
    }
}
