use super::{ContentStoreClient, TreeResponse};
use crate::error::CmsResult;

impl ContentStoreClient {
    /// Recursive listing of every path on `branch`.
    pub fn list_tree(&self, owner: &str, repo: &str, branch: &str) -> CmsResult<TreeResponse> {
        let resp = self
            .with_auth(
                self.client
                    .get(self.url(&format!("/repos/{}/{}/git/trees/{}", owner, repo, branch))),
            )
            .query(&[("recursive", "1")])
            .send()?;
        let tree: TreeResponse = self.ensure_read_ok(resp, "tree")?.json()?;
        if tree.truncated {
            tracing::warn!(owner, repo, branch, "tree listing truncated by the remote");
        }
        Ok(tree)
    }
}
