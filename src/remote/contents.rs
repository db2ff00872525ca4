use super::{ContentStoreClient, ContentsResponse, PutContentsRequest, PutContentsResponse};
use crate::codec;
use crate::error::CmsResult;
use crate::model::FileLocation;
use crate::store::{ContentStore, StoredFile};

fn contents_path(loc: &FileLocation) -> String {
    format!("/repos/{}/{}/contents/{}", loc.owner, loc.repo, loc.path)
}

impl ContentStoreClient {
    pub fn get_contents(&self, loc: &FileLocation) -> CmsResult<ContentsResponse> {
        let resp = self
            .with_auth(self.client.get(self.url(&contents_path(loc))))
            .query(&[("ref", loc.branch.as_str())])
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()?;
        let body: ContentsResponse = self.ensure_read_ok(resp, &loc.to_string())?.json()?;
        Ok(body)
    }

    pub fn put_contents(
        &self,
        loc: &FileLocation,
        req: &PutContentsRequest,
    ) -> CmsResult<PutContentsResponse> {
        let resp = self
            .with_auth(self.client.put(self.url(&contents_path(loc))))
            .json(req)
            .send()?;
        let body: PutContentsResponse = self.ensure_write_ok(resp, &loc.path)?.json()?;
        Ok(body)
    }
}

impl ContentStore for ContentStoreClient {
    fn read_file(&self, loc: &FileLocation) -> CmsResult<StoredFile> {
        let body = self.get_contents(loc)?;
        if body.encoding != "base64" {
            return Err(crate::error::CmsError::Decode(format!(
                "unsupported content encoding {}",
                body.encoding
            )));
        }
        Ok(StoredFile {
            text: codec::decode_content(&body.content)?,
            sha: body.sha,
        })
    }

    fn write_file(
        &self,
        loc: &FileLocation,
        text: &str,
        sha: Option<&str>,
        message: &str,
    ) -> CmsResult<String> {
        let req = PutContentsRequest {
            message: message.to_string(),
            content: codec::encode_content(text),
            sha: sha.map(str::to_string),
            branch: loc.branch.clone(),
        };
        let out = self.put_contents(loc, &req)?;
        tracing::info!(path = %loc.path, sha = %out.content.sha, "committed");
        Ok(out.content.sha)
    }
}
