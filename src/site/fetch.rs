use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::cache::{CachedResponse, RequestOptions, ResponseCache};
use crate::codec;
use crate::error::{CmsError, CmsResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    /// Same-origin files under a directory.
    Local(PathBuf),
    /// `{base}/{path}` over HTTP, e.g. `https://raw.githubusercontent.com/owner/repo/branch`.
    Remote(String),
}

impl DataSource {
    pub fn remote(base: &str) -> Self {
        DataSource::Remote(base.trim_end_matches('/').to_string())
    }

    /// The URL (or file path) a relative data path resolves to.
    pub fn resolve(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match self {
            DataSource::Local(dir) => dir.join(path).display().to_string(),
            DataSource::Remote(base) => format!("{}/{}", base, path),
        }
    }
}

pub struct DataFetcher {
    source: DataSource,
    cache: ResponseCache,
    client: reqwest::blocking::Client,
}

impl DataFetcher {
    pub fn new(source: DataSource, ttl: Duration) -> CmsResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("afterlife/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            source,
            cache: ResponseCache::new(ttl),
            client,
        })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn fetch_raw(&self, target: &str, options: &RequestOptions) -> CmsResult<CachedResponse> {
        match &self.source {
            DataSource::Local(_) => match fs::read(target) {
                Ok(body) => Ok(CachedResponse { status: 200, body }),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(CachedResponse {
                    status: 404,
                    body: Vec::new(),
                }),
                Err(err) => Err(err.into()),
            },
            DataSource::Remote(_) => {
                let mut req = self.client.get(target);
                if let Some(accept) = &options.accept {
                    req = req.header(reqwest::header::ACCEPT, accept);
                }
                let resp = req.send()?;
                let status = resp.status().as_u16();
                let body = resp.bytes()?.to_vec();
                Ok(CachedResponse { status, body })
            }
        }
    }

    /// Body of `path`; a non-success status is a `Fetch` error.
    pub fn fetch_bytes(&self, path: &str) -> CmsResult<Vec<u8>> {
        self.fetch_bytes_with(path, &RequestOptions::default())
    }

    pub fn fetch_bytes_with(&self, path: &str, options: &RequestOptions) -> CmsResult<Vec<u8>> {
        let target = self.source.resolve(path);
        let resp = self
            .cache
            .get_or_fetch(&target, options, || self.fetch_raw(&target, options))?;
        if !resp.is_success() {
            tracing::debug!(url = %target, status = resp.status, "fetch failed");
            return Err(CmsError::Fetch {
                what: target,
                status: resp.status,
                message: None,
            });
        }
        Ok(resp.body)
    }

    pub fn fetch_text(&self, path: &str) -> CmsResult<String> {
        let bytes = self.fetch_bytes(path)?;
        String::from_utf8(bytes)
            .map_err(|e| CmsError::Decode(format!("{} is not utf-8: {}", path, e)))
    }

    /// Best-effort read: any failure is "not available".
    pub fn fetch_optional_text(&self, path: &str) -> Option<String> {
        match self.fetch_text(path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::trace!(path, error = %err, "optional fetch unavailable");
                None
            }
        }
    }

    pub fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> CmsResult<T> {
        let bytes =
            self.fetch_bytes_with(path, &RequestOptions::accept("application/json"))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CmsError::Decode(format!("parse {}: {}", path, e)))
    }

    /// A data file in the `{variable} = <json>;` form.
    pub fn fetch_wrapped<T: DeserializeOwned>(&self, path: &str, variable: &str) -> CmsResult<T> {
        let text = self.fetch_text(path)?;
        codec::decode_wrapped(&text, variable)
    }
}

#[cfg(test)]
#[path = "../tests/site/fetch_tests.rs"]
mod tests;
