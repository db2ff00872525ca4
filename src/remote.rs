use crate::error::CmsResult;

mod contents;
mod http_client;
mod identity;
mod trees;
mod types;
pub use self::types::*;

pub struct ContentStoreClient {
    api_base: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl ContentStoreClient {
    pub fn new(api_base: &str, token: &str) -> CmsResult<Self> {
        Self::build(api_base, Some(token.to_string()))
    }

    /// Client without credentials, for public endpoints only.
    pub fn anonymous(api_base: &str) -> CmsResult<Self> {
        Self::build(api_base, None)
    }

    fn build(api_base: &str, token: Option<String>) -> CmsResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("afterlife/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }
}
