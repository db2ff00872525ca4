use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::CmsResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    #[default]
    Default,
    /// Skip the lookup but still store a successful response.
    Reload,
    /// Neither look up nor store.
    NoStore,
}

/// Everything besides the URL that makes two requests different.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    pub cache: CacheMode,
}

impl RequestOptions {
    pub fn accept(accept: &str) -> Self {
        Self {
            accept: Some(accept.to_string()),
            cache: CacheMode::Default,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

struct Slot {
    stored_at: Instant,
    response: CachedResponse,
}

pub struct ResponseCache {
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// `{url}_{options as json}`
    pub fn key(url: &str, options: &RequestOptions) -> String {
        let opts = serde_json::to_string(options).unwrap_or_default();
        format!("{}_{}", url, opts)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a fresh cached response or runs `fetch`. Only successful responses are
    /// stored; failures and non-2xx responses go straight back to the caller.
    pub fn get_or_fetch(
        &self,
        url: &str,
        options: &RequestOptions,
        fetch: impl FnOnce() -> CmsResult<CachedResponse>,
    ) -> CmsResult<CachedResponse> {
        let key = Self::key(url, options);

        if options.cache == CacheMode::Default
            && let Some(slot) = self.slots().get(&key)
            && slot.stored_at.elapsed() < self.ttl
        {
            tracing::trace!(url, "response cache hit");
            return Ok(slot.response.clone());
        }

        let response = fetch()?;
        if response.is_success() && options.cache != CacheMode::NoStore {
            let mut slots = self.slots();
            drop_expired(&mut slots, self.ttl);
            slots.insert(
                key,
                Slot {
                    stored_at: Instant::now(),
                    response: response.clone(),
                },
            );
        }
        Ok(response)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops entries older than the TTL; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        drop_expired(&mut self.slots(), self.ttl)
    }

    pub fn clear(&self) {
        self.slots().clear();
    }
}

fn drop_expired(slots: &mut HashMap<String, Slot>, ttl: Duration) -> usize {
    let before = slots.len();
    slots.retain(|_, s| s.stored_at.elapsed() < ttl);
    before - slots.len()
}

#[cfg(test)]
#[path = "../tests/site/cache_tests.rs"]
mod tests;
