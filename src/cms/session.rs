use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::CmsConfig;
use crate::error::{CmsError, CmsResult};
use crate::fsutil::write_atomic;
use crate::model::ChangelogEntry;
use crate::remote::{ContentStoreClient, Identity};
use crate::store::ContentStore;

use super::form::FormSubmission;
use super::repository::{ChangelogRepository, CommitKind, UpsertOutcome, commit_message};

/// The single key the credential is stored under.
pub const SESSION_KEY: &str = "gh_token";

/// Session-scoped credential storage: a small JSON file in the per-user runtime
/// directory, which the OS clears at logout/reboot.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_RUNTIME_DIR/afterlife/session.json`, or the state dir when no runtime dir
    /// exists.
    pub fn default_location() -> Result<Self> {
        let dirs = xdg::BaseDirectories::with_prefix("afterlife").context("xdg base dirs")?;
        let path = match dirs.place_runtime_file("session.json") {
            Ok(p) => p,
            Err(err) => {
                tracing::debug!(error = %err, "no runtime dir; keeping session in state dir");
                dirs.place_state_file("session.json")
                    .context("create state dir for session")?
            }
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.is_file() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        match serde_json::from_slice(&bytes) {
            Ok(map) => Ok(map),
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable session file");
                Ok(BTreeMap::new())
            }
        }
    }

    pub fn load(&self) -> Result<Option<String>> {
        Ok(self
            .read_map()?
            .remove(SESSION_KEY)
            .filter(|t| !t.trim().is_empty()))
    }

    pub fn save(&self, token: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(SESSION_KEY.to_string(), token.to_string());
        let bytes = serde_json::to_vec_pretty(&map).context("serialize session")?;
        write_atomic(&self.path, &bytes).context("write session")?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(SESSION_KEY).is_none() {
            return Ok(());
        }
        if map.is_empty() {
            fs::remove_file(&self.path)
                .with_context(|| format!("remove {}", self.path.display()))?;
        } else {
            let bytes = serde_json::to_vec_pretty(&map).context("serialize session")?;
            write_atomic(&self.path, &bytes).context("write session")?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

pub struct AdminSession<S = ContentStoreClient> {
    identity: Identity,
    repository: ChangelogRepository<S>,
}

impl AdminSession<ContentStoreClient> {
    /// Validates `token` against the identity endpoint and persists it. Any failure,
    /// rejection or network error alike, clears the stored credential.
    pub fn start(cfg: &CmsConfig, token: &str, sessions: &SessionStore) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CmsError::Validation("please enter a token".to_string()).into());
        }

        let client = ContentStoreClient::new(&cfg.api_base, token)?;
        let identity = match client.whoami() {
            Ok(identity) => identity,
            Err(err) => {
                if let Err(clear_err) = sessions.clear() {
                    tracing::warn!(error = %clear_err, "failed to clear stored session");
                }
                tracing::warn!(error = %err, "credential validation failed; logged out");
                return Err(err).context("validate token");
            }
        };

        sessions.save(token)?;
        tracing::info!(login = %identity.login, "admin session started");
        Ok(Self::from_parts(
            identity,
            ChangelogRepository::new(client, cfg.location()),
        ))
    }

    /// Starts from the stored credential; `None` when nobody is logged in.
    pub fn resume(cfg: &CmsConfig, sessions: &SessionStore) -> Result<Option<Self>> {
        match sessions.load()? {
            Some(token) => Self::start(cfg, &token, sessions).map(Some),
            None => Ok(None),
        }
    }
}

impl<S: ContentStore> AdminSession<S> {
    pub fn from_parts(identity: Identity, repository: ChangelogRepository<S>) -> Self {
        Self {
            identity,
            repository,
        }
    }

    pub fn login(&self) -> &str {
        &self.identity.login
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn repository(&self) -> &ChangelogRepository<S> {
        &self.repository
    }

    pub fn reload(&mut self) -> CmsResult<()> {
        self.repository.load()
    }

    /// Applies a form submission and commits it. A failed commit keeps the edit in memory.
    pub fn save_entry(&mut self, submission: FormSubmission) -> CmsResult<UpsertOutcome> {
        let message = commit_message(submission.kind, &submission.entry.version);
        let outcome = self.repository.upsert(submission.entry, submission.target);
        self.repository.commit(&message)?;
        Ok(outcome)
    }

    pub fn delete_entry(&mut self, index: usize) -> CmsResult<ChangelogEntry> {
        let removed = self.repository.remove(index)?;
        self.repository
            .commit(&commit_message(CommitKind::Delete, &removed.version))?;
        Ok(removed)
    }

    /// Drops the stored credential and the session with it.
    pub fn logout(self, sessions: &SessionStore) -> Result<()> {
        sessions.clear()?;
        tracing::info!(login = %self.identity.login, "logged out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/cms/session_tests.rs"]
mod tests;
