//! Read-modify-write synchronization of the changelog file under optimistic concurrency.
//!
//! The repository holds the decoded collection and the version token it was read at.
//! Mutations only touch memory; `commit` writes the whole collection back presenting the
//! held token and adopts the token the store returns, so consecutive commits need no
//! reload. A rejected commit leaves memory untouched and is never retried here.

use crate::codec;
use crate::error::{CmsError, CmsResult};
use crate::model::{ChangelogEntry, FileLocation, RemoteFileHandle};
use crate::store::ContentStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitKind {
    Release,
    Update,
    Delete,
}

/// `[CMS] Release 1.1`, `[CMS] Update 1.1`, `[CMS] Delete 1.0`
pub fn commit_message(kind: CommitKind, version: &str) -> String {
    let verb = match kind {
        CommitKind::Release => "Release",
        CommitKind::Update => "Update",
        CommitKind::Delete => "Delete",
    };
    format!("[CMS] {} {}", verb, version)
}

pub struct ChangelogRepository<S> {
    store: S,
    location: FileLocation,
    entries: Vec<ChangelogEntry>,
    sha: Option<String>,
}

impl<S: ContentStore> ChangelogRepository<S> {
    pub fn new(store: S, location: FileLocation) -> Self {
        Self {
            store,
            location,
            entries: Vec::new(),
            sha: None,
        }
    }

    pub fn location(&self) -> &FileLocation {
        &self.location
    }

    pub fn entries(&self) -> &[ChangelogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ChangelogEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    pub fn handle(&self) -> RemoteFileHandle {
        self.location.handle(self.sha.clone())
    }

    pub fn latest(&self) -> Option<&ChangelogEntry> {
        self.entries.iter().find(|e| e.is_latest)
    }

    /// Replaces memory with the remote file. On any failure memory is left empty.
    pub fn load(&mut self) -> CmsResult<()> {
        self.entries.clear();
        self.sha = None;

        let file = self.store.read_file(&self.location)?;
        let entries = codec::decode_changelog(&file.text)?;
        tracing::debug!(
            location = %self.location,
            sha = %file.sha,
            entries = entries.len(),
            "changelog loaded"
        );
        self.entries = entries;
        self.sha = Some(file.sha);
        Ok(())
    }

    /// Edits in place when `target` names an existing entry, otherwise prepends.
    /// A latest entry clears the flag on every other entry first.
    pub fn upsert(&mut self, entry: ChangelogEntry, target: Option<usize>) -> UpsertOutcome {
        if entry.is_latest {
            for e in &mut self.entries {
                e.is_latest = false;
            }
        }

        match target.filter(|&i| i < self.entries.len()) {
            Some(i) => {
                self.entries[i] = entry;
                UpsertOutcome::Updated(i)
            }
            None => {
                self.entries.insert(0, entry);
                UpsertOutcome::Created
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> CmsResult<ChangelogEntry> {
        if index >= self.entries.len() {
            return Err(CmsError::Validation(format!(
                "no changelog entry at index {} ({} entries)",
                index,
                self.entries.len()
            )));
        }
        Ok(self.entries.remove(index))
    }

    /// Writes the whole collection back with the held token and adopts the new one.
    pub fn commit(&mut self, message: &str) -> CmsResult<String> {
        let text = codec::encode_changelog(&self.entries)?;
        match self
            .store
            .write_file(&self.location, &text, self.sha.as_deref(), message)
        {
            Ok(new_sha) => {
                tracing::info!(
                    location = %self.location,
                    sha = %new_sha,
                    commit_message = message,
                    "changelog committed"
                );
                self.sha = Some(new_sha.clone());
                Ok(new_sha)
            }
            Err(err) => {
                tracing::warn!(location = %self.location, error = %err, "changelog commit failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/cms/repository_tests.rs"]
mod tests;
