use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use serde::Serialize;

use crate::error::{CmsError, CmsResult};
use crate::model::FileLocation;

/// File text plus the version token it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub text: String,
    pub sha: String,
}

/// Read returns content and its version token; write must present the token it last
/// read (or `None` to create) and returns the new token.
pub trait ContentStore {
    fn read_file(&self, loc: &FileLocation) -> CmsResult<StoredFile>;

    fn write_file(
        &self,
        loc: &FileLocation,
        text: &str,
        sha: Option<&str>,
        message: &str,
    ) -> CmsResult<String>;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn read_file(&self, loc: &FileLocation) -> CmsResult<StoredFile> {
        (**self).read_file(loc)
    }

    fn write_file(
        &self,
        loc: &FileLocation,
        text: &str,
        sha: Option<&str>,
        message: &str,
    ) -> CmsResult<String> {
        (**self).write_file(loc, text, sha, message)
    }
}

/// Opaque token for a file body. Same text, same token.
pub fn content_sha(text: &str) -> String {
    let hex = blake3::hash(text.as_bytes()).to_hex();
    hex.as_str()[..40].to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct FileKey {
    owner: String,
    repo: String,
    branch: String,
    path: String,
}

impl FileKey {
    fn of(loc: &FileLocation) -> Self {
        Self {
            owner: loc.owner.clone(),
            repo: loc.repo.clone(),
            branch: loc.branch.clone(),
            path: loc.path.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CommitRecord {
    pub location: FileLocation,
    pub message: String,
    pub sha: String,
}

#[derive(Default)]
struct MemoryState {
    files: BTreeMap<FileKey, StoredFile>,
    commits: Vec<CommitRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    pub sha: String,
    pub created: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Unconditionally sets a file's text (seeding); returns its token.
    pub fn insert(&self, loc: &FileLocation, text: &str) -> String {
        let sha = content_sha(text);
        self.lock().files.insert(
            FileKey::of(loc),
            StoredFile {
                text: text.to_string(),
                sha: sha.clone(),
            },
        );
        sha
    }

    pub fn get(&self, loc: &FileLocation) -> Option<StoredFile> {
        self.lock().files.get(&FileKey::of(loc)).cloned()
    }

    /// Paths of every file on `owner/repo@branch`, sorted.
    pub fn list_paths(&self, owner: &str, repo: &str, branch: &str) -> Vec<String> {
        self.lock()
            .files
            .keys()
            .filter(|k| k.owner == owner && k.repo == repo && k.branch == branch)
            .map(|k| k.path.clone())
            .collect()
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.lock().commits.clone()
    }

    /// Checks the token and writes under one lock; `created` is true when the file did
    /// not exist before.
    pub fn commit(
        &self,
        loc: &FileLocation,
        text: &str,
        sha: Option<&str>,
        message: &str,
    ) -> CmsResult<WriteOutcome> {
        let key = FileKey::of(loc);
        let mut state = self.lock();

        let current = state.files.get(&key).map(|f| f.sha.as_str());
        if current != sha {
            return Err(CmsError::Conflict {
                path: loc.path.clone(),
                message: Some(match (current, sha) {
                    (Some(cur), Some(got)) => format!("{} does not match {}", got, cur),
                    (Some(_), None) => "sha wasn't supplied".to_string(),
                    (None, _) => "file does not exist".to_string(),
                }),
            });
        }
        let created = current.is_none();

        let new_sha = content_sha(text);
        state.files.insert(
            key,
            StoredFile {
                text: text.to_string(),
                sha: new_sha.clone(),
            },
        );
        state.commits.push(CommitRecord {
            location: loc.clone(),
            message: message.to_string(),
            sha: new_sha.clone(),
        });
        Ok(WriteOutcome {
            sha: new_sha,
            created,
        })
    }

    /// Loads `<root>/<owner>/<repo>/<branch>/<path...>`.
    pub fn seed_from_dir(&self, root: &Path) -> anyhow::Result<usize> {
        let mut count = 0;
        for owner in read_dirs(root)? {
            for repo in read_dirs(&root.join(&owner))? {
                for branch in read_dirs(&root.join(&owner).join(&repo))? {
                    let base = root.join(&owner).join(&repo).join(&branch);
                    let mut files = Vec::new();
                    collect_files(&base, &base, &mut files)?;
                    for (rel, abs) in files {
                        let text = fs::read_to_string(&abs)
                            .with_context(|| format!("read seed file {}", abs.display()))?;
                        self.insert(&FileLocation::new(&owner, &repo, &rel, &branch), &text);
                        count += 1;
                    }
                }
            }
        }
        Ok(count)
    }
}

impl ContentStore for MemoryStore {
    fn read_file(&self, loc: &FileLocation) -> CmsResult<StoredFile> {
        self.get(loc).ok_or_else(|| CmsError::Fetch {
            what: loc.to_string(),
            status: 404,
            message: Some("Not Found".to_string()),
        })
    }

    fn write_file(
        &self,
        loc: &FileLocation,
        text: &str,
        sha: Option<&str>,
        message: &str,
    ) -> CmsResult<String> {
        self.commit(loc, text, sha, message).map(|w| w.sha)
    }
}

fn read_dirs(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.context("read dir entry")?;
        if entry.file_type().context("file type")?.is_dir() {
            out.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    out.sort();
    Ok(out)
}

fn collect_files(
    base: &Path,
    dir: &Path,
    out: &mut Vec<(String, std::path::PathBuf)>,
) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.context("read dir entry")?;
        let path = entry.path();
        if entry.file_type().context("file type")?.is_dir() {
            collect_files(base, &path, out)?;
        } else {
            let rel = path
                .strip_prefix(base)
                .context("strip seed prefix")?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            out.push((rel, path));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
