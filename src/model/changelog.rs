use serde::{Deserialize, Serialize};

/// One release in the changelog timeline. `date` is display text and is never parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub date: String,

    #[serde(default, rename = "isLatest")]
    pub is_latest: bool,

    #[serde(default)]
    pub changes: String,
}

impl ChangelogEntry {
    pub fn new(version: &str, date: &str, is_latest: bool, changes: &str) -> Self {
        Self {
            version: version.to_string(),
            date: date.to_string(),
            is_latest,
            changes: changes.to_string(),
        }
    }

    /// Version and date together identify an entry for display and deletion messages.
    pub fn identity(&self) -> (&str, &str) {
        (&self.version, &self.date)
    }
}

/// Where a versioned file lives in the remote content store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLocation {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
}

impl FileLocation {
    pub fn new(owner: &str, repo: &str, path: &str, branch: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.trim_start_matches('/').to_string(),
            branch: branch.to_string(),
        }
    }

    pub fn handle(&self, sha: Option<String>) -> RemoteFileHandle {
        RemoteFileHandle {
            path: self.path.clone(),
            branch: self.branch.clone(),
            sha,
        }
    }
}

impl std::fmt::Display for FileLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}@{}", self.owner, self.repo, self.path, self.branch)
    }
}

/// The version token last observed for a file; it must be echoed back on write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileHandle {
    pub path: String,
    pub branch: String,
    pub sha: Option<String>,
}
