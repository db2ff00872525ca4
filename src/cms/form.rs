use crate::error::{CmsError, CmsResult};
use crate::model::ChangelogEntry;

use super::repository::CommitKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit(usize),
}

/// A validated form ready to hand to `ChangelogRepository::upsert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSubmission {
    pub entry: ChangelogEntry,
    pub target: Option<usize>,
    pub kind: CommitKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryForm {
    pub version: String,
    pub date: String,
    pub changes: String,
    pub is_latest: bool,
    mode: FormMode,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            version: String::new(),
            date: String::new(),
            changes: String::new(),
            is_latest: true,
            mode: FormMode::Create,
        }
    }
}

impl EntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Release",
            FormMode::Edit(_) => "Edit Release",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Publish Update",
            FormMode::Edit(_) => "Save Changes",
        }
    }

    pub fn begin_edit(&mut self, index: usize, entry: &ChangelogEntry) {
        self.version = entry.version.clone();
        self.date = entry.date.clone();
        self.changes = entry.changes.trim().to_string();
        self.is_latest = entry.is_latest;
        self.mode = FormMode::Edit(index);
    }

    /// Back to an empty create form.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Keeps an in-progress edit pointing at the same entry after `removed` is deleted.
    pub fn entry_removed(&mut self, removed: usize) {
        if let FormMode::Edit(i) = self.mode {
            if i == removed {
                self.cancel();
            } else if i > removed {
                self.mode = FormMode::Edit(i - 1);
            }
        }
    }

    /// Requires version, date and changes; the changes block is stored as
    /// `"\n" + trimmed + "\n"`.
    pub fn submit(&self) -> CmsResult<FormSubmission> {
        let version = self.version.trim();
        let date = self.date.trim();
        let changes = self.changes.trim();

        let mut missing = Vec::new();
        if version.is_empty() {
            missing.push("version");
        }
        if date.is_empty() {
            missing.push("date");
        }
        if changes.is_empty() {
            missing.push("changes");
        }
        if !missing.is_empty() {
            return Err(CmsError::Validation(format!(
                "please fill all fields (missing: {})",
                missing.join(", ")
            )));
        }

        let entry = ChangelogEntry {
            version: version.to_string(),
            date: date.to_string(),
            is_latest: self.is_latest,
            changes: format!("\n{}\n", changes),
        };

        let (target, kind) = match self.mode {
            FormMode::Create => (None, CommitKind::Release),
            FormMode::Edit(i) => (Some(i), CommitKind::Update),
        };

        Ok(FormSubmission {
            entry,
            target,
            kind,
        })
    }
}

#[cfg(test)]
#[path = "../tests/cms/form_tests.rs"]
mod tests;
