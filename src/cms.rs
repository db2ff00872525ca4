mod form;
mod repository;
mod session;

pub use self::form::{EntryForm, FormMode, FormSubmission};
pub use self::repository::{ChangelogRepository, CommitKind, UpsertOutcome, commit_message};
pub use self::session::{AdminSession, SESSION_KEY, SessionStore};
