use super::*;

fn filled() -> EntryForm {
    let mut form = EntryForm::new();
    form.version = "1.2".to_string();
    form.date = "March 3, 2025".to_string();
    form.changes = "  - fixed things\n- added stuff  \n".to_string();
    form
}

#[test]
fn new_form_is_create_mode_with_latest_checked() {
    let form = EntryForm::new();
    assert_eq!(form.mode(), FormMode::Create);
    assert!(form.is_latest);
    assert_eq!(form.title(), "Create New Release");
    assert_eq!(form.submit_label(), "Publish Update");
}

#[test]
fn submit_requires_every_field() {
    let mut form = filled();
    form.date = "   ".to_string();
    form.changes.clear();

    match form.submit() {
        Err(CmsError::Validation(msg)) => {
            assert!(msg.contains("date"));
            assert!(msg.contains("changes"));
            assert!(!msg.contains("version"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn create_submission_normalizes_changes_and_targets_head() {
    let sub = filled().submit().unwrap();
    assert_eq!(sub.target, None);
    assert_eq!(sub.kind, CommitKind::Release);
    assert_eq!(sub.entry.changes, "\n- fixed things\n- added stuff\n");
    assert!(sub.entry.is_latest);
}

#[test]
fn edit_mode_populates_fields_and_targets_index() {
    let mut form = EntryForm::new();
    let entry = ChangelogEntry::new("1.0", "Jan 1", false, "\n- old\n");
    form.begin_edit(4, &entry);

    assert_eq!(form.mode(), FormMode::Edit(4));
    assert_eq!(form.changes, "- old");
    assert!(!form.is_latest);
    assert_eq!(form.title(), "Edit Release");
    assert_eq!(form.submit_label(), "Save Changes");

    let sub = form.submit().unwrap();
    assert_eq!(sub.target, Some(4));
    assert_eq!(sub.kind, CommitKind::Update);
    assert_eq!(sub.entry, entry);
}

#[test]
fn cancel_resets_to_empty_create_form() {
    let mut form = filled();
    form.begin_edit(1, &ChangelogEntry::new("1.0", "Jan 1", false, "x"));
    form.cancel();
    assert_eq!(form, EntryForm::new());
}

#[test]
fn removing_edited_entry_cancels_and_earlier_removal_shifts_index() {
    let entry = ChangelogEntry::new("1.0", "Jan 1", false, "x");

    let mut form = EntryForm::new();
    form.begin_edit(2, &entry);
    form.entry_removed(0);
    assert_eq!(form.mode(), FormMode::Edit(1));
    form.entry_removed(3);
    assert_eq!(form.mode(), FormMode::Edit(1));
    form.entry_removed(1);
    assert_eq!(form.mode(), FormMode::Create);
    assert!(form.version.is_empty());
}
